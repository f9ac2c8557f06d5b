use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    pub quiz: QuizConfig,
}

#[derive(Debug, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub embedding_model: String,
}

#[derive(Debug, Deserialize)]
pub struct RetrievalConfig {
    pub index_path: PathBuf,
    pub search_limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct QuizConfig {
    pub default_questions: usize,
}

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SAGE_OLLAMA_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("SAGE_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("SAGE_EMBEDDING_MODEL") {
            self.llm.embedding_model = v;
        }
        if let Ok(v) = std::env::var("SAGE_DATA_DIR") {
            self.retrieval.index_path = PathBuf::from(v).join("index.json");
        }
    }

    fn default() -> Self {
        Self {
            llm: LlmConfig {
                base_url: "http://localhost:11434".into(),
                model: "llama3.2".into(),
                embedding_model: "nomic-embed-text".into(),
            },
            retrieval: RetrievalConfig {
                index_path: PathBuf::from("./data/index.json"),
                search_limit: 10,
            },
            quiz: QuizConfig {
                default_questions: 5,
            },
        }
    }
}
