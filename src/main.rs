use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use dialoguer::{Input, Select};
use sage_core::{
    Config, ProgressStore, QuizSession, Workflow, WorkflowError, classify, extract_topic,
};
use sage_llm::ollama::OllamaProvider;
use sage_llm::provider::embed_fn;
use sage_memory::{DocumentError, VectorIndex, extract_path};

#[derive(Debug, Parser)]
#[command(name = "sage", version, about = "Retrieval-grounded study assistant")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config);
    let config = Config::load(&config_path)?;

    let provider = OllamaProvider::new(
        &config.llm.base_url,
        config.llm.model.clone(),
        config.llm.embedding_model.clone(),
    );
    if let Err(e) = provider.health_check().await {
        bail!(
            "{e}\nstart Ollama and pull '{}' and '{}', then retry",
            config.llm.model,
            config.llm.embedding_model
        );
    }
    tracing::info!(model = %config.llm.model, "ollama health check passed");

    let index = match VectorIndex::load(&config.retrieval.index_path) {
        Ok(index) => {
            tracing::info!(entries = index.len(), "index loaded");
            index
        }
        Err(e) => {
            tracing::warn!("no usable index on disk, starting empty: {e}");
            VectorIndex::new()
        }
    };

    println!("sage v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "commands: upload <file>, ask <question>, summarize <topic>, quiz <topic>, progress, clear, quit"
    );

    let mut app = App {
        config,
        provider,
        index,
        store: ProgressStore::new(),
    };
    app.run().await
}

fn resolve_config_path(cli_path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = cli_path {
        return path;
    }
    if let Ok(path) = std::env::var("SAGE_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

struct App {
    config: Config,
    provider: OllamaProvider,
    index: VectorIndex,
    store: ProgressStore,
}

impl App {
    async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let line: String = Input::new().with_prompt("sage").interact_text()?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
            match command {
                "quit" | "exit" => return Ok(()),
                "upload" => self.upload(rest).await,
                "ask" => self.ask(rest).await,
                "summarize" => self.summarize(rest).await,
                "quiz" => self.quiz(rest).await,
                "progress" => self.progress(),
                "clear" => self.clear(),
                // bare text: route by keyword
                _ => match classify(line) {
                    Workflow::Summarize => self.summarize(&extract_topic(line)).await,
                    Workflow::Quiz => self.quiz(&extract_topic(line)).await,
                    Workflow::QuestionAnswer => self.ask(line).await,
                },
            }
        }
    }

    async fn upload(&mut self, path: &str) {
        if path.is_empty() {
            println!("usage: upload <file.pdf | file.pptx>");
            return;
        }
        let chunks = match extract_path(std::path::Path::new(path)) {
            Ok(chunks) => chunks,
            Err(e @ DocumentError::UnsupportedFormat(_)) => {
                println!("{e}");
                return;
            }
            Err(e) => {
                println!("upload failed: {e}\ncheck the file and re-upload it");
                return;
            }
        };

        let embed = embed_fn(&self.provider);
        match VectorIndex::build(chunks, &embed).await {
            Ok(index) => {
                if let Err(e) = index.persist(&self.config.retrieval.index_path) {
                    tracing::warn!("index not persisted, continuing in memory: {e}");
                }
                println!("indexed {} chunk(s) from {path}", index.len());
                self.index = index;
            }
            Err(e) => println!("upload failed: {e}"),
        }
    }

    async fn ask(&mut self, question: &str) {
        if question.is_empty() {
            println!("usage: ask <question>");
            return;
        }
        match sage_core::answer(
            &self.index,
            &self.provider,
            question,
            self.config.retrieval.search_limit,
        )
        .await
        {
            Ok(text) => println!("{text}"),
            Err(e) => print_workflow_error(&e),
        }
    }

    async fn summarize(&mut self, topic: &str) {
        if topic.is_empty() {
            println!("usage: summarize <topic>");
            return;
        }
        match sage_core::summarize(
            &self.index,
            &self.provider,
            topic,
            self.config.retrieval.search_limit,
        )
        .await
        {
            Ok(text) => println!("{text}"),
            Err(e) => print_workflow_error(&e),
        }
    }

    async fn quiz(&mut self, topic: &str) {
        if let Err(e) = self.run_quiz(topic).await {
            print_workflow_error(&e);
        }
    }

    async fn run_quiz(&mut self, topic: &str) -> Result<(), WorkflowError> {
        if topic.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "enter a topic, e.g. `quiz mitosis`".into(),
            ));
        }
        if self.index.is_empty() {
            return Err(WorkflowError::Validation(
                "no document indexed yet, upload one first".into(),
            ));
        }
        let quiz = sage_core::generate_quiz(
            &self.index,
            &self.provider,
            topic,
            self.config.quiz.default_questions,
            &self.store.previous_questions(topic),
            self.config.retrieval.search_limit,
        )
        .await?;

        let mut session = QuizSession::new();
        session.start(topic, quiz, self.index.len())?;

        while let Some((i, question)) = session.current_question() {
            println!("\nQuestion {}: {}", i + 1, question.prompt);
            let choice = Select::new()
                .items(&question.options)
                .default(0)
                .interact()
                .map_err(|e| WorkflowError::Validation(e.to_string()))?;
            let label = sage_core::Label::ALL[choice];

            if let Some(completed) = session.submit(label)? {
                let report = sage_core::grade(&self.provider, completed, &mut self.store).await?;
                println!("\nscore: {:.0}%", report.score * 100.0);
                for line in &report.results {
                    println!("{line}");
                }
                println!("\n{}", report.feedback);
            }
        }
        session.finish();
        Ok(())
    }

    fn progress(&self) {
        let topics = self.store.topics();
        if topics.is_empty() {
            println!("no quizzes taken yet");
            return;
        }
        for topic in topics {
            if let Some(p) = self.store.get(topic) {
                println!(
                    "{topic}: {:.0}% ({} attempt(s))",
                    p.score * 100.0,
                    self.store.attempts(topic)
                );
            }
        }
    }

    fn clear(&mut self) {
        let removed = VectorIndex::clear(&self.config.retrieval.index_path);
        self.index = VectorIndex::new();
        if removed {
            println!("index cleared");
        } else {
            println!("nothing to clear");
        }
    }
}

fn print_workflow_error(e: &WorkflowError) {
    match e {
        WorkflowError::Llm(inner) => {
            println!("model call failed: {inner}\ncheck that Ollama is still running");
        }
        other => println!("{other}"),
    }
}
