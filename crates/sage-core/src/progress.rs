//! Per-topic quiz performance, kept in memory for the session.

use std::collections::HashMap;

use crate::quiz::Label;

/// Outcome of the latest quiz on a topic. Repeats on the same topic
/// overwrite the record; the attempt counter survives the overwrite.
#[derive(Debug, Clone)]
pub struct TopicProgress {
    pub topic: String,
    /// Fraction correct, 0.0 to 1.0.
    pub score: f64,
    pub answers: Vec<Label>,
    pub correct: Vec<Label>,
    /// Question prompts from the graded quiz, fed back into later quiz
    /// generation so the model avoids repeating them.
    pub questions: Vec<String>,
    pub feedback: String,
}

/// Keyed by exact topic string, case-sensitive, last write wins.
#[derive(Debug, Default)]
pub struct ProgressStore {
    records: HashMap<String, TopicProgress>,
    attempts: HashMap<String, usize>,
}

impl ProgressStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, progress: TopicProgress) {
        *self.attempts.entry(progress.topic.clone()).or_insert(0) += 1;
        tracing::info!(topic = %progress.topic, score = progress.score, "progress recorded");
        self.records.insert(progress.topic.clone(), progress);
    }

    #[must_use]
    pub fn get(&self, topic: &str) -> Option<&TopicProgress> {
        self.records.get(topic)
    }

    #[must_use]
    pub fn attempts(&self, topic: &str) -> usize {
        self.attempts.get(topic).copied().unwrap_or(0)
    }

    /// Topics quizzed so far, sorted for stable display.
    #[must_use]
    pub fn topics(&self) -> Vec<&str> {
        let mut topics: Vec<&str> = self.records.keys().map(String::as_str).collect();
        topics.sort_unstable();
        topics
    }

    /// Question prompts previously seen for a topic, newline-joined for the
    /// quiz prompt. Empty string when the topic is new.
    #[must_use]
    pub fn previous_questions(&self, topic: &str) -> String {
        self.records
            .get(topic)
            .map(|p| p.questions.join("\n"))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(topic: &str, score: f64, questions: &[&str]) -> TopicProgress {
        TopicProgress {
            topic: topic.into(),
            score,
            answers: vec![Label::A],
            correct: vec![Label::A],
            questions: questions.iter().map(|&q| q.into()).collect(),
            feedback: String::new(),
        }
    }

    #[test]
    fn same_topic_overwrites_but_counts_attempts() {
        let mut store = ProgressStore::new();
        store.record(progress("cells", 0.4, &["q1"]));
        store.record(progress("cells", 0.8, &["q2"]));

        let p = store.get("cells").unwrap();
        assert!((p.score - 0.8).abs() < f64::EPSILON);
        assert_eq!(store.attempts("cells"), 2);
        assert_eq!(store.topics(), vec!["cells"]);
    }

    #[test]
    fn topic_keys_are_case_sensitive() {
        let mut store = ProgressStore::new();
        store.record(progress("Cells", 1.0, &[]));
        assert!(store.get("cells").is_none());
        assert_eq!(store.attempts("cells"), 0);
    }

    #[test]
    fn previous_questions_joined_by_newline() {
        let mut store = ProgressStore::new();
        store.record(progress("cells", 0.5, &["What is mitosis?", "What is meiosis?"]));
        assert_eq!(
            store.previous_questions("cells"),
            "What is mitosis?\nWhat is meiosis?"
        );
        assert_eq!(store.previous_questions("unknown"), "");
    }
}
