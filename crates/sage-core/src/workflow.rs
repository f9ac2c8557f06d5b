//! Stateless request handlers: retrieve, assemble context, fill the
//! template, call the model. Provider failures abort only the in-flight
//! request; no state is touched until a workflow succeeds.

use sage_llm::{LlmProvider, provider::Message};
use sage_memory::{ScoredChunk, VectorIndex};

use crate::context;
use crate::error::WorkflowError;
use crate::progress::{ProgressStore, TopicProgress};
use crate::prompts;
use crate::quiz::{self, Label, Quiz};
use crate::session::CompletedQuiz;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    QuestionAnswer,
    Summarize,
    Quiz,
}

/// Keyword fallback for when the user has not picked a mode explicitly.
/// First match wins; not authoritative.
#[must_use]
pub fn classify(question: &str) -> Workflow {
    let q = question.to_lowercase();
    if q.contains("summarize") || q.contains("summary") {
        Workflow::Summarize
    } else if q.contains("quiz") || q.contains("test me") {
        Workflow::Quiz
    } else {
        Workflow::QuestionAnswer
    }
}

/// Strip the classifier's leading trigger phrase so the remainder can
/// serve as a retrieval topic ("quiz me on mitosis" -> "mitosis"). Trigger
/// words inside the topic itself are kept.
#[must_use]
pub fn extract_topic(question: &str) -> String {
    let mut words = question.split_whitespace().peekable();
    while let Some(word) = words.peek() {
        let w = word
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if matches!(w.as_str(), "summarize" | "summary" | "quiz" | "test" | "me" | "on" | "about") {
            words.next();
        } else {
            break;
        }
    }
    words.collect::<Vec<_>>().join(" ")
}

async fn retrieve(
    index: &VectorIndex,
    provider: &impl LlmProvider,
    query: &str,
    limit: usize,
) -> Result<Vec<ScoredChunk>, WorkflowError> {
    let vector = provider.embed(query).await?;
    Ok(index.search(&vector, limit))
}

/// Answer a question from the indexed material. Returns the raw model
/// text; citation markup is transported verbatim.
///
/// # Errors
///
/// Returns [`WorkflowError::Llm`] if embedding or chat fails.
pub async fn answer(
    index: &VectorIndex,
    provider: &impl LlmProvider,
    question: &str,
    search_limit: usize,
) -> Result<String, WorkflowError> {
    let hits = retrieve(index, provider, question, search_limit).await?;
    let prompt = prompts::qa(&context::assemble(&hits), question);
    Ok(provider.chat(&[Message::user(prompt)]).await?)
}

/// # Errors
///
/// Returns [`WorkflowError::Llm`] if embedding or chat fails.
pub async fn summarize(
    index: &VectorIndex,
    provider: &impl LlmProvider,
    topic: &str,
    search_limit: usize,
) -> Result<String, WorkflowError> {
    let hits = retrieve(index, provider, topic, search_limit).await?;
    let prompt = prompts::summarize(&context::assemble(&hits), topic);
    Ok(provider.chat(&[Message::user(prompt)]).await?)
}

/// Generate and parse a quiz on a topic. Previously seen question prompts
/// are passed along so the model avoids repeats.
///
/// # Errors
///
/// Returns [`WorkflowError::Llm`] on provider failure and
/// [`WorkflowError::MalformedQuiz`] when the response parses to nothing.
pub async fn generate_quiz(
    index: &VectorIndex,
    provider: &impl LlmProvider,
    topic: &str,
    num_questions: usize,
    previous_questions: &str,
    search_limit: usize,
) -> Result<Quiz, WorkflowError> {
    let hits = retrieve(index, provider, topic, search_limit).await?;
    let prompt = prompts::quiz(
        &context::assemble(&hits),
        topic,
        num_questions,
        previous_questions,
    );
    let response = provider.chat(&[Message::user(prompt)]).await?;
    quiz::parse_quiz(&response)
}

/// Fraction of matching answers. Zip truncates to the shorter side; a
/// length mismatch is a data integrity warning, not an error.
///
/// # Errors
///
/// Returns [`WorkflowError::Validation`] when `correct` is empty.
pub fn score(user: &[Label], correct: &[Label]) -> Result<f64, WorkflowError> {
    if correct.is_empty() {
        return Err(WorkflowError::Validation(
            "cannot grade a quiz with no answer key".into(),
        ));
    }
    if user.len() != correct.len() {
        tracing::warn!(
            user = user.len(),
            correct = correct.len(),
            "answer count mismatch, grading the overlap"
        );
    }
    let matches = user.iter().zip(correct).filter(|(u, c)| u == c).count();
    #[allow(clippy::cast_precision_loss)]
    let score = matches as f64 / correct.len() as f64;
    Ok(score)
}

fn result_lines(user: &[Label], correct: &[Label]) -> Vec<String> {
    user.iter()
        .zip(correct)
        .enumerate()
        .map(|(i, (u, c))| {
            let mark = if u == c { '\u{2713}' } else { '\u{2717}' };
            format!("Q{}: {mark} - You answered {u}, Correct: {c}", i + 1)
        })
        .collect()
}

#[derive(Debug)]
pub struct GradeReport {
    pub score: f64,
    pub results: Vec<String>,
    pub feedback: String,
}

/// Grade a completed quiz: compute the score, ask the model for feedback,
/// and write the topic's progress record. Borrows the quiz so a failed
/// call leaves the session free to retry.
///
/// # Errors
///
/// Returns [`WorkflowError::Validation`] for an empty answer key and
/// [`WorkflowError::Llm`] when the feedback call fails; the progress store
/// is only written on success.
pub async fn grade(
    provider: &impl LlmProvider,
    completed: &CompletedQuiz,
    store: &mut ProgressStore,
) -> Result<GradeReport, WorkflowError> {
    let correct = completed.quiz.answers();
    let score = score(&completed.answers, &correct)?;
    let results = result_lines(&completed.answers, &correct);

    let student_progress = format!(
        "topics covered: {}\nattempts on \"{}\": {}",
        store.topics().join(", "),
        completed.topic,
        store.attempts(&completed.topic) + 1,
    );
    let prompt = prompts::grade(
        &results.join("\n"),
        &completed.topic,
        &student_progress,
        &completed.quiz.display(),
    );
    let feedback = provider.chat(&[Message::user(prompt)]).await?;

    store.record(TopicProgress {
        topic: completed.topic.clone(),
        score,
        answers: completed.answers.clone(),
        correct,
        questions: completed
            .quiz
            .questions
            .iter()
            .map(|q| q.prompt.clone())
            .collect(),
        feedback: feedback.clone(),
    });

    Ok(GradeReport {
        score,
        results,
        feedback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sage_llm::mock::MockProvider;
    use sage_memory::{Chunk, ChunkKind};

    async fn indexed(texts: &[&str]) -> VectorIndex {
        let provider = MockProvider::with_hashed_embeddings();
        let chunks: Vec<Chunk> = texts
            .iter()
            .enumerate()
            .map(|(i, &t)| {
                Chunk::new(
                    t,
                    "notes.pdf",
                    ChunkKind::Page {
                        number: u32::try_from(i + 1).unwrap(),
                    },
                )
            })
            .collect();
        let embed = sage_llm::provider::embed_fn(&provider);
        VectorIndex::build(chunks, &embed).await.unwrap()
    }

    #[test]
    fn classify_first_match_wins() {
        assert_eq!(classify("Please summarize chapter 2"), Workflow::Summarize);
        assert_eq!(classify("give me a SUMMARY"), Workflow::Summarize);
        assert_eq!(classify("quiz me on mitosis"), Workflow::Quiz);
        assert_eq!(classify("test me about cells"), Workflow::Quiz);
        assert_eq!(classify("what is mitosis?"), Workflow::QuestionAnswer);
        // summarize beats quiz when both appear
        assert_eq!(classify("summarize the quiz topics"), Workflow::Summarize);
    }

    #[test]
    fn extract_topic_strips_leading_triggers() {
        assert_eq!(extract_topic("quiz me on mitosis"), "mitosis");
        assert_eq!(extract_topic("summarize cell division"), "cell division");
        assert_eq!(extract_topic("Test me about the Krebs cycle"), "the Krebs cycle");
    }

    #[test]
    fn extract_topic_keeps_trigger_words_inside_topic() {
        assert_eq!(
            extract_topic("quiz me on the chi-squared test"),
            "the chi-squared test"
        );
        assert_eq!(
            extract_topic("summarize the summary chapter"),
            "the summary chapter"
        );
    }

    #[test]
    fn score_two_of_three() {
        let user = [Label::A, Label::B, Label::C];
        let correct = [Label::A, Label::C, Label::C];
        let s = score(&user, &correct).unwrap();
        assert!((s - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn score_boundaries_and_idempotence() {
        let all = [Label::A, Label::D];
        assert!((score(&all, &all).unwrap() - 1.0).abs() < f64::EPSILON);
        let none = [Label::B, Label::A];
        assert!(score(&none, &all).unwrap().abs() < f64::EPSILON);
        assert_eq!(
            score(&all, &none).unwrap().to_bits(),
            score(&all, &none).unwrap().to_bits()
        );
    }

    #[test]
    fn score_rejects_empty_answer_key() {
        assert!(matches!(
            score(&[Label::A], &[]),
            Err(WorkflowError::Validation(_))
        ));
    }

    #[test]
    fn score_mismatched_lengths_use_overlap() {
        let s = score(&[Label::A], &[Label::A, Label::B]).unwrap();
        assert!((s - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn answer_sends_context_and_returns_model_text() {
        let index = indexed(&["Mitosis is cell division."]).await;
        let provider = MockProvider::with_responses(vec!["<h2>Mitosis</h2> ...".into()]);

        let text = answer(&index, &provider, "What is mitosis?", 10)
            .await
            .unwrap();
        assert_eq!(text, "<h2>Mitosis</h2> ...");

        let sent = provider.last_messages();
        assert!(sent[0].content.contains("Mitosis is cell division."));
        assert!(sent[0].content.contains("[From Page 1 in notes.pdf]"));
        assert!(sent[0].content.contains("What is mitosis?"));
    }

    #[tokio::test]
    async fn generate_quiz_parses_model_output() {
        let index = indexed(&["Mitosis has phases."]).await;
        let provider = MockProvider::with_responses(vec![
            "Question 1: How many phases?\nA) 1\nB) 2\nC) 3\nD) 4\nANSWER: D".into(),
        ]);

        let quiz = generate_quiz(&index, &provider, "mitosis", 1, "", 10)
            .await
            .unwrap();
        assert_eq!(quiz.len(), 1);
        assert_eq!(quiz.answers(), vec![Label::D]);
    }

    #[tokio::test]
    async fn generate_quiz_malformed_response_errors() {
        let index = indexed(&["content"]).await;
        let provider = MockProvider::with_responses(vec!["Sorry, I cannot do that.".into()]);

        assert!(matches!(
            generate_quiz(&index, &provider, "mitosis", 1, "", 10).await,
            Err(WorkflowError::MalformedQuiz)
        ));
    }

    #[tokio::test]
    async fn provider_failure_aborts_without_state_change() {
        let index = indexed(&["content"]).await;
        let provider = MockProvider::failing();

        assert!(matches!(
            answer(&index, &provider, "anything", 10).await,
            Err(WorkflowError::Llm(_))
        ));
    }

    #[tokio::test]
    async fn grade_writes_progress_and_reports() {
        let quiz = crate::quiz::parse_quiz(
            "Question 1: one?\nA) a\nB) b\nC) c\nD) d\nANSWER: A\n\
             Question 2: two?\nA) a\nB) b\nC) c\nD) d\nANSWER: C",
        )
        .unwrap();
        let completed = CompletedQuiz {
            topic: "cells".into(),
            quiz,
            answers: vec![Label::A, Label::B],
        };
        let provider =
            MockProvider::with_responses(vec!["<h2>Quiz Results Analysis</h2> ok".into()]);
        let mut store = ProgressStore::new();

        let report = grade(&provider, &completed, &mut store).await.unwrap();
        assert!((report.score - 0.5).abs() < f64::EPSILON);
        assert_eq!(report.results.len(), 2);
        assert!(report.results[0].contains('\u{2713}'));
        assert!(report.results[1].contains('\u{2717}'));

        let saved = store.get("cells").unwrap();
        assert!((saved.score - 0.5).abs() < f64::EPSILON);
        assert_eq!(saved.questions, vec!["one?", "two?"]);
        assert_eq!(store.attempts("cells"), 1);
    }

    #[tokio::test]
    async fn grade_feedback_failure_leaves_store_untouched() {
        let quiz = crate::quiz::parse_quiz(
            "Question 1: one?\nA) a\nB) b\nC) c\nD) d\nANSWER: A",
        )
        .unwrap();
        let completed = CompletedQuiz {
            topic: "cells".into(),
            quiz,
            answers: vec![Label::A],
        };
        let provider = MockProvider::failing();
        let mut store = ProgressStore::new();

        assert!(grade(&provider, &completed, &mut store).await.is_err());
        assert!(store.get("cells").is_none());
        // the completed quiz is untouched and can be regraded
        assert_eq!(completed.answers, vec![Label::A]);
    }
}
