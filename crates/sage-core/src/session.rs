//! The one-question-at-a-time quiz interaction state machine.

use crate::error::WorkflowError;
use crate::quiz::{Label, Question, Quiz};

/// Everything grading needs. Held by the session until grading succeeds.
#[derive(Debug, Clone)]
pub struct CompletedQuiz {
    pub topic: String,
    pub quiz: Quiz,
    pub answers: Vec<Label>,
}

/// Idle until a quiz starts; Collecting while answers come in; Complete
/// once the last answer is recorded. The session keeps the completed quiz
/// until [`QuizSession::finish`], so a failed grading call loses nothing
/// and can be retried.
#[derive(Debug, Default)]
pub enum QuizSession {
    #[default]
    Idle,
    Collecting {
        topic: String,
        quiz: Quiz,
        answers: Vec<Label>,
    },
    Complete(CompletedQuiz),
}

impl QuizSession {
    #[must_use]
    pub fn new() -> Self {
        Self::Idle
    }

    /// Begin collecting answers for a freshly generated quiz. Starting over
    /// an in-flight or ungraded quiz discards it.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Validation`] for an empty topic, an empty
    /// index, or an empty quiz; the session state is unchanged.
    pub fn start(
        &mut self,
        topic: &str,
        quiz: Quiz,
        index_len: usize,
    ) -> Result<(), WorkflowError> {
        if topic.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "enter a topic before starting a quiz".into(),
            ));
        }
        if index_len == 0 {
            return Err(WorkflowError::Validation(
                "no document indexed yet, upload one first".into(),
            ));
        }
        if quiz.is_empty() {
            return Err(WorkflowError::Validation("quiz has no questions".into()));
        }
        tracing::info!(topic, questions = quiz.len(), "quiz started");
        *self = Self::Collecting {
            topic: topic.trim().to_owned(),
            quiz,
            answers: Vec::new(),
        };
        Ok(())
    }

    /// The question awaiting an answer, with its 0-based position.
    #[must_use]
    pub fn current_question(&self) -> Option<(usize, &Question)> {
        match self {
            Self::Idle | Self::Complete(_) => None,
            Self::Collecting { quiz, answers, .. } => {
                quiz.questions.get(answers.len()).map(|q| (answers.len(), q))
            }
        }
    }

    /// Record one answer. Returns the completed quiz when it was the last
    /// one; the session stays Complete until [`QuizSession::finish`].
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Validation`] when no quiz is collecting
    /// answers.
    pub fn submit(&mut self, label: Label) -> Result<Option<&CompletedQuiz>, WorkflowError> {
        let (topic, quiz, mut answers) = match std::mem::take(self) {
            Self::Idle => {
                return Err(WorkflowError::Validation("no quiz in progress".into()));
            }
            Self::Complete(done) => {
                *self = Self::Complete(done);
                return Err(WorkflowError::Validation(
                    "quiz already answered, awaiting grading".into(),
                ));
            }
            Self::Collecting {
                topic,
                quiz,
                answers,
            } => (topic, quiz, answers),
        };

        answers.push(label);
        if answers.len() < quiz.len() {
            *self = Self::Collecting {
                topic,
                quiz,
                answers,
            };
            return Ok(None);
        }
        tracing::info!(topic = %topic, "quiz complete");
        *self = Self::Complete(CompletedQuiz {
            topic,
            quiz,
            answers,
        });
        Ok(self.completed())
    }

    /// The completed quiz awaiting grading, if any.
    #[must_use]
    pub fn completed(&self) -> Option<&CompletedQuiz> {
        match self {
            Self::Complete(done) => Some(done),
            _ => None,
        }
    }

    /// Drop the completed quiz once grading has succeeded.
    pub fn finish(&mut self) {
        *self = Self::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::parse_quiz;

    fn two_question_quiz() -> Quiz {
        parse_quiz(
            "Question 1: one?\nA) a\nB) b\nC) c\nD) d\nANSWER: A\n\
             Question 2: two?\nA) a\nB) b\nC) c\nD) d\nANSWER: C",
        )
        .unwrap()
    }

    #[test]
    fn start_rejects_blank_topic() {
        let mut session = QuizSession::new();
        let err = session.start("   ", two_question_quiz(), 5).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert!(matches!(session, QuizSession::Idle));
    }

    #[test]
    fn start_rejects_empty_index() {
        let mut session = QuizSession::new();
        let err = session.start("cells", two_question_quiz(), 0).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[test]
    fn submit_while_idle_is_rejected() {
        let mut session = QuizSession::new();
        assert!(matches!(
            session.submit(Label::A),
            Err(WorkflowError::Validation(_))
        ));
    }

    #[test]
    fn collects_answers_then_completes() {
        let mut session = QuizSession::new();
        session.start("cells", two_question_quiz(), 5).unwrap();

        let (i, q) = session.current_question().unwrap();
        assert_eq!(i, 0);
        assert_eq!(q.prompt, "one?");

        assert!(session.submit(Label::A).unwrap().is_none());
        let (i, _) = session.current_question().unwrap();
        assert_eq!(i, 1);

        let done = session.submit(Label::B).unwrap().unwrap();
        assert_eq!(done.topic, "cells");
        assert_eq!(done.answers, vec![Label::A, Label::B]);
        assert_eq!(done.quiz.answers(), vec![Label::A, Label::C]);

        assert!(session.current_question().is_none());
        session.finish();
        assert!(matches!(session, QuizSession::Idle));
    }

    #[test]
    fn completed_answers_survive_until_finish() {
        let mut session = QuizSession::new();
        session.start("cells", two_question_quiz(), 5).unwrap();
        session.submit(Label::A).unwrap();
        session.submit(Label::B).unwrap();

        // a failed grading call leaves the result in place for a retry
        assert_eq!(session.completed().unwrap().topic, "cells");
        assert!(matches!(
            session.submit(Label::C),
            Err(WorkflowError::Validation(_))
        ));
        assert_eq!(session.completed().unwrap().answers.len(), 2);

        session.finish();
        assert!(session.completed().is_none());
    }

    #[test]
    fn restart_discards_in_flight_quiz() {
        let mut session = QuizSession::new();
        session.start("cells", two_question_quiz(), 5).unwrap();
        session.submit(Label::A).unwrap();

        session.start("plants", two_question_quiz(), 5).unwrap();
        let (i, _) = session.current_question().unwrap();
        assert_eq!(i, 0);
    }
}
