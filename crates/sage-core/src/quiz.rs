//! Parses model-generated quiz text into a validated question model.
//!
//! The wire format is fixed by the quiz prompt: a `Question N:` header,
//! four `A)`..`D)` option lines, and an `ANSWER: <letter>` line per
//! question. Questions that violate the shape are dropped with a warning;
//! a batch where nothing survives is malformed.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::WorkflowError;

static QUESTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Question \d+:\s*").expect("valid regex"));
static OPTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-D])\)").expect("valid regex"));

/// An answer label. Exactly four per question, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    A,
    B,
    C,
    D,
}

impl Label {
    pub const ALL: [Self; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Parse a label token, tolerating trailing punctuation the model
    /// sometimes emits (`C)`, `C.`).
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().trim_end_matches([')', '.', ':']) {
            "A" | "a" => Some(Self::A),
            "B" | "b" => Some(Self::B),
            "C" | "c" => Some(Self::C),
            "D" | "d" => Some(Self::D),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        };
        write!(f, "{c}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub prompt: String,
    /// Option lines verbatim, labels `A)`..`D)` in order.
    pub options: Vec<String>,
    pub answer: Label,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    pub questions: Vec<Question>,
}

impl Quiz {
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn answers(&self) -> Vec<Label> {
        self.questions.iter().map(|q| q.answer).collect()
    }

    /// Question blocks separated by blank lines, answers omitted.
    #[must_use]
    pub fn display(&self) -> String {
        self.questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                format!("Question {}: {}\n{}", i + 1, q.prompt, q.options.join("\n"))
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[derive(Debug, Default)]
struct Draft {
    prompt: String,
    options: Vec<String>,
    answer: Option<Label>,
}

impl Draft {
    /// A draft survives only with four options labeled A-D in order and
    /// exactly one recorded answer.
    fn validate(self) -> Option<Question> {
        let labels: Vec<Option<Label>> = self
            .options
            .iter()
            .map(|o| OPTION_LINE.captures(o).and_then(|c| Label::parse(&c[1])))
            .collect();
        let well_labeled = self.options.len() == 4
            && labels
                .iter()
                .zip(Label::ALL)
                .all(|(found, expected)| *found == Some(expected));

        match (well_labeled, self.answer) {
            (true, Some(answer)) => Some(Question {
                prompt: self.prompt,
                options: self.options,
                answer,
            }),
            _ => {
                tracing::warn!(
                    prompt = %self.prompt,
                    options = self.options.len(),
                    has_answer = self.answer.is_some(),
                    "dropping malformed quiz question"
                );
                None
            }
        }
    }
}

/// # Errors
///
/// Returns [`WorkflowError::MalformedQuiz`] when no well-formed question
/// can be recovered from the text.
pub fn parse_quiz(text: &str) -> Result<Quiz, WorkflowError> {
    let mut questions = Vec::new();
    let mut current: Option<Draft> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if QUESTION_HEADER.is_match(line) {
            if let Some(draft) = current.take() {
                questions.extend(draft.validate());
            }
            current = Some(Draft {
                prompt: QUESTION_HEADER.replace(line, "").trim().to_owned(),
                ..Draft::default()
            });
        } else if OPTION_LINE.is_match(line) {
            if let Some(draft) = current.as_mut() {
                draft.options.push(line.to_owned());
            }
        } else if let Some(rest) = line.split("ANSWER:").nth(1) {
            if let Some(draft) = current.as_mut() {
                if draft.answer.is_none() {
                    draft.answer = Label::parse(rest);
                }
            }
        }
    }
    if let Some(draft) = current.take() {
        questions.extend(draft.validate());
    }

    if questions.is_empty() {
        return Err(WorkflowError::MalformedQuiz);
    }
    tracing::debug!(questions = questions.len(), "quiz parsed");
    Ok(Quiz { questions })
}
