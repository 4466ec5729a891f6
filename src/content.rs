//! Fixed question content: exactly six questions with four options each.
//!
//! The engine treats the deck as immutable input and indexes into it by
//! position; it never inspects option text.

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const QUESTION_COUNT: usize = 6;
pub const OPTION_COUNT: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("failed to read questions file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse questions file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("expected exactly 6 questions, got {0}")]
    QuestionCount(usize),

    #[error("question '{id}' has {got} options, expected exactly 4")]
    OptionCount { id: String, got: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<QuestionOption>,
}

/// The validated, ordered deck consumed by the state machine.
#[derive(Debug, Clone)]
pub struct QuestionDeck {
    questions: Vec<Question>,
}

impl QuestionDeck {
    /// Validate an arbitrary question list into a deck.
    pub fn new(questions: Vec<Question>) -> Result<Self, ContentError> {
        if questions.len() != QUESTION_COUNT {
            return Err(ContentError::QuestionCount(questions.len()));
        }
        for question in &questions {
            if question.options.len() != OPTION_COUNT {
                return Err(ContentError::OptionCount {
                    id: question.id.clone(),
                    got: question.options.len(),
                });
            }
        }
        Ok(Self { questions })
    }

    /// Load a deck from a JSON file holding `[{id, text, options: [{label}]}]`.
    pub async fn from_json_file(path: &Path) -> Result<Self, ContentError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let questions: Vec<Question> = serde_json::from_str(&raw)?;
        let deck = Self::new(questions)?;
        tracing::info!(path = %path.display(), "Loaded question deck");
        Ok(deck)
    }

    /// The built-in deck used when no questions file is configured.
    pub fn builtin() -> Self {
        let questions = vec![
            question(
                "q1",
                "What are they doing on a Friday at 11pm?",
                [
                    "Out, unreachable",
                    "Home watching something",
                    "Still working or studying",
                    "Depends on the mood, replies late",
                ],
            ),
            question(
                "q2",
                "Plans get cancelled on them. How do they react?",
                [
                    "Shrugs and makes another plan",
                    "Quietly furious",
                    "Grateful, goes to sleep",
                    "Asks for the gossip first",
                ],
            ),
            question(
                "q3",
                "In the group chat, they are the one who…",
                [
                    "Sends the memes",
                    "Never replies",
                    "Organizes everything",
                    "Only shows up for drama",
                ],
            ),
            question(
                "q4",
                "Lost in an unfamiliar street, they…",
                [
                    "Trust their gut (badly)",
                    "Use a map app and still get it wrong",
                    "Ask a stranger",
                    "Walk back the way they came",
                ],
            ),
            question(
                "q5",
                "Their real weakness is…",
                ["Food", "Their ego", "Pure laziness", "Their phone"],
            ),
            question(
                "q6",
                "When they make a decision, they usually…",
                [
                    "Overthink it",
                    "Act on impulse",
                    "Poll everyone they know",
                    "Do what they wanted all along",
                ],
            ),
        ];

        Self::new(questions).expect("built-in deck is well-formed")
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

fn question(id: &str, text: &str, labels: [&str; OPTION_COUNT]) -> Question {
    Question {
        id: id.to_string(),
        text: text.to_string(),
        options: labels
            .iter()
            .map(|label| QuestionOption {
                label: label.to_string(),
            })
            .collect(),
    }
}
