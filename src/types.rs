use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::content::QUESTION_COUNT;

/// Outer phase of the game. Wire values match the persisted record
/// ("setup", "turn", "questions", "doneTurn", "round2").
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    #[default]
    Setup,
    Turn,
    Questions,
    DoneTurn,
    Round2,
}

/// One judge/target assignment for round 1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pairing {
    pub judge: String,
    pub target: String,
}

/// A target's recorded answers: one slot per question, `None` until answered,
/// otherwise the zero-based option index.
pub type AnswerSet = Vec<Option<u8>>;

/// True iff the set has a slot for every question and none is empty.
pub fn answer_set_complete(answers: &AnswerSet) -> bool {
    answers.len() == QUESTION_COUNT && answers.iter().all(|slot| slot.is_some())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Round1State {
    /// Shuffled permutation of judge indices; one turn per entry.
    pub order: Vec<usize>,
    pub pairs: Vec<Pairing>,
    /// Keyed by target name; entries are created lazily on first answer.
    pub answers_by_target: HashMap<String, AnswerSet>,
    pub current_turn_index: usize,
    pub current_question_index: usize,
    /// Whether the active judge currently sees who their target is.
    pub show_target: bool,
}

impl Round1State {
    /// The pairing whose judge is on turn right now.
    pub fn current_pair(&self) -> Option<&Pairing> {
        let judge_index = *self.order.get(self.current_turn_index)?;
        self.pairs.get(judge_index)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Round2State {
    /// Shuffled player names; each is one "case" to guess.
    pub case_order: Vec<String>,
    pub case_index: usize,
    /// Targets whose case has already been voted on.
    pub answered: HashMap<String, bool>,
}

impl Round2State {
    pub fn current_case(&self) -> Option<&str> {
        self.case_order.get(self.case_index).map(String::as_str)
    }

    pub fn is_answered(&self, target: &str) -> bool {
        self.answered.get(target).copied().unwrap_or(false)
    }

    pub fn is_last_case(&self) -> bool {
        self.case_index + 1 >= self.case_order.len()
    }
}

/// The aggregate root. This is the sole unit of persistence and the single
/// value the state machine mutates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GameState {
    pub players: Vec<String>,
    pub phase: GamePhase,
    pub round1: Option<Round1State>,
    pub round2: Option<Round2State>,
}

impl GameState {
    /// True iff round 1 exists and every current player has a complete
    /// answer set recorded as target. Recomputed on every call.
    pub fn is_round1_complete(&self) -> bool {
        let Some(round1) = &self.round1 else {
            return false;
        };
        self.players.iter().all(|target| {
            round1
                .answers_by_target
                .get(target)
                .is_some_and(answer_set_complete)
        })
    }

    /// Number of players whose answer set is complete, for progress display.
    pub fn completion_count(&self) -> usize {
        let Some(round1) = &self.round1 else {
            return 0;
        };
        self.players
            .iter()
            .filter(|target| {
                round1
                    .answers_by_target
                    .get(*target)
                    .is_some_and(answer_set_complete)
            })
            .count()
    }

    pub fn has_player(&self, name: &str) -> bool {
        self.players.iter().any(|p| p == name)
    }
}
