//! The message surface between the engine and its presentation collaborator.
//!
//! `Command` carries user intents into the state machine; `Update` is pushed
//! out on the broadcast channel after successful mutations. Both are
//! serde-tagged so a front-end can speak JSON if it wants to.

use serde::{Deserialize, Serialize};

/// A discrete user intent. Every variant maps to one guarded transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum Command {
    AddPlayer { name: String },
    RemovePlayer { name: String },
    StartRound1,
    /// The active judge confirms they are alone with the device; reveals
    /// their target and enters the questionnaire.
    ConfirmJudge,
    SelectAnswer { option: u8 },
    PrevQuestion,
    NextQuestion,
    AdvanceTurn,
    StartRound2,
    /// Guess which player the current case belongs to.
    Vote { guess: String },
    NextCase,
    RestartRound2,
    /// Delete all persisted records and reset to defaults.
    Wipe,
}

/// Notification pushed to subscribed collaborators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum Update {
    /// The state mutated; re-render from a fresh snapshot.
    StateChanged,
    /// Advancing past the final turn closed round 1.
    Round1Finished,
    /// The suspense timer for a round-2 vote fired.
    VoteRevealed {
        target: String,
        guess: String,
        correct: bool,
        is_last: bool,
        /// Running tally of correct guesses; present only when vote
        /// counting is enabled in the configuration.
        correct_total: Option<u32>,
    },
    /// All persisted records were deleted and the state reset.
    Wiped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_round_trip_as_tagged_json() {
        let cmd = Command::Vote {
            guess: "Ana".to_string(),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"t\":\"vote\""));
        assert_eq!(serde_json::from_str::<Command>(&json).unwrap(), cmd);

        let json = serde_json::to_string(&Command::StartRound1).unwrap();
        assert!(json.contains("start_round1"));
    }

    #[test]
    fn updates_round_trip_as_tagged_json() {
        let update = Update::VoteRevealed {
            target: "Ana".to_string(),
            guess: "Beto".to_string(),
            correct: false,
            is_last: true,
            correct_total: None,
        };
        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains("\"t\":\"vote_revealed\""));
        assert_eq!(serde_json::from_str::<Update>(&json).unwrap(), update);
    }
}
