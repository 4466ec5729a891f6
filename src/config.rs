use std::path::PathBuf;
use std::time::Duration;

/// Default suspense delay before a round-2 vote result is revealed.
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(3000);

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the persisted game and audio records.
    pub data_dir: PathBuf,
    /// Delay between casting a round-2 vote and revealing its outcome.
    pub reveal_delay: Duration,
    /// Optional JSON file overriding the built-in question deck.
    pub questions_path: Option<PathBuf>,
    /// When true, correct round-2 guesses are tallied for the session and
    /// reported with each reveal.
    pub count_correct_votes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            reveal_delay: DEFAULT_REVEAL_DELAY,
            questions_path: None,
            count_correct_votes: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    ///
    /// - `VEREDICTO_DATA_DIR`: persistence directory (default `data`)
    /// - `VEREDICTO_REVEAL_MS`: reveal delay in milliseconds (default 3000)
    /// - `VEREDICTO_QUESTIONS`: path to a questions JSON file
    /// - `VEREDICTO_COUNT_CORRECT`: `1`/`true` to tally correct guesses
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let data_dir = std::env::var("VEREDICTO_DATA_DIR")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let reveal_delay = std::env::var("VEREDICTO_REVEAL_MS")
            .ok()
            .and_then(|s| match s.trim().parse::<u64>() {
                Ok(ms) => Some(Duration::from_millis(ms)),
                Err(_) => {
                    tracing::warn!(value = %s, "Ignoring unparsable VEREDICTO_REVEAL_MS");
                    None
                }
            })
            .unwrap_or(defaults.reveal_delay);

        let questions_path = std::env::var("VEREDICTO_QUESTIONS")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let count_correct_votes = std::env::var("VEREDICTO_COUNT_CORRECT")
            .map(|s| matches!(s.trim(), "1" | "true" | "yes"))
            .unwrap_or(defaults.count_correct_votes);

        Self {
            data_dir,
            reveal_delay,
            questions_path,
            count_correct_votes,
        }
    }
}
