//! File-backed persistence for the game and audio-preference records.
//!
//! One JSON file per storage key under a single data directory. The adapter
//! is deliberately forgiving: missing or corrupt data falls back to defaults
//! field by field, and I/O failures are logged and swallowed so a broken disk
//! degrades the session to in-memory state instead of ending it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::types::GameState;

const GAME_FILE: &str = "game.json";
const AUDIO_FILE: &str = "audio.json";

/// Persisted preference of the (out-of-scope) audio collaborator. Stored
/// here only because `wipe` must clear it together with the game record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AudioPrefs {
    pub muted: bool,
}

#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// Open a store over the given directory, creating it best-effort.
    pub async fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            tracing::warn!(dir = %dir.display(), error = %e, "Could not create data dir; persistence disabled");
        }
        Self { dir }
    }

    fn game_path(&self) -> PathBuf {
        self.dir.join(GAME_FILE)
    }

    fn audio_path(&self) -> PathBuf {
        self.dir.join(AUDIO_FILE)
    }

    /// Load the persisted game record, falling back to the default state when
    /// the file is absent or unreadable, and coercing individual wrong-typed
    /// fields to their defaults when it parses but disagrees with the schema.
    pub async fn load(&self) -> GameState {
        let raw = match tokio::fs::read_to_string(self.game_path()).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return GameState::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read game record; starting fresh");
                return GameState::default();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => coerce_state(value),
            Err(e) => {
                tracing::warn!(error = %e, "Game record is not valid JSON; starting fresh");
                GameState::default()
            }
        }
    }

    /// Write-through save of the whole game record.
    pub async fn save(&self, state: &GameState) {
        let json = match serde_json::to_string(state) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Could not serialize game state");
                return;
            }
        };
        if let Err(e) = tokio::fs::write(self.game_path(), json).await {
            tracing::warn!(error = %e, "Could not persist game state; continuing in memory");
        }
    }

    pub async fn load_audio_prefs(&self) -> AudioPrefs {
        match tokio::fs::read_to_string(self.audio_path()).await {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => AudioPrefs::default(),
        }
    }

    pub async fn save_audio_prefs(&self, prefs: &AudioPrefs) {
        let json = match serde_json::to_string(prefs) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Could not serialize audio prefs");
                return;
            }
        };
        if let Err(e) = tokio::fs::write(self.audio_path(), json).await {
            tracing::warn!(error = %e, "Could not persist audio prefs");
        }
    }

    /// Delete both persisted records. Missing files are not an error.
    pub async fn wipe(&self) {
        for path in [self.game_path(), self.audio_path()] {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "Could not delete record");
                }
            }
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Rebuild a `GameState` from a parsed JSON value, coercing each top-level
/// field to its default independently when it fails its type check.
fn coerce_state(value: Value) -> GameState {
    let Value::Object(mut map) = value else {
        tracing::warn!("Game record is not a JSON object; starting fresh");
        return GameState::default();
    };

    let mut field = |name: &str| map.remove(name);

    GameState {
        players: field("players")
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default(),
        phase: field("phase")
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default(),
        round1: field("round1")
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default(),
        round2: field("round2")
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default(),
    }
}
