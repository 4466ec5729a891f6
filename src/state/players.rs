//! Roster operations, legal only while round 1 has not been built.

use super::{AppState, CommandResult, Rejected};

/// Maximum display-name length in characters after cleanup.
const MAX_NAME_CHARS: usize = 20;

/// Trim, collapse internal whitespace, cap the length.
pub(crate) fn clean_name(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_NAME_CHARS).collect()
}

impl AppState {
    /// Add a player during setup. Names are cleaned first and must be unique
    /// case-insensitively.
    pub async fn add_player(&self, raw_name: &str) -> CommandResult {
        let name = clean_name(raw_name);
        if name.is_empty() {
            return Err(Rejected::InvalidName);
        }

        let snapshot = {
            let mut state = self.state.write().await;
            if state.round1.is_some() {
                return Err(Rejected::RosterLocked);
            }
            let lowered = name.to_lowercase();
            if state.players.iter().any(|p| p.to_lowercase() == lowered) {
                return Err(Rejected::DuplicateName);
            }

            state.players.push(name.clone());
            state.clone()
        };

        tracing::info!(player = %name, "Player added");
        self.commit(&snapshot).await;
        Ok(())
    }

    /// Remove a player during setup. Rejected once round 1 exists so pairings
    /// and answer sets cannot dangle.
    pub async fn remove_player(&self, name: &str) -> CommandResult {
        let snapshot = {
            let mut state = self.state.write().await;
            if state.round1.is_some() {
                return Err(Rejected::RosterLocked);
            }
            if !state.has_player(name) {
                return Err(Rejected::UnknownPlayer);
            }

            state.players.retain(|p| p != name);
            state.clone()
        };

        tracing::info!(player = %name, "Player removed");
        self.commit(&snapshot).await;
        Ok(())
    }
}
