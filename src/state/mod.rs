//! The phase state machine: single writer over the shared [`GameState`].
//!
//! All mutations flow through [`AppState::dispatch`]. A guard that fails
//! rejects the command and leaves the state untouched; an accepted command
//! mutates, persists write-through, and broadcasts an [`Update`] so
//! collaborators re-render. Rejections are ordinary return values, never
//! panics.

mod players;
mod round1;
mod round2;

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::content::QuestionDeck;
use crate::protocol::{Command, Update};
use crate::store::StateStore;
use crate::types::{GamePhase, GameState};

/// Why a command was not applied. One variant per guard class.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Rejected {
    #[error("not allowed while the game is in the {0:?} phase")]
    WrongPhase(GamePhase),

    #[error("the player roster is locked once round 1 exists")]
    RosterLocked,

    #[error("player name is empty after cleanup")]
    InvalidName,

    #[error("player name is already taken")]
    DuplicateName,

    #[error("no such player")]
    UnknownPlayer,

    #[error("at least two players are required")]
    NotEnoughPlayers,

    #[error("round 1 has already been built")]
    Round1Exists,

    #[error("round 1 is not complete yet")]
    Round1Incomplete,

    #[error("the phase says a round is running but none exists")]
    NoActiveRound,

    #[error("option index out of range")]
    InvalidOption,

    #[error("the current question has no answer yet")]
    Unanswered,

    #[error("already at the first question")]
    AtFirstQuestion,

    #[error("this case has already been voted on")]
    AlreadyVoted,

    #[error("a reveal is pending; wait for it to fire")]
    RevealPending,
}

pub type CommandResult = Result<(), Rejected>;

/// Token for a scheduled round-2 reveal. Held while the suspense timer runs;
/// the handle exists so a wipe (process-teardown semantics) can abort it.
pub(crate) struct PendingReveal {
    pub(crate) seq: u64,
    pub(crate) handle: JoinHandle<()>,
}

/// Shared engine state: the one writer of [`GameState`].
pub struct AppState {
    pub(crate) state: RwLock<GameState>,
    pub store: StateStore,
    pub deck: QuestionDeck,
    pub(crate) updates: broadcast::Sender<Update>,
    /// Shared with the spawned reveal timer, which clears its own token.
    pub(crate) reveal: Arc<Mutex<Option<PendingReveal>>>,
    pub(crate) reveal_seq: AtomicU64,
    pub(crate) reveal_delay: std::time::Duration,
    pub(crate) count_correct_votes: bool,
    pub(crate) correct_votes: AtomicU32,
}

impl AppState {
    /// Open the store under the configured data directory, load whatever
    /// state survived the last session, and wrap it in an engine.
    pub async fn open(config: &Config, deck: QuestionDeck) -> Arc<Self> {
        let store = StateStore::open(&config.data_dir).await;
        Self::with_store(store, deck, config).await
    }

    /// Build an engine over an already-opened store.
    pub async fn with_store(store: StateStore, deck: QuestionDeck, config: &Config) -> Arc<Self> {
        let state = store.load().await;
        let (updates, _rx) = broadcast::channel(64);

        tracing::info!(
            players = state.players.len(),
            phase = ?state.phase,
            "Game state loaded"
        );

        Arc::new(Self {
            state: RwLock::new(state),
            store,
            deck,
            updates,
            reveal: Arc::new(Mutex::new(None)),
            reveal_seq: AtomicU64::new(0),
            reveal_delay: config.reveal_delay,
            count_correct_votes: config.count_correct_votes,
            correct_votes: AtomicU32::new(0),
        })
    }

    /// Read-only snapshot for rendering.
    pub async fn snapshot(&self) -> GameState {
        self.state.read().await.clone()
    }

    /// Subscribe to update notifications (the render-trigger callback).
    pub fn subscribe(&self) -> broadcast::Receiver<Update> {
        self.updates.subscribe()
    }

    /// Route one user intent to its guarded transition.
    pub async fn dispatch(&self, command: Command) -> CommandResult {
        let result = match command.clone() {
            Command::AddPlayer { name } => self.add_player(&name).await,
            Command::RemovePlayer { name } => self.remove_player(&name).await,
            Command::StartRound1 => self.start_round1().await,
            Command::ConfirmJudge => self.confirm_judge().await,
            Command::SelectAnswer { option } => self.select_answer(option).await,
            Command::PrevQuestion => self.prev_question().await,
            Command::NextQuestion => self.next_question().await,
            Command::AdvanceTurn => self.advance_turn().await,
            Command::StartRound2 => self.start_round2().await,
            Command::Vote { guess } => self.cast_vote(guess).await,
            Command::NextCase => self.next_case().await,
            Command::RestartRound2 => self.restart_round2().await,
            Command::Wipe => self.wipe().await,
        };

        if let Err(rejected) = &result {
            tracing::debug!(?command, reason = %rejected, "Command rejected");
        }
        result
    }

    /// Delete both persisted records, reset to defaults, re-render. Aborts a
    /// pending reveal: a wipe has process-teardown semantics.
    pub async fn wipe(&self) -> CommandResult {
        if let Some(pending) = self.reveal.lock().await.take() {
            pending.handle.abort();
        }
        self.correct_votes.store(0, Ordering::Relaxed);

        self.store.wipe().await;

        let snapshot = {
            let mut state = self.state.write().await;
            *state = GameState::default();
            state.clone()
        };
        self.commit(&snapshot).await;
        self.notify(Update::Wiped);

        tracing::info!("Persisted state wiped");
        Ok(())
    }

    /// Write-through persistence plus the re-render signal. Send errors mean
    /// no collaborator is subscribed, which is fine.
    pub(crate) async fn commit(&self, snapshot: &GameState) {
        self.store.save(snapshot).await;
        self.notify(Update::StateChanged);
    }

    pub(crate) fn notify(&self, update: Update) {
        let _ = self.updates.send(update);
    }
}
