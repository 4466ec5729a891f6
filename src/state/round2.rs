//! Round 2: the group guesses whose answers each case holds. Vote outcomes
//! are computed immediately but revealed on a suspense timer.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::{AppState, CommandResult, PendingReveal, Rejected};
use crate::protocol::Update;
use crate::random::shuffle;
use crate::types::{GamePhase, Round2State};

impl AppState {
    /// Enter round 2 once every answer set is complete. An existing round-2
    /// state (e.g. restored from disk) is kept; otherwise a fresh shuffled
    /// case order is built.
    pub async fn start_round2(&self) -> CommandResult {
        let snapshot = {
            let mut state = self.state.write().await;
            if !matches!(state.phase, GamePhase::Setup | GamePhase::DoneTurn) {
                return Err(Rejected::WrongPhase(state.phase));
            }
            if !state.is_round1_complete() {
                return Err(Rejected::Round1Incomplete);
            }

            if state.round2.is_none() {
                let mut case_order = state.players.clone();
                shuffle(&mut case_order);
                state.round2 = Some(Round2State {
                    case_order,
                    case_index: 0,
                    answered: Default::default(),
                });
                self.correct_votes.store(0, Ordering::Relaxed);
            }
            state.phase = GamePhase::Round2;
            state.clone()
        };

        tracing::info!(
            cases = snapshot.round2.as_ref().map_or(0, |r2| r2.case_order.len()),
            "Round 2 started"
        );
        self.commit(&snapshot).await;
        Ok(())
    }

    /// Discard the current round-2 state and rebuild it with a new shuffle.
    pub async fn restart_round2(&self) -> CommandResult {
        let reveal = self.reveal.lock().await;
        if reveal.is_some() {
            return Err(Rejected::RevealPending);
        }

        let snapshot = {
            let mut state = self.state.write().await;
            if state.phase != GamePhase::Round2 {
                return Err(Rejected::WrongPhase(state.phase));
            }

            let mut case_order = state.players.clone();
            shuffle(&mut case_order);
            state.round2 = Some(Round2State {
                case_order,
                case_index: 0,
                answered: Default::default(),
            });
            self.correct_votes.store(0, Ordering::Relaxed);
            state.clone()
        };

        tracing::info!("Round 2 restarted");
        self.commit(&snapshot).await;
        Ok(())
    }

    /// Vote on the current case. The vote is recorded and persisted at once;
    /// the outcome is broadcast only after the suspense delay, during which
    /// voting, case advancement and restarts are all locked out.
    pub async fn cast_vote(&self, guess: String) -> CommandResult {
        // Hold the reveal slot across admission so a zero-delay timer can
        // never fire before its token is stored.
        let mut reveal = self.reveal.lock().await;
        if reveal.is_some() {
            return Err(Rejected::RevealPending);
        }

        let (snapshot, target, correct, is_last) = {
            let mut state = self.state.write().await;
            if state.phase != GamePhase::Round2 {
                return Err(Rejected::WrongPhase(state.phase));
            }
            if !state.has_player(&guess) {
                return Err(Rejected::UnknownPlayer);
            }
            let round2 = state.round2.as_mut().ok_or(Rejected::NoActiveRound)?;
            let target = round2
                .current_case()
                .ok_or(Rejected::NoActiveRound)?
                .to_string();
            if round2.is_answered(&target) {
                return Err(Rejected::AlreadyVoted);
            }

            round2.answered.insert(target.clone(), true);
            let correct = guess == target;
            let is_last = round2.is_last_case();
            (state.clone(), target, correct, is_last)
        };

        let correct_total = self.count_correct_votes.then(|| {
            if correct {
                self.correct_votes.fetch_add(1, Ordering::Relaxed) + 1
            } else {
                self.correct_votes.load(Ordering::Relaxed)
            }
        });

        self.commit(&snapshot).await;

        let seq = self.reveal_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let delay = self.reveal_delay;
        let update = Update::VoteRevealed {
            target,
            guess,
            correct,
            is_last,
            correct_total,
        };

        let reveal_slot = Arc::clone(&self.reveal);
        let updates = self.updates.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut pending = reveal_slot.lock().await;
                if pending.as_ref().is_some_and(|p| p.seq == seq) {
                    *pending = None;
                }
            }
            let _ = updates.send(update);
        });
        *reveal = Some(PendingReveal { seq, handle });
        Ok(())
    }

    /// Move to the next case, clamped at the last one.
    pub async fn next_case(&self) -> CommandResult {
        let reveal = self.reveal.lock().await;
        if reveal.is_some() {
            return Err(Rejected::RevealPending);
        }

        let snapshot = {
            let mut state = self.state.write().await;
            if state.phase != GamePhase::Round2 {
                return Err(Rejected::WrongPhase(state.phase));
            }
            let round2 = state.round2.as_mut().ok_or(Rejected::NoActiveRound)?;

            let last = round2.case_order.len().saturating_sub(1);
            round2.case_index = (round2.case_index + 1).min(last);
            state.clone()
        };

        self.commit(&snapshot).await;
        Ok(())
    }
}
