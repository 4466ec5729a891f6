//! Round 1: judges answer the questionnaire about their hidden targets.

use super::{AppState, CommandResult, Rejected};
use crate::content::{OPTION_COUNT, QUESTION_COUNT};
use crate::protocol::Update;
use crate::random::{build_pairings, shuffle};
use crate::types::{GamePhase, Round1State};

impl AppState {
    /// Build pairings and a shuffled turn order, then enter the first turn.
    pub async fn start_round1(&self) -> CommandResult {
        let snapshot = {
            let mut state = self.state.write().await;
            if state.players.len() < 2 {
                return Err(Rejected::NotEnoughPlayers);
            }
            if state.round1.is_some() {
                return Err(Rejected::Round1Exists);
            }

            let pairs = build_pairings(&state.players);
            let mut order: Vec<usize> = (0..state.players.len()).collect();
            shuffle(&mut order);

            state.round1 = Some(Round1State {
                order,
                pairs,
                answers_by_target: Default::default(),
                current_turn_index: 0,
                current_question_index: 0,
                show_target: false,
            });
            state.round2 = None;
            state.phase = GamePhase::Turn;
            state.clone()
        };

        tracing::info!(turns = snapshot.players.len(), "Round 1 started");
        self.commit(&snapshot).await;
        Ok(())
    }

    /// The judge on turn confirms; their target is revealed to them and the
    /// questionnaire starts at the first question.
    pub async fn confirm_judge(&self) -> CommandResult {
        let snapshot = {
            let mut state = self.state.write().await;
            if state.phase != GamePhase::Turn {
                return Err(Rejected::WrongPhase(state.phase));
            }
            let round1 = state.round1.as_mut().ok_or(Rejected::NoActiveRound)?;

            round1.show_target = true;
            round1.current_question_index = 0;
            state.phase = GamePhase::Questions;
            state.clone()
        };

        self.commit(&snapshot).await;
        Ok(())
    }

    /// Record (or overwrite) the selected option for the current question.
    /// The target's answer set is created lazily on first write.
    pub async fn select_answer(&self, option: u8) -> CommandResult {
        if usize::from(option) >= OPTION_COUNT {
            return Err(Rejected::InvalidOption);
        }

        let snapshot = {
            let mut state = self.state.write().await;
            if state.phase != GamePhase::Questions {
                return Err(Rejected::WrongPhase(state.phase));
            }
            let round1 = state.round1.as_mut().ok_or(Rejected::NoActiveRound)?;
            let target = round1
                .current_pair()
                .ok_or(Rejected::NoActiveRound)?
                .target
                .clone();
            let question_index = round1.current_question_index;

            let answers = round1
                .answers_by_target
                .entry(target)
                .or_insert_with(|| vec![None; QUESTION_COUNT]);
            // A restored record can carry an out-of-range index or a short
            // answer set; treat the write as any other rejected action.
            let slot = answers
                .get_mut(question_index)
                .ok_or(Rejected::InvalidOption)?;
            *slot = Some(option);
            state.clone()
        };

        self.commit(&snapshot).await;
        Ok(())
    }

    /// Step back to the previous question, keeping every recorded answer.
    pub async fn prev_question(&self) -> CommandResult {
        let snapshot = {
            let mut state = self.state.write().await;
            if state.phase != GamePhase::Questions {
                return Err(Rejected::WrongPhase(state.phase));
            }
            let round1 = state.round1.as_mut().ok_or(Rejected::NoActiveRound)?;
            if round1.current_question_index == 0 {
                return Err(Rejected::AtFirstQuestion);
            }

            round1.current_question_index -= 1;
            state.clone()
        };

        self.commit(&snapshot).await;
        Ok(())
    }

    /// Advance past the current question, but only if it holds an answer: no
    /// skipping. On the last question the turn closes and the target is
    /// hidden again.
    pub async fn next_question(&self) -> CommandResult {
        let snapshot = {
            let mut state = self.state.write().await;
            if state.phase != GamePhase::Questions {
                return Err(Rejected::WrongPhase(state.phase));
            }
            let round1 = state.round1.as_mut().ok_or(Rejected::NoActiveRound)?;
            let target = round1
                .current_pair()
                .ok_or(Rejected::NoActiveRound)?
                .target
                .clone();
            let question_index = round1.current_question_index;

            let answered = round1
                .answers_by_target
                .get(&target)
                .and_then(|answers| answers.get(question_index).copied())
                .flatten()
                .is_some();
            if !answered {
                return Err(Rejected::Unanswered);
            }

            if question_index + 1 < QUESTION_COUNT {
                round1.current_question_index += 1;
            } else {
                round1.show_target = false;
                state.phase = GamePhase::DoneTurn;
            }
            state.clone()
        };

        self.commit(&snapshot).await;
        Ok(())
    }

    /// Hand the device to the next judge, or close round 1 after the last
    /// turn (the phase returns to setup; the round data stays).
    pub async fn advance_turn(&self) -> CommandResult {
        let (snapshot, finished) = {
            let mut state = self.state.write().await;
            if state.phase != GamePhase::DoneTurn {
                return Err(Rejected::WrongPhase(state.phase));
            }
            let round1 = state.round1.as_mut().ok_or(Rejected::NoActiveRound)?;

            round1.current_turn_index += 1;
            let finished = round1.current_turn_index >= round1.order.len();
            state.phase = if finished {
                GamePhase::Setup
            } else {
                GamePhase::Turn
            };
            (state.clone(), finished)
        };

        if finished {
            tracing::info!("Round 1 finished");
        }
        self.commit(&snapshot).await;
        if finished {
            self.notify(Update::Round1Finished);
        }
        Ok(())
    }
}
