//! End-to-end test of a complete game: setup, both rounds, persistence.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use veredicto::config::Config;
use veredicto::content::{QuestionDeck, QUESTION_COUNT};
use veredicto::protocol::{Command, Update};
use veredicto::state::{AppState, Rejected};
use veredicto::types::GamePhase;

fn test_config(dir: &tempfile::TempDir) -> Config {
    Config {
        data_dir: dir.path().to_path_buf(),
        reveal_delay: Duration::from_millis(100),
        ..Config::default()
    }
}

async fn engine_over(dir: &tempfile::TempDir) -> Arc<AppState> {
    AppState::open(&test_config(dir), QuestionDeck::builtin()).await
}

async fn await_reveal(
    updates: &mut tokio::sync::broadcast::Receiver<Update>,
) -> (String, String, bool, bool) {
    loop {
        let update = timeout(Duration::from_secs(2), updates.recv())
            .await
            .expect("reveal should fire")
            .expect("channel open");
        if let Update::VoteRevealed {
            target,
            guess,
            correct,
            is_last,
            ..
        } = update
        {
            return (target, guess, correct, is_last);
        }
    }
}

#[tokio::test]
async fn full_game_flow() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_over(&dir).await;

    // 1. Setup: three players, duplicates and junk rejected.
    for name in ["Ana", "Beto", "Carla"] {
        engine
            .dispatch(Command::AddPlayer {
                name: name.to_string(),
            })
            .await
            .unwrap();
    }
    assert_eq!(
        engine
            .dispatch(Command::AddPlayer {
                name: "  ana ".to_string()
            })
            .await,
        Err(Rejected::DuplicateName)
    );

    // 2. Round 1 starts; the roster is now frozen.
    engine.dispatch(Command::StartRound1).await.unwrap();
    assert_eq!(
        engine
            .dispatch(Command::AddPlayer {
                name: "Dario".to_string()
            })
            .await,
        Err(Rejected::RosterLocked)
    );

    let state = engine.snapshot().await;
    let round1 = state.round1.as_ref().unwrap();
    let judges: HashSet<&str> = round1.pairs.iter().map(|p| p.judge.as_str()).collect();
    let targets: HashSet<&str> = round1.pairs.iter().map(|p| p.target.as_str()).collect();
    assert_eq!(judges.len(), 3);
    assert_eq!(targets.len(), 3);
    for pair in &round1.pairs {
        assert_ne!(pair.judge, pair.target);
    }

    // 3. Play all three turns.
    let mut updates = engine.subscribe();
    for turn in 0..3 {
        assert_eq!(engine.snapshot().await.phase, GamePhase::Turn);
        engine.dispatch(Command::ConfirmJudge).await.unwrap();

        for question in 0..QUESTION_COUNT {
            engine
                .dispatch(Command::SelectAnswer {
                    option: (question % 4) as u8,
                })
                .await
                .unwrap();

            // On the first turn, double-check that going back keeps answers.
            if turn == 0 && question == 1 {
                engine.dispatch(Command::PrevQuestion).await.unwrap();
                let state = engine.snapshot().await;
                let round1 = state.round1.as_ref().unwrap();
                let target = &round1.current_pair().unwrap().target;
                assert_eq!(round1.answers_by_target[target][0], Some(0));
                engine.dispatch(Command::NextQuestion).await.unwrap();
            }

            engine.dispatch(Command::NextQuestion).await.unwrap();
        }

        assert_eq!(engine.snapshot().await.phase, GamePhase::DoneTurn);
        engine.dispatch(Command::AdvanceTurn).await.unwrap();
    }

    // 4. Round 1 closed: back to setup, complete, and announced as finished.
    let state = engine.snapshot().await;
    assert_eq!(state.phase, GamePhase::Setup);
    assert!(state.is_round1_complete());
    assert_eq!(state.completion_count(), 3);

    let mut saw_finished = false;
    while let Ok(update) = updates.try_recv() {
        saw_finished |= update == Update::Round1Finished;
    }
    assert!(saw_finished);

    // 5. A second engine over the same directory resumes the same state.
    let resumed = engine_over(&dir).await;
    assert_eq!(resumed.snapshot().await, engine.snapshot().await);

    // 6. Round 2 on the resumed engine.
    resumed.dispatch(Command::StartRound2).await.unwrap();
    let state = resumed.snapshot().await;
    assert_eq!(state.phase, GamePhase::Round2);
    let round2 = state.round2.as_ref().unwrap();
    let cases: HashSet<&str> = round2.case_order.iter().map(String::as_str).collect();
    assert_eq!(cases, HashSet::from(["Ana", "Beto", "Carla"]));

    // 7. A wrong vote, then a correct one on the next case.
    let mut updates = resumed.subscribe();

    let target = round2.current_case().unwrap().to_string();
    let wrong = state
        .players
        .iter()
        .find(|p| **p != target)
        .unwrap()
        .clone();
    resumed
        .dispatch(Command::Vote {
            guess: wrong.clone(),
        })
        .await
        .unwrap();

    // Locked until the reveal fires.
    assert_eq!(
        resumed.dispatch(Command::NextCase).await,
        Err(Rejected::RevealPending)
    );
    let (revealed_target, revealed_guess, correct, is_last) = await_reveal(&mut updates).await;
    assert_eq!(revealed_target, target);
    assert_eq!(revealed_guess, wrong);
    assert!(!correct);
    assert!(!is_last);

    // Voting again on the same case is a no-op.
    assert_eq!(
        resumed
            .dispatch(Command::Vote {
                guess: target.clone()
            })
            .await,
        Err(Rejected::AlreadyVoted)
    );

    resumed.dispatch(Command::NextCase).await.unwrap();
    let second_target = resumed
        .snapshot()
        .await
        .round2
        .unwrap()
        .current_case()
        .unwrap()
        .to_string();
    resumed
        .dispatch(Command::Vote {
            guess: second_target.clone(),
        })
        .await
        .unwrap();
    let (_, _, correct, is_last) = await_reveal(&mut updates).await;
    assert!(correct);
    assert!(!is_last);

    // 8. Restart rebuilds round 2 from scratch.
    resumed.dispatch(Command::RestartRound2).await.unwrap();
    let round2 = resumed.snapshot().await.round2.unwrap();
    assert_eq!(round2.case_index, 0);
    assert!(round2.answered.is_empty());
}

#[tokio::test]
async fn reload_mid_reveal_keeps_the_vote_but_loses_the_reveal() {
    let dir = tempfile::tempdir().unwrap();
    let engine = AppState::open(
        &Config {
            data_dir: dir.path().to_path_buf(),
            // Long enough that the timer is still pending when we "reload".
            reveal_delay: Duration::from_secs(30),
            ..Config::default()
        },
        QuestionDeck::builtin(),
    )
    .await;

    for name in ["Ana", "Beto"] {
        engine
            .dispatch(Command::AddPlayer {
                name: name.to_string(),
            })
            .await
            .unwrap();
    }
    engine.dispatch(Command::StartRound1).await.unwrap();
    for _ in 0..2 {
        engine.dispatch(Command::ConfirmJudge).await.unwrap();
        for _ in 0..QUESTION_COUNT {
            engine.dispatch(Command::SelectAnswer { option: 0 }).await.unwrap();
            engine.dispatch(Command::NextQuestion).await.unwrap();
        }
        engine.dispatch(Command::AdvanceTurn).await.unwrap();
    }
    engine.dispatch(Command::StartRound2).await.unwrap();

    let target = engine
        .snapshot()
        .await
        .round2
        .unwrap()
        .current_case()
        .unwrap()
        .to_string();
    engine
        .dispatch(Command::Vote {
            guess: target.clone(),
        })
        .await
        .unwrap();
    assert_eq!(
        engine.dispatch(Command::NextCase).await,
        Err(Rejected::RevealPending)
    );

    // "Reload": a fresh engine over the same store. The vote is recorded,
    // the pending reveal is gone, and the case can be advanced right away.
    let resumed = engine_over(&dir).await;
    let round2 = resumed.snapshot().await.round2.unwrap();
    assert!(round2.is_answered(&target));
    resumed.dispatch(Command::NextCase).await.unwrap();
    assert_eq!(resumed.snapshot().await.round2.unwrap().case_index, 1);
}
