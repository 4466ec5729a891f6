//! Thin terminal front-end. All rules live in the engine; this file only
//! translates lines of input into commands and prints snapshots.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use veredicto::config::Config;
use veredicto::content::QuestionDeck;
use veredicto::protocol::{Command, Update};
use veredicto::state::AppState;
use veredicto::store::AudioPrefs;
use veredicto::types::{GamePhase, GameState};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "veredicto=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let deck = match &config.questions_path {
        Some(path) => match QuestionDeck::from_json_file(path).await {
            Ok(deck) => deck,
            Err(e) => {
                tracing::warn!(error = %e, "Falling back to the built-in question deck");
                QuestionDeck::builtin()
            }
        },
        None => QuestionDeck::builtin(),
    };

    let engine = AppState::open(&config, deck).await;

    // Print reveals as they fire; everything else re-renders on demand.
    let mut updates = engine.subscribe();
    tokio::spawn(async move {
        while let Ok(update) = updates.recv().await {
            match update {
                Update::VoteRevealed {
                    target,
                    guess,
                    correct,
                    is_last,
                    correct_total,
                } => {
                    let verdict = if correct { "Correct!" } else { "Wrong." };
                    println!("\n*** It was {target}. You guessed {guess}. {verdict}");
                    if let Some(total) = correct_total {
                        println!("    Correct guesses so far: {total}");
                    }
                    if is_last {
                        println!("    That was the last case. `restart` to play again.");
                    } else {
                        println!("    `case` for the next one.");
                    }
                }
                Update::Round1Finished => {
                    println!("\n*** Round 1 complete. `round2` when you are ready.");
                }
                Update::Wiped => println!("\n*** Everything wiped."),
                Update::StateChanged => {}
            }
        }
    });

    println!("veredicto: type `help` for commands.");
    render(&engine.snapshot().await, &engine.deck);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (verb, rest) = match line.split_once(' ') {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb {
            "help" => {
                print_help();
                continue;
            }
            "state" => {
                render(&engine.snapshot().await, &engine.deck);
                continue;
            }
            "mute" => {
                let prefs = engine.store.load_audio_prefs().await;
                let toggled = AudioPrefs {
                    muted: !prefs.muted,
                };
                engine.store.save_audio_prefs(&toggled).await;
                println!("muted: {}", toggled.muted);
                continue;
            }
            "quit" | "exit" => break,
            "add" => Command::AddPlayer {
                name: rest.to_string(),
            },
            "remove" => Command::RemovePlayer {
                name: rest.to_string(),
            },
            "start" => Command::StartRound1,
            "ok" => Command::ConfirmJudge,
            "pick" => match rest.parse::<u8>() {
                Ok(n) if (1..=4).contains(&n) => Command::SelectAnswer { option: n - 1 },
                _ => {
                    println!("pick 1-4");
                    continue;
                }
            },
            "next" => Command::NextQuestion,
            "prev" => Command::PrevQuestion,
            "turn" => Command::AdvanceTurn,
            "round2" => Command::StartRound2,
            "vote" => Command::Vote {
                guess: rest.to_string(),
            },
            "case" => Command::NextCase,
            "restart" => Command::RestartRound2,
            "wipe" => Command::Wipe,
            _ => {
                println!("unknown command; `help` lists them");
                continue;
            }
        };

        match engine.dispatch(command).await {
            Ok(()) => render(&engine.snapshot().await, &engine.deck),
            Err(rejected) => println!("(ignored: {rejected})"),
        }
    }
}

fn print_help() {
    println!(
        "\
setup:    add <name> | remove <name> | start | wipe | mute
round 1:  ok | pick <1-4> | next | prev | turn | round2
round 2:  vote <name> | case | restart
misc:     state | help | quit"
    );
}

fn render(state: &GameState, deck: &QuestionDeck) {
    println!();
    match state.phase {
        GamePhase::Setup => {
            if state.players.is_empty() {
                println!("[setup] no players yet; `add <name>` (at least 2)");
            } else {
                println!("[setup] players: {}", state.players.join(", "));
            }
            if state.round1.is_some() {
                println!(
                    "round 1 progress: {}/{} complete",
                    state.completion_count(),
                    state.players.len()
                );
                if state.is_round1_complete() {
                    println!("round 1 done; `round2` to start guessing");
                }
            } else if state.players.len() >= 2 {
                println!("`start` to begin round 1");
            }
        }
        GamePhase::Turn => {
            let Some(round1) = state.round1.as_ref() else {
                return;
            };
            if let Some(pair) = round1.current_pair() {
                println!(
                    "[turn {}/{}] {}: take the device and type `ok` to see who you judge",
                    round1.current_turn_index + 1,
                    round1.order.len(),
                    pair.judge
                );
            }
        }
        GamePhase::Questions => {
            let Some(round1) = state.round1.as_ref() else {
                return;
            };
            let Some(pair) = round1.current_pair() else {
                return;
            };
            let Some(question) = deck.question(round1.current_question_index) else {
                return;
            };

            println!(
                "[question {}/{}] judge {} about {}",
                round1.current_question_index + 1,
                deck.len(),
                pair.judge,
                pair.target
            );
            println!("  {}", question.text);
            let selected = round1
                .answers_by_target
                .get(&pair.target)
                .and_then(|answers| answers.get(round1.current_question_index).copied())
                .flatten();
            for (i, option) in question.options.iter().enumerate() {
                let mark = if selected == Some(i as u8) { ">" } else { " " };
                println!("  {mark} {}. {}", i + 1, option.label);
            }
        }
        GamePhase::DoneTurn => {
            println!("[done] turn saved; pass the device and type `turn`");
        }
        GamePhase::Round2 => {
            let Some(round2) = state.round2.as_ref() else {
                return;
            };
            let Some(target) = round2.current_case() else {
                return;
            };
            println!(
                "[case {}/{}] whose answers are these?",
                round2.case_index + 1,
                round2.case_order.len()
            );

            let empty = Vec::new();
            let answers = state
                .round1
                .as_ref()
                .and_then(|r1| r1.answers_by_target.get(target))
                .unwrap_or(&empty);
            for (i, question) in deck.questions().iter().enumerate() {
                let label = answers
                    .get(i)
                    .copied()
                    .flatten()
                    .and_then(|opt| question.options.get(usize::from(opt)))
                    .map(|option| option.label.as_str())
                    .unwrap_or("(no answer)");
                println!("  {} -> {}", question.text, label);
            }

            if round2.is_answered(target) {
                println!("already voted; `case` to continue");
            } else {
                println!("vote with `vote <name>`: {}", state.players.join(", "));
            }
        }
    }
}
