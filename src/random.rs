//! Shuffling and judge/target pairing.

use rand::Rng;

use crate::types::Pairing;

/// How many fresh permutations to try before giving up on a derangement.
const PAIRING_ATTEMPTS: usize = 2000;

/// In-place Fisher–Yates shuffle, unbiased for every length including 0 and 1.
pub fn shuffle<T>(items: &mut [T]) {
    let mut rng = rand::rng();
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Build one pairing per player so that each player is a judge exactly once
/// and a target exactly once.
///
/// Rejection sampling: shuffle the index range until no player maps to
/// themselves. If no derangement shows up within the attempt bound (only
/// plausible for a single player, where none exists), the last candidate is
/// accepted as-is so the call always terminates.
pub fn build_pairings(players: &[String]) -> Vec<Pairing> {
    let n = players.len();
    let mut perm: Vec<usize> = (0..n).collect();

    for _ in 0..PAIRING_ATTEMPTS {
        shuffle(&mut perm);
        if n <= 1 || perm.iter().enumerate().all(|(i, &t)| t != i) {
            break;
        }
    }

    players
        .iter()
        .enumerate()
        .map(|(judge_index, judge)| Pairing {
            judge: judge.clone(),
            target: players[perm[judge_index]].clone(),
        })
        .collect()
}
