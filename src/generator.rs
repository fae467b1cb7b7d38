//! Seeded random automata.
//!
//! The transition relation is the union of several random trees over the same
//! states. The first tree is rooted in state `0` and spans every state, so the
//! whole automaton is reachable from the single initial state. Each tree visits
//! states in a random order and links every visited state to itself and to up
//! to `edges` states visited after it.
//!
//! Acceptance sets are then drawn as small random sets of states; every
//! outgoing transition of a chosen state carries the set.
//!
//! ```
//! use buchi_rs::generator::{generate, GeneratorOptions};
//!
//! let opts = GeneratorOptions { states: 20, sets: 3, seed: 7, ..Default::default() };
//! let a = generate(&opts).unwrap();
//! let b = generate(&opts).unwrap();
//! assert_eq!(a.num_states(), 20);
//! assert_eq!(a.transitions(), b.transitions());
//! ```

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::automaton::Automaton;
use crate::error::StructuralError;
use crate::types::StateId;

/// Parameters of [`generate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Number of states.
    pub states: usize,
    /// Number of merged random trees.
    pub trees: usize,
    /// Number of acceptance sets.
    pub sets: usize,
    /// Successors per visited state in each tree, not counting the self loop.
    pub edges: usize,
    /// Seed of the random generator.
    pub seed: u64,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            states: 100,
            trees: 3,
            sets: 2,
            edges: 2,
            seed: 0,
        }
    }
}

/// Generates a random automaton with one initial state `0`.
///
/// Zero states yield an automaton without states; zero trees or zero edges
/// yield an automaton without transitions.
pub fn generate(opts: &GeneratorOptions) -> Result<Automaton, StructuralError> {
    let mut rng = ChaCha8Rng::seed_from_u64(opts.seed);
    let mut aut = Automaton::with_states(opts.states, opts.sets)?;
    if opts.states == 0 {
        return Ok(aut);
    }
    aut.add_initial(StateId::new(0))?;

    let mut succ: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
    for tree in 0..opts.trees {
        for (from, to) in random_tree(&mut rng, opts.states, opts.edges, tree == 0) {
            succ.entry(from).or_default().insert(to);
        }
    }
    for (from, targets) in &succ {
        for &to in targets {
            aut.add_transition_sets(state(*from), state(to), [])?;
        }
    }

    for (set, finals) in random_finals(&mut rng, opts.states, opts.sets, opts.edges).into_iter().enumerate() {
        for q in finals {
            aut.add_state_acceptance(state(q), set)?;
        }
    }

    debug!(
        "generate: {} states, {} transitions, {} sets (seed {})",
        aut.num_states(),
        aut.num_transitions(),
        aut.num_sets(),
        opts.seed
    );
    Ok(aut)
}

fn state(index: usize) -> StateId {
    StateId::new(index as u32)
}

/// Edges of one random tree. The spanning tree keeps `0` as its first state
/// and visits every state; other trees visit a random number of states.
fn random_tree(rng: &mut impl Rng, states: usize, edges: usize, spanning: bool) -> Vec<(usize, usize)> {
    if states == 0 || edges == 0 {
        return Vec::new();
    }
    let mut order: Vec<usize> = (0..states).collect();
    let skip = usize::from(spanning);
    order[skip..].shuffle(rng);

    let turns = if spanning { states } else { rng.random_range(1..=states) };
    let mut result = Vec::new();
    for turn in 0..turns {
        for i in 0..=edges {
            if turn + i >= states {
                break;
            }
            result.push((order[turn], order[turn + i]));
        }
    }
    result
}

/// One random set of states per acceptance set, each of size at most
/// `max(states / sets / ratio, 1)`.
fn random_finals(rng: &mut impl Rng, states: usize, sets: usize, ratio: usize) -> Vec<BTreeSet<usize>> {
    if states == 0 || sets == 0 {
        return Vec::new();
    }
    let max_in_set = (states / sets / ratio.max(1)).max(1);
    (0..sets)
        .map(|_| {
            let n = rng.random_range(1..=max_in_set);
            (0..n).map(|_| rng.random_range(0..states)).collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_deterministic() {
        let opts = GeneratorOptions {
            states: 50,
            trees: 4,
            sets: 3,
            edges: 2,
            seed: 42,
        };
        let a = generate(&opts).unwrap();
        let b = generate(&opts).unwrap();
        assert_eq!(a.transitions(), b.transitions());
        assert_eq!(a.initial_states(), b.initial_states());
    }

    #[test]
    fn test_spanning_tree_reaches_everything() {
        for seed in 0..10 {
            let opts = GeneratorOptions {
                states: 30,
                trees: 1,
                sets: 2,
                edges: 1,
                seed,
            };
            let aut = generate(&opts).unwrap();
            assert_eq!(aut.reachable().len(), 30, "seed {}", seed);
        }
    }

    #[test]
    fn test_every_state_has_self_loop() {
        let opts = GeneratorOptions {
            states: 10,
            trees: 1,
            sets: 1,
            edges: 3,
            seed: 1,
        };
        let aut = generate(&opts).unwrap();
        for q in aut.states() {
            assert!(aut.successors(q).iter().any(|&e| aut.transition(e).to == q));
        }
    }

    #[test]
    fn test_masks_fit() {
        let opts = GeneratorOptions {
            states: 40,
            sets: 5,
            seed: 3,
            ..Default::default()
        };
        let aut = generate(&opts).unwrap();
        assert!(aut.transitions().iter().all(|t| t.acc.fits(5)));
        assert!(aut.transitions().iter().any(|t| !t.acc.is_empty()));
    }

    #[test]
    fn test_degenerate_options() {
        let empty = generate(&GeneratorOptions {
            states: 0,
            ..Default::default()
        })
        .unwrap();
        assert!(empty.is_empty());

        let no_edges = generate(&GeneratorOptions {
            states: 5,
            edges: 0,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(no_edges.num_transitions(), 0);
    }

    #[test]
    fn test_too_many_sets() {
        let res = generate(&GeneratorOptions {
            sets: 65,
            ..Default::default()
        });
        assert!(matches!(res, Err(StructuralError::TooManyAcceptanceSets { requested: 65 })));
    }
}
