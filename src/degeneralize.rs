//! Degeneralization: reducing `k` acceptance sets to one.
//!
//! A run visits every set infinitely often iff it can be split into rounds,
//! where round `r` waits for a transition carrying set `r mod k`. The product
//! state `(q, level)` records which set the current round is waiting for; a
//! transition that satisfies the last level closes the round and is the single
//! accepting transition of the product.
//!
//! [`Levels`] is the on-the-fly form used by the nested DFS checker;
//! [`to_single_set`] builds the product explicitly.

use std::collections::{HashMap, VecDeque};

use log::debug;

use crate::automaton::Automaton;
use crate::error::StructuralError;
use crate::types::{AccMask, AccSet, StateId};

/// Level counter over `num_sets` acceptance sets.
#[derive(Debug, Copy, Clone)]
pub struct Levels {
    num_sets: usize,
}

impl Levels {
    pub fn new(num_sets: usize) -> Self {
        Self { num_sets }
    }

    /// Number of distinct levels (at least one, also when there are no sets).
    pub fn count(&self) -> usize {
        self.num_sets.max(1)
    }

    /// Follows a transition with mask `acc` from `level`.
    ///
    /// Returns the next level and whether the transition closes a round.
    /// Consecutive levels satisfied by the same mask are skipped at once.
    pub fn step(&self, level: usize, acc: AccMask) -> (usize, bool) {
        let mut l = level;
        while l < self.num_sets && acc.contains(AccSet::new(l)) {
            l += 1;
        }
        if l == self.num_sets {
            (0, true)
        } else {
            (l, false)
        }
    }
}

/// Converts a generalized automaton into an equivalent one with a single
/// acceptance set.
///
/// Returns `Ok(None)` when `aut` has at most one set: no conversion is needed.
/// Only the part of the product reachable from the initial states is built;
/// the initial product states are `(q0, 0)`.
pub fn to_single_set(aut: &Automaton) -> Result<Option<Automaton>, StructuralError> {
    if !aut.is_generalized() {
        return Ok(None);
    }
    let levels = Levels::new(aut.num_sets());
    let accepting = AccMask::single(AccSet::new(0));

    let mut nba = Automaton::new(1)?;
    let mut index: HashMap<(StateId, usize), StateId> = HashMap::new();
    let mut queue = VecDeque::new();

    for &q0 in aut.initial_states() {
        let p = *index.entry((q0, 0)).or_insert_with(|| nba.add_state());
        nba.add_initial(p)?;
        queue.push_back((q0, 0));
    }

    while let Some((q, level)) = queue.pop_front() {
        let from = index[&(q, level)];
        for &e in aut.successors(q) {
            let t = aut.transition(e);
            let (next, closes) = levels.step(level, t.acc);
            let to = match index.get(&(t.to, next)) {
                Some(&p) => p,
                None => {
                    let p = nba.add_state();
                    index.insert((t.to, next), p);
                    queue.push_back((t.to, next));
                    p
                }
            };
            nba.add_transition(from, to, if closes { accepting } else { AccMask::EMPTY })?;
        }
    }

    debug!(
        "to_single_set: {} states / {} transitions -> {} states / {} transitions",
        aut.num_states(),
        aut.num_transitions(),
        nba.num_states(),
        nba.num_transitions()
    );
    Ok(Some(nba))
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::check::{Algorithm, Verdict};

    fn s(i: u32) -> StateId {
        StateId::new(i)
    }

    fn m(bits: u64) -> AccMask {
        AccMask::from_bits(bits)
    }

    #[test]
    fn test_levels_step() {
        let l = Levels::new(3);
        assert_eq!(l.count(), 3);
        assert_eq!(l.step(0, m(0b000)), (0, false));
        assert_eq!(l.step(0, m(0b001)), (1, false));
        assert_eq!(l.step(0, m(0b011)), (2, false));
        assert_eq!(l.step(1, m(0b001)), (1, false));
        assert_eq!(l.step(2, m(0b100)), (0, true));
        assert_eq!(l.step(0, m(0b111)), (0, true));
    }

    #[test]
    fn test_levels_no_sets() {
        let l = Levels::new(0);
        assert_eq!(l.count(), 1);
        assert_eq!(l.step(0, AccMask::EMPTY), (0, true));
    }

    #[test]
    fn test_no_conversion_needed() {
        let aut = Automaton::with_states(2, 1).unwrap();
        assert!(to_single_set(&aut).unwrap().is_none());
        let aut = Automaton::with_states(2, 0).unwrap();
        assert!(to_single_set(&aut).unwrap().is_none());
    }

    #[test]
    fn test_two_state_cycle() {
        // 0 -{0}-> 1 -{1}-> 0
        let mut aut = Automaton::with_states(2, 2).unwrap();
        aut.add_initial(s(0)).unwrap();
        aut.add_transition_sets(s(0), s(1), [0]).unwrap();
        aut.add_transition_sets(s(1), s(0), [1]).unwrap();

        let nba = to_single_set(&aut).unwrap().unwrap();
        assert_eq!(nba.num_sets(), 1);
        // (0,0) -> (1,1) -acc-> (0,0)
        assert_eq!(nba.num_states(), 2);
        assert_eq!(nba.num_transitions(), 2);
        let accepting = nba.transitions().iter().filter(|t| !t.acc.is_empty()).count();
        assert_eq!(accepting, 1);
        assert!(Algorithm::TwoStackDfs.check(&nba).is_nonempty());
    }

    #[test]
    fn test_preserves_emptiness() {
        // Two separate self-loops, each carrying one set: empty.
        let mut aut = Automaton::with_states(2, 2).unwrap();
        aut.add_initial(s(0)).unwrap();
        aut.add_transition_sets(s(0), s(0), [0]).unwrap();
        aut.add_transition_sets(s(0), s(1), []).unwrap();
        aut.add_transition_sets(s(1), s(1), [1]).unwrap();

        let nba = to_single_set(&aut).unwrap().unwrap();
        for alg in Algorithm::ALL {
            assert_eq!(alg.check(&nba), Verdict::Empty, "{}", alg);
        }
    }
}
