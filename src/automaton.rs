//! Explicit-state generalized Büchi automaton.
//!
//! An [`Automaton`] is an arena of states and an arena of transitions, both
//! addressed by dense indices ([`StateId`], [`EdgeId`]). Each state owns the
//! ordered list of its outgoing edge ids. Acceptance is recorded on
//! transitions as an [`AccMask`].
//!
//! The graph is append-only while it is being built and every mutation is
//! validated, so a finished automaton is structurally sound. Checkers borrow it
//! immutably and never re-validate it.
//!
//! # Example
//!
//! ```
//! use buchi_rs::automaton::Automaton;
//! use buchi_rs::types::{AccMask, AccSet};
//!
//! let mut aut = Automaton::new(2).unwrap();
//! let s0 = aut.add_state();
//! let s1 = aut.add_state();
//! aut.add_initial(s0).unwrap();
//! aut.add_transition(s0, s1, AccMask::single(AccSet::new(0))).unwrap();
//! aut.add_transition(s1, s0, AccMask::single(AccSet::new(1))).unwrap();
//!
//! assert_eq!(aut.num_transitions(), 2);
//! assert_eq!(aut.reachable().len(), 2);
//! ```

use std::collections::VecDeque;
use std::fmt::{Debug, Formatter};
use std::ops::Range;

use log::debug;

use crate::bitset::StateSet;
use crate::error::StructuralError;
use crate::inverse::InverseAutomaton;
use crate::types::{AccMask, AccSet, EdgeId, StateId};

/// A transition `from -> to` carrying the acceptance sets in `acc`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Transition {
    pub from: StateId,
    pub to: StateId,
    pub acc: AccMask,
}

#[derive(Debug, Clone, Default)]
struct State {
    /// Outgoing transitions, in insertion order.
    out: Vec<EdgeId>,
    /// Sets attached to the state itself, copied onto each outgoing transition.
    acc: AccMask,
}

#[derive(Clone)]
pub struct Automaton {
    states: Vec<State>,
    edges: Vec<Transition>,
    num_sets: usize,
    initial: Vec<StateId>,
}

impl Automaton {
    /// Creates an empty automaton declaring `num_sets` acceptance sets.
    pub fn new(num_sets: usize) -> Result<Self, StructuralError> {
        if num_sets > AccMask::MAX_SETS {
            return Err(StructuralError::TooManyAcceptanceSets { requested: num_sets });
        }
        Ok(Self {
            states: Vec::new(),
            edges: Vec::new(),
            num_sets,
            initial: Vec::new(),
        })
    }

    /// Creates an automaton with `num_states` states and no transitions.
    pub fn with_states(num_states: usize, num_sets: usize) -> Result<Self, StructuralError> {
        let mut aut = Self::new(num_sets)?;
        aut.add_states(num_states)?;
        Ok(aut)
    }

    pub fn add_state(&mut self) -> StateId {
        let id = StateId::new(self.states.len() as u32);
        self.states.push(State::default());
        id
    }

    /// Adds `n` states and returns the range of their raw indices.
    ///
    /// Fails without adding anything if the total would not fit a [`StateId`].
    pub fn add_states(&mut self, n: usize) -> Result<Range<u32>, StructuralError> {
        let len = self.states.len();
        let total = match len.checked_add(n) {
            Some(total) if total <= u32::MAX as usize => total,
            _ => return Err(StructuralError::TooManyStates { requested: n }),
        };
        self.states.resize_with(total, State::default);
        Ok(len as u32..total as u32)
    }

    /// Declares `state` initial. Declaring it twice has no effect.
    pub fn add_initial(&mut self, state: StateId) -> Result<(), StructuralError> {
        self.check_state(state)?;
        if !self.initial.contains(&state) {
            self.initial.push(state);
        }
        Ok(())
    }

    /// Adds the transition `from -> to` with acceptance mask `acc`.
    ///
    /// Fails if an endpoint does not exist or `acc` uses undeclared sets.
    pub fn add_transition(&mut self, from: StateId, to: StateId, acc: AccMask) -> Result<EdgeId, StructuralError> {
        self.check_state(from)?;
        self.check_state(to)?;
        if !acc.fits(self.num_sets) {
            return Err(StructuralError::AcceptanceWidth {
                mask: acc,
                num_sets: self.num_sets,
            });
        }
        let id = EdgeId::new(self.edges.len() as u32);
        let acc = acc | self.states[from.index()].acc;
        self.edges.push(Transition { from, to, acc });
        self.states[from.index()].out.push(id);
        Ok(id)
    }

    /// Same as [`add_transition`][Self::add_transition], taking raw set indices.
    pub fn add_transition_sets(
        &mut self,
        from: StateId,
        to: StateId,
        sets: impl IntoIterator<Item = usize>,
    ) -> Result<EdgeId, StructuralError> {
        let mut acc = AccMask::EMPTY;
        for set in sets {
            acc |= self.mask_of(set)?;
        }
        self.add_transition(from, to, acc)
    }

    /// Puts `state` in acceptance set `set` (state-based acceptance).
    ///
    /// Every outgoing transition of `state`, present or added later, gets
    /// `set` in its mask. Marking the outgoing transitions of a state accepts
    /// the same runs as marking the state.
    pub fn add_state_acceptance(&mut self, state: StateId, set: usize) -> Result<(), StructuralError> {
        self.check_state(state)?;
        let mask = self.mask_of(set)?;
        let st = &mut self.states[state.index()];
        st.acc |= mask;
        for &e in &st.out {
            self.edges[e.index()].acc |= mask;
        }
        Ok(())
    }

    fn mask_of(&self, set: usize) -> Result<AccMask, StructuralError> {
        if set >= self.num_sets {
            return Err(StructuralError::AcceptanceSetOutOfRange {
                set,
                num_sets: self.num_sets,
            });
        }
        Ok(AccMask::single(AccSet::new(set)))
    }

    fn check_state(&self, state: StateId) -> Result<(), StructuralError> {
        if state.index() >= self.states.len() {
            return Err(StructuralError::DanglingEndpoint {
                state,
                num_states: self.states.len(),
            });
        }
        Ok(())
    }
}

impl Automaton {
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn num_transitions(&self) -> usize {
        self.edges.len()
    }

    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// The mask every accepting cycle has to cover.
    pub fn all_sets(&self) -> AccMask {
        AccMask::all(self.num_sets)
    }

    /// True if there is more than one acceptance set.
    pub fn is_generalized(&self) -> bool {
        self.num_sets > 1
    }

    /// True if the automaton has no states.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn initial_states(&self) -> &[StateId] {
        &self.initial
    }

    pub fn states(&self) -> impl Iterator<Item = StateId> {
        (0..self.states.len() as u32).map(StateId::new)
    }

    pub fn transition(&self, edge: EdgeId) -> &Transition {
        &self.edges[edge.index()]
    }

    /// All transitions, indexed by [`EdgeId`].
    pub fn transitions(&self) -> &[Transition] {
        &self.edges
    }

    /// Outgoing edge ids of `state`, in insertion order.
    pub fn successors(&self, state: StateId) -> &[EdgeId] {
        &self.states[state.index()].out
    }

    /// States reachable from `sources` (sources included), by forward BFS.
    pub fn reachable_from(&self, sources: impl IntoIterator<Item = StateId>) -> StateSet {
        let mut seen = StateSet::with_capacity(self.num_states());
        let mut queue = VecDeque::new();
        for s in sources {
            if seen.insert(s) {
                queue.push_back(s);
            }
        }
        while let Some(s) = queue.pop_front() {
            for &e in self.successors(s) {
                let t = self.edges[e.index()].to;
                if seen.insert(t) {
                    queue.push_back(t);
                }
            }
        }
        debug!("reachable_from: {} states", seen.len());
        seen
    }

    /// States reachable from any initial state.
    pub fn reachable(&self) -> StateSet {
        self.reachable_from(self.initial.iter().copied())
    }

    /// Builds the reversed graph.
    pub fn inverse(&self) -> InverseAutomaton {
        InverseAutomaton::new(self)
    }
}

impl Debug for Automaton {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Automaton")
            .field("states", &self.num_states())
            .field("transitions", &self.num_transitions())
            .field("sets", &self.num_sets)
            .field("initial", &self.initial)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn s(i: u32) -> StateId {
        StateId::new(i)
    }

    #[test]
    fn test_empty() {
        let aut = Automaton::new(1).unwrap();
        assert!(aut.is_empty());
        assert_eq!(aut.num_transitions(), 0);
        assert!(aut.reachable().is_empty());
    }

    #[test]
    fn test_add_states() {
        let mut aut = Automaton::new(0).unwrap();
        assert_eq!(aut.add_state(), s(0));
        assert_eq!(aut.add_states(3), Ok(1..4));
        assert_eq!(aut.num_states(), 4);
        assert_eq!(aut.states().count(), 4);
    }

    #[test]
    fn test_too_many_states() {
        let mut aut = Automaton::with_states(2, 0).unwrap();
        assert_eq!(
            aut.add_states(u32::MAX as usize),
            Err(StructuralError::TooManyStates {
                requested: u32::MAX as usize
            })
        );
        assert_eq!(
            aut.add_states(usize::MAX),
            Err(StructuralError::TooManyStates { requested: usize::MAX })
        );
        assert_eq!(aut.num_states(), 2);
        assert!(matches!(
            Automaton::with_states(u32::MAX as usize + 1, 0),
            Err(StructuralError::TooManyStates { .. })
        ));
    }

    #[test]
    fn test_too_many_sets() {
        assert_eq!(
            Automaton::new(65).unwrap_err(),
            StructuralError::TooManyAcceptanceSets { requested: 65 }
        );
        assert!(Automaton::new(64).is_ok());
    }

    #[test]
    fn test_dangling_endpoint() {
        let mut aut = Automaton::with_states(2, 1).unwrap();
        assert_eq!(
            aut.add_transition(s(0), s(2), AccMask::EMPTY),
            Err(StructuralError::DanglingEndpoint {
                state: s(2),
                num_states: 2
            })
        );
        assert!(aut.add_initial(s(7)).is_err());
        assert_eq!(aut.num_transitions(), 0);
    }

    #[test]
    fn test_width_mismatch() {
        let mut aut = Automaton::with_states(1, 2).unwrap();
        let err = aut.add_transition(s(0), s(0), AccMask::from_bits(0b100)).unwrap_err();
        assert_eq!(
            err,
            StructuralError::AcceptanceWidth {
                mask: AccMask::from_bits(0b100),
                num_sets: 2
            }
        );
        assert_eq!(
            aut.add_transition_sets(s(0), s(0), [2]),
            Err(StructuralError::AcceptanceSetOutOfRange { set: 2, num_sets: 2 })
        );
        assert!(aut.add_transition_sets(s(0), s(0), [0, 1]).is_ok());
        assert_eq!(aut.transitions()[0].acc, AccMask::all(2));
    }

    #[test]
    fn test_initial_deduplicated() {
        let mut aut = Automaton::with_states(2, 0).unwrap();
        aut.add_initial(s(1)).unwrap();
        aut.add_initial(s(1)).unwrap();
        aut.add_initial(s(0)).unwrap();
        assert_eq!(aut.initial_states(), &[s(1), s(0)]);
    }

    #[test]
    fn test_successors_order() {
        let mut aut = Automaton::with_states(3, 0).unwrap();
        let e0 = aut.add_transition(s(0), s(2), AccMask::EMPTY).unwrap();
        let e1 = aut.add_transition(s(0), s(1), AccMask::EMPTY).unwrap();
        assert_eq!(aut.successors(s(0)), &[e0, e1]);
        assert_eq!(aut.transition(e1).to, s(1));
        assert!(aut.successors(s(2)).is_empty());
    }

    #[test]
    fn test_reachable_from() {
        // 0 -> 1 -> 2, 3 -> 0
        let mut aut = Automaton::with_states(4, 0).unwrap();
        aut.add_transition(s(0), s(1), AccMask::EMPTY).unwrap();
        aut.add_transition(s(1), s(2), AccMask::EMPTY).unwrap();
        aut.add_transition(s(3), s(0), AccMask::EMPTY).unwrap();
        let r: Vec<_> = aut.reachable_from([s(0)]).iter().collect();
        assert_eq!(r, vec![s(0), s(1), s(2)]);
        assert_eq!(aut.reachable_from([s(3)]).len(), 4);
        assert!(aut.reachable().is_empty());
        aut.add_initial(s(1)).unwrap();
        assert_eq!(aut.reachable().len(), 2);
    }

    #[test]
    fn test_state_acceptance() {
        let mut aut = Automaton::with_states(2, 2).unwrap();
        let before = aut.add_transition(s(0), s(1), AccMask::EMPTY).unwrap();
        aut.add_state_acceptance(s(0), 1).unwrap();
        let after = aut.add_transition(s(0), s(0), AccMask::single(AccSet::new(0))).unwrap();
        let other = aut.add_transition(s(1), s(0), AccMask::EMPTY).unwrap();
        assert_eq!(aut.transition(before).acc, AccMask::from_bits(0b10));
        assert_eq!(aut.transition(after).acc, AccMask::from_bits(0b11));
        assert_eq!(aut.transition(other).acc, AccMask::EMPTY);
        assert!(aut.add_state_acceptance(s(0), 2).is_err());
    }
}
