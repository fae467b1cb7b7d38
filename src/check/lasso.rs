//! Lasso-shaped witnesses and the path searches used to build them.

use std::collections::VecDeque;
use std::fmt;

use thiserror::Error;

use crate::automaton::{Automaton, Transition};
use crate::bitset::StateSet;
use crate::types::{AccMask, EdgeId, StateId};

/// An accepting run: a finite prefix followed by a cycle repeated forever.
///
/// `edges[i]` leaves the i-th state of `prefix ++ cycle`. The edge leaving the
/// last prefix state enters `cycle[0]`, and the last edge closes the cycle back
/// to `cycle[0]`. The prefix starts in an initial state (or is empty, and then
/// `cycle[0]` is initial).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lasso {
    pub prefix: Vec<StateId>,
    pub cycle: Vec<StateId>,
    pub edges: Vec<EdgeId>,
}

/// Reasons a [`Lasso`] is not a valid accepting run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WitnessError {
    #[error("cycle is empty")]
    EmptyCycle,
    #[error("expected {expected} edges, found {found}")]
    EdgeCount { expected: usize, found: usize },
    #[error("run starts in {0}, which is not initial")]
    NotInitial(StateId),
    #[error("edge {edge} does not exist")]
    UnknownEdge { edge: EdgeId },
    #[error("edge {edge} at position {position} does not connect {from} to {to}")]
    Broken {
        position: usize,
        edge: EdgeId,
        from: StateId,
        to: StateId,
    },
    #[error("cycle covers {covered} but {required} is required")]
    NotAccepting { covered: AccMask, required: AccMask },
}

impl Lasso {
    /// Edges of the cycle part.
    pub fn cycle_edges(&self) -> &[EdgeId] {
        &self.edges[self.prefix.len().min(self.edges.len())..]
    }

    /// Union of the acceptance masks along the cycle.
    pub fn cycle_acceptance(&self, aut: &Automaton) -> AccMask {
        self.cycle_edges()
            .iter()
            .filter(|e| e.index() < aut.num_transitions())
            .fold(AccMask::EMPTY, |acc, &e| acc | aut.transition(e).acc)
    }

    /// Checks that the lasso is an accepting run of `aut`.
    pub fn validate(&self, aut: &Automaton) -> Result<(), WitnessError> {
        if self.cycle.is_empty() {
            return Err(WitnessError::EmptyCycle);
        }
        let states: Vec<StateId> = self.prefix.iter().chain(&self.cycle).copied().collect();
        if self.edges.len() != states.len() {
            return Err(WitnessError::EdgeCount {
                expected: states.len(),
                found: self.edges.len(),
            });
        }
        if !aut.initial_states().contains(&states[0]) {
            return Err(WitnessError::NotInitial(states[0]));
        }
        for (i, &e) in self.edges.iter().enumerate() {
            if e.index() >= aut.num_transitions() {
                return Err(WitnessError::UnknownEdge { edge: e });
            }
            let from = states[i];
            let to = states.get(i + 1).copied().unwrap_or(self.cycle[0]);
            let t = aut.transition(e);
            if t.from != from || t.to != to {
                return Err(WitnessError::Broken {
                    position: i,
                    edge: e,
                    from,
                    to,
                });
            }
        }
        let covered = self.cycle_acceptance(aut);
        if !covered.covers(aut.all_sets()) {
            return Err(WitnessError::NotAccepting {
                covered,
                required: aut.all_sets(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Lasso {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |states: &[StateId]| states.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" ");
        write!(f, "prefix=[{}] cycle=[{}]", join(&self.prefix), join(&self.cycle))
    }
}

/// Shortest edge sequence from `from` that stays inside `within` and ends
/// with an edge satisfying `goal`. The result has at least one edge.
pub(crate) fn path_to_edge(
    aut: &Automaton,
    from: StateId,
    within: &StateSet,
    goal: impl Fn(&Transition) -> bool,
) -> Option<Vec<EdgeId>> {
    // parent[s] = edge used to discover s
    let mut parent: Vec<Option<EdgeId>> = vec![None; aut.num_states()];
    let mut seen = StateSet::with_capacity(aut.num_states());
    let mut queue = VecDeque::from([from]);
    seen.insert(from);
    while let Some(q) = queue.pop_front() {
        for &e in aut.successors(q) {
            let t = aut.transition(e);
            if !within.contains(t.to) {
                continue;
            }
            if goal(t) {
                let mut path = vec![e];
                let mut cur = q;
                while cur != from {
                    let Some(pe) = parent[cur.index()] else { break };
                    path.push(pe);
                    cur = aut.transition(pe).from;
                }
                path.reverse();
                return Some(path);
            }
            if seen.insert(t.to) {
                parent[t.to.index()] = Some(e);
                queue.push_back(t.to);
            }
        }
    }
    None
}

/// A cycle through `start` inside `scc` whose edges cover every acceptance set.
///
/// Greedily walks to the nearest edge carrying a still-missing set, then back to
/// `start`. Returns the cycle's states (sources of its edges) and its edges.
pub(crate) fn covering_cycle(aut: &Automaton, scc: &StateSet, start: StateId) -> Option<(Vec<StateId>, Vec<EdgeId>)> {
    let mut missing = aut.all_sets();
    let mut edges: Vec<EdgeId> = Vec::new();
    let mut current = start;
    while !missing.is_empty() {
        let step = path_to_edge(aut, current, scc, |t| !(t.acc & missing).is_empty())?;
        for &e in &step {
            missing = AccMask::from_bits(missing.bits() & !aut.transition(e).acc.bits());
        }
        current = aut.transition(*step.last()?).to;
        edges.extend(step);
    }
    if edges.is_empty() || current != start {
        let back = path_to_edge(aut, current, scc, |t| t.to == start)?;
        edges.extend(back);
    }
    let states = edges.iter().map(|&e| aut.transition(e).from).collect();
    Some((states, edges))
}

/// Shortest path from some initial state to `target`: the states before
/// `target` and the edges between them (the last edge enters `target`).
pub(crate) fn prefix_to(aut: &Automaton, target: StateId) -> Option<(Vec<StateId>, Vec<EdgeId>)> {
    if aut.initial_states().contains(&target) {
        return Some((Vec::new(), Vec::new()));
    }
    let mut parent: Vec<Option<EdgeId>> = vec![None; aut.num_states()];
    let mut seen = StateSet::with_capacity(aut.num_states());
    let mut queue = VecDeque::new();
    for &i in aut.initial_states() {
        if seen.insert(i) {
            queue.push_back(i);
        }
    }
    while let Some(q) = queue.pop_front() {
        for &e in aut.successors(q) {
            let t = aut.transition(e).to;
            if !seen.insert(t) {
                continue;
            }
            parent[t.index()] = Some(e);
            if t == target {
                let mut edges = Vec::new();
                let mut cur = t;
                while let Some(pe) = parent[cur.index()] {
                    edges.push(pe);
                    cur = aut.transition(pe).from;
                }
                edges.reverse();
                let states = edges.iter().map(|&e| aut.transition(e).from).collect();
                return Some((states, edges));
            }
            queue.push_back(t);
        }
    }
    None
}
