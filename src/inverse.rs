//! Reversed view of an automaton.
//!
//! The inverse graph has the same states and one reversed transition per
//! forward transition. A reversed transition is *acceptance-preserving* if its
//! forward counterpart carries at least one acceptance set. The fixpoint
//! checker seeds its acceptance restriction from those transitions and runs
//! every backward closure over this structure.

use std::collections::VecDeque;

use crate::automaton::Automaton;
use crate::bitset::StateSet;
use crate::check::Budget;
use crate::error::ResourceExhausted;
use crate::types::{AccMask, EdgeId, StateId};

/// A reversed transition `to <- from`, stored at `to`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct InverseTransition {
    /// Source of the reversed transition, i.e. the target of the forward one.
    pub from: StateId,
    /// Target of the reversed transition, i.e. the source of the forward one.
    pub to: StateId,
    /// The forward transition this one reverses.
    pub forward: EdgeId,
    pub acc: AccMask,
}

impl InverseTransition {
    pub fn preserves_acceptance(&self) -> bool {
        !self.acc.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct InverseAutomaton {
    /// Incoming transitions per state, reversed.
    preds: Vec<Vec<InverseTransition>>,
    num_transitions: usize,
}

impl InverseAutomaton {
    pub fn new(aut: &Automaton) -> Self {
        let mut preds = vec![Vec::new(); aut.num_states()];
        for (i, t) in aut.transitions().iter().enumerate() {
            preds[t.to.index()].push(InverseTransition {
                from: t.to,
                to: t.from,
                forward: EdgeId::new(i as u32),
                acc: t.acc,
            });
        }
        Self {
            preds,
            num_transitions: aut.num_transitions(),
        }
    }

    pub fn num_states(&self) -> usize {
        self.preds.len()
    }

    pub fn num_transitions(&self) -> usize {
        self.num_transitions
    }

    /// Reversed transitions leaving `state` (the forward transitions entering it).
    pub fn predecessors(&self, state: StateId) -> &[InverseTransition] {
        &self.preds[state.index()]
    }

    /// Reversed transitions leaving `state` whose forward transition is accepting.
    pub fn accepting_predecessors(&self, state: StateId) -> impl Iterator<Item = &InverseTransition> {
        self.preds[state.index()].iter().filter(|t| t.preserves_acceptance())
    }

    /// States of `within` that can reach `targets` staying inside `within`
    /// (targets included), by backward BFS.
    ///
    /// Every dequeued state counts as one expansion of `budget`.
    pub fn backward_closure(
        &self,
        targets: &StateSet,
        within: &StateSet,
        budget: &mut dyn Budget,
    ) -> Result<StateSet, ResourceExhausted> {
        let mut seen = targets.intersection(within);
        let mut queue: VecDeque<StateId> = seen.iter().collect();
        while let Some(s) = queue.pop_front() {
            budget.expand(s)?;
            for t in self.predecessors(s) {
                if within.contains(t.to) && seen.insert(t.to) {
                    queue.push_back(t.to);
                }
            }
        }
        Ok(seen)
    }
}
