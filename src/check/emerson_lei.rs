//! Breadth-first fixpoint checker in the style of Emerson–Lei.
//!
//! Instead of a DFS, the checker narrows a candidate set of states until it
//! stops shrinking. Starting from the reachable states, each round:
//!
//! 1. trims states without a successor or a predecessor inside the candidate
//!    set (they cannot lie on a cycle);
//! 2. for every acceptance set `i`, keeps only the states that can reach,
//!    inside the candidate set, a transition carrying `i` with both ends in the
//!    set (backward BFS over the [`InverseAutomaton`]);
//! 3. splits the remaining states into strongly connected components by
//!    forward/backward reachability from a pivot, and drops every component
//!    that has no internal transition or whose internal transitions miss some
//!    acceptance set.
//!
//! What survives the fixpoint is a union of accepting components. All set
//! operations are breadth-first and iterative.
//!
//! The budget is charged once for every state dequeued by a forward or a
//! backward closure. Trimming and the acceptance scans are not charged.

use std::collections::VecDeque;

use log::debug;

use crate::automaton::Automaton;
use crate::bitset::StateSet;
use crate::check::lasso::{covering_cycle, prefix_to, Lasso};
use crate::check::{Budget, EmptinessChecker, Verdict};
use crate::error::ResourceExhausted;
use crate::inverse::InverseAutomaton;
use crate::types::{AccMask, StateId};

/// Emerson–Lei style fixpoint emptiness checker.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmersonLei;

impl EmptinessChecker for EmersonLei {
    fn name(&self) -> &'static str {
        "emerson-lei"
    }

    fn check_with_budget(&self, aut: &Automaton, budget: &mut dyn Budget) -> Verdict {
        if aut.is_empty() || aut.initial_states().is_empty() {
            return Verdict::Empty;
        }
        let inv = aut.inverse();
        let mut fixpoint = Fixpoint { aut, inv: &inv, budget };
        match fixpoint.run() {
            Ok(Some(lasso)) => Verdict::NonEmpty(lasso),
            Ok(None) => Verdict::Empty,
            Err(e) => Verdict::Inconclusive(e),
        }
    }
}

struct Fixpoint<'a> {
    aut: &'a Automaton,
    inv: &'a InverseAutomaton,
    budget: &'a mut dyn Budget,
}

impl Fixpoint<'_> {
    fn run(&mut self) -> Result<Option<Lasso>, ResourceExhausted> {
        let all = StateSet::full(self.aut.num_states());
        let initial: StateSet = self.aut.initial_states().iter().copied().collect();
        let mut candidate = self.forward_closure(&initial, &all)?;
        let mut accepting: Vec<StateSet>;

        let mut round = 0;
        loop {
            round += 1;
            let before = candidate.len();
            self.trim(&mut candidate);
            self.restrict_to_acceptance(&mut candidate)?;
            accepting = self.accepting_components(&candidate)?;
            candidate.clear();
            for scc in &accepting {
                candidate.union_with(scc);
            }
            debug!(
                "emerson-lei: round {}: {} -> {} candidates in {} components",
                round,
                before,
                candidate.len(),
                accepting.len()
            );
            if candidate.is_empty() || candidate.len() == before {
                break;
            }
        }

        for scc in &accepting {
            let Some(target) = scc.first() else { continue };
            let Some((prefix, mut edges)) = prefix_to(self.aut, target) else {
                continue;
            };
            if let Some((cycle, cycle_edges)) = covering_cycle(self.aut, scc, target) {
                edges.extend(cycle_edges);
                return Ok(Some(Lasso { prefix, cycle, edges }));
            }
        }
        Ok(None)
    }

    /// States of `within` reachable from `sources` inside `within`.
    fn forward_closure(&mut self, sources: &StateSet, within: &StateSet) -> Result<StateSet, ResourceExhausted> {
        let mut seen = sources.intersection(within);
        let mut queue: VecDeque<StateId> = seen.iter().collect();
        while let Some(q) = queue.pop_front() {
            self.budget.expand(q)?;
            for &e in self.aut.successors(q) {
                let t = self.aut.transition(e).to;
                if within.contains(t) && seen.insert(t) {
                    queue.push_back(t);
                }
            }
        }
        Ok(seen)
    }

    fn trim(&self, candidate: &mut StateSet) {
        loop {
            let doomed: Vec<StateId> = candidate
                .iter()
                .filter(|&q| {
                    let has_succ = self
                        .aut
                        .successors(q)
                        .iter()
                        .any(|&e| candidate.contains(self.aut.transition(e).to));
                    let has_pred = self.inv.predecessors(q).iter().any(|t| candidate.contains(t.to));
                    !has_succ || !has_pred
                })
                .collect();
            if doomed.is_empty() {
                return;
            }
            for q in doomed {
                candidate.remove(q);
            }
        }
    }

    /// Keeps, for every set, the states that reach an internal transition carrying it.
    fn restrict_to_acceptance(&mut self, candidate: &mut StateSet) -> Result<(), ResourceExhausted> {
        for set in self.aut.all_sets().sets() {
            let mut sources = StateSet::with_capacity(self.aut.num_states());
            for q in candidate.iter() {
                for t in self.inv.accepting_predecessors(q) {
                    if t.acc.contains(set) && candidate.contains(t.to) {
                        sources.insert(t.to);
                    }
                }
            }
            *candidate = self.inv.backward_closure(&sources, candidate, &mut *self.budget)?;
        }
        Ok(())
    }

    /// Forward/backward SCC decomposition of `candidate`, keeping accepting components.
    fn accepting_components(&mut self, candidate: &StateSet) -> Result<Vec<StateSet>, ResourceExhausted> {
        let required = self.aut.all_sets();
        let mut result = Vec::new();
        let mut work = vec![candidate.clone()];
        while let Some(set) = work.pop() {
            let Some(pivot) = set.first() else { continue };
            let pivot_set: StateSet = [pivot].into_iter().collect();
            let fwd = self.forward_closure(&pivot_set, &set)?;
            let bwd = self.inv.backward_closure(&pivot_set, &set, &mut *self.budget)?;
            let scc = fwd.intersection(&bwd);

            if let Some(acc) = self.internal_acceptance(&scc) {
                if acc.covers(required) {
                    result.push(scc.clone());
                }
            }

            let mut rest = set.difference(&fwd);
            rest.difference_with(&bwd);
            work.push(fwd.difference(&scc));
            work.push(bwd.difference(&scc));
            work.push(rest);
        }
        Ok(result)
    }

    /// Union of masks on transitions inside `scc`, or `None` if there is none.
    fn internal_acceptance(&self, scc: &StateSet) -> Option<AccMask> {
        let mut acc = None;
        for q in scc.iter() {
            for &e in self.aut.successors(q) {
                let t = self.aut.transition(e);
                if scc.contains(t.to) {
                    *acc.get_or_insert(AccMask::EMPTY) |= t.acc;
                }
            }
        }
        acc
    }
}
