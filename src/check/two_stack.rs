//! Two-stack depth-first search.
//!
//! A single DFS maintains, next to the DFS call stack itself:
//!
//! - the **live stack**: discovered states whose component is not closed yet,
//!   in discovery order (states leave it when their component's root finishes);
//! - the **root stack**: one entry per candidate component, holding the root's
//!   discovery number, the union of acceptance masks collected inside the
//!   component so far, and the mask of the transition that entered the root.
//!
//! A transition into a live state closes a cycle: every root discovered after
//! the target is merged into the component below it and their masks are
//! united with the transition's mask. As soon as a merged component covers
//! every acceptance set the automaton is non-empty; no second pass is needed.

use log::debug;

use crate::automaton::Automaton;
use crate::bitset::StateSet;
use crate::check::lasso::{covering_cycle, Lasso};
use crate::check::{Budget, EmptinessChecker, Verdict};
use crate::error::ResourceExhausted;
use crate::types::{AccMask, EdgeId, StateId};

/// Two-stack DFS emptiness checker.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoStackDfs;

impl EmptinessChecker for TwoStackDfs {
    fn name(&self) -> &'static str {
        "two-stack-dfs"
    }

    fn check_with_budget(&self, aut: &Automaton, budget: &mut dyn Budget) -> Verdict {
        if aut.is_empty() || aut.initial_states().is_empty() {
            return Verdict::Empty;
        }
        let mut search = Search::new(aut, budget);
        match search.run() {
            Ok(Some(lasso)) => Verdict::NonEmpty(lasso),
            Ok(None) => Verdict::Empty,
            Err(e) => Verdict::Inconclusive(e),
        }
    }
}

#[derive(Debug)]
struct Root {
    state: StateId,
    num: u32,
    acc: AccMask,
    incoming: AccMask,
}

#[derive(Debug)]
struct Frame {
    state: StateId,
    next: usize,
    via: Option<EdgeId>,
}

struct Search<'a> {
    aut: &'a Automaton,
    budget: &'a mut dyn Budget,
    /// Discovery number per state, 0 if not yet discovered.
    num: Vec<u32>,
    counter: u32,
    live: StateSet,
    live_stack: Vec<StateId>,
    roots: Vec<Root>,
    dfs: Vec<Frame>,
}

impl<'a> Search<'a> {
    fn new(aut: &'a Automaton, budget: &'a mut dyn Budget) -> Self {
        Self {
            aut,
            budget,
            num: vec![0; aut.num_states()],
            counter: 0,
            live: StateSet::with_capacity(aut.num_states()),
            live_stack: Vec::new(),
            roots: Vec::new(),
            dfs: Vec::new(),
        }
    }

    fn push(&mut self, state: StateId, via: Option<EdgeId>, incoming: AccMask) -> Result<(), ResourceExhausted> {
        self.budget.expand(state)?;
        self.counter += 1;
        self.num[state.index()] = self.counter;
        self.live.insert(state);
        self.live_stack.push(state);
        self.roots.push(Root {
            state,
            num: self.counter,
            acc: AccMask::EMPTY,
            incoming,
        });
        self.dfs.push(Frame { state, next: 0, via });
        Ok(())
    }

    fn run(&mut self) -> Result<Option<Lasso>, ResourceExhausted> {
        let aut = self.aut;
        let all = aut.all_sets();
        for &init in aut.initial_states() {
            if self.num[init.index()] != 0 {
                continue;
            }
            self.push(init, None, AccMask::EMPTY)?;

            while let Some(top) = self.dfs.last_mut() {
                let q = top.state;
                let succ = aut.successors(q);
                if top.next < succ.len() {
                    let e = succ[top.next];
                    top.next += 1;
                    let t = aut.transition(e);
                    if self.num[t.to.index()] == 0 {
                        self.push(t.to, Some(e), t.acc)?;
                    } else if self.live.contains(t.to) {
                        if self.merge(t.to, t.acc).covers(all) {
                            return Ok(Some(self.build_lasso()));
                        }
                    }
                } else {
                    self.dfs.pop();
                    self.close(q);
                }
            }
        }
        debug!("two-stack: empty after {} states", self.counter);
        Ok(None)
    }

    /// Merges every root above `target` into the component containing it.
    /// Returns the merged component's mask.
    fn merge(&mut self, target: StateId, acc: AccMask) -> AccMask {
        let target_num = self.num[target.index()];
        let mut acc = acc;
        while self.roots.last().is_some_and(|r| r.num > target_num) {
            if let Some(r) = self.roots.pop() {
                acc |= r.acc | r.incoming;
            }
        }
        match self.roots.last_mut() {
            Some(root) => {
                root.acc |= acc;
                debug!("two-stack: merged into root {} with acc {}", root.state, root.acc);
                root.acc
            }
            None => AccMask::EMPTY,
        }
    }

    /// Pops the component rooted at `q` once `q` is finished.
    fn close(&mut self, q: StateId) {
        if self.roots.last().is_some_and(|r| r.state == q) {
            self.roots.pop();
            while let Some(s) = self.live_stack.pop() {
                self.live.remove(s);
                if s == q {
                    break;
                }
            }
        }
    }

    /// Prefix along the DFS stack to the top root; cycle rebuilt inside its component.
    fn build_lasso(&self) -> Lasso {
        let aut = self.aut;
        let Some(root) = self.roots.last() else {
            return Lasso {
                prefix: Vec::new(),
                cycle: Vec::new(),
                edges: Vec::new(),
            };
        };
        let component: StateSet = self
            .live_stack
            .iter()
            .copied()
            .filter(|s| self.num[s.index()] >= root.num)
            .collect();

        let j = self.dfs.iter().position(|f| f.state == root.state).unwrap_or(0);
        let prefix: Vec<StateId> = self.dfs[..j].iter().map(|f| f.state).collect();
        let mut edges: Vec<EdgeId> = self.dfs[1..=j].iter().filter_map(|f| f.via).collect();

        let (cycle, cycle_edges) = covering_cycle(aut, &component, root.state).unwrap_or_default();
        edges.extend(cycle_edges);
        debug!(
            "two-stack: accepting component of {} states rooted at {}",
            component.len(),
            root.state
        );
        Lasso { prefix, cycle, edges }
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
    fn test_self_loop() {
        let mut aut = Automaton::with_states(1, 1).unwrap();
        aut.add_initial(s(0)).unwrap();
        aut.add_transition_sets(s(0), s(0), [0]).unwrap();
        let v = TwoStackDfs.check(&aut);
        let lasso = v.witness().unwrap();
        assert_eq!(lasso.prefix, vec![]);
        assert_eq!(lasso.cycle, vec![s(0)]);
    }

    #[test]
    fn test_cross_edge_into_live_component() {
        // 0 -> 1 -{0}-> 2 -> 0, and 0 -> 3 -{1}-> 2.
        // The {1} edge reaches 2 through a cross edge, not a back edge.
        let mut aut = Automaton::with_states(4, 2).unwrap();
        aut.add_initial(s(0)).unwrap();
        aut.add_transition_sets(s(0), s(1), []).unwrap();
        aut.add_transition_sets(s(1), s(2), [0]).unwrap();
        aut.add_transition_sets(s(2), s(0), []).unwrap();
        aut.add_transition_sets(s(0), s(3), []).unwrap();
        aut.add_transition_sets(s(3), s(2), [1]).unwrap();
        let v = TwoStackDfs.check(&aut);
        let lasso = v.witness().unwrap();
        assert_eq!(lasso.validate(&aut), Ok(()));
        assert!(lasso.prefix.is_empty());
        assert_eq!(lasso.cycle[0], s(0));
    }

    #[test]
    fn test_dead_component_is_ignored() {
        // 0 -> 1 <-> 2 carrying only {0}; 0 -> 2.
        let mut aut = Automaton::with_states(3, 2).unwrap();
        aut.add_initial(s(0)).unwrap();
        aut.add_transition_sets(s(0), s(1), []).unwrap();
        aut.add_transition_sets(s(1), s(2), [0]).unwrap();
        aut.add_transition_sets(s(2), s(1), [0]).unwrap();
        aut.add_transition_sets(s(0), s(2), [1]).unwrap();
        assert_eq!(TwoStackDfs.check(&aut), Verdict::Empty);
    }

    #[test]
    fn test_prefix_follows_dfs_path() {
        // 0 -> 1 -> 2 -{0}-> 2
        let mut aut = Automaton::with_states(3, 1).unwrap();
        aut.add_initial(s(0)).unwrap();
        aut.add_transition_sets(s(0), s(1), []).unwrap();
        aut.add_transition_sets(s(1), s(2), []).unwrap();
        aut.add_transition_sets(s(2), s(2), [0]).unwrap();
        let v = TwoStackDfs.check(&aut);
        let lasso = v.witness().unwrap();
        assert_eq!(lasso.prefix, vec![s(0), s(1)]);
        assert_eq!(lasso.cycle, vec![s(2)]);
        assert_eq!(lasso.validate(&aut), Ok(()));
    }
}
