//! Nested depth-first search.
//!
//! The outer DFS explores the degeneralized product `(state, level)` (see
//! [`Levels`]), so a single accepting transition kind is enough even for
//! generalized automata. Whenever the outer DFS *completes* an accepting
//! product transition `p -> r` (that is, after `r` has been post-visited, or
//! immediately if `r` was already visited), an inner DFS starts at `r` and
//! looks for any product state on the outer stack. Such a state reaches `p`
//! along the stack, so hitting it closes a cycle through the accepting
//! transition.
//!
//! Inner searches run one at a time and their marks are kept between
//! searches: a state explored by an earlier inner search cannot lie on an
//! accepting cycle missed so far (completions are processed in post-order).
//! Each product state is therefore visited at most once by each pass.
//!
//! Both passes use explicit heap-allocated stacks.

use log::debug;

use crate::automaton::Automaton;
use crate::check::lasso::Lasso;
use crate::check::{Budget, EmptinessChecker, Verdict};
use crate::degeneralize::Levels;
use crate::error::ResourceExhausted;
use crate::types::{EdgeId, StateId};

/// Nested DFS emptiness checker.
#[derive(Debug, Clone, Copy, Default)]
pub struct NestedDfs;

impl EmptinessChecker for NestedDfs {
    fn name(&self) -> &'static str {
        "nested-dfs"
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

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Outer {
    Unvisited,
    OnStack,
    Done,
}

#[derive(Debug)]
struct Frame {
    state: StateId,
    level: usize,
    /// Index of the next outgoing edge to explore.
    next: usize,
    /// Edge that led to this frame, and whether it is accepting in the product.
    via: Option<(EdgeId, bool)>,
}

struct Search<'a> {
    aut: &'a Automaton,
    budget: &'a mut dyn Budget,
    levels: Levels,
    outer: Vec<Outer>,
    inner: Vec<bool>,
    stack: Vec<Frame>,
    inner_searches: usize,
}

impl<'a> Search<'a> {
    fn new(aut: &'a Automaton, budget: &'a mut dyn Budget) -> Self {
        let levels = Levels::new(aut.num_sets());
        let size = aut.num_states() * levels.count();
        Self {
            aut,
            budget,
            levels,
            outer: vec![Outer::Unvisited; size],
            inner: vec![false; size],
            stack: Vec::new(),
            inner_searches: 0,
        }
    }

    fn key(&self, state: StateId, level: usize) -> usize {
        state.index() * self.levels.count() + level
    }

    fn push_outer(&mut self, state: StateId, level: usize, via: Option<(EdgeId, bool)>) -> Result<(), ResourceExhausted> {
        self.budget.expand(state)?;
        let k = self.key(state, level);
        self.outer[k] = Outer::OnStack;
        self.stack.push(Frame {
            state,
            level,
            next: 0,
            via,
        });
        Ok(())
    }

    fn run(&mut self) -> Result<Option<Lasso>, ResourceExhausted> {
        let aut = self.aut;
        for &init in aut.initial_states() {
            if self.outer[self.key(init, 0)] != Outer::Unvisited {
                continue;
            }
            self.push_outer(init, 0, None)?;

            while let Some(top) = self.stack.last_mut() {
                let succ = aut.successors(top.state);
                if top.next < succ.len() {
                    let e = succ[top.next];
                    top.next += 1;
                    let level = top.level;
                    let t = aut.transition(e);
                    let (next_level, accepting) = self.levels.step(level, t.acc);
                    if self.outer[self.key(t.to, next_level)] == Outer::Unvisited {
                        self.push_outer(t.to, next_level, Some((e, accepting)))?;
                    } else if accepting {
                        if let Some(lasso) = self.inner_search(e, t.to, next_level)? {
                            return Ok(Some(lasso));
                        }
                    }
                } else {
                    let Some(frame) = self.stack.pop() else { break };
                    let k = self.key(frame.state, frame.level);
                    self.outer[k] = Outer::Done;
                    if let Some((e, true)) = frame.via {
                        if let Some(lasso) = self.inner_search(e, frame.state, frame.level)? {
                            return Ok(Some(lasso));
                        }
                    }
                }
            }
        }
        debug!("nested: empty after {} inner searches", self.inner_searches);
        Ok(None)
    }

    /// Inner DFS started after the accepting edge `seed` (from the top of the
    /// outer stack) into `(start, level)`.
    fn inner_search(&mut self, seed: EdgeId, start: StateId, level: usize) -> Result<Option<Lasso>, ResourceExhausted> {
        let aut = self.aut;
        if self.outer[self.key(start, level)] == Outer::OnStack {
            return Ok(Some(self.build_lasso(seed, &[], start, level)));
        }
        let k = self.key(start, level);
        if self.inner[k] {
            return Ok(None);
        }
        self.inner_searches += 1;
        debug!("nested: inner search #{} from {}@{}", self.inner_searches, start, level);

        self.budget.expand(start)?;
        self.inner[k] = true;
        // (state, level, next edge index); path[i] enters stack[i + 1]
        let mut stack: Vec<(StateId, usize, usize)> = vec![(start, level, 0)];
        let mut path: Vec<EdgeId> = Vec::new();

        while let Some(top) = stack.last_mut() {
            let (q, l, next) = *top;
            let succ = aut.successors(q);
            if next >= succ.len() {
                stack.pop();
                path.pop();
                continue;
            }
            top.2 += 1;
            let e = succ[next];
            let t = aut.transition(e);
            let (nl, _) = self.levels.step(l, t.acc);
            let nk = self.key(t.to, nl);
            if self.outer[nk] == Outer::OnStack {
                path.push(e);
                return Ok(Some(self.build_lasso(seed, &path, t.to, nl)));
            }
            if !self.inner[nk] {
                self.budget.expand(t.to)?;
                self.inner[nk] = true;
                stack.push((t.to, nl, 0));
                path.push(e);
            }
        }
        Ok(None)
    }

    /// The cycle runs along the outer stack from `(hit, hit_level)` to its top,
    /// takes `seed`, then follows `inner_path` back to `hit`.
    fn build_lasso(&self, seed: EdgeId, inner_path: &[EdgeId], hit: StateId, hit_level: usize) -> Lasso {
        let aut = self.aut;
        let j = self
            .stack
            .iter()
            .position(|f| f.state == hit && f.level == hit_level)
            .unwrap_or(0);

        let prefix: Vec<StateId> = self.stack[..j].iter().map(|f| f.state).collect();
        let mut cycle: Vec<StateId> = self.stack[j..].iter().map(|f| f.state).collect();
        cycle.extend(inner_path.iter().map(|&e| aut.transition(e).from));

        let mut edges: Vec<EdgeId> = self.stack[1..].iter().filter_map(|f| f.via.map(|(e, _)| e)).collect();
        edges.push(seed);
        edges.extend_from_slice(inner_path);

        debug!("nested: accepting cycle through {} ({} states)", hit, cycle.len());
        Lasso { prefix, cycle, edges }
    }
}
