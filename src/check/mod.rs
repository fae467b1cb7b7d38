//! Emptiness checking.
//!
//! Three interchangeable algorithms decide whether an [`Automaton`] accepts
//! some infinite run:
//!
//! | Algorithm | Strategy | Passes |
//! |-----------|----------|--------|
//! | [`NestedDfs`] | outer DFS + inner cycle search per accepting transition, over the degeneralized product | two interleaved |
//! | [`TwoStackDfs`] | single DFS with a live-state stack and a root/acceptance stack | one |
//! | [`EmersonLei`] | fixpoint over candidate states, SCCs by forward/backward reachability | up to one per acceptance set and iteration |
//!
//! All three return the same [`Verdict`] contract and agree on every input.
//! A non-empty verdict carries a [`Lasso`] witness.
//!
//! # Example
//!
//! ```
//! use buchi_rs::automaton::Automaton;
//! use buchi_rs::check::{Algorithm, Verdict};
//! use buchi_rs::types::{AccMask, AccSet, StateId};
//!
//! let mut aut = Automaton::with_states(1, 1).unwrap();
//! let s0 = StateId::new(0);
//! aut.add_initial(s0).unwrap();
//! aut.add_transition(s0, s0, AccMask::single(AccSet::new(0))).unwrap();
//!
//! for alg in Algorithm::ALL {
//!     let verdict = alg.check(&aut);
//!     let lasso = verdict.witness().unwrap();
//!     assert!(lasso.prefix.is_empty());
//!     assert_eq!(lasso.cycle, vec![s0]);
//! }
//! ```
//!
//! # Bounding exploration
//!
//! Every checker asks its [`Budget`] before expanding a state. An exhausted
//! budget ends the check with [`Verdict::Inconclusive`], which must not be
//! read as "empty".

use std::fmt;
use std::str::FromStr;

use crate::automaton::Automaton;
use crate::error::ResourceExhausted;
use crate::types::StateId;

mod emerson_lei;
mod lasso;
mod nested;
mod two_stack;

pub use emerson_lei::EmersonLei;
pub use lasso::{Lasso, WitnessError};
pub use nested::NestedDfs;
pub use two_stack::TwoStackDfs;

/// Outcome of an emptiness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// No accepting run exists.
    Empty,
    /// An accepting run exists; the lasso is one.
    NonEmpty(Lasso),
    /// The check stopped before reaching an answer.
    Inconclusive(ResourceExhausted),
}

impl Verdict {
    pub fn is_empty(&self) -> bool {
        matches!(self, Verdict::Empty)
    }

    pub fn is_nonempty(&self) -> bool {
        matches!(self, Verdict::NonEmpty(_))
    }

    pub fn is_inconclusive(&self) -> bool {
        matches!(self, Verdict::Inconclusive(_))
    }

    pub fn witness(&self) -> Option<&Lasso> {
        match self {
            Verdict::NonEmpty(lasso) => Some(lasso),
            _ => None,
        }
    }

    /// `Some(true)` for empty, `Some(false)` for non-empty, `None` if inconclusive.
    pub fn emptiness(&self) -> Option<bool> {
        match self {
            Verdict::Empty => Some(true),
            Verdict::NonEmpty(_) => Some(false),
            Verdict::Inconclusive(_) => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Empty => write!(f, "EMPTY"),
            Verdict::NonEmpty(lasso) => write!(f, "NONEMPTY {}", lasso),
            Verdict::Inconclusive(reason) => write!(f, "INCONCLUSIVE ({})", reason),
        }
    }
}

/// Exploration bound, consulted once per state expansion.
pub trait Budget {
    fn expand(&mut self, state: StateId) -> Result<(), ResourceExhausted>;
}

/// No bound at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Budget for Unbounded {
    #[inline]
    fn expand(&mut self, _state: StateId) -> Result<(), ResourceExhausted> {
        Ok(())
    }
}

/// Allows at most `limit` state expansions.
#[derive(Debug, Clone)]
pub struct StepLimit {
    limit: u64,
    used: u64,
}

impl StepLimit {
    pub fn new(limit: u64) -> Self {
        Self { limit, used: 0 }
    }

    /// Number of expansions performed so far.
    pub fn used(&self) -> u64 {
        self.used
    }
}

impl Budget for StepLimit {
    fn expand(&mut self, _state: StateId) -> Result<(), ResourceExhausted> {
        if self.used >= self.limit {
            return Err(ResourceExhausted::Steps { limit: self.limit });
        }
        self.used += 1;
        Ok(())
    }
}

/// Adapts a callback into a [`Budget`]; returning `false` interrupts the check.
pub struct Hook<F>(pub F);

impl<F: FnMut(StateId) -> bool> Budget for Hook<F> {
    fn expand(&mut self, state: StateId) -> Result<(), ResourceExhausted> {
        if (self.0)(state) {
            Ok(())
        } else {
            Err(ResourceExhausted::Interrupted {
                reason: format!("hook refused to expand {}", state),
            })
        }
    }
}

/// An emptiness decision procedure.
pub trait EmptinessChecker {
    fn name(&self) -> &'static str;

    fn check_with_budget(&self, aut: &Automaton, budget: &mut dyn Budget) -> Verdict;

    fn check(&self, aut: &Automaton) -> Verdict {
        self.check_with_budget(aut, &mut Unbounded)
    }
}

/// Tag selecting one of the checkers.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Algorithm {
    NestedDfs,
    TwoStackDfs,
    EmersonLei,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::NestedDfs, Algorithm::TwoStackDfs, Algorithm::EmersonLei];

    pub fn name(self) -> &'static str {
        self.checker().name()
    }

    pub fn checker(self) -> &'static dyn EmptinessChecker {
        match self {
            Algorithm::NestedDfs => &NestedDfs,
            Algorithm::TwoStackDfs => &TwoStackDfs,
            Algorithm::EmersonLei => &EmersonLei,
        }
    }

    pub fn check(self, aut: &Automaton) -> Verdict {
        self.checker().check(aut)
    }

    pub fn check_with_budget(self, aut: &Automaton, budget: &mut dyn Budget) -> Verdict {
        self.checker().check_with_budget(aut, budget)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "nested" | "nested-dfs" | "ndfs" => Ok(Algorithm::NestedDfs),
            "two-stack" | "two-stack-dfs" | "couvreur" => Ok(Algorithm::TwoStackDfs),
            "emerson-lei" | "el" | "bfs" => Ok(Algorithm::EmersonLei),
            _ => Err(format!("unknown algorithm '{}'", s)),
        }
    }
}
