//! # buchi-rs: Emptiness checking for generalized Büchi automata
//!
//! **`buchi-rs`** decides whether an explicit-state generalized Büchi automaton
//! accepts any infinite run, and produces a lasso-shaped witness when it does.
//!
//! ## What is the emptiness problem?
//!
//! A generalized Büchi automaton has several acceptance sets; a run is
//! accepting when it visits every set infinitely often. The automaton is
//! **non-empty** iff some initial state reaches a cycle whose transitions, in
//! union, cover every acceptance set. Such a run is a *lasso*: a finite prefix
//! followed by a cycle repeated forever.
//!
//! ## Key Features
//!
//! - **Arena-and-index graph**: states and transitions are dense indices into
//!   flat vectors owned by the [`Automaton`][crate::automaton::Automaton]; no
//!   linked nodes, no shared ownership.
//! - **Transition-based acceptance**: each transition carries an
//!   [`AccMask`][crate::types::AccMask] of up to 64 acceptance sets.
//! - **Three checkers, one contract**: nested DFS, two-stack DFS and an
//!   Emerson–Lei style fixpoint, all returning a
//!   [`Verdict`][crate::check::Verdict]. All searches use explicit stacks.
//! - **Bounded exploration**: a [`Budget`][crate::check::Budget] hook can stop a
//!   check early; the verdict is then *inconclusive*, never "empty".
//!
//! ## Basic Usage
//!
//! ```rust
//! use buchi_rs::automaton::Automaton;
//! use buchi_rs::check::Algorithm;
//! use buchi_rs::types::StateId;
//!
//! // 1. Two acceptance sets, two states
//! let mut aut = Automaton::with_states(2, 2).unwrap();
//! let (s0, s1) = (StateId::new(0), StateId::new(1));
//! aut.add_initial(s0).unwrap();
//!
//! // 2. A cycle s0 -> s1 -> s0 visiting both sets
//! aut.add_transition_sets(s0, s1, [0]).unwrap();
//! aut.add_transition_sets(s1, s0, [1]).unwrap();
//!
//! // 3. Every algorithm finds the same accepting cycle
//! for alg in Algorithm::ALL {
//!     let verdict = alg.check(&aut);
//!     let lasso = verdict.witness().unwrap();
//!     assert_eq!(lasso.cycle, vec![s0, s1]);
//!     assert!(lasso.validate(&aut).is_ok());
//! }
//! ```
//!
//! ## Core Components
//!
//! - **[`automaton`]** and **[`inverse`]**: the forward graph and its reversal.
//! - **[`check`]**: the verdict contract and the three checkers.
//! - **[`degeneralize`]**: reduction to a single acceptance set.
//! - **[`generator`]**, **[`format`]**, **[`dot`]**: random automata, text exchange format, Graphviz output.
//! - **[`statistic`]**: repeated timed trials for comparing the checkers.

pub mod automaton;
pub mod bitset;
pub mod check;
pub mod degeneralize;
pub mod dot;
pub mod error;
pub mod format;
pub mod generator;
pub mod inverse;
pub mod statistic;
pub mod types;
