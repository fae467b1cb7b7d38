//! Error types.
//!
//! Structural errors are raised while an automaton is built and never again:
//! checkers assume a validated automaton. Resource exhaustion is not an `Err`
//! at the checker surface, it is carried inside
//! [`Verdict::Inconclusive`][crate::check::Verdict::Inconclusive].

use std::io;

use thiserror::Error;

use crate::types::{AccMask, StateId};

/// Invalid automaton structure, detected at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    /// A transition endpoint (or initial state) does not name an existing state.
    #[error("state {state} does not exist (automaton has {num_states} states)")]
    DanglingEndpoint { state: StateId, num_states: usize },

    /// An acceptance mask uses sets beyond the declared count.
    #[error("acceptance mask {mask} does not fit {num_sets} declared sets")]
    AcceptanceWidth { mask: AccMask, num_sets: usize },

    /// An acceptance set id is outside `0..num_sets`.
    #[error("acceptance set {set} out of range (automaton declares {num_sets} sets)")]
    AcceptanceSetOutOfRange { set: usize, num_sets: usize },

    /// More acceptance sets than a mask can encode.
    #[error("cannot declare {requested} acceptance sets (at most {max})", max = AccMask::MAX_SETS)]
    TooManyAcceptanceSets { requested: usize },

    /// Adding states would overflow the state index space.
    #[error("cannot add {requested} states (at most {max} in total)", max = u32::MAX)]
    TooManyStates { requested: usize },
}

/// The exploration did not finish within caller-imposed bounds.
///
/// Distinct from a proof of emptiness: a check ending with this reason proved
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceExhausted {
    #[error("step limit of {limit} state expansions reached")]
    Steps { limit: u64 },

    #[error("interrupted: {reason}")]
    Interrupted { reason: String },
}

/// Errors of the textual exchange format.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid automaton: {0}")]
    Structural(#[from] StructuralError),
}

impl FormatError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        FormatError::Parse {
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_structural_messages() {
        let e = StructuralError::DanglingEndpoint {
            state: StateId::new(5),
            num_states: 2,
        };
        assert_eq!(e.to_string(), "state s5 does not exist (automaton has 2 states)");

        let e = StructuralError::AcceptanceWidth {
            mask: AccMask::from_bits(0b100),
            num_sets: 2,
        };
        assert_eq!(e.to_string(), "acceptance mask {2} does not fit 2 declared sets");

        let e = StructuralError::TooManyAcceptanceSets { requested: 65 };
        assert_eq!(e.to_string(), "cannot declare 65 acceptance sets (at most 64)");

        let e = StructuralError::TooManyStates { requested: 7 };
        assert_eq!(e.to_string(), "cannot add 7 states (at most 4294967295 in total)");
    }

    #[test]
    fn test_format_error_from_structural() {
        let e: FormatError = StructuralError::AcceptanceSetOutOfRange { set: 3, num_sets: 1 }.into();
        assert!(matches!(e, FormatError::Structural(_)));
        assert_eq!(
            FormatError::parse(4, "bad token").to_string(),
            "parse error at line 4: bad token"
        );
    }
}
