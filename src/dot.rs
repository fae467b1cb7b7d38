//! Automaton to DOT (Graphviz) conversion.
//!
//! The generated output follows these conventions:
//! - **States** are circles labeled `s<n>`; initial states get an extra
//!   invisible source node with an arrow pointing at them.
//! - **Transitions** are directed edges; accepting ones are labeled with their
//!   acceptance sets (`{0,2}`).
//! - **Witness**: when a [`Lasso`] is given, the states and edges of its prefix
//!   and cycle are highlighted in different colors.
//!
//! # Examples
//!
//! ```
//! use buchi_rs::automaton::Automaton;
//! use buchi_rs::dot::{to_dot, DotConfig};
//! use buchi_rs::types::StateId;
//!
//! let mut aut = Automaton::with_states(2, 1).unwrap();
//! aut.add_initial(StateId::new(0)).unwrap();
//! aut.add_transition_sets(StateId::new(0), StateId::new(1), [0]).unwrap();
//!
//! let dot = to_dot(&aut, None, &DotConfig::default()).unwrap();
//! assert!(dot.starts_with("digraph {"));
//! // Render with: dot -Tpng output.dot -o output.png
//! ```

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::automaton::Automaton;
use crate::check::Lasso;
use crate::types::EdgeId;

/// Configuration options for DOT output generation.
///
/// Use `DotConfig::default()` for standard settings.
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for states (default: "circle")
    pub state_shape: &'static str,
    /// Graph layout direction (default: "LR")
    pub rankdir: &'static str,
    /// Color of prefix states and edges of a witness (default: "blue")
    pub prefix_color: &'static str,
    /// Color of cycle states and edges of a witness (default: "red")
    pub cycle_color: &'static str,
    /// Whether to label accepting transitions with their sets (default: true)
    pub show_acceptance: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            state_shape: "circle",
            rankdir: "LR",
            prefix_color: "blue",
            cycle_color: "red",
            show_acceptance: true,
        }
    }
}

/// Renders `aut` in DOT format, highlighting `witness` if given.
pub fn to_dot(aut: &Automaton, witness: Option<&Lasso>, config: &DotConfig) -> Result<String, std::fmt::Error> {
    let mut dot = String::new();
    writeln!(dot, "digraph {{")?;
    writeln!(dot, "rankdir={};", config.rankdir)?;
    writeln!(dot, "node [shape={}];", config.state_shape)?;

    let (prefix_edges, cycle_edges): (HashSet<EdgeId>, HashSet<EdgeId>) = match witness {
        Some(lasso) => {
            let split = lasso.prefix.len().min(lasso.edges.len());
            (
                lasso.edges[..split].iter().copied().collect(),
                lasso.cycle_edges().iter().copied().collect(),
            )
        }
        None => Default::default(),
    };

    // Initial arrows
    for (i, q) in aut.initial_states().iter().enumerate() {
        writeln!(dot, "init{} [shape=point, style=invis];", i)?;
        writeln!(dot, "init{} -> {};", i, q.id())?;
    }

    for q in aut.states() {
        let color = match witness {
            Some(l) if l.cycle.contains(&q) => Some(config.cycle_color),
            Some(l) if l.prefix.contains(&q) => Some(config.prefix_color),
            _ => None,
        };
        match color {
            Some(c) => writeln!(dot, "{} [label=\"{}\", color={}];", q.id(), q, c)?,
            None => writeln!(dot, "{} [label=\"{}\"];", q.id(), q)?,
        }
    }

    for (i, t) in aut.transitions().iter().enumerate() {
        let e = EdgeId::new(i as u32);
        let mut attrs = Vec::new();
        if config.show_acceptance && !t.acc.is_empty() {
            attrs.push(format!("label=\"{}\"", t.acc));
        }
        if cycle_edges.contains(&e) {
            attrs.push(format!("color={}, penwidth=2", config.cycle_color));
        } else if prefix_edges.contains(&e) {
            attrs.push(format!("color={}", config.prefix_color));
        }
        if attrs.is_empty() {
            writeln!(dot, "{} -> {};", t.from.id(), t.to.id())?;
        } else {
            writeln!(dot, "{} -> {} [{}];", t.from.id(), t.to.id(), attrs.join(", "))?;
        }
    }

    writeln!(dot, "}}")?;
    Ok(dot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Algorithm;
    use crate::types::StateId;

    fn sample() -> Automaton {
        // 0 -> 1 -{0}-> 1
        let mut aut = Automaton::with_states(2, 1).unwrap();
        aut.add_initial(StateId::new(0)).unwrap();
        aut.add_transition_sets(StateId::new(0), StateId::new(1), []).unwrap();
        aut.add_transition_sets(StateId::new(1), StateId::new(1), [0]).unwrap();
        aut
    }

    /// Basic test: verify DOT output is generated without errors
    #[test]
    fn test_to_dot_basic() {
        let dot = to_dot(&sample(), None, &DotConfig::default()).unwrap();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("init0 -> 0;"));
        assert!(dot.contains("1 -> 1 [label=\"{0}\"];"));
        assert!(dot.contains("0 -> 1;"));
    }

    #[test]
    fn test_to_dot_witness() {
        let aut = sample();
        let verdict = Algorithm::TwoStackDfs.check(&aut);
        let dot = to_dot(&aut, verdict.witness(), &DotConfig::default()).unwrap();
        assert!(dot.contains("0 [label=\"s0\", color=blue];"));
        assert!(dot.contains("1 [label=\"s1\", color=red];"));
        assert!(dot.contains("0 -> 1 [color=blue];"));
        assert!(dot.contains("1 -> 1 [label=\"{0}\", color=red, penwidth=2];"));
    }

    /// Test with custom configuration
    #[test]
    fn test_to_dot_with_config() {
        let config = DotConfig {
            show_acceptance: false,
            state_shape: "ellipse",
            ..DotConfig::default()
        };
        let dot = to_dot(&sample(), None, &config).unwrap();
        assert!(dot.contains("node [shape=ellipse];"));
        assert!(!dot.contains("label=\"{0}\""));
    }
}
