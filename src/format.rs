//! Line-oriented text format for automata.
//!
//! ```text
//! c any comment
//! gba <num_states> <num_sets>
//! i <state>
//! t <from> <to> [<set> ...]
//! ```
//!
//! The `gba` header comes first (after comments and blank lines). States are
//! zero-based. Transitions are listed in edge-id order, so writing and parsing
//! an automaton preserves its [`EdgeId`][crate::types::EdgeId]s.

use std::fmt;
use std::fs;
use std::path::Path;

use log::debug;

use crate::automaton::Automaton;
use crate::error::FormatError;
use crate::types::StateId;

/// Writes `aut` in the text format.
pub fn to_text(aut: &Automaton) -> String {
    Text(aut).to_string()
}

struct Text<'a>(&'a Automaton);

impl fmt::Display for Text<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let aut = self.0;
        writeln!(f, "gba {} {}", aut.num_states(), aut.num_sets())?;
        for q in aut.initial_states() {
            writeln!(f, "i {}", q.id())?;
        }
        for t in aut.transitions() {
            write!(f, "t {} {}", t.from.id(), t.to.id())?;
            for set in t.acc.sets() {
                write!(f, " {}", set.index())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Parses an automaton from the text format.
pub fn parse(input: &str) -> Result<Automaton, FormatError> {
    let mut aut: Option<Automaton> = None;

    for (i, raw) in input.lines().enumerate() {
        let line = i + 1;
        let mut tokens = raw.split_whitespace();
        let Some(tag) = tokens.next() else { continue };
        match tag {
            "c" => continue,
            "gba" => {
                if aut.is_some() {
                    return Err(FormatError::parse(line, "duplicate header"));
                }
                let num_states = number(tokens.next(), line, "number of states")?;
                let num_sets = number(tokens.next(), line, "number of sets")?;
                expect_end(tokens, line)?;
                aut = Some(Automaton::with_states(num_states, num_sets)?);
            }
            "i" | "t" => {
                let Some(a) = aut.as_mut() else {
                    return Err(FormatError::parse(line, "missing `gba` header"));
                };
                if tag == "i" {
                    let q = state(tokens.next(), line)?;
                    expect_end(tokens, line)?;
                    a.add_initial(q)?;
                } else {
                    let from = state(tokens.next(), line)?;
                    let to = state(tokens.next(), line)?;
                    let sets = tokens
                        .map(|tok| number(Some(tok), line, "acceptance set"))
                        .collect::<Result<Vec<_>, _>>()?;
                    a.add_transition_sets(from, to, sets)?;
                }
            }
            other => return Err(FormatError::parse(line, format!("unknown line kind `{}`", other))),
        }
    }

    let aut = aut.ok_or_else(|| FormatError::parse(input.lines().count().max(1), "missing `gba` header"))?;
    debug!(
        "parsed automaton: {} states, {} transitions, {} sets",
        aut.num_states(),
        aut.num_transitions(),
        aut.num_sets()
    );
    Ok(aut)
}

/// Writes `aut` to the file at `path`.
pub fn save(aut: &Automaton, path: impl AsRef<Path>) -> Result<(), FormatError> {
    fs::write(path, to_text(aut))?;
    Ok(())
}

/// Reads an automaton from the file at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<Automaton, FormatError> {
    let text = fs::read_to_string(path)?;
    parse(&text)
}

fn number(token: Option<&str>, line: usize, what: &str) -> Result<usize, FormatError> {
    let token = token.ok_or_else(|| FormatError::parse(line, format!("missing {}", what)))?;
    token
        .parse()
        .map_err(|_| FormatError::parse(line, format!("invalid {} `{}`", what, token)))
}

fn state(token: Option<&str>, line: usize) -> Result<StateId, FormatError> {
    let n = number(token, line, "state")?;
    let id = u32::try_from(n).map_err(|_| FormatError::parse(line, format!("state {} is too large", n)))?;
    Ok(StateId::new(id))
}

fn expect_end<'a>(mut tokens: impl Iterator<Item = &'a str>, line: usize) -> Result<(), FormatError> {
    match tokens.next() {
        None => Ok(()),
        Some(tok) => Err(FormatError::parse(line, format!("unexpected token `{}`", tok))),
    }
}
