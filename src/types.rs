//! Type-safe wrappers for automaton states, transitions and acceptance sets.
//!
//! States and transitions are dense zero-based indices into the arenas owned by
//! [`Automaton`][crate::automaton::Automaton]. Keeping them as distinct newtypes
//! prevents mixing up a state index with a transition index in checker code.
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// A state identifier (0-indexed).
///
/// # Invariants
///
/// - A `StateId` handed out by an automaton is always `< num_states()` of that automaton
/// - States are never removed, so an id stays valid for the automaton's lifetime
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct StateId(u32);

impl StateId {
    /// Creates a state id from a raw index.
    pub const fn new(index: u32) -> Self {
        StateId(index)
    }

    /// Returns the raw index as a `usize`, suitable for indexing arenas.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw index as a `u32`.
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl From<StateId> for usize {
    fn from(state: StateId) -> Self {
        state.index()
    }
}

impl From<u32> for StateId {
    fn from(index: u32) -> Self {
        StateId(index)
    }
}

/// A transition (edge) identifier (0-indexed, in insertion order).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct EdgeId(u32);

impl EdgeId {
    pub const fn new(index: u32) -> Self {
        EdgeId(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// An acceptance set identifier (0-indexed).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct AccSet(u8);

impl AccSet {
    /// Creates an acceptance set id.
    ///
    /// # Panics
    ///
    /// Panics if `index >= AccMask::MAX_SETS`.
    pub fn new(index: usize) -> Self {
        assert!(
            index < AccMask::MAX_SETS,
            "Acceptance set index must be < {}",
            AccMask::MAX_SETS
        );
        AccSet(index as u8)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AccSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

/// A set of acceptance sets, stored as a bitmask (bit `i` is set `i`).
///
/// The mask itself has no width; an automaton declaring `k` sets only accepts
/// masks whose bits are all below `k` (see [`AccMask::fits`]).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct AccMask(u64);

impl AccMask {
    /// Maximum number of acceptance sets an automaton can declare.
    pub const MAX_SETS: usize = 64;

    /// The empty mask (no acceptance set).
    pub const EMPTY: AccMask = AccMask(0);

    pub const fn from_bits(bits: u64) -> Self {
        AccMask(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    /// The mask containing every set in `0..num_sets`.
    ///
    /// # Panics
    ///
    /// Panics if `num_sets > MAX_SETS`.
    pub fn all(num_sets: usize) -> Self {
        assert!(num_sets <= Self::MAX_SETS, "At most {} acceptance sets", Self::MAX_SETS);
        if num_sets == Self::MAX_SETS {
            AccMask(u64::MAX)
        } else {
            AccMask((1u64 << num_sets) - 1)
        }
    }

    /// The mask containing a single set.
    pub fn single(set: AccSet) -> Self {
        AccMask(1u64 << set.index())
    }

    /// Builds a mask from set ids.
    pub fn from_sets(sets: impl IntoIterator<Item = AccSet>) -> Self {
        sets.into_iter().fold(AccMask::EMPTY, |acc, s| acc | AccMask::single(s))
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, set: AccSet) -> bool {
        self.0 & (1u64 << set.index()) != 0
    }

    /// Returns true if every set of `other` is also in `self`.
    pub const fn covers(self, other: AccMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if the mask uses only sets `0..num_sets`.
    pub fn fits(self, num_sets: usize) -> bool {
        AccMask::all(num_sets).covers(self)
    }

    /// Number of sets in the mask.
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates over the sets contained in the mask, in increasing order.
    pub fn sets(self) -> impl Iterator<Item = AccSet> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let i = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            Some(AccSet::new(i))
        })
    }
}

impl BitOr for AccMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        AccMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for AccMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for AccMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        AccMask(self.0 & rhs.0)
    }
}

impl fmt::Display for AccMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, set) in self.sets().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", set.index())?;
        }
        write!(f, "}}")
    }
}
