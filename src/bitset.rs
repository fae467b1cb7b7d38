//! Dense bit set over automaton states.
//!
//! Every checker tracks visited marks, stack membership and candidate sets
//! as a [`StateSet`]. The set is backed by `u64` words indexed by
//! [`StateId::index`], so membership tests are a shift and a mask and the set
//! operations used by the fixpoint checker work a word at a time.

use crate::types::StateId;

/// A set of states backed by a vector of u64 words.
///
/// The set grows on insert; two sets of different capacity can be combined,
/// missing words are treated as zero.
#[derive(Debug, Clone, Default)]
pub struct StateSet {
    words: Vec<u64>,
    /// Number of set bits (cached for O(1) len())
    count: usize,
}

impl StateSet {
    const BITS_PER_WORD: usize = 64;

    /// Creates an empty set with room for `capacity` states.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(Self::BITS_PER_WORD)],
            count: 0,
        }
    }

    /// Creates the set `{0, 1, .., n-1}`.
    pub fn full(n: usize) -> Self {
        let mut words = vec![u64::MAX; n / Self::BITS_PER_WORD];
        let rem = n % Self::BITS_PER_WORD;
        if rem != 0 {
            words.push((1u64 << rem) - 1);
        }
        Self { words, count: n }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    fn word_and_bit(state: StateId) -> (usize, u64) {
        let index = state.index();
        (index / Self::BITS_PER_WORD, 1u64 << (index % Self::BITS_PER_WORD))
    }

    #[inline]
    pub fn contains(&self, state: StateId) -> bool {
        let (w, mask) = Self::word_and_bit(state);
        w < self.words.len() && self.words[w] & mask != 0
    }

    /// Adds a state. Returns true if it was not present.
    #[inline]
    pub fn insert(&mut self, state: StateId) -> bool {
        let (w, mask) = Self::word_and_bit(state);
        if w >= self.words.len() {
            self.words.resize(w + 1, 0);
        }
        let was_clear = self.words[w] & mask == 0;
        if was_clear {
            self.words[w] |= mask;
            self.count += 1;
        }
        was_clear
    }

    /// Removes a state. Returns true if it was present.
    #[inline]
    pub fn remove(&mut self, state: StateId) -> bool {
        let (w, mask) = Self::word_and_bit(state);
        if w >= self.words.len() {
            return false;
        }
        let was_set = self.words[w] & mask != 0;
        if was_set {
            self.words[w] &= !mask;
            self.count -= 1;
        }
        was_set
    }

    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
        self.count = 0;
    }

    /// Smallest state in the set.
    pub fn first(&self) -> Option<StateId> {
        self.words.iter().enumerate().find(|(_, &w)| w != 0).map(|(i, &w)| {
            StateId::new((i * Self::BITS_PER_WORD + w.trailing_zeros() as usize) as u32)
        })
    }

    /// `self := self ∪ other`
    pub fn union_with(&mut self, other: &StateSet) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= *b;
        }
        self.recount();
    }

    /// `self := self ∩ other`
    pub fn intersect_with(&mut self, other: &StateSet) {
        for (i, a) in self.words.iter_mut().enumerate() {
            *a &= other.words.get(i).copied().unwrap_or(0);
        }
        self.recount();
    }

    /// `self := self \ other`
    pub fn difference_with(&mut self, other: &StateSet) {
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= !*b;
        }
        self.recount();
    }

    pub fn intersection(&self, other: &StateSet) -> StateSet {
        let mut res = self.clone();
        res.intersect_with(other);
        res
    }

    pub fn difference(&self, other: &StateSet) -> StateSet {
        let mut res = self.clone();
        res.difference_with(other);
        res
    }

    pub fn is_subset(&self, other: &StateSet) -> bool {
        self.words
            .iter()
            .enumerate()
            .all(|(i, &a)| a & !other.words.get(i).copied().unwrap_or(0) == 0)
    }

    fn recount(&mut self) {
        self.count = self.words.iter().map(|w| w.count_ones() as usize).sum();
    }

    /// Iterates over the states in increasing order.
    pub fn iter(&self) -> StateSetIter<'_> {
        StateSetIter {
            words: &self.words,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }
}

impl PartialEq for StateSet {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count && self.is_subset(other)
    }
}

impl Eq for StateSet {}

impl FromIterator<StateId> for StateSet {
    fn from_iter<I: IntoIterator<Item = StateId>>(iter: I) -> Self {
        let mut set = StateSet::default();
        set.extend(iter);
        set
    }
}

impl Extend<StateId> for StateSet {
    fn extend<I: IntoIterator<Item = StateId>>(&mut self, iter: I) {
        for s in iter {
            self.insert(s);
        }
    }
}

impl<'a> IntoIterator for &'a StateSet {
    type Item = StateId;
    type IntoIter = StateSetIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the states of a [`StateSet`].
pub struct StateSetIter<'a> {
    words: &'a [u64],
    word_idx: usize,
    current_word: u64,
}

impl Iterator for StateSetIter<'_> {
    type Item = StateId;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit = self.current_word.trailing_zeros() as usize;
                self.current_word &= self.current_word - 1; // Clear lowest set bit
                return Some(StateId::new((self.word_idx * StateSet::BITS_PER_WORD + bit) as u32));
            }
            self.word_idx += 1;
            if self.word_idx >= self.words.len() {
                return None;
            }
            self.current_word = self.words[self.word_idx];
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn set(ids: &[u32]) -> StateSet {
        ids.iter().map(|&i| StateId::new(i)).collect()
    }

    fn ids(s: &StateSet) -> Vec<u32> {
        s.iter().map(|x| x.id()).collect()
    }

    #[test]
    fn test_insert_remove() {
        let mut s = StateSet::with_capacity(10);
        assert!(s.is_empty());
        assert!(s.insert(StateId::new(3)));
        assert!(!s.insert(StateId::new(3)));
        assert!(s.contains(StateId::new(3)));
        assert!(s.insert(StateId::new(200))); // grows
        assert_eq!(s.len(), 2);
        assert!(s.remove(StateId::new(3)));
        assert!(!s.remove(StateId::new(3)));
        assert!(!s.remove(StateId::new(5000)));
        assert_eq!(ids(&s), vec![200]);
    }

    #[test]
    fn test_full() {
        assert!(StateSet::full(0).is_empty());
        let s = StateSet::full(70);
        assert_eq!(s.len(), 70);
        assert!(s.contains(StateId::new(69)));
        assert!(!s.contains(StateId::new(70)));
        assert_eq!(StateSet::full(64).len(), 64);
    }

    #[test]
    fn test_algebra() {
        let a = set(&[1, 2, 3, 64, 100]);
        let b = set(&[2, 3, 4, 100]);
        let mut u = a.clone();
        u.union_with(&b);
        assert_eq!(ids(&u), vec![1, 2, 3, 4, 64, 100]);
        assert_eq!(ids(&a.intersection(&b)), vec![2, 3, 100]);
        assert_eq!(ids(&a.difference(&b)), vec![1, 64]);
        assert_eq!(a.intersection(&b).len(), 3);
        assert!(set(&[2, 3]).is_subset(&a));
        assert!(!b.is_subset(&a));
    }

    #[test]
    fn test_eq_ignores_capacity() {
        let mut a = StateSet::with_capacity(1000);
        a.insert(StateId::new(7));
        assert_eq!(a, set(&[7]));
        a.clear();
        assert_eq!(a, StateSet::default());
    }

    #[test]
    fn test_first() {
        assert_eq!(StateSet::default().first(), None);
        assert_eq!(set(&[130, 65]).first(), Some(StateId::new(65)));
    }
}
