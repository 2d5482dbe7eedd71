//! Bit-vectors over token ordinals.
//!
//! Used for the `to_skip`/`to_more`/`to_special`/`to_token` tables and for
//! the valid/final kind buckets of the literal trie. Most grammars have
//! fewer than 128 kinds, so two words live inline.

use std::fmt;
use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

use crate::Ordinal;

const WORD_BITS: usize = 64;

/// A growable set of ordinals backed by 64-bit words.
#[derive(Clone, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct KindSet {
    words: SmallVec<[u64; 2]>,
}

impl KindSet {
    pub fn new() -> Self {
        KindSet::default()
    }

    /// Insert an ordinal. Returns `true` if it was not already present.
    pub fn insert(&mut self, kind: Ordinal) -> bool {
        let (word, bit) = Self::split(kind);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let mask = 1u64 << bit;
        let fresh = self.words[word] & mask == 0;
        self.words[word] |= mask;
        fresh
    }

    pub fn contains(&self, kind: Ordinal) -> bool {
        let (word, bit) = Self::split(kind);
        self.words.get(word).is_some_and(|w| w & (1u64 << bit) != 0)
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Number of ordinals in the set.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Lowest ordinal in the set.
    pub fn first(&self) -> Option<Ordinal> {
        self.iter().next()
    }

    /// Add every ordinal of `other` to this set.
    pub fn union_with(&mut self, other: &KindSet) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            *mine |= theirs;
        }
    }

    /// Iterate ordinals in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Ordinal> + '_ {
        self.words.iter().enumerate().flat_map(|(index, &word)| {
            let base = index * WORD_BITS;
            (0..WORD_BITS)
                .filter(move |bit| word & (1u64 << bit) != 0)
                .map(move |bit| Ordinal::new((base + bit) as u32))
        })
    }

    /// The backing words with trailing empty words removed.
    pub fn words(&self) -> &[u64] {
        let used = self
            .words
            .iter()
            .rposition(|&w| w != 0)
            .map_or(0, |last| last + 1);
        &self.words[..used]
    }

    #[inline]
    fn split(kind: Ordinal) -> (usize, usize) {
        (kind.index() / WORD_BITS, kind.index() % WORD_BITS)
    }
}

impl PartialEq for KindSet {
    fn eq(&self, other: &Self) -> bool {
        self.words() == other.words()
    }
}

impl Eq for KindSet {}

impl Hash for KindSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.words().hash(state);
    }
}

impl fmt::Debug for KindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Ordinal> for KindSet {
    fn from_iter<I: IntoIterator<Item = Ordinal>>(iter: I) -> Self {
        let mut set = KindSet::new();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl Extend<Ordinal> for KindSet {
    fn extend<I: IntoIterator<Item = Ordinal>>(&mut self, iter: I) {
        for kind in iter {
            self.insert(kind);
        }
    }
}
