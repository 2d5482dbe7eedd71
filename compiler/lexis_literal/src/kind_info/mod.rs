//! Kinds that are alive at one (position, character) of the trie.

use lexis_ir::{KindSet, Ordinal};

/// Literals passing through a trie cell.
///
/// `valid_kinds` holds literals that continue past this character,
/// `final_kinds` the literals that end on it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct KindInfo {
    valid_kinds: KindSet,
    final_kinds: KindSet,
}

impl KindInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a literal that has more characters after this one.
    pub fn insert_valid_kind(&mut self, kind: Ordinal) {
        self.valid_kinds.insert(kind);
    }

    /// Record a literal that ends on this character.
    pub fn insert_final_kind(&mut self, kind: Ordinal) {
        self.final_kinds.insert(kind);
    }

    pub fn valid_kinds(&self) -> &KindSet {
        &self.valid_kinds
    }

    pub fn final_kinds(&self) -> &KindSet {
        &self.final_kinds
    }
}

#[cfg(test)]
mod tests;
