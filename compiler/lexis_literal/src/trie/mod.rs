//! The per-lexical-state literal trie.

use std::collections::BTreeMap;

use lexis_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use lexis_ir::{case, KindSet, Location, Ordinal};

use crate::handoff::{HandoffKey, Intermediate};
use crate::KindInfo;

/// Characters at or above this need a unicode-aware input stream.
const NON_ASCII_START: u32 = 256;

/// Run-wide settings the trie depends on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct LiteralOptions {
    /// Every literal of the grammar ignores case.
    pub ignore_case: bool,
    pub unicode_input: bool,
}

/// A string literal token of one lexical state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Literal {
    pub image: String,
    pub ordinal: Ordinal,
    /// The declaring production is `IGNORE_CASE`.
    pub ignore_case: bool,
    pub location: Location,
}

impl Literal {
    pub fn new(image: impl Into<String>, ordinal: Ordinal) -> Self {
        Literal {
            image: image.into(),
            ordinal,
            ignore_case: false,
            location: Location::DUMMY,
        }
    }

    #[must_use]
    pub fn ignoring_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub(crate) fn len(&self) -> usize {
        self.image.chars().count()
    }
}

/// Literals of one lexical state, indexed by position and character.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct LiteralTrie {
    pub(crate) options: LiteralOptions,
    pub(crate) positions: Vec<BTreeMap<char, KindInfo>>,
    /// Registered literals in declaration order.
    pub(crate) literals: Vec<Literal>,
    pub(crate) max_len: usize,
    pub(crate) max_str_kind: Option<Ordinal>,
    /// Productions disagree on `IGNORE_CASE`.
    pub(crate) mixed: bool,
    pub(crate) sub_string: KindSet,
    pub(crate) sub_string_at_pos: Vec<bool>,
    pub(crate) intermediate: BTreeMap<Ordinal, Vec<Intermediate>>,
    pub(crate) handoffs: Vec<BTreeMap<HandoffKey, KindSet>>,
}

impl LiteralTrie {
    pub fn new(options: LiteralOptions) -> Self {
        LiteralTrie {
            options,
            ..Self::default()
        }
    }

    /// Register `literal`'s characters.
    ///
    /// Every position but the last records the ordinal as a valid kind;
    /// the last records it as final. Empty literals are ignored.
    pub fn generate(&mut self, literal: Literal, diagnostics: &mut DiagnosticQueue) {
        let chars: Vec<char> = literal.image.chars().collect();
        if chars.is_empty() {
            return;
        }
        if self.positions.len() < chars.len() {
            self.positions.resize_with(chars.len(), BTreeMap::new);
        }
        self.max_len = self.max_len.max(chars.len());
        self.max_str_kind = self.max_str_kind.max(Some(literal.ordinal));

        let last = chars.len() - 1;
        for (pos, &c) in chars.iter().enumerate() {
            if u32::from(c) >= NON_ASCII_START && !self.options.unicode_input {
                diagnostics.warn_once(
                    Diagnostic::warning(ErrorCode::W0001)
                        .with_message("non-ASCII characters used in string literal")
                        .with_label(literal.location, format!("character {c:?} above U+00FF"))
                        .with_note(
                            "enable unicode input so the tokenizer reads characters, not bytes",
                        ),
                );
            }
            for key in self.keys_for(c, literal.ignore_case) {
                let info = self.positions[pos].entry(key).or_default();
                if pos == last {
                    info.insert_final_kind(literal.ordinal);
                } else {
                    info.insert_valid_kind(literal.ordinal);
                }
            }
        }
        self.literals.push(literal);
    }

    fn keys_for(&self, c: char, ignore_case: bool) -> Vec<char> {
        if self.options.ignore_case {
            vec![case::to_lower(c)]
        } else if ignore_case {
            let lower = case::to_lower(c);
            let upper = case::to_upper(c);
            if lower == upper {
                vec![lower]
            } else {
                vec![lower, upper]
            }
        } else {
            vec![c]
        }
    }

    /// Mark literals that another literal of the state extends.
    ///
    /// In a mixed state every literal counts as a sub-string.
    pub fn fill_sub_string(&mut self) {
        self.sub_string = KindSet::new();
        self.sub_string_at_pos = vec![false; self.max_len];
        for (i, literal) in self.literals.iter().enumerate() {
            let extended = self.mixed
                || self
                    .literals
                    .iter()
                    .enumerate()
                    .any(|(j, other)| j != i && self.extends(other, literal));
            if extended {
                self.sub_string.insert(literal.ordinal);
                self.sub_string_at_pos[literal.len() - 1] = true;
            }
        }
    }

    /// Whether `longer` starts with `prefix`, honoring case rules.
    fn extends(&self, longer: &Literal, prefix: &Literal) -> bool {
        if longer.image.starts_with(&prefix.image) {
            return true;
        }
        let fold = self.options.ignore_case || longer.ignore_case || prefix.ignore_case;
        fold && case::starts_with_ignore_case(&longer.image, &prefix.image)
    }

    pub fn set_mixed(&mut self, mixed: bool) {
        self.mixed = mixed;
    }

    pub fn is_mixed(&self) -> bool {
        self.mixed
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// Trie cells for position `pos`, keyed by (case-folded) character.
    pub fn position(&self, pos: usize) -> Option<&BTreeMap<char, KindInfo>> {
        self.positions.get(pos)
    }

    pub fn positions(&self) -> &[BTreeMap<char, KindInfo>] {
        &self.positions
    }

    /// Length of the longest literal, in characters.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn max_str_kind(&self) -> Option<Ordinal> {
        self.max_str_kind
    }

    pub fn is_sub_string(&self, kind: Ordinal) -> bool {
        self.sub_string.contains(kind)
    }

    pub fn sub_string_kinds(&self) -> &KindSet {
        &self.sub_string
    }

    /// Whether some sub-string literal ends at `pos`.
    pub fn sub_string_at_pos(&self, pos: usize) -> bool {
        self.sub_string_at_pos.get(pos).copied().unwrap_or(false)
    }

    /// Hand-off entries for `pos`: (kind, matched position, NFA states)
    /// to the literals they apply to.
    pub fn handoffs_at(&self, pos: usize) -> impl Iterator<Item = (&HandoffKey, &KindSet)> {
        self.handoffs.get(pos).into_iter().flatten()
    }
}
