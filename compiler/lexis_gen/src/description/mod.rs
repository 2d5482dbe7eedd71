//! The generator's output: everything a table-driven tokenizer needs.
//!
//! Nothing in here is target-language specific. A code emitter (or an
//! interpreter) reads the [`TokenizerDescription`] and drives the usual
//! loop: try the literal tables, continue in the NFA, pick the longest
//! match with the lowest ordinal, then act on the kind's classification.

use std::collections::BTreeMap;

use bitflags::bitflags;

use lexis_ir::{Action, KindSet, Ordinal, ProductionKind};
use lexis_literal::{LiteralEntry, LiteralTrie};
use lexis_nfa::{BitVectorTable, NfaStateDesc, StateName};

bitflags! {
    /// Grammar-wide facts the runtime loop branches on.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
    pub struct GeneratorFlags: u16 {
        /// Some SKIP or SPECIAL_TOKEN kind has an action or state change.
        const SKIP_ACTIONS = 1 << 0;
        /// Some MORE kind has an action.
        const MORE_ACTIONS = 1 << 1;
        /// Some SPECIAL_TOKEN kind has an action.
        const SPECIAL_ACTIONS = 1 << 2;
        /// Some TOKEN kind has an action.
        const TOKEN_ACTIONS = 1 << 3;
        /// A lexical state matches the empty string.
        const EMPTY_MATCH = 1 << 4;
        /// Empty matches can cycle through lexical states.
        const LOOP = 1 << 5;
        const MORE = 1 << 6;
        const SPECIAL = 1 << 7;
        const SKIP = 1 << 8;
    }
}

/// What happens when a kind is matched.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchInfo {
    pub kind: Ordinal,
    /// Fixed image for exact string literals; `None` when the text varies.
    pub image: Option<String>,
    pub match_type: ProductionKind,
    pub new_lex_state: Option<usize>,
    pub action: Option<Action>,
}

/// Per-lexical-state part of the description.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct LexicalStateDescription {
    pub name: String,
    /// NFA state (possibly composite) active before the first character.
    pub initial_state: Option<StateName>,
    /// Lowest kind of a `~[]` regex: matches any single character.
    pub wildcard_kind: Option<Ordinal>,
    /// Literal-bearing productions disagree on `IGNORE_CASE`.
    pub mixed: bool,
    pub has_nfa: bool,
    /// Kind matched by the empty string.
    pub init_match: Option<Ordinal>,
    /// Empty matches may cycle back to this state.
    pub can_loop: bool,
    /// Some MORE kind leads into this state.
    pub can_reach_on_more: bool,
    /// First exported NFA state of this lexical state.
    pub first_state: u32,
    /// Exported NFA states (named and composite) of this lexical state.
    pub state_count: u32,
    pub literals: LiteralTrie,
}

/// The complete generator output.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenizerDescription {
    pub lex_state_names: Vec<String>,
    pub default_lex_state: usize,
    /// Indexed by [`StateName`].
    pub nfa_states: Vec<NfaStateDesc>,
    pub initial_state_by_lex_state: Vec<Option<StateName>>,
    pub wildcard_kind_by_lex_state: Vec<Option<Ordinal>>,
    pub to_skip: KindSet,
    pub to_more: KindSet,
    pub to_special: KindSet,
    pub to_token: KindSet,
    /// Target lexical state per ordinal; `None` keeps the current one.
    pub new_lex_state: Vec<Option<usize>>,
    /// Keyed by (lexical state, first character); longest literal first.
    pub literal_tables: BTreeMap<(usize, char), Vec<LiteralEntry>>,
    /// NFA state to continue in after a literal of a kind, keyed by
    /// (lexical state, kind).
    pub kind_to_nfa_start_state: BTreeMap<(usize, Ordinal), StateName>,
    /// Indexed by ordinal; `None` for private or unused ordinals.
    pub matches: Vec<Option<MatchInfo>>,
    pub lexical_states: Vec<LexicalStateDescription>,
    /// Dispatch tables for characters >= 128.
    pub non_ascii: BitVectorTable,
    pub flags: GeneratorFlags,
    pub max_ordinal: Ordinal,
}

impl TokenizerDescription {
    pub fn lexical_state_index(&self, name: &str) -> Option<usize> {
        self.lex_state_names.iter().position(|n| n == name)
    }

    pub fn match_info(&self, kind: Ordinal) -> Option<&MatchInfo> {
        self.matches.get(kind.index()).and_then(Option::as_ref)
    }

    /// How a matched kind is treated.
    pub fn match_type(&self, kind: Ordinal) -> Option<ProductionKind> {
        if self.to_special.contains(kind) {
            Some(ProductionKind::Special)
        } else if self.to_skip.contains(kind) {
            Some(ProductionKind::Skip)
        } else if self.to_more.contains(kind) {
            Some(ProductionKind::More)
        } else if self.to_token.contains(kind) {
            Some(ProductionKind::Token)
        } else {
            None
        }
    }

    /// Literals of `lex_state` that may start with `c`, longest first.
    pub fn literal_candidates(&self, lex_state: usize, c: char) -> &[LiteralEntry] {
        self.literal_tables
            .get(&(lex_state, c))
            .map_or(&[], Vec::as_slice)
    }

    /// Members of `name` if it is a composite, otherwise `name` alone.
    pub fn expand_state(&self, name: StateName) -> Vec<StateName> {
        match self.nfa_states.get(name.index()).and_then(|s| s.composite.as_ref()) {
            Some(members) => members.clone(),
            None => vec![name],
        }
    }
}
