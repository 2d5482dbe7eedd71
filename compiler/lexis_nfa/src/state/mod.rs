//! NFA states and their character moves.

use lexis_ir::Ordinal;

// ── ID newtypes ─────────────────────────────────────────────────────

/// Arena index of an NFA state within one lexical state's graph.
///
/// IDs are allocated sequentially from 0 and restart after
/// [`GraphBuilder::reset`](crate::GraphBuilder::reset). Epsilon sets are
/// kept in ascending ID order, which fixes kind tie-break order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct StateId(u32);

impl StateId {
    /// Create a new state ID from a raw index.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Run-time name of a state: its index in the exported state table.
///
/// Several arena states may share one name when they are equivalent at
/// run time. Names at or above the generated-state count denote composite
/// state sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct StateName(u32);

impl StateName {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Shift by the number of states exported for earlier lexical states.
    #[inline]
    #[must_use]
    pub fn offset(self, by: u32) -> Self {
        Self(self.0 + by)
    }
}

// ── NfaState ────────────────────────────────────────────────────────

/// A node in the NFA graph.
///
/// Characters below 128 live in `ascii_moves`; everything else is kept in
/// sorted `char_moves` and `range_moves`.
#[derive(Clone, Debug)]
pub struct NfaState {
    pub(crate) id: StateId,
    pub(crate) ascii_moves: [u64; 2],
    pub(crate) char_moves: Vec<char>,
    pub(crate) range_moves: Vec<(char, char)>,
    /// State entered after consuming a character here.
    pub(crate) next: Option<StateId>,
    pub(crate) epsilon_moves: Vec<StateId>,
    /// Best kind reachable through the epsilon closure.
    pub(crate) kind: Option<Ordinal>,
    /// Kind reported after moving out of this state (`next`'s kind).
    pub(crate) kind_to_print: Option<Ordinal>,
    pub(crate) is_final: bool,
    pub(crate) state_name: Option<StateName>,
    /// Named by aliasing an equivalent state.
    pub(crate) dummy: bool,
    pub(crate) closure_done: bool,
    pub(crate) useful_epsilon_moves: usize,
    /// Names of the useful epsilon targets, once computed.
    pub(crate) epsilon_key: Option<Vec<StateName>>,
    pub(crate) non_ascii_method: Option<u32>,
}

impl NfaState {
    pub(crate) fn new(id: StateId) -> Self {
        NfaState {
            id,
            ascii_moves: [0; 2],
            char_moves: Vec::new(),
            range_moves: Vec::new(),
            next: None,
            epsilon_moves: Vec::new(),
            kind: None,
            kind_to_print: None,
            is_final: false,
            state_name: None,
            dummy: false,
            closure_done: false,
            useful_epsilon_moves: 0,
            epsilon_key: None,
            non_ascii_method: None,
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn kind(&self) -> Option<Ordinal> {
        self.kind
    }

    pub fn kind_to_print(&self) -> Option<Ordinal> {
        self.kind_to_print
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn next(&self) -> Option<StateId> {
        self.next
    }

    pub fn epsilon_moves(&self) -> &[StateId] {
        &self.epsilon_moves
    }

    pub fn state_name(&self) -> Option<StateName> {
        self.state_name
    }

    pub fn is_dummy(&self) -> bool {
        self.dummy
    }

    pub fn ascii_moves(&self) -> [u64; 2] {
        self.ascii_moves
    }

    pub fn char_moves(&self) -> &[char] {
        &self.char_moves
    }

    pub fn range_moves(&self) -> &[(char, char)] {
        &self.range_moves
    }

    /// Number of epsilon targets with transitions, after closure.
    pub fn useful_epsilon_moves(&self) -> usize {
        self.useful_epsilon_moves
    }

    pub fn non_ascii_method(&self) -> Option<u32> {
        self.non_ascii_method
    }

    // ── Moves ───────────────────────────────────────────────────────

    #[inline]
    pub(crate) fn add_ascii(&mut self, c: u32) {
        debug_assert!(c < 128);
        self.ascii_moves[(c / 64) as usize] |= 1u64 << (c % 64);
    }

    pub(crate) fn add_char(&mut self, c: char) {
        let code = u32::from(c);
        if code < 128 {
            self.add_ascii(code);
            return;
        }
        if let Err(at) = self.char_moves.binary_search(&c) {
            self.char_moves.insert(at, c);
        }
    }

    /// Add the inclusive range `lo..=hi`.
    pub(crate) fn add_range(&mut self, lo: char, hi: char) {
        if lo > hi {
            return;
        }
        let (lo_code, hi_code) = (u32::from(lo), u32::from(hi));
        for code in lo_code..=hi_code.min(127) {
            self.add_ascii(code);
        }
        if hi_code < 128 {
            return;
        }
        let lo = if lo_code < 128 { '\u{80}' } else { lo };
        if lo == hi {
            self.add_char(lo);
            return;
        }
        if let Err(at) = self.range_moves.binary_search(&(lo, hi)) {
            self.range_moves.insert(at, (lo, hi));
        }
    }

    pub fn has_transitions(&self) -> bool {
        self.ascii_moves != [0, 0] || !self.char_moves.is_empty() || !self.range_moves.is_empty()
    }

    /// Final or able to consume a character: worth keeping in a closure.
    pub(crate) fn is_useful(&self) -> bool {
        self.is_final || self.has_transitions()
    }

    /// Whether this state has a transition on `c`.
    pub fn accepts(&self, c: char) -> bool {
        let code = u32::from(c);
        if code < 128 {
            return self.ascii_moves[(code / 64) as usize] & (1u64 << (code % 64)) != 0;
        }
        self.char_moves.binary_search(&c).is_ok()
            || self.range_moves.iter().any(|&(lo, hi)| lo <= c && c <= hi)
    }

    /// Identical ascii, char and range moves.
    pub(crate) fn same_moves(&self, other: &NfaState) -> bool {
        self.ascii_moves == other.ascii_moves
            && self.char_moves == other.char_moves
            && self.range_moves == other.range_moves
    }

    /// Union `other`'s moves into this state and take the better kinds.
    ///
    /// Epsilon moves are not merged.
    pub(crate) fn merge_moves(&mut self, other: &NfaState) {
        self.ascii_moves[0] |= other.ascii_moves[0];
        self.ascii_moves[1] |= other.ascii_moves[1];
        for &c in &other.char_moves {
            self.add_char(c);
        }
        for &(lo, hi) in &other.range_moves {
            self.add_range(lo, hi);
        }
        self.kind = lexis_ir::min_kind(self.kind, other.kind);
        self.kind_to_print = lexis_ir::min_kind(self.kind_to_print, other.kind_to_print);
        self.is_final |= other.is_final;
    }
}

/// Insert `id` before the first larger ID, unless already present.
///
/// Returns `true` if inserted. Lists grown only through this function stay
/// sorted; merged states appended by the optimizer may break the order, in
/// which case the scan still stops at the first larger ID.
pub(crate) fn insert_in_order(list: &mut Vec<StateId>, id: StateId) -> bool {
    let mut at = list.len();
    for (index, &existing) in list.iter().enumerate() {
        if existing > id {
            at = index;
            break;
        }
        if existing == id {
            return false;
        }
    }
    list.insert(at, id);
    true
}

#[cfg(test)]
mod tests;
