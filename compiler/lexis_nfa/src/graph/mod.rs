//! The per-lexical-state NFA arena.

use rustc_hash::FxHashMap;

use lexis_ir::{min_kind, Ordinal};

use crate::state::{insert_in_order, NfaState, StateId, StateName};

/// Owns every NFA state of one lexical state plus the numbering tables
/// built on top of them.
///
/// Threaded by `&mut` through building, closure, naming and export, then
/// [`reset`](Self::reset) before the next lexical state. Nothing in here
/// survives a reset.
#[derive(Clone, Debug, Default)]
pub struct GraphBuilder {
    pub(crate) states: Vec<NfaState>,
    /// Shared start state every token regex is wired into.
    pub(crate) initial: Option<StateId>,
    /// Synthetic states from equivalence merging, keyed by member IDs.
    pub(crate) equiv_cache: FxHashMap<Vec<StateId>, StateId>,
    /// Number of real state names handed out.
    pub(crate) generated_states: u32,
    /// First state to receive each name, indexed by name.
    pub(crate) indexed: Vec<StateId>,
    /// Composite state sets, named `generated_states + index`.
    pub(crate) composites: Vec<Vec<StateName>>,
    pub(crate) composite_index: FxHashMap<Vec<StateName>, StateName>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every per-lexical-state table. IDs restart at 0.
    pub fn reset(&mut self) {
        self.states.clear();
        self.initial = None;
        self.equiv_cache.clear();
        self.generated_states = 0;
        self.indexed.clear();
        self.composites.clear();
        self.composite_index.clear();
    }

    pub(crate) fn new_state(&mut self) -> StateId {
        let id = StateId::new(self.states.len() as u32);
        self.states.push(NfaState::new(id));
        id
    }

    /// The shared initial state, created on first use.
    pub fn initial_state(&mut self) -> StateId {
        if let Some(id) = self.initial {
            return id;
        }
        let id = self.new_state();
        self.initial = Some(id);
        id
    }

    pub fn add_epsilon(&mut self, from: StateId, to: StateId) {
        insert_in_order(&mut self.states[from.index()].epsilon_moves, to);
    }

    /// Mark `id` as accepting `kind`.
    pub fn set_final(&mut self, id: StateId, kind: Ordinal) {
        let state = &mut self.states[id.index()];
        state.is_final = true;
        state.kind = min_kind(state.kind, Some(kind));
    }

    pub fn state(&self, id: StateId) -> &NfaState {
        &self.states[id.index()]
    }

    pub fn states(&self) -> &[NfaState] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of real (non-composite) state names.
    pub fn generated_states(&self) -> u32 {
        self.generated_states
    }

    pub fn composite_count(&self) -> usize {
        self.composites.len()
    }

    /// States active before the first character, after closure.
    pub fn initial_states(&self) -> Vec<StateId> {
        self.initial
            .map(|id| self.states[id.index()].epsilon_moves.clone())
            .unwrap_or_default()
    }

    /// Kind matched by the empty string, after closure.
    pub fn initial_kind(&self) -> Option<Ordinal> {
        self.initial.and_then(|id| self.states[id.index()].kind)
    }

    /// Advance every state in `from` over `c`.
    ///
    /// Successor states are inserted into `out` in ID order. Returns the
    /// best kind reported by a state that accepts `c`.
    pub fn move_from_set(&self, c: char, from: &[StateId], out: &mut Vec<StateId>) -> Option<Ordinal> {
        let mut best = None;
        for &id in from.iter().rev() {
            let state = &self.states[id.index()];
            if !state.accepts(c) {
                continue;
            }
            if let Some(next) = state.next {
                for &target in self.states[next.index()].epsilon_moves.iter().rev() {
                    insert_in_order(out, target);
                }
            }
            best = min_kind(best, state.kind_to_print);
        }
        best
    }

    /// Names of the named states among `ids`, without duplicates.
    pub fn names_of(&self, ids: &[StateId]) -> Vec<StateName> {
        let mut names: Vec<StateName> = ids
            .iter()
            .filter_map(|id| self.states[id.index()].state_name)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}
