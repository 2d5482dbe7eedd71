//! Run-time state names and composite state sets.
//!
//! Only states with transitions get names. Names are dense from 0 and
//! index the exported state table; composite sets are numbered after the
//! last real name.

use lexis_stack::ensure_sufficient_stack;

use crate::state::{StateId, StateName};
use crate::GraphBuilder;

impl GraphBuilder {
    /// Name every state reachable from the initial state.
    ///
    /// Returns the name of the initial state set, or `None` when no state
    /// has transitions (the lexical state needs no NFA).
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn name_states(&mut self) -> Option<StateName> {
        let initial = self.initial?;
        for target in self.states[initial.index()].epsilon_moves.clone() {
            self.generate_code(target);
        }
        if self.generated_states == 0 {
            return None;
        }
        self.generate_code(initial);
        let names = self.epsilon_names(initial);
        tracing::debug!(
            named = self.generated_states,
            initial = names.len(),
            "states named"
        );
        self.composite_name(&names)
    }

    fn generate_code(&mut self, id: StateId) {
        if self.states[id.index()].state_name.is_some() {
            return;
        }
        ensure_sufficient_stack(|| {
            if let Some(next) = self.states[id.index()].next {
                self.generate_code(next);
                if let Some(kind) = self.states[next.index()].kind {
                    self.states[id.index()].kind_to_print = Some(kind);
                }
            }

            let state = &self.states[id.index()];
            if state.state_name.is_some() || !state.has_transitions() {
                return;
            }

            if let Some(other) = self.equivalent_runtime_state(id) {
                let name = self.states[other.index()].state_name;
                let state = &mut self.states[id.index()];
                state.state_name = name;
                state.dummy = true;
                return;
            }

            let name = StateName::new(self.generated_states);
            self.generated_states += 1;
            self.states[id.index()].state_name = Some(name);
            self.indexed.push(id);

            if let Some(next) = self.states[id.index()].next {
                if self.states[next.index()].useful_epsilon_moves > 0 {
                    self.epsilon_names(next);
                }
            }
        });
    }

    /// A named state that behaves exactly like `id` at run time: same
    /// moves, same reported kind, and the same successor set.
    fn equivalent_runtime_state(&self, id: StateId) -> Option<StateId> {
        let this = &self.states[id.index()];
        self.states.iter().rev().find_map(|other| {
            if other.id == id
                || other.state_name.is_none()
                || other.kind_to_print != this.kind_to_print
                || !this.same_moves(other)
            {
                return None;
            }
            let same_next = match (this.next, other.next) {
                (a, b) if a == b => true,
                (Some(a), Some(b)) => {
                    self.states[a.index()].epsilon_moves == self.states[b.index()].epsilon_moves
                }
                _ => false,
            };
            same_next.then_some(other.id)
        })
    }

    /// Names of the states in `id`'s epsilon set, naming them on demand.
    ///
    /// Cached per state. Each named member counts one more successor set
    /// it belongs to.
    fn epsilon_names(&mut self, id: StateId) -> Vec<StateName> {
        if let Some(key) = &self.states[id.index()].epsilon_key {
            return key.clone();
        }
        // Placeholder while the members are named; a re-entrant request
        // sees the set as empty.
        self.states[id.index()].epsilon_key = Some(Vec::new());

        let targets = self.states[id.index()].epsilon_moves.clone();
        let mut names = Vec::with_capacity(targets.len());
        for target in targets {
            if !self.states[target.index()].has_transitions() {
                continue;
            }
            self.generate_code(target);
            if let Some(name) = self.states[target.index()].state_name {
                names.push(name);
            }
        }

        let state = &mut self.states[id.index()];
        state.useful_epsilon_moves = names.len();
        state.epsilon_key = Some(names.clone());
        names
    }

    /// Name for the set of states `names`.
    ///
    /// A single state is its own name. Larger sets get a composite name
    /// after every real name; the same set always gets the same name.
    /// Call only after [`name_states`](Self::name_states).
    pub fn composite_name(&mut self, names: &[StateName]) -> Option<StateName> {
        let mut key = names.to_vec();
        key.sort_unstable();
        key.dedup();
        match key.as_slice() {
            [] => None,
            [single] => Some(*single),
            _ => {
                if let Some(&name) = self.composite_index.get(&key) {
                    return Some(name);
                }
                let name = StateName::new(self.generated_states + self.composites.len() as u32);
                self.composites.push(key.clone());
                self.composite_index.insert(key, name);
                Some(name)
            }
        }
    }
}
