//! Epsilon closure, kind propagation and equivalence merging.
//!
//! After [`GraphBuilder::compute_closures`] every state's epsilon set
//! holds exactly the states with transitions that are reachable from it
//! through epsilon moves (itself included), and its `kind` is the best
//! kind reachable the same way.
//!
//! Closure runs in two passes. The first visits the states that existed
//! before closure, last to first; with [`ClosureMode::Optimized`] it also
//! merges equivalent states inside each epsilon set, which may create new
//! states. The second pass visits the states the first one created.

use lexis_ir::min_kind;
use lexis_stack::ensure_sufficient_stack;

use crate::state::{insert_in_order, NfaState, StateId};
use crate::GraphBuilder;

/// Whether closure may merge states to shrink the tables.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClosureMode {
    /// Closure only. Used as the reference when testing the optimizer.
    Plain,
    /// Merge states with identical moves or a shared successor.
    #[default]
    Optimized,
}

impl GraphBuilder {
    /// Close every state and prune epsilon sets to useful states.
    #[tracing::instrument(level = "debug", skip_all, fields(states = self.states.len(), mode = ?mode))]
    pub fn compute_closures(&mut self, mode: ClosureMode) {
        let optimize = mode == ClosureMode::Optimized;
        let original = self.states.len();
        for index in (0..original).rev() {
            self.optimize_epsilon_moves(StateId::new(index as u32), optimize, optimize);
        }

        let created = self.states.len();
        for index in original..created {
            self.optimize_epsilon_moves(StateId::new(index as u32), false, optimize);
        }

        tracing::debug!(
            original,
            created = created - original,
            total = self.states.len(),
            "closures computed"
        );
    }

    /// Close every state without merging or pruning.
    ///
    /// Running this on an already closed graph changes nothing.
    pub fn epsilon_closure(&mut self) {
        for index in (0..self.states.len()).rev() {
            self.close_to_fixed_point(StateId::new(index as u32));
        }
    }

    fn optimize_epsilon_moves(&mut self, id: StateId, merge_equivalent: bool, merge_shared_next: bool) {
        self.close_to_fixed_point(id);

        loop {
            let mut changed = false;
            if merge_equivalent {
                changed |= self.merge_equivalent_moves(id);
            }
            if merge_shared_next {
                changed |= self.merge_shared_next(id);
            }
            if !changed {
                break;
            }
        }

        let useful: Vec<StateId> = self.states[id.index()]
            .epsilon_moves
            .iter()
            .copied()
            .filter(|target| self.states[target.index()].has_transitions())
            .collect();
        let state = &mut self.states[id.index()];
        state.useful_epsilon_moves = useful.len();
        state.epsilon_moves = useful;
    }

    /// Repeat the closure walk from `id` until no epsilon set grows, then
    /// mark every state the walk visited as done.
    fn close_to_fixed_point(&mut self, id: StateId) {
        let marks = loop {
            let mut marks = vec![false; self.states.len()];
            let mut grew = false;
            self.close(id, &mut marks, &mut grew);
            if !grew {
                break marks;
            }
        };
        for (state, marked) in self.states.iter_mut().zip(marks) {
            if marked {
                state.closure_done = true;
            }
        }
    }

    fn close(&mut self, id: StateId, marks: &mut [bool], grew: &mut bool) {
        let index = id.index();
        if self.states[index].closure_done || marks[index] {
            return;
        }
        marks[index] = true;

        ensure_sufficient_stack(|| {
            let mut i = 0;
            while i < self.states[index].epsilon_moves.len() {
                let target = self.states[index].epsilon_moves[i];
                self.close(target, marks, grew);
                i += 1;
            }

            let mut i = 0;
            while i < self.states[index].epsilon_moves.len() {
                let target = self.states[index].epsilon_moves[i];
                let reachable = self.states[target.index()].epsilon_moves.clone();
                for candidate in reachable {
                    if self.states[candidate.index()].is_useful()
                        && !self.states[index].epsilon_moves.contains(&candidate)
                    {
                        insert_in_order(&mut self.states[index].epsilon_moves, candidate);
                        *grew = true;
                    }
                }
                let kind = self.states[target.index()].kind;
                let state = &mut self.states[index];
                state.kind = min_kind(state.kind, kind);
                i += 1;
            }

            let state = &mut self.states[index];
            if state.has_transitions() && !state.epsilon_moves.contains(&id) {
                insert_in_order(&mut state.epsilon_moves, id);
            }
        });
    }

    /// Collapse states of `id`'s epsilon set that have identical moves.
    ///
    /// The replacement keeps the shared moves and moves to a new state
    /// whose epsilon set reaches every member's successor.
    fn merge_equivalent_moves(&mut self, id: StateId) -> bool {
        let mut changed = false;
        let mut i = 0;
        while i < self.states[id.index()].epsilon_moves.len() {
            let first = self.states[id.index()].epsilon_moves[i];
            let mut members: Vec<StateId> = Vec::new();

            if self.states[first.index()].has_transitions() {
                let mut j = i + 1;
                while j < self.states[id.index()].epsilon_moves.len() {
                    let other = self.states[id.index()].epsilon_moves[j];
                    let (a, b) = (&self.states[first.index()], &self.states[other.index()]);
                    if b.has_transitions() && a.same_moves(b) {
                        if members.is_empty() {
                            members.push(first);
                        }
                        insert_in_order(&mut members, other);
                        self.states[id.index()].epsilon_moves.remove(j);
                    } else {
                        j += 1;
                    }
                }
            }

            if members.is_empty() {
                i += 1;
                continue;
            }

            changed = true;
            let merged = match self.equiv_cache.get(&members) {
                Some(&merged) => merged,
                None => {
                    let merged = self.create_equiv_state(&members);
                    tracing::trace!(?members, ?merged, "merged equivalent states");
                    self.equiv_cache.insert(members, merged);
                    merged
                }
            };
            let moves = &mut self.states[id.index()].epsilon_moves;
            moves.remove(i);
            moves.push(merged);
        }
        changed
    }

    /// Merge states of `id`'s epsilon set that share a successor.
    fn merge_shared_next(&mut self, id: StateId) -> bool {
        let mut changed = false;
        let mut i = 0;
        while i < self.states[id.index()].epsilon_moves.len() {
            let first = self.states[id.index()].epsilon_moves[i];
            let mut merged: Option<StateId> = None;

            let mut j = i + 1;
            while j < self.states[id.index()].epsilon_moves.len() {
                let other = self.states[id.index()].epsilon_moves[j];
                if self.states[first.index()].next == self.states[other.index()].next {
                    let target = match merged {
                        Some(target) => target,
                        None => {
                            let clone = self.create_clone(first);
                            self.states[clone.index()].next = self.states[first.index()].next;
                            merged = Some(clone);
                            clone
                        }
                    };
                    let source = self.states[other.index()].clone();
                    self.states[target.index()].merge_moves(&source);
                    self.states[id.index()].epsilon_moves.remove(j);
                } else {
                    j += 1;
                }
            }

            match merged {
                Some(merged) => {
                    changed = true;
                    let moves = &mut self.states[id.index()].epsilon_moves;
                    moves.remove(i);
                    moves.push(merged);
                }
                None => i += 1,
            }
        }
        changed
    }

    /// New state with `source`'s moves and kinds but no edges.
    fn create_clone(&mut self, source: StateId) -> StateId {
        let id = self.new_state();
        let source: NfaState = self.states[source.index()].clone();
        let clone = &mut self.states[id.index()];
        clone.is_final = source.is_final;
        clone.kind = source.kind;
        clone.merge_moves(&source);
        id
    }

    fn create_equiv_state(&mut self, members: &[StateId]) -> StateId {
        let Some((&first, rest)) = members.split_first() else {
            return self.new_state();
        };
        let merged = self.create_clone(first);
        let hub = self.new_state();
        self.states[merged.index()].next = Some(hub);
        if let Some(next) = self.states[first.index()].next {
            self.add_epsilon(hub, next);
        }
        for &member in rest {
            let (kind, is_final, next) = {
                let state = &self.states[member.index()];
                (state.kind, state.is_final, state.next)
            };
            let state = &mut self.states[merged.index()];
            state.kind = min_kind(state.kind, kind);
            state.is_final |= is_final;
            if let Some(next) = next {
                self.add_epsilon(hub, next);
            }
        }
        merged
    }
}
