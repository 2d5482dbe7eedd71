//! Intermediate kinds and the literal-to-NFA hand-off table.
//!
//! While a tokenizer walks a literal it may turn out that the input is
//! not that literal after all. It then continues in the NFA from the
//! states the NFA would be in had it read the same characters, keeping
//! the best kind the NFA matched along the way.

use std::collections::BTreeMap;

use lexis_ir::Ordinal;
use lexis_nfa::{GraphBuilder, StateName};

use crate::LiteralTrie;

/// Best NFA match after reading a literal up to some position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Intermediate {
    pub kind: Option<Ordinal>,
    /// Position of the last character of that match.
    pub matched_pos: usize,
}

/// Where to resume in the NFA.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct HandoffKey {
    pub kind: Option<Ordinal>,
    pub matched_pos: usize,
    /// Active NFA states, by name. Empty once the NFA died.
    pub states: Vec<StateName>,
}

impl LiteralTrie {
    /// Step the NFA over every literal and record the hand-off table.
    ///
    /// `graph` must be closed and named. At each position a literal of
    /// this state equal to the prefix read so far, with a lower ordinal
    /// than the NFA's kind, demotes the kind to none. After that, at the
    /// first position only, a kind worse than `wildcard` becomes
    /// `wildcard`.
    #[tracing::instrument(level = "debug", skip_all, fields(literals = self.literals.len()))]
    pub fn compute_handoffs(&mut self, graph: &GraphBuilder, wildcard: Option<Ordinal>) {
        self.intermediate.clear();
        self.handoffs = vec![BTreeMap::new(); self.max_len];

        let initial = graph.initial_states();
        if initial.is_empty() {
            return;
        }

        let mut order: Vec<usize> = (0..self.literals.len()).collect();
        order.sort_by_key(|&i| self.literals[i].ordinal);

        for index in order {
            let ordinal = self.literals[index].ordinal;
            let chars: Vec<char> = self.literals[index].image.chars().collect();
            let mut steps: Vec<Intermediate> = Vec::with_capacity(chars.len());
            let mut old = initial.clone();
            let mut new = Vec::new();

            for (pos, &c) in chars.iter().enumerate() {
                let (step, states) = if old.is_empty() {
                    // The NFA died earlier; pos > 0 here.
                    (steps[pos - 1], Vec::new())
                } else {
                    let nfa_kind = graph.move_from_set(c, &old, &mut new);
                    old.clear();

                    let prefix: String = chars[..=pos].iter().collect();
                    let shadowed = match (self.str_kind(&prefix), nfa_kind) {
                        (Some(literal), Some(kind)) => literal < kind,
                        (Some(_), None) => true,
                        (None, _) => false,
                    };
                    let mut step = if shadowed {
                        Intermediate::default()
                    } else if nfa_kind.is_some() {
                        Intermediate {
                            kind: nfa_kind,
                            matched_pos: pos,
                        }
                    } else if pos == 0 {
                        Intermediate::default()
                    } else {
                        steps[pos - 1]
                    };
                    if pos == 0 {
                        if let (Some(kind), Some(any)) = (step.kind, wildcard) {
                            if kind > any {
                                step.kind = Some(any);
                            }
                        }
                    }
                    (step, graph.names_of(&new))
                };
                steps.push(step);

                if step.kind.is_none() && new.is_empty() {
                    continue;
                }
                std::mem::swap(&mut old, &mut new);
                new.clear();

                self.handoffs[pos]
                    .entry(HandoffKey {
                        kind: step.kind,
                        matched_pos: step.matched_pos,
                        states,
                    })
                    .or_default()
                    .insert(ordinal);
            }
            self.intermediate.insert(ordinal, steps);
        }

        tracing::debug!(
            entries = self.handoffs.iter().map(BTreeMap::len).sum::<usize>(),
            "literal hand-offs computed"
        );
    }

    /// Shift every hand-off state name by `by`, once the lexical state's
    /// NFA has been placed in the run-wide state table.
    pub fn offset_states(&mut self, by: u32) {
        self.handoffs = std::mem::take(&mut self.handoffs)
            .into_iter()
            .map(|entries| {
                entries
                    .into_iter()
                    .map(|(mut key, kinds)| {
                        key.states = key.states.iter().map(|name| name.offset(by)).collect();
                        (key, kinds)
                    })
                    .collect()
            })
            .collect();
    }

    /// Lowest ordinal of a literal of this state spelled exactly `image`.
    pub fn str_kind(&self, image: &str) -> Option<Ordinal> {
        self.literals
            .iter()
            .filter(|literal| literal.image == image)
            .map(|literal| literal.ordinal)
            .min()
    }

    /// Per-position intermediate kinds of literal `kind`.
    pub fn intermediate(&self, kind: Ordinal) -> Option<&[Intermediate]> {
        self.intermediate.get(&kind).map(Vec::as_slice)
    }

    /// NFA state to resume from after reading `pos + 1` characters of
    /// literal `kind`.
    ///
    /// `None` for mixed states, states without an NFA, and positions where
    /// the NFA has no live states.
    pub fn nfa_start_state(&self, pos: usize, kind: Ordinal, graph: &mut GraphBuilder) -> Option<StateName> {
        if self.mixed || graph.generated_states() == 0 {
            return None;
        }
        let states = self
            .handoffs
            .get(pos)?
            .iter()
            .find(|(key, kinds)| kinds.contains(kind) && !key.states.is_empty())
            .map(|(key, _)| key.states.clone())?;
        graph.composite_name(&states)
    }
}
