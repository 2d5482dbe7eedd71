//! Literal tables: every literal keyed by lexical state and first
//! character, longest first.

use std::collections::BTreeMap;

use lexis_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use lexis_ir::{case, Ordinal};
use lexis_nfa::{GraphBuilder, StateName};

use crate::{Literal, LiteralTrie};

/// One literal as the tokenizer sees it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct LiteralEntry {
    pub image: String,
    /// Kind reported on a match. May be lower than the literal's own
    /// ordinal when an earlier regex matches the same text.
    pub kind: Ordinal,
    pub ignore_case: bool,
}

impl LiteralEntry {
    /// Whether `input` starts with this literal.
    pub fn is_prefix_of(&self, input: &str) -> bool {
        if self.ignore_case {
            case::starts_with_ignore_case(input, &self.image)
        } else {
            input.starts_with(&self.image)
        }
    }
}

/// Run-wide literal tables, filled one lexical state at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct LiteralTables {
    /// Keyed by (lexical state, first character); longest literal first.
    pub by_first_char: BTreeMap<(usize, char), Vec<LiteralEntry>>,
    /// NFA state to continue in once a literal of a kind has been read,
    /// keyed by (lexical state, kind).
    pub nfa_start_states: BTreeMap<(usize, Ordinal), StateName>,
}

impl LiteralTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Literals of `lex_state` that may start with `c`.
    pub fn candidates(&self, lex_state: usize, c: char) -> &[LiteralEntry] {
        self.by_first_char
            .get(&(lex_state, c))
            .map_or(&[], Vec::as_slice)
    }
}

impl LiteralTrie {
    /// Add this state's literals to `tables`.
    ///
    /// A literal the NFA matches in full with a lower kind than its own
    /// ordinal is reported (W0004) and entered with that kind. NFA state
    /// names are shifted by `offset`, the number of states exported for
    /// earlier lexical states.
    pub fn update_tables(
        &self,
        lex_state: usize,
        offset: u32,
        graph: &mut GraphBuilder,
        tables: &mut LiteralTables,
        diagnostics: &mut DiagnosticQueue,
    ) {
        let mut order: Vec<&Literal> = self.literals.iter().collect();
        order.sort_by_key(|literal| literal.ordinal);

        for literal in order {
            let len = literal.len();
            let shadowing = self
                .intermediate(literal.ordinal)
                .and_then(|steps| steps.get(len - 1))
                .filter(|step| step.matched_pos == len - 1)
                .and_then(|step| step.kind)
                .filter(|&kind| kind < literal.ordinal);
            let kind = match shadowing {
                Some(kind) => {
                    diagnostics.add(
                        Diagnostic::warning(ErrorCode::W0004)
                            .with_message(format!(
                                "Token: \"{}\" will not be matched as specified. \
                                 It will be matched as token of kind: {kind} instead.",
                                literal.image
                            ))
                            .with_label(literal.location, "matched by an earlier regular expression"),
                    );
                    kind
                }
                None => literal.ordinal,
            };

            let image: String = if self.options.ignore_case {
                literal.image.chars().map(case::to_lower).collect()
            } else {
                literal.image.clone()
            };
            let ignore_case = self.options.ignore_case || literal.ignore_case;
            let Some(first) = image.chars().next() else {
                continue;
            };
            let keys: Vec<char> = if ignore_case {
                case::case_variants(first).into_iter().collect()
            } else {
                vec![first]
            };

            for key in keys {
                let entries = tables.by_first_char.entry((lex_state, key)).or_default();
                let at = entries
                    .iter()
                    .position(|entry| entry.image.chars().count() <= len)
                    .unwrap_or(entries.len());
                entries.insert(
                    at,
                    LiteralEntry {
                        image: image.clone(),
                        kind,
                        ignore_case,
                    },
                );
            }

            match self.nfa_start_state(len - 1, literal.ordinal, graph) {
                Some(name) => {
                    tables
                        .nfa_start_states
                        .insert((lex_state, kind), name.offset(offset));
                }
                None => {
                    tables.nfa_start_states.remove(&(lex_state, kind));
                }
            }
        }

        tracing::debug!(
            lex_state,
            literals = self.literals.len(),
            "literal tables updated"
        );
    }
}
