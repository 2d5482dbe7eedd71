//! A table-driven tokenizer over a [`TokenizerDescription`], used by the
//! tests to check what a generated description actually matches.
//!
//! At each position the longest candidate wins, ties going to the lowest
//! ordinal. Candidates come from the literal tables (continued in the NFA
//! from the literal's hand-off state), the NFA from the lexical state's
//! initial state, the wildcard kind, and the empty-match kind.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use rustc_hash::FxHashSet;

use lexis_ir::{min_kind, Ordinal, ProductionKind};
use lexis_nfa::StateName;

use crate::TokenizerDescription;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: Ordinal,
    pub image: String,
    /// SPECIAL_TOKEN matches are kept but flagged.
    pub special: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ScanError {
    /// Nothing matches at this byte offset.
    Lexical { offset: usize, lex_state: usize },
    /// The same lexical state matched the empty string twice at one offset.
    EmptyLoop { offset: usize, lex_state: usize },
}

/// A longest-match candidate: kind and byte length.
type Candidate = (Ordinal, usize);

fn better(best: Option<Candidate>, candidate: Candidate) -> Option<Candidate> {
    match best {
        Some((kind, len)) if len > candidate.1 || (len == candidate.1 && kind <= candidate.0) => best,
        _ => Some(candidate),
    }
}

pub(crate) struct Scanner<'d> {
    description: &'d TokenizerDescription,
}

impl<'d> Scanner<'d> {
    pub(crate) fn new(description: &'d TokenizerDescription) -> Self {
        Scanner { description }
    }

    /// Longest match of `input` in `lex_state`.
    pub(crate) fn longest_match(&self, lex_state: usize, input: &str) -> Option<Candidate> {
        let description = self.description;
        let state = &description.lexical_states[lex_state];
        let mut best = state.init_match.map(|kind| (kind, 0));

        let Some(first) = input.chars().next() else {
            return best;
        };
        if let Some(kind) = state.wildcard_kind {
            best = better(best, (kind, first.len_utf8()));
        }
        if let Some(initial) = state.initial_state {
            if let Some(found) = self.run_nfa(initial, input, 0) {
                best = better(best, found);
            }
        }
        for entry in description.literal_candidates(lex_state, first) {
            if !entry.is_prefix_of(input) {
                continue;
            }
            let len = input
                .char_indices()
                .nth(entry.image.chars().count())
                .map_or(input.len(), |(offset, _)| offset);
            best = better(best, (entry.kind, len));
            if let Some(&start) = description.kind_to_nfa_start_state.get(&(lex_state, entry.kind)) {
                if let Some(found) = self.run_nfa(start, input, len) {
                    best = better(best, found);
                }
            }
        }
        best
    }

    /// Simulate the NFA from `start` over `input[consumed..]`.
    fn run_nfa(&self, start: StateName, input: &str, consumed: usize) -> Option<Candidate> {
        let description = self.description;
        let mut active = description.expand_state(start);
        let mut best = None;
        let mut offset = consumed;
        for c in input[consumed..].chars() {
            let mut next: Vec<StateName> = Vec::new();
            let mut kind = None;
            for name in &active {
                let state = &description.nfa_states[name.index()];
                if !state.accepts(c, &description.non_ascii) {
                    continue;
                }
                kind = min_kind(kind, state.kind);
                for target in &state.next_states {
                    if !next.contains(target) {
                        next.push(*target);
                    }
                }
            }
            offset += c.len_utf8();
            if let Some(kind) = kind {
                best = Some((kind, offset));
            }
            if next.is_empty() {
                break;
            }
            active = next;
        }
        best
    }

    /// Tokenize all of `input`, ending with the EOF token.
    pub(crate) fn tokenize(&self, input: &str) -> Result<Vec<Token>, ScanError> {
        let description = self.description;
        let mut lex_state = description.default_lex_state;
        let mut tokens = Vec::new();
        let mut offset = 0;
        let mut more = String::new();
        let mut empty_at: FxHashSet<usize> = FxHashSet::default();

        loop {
            if offset == input.len() {
                tokens.push(Token {
                    kind: Ordinal::EOF,
                    image: String::new(),
                    special: false,
                });
                return Ok(tokens);
            }
            let Some((kind, len)) = self.longest_match(lex_state, &input[offset..]) else {
                return Err(ScanError::Lexical { offset, lex_state });
            };
            if len == 0 {
                if !empty_at.insert(lex_state) {
                    return Err(ScanError::EmptyLoop { offset, lex_state });
                }
            } else {
                empty_at.clear();
            }

            more.push_str(&input[offset..offset + len]);
            offset += len;
            match description.match_type(kind) {
                Some(ProductionKind::Special) => tokens.push(Token {
                    kind,
                    image: std::mem::take(&mut more),
                    special: true,
                }),
                Some(ProductionKind::Skip) => more.clear(),
                Some(ProductionKind::More) => {}
                Some(ProductionKind::Token) | None => tokens.push(Token {
                    kind,
                    image: std::mem::take(&mut more),
                    special: false,
                }),
            }
            if let Some(target) = description.new_lex_state.get(kind.index()).copied().flatten() {
                lex_state = target;
            }
        }
    }

    /// Kinds of the non-special tokens of `input`, EOF excluded.
    pub(crate) fn kinds(&self, input: &str) -> Vec<u32> {
        self.tokenize(input)
            .expect("input tokenizes")
            .into_iter()
            .filter(|token| !token.special && !token.kind.is_eof())
            .map(|token| token.kind.raw())
            .collect()
    }
}
