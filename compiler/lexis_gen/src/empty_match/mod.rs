//! Empty-match loop detection.
//!
//! A lexical state whose NFA accepts the empty string makes no progress
//! when that match wins. If the matched kind switches to another state
//! that also matches the empty string, and so on back to a state already
//! on the path, the tokenizer can spin forever. Such chains are reported
//! (W0003) and every state on them is marked `can_loop` so the runtime
//! can guard against repeated empty matches.

use lexis_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use lexis_ir::{Location, Ordinal, TokenRegex};

use crate::LexicalStateDescription;

/// Walks empty-match chains across lexical states.
pub(crate) struct EmptyMatchCheck<'a> {
    pub states: &'a mut [LexicalStateDescription],
    /// Target lexical state per ordinal.
    pub new_lex_state: &'a [Option<usize>],
    /// Declaring regex per ordinal.
    pub regexes: &'a [Option<&'a TokenRegex>],
}

impl EmptyMatchCheck<'_> {
    /// Report every chain and set `can_loop`. Returns whether any chain
    /// was found.
    #[tracing::instrument(level = "debug", skip_all)]
    pub(crate) fn run(&mut self, diagnostics: &mut DiagnosticQueue) -> bool {
        let count = self.states.len();
        let mut done = vec![false; count];
        let mut has_loop = false;

        'outer: for start in 0..count {
            let Some(first_match) = self.empty_match(start) else {
                continue;
            };
            if done[start] {
                continue;
            }
            done[start] = true;

            let mut seen = vec![false; count];
            seen[start] = true;
            let mut cycle = format!("{}-->", self.states[start].name);
            let mut others: Vec<String> = Vec::new();

            let mut current = start;
            let mut kind = first_match;
            while let Some(target) = self.target_of(kind) {
                cycle.push_str(&self.states[target].name);
                current = target;
                if seen[current] {
                    break;
                }
                cycle.push_str("-->");
                done[current] = true;
                seen[current] = true;
                let Some(next) = self.empty_match(current) else {
                    continue 'outer;
                };
                kind = next;
                others.push(self.location_of(kind).to_string());
            }
            if self.target_of(kind).is_none() {
                cycle.push_str(&self.states[current].name);
            }

            for (state, on_path) in self.states.iter_mut().zip(&seen) {
                state.can_loop |= *on_path;
            }
            has_loop = true;

            let message = self.message(start, first_match, &others, &cycle);
            diagnostics.add(
                Diagnostic::warning(ErrorCode::W0003)
                    .with_message(message)
                    .with_label(self.location_of(first_match), "matches the empty string"),
            );
        }

        tracing::debug!(has_loop, "empty-match loops checked");
        has_loop
    }

    /// Kind matched by the empty string in `state`, unless the state also
    /// has a wildcard (which always consumes a character).
    fn empty_match(&self, state: usize) -> Option<Ordinal> {
        let description = &self.states[state];
        if description.wildcard_kind.is_some() {
            return None;
        }
        description.init_match.filter(|kind| !kind.is_eof())
    }

    fn target_of(&self, kind: Ordinal) -> Option<usize> {
        self.new_lex_state.get(kind.index()).copied().flatten()
    }

    fn regex(&self, kind: Ordinal) -> Option<&TokenRegex> {
        self.regexes.get(kind.index()).copied().flatten()
    }

    fn location_of(&self, kind: Ordinal) -> Location {
        self.regex(kind).map_or(Location::DUMMY, TokenRegex::location)
    }

    fn message(&self, start: usize, kind: Ordinal, others: &[String], cycle: &str) -> String {
        let label = self
            .regex(kind)
            .and_then(|re| re.label.as_deref())
            .map(|label| format!(" for {label}"))
            .unwrap_or_default();
        let state = &self.states[start].name;
        if others.is_empty() {
            format!(
                "Regular expression{label} can be matched by the empty string (\"\") in lexical \
                 state {state}. This can result in an endless loop of empty string matches."
            )
        } else {
            format!(
                "Regular expression{label} can be matched by the empty string (\"\") in lexical \
                 state {state}. This regular expression along with the regular expressions at {} \
                 forms the cycle \n   {cycle}\ncontaining regular expressions with empty matches. \
                 This can result in an endless loop of empty string matches.",
                others.join("; ")
            )
        }
    }
}
