//! Fixtures shared by the unit tests: compile a handful of regexes into
//! an exported table and run it the way a generated tokenizer would.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use rustc_hash::FxHashMap;

use lexis_diagnostic::DiagnosticQueue;
use lexis_ir::{min_kind, Ordinal, RegexNode};

use crate::{BitVectorTable, BuildContext, ClosureMode, GraphBuilder, NfaStateDesc, StateName};

pub(crate) struct Compiled {
    pub graph: GraphBuilder,
    pub table: Vec<NfaStateDesc>,
    pub bits: BitVectorTable,
    pub start: Option<StateName>,
}

/// Build `(ordinal, regex)` rules into one graph and export it.
pub(crate) fn compile(rules: &[(u32, RegexNode)], mode: ClosureMode) -> Compiled {
    let named = FxHashMap::default();
    let mut diagnostics = DiagnosticQueue::new();
    let mut cx = BuildContext::new(&named, true, &mut diagnostics);
    let mut graph = GraphBuilder::new();
    let initial = graph.initial_state();
    for (ordinal, node) in rules {
        let fragment = graph.build(node, false, &mut cx).expect("regex builds");
        graph.set_final(fragment.end, Ordinal::new(*ordinal));
        graph.add_epsilon(initial, fragment.start);
    }
    graph.compute_closures(mode);
    let start = graph.name_states();
    let mut bits = BitVectorTable::new();
    graph.partition_non_ascii(&mut bits);
    let table = graph.export(0);
    Compiled {
        graph,
        table,
        bits,
        start,
    }
}

impl Compiled {
    /// Longest non-empty match at the start of `input` as
    /// `(kind, characters consumed)`; ties go to the lowest ordinal.
    pub fn longest_match(&self, input: &str) -> Option<(Ordinal, usize)> {
        let mut current = self.expand(self.start);
        let mut best = None;
        for (pos, c) in input.chars().enumerate() {
            if current.is_empty() {
                break;
            }
            let mut next = Vec::new();
            let mut kind = None;
            for name in &current {
                let desc = &self.table[name.index()];
                if desc.accepts(c, &self.bits) {
                    next.extend(desc.next_states.iter().copied());
                    kind = min_kind(kind, desc.kind);
                }
            }
            if let Some(kind) = kind {
                best = Some((kind, pos + 1));
            }
            next.sort_unstable();
            next.dedup();
            current = next;
        }
        best
    }

    fn expand(&self, name: Option<StateName>) -> Vec<StateName> {
        let Some(name) = name else {
            return Vec::new();
        };
        match &self.table[name.index()].composite {
            Some(members) => members.clone(),
            None => vec![name],
        }
    }
}

/// Longest match computed straight from the regex AST, for checking the
/// NFA against.
pub(crate) fn reference_match(rules: &[(u32, RegexNode)], input: &str) -> Option<(Ordinal, usize)> {
    let chars: Vec<char> = input.chars().collect();
    let mut best: Option<(Ordinal, usize)> = None;
    for (ordinal, node) in rules {
        let Some(&len) = ends(node, &chars, 0).iter().next_back() else {
            continue;
        };
        if len == 0 {
            continue;
        }
        let candidate = (Ordinal::new(*ordinal), len);
        best = match best {
            Some((kind, best_len)) if best_len > len || (best_len == len && kind < candidate.0) => {
                Some((kind, best_len))
            }
            _ => Some(candidate),
        };
    }
    best
}

fn ends(node: &RegexNode, input: &[char], start: usize) -> std::collections::BTreeSet<usize> {
    use lexis_ir::RegexKind;
    use std::collections::BTreeSet;

    let from_all = |node: &RegexNode, positions: &BTreeSet<usize>| -> BTreeSet<usize> {
        positions.iter().flat_map(|&p| ends(node, input, p)).collect()
    };

    match &node.kind {
        RegexKind::Literal(text) => {
            let text: Vec<char> = text.chars().collect();
            input[start..]
                .starts_with(&text)
                .then_some(start + text.len())
                .into_iter()
                .collect()
        }
        RegexKind::CharClass(class) => input
            .get(start)
            .filter(|c| class.matches(**c))
            .map(|_| start + 1)
            .into_iter()
            .collect(),
        RegexKind::Sequence(children) => {
            let mut positions = BTreeSet::from([start]);
            for child in children {
                positions = from_all(child, &positions);
            }
            positions
        }
        RegexKind::Choice(alternatives) => alternatives
            .iter()
            .flat_map(|alt| ends(alt, input, start))
            .collect(),
        RegexKind::Repetition { child, min, max } => {
            let mut result = BTreeSet::new();
            if *min == 0 {
                result.insert(start);
            }
            let mut current = BTreeSet::from([start]);
            let mut count = 0;
            loop {
                count += 1;
                if max.is_some_and(|max| count > max) || current.is_empty() {
                    break;
                }
                let next = from_all(child, &current);
                if count >= *min {
                    if next.is_subset(&result) {
                        break;
                    }
                    result.extend(next.iter().copied());
                }
                current = next;
            }
            result
        }
        RegexKind::Reference(_) => BTreeSet::new(),
    }
}
