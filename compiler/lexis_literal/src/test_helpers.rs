//! Fixtures for the unit tests: a closed, named NFA for a few regexes and
//! a trie for a few literals.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use rustc_hash::FxHashMap;

use lexis_diagnostic::DiagnosticQueue;
use lexis_ir::{Ordinal, RegexNode};
use lexis_nfa::{BuildContext, ClosureMode, GraphBuilder};

use crate::{Literal, LiteralOptions, LiteralTrie};

/// Build `(ordinal, regex)` rules into one lexical state's graph, then
/// close and name it.
pub(crate) fn nfa(rules: &[(u32, RegexNode)]) -> GraphBuilder {
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
    graph.compute_closures(ClosureMode::Optimized);
    graph.name_states();
    graph
}

/// `[a-z]+`
pub(crate) fn identifier() -> RegexNode {
    RegexNode::plus(RegexNode::range('a', 'z'))
}

pub(crate) fn trie(literals: &[(u32, &str)]) -> LiteralTrie {
    trie_with(LiteralOptions::default(), literals)
}

pub(crate) fn trie_with(options: LiteralOptions, literals: &[(u32, &str)]) -> LiteralTrie {
    let mut trie = LiteralTrie::new(options);
    let mut diagnostics = DiagnosticQueue::new();
    for &(ordinal, image) in literals {
        trie.generate(Literal::new(image, Ordinal::new(ordinal)), &mut diagnostics);
    }
    trie
}
