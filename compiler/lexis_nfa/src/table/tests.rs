#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::test_helpers::compile;
use crate::ClosureMode;
use lexis_ir::RegexNode;
use pretty_assertions::assert_eq;

#[test]
fn test_export_shifts_names() {
    let rules = [(1, RegexNode::literal("ab")), (2, RegexNode::literal("cd"))];
    let compiled = compile(&rules, ClosureMode::Plain);
    let shifted = compiled.graph.export(10);
    assert_eq!(shifted.len(), compiled.table.len());

    for (plain, moved) in compiled.table.iter().zip(&shifted) {
        let plus_ten = |names: &[StateName]| names.iter().map(|n| n.raw() + 10).collect::<Vec<_>>();
        let raw = |names: &[StateName]| names.iter().map(|n| n.raw()).collect::<Vec<_>>();
        assert_eq!(raw(&moved.next_states), plus_ten(&plain.next_states));
        assert_eq!(
            moved.composite.as_deref().map(raw),
            plain.composite.as_deref().map(plus_ten)
        );
    }
}

#[test]
fn test_composites_follow_real_states() {
    let rules = [(1, RegexNode::literal("ab")), (2, RegexNode::literal("cd"))];
    let compiled = compile(&rules, ClosureMode::Plain);
    let real = compiled.graph.generated_states() as usize;
    assert!(compiled.table[..real].iter().all(|d| !d.is_composite()));
    assert!(compiled.table[real..].iter().all(NfaStateDesc::is_composite));
}

#[test]
fn test_desc_accepts() {
    let rules = [(1, RegexNode::class(vec![lexis_ir::ClassItem::Range('a', 'c'), lexis_ir::ClassItem::Single('\u{3b1}')]))];
    let compiled = compile(&rules, ClosureMode::Optimized);
    let desc = &compiled.table[compiled.start.unwrap().index()];
    assert!(desc.accepts('b', &compiled.bits));
    assert!(desc.accepts('\u{3b1}', &compiled.bits));
    assert!(!desc.accepts('d', &compiled.bits));
    assert!(!desc.accepts('\u{3b2}', &compiled.bits));
    assert_eq!(desc.kind, Some(lexis_ir::Ordinal::new(1)));

    let composite = NfaStateDesc {
        composite: Some(vec![StateName::new(0)]),
        ..NfaStateDesc::default()
    };
    assert!(!composite.accepts('a', &compiled.bits));
}

#[test]
fn test_literal_table_matches() {
    let rules = [
        (5, RegexNode::literal("in")),
        (9, RegexNode::literal("instanceof")),
    ];
    let compiled = compile(&rules, ClosureMode::Optimized);
    assert_eq!(compiled.longest_match("instanceof x"), Some((lexis_ir::Ordinal::new(9), 10)));
    assert_eq!(compiled.longest_match("inside"), Some((lexis_ir::Ordinal::new(5), 2)));
}
