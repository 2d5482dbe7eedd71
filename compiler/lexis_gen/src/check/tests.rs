#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

use lexis_diagnostic::DiagnosticConfig;
use lexis_ir::{GrammarBuilder, Ordinal};

use crate::test_helpers::{at, codes, messages};

fn check(grammar: &Grammar) -> Vec<Diagnostic> {
    check_with(grammar, &GeneratorOptions::default())
}

fn check_with(grammar: &Grammar, options: &GeneratorOptions) -> Vec<Diagnostic> {
    let mut diagnostics = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    let result = check_grammar(grammar, options, &mut diagnostics);
    let flushed = diagnostics.flush();
    assert_eq!(
        result.is_err(),
        flushed.iter().any(Diagnostic::is_error),
        "check result must agree with the reported errors"
    );
    flushed
}

#[test]
fn test_clean_grammar_passes() {
    let mut g = GrammarBuilder::new();
    g.lexical_state("COMMENT");
    let _ = g
        .production(ProductionKind::Skip)
        .regex(RegexNode::literal(" "))
        .regex(RegexNode::literal("/*"))
        .next_state("COMMENT")
        .finish();
    let _ = g
        .production(ProductionKind::Skip)
        .in_states(&["COMMENT"])
        .regex(RegexNode::literal("*/"))
        .next_state("DEFAULT")
        .finish();
    let _ = g
        .production(ProductionKind::Token)
        .private("LETTER", RegexNode::range('a', 'z'))
        .labeled("ID", RegexNode::plus(RegexNode::reference("LETTER")))
        .finish();
    let _ = g.production(ProductionKind::Token).all_states().eof().action(&["done"]).finish();

    assert_eq!(check(&g.build()), Vec::<Diagnostic>::new());
}

#[test]
fn test_undefined_lexical_state() {
    let mut g = GrammarBuilder::new();
    let _ = g
        .production(ProductionKind::Token)
        .in_states(&["NOWHERE"])
        .at(at(1, 1))
        .regex(RegexNode::literal("a"))
        .finish();
    let _ = g
        .production(ProductionKind::Token)
        .regex(RegexNode::literal("b").at(at(2, 3)))
        .next_state("ELSEWHERE")
        .finish();

    let diagnostics = check(&g.build());
    assert_eq!(
        messages(&diagnostics, ErrorCode::E0107),
        vec![
            "Lexical state \"NOWHERE\" has not been defined.",
            "Lexical state \"ELSEWHERE\" has not been defined.",
        ]
    );
}

#[test]
fn test_eof_must_cover_all_states() {
    let mut g = GrammarBuilder::new();
    let _ = g.production(ProductionKind::Token).eof().finish();

    let diagnostics = check(&g.build());
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E0104]);
    assert_eq!(
        diagnostics[0].message,
        "EOF action/state change must be specified for all states, i.e., <*>TOKEN:."
    );
}

#[test]
fn test_eof_only_in_token_productions() {
    let mut g = GrammarBuilder::new();
    let _ = g.production(ProductionKind::Skip).all_states().eof().finish();

    let diagnostics = check(&g.build());
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E0105]);
    assert_eq!(
        diagnostics[0].message,
        "EOF action/state change can be specified only in a TOKEN specification."
    );
}

#[test]
fn test_duplicate_eof_action() {
    let mut g = GrammarBuilder::new();
    let _ = g
        .production(ProductionKind::Token)
        .all_states()
        .at(at(1, 1))
        .eof()
        .action(&["first"])
        .finish();
    let _ = g
        .production(ProductionKind::Token)
        .all_states()
        .at(at(5, 1))
        .eof()
        .action(&["second"])
        .finish();

    let diagnostics = check(&g.build());
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E0106]);
    assert_eq!(
        diagnostics[0].message,
        "Duplicate action/state change specification for <EOF>."
    );
    assert_eq!(diagnostics[0].primary_location(), Some(at(5, 1)));
}

#[test]
fn test_repeated_bare_eof_is_not_a_duplicate() {
    let mut g = GrammarBuilder::new();
    let _ = g.production(ProductionKind::Token).all_states().eof().finish();
    let _ = g
        .production(ProductionKind::Token)
        .all_states()
        .eof()
        .action(&["last"])
        .finish();

    assert_eq!(check(&g.build()), Vec::<Diagnostic>::new());
}

#[test]
fn test_bare_eof_after_an_eof_action_is_a_duplicate() {
    let mut g = GrammarBuilder::new();
    let _ = g
        .production(ProductionKind::Token)
        .all_states()
        .at(at(1, 1))
        .eof()
        .action(&["first"])
        .finish();
    let _ = g.production(ProductionKind::Token).all_states().at(at(2, 1)).eof().finish();

    let diagnostics = check(&g.build());
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E0106]);
    assert_eq!(diagnostics[0].primary_location(), Some(at(2, 1)));
}

#[test]
fn test_label_clashes() {
    let mut g = GrammarBuilder::new();
    g.lexical_state("COMMENT");
    let _ = g
        .production(ProductionKind::Token)
        .labeled("ID", RegexNode::plus(RegexNode::range('a', 'z')).at(at(1, 1)))
        .labeled("ID", RegexNode::plus(RegexNode::range('A', 'Z')).at(at(2, 1)))
        .labeled("COMMENT", RegexNode::literal("#").at(at(3, 1)))
        .finish();

    let diagnostics = check(&g.build());
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E0108, ErrorCode::E0109]);
    assert_eq!(
        diagnostics[0].message,
        "Multiply defined lexical token name \"ID\"."
    );
    assert_eq!(
        diagnostics[1].message,
        "Lexical token name \"COMMENT\" is the same as that of a lexical state."
    );
}

#[test]
fn test_undefined_reference() {
    let mut g = GrammarBuilder::new();
    let _ = g
        .production(ProductionKind::Token)
        .labeled("NUM", RegexNode::plus(RegexNode::reference("DIGIT").at(at(4, 9))))
        .finish();

    let diagnostics = check(&g.build());
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E0101]);
    assert_eq!(diagnostics[0].message, "undefined lexical token name \"DIGIT\"");
    assert_eq!(diagnostics[0].primary_location(), Some(at(4, 9)));
}

#[test]
fn test_reference_loops() {
    let mut g = GrammarBuilder::new();
    let _ = g
        .production(ProductionKind::Token)
        .private("A", RegexNode::seq(vec![RegexNode::literal("a"), RegexNode::reference("B")]))
        .private("B", RegexNode::opt(RegexNode::reference("A")))
        .labeled("C", RegexNode::plus(RegexNode::reference("C")))
        .labeled("D", RegexNode::reference("A"))
        .finish();

    let diagnostics = check(&g.build());
    assert_eq!(
        messages(&diagnostics, ErrorCode::E0110),
        vec![
            "Loop in regular expression detected: \"...A... --> ...B... --> ...A...\"",
            "Loop in regular expression detected: \"...C... --> ...C...\"",
        ]
    );
}

#[test]
fn test_characters_outside_the_bmp() {
    let mut g = GrammarBuilder::new();
    let _ = g
        .production(ProductionKind::Token)
        .regex(RegexNode::literal("\u{1F600}"))
        .regex(RegexNode::range('a', '\u{10000}'))
        .finish();

    let diagnostics = check(&g.build());
    assert_eq!(
        messages(&diagnostics, ErrorCode::E0111),
        vec![
            "character U+1F600 is outside the Basic Multilingual Plane",
            "character U+10000 is outside the Basic Multilingual Plane",
        ]
    );
}

#[test]
fn test_malformed_repetitions_and_ranges() {
    let mut g = GrammarBuilder::new();
    let _ = g
        .production(ProductionKind::Token)
        .regex(RegexNode::repeat(RegexNode::literal("a"), 3, Some(1)))
        .regex(RegexNode::range('z', 'a'))
        .finish();

    let diagnostics = check(&g.build());
    assert_eq!(
        messages(&diagnostics, ErrorCode::E0112),
        vec![
            "invalid repetition bounds {3,1}",
            "invalid character range 'z'-'a'",
        ]
    );
}

#[test]
fn test_duplicate_string_literal() {
    let mut g = GrammarBuilder::new();
    g.lexical_state("OTHER");
    let _ = g
        .production(ProductionKind::Token)
        .all_states()
        .regex(RegexNode::literal("if").at(at(1, 3)))
        .finish();
    let _ = g
        .production(ProductionKind::Token)
        .all_states()
        .regex(RegexNode::literal("if").at(at(2, 3)))
        .finish();

    let diagnostics = check(&g.build());
    assert_eq!(
        messages(&diagnostics, ErrorCode::E0103),
        vec![
            "Duplicate definition of string token \"if\".",
            "Duplicate definition of string token \"if\" in lexical state \"OTHER\".",
        ]
    );
}

#[test]
fn test_same_string_in_different_states_is_fine() {
    let mut g = GrammarBuilder::new();
    g.lexical_state("OTHER");
    let _ = g.production(ProductionKind::Token).regex(RegexNode::literal("if")).finish();
    let _ = g
        .production(ProductionKind::Token)
        .in_states(&["OTHER"])
        .regex(RegexNode::literal("if"))
        .finish();

    assert_eq!(check(&g.build()), Vec::<Diagnostic>::new());
}

#[test]
fn test_string_hidden_by_ignore_case_string() {
    let mut g = GrammarBuilder::new();
    let _ = g
        .production(ProductionKind::Token)
        .ignore_case()
        .regex(RegexNode::literal("IF").at(at(1, 5)))
        .finish();
    let _ = g
        .production(ProductionKind::Token)
        .regex(RegexNode::literal("if").at(at(2, 5)))
        .finish();

    let diagnostics = check(&g.build());
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E0102]);
    assert_eq!(
        diagnostics[0].message,
        "String \"if\" can never be matched due to presence of more general (IGNORE_CASE) \
         regular expression at line 1, column 5."
    );
}

#[test]
fn test_ignore_case_string_partially_superseded() {
    let mut g = GrammarBuilder::new();
    let _ = g
        .production(ProductionKind::Token)
        .regex(RegexNode::literal("if").at(at(1, 5)))
        .regex(RegexNode::literal("IF").at(at(2, 5)))
        .finish();
    let _ = g
        .production(ProductionKind::Token)
        .ignore_case()
        .regex(RegexNode::literal("If").at(at(3, 5)))
        .finish();
    let _ = g
        .production(ProductionKind::Token)
        .ignore_case()
        .regex(RegexNode::literal("do").at(at(4, 5)))
        .finish();
    let _ = g
        .production(ProductionKind::Token)
        .regex(RegexNode::literal("DO").at(at(5, 5)))
        .finish();

    let diagnostics = check(&g.build());
    assert_eq!(
        messages(&diagnostics, ErrorCode::W0005),
        vec!["String with IGNORE_CASE is partially superseded by strings at line 1, line 2."]
    );
    assert_eq!(messages(&diagnostics, ErrorCode::E0102).len(), 1);
}

#[test]
fn test_global_ignore_case_makes_case_variants_clash() {
    let mut g = GrammarBuilder::new();
    let _ = g
        .production(ProductionKind::Token)
        .regex(RegexNode::literal("while").at(at(1, 1)))
        .regex(RegexNode::literal("WHILE").at(at(2, 1)))
        .finish();
    let grammar = g.build();

    assert_eq!(check(&grammar), Vec::<Diagnostic>::new());
    let options = GeneratorOptions::default().with_ignore_case(true);
    assert_eq!(codes(&check_with(&grammar, &options)), vec![ErrorCode::E0102]);
}

#[test]
fn test_private_regexes_are_checked_too() {
    let mut g = GrammarBuilder::new();
    let ordinals = g
        .production(ProductionKind::Token)
        .private("BAD", RegexNode::repeat(RegexNode::literal("x"), 2, Some(0)))
        .finish();
    assert_eq!(ordinals, vec![Ordinal::new(1)]);

    assert_eq!(codes(&check(&g.build())), vec![ErrorCode::E0112]);
}
