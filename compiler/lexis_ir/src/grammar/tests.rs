use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_ordinals_follow_declaration_order() {
    let mut g = GrammarBuilder::new();
    let skips = g
        .production(ProductionKind::Skip)
        .regex(RegexNode::literal(" "))
        .finish();
    let tokens = g
        .production(ProductionKind::Token)
        .labeled("IF", RegexNode::literal("if"))
        .private("DIGIT", RegexNode::range('0', '9'))
        .labeled("NUM", RegexNode::plus(RegexNode::reference("DIGIT")))
        .finish();

    assert_eq!(skips, vec![Ordinal::new(1)]);
    assert_eq!(tokens, vec![Ordinal::new(2), Ordinal::new(3), Ordinal::new(4)]);

    let grammar = g.build();
    assert_eq!(grammar.max_ordinal(), Ordinal::new(4));
    assert_eq!(grammar.named_regexes().len(), 3);
    assert!(grammar.named_regexes()["DIGIT"].private);
}

#[test]
fn test_states_of() {
    let mut g = GrammarBuilder::new();
    g.lexical_state("COMMENT");
    let _ = g
        .production(ProductionKind::Token)
        .all_states()
        .regex(RegexNode::literal("x"))
        .finish();
    let _ = g
        .production(ProductionKind::More)
        .in_states(&["COMMENT", "NOWHERE"])
        .regex(RegexNode::literal("y"))
        .finish();
    let grammar = g.build();

    assert_eq!(grammar.states_of(&grammar.productions[0]), vec![0, 1]);
    assert_eq!(grammar.states_of(&grammar.productions[1]), vec![1]);
}

#[test]
fn test_next_state_and_action_apply_to_last_spec() {
    let mut g = GrammarBuilder::new();
    g.lexical_state("IN_STRING");
    let _ = g
        .production(ProductionKind::More)
        .regex(RegexNode::literal("a"))
        .regex(RegexNode::literal("\""))
        .next_state("IN_STRING")
        .action(&["count", "++"])
        .finish();
    let grammar = g.build();
    let specs = &grammar.productions[0].specs;

    assert_eq!(specs[0].next_state, None);
    assert_eq!(specs[1].next_state.as_deref(), Some("IN_STRING"));
    assert_eq!(
        specs[1].effective_action(),
        Some(&Action::new(["count", "++"]))
    );
}

#[test]
fn test_empty_action_is_absent() {
    let spec = RegexSpec {
        pattern: Pattern::EndOfFile,
        next_state: None,
        action: Some(Action::default()),
        location: Location::DUMMY,
    };
    assert_eq!(spec.effective_action(), None);
}

#[test]
fn test_display_name() {
    let mut g = GrammarBuilder::new();
    let _ = g
        .production(ProductionKind::Token)
        .labeled("ID", RegexNode::range('a', 'z'))
        .regex(RegexNode::literal("=="))
        .regex(RegexNode::range('0', '9'))
        .finish();
    let grammar = g.build();
    let names: Vec<String> = grammar
        .token_regexes()
        .map(|(_, re)| re.display_name())
        .collect();
    assert_eq!(names, vec!["ID", "\"==\"", "token of kind 3"]);
}
