use super::*;
use pretty_assertions::assert_eq;

fn state() -> NfaState {
    NfaState::new(StateId::new(0))
}

#[test]
fn test_ascii_and_extended_moves() {
    let mut s = state();
    s.add_char('a');
    s.add_char('\u{e9}');
    s.add_char('\u{e9}');
    s.add_range('x', '\u{85}');

    assert_eq!(s.ascii_moves[0], 0);
    assert!(s.accepts('a'));
    assert!(s.accepts('z'));
    assert!(s.accepts('\u{7f}'));
    assert!(s.accepts('\u{83}'));
    assert!(s.accepts('\u{e9}'));
    assert!(!s.accepts('b'));
    assert!(!s.accepts('\u{86}'));
    assert_eq!(s.char_moves, vec!['\u{e9}']);
    assert_eq!(s.range_moves, vec![('\u{80}', '\u{85}')]);
}

#[test]
fn test_single_char_range_becomes_char() {
    let mut s = state();
    s.add_range('\u{7e}', '\u{80}');
    assert_eq!(s.char_moves, vec!['\u{80}']);
    assert!(s.range_moves.is_empty());
}

#[test]
fn test_has_transitions_and_usefulness() {
    let mut s = state();
    assert!(!s.has_transitions());
    assert!(!s.is_useful());
    s.is_final = true;
    assert!(s.is_useful());

    let mut t = state();
    t.add_range('\u{100}', '\u{200}');
    assert!(t.has_transitions());
}

#[test]
fn test_merge_moves_takes_best_kind() {
    let mut a = state();
    a.add_char('a');
    a.kind = Some(Ordinal::new(7));

    let mut b = state();
    b.add_char('b');
    b.add_char('\u{101}');
    b.kind = Some(Ordinal::new(3));
    b.is_final = true;

    a.merge_moves(&b);
    assert!(a.accepts('a') && a.accepts('b') && a.accepts('\u{101}'));
    assert_eq!(a.kind, Some(Ordinal::new(3)));
    assert!(a.is_final);
    assert!(!a.same_moves(&b));
}

#[test]
fn test_insert_in_order() {
    let mut list = vec![StateId::new(1), StateId::new(4)];
    assert!(insert_in_order(&mut list, StateId::new(3)));
    assert!(insert_in_order(&mut list, StateId::new(9)));
    assert!(insert_in_order(&mut list, StateId::new(0)));
    assert!(!insert_in_order(&mut list, StateId::new(4)));
    let raw: Vec<u32> = list.iter().map(|s| s.raw()).collect();
    assert_eq!(raw, vec![0, 1, 3, 4, 9]);
}
