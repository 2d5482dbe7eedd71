use super::*;

#[test]
fn test_valid_and_final_are_separate() {
    let mut info = KindInfo::new();
    info.insert_valid_kind(Ordinal::new(9));
    info.insert_final_kind(Ordinal::new(5));
    info.insert_final_kind(Ordinal::new(3));

    assert!(info.valid_kinds().contains(Ordinal::new(9)));
    assert!(!info.valid_kinds().contains(Ordinal::new(5)));
    assert_eq!(info.final_kinds().len(), 2);
    assert_eq!(info.final_kinds().first(), Some(Ordinal::new(3)));
}

#[test]
fn test_empty_cell() {
    let info = KindInfo::default();
    assert!(info.valid_kinds().is_empty());
    assert!(info.final_kinds().is_empty());
}
