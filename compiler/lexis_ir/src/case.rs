//! Case folding used by ignore-case literals and character classes.
//!
//! Only one-to-one mappings are applied: a character whose case mapping
//! expands to several characters (or leaves the BMP) is left unchanged.

use smallvec::SmallVec;

use crate::MAX_CHAR;

fn single_mapping(mut mapped: impl Iterator<Item = char>, original: char) -> char {
    match (mapped.next(), mapped.next()) {
        (Some(c), None) if u32::from(c) <= MAX_CHAR => c,
        _ => original,
    }
}

/// Lower-case variant of `c`.
#[inline]
pub fn to_lower(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_lowercase();
    }
    single_mapping(c.to_lowercase(), c)
}

/// Upper-case variant of `c`.
#[inline]
pub fn to_upper(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_uppercase();
    }
    single_mapping(c.to_uppercase(), c)
}

/// `c` followed by its distinct lower and upper variants.
pub fn case_variants(c: char) -> SmallVec<[char; 3]> {
    let mut out = SmallVec::new();
    for v in [c, to_lower(c), to_upper(c)] {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

/// Case-insensitive prefix test.
pub fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    let mut hay = haystack.chars();
    prefix.chars().all(|p| hay.next().is_some_and(|h| chars_eq_ignore_case(h, p)))
}

/// Case-insensitive equality of two characters.
#[inline]
pub fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || to_lower(a) == to_lower(b) || to_upper(a) == to_upper(b)
}

/// Case-insensitive string equality.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars().count() == b.chars().count() && starts_with_ignore_case(a, b)
}
