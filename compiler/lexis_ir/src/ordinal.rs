//! Token kind ordinals.

use std::fmt;

/// A token kind's declaration-order identity.
///
/// Ordinals double as priorities (lower wins ties) and as indices into
/// every per-kind table. Ordinal 0 is reserved for end of input.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Ordinal(u32);

impl Ordinal {
    /// The end-of-input kind.
    pub const EOF: Ordinal = Ordinal(0);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        Ordinal(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index into per-kind tables.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_eof(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Combine two optional kinds, keeping the higher-priority one.
///
/// `None` means "no kind" and loses against any ordinal. The derived
/// `Ord` on `Option` orders `None` first, which is the opposite of what
/// kind propagation needs.
#[inline]
pub fn min_kind(a: Option<Ordinal>, b: Option<Ordinal>) -> Option<Ordinal> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_kind_prefers_lower_ordinal() {
        let three = Some(Ordinal::new(3));
        let seven = Some(Ordinal::new(7));
        assert_eq!(min_kind(three, seven), three);
        assert_eq!(min_kind(seven, three), three);
    }

    #[test]
    fn test_min_kind_none_loses() {
        let five = Some(Ordinal::new(5));
        assert_eq!(min_kind(None, five), five);
        assert_eq!(min_kind(five, None), five);
        assert_eq!(min_kind(None, None), None);
    }

    #[test]
    fn test_eof() {
        assert!(Ordinal::EOF.is_eof());
        assert_eq!(Ordinal::new(4).index(), 4);
        assert_eq!(format!("{:?}", Ordinal::new(4)), "#4");
    }
}
