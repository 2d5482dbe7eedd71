//! Source locations for grammar constructs.
//!
//! Diagnostics name positions as "line L, column C", so the model carries
//! line/column pairs rather than byte offsets.

use std::fmt;

/// A 1-based line/column position in the grammar source.
///
/// Layout: 8 bytes total. Ordering is line-major, which is the order the
/// diagnostic queue reports in.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    /// Location for synthesized constructs with no source position.
    pub const DUMMY: Location = Location { line: 0, column: 0 };

    /// Create a new location.
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Location { line, column }
    }

    /// Check whether this location points into real source.
    #[inline]
    pub const fn is_dummy(&self) -> bool {
        self.line == 0 && self.column == 0
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::Location;
    crate::static_assert_size!(Location, 8);
}
