//! Error codes for all generator diagnostics.
//!
//! Each code is a unique identifier (e.g. `E0101`). The letter gives the
//! severity class and the digits the phase that reports it.

use std::fmt;

/// Error codes for all generator diagnostics.
///
/// Format:
/// - W0xxx: Warnings (generation continues)
/// - E01xx: Grammar semantic errors (no description is emitted)
/// - E9xxx: Internal generator errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ErrorCode {
    // Warnings (W0xxx)
    /// Non-ASCII character used without unicode input enabled
    W0001,
    /// Choice alternative can never be matched
    W0002,
    /// Regular expression can match the empty string
    W0003,
    /// String literal is matched as a different token kind
    W0004,
    /// IGNORE_CASE string partially superseded by an earlier string
    W0005,

    // Semantic Errors (E01xx)
    /// Undefined lexical token name
    E0101,
    /// String hidden by a more general IGNORE_CASE string
    E0102,
    /// Duplicate definition of a string token
    E0103,
    /// EOF action/state change not given for all states
    E0104,
    /// EOF action/state change outside a TOKEN production
    E0105,
    /// Duplicate EOF action/state change
    E0106,
    /// Undefined lexical state
    E0107,
    /// Multiply defined lexical token name
    E0108,
    /// Token name equal to a lexical state name
    E0109,
    /// Loop in regular expression references
    E0110,
    /// Character outside the supported range
    E0111,
    /// Malformed repetition bounds or character range
    E0112,

    // Internal Errors (E9xxx)
    /// Internal generator error
    E9001,
}

impl ErrorCode {
    /// All error code variants, for exhaustive testing.
    ///
    /// Kept in sync with `as_str()` which is exhaustive (Rust match enforces it).
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::W0001,
        ErrorCode::W0002,
        ErrorCode::W0003,
        ErrorCode::W0004,
        ErrorCode::W0005,
        ErrorCode::E0101,
        ErrorCode::E0102,
        ErrorCode::E0103,
        ErrorCode::E0104,
        ErrorCode::E0105,
        ErrorCode::E0106,
        ErrorCode::E0107,
        ErrorCode::E0108,
        ErrorCode::E0109,
        ErrorCode::E0110,
        ErrorCode::E0111,
        ErrorCode::E0112,
        ErrorCode::E9001,
    ];

    /// Get the code as a string (e.g., "E0101").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::W0001 => "W0001",
            ErrorCode::W0002 => "W0002",
            ErrorCode::W0003 => "W0003",
            ErrorCode::W0004 => "W0004",
            ErrorCode::W0005 => "W0005",
            ErrorCode::E0101 => "E0101",
            ErrorCode::E0102 => "E0102",
            ErrorCode::E0103 => "E0103",
            ErrorCode::E0104 => "E0104",
            ErrorCode::E0105 => "E0105",
            ErrorCode::E0106 => "E0106",
            ErrorCode::E0107 => "E0107",
            ErrorCode::E0108 => "E0108",
            ErrorCode::E0109 => "E0109",
            ErrorCode::E0110 => "E0110",
            ErrorCode::E0111 => "E0111",
            ErrorCode::E0112 => "E0112",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Check if this is a warning code (W0xxx range).
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ErrorCode::W0001
                | ErrorCode::W0002
                | ErrorCode::W0003
                | ErrorCode::W0004
                | ErrorCode::W0005
        )
    }

    /// Check if this is a grammar semantic error (E01xx range).
    pub fn is_semantic_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E0101
                | ErrorCode::E0102
                | ErrorCode::E0103
                | ErrorCode::E0104
                | ErrorCode::E0105
                | ErrorCode::E0106
                | ErrorCode::E0107
                | ErrorCode::E0108
                | ErrorCode::E0109
                | ErrorCode::E0110
                | ErrorCode::E0111
                | ErrorCode::E0112
        )
    }

    /// Check if this is an internal generator error (E9xxx range).
    pub fn is_internal_error(&self) -> bool {
        matches!(self, ErrorCode::E9001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E0101"` or `"W0003"`.
///
/// Case-insensitive. Derived from [`ErrorCode::ALL`] and [`ErrorCode::as_str()`].
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
