//! Proof that an error was reported.

use std::fmt;

/// Zero-sized proof that at least one error diagnostic was emitted.
///
/// Only [`DiagnosticQueue`](crate::DiagnosticQueue) and
/// [`ErrorGuaranteed::from_error_count`] can create one.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    pub(crate) fn new() -> Self {
        ErrorGuaranteed(())
    }

    /// Proof from an error count, if any errors were counted.
    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then(Self::new)
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("error(s) emitted")
    }
}
