//! Diagnostic queue for collecting, deduplicating, and sorting diagnostics.
//!
//! Features:
//! - Error limits to prevent overwhelming output
//! - Deduplication of identical diagnostics
//! - One-shot warnings (reported at most once per generation run)
//! - `ErrorGuaranteed` proof that errors were emitted

use rustc_hash::FxHashSet;

use lexis_ir::Location;

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagnosticConfig {
    /// Maximum number of errors before further errors are dropped (0 = unlimited).
    pub error_limit: usize,
    /// Drop diagnostics identical to one already queued.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 25,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Create a config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Queue for collecting, deduplicating, and sorting diagnostics.
///
/// # Example
///
/// ```text
/// let mut queue = DiagnosticQueue::new();
/// queue.add(diagnostic);
/// // ... add more diagnostics
/// let sorted = queue.flush();
/// ```
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    /// Collected diagnostics in arrival order.
    diagnostics: Vec<Diagnostic>,
    /// Count of errors (not warnings/notes).
    error_count: usize,
    /// Codes already reported through `warn_once`.
    once: FxHashSet<ErrorCode>,
    /// Configuration.
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    /// Create a new diagnostic queue with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a diagnostic queue with custom configuration.
    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Add a diagnostic to the queue.
    ///
    /// Returns `true` if the diagnostic was added, `false` if it was filtered.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        let is_error = diag.is_error();

        if is_error && self.limit_reached() {
            return false;
        }

        if self.config.deduplicate && self.diagnostics.contains(&diag) {
            return false;
        }

        self.diagnostics.push(diag);

        if is_error {
            self.error_count += 1;
        }

        true
    }

    /// Add a diagnostic unless one with the same code was already reported
    /// through this method.
    pub fn warn_once(&mut self, diag: Diagnostic) -> bool {
        if !self.once.insert(diag.code) {
            return false;
        }
        self.add(diag)
    }

    /// Emit an error diagnostic and get proof it was emitted.
    ///
    /// The returned `ErrorGuaranteed` can only be obtained by reporting an
    /// error, so holding one proves generation must not succeed.
    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diag.is_error(), "emit_error called with a warning");
        self.add(diag);
        ErrorGuaranteed::new()
    }

    /// Check if the error limit has been reached.
    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    /// Get the number of errors collected.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Get the number of queued warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| !d.is_error()).count()
    }

    /// Check if any errors were emitted and get proof if so.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    /// Sort diagnostics by location and return them.
    ///
    /// Clears the queue (including one-shot tracking). Diagnostics without
    /// a location keep their relative order and sort first.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut result = std::mem::take(&mut self.diagnostics);
        result.sort_by_key(|d| d.primary_location().unwrap_or(Location::DUMMY));

        self.error_count = 0;
        self.once.clear();

        result
    }

    /// Get diagnostics without clearing the queue.
    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }
}
