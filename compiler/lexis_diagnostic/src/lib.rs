//! Diagnostic system for grammar warnings and errors.
//!
//! Every diagnostic carries:
//! - An error code for searchability
//! - A message (what went wrong)
//! - A primary location (where it went wrong)
//! - Optional notes and suggestions
//!
//! # Error Guarantees
//!
//! The `ErrorGuaranteed` type provides type-level proof that at least one
//! error was emitted. Generation refuses to produce a tokenizer description
//! once a guarantee exists.
//!
//! ```text
//! // Can only get ErrorGuaranteed by emitting an error
//! let guarantee = queue.emit_error(diagnostic);
//!
//! fn check(grammar: &Grammar) -> Result<(), ErrorGuaranteed> { ... }
//! ```

mod diagnostic;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
