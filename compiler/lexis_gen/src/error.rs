//! Error type returned when no description can be produced.

use thiserror::Error;

use lexis_diagnostic::Diagnostic;

/// Why [`generate`](crate::generate) produced no description.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// The grammar has errors. Holds every diagnostic of the run, sorted
    /// by location, warnings included.
    #[error("lexical grammar has {} error(s)", count_errors(.diagnostics))]
    InvalidGrammar { diagnostics: Vec<Diagnostic> },

    #[error("lexical grammar declares no lexical states")]
    NoLexicalStates,
}

fn count_errors(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.is_error()).count()
}

impl GenerateError {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            GenerateError::InvalidGrammar { diagnostics } => diagnostics,
            GenerateError::NoLexicalStates => &[],
        }
    }
}
