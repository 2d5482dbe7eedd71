//! Generator configuration.

use lexis_diagnostic::DiagnosticConfig;
use lexis_literal::LiteralOptions;
use lexis_nfa::ClosureMode;

/// Options for one generation run.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratorOptions {
    /// Every token production ignores case.
    pub ignore_case: bool,
    /// The tokenizer reads characters rather than bytes. Without it,
    /// characters above U+00FF draw a warning.
    pub unicode_input: bool,
    /// Build literals into the NFA instead of the literal trie.
    pub no_dfa: bool,
    /// Merge equivalent NFA states during closure.
    pub optimize: bool,
    pub diagnostics: DiagnosticConfig,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            ignore_case: false,
            unicode_input: false,
            no_dfa: false,
            optimize: true,
            diagnostics: DiagnosticConfig::default(),
        }
    }
}

impl GeneratorOptions {
    #[must_use]
    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    #[must_use]
    pub fn with_unicode_input(mut self, unicode_input: bool) -> Self {
        self.unicode_input = unicode_input;
        self
    }

    #[must_use]
    pub fn with_no_dfa(mut self, no_dfa: bool) -> Self {
        self.no_dfa = no_dfa;
        self
    }

    #[must_use]
    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: DiagnosticConfig) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn closure_mode(&self) -> ClosureMode {
        if self.optimize {
            ClosureMode::Optimized
        } else {
            ClosureMode::Plain
        }
    }

    pub fn literal_options(&self) -> LiteralOptions {
        LiteralOptions {
            ignore_case: self.ignore_case,
            unicode_input: self.unicode_input,
        }
    }
}
