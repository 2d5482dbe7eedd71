//! Lexical-state tokenizer assembly for the lexis lexer generator.
//!
//! [`generate`] turns a [`Grammar`] into a [`TokenizerDescription`]: the
//! NFA state table, non-ASCII dispatch tables, literal tables and
//! per-kind classification that a table-driven tokenizer loop consumes.
//!
//! # Pipeline
//!
//! ```text
//! Grammar ─▶ semantic checks ─▶ per lexical state:
//!                                  literals  ─▶ LiteralTrie ─┐
//!                                  regexes   ─▶ GraphBuilder ─┤─▶ export
//!                                  `~[]`     ─▶ wildcard kind ┘
//!                               ─▶ unmatchable choices, empty-match loops
//!                               ─▶ TokenizerDescription
//! ```
//!
//! Errors stop generation: [`generate`] returns
//! [`GenerateError::InvalidGrammar`] with every diagnostic of the run.
//! Warnings travel with the description in [`Generated::diagnostics`].
//!
//! # Usage
//!
//! ```ignore
//! use lexis_gen::{generate, GeneratorOptions};
//! use lexis_ir::{GrammarBuilder, ProductionKind, RegexNode};
//!
//! let mut grammar = GrammarBuilder::new();
//! grammar
//!     .production(ProductionKind::Token)
//!     .regex(RegexNode::literal("if"))
//!     .labeled("ID", RegexNode::plus(RegexNode::range('a', 'z')))
//!     .finish();
//! let generated = generate(&grammar.build(), &GeneratorOptions::default())?;
//! assert_eq!(generated.description.lex_state_names, ["DEFAULT"]);
//! ```

mod assemble;
mod check;
mod description;
mod empty_match;
mod error;
mod options;
mod tracing_setup;

#[cfg(test)]
mod scanner;
#[cfg(test)]
mod test_helpers;

pub use description::{GeneratorFlags, LexicalStateDescription, MatchInfo, TokenizerDescription};
pub use error::GenerateError;
pub use options::GeneratorOptions;
pub use tracing_setup::init_tracing;

use lexis_diagnostic::{Diagnostic, DiagnosticQueue};
use lexis_ir::Grammar;

use crate::assemble::Assembler;

/// A generated description with the warnings raised on the way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generated {
    pub description: TokenizerDescription,
    /// Warnings only, sorted by location.
    pub diagnostics: Vec<Diagnostic>,
}

/// Check `grammar` and assemble its tokenizer description.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(states = grammar.lexical_states.len(), productions = grammar.productions.len())
)]
pub fn generate(grammar: &Grammar, options: &GeneratorOptions) -> Result<Generated, GenerateError> {
    if grammar.lexical_states.is_empty() {
        return Err(GenerateError::NoLexicalStates);
    }

    let mut diagnostics = DiagnosticQueue::with_config(options.diagnostics.clone());
    if check::check_grammar(grammar, options, &mut diagnostics).is_err() {
        return Err(GenerateError::InvalidGrammar {
            diagnostics: diagnostics.flush(),
        });
    }

    let description = Assembler::new(grammar, options).run(&mut diagnostics);
    if diagnostics.has_errors().is_some() {
        return Err(GenerateError::InvalidGrammar {
            diagnostics: diagnostics.flush(),
        });
    }

    let diagnostics = diagnostics.flush();
    tracing::debug!(
        nfa_states = description.nfa_states.len(),
        warnings = diagnostics.len(),
        "tokenizer description generated"
    );
    Ok(Generated {
        description,
        diagnostics,
    })
}
