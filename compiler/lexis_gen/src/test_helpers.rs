//! Shared fixtures for the unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use lexis_diagnostic::{Diagnostic, ErrorCode};
use lexis_ir::{Grammar, Location};

use crate::{generate, Generated, GeneratorOptions};

pub(crate) fn at(line: u32, column: u32) -> Location {
    Location::new(line, column)
}

pub(crate) fn generate_ok(grammar: &Grammar) -> Generated {
    generate_with(grammar, &GeneratorOptions::default())
}

pub(crate) fn generate_with(grammar: &Grammar, options: &GeneratorOptions) -> Generated {
    match generate(grammar, options) {
        Ok(generated) => generated,
        Err(error) => panic!("generation failed: {error}: {:#?}", error.diagnostics()),
    }
}

/// Diagnostics of a run that must fail.
pub(crate) fn generate_err(grammar: &Grammar) -> Vec<Diagnostic> {
    generate(grammar, &GeneratorOptions::default())
        .expect_err("generation should fail")
        .diagnostics()
        .to_vec()
}

pub(crate) fn codes(diagnostics: &[Diagnostic]) -> Vec<ErrorCode> {
    diagnostics.iter().map(|d| d.code).collect()
}

pub(crate) fn messages(diagnostics: &[Diagnostic], code: ErrorCode) -> Vec<String> {
    diagnostics
        .iter()
        .filter(|d| d.code == code)
        .map(|d| d.message.clone())
        .collect()
}
