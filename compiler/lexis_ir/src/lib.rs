//! Lexis IR - shared data model for the lexer generator.
//!
//! This crate contains the types every later phase agrees on:
//! - [`Location`] for diagnostic positions
//! - [`Ordinal`] token kinds and [`KindSet`] bit-vectors over them
//! - The regex AST ([`RegexNode`], [`RegexKind`])
//! - The lexical grammar model ([`Grammar`], [`TokenProduction`])
//! - Case folding helpers shared by the NFA builder and the literal trie
//!
//! # Design Philosophy
//!
//! - **Closed variants**: the regex AST is an enum matched exhaustively,
//!   never a trait object hierarchy.
//! - **Ordinals are priorities**: lower ordinal means declared earlier and
//!   wins ties. `Option<Ordinal>` models "no kind"; use [`min_kind`] to
//!   combine, since `None` must compare as worse than any ordinal.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-copied types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

pub mod case;
pub mod grammar;
mod kind_set;
mod location;
mod ordinal;
pub mod regex;

pub use grammar::{
    Action, Grammar, GrammarBuilder, Pattern, ProductionBuilder, ProductionKind, RegexSpec,
    TokenProduction, TokenRegex,
};
pub use kind_set::KindSet;
pub use location::Location;
pub use ordinal::{min_kind, Ordinal};
pub use regex::{CharClass, ClassItem, RegexKind, RegexNode, MAX_CHAR};
