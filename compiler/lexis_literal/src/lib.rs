//! String-literal handling for the lexer generator.
//!
//! Literals such as `"instanceof"` never enter the NFA. Each lexical state
//! collects them in a [`LiteralTrie`]: a table of [`KindInfo`] per
//! (position, character) that a generated tokenizer walks directly.
//!
//! The trie cooperates with the lexical state's NFA in three ways:
//!
//! - **Sub-strings**: a literal that is a prefix of another literal must
//!   not end the match early ([`LiteralTrie::fill_sub_string`]).
//! - **Hand-off**: while walking a literal the tokenizer may fall back to
//!   the NFA. For every literal position the trie records the best kind
//!   the NFA has matched so far and the NFA states to resume from
//!   ([`LiteralTrie::compute_handoffs`]).
//! - **Literal tables**: the final per-(lexical state, first character)
//!   lists, longest first ([`LiteralTrie::update_tables`]).

mod handoff;
mod kind_info;
mod tables;
mod trie;

#[cfg(test)]
mod test_helpers;

pub use handoff::{HandoffKey, Intermediate};
pub use kind_info::KindInfo;
pub use tables::{LiteralEntry, LiteralTables};
pub use trie::{Literal, LiteralOptions, LiteralTrie};
