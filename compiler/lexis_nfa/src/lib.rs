//! NFA construction and analysis for the lexer generator.
//!
//! One lexical state at a time, token regexes are turned into Thompson
//! fragments inside a [`GraphBuilder`] arena and wired into a shared
//! initial state. The builder then:
//!
//! 1. computes epsilon closures, propagating the best (lowest) token kind
//!    reachable from each state ([`closure`]);
//! 2. optionally merges equivalent states to shrink the dispatch tables;
//! 3. names every state that has real transitions, aliasing states that
//!    would behave identically at run time ([`GraphBuilder::name_states`]);
//! 4. names composite state sets reached together after one character;
//! 5. builds the deduplicated high-byte/low-byte bit-vector tables used to
//!    dispatch characters >= 128 ([`partition`]).
//!
//! The result is exported as a flat [`NfaStateDesc`] table.
//!
//! # Arena
//!
//! States are addressed by [`StateId`] and never own each other, so the
//! cyclic epsilon graph needs no reference counting. All per-lexical-state
//! tables live in the [`GraphBuilder`] and are cleared by
//! [`GraphBuilder::reset`].

mod builder;
pub mod closure;
mod graph;
mod naming;
pub mod partition;
mod state;
mod table;

#[cfg(test)]
mod test_helpers;

pub use builder::{BuildContext, BuildError, NfaFragment};
pub use closure::ClosureMode;
pub use graph::GraphBuilder;
pub use partition::{BitVectorTable, ByteSet, NonAsciiMethod};
pub use state::{NfaState, StateId, StateName};
pub use table::NfaStateDesc;
