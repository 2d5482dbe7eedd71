//! Stack growth for the generator's recursive passes.
//!
//! Three passes recurse in proportion to grammar size rather than grammar
//! nesting alone: NFA construction (regex depth, reference chains), the
//! epsilon-closure walk (length of epsilon chains) and state naming (the
//! number of states reachable in sequence, e.g. one per character of a
//! long literal). Each wraps its recursive step in
//! [`ensure_sufficient_stack`].
//!
//! # Platform Support
//!
//! - **Native targets**: `stacker` grows the stack on demand.
//! - **WASM targets**: passthrough.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
///
/// ```text
/// fn name_state(&mut self, id: StateId) {
///     ensure_sufficient_stack(|| {
///         for next in self.successors(id) {
///             self.name_state(next);
///         }
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version: call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
