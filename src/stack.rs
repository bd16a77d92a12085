//! Stack growth for the recursive parser, evaluator and tree rendering.
//!
//! Deeply nested source (`((((...))))`, long chains of calls) recurses once per
//! level on the host stack. Wrapping each level in [ensure_sufficient_stack]
//! moves the work onto a freshly allocated segment whenever the remaining
//! stack drops below the red zone.

const RED_ZONE: usize = 100 * 1024;

const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
