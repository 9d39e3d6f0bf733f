//! Stack growth for deep recursion over type expressions and ancestry.

/// Grow the stack when less than this remains.
const RED_ZONE: usize = 64 * 1024;

/// Size of each new stack segment.
const STACK_SEGMENT: usize = 1024 * 1024;

/// Run `f`, first growing the stack if it is nearly exhausted.
#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, f)
}
