//! Native stack headroom for the lispbox evaluator.
//!
//! Script depth is bounded by the interpreter's `max_depth` limit, but each
//! nesting level costs several Rust frames (evaluate, apply, call, builtin).
//! A host that configures a generous depth limit must not crash the process
//! before the limit is reached, so recursive evaluation runs inside
//! [`ensure_sufficient_stack`], which allocates a fresh stack segment when the
//! current one runs low.
//!
//! On `wasm32` the closure is called directly; the runtime owns the stack.

/// Remaining stack below which a new segment is allocated (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (2MB).
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if fewer than [`RED_ZONE`] bytes remain.
///
/// ```text
/// fn eval(&mut self, expr: &Value) -> EvalResult {
///     ensure_sufficient_stack(|| self.eval_inner(expr))
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM version: call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
