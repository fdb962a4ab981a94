#![deny(clippy::arithmetic_side_effects)]
#![allow(
    clippy::result_large_err,
    reason = "EvalError carries its rendered message and backtrace by value"
)]
//! Lispbox Value - the data side of the lispbox evaluator.
//!
//! This crate provides:
//! - Runtime values (`Value`, `Closure`, `Builtin`) behind identity-bearing `Heap` handles
//! - Shared, interior-mutable frames (`Scope`, `LocalScope`, `ScopeChain`)
//! - The `Executor` seam through which builtins call back into the evaluator
//! - Evaluation errors (`EvalError`, `EvalErrorKind`, `EvalResult`)
//!
//! The evaluator itself lives in `lispbox_eval`. Keeping values and frames
//! here lets closures own their captured chain without depending on the
//! interpreter that created them.

mod errors;
mod executor;
mod scope;
mod value;

pub use errors::{
    limit_exceeded, not_callable, type_mismatch, undefined_variable, wrong_arg_count,
    wrong_arg_type, ErrorCategory, EvalBacktrace, EvalError, EvalErrorKind, EvalResult,
    LimitKind,
};
pub use executor::Executor;
pub use scope::{LocalScope, Scope, ScopeChain, WeakScope};
pub use value::{
    ArgPolicy, Arity, Builtin, BuiltinFn, Closure, Heap, Value, WeakValue, ANONYMOUS,
    FALSY_SYMBOLS,
};
