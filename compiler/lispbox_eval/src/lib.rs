#![deny(clippy::arithmetic_side_effects)]
#![allow(
    clippy::result_large_err,
    reason = "EvalError is the evaluator's only error type; boxing buys nothing here"
)]
//! Lispbox Eval - sandboxed evaluator for the lispbox expression language.
//!
//! A host builds an [`Interpreter`] (one evaluation session) with
//! [`InterpreterBuilder`], hands it expression trees produced by its own
//! parser, and gets back either a [`Value`] or a structured [`EvalError`].
//!
//! # Architecture
//!
//! - `Environment`: scope chain over shared frames plus the live-value tracker
//! - `Interpreter`: depth/step-limited evaluation, application, closure calls
//! - `builtins`: the core operators (`quote`, `eval`, `apply`, `progn`,
//!   `lambda`, `set`, `if`, `cons`)
//! - `snapshot`: session serialization (feature `snapshot`)
//!
//! # Limits
//!
//! Every evaluation goes through [`Interpreter::eval`], which enforces
//! `max_depth` and `max_steps`. Every allocation is registered with the
//! tracker, which enforces `max_things`. Hitting any limit exhausts the
//! session; the host discards it and builds a new one.
//!
//! # Re-exports
//!
//! Value and error types come from `lispbox_value`.

mod builtins;
mod diagnostics;
mod environment;
mod interpreter;
mod limits;
mod tracing_setup;
mod tracker;

#[cfg(feature = "snapshot")]
pub mod snapshot;

#[cfg(test)]
mod test_helpers;

pub use lispbox_value::{
    ArgPolicy, Arity, Builtin, BuiltinFn, Closure, ErrorCategory, EvalBacktrace, EvalError,
    EvalErrorKind, EvalResult, Executor, LimitKind, LocalScope, Scope, ScopeChain, Value,
    WeakScope, WeakValue, ANONYMOUS, FALSY_SYMBOLS,
};

pub use builtins::core_builtins;
pub use diagnostics::CallStack;
pub use environment::Environment;
pub use interpreter::{Interpreter, InterpreterBuilder, Outcome, ScopedInterpreter, SwappedScopes};
pub use limits::Limits;
pub use tracing_setup::init_tracing;
pub use tracker::Tracker;

#[cfg(feature = "snapshot")]
pub use snapshot::{Snapshot, SnapshotError};
