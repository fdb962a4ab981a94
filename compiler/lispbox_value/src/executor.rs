//! The seam through which builtins reach the evaluator.

use crate::errors::EvalResult;
use crate::scope::ScopeChain;
use crate::value::Value;

/// Evaluator services available to a builtin.
///
/// Builtins never recurse on their own: every nested evaluation goes through
/// [`Executor::eval`] or [`Executor::call`], which enforce the session's depth
/// and step limits. Every value a builtin allocates and returns goes through
/// [`Executor::track`] so the live-value quota sees it.
pub trait Executor {
    /// Evaluate an expression under the session's limits.
    fn eval(&mut self, expr: &Value) -> EvalResult;

    /// Apply a callable to an argument list that is passed through as is.
    fn call(&mut self, callee: &Value, args: Vec<Value>) -> EvalResult;

    /// Bind `name` in the innermost visible frame.
    fn assign(&mut self, name: &str, value: Value);

    /// The visible frame chain, shared (not copied), for closure capture.
    fn capture_scopes(&self) -> ScopeChain;

    /// Register a freshly allocated value with the live-value tracker.
    ///
    /// Returns the value back so allocation sites can end with
    /// `exec.track(Value::list(..))`.
    fn track(&mut self, value: Value) -> EvalResult;
}
