//! Tree-walking interpreter for lispbox expressions.
//!
//! One [`Interpreter`] is one evaluation session: an [`Environment`], the
//! session's [`Limits`], the depth and step counters, and the closure call
//! stack used for backtraces.
//!
//! # Evaluation
//!
//! [`Interpreter::eval`] is the only entry point for evaluating an
//! expression. It checks the depth and step limits, bumps both counters,
//! evaluates, and drops the depth counter on the way out. Steps are never
//! given back.
//!
//! - Symbols evaluate by lookup.
//! - The empty list evaluates to itself.
//! - A non-empty list is an application (see `application.rs`).
//! - Closures and builtins evaluate to themselves.
//!
//! # Exhaustion
//!
//! The first resource-limit error is stored. From then on every `eval`,
//! `run` and `call` fails with that error; the host discards the session.

mod application;
mod builder;
mod scope_guard;

use std::fmt;

use lispbox_stack::ensure_sufficient_stack;
use lispbox_value::{
    limit_exceeded, EvalError, EvalResult, Executor, LimitKind, ScopeChain, Value,
};

use crate::diagnostics::CallStack;
use crate::environment::Environment;
use crate::limits::Limits;

pub use builder::InterpreterBuilder;
pub use scope_guard::{ScopedInterpreter, SwappedScopes};

/// Result of [`Interpreter::run`].
#[derive(Clone, Debug)]
pub struct Outcome {
    /// Value of the submitted expression.
    pub value: Value,
    /// Every value the session is responsible for after the run.
    pub live: Vec<Value>,
}

/// One sandboxed evaluation session.
pub struct Interpreter {
    env: Environment,
    limits: Limits,
    /// Current nesting of `eval` calls.
    depth: usize,
    /// `eval` calls made over the session's lifetime.
    steps: usize,
    call_stack: CallStack,
    exhausted: Option<EvalError>,
}

impl Interpreter {
    /// A session with default limits and the core builtins.
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    /// Evaluate `expr` under the session's depth and step limits.
    pub fn eval(&mut self, expr: &Value) -> EvalResult {
        self.ensure_live()?;
        if self.depth >= self.limits.max_depth {
            return Err(self.exhaust(limit_exceeded(LimitKind::Depth, self.limits.max_depth)));
        }
        if self.steps >= self.limits.max_steps {
            return Err(self.exhaust(limit_exceeded(LimitKind::Steps, self.limits.max_steps)));
        }
        self.depth = self.depth.saturating_add(1);
        self.steps = self.steps.saturating_add(1);
        let result = ensure_sufficient_stack(|| self.eval_inner(expr));
        self.depth = self.depth.saturating_sub(1);
        self.record(result)
    }

    fn eval_inner(&mut self, expr: &Value) -> EvalResult {
        match expr {
            Value::Symbol(name) => self.env.lookup(name.as_str()),
            Value::List(items) => match items.split_first() {
                None => Ok(expr.clone()),
                Some((head, args)) => self.eval_application(head, args),
            },
            Value::Closure(_) | Value::Builtin(_) => Ok(expr.clone()),
        }
    }

    /// Register `expr` and everything in it, then evaluate it.
    ///
    /// This is the host's entry point for one top-level submission.
    pub fn run(&mut self, expr: &Value) -> Result<Outcome, EvalError> {
        self.ensure_live()?;
        let registered = self.env.register_recursive(expr);
        self.record(registered)?;
        let value = self.eval(expr)?;
        Ok(Outcome {
            value,
            live: self.env.live_values(),
        })
    }

    /// Evaluate one tree in a fresh session built from `builder`.
    ///
    /// The session is dropped afterwards; only the value survives. A
    /// surviving closure sees its session's frames emptied.
    pub fn eval_in_new(expr: &Value, builder: InterpreterBuilder) -> EvalResult {
        builder.build().run(expr).map(|outcome| outcome.value)
    }

    /// Bind `name` in the innermost visible frame, tracking `value` first.
    pub fn define(&mut self, name: &str, value: Value) -> EvalResult {
        self.ensure_live()?;
        let defined = self.env.define_tracked(name, value);
        self.record(defined)
    }

    // Accessors

    #[inline]
    pub fn env(&self) -> &Environment {
        &self.env
    }

    #[inline]
    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    #[inline]
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Current `eval` nesting; zero between top-level calls.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Steps used so far.
    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }

    #[inline]
    pub fn call_stack(&self) -> &CallStack {
        &self.call_stack
    }

    /// The resource-limit error that ended this session, if any.
    #[inline]
    pub fn exhausted(&self) -> Option<&EvalError> {
        self.exhausted.as_ref()
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted.is_some()
    }

    // Exhaustion

    fn ensure_live(&self) -> Result<(), EvalError> {
        match &self.exhausted {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Note `result`'s error if it ends the session, then pass it through.
    fn record<T>(&mut self, result: Result<T, EvalError>) -> Result<T, EvalError> {
        result.map_err(|err| self.exhaust(err))
    }

    #[cold]
    fn exhaust(&mut self, err: EvalError) -> EvalError {
        if err.is_resource_limit() && self.exhausted.is_none() {
            tracing::debug!(
                error = %err,
                depth = self.depth,
                steps = self.steps,
                "session exhausted"
            );
            self.exhausted = Some(err.clone());
        }
        err
    }
}

impl fmt::Debug for Interpreter {
    // Frames can hold closures over themselves; the chain prints shape only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interpreter")
            .field("limits", &self.limits)
            .field("depth", &self.depth)
            .field("steps", &self.steps)
            .field("scopes", self.env.scopes())
            .field("tracked", &self.env.tracked_count())
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for Interpreter {
    fn eval(&mut self, expr: &Value) -> EvalResult {
        Interpreter::eval(self, expr)
    }

    fn call(&mut self, callee: &Value, args: Vec<Value>) -> EvalResult {
        Interpreter::call(self, callee, args)
    }

    fn assign(&mut self, name: &str, value: Value) {
        self.env.assign(name, value);
    }

    fn capture_scopes(&self) -> ScopeChain {
        self.env.scopes().clone()
    }

    fn track(&mut self, value: Value) -> EvalResult {
        let registered = self.env.register(&value);
        self.record(registered)?;
        Ok(value)
    }
}
