//! `InterpreterBuilder` for creating Interpreter instances with various configurations.

use lispbox_value::{Builtin, LocalScope, Scope, Value};

use super::Interpreter;
use crate::builtins::core_builtins;
use crate::diagnostics::CallStack;
use crate::environment::Environment;
use crate::limits::Limits;

/// Builder for creating Interpreter instances.
///
/// Defaults: [`Limits::default`], a fresh global frame, and the core builtin
/// set. Host bindings and extension builtins go into the global frame; they
/// are not counted against `max_things`.
pub struct InterpreterBuilder {
    limits: Limits,
    globals: Option<LocalScope<Scope>>,
    bindings: Vec<(String, Value)>,
    core_builtins: bool,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self {
            limits: Limits::default(),
            globals: None,
            bindings: Vec::new(),
            core_builtins: true,
        }
    }

    #[must_use]
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.limits.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.limits.max_steps = max_steps;
        self
    }

    #[must_use]
    pub fn max_things(mut self, max_things: usize) -> Self {
        self.limits.max_things = max_things;
        self
    }

    /// Leave the core builtins out of the global frame.
    #[must_use]
    pub fn without_core_builtins(mut self) -> Self {
        self.core_builtins = false;
        self
    }

    /// Add an extension builtin under its own name.
    #[must_use]
    pub fn builtin(mut self, builtin: Builtin) -> Self {
        self.bindings
            .push((builtin.name().to_string(), Value::builtin(builtin)));
        self
    }

    /// Bind `name` in the global frame.
    #[must_use]
    pub fn global(mut self, name: impl Into<String>, value: Value) -> Self {
        self.bindings.push((name.into(), value));
        self
    }

    /// Use a host-owned global frame, shared with any other session built
    /// from it.
    ///
    /// Core builtins are only added for names the frame does not bind yet.
    #[must_use]
    pub fn globals(mut self, frame: LocalScope<Scope>) -> Self {
        self.globals = Some(frame);
        self
    }

    /// Build the interpreter.
    pub fn build(self) -> Interpreter {
        let global = self.globals.unwrap_or_default();
        {
            let mut frame = global.borrow_mut();
            if self.core_builtins {
                for builtin in core_builtins() {
                    if !frame.contains(builtin.name()) {
                        frame.define(builtin.name(), Value::builtin(*builtin));
                    }
                }
            }
            for (name, value) in self.bindings {
                frame.define(name, value);
            }
        }

        Interpreter {
            env: Environment::new(global, self.limits.max_things),
            limits: self.limits,
            depth: 0,
            steps: 0,
            call_stack: CallStack::new(),
            exhausted: None,
        }
    }
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
