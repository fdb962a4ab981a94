//! Closure call tracking for error backtraces.

use lispbox_value::EvalBacktrace;

/// Live stack of closure calls.
///
/// Each closure call pushes the closure's display name; return pops it. The
/// evaluator's depth limit bounds its length. When an error first escapes a
/// closure call, the stack is snapshotted into an [`EvalBacktrace`].
#[derive(Clone, Debug, Default)]
pub struct CallStack {
    frames: Vec<String>,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str) {
        self.frames.push(name.to_string());
    }

    pub fn pop(&mut self) {
        debug_assert!(
            !self.frames.is_empty(),
            "CallStack::pop() called on empty stack"
        );
        self.frames.pop();
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Snapshot the stack, most recent call first.
    pub fn capture(&self) -> EvalBacktrace {
        EvalBacktrace::new(self.frames.iter().rev().cloned().collect())
    }
}
