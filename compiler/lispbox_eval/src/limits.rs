//! Per-session resource limits.

/// Bounds on one evaluation session. Fixed once the session is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "snapshot", derive(serde::Serialize, serde::Deserialize))]
pub struct Limits {
    /// Maximum nesting of `eval` calls.
    ///
    /// This counts evaluator recursion, not native frames; native stack is
    /// grown on demand by `lispbox_stack`, so the limit is what stops a
    /// runaway script.
    pub max_depth: usize,
    /// Maximum number of `eval` calls over the session's lifetime.
    ///
    /// A step is one `eval` call, so this is only roughly proportional to
    /// time. Extension builtins must do unbounded work through the
    /// `Executor` for this to hold.
    pub max_steps: usize,
    /// Maximum number of simultaneously live tracked values.
    pub max_things: usize,
}

impl Limits {
    pub const DEFAULT_MAX_DEPTH: usize = 100;
    pub const DEFAULT_MAX_STEPS: usize = 10_000;
    pub const DEFAULT_MAX_THINGS: usize = 5_000;
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_steps: Self::DEFAULT_MAX_STEPS,
            max_things: Self::DEFAULT_MAX_THINGS,
        }
    }
}
