//! Native operations and the metadata the dispatcher checks before calling them.

use std::fmt;

use super::Value;
use crate::errors::{wrong_arg_count, EvalError, EvalResult};
use crate::executor::Executor;

/// Signature of a native operation.
///
/// Arguments arrive evaluated or verbatim according to the builtin's
/// [`ArgPolicy`]. All further evaluation must go through `exec` so that
/// depth and step accounting sees it.
pub type BuiltinFn = fn(&[Value], &mut dyn Executor) -> EvalResult;

/// Number of arguments a builtin accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arity {
    /// Exactly this many.
    Exact(usize),
    /// This many or more.
    AtLeast(usize),
    /// Not checked by the dispatcher; the builtin validates its own arguments.
    Variadic,
}

impl Arity {
    /// Whether `got` arguments satisfy this arity.
    #[inline]
    pub fn accepts(self, got: usize) -> bool {
        match self {
            Arity::Exact(n) => got == n,
            Arity::AtLeast(n) => got >= n,
            Arity::Variadic => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
            Arity::Variadic => write!(f, "any number"),
        }
    }
}

/// Whether a builtin receives its arguments before or after evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ArgPolicy {
    /// Arguments are evaluated left to right before the call.
    #[default]
    Evaluated,
    /// Arguments are passed as written (`quote`, `lambda`, `set`, `if`).
    Quoted,
}

/// A native, non-redefinable operation.
#[derive(Clone, Copy)]
pub struct Builtin {
    name: &'static str,
    arity: Arity,
    policy: ArgPolicy,
    func: BuiltinFn,
}

impl Builtin {
    pub const fn new(name: &'static str, arity: Arity, policy: ArgPolicy, func: BuiltinFn) -> Self {
        Builtin {
            name,
            arity,
            policy,
            func,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn arity(&self) -> Arity {
        self.arity
    }

    #[inline]
    pub fn policy(&self) -> ArgPolicy {
        self.policy
    }

    #[inline]
    pub fn quotes(&self) -> bool {
        self.policy == ArgPolicy::Quoted
    }

    /// Validate the argument count against the declared arity.
    pub fn check_arity(&self, got: usize) -> Result<(), EvalError> {
        if self.arity.accepts(got) {
            Ok(())
        } else {
            Err(wrong_arg_count(self.name, self.arity, got))
        }
    }

    /// Check arity, then run the native function.
    pub fn invoke(&self, args: &[Value], exec: &mut dyn Executor) -> EvalResult {
        self.check_arity(args.len())?;
        (self.func)(args, exec)
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
