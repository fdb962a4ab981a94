//! Error types for evaluation.
//!
//! # Structured Error Categories
//!
//! `EvalErrorKind` carries the structured data for each failure so hosts can
//! match on it instead of parsing messages. Factory functions (e.g.
//! `undefined_variable()`) are the public constructors; they populate both
//! `kind` and the rendered `message`.
//!
//! Every kind falls into one of three categories (see [`ErrorCategory`]):
//! resource limits, name errors and type errors. Type errors come in four
//! shapes: a general mismatch, a mismatch in a specific argument position, an
//! attempt to apply a non-callable, and a wrong argument count.

use std::fmt;

use crate::value::{Arity, Value};

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Longest value rendering embedded in an error message.
const PREVIEW_BUDGET: usize = 80;

/// Which session limit was hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LimitKind {
    /// Nested `eval` calls reached `max_depth`.
    Depth,
    /// Total `eval` calls reached `max_steps`.
    Steps,
    /// Live tracked values reached `max_things`.
    Things,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitKind::Depth => write!(f, "too much nesting"),
            LimitKind::Steps => write!(f, "too many steps"),
            LimitKind::Things => write!(f, "too many things"),
        }
    }
}

/// Coarse classification of an error for hosts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A depth, step or live-value limit. Terminal for the session.
    ResourceLimit,
    /// Lookup of an unbound name.
    Name,
    /// Wrong kind of value, wrong argument count, or uncallable head.
    Type,
}

/// Typed error category for structured diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Resource
    LimitExceeded {
        limit: LimitKind,
        max: usize,
    },

    // Name
    UndefinedVariable {
        name: String,
    },

    // Type
    TypeMismatch {
        expected: String,
        type_name: &'static str,
        found: String,
    },
    WrongArgType {
        callable: String,
        /// 1-based argument position.
        position: usize,
        expected: String,
        type_name: &'static str,
        found: String,
    },
    NotCallable {
        type_name: &'static str,
        found: String,
    },
    ArityMismatch {
        callable: String,
        expected: Arity,
        got: usize,
    },
}

impl EvalErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::LimitExceeded { .. } => ErrorCategory::ResourceLimit,
            Self::UndefinedVariable { .. } => ErrorCategory::Name,
            Self::TypeMismatch { .. }
            | Self::WrongArgType { .. }
            | Self::NotCallable { .. }
            | Self::ArityMismatch { .. } => ErrorCategory::Type,
        }
    }
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LimitExceeded { limit, max } => write!(f, "{limit} (limit: {max})"),
            Self::UndefinedVariable { name } => write!(f, "nonexistent variable '{name}'"),
            Self::TypeMismatch {
                expected,
                type_name,
                found,
            } => write!(f, "expected {expected}, got the {type_name} {found}"),
            Self::WrongArgType {
                callable,
                position,
                expected,
                type_name,
                found,
            } => write!(
                f,
                "in argument {position} to {callable}: expected {expected}, got the {type_name} {found}"
            ),
            Self::NotCallable { type_name, found } => {
                write!(f, "expected a callable, got the {type_name} {found}")
            }
            Self::ArityMismatch {
                callable,
                expected,
                got,
            } => write!(
                f,
                "wrong number of args given to {callable}: expected {expected}, got {got}"
            ),
        }
    }
}

/// Immutable snapshot of the closure call stack at an error site.
///
/// Frames are closure display names, most recent call first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalBacktrace {
    frames: Vec<String>,
}

impl EvalBacktrace {
    pub fn new(frames: Vec<String>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "stack backtrace:")?;
        for (i, name) in self.frames.iter().enumerate() {
            writeln!(f, "  {i}: {name}")?;
        }
        Ok(())
    }
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()`.
    pub message: String,
    /// Closure call stack at the error site, when raised inside a call.
    pub backtrace: Option<EvalBacktrace>,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            backtrace: None,
        }
    }

    #[inline]
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Whether this error ends the session.
    #[inline]
    pub fn is_resource_limit(&self) -> bool {
        self.category() == ErrorCategory::ResourceLimit
    }

    /// Attach a backtrace unless one is already present.
    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        if self.backtrace.is_none() && !backtrace.is_empty() {
            self.backtrace = Some(backtrace);
        }
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {}

// Factory functions

/// A session limit was reached.
#[cold]
pub fn limit_exceeded(limit: LimitKind, max: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::LimitExceeded { limit, max })
}

/// Symbol lookup failed in every frame.
#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

/// A value of the wrong kind outside any argument list.
#[cold]
pub fn type_mismatch(expected: &str, found: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        type_name: found.type_name(),
        found: found.preview(PREVIEW_BUDGET),
    })
}

/// A value of the wrong kind in argument `position` (1-based) to `callable`.
#[cold]
pub fn wrong_arg_type(callable: &str, position: usize, expected: &str, found: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::WrongArgType {
        callable: callable.to_string(),
        position,
        expected: expected.to_string(),
        type_name: found.type_name(),
        found: found.preview(PREVIEW_BUDGET),
    })
}

/// The head of an application evaluated to data.
#[cold]
pub fn not_callable(found: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: found.type_name(),
        found: found.preview(PREVIEW_BUDGET),
    })
}

/// `callable` received `got` arguments but accepts `expected`.
#[cold]
pub fn wrong_arg_count(callable: &str, expected: Arity, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        callable: callable.to_string(),
        expected,
        got,
    })
}
