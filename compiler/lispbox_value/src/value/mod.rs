//! Runtime values for the lispbox evaluator.
//!
//! # Heap Handles
//!
//! Every variant stores its payload behind [`Heap`], whose constructor is
//! private to this module:
//!
//! ```text
//! let x = Value::symbol("x");                        // OK
//! let xs = Value::list(vec![x.clone()]);             // OK
//! let bad = Value::Symbol(Heap::new("x".into()));    // ERROR: Heap::new is pub(super)
//! ```
//!
//! This gives each value an allocation identity, which the live-value
//! tracker counts through [`WeakValue`] without keeping anything alive.
//!
//! # Closed Variant Set
//!
//! The four variants are fixed. Evaluation, truthiness and child traversal
//! are exhaustive matches, not dynamic dispatch.

mod builtin;
mod closure;
mod heap;

use std::fmt::{self, Write as _};
use std::rc::Weak;

pub use builtin::{ArgPolicy, Arity, Builtin, BuiltinFn};
pub use closure::{Closure, ANONYMOUS};
pub use heap::Heap;

/// Symbol names (compared lowercased) that count as false.
pub const FALSY_SYMBOLS: [&str; 8] = ["", "false", "no", "off", "0", "null", "undefined", "nan"];

/// Runtime value.
#[derive(Clone)]
pub enum Value {
    /// Identifier; evaluates by environment lookup.
    Symbol(Heap<String>),
    /// Ordered sequence; code and data. The empty list is nil.
    List(Heap<Vec<Value>>),
    /// User-defined function.
    Closure(Heap<Closure>),
    /// Native operation.
    Builtin(Heap<Builtin>),
}

impl Value {
    // Factory methods

    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(Heap::new(name.into()))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Heap::new(items))
    }

    /// A fresh empty list.
    pub fn nil() -> Self {
        Value::list(Vec::new())
    }

    pub fn closure(closure: Closure) -> Self {
        Value::Closure(Heap::new(closure))
    }

    pub fn builtin(builtin: Builtin) -> Self {
        Value::Builtin(Heap::new(builtin))
    }

    // Views

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(name) => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_closure(&self) -> Option<&Closure> {
        match self {
            Value::Closure(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_builtin(&self) -> Option<&Builtin> {
        match self {
            Value::Builtin(b) => Some(b),
            _ => None,
        }
    }

    #[inline]
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Closure(_) | Value::Builtin(_))
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::List(items) if items.is_empty())
    }

    /// Truthiness in boolean contexts such as `if`.
    ///
    /// - Symbol: false iff its lowercased name is in [`FALSY_SYMBOLS`]
    /// - List: false iff empty
    /// - Closure, Builtin: always true
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Symbol(name) => {
                let lowered = name.to_lowercase();
                !FALSY_SYMBOLS.contains(&lowered.as_str())
            }
            Value::List(items) => !items.is_empty(),
            Value::Closure(_) | Value::Builtin(_) => true,
        }
    }

    /// Values this one keeps alive, for quota accounting.
    pub fn children(&self) -> Vec<Value> {
        match self {
            Value::List(items) => items.to_vec(),
            Value::Closure(c) => c.children(),
            Value::Symbol(_) | Value::Builtin(_) => Vec::new(),
        }
    }

    /// Variant name used in type errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Closure(_) => "function",
            Value::Builtin(_) => "builtin",
        }
    }

    /// Display name of a callable, `None` for data.
    pub fn callable_name(&self) -> Option<&str> {
        match self {
            Value::Closure(c) => Some(c.name()),
            Value::Builtin(b) => Some(b.name()),
            Value::Symbol(_) | Value::List(_) => None,
        }
    }

    // Identity

    /// Allocation address; identifies this value while it is alive.
    pub fn addr(&self) -> usize {
        match self {
            Value::Symbol(h) => h.addr(),
            Value::List(h) => h.addr(),
            Value::Closure(h) => h.addr(),
            Value::Builtin(h) => h.addr(),
        }
    }

    /// Whether both values are the same allocation.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Symbol(a), Value::Symbol(b)) => Heap::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => Heap::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Heap::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => Heap::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Non-owning reference for the live-value tracker.
    pub fn downgrade(&self) -> WeakValue {
        match self {
            Value::Symbol(h) => WeakValue::Symbol(h.downgrade()),
            Value::List(h) => WeakValue::List(h.downgrade()),
            Value::Closure(h) => WeakValue::Closure(h.downgrade()),
            Value::Builtin(h) => WeakValue::Builtin(h.downgrade()),
        }
    }

    /// Render at most `budget` characters, for error messages.
    ///
    /// Stops walking as soon as the budget is spent, so a huge or deeply
    /// nested value costs no more than the preview it produces.
    pub fn preview(&self, budget: usize) -> String {
        let mut out = String::new();
        let mut remaining = budget;
        if !write_preview(self, &mut out, &mut remaining) {
            out.push_str("...");
        }
        out
    }
}

/// Returns `false` if the budget ran out before the value was fully written.
fn write_preview(value: &Value, out: &mut String, remaining: &mut usize) -> bool {
    fn emit(out: &mut String, remaining: &mut usize, text: &str) -> bool {
        for ch in text.chars() {
            if *remaining == 0 {
                return false;
            }
            out.push(ch);
            *remaining = remaining.saturating_sub(1);
        }
        true
    }

    match value {
        Value::List(items) => {
            if !emit(out, remaining, "(") {
                return false;
            }
            for (i, item) in items.iter().enumerate() {
                if i > 0 && !emit(out, remaining, " ") {
                    return false;
                }
                if !write_preview(item, out, remaining) {
                    return false;
                }
            }
            emit(out, remaining, ")")
        }
        Value::Closure(c) if c.is_anonymous() => {
            let mut head = String::from("(lambda (");
            head.push_str(&c.params().join(" "));
            head.push_str(") ");
            emit(out, remaining, &head)
                && write_preview(c.body(), out, remaining)
                && emit(out, remaining, ")")
        }
        Value::Symbol(name) => emit(out, remaining, name),
        Value::Closure(c) => emit(out, remaining, c.name()),
        Value::Builtin(b) => emit(out, remaining, b.name()),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Symbol(a), Value::Symbol(b)) => a.as_str() == b.as_str(),
            (Value::List(a), Value::List(b)) => a.as_slice() == b.as_slice(),
            (Value::Closure(a), Value::Closure(b)) => Heap::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a.name() == b.name(),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Symbol(name) => f.write_str(name),
            Value::List(items) => {
                f.write_char('(')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_char(')')
            }
            Value::Closure(c) if c.is_anonymous() => {
                write!(f, "(lambda ({}) {})", c.params().join(" "), c.body())
            }
            Value::Closure(c) => f.write_str(c.name()),
            Value::Builtin(b) => f.write_str(b.name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Symbol(name) => f.debug_tuple("Symbol").field(&name.as_str()).finish(),
            Value::List(items) => f.debug_tuple("List").field(&items.as_slice()).finish(),
            Value::Closure(c) => fmt::Debug::fmt(&**c, f),
            Value::Builtin(b) => f.debug_tuple("Builtin").field(&b.name()).finish(),
        }
    }
}

/// Non-owning counterpart of [`Value`].
#[derive(Clone, Debug)]
pub enum WeakValue {
    Symbol(Weak<String>),
    List(Weak<Vec<Value>>),
    Closure(Weak<Closure>),
    Builtin(Weak<Builtin>),
}

impl WeakValue {
    /// Whether any strong handle to the value remains.
    pub fn is_alive(&self) -> bool {
        match self {
            WeakValue::Symbol(w) => w.strong_count() > 0,
            WeakValue::List(w) => w.strong_count() > 0,
            WeakValue::Closure(w) => w.strong_count() > 0,
            WeakValue::Builtin(w) => w.strong_count() > 0,
        }
    }

    /// Recover the value if it is still alive.
    pub fn upgrade(&self) -> Option<Value> {
        match self {
            WeakValue::Symbol(w) => w.upgrade().map(|rc| Value::Symbol(Heap::from_rc(rc))),
            WeakValue::List(w) => w.upgrade().map(|rc| Value::List(Heap::from_rc(rc))),
            WeakValue::Closure(w) => w.upgrade().map(|rc| Value::Closure(Heap::from_rc(rc))),
            WeakValue::Builtin(w) => w.upgrade().map(|rc| Value::Builtin(Heap::from_rc(rc))),
        }
    }
}
