//! User-defined functions.

use std::fmt;

use super::Value;
use crate::scope::ScopeChain;

/// Display name of closures created by `lambda`.
pub const ANONYMOUS: &str = "anonymous function";

/// A user-defined function: parameters, body and the captured scope chain.
///
/// The chain holds the defining environment's frames by reference, so a
/// later `set` in one of those frames is visible to the closure.
pub struct Closure {
    params: Vec<String>,
    body: Value,
    name: String,
    scopes: ScopeChain,
}

impl Closure {
    /// Create an anonymous closure.
    pub fn new(params: Vec<String>, body: Value, scopes: ScopeChain) -> Self {
        Closure {
            params,
            body,
            name: ANONYMOUS.to_string(),
            scopes,
        }
    }

    /// Give the closure a display name used in errors and backtraces.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[inline]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    #[inline]
    pub fn body(&self) -> &Value {
        &self.body
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_anonymous(&self) -> bool {
        self.name == ANONYMOUS
    }

    /// The captured chain, outermost frame first.
    #[inline]
    pub fn scopes(&self) -> &ScopeChain {
        &self.scopes
    }

    /// The body plus everything the captured frames keep alive.
    pub fn children(&self) -> Vec<Value> {
        let mut children = vec![self.body.clone()];
        children.extend(self.scopes.visible_values());
        children
    }
}

impl fmt::Debug for Closure {
    // Frames may contain this closure, so they are summarized, not printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("body", &self.body)
            .field("frames", &self.scopes.len())
            .finish()
    }
}
