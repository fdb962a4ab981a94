//! RAII-style scope guards for Interpreter environment management.
//!
//! Two guards, both holding `&mut Interpreter` and implementing
//! `Deref`/`DerefMut` so the interpreter is used through them directly:
//!
//! - [`ScopedInterpreter`] pushes one frame and pops it on drop.
//! - [`SwappedScopes`] replaces the visible chain and restores the caller's
//!   chain on drop.
//!
//! Both run their cleanup during unwinding as well as on `?` returns, so a
//! failing closure body can never leave the caller looking at the callee's
//! frames.
//!
//! # Usage
//!
//! ```text
//! // closure call: captured chain, then one argument frame
//! let mut swapped = interpreter.scopes_as(closure.scopes().clone());
//! let mut scoped = swapped.scoped(frame);
//! scoped.eval(closure.body())?;
//! // frame popped, then caller's chain restored
//! ```

use std::mem;
use std::ops::{Deref, DerefMut};

use lispbox_value::{Scope, ScopeChain};

use super::Interpreter;

/// RAII guard that pops the frame it pushed.
pub struct ScopedInterpreter<'guard> {
    interpreter: &'guard mut Interpreter,
}

impl Drop for ScopedInterpreter<'_> {
    fn drop(&mut self) {
        self.interpreter.env.pop_scope();
    }
}

impl Deref for ScopedInterpreter<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for ScopedInterpreter<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

/// RAII guard that puts the caller's scope chain back.
pub struct SwappedScopes<'guard> {
    interpreter: &'guard mut Interpreter,
    saved: ScopeChain,
}

impl Drop for SwappedScopes<'_> {
    fn drop(&mut self) {
        let saved = mem::take(&mut self.saved);
        self.interpreter.env.swap_scopes(saved);
    }
}

impl Deref for SwappedScopes<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for SwappedScopes<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl Interpreter {
    /// Push `frame` as the new innermost frame until the guard drops.
    pub fn scoped(&mut self, frame: Scope) -> ScopedInterpreter<'_> {
        self.env.push_scope(frame);
        ScopedInterpreter { interpreter: self }
    }

    /// Run `f` with `frame` pushed; the frame is popped afterwards.
    pub fn with_scope<T, F>(&mut self, frame: Scope, f: F) -> T
    where
        F: FnOnce(&mut ScopedInterpreter<'_>) -> T,
    {
        let mut scoped = self.scoped(frame);
        f(&mut scoped)
    }

    /// Make `chain` the visible chain until the guard drops.
    pub fn scopes_as(&mut self, chain: ScopeChain) -> SwappedScopes<'_> {
        let saved = self.env.swap_scopes(chain);
        SwappedScopes {
            interpreter: self,
            saved,
        }
    }

    /// Run `f` over `chain`; the caller's chain is restored afterwards.
    pub fn with_scopes_as<T, F>(&mut self, chain: ScopeChain, f: F) -> T
    where
        F: FnOnce(&mut SwappedScopes<'_>) -> T,
    {
        let mut swapped = self.scopes_as(chain);
        f(&mut swapped)
    }
}
