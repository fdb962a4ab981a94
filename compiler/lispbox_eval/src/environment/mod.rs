//! Environment for variable scoping in the interpreter.
//!
//! The visible chain is a stack of shared frames above one global frame.
//! Lookup searches the chain innermost-first, then the global frame.
//! Assignment only ever touches the innermost frame.
//!
//! The environment also owns the session's live-value [`Tracker`], since
//! anything that enters a frame must have been counted first.
//!
//! # Frame Ownership
//!
//! A closure bound in a frame it captured keeps that frame alive through a
//! reference cycle. The environment keeps a weak handle to every frame it
//! allocated and empties those frames when it is dropped, so a discarded
//! session frees its whole frame graph. Closures that outlive their session
//! see empty frames. The global frame is never emptied.

use std::mem;

use lispbox_value::{
    undefined_variable, EvalError, LocalScope, Scope, ScopeChain, Value, WeakScope,
};

use crate::tracker::Tracker;

/// Dead frame handles are purged once the list reaches this many entries,
/// then again whenever it doubles.
const PURGE_FLOOR: usize = 64;

/// Scope chain, global frame and live-value tracker of one session.
pub struct Environment {
    /// Visible frames, outermost first. Does not include `global`.
    scopes: ScopeChain,
    /// Host-provided frame: builtins and injected bindings.
    global: LocalScope<Scope>,
    tracker: Tracker,
    /// Frames this session allocated or adopted.
    owned: Vec<WeakScope<Scope>>,
    purge_at: usize,
}

impl Environment {
    /// Create an environment with one empty session frame above `global`.
    pub fn new(global: LocalScope<Scope>, max_things: usize) -> Self {
        let mut env = Environment {
            scopes: ScopeChain::new(),
            global,
            tracker: Tracker::new(max_things),
            owned: Vec::new(),
            purge_at: PURGE_FLOOR,
        };
        let session = env.allocate(Scope::new());
        env.scopes.push(session);
        env
    }

    /// Look up a variable, innermost frame first, global frame last.
    pub fn lookup(&self, name: &str) -> Result<Value, EvalError> {
        self.scopes
            .lookup(name)
            .or_else(|| self.global.borrow().get(name))
            .ok_or_else(|| undefined_variable(name))
    }

    /// Whether `name` is bound anywhere in the chain or the global frame.
    pub fn contains(&self, name: &str) -> bool {
        self.scopes.contains(name) || self.global.borrow().contains(name)
    }

    /// Bind `name` in the innermost frame, creating the binding if needed.
    ///
    /// With an empty chain a fresh session frame is pushed first; the global
    /// frame may be shared between sessions and is never written.
    /// Does not track `value`; callers register it first.
    pub fn assign(&mut self, name: &str, value: Value) {
        let frame = match self.scopes.innermost() {
            Some(frame) => frame.clone(),
            None => {
                let frame = self.allocate(Scope::new());
                self.scopes.push(frame.clone());
                frame
            }
        };
        frame.borrow_mut().define(name, value);
    }

    /// Remove `name` from the innermost frame.
    pub fn unbind(&mut self, name: &str) -> Result<Value, EvalError> {
        self.scopes
            .innermost()
            .and_then(|frame| frame.borrow_mut().remove(name))
            .ok_or_else(|| undefined_variable(name))
    }

    /// Add a new innermost frame.
    #[inline]
    pub fn push_scope(&mut self, scope: Scope) {
        let frame = self.allocate(scope);
        self.scopes.push(frame);
    }

    fn allocate(&mut self, scope: Scope) -> LocalScope<Scope> {
        let frame = LocalScope::new(scope);
        self.adopt(&frame);
        frame
    }

    /// Make `frame` part of this session: it is emptied when the session is
    /// dropped.
    pub fn adopt(&mut self, frame: &LocalScope<Scope>) {
        if self.owned.len() >= self.purge_at {
            self.owned.retain(WeakScope::is_alive);
            self.purge_at = self.owned.len().saturating_mul(2).max(PURGE_FLOOR);
        }
        self.owned.push(frame.downgrade());
    }

    /// Number of frames this session owns that are still alive.
    pub fn owned_frames(&self) -> usize {
        self.owned.iter().filter(|frame| frame.is_alive()).count()
    }

    /// Remove the innermost frame.
    #[inline]
    pub fn pop_scope(&mut self) -> Option<LocalScope<Scope>> {
        self.scopes.pop()
    }

    /// Replace the visible chain, returning the previous one.
    ///
    /// The global frame is not part of the chain and is never replaced.
    #[inline]
    pub fn swap_scopes(&mut self, chain: ScopeChain) -> ScopeChain {
        mem::replace(&mut self.scopes, chain)
    }

    /// The visible chain, outermost first.
    #[inline]
    pub fn scopes(&self) -> &ScopeChain {
        &self.scopes
    }

    #[inline]
    pub fn global(&self) -> &LocalScope<Scope> {
        &self.global
    }

    /// Track one newly allocated value.
    #[inline]
    pub fn register(&mut self, value: &Value) -> Result<(), EvalError> {
        self.tracker.register(value)
    }

    /// Track a value and everything reachable from it.
    #[inline]
    pub fn register_recursive(&mut self, value: &Value) -> Result<(), EvalError> {
        self.tracker.register_recursive(value)
    }

    /// Track `value` recursively, then bind it in the innermost frame.
    ///
    /// This is how hosts inject bindings into a session.
    pub fn define_tracked(&mut self, name: &str, value: Value) -> Result<Value, EvalError> {
        self.register_recursive(&value)?;
        self.assign(name, value.clone());
        Ok(value)
    }

    /// Number of tracked values still alive.
    #[inline]
    pub fn tracked_count(&self) -> usize {
        self.tracker.live_count()
    }

    /// Every tracked value still alive.
    #[inline]
    pub fn live_values(&self) -> Vec<Value> {
        self.tracker.live_values()
    }

    #[inline]
    pub fn max_things(&self) -> usize {
        self.tracker.max()
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        let mut emptied = Vec::new();
        for frame in self.owned.iter().filter_map(WeakScope::upgrade) {
            if LocalScope::ptr_eq(&frame, &self.global) {
                continue;
            }
            if let Ok(mut scope) = frame.try_borrow_mut() {
                emptied.push(mem::take(&mut *scope));
            }
        }
        tracing::trace!(frames = emptied.len(), "released session frames");
        // Bindings are dropped after every borrow above has ended.
        drop(emptied);
    }
}
