//! Frames and scope chains.
//!
//! A frame is a shared, interior-mutable map from names to values. Frames
//! are jointly owned by every chain that references them: the session's
//! environment and any closure created while the frame was visible. A `set`
//! through one owner is seen by all of them.

// Rc is the intentional implementation detail of LocalScope<T>
#![expect(
    clippy::disallowed_types,
    reason = "Rc is the implementation of LocalScope<T>"
)]

use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use crate::value::Value;

/// A single-threaded, reference-counted, interior-mutable frame handle.
///
/// All frame allocations go through [`LocalScope::new`]. Cloning the handle
/// shares the frame; it never copies the bindings.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Whether both handles share one frame.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Rc::ptr_eq(&this.0, &other.0)
    }

    /// Address of the frame, stable while it is alive.
    #[inline]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    /// Non-owning handle to the same frame.
    #[inline]
    pub fn downgrade(&self) -> WeakScope<T> {
        WeakScope(Rc::downgrade(&self.0))
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

impl<T: Default> Default for LocalScope<T> {
    fn default() -> Self {
        LocalScope::new(T::default())
    }
}

/// Non-owning counterpart of [`LocalScope`].
pub struct WeakScope<T>(Weak<RefCell<T>>);

impl<T> WeakScope<T> {
    #[inline]
    pub fn upgrade(&self) -> Option<LocalScope<T>> {
        self.0.upgrade().map(LocalScope)
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl<T> Clone for WeakScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        WeakScope(Weak::clone(&self.0))
    }
}

impl<T> fmt::Debug for WeakScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakScope")
            .field(&self.0.strong_count())
            .finish()
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A single frame of variable bindings.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    bindings: FxHashMap<String, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    /// Bind (or rebind) `name` in this frame, returning the previous value.
    #[inline]
    pub fn define(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.bindings.insert(name.into(), value)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).cloned()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    #[inline]
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.bindings.remove(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Bindings sorted by name, for deterministic output.
    pub fn sorted(&self) -> Vec<(String, Value)> {
        let mut entries: Vec<(String, Value)> = self
            .bindings
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl<N: Into<String>> FromIterator<(N, Value)> for Scope {
    fn from_iter<I: IntoIterator<Item = (N, Value)>>(iter: I) -> Self {
        Scope {
            bindings: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

/// An ordered chain of shared frames, outermost first.
///
/// Cloning a chain clones the frame handles, not the frames.
#[derive(Clone, Default)]
pub struct ScopeChain {
    frames: Vec<LocalScope<Scope>>,
}

impl ScopeChain {
    pub fn new() -> Self {
        ScopeChain::default()
    }

    pub fn from_frames(frames: Vec<LocalScope<Scope>>) -> Self {
        ScopeChain { frames }
    }

    /// Frames from outermost to innermost.
    #[inline]
    pub fn frames(&self) -> &[LocalScope<Scope>] {
        &self.frames
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn innermost(&self) -> Option<&LocalScope<Scope>> {
        self.frames.last()
    }

    /// Add a new innermost frame.
    #[inline]
    pub fn push(&mut self, frame: LocalScope<Scope>) {
        self.frames.push(frame);
    }

    /// Remove the innermost frame.
    #[inline]
    pub fn pop(&mut self) -> Option<LocalScope<Scope>> {
        self.frames.pop()
    }

    /// This chain plus one more innermost frame.
    #[must_use]
    pub fn with_frame(&self, frame: LocalScope<Scope>) -> Self {
        let mut chain = self.clone();
        chain.push(frame);
        chain
    }

    /// Innermost-first lookup.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.borrow().get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.frames.iter().any(|frame| frame.borrow().contains(name))
    }

    /// The value each visible name resolves to; shadowed bindings are skipped.
    pub fn visible_values(&self) -> Vec<Value> {
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut values = Vec::new();
        for frame in self.frames.iter().rev() {
            for (name, value) in frame.borrow().iter() {
                if seen.insert(name.to_string()) {
                    values.push(value.clone());
                }
            }
        }
        values
    }
}

impl fmt::Debug for ScopeChain {
    // Frames can reach closures that capture this very chain; print shape only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.frames.iter().map(|frame| frame.borrow().len()))
            .finish()
    }
}
