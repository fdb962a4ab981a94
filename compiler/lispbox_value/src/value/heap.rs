//! Identity-bearing handle for value payloads.

// Rc is the intentional implementation detail of Heap<T>
#![expect(
    clippy::disallowed_types,
    reason = "Rc is the implementation of Heap<T>"
)]

use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

/// Reference-counted handle to a value payload.
///
/// The constructor is private to the value module, so every payload is
/// allocated through a `Value::` factory. Each allocation has a stable
/// address that the live-value tracker uses as its identity.
///
/// `Rc` rather than `Arc`: a session is single-threaded and its frames are
/// `RefCell`s, so values are never sent across threads.
#[repr(transparent)]
pub struct Heap<T>(Rc<T>);

impl<T> Heap<T> {
    #[inline]
    pub(super) fn new(value: T) -> Self {
        Heap(Rc::new(value))
    }

    /// Whether two handles point at the same allocation.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Rc::ptr_eq(&this.0, &other.0)
    }

    /// Address of the allocation, stable for as long as it is alive.
    #[inline]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    /// Number of strong handles currently sharing the allocation.
    #[inline]
    pub fn strong_count(this: &Self) -> usize {
        Rc::strong_count(&this.0)
    }

    #[inline]
    pub(super) fn downgrade(&self) -> Weak<T> {
        Rc::downgrade(&self.0)
    }

    #[inline]
    pub(super) fn from_rc(rc: Rc<T>) -> Self {
        Heap(rc)
    }
}

impl<T> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Rc::clone(&self.0))
    }
}

impl<T> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}
