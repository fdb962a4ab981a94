//! Live-value accounting for one session.
//!
//! The tracker is a set of weak references keyed by allocation identity. It
//! counts values, it never owns them: a value whose last strong handle is
//! dropped stops counting the next time the tracker purges.
//!
//! A dead `Weak` still pins its allocation's control block, so an address in
//! the map cannot be reused by a different value until the entry is purged.

use rustc_hash::{FxHashMap, FxHashSet};

use lispbox_value::{limit_exceeded, EvalError, LimitKind, Value, WeakValue};

/// Weak set of live values, capped at `max` entries.
#[derive(Debug)]
pub struct Tracker {
    entries: FxHashMap<usize, WeakValue>,
    max: usize,
}

impl Tracker {
    pub fn new(max: usize) -> Self {
        Tracker {
            entries: FxHashMap::default(),
            max,
        }
    }

    #[inline]
    pub fn max(&self) -> usize {
        self.max
    }

    /// Whether `value` is currently tracked.
    pub fn contains(&self, value: &Value) -> bool {
        self.entries
            .get(&value.addr())
            .is_some_and(WeakValue::is_alive)
    }

    /// Number of tracked values still alive.
    pub fn live_count(&self) -> usize {
        self.entries.values().filter(|w| w.is_alive()).count()
    }

    /// Strong handles to every tracked value still alive.
    pub fn live_values(&self) -> Vec<Value> {
        self.entries.values().filter_map(WeakValue::upgrade).collect()
    }

    /// Drop entries whose values have been reclaimed.
    pub fn purge(&mut self) {
        self.entries.retain(|_, w| w.is_alive());
    }

    /// Track one value.
    ///
    /// Tracking an already-tracked value is a no-op. Fails with a
    /// `Things` limit error if `max` live values are already tracked.
    pub fn register(&mut self, value: &Value) -> Result<(), EvalError> {
        if self.contains(value) {
            return Ok(());
        }
        if self.entries.len() >= self.max {
            self.purge();
            if self.entries.len() >= self.max {
                tracing::debug!(max = self.max, "live-value quota exhausted");
                return Err(limit_exceeded(LimitKind::Things, self.max));
            }
        }
        tracing::trace!(kind = value.type_name(), "tracking value");
        self.entries.insert(value.addr(), value.downgrade());
        Ok(())
    }

    /// Track `root` and everything reachable through `children()`.
    ///
    /// Walks with an explicit work list and a visited set, so deep trees do
    /// not recurse natively and closures reachable from their own captured
    /// frames terminate.
    pub fn register_recursive(&mut self, root: &Value) -> Result<(), EvalError> {
        let mut visited: FxHashSet<usize> = FxHashSet::default();
        let mut pending = vec![root.clone()];
        while let Some(value) = pending.pop() {
            if !visited.insert(value.addr()) {
                continue;
            }
            self.register(&value)?;
            let mut children = value.children();
            // Reverse so the first child is visited first.
            children.reverse();
            pending.extend(children);
        }
        Ok(())
    }
}
