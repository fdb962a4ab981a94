//! Session snapshots.
//!
//! A [`Snapshot`] is a plain-data copy of a session: the visible scope chain,
//! every frame reachable from it (directly or through closures), and the
//! session's limits.
//!
//! Values and frames are stored once each, in two tables, and referred to
//! by index. A list bound under three names is one list again after
//! [`Snapshot::restore`], and two closures that shared a frame still share
//! it, so the restored session counts the same live values as the one it
//! was captured from. Every value entry refers only to earlier entries.
//!
//! The global frame is not stored. Builtins are stored by name and resolved
//! against the global frame of the interpreter being restored into.
//!
//! Counters (depth, steps) are not part of a snapshot; a restored session
//! starts with a fresh step budget.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use lispbox_value::{Closure, EvalError, LocalScope, Scope, ScopeChain, Value};

use crate::interpreter::{Interpreter, InterpreterBuilder};
use crate::limits::Limits;

/// Errors from encoding, decoding or restoring a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot codec error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("snapshot refers to unknown builtin '{0}'")]
    UnknownBuiltin(String),
    #[error("snapshot refers to missing frame {0}")]
    MissingFrame(usize),
    #[error("snapshot refers to missing value {0}")]
    MissingValue(usize),
    #[error("restored session does not fit its limits: {0}")]
    Limit(#[from] EvalError),
}

/// Serialized form of one [`Value`]. Children are value table indices.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueData {
    Symbol(String),
    List(Vec<usize>),
    Closure {
        params: Vec<String>,
        body: usize,
        name: String,
        /// Frame table indices, outermost first.
        scopes: Vec<usize>,
    },
    Builtin(String),
}

/// One frame's bindings, sorted by name, as value table indices.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameData {
    pub bindings: Vec<(String, usize)>,
}

/// A serializable copy of one session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub limits: Limits,
    /// Value table, children before parents.
    pub values: Vec<ValueData>,
    /// Frame table; closures and `scopes` refer to frames by index.
    pub frames: Vec<FrameData>,
    /// The visible chain, outermost first.
    pub scopes: Vec<usize>,
}

impl Snapshot {
    /// Copy the state of `interp`.
    pub fn capture(interp: &Interpreter) -> Self {
        let mut encoder = Encoder::default();
        let scopes = encoder.chain(interp.env().scopes());
        let (values, frames) = encoder.finish();
        tracing::debug!(
            values = values.len(),
            frames = frames.len(),
            "captured session snapshot"
        );
        Snapshot {
            limits: interp.limits(),
            values,
            frames,
            scopes,
        }
    }

    /// Rebuild a session from this snapshot.
    ///
    /// `builder` supplies the global frame and extension builtins; the
    /// recorded limits replace its limits. Every restored value is
    /// registered with the new session's tracker before it is returned.
    pub fn restore(&self, builder: InterpreterBuilder) -> Result<Interpreter, SnapshotError> {
        let mut interp = builder.limits(self.limits).build();

        let frames: Vec<LocalScope<Scope>> =
            self.frames.iter().map(|_| LocalScope::default()).collect();
        for frame in &frames {
            interp.env_mut().adopt(frame);
        }
        let mut decoder = Decoder {
            frames: &frames,
            global: interp.env().global().clone(),
            values: Vec::with_capacity(self.values.len()),
        };
        for data in &self.values {
            let value = decoder.value(data)?;
            decoder.values.push(value);
        }
        for (frame, data) in frames.iter().zip(&self.frames) {
            let mut scope = Scope::new();
            for (name, id) in &data.bindings {
                scope.define(name.as_str(), decoder.get(*id)?);
            }
            *frame.borrow_mut() = scope;
        }
        let chain = decoder.chain(&self.scopes)?;
        interp.env_mut().swap_scopes(chain);

        let bound: Vec<Value> = frames
            .iter()
            .flat_map(|frame| {
                frame
                    .borrow()
                    .iter()
                    .map(|(_, value)| value.clone())
                    .collect::<Vec<_>>()
            })
            .collect();
        for value in &bound {
            interp.env_mut().register_recursive(value)?;
        }
        tracing::debug!(
            frames = frames.len(),
            tracked = interp.env().tracked_count(),
            "restored session snapshot"
        );
        Ok(interp)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl Interpreter {
    /// Shorthand for [`Snapshot::capture`].
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }
}

/// Assigns value and frame ids by allocation identity.
#[derive(Default)]
struct Encoder {
    value_ids: FxHashMap<usize, usize>,
    values: Vec<ValueData>,
    frame_ids: FxHashMap<usize, usize>,
    /// Frames by id; `frames[i]` is encoded from `pending[i]`.
    pending: Vec<LocalScope<Scope>>,
    frames: Vec<FrameData>,
}

impl Encoder {
    fn frame_id(&mut self, frame: &LocalScope<Scope>) -> usize {
        if let Some(&id) = self.frame_ids.get(&frame.addr()) {
            return id;
        }
        let id = self.pending.len();
        self.frame_ids.insert(frame.addr(), id);
        self.pending.push(frame.clone());
        id
    }

    fn chain(&mut self, chain: &ScopeChain) -> Vec<usize> {
        chain
            .frames()
            .iter()
            .map(|frame| self.frame_id(frame))
            .collect()
    }

    /// Id of `value`, encoding it and its children on first sight.
    ///
    /// Values only reach each other through frames, and frames are
    /// referenced by id, so this recursion always ends.
    fn value(&mut self, value: &Value) -> usize {
        if let Some(&id) = self.value_ids.get(&value.addr()) {
            return id;
        }
        let data = match value {
            Value::Symbol(name) => ValueData::Symbol(name.to_string()),
            Value::List(items) => ValueData::List(items.iter().map(|v| self.value(v)).collect()),
            Value::Closure(closure) => ValueData::Closure {
                params: closure.params().to_vec(),
                body: self.value(closure.body()),
                name: closure.name().to_string(),
                scopes: self.chain(closure.scopes()),
            },
            Value::Builtin(builtin) => ValueData::Builtin(builtin.name().to_string()),
        };
        let id = self.values.len();
        self.value_ids.insert(value.addr(), id);
        self.values.push(data);
        id
    }

    fn finish(mut self) -> (Vec<ValueData>, Vec<FrameData>) {
        // Encoding a frame can discover more frames; they are appended to
        // `pending` and picked up by later iterations.
        while let Some(frame) = self.pending.get(self.frames.len()).cloned() {
            let bindings = frame
                .borrow()
                .sorted()
                .into_iter()
                .map(|(name, value)| (name, self.value(&value)))
                .collect();
            self.frames.push(FrameData { bindings });
        }
        (self.values, self.frames)
    }
}

struct Decoder<'a> {
    frames: &'a [LocalScope<Scope>],
    global: LocalScope<Scope>,
    /// Values decoded so far, by id.
    values: Vec<Value>,
}

impl Decoder<'_> {
    fn get(&self, id: usize) -> Result<Value, SnapshotError> {
        self.values
            .get(id)
            .cloned()
            .ok_or(SnapshotError::MissingValue(id))
    }

    fn value(&self, data: &ValueData) -> Result<Value, SnapshotError> {
        Ok(match data {
            ValueData::Symbol(name) => Value::symbol(name.as_str()),
            ValueData::List(items) => Value::list(
                items
                    .iter()
                    .map(|&id| self.get(id))
                    .collect::<Result<_, _>>()?,
            ),
            ValueData::Closure {
                params,
                body,
                name,
                scopes,
            } => Value::closure(
                Closure::new(params.clone(), self.get(*body)?, self.chain(scopes)?)
                    .named(name.as_str()),
            ),
            ValueData::Builtin(name) => self
                .global
                .borrow()
                .get(name)
                .filter(|value| value.as_builtin().is_some())
                .ok_or_else(|| SnapshotError::UnknownBuiltin(name.clone()))?,
        })
    }

    fn chain(&self, ids: &[usize]) -> Result<ScopeChain, SnapshotError> {
        ids.iter()
            .map(|&id| {
                self.frames
                    .get(id)
                    .cloned()
                    .ok_or(SnapshotError::MissingFrame(id))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(ScopeChain::from_frames)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
