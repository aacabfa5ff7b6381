//! Operation vocabulary: the update envelope and the per-codec operations.
//!
//! All of these are plain values. They are built fresh by an encode call and
//! consumed by a single decode call.

use serde_json::Value;
use thiserror::Error;

pub use delta_sync_json_pointer::Path;

// ── Error ─────────────────────────────────────────────────────────────────

/// Failure to read an update or operation from its wire form.
///
/// Encoding and decoding never fail; only parsing a wire envelope does.
#[derive(Debug, Error, PartialEq)]
pub enum CodecError {
    #[error("INVALID_ENVELOPE: {0}")]
    InvalidEnvelope(String),
    #[error("INVALID_OP: {0}")]
    InvalidOp(String),
}

// ── Strategy ──────────────────────────────────────────────────────────────

/// Discriminant of an [`Update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Value,
    Delta,
    Patch,
    Array,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Value => "value",
            Strategy::Delta => "delta",
            Strategy::Patch => "patch",
            Strategy::Array => "array",
        }
    }

    /// Parses a wire discriminant. Unknown names yield `None`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "value" => Some(Strategy::Value),
            "delta" => Some(Strategy::Delta),
            "patch" => Some(Strategy::Patch),
            "array" => Some(Strategy::Array),
            _ => None,
        }
    }
}

// ── Delta ─────────────────────────────────────────────────────────────────

/// One contiguous splice of a string.
///
/// `position` and `delete` count Unicode scalar values and refer to the
/// string as it was before any operation of the same batch was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaOperation {
    pub position: usize,
    pub delete: Option<usize>,
    pub insert: Option<String>,
}

// ── Patch ─────────────────────────────────────────────────────────────────

/// A path-addressed edit of a structured value.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOperation {
    Add { path: Path, value: Value },
    Remove { path: Path },
    Replace { path: Path, value: Value },
    Move { from: Path, path: Path },
    Copy { from: Path, path: Path },
    /// Accepted and carried, but never verified on apply.
    Test { path: Path, value: Value },
}

impl PatchOperation {
    /// Returns the operation name as written on the wire.
    pub fn op_name(&self) -> &'static str {
        match self {
            PatchOperation::Add { .. } => "add",
            PatchOperation::Remove { .. } => "remove",
            PatchOperation::Replace { .. } => "replace",
            PatchOperation::Move { .. } => "move",
            PatchOperation::Copy { .. } => "copy",
            PatchOperation::Test { .. } => "test",
        }
    }

    /// Returns the target path of the operation.
    pub fn path(&self) -> &Path {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Remove { path }
            | PatchOperation::Replace { path, .. }
            | PatchOperation::Move { path, .. }
            | PatchOperation::Copy { path, .. }
            | PatchOperation::Test { path, .. } => path,
        }
    }
}

// ── Array ─────────────────────────────────────────────────────────────────

/// An edit of an array, applied in list order against a working copy.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayOperation {
    Push { item: Value },
    Unshift { item: Value },
    Insert { index: usize, item: Value },
    Remove { index: usize },
    Update { index: usize, item: Value },
    Move { from: usize, to: usize },
    Replace { items: Vec<Value> },
}

impl ArrayOperation {
    pub fn op_name(&self) -> &'static str {
        match self {
            ArrayOperation::Push { .. } => "push",
            ArrayOperation::Unshift { .. } => "unshift",
            ArrayOperation::Insert { .. } => "insert",
            ArrayOperation::Remove { .. } => "remove",
            ArrayOperation::Update { .. } => "update",
            ArrayOperation::Move { .. } => "move",
            ArrayOperation::Replace { .. } => "replace",
        }
    }
}

// ── Update envelope ───────────────────────────────────────────────────────

/// The encoded change between two versions of a tracked value.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Full replacement: the new value itself.
    Value(Value),
    Delta(Vec<DeltaOperation>),
    Patch(Vec<PatchOperation>),
    Array(Vec<ArrayOperation>),
}

impl Update {
    pub fn strategy(&self) -> Strategy {
        match self {
            Update::Value(_) => Strategy::Value,
            Update::Delta(_) => Strategy::Delta,
            Update::Patch(_) => Strategy::Patch,
            Update::Array(_) => Strategy::Array,
        }
    }

    /// Returns the strategy-specific payload in its wire form.
    pub fn data(&self) -> Value {
        crate::codec::json::data_to_json(self)
    }

    /// Returns `true` for an update that carries no operations.
    ///
    /// A value update is never empty: it always carries the new value.
    pub fn is_noop(&self) -> bool {
        match self {
            Update::Value(_) => false,
            Update::Delta(ops) => ops.is_empty(),
            Update::Patch(ops) => ops.is_empty(),
            Update::Array(ops) => ops.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strategy_names_round_trip() {
        for s in [Strategy::Value, Strategy::Delta, Strategy::Patch, Strategy::Array] {
            assert_eq!(Strategy::from_str(s.as_str()), Some(s));
        }
        assert_eq!(Strategy::from_str("crdt"), None);
    }

    #[test]
    fn update_reports_its_strategy() {
        assert_eq!(Update::Value(json!(1)).strategy(), Strategy::Value);
        assert_eq!(Update::Delta(vec![]).strategy(), Strategy::Delta);
        assert_eq!(Update::Patch(vec![]).strategy(), Strategy::Patch);
        assert_eq!(Update::Array(vec![]).strategy(), Strategy::Array);
    }

    #[test]
    fn noop_updates() {
        assert!(Update::Delta(vec![]).is_noop());
        assert!(!Update::Value(json!(null)).is_noop());
        assert!(!Update::Array(vec![ArrayOperation::Remove { index: 0 }]).is_noop());
    }

    #[test]
    fn patch_operation_accessors() {
        let op = PatchOperation::Move {
            from: vec!["a".into()],
            path: vec!["b".into()],
        };
        assert_eq!(op.op_name(), "move");
        assert_eq!(op.path(), &vec!["b".to_string()]);
    }
}
