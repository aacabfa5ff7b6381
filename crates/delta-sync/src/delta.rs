//! String delta codec.
//!
//! Encodes a string change as a single splice over the region between the
//! longest common prefix and the longest common suffix. Positions count
//! Unicode scalar values, not bytes.

use delta_sync_util::string_size;
use serde_json::Value;
use tracing::debug;

use crate::config::FALLBACK_OVERHEAD;
use crate::types::{DeltaOperation, Strategy, Update};
use crate::update::{self, Codec};

// ── Affix scanning ────────────────────────────────────────────────────────

/// Length of the common prefix of two char slices.
fn pfx(c1: &[char], c2: &[char]) -> usize {
    if c1.is_empty() || c2.is_empty() || c1[0] != c2[0] {
        return 0;
    }
    // Binary search on the shared length.
    let mut min = 0usize;
    let mut max = c1.len().min(c2.len());
    let mut mid = max;
    let mut start = 0;
    while min < mid {
        if c1[start..mid] == c2[start..mid] {
            min = mid;
            start = min;
        } else {
            max = mid;
        }
        mid = (max - min) / 2 + min;
    }
    mid
}

/// Length of the common suffix of two char slices.
fn sfx(c1: &[char], c2: &[char]) -> usize {
    let n1 = c1.len();
    let n2 = c2.len();
    if n1 == 0 || n2 == 0 || c1[n1 - 1] != c2[n2 - 1] {
        return 0;
    }
    let mut min = 0usize;
    let mut max = n1.min(n2);
    let mut mid = max;
    let mut end = 0;
    while min < mid {
        if c1[n1 - mid..n1 - end] == c2[n2 - mid..n2 - end] {
            min = mid;
            end = min;
        } else {
            max = mid;
        }
        mid = (max - min) / 2 + min;
    }
    mid
}

// ── Diff / apply ──────────────────────────────────────────────────────────

/// Computes the operations turning `prev` into `next`: none when the strings
/// are equal, otherwise exactly one.
pub fn diff(prev: &str, next: &str) -> Vec<DeltaOperation> {
    if prev == next {
        return Vec::new();
    }
    let src: Vec<char> = prev.chars().collect();
    let dst: Vec<char> = next.chars().collect();
    let p = pfx(&src, &dst);
    // The suffix is searched only outside the prefix, so p + s never
    // exceeds the shorter length.
    let s = sfx(&src[p..], &dst[p..]);
    let delete = src.len() - p - s;
    let insert: String = dst[p..dst.len() - s].iter().collect();
    vec![DeltaOperation {
        position: p,
        delete: (delete > 0).then_some(delete),
        insert: (!insert.is_empty()).then_some(insert),
    }]
}

/// Applies `ops` to `current`.
///
/// Operations are applied in descending `position` order, so each position
/// refers to the original string. Positions and delete counts past the end
/// clamp to the string length.
pub fn apply(current: &str, ops: &[DeltaOperation]) -> String {
    let mut chars: Vec<char> = current.chars().collect();
    let mut ordered: Vec<&DeltaOperation> = ops.iter().collect();
    ordered.sort_by(|a, b| b.position.cmp(&a.position));
    for op in ordered {
        let start = op.position.min(chars.len());
        let end = start.saturating_add(op.delete.unwrap_or(0)).min(chars.len());
        let insert = op.insert.as_deref().unwrap_or("");
        chars.splice(start..end, insert.chars());
    }
    chars.into_iter().collect()
}

// ── Codec ─────────────────────────────────────────────────────────────────

/// Encodes a string change, falling back to a value update when the delta
/// would not be cheaper than sending `next` whole.
///
/// ```
/// use delta_sync::delta;
/// use delta_sync::Update;
///
/// let update = delta::encode("Hello", "Hello World");
/// assert_eq!(update, Update::Value("Hello World".into()));
/// ```
pub fn encode(prev: &str, next: &str) -> Update {
    let update = Update::Delta(diff(prev, next));
    let ops_size = update::estimate_size(&update);
    let next_size = string_size(next);
    if ops_size >= next_size + FALLBACK_OVERHEAD {
        debug!(ops_size, next_size, "delta larger than value, falling back");
        return Update::Value(Value::String(next.to_string()));
    }
    update
}

/// Reconstructs the next string from a replica and an update.
///
/// A non-string replica is read as the empty string.
pub fn decode(current: &Value, update: &Update) -> Value {
    match update {
        Update::Delta(ops) => Value::String(apply(current.as_str().unwrap_or(""), ops)),
        other => update::apply_update(current, other),
    }
}

/// The string delta strategy as a [`Codec`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DeltaCodec;

impl Codec for DeltaCodec {
    fn strategy(&self) -> Strategy {
        Strategy::Delta
    }

    fn encode(&self, prev: &Value, next: &Value) -> Update {
        match (prev, next) {
            (Value::String(prev), Value::String(next)) => encode(prev, next),
            _ => Update::Value(next.clone()),
        }
    }

    fn decode(&self, current: &Value, update: &Update) -> Value {
        decode(current, update)
    }
}
