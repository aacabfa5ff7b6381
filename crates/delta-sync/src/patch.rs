//! Object patch codec.
//!
//! Diffs two plain objects into a JSON-Patch-like list of path-addressed
//! operations and replays such a list against a replica.

use delta_sync_json_pointer::{child_path, get, get_mut, parse_index};
use delta_sync_util::{deep_equal, json_size};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::FALLBACK_OVERHEAD;
use crate::types::{PatchOperation, Strategy, Update};
use crate::update::{self, Codec};

// ── Diff ──────────────────────────────────────────────────────────────────

/// Generates the operations turning `prev` into `next`, with every path
/// prefixed by `base`.
///
/// Removals come first, in `prev` key order; additions and replacements
/// follow in `next` key order. Values that are objects on both sides are
/// diffed recursively, anything else that changed is replaced whole.
pub fn diff(prev: &Map<String, Value>, next: &Map<String, Value>, base: &[String]) -> Vec<PatchOperation> {
    let mut ops = Vec::new();
    diff_obj(&mut ops, base, prev, next);
    ops
}

fn diff_obj(
    ops: &mut Vec<PatchOperation>,
    base: &[String],
    prev: &Map<String, Value>,
    next: &Map<String, Value>,
) {
    for key in prev.keys() {
        if !next.contains_key(key) {
            ops.push(PatchOperation::Remove { path: child_path(base, key) });
        }
    }
    for (key, next_val) in next {
        let path = child_path(base, key);
        match prev.get(key) {
            None => ops.push(PatchOperation::Add { path, value: next_val.clone() }),
            Some(prev_val) if deep_equal(prev_val, next_val) => {}
            Some(Value::Object(prev_obj)) => match next_val {
                Value::Object(next_obj) => diff_obj(ops, &path, prev_obj, next_obj),
                _ => ops.push(PatchOperation::Replace { path, value: next_val.clone() }),
            },
            Some(_) => ops.push(PatchOperation::Replace { path, value: next_val.clone() }),
        }
    }
}

// ── Apply ─────────────────────────────────────────────────────────────────

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            *other = Value::Object(Map::new());
            ensure_object(other)
        }
    }
}

fn array_slot(value: &Value, step: &str, allow_end: bool) -> Option<usize> {
    let Value::Array(arr) = value else { return None };
    let limit = if allow_end { arr.len() + 1 } else { arr.len() };
    match step {
        "-" if allow_end => Some(arr.len()),
        _ => parse_index(step).filter(|&i| i < limit),
    }
}

/// Steps into `step`, creating a fresh object when the key is missing and
/// replacing `current` with an object when it cannot hold `step`.
fn descend<'a>(current: &'a mut Value, step: &str) -> &'a mut Value {
    let slot = array_slot(current, step, false);
    match (slot, current) {
        (Some(i), Value::Array(arr)) => &mut arr[i],
        (_, other) => ensure_object(other)
            .entry(step.to_string())
            .or_insert_with(|| Value::Object(Map::new())),
    }
}

/// Assigns `value` at `path`. Intermediate containers are created on demand
/// and non-container intermediates are overwritten.
pub fn set_at(doc: &mut Value, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        *doc = value;
        return;
    };
    let mut current = doc;
    for step in parents {
        current = descend(current, step);
    }
    let slot = array_slot(current, last, true);
    match (slot, current) {
        (Some(i), Value::Array(arr)) if i == arr.len() => arr.push(value),
        (Some(i), Value::Array(arr)) => arr[i] = value,
        (_, other) => {
            ensure_object(other).insert(last.clone(), value);
        }
    }
}

/// Deletes the leaf at `path`. Missing parents, scalar parents and missing
/// keys are all no-ops, as is removing the root.
pub fn remove_at(doc: &mut Value, path: &[String]) -> Option<Value> {
    let (last, parents) = path.split_last()?;
    match get_mut(doc, parents)? {
        Value::Object(map) => map.shift_remove(last),
        Value::Array(arr) => {
            let i = parse_index(last).filter(|&i| i < arr.len())?;
            Some(arr.remove(i))
        }
        _ => None,
    }
}

/// Applies a single operation in place.
pub fn apply_op(doc: &mut Value, op: &PatchOperation) {
    match op {
        PatchOperation::Add { path, value } | PatchOperation::Replace { path, value } => {
            set_at(doc, path, value.clone());
        }
        PatchOperation::Remove { path } => {
            remove_at(doc, path);
        }
        PatchOperation::Move { from, path } => {
            if let Some(value) = remove_at(doc, from) {
                set_at(doc, path, value);
            }
        }
        PatchOperation::Copy { from, path } => {
            if let Some(value) = get(doc, from).cloned() {
                set_at(doc, path, value);
            }
        }
        // Not verified.
        PatchOperation::Test { .. } => {}
    }
}

/// Applies `ops` in order to a copy of `current`.
pub fn apply(current: &Value, ops: &[PatchOperation]) -> Value {
    let mut doc = current.clone();
    for op in ops {
        apply_op(&mut doc, op);
    }
    doc
}

// ── Codec ─────────────────────────────────────────────────────────────────

/// Encodes the change between two objects, with paths rooted at `base`.
///
/// Falls back to a value update when either side is not an object, or when
/// the patch would not be cheaper than `next` itself.
pub fn encode_at(prev: &Value, next: &Value, base: &[String]) -> Update {
    let (Value::Object(prev_obj), Value::Object(next_obj)) = (prev, next) else {
        return Update::Value(next.clone());
    };
    let update = Update::Patch(diff(prev_obj, next_obj, base));
    let ops_size = update::estimate_size(&update);
    let next_size = json_size(next);
    if ops_size >= next_size + FALLBACK_OVERHEAD {
        debug!(ops_size, next_size, "patch larger than value, falling back");
        return Update::Value(next.clone());
    }
    update
}

/// [`encode_at`] with paths rooted at the document.
pub fn encode(prev: &Value, next: &Value) -> Update {
    encode_at(prev, next, &[])
}

/// Reconstructs the next object from a replica and an update. The replica
/// is never modified.
pub fn decode(current: &Value, update: &Update) -> Value {
    match update {
        Update::Patch(ops) => apply(current, ops),
        other => update::apply_update(current, other),
    }
}

/// The object patch strategy as a [`Codec`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PatchCodec;

impl Codec for PatchCodec {
    fn strategy(&self) -> Strategy {
        Strategy::Patch
    }

    fn encode(&self, prev: &Value, next: &Value) -> Update {
        encode(prev, next)
    }

    fn decode(&self, current: &Value, update: &Update) -> Value {
        decode(current, update)
    }
}
