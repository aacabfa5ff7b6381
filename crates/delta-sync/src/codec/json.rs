//! JSON codec for the update envelope.
//!
//! Converts [`Update`] and every operation type to and from
//! `serde_json::Value` in the envelope format
//! `{"strategy": "value"|"delta"|"patch"|"array", "data": ...}`.

use delta_sync_json_pointer::{format_json_pointer, parse_json_pointer};
use serde_json::{json, Map, Value};

use crate::types::{ArrayOperation, CodecError, DeltaOperation, PatchOperation, Path, Strategy, Update};

// ── Field helpers ─────────────────────────────────────────────────────────

fn as_object<'a>(v: &'a Value, what: &str) -> Result<&'a Map<String, Value>, CodecError> {
    v.as_object()
        .ok_or_else(|| CodecError::InvalidOp(format!("{what} must be an object")))
}

fn as_list<'a>(v: &'a Value, strategy: Strategy) -> Result<&'a Vec<Value>, CodecError> {
    v.as_array().ok_or_else(|| {
        CodecError::InvalidEnvelope(format!("{} data must be an array", strategy.as_str()))
    })
}

fn req_index(obj: &Map<String, Value>, op: &str, key: &str) -> Result<usize, CodecError> {
    obj.get(key)
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| CodecError::InvalidOp(format!("{op} requires '{key}'")))
}

fn req_value(obj: &Map<String, Value>, op: &str, key: &str) -> Result<Value, CodecError> {
    obj.get(key)
        .cloned()
        .ok_or_else(|| CodecError::InvalidOp(format!("{op} requires '{key}'")))
}

fn req_path(obj: &Map<String, Value>, op: &str, key: &str) -> Result<Path, CodecError> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(parse_json_pointer)
        .ok_or_else(|| CodecError::InvalidOp(format!("{op} requires '{key}'")))
}

fn encode_path(path: &[String]) -> Value {
    Value::String(format_json_pointer(path))
}

// ── Delta ─────────────────────────────────────────────────────────────────

/// Serialize a [`DeltaOperation`]. Absent `delete`/`insert` are omitted.
pub fn delta_op_to_json(op: &DeltaOperation) -> Value {
    let mut m = Map::new();
    m.insert("position".into(), json!(op.position));
    if let Some(delete) = op.delete {
        m.insert("delete".into(), json!(delete));
    }
    if let Some(insert) = &op.insert {
        m.insert("insert".into(), json!(insert));
    }
    Value::Object(m)
}

pub fn delta_op_from_json(v: &Value) -> Result<DeltaOperation, CodecError> {
    let obj = as_object(v, "delta operation")?;
    let position = req_index(obj, "delta", "position")?;
    let delete = match obj.get("delete") {
        None | Some(Value::Null) => None,
        Some(d) => Some(
            d.as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| CodecError::InvalidOp("delta 'delete' must be a count".into()))?,
        ),
    };
    let insert = match obj.get("insert") {
        None | Some(Value::Null) => None,
        Some(s) => Some(
            s.as_str()
                .ok_or_else(|| CodecError::InvalidOp("delta 'insert' must be a string".into()))?
                .to_string(),
        ),
    };
    Ok(DeltaOperation { position, delete, insert })
}

// ── Patch ─────────────────────────────────────────────────────────────────

/// Serialize a [`PatchOperation`] in JSON Patch form.
pub fn patch_op_to_json(op: &PatchOperation) -> Value {
    match op {
        PatchOperation::Add { path, value } => json!({
            "op": "add",
            "path": encode_path(path),
            "value": value
        }),
        PatchOperation::Remove { path } => json!({
            "op": "remove",
            "path": encode_path(path)
        }),
        PatchOperation::Replace { path, value } => json!({
            "op": "replace",
            "path": encode_path(path),
            "value": value
        }),
        PatchOperation::Move { from, path } => json!({
            "op": "move",
            "path": encode_path(path),
            "from": encode_path(from)
        }),
        PatchOperation::Copy { from, path } => json!({
            "op": "copy",
            "path": encode_path(path),
            "from": encode_path(from)
        }),
        PatchOperation::Test { path, value } => json!({
            "op": "test",
            "path": encode_path(path),
            "value": value
        }),
    }
}

pub fn patch_op_from_json(v: &Value) -> Result<PatchOperation, CodecError> {
    let obj = as_object(v, "patch operation")?;
    let op = obj
        .get("op")
        .and_then(Value::as_str)
        .ok_or_else(|| CodecError::InvalidOp("missing 'op' field".into()))?;
    let path = req_path(obj, op, "path")?;
    match op {
        "add" => Ok(PatchOperation::Add {
            path,
            value: req_value(obj, op, "value")?,
        }),
        "remove" => Ok(PatchOperation::Remove { path }),
        "replace" => Ok(PatchOperation::Replace {
            path,
            value: req_value(obj, op, "value")?,
        }),
        "move" => Ok(PatchOperation::Move {
            from: req_path(obj, op, "from")?,
            path,
        }),
        "copy" => Ok(PatchOperation::Copy {
            from: req_path(obj, op, "from")?,
            path,
        }),
        "test" => Ok(PatchOperation::Test {
            path,
            value: obj.get("value").cloned().unwrap_or(Value::Null),
        }),
        other => Err(CodecError::InvalidOp(format!("unknown patch op: {other}"))),
    }
}

// ── Array ─────────────────────────────────────────────────────────────────

pub fn array_op_to_json(op: &ArrayOperation) -> Value {
    match op {
        ArrayOperation::Push { item } => json!({"op": "push", "item": item}),
        ArrayOperation::Unshift { item } => json!({"op": "unshift", "item": item}),
        ArrayOperation::Insert { index, item } => {
            json!({"op": "insert", "index": index, "item": item})
        }
        ArrayOperation::Remove { index } => json!({"op": "remove", "index": index}),
        ArrayOperation::Update { index, item } => {
            json!({"op": "update", "index": index, "item": item})
        }
        ArrayOperation::Move { from, to } => json!({"op": "move", "from": from, "to": to}),
        ArrayOperation::Replace { items } => json!({"op": "replace", "items": items}),
    }
}

pub fn array_op_from_json(v: &Value) -> Result<ArrayOperation, CodecError> {
    let obj = as_object(v, "array operation")?;
    let op = obj
        .get("op")
        .and_then(Value::as_str)
        .ok_or_else(|| CodecError::InvalidOp("missing 'op' field".into()))?;
    match op {
        "push" => Ok(ArrayOperation::Push {
            item: req_value(obj, op, "item")?,
        }),
        "unshift" => Ok(ArrayOperation::Unshift {
            item: req_value(obj, op, "item")?,
        }),
        "insert" => Ok(ArrayOperation::Insert {
            index: req_index(obj, op, "index")?,
            item: req_value(obj, op, "item")?,
        }),
        "remove" => Ok(ArrayOperation::Remove {
            index: req_index(obj, op, "index")?,
        }),
        "update" => Ok(ArrayOperation::Update {
            index: req_index(obj, op, "index")?,
            item: req_value(obj, op, "item")?,
        }),
        "move" => Ok(ArrayOperation::Move {
            from: req_index(obj, op, "from")?,
            to: req_index(obj, op, "to")?,
        }),
        "replace" => match obj.get("items") {
            Some(Value::Array(items)) => Ok(ArrayOperation::Replace { items: items.clone() }),
            _ => Err(CodecError::InvalidOp("replace requires 'items' array".into())),
        },
        other => Err(CodecError::InvalidOp(format!("unknown array op: {other}"))),
    }
}

// ── Envelope ──────────────────────────────────────────────────────────────

/// Returns the strategy-specific payload of `update`.
pub fn data_to_json(update: &Update) -> Value {
    match update {
        Update::Value(v) => v.clone(),
        Update::Delta(ops) => Value::Array(ops.iter().map(delta_op_to_json).collect()),
        Update::Patch(ops) => Value::Array(ops.iter().map(patch_op_to_json).collect()),
        Update::Array(ops) => Value::Array(ops.iter().map(array_op_to_json).collect()),
    }
}

/// Serialize an [`Update`] to its envelope.
pub fn to_json(update: &Update) -> Value {
    json!({
        "strategy": update.strategy().as_str(),
        "data": data_to_json(update)
    })
}

/// Deserialize an envelope.
///
/// An unrecognized `strategy` is not an error: the payload is taken as the
/// literal new value. A missing `data` field reads as `null`.
pub fn from_json(v: &Value) -> Result<Update, CodecError> {
    let obj = v
        .as_object()
        .ok_or_else(|| CodecError::InvalidEnvelope("update must be an object".into()))?;
    let data = obj.get("data").unwrap_or(&Value::Null);
    let strategy = obj.get("strategy").and_then(Value::as_str).and_then(Strategy::from_str);
    match strategy {
        Some(Strategy::Delta) => Ok(Update::Delta(
            as_list(data, Strategy::Delta)?
                .iter()
                .map(delta_op_from_json)
                .collect::<Result<_, _>>()?,
        )),
        Some(Strategy::Patch) => Ok(Update::Patch(
            as_list(data, Strategy::Patch)?
                .iter()
                .map(patch_op_from_json)
                .collect::<Result<_, _>>()?,
        )),
        Some(Strategy::Array) => Ok(Update::Array(
            as_list(data, Strategy::Array)?
                .iter()
                .map(array_op_from_json)
                .collect::<Result<_, _>>()?,
        )),
        Some(Strategy::Value) | None => Ok(Update::Value(data.clone())),
    }
}

/// Serialize an envelope to compact JSON text.
pub fn to_string(update: &Update) -> String {
    to_json(update).to_string()
}

/// Parse an envelope from JSON text.
pub fn from_str(text: &str) -> Result<Update, CodecError> {
    let v: Value = serde_json::from_str(text)
        .map_err(|e| CodecError::InvalidEnvelope(format!("malformed JSON: {e}")))?;
    from_json(&v)
}

// ── Tests ─────────────────────────────────────────────────────────────────
