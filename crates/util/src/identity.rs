//! Element identity for array diffing.
//!
//! An array element is identity-bearing when it is an object whose `id`
//! field is a string. Such elements are matched across versions by id
//! instead of by position.

use serde_json::Value;

/// Name of the field carrying an element's stable identity.
pub const ID_FIELD: &str = "id";

/// Returns the element's identity, if it has one.
///
/// ```
/// use serde_json::json;
/// use delta_sync_util::identity_of;
///
/// assert_eq!(identity_of(&json!({"id": "a1", "n": 1})), Some("a1"));
/// assert_eq!(identity_of(&json!({"id": 7})), None);
/// assert_eq!(identity_of(&json!("a1")), None);
/// ```
pub fn identity_of(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => map.get(ID_FIELD)?.as_str(),
        _ => None,
    }
}

/// Returns `true` for objects. Arrays are not plain objects.
pub fn is_plain_object(value: &Value) -> bool {
    value.is_object()
}
