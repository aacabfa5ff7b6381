use serde_json::Value;

use crate::parse_index;

/// Reads the value at `path`, or `None` when any step is missing.
///
/// Objects are stepped into by key, arrays by decimal index. `-` never
/// resolves, since it names the slot one past the end of an array.
pub fn get<'a>(val: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = val;
    for step in path {
        current = match current {
            Value::Object(map) => map.get(step)?,
            Value::Array(arr) => arr.get(parse_index(step)?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable counterpart of [`get`].
pub fn get_mut<'a>(val: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    let mut current = val;
    for step in path {
        current = match current {
            Value::Object(map) => map.get_mut(step)?,
            Value::Array(arr) => arr.get_mut(parse_index(step)?)?,
            _ => return None,
        };
    }
    Some(current)
}
