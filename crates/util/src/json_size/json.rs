use serde_json::Value;

/// Size of a JSON string literal, quotes and escape sequences included,
/// exactly as `serde_json` writes it.
pub fn string_size(s: &str) -> usize {
    let mut size = 2;
    for ch in s.chars() {
        size += match ch {
            '"' | '\\' | '\u{0008}' | '\t' | '\n' | '\u{000C}' | '\r' => 2,
            c if (c as u32) < 0x20 => 6,
            c => c.len_utf8(),
        };
    }
    size
}

/// Computes the exact length of the compact JSON serialization of `value`,
/// without allocating it.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use delta_sync_util::json_size::json_size;
///
/// assert_eq!(json_size(&json!(null)), 4);
/// assert_eq!(json_size(&json!("hello")), 7);
/// assert_eq!(json_size(&json!({"a": [1, 2]})), 11);
/// ```
pub fn json_size(value: &Value) -> usize {
    match value {
        Value::Null => 4,
        Value::Bool(true) => 4,
        Value::Bool(false) => 5,
        Value::Number(n) => n.to_string().len(),
        Value::String(s) => string_size(s),
        Value::Array(arr) => {
            let commas = arr.len().saturating_sub(1);
            2 + commas + arr.iter().map(json_size).sum::<usize>()
        }
        Value::Object(obj) => {
            let commas = obj.len().saturating_sub(1);
            // key, colon, value
            let entries: usize = obj
                .iter()
                .map(|(key, val)| string_size(key) + 1 + json_size(val))
                .sum();
            2 + commas + entries
        }
    }
}
