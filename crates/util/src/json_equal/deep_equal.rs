use serde_json::{Number, Value};

/// Performs a deep equality check between two JSON values.
///
/// Arrays are compared element by element, so order matters. Objects are
/// compared key by key regardless of key order. Numbers compare by their
/// JSON representation, so `1` and `1.0` differ.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use delta_sync_util::json_equal::deep_equal;
///
/// assert!(deep_equal(&json!({"a": [1, 2], "b": 1.5}), &json!({"b": 1.5, "a": [1, 2]})));
/// assert!(!deep_equal(&json!(1), &json!(1.0)));
/// assert!(!deep_equal(&json!([1, 2]), &json!([2, 1])));
/// ```
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => number_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            if a.len() != b.len() {
                return false;
            }
            a.iter()
                .all(|(key, x)| b.get(key).map_or(false, |y| deep_equal(x, y)))
        }
        _ => false,
    }
}

/// Equality of two numbers as they would be written on the wire.
///
/// An integer never equals a float, and floats compare bitwise so that
/// `0.0` and `-0.0` stay distinct.
pub fn number_equal(a: &Number, b: &Number) -> bool {
    match (a.is_f64(), b.is_f64()) {
        (true, true) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.to_bits() == y.to_bits(),
            _ => false,
        },
        (false, false) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars() {
        assert!(deep_equal(&json!(null), &json!(null)));
        assert!(deep_equal(&json!("a"), &json!("a")));
        assert!(!deep_equal(&json!(0), &json!(null)));
        assert!(!deep_equal(&json!(1), &json!(true)));
        assert!(!deep_equal(&json!(""), &json!(null)));
    }

    #[test]
    fn integer_and_float_forms_differ() {
        assert!(!deep_equal(&json!(2), &json!(2.0)));
        assert!(!deep_equal(&json!({"ratio": 1}), &json!({"ratio": 1.0})));
        assert!(!deep_equal(&json!(2), &json!(2.5)));
        assert!(deep_equal(&json!(2.5), &json!(2.5)));
        assert!(!deep_equal(&json!(0.0), &json!(-0.0)));
        assert!(deep_equal(&json!(-7), &json!(-7)));
        assert!(deep_equal(&json!(u64::MAX), &json!(u64::MAX)));
        assert!(!deep_equal(&json!(-1), &json!(u64::MAX)));
    }

    #[test]
    fn array_order_matters() {
        assert!(deep_equal(&json!([1, [2, 3]]), &json!([1, [2, 3]])));
        assert!(!deep_equal(&json!([1, 2]), &json!([2, 1])));
        assert!(!deep_equal(&json!([1]), &json!([1, 1])));
    }

    #[test]
    fn object_key_order_does_not_matter() {
        assert!(deep_equal(
            &json!({"a": 1, "b": {"c": [1]}}),
            &json!({"b": {"c": [1]}, "a": 1})
        ));
    }

    #[test]
    fn objects_with_different_keys() {
        assert!(!deep_equal(&json!({"a": 1}), &json!({"b": 1})));
        assert!(!deep_equal(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
        assert!(!deep_equal(&json!({"a": null}), &json!({})));
    }
}
