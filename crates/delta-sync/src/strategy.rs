//! Strategy selection from the runtime shape and size of a change.

use delta_sync_util::{is_plain_object, json_size};
use serde_json::Value;

use crate::config::SyncConfig;
use crate::types::Strategy;

/// Picks the encoding for the change from `prev` to `next`.
///
/// - Two strings: [`Strategy::Delta`] once `next` reaches
///   `string_delta_min` chars.
/// - Two objects: [`Strategy::Patch`] once `prev` serializes to
///   `object_patch_min` bytes.
/// - Everything else, arrays included, is sent whole. Arrays go through
///   [`crate::array_diff`] explicitly when identity semantics are wanted.
pub fn select_strategy_with(config: &SyncConfig, prev: &Value, next: &Value) -> Strategy {
    match (prev, next) {
        (Value::String(_), Value::String(next)) => {
            if next.chars().count() >= config.string_delta_min {
                Strategy::Delta
            } else {
                Strategy::Value
            }
        }
        (prev, next) if is_plain_object(prev) && is_plain_object(next) => {
            if json_size(prev) >= config.object_patch_min {
                Strategy::Patch
            } else {
                Strategy::Value
            }
        }
        _ => Strategy::Value,
    }
}
