//! Serialized size of JSON values.
//!
//! The size of the compact JSON text is the one cost metric every
//! strategy decision is made with.

mod json;

pub use json::{json_size, string_size};
