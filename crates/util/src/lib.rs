//! delta-sync-util - value utilities shared by the delta-sync codecs.
//!
//! Every codec compares values structurally, measures candidate encodings by
//! their serialized length, and (for arrays) asks whether elements carry a
//! stable identity. Those three concerns live here.

pub mod identity;
pub mod json_equal;
pub mod json_size;

// Re-exports for convenience
pub use identity::{identity_of, is_plain_object, ID_FIELD};
pub use json_equal::{deep_equal, number_equal};
pub use json_size::{json_size, string_size};
