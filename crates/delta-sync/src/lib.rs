//! delta-sync - differential state synchronization.
//!
//! Given the previous and next version of a value, picks the cheapest
//! correct encoding of the change; given a replica and that encoding,
//! rebuilds the next version.
//!
//! Four strategies are available:
//!
//! - `value`: full replacement.
//! - `delta`: a prefix/suffix splice of a string ([`delta`]).
//! - `patch`: path-addressed edits of an object ([`patch`]).
//! - `array`: identity-aware or positional array edits ([`array_diff`]).
//!
//! # Example
//!
//! ```
//! use delta_sync::{apply_update, create_update, Strategy};
//! use serde_json::json;
//!
//! let prev = json!({"title": "Release notes", "body": "Initial draft of the notes", "rev": 1});
//! let next = json!({"title": "Release notes", "body": "Initial draft of the notes", "rev": 2});
//!
//! let update = create_update(&prev, &next);
//! assert_eq!(update.strategy(), Strategy::Patch);
//! assert_eq!(apply_update(&prev, &update), next);
//! ```

pub mod array_diff;
pub mod codec;
pub mod config;
pub mod delta;
pub mod patch;
pub mod strategy;
pub mod types;
pub mod update;

pub use array_diff::{apply_array_diff, compute_array_diff, create_array_update, ArrayCodec};
pub use codec::json::{from_json, to_json};
pub use config::SyncConfig;
pub use delta::DeltaCodec;
pub use patch::PatchCodec;
pub use types::{ArrayOperation, CodecError, DeltaOperation, PatchOperation, Path, Strategy, Update};
pub use update::{
    apply_update, codec_for, create_update, estimate_size, select_strategy, Codec, Differ, ValueCodec,
};
