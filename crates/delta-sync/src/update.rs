//! Update dispatcher: the single encode/decode entry point.
//!
//! `create_update` classifies the change, runs the chosen codec and
//! guarantees the result is never larger than sending the new value whole.
//! `apply_update` routes an update to the codec that understands it.

use delta_sync_util::json_size;
use serde_json::Value;
use tracing::{debug, trace};

use crate::array_diff::ArrayCodec;
use crate::config::SyncConfig;
use crate::delta::DeltaCodec;
use crate::patch::PatchCodec;
use crate::strategy::select_strategy_with;
use crate::types::{Strategy, Update};

/// An encoding strategy.
///
/// Implementations are stateless; `encode` never reads anything but its
/// arguments and `decode` never modifies the replica.
pub trait Codec {
    fn strategy(&self) -> Strategy;

    /// Encodes the change from `prev` to `next`, possibly as a value update.
    fn encode(&self, prev: &Value, next: &Value) -> Update;

    /// Reconstructs the next value from `current` and `update`.
    fn decode(&self, current: &Value, update: &Update) -> Value;

    fn estimate_size(&self, update: &Update) -> usize {
        estimate_size(update)
    }
}

/// Full replacement.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueCodec;

impl Codec for ValueCodec {
    fn strategy(&self) -> Strategy {
        Strategy::Value
    }

    fn encode(&self, _prev: &Value, next: &Value) -> Update {
        Update::Value(next.clone())
    }

    fn decode(&self, current: &Value, update: &Update) -> Value {
        apply_update(current, update)
    }
}

/// Returns the codec implementing `strategy`.
pub fn codec_for(strategy: Strategy) -> &'static dyn Codec {
    match strategy {
        Strategy::Value => &ValueCodec,
        Strategy::Delta => &DeltaCodec,
        Strategy::Patch => &PatchCodec,
        Strategy::Array => &ArrayCodec,
    }
}

/// Serialized size of the update's payload, the one cost metric shared by
/// every strategy.
pub fn estimate_size(update: &Update) -> usize {
    match update {
        Update::Value(v) => json_size(v),
        other => json_size(&other.data()),
    }
}

/// Applies `update` to `current`, returning the new value.
///
/// Never fails: shape mismatches degrade as documented on each codec.
pub fn apply_update(current: &Value, update: &Update) -> Value {
    trace!(strategy = update.strategy().as_str(), "applying update");
    match update {
        Update::Value(v) => v.clone(),
        Update::Delta(_) => crate::delta::decode(current, update),
        Update::Patch(_) => crate::patch::decode(current, update),
        Update::Array(_) => crate::array_diff::decode(current, update),
    }
}

/// Encoder and decoder bound to a [`SyncConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Differ {
    config: SyncConfig,
}

impl Differ {
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn select_strategy(&self, prev: &Value, next: &Value) -> Strategy {
        select_strategy_with(&self.config, prev, next)
    }

    /// Encodes the change from `prev` to `next`.
    pub fn create_update(&self, prev: &Value, next: &Value) -> Update {
        let strategy = self.select_strategy(prev, next);
        let update = codec_for(strategy).encode(prev, next);
        if let Update::Value(_) = update {
            debug!(selected = strategy.as_str(), "encoded as value");
            return update;
        }
        let size = estimate_size(&update);
        let full = json_size(next);
        if size > full {
            debug!(selected = strategy.as_str(), size, full, "encoding larger than value, replacing");
            return Update::Value(next.clone());
        }
        debug!(selected = strategy.as_str(), size, full, "encoded");
        update
    }

    pub fn apply_update(&self, current: &Value, update: &Update) -> Value {
        apply_update(current, update)
    }

    pub fn estimate_size(&self, update: &Update) -> usize {
        estimate_size(update)
    }
}

/// [`Differ::select_strategy`] with the default thresholds.
pub fn select_strategy(prev: &Value, next: &Value) -> Strategy {
    Differ::default().select_strategy(prev, next)
}

/// [`Differ::create_update`] with the default thresholds.
pub fn create_update(prev: &Value, next: &Value) -> Update {
    Differ::default().create_update(prev, next)
}
