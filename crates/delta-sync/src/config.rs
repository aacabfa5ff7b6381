//! Thresholds and cost constants.
//!
//! The heuristics are fixed for wire compatibility with existing replicas;
//! only the two selection thresholds are tunable, and only at construction.

/// Minimum length (in chars) of the next string for the delta strategy.
pub const STRING_DELTA_MIN: usize = 100;

/// Minimum serialized size of the previous object for the patch strategy.
pub const OBJECT_PATCH_MIN: usize = 50;

/// Slack added to the size of the full value before a delta or patch is
/// rejected as too large.
pub const FALLBACK_OVERHEAD: usize = 20;

/// The array cost guard only runs when a diff has more operations than this.
pub const ARRAY_COST_GUARD_MIN_OPS: usize = 5;

/// Estimated cost of an index-only array operation (`remove`, `move`).
pub const ARRAY_REMOVE_COST: usize = 20;

/// Estimated framing cost of an item-carrying array operation, and of the
/// full-replacement baseline it is compared with.
pub const ARRAY_ITEM_OVERHEAD: usize = 30;

/// Strategy selection thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Strings shorter than this are always sent whole.
    pub string_delta_min: usize,
    /// Objects serializing shorter than this are always sent whole.
    pub object_patch_min: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            string_delta_min: STRING_DELTA_MIN,
            object_patch_min: OBJECT_PATCH_MIN,
        }
    }
}

impl SyncConfig {
    pub fn with_string_delta_min(mut self, min: usize) -> Self {
        self.string_delta_min = min;
        self
    }

    pub fn with_object_patch_min(mut self, min: usize) -> Self {
        self.object_patch_min = min;
        self
    }
}
