//! Array diff codec.
//!
//! Arrays whose elements all carry a string `id` are diffed by identity;
//! arrays whose elements carry none are diffed by position, recognizing only
//! pure appends, prepends and truncations. Anything else is sent whole.
//!
//! A `None` diff means "use full replacement".

use delta_sync_util::{deep_equal, identity_of, json_size};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::config::{ARRAY_COST_GUARD_MIN_OPS, ARRAY_ITEM_OVERHEAD, ARRAY_REMOVE_COST};
use crate::types::{ArrayOperation, Strategy, Update};
use crate::update::{self, Codec};

// ── Classification ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Identity {
    Keyed,
    Positional,
    Mixed,
}

fn classify(prev: &[Value], next: &[Value]) -> Identity {
    let total = prev.len() + next.len();
    let keyed = prev
        .iter()
        .chain(next)
        .filter(|item| identity_of(item).is_some())
        .count();
    if keyed == 0 {
        Identity::Positional
    } else if keyed == total {
        Identity::Keyed
    } else {
        Identity::Mixed
    }
}

/// Diffs two arrays, choosing the identity or the positional algorithm.
pub fn compute_array_diff(prev: &[Value], next: &[Value]) -> Option<Vec<ArrayOperation>> {
    match classify(prev, next) {
        Identity::Keyed => compute_id_based_diff(prev, next),
        Identity::Positional => compute_positional_diff(prev, next),
        Identity::Mixed => {
            debug!("array mixes identified and anonymous elements, replacing");
            None
        }
    }
}

// ── Identity path ─────────────────────────────────────────────────────────

/// Maps each id to its index; `None` if an id repeats or an element has none.
fn index_by_id(items: &[Value]) -> Option<IndexMap<&str, usize>> {
    let mut index = IndexMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        if index.insert(identity_of(item)?, i).is_some() {
            return None;
        }
    }
    Some(index)
}

fn items_size(items: &[Value]) -> usize {
    2 + items.len().saturating_sub(1) + items.iter().map(json_size).sum::<usize>()
}

/// Estimated wire cost of `ops` for the cost guard.
fn estimated_cost(ops: &[ArrayOperation]) -> usize {
    ops.iter()
        .map(|op| match op {
            ArrayOperation::Remove { .. } | ArrayOperation::Move { .. } => ARRAY_REMOVE_COST,
            ArrayOperation::Push { item }
            | ArrayOperation::Unshift { item }
            | ArrayOperation::Insert { item, .. }
            | ArrayOperation::Update { item, .. } => json_size(item) + ARRAY_ITEM_OVERHEAD,
            ArrayOperation::Replace { items } => items_size(items) + ARRAY_ITEM_OVERHEAD,
        })
        .sum()
}

/// Diffs arrays of identity-bearing elements.
///
/// Emits removals (descending `prev` index), then moves restoring the
/// relative order of retained elements, then insertions (ascending `next`
/// index, `push` for the last slot), then updates of changed elements.
/// Returns `None` on duplicate or missing ids, or when a diff of more than
/// [`ARRAY_COST_GUARD_MIN_OPS`] operations is estimated to cost more than
/// sending `next` whole.
pub fn compute_id_based_diff(prev: &[Value], next: &[Value]) -> Option<Vec<ArrayOperation>> {
    let prev_ix = index_by_id(prev)?;
    let next_ix = index_by_id(next)?;
    let mut ops = Vec::new();

    for (&id, &i) in prev_ix.iter().rev() {
        if !next_ix.contains_key(id) {
            ops.push(ArrayOperation::Remove { index: i });
        }
    }

    let mut working: Vec<&str> = prev_ix.keys().copied().filter(|id| next_ix.contains_key(id)).collect();
    let target: Vec<&str> = next_ix.keys().copied().filter(|id| prev_ix.contains_key(id)).collect();
    for (to, id) in target.iter().enumerate() {
        let from = working[to..].iter().position(|w| w == id).map_or(to, |off| to + off);
        if from != to {
            let moved = working.remove(from);
            working.insert(to, moved);
            ops.push(ArrayOperation::Move { from, to });
        }
    }

    let last = next.len().saturating_sub(1);
    for (&id, &i) in &next_ix {
        if prev_ix.contains_key(id) {
            continue;
        }
        let item = next[i].clone();
        if i == last {
            ops.push(ArrayOperation::Push { item });
        } else {
            ops.push(ArrayOperation::Insert { index: i, item });
        }
    }

    for (&id, &i) in &next_ix {
        if let Some(&pi) = prev_ix.get(id) {
            if !deep_equal(&prev[pi], &next[i]) {
                ops.push(ArrayOperation::Update { index: i, item: next[i].clone() });
            }
        }
    }

    if ops.len() > ARRAY_COST_GUARD_MIN_OPS {
        let cost = estimated_cost(&ops);
        let full = items_size(next) + ARRAY_ITEM_OVERHEAD;
        if cost > full {
            debug!(ops = ops.len(), cost, full, "array diff costs more than replacement");
            return None;
        }
    }
    Some(ops)
}

// ── Positional path ───────────────────────────────────────────────────────

fn all_equal(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| deep_equal(x, y))
}

/// Diffs arrays of anonymous elements by position.
///
/// Only a pure append, a pure prepend or a truncation from the end is
/// recognized; any other change, or a length change of more than half the
/// longer array, yields `None`.
pub fn compute_positional_diff(prev: &[Value], next: &[Value]) -> Option<Vec<ArrayOperation>> {
    let (pl, nl) = (prev.len(), next.len());
    if pl == 0 && nl == 0 {
        return Some(Vec::new());
    }
    if pl == 0 || nl == 0 {
        return None;
    }
    if pl.abs_diff(nl) * 2 > pl.max(nl) {
        return None;
    }
    if pl <= nl && all_equal(prev, &next[..pl]) {
        return Some(next[pl..].iter().map(|item| ArrayOperation::Push { item: item.clone() }).collect());
    }
    if pl <= nl && all_equal(prev, &next[nl - pl..]) {
        // Reverse order, so that successive unshifts rebuild the prefix.
        return Some(
            next[..nl - pl]
                .iter()
                .rev()
                .map(|item| ArrayOperation::Unshift { item: item.clone() })
                .collect(),
        );
    }
    if nl <= pl && all_equal(next, &prev[..nl]) {
        return Some((nl..pl).rev().map(|index| ArrayOperation::Remove { index }).collect());
    }
    None
}

// ── Apply ─────────────────────────────────────────────────────────────────

/// Applies `ops` in order to a copy of `current`.
///
/// Out-of-range `remove`, `update` and `move` sources are skipped; `insert`
/// and `move` targets clamp to the array length.
pub fn apply_array_diff(current: &[Value], ops: &[ArrayOperation]) -> Vec<Value> {
    let mut arr = current.to_vec();
    for op in ops {
        match op {
            ArrayOperation::Push { item } => arr.push(item.clone()),
            ArrayOperation::Unshift { item } => arr.insert(0, item.clone()),
            ArrayOperation::Insert { index, item } => {
                let at = (*index).min(arr.len());
                arr.insert(at, item.clone());
            }
            ArrayOperation::Remove { index } => {
                if *index < arr.len() {
                    arr.remove(*index);
                }
            }
            ArrayOperation::Update { index, item } => {
                if let Some(slot) = arr.get_mut(*index) {
                    *slot = item.clone();
                }
            }
            ArrayOperation::Move { from, to } => {
                if *from < arr.len() {
                    let item = arr.remove(*from);
                    let at = (*to).min(arr.len());
                    arr.insert(at, item);
                }
            }
            ArrayOperation::Replace { items } => arr = items.clone(),
        }
    }
    arr
}

// ── Codec ─────────────────────────────────────────────────────────────────

/// Encodes an array change. Full replacement, an empty diff and a lone
/// `replace` all normalize to a value update.
pub fn create_array_update(prev: &[Value], next: &[Value]) -> Update {
    match compute_array_diff(prev, next) {
        Some(ops) if !ops.is_empty() && !matches!(ops.as_slice(), [ArrayOperation::Replace { .. }]) => {
            Update::Array(ops)
        }
        _ => Update::Value(Value::Array(next.to_vec())),
    }
}

/// Reconstructs the next array from a replica and an update. A non-array
/// replica is read as `[]`.
pub fn decode(current: &Value, update: &Update) -> Value {
    match update {
        Update::Array(ops) => {
            let base = current.as_array().map(Vec::as_slice).unwrap_or(&[]);
            Value::Array(apply_array_diff(base, ops))
        }
        other => update::apply_update(current, other),
    }
}

/// The array diff strategy as a [`Codec`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayCodec;

impl Codec for ArrayCodec {
    fn strategy(&self) -> Strategy {
        Strategy::Array
    }

    fn encode(&self, prev: &Value, next: &Value) -> Update {
        match (prev, next) {
            (Value::Array(prev), Value::Array(next)) => create_array_update(prev, next),
            _ => Update::Value(next.clone()),
        }
    }

    fn decode(&self, current: &Value, update: &Update) -> Value {
        decode(current, update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn arr(v: Value) -> Vec<Value> {
        match v {
            Value::Array(items) => items,
            _ => panic!("not an array"),
        }
    }

    fn round_trips(prev: &[Value], next: &[Value]) {
        let ops = compute_array_diff(prev, next).expect("diff expected");
        assert_eq!(apply_array_diff(prev, &ops), next);
    }

    #[test]
    fn id_removal() {
        let prev = arr(json!([{"id": "1"}, {"id": "2"}, {"id": "3"}]));
        let next = arr(json!([{"id": "1"}, {"id": "3"}]));
        let ops = compute_array_diff(&prev, &next).unwrap();
        assert_eq!(ops, vec![ArrayOperation::Remove { index: 1 }]);
        assert_eq!(apply_array_diff(&prev, &ops), next);
    }

    #[test]
    fn id_removals_are_descending() {
        let prev = arr(json!([{"id": "a"}, {"id": "b"}, {"id": "c"}, {"id": "d"}]));
        let next = arr(json!([{"id": "b"}, {"id": "d"}]));
        let ops = compute_array_diff(&prev, &next).unwrap();
        assert_eq!(ops, vec![ArrayOperation::Remove { index: 2 }, ArrayOperation::Remove { index: 0 }]);
        assert_eq!(apply_array_diff(&prev, &ops), next);
    }

    #[test]
    fn id_insert_and_push() {
        let prev = arr(json!([{"id": "b"}]));
        let next = arr(json!([{"id": "a"}, {"id": "b"}, {"id": "c"}]));
        let ops = compute_array_diff(&prev, &next).unwrap();
        assert_eq!(
            ops,
            vec![
                ArrayOperation::Insert { index: 0, item: json!({"id": "a"}) },
                ArrayOperation::Push { item: json!({"id": "c"}) },
            ]
        );
        assert_eq!(apply_array_diff(&prev, &ops), next);
    }

    #[test]
    fn id_update_uses_target_index() {
        let prev = arr(json!([{"id": "x", "v": 1}, {"id": "y", "v": 1}]));
        let next = arr(json!([{"id": "n"}, {"id": "x", "v": 1}, {"id": "y", "v": 2}]));
        let ops = compute_array_diff(&prev, &next).unwrap();
        assert_eq!(
            ops,
            vec![
                ArrayOperation::Insert { index: 0, item: json!({"id": "n"}) },
                ArrayOperation::Update { index: 2, item: json!({"id": "y", "v": 2}) },
            ]
        );
        assert_eq!(apply_array_diff(&prev, &ops), next);
    }

    #[test]
    fn id_reorder_emits_moves() {
        let prev = arr(json!([{"id": "a"}, {"id": "b"}, {"id": "c"}]));
        let next = arr(json!([{"id": "c"}, {"id": "a"}, {"id": "b"}]));
        let ops = compute_array_diff(&prev, &next).unwrap();
        assert_eq!(ops, vec![ArrayOperation::Move { from: 2, to: 0 }]);
        assert_eq!(apply_array_diff(&prev, &ops), next);
    }

    #[test]
    fn id_mixed_changes_round_trip() {
        let prev = arr(json!([
            {"id": "a", "t": "one"}, {"id": "b", "t": "two"}, {"id": "c", "t": "three"}, {"id": "d"}
        ]));
        let next = arr(json!([
            {"id": "d"}, {"id": "e", "t": "new"}, {"id": "b", "t": "TWO"}, {"id": "a", "t": "one"}
        ]));
        round_trips(&prev, &next);
    }

    #[test]
    fn id_from_empty() {
        let next = arr(json!([{"id": "a"}, {"id": "b"}]));
        round_trips(&[], &next);
    }

    #[test]
    fn duplicate_ids_replace() {
        let prev = arr(json!([{"id": "a"}, {"id": "a"}]));
        let next = arr(json!([{"id": "a"}]));
        assert_eq!(compute_array_diff(&prev, &next), None);
    }

    #[test]
    fn mixed_identity_replaces() {
        let prev = arr(json!([{"id": "a"}, 1]));
        let next = arr(json!([{"id": "a"}]));
        assert_eq!(compute_array_diff(&prev, &next), None);
    }

    #[test]
    fn cost_guard_rejects_large_rewrites() {
        let prev = arr(json!([{"id": "1"}, {"id": "2"}, {"id": "3"}, {"id": "4"}, {"id": "5"}, {"id": "6"}]));
        let next = arr(json!([{"id": "7"}, {"id": "8"}, {"id": "9"}, {"id": "10"}, {"id": "11"}, {"id": "12"}]));
        assert_eq!(compute_id_based_diff(&prev, &next), None);
    }

    #[test]
    fn cost_guard_skipped_for_few_ops() {
        // Five operations: kept even though replacement would be smaller.
        let prev = arr(json!([{"id": "1"}, {"id": "2"}, {"id": "3"}, {"id": "4"}, {"id": "5"}]));
        let next = arr(json!([]));
        let ops = compute_id_based_diff(&prev, &next).unwrap();
        assert_eq!(ops.len(), 5);
        assert_eq!(apply_array_diff(&prev, &ops), next);
    }

    #[test]
    fn positional_append() {
        let ops = compute_array_diff(&arr(json!([1, 2, 3])), &arr(json!([1, 2, 3, 4, 5]))).unwrap();
        assert_eq!(
            ops,
            vec![ArrayOperation::Push { item: json!(4) }, ArrayOperation::Push { item: json!(5) }]
        );
        assert_eq!(apply_array_diff(&arr(json!([1, 2, 3])), &ops), arr(json!([1, 2, 3, 4, 5])));
    }

    #[test]
    fn positional_prepend() {
        let prev = arr(json!([3, 4, 5]));
        let next = arr(json!([1, 2, 3, 4, 5]));
        let ops = compute_array_diff(&prev, &next).unwrap();
        assert_eq!(
            ops,
            vec![ArrayOperation::Unshift { item: json!(2) }, ArrayOperation::Unshift { item: json!(1) }]
        );
        assert_eq!(apply_array_diff(&prev, &ops), next);
    }

    #[test]
    fn positional_truncate() {
        let prev = arr(json!(["a", "b", "c", "d"]));
        let next = arr(json!(["a", "b", "c"]));
        let ops = compute_array_diff(&prev, &next).unwrap();
        assert_eq!(ops, vec![ArrayOperation::Remove { index: 3 }]);
        assert_eq!(apply_array_diff(&prev, &ops), next);
    }

    #[test]
    fn positional_equal_is_empty() {
        assert_eq!(compute_array_diff(&arr(json!([1, 2])), &arr(json!([1, 2]))), Some(vec![]));
        assert_eq!(compute_array_diff(&[], &[]), Some(vec![]));
    }

    #[test]
    fn positional_gives_up_on_other_changes() {
        assert_eq!(compute_array_diff(&arr(json!([1, 2, 3])), &arr(json!([1, 9, 3]))), None);
        assert_eq!(compute_array_diff(&arr(json!([1, 2, 3])), &arr(json!([3, 2, 1]))), None);
        assert_eq!(compute_array_diff(&arr(json!([])), &arr(json!([1]))), None);
        assert_eq!(compute_array_diff(&arr(json!([1])), &arr(json!([]))), None);
    }

    #[test]
    fn positional_large_length_change_replaces() {
        // Delta of 3 exceeds half of 5.
        assert_eq!(compute_array_diff(&arr(json!([1, 2])), &arr(json!([1, 2, 3, 4, 5]))), None);
    }

    #[test]
    fn apply_move_and_replace() {
        let current = arr(json!([1, 2, 3]));
        let ops = vec![ArrayOperation::Move { from: 0, to: 2 }];
        assert_eq!(apply_array_diff(&current, &ops), arr(json!([2, 3, 1])));
        let ops = vec![ArrayOperation::Replace { items: arr(json!(["x"])) }];
        assert_eq!(apply_array_diff(&current, &ops), arr(json!(["x"])));
    }

    #[test]
    fn float_form_breaks_positional_prefix() {
        let prev = arr(json!([1, 2, 3]));
        let next = arr(json!([1.0, 2, 3, 4]));
        assert_eq!(compute_array_diff(&prev, &next), None);
        let update = create_array_update(&prev, &next);
        assert_eq!(decode(&json!(prev), &update), json!(next));
    }

    #[test]
    fn float_form_change_updates_identified_element() {
        let prev = arr(json!([{"id": "a", "w": 1}, {"id": "b", "w": 2}]));
        let next = arr(json!([{"id": "a", "w": 1.0}, {"id": "b", "w": 2}]));
        let ops = compute_array_diff(&prev, &next).unwrap();
        assert_eq!(ops, vec![ArrayOperation::Update { index: 0, item: json!({"id": "a", "w": 1.0}) }]);
        round_trips(&prev, &next);
    }

    #[test]
    fn apply_skips_out_of_range() {
        let current = arr(json!([1]));
        let ops = vec![
            ArrayOperation::Remove { index: 5 },
            ArrayOperation::Update { index: 5, item: json!(0) },
            ArrayOperation::Move { from: 5, to: 0 },
            ArrayOperation::Insert { index: 9, item: json!(2) },
        ];
        assert_eq!(apply_array_diff(&current, &ops), arr(json!([1, 2])));
    }

    #[test]
    fn create_update_normalizes_to_value() {
        let prev = arr(json!([1, 2, 3]));
        assert_eq!(create_array_update(&prev, &prev), Update::Value(json!([1, 2, 3])));
        assert_eq!(create_array_update(&prev, &arr(json!([9]))), Update::Value(json!([9])));
        assert_eq!(
            create_array_update(&prev, &arr(json!([1, 2, 3, 4]))),
            Update::Array(vec![ArrayOperation::Push { item: json!(4) }])
        );
    }

    #[test]
    fn decode_on_non_array_replica_starts_empty() {
        let update = Update::Array(vec![ArrayOperation::Push { item: json!(1) }]);
        assert_eq!(decode(&json!({"a": 1}), &update), json!([1]));
    }
}
