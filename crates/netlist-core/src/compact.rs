//! Id compaction and reference rewriting.
//!
//! A compaction pass has two halves. [`compress_ids`] looks at an id table
//! whose dropped entries hold the invalid id and builds an old-to-new map
//! that numbers the survivors `0..K` in their original order. Every other
//! routine here *applies* such a map: to value tables keyed by the id
//! ([`clean_and_reorder_values`], [`clean_and_reorder_ids`]) and to lists of
//! references that store the id ([`update_all_refs`], [`update_valid_refs`]).
//! Reusing one map across all of them keeps cross-table references
//! consistent after a batch of deletions.
//!
//! Looking up an id the map does not cover (including the invalid id itself)
//! yields the invalid id. Absence of a mapping is never an error.

use std::collections::BTreeSet;

use crate::id::{StrongId, Validity};
use crate::id_map::IdMap;

/// New id for `old`, or the invalid id when `old` is invalid or unmapped.
#[inline]
fn remap<K: StrongId>(id_map: &IdMap<K, K>, old: K) -> K {
    id_map.get(old).copied().unwrap_or(K::INVALID)
}

/// Returns true if every stored id equals its own position, i.e. the table
/// is already densely packed and compaction would be a no-op.
pub fn are_contiguous<K: StrongId>(values: &IdMap<K, K>) -> bool {
    values.iter().all(|(pos, &val)| val == pos)
}

/// Returns true if every element is valid.
///
/// Accepts any iterable of ids or id references: an `IdMap`, a slice, or an
/// arbitrary iterator range.
pub fn all_valid<I>(values: I) -> bool
where
    I: IntoIterator,
    I::Item: Validity,
{
    values.into_iter().all(|v| v.is_valid())
}

/// Build an old-to-new map from an id table.
///
/// Valid entries receive sequential new ids starting at 0, in ascending
/// old-id order; invalid entries map to the invalid id. The result has the
/// same length as `ids`.
///
/// # Examples
///
/// ```
/// use netlist_core::compact::compress_ids;
/// use netlist_core::id::BlockId;
/// use netlist_core::id_map::IdMap;
///
/// let ids = IdMap::<BlockId, BlockId>::from_vec(vec![
///     BlockId::new(0),
///     BlockId::INVALID,
///     BlockId::new(2),
///     BlockId::new(3),
/// ]);
/// let id_map = compress_ids(&ids);
/// assert_eq!(
///     id_map.as_slice(),
///     &[BlockId::new(0), BlockId::INVALID, BlockId::new(1), BlockId::new(2)]
/// );
/// ```
pub fn compress_ids<K: StrongId>(ids: &IdMap<K, K>) -> IdMap<K, K> {
    let mut id_map = IdMap::with_len(ids.len());
    let mut next = 0usize;
    for &id in ids.values() {
        if id.is_valid() {
            id_map.insert(id, K::from_index(next));
            next += 1;
        }
    }
    id_map
}

/// Drop and reorder `values` according to `id_map`.
///
/// Entry `old` of `values` is moved to position `id_map[old]` when that is a
/// valid id and dropped otherwise. Survivors keep their relative order for
/// maps built by [`compress_ids`].
///
/// Panics if `values` and `id_map` differ in length.
pub fn clean_and_reorder_values<K, V>(values: IdMap<K, V>, id_map: &IdMap<K, K>) -> IdMap<K, V>
where
    K: StrongId,
    V: Default,
{
    assert_eq!(
        values.len(),
        id_map.len(),
        "values and id_map must cover the same id range"
    );

    let mut result = IdMap::new();
    for (old_id, value) in values.into_iter_keyed() {
        let new_id = id_map[old_id];
        if new_id.is_valid() {
            result.insert(new_id, value);
        }
    }
    result
}

/// The id table that corresponds to `id_map` after compaction: one entry
/// per valid new id, keyed and valued by that new id.
pub fn clean_and_reorder_ids<K: StrongId>(id_map: &IdMap<K, K>) -> IdMap<K, K> {
    let mut result = IdMap::new();
    for &new_id in id_map.values() {
        if new_id.is_valid() {
            result.insert(new_id, new_id);
        }
    }
    result
}

/// Count how many ids in `range` have a valid new id in `id_map`.
pub fn count_valid_refs<K, R>(range: R, id_map: &IdMap<K, K>) -> usize
where
    K: StrongId,
    R: IntoIterator<Item = K>,
{
    range
        .into_iter()
        .filter(|&old| remap(id_map, old).is_valid())
        .count()
}

/// Rewrite every id in `values` through `id_map`, valid or not.
///
/// The output has exactly the input's length; an id without a valid mapping
/// becomes the invalid id in place.
pub fn update_all_refs<K, C>(values: &C, id_map: &IdMap<K, K>) -> C
where
    K: StrongId,
    C: FromIterator<K>,
    for<'a> &'a C: IntoIterator<Item = &'a K>,
{
    values.into_iter().map(|&old| remap(id_map, old)).collect()
}

/// Rewrite the ids in `values` through `id_map`, dropping dead references.
///
/// For every position, a valid id is rewritten and kept only if its new id
/// is valid. An invalid id is dropped, unless its position is listed in
/// `preserved_indices`, in which case it is kept verbatim so fixed-position
/// slots (such as a net's driver slot) survive compaction. Survivors keep
/// their relative order.
pub fn update_valid_refs<K, C>(
    values: &C,
    id_map: &IdMap<K, K>,
    preserved_indices: &BTreeSet<usize>,
) -> C
where
    K: StrongId,
    C: FromIterator<K>,
    for<'a> &'a C: IntoIterator<Item = &'a K>,
{
    values
        .into_iter()
        .enumerate()
        .filter_map(|(idx, &old)| {
            if !old.is_valid() {
                return preserved_indices.contains(&idx).then_some(old);
            }
            let new = remap(id_map, old);
            new.is_valid().then_some(new)
        })
        .collect()
}
