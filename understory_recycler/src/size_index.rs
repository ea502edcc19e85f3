// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sparse per-item sizes with cumulative-offset queries.
//!
//! [`SizeIndex`] only stores items whose size differs from a shared default.
//! Each stored entry also caches the cumulative size of every item up to and
//! including it, so the cumulative size of *any* item can be inferred from
//! the nearest stored neighbor with one binary search.
//!
//! ## Coordinates
//!
//! Keys are *view indices*: positions in the (possibly rotated) layout
//! order. Without looping, view index and item index are the same. With
//! looping, [`SizeIndex::rotate`] changes which item sits at view index 0,
//! see [`SizeIndex::real_index_of_view`].
//!
//! The cumulative size of view index `i` is the sum of the sizes of items
//! `0..=i` plus `i` spacings. The start of item `i` relative to the content
//! start (padding excluded) is therefore `cumulative(i) - size(i)`.
//!
//! ## Batched mutation
//!
//! Sizes are written in sessions that must touch strictly consecutive
//! ascending keys:
//!
//! ```rust
//! use understory_recycler::SizeIndex;
//!
//! let mut index = SizeIndex::new(50.0, 0.0).unwrap();
//! index.reset(10).unwrap();
//! index.begin_batch_resize(2).unwrap();
//! index.set_batch_size(2, 80.0).unwrap();
//! index.set_batch_size(3, 20.0).unwrap();
//! index.end_batch_resize().unwrap();
//!
//! assert_eq!(index.item_at(2).unwrap(), 80.0);
//! // +30 and -30 cancel out.
//! assert_eq!(index.cumulative_up_to(9).unwrap(), 500.0);
//! ```

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::RecyclerError;
use crate::error::non_negative;

/// Stored size and cumulative size of one custom-sized item.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeEntry {
    /// Size of the item.
    pub size: f64,
    /// Sum of sizes and spacings from view index 0 up to and including this item.
    pub cumulative: f64,
}

/// How [`SizeIndex::reinitialize`] changes the item count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReinitMode {
    /// Drop every custom size and set the count.
    Reset,
    /// Insert default-sized items, shifting later keys up.
    Insert,
    /// Remove items, dropping their keys and shifting later keys down.
    Remove,
}

#[derive(Clone, Copy, Debug)]
struct BatchSession {
    first: usize,
    next: usize,
}

/// Sparse map from view index to size with O(log k) cumulative queries.
#[derive(Clone, Debug)]
pub struct SizeIndex {
    default_size: f64,
    spacing: f64,
    count: usize,
    /// Sorted keys of `entries`.
    keys: Vec<usize>,
    entries: HashMap<usize, SizeEntry>,
    batch: Option<BatchSession>,
    real_index_of_first_item_in_view: usize,
}

impl SizeIndex {
    /// Creates an empty index.
    ///
    /// `default_size` must be positive and finite, `spacing` finite and
    /// non-negative.
    pub fn new(default_size: f64, spacing: f64) -> Result<Self, RecyclerError> {
        validate_default_size(default_size)?;
        let spacing = non_negative("spacing", spacing)?;
        Ok(Self {
            default_size,
            spacing,
            count: 0,
            keys: Vec::new(),
            entries: HashMap::new(),
            batch: None,
            real_index_of_first_item_in_view: 0,
        })
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Size of every item without a custom entry.
    #[must_use]
    pub fn default_size(&self) -> f64 {
        self.default_size
    }

    /// Gap between consecutive items.
    #[must_use]
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Number of stored custom sizes.
    #[must_use]
    pub fn custom_len(&self) -> usize {
        self.keys.len()
    }

    /// Iterates the stored entries in key order.
    pub fn custom_entries(&self) -> impl Iterator<Item = (usize, SizeEntry)> + '_ {
        self.keys
            .iter()
            .filter_map(|k| self.entries.get(k).map(|e| (*k, *e)))
    }

    /// Returns `true` while a batch resize session is open.
    #[must_use]
    pub fn is_batch_active(&self) -> bool {
        self.batch.is_some()
    }

    /// Item index currently laid out at view index 0.
    ///
    /// Always 0 unless the index was rotated.
    #[must_use]
    pub fn real_index_of_first_item_in_view(&self) -> usize {
        self.real_index_of_first_item_in_view
    }

    /// Converts a view index into an item index.
    pub fn real_index_of_view(&self, view_index: usize) -> Result<usize, RecyclerError> {
        self.check_index(view_index)?;
        Ok((view_index + self.real_index_of_first_item_in_view) % self.count)
    }

    /// Converts an item index into its current view index.
    pub fn view_index_of_real(&self, real_index: usize) -> Result<usize, RecyclerError> {
        self.check_index(real_index)?;
        Ok((real_index + self.count - self.real_index_of_first_item_in_view) % self.count)
    }

    /// Size of the item at `view_index`.
    pub fn item_at(&self, view_index: usize) -> Result<f64, RecyclerError> {
        self.check_index(view_index)?;
        Ok(self.size_unchecked(view_index))
    }

    /// Cumulative size up to and including `view_index`.
    ///
    /// Equivalent to [`SizeIndex::cumulative_up_to_with`] with inference from
    /// the next stored key allowed.
    pub fn cumulative_up_to(&self, view_index: usize) -> Result<f64, RecyclerError> {
        self.cumulative_up_to_with(view_index, true)
    }

    /// Cumulative size up to and including `view_index`.
    ///
    /// Stored keys answer directly. Otherwise the value is extrapolated with
    /// the default size from whichever stored neighbor is closer; a tie picks
    /// the next neighbor when `allow_infer_from_next_key` is set.
    pub fn cumulative_up_to_with(
        &self,
        view_index: usize,
        allow_infer_from_next_key: bool,
    ) -> Result<f64, RecyclerError> {
        self.check_index(view_index)?;
        self.cumulative_unchecked(view_index, allow_infer_from_next_key)
    }

    /// Offset of the start of `view_index` from the start of the first item.
    pub fn start_of(&self, view_index: usize) -> Result<f64, RecyclerError> {
        Ok(self.cumulative_up_to(view_index)? - self.item_at(view_index)?)
    }

    /// Sum of all sizes and spacings.
    pub fn total_size(&self) -> Result<f64, RecyclerError> {
        if self.count == 0 {
            return Ok(0.0);
        }
        self.cumulative_unchecked(self.count - 1, true)
    }

    /// Returns the view index whose slot (item plus trailing spacing) contains
    /// `offset`, measured from the start of the first item.
    ///
    /// Offsets before the first item map to 0 and offsets past the last item
    /// map to the last index. Returns `None` when the index is empty.
    pub fn index_at_offset(&self, offset: f64) -> Result<Option<usize>, RecyclerError> {
        if !offset.is_finite() {
            return Err(RecyclerError::InvalidArgument {
                what: "offset",
                value: offset,
            });
        }
        if self.count == 0 {
            return Ok(None);
        }
        let (mut lo, mut hi) = (0, self.count - 1);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.cumulative_unchecked(mid, true)? + self.spacing > offset {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        Ok(Some(lo))
    }

    /// Opens a batch resize session starting at `first_view_index`.
    pub fn begin_batch_resize(&mut self, first_view_index: usize) -> Result<(), RecyclerError> {
        if self.batch.is_some() {
            return Err(RecyclerError::BatchSessionActive);
        }
        self.check_index(first_view_index)?;
        self.batch = Some(BatchSession {
            first: first_view_index,
            next: first_view_index,
        });
        Ok(())
    }

    /// Sets the size of `view_index` inside the open batch session.
    ///
    /// The first call must use the session's first index and each later call
    /// the index right after the previous one.
    pub fn set_batch_size(&mut self, view_index: usize, size: f64) -> Result<(), RecyclerError> {
        let Some(session) = self.batch else {
            return Err(RecyclerError::NoBatchSession);
        };
        if view_index != session.next {
            return Err(RecyclerError::NonConsecutiveResize {
                expected: session.next,
                got: view_index,
            });
        }
        self.check_index(view_index)?;
        let size = non_negative("size", size)?;

        // Keys before `view_index` are either untouched or rewritten earlier
        // in this session, so inferring from the previous key is exact.
        let cumulative = if view_index == 0 {
            size
        } else {
            self.cumulative_unchecked(view_index - 1, false)? + self.spacing + size
        };

        if size == self.default_size {
            self.remove_key(view_index);
        } else if let Some(entry) = self.entries.get_mut(&view_index) {
            *entry = SizeEntry { size, cumulative };
        } else {
            let pos = self.keys.partition_point(|&k| k < view_index);
            self.keys.insert(pos, view_index);
            self.entries
                .insert(view_index, SizeEntry { size, cumulative });
        }

        self.batch = Some(BatchSession {
            next: view_index + 1,
            ..session
        });
        Ok(())
    }

    /// Closes the batch session and fixes the cumulative sizes of every key
    /// after the last one written, in one forward pass.
    pub fn end_batch_resize(&mut self) -> Result<(), RecyclerError> {
        let Some(session) = self.batch.take() else {
            return Err(RecyclerError::NoBatchSession);
        };
        if session.next > session.first {
            let last = session.next - 1;
            let cumulative = self.cumulative_unchecked(last, false)?;
            let pos = self.keys.partition_point(|&k| k <= last);
            self.recompute_from(pos, Some((last, cumulative)))?;
        }
        self.check_consistency()
    }

    /// Sets a single item's size in a one-key batch session.
    pub fn set_item_size(&mut self, view_index: usize, size: f64) -> Result<(), RecyclerError> {
        self.begin_batch_resize(view_index)?;
        let written = self.set_batch_size(view_index, size);
        let ended = self.end_batch_resize();
        written.and(ended)
    }

    /// Drops every custom size and sets the count. Shorthand for
    /// [`ReinitMode::Reset`] without a new default size.
    pub fn reset(&mut self, count: usize) -> Result<(), RecyclerError> {
        self.reinitialize(ReinitMode::Reset, count, 0, None)
    }

    /// Changes the item count.
    ///
    /// - [`ReinitMode::Reset`] clears all entries and sets the count to
    ///   `count`; `at` is ignored. Only a reset may change the default size.
    /// - [`ReinitMode::Insert`] adds `count` default-sized items at `at`.
    /// - [`ReinitMode::Remove`] removes items `at..at + count`.
    pub fn reinitialize(
        &mut self,
        mode: ReinitMode,
        count: usize,
        at: usize,
        new_default_size: Option<f64>,
    ) -> Result<(), RecyclerError> {
        if self.batch.is_some() {
            return Err(RecyclerError::BatchSessionActive);
        }
        if let Some(size) = new_default_size {
            if mode != ReinitMode::Reset {
                return Err(RecyclerError::DefaultSizeWithoutReset);
            }
            validate_default_size(size)?;
        }
        match mode {
            ReinitMode::Reset => {
                self.keys.clear();
                self.entries.clear();
                self.count = count;
                self.real_index_of_first_item_in_view = 0;
                if let Some(size) = new_default_size {
                    self.default_size = size;
                }
            }
            ReinitMode::Insert => {
                if at > self.count {
                    return Err(RecyclerError::RangeOutOfBounds {
                        start: at,
                        end: at,
                        count: self.count,
                    });
                }
                if count == 0 {
                    return Ok(());
                }
                let added = count as f64 * (self.default_size + self.spacing);
                let pos = self.keys.partition_point(|&k| k < at);
                self.shift_keys(pos, |k| Some(k + count), added)?;
                self.count += count;
            }
            ReinitMode::Remove => {
                let end = at.checked_add(count).filter(|&end| end <= self.count);
                let Some(end) = end else {
                    return Err(RecyclerError::RangeOutOfBounds {
                        start: at,
                        end: at.saturating_add(count),
                        count: self.count,
                    });
                };
                if count == 0 {
                    return Ok(());
                }
                let before = if at == 0 {
                    -self.spacing
                } else {
                    self.cumulative_unchecked(at - 1, true)?
                };
                let removed = self.cumulative_unchecked(end - 1, true)? - before;
                let pos = self.keys.partition_point(|&k| k < at);
                self.shift_keys(
                    pos,
                    |k| if k < end { None } else { Some(k - count) },
                    -removed,
                )?;
                self.count -= count;
            }
        }
        self.check_consistency()
    }

    /// Rotates the index so that item `new_first_view_index_as_real_index`
    /// is laid out at view index 0.
    ///
    /// Every key `k` moves to `(k + old_first - new_first) mod len` and all
    /// cumulative sizes are recomputed.
    pub fn rotate(&mut self, new_first_view_index_as_real_index: usize) -> Result<(), RecyclerError> {
        if self.batch.is_some() {
            return Err(RecyclerError::BatchSessionActive);
        }
        self.check_index(new_first_view_index_as_real_index)?;
        let n = self.count;
        let old = self.real_index_of_first_item_in_view;
        let new = new_first_view_index_as_real_index;
        if old == new {
            return Ok(());
        }
        // `(k + old - new) mod n`, kept in unsigned arithmetic.
        let shift = (old + n - new) % n;
        let mut moved = HashMap::with_capacity(self.entries.len());
        for (k, entry) in self.entries.drain() {
            moved.insert((k + shift) % n, entry);
        }
        self.entries = moved;
        for k in &mut self.keys {
            *k = (*k + shift) % n;
        }
        self.keys.sort_unstable();
        self.real_index_of_first_item_in_view = new;
        self.recompute_from(0, None)?;
        self.check_consistency()
    }

    /// Rotates by a signed number of items. Positive amounts move the item
    /// at view index 0 to the end.
    ///
    /// Rotating by `0` or by any multiple of the length is a no-op.
    pub fn rotate_by(&mut self, amount: isize) -> Result<(), RecyclerError> {
        if self.count == 0 {
            return Ok(());
        }
        let n = self.count;
        let turn = if amount >= 0 {
            amount.unsigned_abs() % n
        } else {
            n - amount.unsigned_abs() % n
        };
        self.rotate((self.real_index_of_first_item_in_view + turn) % n)
    }

    /// Verifies that the key list and the entry map agree.
    pub fn check_consistency(&self) -> Result<(), RecyclerError> {
        if self.keys.len() != self.entries.len() {
            return Err(RecyclerError::CorruptedIndex {
                keys: self.keys.len(),
                entries: self.entries.len(),
            });
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), RecyclerError> {
        if index < self.count {
            Ok(())
        } else {
            Err(RecyclerError::IndexOutOfRange {
                index,
                count: self.count,
            })
        }
    }

    fn size_unchecked(&self, view_index: usize) -> f64 {
        self.entries
            .get(&view_index)
            .map_or(self.default_size, |e| e.size)
    }

    fn entry(&self, key: usize) -> Result<SizeEntry, RecyclerError> {
        self.entries
            .get(&key)
            .copied()
            .ok_or(RecyclerError::CorruptedIndex {
                keys: self.keys.len(),
                entries: self.entries.len(),
            })
    }

    fn cumulative_unchecked(&self, view_index: usize, allow_next: bool) -> Result<f64, RecyclerError> {
        if let Some(entry) = self.entries.get(&view_index) {
            return Ok(entry.cumulative);
        }
        let step = self.default_size + self.spacing;
        let pos = self.keys.partition_point(|&k| k < view_index);

        // A virtual key at -1 with cumulative `-spacing` stands in for a
        // missing previous neighbor.
        let (prev_distance, prev_cumulative) = if pos > 0 {
            let key = self.keys[pos - 1];
            (view_index - key, self.entry(key)?.cumulative)
        } else {
            (view_index + 1, -self.spacing)
        };

        if allow_next && pos < self.keys.len() {
            let key = self.keys[pos];
            let next_distance = key - view_index;
            if next_distance <= prev_distance {
                let next = self.entry(key)?;
                return Ok(next.cumulative
                    - next.size
                    - next_distance as f64 * self.spacing
                    - (next_distance - 1) as f64 * self.default_size);
            }
        }
        Ok(prev_cumulative + prev_distance as f64 * step)
    }

    /// Recomputes cumulative sizes of `keys[pos..]`, walking forward from
    /// `prev` (a known key and its cumulative size) or from the start.
    fn recompute_from(
        &mut self,
        pos: usize,
        prev: Option<(usize, f64)>,
    ) -> Result<(), RecyclerError> {
        let step = self.default_size + self.spacing;
        // Number of default items between the previous key and the current one
        // is `k - prev - 1`; the virtual key sits at -1.
        let (mut prev_end, mut prev_cumulative) = match prev {
            Some((key, cumulative)) => (key + 1, cumulative),
            None => (0, -self.spacing),
        };
        for &key in &self.keys[pos..] {
            let entry = self
                .entries
                .get_mut(&key)
                .ok_or(RecyclerError::CorruptedIndex {
                    keys: self.keys.len(),
                    entries: 0,
                })?;
            let cumulative =
                prev_cumulative + (key - prev_end) as f64 * step + self.spacing + entry.size;
            entry.cumulative = cumulative;
            prev_end = key + 1;
            prev_cumulative = cumulative;
        }
        Ok(())
    }

    /// Moves every key in `keys[pos..]` through `map` (dropping keys mapped
    /// to `None`) and adds `delta` to the cumulative size of kept keys.
    fn shift_keys(
        &mut self,
        pos: usize,
        map: impl Fn(usize) -> Option<usize>,
        delta: f64,
    ) -> Result<(), RecyclerError> {
        let tail = self.keys.split_off(pos);
        let mut moved = Vec::with_capacity(tail.len());
        for key in tail {
            let entry = self
                .entries
                .remove(&key)
                .ok_or(RecyclerError::CorruptedIndex {
                    keys: self.keys.len(),
                    entries: self.entries.len(),
                })?;
            if let Some(new_key) = map(key) {
                moved.push((new_key, entry));
            }
        }
        for (key, entry) in moved {
            self.keys.push(key);
            self.entries.insert(
                key,
                SizeEntry {
                    size: entry.size,
                    cumulative: entry.cumulative + delta,
                },
            );
        }
        Ok(())
    }

    fn remove_key(&mut self, key: usize) {
        if self.entries.remove(&key).is_some() {
            if let Ok(pos) = self.keys.binary_search(&key) {
                self.keys.remove(pos);
            }
        }
    }
}

fn validate_default_size(size: f64) -> Result<(), RecyclerError> {
    if size.is_finite() && size > 0.0 {
        Ok(())
    } else {
        Err(RecyclerError::InvalidDefaultSize(size))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::{ReinitMode, SizeIndex};
    use crate::{ErrorKind, RecyclerError};

    fn index(default: f64, spacing: f64, count: usize) -> SizeIndex {
        let mut index = SizeIndex::new(default, spacing).unwrap();
        index.reset(count).unwrap();
        index
    }

    fn cumulatives(index: &SizeIndex) -> Vec<f64> {
        (0..index.len())
            .map(|i| index.cumulative_up_to(i).unwrap())
            .collect()
    }

    /// Reference cumulative sizes computed by brute force.
    fn brute_force(index: &SizeIndex) -> Vec<f64> {
        let mut acc = -index.spacing();
        (0..index.len())
            .map(|i| {
                acc += index.spacing() + index.item_at(i).unwrap();
                acc
            })
            .collect()
    }

    #[test]
    fn default_only_cumulative() {
        let index = index(50.0, 0.0, 10);
        assert_eq!(index.cumulative_up_to(9).unwrap(), 500.0);
        assert_eq!(index.cumulative_up_to(0).unwrap(), 50.0);

        let spaced = self::index(50.0, 4.0, 10);
        assert_eq!(spaced.cumulative_up_to(9).unwrap(), 500.0 + 9.0 * 4.0);
        assert_eq!(spaced.start_of(1).unwrap(), 54.0);
    }

    #[test]
    fn batch_writes_round_trip_and_reset_restores_default() {
        let mut index = index(50.0, 2.0, 10);
        index.begin_batch_resize(3).unwrap();
        index.set_batch_size(3, 70.0).unwrap();
        index.set_batch_size(4, 10.0).unwrap();
        index.set_batch_size(5, 50.0).unwrap();
        index.end_batch_resize().unwrap();

        assert_eq!(index.item_at(3).unwrap(), 70.0);
        assert_eq!(index.item_at(4).unwrap(), 10.0);
        // Writing the default size stores nothing.
        assert_eq!(index.custom_len(), 2);
        assert_eq!(cumulatives(&index), brute_force(&index));

        index.reset(10).unwrap();
        assert_eq!(index.item_at(3).unwrap(), 50.0);
        assert_eq!(index.custom_len(), 0);
    }

    #[test]
    fn later_keys_are_fixed_up_when_session_ends() {
        let mut index = index(10.0, 1.0, 20);
        index.set_item_size(15, 30.0).unwrap();
        index.set_item_size(18, 5.0).unwrap();
        index.set_item_size(2, 40.0).unwrap();
        assert_eq!(cumulatives(&index), brute_force(&index));
    }

    #[test]
    fn cumulative_is_monotonic() {
        let mut index = index(10.0, 3.0, 50);
        for (i, size) in [(0, 0.0), (7, 25.0), (8, 1.0), (30, 0.0), (49, 90.0)] {
            index.set_item_size(i, size).unwrap();
        }
        let values = cumulatives(&index);
        assert!(
            values.windows(2).all(|w| w[0] <= w[1]),
            "cumulative sizes must not decrease: {values:?}"
        );
        assert_eq!(values, brute_force(&index));
    }

    #[test]
    fn inference_prefers_nearer_neighbor() {
        let mut index = index(10.0, 0.0, 100);
        index.set_item_size(90, 20.0).unwrap();
        // Near the stored key the next neighbor is used; both paths agree.
        assert_eq!(index.cumulative_up_to_with(89, true).unwrap(), 900.0);
        assert_eq!(index.cumulative_up_to_with(89, false).unwrap(), 900.0);
        assert_eq!(index.cumulative_up_to(90).unwrap(), 920.0);
        assert_eq!(index.cumulative_up_to(99).unwrap(), 1010.0);
    }

    #[test]
    fn non_consecutive_batch_keys_are_rejected() {
        let mut index = index(10.0, 0.0, 10);
        index.begin_batch_resize(2).unwrap();
        index.set_batch_size(2, 5.0).unwrap();
        assert_eq!(
            index.set_batch_size(4, 5.0),
            Err(RecyclerError::NonConsecutiveResize {
                expected: 3,
                got: 4
            })
        );
        assert_eq!(
            index.begin_batch_resize(0),
            Err(RecyclerError::BatchSessionActive)
        );
        index.end_batch_resize().unwrap();
        assert_eq!(index.end_batch_resize(), Err(RecyclerError::NoBatchSession));
        assert_eq!(
            index.set_batch_size(0, 1.0),
            Err(RecyclerError::NoBatchSession)
        );
    }

    #[test]
    fn out_of_range_arguments_are_errors() {
        let mut index = index(10.0, 0.0, 3);
        assert_eq!(
            index.item_at(3),
            Err(RecyclerError::IndexOutOfRange { index: 3, count: 3 })
        );
        assert!(index.cumulative_up_to(7).is_err());
        assert!(index.reinitialize(ReinitMode::Insert, 1, 4, None).is_err());
        assert!(index.reinitialize(ReinitMode::Remove, 2, 2, None).is_err());
        assert!(index.set_item_size(1, -1.0).is_err());
        assert_eq!(
            index.reinitialize(ReinitMode::Insert, 1, 0, Some(3.0)),
            Err(RecyclerError::DefaultSizeWithoutReset)
        );
        let err = index
            .reinitialize(ReinitMode::Reset, 1, 0, Some(0.0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn insert_moves_custom_sizes() {
        let mut index = index(50.0, 0.0, 10);
        index.set_item_size(5, 80.0).unwrap();
        index.reinitialize(ReinitMode::Insert, 3, 2, None).unwrap();

        assert_eq!(index.len(), 13);
        assert_eq!(index.item_at(8).unwrap(), 80.0);
        assert_eq!(index.item_at(5).unwrap(), 50.0);
        assert_eq!(cumulatives(&index), brute_force(&index));
    }

    #[test]
    fn insert_then_remove_restores_outside_offsets() {
        let mut index = index(20.0, 2.0, 12);
        index.set_item_size(1, 7.0).unwrap();
        index.set_item_size(6, 33.0).unwrap();
        index.set_item_size(11, 1.0).unwrap();
        let before = cumulatives(&index);

        index.reinitialize(ReinitMode::Insert, 4, 5, None).unwrap();
        index.set_item_size(6, 99.0).unwrap();
        index.reinitialize(ReinitMode::Remove, 4, 5, None).unwrap();

        assert_eq!(cumulatives(&index), before);
    }

    #[test]
    fn remove_drops_keys_in_range() {
        let mut index = index(10.0, 0.0, 10);
        index.set_item_size(3, 30.0).unwrap();
        index.set_item_size(8, 5.0).unwrap();
        index.reinitialize(ReinitMode::Remove, 3, 2, None).unwrap();

        assert_eq!(index.len(), 7);
        assert_eq!(index.custom_len(), 1);
        assert_eq!(index.item_at(6).unwrap(), 5.0);
        assert_eq!(cumulatives(&index), brute_force(&index));

        index.reinitialize(ReinitMode::Remove, 7, 0, None).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.custom_len(), 0);
    }

    #[test]
    fn rotation_is_idempotent_for_zero_and_full_turns() {
        let mut index = index(10.0, 1.0, 6);
        index.set_item_size(0, 40.0).unwrap();
        index.set_item_size(4, 2.0).unwrap();
        let before = cumulatives(&index);

        index.rotate_by(0).unwrap();
        assert_eq!(cumulatives(&index), before);
        index.rotate_by(6).unwrap();
        assert_eq!(cumulatives(&index), before);
        assert_eq!(index.real_index_of_first_item_in_view(), 0);
    }

    #[test]
    fn rotation_relabels_keys() {
        let mut index = index(10.0, 0.0, 5);
        index.set_item_size(0, 40.0).unwrap();

        index.rotate_by(1).unwrap();
        assert_eq!(index.real_index_of_first_item_in_view(), 1);
        // Item 0 is now laid out last.
        assert_eq!(index.item_at(4).unwrap(), 40.0);
        assert_eq!(index.view_index_of_real(0).unwrap(), 4);
        assert_eq!(index.real_index_of_view(0).unwrap(), 1);
        assert_eq!(cumulatives(&index), brute_force(&index));

        index.rotate_by(-1).unwrap();
        assert_eq!(index.item_at(0).unwrap(), 40.0);
        assert_eq!(index.real_index_of_first_item_in_view(), 0);
    }

    #[test]
    fn index_at_offset_finds_slots() {
        let mut index = index(10.0, 2.0, 5);
        index.set_item_size(2, 30.0).unwrap();
        // Slots: [0,12) [12,24) [24,56) [56,68) [68,80)
        assert_eq!(index.index_at_offset(-5.0).unwrap(), Some(0));
        assert_eq!(index.index_at_offset(11.0).unwrap(), Some(0));
        assert_eq!(index.index_at_offset(12.0).unwrap(), Some(1));
        assert_eq!(index.index_at_offset(40.0).unwrap(), Some(2));
        assert_eq!(index.index_at_offset(500.0).unwrap(), Some(4));

        let empty = SizeIndex::new(10.0, 0.0).unwrap();
        assert_eq!(empty.index_at_offset(0.0).unwrap(), None);
    }

    #[test]
    fn consistency_check_passes_after_mutations() {
        let mut index = index(10.0, 0.0, 8);
        index.set_item_size(2, 3.0).unwrap();
        index.rotate(5).unwrap();
        index.reinitialize(ReinitMode::Insert, 2, 0, None).unwrap();
        assert!(index.check_consistency().is_ok());
    }

    #[test]
    fn key_without_entry_is_an_invariant_violation() {
        let mut index = index(10.0, 0.0, 8);
        index.set_item_size(2, 3.0).unwrap();
        index.keys.push(4);

        let corrupted = RecyclerError::CorruptedIndex {
            keys: 2,
            entries: 1,
        };
        assert_eq!(index.check_consistency(), Err(corrupted.clone()));
        // Inference through the stray key cannot find its entry.
        let err = index.cumulative_up_to(5).unwrap_err();
        assert_eq!(err, corrupted);
        assert_eq!(err.kind(), ErrorKind::Invariant);
    }
}
