#![forbid(unsafe_code)]

//! Coordinate key → stack of series contributions.
//!
//! # Invariants
//!
//! 1. A key is present iff at least one active series produces a pair there.
//! 2. Stack order is ascending series id; within one series, pair order.
//! 3. Repeated visits are kept: a series passing a cell twice leaves two
//!    entries. Renderers read the top (last) entry.
//! 4. The index is always built whole from `(dataset, selection, palette)`;
//!    it is never patched.

use rustc_hash::FxHashMap;
use serde::Serialize;

#[cfg(feature = "tracing")]
use crate::logging::debug;
#[cfg(not(feature = "tracing"))]
use crate::debug;

use crate::coords::{AxisRange, CoordKey, to_key};
use crate::dataset::{CycleDataset, SeriesId};
use crate::pairs::CircularPairs;
use crate::palette::{Palette, Rgb};
use crate::selection::Selection;

/// One series' contribution to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellEntry {
    pub series: SeriesId,
    pub color: Rgb,
}

/// Mapping from coordinate key to its ordered contribution stack.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellIndex {
    cells: FxHashMap<CoordKey, Vec<CellEntry>>,
    entries: usize,
}

impl CellIndex {
    /// Build the index for every active series of `dataset`.
    pub fn build(dataset: &CycleDataset, selection: &Selection, palette: &Palette) -> Self {
        let mut cells: FxHashMap<CoordKey, Vec<CellEntry>> = FxHashMap::default();
        let mut entries = 0usize;

        for id in dataset.series_ids() {
            if !selection.is_active(id) {
                continue;
            }
            let Some(seq) = dataset.series(id) else {
                continue;
            };
            let color = palette.color(id);
            for (x, y) in CircularPairs::new(seq) {
                cells
                    .entry(to_key(x, y))
                    .or_default()
                    .push(CellEntry { series: id, color });
                entries += 1;
            }
        }

        debug!(
            keys = cells.len(),
            entries,
            active = selection.active_count(),
            "cell index built"
        );
        Self { cells, entries }
    }

    /// Number of distinct keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Total stack entries across all keys.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    #[inline]
    pub fn contains(&self, key: CoordKey) -> bool {
        self.cells.contains_key(&key)
    }

    /// The stack at `key`, bottom first. Empty when no series touches it.
    #[inline]
    pub fn stack(&self, key: CoordKey) -> &[CellEntry] {
        self.cells.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The entry that determines the rendered color of `key`.
    #[inline]
    pub fn top(&self, key: CoordKey) -> Option<&CellEntry> {
        self.cells.get(&key).and_then(|stack| stack.last())
    }

    /// Iterate keys with their stacks in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (CoordKey, &[CellEntry])> {
        self.cells.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Keys sorted by `(x, y)`.
    pub fn sorted_keys(&self) -> Vec<CoordKey> {
        let mut keys: Vec<CoordKey> = self.cells.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Keys that fall inside the visible square for `axis`.
    pub fn visible_len(&self, axis: AxisRange) -> usize {
        self.cells
            .keys()
            .filter(|k| axis.contains(k.x) && axis.contains(k.y))
            .count()
    }
}
