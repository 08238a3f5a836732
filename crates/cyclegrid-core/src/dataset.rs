#![forbid(unsafe_code)]

//! Cycle datasets and series identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of one sequence inside a [`CycleDataset`].
///
/// Stable for the lifetime of the dataset it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(pub usize);

impl SeriesId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A modulus plus the ordered sequences computed for it.
///
/// Immutable once built. A new fetch replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CycleDataset {
    modulus: i64,
    sequences: Vec<Vec<i64>>,
}

impl CycleDataset {
    pub fn new(modulus: i64, sequences: Vec<Vec<i64>>) -> Self {
        Self { modulus, sequences }
    }

    /// The dataset shown before anything has loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn modulus(&self) -> i64 {
        self.modulus
    }

    #[inline]
    pub fn sequences(&self) -> &[Vec<i64>] {
        &self.sequences
    }

    /// Number of series.
    #[inline]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// The sequence for `id`, if it exists.
    #[inline]
    pub fn series(&self, id: SeriesId) -> Option<&[i64]> {
        self.sequences.get(id.0).map(Vec::as_slice)
    }

    /// All series ids in ascending order.
    pub fn series_ids(&self) -> impl ExactSizeIterator<Item = SeriesId> + use<> {
        (0..self.sequences.len()).map(SeriesId)
    }

    /// Total number of pairs across every series.
    pub fn total_pairs(&self) -> usize {
        self.sequences.iter().map(Vec::len).sum()
    }
}
