#![forbid(unsafe_code)]

//! Active-series selection and presentation order.
//!
//! Selection decides what the cell index contains. Order only decides how
//! the series list is presented; it never reaches the index.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::dataset::{CycleDataset, SeriesId};

/// Which series are active, by [`SeriesId`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    active: Vec<bool>,
}

impl Selection {
    /// Every one of `len` series active.
    pub fn all_active(len: usize) -> Self {
        Self {
            active: vec![true; len],
        }
    }

    /// None of `len` series active.
    pub fn none_active(len: usize) -> Self {
        Self {
            active: vec![false; len],
        }
    }

    /// Number of series tracked.
    #[inline]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Whether `id` is active. Unknown ids are inactive.
    #[inline]
    pub fn is_active(&self, id: SeriesId) -> bool {
        self.active.get(id.index()).copied().unwrap_or(false)
    }

    /// Flip one series. Returns the new state, or `None` for an unknown id.
    pub fn toggle(&mut self, id: SeriesId) -> Option<bool> {
        let slot = self.active.get_mut(id.index())?;
        *slot = !*slot;
        Some(*slot)
    }

    pub fn select_all(&mut self) {
        self.active.fill(true);
    }

    pub fn select_none(&mut self) {
        self.active.fill(false);
    }

    /// Number of active series.
    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|on| **on).count()
    }

    /// Active series ids, ascending.
    pub fn active_ids(&self) -> impl Iterator<Item = SeriesId> + '_ {
        self.active
            .iter()
            .enumerate()
            .filter_map(|(i, on)| on.then_some(SeriesId(i)))
    }
}

/// Presentation order of the series list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderMode {
    /// Ascending series id.
    #[default]
    Original,
    /// Shortest sequence first; ties by ascending series id.
    LengthAsc,
    /// Longest sequence first; ties by ascending series id.
    LengthDesc,
}

impl OrderMode {
    /// Total order over `(id, length)` entries.
    pub fn compare(self, a: (SeriesId, usize), b: (SeriesId, usize)) -> Ordering {
        let by_len = match self {
            Self::Original => Ordering::Equal,
            Self::LengthAsc => a.1.cmp(&b.1),
            Self::LengthDesc => b.1.cmp(&a.1),
        };
        by_len.then(a.0.cmp(&b.0))
    }

    /// Series ids of `dataset` in this presentation order.
    pub fn arrange(self, dataset: &CycleDataset) -> Vec<SeriesId> {
        let mut entries: Vec<(SeriesId, usize)> = dataset
            .sequences()
            .iter()
            .enumerate()
            .map(|(i, seq)| (SeriesId(i), seq.len()))
            .collect();
        entries.sort_by(|a, b| self.compare(*a, *b));
        entries.into_iter().map(|(id, _)| id).collect()
    }

    /// Next mode in the cycle original → ascending → descending.
    pub const fn next(self) -> Self {
        match self {
            Self::Original => Self::LengthAsc,
            Self::LengthAsc => Self::LengthDesc,
            Self::LengthDesc => Self::Original,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::LengthAsc => "length ↑",
            Self::LengthDesc => "length ↓",
        }
    }
}
