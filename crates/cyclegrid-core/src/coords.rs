#![forbid(unsafe_code)]

//! Coordinate addressing modes, keys, and axis enumeration.
//!
//! A grid of modulus `m` shows `m` columns and `m` rows. Which integers those
//! columns and rows stand for depends on the [`AddressingMode`]:
//!
//! | Mode        | Axis range (both axes)              | m = 5           |
//! |-------------|-------------------------------------|-----------------|
//! | `ZeroBased` | `0 ..= m-1`                         | `0 ..= 4`       |
//! | `Centered`  | `-⌊m/2⌋ ..= m - ⌊m/2⌋ - 1`          | `-2 ..= 2`      |
//!
//! The x axis is enumerated left to right (ascending). The y axis is
//! enumerated top to bottom in *render* order, which is descending, so larger
//! y values sit toward the top of the grid.
//!
//! Keys are never reduced modulo anything: a pair outside the axis range
//! still gets a key, it is simply never visited when the grid is walked.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Convention mapping raw coordinate values to the visible axis range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressingMode {
    /// Axes run over `[0, modulus)`.
    #[default]
    ZeroBased,
    /// Axes are shifted so the origin sits inside the grid.
    Centered,
}

impl AddressingMode {
    /// Whether this is the centered mode (the upstream `centered` flag).
    #[inline]
    pub const fn is_centered(self) -> bool {
        matches!(self, Self::Centered)
    }

    /// The other mode.
    #[inline]
    pub const fn toggled(self) -> Self {
        match self {
            Self::ZeroBased => Self::Centered,
            Self::Centered => Self::ZeroBased,
        }
    }

    /// Axis range for a modulus in this mode.
    #[inline]
    pub fn axis(self, modulus: i64) -> AxisRange {
        AxisRange::new(self, modulus)
    }

    /// Short label for status lines.
    pub const fn label(self) -> &'static str {
        match self {
            Self::ZeroBased => "zero-based",
            Self::Centered => "centered",
        }
    }
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical identity of one grid cell: the raw `(x, y)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoordKey {
    pub x: i64,
    pub y: i64,
}

impl CoordKey {
    /// Pack a pair into a key. No reduction is applied.
    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl From<(i64, i64)> for CoordKey {
    #[inline]
    fn from((x, y): (i64, i64)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for CoordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Identity packing of an integer pair.
#[inline]
pub const fn to_key(x: i64, y: i64) -> CoordKey {
    CoordKey::new(x, y)
}

/// Inclusive, gap-free range of values shown on one axis.
///
/// An empty range (`len() == 0`) is produced for a non-positive modulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    min: i64,
    len: i64,
}

impl AxisRange {
    /// Axis range for `modulus` under `mode`.
    pub fn new(mode: AddressingMode, modulus: i64) -> Self {
        if modulus <= 0 {
            return Self { min: 0, len: 0 };
        }
        let min = match mode {
            AddressingMode::ZeroBased => 0,
            AddressingMode::Centered => -(modulus / 2),
        };
        Self { min, len: modulus }
    }

    /// Number of values on the axis (the modulus, or 0).
    #[inline]
    pub const fn len(&self) -> i64 {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Smallest value, if any.
    #[inline]
    pub const fn min(&self) -> Option<i64> {
        if self.len == 0 { None } else { Some(self.min) }
    }

    /// Largest value, if any.
    #[inline]
    pub const fn max(&self) -> Option<i64> {
        if self.len == 0 {
            None
        } else {
            Some(self.min + self.len - 1)
        }
    }

    /// Whether `value` is visible on this axis.
    #[inline]
    pub const fn contains(&self, value: i64) -> bool {
        value >= self.min && value < self.min + self.len
    }

    /// Value of the x axis at column `col` (left to right).
    #[inline]
    pub fn x_at(&self, col: i64) -> Option<i64> {
        (0..self.len).contains(&col).then(|| self.min + col)
    }

    /// Value of the y render axis at `row_from_top` (top to bottom).
    #[inline]
    pub fn y_at(&self, row_from_top: i64) -> Option<i64> {
        (0..self.len)
            .contains(&row_from_top)
            .then(|| self.min + self.len - 1 - row_from_top)
    }

    /// Column index of an x value, the inverse of [`x_at`](Self::x_at).
    #[inline]
    pub fn col_of(&self, x: i64) -> Option<i64> {
        self.contains(x).then(|| x - self.min)
    }

    /// Row-from-top index of a y value, the inverse of [`y_at`](Self::y_at).
    #[inline]
    pub fn row_of(&self, y: i64) -> Option<i64> {
        self.contains(y).then(|| self.min + self.len - 1 - y)
    }

    /// x axis values, ascending.
    pub fn x_values(&self) -> impl DoubleEndedIterator<Item = i64> + ExactSizeIterator + use<> {
        let min = self.min;
        (0..self.len as usize).map(move |i| min + i as i64)
    }

    /// y render-axis values, descending.
    pub fn y_values(&self) -> impl DoubleEndedIterator<Item = i64> + ExactSizeIterator + use<> {
        self.x_values().rev()
    }
}

/// Ascending x-axis enumeration for `modulus` under `mode`.
pub fn enumerate_x(mode: AddressingMode, modulus: i64) -> Vec<i64> {
    mode.axis(modulus).x_values().collect()
}

/// Descending y render-axis enumeration for `modulus` under `mode`.
pub fn enumerate_y(mode: AddressingMode, modulus: i64) -> Vec<i64> {
    mode.axis(modulus).y_values().collect()
}
