#![forbid(unsafe_code)]

//! Pointer → grid coordinate hit-testing.
//!
//! The mapper is built from the same [`CellGeometry`] and [`AddressingMode`]
//! the renderer uses, so the coordinate reported under the pointer is always
//! the key the renderer looked up for that cell.
//!
//! Positions are viewport pixels. The grid's top-left corner sits at
//! `origin` inside the viewport; scrolling moves the origin negative.

use serde::Serialize;

use crate::coords::{AddressingMode, AxisRange, CoordKey};
use crate::layout::CellGeometry;

/// A pointer position resolved to one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridHit {
    /// Column from the left, `0..modulus`.
    pub col: i64,
    /// Row from the top, `0..modulus`.
    pub row_from_top: i64,
    /// Logical coordinate in the active addressing mode.
    pub key: CoordKey,
}

/// Maps viewport pixels to grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerMapper {
    geometry: CellGeometry,
    axis: AxisRange,
    origin_x: i64,
    origin_y: i64,
}

impl PointerMapper {
    /// Mapper for a grid drawn at the viewport origin.
    pub fn new(mode: AddressingMode, geometry: CellGeometry) -> Self {
        Self {
            geometry,
            axis: mode.axis(geometry.modulus),
            origin_x: 0,
            origin_y: 0,
        }
    }

    /// Place the grid's top-left corner at `(x, y)` viewport pixels.
    #[must_use]
    pub const fn with_origin(mut self, x: i64, y: i64) -> Self {
        self.origin_x = x;
        self.origin_y = y;
        self
    }

    #[inline]
    pub const fn geometry(&self) -> CellGeometry {
        self.geometry
    }

    #[inline]
    pub const fn axis(&self) -> AxisRange {
        self.axis
    }

    /// Resolve a viewport pixel. `None` when outside the grid square.
    pub fn locate(&self, px: i64, py: i64) -> Option<GridHit> {
        self.locate_local(px - self.origin_x, py - self.origin_y)
    }

    /// Resolve a pixel relative to the grid's top-left corner.
    pub fn locate_local(&self, local_x: i64, local_y: i64) -> Option<GridHit> {
        if !self.geometry.is_renderable() || self.axis.is_empty() {
            return None;
        }
        let grid_side = i64::try_from(self.geometry.grid_side).ok()?;
        if !(0..grid_side).contains(&local_x) || !(0..grid_side).contains(&local_y) {
            return None;
        }
        let side = i64::from(self.geometry.cell_side);
        let last = self.axis.len() - 1;
        let col = local_x.div_euclid(side).clamp(0, last);
        let row_from_top = local_y.div_euclid(side).clamp(0, last);
        let x = self.axis.x_at(col)?;
        let y = self.axis.y_at(row_from_top)?;
        Some(GridHit {
            col,
            row_from_top,
            key: CoordKey::new(x, y),
        })
    }

    /// Viewport pixel of the top-left corner of cell `(col, row_from_top)`.
    pub fn cell_origin(&self, col: i64, row_from_top: i64) -> (i64, i64) {
        let side = i64::from(self.geometry.cell_side);
        (
            self.origin_x + col * side,
            self.origin_y + row_from_top * side,
        )
    }
}
