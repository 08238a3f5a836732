#![forbid(unsafe_code)]

//! Square cell geometry for a viewport.
//!
//! The grid is always square: the shorter viewport side is split evenly into
//! `modulus` integer-sized cells, with a floor of [`MIN_CELL_SIDE`] pixels.
//! The floor wins over fitting; a grid that overflows is scrolled, never
//! shrunk below the floor.
//!
//! A non-positive modulus, a zero-sized viewport, or a grid side that does
//! not fit in `u64` produces a degenerate geometry (`cell_side == 0`) that
//! renders nothing.

use serde::Serialize;

/// Smallest cell side in pixels.
pub const MIN_CELL_SIDE: u32 = 6;

/// Size of the rendering surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Side of the largest square that fits.
    #[inline]
    pub const fn side(&self) -> u32 {
        if self.width < self.height {
            self.width
        } else {
            self.height
        }
    }
}

/// Derived cell and grid extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CellGeometry {
    /// Pixels per cell side; 0 when nothing can be rendered.
    pub cell_side: u32,
    /// Pixels per grid side, `cell_side * modulus`.
    pub grid_side: u64,
    /// Number of cells per side.
    pub modulus: i64,
}

impl CellGeometry {
    /// Compute the geometry for `modulus` cells per side inside `viewport`.
    pub fn compute(modulus: i64, viewport: Viewport) -> Self {
        if modulus <= 0 || viewport.is_empty() {
            return Self::degenerate(modulus.max(0));
        }
        let cells = modulus as u64;
        let fitted = u64::from(viewport.side()) / cells;
        // `fitted <= side <= u32::MAX`, so the cast is lossless.
        let cell_side = (fitted as u32).max(MIN_CELL_SIDE);
        match u64::from(cell_side).checked_mul(cells) {
            Some(grid_side) => Self {
                cell_side,
                grid_side,
                modulus,
            },
            None => Self::degenerate(modulus),
        }
    }

    const fn degenerate(modulus: i64) -> Self {
        Self {
            cell_side: 0,
            grid_side: 0,
            modulus,
        }
    }

    /// Whether anything can be drawn.
    #[inline]
    pub const fn is_renderable(&self) -> bool {
        self.cell_side > 0
    }

    /// Whether the grid is larger than `viewport` on either axis.
    pub fn overflows(&self, viewport: Viewport) -> bool {
        self.grid_side > u64::from(viewport.width) || self.grid_side > u64::from(viewport.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_shorter_side() {
        let g = CellGeometry::compute(4, Viewport::new(200, 100));
        assert_eq!(g.cell_side, 25);
        assert_eq!(g.grid_side, 100);
        assert!(!g.overflows(Viewport::new(200, 100)));
    }

    #[test]
    fn floors_to_integer_cells() {
        let g = CellGeometry::compute(7, Viewport::new(100, 100));
        assert_eq!(g.cell_side, 14);
        assert_eq!(g.grid_side, 98);
    }

    #[test]
    fn minimum_cell_side_can_overflow() {
        let viewport = Viewport::new(200, 100);
        let g = CellGeometry::compute(64, viewport);
        assert_eq!(g.cell_side, MIN_CELL_SIDE);
        assert_eq!(g.grid_side, 384);
        assert!(g.overflows(viewport));
    }

    #[test]
    fn degenerate_inputs_render_nothing() {
        for (m, vp) in [
            (0, Viewport::new(100, 100)),
            (-4, Viewport::new(100, 100)),
            (4, Viewport::new(0, 100)),
            (4, Viewport::new(100, 0)),
        ] {
            let g = CellGeometry::compute(m, vp);
            assert_eq!(g.cell_side, 0);
            assert_eq!(g.grid_side, 0);
            assert!(!g.is_renderable());
        }
    }

    #[test]
    fn unrepresentable_grid_side_is_degenerate() {
        let g = CellGeometry::compute(i64::MAX, Viewport::new(80, 56));
        assert_eq!(g.cell_side, 0);
        assert_eq!(g.grid_side, 0);
        assert_eq!(g.modulus, i64::MAX);
        assert!(!g.is_renderable());
    }
}
