//! # Grid Geometry

// ------------------------------------------------------------------------------------------------
// INCLUDES
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::GridError;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Placement and resolution of a grid in the world frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Position of the lower left corner of cell `[0, 0]`
    pub origin_m: Vector2<f64>,

    /// Side length of each (square) cell
    pub cell_size_m: f64,

    /// Number of cells along each axis
    pub num_cells: Vector2<usize>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GridGeometry {
    pub fn new(
        origin_m: Vector2<f64>,
        cell_size_m: f64,
        num_cells: Vector2<usize>,
    ) -> Result<Self, GridError> {
        if !(cell_size_m.is_finite() && cell_size_m > 0.0) {
            return Err(GridError::InvalidCellSize(cell_size_m));
        }
        if num_cells.x == 0 || num_cells.y == 0 {
            return Err(GridError::EmptyGrid(num_cells));
        }

        Ok(Self {
            origin_m,
            cell_size_m,
            num_cells,
        })
    }

    /// Shape of the backing array, `(x, y)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.num_cells.x, self.num_cells.y)
    }

    /// Get the index of the cell containing `position_m`, or `None` if it's outside the grid.
    pub fn index(&self, position_m: &Vector2<f64>) -> Option<(usize, usize)> {
        let rel = (position_m - self.origin_m) / self.cell_size_m;

        // Also catches NaN positions
        if !(rel.x >= 0.0 && rel.y >= 0.0) {
            return None;
        }

        let (x, y) = (rel.x.floor() as usize, rel.y.floor() as usize);

        if x < self.num_cells.x && y < self.num_cells.y {
            Some((x, y))
        } else {
            None
        }
    }

    /// Position of the centre of the cell at `index`.
    pub fn cell_centre(&self, index: (usize, usize)) -> Vector2<f64> {
        self.origin_m
            + Vector2::new(index.0 as f64 + 0.5, index.1 as f64 + 0.5) * self.cell_size_m
    }

    /// Range of cell indices covering the square of half width `semi_width_m` around
    /// `position_m`, clipped to the grid. Returns `None` if the square misses the grid entirely.
    pub fn window(
        &self,
        position_m: &Vector2<f64>,
        semi_width_m: f64,
    ) -> Option<((usize, usize), (usize, usize))> {
        let lo = (position_m - self.origin_m).add_scalar(-semi_width_m) / self.cell_size_m;
        let hi = (position_m - self.origin_m).add_scalar(semi_width_m) / self.cell_size_m;

        if !(hi.x >= 0.0 && hi.y >= 0.0) {
            return None;
        }
        if lo.x >= self.num_cells.x as f64 || lo.y >= self.num_cells.y as f64 {
            return None;
        }

        let clip = |v: f64, n: usize| (v.max(0.0).floor() as usize).min(n - 1);

        Some((
            (clip(lo.x, self.num_cells.x), clip(lo.y, self.num_cells.y)),
            (clip(hi.x, self.num_cells.x), clip(hi.y, self.num_cells.y)),
        ))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
