//! # Occupancy Grid
//!
//! Grid of free/occupied cells supplied by perception. The local planner only queries it, the
//! mutators exist for the producers of the grid and for tests.

// ------------------------------------------------------------------------------------------------
// INCLUDES
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::{GridError, GridGeometry};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Occupancy grid, `true` cells are occupied.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OccupancyGrid {
    geometry: GridGeometry,

    cells: Array2<bool>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl OccupancyGrid {
    /// Create a new grid with every cell free.
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            geometry,
            cells: Array2::from_elem(geometry.shape(), false),
        }
    }

    /// Create a grid from existing cell data, which must match the shape of the geometry.
    pub fn from_cells(geometry: GridGeometry, cells: Array2<bool>) -> Result<Self, GridError> {
        if cells.dim() != geometry.shape() {
            let (x, y) = cells.dim();
            return Err(GridError::ShapeMismatch(
                geometry.num_cells,
                Vector2::new(x, y),
            ));
        }

        Ok(Self { geometry, cells })
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Returns whether the cell containing `position_m` is occupied, or `None` if the position is
    /// outside the grid.
    pub fn is_occupied(&self, position_m: &Vector2<f64>) -> Option<bool> {
        self.geometry
            .index(position_m)
            .map(|idx| self.cells[[idx.0, idx.1]])
    }

    /// Set the occupancy of the cell containing `position_m`.
    pub fn set_occupied(
        &mut self,
        position_m: &Vector2<f64>,
        occupied: bool,
    ) -> Result<(), GridError> {
        let idx = self
            .geometry
            .index(position_m)
            .ok_or(GridError::OutsideGrid(*position_m))?;

        self.cells[[idx.0, idx.1]] = occupied;

        Ok(())
    }

    /// Mark every cell whose centre lies within the axis aligned box `min_m..max_m` as occupied.
    pub fn fill_box(&mut self, min_m: &Vector2<f64>, max_m: &Vector2<f64>) {
        let geometry = self.geometry;
        for ((x, y), cell) in self.cells.indexed_iter_mut() {
            let c = geometry.cell_centre((x, y));
            if c.x >= min_m.x && c.x <= max_m.x && c.y >= min_m.y && c.y <= max_m.y {
                *cell = true;
            }
        }
    }

    /// Number of occupied cells in the grid.
    pub fn num_occupied(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Distance from `position_m` to the nearest occupied cell, searching only within
    /// `max_radius_m`.
    ///
    /// Distances are measured to cell centres, except that a position inside an occupied cell has
    /// zero clearance. If no occupied cell is found within the radius `max_radius_m` is returned.
    pub fn clearance_m(&self, position_m: &Vector2<f64>, max_radius_m: f64) -> f64 {
        if let Some(true) = self.is_occupied(position_m) {
            return 0.0;
        }

        let ((x0, y0), (x1, y1)) = match self.geometry.window(position_m, max_radius_m) {
            Some(w) => w,
            None => return max_radius_m,
        };

        let mut clearance_m = max_radius_m;

        for x in x0..=x1 {
            for y in y0..=y1 {
                if self.cells[[x, y]] {
                    let dist = (self.geometry.cell_centre((x, y)) - position_m).norm();
                    clearance_m = clearance_m.min(dist);
                }
            }
        }

        clearance_m
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
