//! # Map
//!
//! This module implements the read-only per-cycle map snapshots consumed by the local planner:
//! the [`OccupancyGrid`], the [`TerrainLabels`] produced by terrain segmentation, and the
//! [`MovingObstacle`] tracks. Both grids share a [`GridGeometry`], which maps between world
//! positions and cell indices.
//!
//! Grids are stored as `ndarray` arrays indexed `[x, y]`, with cell `[0, 0]` at the grid origin
//! (the lower left corner of the grid).

// ------------------------------------------------------------------------------------------------
// MODS
// ------------------------------------------------------------------------------------------------

/// Implements the shared [`GridGeometry`] type
mod grid_geometry;

/// Implements the [`OccupancyGrid`] type
mod occupancy_grid;

/// Implements the [`TerrainLabels`] type
mod terrain_labels;

/// Implements the [`MovingObstacle`] type
mod moving_obstacle;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use grid_geometry::GridGeometry;
pub use moving_obstacle::MovingObstacle;
pub use occupancy_grid::OccupancyGrid;
pub use terrain_labels::{TerrainCostTable, TerrainLabel, TerrainLabels};

use nalgebra::Vector2;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can arise from building or modifying grids.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GridError {
    #[error("Cell size must be positive and finite, got {0}")]
    InvalidCellSize(f64),

    #[error("Grid must contain at least one cell, got shape {0}")]
    EmptyGrid(Vector2<usize>),

    #[error("Cannot use data of shape {1} with a grid of shape {0}")]
    ShapeMismatch(Vector2<usize>, Vector2<usize>),

    #[error("Position {0} is outside the grid")]
    OutsideGrid(Vector2<f64>),
}
