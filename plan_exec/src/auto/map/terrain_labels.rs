//! # Terrain Labels
//!
//! Per-cell terrain classes produced by terrain segmentation, and the table mapping each class to
//! the segmentation cost weight charged per meter traversed over it.

// ------------------------------------------------------------------------------------------------
// INCLUDES
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use ndarray::Array2;
use noise::{NoiseFn, Perlin, Seedable};
use serde::{Deserialize, Serialize};

use super::{GridError, GridGeometry};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Terrain labels grid
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TerrainLabels {
    geometry: GridGeometry,

    labels: Array2<TerrainLabel>,
}

/// Segmentation cost weight, charged per meter traversed, for each terrain label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainCostTable {
    pub road: f64,
    pub trail: f64,
    pub gravel: f64,
    pub grass: f64,
    pub vegetation: f64,
    pub mud: f64,
    pub water: f64,

    /// Weight for unlabelled cells and for cells outside the label grid.
    pub unknown: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible terrain classes
#[derive(PartialEq, Eq, Clone, Copy, Hash, Debug, Serialize, Deserialize)]
pub enum TerrainLabel {
    Unknown,
    Road,
    Trail,
    Gravel,
    Grass,
    Vegetation,
    Mud,
    Water,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for TerrainLabel {
    fn default() -> Self {
        Self::Unknown
    }
}

impl TerrainLabels {
    /// Create a new grid with every cell unlabelled.
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            geometry,
            labels: Array2::from_elem(geometry.shape(), TerrainLabel::Unknown),
        }
    }

    /// Create a grid from existing label data, which must match the shape of the geometry.
    pub fn from_labels(
        geometry: GridGeometry,
        labels: Array2<TerrainLabel>,
    ) -> Result<Self, GridError> {
        if labels.dim() != geometry.shape() {
            let (x, y) = labels.dim();
            return Err(GridError::ShapeMismatch(
                geometry.num_cells,
                Vector2::new(x, y),
            ));
        }

        Ok(Self { geometry, labels })
    }

    /// Generate a random label grid using Perlin noise, the noise value in each cell is banded
    /// into `Road`, `Gravel`, `Grass` and `Vegetation` from low to high.
    pub fn generate_random(geometry: GridGeometry, perlin_scale: f64, seed: u32) -> Self {
        let perlin = Perlin::new().set_seed(seed);

        let labels = Array2::from_shape_fn(geometry.shape(), |(x, y)| {
            let pos = geometry.cell_centre((x, y));
            match perlin.get([pos.x * perlin_scale, pos.y * perlin_scale]) {
                n if n < -0.2 => TerrainLabel::Road,
                n if n < 0.1 => TerrainLabel::Gravel,
                n if n < 0.4 => TerrainLabel::Grass,
                _ => TerrainLabel::Vegetation,
            }
        });

        Self { geometry, labels }
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Get the label at `position_m`, or `None` if the position lies outside the grid.
    pub fn label_at(&self, position_m: &Vector2<f64>) -> Option<TerrainLabel> {
        self.geometry
            .index(position_m)
            .map(|idx| self.labels[[idx.0, idx.1]])
    }

    /// Set the label of the cell containing `position_m`.
    pub fn set_label_at(
        &mut self,
        position_m: &Vector2<f64>,
        label: TerrainLabel,
    ) -> Result<(), GridError> {
        let idx = self
            .geometry
            .index(position_m)
            .ok_or(GridError::OutsideGrid(*position_m))?;

        self.labels[[idx.0, idx.1]] = label;

        Ok(())
    }

    /// Set the label of every cell whose centre lies within the axis aligned box `min_m..max_m`.
    pub fn fill_box(&mut self, min_m: &Vector2<f64>, max_m: &Vector2<f64>, label: TerrainLabel) {
        let geometry = self.geometry;
        for ((x, y), cell) in self.labels.indexed_iter_mut() {
            let c = geometry.cell_centre((x, y));
            if c.x >= min_m.x && c.x <= max_m.x && c.y >= min_m.y && c.y <= max_m.y {
                *cell = label;
            }
        }
    }
}

impl TerrainCostTable {
    /// Weight to apply to a sample with the given label, `None` being outside the label grid.
    pub fn weight(&self, label: Option<TerrainLabel>) -> f64 {
        match label {
            Some(TerrainLabel::Road) => self.road,
            Some(TerrainLabel::Trail) => self.trail,
            Some(TerrainLabel::Gravel) => self.gravel,
            Some(TerrainLabel::Grass) => self.grass,
            Some(TerrainLabel::Vegetation) => self.vegetation,
            Some(TerrainLabel::Mud) => self.mud,
            Some(TerrainLabel::Water) => self.water,
            Some(TerrainLabel::Unknown) | None => self.unknown,
        }
    }
}

impl Default for TerrainCostTable {
    /// Roads and trails are preferred and carry no cost.
    fn default() -> Self {
        Self {
            road: 0.0,
            trail: 0.0,
            gravel: 0.1,
            grass: 0.3,
            vegetation: 0.8,
            mud: 1.5,
            water: 5.0,
            unknown: 1.0,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
