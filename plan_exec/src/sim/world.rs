//! # Synthetic World
//!
//! Builds a world for the local planner to drive through without perception: a sinusoidal
//! centerline, box shaped obstacles rasterised into the occupancy grid, terrain labels from
//! Perlin noise with a road along the centerline, and constant velocity moving obstacles.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::info;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::auto::{
    map::{GridError, GridGeometry, MovingObstacle, OccupancyGrid, TerrainLabel, TerrainLabels},
    nav::PlanningSnapshot,
    path::{Centerline, PathError},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldParams {
    /// Size of each grid cell
    pub cell_size_m: f64,

    /// Number of cells in the x and y directions
    pub num_cells: [usize; 2],

    /// Start point of the centerline
    pub centerline_start_m: [f64; 2],

    /// Length of the centerline along the x axis
    pub centerline_length_m: f64,

    /// Amplitude of the centerline's sinusoid in y
    pub centerline_amplitude_m: f64,

    /// Wavelength of the centerline's sinusoid
    pub centerline_wavelength_m: f64,

    /// Distance between centerline points
    pub centerline_point_sep_m: f64,

    /// Half width of the road laid along the centerline in the terrain labels
    pub road_half_width_m: f64,

    /// Scale applied to cell positions before sampling the terrain noise
    pub perlin_scale: f64,

    pub terrain_seed: u32,

    pub obstacles: Vec<ObstacleBox>,

    pub moving_obstacles: Vec<MovingObstacle>,
}

/// Axis aligned box of occupied cells
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ObstacleBox {
    pub min_m: [f64; 2],
    pub max_m: [f64; 2],
}

/// The synthetic world
#[derive(Debug, Clone)]
pub struct World {
    pub centerline: Centerline,

    pub occupancy_grid: OccupancyGrid,

    pub terrain_labels: TerrainLabels,

    pub moving_obstacles: Vec<MovingObstacle>,

    /// Time since the world was generated
    pub time_s: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("Could not build the centerline: {0}")]
    PathError(#[from] PathError),

    #[error("Could not build the grids: {0}")]
    GridError(#[from] GridError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            cell_size_m: 0.25,
            num_cells: [400, 120],
            centerline_start_m: [0.0, 15.0],
            centerline_length_m: 100.0,
            centerline_amplitude_m: 4.0,
            centerline_wavelength_m: 60.0,
            centerline_point_sep_m: 1.0,
            road_half_width_m: 2.0,
            perlin_scale: 0.1,
            terrain_seed: 0,
            obstacles: vec![],
            moving_obstacles: vec![],
        }
    }
}

impl World {
    /// Generate a new world from the parameters.
    pub fn generate(params: &WorldParams) -> Result<Self, WorldError> {
        let centerline = sine_centerline(params)?;

        let geometry = GridGeometry::new(
            Vector2::zeros(),
            params.cell_size_m,
            Vector2::new(params.num_cells[0], params.num_cells[1]),
        )?;

        let mut occupancy_grid = OccupancyGrid::new(geometry);
        for obs in params.obstacles.iter() {
            occupancy_grid.fill_box(&obs.min_m.into(), &obs.max_m.into());
        }

        // Noise everywhere, with a road along the centerline
        let mut terrain_labels =
            TerrainLabels::generate_random(geometry, params.perlin_scale, params.terrain_seed);
        let (nx, ny) = geometry.shape();
        for x in 0..nx {
            for y in 0..ny {
                let centre_m = geometry.cell_centre((x, y));
                let (_, rho_m) = centerline.project(&centre_m);
                if rho_m.abs() <= params.road_half_width_m {
                    terrain_labels.set_label_at(&centre_m, TerrainLabel::Road)?;
                }
            }
        }

        info!(
            "Generated world: centerline {:.1} m, {} occupied cells, {} moving obstacles",
            centerline.length_m(),
            occupancy_grid.num_occupied(),
            params.moving_obstacles.len()
        );

        Ok(Self {
            centerline,
            occupancy_grid,
            terrain_labels,
            moving_obstacles: params.moving_obstacles.clone(),
            time_s: 0.0,
        })
    }

    /// Snapshot of the world for a planning cycle of a vehicle travelling at `speed_ms`.
    pub fn snapshot(&self, speed_ms: f64) -> PlanningSnapshot {
        PlanningSnapshot {
            centerline: &self.centerline,
            occupancy_grid: &self.occupancy_grid,
            terrain_labels: &self.terrain_labels,
            moving_obstacles: &self.moving_obstacles,
            speed_ms,
        }
    }

    /// Advance the moving obstacles by `dt_s`.
    pub fn step(&mut self, dt_s: f64) {
        for obs in self.moving_obstacles.iter_mut() {
            obs.position_m = obs.predicted_position(dt_s);
        }
        self.time_s += dt_s;
    }

    /// Returns true if the vehicle, a circle of the given radius at `position_m`, overlaps a
    /// moving obstacle or lies in an occupied cell.
    pub fn in_collision(&self, position_m: &Vector2<f64>, radius_m: f64) -> bool {
        if let Some(true) = self.occupancy_grid.is_occupied(position_m) {
            return true;
        }

        self.moving_obstacles
            .iter()
            .any(|obs| obs.clearance_m(position_m, 0.0) < radius_m)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn sine_centerline(params: &WorldParams) -> Result<Centerline, PathError> {
    let start_m = Vector2::from(params.centerline_start_m);
    let num_points = (params.centerline_length_m / params.centerline_point_sep_m)
        .ceil()
        .max(1.0) as usize;
    let k = 2.0 * std::f64::consts::PI / params.centerline_wavelength_m;

    let points_m = (0..=num_points)
        .map(|i| {
            let x = params.centerline_length_m * i as f64 / num_points as f64;
            start_m + Vector2::new(x, params.centerline_amplitude_m * (k * x).sin())
        })
        .collect();

    Centerline::from_points(points_m)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
