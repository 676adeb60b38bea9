//! Read-only terrain query surface consumed by the cost model.
//!
//! The search core never touches raster storage directly; everything it
//! needs from the terrain goes through this trait, so tests can substitute
//! synthetic terrains and hosts can plug in their own raster sources.

use crate::map::TerrainData;
use crate::terrain::coordinates;

/// Elevation, water and bounds queries at float grid coordinates.
///
/// Implementations must be pure: a search run assumes the answers do not
/// change between calls, and shares the oracle across both frontiers.
pub trait TerrainOracle {
    /// Interpolated ground elevation, or None when out of bounds
    fn elevation_at(&self, grid_x: f32, grid_z: f32) -> Option<f32>;

    /// Whether the nearest cell is open water (false out of bounds)
    fn is_over_water(&self, grid_x: f32, grid_z: f32) -> bool;

    /// Whether the position lies inside the raster
    fn in_bounds(&self, grid_x: f32, grid_z: f32) -> bool;

    /// World units per grid cell
    fn cell_size(&self) -> f32;
}

impl TerrainOracle for TerrainData {
    fn elevation_at(&self, grid_x: f32, grid_z: f32) -> Option<f32> {
        coordinates::sample_height(self, grid_x, grid_z)
    }

    fn is_over_water(&self, grid_x: f32, grid_z: f32) -> bool {
        coordinates::sample_water(self, grid_x, grid_z)
    }

    fn in_bounds(&self, grid_x: f32, grid_z: f32) -> bool {
        coordinates::is_valid_grid(self, grid_x, grid_z)
    }

    fn cell_size(&self) -> f32 {
        self.scale
    }
}
