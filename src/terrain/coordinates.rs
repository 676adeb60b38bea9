use crate::map::TerrainData;
use serde::{Deserialize, Serialize};

/// Quantized lattice position. The search operates on integer grid cells;
/// elevation is derived separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub z: i32,
}

impl GridPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Translate by an integer offset
    pub fn offset(&self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    /// Euclidean distance in grid cells
    pub fn distance_cells(&self, other: &GridPos) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dz = (self.z - other.z) as f32;
        (dx * dx + dz * dz).sqrt()
    }

    /// Euclidean distance in world units
    pub fn distance_world(&self, other: &GridPos, terrain: &TerrainData) -> f32 {
        self.distance_cells(other) * terrain.scale
    }

    /// Convert to centered world-plane coordinates (x, z)
    pub fn to_world_xz(&self, terrain: &TerrainData) -> (f32, f32) {
        grid_to_world(terrain, self.x as f32, self.z as f32)
    }
}

/// Convert world coordinates to grid coordinates, accounting for terrain centering
pub fn world_to_grid(terrain: &TerrainData, world_x: f32, world_z: f32) -> (f32, f32) {
    let terrain_width = terrain.width as f32 * terrain.scale;
    let terrain_height = terrain.height as f32 * terrain.scale;
    let center_x_offset = terrain_width / 2.0;
    let center_z_offset = terrain_height / 2.0;

    let grid_x = (world_x + center_x_offset) / terrain.scale;
    let grid_z = (world_z + center_z_offset) / terrain.scale;
    (grid_x, grid_z)
}

/// Convert grid coordinates to world coordinates, accounting for terrain centering
pub fn grid_to_world(terrain: &TerrainData, grid_x: f32, grid_z: f32) -> (f32, f32) {
    let terrain_width = terrain.width as f32 * terrain.scale;
    let terrain_height = terrain.height as f32 * terrain.scale;
    let center_x_offset = terrain_width / 2.0;
    let center_z_offset = terrain_height / 2.0;

    let world_x = grid_x * terrain.scale - center_x_offset;
    let world_z = grid_z * terrain.scale - center_z_offset;
    (world_x, world_z)
}

/// Check if float grid coordinates are within terrain bounds
pub fn is_valid_grid(terrain: &TerrainData, grid_x: f32, grid_z: f32) -> bool {
    grid_x >= 0.0
        && grid_z >= 0.0
        && grid_x < terrain.width as f32
        && grid_z < terrain.height as f32
}

/// Get interpolated elevation at float grid coordinates using bilinear
/// interpolation. Positions exactly on the last row/column are supported by
/// clamping the far interpolation corner.
pub fn sample_height(terrain: &TerrainData, grid_x: f32, grid_z: f32) -> Option<f32> {
    if grid_x < 0.0
        || grid_z < 0.0
        || grid_x > (terrain.width - 1) as f32
        || grid_z > (terrain.height - 1) as f32
    {
        return None;
    }

    let x0 = grid_x.floor() as u32;
    let z0 = grid_z.floor() as u32;
    let x1 = (x0 + 1).min(terrain.width - 1);
    let z1 = (z0 + 1).min(terrain.height - 1);

    let fx = grid_x.fract();
    let fz = grid_z.fract();

    let h00 = terrain.height_at_grid(x0, z0)?;
    let h10 = terrain.height_at_grid(x1, z0)?;
    let h01 = terrain.height_at_grid(x0, z1)?;
    let h11 = terrain.height_at_grid(x1, z1)?;

    let h0 = h00 * (1.0 - fx) + h10 * fx;
    let h1 = h01 * (1.0 - fx) + h11 * fx;

    Some(h0 * (1.0 - fz) + h1 * fz)
}

/// Get the water flag at float grid coordinates (nearest cell)
pub fn sample_water(terrain: &TerrainData, grid_x: f32, grid_z: f32) -> bool {
    if !is_valid_grid(terrain, grid_x, grid_z) {
        return false;
    }
    let x = grid_x.round() as u32;
    let z = grid_z.round() as u32;
    terrain.water_at_grid(x, z).unwrap_or(false)
}
