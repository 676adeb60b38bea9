use crate::errors::{RoadforgeError, RoadforgeResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// Raster terrain description: a heightmap plus a water mask, both row-major,
/// with a uniform world scale per grid cell.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TerrainData {
    #[validate(range(min = 1, max = 4096))]
    pub width: u32,
    #[validate(range(min = 1, max = 4096))]
    pub height: u32,
    /// Flattened 2D elevation array (row-major), world units
    pub heights: Vec<f32>,
    /// Flattened 2D water mask (row-major); true marks open water
    pub water: Vec<bool>,
    #[validate(range(min = 0.1, max = 100.0))]
    pub scale: f32, // World units per grid cell
}

impl TerrainData {
    /// Create new terrain data with validation
    pub fn new(
        width: u32,
        height: u32,
        heights: Vec<f32>,
        water: Vec<bool>,
        scale: f32,
    ) -> RoadforgeResult<Self> {
        let expected_size = (width * height) as usize;
        if heights.len() != expected_size {
            return Err(RoadforgeError::InvalidTerrainData {
                reason: format!(
                    "Heights array size {} does not match terrain dimensions {}x{} (expected {})",
                    heights.len(),
                    width,
                    height,
                    expected_size
                ),
            });
        }
        if water.len() != expected_size {
            return Err(RoadforgeError::InvalidTerrainData {
                reason: format!(
                    "Water mask size {} does not match terrain dimensions {}x{} (expected {})",
                    water.len(),
                    width,
                    height,
                    expected_size
                ),
            });
        }
        if heights.iter().any(|h| !h.is_finite()) {
            return Err(RoadforgeError::InvalidTerrainData {
                reason: "Heights array contains non-finite values".to_string(),
            });
        }

        let terrain = Self {
            width,
            height,
            heights,
            water,
            scale,
        };

        terrain
            .validate()
            .map_err(|_| RoadforgeError::InvalidTerrainData {
                reason: "Terrain validation failed".to_string(),
            })?;

        Ok(terrain)
    }

    /// Create flat, dry terrain for testing
    pub fn create_flat(
        width: u32,
        height: u32,
        scale: f32,
        base_height: f32,
    ) -> RoadforgeResult<Self> {
        let cells = (width * height) as usize;
        Self::new(
            width,
            height,
            vec![base_height; cells],
            vec![false; cells],
            scale,
        )
    }

    /// Get the elevation at an exact grid position
    pub fn height_at_grid(&self, x: u32, z: u32) -> Option<f32> {
        if x >= self.width || z >= self.height {
            return None;
        }
        let index = (z * self.width + x) as usize;
        self.heights.get(index).copied()
    }

    /// Get the water flag at an exact grid position
    pub fn water_at_grid(&self, x: u32, z: u32) -> Option<bool> {
        if x >= self.width || z >= self.height {
            return None;
        }
        let index = (z * self.width + x) as usize;
        self.water.get(index).copied()
    }

    /// Mark a rectangular region [x0..=x1] x [z0..=z1] as water.
    /// Out-of-range portions are clipped to the terrain bounds.
    pub fn flood_rect(&mut self, x0: u32, z0: u32, x1: u32, z1: u32) {
        let x1 = x1.min(self.width - 1);
        let z1 = z1.min(self.height - 1);
        for z in z0..=z1 {
            for x in x0..=x1 {
                let index = (z * self.width + x) as usize;
                self.water[index] = true;
            }
        }
    }

    /// Raise or lower a rectangular region to a fixed elevation.
    /// Out-of-range portions are clipped to the terrain bounds.
    pub fn raise_rect(&mut self, x0: u32, z0: u32, x1: u32, z1: u32, elevation: f32) {
        let x1 = x1.min(self.width - 1);
        let z1 = z1.min(self.height - 1);
        for z in z0..=z1 {
            for x in x0..=x1 {
                let index = (z * self.width + x) as usize;
                self.heights[index] = elevation;
            }
        }
    }

    /// Load terrain from a bincode file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> RoadforgeResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RoadforgeError::TerrainFileNotFound {
                path: path.to_path_buf(),
            });
        }

        let data = std::fs::read(path)?;
        let (terrain, _): (TerrainData, usize) =
            bincode::serde::decode_from_slice(&data, bincode::config::standard()).map_err(|e| {
                RoadforgeError::CorruptedTerrainFile {
                    reason: format!("Failed to deserialize terrain data: {e}"),
                }
            })?;

        terrain
            .validate()
            .map_err(|e| RoadforgeError::CorruptedTerrainFile {
                reason: format!("Terrain validation failed: {e}"),
            })?;

        Ok(terrain)
    }

    /// Save the terrain to a bincode file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> RoadforgeResult<()> {
        self.validate()
            .map_err(|_| RoadforgeError::InvalidTerrainData {
                reason: "Terrain validation failed before save".to_string(),
            })?;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data =
            bincode::serde::encode_to_vec(self, bincode::config::standard()).map_err(|e| {
                RoadforgeError::InvalidTerrainData {
                    reason: format!("Failed to serialize terrain: {e}"),
                }
            })?;

        std::fs::write(path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_data_creation() {
        let terrain =
            TerrainData::new(2, 2, vec![0.0, 1.0, 2.0, 3.0], vec![false; 4], 1.0).unwrap();
        assert_eq!(terrain.width, 2);
        assert_eq!(terrain.height, 2);
        assert_eq!(terrain.heights.len(), 4);
        assert_eq!(terrain.water.len(), 4);
    }

    #[test]
    fn test_terrain_data_invalid_size() {
        let result = TerrainData::new(2, 2, vec![0.0, 1.0, 2.0], vec![false; 4], 1.0);
        assert!(result.is_err());

        let result = TerrainData::new(2, 2, vec![0.0; 4], vec![false; 3], 1.0);
        assert!(result.is_err());
    }

    #[test]
    fn test_terrain_data_rejects_nan_heights() {
        let result = TerrainData::new(2, 2, vec![0.0, f32::NAN, 0.0, 0.0], vec![false; 4], 1.0);
        assert!(result.is_err());
    }

    #[test]
    fn test_flat_terrain_creation() {
        let terrain = TerrainData::create_flat(3, 3, 2.0, 5.0).unwrap();
        assert_eq!(terrain.heights.len(), 9);
        assert!(terrain.heights.iter().all(|&h| h == 5.0));
        assert!(terrain.water.iter().all(|&w| !w));
    }

    #[test]
    fn test_height_at_grid() {
        let terrain =
            TerrainData::new(2, 2, vec![0.0, 1.0, 2.0, 3.0], vec![false; 4], 1.0).unwrap();
        assert_eq!(terrain.height_at_grid(0, 0), Some(0.0));
        assert_eq!(terrain.height_at_grid(1, 0), Some(1.0));
        assert_eq!(terrain.height_at_grid(0, 1), Some(2.0));
        assert_eq!(terrain.height_at_grid(1, 1), Some(3.0));
        assert_eq!(terrain.height_at_grid(2, 0), None);
    }

    #[test]
    fn test_flood_rect() {
        let mut terrain = TerrainData::create_flat(8, 8, 1.0, 0.0).unwrap();
        terrain.flood_rect(2, 0, 4, 7);

        assert_eq!(terrain.water_at_grid(1, 3), Some(false));
        assert_eq!(terrain.water_at_grid(2, 3), Some(true));
        assert_eq!(terrain.water_at_grid(4, 7), Some(true));
        assert_eq!(terrain.water_at_grid(5, 0), Some(false));
    }

    #[test]
    fn test_flood_rect_clips_to_bounds() {
        let mut terrain = TerrainData::create_flat(4, 4, 1.0, 0.0).unwrap();
        terrain.flood_rect(2, 2, 100, 100);
        assert_eq!(terrain.water_at_grid(3, 3), Some(true));
        assert_eq!(terrain.water_at_grid(1, 1), Some(false));
    }

    #[test]
    fn test_raise_rect() {
        let mut terrain = TerrainData::create_flat(8, 8, 1.0, 0.0).unwrap();
        terrain.raise_rect(3, 0, 5, 7, 40.0);
        assert_eq!(terrain.height_at_grid(3, 4), Some(40.0));
        assert_eq!(terrain.height_at_grid(2, 4), Some(0.0));
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut terrain = TerrainData::create_flat(4, 4, 1.5, 2.0).unwrap();
        terrain.flood_rect(0, 0, 1, 1);

        let path = std::env::temp_dir().join("roadforge_test_terrain.bin");
        terrain.save_to_file(&path).unwrap();
        let loaded = TerrainData::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.width, 4);
        assert_eq!(loaded.scale, 1.5);
        assert_eq!(loaded.water_at_grid(0, 0), Some(true));
        assert_eq!(loaded.water_at_grid(2, 2), Some(false));
    }

    #[test]
    fn test_load_missing_file() {
        let result = TerrainData::load_from_file("/nonexistent/terrain.bin");
        assert!(matches!(
            result,
            Err(RoadforgeError::TerrainFileNotFound { .. })
        ));
    }
}
