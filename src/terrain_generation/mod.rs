use crate::errors::{RoadforgeError, RoadforgeResult};
use crate::map::TerrainData;
use noise::{MultiFractal, NoiseFn, Perlin, RidgedMulti};

/// Terrain generation algorithms
#[derive(Debug, Clone)]
pub enum TerrainAlgorithm {
    Flat {
        height: f32,
    },
    Perlin {
        amplitude: f32,
        frequency: f32,
        octaves: u32,
    },
    Ridged {
        amplitude: f32,
        frequency: f32,
        octaves: u32,
    },
}

/// Heightmap + water-mask synthesizer for the demo binary and tests
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    pub seed: u32,
    pub algorithm: TerrainAlgorithm,
    /// Cells at or below this elevation become open water
    pub sea_level: f32,
}

impl TerrainGenerator {
    pub fn new(seed: u32, algorithm: TerrainAlgorithm, sea_level: f32) -> Self {
        Self {
            seed,
            algorithm,
            sea_level,
        }
    }

    /// Generate terrain using the configured algorithm
    pub fn generate(&self, width: u32, height: u32, scale: f32) -> RoadforgeResult<TerrainData> {
        let total_points = (width * height) as usize;
        let mut heights = Vec::with_capacity(total_points);

        match &self.algorithm {
            TerrainAlgorithm::Flat { height } => {
                heights.resize(total_points, *height);
            }
            TerrainAlgorithm::Perlin {
                amplitude,
                frequency,
                octaves,
            } => {
                let perlin = Perlin::new(self.seed);
                let freq_scale = scale as f64 * *frequency as f64;

                for z in 0..height {
                    let world_z = z as f64 * freq_scale;
                    for x in 0..width {
                        let world_x = x as f64 * freq_scale;

                        let mut noise_value = 0.0;
                        let mut current_amplitude = *amplitude as f64;
                        let mut current_frequency = 1.0;

                        for _ in 0..*octaves {
                            noise_value += perlin
                                .get([world_x * current_frequency, world_z * current_frequency])
                                * current_amplitude;
                            current_amplitude *= 0.5; // Persistence
                            current_frequency *= 2.0; // Lacunarity
                        }

                        heights.push(noise_value as f32);
                    }
                }
            }
            TerrainAlgorithm::Ridged {
                amplitude,
                frequency,
                octaves,
            } => {
                let ridged = RidgedMulti::<Perlin>::new(self.seed)
                    .set_octaves(*octaves as usize)
                    .set_frequency(*frequency as f64);

                for z in 0..height {
                    let world_z = z as f64 * scale as f64;
                    for x in 0..width {
                        let world_x = x as f64 * scale as f64;
                        heights.push((ridged.get([world_x, world_z]) * *amplitude as f64) as f32);
                    }
                }
            }
        }

        let water = heights.iter().map(|&h| h <= self.sea_level).collect();
        TerrainData::new(width, height, heights, water, scale)
    }
}

/// Get a predefined terrain preset
pub fn get_terrain_preset(name: &str, seed: u32, sea_level: f32) -> RoadforgeResult<TerrainGenerator> {
    let generator = match name {
        "flat" => TerrainGenerator::new(seed, TerrainAlgorithm::Flat { height: 0.0 }, sea_level),
        "hills" => TerrainGenerator::new(
            seed,
            TerrainAlgorithm::Perlin {
                amplitude: 15.0,
                frequency: 0.01,
                octaves: 4,
            },
            sea_level,
        ),
        "mountains" => TerrainGenerator::new(
            seed,
            TerrainAlgorithm::Ridged {
                amplitude: 20.0,
                frequency: 0.005,
                octaves: 5,
            },
            sea_level,
        ),
        "valleys" => TerrainGenerator::new(
            seed,
            TerrainAlgorithm::Ridged {
                amplitude: -20.0, // Negative amplitude creates valleys
                frequency: 0.008,
                octaves: 4,
            },
            sea_level,
        ),
        _ => {
            return Err(RoadforgeError::UnknownTerrainPreset {
                name: name.to_string(),
            });
        }
    };
    Ok(generator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_generation() {
        let generator = TerrainGenerator::new(7, TerrainAlgorithm::Flat { height: 2.0 }, 0.0);
        let terrain = generator.generate(8, 8, 1.0).unwrap();
        assert!(terrain.heights.iter().all(|&h| h == 2.0));
        assert!(terrain.water.iter().all(|&w| !w));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let generator = get_terrain_preset("hills", 42, -2.0).unwrap();
        let a = generator.generate(16, 16, 1.0).unwrap();
        let b = generator.generate(16, 16, 1.0).unwrap();
        assert_eq!(a.heights, b.heights);
        assert_eq!(a.water, b.water);
    }

    #[test]
    fn test_sea_level_marks_water() {
        // Flat terrain at 0.0 with sea level above it is entirely water
        let generator = TerrainGenerator::new(1, TerrainAlgorithm::Flat { height: 0.0 }, 1.0);
        let terrain = generator.generate(4, 4, 1.0).unwrap();
        assert!(terrain.water.iter().all(|&w| w));
    }

    #[test]
    fn test_unknown_preset() {
        assert!(matches!(
            get_terrain_preset("swamp", 1, 0.0),
            Err(RoadforgeError::UnknownTerrainPreset { .. })
        ));
    }

    #[test]
    fn test_mountains_preset_has_relief() {
        let generator = get_terrain_preset("mountains", 9, -100.0).unwrap();
        let terrain = generator.generate(32, 32, 1.0).unwrap();
        let min = terrain.heights.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = terrain
            .heights
            .iter()
            .cloned()
            .fold(f32::NEG_INFINITY, f32::max);
        assert!(max > min);
    }
}
