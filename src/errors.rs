use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoadforgeError {
    // Config-related errors
    #[error("Failed to get config directory")]
    ConfigDirNotFound,

    #[error("Failed to read or write file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize profiles: {0}")]
    ProfileSerializationFailed(#[from] toml::ser::Error),

    #[error("Failed to deserialize profiles: {0}")]
    ProfileDeserializationFailed(#[from] toml::de::Error),

    #[error("Invalid profile configuration: {reason}")]
    InvalidProfile { reason: String },

    #[error("Unknown priority tier {tier} ({available} tiers configured)")]
    UnknownPriorityTier { tier: usize, available: usize },

    // Terrain-related errors
    #[error("Invalid terrain data: {reason}")]
    InvalidTerrainData { reason: String },

    #[error("Terrain file not found at path: {path}")]
    TerrainFileNotFound { path: PathBuf },

    #[error("Corrupted terrain file: {reason}")]
    CorruptedTerrainFile { reason: String },

    #[error("Unknown terrain preset: {name}")]
    UnknownTerrainPreset { name: String },

    // Search-related errors
    #[error("Search endpoint ({x}, {z}) is outside the terrain")]
    EndpointOutOfBounds { x: i32, z: i32 },
}

/// Result type alias for all operations
pub type RoadforgeResult<T> = Result<T, RoadforgeError>;
