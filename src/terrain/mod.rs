pub mod coordinates;
pub mod oracle;

pub use coordinates::GridPos;
pub use oracle::TerrainOracle;
