//! Procedural road and path network generation over height-mapped terrain.
//!
//! The crate routes between endpoints with an anisotropic bidirectional
//! least-cost search: candidate edges come from a coprime offset lattice,
//! every edge is priced against slope, curvature, water, bridge and tunnel
//! constraints from a [`profile::PriorityProfile`], and whole site sets are
//! linked into connected networks along a minimum spanning tree.

pub mod config;
pub mod errors;
pub mod map;
pub mod network;
pub mod profile;
pub mod search;
pub mod terrain;
pub mod terrain_generation;

pub use errors::{RoadforgeError, RoadforgeResult};
pub use map::TerrainData;
pub use network::{NetworkBudget, NetworkGenerator, RoadNetwork, Route};
pub use profile::{PriorityProfile, ProfileSet};
pub use search::{EdgeKind, SearchEngine, SearchState, SearchTuning, Waypoint};
pub use terrain::{GridPos, TerrainOracle};
