//! Anisotropic, bidirectional least-cost lattice search.
//!
//! The engine expands two frontiers (from the start and from the goal) over
//! a coprime-offset lattice, pricing every candidate edge against the
//! terrain with slope, curvature, water, bridge and tunnel constraints, and
//! joins the frontiers as soon as a legal meeting point exists.

pub mod cost;
pub mod engine;
pub mod frontier;
pub mod lattice;
pub mod node;

pub use engine::{SearchEngine, SearchState, SearchTuning, Waypoint};
pub use node::{EdgeKind, NodeId, SearchNode};
