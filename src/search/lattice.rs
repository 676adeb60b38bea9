//! Candidate generation over the coprime offset lattice.
//!
//! Surface neighbors come from a deterministic coprime mask scaled by the
//! profile resolution, so no two offsets are collinear and the branching
//! factor stays flat as the radius grows. Tunnel and bridge candidates are
//! sampled radially at random, which keeps long spans affordable without
//! enumerating every cell in a large disk.

use crate::profile::PriorityProfile;
use crate::search::cost::{self, EdgePoint};
use crate::search::node::EdgeKind;
use crate::terrain::{GridPos, TerrainOracle};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::collections::HashMap;
use std::f32::consts::TAU;

/// Radial samples attempted per expansion for each long-span family
const SPAN_ATTEMPTS: usize = 12;

/// Integer offsets within `radius` whose components are coprime. Excludes
/// the origin, and with it every collinear multiple of a shorter offset.
pub fn coprime_mask(radius: i32) -> Vec<(i32, i32)> {
    let mut offsets = Vec::new();
    for i in -radius..=radius {
        for j in -radius..=radius {
            if i == 0 && j == 0 {
                continue;
            }
            if gcd(i.unsigned_abs(), j.unsigned_abs()) == 1 {
                offsets.push((i, j));
            }
        }
    }
    offsets
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 { a } else { gcd(b, a % b) }
}

/// A legal candidate edge out of the current node
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub position: GridPos,
    pub elevation: f32,
    pub kind: EdgeKind,
    pub edge_cost: f32,
}

/// Produces priced candidate edges for one search run. Owns the seeded
/// generator for radial sampling, so identical seeds reproduce identical
/// searches.
pub struct NeighborGenerator {
    rng: Pcg64,
    masks: HashMap<i32, Vec<(i32, i32)>>,
}

impl NeighborGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
            masks: HashMap::new(),
        }
    }

    /// All legal candidates out of `current`, across the edge families the
    /// profile enables
    pub fn candidates(
        &mut self,
        oracle: &impl TerrainOracle,
        profile: &PriorityProfile,
        prev: Option<EdgePoint>,
        current: EdgePoint,
    ) -> Vec<Candidate> {
        let mut out = Vec::new();

        if profile.surface_enabled {
            let resolution = profile.surface_resolution;
            let mask = self
                .masks
                .entry(profile.surface_mask_radius)
                .or_insert_with(|| coprime_mask(profile.surface_mask_radius));
            for &(i, j) in mask.iter() {
                let position = current.position.offset(i * resolution, j * resolution);
                let Some(elevation) =
                    oracle.elevation_at(position.x as f32, position.z as f32)
                else {
                    continue;
                };
                // Surface routes follow the ground
                let candidate = EdgePoint::new(position, elevation);
                if let Some(edge_cost) =
                    cost::surface_cost(oracle, prev, current, candidate, profile)
                {
                    out.push(Candidate {
                        position,
                        elevation,
                        kind: EdgeKind::Surface,
                        edge_cost,
                    });
                }
            }
        }

        if profile.tunnels_enabled {
            self.span_candidates(
                oracle,
                profile,
                prev,
                current,
                EdgeKind::Tunnel,
                &mut out,
            );
        }
        if profile.bridges_enabled {
            self.span_candidates(
                oracle,
                profile,
                prev,
                current,
                EdgeKind::Bridge,
                &mut out,
            );
        }

        out
    }

    /// Radially sampled long-span candidates. Spans keep the current path
    /// elevation: a tunnel bores level into rising ground, a bridge deck
    /// stays level over the water it crosses.
    fn span_candidates(
        &mut self,
        oracle: &impl TerrainOracle,
        profile: &PriorityProfile,
        prev: Option<EdgePoint>,
        current: EdgePoint,
        kind: EdgeKind,
        out: &mut Vec<Candidate>,
    ) {
        let min_radius = profile.tunnel_resolution as f32;
        let max_radius = (profile.tunnel_resolution * profile.tunnel_mask_radius) as f32;

        for _ in 0..SPAN_ATTEMPTS {
            let radius = self.rng.gen_range(min_radius..=max_radius);
            let angle = self.rng.gen_range(0.0..TAU);
            let dx = (radius * angle.cos()).round() as i32;
            let dz = (radius * angle.sin()).round() as i32;
            if dx == 0 && dz == 0 {
                continue;
            }

            let position = current.position.offset(dx, dz);
            let candidate = EdgePoint::new(position, current.elevation);
            let edge_cost = match kind {
                EdgeKind::Tunnel => {
                    cost::tunnel_cost(oracle, prev, current, candidate, profile)
                }
                EdgeKind::Bridge => {
                    cost::bridge_cost(oracle, prev, current, candidate, profile)
                }
                EdgeKind::Surface => unreachable!("surface edges use the coprime mask"),
            };
            if let Some(edge_cost) = edge_cost {
                out.push(Candidate {
                    position,
                    elevation: current.elevation,
                    kind,
                    edge_cost,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::TerrainData;
    use crate::profile::ProfileSet;

    #[test]
    fn test_mask_excludes_origin_and_multiples() {
        let mask = coprime_mask(3);
        assert!(!mask.contains(&(0, 0)));
        assert!(mask.contains(&(1, 0)));
        assert!(mask.contains(&(2, 3)));
        assert!(mask.contains(&(-3, 2)));
        // Collinear multiples of shorter offsets are absent
        assert!(!mask.contains(&(2, 0)));
        assert!(!mask.contains(&(2, 2)));
        assert!(!mask.contains(&(-2, 2)));
        assert!(!mask.contains(&(3, 3)));
    }

    #[test]
    fn test_mask_components_are_coprime() {
        for (i, j) in coprime_mask(5) {
            assert_eq!(gcd(i.unsigned_abs(), j.unsigned_abs()), 1, "({i}, {j})");
        }
    }

    #[test]
    fn test_mask_radius_one_is_eight_connected() {
        let mut mask = coprime_mask(1);
        mask.sort();
        assert_eq!(mask.len(), 8);
    }

    #[test]
    fn test_flat_terrain_surface_candidates() {
        let terrain = TerrainData::create_flat(64, 64, 1.0, 0.0).unwrap();
        let profile = ProfileSet::default().profiles.remove(2);
        let mut generator = NeighborGenerator::new(1);

        let current = EdgePoint::new(GridPos::new(32, 32), 0.0);
        let candidates = generator.candidates(&terrain, &profile, None, current);

        // Far from the border every mask offset is legal on flat ground
        let mask_size = coprime_mask(profile.surface_mask_radius).len();
        assert_eq!(candidates.len(), mask_size);
        for c in &candidates {
            assert_eq!(c.kind, EdgeKind::Surface);
            assert_eq!(c.elevation, 0.0);
            assert!(c.edge_cost > 0.0);
        }
    }

    #[test]
    fn test_candidates_near_border_are_clipped() {
        let terrain = TerrainData::create_flat(64, 64, 1.0, 0.0).unwrap();
        let profile = ProfileSet::default().profiles.remove(2);
        let mut generator = NeighborGenerator::new(1);

        let corner = EdgePoint::new(GridPos::new(0, 0), 0.0);
        let candidates = generator.candidates(&terrain, &profile, None, corner);
        let mask_size = coprime_mask(profile.surface_mask_radius).len();
        assert!(!candidates.is_empty());
        assert!(candidates.len() < mask_size);
        for c in &candidates {
            assert!(c.position.x >= 0 && c.position.z >= 0);
        }
    }

    #[test]
    fn test_same_seed_same_candidates() {
        let mut terrain = TerrainData::create_flat(64, 64, 1.0, 0.0).unwrap();
        terrain.flood_rect(40, 0, 46, 63);
        let mut profile = ProfileSet::default().profiles.remove(1);
        profile.bridges_enabled = true;

        let current = EdgePoint::new(GridPos::new(36, 32), 0.0);
        let mut a = NeighborGenerator::new(99);
        let mut b = NeighborGenerator::new(99);
        let ca = a.candidates(&terrain, &profile, None, current);
        let cb = b.candidates(&terrain, &profile, None, current);

        assert_eq!(ca.len(), cb.len());
        for (x, y) in ca.iter().zip(cb.iter()) {
            assert_eq!(x.position, y.position);
            assert_eq!(x.kind, y.kind);
            assert_eq!(x.edge_cost, y.edge_cost);
        }
    }
}
