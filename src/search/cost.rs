//! Anisotropic edge pricing.
//!
//! Every function here prices a single candidate edge given the previous
//! point (for curvature), the current point and the candidate endpoint.
//! `None` means the edge is illegal under the profile; `Some(cost)` is a
//! finite, non-negative cost in world units plus penalty terms.

use crate::profile::PriorityProfile;
use crate::terrain::{GridPos, TerrainOracle};

/// Interior samples taken along each candidate edge
pub const EDGE_SAMPLES: usize = 10;

/// Overburden below which a sample does not count as underground, in world
/// units. Filters out grazing cut-and-cover noise near tunnel portals.
pub const MIN_TUNNEL_DEPTH: f32 = 0.5;

/// Tolerance when comparing a path elevation against the ground
const ELEVATION_EPSILON: f32 = 1e-3;

/// A lattice position with the path elevation the route holds there
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePoint {
    pub position: GridPos,
    pub elevation: f32,
}

impl EdgePoint {
    pub fn new(position: GridPos, elevation: f32) -> Self {
        Self {
            position,
            elevation,
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Float grid coordinates of the point at parameter `t` along the edge
fn sample_position(from: GridPos, to: GridPos, t: f32) -> (f32, f32) {
    (
        lerp(from.x as f32, to.x as f32, t),
        lerp(from.z as f32, to.z as f32, t),
    )
}

fn finite(cost: f32) -> Option<f32> {
    cost.is_finite().then_some(cost)
}

/// Grade penalty for the segment `from -> to`, normalized by the profile
/// limit. Rejects segments at or above the slope limit, and zero-length
/// segments outright (their grade is undefined).
pub fn slope_cost(
    from: EdgePoint,
    to: EdgePoint,
    cell_size: f32,
    profile: &PriorityProfile,
) -> Option<f32> {
    let flat = from.position.distance_cells(&to.position) * cell_size;
    if flat <= f32::EPSILON {
        return None;
    }
    let degrees = (to.elevation - from.elevation).abs().atan2(flat).to_degrees();
    let limit = profile.max_slope_degrees.get();
    if !degrees.is_finite() || degrees >= limit {
        return None;
    }
    Some(degrees / limit)
}

/// Curvature penalty for turning at `current` from the incoming direction
/// `prev -> current` onto `current -> candidate`, measured in the horizontal
/// plane. A route root has no incoming direction and turns for free.
pub fn turn_cost(
    prev: Option<EdgePoint>,
    current: EdgePoint,
    candidate: EdgePoint,
    profile: &PriorityProfile,
) -> Option<f32> {
    let Some(prev) = prev else {
        return Some(0.0);
    };

    let in_x = (current.position.x - prev.position.x) as f32;
    let in_z = (current.position.z - prev.position.z) as f32;
    let out_x = (candidate.position.x - current.position.x) as f32;
    let out_z = (candidate.position.z - current.position.z) as f32;
    if (in_x == 0.0 && in_z == 0.0) || (out_x == 0.0 && out_z == 0.0) {
        return None;
    }

    let dot = in_x * out_x + in_z * out_z;
    let cross = in_x * out_z - in_z * out_x;
    let degrees = cross.abs().atan2(dot).to_degrees();
    if !degrees.is_finite() || degrees > profile.max_turn_degrees.get() {
        return None;
    }
    Some(degrees / 180.0)
}

/// Price a surface edge. The route follows the ground, so the cost is the
/// terrain-following arc length plus slope and turn penalties. Illegal when
/// any sample is over water, when the candidate endpoint would sit below
/// ground, or when a penalty term rejects.
pub fn surface_cost(
    oracle: &impl TerrainOracle,
    prev: Option<EdgePoint>,
    current: EdgePoint,
    candidate: EdgePoint,
    profile: &PriorityProfile,
) -> Option<f32> {
    let ground = oracle.elevation_at(candidate.position.x as f32, candidate.position.z as f32)?;
    if candidate.elevation < ground - ELEVATION_EPSILON {
        return None;
    }

    let cell = oracle.cell_size();
    let slope = slope_cost(current, candidate, cell, profile)?;
    let turn = turn_cost(prev, current, candidate, profile)?;

    let flat_step = current.position.distance_cells(&candidate.position) * cell
        / EDGE_SAMPLES as f32;
    let mut length = 0.0;
    let mut previous_height = current.elevation;
    for i in 1..=EDGE_SAMPLES {
        let t = i as f32 / EDGE_SAMPLES as f32;
        let (sx, sz) = sample_position(current.position, candidate.position, t);
        if oracle.is_over_water(sx, sz) {
            return None;
        }
        let height = oracle.elevation_at(sx, sz)?;
        let rise = height - previous_height;
        length += (flat_step * flat_step + rise * rise).sqrt();
        previous_height = height;
    }

    finite(length + slope + turn)
}

/// Price a tunnel edge. The route runs straight from the current elevation
/// to the candidate elevation; enough of it must sit below ground, and the
/// cost integrates the overburden above the bore.
pub fn tunnel_cost(
    oracle: &impl TerrainOracle,
    prev: Option<EdgePoint>,
    current: EdgePoint,
    candidate: EdgePoint,
    profile: &PriorityProfile,
) -> Option<f32> {
    let cell = oracle.cell_size();
    let slope = slope_cost(current, candidate, cell, profile)?;
    let turn = turn_cost(prev, current, candidate, profile)?;

    let mut depth_total = 0.0;
    let mut underground = 0;
    for i in 1..=EDGE_SAMPLES {
        let t = i as f32 / EDGE_SAMPLES as f32;
        let (sx, sz) = sample_position(current.position, candidate.position, t);
        let ground = oracle.elevation_at(sx, sz)?;
        let bore = lerp(current.elevation, candidate.elevation, t);
        let depth = ground - bore;
        if depth > MIN_TUNNEL_DEPTH {
            underground += 1;
            depth_total += depth;
        }
    }

    let fraction = underground as f32 / EDGE_SAMPLES as f32;
    if fraction < profile.tunnel_depth_cutoff {
        return None;
    }

    finite(depth_total * profile.tunnel_cost_scale.get() + slope + turn)
}

/// Price a bridge edge. Every interior sample must be over water; the
/// candidate endpoint itself may be dry land, so a single span can land on
/// the far shore. The water fraction over all samples scales the deck cost.
pub fn bridge_cost(
    oracle: &impl TerrainOracle,
    prev: Option<EdgePoint>,
    current: EdgePoint,
    candidate: EdgePoint,
    profile: &PriorityProfile,
) -> Option<f32> {
    let cell = oracle.cell_size();
    let slope = slope_cost(current, candidate, cell, profile)?;
    let turn = turn_cost(prev, current, candidate, profile)?;

    let mut wet = 0;
    for i in 1..=EDGE_SAMPLES {
        let t = i as f32 / EDGE_SAMPLES as f32;
        let (sx, sz) = sample_position(current.position, candidate.position, t);
        if !oracle.in_bounds(sx, sz) {
            return None;
        }
        if oracle.is_over_water(sx, sz) {
            wet += 1;
        } else if i < EDGE_SAMPLES {
            return None;
        }
    }

    let fraction = wet as f32 / EDGE_SAMPLES as f32;
    finite((1.0 + 10.0 * fraction) * profile.bridge_cost_scale.get() + slope + turn)
}

/// Whether a route may pass through `joint` between the optional incoming
/// point and the outgoing point. Used when splicing chains together at a
/// goal endpoint or a frontier meeting cell, where the joint never priced a
/// real edge.
pub fn joint_legal(
    profile: &PriorityProfile,
    cell_size: f32,
    prev: Option<EdgePoint>,
    joint: EdgePoint,
    next: EdgePoint,
) -> bool {
    if let Some(prev) = prev {
        if slope_cost(prev, joint, cell_size, profile).is_none() {
            return false;
        }
    }
    slope_cost(joint, next, cell_size, profile).is_some()
        && turn_cost(prev, joint, next, profile).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::TerrainData;
    use crate::profile::ProfileSet;

    fn test_profile() -> PriorityProfile {
        let mut profile = ProfileSet::default().profiles.remove(2);
        profile.max_slope_degrees = crate::profile::SlopeLimitDeg::new(30.0);
        profile.max_turn_degrees = crate::profile::TurnLimitDeg::new(90.0);
        profile
    }

    fn point(x: i32, z: i32, elevation: f32) -> EdgePoint {
        EdgePoint::new(GridPos::new(x, z), elevation)
    }

    #[test]
    fn test_slope_cost_normalized_by_limit() {
        let profile = test_profile();
        // 10 cells flat, no rise
        let flat = slope_cost(point(0, 0, 0.0), point(10, 0, 0.0), 1.0, &profile);
        assert_eq!(flat, Some(0.0));

        // 15 degree grade against a 30 degree limit
        let rise = 10.0 * 15.0f32.to_radians().tan();
        let graded = slope_cost(point(0, 0, 0.0), point(10, 0, rise), 1.0, &profile);
        assert!((graded.unwrap() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_slope_cost_rejects_at_limit() {
        let profile = test_profile();
        let rise = 10.0 * 30.0f32.to_radians().tan();
        assert_eq!(
            slope_cost(point(0, 0, 0.0), point(10, 0, rise + 0.1), 1.0, &profile),
            None
        );
    }

    #[test]
    fn test_slope_cost_rejects_zero_length() {
        let profile = test_profile();
        assert_eq!(slope_cost(point(3, 3, 0.0), point(3, 3, 5.0), 1.0, &profile), None);
    }

    #[test]
    fn test_turn_cost_straight_and_right_angle() {
        let profile = test_profile();
        let straight = turn_cost(
            Some(point(0, 0, 0.0)),
            point(5, 0, 0.0),
            point(10, 0, 0.0),
            &profile,
        );
        assert_eq!(straight, Some(0.0));

        let right = turn_cost(
            Some(point(0, 0, 0.0)),
            point(5, 0, 0.0),
            point(5, 5, 0.0),
            &profile,
        );
        assert!((right.unwrap() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_turn_cost_rejects_over_limit() {
        let profile = test_profile();
        // Reversal: 180 degrees against a 90 degree limit
        assert_eq!(
            turn_cost(
                Some(point(0, 0, 0.0)),
                point(5, 0, 0.0),
                point(0, 0, 0.0),
                &profile
            ),
            None
        );
    }

    #[test]
    fn test_turn_cost_free_at_route_root() {
        let profile = test_profile();
        assert_eq!(
            turn_cost(None, point(5, 0, 0.0), point(0, 0, 0.0), &profile),
            Some(0.0)
        );
    }

    #[test]
    fn test_surface_cost_on_flat_terrain_is_length() {
        let terrain = TerrainData::create_flat(32, 32, 1.0, 0.0).unwrap();
        let profile = test_profile();
        let cost = surface_cost(&terrain, None, point(5, 5, 0.0), point(15, 5, 0.0), &profile);
        assert!((cost.unwrap() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_surface_cost_rejects_water() {
        let mut terrain = TerrainData::create_flat(32, 32, 1.0, 0.0).unwrap();
        terrain.flood_rect(10, 0, 10, 31);
        let profile = test_profile();
        assert_eq!(
            surface_cost(&terrain, None, point(5, 5, 0.0), point(15, 5, 0.0), &profile),
            None
        );
    }

    #[test]
    fn test_surface_cost_rejects_below_ground() {
        let terrain = TerrainData::create_flat(32, 32, 1.0, 5.0).unwrap();
        let profile = test_profile();
        assert_eq!(
            surface_cost(&terrain, None, point(5, 5, 5.0), point(15, 5, 1.0), &profile),
            None
        );
    }

    #[test]
    fn test_surface_cost_rejects_out_of_bounds() {
        let terrain = TerrainData::create_flat(16, 16, 1.0, 0.0).unwrap();
        let profile = test_profile();
        assert_eq!(
            surface_cost(&terrain, None, point(10, 5, 0.0), point(20, 5, 0.0), &profile),
            None
        );
    }

    #[test]
    fn test_tunnel_cost_requires_depth_fraction() {
        // Ridge across x in [8, 16], 40 units tall
        let mut terrain = TerrainData::create_flat(32, 32, 1.0, 0.0).unwrap();
        terrain.raise_rect(8, 0, 16, 31, 40.0);
        let mut profile = test_profile();
        profile.tunnels_enabled = true;
        profile.tunnel_depth_cutoff = 0.6;

        // Bore from the flat apron straight through the ridge
        let through = tunnel_cost(&terrain, None, point(6, 5, 0.0), point(17, 5, 0.0), &profile);
        assert!(through.is_some());
        assert!(through.unwrap() > 0.0);

        // A bore over open ground never reaches the cutoff
        let open = tunnel_cost(&terrain, None, point(20, 5, 0.0), point(30, 5, 0.0), &profile);
        assert_eq!(open, None);
    }

    #[test]
    fn test_tunnel_cost_scales_with_overburden() {
        let mut terrain = TerrainData::create_flat(32, 32, 1.0, 0.0).unwrap();
        terrain.raise_rect(0, 0, 31, 31, 10.0);
        let mut profile = test_profile();
        profile.tunnel_depth_cutoff = 0.6;
        profile.tunnel_cost_scale = crate::profile::CostScale::new(1.0);

        // Level bore 10 units down: every sample has depth 10
        let cost = tunnel_cost(&terrain, None, point(5, 5, 0.0), point(15, 5, 0.0), &profile);
        assert!((cost.unwrap() - 100.0).abs() < 1e-2);
    }

    #[test]
    fn test_bridge_cost_spans_water_to_far_shore() {
        // Water band x in [10, 18]
        let mut terrain = TerrainData::create_flat(32, 32, 1.0, 0.0).unwrap();
        terrain.flood_rect(10, 0, 18, 31);
        let mut profile = test_profile();
        profile.bridges_enabled = true;
        profile.bridge_cost_scale = crate::profile::CostScale::new(1.0);

        // 9 of 10 samples wet, the landing endpoint is dry
        let cost = bridge_cost(&terrain, None, point(9, 5, 0.0), point(19, 5, 0.0), &profile);
        assert!((cost.unwrap() - (1.0 + 10.0 * 0.9)).abs() < 1e-3);
    }

    #[test]
    fn test_bridge_cost_rejects_dry_interior() {
        let mut terrain = TerrainData::create_flat(32, 32, 1.0, 0.0).unwrap();
        terrain.flood_rect(10, 0, 12, 31);
        let profile = test_profile();
        // Samples beyond x=12 are dry land mid-span
        assert_eq!(
            bridge_cost(&terrain, None, point(9, 5, 0.0), point(25, 5, 0.0), &profile),
            None
        );
    }

    #[test]
    fn test_joint_legal_checks_both_segments_and_turn() {
        let terrain = TerrainData::create_flat(32, 32, 1.0, 0.0).unwrap();
        let profile = test_profile();
        let cell = terrain.cell_size();

        assert!(joint_legal(
            &profile,
            cell,
            Some(point(0, 0, 0.0)),
            point(5, 0, 0.0),
            point(10, 0, 0.0)
        ));
        // Reversal at the joint violates the turn limit
        assert!(!joint_legal(
            &profile,
            cell,
            Some(point(0, 0, 0.0)),
            point(5, 0, 0.0),
            point(1, 0, 0.0)
        ));
        // A cliff on the outgoing segment violates the slope limit
        assert!(!joint_legal(
            &profile,
            cell,
            None,
            point(5, 0, 0.0),
            point(6, 0, 50.0)
        ));
    }
}
