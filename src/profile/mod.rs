use crate::errors::{RoadforgeError, RoadforgeResult};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub mod limits;

pub use limits::{CostScale, SlopeLimitDeg, TurnLimitDeg};

/// Cost-limit profile for one network tier (highway vs. street vs. trail).
///
/// Every cost and neighbor-generation decision in the search reads its
/// limits from an explicit profile reference; there is no global settings
/// object.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PriorityProfile {
    pub name: String,

    pub max_slope_degrees: SlopeLimitDeg,
    pub max_turn_degrees: TurnLimitDeg,

    pub tunnel_cost_scale: CostScale,
    pub bridge_cost_scale: CostScale,

    /// Coprime-mask radius for surface candidates
    #[validate(range(min = 1, max = 8))]
    pub surface_mask_radius: i32,
    /// Lattice cells per surface mask step
    #[validate(range(min = 1, max = 64))]
    pub surface_resolution: i32,
    /// Maximum tunnel/bridge candidate radius, in resolution steps
    #[validate(range(min = 1, max = 16))]
    pub tunnel_mask_radius: i32,
    /// Lattice cells per tunnel/bridge step (also the minimum candidate radius)
    #[validate(range(min = 1, max = 64))]
    pub tunnel_resolution: i32,

    /// Minimum fraction of underground samples for a legal tunnel edge
    #[validate(range(min = 0.0, max = 1.0))]
    pub tunnel_depth_cutoff: f32,

    pub surface_enabled: bool,
    pub tunnels_enabled: bool,
    pub bridges_enabled: bool,
    /// Allow the two frontiers to join at a shared closed cell
    pub meet_in_middle: bool,
}

impl PriorityProfile {
    /// The smallest lattice step among the enabled candidate families.
    /// Goal-proximity termination is scaled by this value.
    pub fn min_lattice_resolution(&self) -> i32 {
        let mut min = i32::MAX;
        if self.surface_enabled {
            min = min.min(self.surface_resolution);
        }
        if self.tunnels_enabled || self.bridges_enabled {
            min = min.min(self.tunnel_resolution);
        }
        if min == i32::MAX {
            // Validation rejects profiles with every family disabled
            min = self.surface_resolution;
        }
        min
    }

    fn check(&self) -> RoadforgeResult<()> {
        self.validate().map_err(|e| RoadforgeError::InvalidProfile {
            reason: format!("profile '{}': {e}", self.name),
        })?;
        if !self.surface_enabled && !self.tunnels_enabled && !self.bridges_enabled {
            return Err(RoadforgeError::InvalidProfile {
                reason: format!("profile '{}': every edge family is disabled", self.name),
            });
        }
        Ok(())
    }
}

/// Ordered set of priority profiles, indexed by tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSet {
    pub profiles: Vec<PriorityProfile>,
}

impl ProfileSet {
    /// Look up a tier. A missing tier is a configuration error, surfaced
    /// immediately rather than retried.
    pub fn get(&self, tier: usize) -> RoadforgeResult<&PriorityProfile> {
        self.profiles
            .get(tier)
            .ok_or(RoadforgeError::UnknownPriorityTier {
                tier,
                available: self.profiles.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Validate every profile, failing fast on the first bad entry
    pub fn check(&self) -> RoadforgeResult<()> {
        if self.profiles.is_empty() {
            return Err(RoadforgeError::InvalidProfile {
                reason: "profile set is empty".to_string(),
            });
        }
        for profile in &self.profiles {
            profile.check()?;
        }
        Ok(())
    }
}

impl Default for ProfileSet {
    fn default() -> Self {
        Self {
            profiles: vec![
                PriorityProfile {
                    name: "highway".to_string(),
                    max_slope_degrees: SlopeLimitDeg::new(6.0),
                    max_turn_degrees: TurnLimitDeg::new(30.0),
                    tunnel_cost_scale: CostScale::new(4.0),
                    bridge_cost_scale: CostScale::new(2.0),
                    surface_mask_radius: 3,
                    surface_resolution: 8,
                    tunnel_mask_radius: 4,
                    tunnel_resolution: 6,
                    tunnel_depth_cutoff: 0.6,
                    surface_enabled: true,
                    tunnels_enabled: true,
                    bridges_enabled: true,
                    meet_in_middle: true,
                },
                PriorityProfile {
                    name: "street".to_string(),
                    max_slope_degrees: SlopeLimitDeg::new(12.0),
                    max_turn_degrees: TurnLimitDeg::new(60.0),
                    tunnel_cost_scale: CostScale::new(8.0),
                    bridge_cost_scale: CostScale::new(3.0),
                    surface_mask_radius: 3,
                    surface_resolution: 4,
                    tunnel_mask_radius: 4,
                    tunnel_resolution: 4,
                    tunnel_depth_cutoff: 0.6,
                    surface_enabled: true,
                    tunnels_enabled: false,
                    bridges_enabled: true,
                    meet_in_middle: true,
                },
                PriorityProfile {
                    name: "trail".to_string(),
                    max_slope_degrees: SlopeLimitDeg::new(25.0),
                    max_turn_degrees: TurnLimitDeg::new(90.0),
                    tunnel_cost_scale: CostScale::default(),
                    bridge_cost_scale: CostScale::default(),
                    surface_mask_radius: 2,
                    surface_resolution: 2,
                    tunnel_mask_radius: 2,
                    tunnel_resolution: 2,
                    tunnel_depth_cutoff: 0.6,
                    surface_enabled: true,
                    tunnels_enabled: false,
                    bridges_enabled: false,
                    meet_in_middle: false,
                },
            ],
        }
    }
}
