//! Resumable bidirectional search over the candidate lattice.
//!
//! The engine owns two frontiers rooted at the start and the goal and
//! advances them one pop at a time, alternating strictly. The host drives
//! it with [`SearchEngine::step`] batches, so a long search never blocks a
//! frame or a request handler.

use crate::errors::{RoadforgeError, RoadforgeResult};
use crate::map::TerrainData;
use crate::profile::{PriorityProfile, ProfileSet};
use crate::search::cost::{self, EdgePoint};
use crate::search::frontier::PriorityFrontier;
use crate::search::lattice::NeighborGenerator;
use crate::search::node::{EdgeKind, NodeArena, NodeId, SearchNode};
use crate::terrain::{GridPos, TerrainOracle};
use glam::Vec3;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Lifecycle of one search run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// No run in progress; ready for `start_search`
    Idle,
    /// Both frontiers active, stepping makes progress
    Running,
    /// A legal route exists; `solution` holds it
    Solved,
    /// Every open node in both frontiers was expanded without a join
    Exhausted,
}

/// Weights blending the straight-line heuristic against accumulated cost.
/// Raising `distance_weight` above `cost_weight` makes the search greedier
/// and faster at the price of route quality.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchTuning {
    pub distance_weight: f32,
    pub cost_weight: f32,
}

impl Default for SearchTuning {
    fn default() -> Self {
        Self {
            distance_weight: 1.0,
            cost_weight: 1.0,
        }
    }
}

/// One point of a finished route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: GridPos,
    pub elevation: f32,
    /// How the route crosses the terrain at this waypoint
    pub kind: EdgeKind,
}

impl Waypoint {
    /// Centered world-space position, with the path elevation as Y
    pub fn world_position(&self, terrain: &TerrainData) -> Vec3 {
        let (x, z) = self.position.to_world_xz(terrain);
        Vec3::new(x, self.elevation, z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Bidirectional anisotropic least-cost searcher over a profile set
pub struct SearchEngine {
    profiles: ProfileSet,
    /// Profile of the current run; present whenever a run was started
    profile: Option<PriorityProfile>,
    tuning: SearchTuning,
    arena: NodeArena,
    forward: PriorityFrontier,
    backward: PriorityFrontier,
    generator: NeighborGenerator,
    state: SearchState,
    start: GridPos,
    goal: GridPos,
    start_elevation: f32,
    goal_elevation: f32,
    solution: Option<Vec<Waypoint>>,
}

impl SearchEngine {
    pub fn new(profiles: ProfileSet, tuning: SearchTuning, seed: u64) -> Self {
        Self {
            profiles,
            profile: None,
            tuning,
            arena: NodeArena::new(),
            forward: PriorityFrontier::new(),
            backward: PriorityFrontier::new(),
            generator: NeighborGenerator::new(seed),
            state: SearchState::Idle,
            start: GridPos::new(0, 0),
            goal: GridPos::new(0, 0),
            start_elevation: 0.0,
            goal_elevation: 0.0,
            solution: None,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn is_solved(&self) -> bool {
        self.state == SearchState::Solved
    }

    /// The finished route, start to goal, once the state is `Solved`
    pub fn solution(&self) -> Option<&[Waypoint]> {
        self.solution.as_deref()
    }

    pub fn open_nodes(&self) -> usize {
        self.forward.open_len() + self.backward.open_len()
    }

    pub fn closed_nodes(&self) -> usize {
        self.forward.closed_len() + self.backward.closed_len()
    }

    /// Return to `Idle`, dropping all run state. Safe to call in any state,
    /// any number of times.
    pub fn reset(&mut self) {
        self.arena.clear();
        self.forward.clear();
        self.backward.clear();
        self.profile = None;
        self.solution = None;
        self.state = SearchState::Idle;
    }

    /// Cancel a running search without a solution
    pub fn stop(&mut self) {
        if self.state == SearchState::Running {
            info!(
                "Search stopped after {} expansions",
                self.closed_nodes()
            );
        }
        self.reset();
    }

    /// Begin a run between two endpoints under one priority tier. Any
    /// previous run is discarded. An unknown tier or an out-of-bounds
    /// endpoint fails fast; a degenerate request with `start == goal`
    /// solves immediately.
    pub fn start_search(
        &mut self,
        oracle: &impl TerrainOracle,
        start: GridPos,
        goal: GridPos,
        tier: usize,
    ) -> RoadforgeResult<()> {
        self.reset();
        let profile = self.profiles.get(tier)?.clone();

        let start_elevation = oracle
            .elevation_at(start.x as f32, start.z as f32)
            .ok_or(RoadforgeError::EndpointOutOfBounds {
                x: start.x,
                z: start.z,
            })?;
        let goal_elevation = oracle
            .elevation_at(goal.x as f32, goal.z as f32)
            .ok_or(RoadforgeError::EndpointOutOfBounds { x: goal.x, z: goal.z })?;

        self.start = start;
        self.goal = goal;
        self.start_elevation = start_elevation;
        self.goal_elevation = goal_elevation;

        info!(
            "Search started: ({}, {}) -> ({}, {}), profile '{}'",
            start.x, start.z, goal.x, goal.z, profile.name
        );
        self.profile = Some(profile);

        if start == goal {
            self.solution = Some(vec![Waypoint {
                position: start,
                elevation: start_elevation,
                kind: EdgeKind::Surface,
            }]);
            self.state = SearchState::Solved;
            info!("Search for ({}, {}) onto itself solved trivially", start.x, start.z);
            return Ok(());
        }

        let distance = start.distance_cells(&goal) * oracle.cell_size();
        let priority = self.tuning.distance_weight * distance;
        let root = |position, elevation| SearchNode {
            position,
            elevation,
            parent: None,
            cumulative_cost: 0.0,
            heuristic: distance,
            weighted_priority: priority,
            kind: EdgeKind::Surface,
            is_root: true,
        };
        let forward_root = self.arena.insert(root(start, start_elevation));
        self.forward.push(forward_root, priority);
        let backward_root = self.arena.insert(root(goal, goal_elevation));
        self.backward.push(backward_root, priority);

        self.state = SearchState::Running;
        Ok(())
    }

    /// Advance both frontiers by up to `batch` expansions each. Returns the
    /// state after the batch; calling in a terminal state is a no-op.
    pub fn step(&mut self, oracle: &impl TerrainOracle, batch: usize) -> SearchState {
        self.step_observed(oracle, batch, &mut |_| {})
    }

    /// Like [`step`](Self::step), invoking the observer for every node the
    /// batch settles. Useful for visualization and debugging hosts.
    pub fn step_observed(
        &mut self,
        oracle: &impl TerrainOracle,
        batch: usize,
        on_settled: &mut dyn FnMut(&SearchNode),
    ) -> SearchState {
        if self.state != SearchState::Running {
            return self.state;
        }
        // Running implies a run was started, which set the profile
        let Some(profile) = self.profile.clone() else {
            return self.state;
        };

        for _ in 0..batch {
            let forward_advanced = self.advance(oracle, &profile, Direction::Forward, on_settled);
            if self.state != SearchState::Running {
                break;
            }
            let backward_advanced =
                self.advance(oracle, &profile, Direction::Backward, on_settled);
            if self.state != SearchState::Running {
                break;
            }
            if !forward_advanced && !backward_advanced {
                warn!(
                    "Search exhausted after {} expansions without a route",
                    self.closed_nodes()
                );
                self.state = SearchState::Exhausted;
                break;
            }
        }

        debug!(
            "Search tick: {} open, {} closed, state {:?}",
            self.open_nodes(),
            self.closed_nodes(),
            self.state
        );
        self.state
    }

    /// Step until the run leaves `Running` or `max_ticks` batches elapse.
    /// Returns the resulting state, which is still `Running` when the tick
    /// budget ran out first.
    pub fn run_to_completion(
        &mut self,
        oracle: &impl TerrainOracle,
        batch: usize,
        max_ticks: usize,
    ) -> SearchState {
        for _ in 0..max_ticks {
            if self.step(oracle, batch) != SearchState::Running {
                break;
            }
        }
        self.state
    }

    /// Settle the best open node of one frontier: terminate against the
    /// target or the opposite frontier if legal, otherwise expand. Returns
    /// false when the frontier had no live open node.
    fn advance(
        &mut self,
        oracle: &impl TerrainOracle,
        profile: &PriorityProfile,
        direction: Direction,
        on_settled: &mut dyn FnMut(&SearchNode),
    ) -> bool {
        let cell = oracle.cell_size();
        let (target, target_elevation) = match direction {
            Direction::Forward => (self.goal, self.goal_elevation),
            Direction::Backward => (self.start, self.start_elevation),
        };

        // Pop past stale heap entries for positions already settled
        let node_id = loop {
            let Some(id) = self.frontier_mut(direction).pop_open() else {
                return false;
            };
            let position = self.arena.get(id).position;
            if !self.frontier(direction).is_closed(&position) {
                break id;
            }
        };

        let node = self.arena.get(node_id).clone();
        self.frontier_mut(direction).close(node.position, node_id);
        on_settled(&node);

        let prev_point = node.parent.map(|id| self.edge_point(id));
        let node_point = EdgePoint::new(node.position, node.elevation);

        // Direct termination once the target is within lattice reach
        let proximity = 2.0 * profile.min_lattice_resolution() as f32;
        if node.position.distance_cells(&target) <= proximity {
            let target_point = EdgePoint::new(target, target_elevation);
            let reachable = node.position == target
                || cost::joint_legal(profile, cell, prev_point, node_point, target_point);
            if reachable {
                self.finish_at_target(direction, node_id, &node, target_point, cell);
                return true;
            }
        }

        // Join against the opposite frontier at a shared settled cell
        if profile.meet_in_middle && !node.is_root {
            if let Some(other_id) = self.opposite(direction).closed_at(&node.position) {
                let other = self.arena.get(other_id).clone();
                if !other.is_root
                    && self.try_join(profile, direction, node_id, &node, other_id, &other, cell)
                {
                    return true;
                }
            }
        }

        let candidates = self
            .generator
            .candidates(oracle, profile, prev_point, node_point);
        for candidate in candidates {
            if self.frontier(direction).is_closed(&candidate.position) {
                continue;
            }
            let heuristic = candidate.position.distance_cells(&target) * cell;
            let cumulative_cost = node.cumulative_cost + candidate.edge_cost;
            let weighted_priority = self.tuning.distance_weight * heuristic
                + self.tuning.cost_weight * cumulative_cost;
            if !weighted_priority.is_finite() {
                continue;
            }
            let id = self.arena.insert(SearchNode {
                position: candidate.position,
                elevation: candidate.elevation,
                parent: Some(node_id),
                cumulative_cost,
                heuristic,
                weighted_priority,
                kind: candidate.kind,
                is_root: false,
            });
            self.frontier_mut(direction).push(id, weighted_priority);
        }
        true
    }

    /// Splice the settled node onto its frontier's target and finish
    fn finish_at_target(
        &mut self,
        direction: Direction,
        node_id: NodeId,
        node: &SearchNode,
        target_point: EdgePoint,
        cell: f32,
    ) {
        let final_id = if node.position == target_point.position {
            node_id
        } else {
            let closing_distance = node.position.distance_cells(&target_point.position) * cell;
            self.arena.insert(SearchNode {
                position: target_point.position,
                elevation: target_point.elevation,
                parent: Some(node_id),
                cumulative_cost: node.cumulative_cost + closing_distance,
                heuristic: 0.0,
                weighted_priority: node.weighted_priority,
                kind: EdgeKind::Surface,
                is_root: false,
            })
        };

        let chain = self.arena.walk_to_root(final_id);
        let mut waypoints = self.chain_waypoints(&chain);
        if direction == Direction::Forward {
            // The chain runs target-to-start; the route runs start-to-goal
            waypoints.reverse();
        }
        self.solve(waypoints);
    }

    /// Attempt to join the two frontiers at a shared settled position. The
    /// joint takes the forward chain's elevation; the splice must satisfy
    /// slope on both sides and the turn limit across the joint.
    fn try_join(
        &mut self,
        profile: &PriorityProfile,
        direction: Direction,
        node_id: NodeId,
        node: &SearchNode,
        other_id: NodeId,
        other: &SearchNode,
        cell: f32,
    ) -> bool {
        let (forward_id, forward_node, backward_node) = match direction {
            Direction::Forward => (node_id, node, other),
            Direction::Backward => (other_id, other, node),
        };
        let (Some(incoming_id), Some(outgoing_id)) = (forward_node.parent, backward_node.parent)
        else {
            // Roots are handled by direct termination, not joins
            return false;
        };

        let joint = EdgePoint::new(node.position, forward_node.elevation);
        let incoming = self.edge_point(incoming_id);
        let outgoing = self.edge_point(outgoing_id);
        if !cost::joint_legal(profile, cell, Some(incoming), joint, outgoing) {
            return false;
        }

        // Forward half, start to joint
        let forward_chain = self.arena.walk_to_root(forward_id);
        let mut waypoints = self.chain_waypoints(&forward_chain);
        waypoints.reverse();
        // Backward half continues from the joint's predecessor to the goal
        let backward_chain = self.arena.walk_to_root(outgoing_id);
        waypoints.extend(self.chain_waypoints(&backward_chain));

        self.solve(waypoints);
        true
    }

    fn solve(&mut self, waypoints: Vec<Waypoint>) {
        info!(
            "Search solved: {} waypoints after {} expansions",
            waypoints.len(),
            self.closed_nodes()
        );
        self.solution = Some(waypoints);
        self.state = SearchState::Solved;
    }

    fn chain_waypoints(&self, chain: &[NodeId]) -> Vec<Waypoint> {
        chain
            .iter()
            .map(|&id| {
                let node = self.arena.get(id);
                Waypoint {
                    position: node.position,
                    elevation: node.elevation,
                    kind: node.kind,
                }
            })
            .collect()
    }

    fn edge_point(&self, id: NodeId) -> EdgePoint {
        let node = self.arena.get(id);
        EdgePoint::new(node.position, node.elevation)
    }

    fn frontier(&self, direction: Direction) -> &PriorityFrontier {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Backward => &self.backward,
        }
    }

    fn frontier_mut(&mut self, direction: Direction) -> &mut PriorityFrontier {
        match direction {
            Direction::Forward => &mut self.forward,
            Direction::Backward => &mut self.backward,
        }
    }

    fn opposite(&self, direction: Direction) -> &PriorityFrontier {
        match direction {
            Direction::Forward => &self.backward,
            Direction::Backward => &self.forward,
        }
    }
}
