//! Multi-site network assembly.
//!
//! Sites are linked along a minimum spanning tree so every site is
//! reachable with the fewest routes, then each tree edge is routed by the
//! search engine under the requested priority tier. Edges the search cannot
//! route are reported, not fatal: a peninsula site should not sink the
//! whole network.

use crate::errors::RoadforgeResult;
use crate::profile::ProfileSet;
use crate::search::engine::{SearchEngine, SearchState, SearchTuning, Waypoint};
use crate::terrain::{GridPos, TerrainOracle};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BinaryHeap, HashMap};

/// One routed link between two sites
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub tier: usize,
    pub waypoints: Vec<Waypoint>,
}

impl Route {
    pub fn start(&self) -> Option<GridPos> {
        self.waypoints.first().map(|w| w.position)
    }

    pub fn end(&self) -> Option<GridPos> {
        self.waypoints.last().map(|w| w.position)
    }
}

/// A generated road network: routed links, shared junction cells, and the
/// site pairs that could not be connected
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoadNetwork {
    pub routes: Vec<Route>,
    pub junctions: Vec<GridPos>,
    pub failed_links: Vec<(GridPos, GridPos)>,
}

impl RoadNetwork {
    pub fn total_waypoints(&self) -> usize {
        self.routes.iter().map(|r| r.waypoints.len()).sum()
    }
}

/// Per-link search budget. A link that is still running when the budget
/// runs out counts as failed.
#[derive(Debug, Clone, Copy)]
pub struct NetworkBudget {
    /// Expansions per frontier per tick
    pub batch_size: usize,
    pub max_ticks: usize,
}

impl Default for NetworkBudget {
    fn default() -> Self {
        Self {
            batch_size: 32,
            max_ticks: 50_000,
        }
    }
}

/// Routes a set of sites into a connected network for one priority tier
pub struct NetworkGenerator {
    profiles: ProfileSet,
    tuning: SearchTuning,
    budget: NetworkBudget,
    seed: u64,
}

impl NetworkGenerator {
    pub fn new(profiles: ProfileSet, tuning: SearchTuning, budget: NetworkBudget, seed: u64) -> Self {
        Self {
            profiles,
            tuning,
            budget,
            seed,
        }
    }

    pub fn generate(
        &self,
        oracle: &impl TerrainOracle,
        sites: &[GridPos],
        tier: usize,
    ) -> RoadforgeResult<RoadNetwork> {
        let mut network = RoadNetwork::default();
        // Surface a bad tier before any routing work
        self.profiles.get(tier)?;
        if sites.len() < 2 {
            return Ok(network);
        }

        let mut engine = SearchEngine::new(self.profiles.clone(), self.tuning, self.seed);
        for (a, b) in minimum_spanning_tree(sites) {
            let (from, to) = (sites[a], sites[b]);
            engine.start_search(oracle, from, to, tier)?;
            let state =
                engine.run_to_completion(oracle, self.budget.batch_size, self.budget.max_ticks);
            match state {
                SearchState::Solved => {
                    if let Some(waypoints) = engine.solution() {
                        network.routes.push(Route {
                            tier,
                            waypoints: waypoints.to_vec(),
                        });
                    }
                }
                _ => {
                    warn!(
                        "No route from ({}, {}) to ({}, {}): {state:?}",
                        from.x, from.z, to.x, to.z
                    );
                    engine.stop();
                    network.failed_links.push((from, to));
                }
            }
        }

        network.junctions = find_junctions(&network.routes);
        info!(
            "Network generated: {} routes, {} junctions, {} failed links",
            network.routes.len(),
            network.junctions.len(),
            network.failed_links.len()
        );
        Ok(network)
    }
}

/// Minimum spanning tree over the sites by straight-line lattice distance,
/// built with Prim's algorithm. Returns index pairs into `sites`.
fn minimum_spanning_tree(sites: &[GridPos]) -> Vec<(usize, usize)> {
    let mut edges = Vec::new();
    if sites.len() < 2 {
        return edges;
    }

    // Max-heap over negated distances pops the shortest candidate first
    let mut candidates: BinaryHeap<(i64, usize, usize)> = BinaryHeap::new();
    let mut in_tree = vec![false; sites.len()];
    in_tree[0] = true;
    for (i, site) in sites.iter().enumerate().skip(1) {
        let distance = (sites[0].distance_cells(site) * 1000.0) as i64;
        candidates.push((-distance, 0, i));
    }

    while edges.len() < sites.len() - 1 {
        let Some((_, from, to)) = candidates.pop() else {
            break;
        };
        if in_tree[to] {
            continue;
        }
        in_tree[to] = true;
        edges.push((from, to));
        for (i, site) in sites.iter().enumerate() {
            if !in_tree[i] {
                let distance = (sites[to].distance_cells(site) * 1000.0) as i64;
                candidates.push((-distance, to, i));
            }
        }
    }
    edges
}

/// Cells shared by three or more routes are junctions
fn find_junctions(routes: &[Route]) -> Vec<GridPos> {
    let mut seen_in: HashMap<GridPos, usize> = HashMap::new();
    for route in routes {
        let mut positions: Vec<GridPos> = route.waypoints.iter().map(|w| w.position).collect();
        positions.sort_by_key(|p| (p.x, p.z));
        positions.dedup();
        for position in positions {
            *seen_in.entry(position).or_insert(0) += 1;
        }
    }

    let mut junctions: Vec<GridPos> = seen_in
        .into_iter()
        .filter(|&(_, count)| count >= 3)
        .map(|(position, _)| position)
        .collect();
    junctions.sort_by_key(|p| (p.x, p.z));
    junctions
}
