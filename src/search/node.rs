use crate::terrain::GridPos;
use serde::{Deserialize, Serialize};

/// Handle into a [`NodeArena`]. Only valid for the arena that produced it
/// and only until the next [`NodeArena::clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

/// How the edge arriving at a node crosses the terrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Surface,
    Bridge,
    Tunnel,
}

/// One expanded lattice position, owned by the arena. Parent links always
/// point at earlier allocations, so chains are acyclic by construction.
#[derive(Debug, Clone)]
pub struct SearchNode {
    pub position: GridPos,
    /// Path elevation at this node. Matches the ground for surface nodes,
    /// may sit below it for tunnel nodes or above water for bridge nodes.
    pub elevation: f32,
    pub parent: Option<NodeId>,
    /// Accumulated edge cost from the frontier root
    pub cumulative_cost: f32,
    /// Straight-line world distance to the frontier's target
    pub heuristic: f32,
    /// Weighted priority this node was enqueued with
    pub weighted_priority: f32,
    pub kind: EdgeKind,
    pub is_root: bool,
}

/// Append-only node storage shared by both frontiers of a search run
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<SearchNode>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: SearchNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every node; capacity is retained for the next run
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Collect the parent chain from `from` back to its frontier root,
    /// inclusive. The walk is bounded by the arena size; exceeding it means
    /// a corrupted parent link and is a bug.
    pub fn walk_to_root(&self, from: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = Some(from);
        while let Some(id) = current {
            assert!(
                chain.len() < self.nodes.len(),
                "parent chain longer than arena, cycle in parent links"
            );
            chain.push(id);
            current = self.get(id).parent;
        }
        chain
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchNode> {
        self.nodes.iter()
    }
}
