use crate::search::node::NodeId;
use crate::terrain::GridPos;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Heap entry ordered so the lowest weighted priority pops first
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    priority: f32,
    node: NodeId,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed comparison turns the max-heap into a min-heap. Priorities
        // are checked finite before insertion, so the fallback never decides.
        other
            .priority
            .partial_cmp(&self.priority)
            .unwrap_or(Ordering::Equal)
    }
}

/// One search frontier: a min-heap of open nodes plus the closed set of
/// settled positions. Stale heap entries for already-closed positions are
/// skipped on pop rather than removed eagerly.
#[derive(Debug, Default)]
pub struct PriorityFrontier {
    open: BinaryHeap<OpenEntry>,
    closed: HashMap<GridPos, NodeId>,
}

impl PriorityFrontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: NodeId, priority: f32) {
        debug_assert!(priority.is_finite());
        self.open.push(OpenEntry { priority, node });
    }

    pub fn pop_open(&mut self) -> Option<NodeId> {
        self.open.pop().map(|entry| entry.node)
    }

    pub fn close(&mut self, position: GridPos, node: NodeId) {
        self.closed.insert(position, node);
    }

    pub fn is_closed(&self, position: &GridPos) -> bool {
        self.closed.contains_key(position)
    }

    /// The settled node at a position, if the frontier has closed it
    pub fn closed_at(&self, position: &GridPos) -> Option<NodeId> {
        self.closed.get(position).copied()
    }

    pub fn open_is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn open_len(&self) -> usize {
        self.open.len()
    }

    pub fn closed_len(&self) -> usize {
        self.closed.len()
    }

    pub fn clear(&mut self) {
        self.open.clear();
        self.closed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::node::{EdgeKind, NodeArena, SearchNode};

    fn arena_with(n: usize) -> (NodeArena, Vec<NodeId>) {
        let mut arena = NodeArena::new();
        let ids = (0..n)
            .map(|i| {
                arena.insert(SearchNode {
                    position: GridPos::new(i as i32, 0),
                    elevation: 0.0,
                    parent: None,
                    cumulative_cost: 0.0,
                    heuristic: 0.0,
                    weighted_priority: 0.0,
                    kind: EdgeKind::Surface,
                    is_root: true,
                })
            })
            .collect();
        (arena, ids)
    }

    #[test]
    fn test_pops_lowest_priority_first() {
        let (_, ids) = arena_with(3);
        let mut frontier = PriorityFrontier::new();
        frontier.push(ids[0], 5.0);
        frontier.push(ids[1], 1.5);
        frontier.push(ids[2], 3.0);

        assert_eq!(frontier.pop_open(), Some(ids[1]));
        assert_eq!(frontier.pop_open(), Some(ids[2]));
        assert_eq!(frontier.pop_open(), Some(ids[0]));
        assert_eq!(frontier.pop_open(), None);
    }

    #[test]
    fn test_closed_set_tracks_positions() {
        let (arena, ids) = arena_with(2);
        let mut frontier = PriorityFrontier::new();
        let pos = arena.get(ids[0]).position;

        assert!(!frontier.is_closed(&pos));
        frontier.close(pos, ids[0]);
        assert!(frontier.is_closed(&pos));
        assert_eq!(frontier.closed_at(&pos), Some(ids[0]));
        assert_eq!(frontier.closed_at(&GridPos::new(9, 9)), None);
        assert_eq!(frontier.closed_len(), 1);
    }

    #[test]
    fn test_clear_empties_both_sets() {
        let (arena, ids) = arena_with(1);
        let mut frontier = PriorityFrontier::new();
        frontier.push(ids[0], 1.0);
        frontier.close(arena.get(ids[0]).position, ids[0]);

        frontier.clear();
        assert!(frontier.open_is_empty());
        assert_eq!(frontier.closed_len(), 0);
    }
}
