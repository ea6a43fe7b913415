use crate::node::NodeId;
use serde::{Deserialize, Serialize};

pub type EdgeId = u64;

/// Undirected link between two nodes with a fixed traversal cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub nodes: [NodeId; 2],
    pub cost: f64,
}

impl Edge {
    #[inline]
    #[must_use]
    pub fn new(id: EdgeId, a: NodeId, b: NodeId, cost: f64) -> Self {
        Self {
            id,
            nodes: [a, b],
            cost,
        }
    }

    #[inline]
    pub fn has_node(&self, node_id: &NodeId) -> bool {
        self.nodes[0] == *node_id || self.nodes[1] == *node_id
    }

    /// The endpoint opposite to `origin`, or `None` if `origin` is not an endpoint.
    #[inline]
    pub fn dest(&self, origin: &NodeId) -> Option<&NodeId> {
        if self.nodes[0] == *origin {
            Some(&self.nodes[1])
        } else if self.nodes[1] == *origin {
            Some(&self.nodes[0])
        } else {
            None
        }
    }
}

/// Edge id of the pair `(i, j)`, `j < i`, in construction order.
#[inline]
pub(crate) fn pair_edge_id(i: usize, j: usize) -> EdgeId {
    debug_assert!(j < i);
    (i as u64) * (i as u64 - 1) / 2 + j as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dest() {
        let edge = Edge::new(0, NodeId::from(1), NodeId::from(2), 0.5);
        assert_eq!(edge.dest(&NodeId::from(1)), Some(&NodeId::from(2)));
        assert_eq!(edge.dest(&NodeId::from(2)), Some(&NodeId::from(1)));
        assert_eq!(edge.dest(&NodeId::from(3)), None);
        assert!(edge.has_node(&NodeId::from(2)));
        assert!(!edge.has_node(&NodeId::from(3)));
    }

    #[test]
    fn test_pair_edge_ids_are_disjoint() {
        let mut seen = std::collections::HashSet::new();
        for i in 1..50 {
            for j in 0..i {
                assert!(seen.insert(pair_edge_id(i, j)));
            }
        }
        assert_eq!(seen.len(), 49 * 50 / 2);
    }
}
