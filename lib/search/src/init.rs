// Start-node selection for chain search
use kbnpath_core::{Node, SpatialGraph};
use serde::{Deserialize, Serialize};

/// How the first node of a chain is picked inside a (sub)graph
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitStrategy {
    /// Highest-scoring node, lowest id on ties
    #[default]
    MaxScore,
    /// Node closest to a coordinate under the graph's distance
    ClosestTo { x: f64, y: f64 },
}

impl InitStrategy {
    pub fn select<'g>(&self, graph: &'g SpatialGraph) -> Option<&'g Node> {
        match *self {
            InitStrategy::MaxScore => graph.get_node_with_max_score(),
            InitStrategy::ClosestTo { x, y } => graph.closest_node(x, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbnpath_core::{GraphConfig, NodeId};

    #[test]
    fn test_strategies() {
        let nodes = vec![
            Node::new(0, 0.0, 0.0, 5.0),
            Node::new(1, 5.0, 5.0, 50.0),
            Node::new(2, 9.0, 1.0, 20.0),
        ];
        let graph = SpatialGraph::build(nodes, &GraphConfig::default()).unwrap();

        assert_eq!(InitStrategy::MaxScore.select(&graph).unwrap().id, NodeId::from(1));
        let near = InitStrategy::ClosestTo { x: 8.0, y: 0.0 };
        assert_eq!(near.select(&graph).unwrap().id, NodeId::from(2));

        let empty = SpatialGraph::build(vec![], &GraphConfig::default()).unwrap();
        assert!(InitStrategy::default().select(&empty).is_none());
    }

    #[test]
    fn test_deserialize() {
        let strategy: InitStrategy =
            serde_json::from_str(r#"{"kind": "closest_to", "x": 1.5, "y": -2.0}"#).unwrap();
        assert_eq!(strategy, InitStrategy::ClosestTo { x: 1.5, y: -2.0 });
        let strategy: InitStrategy = serde_json::from_str(r#"{"kind": "max_score"}"#).unwrap();
        assert_eq!(strategy, InitStrategy::MaxScore);
    }
}
