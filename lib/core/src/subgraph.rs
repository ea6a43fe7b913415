// Induced subgraph extraction
use crate::graph::{GraphId, SpatialGraph};
use crate::node::NodeId;
use ahash::{AHashMap, AHashSet};
use tracing::trace;

impl SpatialGraph {
    /// Materialize the subgraph induced by `node_ids`
    ///
    /// Keeps only the listed nodes that are active in `self`, and only the
    /// edges whose both endpoints are kept. The adjacency index is rebuilt
    /// from scratch; costs, `max_cost`, offset and distance are inherited
    /// without recomputation. The result records `self` as its parent and
    /// starts with an empty deactivation archive.
    pub fn subgraph<'a, I>(&self, node_ids: I) -> SpatialGraph
    where
        I: IntoIterator<Item = &'a NodeId>,
    {
        let nodes: AHashMap<NodeId, _> = node_ids
            .into_iter()
            .filter_map(|id| self.nodes.get(id))
            .map(|node| (node.id.clone(), node.clone()))
            .collect();

        let mut neighborhood: AHashMap<NodeId, AHashSet<_>> = nodes
            .keys()
            .map(|id| (id.clone(), AHashSet::new()))
            .collect();
        let mut edges = AHashMap::new();

        for edge in self.edges.values() {
            let [a, b] = &edge.nodes;
            if !(nodes.contains_key(a) && nodes.contains_key(b)) {
                continue;
            }
            for end in [a, b] {
                if let Some(adjacency) = neighborhood.get_mut(end) {
                    adjacency.insert(edge.id);
                }
            }
            edges.insert(edge.id, edge.clone());
        }

        trace!(
            parent = ?self.id,
            nodes = nodes.len(),
            edges = edges.len(),
            "Subgraph extracted"
        );

        SpatialGraph {
            id: GraphId::next(),
            parent: Some(self.id),
            nodes,
            edges,
            neighborhood,
            max_cost: self.max_cost,
            edge_cost_offset: self.edge_cost_offset,
            distance: self.distance,
            deactivated: AHashMap::new(),
        }
    }
}
