// Spatial graph - nodes, cost-thresholded edges, reversible deactivation
use crate::distance::{Distance, DistanceRegistry};
use crate::edge::{pair_edge_id, Edge, EdgeId};
use crate::error::{Error, Result};
use crate::node::{Node, NodeId};
use crate::scoring;
use ahash::{AHashMap, AHashSet};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use tracing::debug;

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a graph instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphId(u64);

impl GraphId {
    pub(crate) fn next() -> Self {
        GraphId(NEXT_GRAPH_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

/// Configuration for graph construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Name of the distance in the registry
    pub distance: String,
    /// Edges are created only when `cost < max_cost`. When `None`, every pair
    /// gets an edge and the graph's max cost is the largest cost observed, or 0
    /// for a graph without edges.
    pub max_cost: Option<f64>,
    /// Added to every computed cost (e.g. a fixed visit time per node)
    pub edge_cost_offset: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            distance: "euclidean".to_string(),
            max_cost: None,
            edge_cost_offset: 0.0,
        }
    }
}

impl GraphConfig {
    fn validate(&self) -> Result<()> {
        if let Some(max_cost) = self.max_cost {
            if max_cost.is_nan() {
                return Err(Error::InvalidConfig("max_cost must be a number".to_string()));
            }
        }
        if !self.edge_cost_offset.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "edge_cost_offset must be finite, got {}",
                self.edge_cost_offset
            )));
        }
        Ok(())
    }
}

/// Axis-aligned box enclosing every active node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }
}

/// A removed node together with the exact edges removed with it
#[derive(Debug, Clone)]
pub(crate) struct DeactivatedNode {
    pub(crate) node: Node,
    pub(crate) edges: Vec<Edge>,
}

/// Weighted spatial graph
///
/// Edges are built once from pairwise costs. Nodes can then be deactivated
/// (removed together with their edges and archived) and reactivated, or
/// deleted for good.
pub struct SpatialGraph {
    pub(crate) id: GraphId,
    pub(crate) parent: Option<GraphId>,
    pub(crate) nodes: AHashMap<NodeId, Node>,
    pub(crate) edges: AHashMap<EdgeId, Edge>,
    pub(crate) neighborhood: AHashMap<NodeId, AHashSet<EdgeId>>,
    pub(crate) max_cost: f64,
    pub(crate) edge_cost_offset: f64,
    pub(crate) distance: Distance,
    pub(crate) deactivated: AHashMap<NodeId, DeactivatedNode>,
}

impl SpatialGraph {
    /// Build a graph with a distance from the built-in registry
    pub fn build(nodes: Vec<Node>, config: &GraphConfig) -> Result<Self> {
        Self::build_with_registry(nodes, config, &DistanceRegistry::builtin())
    }

    /// Build a graph, evaluating every unordered node pair
    ///
    /// # Errors
    /// - [`Error::UnknownDistance`] if `config.distance` is not registered
    /// - [`Error::DuplicateNode`] if two records share an id
    /// - [`Error::InvalidConfig`] for a NaN `max_cost` or non-finite offset
    pub fn build_with_registry(
        nodes: Vec<Node>,
        config: &GraphConfig,
        registry: &DistanceRegistry,
    ) -> Result<Self> {
        let distance = registry.get(&config.distance)?;
        config.validate()?;

        let mut seen: AHashSet<&NodeId> = AHashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !seen.insert(&node.id) {
                return Err(Error::DuplicateNode(node.id.clone()));
            }
        }
        drop(seen);

        let costs = pairwise_costs(&nodes, distance, config.edge_cost_offset, config.max_cost);
        let max_cost = match config.max_cost {
            Some(max_cost) => max_cost,
            None if costs.is_empty() => 0.0,
            None => costs
                .iter()
                .map(|&(_, _, cost)| cost)
                .fold(f64::NEG_INFINITY, f64::max),
        };

        let mut neighborhood: AHashMap<NodeId, AHashSet<EdgeId>> = nodes
            .iter()
            .map(|node| (node.id.clone(), AHashSet::new()))
            .collect();
        let mut edges = AHashMap::with_capacity(costs.len());

        for (i, j, cost) in costs {
            let edge_id = pair_edge_id(i, j);
            let (a, b) = (&nodes[i].id, &nodes[j].id);
            if let Some(adj) = neighborhood.get_mut(a) {
                adj.insert(edge_id);
            }
            if let Some(adj) = neighborhood.get_mut(b) {
                adj.insert(edge_id);
            }
            edges.insert(edge_id, Edge::new(edge_id, a.clone(), b.clone(), cost));
        }

        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            max_cost,
            distance = distance.name(),
            "Graph built"
        );

        Ok(Self {
            id: GraphId::next(),
            parent: None,
            nodes: nodes.into_iter().map(|node| (node.id.clone(), node)).collect(),
            edges,
            neighborhood,
            max_cost,
            edge_cost_offset: config.edge_cost_offset,
            distance,
            deactivated: AHashMap::new(),
        })
    }

    #[inline]
    pub fn id(&self) -> GraphId {
        self.id
    }

    /// Id of the graph this one was extracted from, if any
    #[inline]
    pub fn parent(&self) -> Option<GraphId> {
        self.parent
    }

    #[inline]
    pub fn max_cost(&self) -> f64 {
        self.max_cost
    }

    #[inline]
    pub fn edge_cost_offset(&self) -> f64 {
        self.edge_cost_offset
    }

    #[inline]
    pub fn distance(&self) -> Distance {
        self.distance
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    #[inline]
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Active nodes, in no particular order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Active edges, in no particular order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Ids of the active edges incident to `id`
    #[inline]
    pub fn neighborhood(&self, id: &NodeId) -> Option<&AHashSet<EdgeId>> {
        self.neighborhood.get(id)
    }

    /// Active nodes adjacent to `id`, each with the connecting edge
    pub fn neighbors<'a>(
        &'a self,
        id: &'a NodeId,
    ) -> impl Iterator<Item = (&'a Edge, &'a Node)> + 'a {
        self.neighborhood
            .get(id)
            .into_iter()
            .flat_map(|edge_ids| edge_ids.iter())
            .filter_map(move |edge_id| {
                let edge = self.edges.get(edge_id)?;
                let dest = self.nodes.get(edge.dest(id)?)?;
                Some((edge, dest))
            })
    }

    #[inline]
    pub fn is_deactivated(&self, id: &NodeId) -> bool {
        self.deactivated.contains_key(id)
    }

    #[inline]
    pub fn deactivated_count(&self) -> usize {
        self.deactivated.len()
    }

    /// Node with the highest score; ties go to the lowest id
    pub fn get_node_with_max_score(&self) -> Option<&Node> {
        self.nodes.values().max_by(|a, b| {
            OrderedFloat(a.score)
                .cmp(&OrderedFloat(b.score))
                .then_with(|| b.id.cmp(&a.id))
        })
    }

    /// The `k` incident edges whose destination has the best relative score
    ///
    /// Sorted by relative score descending, then by edge id. Returns fewer
    /// than `k` entries when the node has fewer neighbors.
    pub fn get_k_best_neighbors(&self, node_id: &NodeId, k: usize) -> Result<Vec<(EdgeId, f64)>> {
        if !self.nodes.contains_key(node_id) {
            return Err(Error::NodeNotFound(node_id.clone()));
        }

        let mut scored: Vec<(EdgeId, f64)> = self
            .neighbors(node_id)
            .map(|(edge, dest)| {
                (edge.id, scoring::relative_score(dest.score, edge.cost, self.max_cost))
            })
            .collect();

        let by_score = |a: &(EdgeId, f64), b: &(EdgeId, f64)| -> Ordering {
            OrderedFloat(b.1)
                .cmp(&OrderedFloat(a.1))
                .then(a.0.cmp(&b.0))
        };

        if k < scored.len() {
            scored.select_nth_unstable_by(k, by_score);
            scored.truncate(k);
        }
        scored.sort_unstable_by(by_score);
        Ok(scored)
    }

    /// Regional score of a node over its `k` best neighbors
    pub fn get_node_regional_score(&self, node_id: &NodeId, k: usize) -> Result<f64> {
        let node = self
            .nodes
            .get(node_id)
            .ok_or_else(|| Error::NodeNotFound(node_id.clone()))?;
        let best = self.get_k_best_neighbors(node_id, k)?;
        Ok(scoring::regional_score(node.score, best.into_iter().map(|(_, s)| s)))
    }

    /// Remove a node and its edges, archiving them for [`Self::reactivate_node`]
    pub fn deactivate_node(&mut self, node_id: &NodeId) -> Result<()> {
        let (node, edges) = self.detach(node_id)?;
        self.deactivated
            .insert(node_id.clone(), DeactivatedNode { node, edges });
        Ok(())
    }

    /// Restore a deactivated node and its archived edges
    ///
    /// Archived edges whose other endpoint is itself deactivated are moved to
    /// that endpoint's archive; edges to deleted nodes are dropped.
    ///
    /// # Errors
    /// [`Error::DeactivatedNodeNotFound`] if `node_id` is not archived.
    pub fn reactivate_node(&mut self, node_id: &NodeId) -> Result<()> {
        let DeactivatedNode { node, edges } = self
            .deactivated
            .remove(node_id)
            .ok_or_else(|| Error::DeactivatedNodeNotFound(node_id.clone()))?;

        let mut adjacency = AHashSet::with_capacity(edges.len());
        for edge in edges {
            let Some(dest) = edge.dest(node_id).cloned() else {
                continue;
            };
            if let Some(dest_adjacency) = self.neighborhood.get_mut(&dest) {
                dest_adjacency.insert(edge.id);
                adjacency.insert(edge.id);
                self.edges.insert(edge.id, edge);
            } else if let Some(archived) = self.deactivated.get_mut(&dest) {
                archived.edges.push(edge);
            }
        }

        self.neighborhood.insert(node_id.clone(), adjacency);
        self.nodes.insert(node_id.clone(), node);
        Ok(())
    }

    /// Remove a node and its edges for good
    pub fn delete_node(&mut self, node_id: &NodeId) -> Result<Node> {
        let (node, _) = self.detach(node_id)?;
        Ok(node)
    }

    fn detach(&mut self, node_id: &NodeId) -> Result<(Node, Vec<Edge>)> {
        let node = self
            .nodes
            .remove(node_id)
            .ok_or_else(|| Error::NodeNotFound(node_id.clone()))?;
        let edge_ids = self.neighborhood.remove(node_id).unwrap_or_default();

        let mut removed = Vec::with_capacity(edge_ids.len());
        for edge_id in edge_ids {
            if let Some(edge) = self.edges.remove(&edge_id) {
                let dest = edge.dest(node_id);
                if let Some(adjacency) = dest.and_then(|d| self.neighborhood.get_mut(d)) {
                    adjacency.remove(&edge_id);
                }
                removed.push(edge);
            }
        }
        removed.sort_unstable_by_key(|edge| edge.id);
        Ok((node, removed))
    }

    /// Mean score of the active nodes
    pub fn mean_score(&self) -> Option<f64> {
        if self.nodes.is_empty() {
            return None;
        }
        Some(self.nodes.values().map(|n| n.score).sum::<f64>() / self.nodes.len() as f64)
    }

    /// `(id, x, y)` of every active node, sorted by id
    pub fn coordinates(&self) -> Vec<(NodeId, f64, f64)> {
        let mut coords: Vec<_> = self
            .nodes
            .values()
            .map(|n| (n.id.clone(), n.x, n.y))
            .collect();
        coords.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        coords
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut nodes = self.nodes.values();
        let first = nodes.next()?;
        let init = BoundingBox {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(nodes.fold(init, |bb, n| BoundingBox {
            min_x: bb.min_x.min(n.x),
            min_y: bb.min_y.min(n.y),
            max_x: bb.max_x.max(n.x),
            max_y: bb.max_y.max(n.y),
        }))
    }

    /// Active nodes per unit of bounding-box area; `None` for a degenerate box
    pub fn node_density(&self) -> Option<f64> {
        let area = self.bounding_box()?.area();
        if area > 0.0 {
            Some(self.nodes.len() as f64 / area)
        } else {
            None
        }
    }

    /// Active node closest to `(x, y)` under the graph's distance; ties go to the lowest id
    pub fn closest_node(&self, x: f64, y: f64) -> Option<&Node> {
        let probe = Node::new(0, x, y, 0.0);
        self.nodes.values().min_by(|a, b| {
            OrderedFloat(self.distance.cost(&probe, a))
                .cmp(&OrderedFloat(self.distance.cost(&probe, b)))
                .then_with(|| a.id.cmp(&b.id))
        })
    }
}

impl std::fmt::Debug for SpatialGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialGraph")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("deactivated", &self.deactivated.len())
            .field("max_cost", &self.max_cost)
            .field("edge_cost_offset", &self.edge_cost_offset)
            .field("distance", &self.distance.name())
            .finish()
    }
}

/// Admissible `(i, j, cost)` triples for every pair `j < i`, in pair order
fn pairwise_costs(
    nodes: &[Node],
    distance: Distance,
    offset: f64,
    max_cost: Option<f64>,
) -> Vec<(usize, usize, f64)> {
    (1..nodes.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            (0..i).filter_map(move |j| {
                let cost = distance.cost(&nodes[i], &nodes[j]) + offset;
                match max_cost {
                    Some(max) if !(cost < max) => None,
                    _ => Some((i, j, cost)),
                }
            })
        })
        .collect()
}
