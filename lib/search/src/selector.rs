//! Greedy chain building
//!
//! A chain grows one node at a time from its last node toward the adjacent
//! node with the best combined score. Every node locked into the chain is
//! deactivated in the graph it was built on, and constraint state is updated
//! in lockstep.

use crate::constraint::ConstraintSet;
use ahash::AHashSet;
use kbnpath_core::{Error, Node, NodeId, Result, SpatialGraph};
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Build a chain of up to `k` contiguous nodes starting at `start`
///
/// Every returned node is deactivated in `graph`. When the last node has no
/// active neighbor left, the search stops early and returns a shorter
/// chain; callers must check the length.
///
/// # Errors
/// - [`Error::NodeNotFound`] if `start` is not active in `graph`
/// - any error raised by a constraint while scoring a candidate; the partial
///   chain is then reverted from the constraints and reactivated in `graph`
pub fn get_k_best_nodes(
    graph: &mut SpatialGraph,
    start: &NodeId,
    k: usize,
    constraints: &mut ConstraintSet,
) -> Result<Vec<Node>> {
    if k == 0 {
        return Ok(Vec::new());
    }
    let first = graph
        .node(start)
        .cloned()
        .ok_or_else(|| Error::NodeNotFound(start.clone()))?;

    let mut chain = Vec::with_capacity(k);
    chain.push(first);

    if let Err(err) = grow_chain(graph, k, constraints, &mut chain) {
        unwind_chain(graph, constraints, &chain);
        return Err(err);
    }
    Ok(chain)
}

fn grow_chain(
    graph: &mut SpatialGraph,
    k: usize,
    constraints: &mut ConstraintSet,
    chain: &mut Vec<Node>,
) -> Result<()> {
    let mut in_chain: AHashSet<NodeId> = chain.iter().map(|n| n.id.clone()).collect();

    loop {
        let remaining = k - chain.len();
        let last = &chain[chain.len() - 1];
        constraints.update(last);

        if remaining == 0 {
            graph.deactivate_node(&last.id)?;
            return Ok(());
        }

        match best_next_node(graph, &last.id, remaining, constraints, &in_chain)? {
            Some(next) => {
                debug!(from = %last.id, node = %next.id, remaining, "Node selected");
                graph.deactivate_node(&last.id)?;
                in_chain.insert(next.id.clone());
                chain.push(next);
            }
            None => {
                graph.deactivate_node(&last.id)?;
                warn!(
                    node = %last.id,
                    found = chain.len(),
                    requested = k,
                    "No neighbor found to pursue graph exploration"
                );
                return Ok(());
            }
        }
    }
}

/// Undo a chain that failed part way: every chain node has been counted by
/// the constraints, and all but possibly the last are deactivated.
fn unwind_chain(graph: &mut SpatialGraph, constraints: &mut ConstraintSet, chain: &[Node]) {
    constraints.revert_all(chain);
    for node in chain.iter().rev() {
        if graph.is_deactivated(&node.id) {
            if let Err(err) = graph.reactivate_node(&node.id) {
                warn!(node = %node.id, error = %err, "Failed to reactivate chain node");
            }
        }
    }
}

/// [`get_k_best_nodes`] starting from the graph's highest-scoring node
pub fn get_k_best_nodes_from_max_score(
    graph: &mut SpatialGraph,
    k: usize,
    constraints: &mut ConstraintSet,
) -> Result<Vec<Node>> {
    let Some(start) = graph.get_node_with_max_score().map(|n| n.id.clone()) else {
        return Ok(Vec::new());
    };
    get_k_best_nodes(graph, &start, k, constraints)
}

/// Combined score of a chain candidate
///
/// The regional score over the `remaining` best neighbors, capped by the
/// score each constraint leaves after its penalty.
pub fn candidate_score(
    graph: &SpatialGraph,
    candidate: &Node,
    remaining: usize,
    constraints: &ConstraintSet,
) -> Result<f64> {
    let regional = graph.get_node_regional_score(&candidate.id, remaining)?;
    constraints.worst_score(candidate, regional)
}

/// Best active neighbor of `from` outside the chain; ties go to the lowest id
fn best_next_node(
    graph: &SpatialGraph,
    from: &NodeId,
    remaining: usize,
    constraints: &ConstraintSet,
    in_chain: &AHashSet<NodeId>,
) -> Result<Option<Node>> {
    let mut best: Option<(f64, &Node)> = None;

    for (_, candidate) in graph.neighbors(from) {
        if in_chain.contains(&candidate.id) {
            continue;
        }
        let score = candidate_score(graph, candidate, remaining, constraints)?;
        let better = match best {
            None => true,
            Some((best_score, best_node)) => {
                match OrderedFloat(score).cmp(&OrderedFloat(best_score)) {
                    Ordering::Greater => true,
                    Ordering::Equal => candidate.id < best_node.id,
                    Ordering::Less => false,
                }
            }
        };
        if better {
            best = Some((score, candidate));
        }
    }

    Ok(best.map(|(_, node)| node.clone()))
}
