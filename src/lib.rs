//! # kbnpath
//!
//! Selection of high-value, spatially contiguous node chains from a weighted
//! spatial graph.
//!
//! Nodes are points with a score. Two nodes are linked when the cost of
//! travelling between them stays under a threshold. A chain grows greedily
//! from a start node toward the neighbor with the best regional score,
//! optionally capped by soft constraints such as a target category mix. Several
//! disjoint chains can be drawn from the best regions found by a sliding
//! spatial window.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! kbnpath --random 300 --seed 42 --total-k 10 --groups 2 --max-cost 0.3
//! kbnpath --nodes pois.json --distance haversine --max-cost 1.5 \
//!     --constraint-property cat --ratio A=0.5 --ratio B=0.5
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use kbnpath::prelude::*;
//!
//! let nodes = vec![
//!     Node::new(0, 0.0, 0.0, 0.0),
//!     Node::new(1, 1.0, 0.0, 10.0),
//!     Node::new(2, 2.0, 0.0, 20.0),
//! ];
//! let mut graph = SpatialGraph::build(nodes, &GraphConfig::default()).unwrap();
//!
//! let chain = get_k_best_nodes_from_max_score(&mut graph, 3, &mut ConstraintSet::new()).unwrap();
//! let ids: Vec<NodeId> = chain.iter().map(|n| n.id.clone()).collect();
//! assert_eq!(ids, vec![NodeId::from(2), NodeId::from(1), NodeId::from(0)]);
//! ```
//!
//! ## Crate Structure
//!
//! - `kbnpath-core` - Nodes, edges, the spatial graph, distances and scoring
//! - `kbnpath-search` - Chain search, constraints, convolution windowing, groups

pub mod records;

// Re-export core types
pub use kbnpath_core::{
    random_graph, random_nodes, BoundingBox, Distance, DistanceRegistry, Edge, EdgeId, Error,
    GraphConfig, Node, NodeId, RandomGraphConfig, Result, SpatialGraph,
};

// Re-export search
pub use kbnpath_search::{
    get_groups_of_k_best_nodes, get_k_best_nodes, get_k_best_nodes_from_max_score, rank_regions,
    CategoricalRatioConfig, CategoricalRatioConstraint, Constraint, ConstraintSet,
    GroupSearchConfig, InitStrategy, Region, WindowConfig, WindowShape,
};

pub use records::{parse_nodes, read_nodes};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        get_groups_of_k_best_nodes, get_k_best_nodes, get_k_best_nodes_from_max_score,
        rank_regions, CategoricalRatioConfig, CategoricalRatioConstraint, Constraint,
        ConstraintSet, Error, GraphConfig, GroupSearchConfig, InitStrategy, Node, NodeId, Result,
        SpatialGraph, WindowConfig,
    };
}

/// Scoring primitives
pub mod scoring {
    pub use kbnpath_core::scoring::{regional_score, relative_score};
}
