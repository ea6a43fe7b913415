//! # kbnpath Core
//!
//! Core library for kbnpath.
//!
//! This crate provides the spatial graph the chain search runs on:
//!
//! - [`Node`] - A spatial point with a score and open properties
//! - [`Edge`] - An undirected link with a fixed traversal cost
//! - [`SpatialGraph`] - Node/edge store with adjacency index and reversible deactivation
//! - [`DistanceRegistry`] - Named edge-cost functions
//! - [`scoring`] - Relative and regional scores
//!
//! ## Example
//!
//! ```rust
//! use kbnpath_core::{GraphConfig, Node, NodeId, SpatialGraph};
//!
//! let nodes = vec![
//!     Node::new(0, 0.0, 0.0, 0.0),
//!     Node::new(1, 1.0, 0.0, 10.0),
//!     Node::new(2, 2.0, 0.0, 20.0),
//! ];
//! let graph = SpatialGraph::build(nodes, &GraphConfig::default()).unwrap();
//!
//! // No max cost given: every pair is linked and the largest cost becomes the max
//! assert_eq!(graph.max_cost(), 2.0);
//! assert_eq!(graph.get_node_regional_score(&NodeId::from(1), 1).unwrap(), 10.0);
//! ```

pub mod distance;
pub mod edge;
pub mod error;
pub mod graph;
pub mod node;
pub mod random;
pub mod scoring;
mod subgraph;

pub use distance::{Distance, DistanceFn, DistanceRegistry};
pub use edge::{Edge, EdgeId};
pub use error::{Error, Result};
pub use graph::{BoundingBox, GraphConfig, GraphId, SpatialGraph};
pub use node::{Node, NodeId};
pub use random::{random_graph, random_nodes, RandomGraphConfig};
