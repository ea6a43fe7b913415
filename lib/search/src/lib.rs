//! # kbnpath Search
//!
//! Greedy selection of contiguous, high-value node chains over a
//! [`kbnpath_core::SpatialGraph`].
//!
//! - [`selector`] - Chain building from a start node
//! - [`constraint`] - Pluggable penalties with revertible state
//! - [`convolution`] - Sliding-window ranking of candidate regions
//! - [`groups`] - Several disjoint chains, one per ranked region
//! - [`init`] - Start-node strategies
//!
//! ## Example
//!
//! ```rust
//! use kbnpath_core::{random_graph, RandomGraphConfig};
//! use kbnpath_search::{get_groups_of_k_best_nodes, ConstraintSet, GroupSearchConfig};
//!
//! let mut graph = random_graph(&RandomGraphConfig {
//!     n: 100,
//!     seed: Some(42),
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! let config = GroupSearchConfig::new(6, 2);
//! let mut constraints = ConstraintSet::new();
//! let groups = get_groups_of_k_best_nodes(&mut graph, &config, &mut constraints).unwrap();
//! assert!(groups.len() <= 2);
//! ```

pub mod constraint;
pub mod convolution;
pub mod groups;
pub mod init;
pub mod selector;

pub use constraint::{CategoricalRatioConfig, CategoricalRatioConstraint, Constraint, ConstraintSet};
pub use convolution::{
    default_window_shape, rank_regions, rank_regions_with, Convolver, KBestNodesScore,
    RankedRegions, Region, ScanProgress, WindowConfig, WindowScore, WindowShape,
};
pub use groups::{
    get_groups_of_k_best_nodes, get_groups_of_k_best_nodes_with, split_k, GroupSearchConfig,
};
pub use init::InitStrategy;
pub use selector::{candidate_score, get_k_best_nodes, get_k_best_nodes_from_max_score};
