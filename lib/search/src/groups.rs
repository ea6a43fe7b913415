// Multi-group search over convolution-ranked regions
use crate::constraint::ConstraintSet;
use crate::convolution::{rank_regions_with, KBestNodesScore, WindowConfig, WindowScore};
use crate::init::InitStrategy;
use crate::selector::get_k_best_nodes;
use kbnpath_core::{Error, Node, Result, SpatialGraph};
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use tracing::{debug, info, warn};

/// Configuration for [`get_groups_of_k_best_nodes`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSearchConfig {
    /// Total number of nodes to select across all groups
    pub total_k: usize,
    pub n_groups: usize,
    /// Maximum number of region attempts; `3 * n_groups` when `None`
    pub max_iter: Option<usize>,
    pub init: InitStrategy,
    pub window: WindowConfig,
}

impl Default for GroupSearchConfig {
    fn default() -> Self {
        Self {
            total_k: 10,
            n_groups: 5,
            max_iter: None,
            init: InitStrategy::MaxScore,
            window: WindowConfig::default(),
        }
    }
}

impl GroupSearchConfig {
    #[inline]
    #[must_use]
    pub fn new(total_k: usize, n_groups: usize) -> Self {
        Self {
            total_k,
            n_groups,
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = Some(max_iter);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_init(mut self, init: InitStrategy) -> Self {
        self.init = init;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    /// Effective attempt bound
    pub fn max_iter(&self) -> usize {
        self.max_iter.unwrap_or(3 * self.n_groups)
    }

    pub fn validate(&self) -> Result<()> {
        if self.total_k < self.n_groups {
            return Err(Error::InvalidConfig(format!(
                "total_k ({}) must be at least n_groups ({})",
                self.total_k, self.n_groups
            )));
        }
        self.window.validate()
    }
}

/// Split `total_k` into `n_groups` sizes, the remainder going to the first groups
pub fn split_k(total_k: usize, n_groups: usize) -> Vec<usize> {
    if n_groups == 0 {
        return Vec::new();
    }
    let (base, rest) = (total_k / n_groups, total_k % n_groups);
    (0..n_groups).map(|i| base + usize::from(i < rest)).collect()
}

/// [`get_groups_of_k_best_nodes_with`] using [`KBestNodesScore`] to rank regions
pub fn get_groups_of_k_best_nodes(
    graph: &mut SpatialGraph,
    config: &GroupSearchConfig,
    constraints: &mut ConstraintSet,
) -> Result<Vec<Vec<Node>>> {
    get_groups_of_k_best_nodes_with(graph, config, constraints, &KBestNodesScore)
}

/// Select up to `n_groups` disjoint chains, one per ranked region
///
/// Each attempt takes the next-ranked region, extracts it as a subgraph and
/// builds a chain inside it. A chain of the required size is accepted and its
/// nodes are deactivated in `graph`; a shorter one has its constraint state
/// reverted and the next region is tried. Stops after `n_groups` accepted
/// chains, after `max_iter` attempts or when regions run out, returning the
/// groups found so far.
///
/// Regions are ranked for the size of the first groups. When the group size
/// drops by one (see [`split_k`]), the remaining graph is ranked again for
/// the smaller size so that windows holding exactly that many nodes qualify.
///
/// # Arguments
/// * `graph` - Parent graph; loses the nodes of accepted chains
/// * `config` - Group sizes, attempt bound, start strategy and window
/// * `constraints` - Shared by every group of the episode
/// * `scorer` - Region ranking function
///
/// # Returns
/// The accepted chains, in acceptance order
pub fn get_groups_of_k_best_nodes_with<S>(
    graph: &mut SpatialGraph,
    config: &GroupSearchConfig,
    constraints: &mut ConstraintSet,
    scorer: &S,
) -> Result<Vec<Vec<Node>>>
where
    S: WindowScore + ?Sized,
{
    if config.n_groups == 0 {
        return Ok(Vec::new());
    }
    config.validate()?;

    let k_values = split_k(config.total_k, config.n_groups);
    let max_iter = config.max_iter();
    let rank = |graph: &SpatialGraph, k: usize| {
        rank_regions_with(graph, k, &config.window, scorer, |_| ControlFlow::Continue(()))
    };
    let mut ranked_k = k_values[0];
    let mut regions = rank(graph, ranked_k)?;
    info!(
        regions = regions.remaining(),
        groups = config.n_groups,
        total_k = config.total_k,
        max_iter,
        "Group search started"
    );

    let mut groups: Vec<Vec<Node>> = Vec::with_capacity(config.n_groups);
    let mut attempts = 0;

    while groups.len() < config.n_groups && attempts < max_iter {
        let k = k_values[groups.len()];
        if k != ranked_k {
            regions = rank(graph, k)?;
            ranked_k = k;
            debug!(k, regions = regions.remaining(), "Regions ranked for smaller groups");
        }

        let Some(region) = regions.next() else {
            warn!(attempts, "No candidate region left");
            break;
        };
        attempts += 1;

        let mut subgraph = graph.subgraph(&region.node_ids);
        let Some(start) = config.init.select(&subgraph).map(|node| node.id.clone()) else {
            debug!(x = region.x, y = region.y, "Region has no active node left");
            continue;
        };

        let chain = get_k_best_nodes(&mut subgraph, &start, k, constraints)?;
        if chain.len() == k {
            for node in &chain {
                graph.deactivate_node(&node.id)?;
            }
            info!(group = groups.len() + 1, size = k, attempts, "Group found");
            groups.push(chain);
        } else {
            debug!(found = chain.len(), required = k, "Chain rejected");
            constraints.revert_all(&chain);
        }
    }

    if groups.len() < config.n_groups {
        warn!(
            found = groups.len(),
            requested = config.n_groups,
            attempts,
            "Group search ended with fewer groups than requested"
        );
    }

    Ok(groups)
}
