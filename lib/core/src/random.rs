//! Seeded random graph generation
//!
//! Produces reproducible graphs for tests, benchmarks and demos: nodes
//! uniformly spread over the unit square with integer scores in `[0, 100)`.
//! With properties enabled every node also gets a categorical `cat`
//! property (one of [`CATEGORIES`], drawn from a random mix) and a numeric
//! `num` property in `[0, 100)`.

use crate::error::Result;
use crate::graph::{GraphConfig, SpatialGraph};
use crate::node::Node;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Values of the generated `cat` property
pub const CATEGORIES: [&str; 3] = ["A", "B", "C"];

/// Parameters of a random graph
#[derive(Debug, Clone)]
pub struct RandomGraphConfig {
    pub n: usize,
    pub max_cost: Option<f64>,
    pub distance: String,
    pub edge_cost_offset: f64,
    pub with_properties: bool,
    /// Fixed seed for reproducible graphs; `None` draws from the OS
    pub seed: Option<u64>,
}

impl Default for RandomGraphConfig {
    fn default() -> Self {
        Self {
            n: 100,
            max_cost: Some(0.4),
            distance: "euclidean".to_string(),
            edge_cost_offset: 0.0,
            with_properties: false,
            seed: None,
        }
    }
}

/// Generate `n` nodes with ids `0..n`
pub fn random_nodes(n: usize, with_properties: bool, seed: Option<u64>) -> Vec<Node> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let xs: Vec<f64> = (0..n).map(|_| rng.random::<f64>()).collect();
    let ys: Vec<f64> = (0..n).map(|_| rng.random::<f64>()).collect();
    let scores: Vec<u32> = (0..n).map(|_| rng.random_range(0..100)).collect();

    let mut nodes: Vec<Node> = (0..n)
        .map(|i| Node::new(i as i64, xs[i], ys[i], f64::from(scores[i])))
        .collect();

    if with_properties {
        let mix = dirichlet_uniform(&mut rng, CATEGORIES.len());
        for node in nodes.iter_mut() {
            let category = CATEGORIES[sample_index(&mut rng, &mix)];
            node.properties.insert("cat".to_string(), category.into());
        }
        for node in nodes.iter_mut() {
            let num: u32 = rng.random_range(0..100);
            node.properties.insert("num".to_string(), num.into());
        }
    }

    nodes
}

/// Build a graph over [`random_nodes`]
pub fn random_graph(config: &RandomGraphConfig) -> Result<SpatialGraph> {
    let nodes = random_nodes(config.n, config.with_properties, config.seed);
    SpatialGraph::build(
        nodes,
        &GraphConfig {
            distance: config.distance.clone(),
            max_cost: config.max_cost,
            edge_cost_offset: config.edge_cost_offset,
        },
    )
}

/// Dirichlet(1, ..., 1) sample: normalized unit exponentials
fn dirichlet_uniform(rng: &mut StdRng, len: usize) -> Vec<f64> {
    let draws: Vec<f64> = (0..len).map(|_| -(1.0 - rng.random::<f64>()).ln()).collect();
    let total: f64 = draws.iter().sum();
    if total > 0.0 {
        draws.into_iter().map(|d| d / total).collect()
    } else {
        vec![1.0 / len as f64; len]
    }
}

fn sample_index(rng: &mut StdRng, probabilities: &[f64]) -> usize {
    let u = rng.random::<f64>();
    let mut cumulative = 0.0;
    for (i, p) in probabilities.iter().enumerate() {
        cumulative += p;
        if u < cumulative {
            return i;
        }
    }
    probabilities.len() - 1
}
