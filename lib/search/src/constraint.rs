//! Soft constraints on chain composition
//!
//! A constraint derates a candidate's score toward a composition target.
//! Constraints carry mutable state that follows the nodes locked into a
//! chain; every `update_state` for a node must be paired with a
//! `revert_state` when the chain holding it is rejected.

use kbnpath_core::{Error, Node, Result, SpatialGraph};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A pluggable penalty rule
pub trait Constraint {
    /// Candidate score after applying this constraint's penalty
    fn penalize_score(&self, candidate: &Node) -> Result<f64>;

    /// Record that `node` joined the current chain
    fn update_state(&mut self, _node: &Node) {}

    /// Undo a previous [`Constraint::update_state`] for `node`
    fn revert_state(&mut self, _node: &Node) {}
}

/// The constraints active during one search episode
///
/// Build a fresh set per search; state is never shared between episodes.
#[derive(Default)]
pub struct ConstraintSet {
    constraints: Vec<Box<dyn Constraint>>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, constraint: impl Constraint + 'static) -> Self {
        self.push(Box::new(constraint));
        self
    }

    pub fn push(&mut self, constraint: Box<dyn Constraint>) {
        self.constraints.push(constraint);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// `min(score, penalize_score(candidate))` over every constraint
    ///
    /// A candidate is only as good as its worst criterion.
    pub fn worst_score(&self, candidate: &Node, score: f64) -> Result<f64> {
        self.constraints.iter().try_fold(score, |worst, constraint| -> Result<f64> {
            Ok(worst.min(constraint.penalize_score(candidate)?))
        })
    }

    pub fn update(&mut self, node: &Node) {
        for constraint in &mut self.constraints {
            constraint.update_state(node);
        }
    }

    pub fn revert(&mut self, node: &Node) {
        for constraint in &mut self.constraints {
            constraint.revert_state(node);
        }
    }

    pub fn revert_all(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.revert(node);
        }
    }
}

impl std::fmt::Debug for ConstraintSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintSet")
            .field("constraints", &self.constraints.len())
            .finish()
    }
}

/// Parameters of a [`CategoricalRatioConstraint`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalRatioConfig {
    /// Name of the tracked node property
    pub property: String,
    /// Target share of the selection per category
    pub objectives: BTreeMap<String, f64>,
    /// Planned selection size
    pub k: usize,
}

/// Steers a selection toward target category ratios
///
/// Each category has a target count `floor(k * ratio)`. Once a category
/// fills up, candidates of that category lose up to the category's mean
/// score, so only above-average ones stay attractive. Categories without
/// a target count as already satisfied.
#[derive(Debug, Clone)]
pub struct CategoricalRatioConstraint {
    property: String,
    objectives: BTreeMap<String, f64>,
    objectives_counts: BTreeMap<String, usize>,
    category_counts: BTreeMap<String, usize>,
    category_means: BTreeMap<String, f64>,
    k: usize,
}

impl CategoricalRatioConstraint {
    /// Create the constraint; category means are taken from `graph` once
    pub fn new(config: CategoricalRatioConfig, graph: &SpatialGraph) -> Result<Self> {
        if config.property.is_empty() {
            return Err(Error::InvalidConfig("constraint property name is empty".to_string()));
        }
        for (category, ratio) in &config.objectives {
            if !ratio.is_finite() || *ratio < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "ratio for category '{}' must be a non-negative number, got {}",
                    category, ratio
                )));
            }
        }

        let objectives_counts = config
            .objectives
            .iter()
            .map(|(category, ratio)| (category.clone(), (config.k as f64 * ratio).floor() as usize))
            .collect();
        let category_counts = config.objectives.keys().map(|c| (c.clone(), 0)).collect();
        let category_means = Self::compute_category_means(&config.property, graph);

        Ok(Self {
            property: config.property,
            objectives: config.objectives,
            objectives_counts,
            category_counts,
            category_means,
            k: config.k,
        })
    }

    /// Mean score per category over nodes carrying the property, rounded to 2 decimals
    fn compute_category_means(property: &str, graph: &SpatialGraph) -> BTreeMap<String, f64> {
        let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        for node in graph.nodes() {
            if let Some(category) = node.category(property) {
                let entry = sums.entry(category).or_insert((0.0, 0));
                entry.0 += node.score;
                entry.1 += 1;
            }
        }
        sums.into_iter()
            .map(|(category, (sum, count))| (category, round_to(sum / count as f64, 2)))
            .collect()
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn objectives(&self) -> &BTreeMap<String, f64> {
        &self.objectives
    }

    pub fn objectives_counts(&self) -> &BTreeMap<String, usize> {
        &self.objectives_counts
    }

    pub fn category_counts(&self) -> &BTreeMap<String, usize> {
        &self.category_counts
    }

    pub fn category_means(&self) -> &BTreeMap<String, f64> {
        &self.category_means
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Share of the target reached by `category`, rounded to 4 decimals
    pub fn completion(&self, category: &str) -> f64 {
        match self.objectives_counts.get(category) {
            Some(&target) if target != 0 => {
                let count = self.category_counts.get(category).copied().unwrap_or(0);
                round_to(count as f64 / target as f64, 4)
            }
            _ => 1.0,
        }
    }

    /// Completion of every objective category
    pub fn completion_state(&self) -> BTreeMap<String, f64> {
        self.objectives
            .keys()
            .map(|category| (category.clone(), self.completion(category)))
            .collect()
    }
}

impl Constraint for CategoricalRatioConstraint {
    fn penalize_score(&self, candidate: &Node) -> Result<f64> {
        let category = candidate.category(&self.property).ok_or_else(|| Error::MissingProperty {
            node: candidate.id.clone(),
            property: self.property.clone(),
        })?;
        let mean = self.category_means.get(&category).copied().unwrap_or(0.0);
        let penalized = candidate.score - mean * self.completion(&category);
        Ok(if penalized > 0.0 { round_to(penalized, 2) } else { 0.0 })
    }

    fn update_state(&mut self, node: &Node) {
        if let Some(category) = node.category(&self.property) {
            *self.category_counts.entry(category).or_insert(0) += 1;
        }
    }

    fn revert_state(&mut self, node: &Node) {
        if let Some(category) = node.category(&self.property) {
            if let Some(count) = self.category_counts.get_mut(&category) {
                *count = count.saturating_sub(1);
            }
        }
    }
}

#[inline]
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
