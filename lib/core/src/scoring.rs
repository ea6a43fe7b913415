//! Neighborhood-aware node scoring
//!
//! A neighbor contributes its *relative score*: its own score discounted by
//! the share of the admissible cost budget spent reaching it. A node's
//! *regional score* blends its own score with the relative scores of a
//! sample of its neighbors.

/// Score of a neighbor reached through an edge of cost `edge_cost`
///
/// `score * (1 - edge_cost / max_cost)`. A zero `max_cost` leaves the score
/// undiscounted.
#[inline]
pub fn relative_score(score: f64, edge_cost: f64, max_cost: f64) -> f64 {
    if max_cost == 0.0 {
        return score;
    }
    score * (1.0 - edge_cost / max_cost)
}

/// Mean of the node score and its neighbors' relative scores
///
/// With no neighbors this is exactly `node_score`.
pub fn regional_score<I>(node_score: f64, neighbor_relative_scores: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = neighbor_relative_scores
        .into_iter()
        .fold((node_score, 0usize), |(sum, count), s| (sum + s, count + 1));
    sum / (count + 1) as f64
}
