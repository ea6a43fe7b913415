//! Convolution windowing
//!
//! Slides a rectangular window over the graph's bounding box and ranks every
//! position holding at least `k` nodes. Multi-group search consumes the
//! ranking one region at a time instead of trying every start node.

use ahash::AHashSet;
use kbnpath_core::{Error, NodeId, Result, SpatialGraph};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::ops::ControlFlow;
use tracing::{debug, info};

/// Window extent along each axis, in coordinate units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowShape {
    pub width: f64,
    pub height: f64,
}

impl WindowShape {
    #[inline]
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Configuration for region ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Fixed window shape; derived from node density when `None`
    pub shape: Option<WindowShape>,
    /// Share of a window kept in the next one along each axis, in `[0, 1)`
    pub overlap: f64,
    /// Lower bound on the window's share of the bounding-box area
    pub min_area_ratio: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            shape: None,
            overlap: 0.75,
            min_area_ratio: 0.1,
        }
    }
}

impl WindowConfig {
    #[inline]
    #[must_use]
    pub fn with_shape(mut self, width: f64, height: f64) -> Self {
        self.shape = Some(WindowShape::new(width, height));
        self
    }

    #[inline]
    #[must_use]
    pub fn with_overlap(mut self, overlap: f64) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.overlap) {
            return Err(Error::InvalidConfig(format!(
                "window overlap must be in [0, 1), got {}",
                self.overlap
            )));
        }
        if !(self.min_area_ratio > 0.0 && self.min_area_ratio <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "min_area_ratio must be in (0, 1], got {}",
                self.min_area_ratio
            )));
        }
        if let Some(shape) = self.shape {
            let valid = |side: f64| side.is_finite() && side > 0.0;
            if !valid(shape.width) || !valid(shape.height) {
                return Err(Error::InvalidConfig(format!(
                    "window shape must be positive, got {} x {}",
                    shape.width, shape.height
                )));
            }
        }
        Ok(())
    }
}

/// Scores the nodes found in one window position
pub trait WindowScore {
    fn score(&self, graph: &SpatialGraph, node_ids: &[NodeId], k: usize) -> f64;
}

impl<F> WindowScore for F
where
    F: Fn(&SpatialGraph, &[NodeId], usize) -> f64,
{
    fn score(&self, graph: &SpatialGraph, node_ids: &[NodeId], k: usize) -> f64 {
        self(graph, node_ids, k)
    }
}

/// Sum of the `k` highest node scores in the window
#[derive(Debug, Clone, Copy, Default)]
pub struct KBestNodesScore;

impl WindowScore for KBestNodesScore {
    fn score(&self, graph: &SpatialGraph, node_ids: &[NodeId], k: usize) -> f64 {
        let mut scores: Vec<f64> = node_ids
            .iter()
            .filter_map(|id| graph.node(id))
            .map(|node| node.score)
            .collect();
        let descending = |a: &f64, b: &f64| OrderedFloat(*b).cmp(&OrderedFloat(*a));
        if k < scores.len() {
            scores.select_nth_unstable_by(k, descending);
            scores.truncate(k);
        }
        scores.iter().sum()
    }
}

/// Point lookup by window frame
///
/// Points are kept sorted by x so a frame query only visits the x slice it
/// overlaps. Frame bounds are inclusive on both ends.
#[derive(Debug, Clone)]
pub struct Convolver {
    points: Vec<(NodeId, f64, f64)>,
    shape: WindowShape,
}

impl Convolver {
    pub fn new(graph: &SpatialGraph, shape: WindowShape) -> Self {
        let mut points = graph.coordinates();
        points.sort_by(|a, b| a.1.total_cmp(&b.1));
        Self { points, shape }
    }

    #[inline]
    pub fn shape(&self) -> WindowShape {
        self.shape
    }

    /// Ids of the points inside the frame anchored at `(x_min, y_min)`, sorted
    pub fn ids_in_frame(&self, x_min: f64, y_min: f64) -> Vec<NodeId> {
        let x_max = x_min + self.shape.width;
        let y_max = y_min + self.shape.height;
        let start = self.points.partition_point(|p| p.1 < x_min);
        let end = self.points.partition_point(|p| p.1 <= x_max);

        let mut ids: Vec<NodeId> = self.points[start..end.max(start)]
            .iter()
            .filter(|p| p.2 >= y_min && p.2 <= y_max)
            .map(|p| p.0.clone())
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// A window position that holds at least `k` nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    /// Ids of the nodes inside the window, sorted
    pub node_ids: Vec<NodeId>,
    pub score: f64,
    /// Window origin
    pub x: f64,
    pub y: f64,
}

/// Scan state passed to the progress hook after each window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    pub scanned: usize,
    pub total: usize,
    pub kept: usize,
}

/// Ranked regions, best first, consumed one at a time
#[derive(Debug, Clone)]
pub struct RankedRegions {
    regions: VecDeque<Region>,
    shape: WindowShape,
}

impl RankedRegions {
    fn empty(shape: WindowShape) -> Self {
        Self {
            regions: VecDeque::new(),
            shape,
        }
    }

    /// Window shape used for the scan
    #[inline]
    pub fn shape(&self) -> WindowShape {
        self.shape
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.regions.len()
    }

    #[inline]
    pub fn peek(&self) -> Option<&Region> {
        self.regions.front()
    }
}

impl Iterator for RankedRegions {
    type Item = Region;

    fn next(&mut self) -> Option<Region> {
        self.regions.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.regions.len(), Some(self.regions.len()))
    }
}

impl ExactSizeIterator for RankedRegions {}

/// Window shape whose area share of the bounding box is `max(k / n, min_area_ratio)`
///
/// Returns `None` for an empty graph.
pub fn default_window_shape(
    graph: &SpatialGraph,
    k: usize,
    min_area_ratio: f64,
) -> Option<WindowShape> {
    let bb = graph.bounding_box()?;
    let ratio = (k as f64 / graph.node_count() as f64).max(min_area_ratio);
    let side = ratio.sqrt();
    Some(WindowShape::new(side * bb.width(), side * bb.height()))
}

/// Rank regions with [`KBestNodesScore`]
pub fn rank_regions(
    graph: &SpatialGraph,
    k: usize,
    config: &WindowConfig,
) -> Result<RankedRegions> {
    rank_regions_with(graph, k, config, &KBestNodesScore, |_| ControlFlow::Continue(()))
}

/// Scan every window position and rank the ones holding at least `k` nodes
///
/// Regions are sorted by descending score; equal scores keep scan order
/// (x-major, then y). A window whose node set was already seen is dropped.
/// Returning `ControlFlow::Break` from `progress` stops the scan and ranks
/// what was found so far.
///
/// # Arguments
/// * `graph` - Graph whose active nodes are scanned
/// * `k` - Minimum node count of a region, also passed to the scorer
/// * `config` - Window shape and overlap
/// * `scorer` - Region scoring function
/// * `progress` - Called after every window position
///
/// # Returns
/// The ranked regions
pub fn rank_regions_with<S, P>(
    graph: &SpatialGraph,
    k: usize,
    config: &WindowConfig,
    scorer: &S,
    mut progress: P,
) -> Result<RankedRegions>
where
    S: WindowScore + ?Sized,
    P: FnMut(&ScanProgress) -> ControlFlow<()>,
{
    if k == 0 {
        return Err(Error::InvalidConfig("k must be at least 1 to rank regions".to_string()));
    }
    config.validate()?;

    let Some(bb) = graph.bounding_box() else {
        return Ok(RankedRegions::empty(config.shape.unwrap_or(WindowShape::new(0.0, 0.0))));
    };
    let shape = match config.shape {
        Some(shape) => shape,
        None => default_window_shape(graph, k, config.min_area_ratio)
            .unwrap_or(WindowShape::new(0.0, 0.0)),
    };

    let step_x = shape.width * (1.0 - config.overlap);
    let step_y = shape.height * (1.0 - config.overlap);
    let xs = positions(bb.min_x, bb.max_x, step_x);
    let ys = positions(bb.min_y, bb.max_y, step_y);
    let total = xs.len() * ys.len();

    info!(
        width = shape.width,
        height = shape.height,
        step_x,
        step_y,
        windows = total,
        "Convolution window"
    );

    let convolver = Convolver::new(graph, shape);
    let mut seen: AHashSet<Vec<NodeId>> = AHashSet::new();
    let mut regions = Vec::new();
    let mut scanned = 0;

    'scan: for &x in &xs {
        for &y in &ys {
            scanned += 1;
            let node_ids = convolver.ids_in_frame(x, y);
            if node_ids.len() >= k && !seen.contains(&node_ids) {
                let score = scorer.score(graph, &node_ids, k);
                seen.insert(node_ids.clone());
                regions.push(Region { node_ids, score, x, y });
            }

            let state = ScanProgress {
                scanned,
                total,
                kept: regions.len(),
            };
            if progress(&state).is_break() {
                info!(scanned, total, "Convolution scan stopped early");
                break 'scan;
            }
        }
    }

    regions.sort_by(|a, b| OrderedFloat(b.score).cmp(&OrderedFloat(a.score)));
    debug!(regions = regions.len(), scanned, "Regions ranked");

    Ok(RankedRegions {
        regions: regions.into(),
        shape,
    })
}

/// Window origins from `min` by `step`, strictly below `max`
///
/// A zero extent or zero step yields the single origin `min`.
fn positions(min: f64, max: f64, step: f64) -> Vec<f64> {
    let extent = max - min;
    if !(extent > 0.0 && step > 0.0) {
        return vec![min];
    }
    let count = (extent / step).ceil() as usize;
    (0..count).map(|i| min + i as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbnpath_core::{random_graph, GraphConfig, Node, RandomGraphConfig};

    fn build(nodes: Vec<Node>) -> SpatialGraph {
        SpatialGraph::build(nodes, &GraphConfig::default()).unwrap()
    }

    fn ids(values: &[i64]) -> Vec<NodeId> {
        values.iter().copied().map(NodeId::from).collect()
    }

    fn two_clusters() -> SpatialGraph {
        build(vec![
            Node::new(0, 0.0, 0.0, 10.0),
            Node::new(1, 0.5, 0.0, 10.0),
            Node::new(2, 0.0, 0.5, 10.0),
            Node::new(3, 4.0, 4.0, 50.0),
            Node::new(4, 4.5, 4.0, 50.0),
            Node::new(5, 2.0, 2.0, 1.0),
        ])
    }

    #[test]
    fn test_ids_in_frame_bounds_are_inclusive() {
        let graph = build(vec![
            Node::new(0, 0.1, 0.1, 1.0),
            Node::new(1, 0.115, 0.11, 1.0),
            Node::new(2, 0.3, 0.5, 1.0),
        ]);
        let convolver = Convolver::new(&graph, WindowShape::new(0.1, 0.1));

        assert_eq!(convolver.ids_in_frame(0.1, 0.1), ids(&[0, 1]));
        assert_eq!(convolver.ids_in_frame(0.0, 0.0), ids(&[0]));
        assert_eq!(convolver.ids_in_frame(0.25, 0.45), ids(&[2]));
        assert!(convolver.ids_in_frame(0.5, 0.5).is_empty());
    }

    #[test]
    fn test_default_window_shape() {
        let mut nodes = vec![Node::new(0, 0.0, 0.0, 1.0), Node::new(1, 1.0, 1.0, 1.0)];
        nodes.extend((2..10).map(|i| Node::new(i, 0.1 * i as f64, 0.5, 1.0)));
        let graph = build(nodes);

        let small = default_window_shape(&graph, 1, 0.1).unwrap();
        assert!((small.width - 0.1f64.sqrt()).abs() < 1e-12);
        assert!((small.height - 0.1f64.sqrt()).abs() < 1e-12);

        let large = default_window_shape(&graph, 5, 0.1).unwrap();
        assert!((large.width - 0.5f64.sqrt()).abs() < 1e-12);

        let empty = build(vec![]);
        assert!(default_window_shape(&empty, 3, 0.1).is_none());
    }

    #[test]
    fn test_sparse_windows_skipped_and_sorted() {
        let graph = two_clusters();
        let config = WindowConfig::default().with_shape(1.0, 1.0).with_overlap(0.0);
        let mut last = None;
        let ranked = rank_regions_with(&graph, 2, &config, &KBestNodesScore, |p| {
            last = Some(*p);
            ControlFlow::Continue(())
        })
        .unwrap();

        let last = last.unwrap();
        assert_eq!((last.scanned, last.total, last.kept), (25, 25, 2));

        let regions: Vec<Region> = ranked.collect();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].node_ids, ids(&[3, 4]));
        assert_eq!(regions[0].score, 100.0);
        // The first window holding {3, 4} in scan order is kept
        assert_eq!((regions[0].x, regions[0].y), (4.0, 3.0));
        assert_eq!(regions[1].node_ids, ids(&[0, 1, 2]));
        assert_eq!(regions[1].score, 20.0);
    }

    #[test]
    fn test_degenerate_axis_gets_single_position() {
        let graph = build(vec![
            Node::new(0, 0.0, 0.0, 5.0),
            Node::new(1, 1.0, 0.0, 10.0),
            Node::new(2, 2.0, 0.0, 20.0),
        ]);
        let ranked = rank_regions(&graph, 2, &WindowConfig::default()).unwrap();
        assert_eq!(ranked.shape().height, 0.0);

        let regions: Vec<Region> = ranked.collect();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].node_ids, ids(&[1, 2]));
        assert_eq!(regions[0].score, 30.0);
        assert_eq!(regions[1].node_ids, ids(&[0, 1]));
    }

    #[test]
    fn test_ranked_regions_consumed_one_at_a_time() {
        let graph = two_clusters();
        let config = WindowConfig::default().with_shape(1.0, 1.0).with_overlap(0.0);
        let mut ranked = rank_regions(&graph, 2, &config).unwrap();

        assert_eq!(ranked.remaining(), 2);
        assert_eq!(ranked.peek().unwrap().score, 100.0);
        assert_eq!(ranked.next().unwrap().score, 100.0);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked.next().unwrap().score, 20.0);
        assert!(ranked.next().is_none());
    }

    #[test]
    fn test_progress_break_stops_scan() {
        let graph = random_graph(&RandomGraphConfig {
            n: 100,
            seed: Some(21),
            ..Default::default()
        })
        .unwrap();
        let mut calls = 0;
        let ranked = rank_regions_with(&graph, 5, &WindowConfig::default(), &KBestNodesScore, |p| {
            calls += 1;
            if p.scanned == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();

        assert_eq!(calls, 3);
        assert!(ranked.remaining() <= 3);
    }

    #[test]
    fn test_regions_sorted_and_large_enough() {
        let graph = random_graph(&RandomGraphConfig {
            n: 200,
            seed: Some(8),
            ..Default::default()
        })
        .unwrap();
        let regions: Vec<Region> = rank_regions(&graph, 4, &WindowConfig::default())
            .unwrap()
            .collect();

        assert!(!regions.is_empty());
        assert!(regions.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(regions.iter().all(|r| r.node_ids.len() >= 4));
        let unique: AHashSet<&Vec<NodeId>> = regions.iter().map(|r| &r.node_ids).collect();
        assert_eq!(unique.len(), regions.len());
    }

    #[test]
    fn test_custom_scorer() {
        let graph = two_clusters();
        let config = WindowConfig::default().with_shape(1.0, 1.0).with_overlap(0.0);
        let by_count = |_: &SpatialGraph, node_ids: &[NodeId], _: usize| node_ids.len() as f64;
        let regions: Vec<Region> =
            rank_regions_with(&graph, 2, &config, &by_count, |_| ControlFlow::Continue(()))
                .unwrap()
                .collect();

        assert_eq!(regions[0].node_ids, ids(&[0, 1, 2]));
        assert_eq!(regions[0].score, 3.0);
    }

    #[test]
    fn test_invalid_config() {
        let graph = two_clusters();
        let overlap = WindowConfig::default().with_overlap(1.0);
        assert!(matches!(rank_regions(&graph, 2, &overlap), Err(Error::InvalidConfig(_))));

        let shape = WindowConfig::default().with_shape(0.0, 1.0);
        assert!(matches!(rank_regions(&graph, 2, &shape), Err(Error::InvalidConfig(_))));

        assert!(matches!(
            rank_regions(&graph, 0, &WindowConfig::default()),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_graph() {
        let graph = build(vec![]);
        let ranked = rank_regions(&graph, 3, &WindowConfig::default()).unwrap();
        assert_eq!(ranked.remaining(), 0);
    }
}
