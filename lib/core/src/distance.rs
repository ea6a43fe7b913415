//! Distance functions used as edge costs
//!
//! Distances are looked up by name in an explicit [`DistanceRegistry`].
//! The built-in registry knows `euclidean` (also spelled `euclidian`),
//! `manhattan` and `haversine`.

use crate::error::{Error, Result};
use crate::node::Node;
use std::collections::BTreeMap;

/// Signature of a node-to-node cost function.
pub type DistanceFn = fn(&Node, &Node) -> f64;

/// Mean Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A named distance function, as stored by a graph.
#[derive(Clone, Copy)]
pub struct Distance {
    name: &'static str,
    fun: DistanceFn,
}

impl Distance {
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn cost(&self, a: &Node, b: &Node) -> f64 {
        (self.fun)(a, b)
    }
}

impl std::fmt::Debug for Distance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Distance").field("name", &self.name).finish()
    }
}

/// Name to function table, built explicitly and queried by name.
#[derive(Debug, Clone)]
pub struct DistanceRegistry {
    distances: BTreeMap<&'static str, Distance>,
}

impl DistanceRegistry {
    /// An empty registry
    pub fn empty() -> Self {
        Self {
            distances: BTreeMap::new(),
        }
    }

    /// Registry holding the built-in distances
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("euclidean", euclidean);
        registry.register("euclidian", euclidean);
        registry.register("manhattan", manhattan);
        registry.register("haversine", haversine);
        registry
    }

    /// Register `fun` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: &'static str, fun: DistanceFn) {
        self.distances.insert(name, Distance { name, fun });
    }

    /// Look up a distance by name
    ///
    /// # Errors
    /// [`Error::UnknownDistance`] listing every registered name.
    pub fn get(&self, name: &str) -> Result<Distance> {
        self.distances.get(name).copied().ok_or_else(|| Error::UnknownDistance {
            name: name.to_string(),
            available: self.names().join(", "),
        })
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&'static str> {
        self.distances.keys().copied().collect()
    }
}

impl Default for DistanceRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Straight-line distance between node coordinates
pub fn euclidean(a: &Node, b: &Node) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Sum of absolute coordinate differences
pub fn manhattan(a: &Node, b: &Node) -> f64 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Great-circle distance in kilometers
///
/// Reads `x` as longitude and `y` as latitude, both in degrees.
pub fn haversine(a: &Node, b: &Node) -> f64 {
    let (lat1, lat2) = (a.y.to_radians(), b.y.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.x - a.x).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}
