//! Node records from JSON
//!
//! A node file holds a JSON array of records:
//!
//! ```json
//! [
//!   {"id": 1, "x": 2.35, "y": 48.85, "score": 87, "cat": "museum"},
//!   {"id": "louvre", "x": 2.33, "y": 48.86, "score": 95, "properties": {"cat": "museum"}}
//! ]
//! ```
//!
//! Fields other than `id`, `x`, `y`, `score` and `properties` become node
//! properties; on a key clash the `properties` entry wins.

use kbnpath_core::{Node, NodeId, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct NodeRecord {
    id: NodeId,
    x: f64,
    y: f64,
    score: f64,
    #[serde(default)]
    properties: Map<String, Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<NodeRecord> for Node {
    fn from(record: NodeRecord) -> Self {
        let mut node = Node::new(record.id, record.x, record.y, record.score);
        node.properties.extend(record.extra);
        node.properties.extend(record.properties);
        node
    }
}

/// Parse nodes from a JSON array of records
pub fn parse_nodes(json: &str) -> Result<Vec<Node>> {
    let records: Vec<NodeRecord> = serde_json::from_str(json)?;
    Ok(records.into_iter().map(Node::from).collect())
}

/// Read nodes from a JSON file
pub fn read_nodes(path: impl AsRef<Path>) -> Result<Vec<Node>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let records: Vec<NodeRecord> = serde_json::from_reader(reader)?;
    debug!(path = %path.display(), nodes = records.len(), "Node records loaded");
    Ok(records.into_iter().map(Node::from).collect())
}
