use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Identifier of a node. Integer ids order before string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Integer(i64),
    String(String),
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeId::Integer(i) => write!(f, "{}", i),
            NodeId::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for NodeId {
    fn from(i: i64) -> Self {
        NodeId::Integer(i)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId::String(s)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId::String(s.to_string())
    }
}

/// A spatial point with a desirability score and an open property map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub score: f64,
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

impl Node {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<NodeId>, x: f64, y: f64, score: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            score,
            properties: HashMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    #[inline]
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// String form of a scalar property, used as a category key.
    ///
    /// Returns `None` when the property is absent, null, or not a scalar.
    pub fn category(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}
