use crate::node::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid distance name '{name}'. Implemented distances are: [{available}]")]
    UnknownDistance { name: String, available: String },

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node id [{0}] does not exist in the graph's deactivated nodes")]
    DeactivatedNodeNotFound(NodeId),

    #[error("Node already exists: {0}")]
    DuplicateNode(NodeId),

    #[error("Node {node} has no value for tracked property '{property}'")]
    MissingProperty { node: NodeId, property: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
