//! Error types for network construction, partitioning and file handling

use crate::network::NodeId;
use crate::partition::PartitionId;
use thiserror::Error;

/// Result type for network operations
pub type NetResult<T> = std::result::Result<T, NetError>;

/// Errors that can occur while building, partitioning or storing networks
#[derive(Debug, Error)]
pub enum NetError {
    /// Node is not a latch
    #[error("Node {0} is not a latch")]
    NotALatch(NodeId),

    /// Signal refers to a node that does not exist
    #[error("Signal refers to missing node {0}")]
    DanglingSignal(NodeId),

    /// Structural problem found while validating a network
    #[error("Malformed network: {0}")]
    Malformed(String),

    /// Partition assignment does not cover the network
    #[error("Partition assignment covers {assigned} nodes but the network has {nodes}")]
    AssignmentMismatch { assigned: usize, nodes: usize },

    /// Partition does not exist
    #[error("Unknown partition {0}")]
    UnknownPartition(PartitionId),

    /// I/O error reading or writing a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Design file could not be parsed
    #[error("Failed to parse design: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for NetError {
    fn from(err: serde_json::Error) -> Self {
        NetError::Parse(err.to_string())
    }
}
