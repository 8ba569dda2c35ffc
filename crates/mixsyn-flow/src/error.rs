//! Error types for the mixed synthesis flow

use mixsyn_ml::MlError;
use mixsyn_net::{NetError, PartitionId, Region};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FlowError>;

fn join_ids(ids: &[PartitionId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Invalid run configuration, detected before any optimization
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Global AIG and global MIG optimization are mutually exclusive")]
    ConflictingGlobalFlags,

    #[error("Partitions forced into more than one set: {}", join_ids(.0))]
    ConflictingOverrides(Vec<PartitionId>),

    #[error(transparent)]
    Ml(#[from] MlError),

    #[error("Failed to read run configuration: {0}")]
    Read(String),

    #[error("Failed to parse run configuration: {0}")]
    Parse(String),

    #[error("Failed to serialize run configuration: {0}")]
    Serialize(String),

    #[error("Failed to write run configuration: {0}")]
    Write(String),
}

/// Failure to stitch optimized regions back together
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("Optimized region {region} has {found} ports, expected {expected}")]
    InterfaceMismatch {
        region: Region,
        expected: usize,
        found: usize,
    },

    #[error("Node {0} is read outside its region but is not a region output")]
    MissingRoot(mixsyn_net::NodeId),

    #[error(transparent)]
    Net(#[from] NetError),
}

/// Errors surfaced by a mixed synthesis run
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("{0}")]
    Precondition(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Assembly failed: {0}")]
    Assemble(#[from] AssembleError),

    #[error("{0} is not an accepted output file {{.v, .blif}}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Net(#[from] NetError),

    #[error(transparent)]
    Ml(#[from] MlError),
}
