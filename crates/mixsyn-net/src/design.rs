//! Design files
//!
//! A design file (JSON) bundles a network with an optional partition
//! assignment produced by an upstream partitioner.

use crate::error::{NetError, NetResult};
use crate::network::Network;
use crate::partition::{PartitionId, PartitionManager};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A network plus its (optional) partitioning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Design {
    /// The logic network
    pub network: Network,

    /// One partition ID per node, indexed by node ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partitions: Option<Vec<PartitionId>>,
}

impl Design {
    /// Create a design without a partitioning
    pub fn new(network: Network) -> Self {
        Self {
            network,
            partitions: None,
        }
    }

    /// Create a design with a partitioning
    pub fn with_partitions(network: Network, manager: &PartitionManager) -> Self {
        Self {
            network,
            partitions: Some(manager.assignment().to_vec()),
        }
    }

    /// Load a design from disk, validating the network and partitioning
    pub fn load(path: impl AsRef<Path>) -> NetResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let mut design: Design = serde_json::from_str(&contents)?;

        design.network.validate()?;
        design.network.rebuild_strash();
        if let Some(assignment) = &design.partitions {
            if assignment.len() != design.network.size() {
                return Err(NetError::AssignmentMismatch {
                    assigned: assignment.len(),
                    nodes: design.network.size(),
                });
            }
        }

        tracing::debug!(
            "Loaded design '{}' from {} ({} nodes)",
            design.network.name,
            path.display(),
            design.network.size()
        );
        Ok(design)
    }

    /// Save the design to disk
    pub fn save(&self, path: impl AsRef<Path>) -> NetResult<()> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        Ok(())
    }

    /// Build the partition manager, if the design is partitioned
    pub fn partition_manager(&self) -> NetResult<Option<PartitionManager>> {
        self.partitions
            .as_ref()
            .map(|assignment| PartitionManager::new(&self.network, assignment.clone()))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Signal;

    #[test]
    fn test_design_save_load() {
        let mut ntk = Network::new("d");
        let a = Signal::new(ntk.add_input("a"));
        let b = Signal::new(ntk.add_input("b"));
        let ab = ntk.add_and(a, b);
        ntk.add_output("y", ab);
        let manager = PartitionManager::single(&ntk, PartitionId(2));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.json");
        Design::with_partitions(ntk.clone(), &manager)
            .save(&path)
            .unwrap();

        let mut loaded = Design::load(&path).unwrap();
        assert_eq!(loaded.network, ntk);
        assert_eq!(loaded.partition_manager().unwrap(), Some(manager));
        // Structural hash is rebuilt on load
        assert_eq!(loaded.network.add_and(b, a), ab);
    }

    #[test]
    fn test_design_rejects_short_assignment() {
        let mut ntk = Network::new("d");
        ntk.add_input("a");
        let design = Design {
            network: ntk,
            partitions: Some(vec![PartitionId(0)]),
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.json");
        design.save(&path).unwrap();

        assert!(matches!(
            Design::load(&path),
            Err(NetError::AssignmentMismatch { assigned: 1, nodes: 2 })
        ));
    }

    #[test]
    fn test_design_missing_file() {
        assert!(matches!(
            Design::load("/nonexistent/design.json"),
            Err(NetError::Io(_))
        ));
    }
}
