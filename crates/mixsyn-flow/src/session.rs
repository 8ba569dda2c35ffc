//! Session state
//!
//! A session holds the network under optimization and, once an upstream
//! partitioner has run, its partitioning. A run needs both.

use crate::error::{FlowError, Result};
use mixsyn_net::{Design, NetError, Network, PartitionManager};
use std::path::Path;

/// Network and partitioning a run works on
#[derive(Debug, Clone, Default)]
pub struct Session {
    network: Option<Network>,
    partitions: Option<PartitionManager>,
}

impl Session {
    /// An empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Session holding a design's network and partitioning
    pub fn from_design(design: Design) -> Result<Self> {
        let partitions = design.partition_manager()?;
        Ok(Self {
            network: Some(design.network),
            partitions,
        })
    }

    /// Load a design file into a new session
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_design(Design::load(path)?)
    }

    /// Replace the stored network. Any partitioning is dropped.
    pub fn set_network(&mut self, network: Network) {
        self.network = Some(network);
        self.partitions = None;
    }

    /// Store a partitioning of the current network
    pub fn set_partitions(&mut self, partitions: PartitionManager) -> Result<()> {
        let network = self.network()?;
        if !partitions.matches(network) {
            return Err(NetError::AssignmentMismatch {
                assigned: partitions.assignment().len(),
                nodes: network.size(),
            }
            .into());
        }
        self.partitions = Some(partitions);
        Ok(())
    }

    /// The stored network
    pub fn network(&self) -> Result<&Network> {
        self.network
            .as_ref()
            .ok_or_else(|| FlowError::Precondition("No network stored".to_string()))
    }

    /// The stored network and its partitioning
    pub fn partitioned(&self) -> Result<(&Network, &PartitionManager)> {
        let network = self.network()?;
        let partitions = self
            .partitions
            .as_ref()
            .ok_or_else(|| FlowError::Precondition("Network not partitioned yet".to_string()))?;
        Ok((network, partitions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixsyn_net::{PartitionId, Signal};

    fn small() -> Network {
        let mut ntk = Network::new("small");
        let a = Signal::new(ntk.add_input("a"));
        let b = Signal::new(ntk.add_input("b"));
        let y = ntk.add_and(a, b);
        ntk.add_output("y", y);
        ntk
    }

    #[test]
    fn test_preconditions() {
        let mut session = Session::new();
        let err = session.partitioned().unwrap_err();
        assert_eq!(err.to_string(), "No network stored");

        session.set_network(small());
        let err = session.partitioned().unwrap_err();
        assert_eq!(err.to_string(), "Network not partitioned yet");

        let manager = PartitionManager::single(session.network().unwrap(), PartitionId(0));
        session.set_partitions(manager).unwrap();
        assert!(session.partitioned().is_ok());
    }

    #[test]
    fn test_partitioning_must_match() {
        let mut session = Session::new();
        let other = Network::new("other");
        let manager = PartitionManager::single(&other, PartitionId(0));
        assert!(matches!(
            session.set_partitions(manager.clone()),
            Err(FlowError::Precondition(_))
        ));

        session.set_network(small());
        assert!(matches!(
            session.set_partitions(manager),
            Err(FlowError::Net(NetError::AssignmentMismatch { .. }))
        ));
    }

    #[test]
    fn test_new_network_drops_partitioning() {
        let ntk = small();
        let manager = PartitionManager::single(&ntk, PartitionId(0));
        let mut session = Session::from_design(Design::with_partitions(ntk.clone(), &manager)).unwrap();
        assert!(session.partitioned().is_ok());

        session.set_network(ntk);
        assert!(session.partitioned().is_err());
    }
}
