//! Logic network model for mixed AIG/MIG synthesis
//!
//! This crate holds the data the optimization flow works on:
//!
//! - [`Network`]: a mixed AND/majority-inverter graph with latches
//! - [`PartitionManager`] / [`PartitionView`]: the upstream partitioning
//!   and its derived boundaries
//! - [`Region`] / [`SubNetwork`]: groups of partitions cut out as
//!   standalone networks
//! - Bit-parallel simulation, Verilog/BLIF writers and JSON design files

pub mod design;
pub mod error;
pub mod network;
pub mod partition;
pub mod region;
pub mod sim;
pub mod writer;

pub use design::Design;
pub use error::{NetError, NetResult};
pub use network::{Network, NetworkStats, Node, NodeId, Signal};
pub use partition::{PartitionId, PartitionInfo, PartitionManager, PartitionView};
pub use region::{Region, SubNetwork};
pub use sim::{equivalent, simulate, SimWords};
pub use writer::{to_blif, to_verilog, write_blif, write_verilog, WriteOptions};
