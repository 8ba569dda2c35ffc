//! Optimization passes and pipelines for mixed AIG/MIG networks
//!
//! - [`passes`]: individual transformations (structural hashing, cleanup,
//!   balancing, cut rewriting, majority resynthesis and algebraic rewriting)
//! - [`pipeline`]: the AIG and MIG pass scripts built from them
//! - [`cuts`] and [`resyn`]: cut enumeration and the small-function template
//!   library the rewriting passes share

pub mod cuts;
pub mod passes;
pub mod pipeline;
pub mod resyn;

pub use passes::{Pass, PassResult};
pub use pipeline::{pipeline_for, AigPipeline, Engine, MigPipeline, Objective, Pipeline};
