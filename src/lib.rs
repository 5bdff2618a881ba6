pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::LocalStorage;
pub use crate::core::{
    allocator::{allocate, CostAllocator},
    engine::{AllocationEngine, RunSummary},
    pipeline::AllocationPipeline,
};
pub use domain::model::{
    AllocationResult, DistributionGap, GapReason, ProcessedProduct, Product, Service,
};
pub use utils::error::{LandedCostError, Result};
