pub mod allocator;
pub mod engine;
pub mod parser;
pub mod pipeline;
pub mod report;

pub use crate::domain::model::{AllocationInput, AllocationResult, Product, Service};
pub use crate::domain::ports::{AllocationOutcome, ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
