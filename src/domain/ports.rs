use crate::core::report::AllocationReport;
use crate::domain::model::{AllocationInput, AllocationResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn products_path(&self) -> &str;
    fn services_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn general_marker(&self) -> &str;
    fn output_formats(&self) -> &[String];
    /// Bundle every report into one ZIP with this name instead of loose files.
    fn archive_name(&self) -> Option<&str>;
}

/// What transform hands to load.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub result: AllocationResult,
    pub report: AllocationReport,
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<AllocationInput>;
    async fn transform(&self, input: AllocationInput) -> Result<AllocationOutcome>;
    async fn load(&self, outcome: &AllocationOutcome) -> Result<String>;
}
