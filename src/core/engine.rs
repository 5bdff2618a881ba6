use crate::core::report::{AllocationReport, CostTotals};
use crate::core::{AllocationOutcome, Pipeline};
use crate::domain::model::DistributionGap;
use crate::utils::error::Result;
use std::time::Instant;
use tracing::Instrument;

/// What a finished run reports back to the caller.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_path: String,
    pub product_count: usize,
    pub service_count: usize,
    pub totals: CostTotals,
    pub gaps: Vec<DistributionGap>,
    pub report: AllocationReport,
}

pub struct AllocationEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> AllocationEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Extract and transform without writing anything.
    pub async fn preview(&self) -> Result<AllocationOutcome> {
        let input = self
            .pipeline
            .extract()
            .instrument(tracing::info_span!("extract"))
            .await?;
        tracing::info!(
            "Extracted {} product(s) and {} service(s)",
            input.products.len(),
            input.services.len()
        );

        let outcome = self
            .pipeline
            .transform(input)
            .instrument(tracing::info_span!("allocate"))
            .await?;
        tracing::info!("Allocated costs over {} product(s)", outcome.result.products.len());

        Ok(outcome)
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();
        tracing::info!("Starting landed cost allocation");

        let outcome = self.preview().await?;

        let output_path = self
            .pipeline
            .load(&outcome)
            .instrument(tracing::info_span!("load"))
            .await?;
        tracing::info!("Output saved to: {} ({:?})", output_path, started.elapsed());

        Ok(RunSummary {
            output_path,
            product_count: outcome.result.products.len(),
            service_count: outcome.report.service_count,
            totals: outcome.report.totals,
            gaps: outcome.result.gaps,
            report: outcome.report,
        })
    }
}
