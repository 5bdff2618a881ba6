use crate::core::allocator::CostAllocator;
use crate::core::parser::{parse_products, parse_services};
use crate::core::report::{AllocationReport, OutputFormat};
use crate::core::{AllocationInput, AllocationOutcome, ConfigProvider, Pipeline, Storage};
use crate::utils::error::{LandedCostError, Result};
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

pub const REPORT_BASENAME: &str = "landed_costs";

pub struct AllocationPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> AllocationPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    async fn read_text(&self, path: &str) -> Result<String> {
        let bytes = self.storage.read_file(path).await?;
        String::from_utf8(bytes).map_err(|e| {
            LandedCostError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{} is not valid UTF-8: {}", path, e),
            ))
        })
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }

    fn formats(&self) -> Result<Vec<OutputFormat>> {
        self.config
            .output_formats()
            .iter()
            .map(|f| f.parse::<OutputFormat>())
            .collect()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for AllocationPipeline<S, C> {
    async fn extract(&self) -> Result<AllocationInput> {
        tracing::debug!("Reading products from: {}", self.config.products_path());
        let products = parse_products(&self.read_text(self.config.products_path()).await?)?;

        if products.is_empty() {
            return Err(LandedCostError::EmptyInput {
                what: format!("no product lines found in {}", self.config.products_path()),
            });
        }

        tracing::debug!("Reading services from: {}", self.config.services_path());
        let services = parse_services(&self.read_text(self.config.services_path()).await?)?;

        if services.is_empty() {
            tracing::warn!("No service lines found; landed cost equals purchase cost");
        }

        Ok(AllocationInput { products, services })
    }

    async fn transform(&self, input: AllocationInput) -> Result<AllocationOutcome> {
        let allocator = CostAllocator::new(self.config.general_marker());
        let result = allocator.allocate(&input.products, &input.services)?;

        if !result.gaps.is_empty() {
            let unallocated: f64 = result.gaps.iter().map(|g| g.unallocated_cost).sum();
            tracing::warn!(
                "⚠️ {} cost pool(s) could not be distributed ({:.2} in total)",
                result.gaps.len(),
                unallocated
            );
        }

        let report = AllocationReport::build(&result, &input.services, allocator.general_marker());
        Ok(AllocationOutcome { result, report })
    }

    async fn load(&self, outcome: &AllocationOutcome) -> Result<String> {
        let formats = self.formats()?;
        let mut rendered = Vec::with_capacity(formats.len());
        for format in formats {
            let name = format!("{}.{}", REPORT_BASENAME, format.extension());
            rendered.push((name, outcome.report.render(format)?));
        }

        match self.config.archive_name() {
            Some(archive_name) => {
                tracing::debug!("Creating ZIP file with {} files", rendered.len());

                let zip_data = {
                    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                    for (name, content) in &rendered {
                        zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
                        zip.write_all(content.as_bytes())?;
                    }
                    zip.finish()?.into_inner()
                };

                let path = self.output_file(archive_name);
                tracing::debug!("Writing ZIP file ({} bytes) to {}", zip_data.len(), path);
                self.storage.write_file(&path, &zip_data).await?;
                Ok(path)
            }
            None => {
                for (name, content) in &rendered {
                    let path = self.output_file(name);
                    tracing::debug!("Writing {} ({} bytes)", path, content.len());
                    self.storage.write_file(&path, content.as_bytes()).await?;
                }
                Ok(self.config.output_path().to_string())
            }
        }
    }
}
