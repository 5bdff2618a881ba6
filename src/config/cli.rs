use crate::core::ConfigProvider;
use crate::domain::model::DEFAULT_GENERAL_MARKER;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_output_formats, validate_path,
    Validate, SUPPORTED_INPUT_EXTENSIONS,
};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "landed-cost")]
#[command(about = "Allocate import and logistics costs over product lines")]
pub struct CliConfig {
    /// Product lines: name, unit_cost, quantity, tariff_rate
    #[arg(long)]
    pub products: String,

    /// Service lines: provider_name, service_name, cost, distribution_rule
    #[arg(long)]
    pub services: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_values = ["csv", "json"])]
    pub formats: Vec<String>,

    /// Bundle the reports into a ZIP file with this name
    #[arg(long)]
    pub zip: Option<String>,

    #[arg(long, default_value = DEFAULT_GENERAL_MARKER)]
    pub general_marker: String,

    /// Allocate and print the summary without writing reports
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl ConfigProvider for CliConfig {
    fn products_path(&self) -> &str {
        &self.products
    }

    fn services_path(&self) -> &str {
        &self.services
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn general_marker(&self) -> &str {
        &self.general_marker
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn archive_name(&self) -> Option<&str> {
        self.zip.as_deref()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("products", &self.products)?;
        validate_file_extension("products", &self.products, SUPPORTED_INPUT_EXTENSIONS)?;
        validate_path("services", &self.services)?;
        validate_file_extension("services", &self.services, SUPPORTED_INPUT_EXTENSIONS)?;
        validate_path("output_path", &self.output_path)?;
        validate_output_formats("formats", &self.formats)?;
        validate_non_empty_string("general_marker", &self.general_marker)?;
        if let Some(zip) = &self.zip {
            validate_file_extension("zip", zip, &["zip"])?;
        }
        Ok(())
    }
}
