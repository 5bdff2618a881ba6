use crate::domain::model::{AllocationResult, DistributionGap, ProcessedProduct, Service};
use crate::utils::error::{LandedCostError, Result};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// How much a product's unit cost grew once services were loaded onto it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IncreaseFactor {
    Ratio(f64),
    /// Free product that still picked up cost.
    Unbounded,
    NotApplicable,
}

impl IncreaseFactor {
    pub fn for_product(product: &ProcessedProduct) -> Self {
        let unit_cost = product.product.unit_cost;
        match product.final_unit_cost() {
            Some(final_unit_cost) if unit_cost > 0.0 && final_unit_cost > 0.0 => {
                IncreaseFactor::Ratio(final_unit_cost / unit_cost)
            }
            Some(final_unit_cost) if unit_cost == 0.0 && final_unit_cost > 0.0 => {
                IncreaseFactor::Unbounded
            }
            _ => IncreaseFactor::NotApplicable,
        }
    }
}

impl fmt::Display for IncreaseFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncreaseFactor::Ratio(ratio) => write!(f, "{:.4}x", ratio),
            IncreaseFactor::Unbounded => write!(f, "∞"),
            IncreaseFactor::NotApplicable => write!(f, "N/A"),
        }
    }
}

impl Serialize for IncreaseFactor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CostTotals {
    pub total_product_cost: f64,
    pub total_service_cost: f64,
    pub total_global_cost: f64,
    pub total_distributed_cost: f64,
    pub total_unallocated_cost: f64,
}

impl CostTotals {
    pub fn compute(products: &[ProcessedProduct], services: &[Service]) -> Self {
        let total_product_cost: f64 = products.iter().map(|p| p.initial_cost).sum();
        let total_service_cost: f64 = services.iter().map(|s| s.cost).sum();
        let total_final_cost: f64 = products.iter().map(|p| p.final_cost).sum();
        let total_distributed_cost = total_final_cost - total_product_cost;

        Self {
            total_product_cost,
            total_service_cost,
            total_global_cost: total_product_cost + total_service_cost,
            total_distributed_cost,
            total_unallocated_cost: total_service_cost - total_distributed_cost,
        }
    }
}

/// One flattened line of the landed-cost report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub name: String,
    pub tariff_rate: String,
    pub unit_cost: f64,
    pub quantity: u64,
    pub initial_cost: f64,
    pub allocated_general_cost: f64,
    pub cost_after_general_services: f64,
    pub allocated_specific_cost: f64,
    pub final_cost: f64,
    pub final_unit_cost: Option<f64>,
    pub cost_increase_factor: IncreaseFactor,
}

impl From<&ProcessedProduct> for ReportRow {
    fn from(p: &ProcessedProduct) -> Self {
        Self {
            name: p.product.name.clone(),
            tariff_rate: p.product.tariff_rate.clone(),
            unit_cost: p.product.unit_cost,
            quantity: p.product.quantity,
            initial_cost: p.initial_cost,
            allocated_general_cost: p.allocated_general_cost_sum,
            cost_after_general_services: p.cost_after_general_services,
            allocated_specific_cost: p.allocated_specific_cost_sum,
            final_cost: p.final_cost,
            final_unit_cost: p.final_unit_cost(),
            cost_increase_factor: IncreaseFactor::for_product(p),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AllocationReport {
    pub generated_at: DateTime<Utc>,
    pub general_marker: String,
    pub service_count: usize,
    pub rows: Vec<ReportRow>,
    pub totals: CostTotals,
    pub gaps: Vec<DistributionGap>,
}

impl AllocationReport {
    pub fn build(result: &AllocationResult, services: &[Service], general_marker: &str) -> Self {
        Self {
            generated_at: Utc::now(),
            general_marker: general_marker.to_string(),
            service_count: services.len(),
            rows: result.products.iter().map(ReportRow::from).collect(),
            totals: CostTotals::compute(&result.products, services),
            gaps: result.gaps.clone(),
        }
    }

    pub fn to_csv(&self) -> Result<String> {
        self.to_delimited(b',')
    }

    pub fn to_tsv(&self) -> Result<String> {
        self.to_delimited(b'\t')
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Csv => self.to_csv(),
            OutputFormat::Tsv => self.to_tsv(),
            OutputFormat::Json => self.to_json(),
        }
    }

    /// Plain-text table for terminals.
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<24} {:>8} {:>14} {:>14} {:>14} {:>12} {:>10}\n",
            "Product", "Qty", "Initial", "General", "Specific", "Unit cost", "Factor"
        ));

        for row in &self.rows {
            let unit = row
                .final_unit_cost
                .map(|u| format!("{:.2}", u))
                .unwrap_or_else(|| "N/A".to_string());
            out.push_str(&format!(
                "{:<24} {:>8} {:>14.2} {:>14.2} {:>14.2} {:>12} {:>10}\n",
                row.name,
                row.quantity,
                row.initial_cost,
                row.allocated_general_cost,
                row.allocated_specific_cost,
                unit,
                row.cost_increase_factor.to_string()
            ));
        }

        out.push('\n');
        out.push_str(&format!("Total product cost: {:.2}\n", self.totals.total_product_cost));
        out.push_str(&format!("Total service cost: {:.2}\n", self.totals.total_service_cost));
        out.push_str(&format!("Total global cost:  {:.2}\n", self.totals.total_global_cost));

        if !self.gaps.is_empty() {
            out.push_str(&format!(
                "Undistributed:      {:.2}\n",
                self.totals.total_unallocated_cost
            ));
            for gap in &self.gaps {
                out.push_str(&format!(
                    "  ⚠️ rule '{}': {:.2} from {} service(s), {}\n",
                    gap.rule, gap.unallocated_cost, gap.service_count, gap.reason
                ));
            }
        }

        out
    }

    fn to_delimited(&self, delimiter: u8) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());

        for row in &self.rows {
            writer.serialize(row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| LandedCostError::IoError(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| {
            LandedCostError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Tsv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = LandedCostError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            other => Err(LandedCostError::InvalidConfigValueError {
                field: "output_formats".to_string(),
                value: other.to_string(),
                reason: "Unsupported format. Valid formats: csv, tsv, json".to_string(),
            }),
        }
    }
}
