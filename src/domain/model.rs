use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker that routes a service cost to every product (compared case-insensitively).
pub const DEFAULT_GENERAL_MARKER: &str = "comun";

/// A purchased product line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub unit_cost: f64,
    pub quantity: u64,
    pub tariff_rate: String,
}

impl Product {
    pub fn new(name: impl Into<String>, unit_cost: f64, quantity: u64, tariff_rate: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit_cost,
            quantity,
            tariff_rate: tariff_rate.into(),
        }
    }

    pub fn initial_cost(&self) -> f64 {
        self.unit_cost * self.quantity as f64
    }
}

/// A shared cost line, tagged with the rule that decides who pays for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub provider_name: String,
    pub service_name: String,
    pub cost: f64,
    pub distribution_rule: String,
}

impl Service {
    pub fn new(
        provider_name: impl Into<String>,
        service_name: impl Into<String>,
        cost: f64,
        distribution_rule: impl Into<String>,
    ) -> Self {
        Self {
            provider_name: provider_name.into(),
            service_name: service_name.into(),
            cost,
            distribution_rule: distribution_rule.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub initial_cost: f64,
    pub allocated_general_cost_sum: f64,
    pub cost_after_general_services: f64,
    pub allocated_specific_cost_sum: f64,
    pub final_cost: f64,
}

impl ProcessedProduct {
    pub fn new(product: Product) -> Self {
        let initial_cost = product.initial_cost();
        Self {
            product,
            initial_cost,
            allocated_general_cost_sum: 0.0,
            cost_after_general_services: initial_cost,
            allocated_specific_cost_sum: 0.0,
            final_cost: initial_cost,
        }
    }

    pub fn name(&self) -> &str {
        &self.product.name
    }

    /// `final_cost / quantity`, undefined for zero quantity.
    pub fn final_unit_cost(&self) -> Option<f64> {
        if self.product.quantity > 0 {
            Some(self.final_cost / self.product.quantity as f64)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapReason {
    NoMatchingProducts,
    ZeroAllocationBase,
}

impl fmt::Display for GapReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GapReason::NoMatchingProducts => write!(f, "no product matches the rule"),
            GapReason::ZeroAllocationBase => write!(f, "allocation base is zero"),
        }
    }
}

/// A cost pool that could not be spread over any product. Reported, never fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionGap {
    pub rule: String,
    pub unallocated_cost: f64,
    pub service_count: usize,
    pub reason: GapReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub products: Vec<ProcessedProduct>,
    pub gaps: Vec<DistributionGap>,
}

/// Parsed input handed from extract to transform.
#[derive(Debug, Clone, Default)]
pub struct AllocationInput {
    pub products: Vec<Product>,
    pub services: Vec<Service>,
}
