use crate::domain::model::{
    AllocationResult, DistributionGap, GapReason, ProcessedProduct, Product, Service,
    DEFAULT_GENERAL_MARKER,
};
use crate::utils::error::{LandedCostError, Result};
use std::collections::HashSet;

/// Two-phase proportional distribution of service costs over product lines.
///
/// Phase 1 spreads every service tagged with the general marker over all
/// products, weighted by initial cost. Phase 2 spreads each remaining rule's
/// services over the products whose tariff rate equals the rule, weighted by
/// the cost each product carries after phase 1.
///
/// The general marker is matched case-insensitively, specific rules exactly.
#[derive(Debug, Clone)]
pub struct CostAllocator {
    general_marker: String,
}

impl Default for CostAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_GENERAL_MARKER)
    }
}

impl CostAllocator {
    pub fn new(general_marker: impl Into<String>) -> Self {
        Self {
            general_marker: general_marker.into(),
        }
    }

    pub fn general_marker(&self) -> &str {
        &self.general_marker
    }

    pub fn is_general(&self, rule: &str) -> bool {
        rule.to_lowercase() == self.general_marker.to_lowercase()
    }

    pub fn allocate(&self, products: &[Product], services: &[Service]) -> Result<AllocationResult> {
        if products.is_empty() {
            return Err(LandedCostError::EmptyInput {
                what: "the product list is empty".to_string(),
            });
        }

        let mut processed: Vec<ProcessedProduct> =
            products.iter().cloned().map(ProcessedProduct::new).collect();
        let mut gaps = Vec::new();

        let (general, specific): (Vec<&Service>, Vec<&Service>) = services
            .iter()
            .partition(|service| self.is_general(&service.distribution_rule));

        if let Some(gap) = self.distribute_general(&mut processed, &general) {
            gaps.push(gap);
        }

        for rule in distinct_rules(&specific) {
            if let Some(gap) = distribute_rule(&mut processed, &specific, rule) {
                gaps.push(gap);
            }
        }

        for product in processed.iter_mut() {
            product.final_cost =
                product.cost_after_general_services + product.allocated_specific_cost_sum;
        }

        Ok(AllocationResult {
            products: processed,
            gaps,
        })
    }

    fn distribute_general(
        &self,
        products: &mut [ProcessedProduct],
        general: &[&Service],
    ) -> Option<DistributionGap> {
        let total_general_cost: f64 = general.iter().map(|s| s.cost).sum();
        let total_initial_value: f64 = products.iter().map(|p| p.initial_cost).sum();

        tracing::debug!(
            "General pool: {} service(s), cost {:.2}, base {:.2}",
            general.len(),
            total_general_cost,
            total_initial_value
        );

        let distributable = total_general_cost > 0.0 && total_initial_value > 0.0;
        for product in products.iter_mut() {
            if distributable {
                product.allocated_general_cost_sum =
                    (product.initial_cost / total_initial_value) * total_general_cost;
            }
            product.cost_after_general_services =
                product.initial_cost + product.allocated_general_cost_sum;
        }

        if total_general_cost > 0.0 && !distributable {
            tracing::warn!(
                "⚠️ General cost {:.2} dropped: every product has zero initial value",
                total_general_cost
            );
            return Some(DistributionGap {
                rule: self.general_marker.clone(),
                unallocated_cost: total_general_cost,
                service_count: general.len(),
                reason: GapReason::ZeroAllocationBase,
            });
        }

        None
    }
}

/// Rules in the order they first appear among the services.
fn distinct_rules<'a>(services: &[&'a Service]) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    services
        .iter()
        .map(|s| s.distribution_rule.as_str())
        .filter(|rule| seen.insert(*rule))
        .collect()
}

fn distribute_rule(
    products: &mut [ProcessedProduct],
    services: &[&Service],
    rule: &str,
) -> Option<DistributionGap> {
    let services_for_rule: Vec<&&Service> = services
        .iter()
        .filter(|s| s.distribution_rule == rule)
        .collect();
    let total_cost_for_rule: f64 = services_for_rule.iter().map(|s| s.cost).sum();

    let matching: Vec<usize> = products
        .iter()
        .enumerate()
        .filter(|(_, p)| p.product.tariff_rate == rule)
        .map(|(index, _)| index)
        .collect();

    if matching.is_empty() {
        tracing::warn!(
            "⚠️ Rule '{}' matches no product; {:.2} from {} service(s) left undistributed",
            rule,
            total_cost_for_rule,
            services_for_rule.len()
        );
        return Some(DistributionGap {
            rule: rule.to_string(),
            unallocated_cost: total_cost_for_rule,
            service_count: services_for_rule.len(),
            reason: GapReason::NoMatchingProducts,
        });
    }

    let total_base: f64 = matching
        .iter()
        .map(|&index| products[index].cost_after_general_services)
        .sum();

    tracing::debug!(
        "Rule '{}': {} product(s), cost {:.2}, base {:.2}",
        rule,
        matching.len(),
        total_cost_for_rule,
        total_base
    );

    if total_cost_for_rule > 0.0 && total_base > 0.0 {
        for &index in &matching {
            let product = &mut products[index];
            product.allocated_specific_cost_sum +=
                (product.cost_after_general_services / total_base) * total_cost_for_rule;
        }
        None
    } else if total_cost_for_rule > 0.0 {
        tracing::warn!(
            "⚠️ Rule '{}' cost {:.2} dropped: matching products have zero value",
            rule,
            total_cost_for_rule
        );
        Some(DistributionGap {
            rule: rule.to_string(),
            unallocated_cost: total_cost_for_rule,
            service_count: services_for_rule.len(),
            reason: GapReason::ZeroAllocationBase,
        })
    } else {
        None
    }
}

/// Allocates with the default general marker.
pub fn allocate(products: &[Product], services: &[Service]) -> Result<AllocationResult> {
    CostAllocator::default().allocate(products, services)
}
