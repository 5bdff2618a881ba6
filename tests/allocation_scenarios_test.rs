use landed_cost::core::parser::{parse_products, parse_services};
use landed_cost::core::report::{AllocationReport, IncreaseFactor};
use landed_cost::{allocate, GapReason, LandedCostError, ProcessedProduct, Product, Service};

const EPSILON: f64 = 1e-9;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn by_name<'a>(products: &'a [ProcessedProduct], name: &str) -> &'a ProcessedProduct {
    products.iter().find(|p| p.name() == name).unwrap()
}

#[test]
fn test_single_product_absorbs_all_general_cost() {
    let products = vec![Product::new("Widget", 10.0, 5, "R1")];
    let services = vec![Service::new("P1", "Freight", 50.0, "comun")];

    let result = allocate(&products, &services).unwrap();
    let widget = &result.products[0];

    assert!(close(widget.initial_cost, 50.0));
    assert!(close(widget.allocated_general_cost_sum, 50.0));
    assert!(close(widget.final_cost, 100.0));
    assert!(close(widget.final_unit_cost().unwrap(), 20.0));
    assert_eq!(IncreaseFactor::for_product(widget).to_string(), "2.0000x");
}

#[test]
fn test_rule_cost_only_reaches_matching_tariff() {
    let products = vec![
        Product::new("A", 10.0, 10, "T1"),
        Product::new("B", 20.0, 5, "T2"),
    ];
    let services = vec![Service::new("X", "Tax", 30.0, "T1")];

    let result = allocate(&products, &services).unwrap();

    let a = by_name(&result.products, "A");
    let b = by_name(&result.products, "B");
    assert!(close(a.allocated_general_cost_sum, 0.0));
    assert!(close(b.allocated_general_cost_sum, 0.0));
    assert!(close(a.final_cost, 130.0));
    assert!(close(b.final_cost, 100.0));
    assert!(result.gaps.is_empty());
}

#[test]
fn test_orphan_rule_is_reported_not_distributed() {
    let products = vec![
        Product::new("A", 10.0, 10, "T1"),
        Product::new("B", 20.0, 5, "T2"),
    ];
    let services = vec![
        Service::new("X", "Tax", 30.0, "T1"),
        Service::new("Y", "Warehouse", 40.0, "T9"),
    ];

    let result = allocate(&products, &services).unwrap();

    assert!(close(by_name(&result.products, "A").final_cost, 130.0));
    assert!(close(by_name(&result.products, "B").final_cost, 100.0));
    assert_eq!(result.gaps.len(), 1);
    assert_eq!(result.gaps[0].rule, "T9");
    assert_eq!(result.gaps[0].reason, GapReason::NoMatchingProducts);

    let report = AllocationReport::build(&result, &services, "comun");
    assert!(close(report.totals.total_service_cost, 70.0));
    assert!(close(report.totals.total_unallocated_cost, 40.0));
}

#[test]
fn test_empty_product_list_is_input_error() {
    let services = vec![Service::new("P1", "Freight", 50.0, "comun")];

    let err = allocate(&[], &services).unwrap_err();

    assert!(matches!(err, LandedCostError::EmptyInput { .. }));
}

#[test]
fn test_parsed_shipment_conserves_every_pool() {
    let products = parse_products(
        "Laptop, 850.00, 12, 8471\n\
         Mouse, 7.90, 300, 8471\n\
         \n\
         Cable, 1.25, 1000, 8544\n\
         Sample, 0, 5, 8544\n",
    )
    .unwrap();
    let services = parse_services(
        "Maersk, Ocean freight, 1800, comun\n\
         Allianz, Insurance, 220.50, COMUN\n\
         Customs, Duty 8471, 950, 8471\n\
         Customs, Duty 8544, 75.25, 8544\n",
    )
    .unwrap();

    let result = allocate(&products, &services).unwrap();

    let general: f64 = result.products.iter().map(|p| p.allocated_general_cost_sum).sum();
    assert!((general - 2020.50).abs() < 1e-6);

    for (rule, expected) in [("8471", 950.0), ("8544", 75.25)] {
        let specific: f64 = result
            .products
            .iter()
            .filter(|p| p.product.tariff_rate == rule)
            .map(|p| p.allocated_specific_cost_sum)
            .sum();
        assert!((specific - expected).abs() < 1e-6, "rule {}", rule);
    }

    for p in &result.products {
        assert!(p.final_cost >= p.cost_after_general_services);
        assert!(p.cost_after_general_services >= p.initial_cost);
    }

    let sample = by_name(&result.products, "Sample");
    assert!(close(sample.final_cost, 0.0));
    assert_eq!(IncreaseFactor::for_product(sample), IncreaseFactor::NotApplicable);
    assert!(result.gaps.is_empty());
}
