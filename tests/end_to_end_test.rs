use landed_cost::core::ConfigProvider;
use landed_cost::{AllocationEngine, AllocationPipeline, LandedCostError, LocalStorage, TomlConfig};
use std::io::Read;
use tempfile::TempDir;

fn write_inputs(dir: &TempDir, products: &str, services: &str) {
    std::fs::write(dir.path().join("products.csv"), products).unwrap();
    std::fs::write(dir.path().join("services.csv"), services).unwrap();
}

fn toml_for(dir: &TempDir, formats: &str, compression: Option<&str>) -> TomlConfig {
    let base = dir.path().to_str().unwrap();
    let mut content = format!(
        r#"
[job]
name = "e2e"

[input]
products = "{base}/products.csv"
services = "{base}/services.csv"

[output]
path = "{base}/reports"
formats = {formats}
"#
    );
    if let Some(filename) = compression {
        content.push_str(&format!(
            "\n[output.compression]\nenabled = true\nfilename = \"{}\"\n",
            filename
        ));
    }
    TomlConfig::from_toml_str(&content).unwrap()
}

#[tokio::test]
async fn test_end_to_end_writes_loose_reports() {
    let temp_dir = TempDir::new().unwrap();
    write_inputs(
        &temp_dir,
        "Widget,10,5,R1\nGadget,0,2,R2\n",
        "DHL,Freight,50,comun\nCustoms,Duty,8,R1\nBroker,Fee,3,R7\n",
    );
    let config = toml_for(&temp_dir, r#"["csv", "tsv", "json"]"#, None);
    let output_dir = config.output_path().to_string();

    let engine = AllocationEngine::new(AllocationPipeline::new(LocalStorage::default(), config));
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.output_path, output_dir);
    assert_eq!(summary.product_count, 2);
    assert_eq!(summary.service_count, 3);
    assert_eq!(summary.gaps.len(), 1);
    assert_eq!(summary.gaps[0].rule, "R7");
    assert_eq!(summary.totals.total_global_cost, 111.0);

    let table = summary.report.render_summary();
    assert!(table.contains("Widget"));
    assert!(table.contains("21.60"));
    assert!(table.contains("2.1600x"));
    assert!(table.contains("Gadget"));

    let reports = temp_dir.path().join("reports");
    let csv = std::fs::read_to_string(reports.join("landed_costs.csv")).unwrap();
    assert!(csv.starts_with("name,tariff_rate,"));
    assert!(csv.contains("Widget,R1,10.0,5,50.0,50.0,100.0,8.0,108.0,21.6,2.1600x"));
    assert!(csv.contains("Gadget,R2,0.0,2,0.0,0.0,0.0,0.0,0.0,0.0,N/A"));

    assert!(reports.join("landed_costs.tsv").exists());

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(reports.join("landed_costs.json")).unwrap())
            .unwrap();
    assert_eq!(json["gaps"][0]["reason"], "no_matching_products");
    assert_eq!(json["totals"]["total_unallocated_cost"], 3.0);
}

#[tokio::test]
async fn test_end_to_end_bundles_zip() {
    let temp_dir = TempDir::new().unwrap();
    write_inputs(&temp_dir, "A,10,10,T1\nB,20,5,T2\n", "X,Tax,30,T1\n");
    let config = toml_for(&temp_dir, r#"["csv", "json"]"#, Some("landed.zip"));

    let engine = AllocationEngine::new(AllocationPipeline::new(LocalStorage::default(), config));
    let summary = engine.run().await.unwrap();

    assert!(summary.output_path.ends_with("landed.zip"));
    let zip_data = std::fs::read(&summary.output_path).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();

    let file_names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert!(file_names.contains(&"landed_costs.csv".to_string()));
    assert!(file_names.contains(&"landed_costs.json".to_string()));

    let mut csv_content = String::new();
    archive
        .by_name("landed_costs.csv")
        .unwrap()
        .read_to_string(&mut csv_content)
        .unwrap();
    assert!(csv_content.contains("A,T1,10.0,10,100.0,0.0,100.0,30.0,130.0,13.0,1.3000x"));
}

#[tokio::test]
async fn test_end_to_end_parse_error_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    write_inputs(&temp_dir, "A,10,10,T1\nB,twenty,5,T2\n", "X,Tax,30,T1\n");
    let config = toml_for(&temp_dir, r#"["csv"]"#, None);

    let engine = AllocationEngine::new(AllocationPipeline::new(LocalStorage::default(), config));
    let err = engine.run().await.unwrap_err();

    match err {
        LandedCostError::ParseError { line, field, .. } => {
            assert_eq!(line, 2);
            assert_eq!(field, "unit_cost");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!temp_dir.path().join("reports").exists());
}

#[tokio::test]
async fn test_preview_does_not_write() {
    let temp_dir = TempDir::new().unwrap();
    write_inputs(&temp_dir, "A,10,10,T1\n", "");
    let config = toml_for(&temp_dir, r#"["csv"]"#, None);

    let engine = AllocationEngine::new(AllocationPipeline::new(LocalStorage::default(), config));
    let outcome = engine.preview().await.unwrap();

    assert_eq!(outcome.result.products[0].final_cost, 100.0);
    assert!(!temp_dir.path().join("reports").exists());
}

#[tokio::test]
async fn test_empty_products_file_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    write_inputs(&temp_dir, "\n  \n", "X,Tax,30,T1\n");
    let config = toml_for(&temp_dir, r#"["csv"]"#, None);

    let engine = AllocationEngine::new(AllocationPipeline::new(LocalStorage::default(), config));
    let err = engine.run().await.unwrap_err();

    assert!(matches!(err, LandedCostError::EmptyInput { .. }));
}
