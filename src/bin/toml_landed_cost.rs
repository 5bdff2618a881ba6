use anyhow::Context;
use clap::Parser;
use landed_cost::core::ConfigProvider;
use landed_cost::utils::{logger, validation::Validate};
use landed_cost::{AllocationEngine, AllocationPipeline, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-landed-cost")]
#[command(about = "Landed cost allocation driven by a TOML job file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "landed-cost.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the general cost marker from config
    #[arg(long)]
    general_marker: Option<String>,

    /// Dry run - allocate and print without writing reports
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;

    logger::init_logger(args.verbose || config.verbose(), config.log_format());
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Some(marker) = args.general_marker {
        tracing::info!("🔧 General marker overridden to: {}", marker);
        config
            .allocation
            .get_or_insert(landed_cost::config::toml_config::AllocationConfig {
                general_marker: None,
            })
            .general_marker = Some(marker);
    }

    config.validate().context("Configuration validation failed")?;

    display_config_summary(&config, args.dry_run);

    let pipeline = AllocationPipeline::new(LocalStorage::default(), config);
    let engine = AllocationEngine::new(pipeline);

    if args.dry_run {
        let outcome = engine.preview().await.context("Dry run failed")?;
        print!("{}", outcome.report.render_summary());
        return Ok(());
    }

    let summary = engine.run().await.context("Allocation failed")?;

    print!("{}", summary.report.render_summary());
    println!();
    println!("✅ Allocation completed successfully!");
    println!("📁 Output saved to: {}", summary.output_path);
    println!(
        "💰 Total global cost: {:.2}",
        summary.totals.total_global_cost
    );
    if !summary.gaps.is_empty() {
        println!(
            "⚠️ {} cost pool(s) left undistributed ({:.2})",
            summary.gaps.len(),
            summary.totals.total_unallocated_cost
        );
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, dry_run: bool) {
    println!("📋 Configuration Summary:");
    println!("  Job: {}", config.job.name);
    if let Some(description) = &config.job.description {
        println!("  Description: {}", description);
    }
    println!("  Products: {}", config.products_path());
    println!("  Services: {}", config.services_path());
    println!("  General marker: {}", config.general_marker());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output.formats.join(", "));

    if let Some(archive) = config.archive_name() {
        println!("  Compression: {} (ZIP)", archive);
    }

    if dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
