use clap::Parser;
use landed_cost::core::report::AllocationReport;
use landed_cost::utils::error::{ErrorSeverity, LandedCostError};
use landed_cost::utils::{logger, validation::Validate};
use landed_cost::{AllocationEngine, AllocationPipeline, CliConfig, LocalStorage};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting landed-cost CLI");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let dry_run = config.dry_run;
    let pipeline = AllocationPipeline::new(LocalStorage::default(), config);
    let engine = AllocationEngine::new(pipeline);

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - no reports will be written");
        match engine.preview().await {
            Ok(outcome) => print_report(&outcome.report),
            Err(e) => fail(e),
        }
        return;
    }

    match engine.run().await {
        Ok(summary) => {
            tracing::info!("✅ Allocation completed successfully!");
            print!("{}", summary.report.render_summary());
            println!();
            println!(
                "✅ Allocated {} service(s) over {} product(s)",
                summary.service_count, summary.product_count
            );
            println!("📁 Output saved to: {}", summary.output_path);
            println!(
                "💰 Total global cost: {:.2} (products {:.2} + services {:.2})",
                summary.totals.total_global_cost,
                summary.totals.total_product_cost,
                summary.totals.total_service_cost
            );
            for gap in &summary.gaps {
                println!(
                    "⚠️ Rule '{}' left {:.2} undistributed: {}",
                    gap.rule, gap.unallocated_cost, gap.reason
                );
            }
        }
        Err(e) => fail(e),
    }
}

fn print_report(report: &AllocationReport) {
    println!("📋 Landed cost preview:");
    println!();
    print!("{}", report.render_summary());
}

fn fail(e: LandedCostError) -> ! {
    tracing::error!(
        "❌ Allocation failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
