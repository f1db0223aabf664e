use alerter::{TelegramAlerter, notify};
use analyzer::{Ranker, Report, start_notice};
use anyhow::Context;
use api_client::YahooClient;
use chrono::Local;
use clap::Parser;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use configuration::{EligibilityMode, TelegramConfig, load_config};
use engine::ScreeningEngine;

mod logging;

/// The main entry point for the screener.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Secrets may come from a .env file; its absence is not an error.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from '{}'", cli.config))?;
    if let Some(strategy) = cli.strategy {
        config.screening.strategy = strategy;
    }
    if let Some(seed) = cli.seed {
        config.screening.seed = Some(seed);
    }

    let _log_guard = logging::init(&config.logging)?;

    let alerter = if cli.dry_run {
        tracing::info!("Dry run: the report will be printed but not delivered.");
        None
    } else {
        TelegramAlerter::new(&TelegramConfig::from_env())
    };

    let engine = ScreeningEngine::from_config(&config, config.screening.strategy)?;
    let ranker = Ranker::new(config.ranking.clone(), config.universe.display_suffix.clone())?;
    let provider = YahooClient::new(&config.market_data)?;

    deliver(
        alerter.as_ref(),
        &start_notice(engine.mode(), config.universe.symbols.len()),
    )
    .await;

    let summary = engine
        .run(&provider, &config.universe.symbols, config.screening.seed)
        .await?;
    summary.log();

    let report = Report::build(
        &ranker,
        summary.eligible(),
        summary.accepted_candidates(),
        Local::now().date_naive(),
        engine.mode(),
        engine.simulation_count(),
    )?;

    print_report(&report);
    deliver(alerter.as_ref(), &report.to_markdown()).await;

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Screens an equity universe, stress-tests the survivors with a Monte Carlo
/// simulation and reports the safest few.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. A missing file means defaults.
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Overrides the eligibility strategy from the configuration.
    #[arg(long, value_enum)]
    strategy: Option<EligibilityMode>,

    /// Master seed; the same seed and data reproduce the same report.
    #[arg(long)]
    seed: Option<u64>,

    /// Print the report without sending any notification.
    #[arg(long)]
    dry_run: bool,
}

// ==============================================================================
// Report Delivery
// ==============================================================================

async fn deliver(alerter: Option<&TelegramAlerter>, message: &str) {
    match alerter {
        Some(alerter) => {
            if notify(alerter, message).await {
                tracing::info!("Notification delivered.");
            }
        }
        None => tracing::debug!(message, "Notification skipped."),
    }
}

fn print_report(report: &Report) {
    if let Some(notice) = report.body.notice() {
        println!("{}", notice);
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "",
        "Symbol",
        "Price",
        "Risk %",
        "Upside %",
        "Score",
    ]);

    for entry in report.entries() {
        table.add_row(vec![
            Cell::new(entry.icon()),
            Cell::new(&entry.symbol),
            Cell::new(format!("{:.2} {}", entry.price.round_dp(2), report.currency)),
            Cell::new(format!("{:.1}", entry.risk)),
            Cell::new(format!("{:.0}", entry.upside)),
            Cell::new(entry.score.map_or_else(|| "-".to_string(), |s| format!("{:.3}", s))),
        ]);
    }

    println!(
        "Shortlist {} ({} eligibility, {} scenarios)",
        report.date.format("%d-%m-%Y"),
        report.strategy,
        report.simulation_count
    );
    println!("{table}");
}
