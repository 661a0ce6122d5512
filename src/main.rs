mod analytics;
mod config;
mod error;
mod forecast;
mod insights;
mod types;
mod web;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use analytics::compute_metrics;
use crate::config::{load_config, AppConfig};
use forecast::{demo_forecast, forecast_with};
use types::{CounterInput, ForecastResult};
use web::{start_server, AppState};

#[derive(Parser)]
#[command(name = "ssp-yield")]
#[command(author = "SSP Analytics")]
#[command(version = "0.1.0")]
#[command(about = "SSP yield calculator and eCPM forecaster", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "yield.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate CTR, CVR, eCPM and CPA from campaign counters
    Metrics {
        #[arg(long, default_value = "10000", allow_negative_numbers = true)]
        impressions: i64,
        #[arg(long, default_value = "500", allow_negative_numbers = true)]
        clicks: i64,
        #[arg(long, default_value = "50", allow_negative_numbers = true)]
        conversions: i64,
        /// Campaign cost (MYR)
        #[arg(long, default_value = "800", allow_negative_numbers = true)]
        cost: Decimal,
    },
    /// Forecast eCPM with an ARIMA model
    Forecast {
        /// Seed for the demo history (ignored with --history)
        #[arg(long)]
        seed: Option<u64>,
        /// Comma-separated price history to forecast instead of the demo series
        #[arg(long, value_delimiter = ',')]
        history: Option<Vec<f64>>,
        /// Number of days to forecast
        #[arg(long)]
        horizon: Option<usize>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show how the optimizer helps each team
    Insights,
    /// Serve the JSON API
    Serve {
        /// Listen port (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let app_config = load_config(&cli.config)?;

    match cli.command {
        Commands::Metrics { impressions, clicks, conversions, cost } => {
            show_metrics(impressions, clicks, conversions, cost)?;
        }
        Commands::Forecast { seed, history, horizon, json } => {
            run_forecast(&app_config, seed, history, horizon, json)?;
        }
        Commands::Insights => {
            println!("{}", insights::stakeholder_insights());
        }
        Commands::Serve { port } => {
            let mut app_config = app_config;
            if let Some(port) = port {
                app_config.server.port = port;
            }
            info!("SSP Yield Optimizer v0.1.0");
            start_server(AppState::new(app_config)).await?;
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&app_config)?);
        }
    }

    Ok(())
}

fn show_metrics(impressions: i64, clicks: i64, conversions: i64, cost: Decimal) -> Result<()> {
    let input = CounterInput::from_raw(impressions, clicks, conversions, cost)?;
    let metrics = compute_metrics(&input)?;

    println!("\n=== Campaign Metrics ===");
    println!("CTR:  {}", metrics.ctr);
    println!("CVR:  {}", metrics.cvr);
    println!("eCPM: {}", metrics.ecpm);
    println!("CPA:  {}", metrics.cpa);
    Ok(())
}

fn run_forecast(
    app_config: &AppConfig,
    seed: Option<u64>,
    history: Option<Vec<f64>>,
    horizon: Option<usize>,
    json: bool,
) -> Result<()> {
    let mut settings = app_config.forecast.clone();
    if let Some(seed) = seed {
        settings.seed = seed;
    }
    if let Some(horizon) = horizon {
        settings.horizon = horizon;
    }

    let result = match history {
        Some(history) => forecast_with(&history, &settings)?,
        None => demo_forecast(&settings)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_forecast(&result);
    }
    Ok(())
}

fn print_forecast(result: &ForecastResult) {
    let params = &result.params;
    println!("\n=== {}-Day eCPM Forecast ({}) ===", result.horizon(), params.order);
    println!("{:>4}  {:>16}", "Day", "Forecasted eCPM");
    for point in &result.points {
        println!("{:>4}  {:>16}", point.day, point.value);
    }
    println!(
        "\nAR: {:?}  MA: {:?}  drift: {:.4}  sigma2: {:.4}  loglik: {:.2}",
        params.ar, params.ma, params.drift, params.sigma2, params.log_likelihood
    );
}
