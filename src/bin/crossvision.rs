//! crossvision CLI - compute chart indicators and what-if reports from CSV bars
//!
//! ## Example Usage
//!
//! ```bash
//! # Enriched series as JSON
//! crossvision indicators AAPL.csv --output aapl.json
//!
//! # Golden-cross what-if report on weekly bars, plus a death-cross check on a
//! # 20-bar projection
//! crossvision what-if AAPL.csv --interval 1wk --project --drift -0.2 --seed 7
//!
//! # Open positions from a transaction log, with a DCA simulation of 25 more shares
//! crossvision portfolio transactions.json --price 187.5 --buy-more 25
//! ```

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use crossvision::config::PipelineConfig;
use crossvision::data::load_csv;
use crossvision::error::{ChartError, Result as ChartResult};
use crossvision::fundamentals::{annotate, Fundamentals};
use crossvision::pipeline::IndicatorPipeline;
use crossvision::portfolio::{summarize, PortfolioSummary, Transaction};
use crossvision::series::Series;
use crossvision::signals::{
    projected_death_cross, CrossScanner, DeathCrossProjection, ScenarioResult, WhatIfReport,
};
use crossvision::simulation::{PathProjector, ProjectionParams};
use crossvision::types::Interval;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// crossvision: chart indicators and golden-cross what-if reports
#[derive(Parser)]
#[command(name = "crossvision")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chart indicators and golden-cross what-if reports", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Pipeline configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the indicator-enriched series as JSON
    Indicators {
        /// CSV file with date,open,high,low,close,volume columns
        #[arg(value_name = "CSV")]
        csv: PathBuf,

        #[command(flatten)]
        emas: EmaArgs,

        #[command(flatten)]
        projection: ProjectionArgs,

        /// Earnings per share for per-bar P/E
        #[arg(long)]
        eps: Option<f64>,

        /// Book value per share for per-bar P/B
        #[arg(long)]
        book_value: Option<f64>,

        /// Output file (stdout if omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Report the latest golden cross and both entry scenarios
    WhatIf {
        /// CSV file with date,open,high,low,close,volume columns
        #[arg(value_name = "CSV")]
        csv: PathBuf,

        /// Bar interval of the file (1h, 1d, 1wk)
        #[arg(short = 'i', long, default_value = "1d")]
        interval: String,

        #[command(flatten)]
        emas: EmaArgs,

        /// With --project, search the projected bars for a death cross
        #[command(flatten)]
        projection: ProjectionArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarize open positions from a JSON transaction log
    Portfolio {
        /// JSON array of transactions
        #[arg(value_name = "TRANSACTIONS")]
        transactions: PathBuf,

        /// Current price used for market value (single-symbol logs)
        #[arg(short = 'p', long)]
        price: Option<f64>,

        /// Simulate buying this many more shares at --price
        #[arg(long, requires = "price")]
        buy_more: Option<f64>,
    },
}

#[derive(Args)]
struct EmaArgs {
    /// Fast EMA period (overrides config)
    #[arg(long)]
    fast: Option<usize>,

    /// Slow EMA period (overrides config)
    #[arg(long)]
    slow: Option<usize>,
}

#[derive(Args)]
struct ProjectionArgs {
    /// Append a synthetic random-walk projection before computing indicators
    #[arg(long)]
    project: bool,

    /// Target daily drift of the projection, in percent
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    drift: f64,

    /// Number of projected bars
    #[arg(long, default_value = "20")]
    steps: usize,

    /// Seed for a reproducible projection
    #[arg(long)]
    seed: Option<u64>,
}

fn load_config(path: Option<&Path>) -> PipelineConfig {
    let Some(config_path) = path else {
        return PipelineConfig::default();
    };

    match fs::read_to_string(config_path) {
        Ok(contents) => match PipelineConfig::from_toml_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{} {}; using defaults", "Warning:".yellow(), e);
                PipelineConfig::default()
            }
        },
        Err(e) => {
            eprintln!(
                "{} Failed to read config {}: {}; using defaults",
                "Warning:".yellow(),
                config_path.display(),
                e
            );
            PipelineConfig::default()
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    if cli.verbose {
        println!(
            "{} v{}",
            "crossvision".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
        println!(
            "EMA pair: {}/{}",
            config.fast_ema.to_string().dimmed(),
            config.slow_ema.to_string().dimmed()
        );
    }

    let result = match cli.command {
        Commands::Indicators {
            csv,
            emas,
            projection,
            eps,
            book_value,
            output,
        } => run_indicators(
            &csv,
            apply_emas(config, &emas),
            &projection,
            Fundamentals::new(eps, book_value),
            output.as_deref(),
        ),

        Commands::WhatIf {
            csv,
            interval,
            emas,
            projection,
            json,
        } => run_what_if(&csv, &interval, apply_emas(config, &emas), &projection, json),

        Commands::Portfolio {
            transactions,
            price,
            buy_more,
        } => run_portfolio(&transactions, price, buy_more),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn apply_emas(config: PipelineConfig, emas: &EmaArgs) -> PipelineConfig {
    let fast = emas.fast.unwrap_or(config.fast_ema);
    let slow = emas.slow.unwrap_or(config.slow_ema);
    config.with_emas(fast, slow)
}

fn build_projector(projection: &ProjectionArgs, interval: Interval) -> ChartResult<(PathProjector, StdRng)> {
    let projector = PathProjector::new(
        ProjectionParams::default()
            .with_drift(projection.drift)
            .with_steps(projection.steps)
            .with_interval(interval),
    )?;
    let rng = match projection.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    Ok((projector, rng))
}

/// Load the CSV and splice a projection onto it when requested
fn load_series(csv: &Path, projection: &ProjectionArgs) -> ChartResult<Series> {
    let series = load_csv(csv)?;
    if !projection.project {
        return Ok(series);
    }

    let (projector, mut rng) = build_projector(projection, Interval::Daily)?;
    Ok(projector.extend(&series, &mut rng))
}

fn run_indicators(
    csv: &Path,
    config: PipelineConfig,
    projection: &ProjectionArgs,
    fundamentals: Fundamentals,
    output: Option<&Path>,
) -> ChartResult<()> {
    let series = annotate(&load_series(csv, projection)?, &fundamentals);
    let points = IndicatorPipeline::new(config)?.run(&series)?;
    let json = serde_json::to_string_pretty(&points)?;

    match output {
        Some(path) => {
            fs::write(path, json)?;
            println!(
                "{} Wrote {} bars to {}",
                "✓".green().bold(),
                points.len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_what_if(
    csv: &Path,
    interval: &str,
    config: PipelineConfig,
    projection: &ProjectionArgs,
    json: bool,
) -> ChartResult<()> {
    let interval: Interval = interval.parse()?;
    let series = load_csv(csv)?;
    let scanner = CrossScanner::new(config.fast_ema, config.slow_ema)?;
    let pipeline = IndicatorPipeline::new(config)?;
    let points = pipeline.run(&series)?;
    let report = scanner.what_if(&points, interval)?;

    let death_cross = if projection.project {
        let (projector, mut rng) = build_projector(projection, interval)?;
        Some(projected_death_cross(&series, &pipeline, &scanner, &projector, &mut rng)?)
    } else {
        None
    };

    if json {
        let output = serde_json::json!({
            "what_if": report,
            "projected_death_cross": death_cross,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_report(&report);
    if let Some(death_cross) = &death_cross {
        print_death_cross(death_cross);
    }
    Ok(())
}

fn print_report(report: &WhatIfReport) {
    if !report.applicable {
        println!(
            "{} What-if reports cover daily and weekly bars only",
            "Note:".yellow()
        );
        return;
    }
    if !report.found {
        println!("{}", "No golden cross in the loaded history".dimmed());
        return;
    }

    if let Some(date) = report.cross_date {
        println!(
            "{} {}",
            "Latest golden cross:".cyan().bold(),
            date.format("%Y-%m-%d")
        );
    }
    print_scenario("Price confirmation", &report.scenario1);
    print_scenario("EMA/VWAP confirmation", &report.scenario2);
}

fn print_death_cross(projection: &DeathCrossProjection) {
    match (projection.bars_ahead, projection.projected_close) {
        (Some(ahead), Some(close)) if projection.found => println!(
            "{} {} of {} projected bars ahead, near {:.2}",
            "Projected death cross:".red().bold(),
            ahead,
            projection.projected_bars,
            close
        ),
        _ => println!(
            "{} none in {} projected bars",
            "Projected death cross:".bold(),
            projection.projected_bars
        ),
    }
}

fn print_scenario(label: &str, scenario: &ScenarioResult) {
    if !scenario.found {
        println!("  {}: {}", label.bold(), "no entry signal yet".dimmed());
        return;
    }

    let profit = format!("{:+.2}%", scenario.profit_percent);
    let profit = if scenario.profit_percent >= 0.0 {
        profit.green()
    } else {
        profit.red()
    };
    let entry_date = scenario
        .entry_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    println!(
        "  {}: entry {} @ {:.2}, now {:.2}, {} over {} days",
        label.bold(),
        entry_date,
        scenario.entry_price,
        scenario.latest_price,
        profit,
        scenario.days_held
    );
}

fn run_portfolio(path: &Path, price: Option<f64>, buy_more: Option<f64>) -> ChartResult<()> {
    let contents = fs::read_to_string(path)?;
    let transactions: Vec<Transaction> = serde_json::from_str(&contents)?;
    let open = summarize(&transactions);

    if open.is_empty() {
        println!("{}", "No open positions".dimmed());
        return Ok(());
    }
    if price.is_some() && open.len() > 1 {
        return Err(ChartError::InvalidParameter(
            "--price applies to single-symbol logs only".to_string(),
        ));
    }

    for summary in &open {
        print!(
            "{:<8} {:>10.2} sh  avg {:>10.2}  cost {:>12.2}",
            summary.symbol.bold(),
            summary.total_shares,
            summary.avg_cost,
            summary.total_cost
        );
        match price.and_then(|p| summary.unrealized_percent(p).map(|pct| (p, pct))) {
            Some((p, pct)) => println!(
                "  value {:>12.2} ({:+.2}%)",
                summary.market_value(p),
                pct
            ),
            None => println!(),
        }
    }

    // Single-symbol logs only past this point, so `open` has one entry
    if let Some(p) = price {
        print_dca(&open[0], p, buy_more);
    }
    Ok(())
}

fn print_dca(summary: &PortfolioSummary, price: f64, buy_more: Option<f64>) {
    if let Some(shares) = buy_more {
        let dca = summary.with_additional(shares, price);
        println!(
            "{} +{} sh @ {:.2}: new avg {}, value {:.2}",
            "DCA:".cyan().bold(),
            shares,
            price,
            format!("{:.2}", dca.new_avg_cost).green(),
            dca.total_value
        );
    }

    println!("{}", "Quick simulation".dimmed());
    for dca in summary.dca_table(price) {
        println!(
            "  buy +{:<4} new avg {:>10.2}",
            dca.additional_shares, dca.new_avg_cost
        );
    }
}
