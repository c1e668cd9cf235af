//! VWZLab CLI — run, sweep and inspect strategies from a config file.
//!
//! Commands:
//! - `run`: replay one strategy and print its statistics
//! - `sweep`: grid-search exit rates, z-score period and condition pairs
//! - `signals`: dump per-bar condition output as JSON lines
//! - `conditions`: list the registered condition names
//!
//! Logs go to stderr; set `RUST_LOG` to change the level.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use vwzlab_core::conditions::ConditionRegistry;
use vwzlab_core::{Backtester, Direction};
use vwzlab_runner::runner::{load_bars, run_from_config};
use vwzlab_runner::{ParamGrid, ParamSweep, RunConfig, RunReport};

#[derive(Parser)]
#[command(name = "vwzlab", about = "VWZLab CLI: volume-weighted z-score strategy simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a strategy from a TOML or JSON run config.
    Run {
        /// Path to the run config.
        #[arg(long)]
        config: PathBuf,

        /// Print the full report as JSON instead of the summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run a parameter grid over the config's bars.
    Sweep {
        /// Path to the run config providing bars and the base strategy.
        #[arg(long)]
        config: PathBuf,

        /// Take-profit rates, comma separated (e.g. 0.005,0.01).
        #[arg(long = "tp", value_delimiter = ',')]
        take_profit: Vec<f64>,

        /// Stop-loss rates, comma separated.
        #[arg(long = "sl", value_delimiter = ',')]
        stop_loss: Vec<f64>,

        /// Z-score periods, comma separated.
        #[arg(long = "zscore", value_delimiter = ',')]
        zscore_periods: Vec<usize>,

        /// Condition pairs as `long:short`, or one name for both sides.
        #[arg(long = "conditions", value_delimiter = ',', value_parser = parse_condition_pair)]
        conditions: Vec<(String, String)>,

        /// Number of ranked results to print.
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Run on the current thread only.
        #[arg(long, default_value_t = false)]
        sequential: bool,
    },
    /// Print each post-warm-up bar's condition output as JSON lines.
    Signals {
        /// Path to the run config.
        #[arg(long)]
        config: PathBuf,

        /// Only print bars where an entry would be attempted.
        #[arg(long, default_value_t = false)]
        entries_only: bool,
    },
    /// List condition names accepted by `entry.long_condition` / `entry.short_condition`.
    Conditions,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "vwzlab_runner=info,vwzlab_core=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, json } => run_single(config, json),
        Commands::Sweep {
            config,
            take_profit,
            stop_loss,
            zscore_periods,
            conditions,
            top,
            sequential,
        } => {
            let grid = ParamGrid {
                take_profit_rates: take_profit,
                stop_loss_rates: stop_loss,
                zscore_periods,
                condition_pairs: conditions,
            };
            run_sweep(config, grid, top, sequential)
        }
        Commands::Signals { config, entries_only } => dump_signals(config, entries_only),
        Commands::Conditions => {
            let registry = ConditionRegistry::builtin();
            for name in registry.names(Direction::Long) {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn load_config(path: &Path) -> Result<RunConfig> {
    RunConfig::from_file(path).with_context(|| format!("loading {}", path.display()))
}

fn run_single(config_path: PathBuf, json: bool) -> Result<()> {
    let config = load_config(&config_path)?;
    let report = run_from_config(&config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn run_sweep(config_path: PathBuf, grid: ParamGrid, top: usize, sequential: bool) -> Result<()> {
    let config = load_config(&config_path)?;
    let bars = load_bars(&config.data)?;

    let sweep = ParamSweep::new().with_parallelism(!sequential);
    let results = sweep.sweep_with_progress(&bars, &config.data, &grid, &config.strategy, |idx, total, report| {
        tracing::debug!(idx, total, run_id = %report.run_id, "grid point done");
    })?;

    println!();
    println!("=== Sweep: {} configurations over {} bars ===", results.len(), bars.len());
    println!(
        "{:>4}  {:>8}  {:>8}  {:>6}  {:<24}  {:>7}  {:>10}  {:>7}  {:>10}",
        "rank", "tp", "sl", "z", "conditions", "trades", "total_pnl", "win%", "max_dd"
    );
    for (rank, report) in results.top_n(top).into_iter().enumerate() {
        let s = &report.strategy;
        let stats = &report.statistics;
        println!(
            "{:>4}  {:>8.4}  {:>8.4}  {:>6}  {:<24}  {:>7}  {:>10.4}  {:>7.1}  {:>10.4}",
            rank + 1,
            s.exit.take_profit_rate,
            s.exit.stop_loss_rate,
            s.indicators.zscore_period,
            format!("{}:{}", s.entry.long_condition, s.entry.short_condition),
            stats.trade_count,
            stats.total_pnl,
            stats.win_rate,
            stats.max_drawdown,
        );
    }
    Ok(())
}

fn dump_signals(config_path: PathBuf, entries_only: bool) -> Result<()> {
    let config = load_config(&config_path)?;
    let bars = load_bars(&config.data)?;
    let backtester = Backtester::with_builtin(config.strategy)?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for record in backtester.signals(&bars) {
        if entries_only && record.entry.is_none() {
            continue;
        }
        serde_json::to_writer(&mut out, &record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// `long:short`, or a single name used for both sides.
fn parse_condition_pair(raw: &str) -> Result<(String, String), String> {
    let (long, short) = raw.split_once(':').unwrap_or((raw, raw));
    if long.is_empty() || short.is_empty() {
        return Err(format!("invalid condition pair '{raw}'"));
    }
    Ok((long.to_string(), short.to_string()))
}

fn print_summary(report: &RunReport) {
    let stats = &report.statistics;
    let entry = &report.strategy.entry;

    println!();
    println!("=== Backtest Result ===");
    println!("Run:            {}", &report.run_id[..report.run_id.len().min(16)]);
    println!("Conditions:     {} / {}", entry.long_condition, entry.short_condition);
    if let (Some(first), Some(last)) = (report.first_timestamp, report.last_timestamp) {
        println!("Period:         {first} to {last}");
    }
    println!(
        "Bars:           {} ({} warmup)",
        report.bar_count, report.warmup_bars
    );
    println!("Hedge:          {}", if report.strategy.hedge.enabled { "on" } else { "off" });
    println!("Trades:         {}", stats.trade_count);
    println!("Open at end:    {}", report.open_positions.len());
    println!();
    println!("--- Performance ---");
    println!("Total P&L:      {:.4}", stats.total_pnl);
    println!("Avg P&L:        {:.4}", stats.avg_pnl);
    println!("Win Rate:       {:.1}% ({} / {})", stats.win_rate, stats.win_count, stats.loss_count);
    println!("Profit Factor:  {:.2}", stats.profit_factor);
    println!("Max Drawdown:   {:.4}", stats.max_drawdown);
    println!("Max Consec Win: {}", stats.max_consecutive_wins);
    println!("Max Consec Loss:{}", stats.max_consecutive_losses);
}
