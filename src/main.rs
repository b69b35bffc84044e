//! wrk-compare - wrk benchmark comparison tool
//!
//! Reads the text output of several wrk runs, parses throughput and latency
//! figures, and renders them side by side as a PNG bar chart.
//!
//! ## Usage
//!
//! ```bash
//! # Compare two load-balancing algorithms
//! wrk-compare chart rr=round_robin.txt lc=least_conn.txt
//!
//! # All panels, custom output
//! wrk-compare chart *.txt --metric all -o charts/lb.png
//!
//! # Print parsed numbers
//! wrk-compare show *.txt --format markdown
//!
//! # Save parsed results and chart them later
//! wrk-compare show *.txt -f json > results.json
//! wrk-compare chart results.json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

mod chart;
mod cli;
mod config;
mod models;
mod output;
mod parser;
mod utils;

use chart::{render_comparison, ChartOptions};
use cli::{Args, ChartArgs, Command, ConfigArgs, ShowArgs};
use config::{print_env_help, AppConfig, EnvConfig};
use output::ResultFormatter;
use parser::load_results;
use utils::{init_logger, LogLevel};

fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load();

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    init_logger(level, env.log.as_deref());

    let config = load_config(args.config.as_deref(), &env)?;

    match args.command {
        Command::Chart(chart_args) => {
            run_chart(chart_args, &config)?;
        }
        Command::Show(show_args) => {
            show_results(show_args, &config)?;
        }
        Command::Config(config_args) => {
            show_config(config_args, &config, &env)?;
        }
    }

    Ok(())
}

/// Resolve configuration: file (explicit, then searched), then environment
fn load_config(cli_path: Option<&Path>, env: &EnvConfig) -> Result<AppConfig> {
    let explicit = cli_path
        .map(Path::to_path_buf)
        .or_else(|| env.config_file.as_ref().map(PathBuf::from));

    let mut config = AppConfig::load_or_default(explicit.as_deref())?;
    config.apply_env(env)?;
    debug!(source = ?config.source, "Configuration resolved");
    Ok(config)
}

/// Output path and chart options with command-line flags applied last
fn chart_settings(args: &ChartArgs, config: &AppConfig) -> (PathBuf, ChartOptions) {
    let output = args.output.clone().unwrap_or_else(|| config.output.clone());

    let mut options = config.chart_options();
    if let Some(title) = &args.title {
        options = options.with_title(title.clone());
    }
    if let Some(metric) = args.metric {
        options = options.with_metrics(metric);
    }
    let width = args.width.unwrap_or(options.width);
    let height = args.height.unwrap_or(options.height);

    (output, options.with_size(width, height))
}

/// Read, parse and render; returns the chart path
fn run_chart(args: ChartArgs, config: &AppConfig) -> Result<PathBuf> {
    let (output, options) = chart_settings(&args, config);
    info!(inputs = args.inputs.len(), output = %output.display(), "Building comparison chart");

    let results = load_results(&args.inputs)?;
    for result in &results {
        debug!(latency = %result.latency.format_summary(), "{result}");
    }

    render_comparison(&results, &output, &options)
        .with_context(|| format!("Failed to render chart to {}", output.display()))?;

    println!("Chart saved to {}", output.display());
    Ok(output)
}

fn show_results(args: ShowArgs, config: &AppConfig) -> Result<()> {
    let results = load_results(&args.inputs)?;
    let format = args.format.unwrap_or_else(|| config.output_format());

    let output = ResultFormatter::new(format).format(&results)?;
    println!("{output}");
    Ok(())
}

fn show_config(args: ConfigArgs, config: &AppConfig, env: &EnvConfig) -> Result<()> {
    if args.env {
        print_env_help();
        if env.has_any() {
            println!();
            env.print_summary();
        }
        return Ok(());
    }

    if args.example {
        print!(
            "{}",
            AppConfig::example().to_string_for(Path::new("config.yaml"))?
        );
        return Ok(());
    }

    match &config.source {
        Some(path) => println!("# Loaded from {}", path.display()),
        None => println!("# No config file found; built-in defaults"),
    }
    print!("{}", config.to_string_for(Path::new("config.yaml"))?);
    Ok(())
}
