//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::chart::ChartMetrics;
use crate::output::OutputFormat;
use crate::parser::InputSpec;

/// Compare wrk benchmark runs as a bar chart
#[derive(Parser, Debug)]
#[command(name = "wrk-compare")]
#[command(version)]
#[command(about = "Parse wrk output files and chart them side by side")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (YAML or JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a comparison chart
    Chart(ChartArgs),

    /// Print parsed results
    Show(ShowArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// Arguments for chart command
#[derive(Parser, Debug)]
pub struct ChartArgs {
    /// wrk output files, optionally labelled
    #[arg(required = true, num_args = 1.., value_name = "[LABEL=]PATH")]
    pub inputs: Vec<InputSpec>,

    /// Output PNG path
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Panels to draw (rps, latency, p99, transfer, both, all)
    #[arg(short, long, value_parser = parse_metrics)]
    pub metric: Option<ChartMetrics>,

    /// Chart title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Height in pixels
    #[arg(long)]
    pub height: Option<u32>,
}

/// Arguments for show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// wrk output files, optionally labelled
    #[arg(required = true, num_args = 1.., value_name = "[LABEL=]PATH")]
    pub inputs: Vec<InputSpec>,

    /// Output format (table, json, json-pretty, csv, markdown)
    #[arg(short, long, value_parser = parse_format)]
    pub format: Option<OutputFormat>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Print an example configuration file
    #[arg(long)]
    pub example: bool,

    /// List supported environment variables
    #[arg(long)]
    pub env: bool,
}

fn parse_metrics(s: &str) -> Result<ChartMetrics, String> {
    ChartMetrics::from_str(s).ok_or_else(|| {
        format!("unknown metric '{s}' (expected rps, latency, p99, transfer, both or all)")
    })
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    OutputFormat::from_str(s).ok_or_else(|| {
        format!("unknown format '{s}' (expected table, json, json-pretty, csv or markdown)")
    })
}
