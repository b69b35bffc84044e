//! Configuration module
//!
//! Chart and output defaults, loaded from a YAML or JSON file and
//! overridden by `WRK_COMPARE_*` environment variables.

mod env;

pub use env::{print_env_help, EnvConfig};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::chart::{ChartMetrics, ChartOptions, DEFAULT_HEIGHT, DEFAULT_OUTPUT, DEFAULT_WIDTH};
use crate::output::OutputFormat;

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./wrk-compare.yaml",
    "./.wrk-compare.yaml",
    "~/.config/wrk-compare/config.yaml",
];

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Chart title
    pub title: String,

    /// Chart output path
    pub output: PathBuf,

    /// Chart width in pixels
    pub width: u32,

    /// Chart height in pixels
    pub height: u32,

    /// Panels to draw
    pub metric: ChartMetrics,

    /// Default `show` format
    pub format: String,

    /// File this configuration was loaded from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: ChartOptions::default().title,
            output: PathBuf::from(DEFAULT_OUTPUT),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            metric: ChartMetrics::default(),
            format: "table".to_string(),
            source: None,
        }
    }
}

impl AppConfig {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.is_file())
    }

    /// Load `path` if given, else the first file found, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::find() {
                Some(found) => Self::load(found),
                None => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Serialize in the format implied by `path`'s extension
    pub fn to_string_for(&self, path: &Path) -> Result<String> {
        if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!(
                "Chart dimensions must be positive, got {}x{}",
                self.width,
                self.height
            );
        }
        if self.output.as_os_str().is_empty() {
            bail!("Output path must not be empty");
        }
        if OutputFormat::from_str(&self.format).is_none() {
            bail!("Unknown output format: {}", self.format);
        }
        Ok(())
    }

    /// Apply environment overrides on top of file values
    pub fn apply_env(&mut self, overrides: &EnvConfig) -> Result<()> {
        if let Some(title) = &overrides.title {
            self.title = title.clone();
        }
        if let Some(output) = &overrides.output {
            self.output = PathBuf::from(output);
        }
        if let Some(width) = &overrides.width {
            self.width = parse_pixels(width, "WIDTH")?;
        }
        if let Some(height) = &overrides.height {
            self.height = parse_pixels(height, "HEIGHT")?;
        }
        if let Some(metric) = &overrides.metric {
            self.metric = ChartMetrics::from_str(metric)
                .with_context(|| format!("Invalid {}: {metric}", env::var_name("METRIC")))?;
        }
        if let Some(format) = &overrides.format {
            self.format = format.clone();
        }
        self.validate()
            .context("Invalid configuration after environment overrides")
    }

    /// Chart options from this configuration
    pub fn chart_options(&self) -> ChartOptions {
        ChartOptions::default()
            .with_title(self.title.clone())
            .with_size(self.width, self.height)
            .with_metrics(self.metric)
    }

    /// Output format for `show`
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from_str(&self.format).unwrap_or_default()
    }

    /// Generate example configuration
    pub fn example() -> Self {
        Self {
            title: "Load Balancing Algorithms".to_string(),
            output: PathBuf::from("charts/lb_comparison.png"),
            width: 1200,
            height: 700,
            metric: ChartMetrics::All,
            format: "markdown".to_string(),
            source: None,
        }
    }
}

fn parse_pixels(value: &str, name: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid {}: {value}", env::var_name(name)))
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
