//! Environment variable configuration
//!
//! Values are kept as strings here and validated when applied to `AppConfig`.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "WRK_COMPARE";

/// Overrides read from `WRK_COMPARE_*` variables
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvConfig {
    /// Chart output path from WRK_COMPARE_OUTPUT
    pub output: Option<String>,
    /// Chart title from WRK_COMPARE_TITLE
    pub title: Option<String>,
    /// Width from WRK_COMPARE_WIDTH
    pub width: Option<String>,
    /// Height from WRK_COMPARE_HEIGHT
    pub height: Option<String>,
    /// Panels from WRK_COMPARE_METRIC
    pub metric: Option<String>,
    /// `show` format from WRK_COMPARE_FORMAT
    pub format: Option<String>,
    /// Config file from WRK_COMPARE_CONFIG
    pub config_file: Option<String>,
    /// Log filter directive from WRK_COMPARE_LOG
    pub log: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            output: get_env("OUTPUT"),
            title: get_env("TITLE"),
            width: get_env("WIDTH"),
            height: get_env("HEIGHT"),
            metric: get_env("METRIC"),
            format: get_env("FORMAT"),
            config_file: get_env("CONFIG"),
            log: get_env("LOG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.output.is_some()
            || self.title.is_some()
            || self.width.is_some()
            || self.height.is_some()
            || self.metric.is_some()
            || self.format.is_some()
            || self.config_file.is_some()
            || self.log.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_OUTPUT:  {:?}", ENV_PREFIX, self.output);
        println!("  {}_TITLE:   {:?}", ENV_PREFIX, self.title);
        println!("  {}_WIDTH:   {:?}", ENV_PREFIX, self.width);
        println!("  {}_HEIGHT:  {:?}", ENV_PREFIX, self.height);
        println!("  {}_METRIC:  {:?}", ENV_PREFIX, self.metric);
        println!("  {}_FORMAT:  {:?}", ENV_PREFIX, self.format);
        println!("  {}_CONFIG:  {:?}", ENV_PREFIX, self.config_file);
        println!("  {}_LOG:     {:?}", ENV_PREFIX, self.log);
    }
}

/// Full variable name for `name`
pub(crate) fn var_name(name: &str) -> String {
    format!("{ENV_PREFIX}_{name}")
}

/// Get environment variable with prefix; empty values count as unset
fn get_env(name: &str) -> Option<String> {
    env::var(var_name(name)).ok().filter(|v| !v.trim().is_empty())
}

/// Print all WRK_COMPARE environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_OUTPUT   Chart output path (default: benchmark_comparison.png)");
    println!("  {ENV_PREFIX}_TITLE    Chart title");
    println!("  {ENV_PREFIX}_WIDTH    Chart width in pixels");
    println!("  {ENV_PREFIX}_HEIGHT   Chart height in pixels");
    println!("  {ENV_PREFIX}_METRIC   Panels to draw (rps, latency, p99, transfer, both, all)");
    println!("  {ENV_PREFIX}_FORMAT   Default show format (table, json, json-pretty, csv, markdown)");
    println!("  {ENV_PREFIX}_CONFIG   Path to configuration file");
    println!("  {ENV_PREFIX}_LOG      Log filter directive (e.g. wrk_compare=debug)");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_METRIC=all");
    println!("  wrk-compare chart rr=round_robin.txt lc=least_conn.txt");
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sets variables for the guard's lifetime and restores them on drop
    struct EnvGuard {
        previous: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn set(vars: &[(&str, &str)]) -> Self {
            let previous = vars
                .iter()
                .map(|(name, value)| {
                    let key = var_name(name);
                    let old = env::var(&key).ok();
                    env::set_var(&key, value);
                    (key, old)
                })
                .collect();
            Self { previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.previous {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.output.is_none());
        assert!(!config.has_any());
    }

    #[test]
    fn test_env_load() {
        let _guard = EnvGuard::set(&[("TITLE", "Nightly"), ("WIDTH", "1280"), ("LOG", "  ")]);

        let config = EnvConfig::load();
        assert_eq!(config.title.as_deref(), Some("Nightly"));
        assert_eq!(config.width.as_deref(), Some("1280"));
        assert_eq!(config.log, None);
        assert!(config.has_any());
    }

    #[test]
    fn test_var_name() {
        assert_eq!(var_name("METRIC"), "WRK_COMPARE_METRIC");
    }
}
