pub mod toml_config;

use crate::utils::error::Result;
use crate::utils::validation;

#[cfg(feature = "cli")]
use crate::adapters::cat_api::DEFAULT_BASE_URL;
#[cfg(feature = "cli")]
use crate::core::acquisition::DEFAULT_MAX_ATTEMPTS;
#[cfg(feature = "cli")]
use crate::core::{ConfigProvider, ExclusionRule};
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::time::Duration;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "feline-finder")]
#[command(about = "Find a random cat, skipping breeds, weights, origins and life spans you ban")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub api_base_url: String,

    #[arg(long, env = "CAT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: usize,

    #[arg(long, help = "Per-request timeout in seconds")]
    pub timeout_seconds: Option<u64>,

    #[arg(long = "ban", value_name = "PROPERTY=VALUE", help = "Start with this exclusion (repeatable)")]
    pub bans: Vec<ExclusionRule>,

    #[arg(long, help = "Fetch one cat, print it and exit")]
    pub once: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_common(&self.api_base_url, &self.api_key, self.max_attempts, self.timeout_seconds)
    }
}

pub(crate) fn validate_common(
    base_url: &str,
    api_key: &Option<String>,
    max_attempts: usize,
    timeout_seconds: Option<u64>,
) -> Result<()> {
    validation::validate_url("api_base_url", base_url)?;
    validation::validate_api_key("api_key", api_key)?;
    validation::validate_positive_number("max_attempts", max_attempts, 1)?;
    if let Some(timeout) = timeout_seconds {
        validation::validate_range("timeout_seconds", timeout, 1, 300)?;
    }
    Ok(())
}
