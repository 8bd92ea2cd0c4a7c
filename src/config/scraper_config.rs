use crate::adapters::http::DEFAULT_PAGE_TIMEOUT;
use crate::core::api_listener::{DEFAULT_API_HOST, DEFAULT_API_WINDOW};
use crate::core::merge::DEFAULT_MAX_DEPARTURES;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, ScrapeError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_START_URL: &str = "https://www.samsoelinjen.dk/fartplan";
pub const DEFAULT_OUTPUT_PATH: &str = "./output";

/// Run settings. Keys are camelCase in both TOML files and JSON input,
/// and every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScraperConfig {
    pub start_url: String,
    pub max_departures: usize,
    pub api_host: String,
    pub api_window_ms: u64,
    pub page_timeout_secs: u64,
    pub probe_urls: Vec<String>,
    pub output_path: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            start_url: DEFAULT_START_URL.to_string(),
            max_departures: DEFAULT_MAX_DEPARTURES,
            api_host: DEFAULT_API_HOST.to_string(),
            api_window_ms: DEFAULT_API_WINDOW.as_millis() as u64,
            page_timeout_secs: DEFAULT_PAGE_TIMEOUT.as_secs(),
            probe_urls: Vec::new(),
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
        }
    }
}

impl ScraperConfig {
    /// Loads a `.json` input document, or TOML for any other extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let is_json = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScrapeError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| ScrapeError::ConfigError {
            message: format!("JSON input error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScrapeError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }
}

impl ConfigProvider for ScraperConfig {
    fn start_url(&self) -> &str {
        &self.start_url
    }

    fn max_departures(&self) -> usize {
        self.max_departures
    }

    fn api_host(&self) -> &str {
        &self.api_host
    }

    fn api_window(&self) -> Duration {
        Duration::from_millis(self.api_window_ms)
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }
}

impl Validate for ScraperConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("startUrl", &self.start_url)?;
        validation::validate_positive_number("maxDepartures", self.max_departures, 1)?;
        validation::validate_non_empty_string("apiHost", &self.api_host)?;
        validation::validate_range("apiWindowMs", self.api_window_ms, 0, 120_000)?;
        validation::validate_range("pageTimeoutSecs", self.page_timeout_secs, 1, 600)?;
        for probe in &self.probe_urls {
            validation::validate_url("probeUrls", probe)?;
        }
        validation::validate_path("outputPath", &self.output_path)?;
        Ok(())
    }
}
