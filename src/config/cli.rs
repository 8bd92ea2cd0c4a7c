use crate::config::scraper_config::ScraperConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

/// Command-line flags. Anything given here overrides the `--config` file.
#[derive(Debug, Clone, Parser)]
#[command(name = "fartplan")]
#[command(about = "Extracts Kalundborg ⇄ Ballen ferry departures from a timetable page")]
pub struct CliConfig {
    #[arg(long, help = "TOML settings file, or a .json input document")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub start_url: Option<String>,

    #[arg(long)]
    pub max_departures: Option<usize>,

    #[arg(long)]
    pub api_host: Option<String>,

    #[arg(long)]
    pub api_window_ms: Option<u64>,

    #[arg(long)]
    pub page_timeout_secs: Option<u64>,

    #[arg(long = "probe-url", value_delimiter = ',')]
    pub probe_urls: Vec<String>,

    #[arg(long)]
    pub output_path: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    pub fn resolve(&self) -> Result<ScraperConfig> {
        let mut config = match &self.config {
            Some(path) => ScraperConfig::from_file(path)?,
            None => ScraperConfig::default(),
        };

        if let Some(start_url) = &self.start_url {
            config.start_url = start_url.clone();
        }
        if let Some(max_departures) = self.max_departures {
            config.max_departures = max_departures;
        }
        if let Some(api_host) = &self.api_host {
            config.api_host = api_host.clone();
        }
        if let Some(api_window_ms) = self.api_window_ms {
            config.api_window_ms = api_window_ms;
        }
        if let Some(page_timeout_secs) = self.page_timeout_secs {
            config.page_timeout_secs = page_timeout_secs;
        }
        if !self.probe_urls.is_empty() {
            config.probe_urls = self.probe_urls.clone();
        }
        if let Some(output_path) = &self.output_path {
            config.output_path = output_path.clone();
        }

        Ok(config)
    }
}
