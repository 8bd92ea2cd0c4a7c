#[cfg(feature = "cli")]
pub mod cli;
pub mod scraper_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use scraper_config::ScraperConfig;
