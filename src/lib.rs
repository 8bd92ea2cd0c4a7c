pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::ScraperConfig;

pub use crate::adapters::{http::HttpPageDriver, page::StaticPage, storage::LocalStorage};
pub use crate::core::{etl::EtlEngine, orchestrator::Extractor, pipeline::TimetablePipeline};
pub use crate::utils::error::{Result, ScrapeError};
