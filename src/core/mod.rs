pub mod api_listener;
pub mod classifier;
pub mod dom_scanner;
pub mod etl;
pub mod merge;
pub mod normalizer;
pub mod orchestrator;
pub mod pipeline;
pub mod table_scanner;
pub mod tokens;

pub use crate::domain::model::{DepartureCandidate, Direction, TransformResult};
pub use crate::domain::ports::{ConfigProvider, LoadedPage, PageDriver, Pipeline, Storage};
pub use crate::utils::error::Result;
