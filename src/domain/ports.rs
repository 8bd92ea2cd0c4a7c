use crate::domain::model::{DomSnapshot, InterceptedResponse, ScrapedPage, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn start_url(&self) -> &str;
    fn max_departures(&self) -> usize;
    fn api_host(&self) -> &str;
    fn api_window(&self) -> Duration;
    fn output_path(&self) -> &str;
}

/// Opens pages and reports the network responses seen while they load.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Loads `url`. Responses observed from now on are sent to `responses`,
    /// which never blocks; the driver drops every sender once it can observe
    /// no more.
    ///
    /// A page that does not load in time fails with `ScrapeError::UpstreamTimeout`.
    async fn open(
        &self,
        url: &str,
        responses: mpsc::UnboundedSender<InterceptedResponse>,
    ) -> Result<Box<dyn LoadedPage>>;
}

#[async_trait]
pub trait LoadedPage: Send + Sync {
    /// Returns whether a consent banner was found and dismissed.
    async fn dismiss_cookie_banner(&self) -> Result<bool>;
    async fn snapshot(&self) -> Result<DomSnapshot>;
    async fn content(&self) -> Result<String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ScrapedPage>;
    async fn transform(&self, page: ScrapedPage) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
