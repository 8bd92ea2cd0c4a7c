//! Page driver that fetches markup over plain HTTP.
//!
//! Without a browser there is no network traffic to intercept, so the
//! configured probe endpoints are fetched alongside the page and reported as
//! the responses the page would have triggered.

use crate::adapters::page::StaticPage;
use crate::domain::model::InterceptedResponse;
use crate::domain::ports::{LoadedPage, PageDriver};
use crate::utils::error::{Result, ScrapeError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::mpsc;

pub const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(60);

pub struct HttpPageDriver {
    client: Client,
    page_timeout: Duration,
    probe_urls: Vec<String>,
}

impl HttpPageDriver {
    pub fn new(page_timeout: Duration, probe_urls: Vec<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("fartplan-etl/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            page_timeout,
            probe_urls,
        })
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        tracing::debug!("Page response status: {}", response.status());
        Ok(response.text().await?)
    }

    fn spawn_probes(&self, responses: &mpsc::UnboundedSender<InterceptedResponse>) {
        for url in &self.probe_urls {
            let client = self.client.clone();
            let responses = responses.clone();
            let url = url.clone();
            tokio::spawn(async move {
                match fetch_probe(&client, &url).await {
                    Ok(response) => {
                        // the receiver is gone once the observation window has closed
                        if responses.send(response).is_err() {
                            tracing::debug!("Probe {} answered after the window closed", url);
                        }
                    }
                    Err(e) => tracing::debug!("Probe {} failed: {}", url, e),
                }
            });
        }
    }
}

async fn fetch_probe(client: &Client, url: &str) -> Result<InterceptedResponse> {
    let response = client.get(url).send().await?;
    let status = response.status().as_u16();
    let url = response.url().to_string();
    let body = response.text().await?;
    Ok(InterceptedResponse { url, status, body })
}

#[async_trait]
impl PageDriver for HttpPageDriver {
    async fn open(
        &self,
        url: &str,
        responses: mpsc::UnboundedSender<InterceptedResponse>,
    ) -> Result<Box<dyn LoadedPage>> {
        self.spawn_probes(&responses);
        drop(responses);

        let html = tokio::time::timeout(self.page_timeout, self.fetch_page(url))
            .await
            .map_err(|_| ScrapeError::UpstreamTimeout {
                url: url.to_string(),
                seconds: self.page_timeout.as_secs(),
            })??;

        tracing::debug!("Loaded {} ({} bytes)", url, html.len());
        Ok(Box::new(StaticPage::new(html)))
    }
}
