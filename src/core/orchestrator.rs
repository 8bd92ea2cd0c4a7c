//! Per-page extraction: wait for API data, fall back to scanning the page,
//! and fall back again to a raw markup capture.

use crate::core::api_listener::{collect_api_candidates, ResponseFilter};
use crate::core::tokens::prefix_chars;
use crate::core::{dom_scanner, merge, table_scanner};
use crate::domain::model::{
    Buckets, Direction, DomSnapshot, ExtractionResult, ExtractionSource, PageOutcome,
};
use crate::domain::ports::{ConfigProvider, LoadedPage, PageDriver};
use crate::utils::error::Result;
use std::time::Duration;
use tokio::sync::mpsc;

pub const DIAGNOSTIC_HTML_CHARS: usize = 10_000;
pub const DIAGNOSTIC_NOTE: &str = "No departures found - see HTML for debugging";

/// Outcome of the API observation window. While the window is open the
/// extraction is awaiting API data; see `collect_api_candidates`.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionState {
    /// The window closed without a classifiable API departure.
    ApiMissed,
    Resolved(ExtractionResult),
}

impl ExtractionState {
    /// State once the observation window has closed with `api` captured.
    /// Any API candidate resolves the page; the page scan is never consulted.
    pub fn after_window(api: Buckets, max_departures: usize) -> Self {
        if api.is_empty() {
            return ExtractionState::ApiMissed;
        }
        ExtractionState::Resolved(ExtractionResult {
            buckets: merge::merge(vec![api], max_departures),
            source: ExtractionSource::Api,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Extractor {
    filter: ResponseFilter,
    window: Duration,
    max_departures: usize,
}

impl Extractor {
    pub fn new(filter: ResponseFilter, window: Duration, max_departures: usize) -> Self {
        Self {
            filter,
            window,
            max_departures,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self::new(
            ResponseFilter::new(config.api_host()),
            config.api_window(),
            config.max_departures(),
        )
    }

    /// DOM and table candidates merged, DOM first.
    pub fn resolve_from_page(&self, snapshot: &DomSnapshot) -> ExtractionResult {
        let dom = dom_scanner::scan(snapshot);
        let tables = table_scanner::scan(snapshot);
        tracing::debug!(
            "Page scan: {} text candidates, {} table candidates",
            dom.total(),
            tables.total()
        );
        ExtractionResult {
            buckets: merge::merge(vec![dom, tables], self.max_departures),
            source: ExtractionSource::PageScan,
        }
    }

    /// Runs the whole extraction for `url`. Only a failure to load the page,
    /// or to read it once loaded, is an error.
    pub async fn extract_page(&self, driver: &dyn PageDriver, url: &str) -> Result<PageOutcome> {
        tracing::info!("Scraping timetable from: {}", url);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let page = driver.open(url, tx).await?;

        match page.dismiss_cookie_banner().await {
            Ok(true) => tracing::debug!("Cookie banner accepted"),
            Ok(false) => tracing::debug!("No cookie banner found or already accepted"),
            Err(e) => tracing::debug!("Cookie banner could not be dismissed: {}", e),
        }

        let api = collect_api_candidates(&mut rx, &self.filter, self.window).await;

        let result = match ExtractionState::after_window(api, self.max_departures) {
            ExtractionState::Resolved(result) => result,
            ExtractionState::ApiMissed => {
                tracing::info!("No API data captured, scraping from HTML...");
                let snapshot = page.snapshot().await?;
                self.resolve_from_page(&snapshot)
            }
        };

        tracing::info!(
            "Found {} departures from Kalundborg and {} from Ballen ({:?})",
            result.buckets.get(Direction::KalundborgToBallen).len(),
            result.buckets.get(Direction::BallenToKalundborg).len(),
            result.source
        );

        if !result.buckets.is_empty() {
            return Ok(PageOutcome::Departures(result));
        }

        tracing::warn!("No departures found. Keeping page HTML for debugging.");
        diagnostic(page.as_ref()).await
    }
}

async fn diagnostic(page: &dyn LoadedPage) -> Result<PageOutcome> {
    let html = page.content().await?;
    Ok(PageOutcome::Diagnostic {
        html: prefix_chars(&html, DIAGNOSTIC_HTML_CHARS),
        note: DIAGNOSTIC_NOTE.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::page::StaticPage;
    use crate::core::merge::DEFAULT_MAX_DEPARTURES;
    use crate::domain::model::InterceptedResponse;
    use crate::utils::error::ScrapeError;
    use async_trait::async_trait;

    struct FakeDriver {
        html: String,
        responses: Vec<InterceptedResponse>,
        times_out: bool,
    }

    impl FakeDriver {
        fn new(html: &str) -> Self {
            Self {
                html: html.to_string(),
                responses: vec![],
                times_out: false,
            }
        }

        fn with_api(mut self, url: &str, body: serde_json::Value) -> Self {
            self.responses.push(InterceptedResponse {
                url: url.to_string(),
                status: 200,
                body: body.to_string(),
            });
            self
        }
    }

    #[async_trait]
    impl PageDriver for FakeDriver {
        async fn open(
            &self,
            url: &str,
            responses: mpsc::UnboundedSender<InterceptedResponse>,
        ) -> Result<Box<dyn LoadedPage>> {
            if self.times_out {
                return Err(ScrapeError::UpstreamTimeout {
                    url: url.to_string(),
                    seconds: 60,
                });
            }
            for response in &self.responses {
                responses.send(response.clone()).unwrap();
            }
            Ok(Box::new(StaticPage::new(self.html.clone())))
        }
    }

    fn extractor(max: usize) -> Extractor {
        Extractor::new(ResponseFilter::default(), Duration::from_secs(5), max)
    }

    fn times(outcome: &PageOutcome, direction: Direction) -> Vec<String> {
        match outcome {
            PageOutcome::Departures(result) => result
                .buckets
                .get(direction)
                .iter()
                .map(|c| c.departure_time.clone())
                .collect(),
            PageOutcome::Diagnostic { .. } => panic!("expected departures"),
        }
    }

    const TABLE_PAGE: &str = r#"<html><body>
        <table>
          <tr><th>Kalundborg - Ballen</th></tr>
          <tr><td>07:30</td><td>Kalundborg</td><td>Ballen</td></tr>
          <tr><td>09:15</td><td>Kalundborg</td><td>Ballen</td></tr>
        </table>
    </body></html>"#;

    #[tokio::test]
    async fn test_api_duplicates_collapse() {
        let driver = FakeDriver::new("<html><body></body></html>").with_api(
            "https://api.molslinjen.dk/departures",
            serde_json::json!({"departures": [
                {"origin": "Kalundborg", "destination": "Ballen", "departureTime": "08:00"},
                {"origin": "Kalundborg", "destination": "Ballen", "departureTime": "08:00"}
            ]}),
        );
        let outcome = extractor(DEFAULT_MAX_DEPARTURES)
            .extract_page(&driver, "https://www.samsoelinjen.dk/fartplan")
            .await
            .unwrap();
        assert_eq!(times(&outcome, Direction::KalundborgToBallen), vec!["08:00"]);
        assert!(times(&outcome, Direction::BallenToKalundborg).is_empty());
    }

    #[tokio::test]
    async fn test_api_takes_precedence_over_page() {
        let driver = FakeDriver::new(TABLE_PAGE).with_api(
            "https://api.molslinjen.dk/timetable",
            serde_json::json!([{"from": "Ballen", "time": "18:00"}]),
        );
        let outcome = extractor(DEFAULT_MAX_DEPARTURES)
            .extract_page(&driver, "https://www.samsoelinjen.dk/fartplan")
            .await
            .unwrap();
        assert!(matches!(
            &outcome,
            PageOutcome::Departures(ExtractionResult { source: ExtractionSource::Api, .. })
        ));
        assert!(times(&outcome, Direction::KalundborgToBallen).is_empty());
        assert_eq!(times(&outcome, Direction::BallenToKalundborg), vec!["18:00"]);
    }

    #[tokio::test]
    async fn test_unclassifiable_api_data_falls_back_to_page() {
        let driver = FakeDriver::new(TABLE_PAGE).with_api(
            "https://api.molslinjen.dk/departures",
            serde_json::json!([{"origin": "Aarhus", "time": "05:00"}]),
        );
        let outcome = extractor(DEFAULT_MAX_DEPARTURES)
            .extract_page(&driver, "https://www.samsoelinjen.dk/fartplan")
            .await
            .unwrap();
        assert_eq!(
            times(&outcome, Direction::KalundborgToBallen),
            vec!["07:30", "09:15"]
        );
    }

    #[tokio::test]
    async fn test_table_page_without_api() {
        let driver = FakeDriver::new(TABLE_PAGE);
        let outcome = extractor(DEFAULT_MAX_DEPARTURES)
            .extract_page(&driver, "https://www.samsoelinjen.dk/fartplan")
            .await
            .unwrap();
        assert!(matches!(
            &outcome,
            PageOutcome::Departures(ExtractionResult { source: ExtractionSource::PageScan, .. })
        ));
        assert_eq!(
            times(&outcome, Direction::KalundborgToBallen),
            vec!["07:30", "09:15"]
        );
        assert!(times(&outcome, Direction::BallenToKalundborg).is_empty());
    }

    #[tokio::test]
    async fn test_max_departures_applies_to_page_scan() {
        let outcome = extractor(1)
            .extract_page(&FakeDriver::new(TABLE_PAGE), "https://www.samsoelinjen.dk/fartplan")
            .await
            .unwrap();
        assert_eq!(times(&outcome, Direction::KalundborgToBallen), vec!["07:30"]);
    }

    #[tokio::test]
    async fn test_empty_page_yields_diagnostic() {
        let filler = "Ingen afgange. ".repeat(2_000);
        let html = format!("<html><body><p>{}</p></body></html>", filler);
        let outcome = extractor(DEFAULT_MAX_DEPARTURES)
            .extract_page(&FakeDriver::new(&html), "https://www.samsoelinjen.dk/fartplan")
            .await
            .unwrap();
        match outcome {
            PageOutcome::Diagnostic { html, note } => {
                assert_eq!(html.chars().count(), DIAGNOSTIC_HTML_CHARS);
                assert!(html.starts_with("<html>"));
                assert!(!note.is_empty());
            }
            PageOutcome::Departures(_) => panic!("expected a diagnostic"),
        }
    }

    #[tokio::test]
    async fn test_page_timeout_is_fatal() {
        let mut driver = FakeDriver::new(TABLE_PAGE);
        driver.times_out = true;
        let err = extractor(DEFAULT_MAX_DEPARTURES)
            .extract_page(&driver, "https://www.samsoelinjen.dk/fartplan")
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::UpstreamTimeout { .. }));
    }

    #[test]
    fn test_after_window_state() {
        assert_eq!(
            ExtractionState::after_window(Buckets::default(), DEFAULT_MAX_DEPARTURES),
            ExtractionState::ApiMissed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_many_responses_during_load_do_not_stall() {
        let mut driver = FakeDriver::new(TABLE_PAGE);
        for minute in 0..200 {
            let time = format!("10:{:02}", minute % 60);
            driver = driver.with_api(
                "https://api.molslinjen.dk/departures",
                serde_json::json!([{"origin": "Ballen", "time": time}]),
            );
        }
        let outcome = tokio::time::timeout(
            Duration::from_secs(120),
            extractor(DEFAULT_MAX_DEPARTURES)
                .extract_page(&driver, "https://www.samsoelinjen.dk/fartplan"),
        )
        .await
        .expect("extraction stalled while the page was loading")
        .unwrap();
        assert_eq!(times(&outcome, Direction::BallenToKalundborg).len(), 50);
        assert_eq!(times(&outcome, Direction::BallenToKalundborg)[0], "10:00");
    }
}
