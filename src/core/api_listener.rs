use crate::core::normalizer::normalize_response;
use crate::domain::model::{Buckets, InterceptedResponse};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};

pub const DEFAULT_API_HOST: &str = "api.molslinjen.dk";
pub const DEFAULT_API_WINDOW: Duration = Duration::from_secs(5);

/// Decides which intercepted responses are worth decoding.
#[derive(Debug, Clone)]
pub struct ResponseFilter {
    api_host: String,
}

impl ResponseFilter {
    pub fn new(api_host: impl Into<String>) -> Self {
        Self {
            api_host: api_host.into(),
        }
    }

    pub fn qualifies(&self, url: &str) -> bool {
        url.contains(&self.api_host) && (url.contains("departure") || url.contains("timetable"))
    }
}

impl Default for ResponseFilter {
    fn default() -> Self {
        Self::new(DEFAULT_API_HOST)
    }
}

/// Drains `responses` until `window` has elapsed or every sender is gone,
/// appending the normalized candidates of each qualifying response.
///
/// Undecodable bodies are logged and skipped.
pub async fn collect_api_candidates(
    responses: &mut mpsc::UnboundedReceiver<InterceptedResponse>,
    filter: &ResponseFilter,
    window: Duration,
) -> Buckets {
    let deadline = Instant::now() + window;
    let mut captured = Buckets::default();

    loop {
        let response = match timeout_at(deadline, responses.recv()).await {
            Ok(Some(response)) => response,
            Ok(None) => {
                tracing::debug!("Response stream closed before the window elapsed");
                break;
            }
            Err(_) => break,
        };

        if !filter.qualifies(&response.url) {
            continue;
        }

        match normalize_response(&response) {
            Ok(buckets) => {
                tracing::info!(
                    "Found API data at {} (status {}, {} departures)",
                    response.url,
                    response.status,
                    buckets.total()
                );
                captured.extend(buckets);
            }
            Err(e) => {
                tracing::debug!("Ignoring API response (status {}): {}", response.status, e);
            }
        }
    }

    captured
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Direction;

    fn response(url: &str, body: &str) -> InterceptedResponse {
        InterceptedResponse {
            url: url.to_string(),
            status: 200,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_filter() {
        let filter = ResponseFilter::default();
        assert!(filter.qualifies("https://api.molslinjen.dk/v2/departures?route=KB"));
        assert!(filter.qualifies("https://api.molslinjen.dk/timetable/today"));
        assert!(!filter.qualifies("https://api.molslinjen.dk/prices"));
        assert!(!filter.qualifies("https://cdn.example.com/departures.json"));
    }

    #[tokio::test]
    async fn test_collects_until_senders_dropped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(response(
            "https://api.molslinjen.dk/departures",
            r#"[{"origin": "Kalundborg", "time": "06:00"}]"#,
        ))
        .unwrap();
        tx.send(response("https://api.molslinjen.dk/departures", "not json"))
            .unwrap();
        tx.send(response(
            "https://tracking.example.com/departure",
            r#"[{"origin": "Ballen", "time": "07:00"}]"#,
        ))
        .unwrap();
        tx.send(response(
            "https://api.molslinjen.dk/timetable",
            r#"{"routes": [{"origin": "Ballen", "time": "08:00"}]}"#,
        ))
        .unwrap();
        drop(tx);

        let captured =
            collect_api_candidates(&mut rx, &ResponseFilter::default(), Duration::from_secs(30))
                .await;
        assert_eq!(captured.get(Direction::KalundborgToBallen).len(), 1);
        assert_eq!(
            captured.get(Direction::BallenToKalundborg)[0].departure_time,
            "08:00"
        );
    }

    #[tokio::test]
    async fn test_status_does_not_gate_capture() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(InterceptedResponse {
            status: 503,
            ..response(
                "https://api.molslinjen.dk/departures",
                r#"[{"origin": "Ballen", "time": "09:00"}]"#,
            )
        })
        .unwrap();
        drop(tx);

        let captured =
            collect_api_candidates(&mut rx, &ResponseFilter::default(), DEFAULT_API_WINDOW).await;
        assert_eq!(captured.get(Direction::BallenToKalundborg).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_elapses_without_responses() {
        let (_tx, mut rx) = mpsc::unbounded_channel::<InterceptedResponse>();
        let captured =
            collect_api_candidates(&mut rx, &ResponseFilter::default(), DEFAULT_API_WINDOW).await;
        assert!(captured.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_is_missed() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            let _ = tx.send(response(
                "https://api.molslinjen.dk/departures",
                r#"[{"origin": "Kalundborg", "time": "06:00"}]"#,
            ));
        });

        let captured =
            collect_api_candidates(&mut rx, &ResponseFilter::default(), DEFAULT_API_WINDOW).await;
        assert!(captured.is_empty());
    }
}
