use crate::core::orchestrator::Extractor;
use crate::core::{ConfigProvider, PageDriver, Pipeline, Storage};
use crate::domain::model::{
    DatasetRecord, DiagnosticRecord, Direction, DirectionRecord, IndexedDeparture, PageOutcome,
    ScrapedPage, TransformResult,
};
use crate::utils::error::{Result, ScrapeError};
use chrono::Utc;

pub const DATASET_FILE: &str = "dataset.json";
pub const CSV_FILE: &str = "departures.csv";

const CSV_HEADER: [&str; 7] = [
    "direction",
    "index",
    "departureTime",
    "arrivalTime",
    "origin",
    "destination",
    "route",
];

pub struct TimetablePipeline<D: PageDriver, S: Storage, C: ConfigProvider> {
    driver: D,
    storage: S,
    config: C,
    extractor: Extractor,
}

impl<D: PageDriver, S: Storage, C: ConfigProvider> TimetablePipeline<D, S, C> {
    pub fn new(driver: D, storage: S, config: C) -> Self {
        let extractor = Extractor::from_config(&config);
        Self {
            driver,
            storage,
            config,
            extractor,
        }
    }
}

/// One record per non-empty direction, or a single diagnostic record.
pub fn dataset_records(page: ScrapedPage) -> Vec<DatasetRecord> {
    let ScrapedPage {
        url,
        scraped_at,
        outcome,
    } = page;

    match outcome {
        PageOutcome::Departures(mut result) => Direction::ALL
            .into_iter()
            .filter_map(|direction| {
                let departures = result.buckets.take(direction);
                if departures.is_empty() {
                    return None;
                }
                let count = departures.len();
                Some(DatasetRecord::Departures(DirectionRecord {
                    direction: direction.label(),
                    route: direction.route(),
                    origin: direction.origin().to_string(),
                    destination: direction.destination().to_string(),
                    url: url.clone(),
                    scraped_at,
                    departures: departures
                        .into_iter()
                        .enumerate()
                        .map(|(i, departure)| IndexedDeparture {
                            departure,
                            index: i + 1,
                        })
                        .collect(),
                    count,
                }))
            })
            .collect(),
        PageOutcome::Diagnostic { html, note } => {
            vec![DatasetRecord::Diagnostic(DiagnosticRecord {
                url,
                scraped_at,
                html,
                note,
            })]
        }
    }
}

/// Every departure as one CSV row. Diagnostic records contribute nothing.
pub fn departures_csv(records: &[DatasetRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for record in records {
        let DatasetRecord::Departures(record) = record else {
            continue;
        };
        for entry in &record.departures {
            let departure = &entry.departure;
            let index = entry.index.to_string();
            writer.write_record([
                record.direction.as_str(),
                index.as_str(),
                departure.departure_time.as_str(),
                departure.arrival_time.as_deref().unwrap_or(""),
                departure.origin.as_str(),
                departure.destination.as_str(),
                departure.route.as_str(),
            ])?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ScrapeError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ScrapeError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

#[async_trait::async_trait]
impl<D: PageDriver, S: Storage, C: ConfigProvider> Pipeline for TimetablePipeline<D, S, C> {
    async fn extract(&self) -> Result<ScrapedPage> {
        let url = self.config.start_url();
        let outcome = self.extractor.extract_page(&self.driver, url).await?;
        Ok(ScrapedPage {
            url: url.to_string(),
            scraped_at: Utc::now(),
            outcome,
        })
    }

    async fn transform(&self, page: ScrapedPage) -> Result<TransformResult> {
        let records = dataset_records(page);

        let mut directions = 0;
        let mut total = 0;
        for record in &records {
            if let DatasetRecord::Departures(record) = record {
                tracing::info!("Saved {} departures {}", record.count, record.direction);
                directions += 1;
                total += record.count;
            }
        }
        if directions > 0 {
            tracing::info!("Saved {} departures in {} directions", total, directions);
        }

        let csv_output = departures_csv(&records)?;
        Ok(TransformResult {
            records,
            csv_output,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let dataset = serde_json::to_vec_pretty(&result.records)?;
        tracing::debug!(
            "Writing {} records ({} bytes) to storage",
            result.records.len(),
            dataset.len()
        );
        self.storage.write_file(DATASET_FILE, &dataset).await?;
        self.storage
            .write_file(CSV_FILE, result.csv_output.as_bytes())
            .await?;

        Ok(format!("{}/{}", self.config.output_path(), DATASET_FILE))
    }
}
