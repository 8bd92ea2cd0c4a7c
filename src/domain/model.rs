use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

pub const KALUNDBORG: &str = "Kalundborg";
pub const BALLEN: &str = "Ballen";

/// One of the two directions a departure can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    KalundborgToBallen,
    BallenToKalundborg,
}

impl Direction {
    /// Classification order: Kalundborg wins when both ports are mentioned.
    pub const ALL: [Direction; 2] = [Direction::KalundborgToBallen, Direction::BallenToKalundborg];

    pub fn origin(self) -> &'static str {
        match self {
            Direction::KalundborgToBallen => KALUNDBORG,
            Direction::BallenToKalundborg => BALLEN,
        }
    }

    pub fn destination(self) -> &'static str {
        match self {
            Direction::KalundborgToBallen => BALLEN,
            Direction::BallenToKalundborg => KALUNDBORG,
        }
    }

    /// Lowercase port name whose presence in text points at this direction.
    pub fn signal(self) -> &'static str {
        match self {
            Direction::KalundborgToBallen => "kalundborg",
            Direction::BallenToKalundborg => "ballen",
        }
    }

    /// Index of the table assumed to hold this direction when rows carry no port name.
    pub fn table_position(self) -> usize {
        match self {
            Direction::KalundborgToBallen => 0,
            Direction::BallenToKalundborg => 1,
        }
    }

    pub fn route(self) -> String {
        format!("{} - {}", self.origin(), self.destination())
    }

    pub fn label(self) -> String {
        format!("{} → {}", self.origin(), self.destination())
    }
}

/// A single extracted departure, before it is folded into a page result.
///
/// Fields the source API sent beyond the canonical ones are kept in `extra`
/// and serialized alongside them. An `extra` entry named like a canonical
/// field is written in its place.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureCandidate {
    pub departure_time: String,
    #[serde(default)]
    pub arrival_time: Option<String>,
    pub origin: String,
    pub destination: String,
    pub route: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub row_data: Option<Vec<String>>,
    #[serde(default)]
    pub table_index: Option<usize>,
    #[serde(default)]
    pub row_index: Option<usize>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Serialize for DepartureCandidate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        let canonical = [
            ("departureTime", Some(self.departure_time.as_str())),
            ("arrivalTime", self.arrival_time.as_deref()),
            ("origin", Some(self.origin.as_str())),
            ("destination", Some(self.destination.as_str())),
            ("route", Some(self.route.as_str())),
        ];
        for (key, value) in canonical {
            if let Some(value) = value.filter(|_| !self.extra.contains_key(key)) {
                map.serialize_entry(key, value)?;
            }
        }
        if let Some(context) = &self.context {
            map.serialize_entry("context", context)?;
        }
        if let Some(row_data) = &self.row_data {
            map.serialize_entry("rowData", row_data)?;
        }
        if let Some(table_index) = self.table_index {
            map.serialize_entry("tableIndex", &table_index)?;
        }
        if let Some(row_index) = self.row_index {
            map.serialize_entry("rowIndex", &row_index)?;
        }
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl DepartureCandidate {
    pub fn new(direction: Direction, departure_time: impl Into<String>) -> Self {
        Self {
            departure_time: departure_time.into(),
            arrival_time: None,
            origin: direction.origin().to_string(),
            destination: direction.destination().to_string(),
            route: direction.route(),
            context: None,
            row_data: None,
            table_index: None,
            row_index: None,
            extra: Map::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_row(mut self, row_data: Vec<String>, table_index: usize, row_index: usize) -> Self {
        self.row_data = Some(row_data);
        self.table_index = Some(table_index);
        self.row_index = Some(row_index);
        self
    }
}

/// Candidates split by direction, each list in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buckets {
    pub kalundborg_to_ballen: Vec<DepartureCandidate>,
    pub ballen_to_kalundborg: Vec<DepartureCandidate>,
}

impl Buckets {
    pub fn push(&mut self, direction: Direction, candidate: DepartureCandidate) {
        self.get_mut(direction).push(candidate);
    }

    pub fn get(&self, direction: Direction) -> &[DepartureCandidate] {
        match direction {
            Direction::KalundborgToBallen => &self.kalundborg_to_ballen,
            Direction::BallenToKalundborg => &self.ballen_to_kalundborg,
        }
    }

    fn get_mut(&mut self, direction: Direction) -> &mut Vec<DepartureCandidate> {
        match direction {
            Direction::KalundborgToBallen => &mut self.kalundborg_to_ballen,
            Direction::BallenToKalundborg => &mut self.ballen_to_kalundborg,
        }
    }

    pub fn take(&mut self, direction: Direction) -> Vec<DepartureCandidate> {
        std::mem::take(self.get_mut(direction))
    }

    /// Appends `other` after the candidates already held, per direction.
    pub fn extend(&mut self, other: Buckets) {
        self.kalundborg_to_ballen.extend(other.kalundborg_to_ballen);
        self.ballen_to_kalundborg.extend(other.ballen_to_kalundborg);
    }

    pub fn total(&self) -> usize {
        self.kalundborg_to_ballen.len() + self.ballen_to_kalundborg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Which strategy produced a page's departures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtractionSource {
    Api,
    PageScan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub buckets: Buckets,
    pub source: ExtractionSource,
}

/// What a page yields once extraction has resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Departures(ExtractionResult),
    Diagnostic { html: String, note: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedPage {
    pub url: String,
    pub scraped_at: DateTime<Utc>,
    pub outcome: PageOutcome,
}

/// A network response observed while the page was loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptedResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl InterceptedResponse {
    pub fn json(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

/// An element of the rendered document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomElement {
    /// Trimmed text content, descendants included.
    pub text: String,
    pub class: String,
    pub id: String,
    /// Position of the parent element in `DomSnapshot::elements`.
    pub parent: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomTable {
    pub text: String,
    /// Trimmed `td`/`th` texts per `tr`.
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomSnapshot {
    pub elements: Vec<DomElement>,
    pub tables: Vec<DomTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexedDeparture {
    #[serde(flatten)]
    pub departure: DepartureCandidate,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionRecord {
    pub direction: String,
    pub route: String,
    pub origin: String,
    pub destination: String,
    pub url: String,
    pub scraped_at: DateTime<Utc>,
    pub departures: Vec<IndexedDeparture>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticRecord {
    pub url: String,
    pub scraped_at: DateTime<Utc>,
    pub html: String,
    pub note: String,
}

/// One row of the output dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DatasetRecord {
    Departures(DirectionRecord),
    Diagnostic(DiagnosticRecord),
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub records: Vec<DatasetRecord>,
    pub csv_output: String,
}
