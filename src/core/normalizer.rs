//! Turns timetable JSON captured from the network into direction buckets.

use crate::core::classifier::{classify, lookup_str};
use crate::domain::model::{Buckets, DepartureCandidate, Direction, InterceptedResponse};
use crate::utils::error::{Result, ScrapeError};
use serde_json::{Map, Value};

const COLLECTION_KEYS: &[&str] = &["departures", "data", "routes"];
const ORIGIN_KEYS: &[&str] = &["origin", "from", "departurePort"];
const DESTINATION_KEYS: &[&str] = &["destination", "to", "arrivalPort"];
const ROUTE_KEYS: &[&str] = &["route"];
const DEPARTURE_KEYS: &[&str] = &["departureTime", "time", "departure"];
const ARRIVAL_KEYS: &[&str] = &["arrivalTime", "arrival"];

/// Keys that map onto `DepartureCandidate` fields. Their string values are
/// not copied into `extra`; any other value is kept there verbatim.
const CANONICAL_KEYS: &[&str] = &["departureTime", "arrivalTime", "origin", "destination", "route"];

/// The departure list inside `payload`: a bare array, or the first of
/// `departures`, `data`, `routes` holding an array.
pub fn departure_elements(payload: &Value) -> &[Value] {
    match payload {
        Value::Array(items) => items.as_slice(),
        Value::Object(object) => COLLECTION_KEYS
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

/// Normalizes one API element. `None` when no port name can be found.
pub fn normalize_element(object: &Map<String, Value>) -> Option<(Direction, DepartureCandidate)> {
    let origin = lookup_str(object, ORIGIN_KEYS).unwrap_or("");
    let destination = lookup_str(object, DESTINATION_KEYS).unwrap_or("");
    let route = lookup_str(object, ROUTE_KEYS)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} - {}", origin, destination));

    let direction = classify(origin, &route)?;

    let mut candidate = DepartureCandidate::new(
        direction,
        lookup_str(object, DEPARTURE_KEYS).unwrap_or(""),
    );
    candidate.arrival_time = lookup_str(object, ARRIVAL_KEYS).map(str::to_string);
    candidate.route = route;
    if !origin.is_empty() {
        candidate.origin = origin.to_string();
    }
    if !destination.is_empty() {
        candidate.destination = destination.to_string();
    }
    candidate.extra = object
        .iter()
        .filter(|(key, value)| !(value.is_string() && CANONICAL_KEYS.contains(&key.as_str())))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Some((direction, candidate))
}

/// Normalizes a decoded payload. Unrecognized shapes yield empty buckets.
pub fn normalize(payload: &Value) -> Buckets {
    let mut buckets = Buckets::default();
    for element in departure_elements(payload) {
        let Some(object) = element.as_object() else {
            continue;
        };
        if let Some((direction, candidate)) = normalize_element(object) {
            buckets.push(direction, candidate);
        }
    }
    buckets
}

/// Decodes and normalizes a captured response body.
pub fn normalize_response(response: &InterceptedResponse) -> Result<Buckets> {
    let payload = response.json().map_err(|e| ScrapeError::ParseFailure {
        url: response.url.clone(),
        message: e.to_string(),
    })?;
    Ok(normalize(&payload))
}
