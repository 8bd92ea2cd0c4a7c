//! Direction inference shared by the API, DOM and table strategies.

use crate::domain::model::Direction;
use serde_json::{Map, Value};

/// Returns the first direction, in `Direction::ALL` order, for which `has_signal` holds.
pub fn classify_by<F>(mut has_signal: F) -> Option<Direction>
where
    F: FnMut(Direction) -> bool,
{
    Direction::ALL.into_iter().find(|direction| has_signal(*direction))
}

/// Classifies a departure by its origin and route text, case-insensitively.
pub fn classify(origin: &str, route: &str) -> Option<Direction> {
    let origin = origin.to_lowercase();
    let route = route.to_lowercase();
    classify_by(|direction| {
        origin.contains(direction.signal()) || route.contains(direction.signal())
    })
}

/// First non-empty string value among `keys`, checked in order.
pub fn lookup_str<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_str))
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_by_origin() {
        assert_eq!(
            classify("Kalundborg", ""),
            Some(Direction::KalundborgToBallen)
        );
        assert_eq!(classify("BALLEN", ""), Some(Direction::BallenToKalundborg));
    }

    #[test]
    fn test_classify_by_route_when_origin_missing() {
        assert_eq!(
            classify("", "ballen - kalundborg"),
            Some(Direction::KalundborgToBallen),
            "kalundborg is checked first"
        );
        assert_eq!(
            classify("", "Ballen - Samsø"),
            Some(Direction::BallenToKalundborg)
        );
    }

    #[test]
    fn test_classify_is_total() {
        let inputs = [
            ("Kalundborg", "Kalundborg - Ballen"),
            ("Ballen", "Ballen - Kalundborg"),
            ("Aarhus", "Aarhus - Odden"),
            ("", ""),
        ];
        let results: Vec<Option<Direction>> =
            inputs.iter().map(|(o, r)| classify(o, r)).collect();
        assert_eq!(
            results,
            vec![
                Some(Direction::KalundborgToBallen),
                Some(Direction::BallenToKalundborg),
                None,
                None
            ]
        );
    }

    #[test]
    fn test_lookup_str_skips_empty_and_non_string() {
        let value = json!({"origin": "", "from": 42, "departurePort": "Ballen"});
        let object = value.as_object().unwrap();
        assert_eq!(
            lookup_str(object, &["origin", "from", "departurePort"]),
            Some("Ballen")
        );
        assert_eq!(lookup_str(object, &["to", "arrivalPort"]), None);
    }
}
