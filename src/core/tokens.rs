use regex::Regex;
use std::sync::LazyLock;

static TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{1,2}:[0-9]{2}").expect("time pattern is a valid regex"));

/// All non-overlapping `H:MM` / `HH:MM` tokens in `text`, left to right.
pub fn time_tokens(text: &str) -> Vec<&str> {
    TIME_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}

pub fn first_time_token(text: &str) -> Option<&str> {
    TIME_PATTERN.find(text).map(|m| m.as_str())
}

/// The first `max_chars` characters of `text`.
pub fn prefix_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_tokens() {
        assert_eq!(
            time_tokens("Afgang 7:30 og 19:45, ankomst 123:456"),
            vec!["7:30", "19:45", "23:45"]
        );
        assert!(time_tokens("Ingen afgange i dag").is_empty());
    }

    #[test]
    fn test_first_time_token() {
        assert_eq!(first_time_token("Kalundborg 06:15 Ballen 08:00"), Some("06:15"));
        assert_eq!(first_time_token("Kalundborg"), None);
    }

    #[test]
    fn test_prefix_chars_counts_characters() {
        assert_eq!(prefix_chars("Ærø", 2), "Ær");
        assert_eq!(prefix_chars("ok", 100), "ok");
    }
}
