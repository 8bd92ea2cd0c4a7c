//! Scans every element's text for departure times.
//!
//! Every element is visited, so an ancestor repeats the times of its
//! descendants. Duplicates are left for the merge step.

use crate::core::classifier::classify_by;
use crate::core::tokens::{prefix_chars, time_tokens};
use crate::domain::model::{Buckets, DepartureCandidate, DomSnapshot};

const CONTEXT_CHARS: usize = 100;

pub fn scan(snapshot: &DomSnapshot) -> Buckets {
    let lowered: Vec<String> = snapshot
        .elements
        .iter()
        .map(|el| el.text.to_lowercase())
        .collect();

    let mut buckets = Buckets::default();

    for (index, element) in snapshot.elements.iter().enumerate() {
        let times = time_tokens(&element.text);
        if times.is_empty() {
            continue;
        }

        let text = &lowered[index];
        let parent_text = element
            .parent
            .and_then(|parent| lowered.get(parent))
            .map(String::as_str)
            .unwrap_or("");
        let class = element.class.to_lowercase();
        let id = element.id.to_lowercase();

        let direction = classify_by(|direction| {
            let port = direction.signal();
            (text.contains(port) && parent_text.contains(port))
                || class.contains(port)
                || id.contains(port)
        });
        let Some(direction) = direction else {
            continue;
        };

        let context = prefix_chars(&element.text, CONTEXT_CHARS);
        for time in times {
            buckets.push(
                direction,
                DepartureCandidate::new(direction, time).with_context(context.clone()),
            );
        }
    }

    buckets
}
