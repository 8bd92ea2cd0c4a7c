use crate::domain::model::{Buckets, DepartureCandidate, Direction};
use std::collections::HashSet;

pub const DEFAULT_MAX_DEPARTURES: usize = 50;

/// Concatenates `sources` in order, keeps the first candidate per
/// `departure_time` and truncates to `max`. Source order is kept; nothing is sorted.
pub fn merge_candidates<I>(sources: I, max: usize) -> Vec<DepartureCandidate>
where
    I: IntoIterator<Item = Vec<DepartureCandidate>>,
{
    let mut seen = HashSet::new();
    sources
        .into_iter()
        .flatten()
        .filter(|candidate| seen.insert(candidate.departure_time.clone()))
        .take(max)
        .collect()
}

/// Merges whole bucket sets, earlier sets taking priority on ties.
pub fn merge(mut sources: Vec<Buckets>, max: usize) -> Buckets {
    let mut merged = Buckets::default();
    for direction in Direction::ALL {
        let lists: Vec<Vec<DepartureCandidate>> =
            sources.iter_mut().map(|b| b.take(direction)).collect();
        for candidate in merge_candidates(lists, max) {
            merged.push(direction, candidate);
        }
    }
    merged
}
