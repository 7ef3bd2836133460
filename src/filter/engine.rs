// src/filter/engine.rs
use super::state::FilterState;
use crate::directory::JobDirectorySnapshot;
use crate::types::JobRecord;

/// Jobs of `snapshot` that satisfy every active filter, in snapshot order
pub fn filter(snapshot: &JobDirectorySnapshot, state: &FilterState) -> Vec<JobRecord> {
    filter_records(&snapshot.records, state)
}

pub fn filter_records(records: &[JobRecord], state: &FilterState) -> Vec<JobRecord> {
    let needle = state.query.to_lowercase();

    records
        .iter()
        .filter(|record| matches_lowered(record, state, &needle))
        .cloned()
        .collect()
}

/// Text match on title, employer and description, ANDed with exact code matches
pub fn matches(record: &JobRecord, state: &FilterState) -> bool {
    matches_lowered(record, state, &state.query.to_lowercase())
}

fn matches_lowered(record: &JobRecord, state: &FilterState, needle: &str) -> bool {
    text_match(record, needle)
        && field_match(&state.location, &record.employer_location)
        && field_match(&state.category, &record.category)
        && field_match(&state.employment_type, &record.employment_type)
        && field_match(&state.experience_level, &record.experience_level)
}

fn text_match(record: &JobRecord, needle: &str) -> bool {
    needle.is_empty()
        || record.title.to_lowercase().contains(needle)
        || record.employer_name.to_lowercase().contains(needle)
        || record.description.to_lowercase().contains(needle)
}

fn field_match(wanted: &Option<String>, actual: &str) -> bool {
    wanted.as_deref().map_or(true, |code| code == actual)
}
