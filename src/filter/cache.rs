// src/filter/cache.rs
use std::sync::Arc;

use super::engine;
use super::state::FilterState;
use crate::directory::JobDirectorySnapshot;
use crate::types::JobRecord;

/// Remembers the last result and recomputes only when the snapshot or filters change
#[derive(Debug)]
pub struct FilterCache {
    key: Option<(u64, FilterState)>,
    result: Arc<[JobRecord]>,
    recomputations: usize,
}

impl Default for FilterCache {
    fn default() -> Self {
        Self {
            key: None,
            result: Arc::from(Vec::new()),
            recomputations: 0,
        }
    }
}

impl FilterCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&mut self, snapshot: &JobDirectorySnapshot, state: &FilterState) -> Arc<[JobRecord]> {
        let fresh = self
            .key
            .as_ref()
            .is_some_and(|(generation, cached)| *generation == snapshot.generation && cached == state);

        if !fresh {
            self.result = engine::filter(snapshot, state).into();
            self.key = Some((snapshot.generation, state.clone()));
            self.recomputations += 1;
        }

        Arc::clone(&self.result)
    }

    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }
}
