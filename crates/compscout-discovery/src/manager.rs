//! Concurrent query fan-out across the configured search engines.
//!
//! Every query runs on its own task; a shared semaphore caps how many are
//! in flight at once. For each query the engines are tried in configured
//! order and the first one that answers supplies that query's results.
//! Results are merged across queries, never across engines for one query.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio::task::JoinSet;

use crate::engines::SearchEngine;
use crate::error::DiscoveryError;
use crate::queries::QueryGenerator;
use crate::types::{SearchResult, SourceCategory};

/// Maximum number of queries in flight at once.
pub const SEARCH_WORKERS: usize = 5;

pub struct SearchManager {
    engines: Arc<[Arc<dyn SearchEngine>]>,
    max_workers: usize,
}

impl SearchManager {
    #[must_use]
    pub fn new(engines: Vec<Arc<dyn SearchEngine>>) -> Self {
        Self {
            engines: engines.into(),
            max_workers: SEARCH_WORKERS,
        }
    }

    /// Names of the configured engines, in the order they are consulted.
    #[must_use]
    pub fn engine_names(&self) -> Vec<&'static str> {
        self.engines.iter().map(|e| e.name()).collect()
    }

    /// Searches for competitors of `topic` using the eight generated
    /// competitor queries, returning the URL-deduplicated union.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::NoResults`] only when nothing at all was
    /// found after deduplication; individual query failures are logged.
    pub async fn search_competitors(
        &self,
        topic: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, DiscoveryError> {
        let queries = QueryGenerator::competitor_queries(topic);
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<SearchResult>>();
        let mut tasks = JoinSet::new();

        for query in queries {
            let semaphore = Arc::clone(&semaphore);
            let engines = Arc::clone(&self.engines);
            let tx = tx.clone();
            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                match first_engine_results(&engines, &query, max_results, false).await {
                    Some(results) => {
                        // The receiver outlives every sender.
                        let _ = tx.send(results);
                    }
                    None => {
                        tracing::warn!(query = %query, "all search engines failed for query");
                    }
                }
            });
        }
        // Only the task clones remain; the channel closes once they finish.
        drop(tx);

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "competitor search task failed");
            }
        }

        let mut all_results = Vec::new();
        while let Some(batch) = rx.recv().await {
            all_results.extend(batch);
        }

        let unique = deduplicate_results(all_results);
        if unique.is_empty() {
            return Err(DiscoveryError::NoResults {
                topic: topic.to_string(),
            });
        }

        tracing::debug!(topic, count = unique.len(), "competitor search complete");
        Ok(unique)
    }

    /// Searches for a competitor's data sources, grouped by category.
    ///
    /// An empty `source_types` searches every category. Each category's
    /// results are deduplicated independently. Categories where no query
    /// produced results are absent from the map; this never fails.
    pub async fn search_data_sources(
        &self,
        competitor: &str,
        source_types: &[SourceCategory],
        max_per_type: usize,
    ) -> BTreeMap<SourceCategory, Vec<SearchResult>> {
        let mut queries = QueryGenerator::data_source_queries(competitor);
        if !source_types.is_empty() {
            queries.retain(|category, _| source_types.contains(category));
        }

        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let results: Arc<Mutex<BTreeMap<SourceCategory, Vec<SearchResult>>>> =
            Arc::new(Mutex::new(BTreeMap::new()));
        let mut tasks = JoinSet::new();

        for (category, query_list) in queries {
            for query in query_list {
                let semaphore = Arc::clone(&semaphore);
                let engines = Arc::clone(&self.engines);
                let results = Arc::clone(&results);
                tasks.spawn(async move {
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return;
                    };
                    if let Some(found) =
                        first_engine_results(&engines, &query, max_per_type, true).await
                    {
                        results
                            .lock()
                            .await
                            .entry(category)
                            .or_default()
                            .extend(found);
                    } else {
                        tracing::debug!(
                            category = %category,
                            query = %query,
                            "no engine returned data-source results"
                        );
                    }
                });
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "data-source search task failed");
            }
        }

        let collected = std::mem::take(&mut *results.lock().await);
        collected
            .into_iter()
            .map(|(category, found)| (category, deduplicate_results(found)))
            .collect()
    }
}

/// Tries each engine in order and returns the first usable answer.
///
/// With `require_non_empty`, an engine that answers with zero results is
/// treated like a failure and the next engine is consulted.
async fn first_engine_results(
    engines: &[Arc<dyn SearchEngine>],
    query: &str,
    count: usize,
    require_non_empty: bool,
) -> Option<Vec<SearchResult>> {
    for engine in engines {
        match engine.search(query, count).await {
            Ok(results) if require_non_empty && results.is_empty() => {
                tracing::debug!(engine = engine.name(), query, "engine returned no results");
            }
            Ok(results) => {
                tracing::debug!(
                    engine = engine.name(),
                    query,
                    count = results.len(),
                    "engine answered query"
                );
                return Some(results);
            }
            Err(e) => {
                tracing::warn!(engine = engine.name(), query, error = %e, "search engine failed");
            }
        }
    }
    None
}

/// Removes repeated URLs, keeping the first occurrence of each.
#[must_use]
pub fn deduplicate_results(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen: HashSet<String> = HashSet::new();
    results
        .into_iter()
        .filter(|r| seen.insert(r.url.clone()))
        .collect()
}
