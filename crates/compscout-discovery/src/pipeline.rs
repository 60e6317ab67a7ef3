//! End-to-end discovery: topic → competitors → scored data sources.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::competitors::extract_competitor_names;
use crate::error::DiscoveryError;
use crate::manager::SearchManager;
use crate::scorer::process_search_results;
use crate::types::{DataSourceInfo, SearchDepth, SourceCategory};

/// Results requested per data-source query.
pub const DEFAULT_PER_TYPE: usize = 5;

#[derive(Debug, Clone)]
pub struct DiscoveryRequest {
    pub topic: String,
    pub competitor_count: usize,
    pub depth: SearchDepth,
    /// Empty means every category.
    pub source_types: Vec<SourceCategory>,
    pub per_type: usize,
}

impl DiscoveryRequest {
    #[must_use]
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            competitor_count: 5,
            depth: SearchDepth::default(),
            source_types: Vec::new(),
            per_type: DEFAULT_PER_TYPE,
        }
    }
}

/// Scored data sources keyed by competitor, then by category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub topic: String,
    pub competitors: Vec<String>,
    pub data_sources: BTreeMap<String, BTreeMap<SourceCategory, Vec<DataSourceInfo>>>,
}

impl DiscoveryReport {
    #[must_use]
    pub fn total_sources(&self) -> usize {
        self.data_sources
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }
}

/// Runs the full discovery flow for one topic.
///
/// Competitors that yield no surviving sources are kept in `competitors`
/// but contribute no entries to `data_sources`.
///
/// # Errors
///
/// Returns [`DiscoveryError::NoResults`] when the competitor search finds
/// nothing at all.
pub async fn run_discovery(
    manager: &SearchManager,
    request: &DiscoveryRequest,
) -> Result<DiscoveryReport, DiscoveryError> {
    let hits = manager
        .search_competitors(&request.topic, request.depth.max_results())
        .await?;

    let competitors = extract_competitor_names(&hits, request.competitor_count);
    tracing::info!(
        topic = %request.topic,
        hits = hits.len(),
        competitors = competitors.len(),
        "competitor search finished"
    );

    let mut data_sources = BTreeMap::new();
    for competitor in &competitors {
        let by_category = manager
            .search_data_sources(competitor, &request.source_types, request.per_type)
            .await;

        let scored: BTreeMap<SourceCategory, Vec<DataSourceInfo>> = by_category
            .into_iter()
            .map(|(category, results)| (category, process_search_results(&results)))
            .filter(|(_, sources)| !sources.is_empty())
            .collect();

        if scored.is_empty() {
            tracing::warn!(competitor = %competitor, "no usable data sources found");
            continue;
        }
        data_sources.insert(competitor.clone(), scored);
    }

    let report = DiscoveryReport {
        topic: request.topic.clone(),
        competitors,
        data_sources,
    };
    tracing::info!(
        topic = %report.topic,
        sources = report.total_sources(),
        "discovery finished"
    );
    Ok(report)
}
