//! Turning a discovery report into acquisition jobs.

use std::collections::HashSet;

use compscout_discovery::{DataSourceInfo, DiscoveryReport, SourceCategory};

use crate::batch::AcquisitionJob;

/// Pages fetched per competitor when no cap is given.
pub const DEFAULT_JOBS_PER_COMPETITOR: usize = 3;

/// Picks at most `per_competitor` sources for each competitor, best first.
///
/// Sources are ranked by link priority, then by quality score; a URL found
/// under several categories is queued once, under its best-ranked category.
/// Competitors keep their report order.
#[must_use]
pub fn plan_acquisitions(report: &DiscoveryReport, per_competitor: usize) -> Vec<AcquisitionJob> {
    let mut jobs = Vec::new();

    for competitor in &report.competitors {
        let Some(by_category) = report.data_sources.get(competitor) else {
            continue;
        };

        let mut ranked: Vec<(SourceCategory, &DataSourceInfo)> = by_category
            .iter()
            .flat_map(|(category, sources)| sources.iter().map(|s| (*category, s)))
            .collect();
        ranked.sort_by(|(_, a), (_, b)| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| b.quality_score.total_cmp(&a.quality_score))
        });

        let mut seen: HashSet<&str> = HashSet::new();
        jobs.extend(
            ranked
                .into_iter()
                .filter(|&(_, source)| seen.insert(source.url.as_str()))
                .take(per_competitor)
                .map(|(category, source)| AcquisitionJob {
                    url: source.url.clone(),
                    competitor: competitor.clone(),
                    source_type: category.as_str().to_string(),
                }),
        );
    }

    jobs
}
