//! Link scoring and quality filtering.
//!
//! `final = 0.4 * relevance + 0.4 * value + 0.2 * freshness` where
//! relevance decays 0.05 per rank (floored at 0.5), value is the category
//! score over 10, and freshness is a constant 0.8 since no publication date
//! is parsed.

use crate::classifier::{classify_link, LinkCategory};
use crate::types::{DataSourceInfo, SearchResult};

/// Results scoring below this are discarded.
pub const QUALITY_THRESHOLD: f64 = 0.6;

const FRESHNESS_SCORE: f64 = 0.8;
const RELEVANCE_FLOOR: f64 = 0.5;
const RELEVANCE_DECAY_PER_RANK: f64 = 0.05;

/// Composite quality score in `[0, 1]` for a classified result.
#[must_use]
pub fn score_link(result: &SearchResult, category: &LinkCategory) -> f64 {
    let rank_offset = f64::from(result.position.saturating_sub(1));
    let relevance = (1.0 - rank_offset * RELEVANCE_DECAY_PER_RANK).max(RELEVANCE_FLOOR);
    let value = category.score / 10.0;

    0.4 * relevance + 0.4 * value + 0.2 * FRESHNESS_SCORE
}

/// Classifies and scores each result, keeping only those at or above
/// [`QUALITY_THRESHOLD`]. Input order is preserved.
#[must_use]
pub fn process_search_results(results: &[SearchResult]) -> Vec<DataSourceInfo> {
    results
        .iter()
        .filter_map(|result| {
            let category = classify_link(&result.url, &result.title, &result.description);
            let score = score_link(result, &category);
            if score < QUALITY_THRESHOLD {
                tracing::debug!(url = %result.url, score, "dropping low-quality link");
                return None;
            }
            Some(DataSourceInfo {
                url: result.url.clone(),
                title: result.title.clone(),
                description: result.description.clone(),
                link_type: category.link_type,
                priority: category.priority,
                quality_score: score,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LinkType;

    fn result(url: &str, position: u32) -> SearchResult {
        SearchResult {
            title: String::new(),
            url: url.to_string(),
            description: String::new(),
            position,
        }
    }

    fn category(score: f64) -> LinkCategory {
        LinkCategory {
            link_type: LinkType::Other,
            priority: 4,
            score,
        }
    }

    #[test]
    fn rank_ten_other_link_scores_below_threshold() {
        let score = score_link(&result("https://example.org/x", 10), &category(5.0));
        assert!((score - 0.58).abs() < 1e-9, "got {score}");
        assert!(score < QUALITY_THRESHOLD);
    }

    #[test]
    fn top_ranked_high_value_link_scores_092() {
        let score = score_link(&result("https://example.org/x", 1), &category(9.0));
        assert!((score - 0.92).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn relevance_is_floored_at_half() {
        let deep = score_link(&result("https://example.org/x", 40), &category(5.0));
        let floor = 0.4 * 0.5 + 0.4 * 0.5 + 0.2 * 0.8;
        assert!((deep - floor).abs() < 1e-9);
    }

    #[test]
    fn process_filters_low_quality_and_keeps_order() {
        let results = vec![
            result("https://www.jasper.ai/pricing", 1),
            result("https://example.org/misc", 10),
            result("https://jasper.ai/", 2),
        ];
        let sources = process_search_results(&results);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].link_type, LinkType::Pricing);
        assert_eq!(sources[0].priority, 1);
        assert_eq!(sources[1].link_type, LinkType::Home);
        assert!(sources.iter().all(|s| s.quality_score >= QUALITY_THRESHOLD));
    }
}
