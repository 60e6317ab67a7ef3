//! Heuristic competitor-name extraction from competitor search results.

use std::collections::HashSet;

use reqwest::Url;

use crate::types::SearchResult;

/// Derives a brand name from a URL's host: `https://www.canva.com/x` → `Canva`.
///
/// Returns `None` when the URL has no host.
#[must_use]
pub fn brand_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let label = host.split('.').next().filter(|l| !l.is_empty())?;

    let mut chars = label.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

/// Picks up to `limit` unique competitor names, in result order.
///
/// The brand derived from each URL is preferred; when it is missing or
/// already taken, the result title is used instead.
#[must_use]
pub fn extract_competitor_names(results: &[SearchResult], limit: usize) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::new();

    for result in results {
        if names.len() >= limit {
            break;
        }
        let candidate = brand_from_url(&result.url)
            .filter(|brand| !seen.contains(brand))
            .or_else(|| Some(result.title.trim().to_string()).filter(|t| !t.is_empty()));

        if let Some(name) = candidate {
            if seen.insert(name.clone()) {
                names.push(name);
            }
        }
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(url: &str, title: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            url: url.to_string(),
            description: String::new(),
            position: 1,
        }
    }

    #[test]
    fn brand_from_url_strips_www_and_capitalises() {
        assert_eq!(brand_from_url("https://www.canva.com/design"), Some("Canva".into()));
        assert_eq!(brand_from_url("https://notion.so"), Some("Notion".into()));
        assert_eq!(brand_from_url("not a url"), None);
    }

    #[test]
    fn extract_prefers_brand_then_title_and_respects_limit() {
        let results = vec![
            hit("https://www.jasper.ai/", "Jasper AI"),
            hit("https://jasper.ai/pricing", "Jasper pricing"),
            hit("https://www.copy.ai/", "Copy.ai"),
            hit("https://writesonic.com/", "Writesonic"),
        ];
        let names = extract_competitor_names(&results, 3);
        assert_eq!(names, ["Jasper", "Jasper pricing", "Copy"]);
    }

    #[test]
    fn extract_skips_results_without_brand_or_title() {
        let results = vec![hit("mailto:x", "  "), hit("https://grammarly.com", "")];
        assert_eq!(extract_competitor_names(&results, 5), ["Grammarly"]);
    }
}
