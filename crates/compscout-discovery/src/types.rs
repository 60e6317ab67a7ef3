//! Domain types shared by the search engines, manager, and scorer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::classifier::LinkType;
use crate::error::DiscoveryError;

/// One ranked hit returned by a search engine for a single query.
///
/// Identity is the URL; `position` is the 1-based rank within its query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub description: String,
    pub position: u32,
}

/// The data-source categories searched for each competitor.
///
/// Declaration order is the iteration order of every category map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    OfficialSite,
    Features,
    Pricing,
    Reviews,
    Ecommerce,
    Social,
}

impl SourceCategory {
    pub const ALL: [SourceCategory; 6] = [
        SourceCategory::OfficialSite,
        SourceCategory::Features,
        SourceCategory::Pricing,
        SourceCategory::Reviews,
        SourceCategory::Ecommerce,
        SourceCategory::Social,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceCategory::OfficialSite => "official_site",
            SourceCategory::Features => "features",
            SourceCategory::Pricing => "pricing",
            SourceCategory::Reviews => "reviews",
            SourceCategory::Ecommerce => "ecommerce",
            SourceCategory::Social => "social",
        }
    }
}

impl fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceCategory {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "official_site" | "official" | "官网" => Ok(SourceCategory::OfficialSite),
            "features" | "产品功能" => Ok(SourceCategory::Features),
            "pricing" | "定价" => Ok(SourceCategory::Pricing),
            "reviews" | "用户评价" => Ok(SourceCategory::Reviews),
            "ecommerce" | "电商" => Ok(SourceCategory::Ecommerce),
            "social" | "社交媒体" => Ok(SourceCategory::Social),
            _ => Err(DiscoveryError::UnknownVariant {
                kind: "source category",
                value: s.to_string(),
            }),
        }
    }
}

/// How many results to request per competitor query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchDepth {
    Quick,
    #[default]
    Standard,
    Deep,
}

impl SearchDepth {
    #[must_use]
    pub fn max_results(self) -> usize {
        match self {
            SearchDepth::Quick => 5,
            SearchDepth::Standard => 10,
            SearchDepth::Deep => 20,
        }
    }
}

impl fmt::Display for SearchDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SearchDepth::Quick => "quick",
            SearchDepth::Standard => "standard",
            SearchDepth::Deep => "deep",
        })
    }
}

impl FromStr for SearchDepth {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" => Ok(SearchDepth::Quick),
            "standard" | "" => Ok(SearchDepth::Standard),
            "deep" => Ok(SearchDepth::Deep),
            _ => Err(DiscoveryError::UnknownVariant {
                kind: "search depth",
                value: s.to_string(),
            }),
        }
    }
}

/// A classified, scored link that passed the quality threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceInfo {
    pub url: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub priority: u8,
    pub quality_score: f64,
}
