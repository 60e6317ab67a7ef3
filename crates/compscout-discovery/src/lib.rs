//! Competitor and data-source discovery.
//!
//! Fans topic queries out across pluggable search engines, deduplicates the
//! hits, then classifies and scores each link so only useful data sources
//! survive (`quality_score >= 0.6`).

pub mod classifier;
pub mod competitors;
pub mod engines;
pub mod error;
pub mod manager;
pub mod pipeline;
pub mod queries;
pub mod scorer;
pub mod types;

pub use classifier::{classify_link, LinkCategory, LinkType};
pub use competitors::{brand_from_url, extract_competitor_names};
pub use engines::{engines_from_config, BingEngine, GoogleEngine, SearchEngine, SerperEngine};
pub use error::DiscoveryError;
pub use manager::{deduplicate_results, SearchManager, SEARCH_WORKERS};
pub use pipeline::{run_discovery, DiscoveryReport, DiscoveryRequest, DEFAULT_PER_TYPE};
pub use queries::QueryGenerator;
pub use scorer::{process_search_results, score_link, QUALITY_THRESHOLD};
pub use types::{DataSourceInfo, SearchDepth, SearchResult, SourceCategory};
