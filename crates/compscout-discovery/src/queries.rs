//! Query generation for competitor and data-source discovery.

use std::collections::BTreeMap;

use crate::types::SourceCategory;

/// Derives search queries from a topic or a competitor name.
///
/// Queries mix Chinese and English phrasing so both local and international
/// results surface.
#[derive(Debug, Default, Clone, Copy)]
pub struct QueryGenerator;

impl QueryGenerator {
    /// Eight fixed-intent queries for finding competitors of `topic`:
    /// competitors, comparison, alternatives, rankings, and recommendations.
    #[must_use]
    pub fn competitor_queries(topic: &str) -> Vec<String> {
        vec![
            format!("{topic} 竞品"),
            format!("{topic} 对比"),
            format!("{topic} 替代品"),
            format!("best {topic} alternatives"),
            format!("{topic} vs"),
            format!("{topic} 排行榜"),
            format!("{topic} 推荐"),
            format!("top {topic} tools"),
        ]
    }

    /// Per-category queries for locating a competitor's data sources.
    #[must_use]
    pub fn data_source_queries(competitor: &str) -> BTreeMap<SourceCategory, Vec<String>> {
        SourceCategory::ALL
            .into_iter()
            .map(|category| (category, Self::queries_for(category, competitor)))
            .collect()
    }

    fn queries_for(category: SourceCategory, name: &str) -> Vec<String> {
        match category {
            SourceCategory::OfficialSite => {
                vec![format!("{name} 官网"), format!("{name} official website")]
            }
            SourceCategory::Features => vec![
                format!("{name} features"),
                format!("{name} 功能介绍"),
                format!("{name} 产品"),
            ],
            SourceCategory::Pricing => vec![
                format!("{name} pricing"),
                format!("{name} 价格"),
                format!("{name} 套餐"),
            ],
            SourceCategory::Reviews => vec![
                format!("{name} 评价 site:xiaohongshu.com"),
                format!("{name} 怎么样 site:zhihu.com"),
                format!("{name} reviews"),
            ],
            SourceCategory::Ecommerce => vec![
                format!("{name} site:taobao.com"),
                format!("{name} site:jd.com"),
            ],
            SourceCategory::Social => vec![format!("{name} 公众号"), format!("{name} 微博")],
        }
    }
}
