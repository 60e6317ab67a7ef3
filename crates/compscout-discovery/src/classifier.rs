//! Link classification.
//!
//! Two stages, first match wins:
//!
//! 1. URL rules: a bare-domain regex for home pages, then the ordered
//!    [`URL_RULES`] table (path substrings before host membership).
//! 2. Keyword rules over the lowercased title and description, in the order
//!    of [`KEYWORD_RULES`].
//!
//! Anything left over is [`LinkType::Other`] with priority 4 and score 5.0.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};

static HOME_PAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[\w-]+\.(com|cn|io|ai|net)/?$").expect("valid home page regex")
});

/// Fixed taxonomy of link types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    Home,
    Features,
    Pricing,
    About,
    Docs,
    Blog,
    Reviews,
    Ecommerce,
    Social,
    Other,
}

impl LinkType {
    /// Human-readable label written into reports and job records.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            LinkType::Home => "official home page",
            LinkType::Features => "features page",
            LinkType::Pricing => "pricing page",
            LinkType::About => "about page",
            LinkType::Docs => "documentation",
            LinkType::Blog => "blog article",
            LinkType::Reviews => "user reviews",
            LinkType::Ecommerce => "e-commerce listing",
            LinkType::Social => "social media",
            LinkType::Other => "other",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The category assigned to a link: type, priority (1 = most useful), and a
/// 0–10 information-value score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkCategory {
    pub link_type: LinkType,
    pub priority: u8,
    pub score: f64,
}

impl LinkCategory {
    const fn new(link_type: LinkType, priority: u8, score: f64) -> Self {
        Self {
            link_type,
            priority,
            score,
        }
    }
}

enum UrlMatch {
    PathContains(&'static [&'static str]),
    HostContains(&'static [&'static str]),
}

struct UrlRule {
    matcher: UrlMatch,
    category: LinkCategory,
}

const URL_RULES: &[UrlRule] = &[
    UrlRule {
        matcher: UrlMatch::PathContains(&["features", "product", "functions"]),
        category: LinkCategory::new(LinkType::Features, 1, 8.5),
    },
    UrlRule {
        matcher: UrlMatch::PathContains(&["pricing", "price", "plans"]),
        category: LinkCategory::new(LinkType::Pricing, 1, 9.0),
    },
    UrlRule {
        matcher: UrlMatch::PathContains(&["about", "company"]),
        category: LinkCategory::new(LinkType::About, 2, 7.0),
    },
    UrlRule {
        matcher: UrlMatch::PathContains(&["docs", "help", "support", "guide"]),
        category: LinkCategory::new(LinkType::Docs, 3, 6.5),
    },
    UrlRule {
        matcher: UrlMatch::PathContains(&["blog", "news", "article"]),
        category: LinkCategory::new(LinkType::Blog, 3, 6.0),
    },
    UrlRule {
        matcher: UrlMatch::HostContains(&["xiaohongshu.com", "zhihu.com", "douban.com"]),
        category: LinkCategory::new(LinkType::Reviews, 2, 8.0),
    },
    UrlRule {
        matcher: UrlMatch::HostContains(&["taobao.com", "jd.com", "tmall.com"]),
        category: LinkCategory::new(LinkType::Ecommerce, 2, 7.5),
    },
    UrlRule {
        matcher: UrlMatch::HostContains(&["weixin.qq.com", "weibo.com"]),
        category: LinkCategory::new(LinkType::Social, 3, 6.5),
    },
];

/// Keyword fallback, checked top to bottom. More specific intents (official
/// site, pricing) sit above broader ones so a title mentioning both
/// "pricing" and "review" is classified as pricing.
const KEYWORD_RULES: &[(&[&str], LinkCategory)] = &[
    (
        &["官网", "official site", "official website"],
        LinkCategory::new(LinkType::Home, 1, 8.5),
    ),
    (
        &["价格", "定价", "pricing", "price"],
        LinkCategory::new(LinkType::Pricing, 1, 8.5),
    ),
    (
        &["套餐", "plans"],
        LinkCategory::new(LinkType::Pricing, 1, 8.0),
    ),
    (
        &["功能", "特性", "features"],
        LinkCategory::new(LinkType::Features, 1, 8.0),
    ),
    (
        &["评价", "评测", "review"],
        LinkCategory::new(LinkType::Reviews, 2, 7.5),
    ),
    (
        &["怎么样", "使用体验", "experience"],
        LinkCategory::new(LinkType::Reviews, 2, 7.0),
    ),
    (
        &["教程", "案例", "tutorial", "case study"],
        LinkCategory::new(LinkType::Blog, 3, 6.0),
    ),
];

const FALLBACK: LinkCategory = LinkCategory::new(LinkType::Other, 4, 5.0);

/// Classifies a search hit by its URL first, then by its title and
/// description.
#[must_use]
pub fn classify_link(link: &str, title: &str, description: &str) -> LinkCategory {
    classify_by_url(link).unwrap_or_else(|| classify_by_content(title, description))
}

fn classify_by_url(link: &str) -> Option<LinkCategory> {
    let parsed = Url::parse(link).ok()?;

    if HOME_PAGE_RE.is_match(link) {
        return Some(LinkCategory::new(LinkType::Home, 1, 9.0));
    }

    let path = parsed.path().to_lowercase();
    let host = parsed.host_str().unwrap_or_default().to_lowercase();

    URL_RULES
        .iter()
        .find(|rule| match rule.matcher {
            UrlMatch::PathContains(needles) => needles.iter().any(|n| path.contains(n)),
            UrlMatch::HostContains(needles) => needles.iter().any(|n| host.contains(n)),
        })
        .map(|rule| rule.category)
}

fn classify_by_content(title: &str, description: &str) -> LinkCategory {
    let content = format!("{title} {description}").to_lowercase();

    KEYWORD_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| content.contains(k)))
        .map_or(FALLBACK, |(_, category)| *category)
}
