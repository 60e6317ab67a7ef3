//! URL → platform profile mapping.
//!
//! Hosts are matched by case-insensitive substring against an ordered table;
//! the first match wins and unknown hosts get the generic website profile.

use std::fmt;

use reqwest::Url;

use crate::error::CrawlerError;

const DESKTOP_UA_SHORT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const DESKTOP_UA_CHROME: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const WECHAT_UA: &str = "Mozilla/5.0 (Linux; Android 10) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.120 Mobile Safari/537.36 MicroMessenger/8.0.0";
const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 14_0 like Mac OS X)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformKind {
    WeChat,
    Xiaohongshu,
    Zhihu,
    Douyin,
    Taobao,
    Jd,
    Bilibili,
    Weibo,
    Website,
}

impl PlatformKind {
    /// Human-readable platform name, as recorded in saved metadata.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::WeChat => "微信公众号",
            Self::Xiaohongshu => "小红书",
            Self::Zhihu => "知乎",
            Self::Douyin => "抖音",
            Self::Taobao => "淘宝/天猫",
            Self::Jd => "京东",
            Self::Bilibili => "哔哩哔哩",
            Self::Weibo => "微博",
            Self::Website => "普通网站",
        }
    }

    /// Referer required by the platform's image CDN, if any.
    #[must_use]
    pub fn image_referer(self) -> Option<&'static str> {
        match self {
            Self::Xiaohongshu => Some("https://www.xiaohongshu.com/"),
            Self::Zhihu => Some("https://www.zhihu.com/"),
            _ => None,
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Fetch-relevant metadata for a content platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformInfo {
    pub kind: PlatformKind,
    pub needs_login: bool,
    /// 1 = direct fetch works, 3 = needs the heaviest fallback.
    pub priority: u8,
    pub user_agent: &'static str,
}

impl PlatformInfo {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind.display_name()
    }
}

const fn profile(
    kind: PlatformKind,
    needs_login: bool,
    priority: u8,
    user_agent: &'static str,
) -> PlatformInfo {
    PlatformInfo {
        kind,
        needs_login,
        priority,
        user_agent,
    }
}

const DEFAULT_PROFILE: PlatformInfo = profile(PlatformKind::Website, false, 1, DESKTOP_UA_CHROME);

const PLATFORMS: &[(&[&str], PlatformInfo)] = &[
    (
        &["mp.weixin.qq.com"],
        profile(PlatformKind::WeChat, false, 1, WECHAT_UA),
    ),
    (
        &["xiaohongshu.com", "xhslink.com"],
        profile(PlatformKind::Xiaohongshu, true, 3, DESKTOP_UA_SHORT),
    ),
    (
        &["zhihu.com"],
        profile(PlatformKind::Zhihu, false, 1, DESKTOP_UA_SHORT),
    ),
    (
        &["douyin.com"],
        profile(PlatformKind::Douyin, true, 3, IPHONE_UA),
    ),
    (
        &["taobao.com", "tmall.com"],
        profile(PlatformKind::Taobao, false, 2, DESKTOP_UA_SHORT),
    ),
    (&["jd.com"], profile(PlatformKind::Jd, false, 2, DESKTOP_UA_SHORT)),
    (
        &["bilibili.com"],
        profile(PlatformKind::Bilibili, false, 1, DESKTOP_UA_SHORT),
    ),
    (
        &["weibo.com"],
        profile(PlatformKind::Weibo, false, 2, DESKTOP_UA_SHORT),
    ),
];

/// Resolves the platform profile for `url`.
///
/// # Errors
///
/// Returns [`CrawlerError::InvalidUrl`] only when `url` cannot be parsed.
pub fn identify_platform(url: &str) -> Result<PlatformInfo, CrawlerError> {
    let parsed = Url::parse(url).map_err(|e| CrawlerError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();

    let info = PLATFORMS
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| host.contains(needle)))
        .map_or(DEFAULT_PROFILE, |(_, info)| *info);
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_host_gets_default_profile() {
        let info = identify_platform("https://example.org/some/page").unwrap();
        assert_eq!(info.kind, PlatformKind::Website);
        assert_eq!(info.name(), "普通网站");
        assert!(!info.needs_login);
        assert_eq!(info.priority, 1);
        assert!(info.user_agent.contains("Chrome/120"));
    }

    #[test]
    fn known_hosts_match_by_substring() {
        let wechat = identify_platform("https://mp.weixin.qq.com/s/abc").unwrap();
        assert_eq!(wechat.kind, PlatformKind::WeChat);
        assert!(wechat.user_agent.contains("MicroMessenger"));

        let xhs = identify_platform("http://xhslink.com/a/b").unwrap();
        assert_eq!(xhs.kind, PlatformKind::Xiaohongshu);
        assert!(xhs.needs_login);
        assert_eq!(xhs.priority, 3);

        let tmall = identify_platform("https://detail.tmall.com/item.htm?id=1").unwrap();
        assert_eq!(tmall.kind, PlatformKind::Taobao);
        assert_eq!(tmall.priority, 2);

        let douyin = identify_platform("https://www.douyin.com/video/1").unwrap();
        assert!(douyin.user_agent.contains("iPhone"));
    }

    #[test]
    fn host_match_ignores_case() {
        let info = identify_platform("https://WWW.ZHIHU.COM/question/1").unwrap();
        assert_eq!(info.kind, PlatformKind::Zhihu);
    }

    #[test]
    fn unparseable_url_is_an_error() {
        let err = identify_platform("not a url").unwrap_err();
        assert!(matches!(err, CrawlerError::InvalidUrl { .. }));
    }

    #[test]
    fn referer_only_for_hotlink_protected_platforms() {
        assert_eq!(
            PlatformKind::Zhihu.image_referer(),
            Some("https://www.zhihu.com/")
        );
        assert_eq!(PlatformKind::Website.image_referer(), None);
        assert_eq!(PlatformKind::Weibo.to_string(), "微博");
    }
}
