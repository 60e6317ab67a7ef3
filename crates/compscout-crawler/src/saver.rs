//! Durable storage of fetched pages.
//!
//! Each page lands in `{root}/{YYYYMMDD}_{competitor}_{title}/content.md`
//! with a YAML front-matter block. Embedded images are downloaded next to it
//! as `img_NN.ext` and references are rewritten to the local names.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use reqwest::{header, Client, StatusCode, Url};
use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::error::CrawlerError;
use crate::platform::PlatformKind;
use crate::strategies::{build_client, CrawlResult};

pub const CONTENT_FILE: &str = "content.md";
/// Maximum length, in characters, of each sanitised name component.
pub const MAX_NAME_CHARS: usize = 50;

const IMAGE_TIMEOUT_SECS: u64 = 30;
const IMAGE_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const DEFAULT_IMAGE_EXT: &str = ".jpg";

static ILLEGAL_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static MARKDOWN_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").expect("valid regex"));

static BARE_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>"()]+?\.(?:jpg|jpeg|png|gif|webp)(?:\?[^\s<>"()]*)?"#)
        .expect("valid regex")
});

#[derive(Debug, Clone, Serialize)]
pub struct SaveResult {
    pub content_path: PathBuf,
    /// Local image file names, relative to the content directory.
    pub image_files: Vec<String>,
    pub title: String,
    pub url: String,
}

#[derive(Serialize)]
struct FrontMatter<'a> {
    title: &'a str,
    source: &'a str,
    platform: &'a str,
    url: &'a str,
    crawl_method: &'a str,
    crawl_time: String,
}

pub struct ContentSaver {
    storage_root: PathBuf,
    client: Client,
    clock: Arc<dyn Clock>,
}

impl ContentSaver {
    /// # Errors
    ///
    /// Returns [`CrawlerError::Http`] if the image HTTP client cannot be built.
    pub fn new(storage_root: impl Into<PathBuf>) -> Result<Self, CrawlerError> {
        Ok(Self {
            storage_root: storage_root.into(),
            client: build_client(IMAGE_TIMEOUT_SECS)?,
            clock: Arc::new(SystemClock),
        })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    /// Writes `result` under the storage root, downloading its images.
    ///
    /// Image downloads are best-effort: a failed image keeps its original
    /// URL in the document and never fails the save.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlerError::Io`] if the directory or document cannot be
    /// written.
    pub async fn save(
        &self,
        result: &CrawlResult,
        competitor: &str,
    ) -> Result<SaveResult, CrawlerError> {
        let now = self.clock.now();
        let date = now.format("%Y%m%d").to_string();
        let dir = self
            .storage_root
            .join(directory_name(&date, competitor, &result.title));

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| CrawlerError::io(format!("creating {}", dir.display()), e))?;

        let (markdown, image_files) = self
            .localise_images(&result.markdown, &dir, result.platform)
            .await;

        let front_matter = serde_yaml::to_string(&FrontMatter {
            title: &result.title,
            source: competitor,
            platform: result.platform.display_name(),
            url: &result.url,
            crawl_method: result.method,
            crawl_time: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
        .map_err(|e| CrawlerError::Encode {
            context: "front matter".to_string(),
            reason: e.to_string(),
        })?;
        let document = format!("---\n{front_matter}---\n\n{markdown}");

        let content_path = dir.join(CONTENT_FILE);
        tokio::fs::write(&content_path, document)
            .await
            .map_err(|e| CrawlerError::io(format!("writing {}", content_path.display()), e))?;

        tracing::debug!(
            path = %content_path.display(),
            images = image_files.len(),
            "content saved"
        );

        Ok(SaveResult {
            content_path,
            image_files,
            title: result.title.clone(),
            url: result.url.clone(),
        })
    }

    async fn localise_images(
        &self,
        markdown: &str,
        dir: &Path,
        platform: PlatformKind,
    ) -> (String, Vec<String>) {
        let mut links: Vec<(String, String)> = Vec::new();
        let mut saved = Vec::new();

        for image_url in image_urls(markdown) {
            let index = saved.len() + 1;
            match self.download_image(&image_url, dir, index, platform).await {
                Ok(file_name) => {
                    saved.push(file_name.clone());
                    links.push((image_url, file_name));
                }
                Err(e) => {
                    tracing::warn!(url = %image_url, error = %e, "image download failed, keeping remote link");
                    // Identity mapping: a failed URL stays intact even when a
                    // shorter downloaded URL prefixes it.
                    links.push((image_url.clone(), image_url));
                }
            }
        }

        (rewrite_links(markdown, &links), saved)
    }

    async fn download_image(
        &self,
        image_url: &str,
        dir: &Path,
        index: usize,
        platform: PlatformKind,
    ) -> Result<String, CrawlerError> {
        let parsed = Url::parse(image_url).map_err(|e| CrawlerError::InvalidUrl {
            url: image_url.to_string(),
            reason: e.to_string(),
        })?;
        let file_name = format!("img_{index:02}{}", image_extension(&parsed));

        let mut request = self
            .client
            .get(parsed)
            .header(header::USER_AGENT, IMAGE_USER_AGENT);
        if let Some(referer) = platform.image_referer() {
            request = request.header(header::REFERER, referer);
        }

        let response = request.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(CrawlerError::UnexpectedStatus {
                strategy: "image download",
                status: status.as_u16(),
                body: String::new(),
            });
        }
        let bytes = response.bytes().await?;

        let path = dir.join(&file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| CrawlerError::io(format!("writing {}", path.display()), e))?;
        Ok(file_name)
    }
}

/// Makes `name` safe as a path component: trims, replaces reserved
/// characters and whitespace runs with `_`, and caps the length.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let cleaned = ILLEGAL_CHARS_RE.replace_all(name.trim(), "_");
    let cleaned = WHITESPACE_RE.replace_all(&cleaned, "_");
    cleaned.chars().take(MAX_NAME_CHARS).collect()
}

/// `{date}_{competitor}_{title}`, with `untitled` for an empty title.
#[must_use]
pub fn directory_name(date: &str, competitor: &str, title: &str) -> String {
    let mut title = sanitize_filename(title);
    if title.is_empty() {
        title = "untitled".to_string();
    }
    format!("{date}_{}_{title}", sanitize_filename(competitor))
}

/// Image URLs referenced by `markdown`, markdown-syntax images first, each
/// URL once.
pub(crate) fn image_urls(markdown: &str) -> Vec<String> {
    let embedded = MARKDOWN_IMAGE_RE
        .captures_iter(markdown)
        .filter_map(|caps| caps.get(2))
        .filter_map(|m| m.as_str().split_whitespace().next());
    let bare = BARE_IMAGE_RE.find_iter(markdown).map(|m| m.as_str());

    let mut urls: Vec<String> = Vec::new();
    for url in embedded.chain(bare) {
        if !urls.iter().any(|seen| seen == url) {
            urls.push(url.to_string());
        }
    }
    urls
}

/// Replaces every occurrence of each `(from, to)` pair in a single
/// left-to-right pass. At each position the longest matching `from` wins,
/// so one URL that is a prefix of another never claims the longer one.
pub(crate) fn rewrite_links(markdown: &str, links: &[(String, String)]) -> String {
    let mut ordered: Vec<&(String, String)> = links
        .iter()
        .filter(|(from, _)| !from.is_empty())
        .collect();
    ordered.sort_by_key(|(from, _)| std::cmp::Reverse(from.len()));

    let mut out = String::with_capacity(markdown.len());
    let mut rest = markdown;
    while let Some(ch) = rest.chars().next() {
        if let Some((from, to)) = ordered
            .iter()
            .find(|(from, _)| rest.starts_with(from.as_str()))
        {
            out.push_str(to);
            rest = &rest[from.len()..];
        } else {
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    out
}

fn image_extension(url: &Url) -> String {
    Path::new(url.path())
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or_else(|| DEFAULT_IMAGE_EXT.to_string(), |ext| format!(".{ext}"))
}

#[cfg(test)]
#[path = "saver_test.rs"]
mod tests;
