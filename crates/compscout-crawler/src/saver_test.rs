use std::collections::BTreeMap;

use chrono::{Local, TimeZone};

use super::*;
use crate::clock::FixedClock;

fn temp_root() -> PathBuf {
    std::env::temp_dir().join(format!("compscout-saver-{}", uuid::Uuid::new_v4()))
}

fn crawl_result(title: &str, markdown: &str) -> CrawlResult {
    CrawlResult {
        success: true,
        markdown: markdown.to_string(),
        title: title.to_string(),
        url: "https://example.org/post".to_string(),
        platform: PlatformKind::Website,
        method: "jina",
        metadata: BTreeMap::new(),
    }
}

#[test]
fn sanitize_replaces_reserved_chars_and_truncates() {
    let name = sanitize_filename(
        "  Some:/Weird*Title? and then a long tail of words that goes past fifty  ",
    );
    assert_eq!(name, "Some__Weird_Title__and_then_a_long_tail_of_words_t");
    assert_eq!(name.chars().count(), MAX_NAME_CHARS);
    assert!(!name.contains(['/', ':', '*', '?', ' ']));
}

#[test]
fn sanitize_truncates_on_char_boundaries() {
    let name = sanitize_filename(&"竞".repeat(80));
    assert_eq!(name.chars().count(), MAX_NAME_CHARS);
}

#[test]
fn sanitize_collapses_whitespace_runs() {
    assert_eq!(sanitize_filename("a \t\n b"), "a_b");
    assert_eq!(sanitize_filename("<tag>|x"), "_tag__x");
}

#[test]
fn directory_name_falls_back_to_untitled() {
    assert_eq!(
        directory_name("20240309", "Acme Corp", "   "),
        "20240309_Acme_Corp_untitled"
    );
    assert_eq!(
        directory_name("20240309", "Acme", "Pricing: plans"),
        "20240309_Acme_Pricing__plans"
    );
}

#[test]
fn image_urls_finds_both_forms_once() {
    let md = "intro ![logo](https://cdn.a.com/logo.png) text\n\
              ![](https://cdn.a.com/shot.webp \"caption\")\n\
              raw https://img.b.com/p/photo.jpg?w=600 and again https://cdn.a.com/logo.png\n\
              not an image https://a.com/page.html";
    assert_eq!(
        image_urls(md),
        [
            "https://cdn.a.com/logo.png",
            "https://cdn.a.com/shot.webp",
            "https://img.b.com/p/photo.jpg?w=600",
        ]
    );
}

fn link(from: &str, to: &str) -> (String, String) {
    (from.to_string(), to.to_string())
}

#[test]
fn rewrite_links_prefers_longest_url_at_each_position() {
    let md = "![s](https://cdn.a.com/a.png) ![l](https://cdn.a.com/a.png?w=1200) \
              https://cdn.a.com/a.png";
    let links = [
        link("https://cdn.a.com/a.png", "img_01.png"),
        link("https://cdn.a.com/a.png?w=1200", "img_02.png"),
    ];
    assert_eq!(
        rewrite_links(md, &links),
        "![s](img_01.png) ![l](img_02.png) img_01.png"
    );
}

#[test]
fn rewrite_links_leaves_failed_longer_url_intact() {
    let md = "![s](https://cdn.a.com/a.png) ![l](https://cdn.a.com/a.png?w=1200) 图";
    let links = [
        link("https://cdn.a.com/a.png", "img_01.png"),
        link(
            "https://cdn.a.com/a.png?w=1200",
            "https://cdn.a.com/a.png?w=1200",
        ),
    ];
    assert_eq!(
        rewrite_links(md, &links),
        "![s](img_01.png) ![l](https://cdn.a.com/a.png?w=1200) 图"
    );
}

#[test]
fn image_extension_defaults_to_jpg() {
    let with_ext = Url::parse("https://a.com/x/y.png?size=2").unwrap();
    let without = Url::parse("https://a.com/image/12345").unwrap();
    assert_eq!(image_extension(&with_ext), ".png");
    assert_eq!(image_extension(&without), ".jpg");
}

#[tokio::test]
async fn save_writes_front_matter_and_body() {
    let root = temp_root();
    let at = Local.with_ymd_and_hms(2024, 3, 9, 8, 30, 0).unwrap();
    let saver = ContentSaver::new(&root)
        .unwrap()
        .with_clock(Arc::new(FixedClock::new(at)));

    let body = "# Heading\n\nSome body text.";
    let saved = saver
        .save(&crawl_result("Pricing / Plans", body), "Jasper")
        .await
        .unwrap();

    assert_eq!(
        saved.content_path,
        root.join("20240309_Jasper_Pricing___Plans").join(CONTENT_FILE)
    );
    assert!(saved.image_files.is_empty());

    let written = std::fs::read_to_string(&saved.content_path).unwrap();
    let rest = written.strip_prefix("---\n").unwrap();
    let (front, markdown) = rest.split_once("---\n\n").unwrap();
    assert_eq!(markdown, body);

    let fields: BTreeMap<String, String> = serde_yaml::from_str(front).unwrap();
    assert_eq!(fields["title"], "Pricing / Plans");
    assert_eq!(fields["source"], "Jasper");
    assert_eq!(fields["platform"], "普通网站");
    assert_eq!(fields["url"], "https://example.org/post");
    assert_eq!(fields["crawl_method"], "jina");
    assert_eq!(fields["crawl_time"], "2024-03-09 08:30:00");

    std::fs::remove_dir_all(&root).ok();
}

#[tokio::test]
async fn unreachable_images_do_not_fail_the_save() {
    let root = temp_root();
    let saver = ContentSaver::new(&root).unwrap();
    // Port 9 (discard) on loopback refuses connections.
    let body = "![x](http://127.0.0.1:9/a.png)\n\nbody";

    let saved = saver.save(&crawl_result("", body), "Acme").await.unwrap();

    assert!(saved.image_files.is_empty());
    let written = std::fs::read_to_string(&saved.content_path).unwrap();
    assert!(written.ends_with(body));
    assert!(saved
        .content_path
        .parent()
        .unwrap()
        .ends_with(format!("{}_Acme_untitled", Local::now().format("%Y%m%d"))));

    std::fs::remove_dir_all(&root).ok();
}
