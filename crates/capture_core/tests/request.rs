use std::collections::HashSet;
use std::path::PathBuf;

use capture_core::{cache_busted_url, CacheBuster, CaptureRequest, JobConfig, CAPTURE_DIR_PREFIX};
use url::Url;

fn config() -> JobConfig {
    JobConfig::from_lookup(|name| match name {
        "CAPTURE_URL" => Some("https://example.com/page".into()),
        "SUBDIR_PREFIX" => Some("home".into()),
        "S3_BUCKET_NAME" => Some("homepage-capture".into()),
        "S3_PATH" => Some("captures/".into()),
        _ => None,
    })
    .unwrap()
}

fn is_cache_busted(url: &str, base: &str) -> bool {
    url.strip_prefix(base)
        .and_then(|rest| rest.strip_prefix("?cachebust="))
        .is_some_and(|token| !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()))
}

#[test]
fn target_url_carries_numeric_cachebust() {
    let buster = CacheBuster::new();
    let request = CaptureRequest::new(&config(), &buster);

    assert!(
        is_cache_busted(&request.target_url, "https://example.com/page"),
        "{}",
        request.target_url
    );
}

#[test]
fn cachebust_uses_ampersand_when_query_present() {
    assert_eq!(
        cache_busted_url("https://example.com/page?lang=en", 7),
        "https://example.com/page?lang=en&cachebust=7"
    );
}

#[test]
fn cachebust_goes_into_query_not_fragment() {
    let busted = cache_busted_url("https://example.com/page#top", 5);
    assert_eq!(busted, "https://example.com/page?cachebust=5#top");

    let parsed = Url::parse(&busted).unwrap();
    assert_eq!(parsed.query(), Some("cachebust=5"));
    assert_eq!(parsed.fragment(), Some("top"));

    assert_eq!(
        cache_busted_url("https://example.com/page?lang=en#top", 6),
        "https://example.com/page?lang=en&cachebust=6#top"
    );
}

#[test]
fn tokens_strictly_increase_back_to_back() {
    let buster = CacheBuster::new();
    let tokens: Vec<i64> = (0..50).map(|_| buster.next_token()).collect();
    assert!(tokens.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn consecutive_requests_differ_in_url_and_directory() {
    let config = config();
    let buster = CacheBuster::new();
    let first = CaptureRequest::new(&config, &buster);
    let second = CaptureRequest::new(&config, &buster);

    assert_ne!(first.target_url, second.target_url);
    assert_ne!(first.local_dir, second.local_dir);
}

#[test]
fn local_dir_lives_under_capture_root() {
    let buster = CacheBuster::new();
    let request = CaptureRequest::new(&config(), &buster);

    assert_eq!(request.local_dir.parent(), Some(PathBuf::from("/tmp/page-capture").as_path()));
    let name = request.local_dir.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with(CAPTURE_DIR_PREFIX));
    assert!(name.len() > CAPTURE_DIR_PREFIX.len());
    assert!(request
        .local_dir
        .to_str()
        .unwrap()
        .starts_with("/tmp/page-capture/capture-"));
    assert_eq!(request.page_dir, request.local_dir.join("home"));
}

#[test]
fn many_requests_never_share_a_directory() {
    let config = config();
    let buster = CacheBuster::new();
    let dirs: HashSet<PathBuf> = (0..200)
        .map(|_| CaptureRequest::new(&config, &buster).local_dir)
        .collect();
    assert_eq!(dirs.len(), 200);
}
