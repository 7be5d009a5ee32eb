use capture_engine::{asset_filename, discover_assets, rewrite_references, AssetKind};
use pretty_assertions::assert_eq;

const PAGE: &str = r##"<html><head>
<link rel="stylesheet" href="/css/site.css">
<link rel="shortcut icon" href="favicon.ico">
<script src="https://cdn.example.net/lib.js"></script>
<script>inline()</script>
</head><body>
<img src="img/logo.png">
<img src='img/logo.png'>
<img src="data:image/png;base64,AAAA">
<img src="#">
<video poster="/media/poster.jpg"><source src="/media/clip.mp4"></video>
<a href="/about">About</a>
</body></html>"##;

#[test]
fn discovers_assets_resolved_against_page() {
    let assets = discover_assets(PAGE, "https://example.com/page?cachebust=1", 100);
    let found: Vec<(&str, AssetKind)> = assets.iter().map(|a| (a.url.as_str(), a.kind)).collect();

    assert_eq!(
        found,
        vec![
            ("https://example.com/css/site.css", AssetKind::Stylesheet),
            ("https://example.com/favicon.ico", AssetKind::Icon),
            ("https://cdn.example.net/lib.js", AssetKind::Script),
            ("https://example.com/img/logo.png", AssetKind::Image),
            ("https://example.com/media/clip.mp4", AssetKind::Media),
            ("https://example.com/media/poster.jpg", AssetKind::Image),
        ]
    );
}

#[test]
fn duplicate_urls_are_merged() {
    let html = r#"<img src="img/a.png"><img src="/img/a.png"><img src="img/a.png">"#;
    let assets = discover_assets(html, "https://example.com/", 100);

    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].references, vec!["img/a.png", "/img/a.png"]);
}

#[test]
fn base_href_overrides_page_url() {
    let html = r#"<html><head><base href="https://static.example.org/v2/"></head>
<body><img src="a.png"></body></html>"#;
    let assets = discover_assets(html, "https://example.com/page", 100);
    assert_eq!(assets[0].url, "https://static.example.org/v2/a.png");
}

#[test]
fn asset_count_is_capped() {
    let html: String = (0..10).map(|i| format!(r#"<img src="/{i}.png">"#)).collect();
    assert_eq!(discover_assets(&html, "https://example.com/", 3).len(), 3);
}

#[test]
fn rewrite_handles_both_quote_styles_and_escaped_ampersands() {
    let html = r#"<img src="img/a.png"><img src='img/a.png'><img src="/p?x=1&amp;y=2">"#;
    let replacements = vec![
        ("img/a.png".to_string(), "images/a--00000000.png".to_string()),
        ("/p?x=1&y=2".to_string(), "images/p--11111111.bin".to_string()),
    ];

    let out = rewrite_references(html, &replacements).unwrap();
    assert_eq!(out.matches("images/a--00000000.png").count(), 2, "{out}");
    assert!(out.contains("images/p--11111111.bin"), "{out}");
    assert!(!out.contains("img/a.png"), "{out}");
    assert!(!out.contains("/p?x=1"), "{out}");
}

#[test]
fn rewrite_leaves_text_content_alone() {
    let html = r#"<p>img/a.png</p><img src="img/a.png">"#;
    let out = rewrite_references(html, &[("img/a.png".into(), "images/x.png".into())]).unwrap();
    assert!(out.starts_with("<p>img/a.png</p>"), "{out}");
    assert!(out.contains(r#"src="images/x.png""#), "{out}");
}

#[test]
fn rewrite_only_touches_asset_attributes() {
    let html = r#"<a href="img/logo.png">full size</a><img src="img/logo.png" alt="img/logo.png">"#;
    let out = rewrite_references(html, &[("img/logo.png".into(), "images/logo--1.png".into())])
        .unwrap();

    assert!(out.contains(r#"<a href="img/logo.png">"#), "{out}");
    assert!(out.contains(r#"src="images/logo--1.png""#), "{out}");
    assert!(out.contains(r#"alt="img/logo.png""#), "{out}");
}

#[test]
fn rewrite_drops_base_element() {
    let html = r#"<html><head><base href="https://static.example.org/v2/"><title>t</title></head><body><img src="a.png"></body></html>"#;
    let out = rewrite_references(html, &[("a.png".into(), "images/a--1.png".into())]).unwrap();

    assert!(!out.contains("<base"), "{out}");
    assert!(out.contains("<title>t</title>"), "{out}");
    assert!(out.contains(r#"src="images/a--1.png""#), "{out}");
}

#[test]
fn asset_filename_is_deterministic_and_safe() {
    let name = asset_filename("https://example.com/img/My Logo!.PNG?v=3", AssetKind::Image);
    assert!(name.starts_with("images/My_20Logo--"), "{name}");
    assert!(name.ends_with(".png"));
    assert_eq!(
        name,
        asset_filename("https://example.com/img/My Logo!.PNG?v=3", AssetKind::Image)
    );

    // Same file name, different query: distinct paths.
    assert_ne!(
        asset_filename("https://example.com/app.js?v=1", AssetKind::Script),
        asset_filename("https://example.com/app.js?v=2", AssetKind::Script)
    );
}

#[test]
fn asset_filename_falls_back_to_kind_extension() {
    let css = asset_filename("https://fonts.example.com/css2?family=Inter", AssetKind::Stylesheet);
    assert!(css.starts_with("css/css2--"));
    assert!(css.ends_with(".css"));

    let root = asset_filename("https://example.com/", AssetKind::Image);
    assert!(root.starts_with("images/asset--"));
    assert!(root.ends_with(".bin"));
}
