use std::collections::HashMap;

use lol_html::errors::RewritingError;
use lol_html::{element, HtmlRewriter, Settings};
use scraper::{Html, Selector};
use url::Url;

/// Kind of sub-resource a page references. Decides the folder it is saved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Stylesheet,
    Script,
    Icon,
    Media,
}

impl AssetKind {
    pub fn folder(self) -> &'static str {
        match self {
            AssetKind::Image | AssetKind::Icon => "images",
            AssetKind::Stylesheet => "css",
            AssetKind::Script => "js",
            AssetKind::Media => "media",
        }
    }

    pub(crate) fn default_extension(self) -> &'static str {
        match self {
            AssetKind::Stylesheet => "css",
            AssetKind::Script => "js",
            AssetKind::Icon => "ico",
            AssetKind::Image | AssetKind::Media => "bin",
        }
    }
}

/// A distinct asset URL and every attribute value that pointed at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub url: String,
    pub kind: AssetKind,
    pub references: Vec<String>,
}

const RULES: &[(&str, &str, AssetKind)] = &[
    ("link[rel~=stylesheet][href]", "href", AssetKind::Stylesheet),
    ("link[rel~=icon][href]", "href", AssetKind::Icon),
    ("script[src]", "src", AssetKind::Script),
    ("img[src]", "src", AssetKind::Image),
    ("source[src]", "src", AssetKind::Media),
    ("video[poster]", "poster", AssetKind::Image),
];

/// Collect the page's fetchable http(s) assets, resolved against `<base href>`
/// or `page_url`, deduplicated by absolute URL and capped at `max_assets`.
pub fn discover_assets(html: &str, page_url: &str, max_assets: usize) -> Vec<AssetRef> {
    let document = Html::parse_document(html);
    let page = Url::parse(page_url).ok();
    let base = document_base(&document, page.as_ref()).or(page);

    let mut assets: Vec<AssetRef> = Vec::new();
    for (selector, attr, kind) in RULES {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        for element in document.select(&selector) {
            let Some(raw) = element.value().attr(attr) else {
                continue;
            };
            let Some(url) = resolve_asset(raw, base.as_ref()) else {
                continue;
            };
            let url = String::from(url);
            if let Some(existing) = assets.iter_mut().find(|a| a.url == url) {
                if !existing.references.iter().any(|r| r == raw) {
                    existing.references.push(raw.to_string());
                }
                continue;
            }
            if assets.len() >= max_assets {
                continue;
            }
            assets.push(AssetRef {
                url,
                kind: *kind,
                references: vec![raw.to_string()],
            });
        }
    }
    assets
}

fn document_base(document: &Html, page: Option<&Url>) -> Option<Url> {
    let selector = Selector::parse("base[href]").ok()?;
    let href = document.select(&selector).next()?.value().attr("href")?.trim();
    match Url::parse(href) {
        Ok(url) => Some(url),
        Err(_) => page.and_then(|page| page.join(href).ok()),
    }
}

fn resolve_asset(reference: &str, base: Option<&Url>) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let url = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(_) => base?.join(trimmed).ok()?,
    };
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// Point asset attributes in `html` at saved local copies.
///
/// Only the attribute each asset rule reads is touched, on elements the rule
/// selects, so links and text that happen to share a value stay as they are.
/// A value matches a `(reference, local)` pair either verbatim or with
/// `&amp;` standing for `&`. `<base>` elements are dropped, otherwise the
/// local paths would resolve against the remote base again.
pub fn rewrite_references(
    html: &str,
    replacements: &[(String, String)],
) -> Result<String, RewritingError> {
    let lookup: HashMap<&str, &str> = replacements
        .iter()
        .map(|(reference, local)| (reference.as_str(), local.as_str()))
        .collect();
    let lookup = &lookup;

    let mut handlers = vec![element!("base", |el| {
        el.remove();
        Ok(())
    })];
    for &(selector, attr, _) in RULES {
        handlers.push(element!(selector, move |el| {
            let Some(value) = el.get_attribute(attr) else {
                return Ok(());
            };
            if let Some(local) = local_for(lookup, &value) {
                el.set_attribute(attr, local)?;
            }
            Ok(())
        }));
    }

    let mut output = Vec::with_capacity(html.len());
    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: handlers,
            ..Settings::default()
        },
        |chunk: &[u8]| output.extend_from_slice(chunk),
    );
    rewriter.write(html.as_bytes())?;
    rewriter.end()?;
    Ok(String::from_utf8_lossy(&output).into_owned())
}

fn local_for<'a>(lookup: &HashMap<&str, &'a str>, value: &str) -> Option<&'a str> {
    if let Some(local) = lookup.get(value).copied() {
        return Some(local);
    }
    lookup.get(value.replace("&amp;", "&").as_str()).copied()
}
