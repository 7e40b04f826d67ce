//! A `StyleSheetList` backed by a parsed HTML document.
//!
//! The stylesheets are snapshotted when the document is loaded: `<style>`
//! elements are parsed in place, `<link rel="stylesheet">` targets are
//! fetched through a `SheetLoader`, unless the origin policy denies access.

use crate::config::ExtractorConfig;
use crate::dom::dom_tree::{Document, ElementNode};
use crate::error::SheetAccessError;
use crate::parser::html::create_dom_tree;
use crate::source::loader::SheetLoader;
use crate::style::lightning::parse_rules;
use crate::style::sheet::{OwnedStyleSheet, StyleSheet, StyleSheetList};
use log::{debug, warn};
use rayon::prelude::*;
use url::Url;

/// Decides whether the rules of a linked sheet may be read.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    document_url: Url,
    allow_cross_origin: bool,
}

impl OriginPolicy {
    pub fn new(document_url: Url, allow_cross_origin: bool) -> Self {
        OriginPolicy {
            document_url,
            allow_cross_origin,
        }
    }

    pub fn check(&self, href: &Url) -> Result<(), SheetAccessError> {
        if self.allow_cross_origin || same_origin(&self.document_url, href) {
            return Ok(());
        }
        Err(SheetAccessError::CrossOrigin {
            href: href.to_string(),
            document_origin: self.document_url.origin().ascii_serialization(),
        })
    }
}

/// `file:` URLs have opaque origins that never compare equal, so local
/// documents treat every other local file as same-origin.
fn same_origin(a: &Url, b: &Url) -> bool {
    if a.scheme() == "file" && b.scheme() == "file" {
        return true;
    }
    a.origin() == b.origin()
}

/// Where a stylesheet's text comes from, in document order.
#[derive(Debug)]
enum SheetSource {
    Inline(String),
    Linked(Url),
}

fn is_css_type(elem: &ElementNode) -> bool {
    match elem.attribute("type").map(str::trim) {
        None | Some("") => true,
        Some(ty) => ty.eq_ignore_ascii_case("text/css"),
    }
}

fn is_stylesheet_link(elem: &ElementNode) -> bool {
    elem.attribute("rel").is_some_and(|rel| {
        rel.split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case("stylesheet"))
    })
}

/// The URL relative hrefs resolve against: the first `<base href>`, if any.
fn base_url(dom: &Document, document_url: &Url) -> Url {
    let mut base = None;
    dom.for_each_element(|elem| {
        if base.is_none() && elem.tag.eq_ignore_ascii_case("base") {
            base = elem
                .attribute("href")
                .and_then(|href| document_url.join(href.trim()).ok());
        }
    });
    base.unwrap_or_else(|| document_url.clone())
}

fn sheet_sources(dom: &Document, base: &Url) -> Vec<SheetSource> {
    let mut sources = Vec::new();
    dom.for_each_element(|elem| {
        if elem.tag.eq_ignore_ascii_case("style") {
            if is_css_type(elem) {
                sources.push(SheetSource::Inline(elem.text_content()));
            }
        } else if elem.tag.eq_ignore_ascii_case("link")
            && is_stylesheet_link(elem)
            && is_css_type(elem)
        {
            let Some(href) = elem.attribute("href").map(str::trim) else {
                return;
            };
            if href.is_empty() {
                return;
            }
            match base.join(href) {
                Ok(url) => sources.push(SheetSource::Linked(url)),
                Err(e) => debug!("Ignoring stylesheet link {:?}: {}", href, e),
            }
        }
    });
    sources
}

/// An HTML document with its stylesheets loaded.
#[derive(Debug)]
pub struct HtmlDocument {
    url: Url,
    sheets: Vec<OwnedStyleSheet>,
}

impl HtmlDocument {
    /// Parse `html` and load its stylesheets.
    pub fn from_html(
        html: &str,
        url: &Url,
        loader: &dyn SheetLoader,
        config: &ExtractorConfig,
    ) -> Self {
        let dom = create_dom_tree(html);
        Self::load(&dom, url, loader, config)
    }

    /// Build the stylesheet list of an already parsed document.
    ///
    /// Linked sheets are fetched in parallel; the list keeps document order.
    pub fn load(
        dom: &Document,
        url: &Url,
        loader: &dyn SheetLoader,
        config: &ExtractorConfig,
    ) -> Self {
        let policy = OriginPolicy::new(url.clone(), config.allow_cross_origin);
        let base = base_url(dom, url);
        let sources = sheet_sources(dom, &base);
        debug!("Found {} stylesheets in {}", sources.len(), url);

        let sheets = sources
            .into_par_iter()
            .map(|source| materialize(source, &policy, loader, config.normalize_rules))
            .collect();

        HtmlDocument {
            url: url.clone(),
            sheets,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn sheets(&self) -> &[OwnedStyleSheet] {
        &self.sheets
    }
}

fn materialize(
    source: SheetSource,
    policy: &OriginPolicy,
    loader: &dyn SheetLoader,
    normalize: bool,
) -> OwnedStyleSheet {
    match source {
        SheetSource::Inline(css_text) => {
            OwnedStyleSheet::inline(parse_rules(&css_text, "[inline styles]", normalize))
        }
        SheetSource::Linked(url) => {
            if let Err(denied) = policy.check(&url) {
                return OwnedStyleSheet::denied(url.as_str(), denied);
            }
            match loader.load(&url) {
                Ok(css_text) => {
                    OwnedStyleSheet::linked(url.as_str(), parse_rules(&css_text, url.as_str(), normalize))
                }
                Err(e) => {
                    warn!("Failed to load stylesheet {}: {}", url, e);
                    OwnedStyleSheet::unloaded(url.as_str())
                }
            }
        }
    }
}

impl StyleSheetList for HtmlDocument {
    fn len(&self) -> usize {
        self.sheets.len()
    }

    fn item(&self, index: usize) -> Option<&dyn StyleSheet> {
        self.sheets.get(index).map(|sheet| sheet as &dyn StyleSheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn sources(html: &str, document_url: &str) -> Vec<String> {
        let dom = create_dom_tree(html);
        let document_url = url(document_url);
        let base = base_url(&dom, &document_url);
        sheet_sources(&dom, &base)
            .into_iter()
            .map(|source| match source {
                SheetSource::Inline(text) => format!("inline:{}", text),
                SheetSource::Linked(url) => format!("link:{}", url),
            })
            .collect()
    }

    #[test]
    fn test_sources_follow_document_order() {
        let html = r#"<html><head>
            <link rel="stylesheet" href="a.css">
            <style>p{}</style>
            </head><body>
            <link rel="Alternate StyleSheet" href="/b.css">
            <style>i{}</style>
            </body></html>"#;
        assert_eq!(
            sources(html, "https://example.com/docs/index.html"),
            vec![
                "link:https://example.com/docs/a.css",
                "inline:p{}",
                "link:https://example.com/b.css",
                "inline:i{}",
            ]
        );
    }

    #[test]
    fn test_non_css_elements_are_ignored() {
        let html = r#"
            <link rel="icon" href="favicon.ico">
            <link rel="stylesheet">
            <link rel="stylesheet" href="  ">
            <link rel="stylesheet" type="text/less" href="x.less">
            <style type="text/template">nope</style>
            <style type="TEXT/CSS">yes{}</style>"#;
        assert_eq!(
            sources(html, "https://example.com/"),
            vec!["inline:yes{}"]
        );
    }

    #[test]
    fn test_base_element_changes_resolution() {
        let html = r#"<head><base href="https://cdn.example.com/css/">
            <link rel="stylesheet" href="site.css"></head>"#;
        assert_eq!(
            sources(html, "https://example.com/"),
            vec!["link:https://cdn.example.com/css/site.css"]
        );
    }

    #[test]
    fn test_origin_policy() {
        let policy = OriginPolicy::new(url("https://example.com/page"), false);
        assert!(policy.check(&url("https://example.com/a.css")).is_ok());
        assert_eq!(
            policy.check(&url("https://cdn.other.com/a.css")),
            Err(SheetAccessError::CrossOrigin {
                href: "https://cdn.other.com/a.css".to_string(),
                document_origin: "https://example.com".to_string(),
            })
        );
        assert!(policy.check(&url("http://example.com/a.css")).is_err());

        let permissive = OriginPolicy::new(url("https://example.com/page"), true);
        assert!(permissive.check(&url("https://cdn.other.com/a.css")).is_ok());
    }

    #[test]
    fn test_local_files_share_an_origin() {
        let policy = OriginPolicy::new(url("file:///srv/site/index.html"), false);
        assert!(policy.check(&url("file:///srv/other/a.css")).is_ok());
        assert!(policy.check(&url("https://example.com/a.css")).is_err());
    }
}
