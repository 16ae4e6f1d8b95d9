//! Paragraph extraction from fetched documents.
//!
//! Two extraction policies, chosen by the resolver and never mixed within
//! one call:
//!
//! - [`ExtractPolicy::ArticleBody`]: the aggregator's own article page. Text
//!   is taken only from `<p>` children directly under the `<article>`
//!   container, and the walk stops dead at the first `div`/`section` child.
//!   On the aggregator those siblings structurally mark the start of the
//!   related-articles / ad region, so this is a hard boundary rule, not a
//!   text heuristic.
//! - [`ExtractPolicy::AnyParagraph`]: a generic external publisher page.
//!   Every `<p>` in the document is collected in document order; footer
//!   boilerplate is removed downstream by the trimmer, not here.
//!
//! Extraction is a pure function of the document text. Malformed markup
//! degrades to whatever paragraphs are parseable; it never fails the call.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

static ARTICLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Which part of a document paragraph text is taken from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtractPolicy {
    /// Direct `<p>` children of the `<article>` container, stopping at the
    /// first `div`/`section` child.
    ArticleBody,
    /// Every `<p>` anywhere in the document.
    AnyParagraph,
}

/// Extract trimmed, non-empty paragraphs from `html` under `policy`,
/// in document order.
///
/// An absent `<article>` container under [`ExtractPolicy::ArticleBody`]
/// yields an empty list; callers treat that as "fall through to another
/// source", not as an error.
pub fn extract(html: &str, policy: ExtractPolicy) -> Vec<String> {
    let document = Html::parse_document(html);
    match policy {
        ExtractPolicy::ArticleBody => {
            let Some(container) = document.select(&ARTICLE_SELECTOR).next() else {
                return Vec::new();
            };
            article_body_paragraphs(container)
        }
        ExtractPolicy::AnyParagraph => document
            .select(&PARAGRAPH_SELECTOR)
            .filter_map(|p| trimmed_text(p))
            .collect(),
    }
}

/// Walk the container's direct children in document order.
fn article_body_paragraphs(container: ElementRef<'_>) -> Vec<String> {
    let mut paragraphs = Vec::new();
    for child in container.children() {
        let Some(element) = ElementRef::wrap(child) else {
            continue;
        };
        match element.value().name() {
            "p" => {
                if let Some(text) = trimmed_text(element) {
                    paragraphs.push(text);
                }
            }
            // Boundary to the related-articles / ad block.
            "div" | "section" => break,
            _ => {}
        }
    }
    paragraphs
}

/// Find the "read full article" anchor and resolve its target.
///
/// The anchor's visible text must match `label` exactly (after trimming);
/// relative targets are resolved against `base`. Returns `None` when no such
/// anchor exists or its target does not resolve to a URL.
pub fn find_full_article_link(html: &str, label: &str, base: &Url) -> Option<Url> {
    let document = Html::parse_document(html);
    for anchor in document.select(&ANCHOR_SELECTOR) {
        let text: String = anchor.text().collect();
        if text.trim() != label {
            continue;
        }
        let href = anchor.value().attr("href")?;
        if let Ok(target) = base.join(href) {
            return Some(target);
        }
    }
    None
}

fn trimmed_text(element: ElementRef<'_>) -> Option<String> {
    let text: String = element.text().collect();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_body_stops_at_first_div_sibling() {
        let html = r#"<html><body>
            <article>
                <p>一段落目。</p>
                <p>二段落目。</p>
                <p>三段落目。</p>
                <div class="related"><p>関連記事はこちら</p></div>
                <p>ボイラープレートの後の段落</p>
            </article>
        </body></html>"#;
        let paragraphs = extract(html, ExtractPolicy::ArticleBody);
        assert_eq!(paragraphs, vec!["一段落目。", "二段落目。", "三段落目。"]);
    }

    #[test]
    fn test_article_body_stops_at_section_too() {
        let html = r#"<article>
            <p>body</p>
            <section><p>ads</p></section>
            <p>after</p>
        </article>"#;
        assert_eq!(extract(html, ExtractPolicy::ArticleBody), vec!["body"]);
    }

    #[test]
    fn test_article_body_skips_non_paragraph_children() {
        let html = r#"<article>
            <h1>見出し</h1>
            <p>first</p>
            <figure><img src="x.jpg"></figure>
            <p>second</p>
        </article>"#;
        assert_eq!(
            extract(html, ExtractPolicy::ArticleBody),
            vec!["first", "second"]
        );
    }

    #[test]
    fn test_article_body_missing_container_is_empty_not_error() {
        let html = "<html><body><p>loose paragraph</p></body></html>";
        assert!(extract(html, ExtractPolicy::ArticleBody).is_empty());
    }

    #[test]
    fn test_whitespace_only_paragraphs_are_dropped() {
        let html = "<article><p>   </p><p>text</p><p></p></article>";
        assert_eq!(extract(html, ExtractPolicy::ArticleBody), vec!["text"]);
    }

    #[test]
    fn test_any_paragraph_collects_whole_document() {
        let html = r#"<html><body>
            <header><p>site nav</p></header>
            <div><p>story line one</p><div><p>story line two</p></div></div>
            <footer><p>Copyright © Example News</p></footer>
        </body></html>"#;
        let paragraphs = extract(html, ExtractPolicy::AnyParagraph);
        assert_eq!(
            paragraphs,
            vec![
                "site nav",
                "story line one",
                "story line two",
                "Copyright © Example News"
            ]
        );
    }

    #[test]
    fn test_malformed_markup_degrades_gracefully() {
        let html = "<p>open paragraph <div><p>still parsed";
        let paragraphs = extract(html, ExtractPolicy::AnyParagraph);
        assert!(!paragraphs.is_empty());
    }

    #[test]
    fn test_full_article_anchor_exact_label() {
        let base = Url::parse("https://news.yahoo.co.jp/pickup/1").unwrap();
        let html = r#"<body>
            <a href="/articles/abc">記事の続きを読む</a>
            <a href="https://news.yahoo.co.jp/articles/def">記事全文を読む</a>
        </body>"#;
        let link = find_full_article_link(html, "記事全文を読む", &base);
        assert_eq!(
            link.unwrap().as_str(),
            "https://news.yahoo.co.jp/articles/def"
        );
    }

    #[test]
    fn test_full_article_anchor_resolves_relative_href() {
        let base = Url::parse("https://news.yahoo.co.jp/pickup/1").unwrap();
        let html = r#"<a href="/articles/xyz">記事全文を読む</a>"#;
        let link = find_full_article_link(html, "記事全文を読む", &base);
        assert_eq!(
            link.unwrap().as_str(),
            "https://news.yahoo.co.jp/articles/xyz"
        );
    }

    #[test]
    fn test_full_article_anchor_absent() {
        let base = Url::parse("https://news.yahoo.co.jp/pickup/1").unwrap();
        let html = r#"<a href="/other">別のリンク</a>"#;
        assert!(find_full_article_link(html, "記事全文を読む", &base).is_none());
    }

    #[test]
    fn test_full_article_anchor_label_must_match_exactly() {
        let base = Url::parse("https://news.yahoo.co.jp/pickup/1").unwrap();
        let html = r#"<a href="/articles/abc">※記事全文を読むにはこちら</a>"#;
        assert!(find_full_article_link(html, "記事全文を読む", &base).is_none());
    }
}
