pub mod location;
pub mod price;
pub mod seller;

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Selector};
use url::Url;

use crate::table::ProductRecord;

/// One rule in a fallback chain. Returns `None` to hand over to the next rule.
pub type FieldRule = fn(&ElementRef) -> Option<String>;

/// Fields pulled out of one (anchor, block) pair. Only the URL is required
/// downstream; records without it never reach the ledger or the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub product_name: Option<String>,
    pub product_url: Option<String>,
    pub seller: Option<String>,
    pub location: Option<String>,
    pub price_text: Option<String>,
}

impl ExtractedFields {
    pub fn into_record(self, keyword: &str, scrape_time: DateTime<Utc>) -> Option<ProductRecord> {
        let product_url = self.product_url?;
        Some(ProductRecord {
            scrape_time: Some(scrape_time),
            keyword: keyword.to_string(),
            product_name: self.product_name,
            product_url,
            seller: self.seller,
            location: self.location,
            price_text: self.price_text,
        })
    }
}

pub fn extract(anchor: ElementRef, block: ElementRef, base: &Url) -> ExtractedFields {
    ExtractedFields {
        product_name: first_match(TITLE_RULES, &anchor),
        product_url: product_url(&anchor, base),
        seller: first_match(seller::RULES, &block),
        location: first_match(location::RULES, &block),
        price_text: first_match(price::RULES, &block),
    }
}

/// Evaluate rules in order, returning the first non-empty result.
pub fn first_match(rules: &[FieldRule], el: &ElementRef) -> Option<String> {
    rules
        .iter()
        .find_map(|rule| rule(el).filter(|v| !v.trim().is_empty()))
}

const TITLE_RULES: &[FieldRule] = &[title_from_text, title_from_attr, title_from_aria_label];

fn title_from_text(a: &ElementRef) -> Option<String> {
    Some(clean_text(a))
}

fn title_from_attr(a: &ElementRef) -> Option<String> {
    attr_text(a, "title")
}

fn title_from_aria_label(a: &ElementRef) -> Option<String> {
    attr_text(a, "aria-label")
}

fn product_url(anchor: &ElementRef, base: &Url) -> Option<String> {
    let href = anchor.value().attr("href")?.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(String::from)
}

fn attr_text(el: &ElementRef, name: &str) -> Option<String> {
    el.value().attr(name).map(|v| v.trim().to_string())
}

/// Visible text with whitespace runs collapsed to single spaces.
pub fn clean_text(el: &ElementRef) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first element matching each selector, in selector priority
/// order, skipping matches whose text is empty.
pub fn first_selector_text(el: &ElementRef, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|sel| {
        el.select(sel)
            .next()
            .map(|found| clean_text(&found))
            .filter(|t| !t.is_empty())
    })
}

pub fn parse_selectors(css: &[&str]) -> Vec<Selector> {
    css.iter().map(|s| Selector::parse(s).unwrap()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn base() -> Url {
        Url::parse("https://dir.indiamart.com/search.mp?ss=chair&pg=1").unwrap()
    }

    fn first_anchor(doc: &Html) -> ElementRef<'_> {
        doc.select(&Selector::parse("a").unwrap()).next().unwrap()
    }

    fn extract_one(html: &str) -> ExtractedFields {
        let doc = Html::parse_document(html);
        let a = first_anchor(&doc);
        let block = ElementRef::wrap(a.parent().unwrap()).unwrap();
        extract(a, block, &base())
    }

    #[test]
    fn title_falls_back_through_attributes() {
        let f = extract_one(r#"<div><a href="/p/1">  Wooden
            Chair </a></div>"#);
        assert_eq!(f.product_name.as_deref(), Some("Wooden Chair"));

        let f = extract_one(r#"<div><a href="/p/1" title="From Title"><img src="x.jpg"></a></div>"#);
        assert_eq!(f.product_name.as_deref(), Some("From Title"));

        let f = extract_one(r#"<div><a href="/p/1" title=" " aria-label="Label"></a></div>"#);
        assert_eq!(f.product_name.as_deref(), Some("Label"));

        let f = extract_one(r#"<div><a href="/p/1"></a></div>"#);
        assert_eq!(f.product_name, None);
    }

    #[test]
    fn url_is_resolved_against_base() {
        let f = extract_one(r#"<div><a href=" /proddetail/steel-almirah-777.html ">A</a></div>"#);
        assert_eq!(
            f.product_url.as_deref(),
            Some("https://dir.indiamart.com/proddetail/steel-almirah-777.html")
        );

        let f = extract_one(r#"<div><a href="https://www.indiamart.com/proddetail/x.html">A</a></div>"#);
        assert_eq!(f.product_url.as_deref(), Some("https://www.indiamart.com/proddetail/x.html"));
    }

    #[test]
    fn blank_or_missing_href_has_no_url() {
        assert_eq!(extract_one(r#"<div><a href="   ">A</a></div>"#).product_url, None);
        assert_eq!(extract_one(r#"<div><a class="cardlinks">A</a></div>"#).product_url, None);
    }

    #[test]
    fn record_requires_url() {
        let now = Utc::now();
        let missing = ExtractedFields {
            product_name: Some("Chair".into()),
            ..Default::default()
        };
        assert!(missing.into_record("chair", now).is_none());

        let present = ExtractedFields {
            product_url: Some("https://x.test/proddetail/1".into()),
            ..Default::default()
        };
        let rec = present.into_record("chair", now).unwrap();
        assert_eq!(rec.keyword, "chair");
        assert_eq!(rec.scrape_time, Some(now));
        assert_eq!(rec.product_url, "https://x.test/proddetail/1");
    }

    #[test]
    fn first_match_skips_blank_results() {
        fn blank(_: &ElementRef) -> Option<String> {
            Some("  ".into())
        }
        fn nothing(_: &ElementRef) -> Option<String> {
            None
        }
        fn third(_: &ElementRef) -> Option<String> {
            Some("third".into())
        }
        const RULES: &[FieldRule] = &[blank, nothing, third];
        let doc = Html::parse_document("<p>x</p>");
        let root = doc.root_element();
        assert_eq!(first_match(RULES, &root).as_deref(), Some("third"));
    }
}
