use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use super::{clean_text, first_selector_text, parse_selectors, FieldRule};

static LOCATION_SELS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    parse_selectors(&[
        "div.newLocationUi span.highlight",
        "span.highlight",
        "div.supplierLocation, span.city",
    ])
});

static CAPITALIZED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z][a-z]{2,}(?:\s+[A-Z][a-z]{2,})?)\b").unwrap());

pub const RULES: &[FieldRule] = &[from_selectors, from_capitalized_phrase];

fn from_selectors(block: &ElementRef) -> Option<String> {
    first_selector_text(block, &LOCATION_SELS)
}

/// First capitalized word or two-word phrase in the block text.
///
/// Approximate: there is no geographic lookup behind this, so a product or
/// brand name that comes before the city is returned instead.
fn from_capitalized_phrase(block: &ElementRef) -> Option<String> {
    let text = clean_text(block);
    CAPITALIZED_RE
        .captures(&text)
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::super::first_match;
    use super::*;
    use scraper::Html;

    fn location_of(html: &str) -> Option<String> {
        let doc = Html::parse_document(html);
        let block = doc.select(&Selector::parse("div.block").unwrap()).next().unwrap();
        first_match(RULES, &block)
    }

    #[test]
    fn highlight_inside_location_ui_first() {
        let l = location_of(
            r#"<div class="block"><span class="highlight">Best Seller</span>
               <div class="newLocationUi"><span class="highlight">Jaipur</span></div></div>"#,
        );
        assert_eq!(l.as_deref(), Some("Jaipur"));
    }

    #[test]
    fn city_span_fallback() {
        let l = location_of(r#"<div class="block"><span class="city">New Delhi</span></div>"#);
        assert_eq!(l.as_deref(), Some("New Delhi"));
    }

    #[test]
    fn capitalized_phrase_fallback() {
        let l = location_of(r#"<div class="block"><p>supplied from Navi Mumbai since 2004</p></div>"#);
        assert_eq!(l.as_deref(), Some("Navi Mumbai"));
    }

    #[test]
    fn capitalized_fallback_can_misfire_on_product_names() {
        let l = location_of(r#"<div class="block"><p>Plastic Storage Box</p><p>Ask for Price</p></div>"#);
        assert_eq!(l.as_deref(), Some("Plastic Storage"));
    }

    #[test]
    fn absent_for_lowercase_text() {
        assert_eq!(location_of(r#"<div class="block"><p>no city 12</p></div>"#), None);
    }
}
