use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static HREF_ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static CLASSED_ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[class]").unwrap());
static PRODUCT_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/proddetail/|/product-detail/|proddetail").unwrap());

const PRODUCT_CLASS_MARKER: &str = "proddetail";
const CARD_LINK_MARKER: &str = "cardlinks";

/// Anchors that likely point at product-detail pages, in document order.
///
/// Primary tier: href matches a product path, or the class list carries a
/// product/card-link marker. If that yields nothing, any anchor whose class
/// list carries the card-link marker is taken instead.
pub fn classify(document: &Html) -> Vec<ElementRef<'_>> {
    let primary: Vec<_> = document
        .select(&HREF_ANCHOR_SEL)
        .filter(|a| is_product_anchor(a))
        .collect();
    if !primary.is_empty() {
        return primary;
    }

    document
        .select(&CLASSED_ANCHOR_SEL)
        .filter(|a| class_list(a).contains(CARD_LINK_MARKER))
        .collect()
}

fn is_product_anchor(a: &ElementRef) -> bool {
    let href = a.value().attr("href").unwrap_or("");
    let cls = class_list(a);
    PRODUCT_PATH_RE.is_match(href)
        || cls.contains(PRODUCT_CLASS_MARKER)
        || cls.contains(CARD_LINK_MARKER)
}

/// Case-folded, space-joined class list.
fn class_list(el: &ElementRef) -> String {
    el.value().classes().collect::<Vec<_>>().join(" ").to_lowercase()
}
