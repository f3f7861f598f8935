use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use super::{clean_text, first_selector_text, parse_selectors, FieldRule};

static PRICE_SELS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    parse_selectors(&[
        "p.price",
        "p.prc",
        "span.p_price",
        "span.price",
        "div.price",
        "p.price_info",
    ])
});

// Currency amount with optional unit ("₹ 1,200/ Piece"), or an "Ask" token.
static PRICE_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([₹$€£]\s?[\d,]+(?:\.\d+)?(?:\s*/\s*\w+)?|Ask Price|Ask for Price|Ask)").unwrap()
});

/// Price text is kept raw here; numeric parsing happens in the cleaning pass.
pub const RULES: &[FieldRule] = &[from_selectors, from_block_text];

fn from_selectors(block: &ElementRef) -> Option<String> {
    first_selector_text(block, &PRICE_SELS)
}

fn from_block_text(block: &ElementRef) -> Option<String> {
    let text = clean_text(block);
    PRICE_TEXT_RE
        .captures(&text)
        .map(|caps| caps[1].trim().to_string())
}
