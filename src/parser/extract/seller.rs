use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use super::{first_selector_text, parse_selectors, FieldRule};

static COMPANY_LINK_SELS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    parse_selectors(&[
        "div.companyname a.cardlinks",
        "div.companyname a",
        "a.cardlinks.elps.elps1",
        "div.supplierInfoDiv a",
    ])
});

static COMPANY_BOX_SELS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| parse_selectors(&["div.companyname", "span.comp-name", "div.supplierInfoDiv"]));

pub const RULES: &[FieldRule] = &[from_company_link, from_company_container];

fn from_company_link(block: &ElementRef) -> Option<String> {
    first_selector_text(block, &COMPANY_LINK_SELS)
}

fn from_company_container(block: &ElementRef) -> Option<String> {
    first_selector_text(block, &COMPANY_BOX_SELS)
}

#[cfg(test)]
mod tests {
    use super::super::first_match;
    use super::*;
    use scraper::Html;

    fn seller_of(html: &str) -> Option<String> {
        let doc = Html::parse_document(html);
        let block = doc.select(&Selector::parse("div.block").unwrap()).next().unwrap();
        first_match(RULES, &block)
    }

    #[test]
    fn company_link_preferred() {
        let s = seller_of(
            r#"<div class="block"><div class="companyname">
                 <span>Verified</span> <a href="/sharma/">Sharma  Furniture Works</a>
               </div></div>"#,
        );
        assert_eq!(s.as_deref(), Some("Sharma Furniture Works"));
    }

    #[test]
    fn supplier_info_link() {
        let s = seller_of(r#"<div class="block"><div class="supplierInfoDiv"><a href="/g/">Gupta Traders</a></div></div>"#);
        assert_eq!(s.as_deref(), Some("Gupta Traders"));
    }

    #[test]
    fn broader_container_fallback() {
        let s = seller_of(r#"<div class="block"><span class="comp-name">Delhi Steel House</span></div>"#);
        assert_eq!(s.as_deref(), Some("Delhi Steel House"));
    }

    #[test]
    fn absent_without_company_markup() {
        assert_eq!(seller_of(r#"<div class="block"><p>Steel Rack</p></div>"#), None);
    }
}
