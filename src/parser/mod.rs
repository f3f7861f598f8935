pub mod anchors;
pub mod blocks;
pub mod extract;

use scraper::Html;
use url::Url;

use extract::ExtractedFields;

/// A page's listings before ledger filtering.
pub struct PageListings {
    pub anchors: usize,
    pub fields: Vec<ExtractedFields>,
}

/// Parse → classify anchors → locate each block → extract fields.
pub fn extract_listings(html: &str, base: &Url, max_depth: usize) -> PageListings {
    let document = Html::parse_document(html);
    let anchors = anchors::classify(&document);

    let fields = anchors
        .iter()
        .map(|&a| extract::extract(a, blocks::locate(a, max_depth), base))
        .collect();

    PageListings {
        anchors: anchors.len(),
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> PageListings {
        let html = std::fs::read_to_string("tests/fixtures/search_page.html").unwrap();
        let base = Url::parse("https://dir.indiamart.com/search.mp?ss=furniture&pg=1").unwrap();
        extract_listings(&html, &base, 6)
    }

    #[test]
    fn search_page_anchors() {
        let page = fixture();
        assert_eq!(page.anchors, 4);
        let urls: Vec<_> = page
            .fields
            .iter()
            .map(|f| f.product_url.as_deref().unwrap())
            .collect();
        assert_eq!(
            urls,
            vec![
                "https://www.indiamart.com/proddetail/wooden-dining-chair-2851.html",
                "https://www.indiamart.com/proddetail/wooden-dining-chair-2851.html",
                "https://www.indiamart.com/proddetail/plastic-storage-box-9912.html",
                "https://dir.indiamart.com/proddetail/steel-almirah-777.html",
            ]
        );
    }

    #[test]
    fn structured_card() {
        let page = fixture();
        let image_link = &page.fields[0];
        assert_eq!(image_link.product_name.as_deref(), Some("Wooden Dining Chair"));

        let chair = &page.fields[1];
        assert_eq!(chair.product_name.as_deref(), Some("Wooden Dining Chair"));
        assert_eq!(chair.price_text.as_deref(), Some("₹ 1,200/ Piece"));
        assert_eq!(chair.seller.as_deref(), Some("Sharma Furniture Works"));
        assert_eq!(chair.location.as_deref(), Some("Jaipur"));
    }

    #[test]
    fn card_with_text_fallbacks() {
        let page = fixture();
        let bx = &page.fields[2];
        assert_eq!(bx.product_name.as_deref(), Some("Plastic Storage Box"));
        assert_eq!(bx.price_text.as_deref(), Some("Ask for Price"));
        assert_eq!(bx.seller.as_deref(), Some("Gupta Traders"));
        // No location markup: the capitalized-phrase heuristic picks the product name.
        assert_eq!(bx.location.as_deref(), Some("Plastic Storage"));
    }

    #[test]
    fn card_with_relative_link() {
        let page = fixture();
        let almirah = &page.fields[3];
        assert_eq!(almirah.product_name.as_deref(), Some("Steel Almirah"));
        assert_eq!(almirah.price_text.as_deref(), Some("₹ 8,500 / Piece"));
        assert_eq!(almirah.seller.as_deref(), Some("Delhi Steel House"));
        assert_eq!(almirah.location.as_deref(), Some("New Delhi"));
    }
}
