use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

/// Sub-elements whose presence marks a container as one product card.
static CARD_MARKERS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "p.price",
        "div.companyname",
        "div.newLocationUi",
        "span.highlight",
        "div.supplierInfoDiv",
        "p.prc",
        "div.card",
    ]
    .iter()
    .map(|css| Selector::parse(css).unwrap())
    .collect()
});

/// Climb from `anchor` to the first ancestor (at most `max_depth` levels up)
/// containing any card marker. Falls back to the anchor's parent, or the
/// anchor itself when it has no element parent.
pub fn locate<'a>(anchor: ElementRef<'a>, max_depth: usize) -> ElementRef<'a> {
    let mut node = anchor;
    let mut depth = 0;

    while depth < max_depth {
        let Some(parent) = node.parent().and_then(ElementRef::wrap) else {
            break;
        };
        if has_card_marker(&parent) {
            return parent;
        }
        node = parent;
        depth += 1;
    }

    anchor.parent().and_then(ElementRef::wrap).unwrap_or(anchor)
}

fn has_card_marker(node: &ElementRef) -> bool {
    CARD_MARKERS.iter().any(|sel| node.select(sel).next().is_some())
}
