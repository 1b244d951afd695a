//! Class-token text segmentation. Presentation class names are the only
//! stable-ish signal on these pages, so every extractor narrows the DOM down
//! to spans carrying a required token set. The token lists live with their
//! extractors; this module only implements the matching.

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

static SPAN: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());

/// One leaf-level visible text run.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub text: String,
    /// False when the node carries the placeholder token (icon-only spans and
    /// other non-content decoration).
    pub has_content: bool,
}

/// Collect descendant span texts whose class set contains *all* of `required`,
/// in document order. Narrowing is applied token by token; since every token
/// must be present the order only affects how fast the candidate set shrinks.
pub fn fragments_by_class(
    root: ElementRef<'_>,
    required: &[&str],
    placeholder: &str,
) -> Vec<Fragment> {
    let mut spans: Vec<ElementRef<'_>> = root.select(&SPAN).collect();
    for token in required {
        spans.retain(|span| has_class(*span, token));
    }

    spans
        .into_iter()
        .map(|span| Fragment {
            text: span.text().collect::<String>(),
            has_content: !has_class(span, placeholder),
        })
        .collect()
}

fn has_class(el: ElementRef<'_>, token: &str) -> bool {
    el.value().classes().any(|c| c == token)
}

// ── Tests ──
