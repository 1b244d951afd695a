//! Featured-post extraction. Each post container is handled independently;
//! any post whose fragments do not line up with the heuristics is dropped and
//! the rest of the feed still comes through.

use std::sync::LazyLock;

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::extract::NON_CONTENT_CLASS;
use crate::normalize::{parse_count, parse_post_date};
use crate::records::PostRecord;
use crate::segment::{fragments_by_class, Fragment};

// Full class chain of a post container div.
const POST_CONTAINER_SELECTOR: &str = "div.x9f619.x1n2onr6.x1ja2u2z.x2bj2ny.x1qpq9i9.\
     xdney7k.xu5ydu1.xt3gfkd.xh8yej3.x6ikm8r.x10wlt62.xquyuld";

// Caption spans carry this token chain inside the container.
const CAPTION_CLASSES: &[&str] = &[
    "x193iq5w", "xeuugli", "x13faqbe", "x1vvkbs", "xlh3980", "xvmahel", "x1n0sxbx",
];

const SHARED_LINK_SUFFIX: &str = " shared a link";
const COMMENTS_SUFFIX: &str = "Comments";
const SHARES_SUFFIX: &str = "Shares";
const VIEW_PREFIX: &str = "View";

static POST_CONTAINER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(POST_CONTAINER_SELECTOR).unwrap());
static LIKES_BADGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.x16hj40l").unwrap());

/// Extract every recognizable post from a featured-section page, in document
/// order. `today` anchors relative timestamps.
pub fn extract_posts(html: &str, today: NaiveDate) -> Vec<PostRecord> {
    let doc = Html::parse_document(html);
    doc.select(&POST_CONTAINER)
        .enumerate()
        .filter_map(|(i, el)| {
            let post = extract_post(el, today);
            if post.is_none() {
                debug!("post element {i} skipped (no usable signal)");
            }
            post
        })
        .collect()
}

fn extract_post(el: ElementRef<'_>, today: NaiveDate) -> Option<PostRecord> {
    let fragments = fragments_by_class(el, CAPTION_CLASSES, NON_CONTENT_CLASS);
    let likes_text = el
        .select(&LIKES_BADGE)
        .next()
        .map(|span| span.text().collect::<String>());
    post_from_fragments(&fragments, likes_text.as_deref(), today)
}

/// Core positional heuristic over the segmented caption fragments. Pure so
/// the fragment conventions can be pinned down in tests without markup.
pub fn post_from_fragments(
    fragments: &[Fragment],
    likes_text: Option<&str>,
    today: NaiveDate,
) -> Option<PostRecord> {
    let texts: Vec<&str> = fragments
        .iter()
        .map(|f| f.text.as_str())
        .filter(|t| !t.is_empty())
        .collect();
    if texts.is_empty() {
        return None;
    }

    // Fragment 0 is the author; shared-link posts append a suffix to the name
    // and push the timestamp one fragment later.
    let mut date_ix = 1;
    let mut name = texts[0];
    if name.contains(SHARED_LINK_SUFFIX) {
        name = name.split(SHARED_LINK_SUFFIX).next().unwrap_or(name);
        date_ix = 2;
    }

    // Some renderings fuse author and timestamp into the header fragment
    // ("Alice · 3d"); fall back to it when the expected slot has no date.
    let mut date = texts
        .get(date_ix)
        .and_then(|t| parse_post_date(t, today));
    if date.is_none() {
        if let Some(fused) = parse_post_date(texts[0], today) {
            let head = texts[0].split('·').next().unwrap_or(texts[0]);
            name = head.split(SHARED_LINK_SUFFIX).next().unwrap_or(head);
            date_ix = 0;
            date = Some(fused);
        }
    }
    // A post without a date is not a post we can report.
    let date = date?;
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");

    let (text, n_comments, n_shares) = match engagement_indices(&texts) {
        (Some(comments_ix), shares_ix) => {
            let body = texts.get(date_ix + 1..comments_ix).unwrap_or_default().concat();
            let n_comments = parse_count(texts[comments_ix].split_whitespace().next()?).ok()?;
            let n_shares = match shares_ix {
                Some(ix) => parse_count(texts[ix].split_whitespace().next()?).ok()?,
                None => 0,
            };
            (body, n_comments, n_shares)
        }
        (None, _) => {
            let body = fragments
                .iter()
                .filter(|f| f.has_content)
                .map(|f| f.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            (body, 0, 0)
        }
    };

    let n_likes = likes_text
        .and_then(|t| parse_count(t).ok())
        .unwrap_or(0);

    Some(PostRecord {
        user_name: name,
        date_posted: date,
        text,
        n_comments,
        n_shares,
        n_likes,
    })
}

/// Find the "N Comments" fragment whose successor is either "M Shares" or a
/// "View …" affordance (the latter means zero shares).
fn engagement_indices(texts: &[&str]) -> (Option<usize>, Option<usize>) {
    for i in 0..texts.len().saturating_sub(1) {
        if texts[i].split_whitespace().last() != Some(COMMENTS_SUFFIX) {
            continue;
        }
        let next: Vec<&str> = texts[i + 1].split_whitespace().collect();
        if next.last() == Some(&SHARES_SUFFIX) {
            return (Some(i), Some(i + 1));
        }
        if next.first() == Some(&VIEW_PREFIX) {
            return (Some(i), None);
        }
    }
    (None, None)
}

// ── Tests ──
