//! Admin extraction in two phases: the bulk roster from the about page's
//! embedded admin list, then per-admin enrichment (contact channels, rating)
//! from the admin's own profile page.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;
use tracing::debug;

use crate::embedded::{json_after_marker, Bracket};
use crate::extract::{json_string, NON_CONTENT_CLASS};
use crate::normalize::parse_count;
use crate::records::{AdminRecord, ContactChannel, ContactInfo};
use crate::segment::fragments_by_class;

const ADMINS_MARKER: &str = "facepile_admin_profiles";
const CONTACT_INFO_MARKER: &str = "Contact info";

// Class-token chain carried by contact-info spans on profile pages.
const CONTACT_INFO_CLASSES: &[&str] = &[
    "x193iq5w", "xeuugli", "x13faqbe", "x1vvkbs", "xlh3980", "xvmahel", "x1n0sxbx",
    "x1lliihq", "x1s928wv", "xhkezso", "x1gmr53x", "x1cpjm7i", "x1fgarty", "x1943h6x",
    "x4zkp8e", "x3x7a5m", "x6prxxf", "xvq8zen", "xo1l8bm", "xzsf02u", "x1yc453h",
];

static RATING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Rating · (?P<rating>\d(\.\d+)?) \((?P<n_reviews>\d+|\d{1,3}(,\d{3})*) Reviews\)")
        .unwrap()
});
static NOT_YET_RATED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Not yet rated \((?P<n_reviews>\d+|\d{1,3}(,\d{3})*) Reviews\)").unwrap()
});

/// Bulk phase: bare {id, name} roster from the embedded admin edge list,
/// sorted by identifier for deterministic output.
pub fn roster(html: &str) -> Vec<AdminRecord> {
    let Some(payload) = json_after_marker(html, ADMINS_MARKER, Bracket::Curly) else {
        return Vec::new();
    };
    let mut admins: Vec<AdminRecord> = payload["edges"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|edge| {
            let node = &edge["node"];
            match (json_string(&node["id"]), json_string(&node["name"])) {
                (Some(id), Some(name)) => Some(AdminRecord::bare(id, name)),
                _ => {
                    debug!("admin edge without id/name skipped");
                    None
                }
            }
        })
        .collect();
    admins.sort_by(|a, b| a.id.cmp(&b.id));
    admins
}

/// Enrichment phase: fold contact channels and rating from the admin's
/// profile about-page into the record. Pages without a contact-info section
/// leave the record untouched.
pub fn enrich(admin: &mut AdminRecord, profile_html: &str) {
    if !profile_html.contains(CONTACT_INFO_MARKER) {
        return;
    }
    let doc = Html::parse_document(profile_html);
    let texts: Vec<String> =
        fragments_by_class(doc.root_element(), CONTACT_INFO_CLASSES, NON_CONTENT_CLASS)
            .into_iter()
            .map(|f| collapse_whitespace(&f.text))
            .collect();

    admin.contact_info = Some(classify_contacts(&texts));
    let (score, reviews) = rating_from_fragments(&texts);
    admin.average_score = Some(score);
    admin.n_reviews = Some(reviews);
}

/// Classify every fragment into each channel independently; buckets are not
/// mutually exclusive and all three are always present.
pub fn classify_contacts(texts: &[String]) -> ContactInfo {
    [
        (ContactChannel::Mail, is_mail as fn(&str) -> bool),
        (ContactChannel::Phone, is_phone),
        (ContactChannel::Website, is_website),
    ]
    .into_iter()
    .map(|(channel, classify)| {
        let matched: Vec<String> = texts
            .iter()
            .filter(|t| classify(t.as_str()))
            .cloned()
            .collect();
        (channel, matched)
    })
    .collect()
}

fn is_mail(text: &str) -> bool {
    text.contains('@') && text.split_whitespace().count() == 1
}

fn is_website(text: &str) -> bool {
    text.contains("http") && text.split_whitespace().count() == 1
}

fn is_phone(text: &str) -> bool {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    !cleaned.is_empty() && cleaned.chars().all(|c| c.is_ascii_digit())
}

/// First fragment matching one of the two fixed rating patterns wins;
/// no match at all means an unrated profile.
pub fn rating_from_fragments(texts: &[String]) -> (f64, u64) {
    for text in texts {
        if let Some(caps) = RATING_RE.captures(text) {
            let score = caps["rating"].parse().unwrap_or(0.0);
            let reviews = parse_count(&caps["n_reviews"]).unwrap_or(0);
            return (score, reviews);
        }
        if let Some(caps) = NOT_YET_RATED_RE.captures(text) {
            let reviews = parse_count(&caps["n_reviews"]).unwrap_or(0);
            return (0.0, reviews);
        }
    }
    (0.0, 0)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Tests ──
