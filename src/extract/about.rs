//! Group about-page extraction. Everything here degrades per field: a page
//! where one heuristic misses still yields a partial record.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use crate::embedded::{json_after_marker, Bracket};
use crate::error::ExtractError;
use crate::extract::admins;
use crate::normalize::{parse_count, parse_loose_date};
use crate::records::GroupRecord;

// The disclosure sentence only public groups carry.
const PUBLIC_SENTENCE: &str = "Anyone can see who's in the group and what they post";
const NO_NEW_MEMBERS: &str = "No new members in the last week";
const LOCATIONS_MARKER: &str = "group_locations";

static MEMBERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"dir="auto">\s*(?P<number>\S+) total members"#).unwrap());
static CREATION_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Group created on (?P<date>.*? 20\d\d)").unwrap());
static POSTS_LAST_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<posts>\d{1,3}(,\d{3})*(\.\d+)?)\s*<!-- -->\s* in the last month").unwrap()
});
static NEW_MEMBERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""group_new_members_info_text":"(?P<text>.*?)""#).unwrap());

static META_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="description"]"#).unwrap());
static META_IMAGE_ALT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:image:alt"]"#).unwrap());

const DAYS_PER_MONTH: f64 = 30.0;

/// Build a group record from one about-page fetch. The caller fills in
/// name/link afterwards; private pages produce the minimal record.
pub fn extract(html: &str) -> GroupRecord {
    let doc = Html::parse_document(html);
    let mut record = GroupRecord {
        description: description(&doc),
        ..Default::default()
    };

    if !html.contains(PUBLIC_SENTENCE) {
        record.is_private = true;
        return record;
    }
    record.is_private = false;

    record.members = Some(members(html));
    record.creation_date = match creation_date(html) {
        Ok(date) => Some(date),
        Err(e) => {
            debug!("creation date unavailable: {e}");
            None
        }
    };
    record.admins = Some(admins::roster(html));
    record.posts_frequency = Some(monthly_posts_frequency(html));
    record.weekly_new = Some(weekly_new_members(html));
    record.locations = Some(locations(html));
    record
}

/// The longer of the two meta-attribute candidates; the longer string is
/// assumed to carry more signal.
fn description(doc: &Html) -> Option<String> {
    let content = |sel: &Selector| {
        doc.select(sel)
            .next()
            .and_then(|el| el.value().attr("content"))
            .unwrap_or("")
            .to_string()
    };
    let candidates = [content(&META_DESCRIPTION), content(&META_IMAGE_ALT)];
    candidates.into_iter().max_by_key(String::len)
}

fn members(html: &str) -> u64 {
    MEMBERS_RE
        .captures(html)
        .and_then(|caps| match parse_count(&caps["number"]) {
            Ok(n) => Some(n),
            Err(e) => {
                debug!("member count unreadable: {e}");
                None
            }
        })
        .unwrap_or(0)
}

fn creation_date(html: &str) -> Result<NaiveDate, ExtractError> {
    let caps = CREATION_DATE_RE
        .captures(html)
        .ok_or(ExtractError::DateNotFound)?;
    parse_loose_date(&caps["date"]).ok_or(ExtractError::DateNotFound)
}

fn monthly_posts_frequency(html: &str) -> f64 {
    let Some(caps) = POSTS_LAST_MONTH_RE.captures(html) else {
        return 0.0;
    };
    match parse_count(&caps["posts"]) {
        Ok(amount) => amount as f64 / DAYS_PER_MONTH,
        Err(e) => {
            debug!("post frequency unreadable: {e}");
            0.0
        }
    }
}

fn weekly_new_members(html: &str) -> f64 {
    let Some(caps) = NEW_MEMBERS_RE.captures(html) else {
        return 0.0;
    };
    let text = &caps["text"];
    if text == NO_NEW_MEMBERS {
        return 0.0;
    }
    text.replace(',', "").parse().unwrap_or_else(|_| {
        debug!("new-member count unreadable: {text:?}");
        0.0
    })
}

/// Sorted, deduplicated location names from the embedded location list.
fn locations(html: &str) -> Vec<String> {
    let Some(payload) = json_after_marker(html, LOCATIONS_MARKER, Bracket::Square) else {
        return Vec::new();
    };
    let mut names: Vec<String> = payload
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|item| item["name"].as_str().map(str::to_string))
        .collect();
    names.sort();
    names.dedup();
    names
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{name}.html")).unwrap()
    }

    #[test]
    fn public_about_page() {
        let html = fixture("testgroup_about");
        let record = extract(&html);
        assert!(!record.is_private);
        assert_eq!(record.members, Some(3674));
        assert_eq!(
            record.creation_date,
            NaiveDate::from_ymd_opt(2023, 3, 12)
        );
        assert_eq!(record.posts_frequency, Some(1234.0 / 30.0));
        assert_eq!(record.weekly_new, Some(56.0));
        assert_eq!(
            record.locations.as_deref(),
            Some(&["Athens".to_string(), "Tel Aviv".to_string()][..])
        );

        let admins = record.admins.unwrap();
        assert_eq!(admins.len(), 2);
        // Roster sorted by identifier for deterministic output
        assert_eq!(admins[0].id, "042");
        assert_eq!(admins[1].name, "Alice Example");

        assert!(record.description.unwrap().contains("buy and sell"));
    }

    #[test]
    fn private_about_page_is_minimal() {
        let html = fixture("hiddengroup_about");
        let record = extract(&html);
        assert!(record.is_private);
        assert!(record.description.is_some());
        assert_eq!(record.members, None);
        assert_eq!(record.creation_date, None);
        assert_eq!(record.admins, None);
        assert_eq!(record.locations, None);
    }

    #[test]
    fn missing_signals_degrade_to_defaults() {
        let html = format!("<html><body>{PUBLIC_SENTENCE}</body></html>");
        let record = extract(&html);
        assert!(!record.is_private);
        assert_eq!(record.members, Some(0));
        assert_eq!(record.creation_date, None);
        assert_eq!(record.admins.as_deref(), Some(&[][..]));
        assert_eq!(record.posts_frequency, Some(0.0));
        assert_eq!(record.weekly_new, Some(0.0));
        assert_eq!(record.locations.as_deref(), Some(&[][..]));
    }

    #[test]
    fn no_new_members_sentence_maps_to_zero() {
        let html = format!(
            r#"{PUBLIC_SENTENCE} "group_new_members_info_text":"{NO_NEW_MEMBERS}""#
        );
        let record = extract(&html);
        assert_eq!(record.weekly_new, Some(0.0));
    }

    #[test]
    fn description_prefers_longer_candidate() {
        let html = r#"<html><head>
            <meta name="description" content="short"/>
            <meta property="og:image:alt" content="a much longer alt text"/>
        </head><body></body></html>"#;
        let record = extract(html);
        assert_eq!(record.description.as_deref(), Some("a much longer alt text"));
    }
}
