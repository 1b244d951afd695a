use std::sync::LazyLock;

use chrono::{Duration, NaiveDate};
use regex::Regex;

use crate::error::ExtractError;

pub const GROUP_LINK_PREFIX: &str = "https://www.facebook.com/groups/";
pub const PROFILE_LINK_PREFIX: &str = "https://www.facebook.com/";

/// All output dates use this shape.
pub const DATE_FMT: &str = "%d/%m/%Y";

static GROUP_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(https?://)?(www\.)?facebook\.com/groups/(?P<name>[^/)]*)/?").unwrap()
});
static RELATIVE_DAYS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?P<days>\d+)d\s*$").unwrap());

// The reserved path segment for group-category listing pages, which look like
// group links but are not groups.
const CATEGORY_SEGMENT: &str = "category";

/// Parse a locale-formatted count like "3,674". Anything left over after
/// stripping grouping commas must be digits.
pub fn parse_count(s: &str) -> Result<u64, ExtractError> {
    s.trim()
        .replace(',', "")
        .parse::<u64>()
        .map_err(|_| ExtractError::MalformedNumber(s.to_string()))
}

/// Free-form date parse, tried against the formats the site actually emits.
/// Returns None when nothing matches.
pub fn parse_loose_date(s: &str) -> Option<NaiveDate> {
    const FORMATS: &[&str] = &[
        "%d %B %Y",
        "%d %b %Y",
        "%B %d, %Y",
        "%b %d, %Y",
        "%B %d %Y",
        "%b %d %Y",
        "%Y-%m-%d",
        "%d/%m/%Y",
    ];
    let trimmed = s.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

/// Parse a post timestamp fragment like "Alice · 3d" or "Bob · 12 March 2023".
/// No "·" separator means the fragment is not a dated line at all.
pub fn parse_post_date(text: &str, today: NaiveDate) -> Option<String> {
    let rest = text.split('·').nth(1)?;
    if let Some(caps) = RELATIVE_DAYS_RE.captures(rest) {
        let days: i64 = caps["days"].parse().ok()?;
        return Some(format_date(today - Duration::days(days)));
    }
    parse_loose_date(rest).map(format_date)
}

/// Pull the group name out of any group-URL variant (post permalinks,
/// scheme-less links, trailing junk).
pub fn group_name_from_link(link: &str) -> Option<String> {
    GROUP_LINK_RE
        .captures(link)
        .map(|caps| caps["name"].to_string())
}

/// Canonicalize a link to `https://www.facebook.com/groups/<name>/`.
/// Category listing links have no canonical group form.
pub fn canonical_group_link(link: &str) -> Option<String> {
    let name = group_name_from_link(link)?;
    if name.is_empty() || name == CATEGORY_SEGMENT {
        return None;
    }
    Some(format!("{}{}/", GROUP_LINK_PREFIX, name))
}

// ── Tests ──
