//! Topic (hashtag) extraction from the embedded hashtag-query payload.

use tracing::debug;

use crate::embedded::{json_after_marker, Bracket};
use crate::records::TopicRecord;

// Marker anchors directly on the hashtag query object inside the page blob.
const TOPICS_MARKER: &str = r#""group_hashtags_with_filter":{"hashtag_query""#;

pub fn extract_topics(html: &str) -> Vec<TopicRecord> {
    let Some(payload) = json_after_marker(html, TOPICS_MARKER, Bracket::Curly) else {
        return Vec::new();
    };
    payload["hashtag_query"]["edges"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|edge| {
            let node = &edge["node"];
            let tag = node["tag"].as_str()?.to_string();
            let count = node["tagged_post_count"].as_u64();
            if count.is_none() {
                debug!("topic edge {tag:?} without post count skipped");
            }
            Some(TopicRecord { tag, tagged_post_count: count? })
        })
        .collect()
}

// ── Tests ──
