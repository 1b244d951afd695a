pub mod about;
pub mod admins;
pub mod posts;
pub mod topics;

/// Presentation class marking a span with no real textual content (icon-only
/// spans and similar decoration).
pub(crate) const NON_CONTENT_CLASS: &str = "xi81zsa";

/// Best-effort string out of a JSON value: embedded payloads are inconsistent
/// about quoting identifiers.
pub(crate) fn json_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
