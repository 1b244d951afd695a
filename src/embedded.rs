//! Recovery of JSON payloads inlined next to known marker strings in page
//! markup. A truncated or malformed payload degrades to an empty object; only
//! a missing marker is reported as "nothing here" (None).

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    Curly,
    Square,
}

impl Bracket {
    fn pair(self) -> (u8, u8) {
        match self {
            Bracket::Curly => (b'{', b'}'),
            Bracket::Square => (b'[', b']'),
        }
    }
}

/// Locate `marker` in `html` and return the first balanced bracketed JSON
/// structure after it. None means the marker is absent (markers are optional
/// per page variant); an unbalanced or unparseable region yields `{}`.
pub fn json_after_marker(html: &str, marker: &str, bracket: Bracket) -> Option<Value> {
    let ix = html.find(marker)?;
    Some(first_balanced_json(&html[ix..], bracket))
}

/// Depth-balanced scan for the first `{...}` or `[...]` in `text`, parsed as
/// JSON. Anything that fails to close or parse becomes an empty object.
pub fn first_balanced_json(text: &str, bracket: Bracket) -> Value {
    let (open, close) = bracket.pair();
    let empty = Value::Object(serde_json::Map::new());

    let Some(start) = text.bytes().position(|b| b == open) else {
        return empty;
    };
    let bytes = &text.as_bytes()[start..];

    let mut depth: i64 = 1;
    let mut pos = 1;
    while depth > 0 && pos < bytes.len() {
        match bytes[pos] {
            b if b == open => depth += 1,
            b if b == close => depth -= 1,
            _ => {}
        }
        pos += 1;
    }
    if depth != 0 {
        return empty;
    }
    serde_json::from_str(&text[start..start + pos]).unwrap_or(empty)
}

// ── Tests ──
