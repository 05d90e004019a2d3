//! Shared utility functions

use quick_xml::escape::unescape;
use std::collections::HashSet;

/// Truncate a string to a maximum length, appending "..." if truncated.
/// Handles multi-byte characters by finding a valid char boundary.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let suffix = "...";
    let target = max_len.saturating_sub(suffix.len());
    // Find a valid char boundary at or before target
    let mut end = target;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &s[..end], suffix)
}

/// Parse an integer field, yielding `None` instead of failing.
pub fn parse_int(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    digits.parse().ok()
}

/// Parse a reference to another record. Negative values are the exporter's
/// "no reference" sentinel and map to `None`.
pub fn parse_ref(raw: &str) -> Option<i32> {
    parse_int(raw).filter(|id| *id >= 0)
}

/// Decode the raw bytes of a text run into a trimmed, entity-unescaped string.
///
/// Invalid UTF-8 is replaced lossily; an invalid escape keeps the raw text.
pub fn decode_text(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let trimmed = text.trim();
    if !trimmed.contains('&') {
        return trimmed.to_string();
    }
    match unescape(trimmed) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => trimmed.to_string(),
    }
}

/// Set of ids that remembers insertion order
#[derive(Debug, Clone, Default)]
pub struct IdSet {
    ids: Vec<i32>,
    seen: HashSet<i32>,
}

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` unless already present. Returns whether it was added.
    pub fn insert(&mut self, id: i32) -> bool {
        let added = self.seen.insert(id);
        if added {
            self.ids.push(id);
        }
        added
    }

    pub fn contains(&self, id: i32) -> bool {
        self.seen.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn into_vec(self) -> Vec<i32> {
        self.ids
    }
}

/// Strip markup fragments out of a skill name.
///
/// Removes `<...>` fragments and their escaped `&lt;...&gt;` form, including
/// unterminated ones that run to the end of the value.
pub fn sanitize_skill(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("&lt;") {
            rest = match after.find("&gt;") {
                Some(end) => &after[end + "&gt;".len()..],
                None => "",
            };
        } else if let Some(after) = rest.strip_prefix('<') {
            rest = match after.find('>') {
                Some(end) => &after[end + 1..],
                None => "",
            };
        } else if let Some(after) = rest.strip_prefix("&gt;") {
            rest = after;
        } else if let Some(after) = rest.strip_prefix('>') {
            rest = after;
        } else {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
    }

    out.trim().to_string()
}
