//! Front-matter codec for card documents.
//!
//! A card serializes to a `---`-delimited metadata block followed by a blank
//! line and the raw body content. The parser tolerates keys in any order and
//! never fails: anything that does not look like a front-matter document is
//! treated as plain body text with a fallback title.

use chrono::DateTime;
use log::warn;

use crate::{Card, CardDraft};

/// Title given to documents that carry no parsable metadata block.
pub const FALLBACK_TITLE: &str = "Imported Note";

/// Renders a card as a front-matter document.
pub fn encode_card(card: &Card) -> String {
    let mut lines = Vec::new();
    lines.push("---".to_string());
    lines.push(format!("id: {}", card.id));
    lines.push(format!("title: {}", quote(&card.title)));
    lines.push(format!("tags: {}", encode_list(&card.tags)));
    lines.push(format!("color: {}", quote(&card.color)));
    lines.push(format!("rotation: {}", card.rotation));
    lines.push(format!("stickers: {}", encode_list(&card.stickers)));
    lines.push(format!("isPinned: {}", card.is_pinned));
    lines.push(format!("updatedAt: {}", card.updated_at.to_rfc3339()));
    lines.push("---".to_string());

    format!("{}\n\n{}", lines.join("\n"), card.content)
}

/// Parses a front-matter document back into a partial card.
///
/// When the text begins with the delimiter and a second delimiter exists,
/// the interior is parsed as key/value metadata and everything after the
/// second delimiter (trimmed) becomes the content. Otherwise the entire
/// text becomes the content of an "Imported Note".
pub fn decode_card(text: &str) -> CardDraft {
    if let Some(after_open) = text.strip_prefix("---") {
        if let Some(end) = after_open.find("---") {
            let interior = &after_open[..end];
            let content = after_open[end + 3..].trim().to_string();

            let mut draft = parse_metadata(interior);
            draft.content = Some(content);
            return draft;
        }
        warn!("Front matter block is unterminated, treating document as plain text");
    }

    CardDraft {
        title: Some(FALLBACK_TITLE.to_string()),
        tags: Some(Vec::new()),
        content: Some(text.to_string()),
        ..Default::default()
    }
}

/// Parse the interior of a metadata block. Unknown keys and unparsable
/// values are ignored rather than failing the document.
fn parse_metadata(interior: &str) -> CardDraft {
    let mut draft = CardDraft::default();

    for line in interior.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "id" => draft.id = Some(unquote(value)),
            "title" => draft.title = Some(unquote(value)),
            "color" => draft.color = Some(unquote(value)),
            "tags" => draft.tags = Some(parse_inline_list(value)),
            "stickers" => draft.stickers = Some(parse_inline_list(value)),
            "rotation" => draft.rotation = value.parse::<f64>().ok(),
            "isPinned" => {
                draft.is_pinned = match value {
                    "true" => Some(true),
                    "false" => Some(false),
                    _ => None,
                }
            }
            "updatedAt" => {
                draft.updated_at = DateTime::parse_from_rfc3339(&unquote(value))
                    .ok()
                    .map(|dt| dt.with_timezone(&chrono::Utc))
            }
            _ => {}
        }
    }

    draft
}

fn encode_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|i| quote(i)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Quote a string value, escaping characters that would break the
/// line-oriented parser so every field survives a round trip.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Remove surrounding quotes and undo the escapes applied by `quote`.
fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.len() < 2 || !s.starts_with('"') || !s.ends_with('"') {
        return s.to_string();
    }

    let inner = &s[1..s.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Parse an inline list like `["a", "b, with comma"]`, respecting quotes.
fn parse_inline_list(s: &str) -> Vec<String> {
    let s = s.trim();
    let inner = if s.starts_with('[') && s.ends_with(']') {
        &s[1..s.len() - 1]
    } else {
        s
    };

    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in inner.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => {
                current.push(c);
                escaped = true;
            }
            '"' => {
                current.push(c);
                in_string = !in_string;
            }
            ',' if !in_string => {
                let item = unquote(current.trim());
                if !item.is_empty() {
                    items.push(item);
                }
                current.clear();
            }
            _ => current.push(c),
        }
    }

    let last = unquote(current.trim());
    if !last.is_empty() {
        items.push(last);
    }

    items
}
