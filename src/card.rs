//! Core data structures for the doodleboard application.
//!
//! This module contains the primary types used throughout the application,
//! including the Card and Folder structures and their randomized defaults.
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The distinguished folder that always exists and can never be deleted.
pub const DEFAULT_FOLDER_ID: &str = "default";

/// Display name given to the default folder when it is first seeded.
pub const DEFAULT_FOLDER_NAME: &str = "General";

/// Sticky-note palette used when a new card does not specify a color.
pub const CARD_PALETTE: [&str; 5] = ["#fff9c4", "#e1bee7", "#c8e6c9", "#bbdefb", "#ffccbc"];

/// Fallback color applied to cards imported without one.
pub const FALLBACK_COLOR: &str = "#fff9c4";

/// Default card dimensions applied at creation time.
pub const DEFAULT_WIDTH: f64 = 280.0;
pub const DEFAULT_HEIGHT: f64 = 320.0;

/// A named grouping of cards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Folder {
    /// Opaque unique identifier, stable for the folder's lifetime
    pub id: String,
    /// Display name, user-editable, not required to be unique
    pub name: String,
}

impl Folder {
    /// Creates a folder with a fresh unique id
    pub fn new(name: String) -> Self {
        Folder {
            id: random_id(),
            name,
        }
    }

    /// The distinguished folder seeded on first run
    pub fn default_folder() -> Self {
        Folder {
            id: DEFAULT_FOLDER_ID.to_string(),
            name: DEFAULT_FOLDER_NAME.to_string(),
        }
    }
}

/// Represents a single sticky note on the board.
///
/// Field names serialize in camelCase so the persisted records and the
/// exported front matter carry the keys `folderId`, `isPinned`, `updatedAt`.
/// Fields added after the first release carry serde defaults so records
/// written by an older schema still load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Unique identifier for the card
    pub id: String,
    /// Weak reference to the owning folder
    #[serde(default = "default_folder_id")]
    pub folder_id: String,
    /// Card title, may be empty
    pub title: String,
    /// Body content in Markdown format
    pub content: String,
    /// Tags for organization, display order preserved
    #[serde(default)]
    pub tags: Vec<String>,
    /// Display color token, opaque to the core
    pub color: String,
    /// Small display tilt in degrees
    pub rotation: f64,
    /// Decorative marker strings, toggled on and off
    #[serde(default)]
    pub stickers: Vec<String>,
    /// Pinned cards sort before unpinned ones in listings
    #[serde(default)]
    pub is_pinned: bool,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    /// Display width, set at creation only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Display height, set at creation only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Display flag, unset means expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_minimized: Option<bool>,
}

fn default_folder_id() -> String {
    DEFAULT_FOLDER_ID.to_string()
}

/// Partial card used as input to card creation and as the output of the
/// Markdown codec. Every field is optional; the store fills in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardDraft {
    pub id: Option<String>,
    pub folder_id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub color: Option<String>,
    pub rotation: Option<f64>,
    pub stickers: Option<Vec<String>>,
    pub is_pinned: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CardDraft {
    /// A draft carrying only a title, body and tags
    pub fn with_content(title: String, content: String, tags: Vec<String>) -> Self {
        CardDraft {
            title: Some(title),
            content: Some(content),
            tags: Some(tags),
            ..Default::default()
        }
    }
}

/// Produce a fresh opaque card/folder identifier
pub fn random_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Pick a color from the sticky-note palette
pub fn random_color() -> String {
    let idx = rand::thread_rng().gen_range(0..CARD_PALETTE.len());
    CARD_PALETTE[idx].to_string()
}

/// Rotation in [-3, 3] degrees, matching the hand-placed look of the board
pub fn random_rotation() -> f64 {
    rand::thread_rng().gen_range(-3.0..=3.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_rotation_in_range() {
        for _ in 0..100 {
            let r = random_rotation();
            assert!((-3.0..=3.0).contains(&r), "rotation out of range: {}", r);
        }
    }

    #[test]
    fn test_random_ids_are_unique() {
        let a = random_id();
        let b = random_id();
        assert_ne!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_random_color_from_palette() {
        let c = random_color();
        assert!(CARD_PALETTE.contains(&c.as_str()));
    }

    #[test]
    fn test_old_schema_record_loads_with_defaults() {
        // Record written before stickers/folderId/isPinned existed
        let json = r##"{
            "id": "abc123",
            "title": "Old note",
            "content": "body",
            "tags": ["legacy"],
            "color": "#ffeb3b",
            "rotation": 1.5,
            "updatedAt": "2024-01-01T00:00:00Z"
        }"##;

        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.folder_id, DEFAULT_FOLDER_ID);
        assert!(card.stickers.is_empty());
        assert!(!card.is_pinned);
        assert_eq!(card.width, None);
        assert_eq!(card.height, None);
    }
}
