//! Zip archive export/import of card documents.
//!
//! An archive bundles one front-matter markdown document per card. Entries
//! are decoded independently on import: one torn entry never aborts the
//! batch, but an archive that cannot be opened at all fails as a whole.

use std::io::{Cursor, Read, Write};

use chrono::Utc;
use log::{debug, info, warn};
use zip::{write::FileOptions, ZipArchive, ZipWriter};

use crate::{
    helper::sanitize_title,
    markdown::{decode_card, encode_card},
    random_id, random_rotation, BoardError, Card, Result, FALLBACK_COLOR,
};

/// Length of the id prefix appended to entry filenames to avoid collisions
/// between cards with the same title.
const ID_PREFIX_LEN: usize = 8;

/// Entry title used when an imported document carries none.
const UNTITLED: &str = "Untitled";

/// Encodes each card to a markdown document and bundles them into an
/// in-memory zip archive.
pub fn export_cards(cards: &[Card]) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);

    for card in cards {
        let options = FileOptions::<zip::write::ExtendedFileOptions>::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        zip.start_file(entry_filename(card), options)?;
        zip.write_all(encode_card(card).as_bytes())
            .map_err(BoardError::Io)?;
    }

    zip.finish()?;

    info!("Exported {} cards to archive", cards.len());
    Ok(buffer.into_inner())
}

/// Filename for a card's archive entry: sanitized title plus an id prefix.
fn entry_filename(card: &Card) -> String {
    let prefix: String = card.id.chars().take(ID_PREFIX_LEN).collect();
    format!("{}-{}.md", sanitize_title(&card.title), prefix)
}

/// Decodes every markdown/text entry of the archive into a card destined
/// for the given folder.
///
/// An unreadable archive is a single hard failure with no partial import.
/// Individual entries that cannot be read are skipped with a warning. Every
/// imported card gets a fresh id regardless of what its document claims,
/// and missing metadata is filled with import defaults.
pub fn import_archive(data: &[u8], folder_id: &str) -> Result<Vec<Card>> {
    let cursor = Cursor::new(data);
    let mut archive = ZipArchive::new(cursor).map_err(|e| BoardError::ArchiveFailed {
        message: format!("Failed to open archive: {}", e),
    })?;

    let mut cards = Vec::new();

    for i in 0..archive.len() {
        let mut entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable archive entry {}: {}", i, e);
                continue;
            }
        };

        let name = entry.name().to_string();
        if entry.is_dir() || !(name.ends_with(".md") || name.ends_with(".txt")) {
            debug!("Skipping non-document entry: {}", name);
            continue;
        }

        let mut text = String::new();
        if let Err(e) = entry.read_to_string(&mut text) {
            warn!("Skipping entry {}: {}", name, e);
            continue;
        }

        let draft = decode_card(&text);
        cards.push(Card {
            id: random_id(),
            folder_id: folder_id.to_string(),
            title: draft.title.unwrap_or_else(|| UNTITLED.to_string()),
            content: draft.content.unwrap_or_default(),
            tags: draft.tags.unwrap_or_default(),
            color: draft.color.unwrap_or_else(|| FALLBACK_COLOR.to_string()),
            rotation: draft.rotation.unwrap_or_else(random_rotation),
            stickers: draft.stickers.unwrap_or_default(),
            is_pinned: draft.is_pinned.unwrap_or(false),
            updated_at: draft.updated_at.unwrap_or_else(Utc::now),
            width: None,
            height: None,
            is_minimized: None,
        });
    }

    info!("Imported {} cards from archive", cards.len());
    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::FALLBACK_TITLE;
    use crate::DEFAULT_FOLDER_ID;

    fn test_options() -> FileOptions<'static, zip::write::ExtendedFileOptions> {
        FileOptions::default()
    }

    fn sample_card(id: &str, title: &str) -> Card {
        Card {
            id: id.to_string(),
            folder_id: DEFAULT_FOLDER_ID.to_string(),
            title: title.to_string(),
            content: "body text".to_string(),
            tags: vec!["a".to_string()],
            color: "#c8e6c9".to_string(),
            rotation: 1.25,
            stickers: vec![],
            is_pinned: false,
            updated_at: Utc::now(),
            width: None,
            height: None,
            is_minimized: None,
        }
    }

    #[test]
    fn test_export_then_import_round_trips_documents() {
        let cards = vec![
            sample_card("aaaa1111bbbb", "First"),
            sample_card("cccc2222dddd", "Second"),
        ];

        let bytes = export_cards(&cards).unwrap();
        let imported = import_archive(&bytes, "target-folder").unwrap();

        assert_eq!(imported.len(), 2);
        for (orig, copy) in cards.iter().zip(&imported) {
            assert_eq!(copy.title, orig.title);
            assert_eq!(copy.content, orig.content);
            assert_eq!(copy.tags, orig.tags);
            assert_eq!(copy.color, orig.color);
            assert_eq!(copy.folder_id, "target-folder");
            // Fresh ids are always assigned on import
            assert_ne!(copy.id, orig.id);
        }
    }

    #[test]
    fn test_entry_filenames_are_sanitized_and_suffixed() {
        let card = sample_card("abcdefghij", "My Note!");
        assert_eq!(entry_filename(&card), "My_Note_-abcdefgh.md");

        let symbols = sample_card("abcdefghij", "⭐!⭐");
        assert_eq!(entry_filename(&symbols), "untitled-abcdefgh.md");
    }

    #[test]
    fn test_malformed_entry_does_not_abort_the_batch() {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);

        // Delimiter present but never terminated
        let torn = "---\ntitle: \"torn\"\nno end in sight";
        zip.start_file("torn.md", test_options()).unwrap();
        zip.write_all(torn.as_bytes()).unwrap();

        zip.start_file("fine.md", test_options()).unwrap();
        zip.write_all(b"---\ntitle: \"fine\"\n---\n\nok").unwrap();
        zip.finish().unwrap();

        let cards = import_archive(&buffer.into_inner(), DEFAULT_FOLDER_ID).unwrap();
        assert_eq!(cards.len(), 2);

        let torn_card = cards.iter().find(|c| c.title == FALLBACK_TITLE).unwrap();
        assert_eq!(torn_card.content, torn);
        assert!(torn_card.tags.is_empty());

        assert!(cards.iter().any(|c| c.title == "fine"));
    }

    #[test]
    fn test_non_document_entries_are_skipped() {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);

        zip.start_file("image.png", test_options()).unwrap();
        zip.write_all(&[0x89, 0x50, 0x4e, 0x47]).unwrap();
        zip.start_file("note.txt", test_options()).unwrap();
        zip.write_all(b"plain text note").unwrap();
        zip.finish().unwrap();

        let cards = import_archive(&buffer.into_inner(), DEFAULT_FOLDER_ID).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].content, "plain text note");
    }

    #[test]
    fn test_unopenable_archive_is_a_single_failure() {
        let result = import_archive(b"this is not a zip file", DEFAULT_FOLDER_ID);
        assert!(matches!(result, Err(BoardError::ArchiveFailed { .. })));
    }

    #[test]
    fn test_import_defaults_for_sparse_documents() {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        zip.start_file("sparse.md", test_options()).unwrap();
        zip.write_all(b"---\ntitle: \"only a title\"\n---\n\nhello")
            .unwrap();
        zip.finish().unwrap();

        let cards = import_archive(&buffer.into_inner(), DEFAULT_FOLDER_ID).unwrap();
        let card = &cards[0];
        assert_eq!(card.color, FALLBACK_COLOR);
        assert!((-3.0..=3.0).contains(&card.rotation));
        assert!(!card.is_pinned);
        assert!(card.stickers.is_empty());
        assert!(!card.id.is_empty());
    }
}
