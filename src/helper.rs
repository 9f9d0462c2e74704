use std::{fs, io::Write, path::Path};

use log::{debug, error, trace};
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;

use crate::{BoardError, Result};

/// Serializes a whole collection record to disk using an atomic
/// write-then-rename so a crash mid-write never corrupts the record.
pub fn write_record<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    debug!("Writing record: {}", path.display());

    // Ensure the parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                error!("Failed to create directory {}: {}", parent.display(), e);
                BoardError::DirectoryError {
                    path: parent.to_path_buf(),
                }
            })?;
        }
    }

    // Create a temporary file in the same directory (for atomic rename)
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
        error!("Failed to create temporary file: {}", e);
        BoardError::Io(e)
    })?;

    let json = serde_json::to_string_pretty(value)?;
    temp_file.write_all(json.as_bytes()).map_err(|e| {
        error!("Failed to write to temporary file: {}", e);
        BoardError::Io(e)
    })?;
    temp_file.flush().map_err(BoardError::Io)?;

    temp_file.persist(path).map_err(|e| {
        error!("Failed to persist record {}: {}", path.display(), e.error);
        BoardError::Io(e.error)
    })?;

    trace!("Record written: {}", path.display());
    Ok(())
}

/// Reads a whole collection record from disk.
///
/// Returns `Ok(None)` when the record does not exist yet and `Err` when it
/// exists but cannot be read or parsed; the caller decides whether a corrupt
/// record is fatal (the board store falls back to seed data).
pub fn read_record<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        error!("Failed to read record {}: {}", path.display(), e);
        BoardError::Io(e)
    })?;

    let value = serde_json::from_str(&content)?;
    Ok(Some(value))
}

/// Helper for parsing comma-separated tag arguments
pub fn parse_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Derives an archive entry filename stem from a card title.
///
/// Non-alphanumeric characters become underscores; a title with no
/// alphanumerics at all falls back to "untitled".
pub fn sanitize_title(title: &str) -> String {
    if !title.chars().any(|c| c.is_ascii_alphanumeric()) {
        return "untitled".to_string();
    }

    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!(
            parse_tags(Some("a, b ,,c".to_string())),
            vec!["a", "b", "c"]
        );
        assert!(parse_tags(None).is_empty());
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("Shopping List!"), "Shopping_List_");
        assert_eq!(sanitize_title(""), "untitled");
        assert_eq!(sanitize_title("⭐⭐⭐"), "untitled");
        assert_eq!(sanitize_title("plain"), "plain");
    }

    #[test]
    fn test_record_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.json");

        let data = vec!["one".to_string(), "two".to_string()];
        write_record(&path, &data).unwrap();

        let loaded: Option<Vec<String>> = read_record(&path).unwrap();
        assert_eq!(loaded, Some(data));
    }

    #[test]
    fn test_read_record_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded: Option<Vec<String>> = read_record(&dir.path().join("nope.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_read_record_corrupt_is_err() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();

        let loaded: Result<Option<Vec<String>>> = read_record(&path);
        assert!(loaded.is_err());
    }
}
