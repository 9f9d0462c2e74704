use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use which::which;

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Directory holding the persisted board records
    pub data_dir: PathBuf,

    /// Model used by the genie collaborator
    pub genie_model: String,

    /// API key for the genie collaborator (usually from GEMINI_API_KEY)
    pub genie_api_key: Option<String>,

    /// Default editor command (overrides $EDITOR)
    pub editor_command: Option<String>,
}

impl Config {
    /// Filename of the persisted cards record
    pub const CARDS_RECORD: &'static str = "cards.json";

    /// Filename of the persisted folders record
    pub const FOLDERS_RECORD: &'static str = "folders.json";

    pub fn cards_path(&self) -> PathBuf {
        self.data_dir.join(Self::CARDS_RECORD)
    }

    pub fn folders_path(&self) -> PathBuf {
        self.data_dir.join(Self::FOLDERS_RECORD)
    }

    // This method provides smart fallbacks when no editor is configured
    pub fn get_editor_command(&self) -> String {
        // First try the configured editor
        if let Some(editor) = &self.editor_command {
            return editor.clone();
        }

        // Then try environment variable
        if let Ok(editor) = std::env::var("EDITOR") {
            return editor;
        }

        // Fall back to platform defaults
        if cfg!(windows) {
            "notepad".to_string()
        } else if cfg!(target_os = "macos") {
            "open -t".to_string()
        } else {
            // Try common Linux editors
            for editor in &["nano", "vim", "vi", "emacs"] {
                if which(editor).is_ok() {
                    return editor.to_string();
                }
            }
            "nano".to_string()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("doodleboard");

        Config {
            data_dir,
            genie_model: "gemini-2.5-flash".to_string(),
            genie_api_key: std::env::var("GEMINI_API_KEY").ok(),
            editor_command: None,
        }
    }
}
