//! Shared types for the doodleboard application.
//!
//! This module holds the Result alias, the save-status indicator exposed by
//! the board store, the CLI command tree and operation summaries.
use std::path::PathBuf;

use clap::Subcommand;

use crate::BoardError;

/// A specialized Result type for doodleboard operations.
pub type Result<T> = std::result::Result<T, BoardError>;

/// Persistence status exposed by the board store.
///
/// `Saving` is reported for a short fixed window after a write is issued,
/// then the status settles back to `Saved`. By the time it settles, storage
/// reflects the latest in-memory state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saving,
    Saved,
}

impl std::fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveStatus::Saving => write!(f, "Saving..."),
            SaveStatus::Saved => write!(f, "Saved"),
        }
    }
}

/// Summary of an archive or directory import operation
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    /// Total entries examined
    pub total_entries: usize,
    /// Cards successfully added to the board
    pub imported: usize,
    /// Entries skipped (wrong extension, unreadable)
    pub skipped: usize,
}

/// Available subcommands for the doodleboard application
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new card
    New {
        /// Title of the card
        #[clap(short = 'T', long)]
        title: String,

        /// Content of the card, can be markdown formatted
        #[clap(short, long)]
        content: Option<String>,

        /// Folder to place the card in (defaults to the General folder)
        #[clap(short = 'F', long)]
        folder: Option<String>,

        /// Tags to associate with the card (comma-separated)
        #[clap(short = 't', long)]
        tags: Option<String>,

        /// Path to a file containing the card's content
        #[clap(short, long)]
        file: Option<PathBuf>,

        /// Skip opening the editor when no content is given
        #[clap(long)]
        no_editor: bool,
    },

    /// View a card by ID
    View {
        /// ID of the card to view
        id: String,

        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,
    },

    /// List cards, pinned first
    List {
        /// Show only cards in this folder
        #[clap(short = 'F', long)]
        folder: Option<String>,

        /// Filter cards by tag
        #[clap(short, long)]
        tag: Option<String>,

        /// Limit the number of cards returned (0 for no limit)
        #[clap(short = 'n', long, default_value_t = 0)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,

        /// Show full content instead of a preview
        #[clap(short, long)]
        detailed: bool,
    },

    /// Search cards by title or content
    Search {
        /// Search query text
        query: String,

        /// Limit the number of search results (0 for no limit)
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Edit an existing card
    Edit {
        /// ID of the card to edit
        id: String,

        /// New title for the card
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// New content for the card
        #[clap(short, long)]
        content: Option<String>,

        /// Open content in editor before saving
        #[clap(short, long)]
        edit: bool,

        /// Replacement tags (comma-separated)
        #[clap(short = 't', long)]
        tags: Option<String>,

        /// Path to a file containing the new card content
        #[clap(short, long)]
        file: Option<PathBuf>,
    },

    /// Delete a card by ID
    Delete {
        /// ID of the card to delete
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Move a card into a different folder
    Move {
        /// ID of the card to move
        id: String,

        /// Target folder ID
        folder: String,
    },

    /// Toggle the pinned flag on a card
    Pin {
        /// ID of the card to pin or unpin
        id: String,
    },

    /// Toggle a sticker on a card
    Sticker {
        /// ID of the card to decorate
        id: String,

        /// Sticker marker string, e.g. an emoji
        sticker: String,
    },

    /// Move a card to another card's position in the board ordering
    Reorder {
        /// ID of the card to move
        id: String,

        /// ID of the card whose position to take
        before: String,
    },

    /// Folder operations
    Folder {
        #[clap(subcommand)]
        action: FolderAction,
    },

    /// Import cards from a zip archive, a markdown file or a directory
    Import {
        /// Path to the zip archive, file or directory to import from
        source: PathBuf,

        /// Folder to import the cards into (defaults to the General folder)
        #[clap(short = 'F', long)]
        folder: Option<String>,

        /// Glob pattern filter when importing from a directory
        #[clap(short, long)]
        pattern: Option<String>,

        /// Recurse into subdirectories when importing from a directory
        #[clap(short, long)]
        recursive: bool,
    },

    /// Export cards to a zip archive of markdown documents
    Export {
        /// Path where the archive will be written
        #[clap(short, long)]
        output: PathBuf,

        /// Export only cards in this folder
        #[clap(short = 'F', long)]
        folder: Option<String>,
    },

    /// Ask the genie to brainstorm a new card
    Genie {
        /// Topic to brainstorm about
        topic: String,

        /// Folder to place the generated card in
        #[clap(short = 'F', long)]
        folder: Option<String>,
    },

    /// Ask the genie to polish a card's content
    Polish {
        /// ID of the card to polish
        id: String,

        /// Polish mode
        #[clap(short, long, value_parser = ["fix", "expand", "tone"], default_value = "fix")]
        mode: String,
    },
}

/// Folder subcommands
#[derive(Subcommand)]
pub enum FolderAction {
    /// List all folders
    List,

    /// Create a new folder
    Add {
        /// Name for the new folder
        name: String,
    },

    /// Delete a folder, moving its cards to the General folder
    Delete {
        /// ID of the folder to delete
        id: String,
    },

    /// Rename a folder
    Rename {
        /// ID of the folder to rename
        id: String,

        /// New folder name
        name: String,
    },
}
