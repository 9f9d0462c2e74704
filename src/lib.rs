//! DoodleBoard sticky-note board library
//!
//! This library provides the board store for creating, organizing and
//! persisting sticky-note cards in folders, a Markdown front-matter codec,
//! zip archive import/export and the AI genie collaborator.

pub mod archive;
mod card;
mod cli;
mod config;
mod errors;
pub mod helper;
mod genie;
pub mod markdown;
mod store;
mod types;

// Re-export key components
pub use card::*;
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use genie::*;
pub use helper::*;
pub use store::*;
pub use types::*;
