//! CLI module for the doodleboard application
//!
//! This module handles the command-line interface for interacting with the
//! board store, playing the role of the UI collaborator: it renders
//! snapshots, collects input and calls the store's mutation operations.
use std::{
    fs::{read_to_string, OpenOptions},
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
    process::Command,
};

use log::{info, warn};
use shell_words::split;
use tempfile::Builder;

use crate::{
    archive::{export_cards, import_archive},
    markdown::{decode_card, FALLBACK_TITLE},
    parse_tags, BoardError, BoardStore, Card, CardDraft, Commands, Config, FolderAction,
    GenieClient, ImportSummary, PolishMode, Result, DEFAULT_FOLDER_ID,
};

/// CLI application handler - processes commands against the board store
pub struct App {
    /// The board store backend
    store: BoardStore,

    /// AI collaborator for brainstorm/polish
    genie: GenieClient,

    /// Application configuration
    config: Config,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    /// Create a new CLI application with the given store and config
    pub fn new(store: BoardStore, config: Config, verbose: bool) -> Self {
        let genie = GenieClient::new(&config);
        Self {
            store,
            genie,
            config,
            verbose,
        }
    }

    /// Run the CLI application with the given command
    pub async fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::New {
                title,
                content,
                folder,
                tags,
                file,
                no_editor,
            } => self.handle_new(title, content, folder, tags, file, no_editor)?,

            Commands::View { id, json } => self.handle_view(&id, json)?,

            Commands::List {
                folder,
                tag,
                limit,
                json,
                detailed,
            } => self.handle_list(folder, tag, limit, json, detailed)?,

            Commands::Search { query, limit, json } => self.handle_search(&query, limit, json)?,

            Commands::Edit {
                id,
                title,
                content,
                edit,
                tags,
                file,
            } => self.handle_edit(id, title, content, edit, tags, file)?,

            Commands::Delete { id, force } => self.handle_delete(&id, force)?,

            Commands::Move { id, folder } => self.handle_move(&id, &folder)?,

            Commands::Pin { id } => {
                self.store.toggle_pin(&id)?;
                self.report_card_flag(&id, |c| {
                    if c.is_pinned {
                        "pinned".to_string()
                    } else {
                        "unpinned".to_string()
                    }
                });
            }

            Commands::Sticker { id, sticker } => {
                self.store.toggle_sticker(&id, &sticker)?;
                self.report_card_flag(&id, |c| {
                    if c.stickers.contains(&sticker) {
                        format!("now wears {}", sticker)
                    } else {
                        format!("no longer wears {}", sticker)
                    }
                });
            }

            Commands::Reorder { id, before } => {
                self.store.reorder_card(&id, &before)?;
                println!("Board order updated ({})", self.store.save_status());
            }

            Commands::Folder { action } => self.handle_folder(action)?,

            Commands::Import {
                source,
                folder,
                pattern,
                recursive,
            } => self.handle_import(source, folder, pattern, recursive)?,

            Commands::Export { output, folder } => self.handle_export(output, folder)?,

            Commands::Genie { topic, folder } => self.handle_genie(&topic, folder).await?,

            Commands::Polish { id, mode } => self.handle_polish(&id, &mode).await?,
        }

        Ok(())
    }

    fn handle_new(
        &mut self,
        title: String,
        content: Option<String>,
        folder: Option<String>,
        tags: Option<String>,
        file: Option<PathBuf>,
        no_editor: bool,
    ) -> Result<()> {
        let parsed_tags = parse_tags(tags);

        // Get content based on the provided options
        let card_content = match (content, file) {
            (Some(c), _) => c,
            (_, Some(file_path)) => {
                if !file_path.exists() {
                    return Err(BoardError::ApplicationError {
                        message: format!("File not found: {}", file_path.display()),
                    });
                }
                read_to_string(file_path)?
            }
            (None, None) => {
                if no_editor {
                    String::new()
                } else {
                    self.open_editor_for_content(&title)?
                }
            }
        };

        let folder_id = self.resolve_folder(folder)?;
        let mut draft = CardDraft::with_content(title, card_content, parsed_tags);
        draft.folder_id = Some(folder_id);

        let id = self.store.add_card(draft)?;
        println!("Card created with ID: {}", id);
        Ok(())
    }

    fn open_editor_for_content(&self, title: &str) -> Result<String> {
        // Create a temporary file with .md extension
        let temp_file = Builder::new().suffix(".md").tempfile()?;
        let temp_path = temp_file.path().to_path_buf();

        self.write_editor_template(&temp_path, title, None)?;

        let editor_cmd = self.config.get_editor_command();
        info!("Opening editor to write card content. Save and exit when done...");
        self.launch_editor(&editor_cmd, &temp_path)?;

        let content = read_to_string(&temp_path)?;
        Ok(self.process_editor_content(content))
    }

    // Helper function to open editor with existing content
    fn open_editor_with_content(&self, title: &str, existing_content: &str) -> Result<String> {
        let temp_file = Builder::new().suffix(".md").tempfile()?;
        let temp_path = temp_file.path().to_path_buf();

        self.write_editor_template(&temp_path, title, Some(existing_content))?;

        let editor_cmd = self.config.get_editor_command();
        self.launch_editor(&editor_cmd, &temp_path)?;

        let content = read_to_string(&temp_path)?;
        Ok(self.process_editor_content(content))
    }

    fn write_editor_template(&self, path: &Path, title: &str, existing: Option<&str>) -> Result<()> {
        let mut file = OpenOptions::new().write(true).open(path)?;

        writeln!(file, "<!-- Card: {} -->", title)?;
        writeln!(
            file,
            "<!-- Lines that start with <!-- and end with --> are comments and will be ignored. -->"
        )?;
        writeln!(file, "<!-- Save and exit the editor when you're done. -->")?;
        writeln!(file)?;

        if let Some(content) = existing {
            writeln!(file, "{}", content)?;
        }

        Ok(())
    }

    fn launch_editor(&self, editor_cmd: &str, file_path: &Path) -> Result<()> {
        let path_str = file_path.to_string_lossy();

        // Handle shell-like command parsing
        let args = split(editor_cmd).map_err(|e| BoardError::EditorError {
            message: format!("Failed to parse editor command: {}", e),
        })?;

        if args.is_empty() {
            return Err(BoardError::EditorError {
                message: "Empty editor command".to_string(),
            });
        }

        // First word is the program name, rest are arguments
        let program = &args[0];
        let mut command = Command::new(program);
        if args.len() > 1 {
            command.args(&args[1..]);
        }
        command.arg(path_str.as_ref());

        let status = command.status()?;
        if !status.success() {
            return Err(BoardError::EditorError {
                message: "Editor exited with non-zero status".to_string(),
            });
        }

        Ok(())
    }

    fn process_editor_content(&self, content: String) -> String {
        // Remove HTML comments from content
        content
            .lines()
            .filter(|line| {
                !(line.trim_start().starts_with("<!--") && line.trim_end().ends_with("-->"))
            })
            .collect::<Vec<&str>>()
            .join("\n")
            .trim()
            .to_string()
    }

    fn handle_view(&self, id: &str, json: bool) -> Result<()> {
        let card = self
            .store
            .get_card(id)
            .ok_or_else(|| BoardError::CardNotFound { id: id.to_string() })?;

        if json {
            println!("{}", serde_json::to_string_pretty(card)?);
        } else {
            self.display_cards_text(&[card], true)?;
        }
        Ok(())
    }

    fn handle_list(
        &self,
        folder: Option<String>,
        tag: Option<String>,
        limit: usize,
        json: bool,
        detailed: bool,
    ) -> Result<()> {
        let mut cards: Vec<&Card> = match &folder {
            Some(folder_id) => self.store.cards_in_folder(folder_id),
            None => self.store.cards_for_display(),
        };

        if let Some(tag) = &tag {
            let search_tag = tag.trim().to_lowercase();
            cards.retain(|c| c.tags.iter().any(|t| t.trim().to_lowercase() == search_tag));
        }

        if limit > 0 && cards.len() > limit {
            cards.truncate(limit);
        }

        self.display_cards(&cards, json, detailed)
    }

    fn handle_search(&self, query: &str, limit: usize, json: bool) -> Result<()> {
        let mut results = self.store.search_cards(query);

        if limit > 0 && results.len() > limit {
            results.truncate(limit);
        }

        if results.is_empty() {
            println!("No cards found matching query: \"{}\"", query);
            return Ok(());
        }

        self.display_cards(&results, json, false)
    }

    fn handle_edit(
        &mut self,
        id: String,
        title: Option<String>,
        content: Option<String>,
        open_editor: bool,
        tags: Option<String>,
        file: Option<PathBuf>,
    ) -> Result<()> {
        if content.is_some() && open_editor {
            return Err(BoardError::ApplicationError {
                message: "Cannot specify both --content and --edit options".to_string(),
            });
        }
        if content.is_some() && file.is_some() {
            return Err(BoardError::ApplicationError {
                message: "Cannot specify both --content and --file options".to_string(),
            });
        }

        let mut card = self
            .store
            .get_card(&id)
            .ok_or_else(|| BoardError::CardNotFound { id: id.clone() })?
            .clone();

        if let Some(new_title) = title {
            card.title = new_title;
        }

        if let Some(new_content) = content {
            card.content = new_content;
        } else if let Some(file_path) = file {
            card.content = read_to_string(&file_path)?;
        } else if open_editor {
            card.content = self.open_editor_with_content(&card.title, &card.content)?;
        }

        if let Some(tag_string) = tags {
            card.tags = parse_tags(Some(tag_string));
        }

        // The store stamps updated_at itself
        self.store.update_card(card)?;
        println!("Card {} updated ({})", id, self.store.save_status());
        Ok(())
    }

    fn handle_delete(&mut self, id: &str, force: bool) -> Result<()> {
        let card = self
            .store
            .get_card(id)
            .ok_or_else(|| BoardError::CardNotFound { id: id.to_string() })?
            .clone();

        if !force {
            println!("You are about to delete the following card:");
            println!("ID:     {}", card.id);
            println!("Title:  {}", card.title);
            println!("Tags:   {}", card.tags.join(", "));

            print!("Are you sure you want to delete this card? [y/N]: ");
            stdout().flush().map_err(BoardError::Io)?;

            let mut input = String::new();
            stdin().read_line(&mut input).map_err(BoardError::Io)?;
            let input = input.trim().to_lowercase();
            if input != "y" && input != "yes" {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        self.store.delete_card(id)?;
        println!("Card '{}' ({}) has been deleted.", card.title, card.id);
        Ok(())
    }

    fn handle_move(&mut self, id: &str, folder_id: &str) -> Result<()> {
        if self.store.get_folder(folder_id).is_none() {
            return Err(BoardError::ApplicationError {
                message: format!("Folder not found: {}", folder_id),
            });
        }

        let mut card = self
            .store
            .get_card(id)
            .ok_or_else(|| BoardError::CardNotFound { id: id.to_string() })?
            .clone();
        card.folder_id = folder_id.to_string();
        self.store.update_card(card)?;

        println!("Card {} moved to folder {}", id, folder_id);
        Ok(())
    }

    fn handle_folder(&mut self, action: FolderAction) -> Result<()> {
        match action {
            FolderAction::List => {
                for folder in self.store.folders() {
                    let count = self
                        .store
                        .cards()
                        .iter()
                        .filter(|c| c.folder_id == folder.id)
                        .count();
                    println!(
                        "{}  {} ({} cards)",
                        folder.id,
                        console::style(&folder.name).bold(),
                        count
                    );
                }
            }
            FolderAction::Add { name } => match self.store.add_folder(&name)? {
                Some(id) => println!("Folder created with ID: {}", id),
                None => println!("Folder name cannot be empty."),
            },
            FolderAction::Delete { id } => {
                if id == DEFAULT_FOLDER_ID {
                    println!("The General folder cannot be deleted.");
                    return Ok(());
                }
                self.store.delete_folder(&id)?;
                println!("Folder {} deleted; its cards moved to General.", id);
            }
            FolderAction::Rename { id, name } => {
                self.store.rename_folder(&id, &name)?;
                println!("Folder {} renamed to '{}'", id, name);
            }
        }
        Ok(())
    }

    /// Import cards from a zip archive, a single markdown/text file or a
    /// directory of such files.
    fn handle_import(
        &mut self,
        source: PathBuf,
        folder: Option<String>,
        pattern: Option<String>,
        recursive: bool,
    ) -> Result<()> {
        let folder_id = self.resolve_folder(folder)?;

        if source.is_file() {
            if source.extension().is_some_and(|ext| ext == "zip") {
                return self.import_zip(&source, &folder_id);
            }
            return self.import_single_file(&source, &folder_id);
        }

        if source.is_dir() {
            return self.import_directory(&source, &folder_id, pattern, recursive);
        }

        Err(BoardError::ApplicationError {
            message: format!("Path not found: {}", source.display()),
        })
    }

    fn import_zip(&mut self, path: &Path, folder_id: &str) -> Result<()> {
        let data = std::fs::read(path)?;

        // An unreadable archive is a single failure with no partial import
        let cards = import_archive(&data, folder_id)?;
        let count = cards.len();
        self.store.import_cards_into_folder(cards, folder_id)?;

        println!("{} cards added to folder {}.", count, folder_id);
        Ok(())
    }

    fn import_single_file(&mut self, path: &Path, folder_id: &str) -> Result<()> {
        let text = read_to_string(path)?;
        let mut draft = decode_card(&text);

        // A document without front matter inherits the file's name
        if draft.title.as_deref() == Some(FALLBACK_TITLE) || draft.title.is_none() {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                draft.title = Some(stem.to_string());
            }
        }
        draft.folder_id = Some(folder_id.to_string());
        draft.id = None; // always a fresh id
        draft.updated_at = None;

        let id = self.store.add_card(draft)?;
        println!("Imported card with ID: {}", id);
        Ok(())
    }

    fn import_directory(
        &mut self,
        dir: &Path,
        folder_id: &str,
        pattern: Option<String>,
        recursive: bool,
    ) -> Result<()> {
        let matcher = match pattern {
            Some(p) => {
                let glob = globset::GlobBuilder::new(&p)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| BoardError::InvalidFormat {
                        message: format!("Invalid pattern: {}", e),
                    })?;
                let mut builder = globset::GlobSetBuilder::new();
                builder.add(glob);
                Some(builder.build().map_err(|e| BoardError::InvalidFormat {
                    message: format!("Invalid pattern: {}", e),
                })?)
            }
            None => None,
        };

        let max_depth = if recursive { usize::MAX } else { 1 };
        let mut summary = ImportSummary::default();

        for entry in walkdir::WalkDir::new(dir)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            summary.total_entries += 1;

            let is_document = path
                .extension()
                .is_some_and(|ext| ext == "md" || ext == "txt");
            let matches = matcher.as_ref().map_or(true, |m| m.is_match(path));
            if !is_document || !matches {
                summary.skipped += 1;
                continue;
            }

            if self.verbose {
                println!("Importing: {}", path.display());
            }
            match self.import_single_file(path, folder_id) {
                Ok(()) => summary.imported += 1,
                Err(e) => {
                    // One unreadable file never aborts the batch
                    warn!("Failed to import {}: {}", path.display(), e);
                    summary.skipped += 1;
                }
            }
        }

        println!("\nImport summary:");
        println!("  Entries examined: {}", summary.total_entries);
        println!("  Imported:         {}", summary.imported);
        println!("  Skipped:          {}", summary.skipped);
        Ok(())
    }

    fn handle_export(&self, output: PathBuf, folder: Option<String>) -> Result<()> {
        let cards: Vec<Card> = match &folder {
            Some(folder_id) => self
                .store
                .cards_in_folder(folder_id)
                .into_iter()
                .cloned()
                .collect(),
            None => self.store.cards().to_vec(),
        };

        if cards.is_empty() {
            println!("Nothing to export.");
            return Ok(());
        }

        let bytes = export_cards(&cards)?;
        std::fs::write(&output, bytes)?;

        println!("Packed {} cards into {}", cards.len(), output.display());
        Ok(())
    }

    async fn handle_genie(&mut self, topic: &str, folder: Option<String>) -> Result<()> {
        let folder_id = self.resolve_folder(folder)?;

        info!("Asking the genie about: {}", topic);
        // The genie never fails; a sleeping genie yields a placeholder card
        let idea = self.genie.brainstorm(topic).await;

        let mut draft = CardDraft::with_content(idea.title, idea.content, idea.tags);
        draft.folder_id = Some(folder_id);
        let id = self.store.add_card(draft)?;

        if let Some(card) = self.store.get_card(&id) {
            println!("{}", console::style(&card.title).bold());
            println!("{}", card.content);
        }
        println!("\nCard created with ID: {}", id);
        Ok(())
    }

    async fn handle_polish(&mut self, id: &str, mode: &str) -> Result<()> {
        let mode = PolishMode::parse(mode).ok_or_else(|| BoardError::InvalidFormat {
            message: format!("Unknown polish mode: {}", mode),
        })?;

        let card = self
            .store
            .get_card(id)
            .ok_or_else(|| BoardError::CardNotFound { id: id.to_string() })?
            .clone();

        // On failure the card is left untouched
        match self.genie.polish(&card.content, mode).await {
            Ok(polished) => {
                let mut updated = card;
                updated.content = polished;
                self.store.update_card(updated)?;
                println!("Card {} polished ({})", id, self.store.save_status());
                Ok(())
            }
            Err(e) => {
                println!("The genie couldn't help right now; your card is unchanged.");
                Err(e)
            }
        }
    }

    /// Maps an optional folder argument to a folder id, verifying it exists.
    fn resolve_folder(&self, folder: Option<String>) -> Result<String> {
        match folder {
            None => Ok(DEFAULT_FOLDER_ID.to_string()),
            Some(id) => {
                if self.store.get_folder(&id).is_some() {
                    Ok(id)
                } else {
                    Err(BoardError::ApplicationError {
                        message: format!("Folder not found: {}", id),
                    })
                }
            }
        }
    }

    fn report_card_flag(&self, id: &str, describe: impl Fn(&Card) -> String) {
        match self.store.get_card(id) {
            Some(card) => println!("Card '{}' {}", card.title, describe(card)),
            None => println!("No card with ID {}", id),
        }
    }

    fn display_cards(&self, cards: &[&Card], json: bool, detailed: bool) -> Result<()> {
        if cards.is_empty() {
            println!("No cards found matching the criteria.");
            return Ok(());
        }

        if json {
            println!("{}", serde_json::to_string_pretty(cards)?);
        } else {
            self.display_cards_text(cards, detailed)?;
        }

        println!(
            "\nFound {} card{}",
            cards.len(),
            if cards.len() == 1 { "" } else { "s" }
        );
        Ok(())
    }

    /// Display cards in text format
    fn display_cards_text(&self, cards: &[&Card], detailed: bool) -> Result<()> {
        // Use terminal width for formatting if available
        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);

        for (i, card) in cards.iter().enumerate() {
            if i > 0 {
                println!("{}", "-".repeat(term_width.min(50)));
            }

            let updated_at = card.updated_at.format("%Y-%m-%d %H:%M");
            let pin = if card.is_pinned { " 📌" } else { "" };

            println!("ID: {} | Updated: {}{}", card.id, updated_at, pin);
            println!("Title: {}", console::style(&card.title).bold());

            if !card.stickers.is_empty() {
                println!("Stickers: {}", card.stickers.join(" "));
            }

            if !card.tags.is_empty() {
                let tags = card
                    .tags
                    .iter()
                    .map(|tag| format!("#{}", tag))
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("Tags: {}", console::style(tags).cyan());
            }

            if detailed {
                println!("\n{}", card.content);
            } else {
                let preview = self.get_content_preview(&card.content, 100);
                if !preview.is_empty() {
                    println!("\n{}", preview);
                }
            }
        }

        Ok(())
    }

    /// Generate a content preview for displaying brief cards
    fn get_content_preview(&self, content: &str, max_len: usize) -> String {
        let first_line = content
            .lines()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("");

        if first_line.chars().count() <= max_len {
            first_line.to_string()
        } else {
            let truncated: String = first_line.chars().take(max_len).collect();
            format!("{}...", truncated)
        }
    }
}
