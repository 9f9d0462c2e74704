//! The board store: authoritative owner of the card and folder collections.
//!
//! Every mutating operation updates the in-memory collections and then
//! persists both collections wholesale to the two on-disk records before
//! returning. Execution is cooperative single-threaded: operations take
//! `&mut self` and run to completion, so no locking is needed.

use std::time::{Duration, Instant};

use chrono::Utc;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use log::{info, warn};

use crate::{
    helper::{read_record, write_record},
    random_color, random_id, random_rotation, Card, CardDraft, Config, Folder, Result, SaveStatus,
    DEFAULT_FOLDER_ID, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};

/// How long the save indicator reports `Saving` after a write is issued.
const SAVE_SETTLE: Duration = Duration::from_millis(800);

/// Manages the storage and mutation of cards and folders.
pub struct BoardStore {
    /// Application configuration
    config: Config,

    /// Cards in underlying board order, newest first
    cards: Vec<Card>,

    /// Folders in creation order, default folder first
    folders: Vec<Folder>,

    /// When the last persistence write was issued
    last_write: Option<Instant>,
}

impl BoardStore {
    /// Creates a new, empty store. Call [`load`](Self::load) before use.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cards: Vec::new(),
            folders: Vec::new(),
            last_write: None,
        }
    }

    /// Loads persisted folders and cards from storage.
    ///
    /// Missing records are seeded; records that exist but fail to parse are
    /// also replaced by seed data rather than failing the application.
    /// Loaded cards pass through serde defaulting so records written by an
    /// older schema (no stickers/folderId/isPinned) remain valid.
    pub fn load(&mut self) -> Result<()> {
        match read_record::<Vec<Folder>>(&self.config.folders_path()) {
            Ok(Some(folders)) => self.folders = folders,
            Ok(None) => self.folders = vec![Folder::default_folder()],
            Err(e) => {
                warn!("Failed to parse stored folders, falling back to default: {}", e);
                self.folders = vec![Folder::default_folder()];
            }
        }

        match read_record::<Vec<Card>>(&self.config.cards_path()) {
            Ok(Some(cards)) => {
                info!("Loaded {} cards from storage", cards.len());
                self.cards = cards;
            }
            Ok(None) => {
                self.cards = seed_cards();
                self.save_to_storage()?;
            }
            Err(e) => {
                warn!("Failed to parse stored cards, falling back to seed data: {}", e);
                self.cards = seed_cards();
                self.save_to_storage()?;
            }
        }

        Ok(())
    }

    // folder operations

    /// Creates a folder. Names that are empty after trimming are rejected
    /// as a no-op. Returns the new folder's id.
    pub fn add_folder(&mut self, name: &str) -> Result<Option<String>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let folder = Folder::new(name.to_string());
        let id = folder.id.clone();
        self.folders.push(folder);
        self.save_to_storage()?;
        Ok(Some(id))
    }

    /// Deletes a folder, reassigning its cards to the default folder in the
    /// same mutation. Deleting the default folder is a no-op: no snapshot
    /// ever shows a card referencing a folder that is gone.
    pub fn delete_folder(&mut self, folder_id: &str) -> Result<()> {
        if folder_id == DEFAULT_FOLDER_ID {
            return Ok(());
        }

        for card in self.cards.iter_mut() {
            if card.folder_id == folder_id {
                card.folder_id = DEFAULT_FOLDER_ID.to_string();
            }
        }
        self.folders.retain(|f| f.id != folder_id);
        self.save_to_storage()
    }

    /// Renames a folder in place. A missing id is a no-op.
    pub fn rename_folder(&mut self, folder_id: &str, name: &str) -> Result<()> {
        if let Some(folder) = self.folders.iter_mut().find(|f| f.id == folder_id) {
            folder.name = name.to_string();
        }
        self.save_to_storage()
    }

    // card operations

    /// Constructs a full card from the draft plus defaults and inserts it at
    /// the head of the board (newest first). Returns the new card's id.
    pub fn add_card(&mut self, draft: CardDraft) -> Result<String> {
        let card = Card {
            id: draft.id.unwrap_or_else(random_id),
            folder_id: draft
                .folder_id
                .unwrap_or_else(|| DEFAULT_FOLDER_ID.to_string()),
            title: draft.title.unwrap_or_default(),
            content: draft.content.unwrap_or_default(),
            tags: draft.tags.unwrap_or_default(),
            color: draft.color.unwrap_or_else(random_color),
            rotation: draft.rotation.unwrap_or_else(random_rotation),
            stickers: draft.stickers.unwrap_or_default(),
            is_pinned: draft.is_pinned.unwrap_or(false),
            updated_at: draft.updated_at.unwrap_or_else(Utc::now),
            width: Some(DEFAULT_WIDTH),
            height: Some(DEFAULT_HEIGHT),
            is_minimized: None,
        };

        let id = card.id.clone();
        self.cards.insert(0, card);
        self.save_to_storage()?;
        Ok(id)
    }

    /// Replaces the card with the matching id. The caller-supplied
    /// `updated_at` is ignored; the store stamps the current time. A missing
    /// id is a no-op.
    pub fn update_card(&mut self, card: Card) -> Result<()> {
        if let Some(existing) = self.cards.iter_mut().find(|c| c.id == card.id) {
            *existing = Card {
                updated_at: Utc::now(),
                ..card
            };
        }
        self.save_to_storage()
    }

    /// Removes the card with the given id, if present.
    pub fn delete_card(&mut self, card_id: &str) -> Result<()> {
        self.cards.retain(|c| c.id != card_id);
        self.save_to_storage()
    }

    /// Toggles sticker membership: removes the first occurrence when
    /// present, appends otherwise. Stamps `updated_at`.
    pub fn toggle_sticker(&mut self, card_id: &str, sticker: &str) -> Result<()> {
        if let Some(card) = self.cards.iter_mut().find(|c| c.id == card_id) {
            if let Some(pos) = card.stickers.iter().position(|s| s == sticker) {
                card.stickers.remove(pos);
            } else {
                card.stickers.push(sticker.to_string());
            }
            card.updated_at = Utc::now();
        }
        self.save_to_storage()
    }

    /// Flips the pinned flag. Does not stamp `updated_at`: pinning is a
    /// display arrangement, not an edit.
    pub fn toggle_pin(&mut self, card_id: &str) -> Result<()> {
        if let Some(card) = self.cards.iter_mut().find(|c| c.id == card_id) {
            card.is_pinned = !card.is_pinned;
        }
        self.save_to_storage()
    }

    /// Moves a card to the target card's position in the underlying
    /// ordering: remove first, then reinsert at the index the target held
    /// before the removal. Moving toward the head lands just before the
    /// target; moving toward the tail lands just after it, so adjacent
    /// cards swap in either direction. Equal or missing ids leave the
    /// board unchanged.
    pub fn reorder_card(&mut self, moved_id: &str, target_id: &str) -> Result<()> {
        let moved_idx = self.cards.iter().position(|c| c.id == moved_id);
        let target_idx = self.cards.iter().position(|c| c.id == target_id);

        let (Some(moved_idx), Some(target_idx)) = (moved_idx, target_idx) else {
            return Ok(());
        };
        if moved_idx == target_idx {
            return Ok(());
        }

        let card = self.cards.remove(moved_idx);
        self.cards.insert(target_idx, card);
        self.save_to_storage()
    }

    /// Wholesale-replaces the card collection.
    pub fn import_data(&mut self, cards: Vec<Card>) -> Result<()> {
        self.cards = cards;
        self.save_to_storage()
    }

    /// Appends cards to the board, forcing each into the given folder.
    pub fn import_cards_into_folder(&mut self, cards: Vec<Card>, folder_id: &str) -> Result<()> {
        for mut card in cards {
            card.folder_id = folder_id.to_string();
            self.cards.push(card);
        }
        self.save_to_storage()
    }

    // read side

    /// Cards in the underlying board order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Folders in creation order.
    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    /// Cards sorted for display: pinned before unpinned, ties keeping
    /// their existing relative order.
    pub fn cards_for_display(&self) -> Vec<&Card> {
        let mut sorted: Vec<&Card> = self.cards.iter().collect();
        sorted.sort_by_key(|c| !c.is_pinned);
        sorted
    }

    /// Cards belonging to a folder, in display order.
    pub fn cards_in_folder(&self, folder_id: &str) -> Vec<&Card> {
        self.cards_for_display()
            .into_iter()
            .filter(|c| c.folder_id == folder_id)
            .collect()
    }

    pub fn get_card(&self, card_id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    pub fn get_folder(&self, folder_id: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == folder_id)
    }

    /// Searches cards by title and content using fuzzy matching.
    /// Returns cards sorted by relevance, title matches weighted double.
    pub fn search_cards(&self, query: &str) -> Vec<&Card> {
        let matcher = SkimMatcherV2::default();

        let mut matched: Vec<(i64, &Card)> = self
            .cards
            .iter()
            .filter_map(|card| {
                let title_score = matcher.fuzzy_match(&card.title, query).unwrap_or(0);
                let content_score = matcher.fuzzy_match(&card.content, query).unwrap_or(0);
                let score = title_score * 2 + content_score;
                (score > 0).then_some((score, card))
            })
            .collect();

        matched.sort_by(|a, b| b.0.cmp(&a.0));
        matched.into_iter().map(|(_, card)| card).collect()
    }

    /// Current persistence status. `Saving` for a short window after a
    /// write is issued, `Saved` once it settles.
    pub fn save_status(&self) -> SaveStatus {
        match self.last_write {
            Some(at) if at.elapsed() < SAVE_SETTLE => SaveStatus::Saving,
            _ => SaveStatus::Saved,
        }
    }

    /// Serializes both collections to their on-disk records. Called at the
    /// end of every mutating operation; by the time it returns, storage
    /// reflects the latest in-memory state.
    fn save_to_storage(&mut self) -> Result<()> {
        self.last_write = Some(Instant::now());
        write_record(&self.config.cards_path(), &self.cards)?;
        write_record(&self.config.folders_path(), &self.folders)?;
        Ok(())
    }
}

/// Example cards shown on a brand-new board.
fn seed_cards() -> Vec<Card> {
    vec![
        Card {
            id: "1".to_string(),
            folder_id: DEFAULT_FOLDER_ID.to_string(),
            title: "Welcome!".to_string(),
            content: "This is your new doodle board. Open me to edit!".to_string(),
            tags: vec!["intro".to_string(), "welcome".to_string()],
            color: "#ffeb3b".to_string(),
            rotation: -2.0,
            stickers: vec!["⭐".to_string()],
            is_pinned: true,
            updated_at: Utc::now(),
            width: None,
            height: None,
            is_minimized: None,
        },
        Card {
            id: "2".to_string(),
            folder_id: DEFAULT_FOLDER_ID.to_string(),
            title: "Ideas 💡".to_string(),
            content: "Tag your scribbles and search them later!".to_string(),
            tags: vec!["ideas".to_string()],
            color: "#b2dfdb".to_string(),
            rotation: 1.0,
            stickers: vec![],
            is_pinned: false,
            updated_at: Utc::now(),
            width: None,
            height: None,
            is_minimized: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn test_store() -> (BoardStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let mut store = BoardStore::new(config);
        store.load().unwrap();
        (store, dir)
    }

    fn draft(title: &str) -> CardDraft {
        CardDraft::with_content(title.to_string(), "content".to_string(), vec![])
    }

    #[test]
    fn test_load_seeds_default_folder_and_example_cards() {
        let (store, _dir) = test_store();
        assert_eq!(store.folders().len(), 1);
        assert_eq!(store.folders()[0].id, DEFAULT_FOLDER_ID);
        assert_eq!(store.folders()[0].name, "General");
        assert!(!store.cards().is_empty());
    }

    #[test]
    fn test_load_recovers_from_corrupt_records() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        fs::write(config.cards_path(), "garbage{{{").unwrap();
        fs::write(config.folders_path(), "also garbage").unwrap();

        let mut store = BoardStore::new(config);
        store.load().unwrap();
        assert_eq!(store.folders()[0].id, DEFAULT_FOLDER_ID);
        assert!(!store.cards().is_empty());
    }

    #[test]
    fn test_load_defaults_missing_fields_from_old_schema() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        // A record written before isPinned/stickers/folderId existed
        let old = r##"[{
            "id": "old1",
            "title": "Old",
            "content": "legacy",
            "tags": [],
            "color": "#ffeb3b",
            "rotation": 0.5,
            "updatedAt": "2024-01-01T00:00:00Z"
        }]"##;
        fs::write(config.cards_path(), old).unwrap();

        let mut store = BoardStore::new(config);
        store.load().unwrap();

        let card = store.get_card("old1").unwrap();
        assert!(!card.is_pinned);
        assert!(card.stickers.is_empty());
        assert_eq!(card.folder_id, DEFAULT_FOLDER_ID);
        // Dimension defaults apply at creation only, never on load
        assert_eq!(card.width, None);
        assert_eq!(card.height, None);
        // Stored timestamp is preserved as-is on load
        assert_eq!(card.updated_at.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_add_folder_rejects_blank_names() {
        let (mut store, _dir) = test_store();
        assert!(store.add_folder("   ").unwrap().is_none());
        assert_eq!(store.folders().len(), 1);

        let id = store.add_folder("  Work  ").unwrap().unwrap();
        assert_eq!(store.get_folder(&id).unwrap().name, "Work");
    }

    #[test]
    fn test_delete_folder_reassigns_member_cards() {
        let (mut store, _dir) = test_store();
        let folder_id = store.add_folder("Work").unwrap().unwrap();

        let mut d = draft("in work");
        d.folder_id = Some(folder_id.clone());
        let card_id = store.add_card(d).unwrap();

        store.delete_folder(&folder_id).unwrap();

        assert!(store.get_folder(&folder_id).is_none());
        assert!(store.cards().iter().all(|c| c.folder_id != folder_id));
        assert_eq!(store.get_card(&card_id).unwrap().folder_id, DEFAULT_FOLDER_ID);
    }

    #[test]
    fn test_delete_default_folder_is_noop() {
        let (mut store, _dir) = test_store();
        let before: Vec<String> = store.cards().iter().map(|c| c.folder_id.clone()).collect();

        store.delete_folder(DEFAULT_FOLDER_ID).unwrap();

        assert_eq!(store.folders().len(), 1);
        let after: Vec<String> = store.cards().iter().map(|c| c.folder_id.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_add_card_fills_defaults_and_inserts_at_head() {
        let (mut store, _dir) = test_store();
        let id = store.add_card(draft("fresh")).unwrap();

        let card = store.cards().first().unwrap();
        assert_eq!(card.id, id);
        assert_eq!(card.folder_id, DEFAULT_FOLDER_ID);
        assert!((-3.0..=3.0).contains(&card.rotation));
        assert!(crate::CARD_PALETTE.contains(&card.color.as_str()));
        assert_eq!(card.width, Some(DEFAULT_WIDTH));
        assert_eq!(card.height, Some(DEFAULT_HEIGHT));
        assert!(!card.is_pinned);
        assert!(card.stickers.is_empty());
    }

    #[test]
    fn test_update_card_stamps_updated_at() {
        let (mut store, _dir) = test_store();
        let id = store.add_card(draft("to edit")).unwrap();

        let mut card = store.get_card(&id).unwrap().clone();
        let stale = chrono::DateTime::parse_from_rfc3339("2020-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        card.title = "edited".to_string();
        card.updated_at = stale;
        store.update_card(card).unwrap();

        let updated = store.get_card(&id).unwrap();
        assert_eq!(updated.title, "edited");
        // Caller-supplied timestamp is ignored on update
        assert!(updated.updated_at > stale);
    }

    #[test]
    fn test_update_missing_card_is_noop() {
        let (mut store, _dir) = test_store();
        let count = store.cards().len();

        let mut phantom = store.cards()[0].clone();
        phantom.id = "does-not-exist".to_string();
        phantom.title = "ghost".to_string();
        store.update_card(phantom).unwrap();

        assert_eq!(store.cards().len(), count);
        assert!(store.get_card("does-not-exist").is_none());
    }

    #[test]
    fn test_toggle_sticker_is_its_own_inverse() {
        let (mut store, _dir) = test_store();
        let id = store.add_card(draft("stickered")).unwrap();
        let original = store.get_card(&id).unwrap().stickers.clone();

        store.toggle_sticker(&id, "🔥").unwrap();
        assert!(store.get_card(&id).unwrap().stickers.contains(&"🔥".to_string()));

        store.toggle_sticker(&id, "🔥").unwrap();
        assert_eq!(store.get_card(&id).unwrap().stickers, original);
    }

    #[test]
    fn test_toggle_sticker_removes_first_match_only() {
        let (mut store, _dir) = test_store();
        let mut d = draft("dupes");
        d.stickers = Some(vec!["⭐".to_string(), "⭐".to_string()]);
        let id = store.add_card(d).unwrap();

        store.toggle_sticker(&id, "⭐").unwrap();
        assert_eq!(store.get_card(&id).unwrap().stickers, vec!["⭐"]);
    }

    #[test]
    fn test_toggle_pin_leaves_updated_at_untouched() {
        // Pinning deliberately skips the timestamp stamp, unlike every
        // other card mutation.
        let (mut store, _dir) = test_store();
        let id = store.add_card(draft("pinnable")).unwrap();
        let before = store.get_card(&id).unwrap().updated_at;

        store.toggle_pin(&id).unwrap();

        let card = store.get_card(&id).unwrap();
        assert!(card.is_pinned);
        assert_eq!(card.updated_at, before);
    }

    #[test]
    fn test_display_sort_is_pinned_first_and_stable() {
        let (mut store, _dir) = test_store();
        store.import_data(vec![]).unwrap();

        // Board order is newest-first, so add D, C, B, A to get [A, B, C, D]
        for title in ["D", "C", "B", "A"] {
            store.add_card(draft(title)).unwrap();
        }
        let a = store.cards()[0].id.clone();
        let c = store.cards()[2].id.clone();
        store.toggle_pin(&a).unwrap();
        store.toggle_pin(&c).unwrap();

        let titles: Vec<&str> = store
            .cards_for_display()
            .iter()
            .map(|card| card.title.as_str())
            .collect();
        assert_eq!(titles, vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn test_reorder_adjacent_cards_swaps_them_in_both_directions() {
        let (mut store, _dir) = test_store();
        store.import_data(vec![]).unwrap();
        let second = store.add_card(draft("second")).unwrap();
        let first = store.add_card(draft("first")).unwrap();

        // Moving up: the later card lands before the earlier one
        store.reorder_card(&second, &first).unwrap();
        let order: Vec<&str> = store.cards().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec![second.as_str(), first.as_str()]);

        // Moving down: the earlier card passes its neighbor
        store.reorder_card(&second, &first).unwrap();
        let order: Vec<&str> = store.cards().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec![first.as_str(), second.as_str()]);
    }

    #[test]
    fn test_reorder_downward_lands_at_targets_old_position() {
        let (mut store, _dir) = test_store();
        store.import_data(vec![]).unwrap();

        // Board order is newest-first, so add D, C, B, A to get [A, B, C, D]
        for title in ["D", "C", "B", "A"] {
            store.add_card(draft(title)).unwrap();
        }
        let a = store.cards()[0].id.clone();
        let c = store.cards()[2].id.clone();

        // A is removed first, then reinserted at C's pre-removal index
        store.reorder_card(&a, &c).unwrap();

        let titles: Vec<&str> = store.cards().iter().map(|card| card.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "C", "A", "D"]);
    }

    #[test]
    fn test_reorder_noop_cases_leave_board_unchanged() {
        let (mut store, _dir) = test_store();
        let id = store.add_card(draft("lonely")).unwrap();
        let before: Vec<Card> = store.cards().to_vec();

        store.reorder_card(&id, &id).unwrap();
        assert_eq!(store.cards(), before.as_slice());

        store.reorder_card(&id, "missing").unwrap();
        assert_eq!(store.cards(), before.as_slice());

        store.reorder_card("missing", &id).unwrap();
        assert_eq!(store.cards(), before.as_slice());
    }

    #[test]
    fn test_import_cards_into_folder_forces_folder_id() {
        let (mut store, _dir) = test_store();
        let folder_id = store.add_folder("Imported").unwrap().unwrap();
        let existing = store.cards().len();

        let mut card = store.cards()[0].clone();
        card.id = "imported1".to_string();
        card.folder_id = "somewhere-else".to_string();
        store.import_cards_into_folder(vec![card], &folder_id).unwrap();

        assert_eq!(store.cards().len(), existing + 1);
        assert_eq!(store.get_card("imported1").unwrap().folder_id, folder_id);
    }

    #[test]
    fn test_mutations_are_durable() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        let id = {
            let mut store = BoardStore::new(config.clone());
            store.load().unwrap();
            store.add_card(draft("durable")).unwrap()
        };

        // A fresh store reading the same records sees the mutation
        let mut reloaded = BoardStore::new(config);
        reloaded.load().unwrap();
        assert_eq!(reloaded.get_card(&id).unwrap().title, "durable");
    }

    #[test]
    fn test_save_status_reports_saving_then_settles() {
        let (mut store, _dir) = test_store();
        store.add_card(draft("status")).unwrap();
        assert_eq!(store.save_status(), SaveStatus::Saving);

        std::thread::sleep(Duration::from_millis(850));
        assert_eq!(store.save_status(), SaveStatus::Saved);
    }

    #[test]
    fn test_search_weights_title_over_content() {
        let (mut store, _dir) = test_store();
        store.import_data(vec![]).unwrap();
        store
            .add_card(CardDraft::with_content(
                "notes about rust".to_string(),
                "nothing here".to_string(),
                vec![],
            ))
            .unwrap();
        store
            .add_card(CardDraft::with_content(
                "unrelated".to_string(),
                "rust mentioned in body".to_string(),
                vec![],
            ))
            .unwrap();

        let results = store.search_cards("rust");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "notes about rust");
    }
}
