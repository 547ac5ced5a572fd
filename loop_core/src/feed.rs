//! The narrative feed: short lines of text the presentation layer shows.

use std::cell::RefCell;

/// One line in the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub text: String,
    /// Highlighted lines survive a soft clear on the presentation side.
    pub important: bool,
}

/// In-memory feed shared by every subsystem that talks to the player.
#[derive(Debug, Default)]
pub struct Feed {
    entries: RefCell<Vec<FeedEntry>>,
}

impl Feed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, text: impl Into<String>, important: bool) {
        self.entries.borrow_mut().push(FeedEntry {
            text: text.into(),
            important,
        });
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn entries(&self) -> Vec<FeedEntry> {
        self.entries.borrow().clone()
    }

    /// Take every entry, leaving the feed empty.
    pub fn drain(&self) -> Vec<FeedEntry> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }

    /// Whether any entry contains `fragment`.
    pub fn contains(&self, fragment: &str) -> bool {
        self.entries.borrow().iter().any(|e| e.text.contains(fragment))
    }

    /// Number of entries containing `fragment`.
    pub fn count(&self, fragment: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.text.contains(fragment))
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
