//! The single inline edit session.
//!
//! INVARIANT: at most one cell is active. Entering a new cell runs the full
//! exit sequence for the current one (commit, detach, un-highlight) before
//! the new cell is attached. One `InlineEditor` exists per controller; it is
//! created on first use and moved between cells.

use std::collections::BTreeSet;

use duudl_core::{CellKey, Day};

/// Recent transitions kept for inspection.
pub const JOURNAL_LIMIT: usize = 32;

/// Receives the immediate commit issued on every session exit.
pub trait CommitSink {
    fn commit_now(&mut self, key: &CellKey);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTransition {
    Entered(CellKey),
    /// Immediate commit issued for the cell being left.
    Flushed(CellKey),
    Exited(CellKey),
}

/// Shared text input with a char-indexed caret.
#[derive(Debug, Default)]
pub struct InlineEditor {
    value: String,
    caret: usize,
    attached: Option<CellKey>,
}

impl InlineEditor {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn attached(&self) -> Option<&CellKey> {
        self.attached.as_ref()
    }

    /// Replace the text, caret at the end.
    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        self.caret = self.value.chars().count();
    }

    pub fn insert_str(&mut self, text: &str) {
        let at = self.byte_offset(self.caret);
        self.value.insert_str(at, text);
        self.caret += text.chars().count();
    }

    /// Delete the char before the caret. Returns false at the start.
    pub fn backspace(&mut self) -> bool {
        if self.caret == 0 {
            return false;
        }
        let start = self.byte_offset(self.caret - 1);
        let end = self.byte_offset(self.caret);
        self.value.replace_range(start..end, "");
        self.caret -= 1;
        true
    }

    pub fn move_left(&mut self) {
        self.caret = self.caret.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.caret = (self.caret + 1).min(self.value.chars().count());
    }

    pub fn move_home(&mut self) {
        self.caret = 0;
    }

    pub fn move_end(&mut self) {
        self.caret = self.value.chars().count();
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn attach(&mut self, key: CellKey, text: &str) {
        self.attached = Some(key);
        self.set_value(text);
    }

    fn detach(&mut self) {
        self.attached = None;
        self.value.clear();
        self.caret = 0;
    }
}

#[derive(Debug, Default)]
pub struct EditSessionController {
    active: Option<CellKey>,
    editor: Option<InlineEditor>,
    editor_allocations: usize,
    open_comment_days: BTreeSet<Day>,
    journal: Vec<SessionTransition>,
}

impl EditSessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&CellKey> {
        self.active.as_ref()
    }

    pub fn is_active_cell(&self, key: &CellKey) -> bool {
        self.active.as_ref() == Some(key)
    }

    /// Start editing `key` with `text` in the input.
    ///
    /// Callers check ownership first. Re-entering the active cell is a no-op
    /// and returns false.
    pub fn enter(&mut self, key: CellKey, text: &str, sink: &mut dyn CommitSink) -> bool {
        if self.is_active_cell(&key) {
            return false;
        }
        self.exit(sink);

        if self.editor.is_none() {
            self.editor_allocations += 1;
        }
        self.editor.get_or_insert_with(InlineEditor::default).attach(key, text);
        self.active = Some(key);
        // Opening a grid session also opens that day's panel editor.
        self.open_comment_days.insert(key.day);
        self.record(SessionTransition::Entered(key));
        log::debug!("edit session entered {}", key);
        true
    }

    /// End the session, committing its cell immediately.
    pub fn exit(&mut self, sink: &mut dyn CommitSink) -> Option<CellKey> {
        let key = self.active?;
        sink.commit_now(&key);
        self.record(SessionTransition::Flushed(key));

        if let Some(editor) = self.editor.as_mut() {
            editor.detach();
        }
        self.active = None;
        self.record(SessionTransition::Exited(key));
        log::debug!("edit session exited {}", key);
        Some(key)
    }

    /// The input, while attached to the active cell.
    pub fn editor(&self) -> Option<&InlineEditor> {
        self.editor.as_ref().filter(|e| e.attached.is_some())
    }

    pub fn editor_mut(&mut self) -> Option<&mut InlineEditor> {
        self.editor.as_mut().filter(|e| e.attached.is_some())
    }

    /// How many inline inputs were ever created (0 or 1).
    pub fn editor_allocations(&self) -> usize {
        self.editor_allocations
    }

    pub fn open_comment_days(&self) -> &BTreeSet<Day> {
        &self.open_comment_days
    }

    pub fn is_day_open(&self, day: &Day) -> bool {
        self.open_comment_days.contains(day)
    }

    pub fn set_day_open(&mut self, day: Day, open: bool) {
        if open {
            self.open_comment_days.insert(day);
        } else {
            self.open_comment_days.remove(&day);
        }
    }

    /// The most recent transitions, oldest first.
    pub fn journal(&self) -> &[SessionTransition] {
        &self.journal
    }

    fn record(&mut self, transition: SessionTransition) {
        self.journal.push(transition);
        if self.journal.len() > JOURNAL_LIMIT {
            self.journal.remove(0);
        }
    }
}
