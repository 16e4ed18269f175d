//! Input events, line editing and focus
//!
//! Raw terminal events are converted into [`InputEvent`]s once, at the edge.
//! Everything downstream (menus, the composer) works with these plain values.

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use tracing::debug;

use super::layout::NodeId;

/// Key presses the UI distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Escape,
    Ctrl(char),
    Alt(char),
}

impl KeyEvent {
    /// Convert a crossterm key press; releases and unmapped keys give `None`
    pub fn from_crossterm(key: &crossterm::event::KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        Some(match key.code {
            KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
                KeyEvent::Ctrl(c.to_ascii_lowercase())
            }
            KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::ALT) => KeyEvent::Alt(c),
            KeyCode::Char(c) => KeyEvent::Char(c),
            KeyCode::Enter => KeyEvent::Enter,
            KeyCode::Tab => KeyEvent::Tab,
            KeyCode::Backspace => KeyEvent::Backspace,
            KeyCode::Delete => KeyEvent::Delete,
            KeyCode::Left => KeyEvent::Left,
            KeyCode::Right => KeyEvent::Right,
            KeyCode::Up => KeyEvent::Up,
            KeyCode::Down => KeyEvent::Down,
            KeyCode::Home => KeyEvent::Home,
            KeyCode::End => KeyEvent::End,
            KeyCode::PageUp => KeyEvent::PageUp,
            KeyCode::PageDown => KeyEvent::PageDown,
            KeyCode::Esc => KeyEvent::Escape,
            _ => return None,
        })
    }
}

/// Event consumed by the focused widget and by the layout on resize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Resize { cols: u16, rows: u16 },
    Key(KeyEvent),
}

impl InputEvent {
    pub fn from_crossterm(event: &Event) -> Option<Self> {
        match event {
            Event::Resize(cols, rows) => Some(InputEvent::Resize {
                cols: *cols,
                rows: *rows,
            }),
            Event::Key(key) => KeyEvent::from_crossterm(key).map(InputEvent::Key),
            _ => None,
        }
    }
}

/// Single-line editor with cursor and submit history
#[derive(Debug, Clone)]
pub struct InputBuffer {
    /// Current text content
    pub text: String,
    /// Cursor position (byte offset, always on a char boundary)
    pub cursor: usize,
    history: Vec<String>,
    /// Current position in history (None = new input)
    history_pos: Option<usize>,
    /// Draft saved while browsing history
    draft: String,
    max_history: usize,
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBuffer {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            history: Vec::new(),
            history_pos: None,
            draft: String::new(),
            max_history: 500,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Cursor position in chars, for placing the terminal cursor
    pub fn cursor_column(&self) -> usize {
        self.text[..self.cursor].chars().count()
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }

    pub fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    /// Delete the char before the cursor
    pub fn backspace(&mut self) -> bool {
        match self.prev_boundary() {
            Some(prev) => {
                self.text.remove(prev);
                self.cursor = prev;
                true
            }
            None => false,
        }
    }

    /// Delete the char under the cursor
    pub fn delete(&mut self) -> bool {
        if self.cursor < self.text.len() {
            self.text.remove(self.cursor);
            true
        } else {
            false
        }
    }

    pub fn move_left(&mut self) -> bool {
        match self.prev_boundary() {
            Some(prev) => {
                self.cursor = prev;
                true
            }
            None => false,
        }
    }

    pub fn move_right(&mut self) -> bool {
        match self.next_boundary() {
            Some(next) => {
                self.cursor = next;
                true
            }
            None => false,
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    pub fn kill_to_end(&mut self) -> String {
        self.text.split_off(self.cursor)
    }

    pub fn kill_to_start(&mut self) -> String {
        let killed: String = self.text.drain(..self.cursor).collect();
        self.cursor = 0;
        killed
    }

    /// Delete the word before the cursor, plus any whitespace after it
    pub fn kill_word(&mut self) -> String {
        let before = &self.text[..self.cursor];
        let start = before
            .trim_end()
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        let killed: String = self.text.drain(start..self.cursor).collect();
        self.cursor = start;
        killed
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Replace the text and move the cursor to the end
    pub fn set(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.text.len();
    }

    /// Take the current text, recording non-blank lines in history
    pub fn submit(&mut self) -> String {
        let text = std::mem::take(&mut self.text);
        self.cursor = 0;
        self.history_pos = None;

        let repeat = self.history.last().is_some_and(|last| *last == text);
        if !text.trim().is_empty() && !repeat {
            self.history.push(text.clone());
            if self.history.len() > self.max_history {
                self.history.remove(0);
            }
        }
        text
    }

    /// Step back through history, saving the draft on the first step
    pub fn history_prev(&mut self) -> bool {
        let pos = match self.history_pos {
            None if !self.history.is_empty() => {
                self.draft = self.text.clone();
                self.history.len() - 1
            }
            Some(pos) if pos > 0 => pos - 1,
            _ => return false,
        };
        self.history_pos = Some(pos);
        let entry = self.history[pos].clone();
        self.set(&entry);
        true
    }

    /// Step forward through history, restoring the draft past the end
    pub fn history_next(&mut self) -> bool {
        let Some(pos) = self.history_pos else {
            return false;
        };
        if pos + 1 < self.history.len() {
            self.history_pos = Some(pos + 1);
            let entry = self.history[pos + 1].clone();
            self.set(&entry);
        } else {
            self.history_pos = None;
            let draft = std::mem::take(&mut self.draft);
            self.set(&draft);
        }
        true
    }

    /// Apply an editing key; returns false for keys the editor ignores
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        match key {
            KeyEvent::Char(c) => self.insert(*c),
            KeyEvent::Backspace => {
                self.backspace();
            }
            KeyEvent::Delete => {
                self.delete();
            }
            KeyEvent::Left => {
                self.move_left();
            }
            KeyEvent::Right => {
                self.move_right();
            }
            KeyEvent::Home | KeyEvent::Ctrl('a') => self.move_home(),
            KeyEvent::End | KeyEvent::Ctrl('e') => self.move_end(),
            KeyEvent::Ctrl('k') => {
                self.kill_to_end();
            }
            KeyEvent::Ctrl('u') => {
                self.kill_to_start();
            }
            KeyEvent::Ctrl('w') => {
                self.kill_word();
            }
            KeyEvent::Up => {
                self.history_prev();
            }
            KeyEvent::Down => {
                self.history_next();
            }
            _ => return false,
        }
        true
    }
}

/// Which input node currently owns the terminal cursor
///
/// Focus only changes through [`FocusContext::set_focus`] and
/// [`FocusContext::clear`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusContext {
    input: Option<NodeId>,
}

impl FocusContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Focus `input`, returning the previous holder
    pub fn set_focus(&mut self, input: NodeId) -> Option<NodeId> {
        debug!(?input, "focus changed");
        self.input.replace(input)
    }

    pub fn clear(&mut self) -> Option<NodeId> {
        self.input.take()
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.input
    }

    pub fn is_focused(&self, input: NodeId) -> bool {
        self.input == Some(input)
    }
}
