//! Displayable history entries
//!
//! The chat domain (servers, channels, authors) lives outside the UI core.
//! What reaches the message pane is a closed set of entry variants, each able
//! to turn itself into styled cells.

use std::collections::VecDeque;

use crossterm::style::Color;

use crate::ui::render::{Cell, Style};
use crate::ui::text::{gen_cells, StyleMap, RESET};

/// Label describing where a chat entry was posted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextLabel {
    /// A named channel
    Channel(String),
    /// A direct conversation without a channel name
    Direct,
    /// Lookup failed; carries the reason shown inline
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub author: String,
    pub context: ContextLabel,
    pub body: String,
}

/// One line item of the message pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEntry {
    Chat(ChatEntry),
    Log(String),
}

/// Styles for the labelled parts of an entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryStyles {
    pub channel: Style,
    pub direct: Style,
    pub author: Style,
    pub error: Style,
    pub log: Style,
}

impl Default for EntryStyles {
    fn default() -> Self {
        Self {
            channel: Style::new().fg(Color::Green),
            direct: Style::new().fg(Color::Magenta),
            author: Style::new().fg(Color::Cyan).bold(),
            error: Style::new().fg(Color::White).bg(Color::Red),
            log: Style::new().fg(Color::Yellow),
        }
    }
}

const DIRECT_LABEL: &str = "Direct Message";

impl DisplayEntry {
    pub fn chat(
        author: impl Into<String>,
        context: ContextLabel,
        body: impl Into<String>,
    ) -> Self {
        DisplayEntry::Chat(ChatEntry {
            author: author.into(),
            context,
            body: body.into(),
        })
    }

    pub fn log(text: impl Into<String>) -> Self {
        DisplayEntry::Log(text.into())
    }

    /// Full text plus style breakpoints
    pub fn attributed(&self, styles: &EntryStyles) -> (String, StyleMap) {
        match self {
            DisplayEntry::Chat(chat) => {
                let (prefix, prefix_style) = match &chat.context {
                    ContextLabel::Channel(name) => (format!("[{name}]"), styles.channel),
                    ContextLabel::Direct => (format!("[{DIRECT_LABEL}]"), styles.direct),
                    ContextLabel::Unavailable(reason) => {
                        (format!("(error getting channel: {reason}) "), styles.error)
                    }
                };
                let prefix_len = prefix.chars().count();
                let author_end = prefix_len + chat.author.chars().count();
                let text = format!("{prefix}{}: {}", chat.author, chat.body);
                let points = StyleMap::from([
                    (0, prefix_style),
                    (prefix_len, styles.author),
                    (author_end, RESET),
                ]);
                (text, points)
            }
            DisplayEntry::Log(line) => (format!("Log: {line}"), StyleMap::from([(0, styles.log)])),
        }
    }

    pub fn cells(&self, styles: &EntryStyles) -> Vec<Cell> {
        let (text, points) = self.attributed(styles);
        gen_cells(&text, &points)
    }
}

/// Bounded, most-recent-last list of entries
#[derive(Debug, Clone)]
pub struct MessageHistory {
    entries: VecDeque<DisplayEntry>,
    limit: usize,
}

impl MessageHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Append an entry, dropping the oldest past the limit
    pub fn push(&mut self, entry: DisplayEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    pub fn log(&mut self, text: impl Into<String>) {
        self.push(DisplayEntry::log(text));
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &DisplayEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
