//! Message pane
//!
//! Draws the history bottom-up: the newest entry sits on the last row of the
//! pane and older entries stack above it. Scrollback uses [`ScrollState`]
//! over wrapped rows.

use crate::history::{EntryStyles, MessageHistory};

use super::layout::Rect;
use super::render::{Cell, RenderBuffer};
use super::scroll::ScrollState;
use super::text::wrap_rows;

#[derive(Debug, Clone)]
pub struct MessagePane {
    scroll: ScrollState,
    padding: i32,
    page_step: Option<i32>,
}

impl MessagePane {
    pub fn new(padding: u16, page_step: Option<u16>) -> Self {
        Self {
            scroll: ScrollState::new(),
            padding: padding as i32,
            page_step: page_step.map(i32::from),
        }
    }

    pub fn scroll_state(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn page_up(&mut self) {
        self.scroll.page_up(self.page_step);
    }

    pub fn page_down(&mut self) {
        self.scroll.page_down(self.page_step);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll.scroll_to_bottom();
    }

    /// Draw `history` into `area`, inset by the horizontal padding
    pub fn draw(
        &mut self,
        buffer: &mut RenderBuffer,
        area: Rect,
        history: &MessageHistory,
        styles: &EntryStyles,
    ) {
        let inner = area.shrink(0, self.padding, 0, self.padding);
        if inner.is_empty() {
            return;
        }
        let width = inner.width as usize;

        let cells: Vec<Vec<Cell>> = history.iter().map(|entry| entry.cells(styles)).collect();
        let rows: Vec<&[Cell]> = cells.iter().flat_map(|c| wrap_rows(c, width)).collect();

        self.scroll.resize(rows.len() as i32, inner.height);
        let (start, end) = self.scroll.visible_range();
        let top = inner.bottom() - (end - start);

        for (i, row) in rows[start as usize..end as usize].iter().enumerate() {
            for (col, cell) in row.iter().enumerate() {
                buffer.put(inner.x + col as i32, top + i as i32, *cell);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::DisplayEntry;

    fn history(lines: &[&str]) -> MessageHistory {
        let mut history = MessageHistory::new(100);
        for line in lines {
            history.log(*line);
        }
        history
    }

    #[test]
    fn test_newest_entry_on_bottom_row() {
        let mut pane = MessagePane::new(1, None);
        let mut buf = RenderBuffer::new(12, 5);
        let hist = history(&["a", "b"]);

        pane.draw(&mut buf, Rect::new(0, 1, 12, 3), &hist, &EntryStyles::default());

        assert_eq!(buf.row_text(1), "            ");
        assert_eq!(buf.row_text(2), " Log: a     ");
        assert_eq!(buf.row_text(3), " Log: b     ");
    }

    #[test]
    fn test_wrapped_entry_uses_padding_width() {
        let mut pane = MessagePane::new(2, None);
        let mut buf = RenderBuffer::new(10, 4);
        let hist = history(&["abcdef"]);

        pane.draw(&mut buf, Rect::new(0, 0, 10, 4), &hist, &EntryStyles::default());

        // "Log: abcdef" is 11 cells at width 6
        assert_eq!(buf.row_text(2), "  Log: a  ");
        assert_eq!(buf.row_text(3), "  bcdef   ");
    }

    #[test]
    fn test_scrollback_pages() {
        let mut pane = MessagePane::new(0, Some(2));
        let mut buf = RenderBuffer::new(8, 3);
        let lines: Vec<String> = (0..6).map(|i| format!("{i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let hist = history(&refs);
        let styles = EntryStyles::default();
        let area = Rect::new(0, 0, 8, 3);

        pane.draw(&mut buf, area, &hist, &styles);
        assert_eq!(buf.row_text(2), "Log: 5  ");
        assert!(pane.scroll_state().at_bottom());

        pane.page_up();
        buf.clear();
        pane.draw(&mut buf, area, &hist, &styles);
        assert_eq!(buf.row_text(0), "Log: 1  ");
        assert_eq!(buf.row_text(2), "Log: 3  ");

        // New entries do not move a pinned view
        let mut hist = hist;
        hist.push(DisplayEntry::log("6"));
        buf.clear();
        pane.draw(&mut buf, area, &hist, &styles);
        assert_eq!(buf.row_text(2), "Log: 3  ");

        pane.scroll_to_bottom();
        buf.clear();
        pane.draw(&mut buf, area, &hist, &styles);
        assert_eq!(buf.row_text(2), "Log: 6  ");
    }

    #[test]
    fn test_too_narrow_draws_nothing() {
        let mut pane = MessagePane::new(3, None);
        let mut buf = RenderBuffer::new(6, 2);
        pane.draw(&mut buf, Rect::new(0, 0, 6, 2), &history(&["x"]), &EntryStyles::default());
        assert_eq!(buf.row_text(0), "      ");
        assert_eq!(buf.row_text(1), "      ");
    }
}
