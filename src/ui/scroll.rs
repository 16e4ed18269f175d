//! Scrollback state for the message pane
//!
//! Offsets count wrapped rows from the top of the content. In tail mode the
//! view follows new content; any upward scroll pins it until the user returns
//! to the bottom.

/// Scroll mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollMode {
    /// Follow new content automatically
    #[default]
    Tail,
    /// Stay at fixed position
    Pinned,
}

/// Scroll state for a single scrollable region
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrollState {
    /// Rows hidden above the viewport
    pub offset: i32,
    /// Total content height in rows
    pub content_height: i32,
    /// Viewport height in rows
    pub viewport_height: i32,
    pub mode: ScrollMode,
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum valid scroll offset
    pub fn max_offset(&self) -> i32 {
        (self.content_height - self.viewport_height).max(0)
    }

    /// Scroll towards older content
    pub fn scroll_up(&mut self, n: i32) {
        self.offset = (self.offset - n).max(0);
        if self.offset < self.max_offset() {
            self.mode = ScrollMode::Pinned;
        }
    }

    /// Scroll towards newer content; reaching the bottom resumes tailing
    pub fn scroll_down(&mut self, n: i32) {
        self.offset = (self.offset + n).min(self.max_offset());
        if self.offset >= self.max_offset() {
            self.mode = ScrollMode::Tail;
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
        self.mode = ScrollMode::Pinned;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
        self.mode = ScrollMode::Tail;
    }

    /// Rows moved by a page command: the configured step, or the viewport
    /// minus two rows of context
    pub fn page_size(&self, step: Option<i32>) -> i32 {
        step.unwrap_or(self.viewport_height - 2).max(1)
    }

    pub fn page_up(&mut self, step: Option<i32>) {
        self.scroll_up(self.page_size(step));
    }

    pub fn page_down(&mut self, step: Option<i32>) {
        self.scroll_down(self.page_size(step));
    }

    /// Update both heights at once, as a render pass does
    pub fn resize(&mut self, content_height: i32, viewport_height: i32) {
        self.content_height = content_height.max(0);
        self.viewport_height = viewport_height.max(0);
        if self.mode == ScrollMode::Tail {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    pub fn at_bottom(&self) -> bool {
        self.offset >= self.max_offset()
    }

    /// Visible rows as a half-open range (start, end)
    pub fn visible_range(&self) -> (i32, i32) {
        let start = self.offset;
        let end = (start + self.viewport_height).min(self.content_height);
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_follows_content() {
        let mut state = ScrollState::new();
        state.resize(50, 10);

        assert_eq!(state.max_offset(), 40);
        assert_eq!(state.offset, 40);
        assert!(state.at_bottom());

        state.resize(60, 10);
        assert_eq!(state.offset, 50);
    }

    #[test]
    fn test_scroll_up_pins() {
        let mut state = ScrollState::new();
        state.resize(50, 10);

        state.scroll_up(5);
        assert_eq!(state.offset, 35);
        assert_eq!(state.mode, ScrollMode::Pinned);

        // New content does not move a pinned view
        state.resize(70, 10);
        assert_eq!(state.offset, 35);

        state.scroll_to_bottom();
        assert_eq!(state.offset, 60);
        assert_eq!(state.mode, ScrollMode::Tail);
    }

    #[test]
    fn test_scroll_down_to_bottom_resumes_tail() {
        let mut state = ScrollState::new();
        state.resize(30, 10);
        state.scroll_to_top();

        state.scroll_down(100);
        assert_eq!(state.offset, 20);
        assert_eq!(state.mode, ScrollMode::Tail);
    }

    #[test]
    fn test_page_navigation() {
        let mut state = ScrollState::new();
        state.resize(50, 10);
        state.scroll_to_top();

        state.page_down(None);
        assert_eq!(state.offset, 8); // viewport - 2

        state.page_up(None);
        assert_eq!(state.offset, 0);

        state.page_down(Some(3));
        assert_eq!(state.offset, 3);
    }

    #[test]
    fn test_content_shorter_than_viewport() {
        let mut state = ScrollState::new();
        state.resize(4, 10);

        assert_eq!(state.offset, 0);
        state.scroll_up(3);
        assert_eq!(state.offset, 0);
        assert_eq!(state.visible_range(), (0, 4));
    }

    #[test]
    fn test_visible_range() {
        let mut state = ScrollState::new();
        state.resize(50, 10);
        state.scroll_up(20);

        assert_eq!(state.visible_range(), (20, 30));
    }
}
