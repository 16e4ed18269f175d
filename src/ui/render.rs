//! Cell grid and drawing primitives
//!
//! `RenderBuffer` is the single surface every render pass writes into. It is
//! cleared and fully repainted each frame, then serialised to ANSI and flushed
//! to the terminal.

use crossterm::style::{Attribute, Color};

use super::layout::Rect;

/// A single cell in the render buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    pub char: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub dim: bool,
}

impl Cell {
    pub fn new(char: char) -> Self {
        Self {
            char,
            ..Default::default()
        }
    }

    pub fn with_style(char: char, style: &Style) -> Self {
        Self {
            char,
            fg: style.fg,
            bg: style.bg,
            bold: style.bold,
            dim: style.dim,
        }
    }

    /// The style this cell was written with
    pub fn style(&self) -> Style {
        Style {
            fg: self.fg,
            bg: self.bg,
            bold: self.bold,
            dim: self.dim,
        }
    }
}

/// Style configuration for drawing
///
/// `None` colours mean the terminal default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub dim: bool,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    pub fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn dim(mut self) -> Self {
        self.dim = true;
        self
    }

    /// Parse a color from string
    /// Supports: hex (#rrggbb), named ANSI colors (red, dark_blue, etc.)
    pub fn parse_color(s: &str) -> Option<Color> {
        if s.starts_with('#') && s.len() == 7 {
            let r = u8::from_str_radix(&s[1..3], 16).ok()?;
            let g = u8::from_str_radix(&s[3..5], 16).ok()?;
            let b = u8::from_str_radix(&s[5..7], 16).ok()?;
            return Some(Color::Rgb { r, g, b });
        }

        Some(match s.to_lowercase().replace('-', "_").as_str() {
            "default" | "reset" => Color::Reset,
            "black" => Color::Black,
            "white" => Color::White,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "magenta" => Color::Magenta,
            "cyan" => Color::Cyan,
            "grey" | "gray" => Color::Grey,
            "dark_grey" | "dark_gray" | "darkgrey" | "darkgray" => Color::DarkGrey,
            "dark_red" => Color::DarkRed,
            "dark_green" => Color::DarkGreen,
            "dark_yellow" => Color::DarkYellow,
            "dark_blue" => Color::DarkBlue,
            "dark_magenta" => Color::DarkMagenta,
            "dark_cyan" => Color::DarkCyan,
            _ => return None,
        })
    }
}

/// Box drawing characters used for window frames
pub struct BoxChars;

impl BoxChars {
    pub const TOP_LEFT: char = '╭';
    pub const TOP_RIGHT: char = '╮';
    pub const BOTTOM_LEFT: char = '╰';
    pub const BOTTOM_RIGHT: char = '╯';
    pub const HORIZONTAL: char = '─';
    pub const VERTICAL: char = '│';
}

/// Column at which a title of `len` chars starts when centred over `width`
pub fn centered_start(width: i32, len: i32) -> i32 {
    width / 2 - len / 2
}

/// A 2D buffer of cells for composing terminal output
#[derive(Debug, Clone, PartialEq)]
pub struct RenderBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl RenderBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let size = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![Cell::default(); size],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Full-surface rectangle
    pub fn area(&self) -> Rect {
        Rect::full(self.width, self.height)
    }

    /// Reallocate for a new terminal size; contents are cleared
    pub fn resize(&mut self, width: u16, height: u16) {
        if width == self.width && height == self.height {
            self.clear();
            return;
        }
        *self = Self::new(width, height);
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32 {
            Some((y as usize) * (self.width as usize) + (x as usize))
        } else {
            None
        }
    }

    /// Get a cell (returns None if out of bounds)
    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Get a mutable cell (returns None if out of bounds)
    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    /// Write a prepared cell; out-of-bounds writes are dropped
    pub fn put(&mut self, x: i32, y: i32, cell: Cell) {
        if let Some(slot) = self.get_mut(x, y) {
            *slot = cell;
        }
    }

    /// Set a character at position with style
    pub fn set(&mut self, x: i32, y: i32, c: char, style: &Style) {
        self.put(x, y, Cell::with_style(c, style));
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Fill a region with a character and style
    pub fn fill(&mut self, rect: Rect, c: char, style: &Style) {
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.set(x, y, c, style);
            }
        }
    }

    /// Print a single line of text at position with style, no wrapping
    pub fn print(&mut self, x: i32, y: i32, text: &str, style: &Style) {
        for (i, c) in text.chars().enumerate() {
            let cx = x + i as i32;
            if cx >= self.width as i32 {
                break;
            }
            self.set(cx, y, c, style);
        }
    }

    /// Draw a bordered window with a centred title on the top edge
    ///
    /// The interior is filled with spaces in `style`, so the background
    /// colour of the style becomes the window background.
    pub fn draw_window(&mut self, rect: Rect, title: &str, style: &Style) {
        if rect.width < 2 || rect.height < 2 {
            self.fill(rect, ' ', style);
            return;
        }

        let title: Vec<char> = title.chars().collect();
        let title_len = title.len() as i32;
        let title_start = centered_start(rect.width, title_len);
        let last_col = rect.width - 1;
        let last_row = rect.height - 1;

        for row in 0..rect.height {
            for col in 0..rect.width {
                let c = if row == 0 && col >= title_start && col < title_start + title_len {
                    title[(col - title_start) as usize]
                } else {
                    match (row, col) {
                        (0, 0) => BoxChars::TOP_LEFT,
                        (0, c) if c == last_col => BoxChars::TOP_RIGHT,
                        (r, 0) if r == last_row => BoxChars::BOTTOM_LEFT,
                        (r, c) if r == last_row && c == last_col => BoxChars::BOTTOM_RIGHT,
                        (0, _) => BoxChars::HORIZONTAL,
                        (r, _) if r == last_row => BoxChars::HORIZONTAL,
                        (_, 0) => BoxChars::VERTICAL,
                        (_, c) if c == last_col => BoxChars::VERTICAL,
                        _ => ' ',
                    }
                };
                self.set(rect.x + col, rect.y + row, c, style);
            }
        }
    }

    /// Draw a banner across row 0, centring `text` and padding with `fill`
    pub fn draw_header(&mut self, text: &str, fill: char, style: &Style) {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len() as i32;
        let width = self.width as i32;
        let start = centered_start(width, len);

        for x in 0..width {
            let c = if x >= start && x < start + len {
                chars[(x - start) as usize]
            } else {
                fill
            };
            self.set(x, 0, c, style);
        }
    }

    /// Read back a row as plain text (NUL cells become spaces)
    pub fn row_text(&self, y: i32) -> String {
        (0..self.width as i32)
            .filter_map(|x| self.get(x, y))
            .map(|cell| if cell.char == '\0' { ' ' } else { cell.char })
            .collect()
    }

    /// Render buffer to ANSI string
    pub fn to_ansi(&self) -> String {
        use crossterm::style::{ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor};
        use crossterm::Command;

        let mut output = String::new();

        for y in 0..self.height {
            if y > 0 {
                output.push_str("\r\n");
            }

            let mut last_fg: Option<Color> = None;
            let mut last_bg: Option<Color> = None;
            let mut last_bold = false;
            let mut last_dim = false;

            for x in 0..self.width {
                let cell = &self.cells[(y as usize) * (self.width as usize) + (x as usize)];

                // Attributes can only be turned off wholesale
                let needs_reset = (last_bold && !cell.bold) || (last_dim && !cell.dim);
                if needs_reset {
                    let _ = SetAttribute(Attribute::Reset).write_ansi(&mut output);
                    let _ = ResetColor.write_ansi(&mut output);
                    last_fg = None;
                    last_bg = None;
                    last_bold = false;
                    last_dim = false;
                }

                if cell.bold && !last_bold {
                    let _ = SetAttribute(Attribute::Bold).write_ansi(&mut output);
                    last_bold = true;
                }

                if cell.dim && !last_dim {
                    let _ = SetAttribute(Attribute::Dim).write_ansi(&mut output);
                    last_dim = true;
                }

                if cell.fg != last_fg {
                    let _ = SetForegroundColor(cell.fg.unwrap_or(Color::Reset))
                        .write_ansi(&mut output);
                    last_fg = cell.fg;
                }

                if cell.bg != last_bg {
                    let _ = SetBackgroundColor(cell.bg.unwrap_or(Color::Reset))
                        .write_ansi(&mut output);
                    last_bg = cell.bg;
                }

                output.push(if cell.char == '\0' { ' ' } else { cell.char });
            }

            let _ = SetAttribute(Attribute::Reset).write_ansi(&mut output);
            let _ = ResetColor.write_ansi(&mut output);
        }

        output
    }
}
