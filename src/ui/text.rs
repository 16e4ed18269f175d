//! Attributed text
//!
//! Text is styled through a sparse map from character index to
//! [`AttributePoint`]. A point stays in effect until the next higher index
//! present in the map. Indices count chars, not bytes.

use std::collections::BTreeMap;

use super::render::{Cell, RenderBuffer, Style};

/// Foreground/background pair (plus attributes) taking effect from a
/// character index onward
pub type AttributePoint = Style;

/// Sparse char-index → style breakpoints, read in ascending order
pub type StyleMap = BTreeMap<usize, AttributePoint>;

/// Breakpoint that resets to the terminal default
pub const RESET: AttributePoint = Style {
    fg: None,
    bg: None,
    bold: false,
    dim: false,
};

/// Single-breakpoint map applying `style` to the whole string
pub fn uniform(style: Style) -> StyleMap {
    StyleMap::from([(0, style)])
}

/// Convert a string into one styled cell per char
///
/// Without a breakpoint at 0 the leading chars use [`RESET`].
pub fn gen_cells(text: &str, points: &StyleMap) -> Vec<Cell> {
    let mut current = RESET;
    let mut breakpoints = points.iter().peekable();

    text.chars()
        .enumerate()
        .map(|(index, c)| {
            while let Some((_, style)) = breakpoints.next_if(|(at, _)| **at <= index) {
                current = *style;
            }
            Cell::with_style(c, &current)
        })
        .collect()
}

/// Rows needed to show `count` cells wrapped at `width`: `ceil(count / width)`
///
/// A zero width cannot hold anything, so it reports 0 rows.
pub fn height_required(count: usize, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    count.div_ceil(width)
}

/// Split cells into rows of at most `width` cells
pub fn wrap_rows(cells: &[Cell], width: usize) -> Vec<&[Cell]> {
    if width == 0 {
        return Vec::new();
    }
    cells.chunks(width).collect()
}

impl RenderBuffer {
    /// Write cells starting at (x, y), wrapping every `width` columns
    ///
    /// With `max_rows` set, writing stops silently once that many rows are
    /// used. Returns the number of rows touched.
    pub fn set_cells(
        &mut self,
        cells: &[Cell],
        x: i32,
        y: i32,
        width: usize,
        max_rows: Option<usize>,
    ) -> usize {
        let mut rows = 0;
        for row in wrap_rows(cells, width) {
            if max_rows.is_some_and(|max| rows >= max) {
                break;
            }
            for (col, cell) in row.iter().enumerate() {
                self.put(x + col as i32, y + rows as i32, *cell);
            }
            rows += 1;
        }
        rows
    }

    /// Write single-style text, wrapping at `width`
    pub fn simple_text(&mut self, x: i32, y: i32, width: usize, text: &str, style: &Style) -> usize {
        let cells = gen_cells(text, &uniform(*style));
        self.set_cells(&cells, x, y, width, None)
    }
}
