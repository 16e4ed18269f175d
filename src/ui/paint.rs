//! Render pass: layout tree → cell grid
//!
//! Walks a resolved [`Layout`] in draw order and emits cells for every
//! drawable node. Nothing here fails: content that does not fit is clipped
//! by the node rect or the grid.

use super::input::FocusContext;
use super::layout::{InputNode, Layout, LayoutTree, NodeKind, Rect, TextNode};
use super::render::RenderBuffer;
use super::text::gen_cells;

/// Paint every node of `layout` into `buffer`
///
/// Returns the terminal cursor position when the focused input is visible.
pub fn paint(
    tree: &LayoutTree,
    layout: &Layout,
    buffer: &mut RenderBuffer,
    focus: &FocusContext,
) -> Option<(u16, u16)> {
    let mut cursor = None;

    for id in layout.draw_order() {
        let (Ok(kind), Some(rect)) = (tree.kind(*id), layout.rect(*id)) else {
            continue;
        };
        match kind {
            NodeKind::Empty | NodeKind::Container(_) => {}
            NodeKind::Window(window) => buffer.draw_window(rect, &window.title, &window.style),
            NodeKind::Text(text) => paint_text(buffer, rect, text),
            NodeKind::Input(input) => {
                let at = paint_input(buffer, rect, input);
                if focus.is_focused(*id) {
                    cursor = at;
                }
            }
        }
    }

    cursor.filter(|(x, y)| *x < buffer.width() && *y < buffer.height())
}

fn paint_text(buffer: &mut RenderBuffer, rect: Rect, text: &TextNode) {
    if rect.is_empty() {
        return;
    }
    let cells = gen_cells(&text.text, &text.points);
    buffer.set_cells(
        &cells,
        rect.x,
        rect.y,
        rect.width as usize,
        Some(rect.height as usize),
    );
}

/// Draw prompt and text on the first row of `rect`, scrolling horizontally
/// so the cursor stays inside. Returns where the cursor belongs.
fn paint_input(buffer: &mut RenderBuffer, rect: Rect, input: &InputNode) -> Option<(u16, u16)> {
    if rect.is_empty() {
        return None;
    }
    let row = Rect::new(rect.x, rect.y, rect.width, 1);
    buffer.fill(row, ' ', &input.style);

    let mut x = rect.x;
    if !input.prompt.is_empty() {
        buffer.print(x, rect.y, &input.prompt, &input.prompt_style);
        x += input.prompt.chars().count() as i32 + 1;
    }

    let room = (rect.right() - x).max(0) as usize;
    if room == 0 {
        return None;
    }

    let column = input.buffer.cursor_column();
    let skip = (column + 1).saturating_sub(room);
    for (i, c) in input.buffer.text.chars().skip(skip).take(room).enumerate() {
        buffer.set(x + i as i32, rect.y, c, &input.style);
    }

    if input.hide_cursor_when_empty && input.buffer.is_empty() {
        return None;
    }
    let cursor_x = x + (column - skip) as i32;
    if cursor_x < 0 || rect.y < 0 {
        return None;
    }
    Some((cursor_x as u16, rect.y as u16))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::layout::{Anchors, Size, Transform, Vec2, WindowNode};
    use crate::ui::render::Style;

    fn bottom_row() -> Transform {
        Transform::anchored(Anchors::new(Vec2::new(0.0, 1.0), Vec2::ONE).unwrap())
            .with_offset(0, -1)
            .with_size(Size::height(1))
    }

    #[test]
    fn test_paint_window_and_text() {
        let mut tree = LayoutTree::new();
        let window = tree
            .insert(
                tree.root(),
                Transform::anchored(Anchors::FILL),
                NodeKind::Window(WindowNode {
                    title: "Menu".into(),
                    style: Style::new(),
                }),
            )
            .unwrap();
        tree.insert(
            window,
            Transform::anchored(Anchors::FILL),
            NodeKind::Text(TextNode::new("abcdefghij", Style::new())),
        )
        .unwrap();

        let layout = tree.layout(Rect::full(8, 4)).unwrap();
        let mut buf = RenderBuffer::new(8, 4);
        let cursor = paint(&tree, &layout, &mut buf, &FocusContext::new());

        assert_eq!(cursor, None);
        assert_eq!(buf.row_text(0), "╭─Menu─╮");
        assert_eq!(buf.row_text(1), "│abcdef│");
        assert_eq!(buf.row_text(2), "│ghij  │");
        assert_eq!(buf.row_text(3), "╰──────╯");
    }

    #[test]
    fn test_text_clipped_to_rect_height() {
        let mut tree = LayoutTree::new();
        tree.insert(
            tree.root(),
            Transform::anchored(Anchors::FILL_WIDTH).with_size(Size::height(1)),
            NodeKind::Text(TextNode::new("abcdefgh", Style::new())),
        )
        .unwrap();

        let layout = tree.layout(Rect::full(4, 3)).unwrap();
        let mut buf = RenderBuffer::new(4, 3);
        paint(&tree, &layout, &mut buf, &FocusContext::new());

        assert_eq!(buf.row_text(0), "abcd");
        assert_eq!(buf.row_text(1), "    ");
    }

    #[test]
    fn test_focused_input_reports_cursor() {
        let mut tree = LayoutTree::new();
        let mut node = InputNode::new(Style::new()).with_prompt("Send:", Style::new());
        node.buffer.set("hi");
        let input = tree
            .insert(tree.root(), bottom_row(), NodeKind::Input(node))
            .unwrap();

        let layout = tree.layout(Rect::full(20, 5)).unwrap();
        let mut buf = RenderBuffer::new(20, 5);

        let unfocused = paint(&tree, &layout, &mut buf, &FocusContext::new());
        assert_eq!(unfocused, None);

        let mut focus = FocusContext::new();
        focus.set_focus(input);
        let cursor = paint(&tree, &layout, &mut buf, &focus);
        assert_eq!(cursor, Some((8, 4)));
        assert_eq!(buf.row_text(4), "Send: hi            ");
    }

    #[test]
    fn test_long_input_scrolls_to_cursor() {
        let mut tree = LayoutTree::new();
        let mut node = InputNode::new(Style::new());
        node.buffer.set("abcdefghij");
        let input = tree
            .insert(tree.root(), bottom_row(), NodeKind::Input(node))
            .unwrap();

        let layout = tree.layout(Rect::full(6, 1)).unwrap();
        let mut buf = RenderBuffer::new(6, 1);
        let mut focus = FocusContext::new();
        focus.set_focus(input);

        let cursor = paint(&tree, &layout, &mut buf, &focus);
        assert_eq!(buf.row_text(0), "fghij ");
        assert_eq!(cursor, Some((5, 0)));
    }

    #[test]
    fn test_hidden_cursor_when_empty() {
        let mut tree = LayoutTree::new();
        let mut node = InputNode::new(Style::new());
        node.hide_cursor_when_empty = true;
        let input = tree
            .insert(tree.root(), bottom_row(), NodeKind::Input(node))
            .unwrap();

        let layout = tree.layout(Rect::full(10, 2)).unwrap();
        let mut buf = RenderBuffer::new(10, 2);
        let mut focus = FocusContext::new();
        focus.set_focus(input);

        assert_eq!(paint(&tree, &layout, &mut buf, &focus), None);
    }

    #[test]
    fn test_higher_layer_paints_last() {
        let mut tree = LayoutTree::new();
        tree.insert(
            tree.root(),
            Transform::anchored(Anchors::FILL).with_layer(2),
            NodeKind::Text(TextNode::new("top", Style::new())),
        )
        .unwrap();
        tree.insert(
            tree.root(),
            Transform::anchored(Anchors::FILL),
            NodeKind::Text(TextNode::new("under", Style::new())),
        )
        .unwrap();

        let layout = tree.layout(Rect::full(5, 1)).unwrap();
        let mut buf = RenderBuffer::new(5, 1);
        paint(&tree, &layout, &mut buf, &FocusContext::new());
        assert_eq!(buf.row_text(0), "toper");
    }
}
