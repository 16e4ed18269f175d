//! Searchable option list
//!
//! A [`MenuWindow`] owns a canonical list of [`MenuItem`]s and a subtree of
//! the layout tree:
//!
//! ```text
//! root (Empty, caller anchors)
//! └── Window (title)
//!     └── Stacked { expand_width }
//!         ├── list    Dynamic { allow_zero_size }   ← one Text per visible item
//!         ├── search  Input
//!         └── lower   Dynamic
//!             └── Window
//!                 └── info Text
//! ```
//!
//! State changes (options, search text, highlight, marks, resize) only raise
//! the dirty flag. [`MenuWindow::update`] turns the filtered view into Text
//! nodes when it is set.

use serde::Deserialize;
use tracing::debug;

use super::input::{InputEvent, KeyEvent};
use super::layout::{
    Anchors, ContainerPolicy, InputNode, Layout, LayoutError, LayoutTree, NodeId, NodeKind, Size,
    TextNode, Transform, WindowNode,
};
use super::render::Style;
use super::text::{height_required, uniform};

/// One selectable entry
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem<T> {
    pub label: String,
    pub info: String,
    pub payload: T,
    pub marked: bool,
    pub highlighted: bool,
}

impl<T> MenuItem<T> {
    pub fn new(label: impl Into<String>, info: impl Into<String>, payload: T) -> Self {
        Self {
            label: label.into(),
            info: info.into(),
            payload,
            marked: false,
            highlighted: false,
        }
    }
}

/// Navigation commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Start,
    End,
}

/// Order of filtered results by match score
///
/// Ascending puts the weakest matches first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankOrder {
    #[default]
    Ascending,
    Descending,
}

/// Styles for the four {highlighted, marked} combinations plus chrome
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuStyles {
    pub normal: Style,
    pub marked: Style,
    pub selected: Style,
    pub marked_selected: Style,
    pub window: Style,
    pub search: Style,
}

impl Default for MenuStyles {
    fn default() -> Self {
        use crossterm::style::Color;
        Self {
            normal: Style::new(),
            marked: Style::new().fg(Color::Yellow),
            selected: Style::new().fg(Color::White).bg(Color::Blue),
            marked_selected: Style::new().fg(Color::Yellow).bg(Color::Blue).bold(),
            window: Style::new(),
            search: Style::new(),
        }
    }
}

impl MenuStyles {
    pub fn for_item(&self, highlighted: bool, marked: bool) -> Style {
        match (highlighted, marked) {
            (true, true) => self.marked_selected,
            (true, false) => self.selected,
            (false, true) => self.marked,
            (false, false) => self.normal,
        }
    }
}

/// Clamp `index` into `[0, len)`; an empty list has no valid index
pub fn clamp_index(index: isize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(index.clamp(0, len as isize - 1) as usize)
}

fn tokens(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| c.is_whitespace() || c == '_')
        .filter(|t| !t.is_empty())
}

/// Number of (search token, label token) pairs where the label token
/// contains the search token, ignoring case
pub fn match_score(search: &str, label: &str) -> usize {
    let label_tokens: Vec<String> = tokens(label).map(str::to_lowercase).collect();
    tokens(search)
        .map(str::to_lowercase)
        .map(|needle| {
            label_tokens
                .iter()
                .filter(|token| token.contains(&needle))
                .count()
        })
        .sum()
}

/// Indices of the labels that match `search`, ranked by score
///
/// An empty search keeps every index in canonical order. The sort is stable,
/// so equal scores keep their canonical order.
pub fn filter_indices<'a>(
    labels: impl IntoIterator<Item = &'a str>,
    search: &str,
    order: RankOrder,
) -> Vec<usize> {
    if search.is_empty() {
        return labels.into_iter().enumerate().map(|(i, _)| i).collect();
    }

    let mut scored: Vec<(usize, usize)> = labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| (i, match_score(search, label)))
        .filter(|(_, score)| *score > 0)
        .collect();

    match order {
        RankOrder::Ascending => scored.sort_by_key(|(_, score)| *score),
        RankOrder::Descending => scored.sort_by_key(|(_, score)| std::cmp::Reverse(*score)),
    }
    scored.into_iter().map(|(i, _)| i).collect()
}

/// Composite list widget: search field, filtered list and info pane
#[derive(Debug)]
pub struct MenuWindow<T> {
    root: NodeId,
    main: NodeId,
    list: NodeId,
    search: NodeId,
    lower: NodeId,
    info: NodeId,
    layer: i32,
    styles: MenuStyles,
    rank_order: RankOrder,

    options: Vec<MenuItem<T>>,
    /// Canonical index of the highlighted item
    highlighted: Option<usize>,
    /// Canonical indices currently shown, in display order
    view: Vec<usize>,
    last_search: String,
    viewport: i32,
    dirty: bool,
}

impl<T> MenuWindow<T> {
    /// Build the widget subtree under `parent`
    ///
    /// The search field is not focused; hosts call
    /// `FocusContext::set_focus(menu.search_input())` when they want it.
    pub fn new(
        tree: &mut LayoutTree,
        parent: NodeId,
        title: &str,
        anchors: Anchors,
        layer: i32,
        styles: MenuStyles,
    ) -> Result<Self, LayoutError> {
        let fill = Transform::anchored(Anchors::FILL).with_layer(layer);

        let root = tree.insert(
            parent,
            Transform::anchored(anchors).with_layer(layer),
            NodeKind::Empty,
        )?;
        let window = tree.insert(
            root,
            fill,
            NodeKind::Window(WindowNode {
                title: title.to_string(),
                style: styles.window,
            }),
        )?;
        let main = tree.insert(
            window,
            fill,
            NodeKind::Container(ContainerPolicy::Stacked { expand_width: true }),
        )?;
        let list = tree.insert(
            main,
            fill,
            NodeKind::Container(ContainerPolicy::Dynamic {
                allow_zero_size: true,
            }),
        )?;

        let mut search_node = InputNode::new(styles.search);
        search_node.hide_cursor_when_empty = true;
        let search = tree.insert(
            main,
            Transform::anchored(Anchors::FILL_WIDTH).with_layer(layer + 1),
            NodeKind::Input(search_node),
        )?;

        let lower = tree.insert(
            main,
            fill,
            NodeKind::Container(ContainerPolicy::Dynamic {
                allow_zero_size: false,
            }),
        )?;
        let lower_window = tree.insert(
            lower,
            fill,
            NodeKind::Window(WindowNode {
                title: String::new(),
                style: styles.window,
            }),
        )?;
        let info = tree.insert(
            lower_window,
            fill,
            NodeKind::Text(TextNode::new("", styles.normal)),
        )?;

        debug!(?root, title, layer, "menu created");

        Ok(Self {
            root,
            main,
            list,
            search,
            lower,
            info,
            layer,
            styles,
            rank_order: RankOrder::default(),
            options: Vec::new(),
            highlighted: None,
            view: Vec::new(),
            last_search: String::new(),
            viewport: 0,
            dirty: true,
        })
    }

    /// Node holding the whole widget
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The search field, for focus
    pub fn search_input(&self) -> NodeId {
        self.search
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rows available to list items at the last rebuild
    pub fn viewport_height(&self) -> i32 {
        self.viewport
    }

    pub fn rank_order(&self) -> RankOrder {
        self.rank_order
    }

    pub fn set_rank_order(&mut self, order: RankOrder) {
        self.rank_order = order;
        self.refilter();
    }

    /// Replace the canonical list; the highlight is re-clamped
    pub fn set_options(&mut self, options: impl IntoIterator<Item = MenuItem<T>>) {
        self.options = options.into_iter().collect();
        for item in &mut self.options {
            item.highlighted = false;
        }
        let previous = self.highlighted.unwrap_or(0);
        self.highlighted = None;
        if let Some(index) = clamp_index(previous as isize, self.options.len()) {
            self.apply_highlight(index);
        }
        self.refilter();
    }

    /// Replace the list with bare labels and default payloads
    pub fn set_options_from_labels<S: Into<String>>(&mut self, labels: impl IntoIterator<Item = S>)
    where
        T: Default,
    {
        self.set_options(
            labels
                .into_iter()
                .map(|label| MenuItem::new(label, String::new(), T::default())),
        );
    }

    pub fn options(&self) -> &[MenuItem<T>] {
        &self.options
    }

    /// Items in display order for the current search
    pub fn filtered_options(&self) -> Vec<&MenuItem<T>> {
        self.view.iter().map(|i| &self.options[*i]).collect()
    }

    pub fn search_text(&self) -> &str {
        &self.last_search
    }

    fn refilter(&mut self) {
        self.view = filter_indices(
            self.options.iter().map(|item| item.label.as_str()),
            &self.last_search,
            self.rank_order,
        );
        let visible = self
            .highlighted
            .is_some_and(|index| self.view.contains(&index));
        if !visible {
            if let Some(first) = self.view.first().copied() {
                self.apply_highlight(first);
            }
        }
        self.dirty = true;
    }

    fn apply_highlight(&mut self, index: usize) {
        if let Some(previous) = self.highlighted.and_then(|i| self.options.get_mut(i)) {
            previous.highlighted = false;
        }
        self.options[index].highlighted = true;
        self.highlighted = Some(index);
        self.dirty = true;
    }

    /// Highlight a canonical index, clamped into range; no-op when empty
    pub fn set_highlighted(&mut self, index: isize) {
        if let Some(index) = clamp_index(index, self.options.len()) {
            self.apply_highlight(index);
        }
    }

    /// Canonical index of the highlighted item, if it is currently shown
    pub fn highlighted_index(&self) -> Option<usize> {
        self.highlighted.filter(|index| self.view.contains(index))
    }

    /// The highlighted item, if it is currently shown
    pub fn highlighted(&self) -> Option<&MenuItem<T>> {
        self.highlighted_index().map(|index| &self.options[index])
    }

    /// Move the highlight through the filtered view
    pub fn scroll(&mut self, direction: Direction, amount: isize) {
        let len = self.view.len();
        let position = self
            .highlighted
            .and_then(|index| self.view.iter().position(|i| *i == index))
            .unwrap_or(0) as isize;
        let target = match direction {
            Direction::Up => position - amount,
            Direction::Down => position + amount,
            Direction::Start => 0,
            Direction::End => len as isize - 1,
        };
        if let Some(position) = clamp_index(target, len) {
            self.apply_highlight(self.view[position]);
        }
    }

    pub fn mark(&mut self, index: isize) {
        self.set_mark(index, |_| true);
    }

    pub fn unmark(&mut self, index: isize) {
        self.set_mark(index, |_| false);
    }

    pub fn toggle_mark(&mut self, index: isize) {
        self.set_mark(index, |marked| !marked);
    }

    fn set_mark(&mut self, index: isize, f: impl FnOnce(bool) -> bool) {
        if let Some(index) = clamp_index(index, self.options.len()) {
            let item = &mut self.options[index];
            item.marked = f(item.marked);
            self.dirty = true;
        }
    }

    /// Marked items in canonical order
    pub fn marked(&self) -> Vec<&MenuItem<T>> {
        self.options.iter().filter(|item| item.marked).collect()
    }

    /// Pick up search text edited through the tree
    fn sync_search(&mut self, tree: &LayoutTree) -> bool {
        let Some(input) = tree.input(self.search) else {
            return false;
        };
        if input.buffer.text == self.last_search {
            return false;
        }
        self.last_search = input.buffer.text.clone();
        self.refilter();
        true
    }

    /// Route an event to the widget; returns whether it was consumed
    pub fn handle_input(&mut self, tree: &mut LayoutTree, event: &InputEvent) -> bool {
        let page = self.viewport.max(1) as isize;
        match event {
            InputEvent::Resize { .. } => {
                self.dirty = true;
                true
            }
            InputEvent::Key(KeyEvent::Up) => {
                self.scroll(Direction::Up, 1);
                true
            }
            InputEvent::Key(KeyEvent::Down) => {
                self.scroll(Direction::Down, 1);
                true
            }
            InputEvent::Key(KeyEvent::PageUp) => {
                self.scroll(Direction::Up, page);
                true
            }
            InputEvent::Key(KeyEvent::PageDown) => {
                self.scroll(Direction::Down, page);
                true
            }
            InputEvent::Key(KeyEvent::Home) => {
                self.scroll(Direction::Start, 0);
                true
            }
            InputEvent::Key(KeyEvent::End) => {
                self.scroll(Direction::End, 0);
                true
            }
            InputEvent::Key(key) => {
                let consumed = tree
                    .input_mut(self.search)
                    .is_some_and(|input| input.buffer.handle_key(key));
                self.sync_search(tree);
                consumed
            }
        }
    }

    /// Rebuild the item nodes if anything changed since the last call
    ///
    /// `layout` must be a layout of `tree` that already includes this
    /// widget. Returns whether a rebuild happened.
    pub fn update(&mut self, tree: &mut LayoutTree, layout: &Layout) -> Result<bool, LayoutError> {
        self.sync_search(tree);
        let dirty = std::mem::take(&mut self.dirty) | tree.take_dirty(self.root)?;
        if !dirty {
            return Ok(false);
        }
        let Some(main) = layout.rect(self.main) else {
            self.dirty = true;
            return Ok(false);
        };
        self.rebuild(tree, main.width, main.height)?;
        Ok(true)
    }

    fn rebuild(&mut self, tree: &mut LayoutTree, width: i32, height: i32) -> Result<(), LayoutError> {
        let info = self
            .highlighted()
            .map(|item| item.info.clone())
            .unwrap_or_default();
        if let NodeKind::Text(text) = tree.kind_mut(self.info)? {
            text.text = info;
        }

        let info_height = tree.natural_height(self.lower, width)?.unwrap_or(0);
        let viewport = (height - 1 - info_height).max(0);
        self.viewport = viewport;

        let heights: Vec<i32> = self
            .view
            .iter()
            .map(|i| {
                let chars = self.options[*i].label.chars().count();
                (height_required(chars, width.max(0) as usize) as i32).max(1)
            })
            .collect();
        let total: i32 = heights.iter().sum();

        // Centre the highlighted item once the list overflows
        let mut offset = 0;
        if total > viewport {
            let position = self
                .highlighted
                .and_then(|index| self.view.iter().position(|i| *i == index))
                .unwrap_or(0);
            let row: i32 = heights[..position].iter().sum();
            let centred = row - (viewport - heights.get(position).copied().unwrap_or(1)) / 2;
            offset = centred.clamp(0, total - viewport);
        }

        tree.clear_children(self.list)?;
        let mut y = -offset;
        let mut shown = 0;
        for (i, height) in self.view.iter().zip(&heights) {
            if y >= 0 && y + height <= viewport {
                let item = &self.options[*i];
                let style = self.styles.for_item(item.highlighted, item.marked);
                tree.insert(
                    self.list,
                    Transform::anchored(Anchors::FILL_WIDTH)
                        .with_offset(0, y)
                        .with_size(Size::height(*height))
                        .with_layer(self.layer),
                    NodeKind::Text(TextNode {
                        text: item.label.clone(),
                        points: uniform(style),
                    }),
                )?;
                shown += 1;
            }
            y += height;
        }

        debug!(
            options = self.options.len(),
            filtered = self.view.len(),
            shown,
            viewport,
            offset,
            "menu rebuilt"
        );
        Ok(())
    }

    /// Remove the widget's subtree from the tree
    pub fn destroy(self, tree: &mut LayoutTree) -> Result<(), LayoutError> {
        debug!(root = ?self.root, "menu destroyed");
        tree.remove(self.root)
    }
}
