//! UI module for terminal rendering
//!
//! Retained layout tree painted into a cell grid once per frame.
//!
//! # Modules
//!
//! - `layout` - Anchored node tree, container policies, resolved rects
//! - `render` - Cell grid, styles, window frames, ANSI output
//! - `text` - Styled text runs and wrapping
//! - `paint` - Walks a resolved layout and draws every node
//! - `input` - Key events, line editing, focus
//! - `scroll` - Scroll offset bookkeeping
//! - `menu` - Searchable popup menu widget
//! - `messages` - Bottom-aligned message pane

pub mod input;
pub mod layout;
pub mod menu;
pub mod messages;
pub mod paint;
pub mod render;
pub mod scroll;
pub mod text;

pub use input::{FocusContext, InputBuffer, InputEvent, KeyEvent};
pub use layout::{Anchors, Layout, LayoutError, LayoutTree, NodeId, NodeKind, Rect, Transform};
pub use menu::{MenuItem, MenuWindow, RankOrder};
pub use render::{Cell, RenderBuffer, Style};
