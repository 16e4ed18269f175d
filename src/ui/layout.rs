//! Anchor layout tree
//!
//! Nodes live in an arena addressed by generational [`NodeId`] handles. Each
//! node carries a [`Transform`] (offset, explicit size, anchors, layer) and a
//! [`NodeKind`] describing what it draws or how it arranges its children.
//!
//! # Resolution
//!
//! A child's rectangle is derived from its parent's rectangle on every pass:
//!
//! - the anchored span starts at `parent.origin + anchor_min * parent.size`
//!   and ends at `parent.origin + anchor_max * parent.size`, both truncated
//! - the local offset is added to the start
//! - an explicit size replaces the anchored span on that axis
//!
//! Containers refine this: [`ContainerPolicy::Stacked`] places children one
//! after another along y, and [`ContainerPolicy::Dynamic`] sizes the container
//! to the extent of its children instead of its anchors. Window children
//! resolve against the window interior (border inset of 1).

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use super::input::InputBuffer;
use super::render::Style;
use super::text::{height_required, uniform, StyleMap};

/// Fractional 2D vector (anchors)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2::new(0.0, 0.0);
    pub const ONE: Vec2 = Vec2::new(1.0, 1.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A resolved rectangular region in cell coordinates
///
/// Coordinates may be negative or extend past the grid; drawing clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rect representing the full terminal
    pub fn full(cols: u16, rows: u16) -> Self {
        Self::new(0, 0, cols as i32, rows as i32)
    }

    /// Get the right edge (x + width)
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Get the bottom edge (y + height)
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Check if this rect contains a point
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check if `other` lies entirely inside this rect
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Shrink rect by margins
    pub fn shrink(&self, top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            x: self.x + left,
            y: self.y + top,
            width: (self.width - left - right).max(0),
            height: (self.height - top - bottom).max(0),
        }
    }
}

/// Axis of a layout quantity, used in error reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Configuration errors raised while building a layout tree
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("{axis:?} anchor {value} is outside [0, 1]")]
    AnchorOutOfRange { axis: Axis, value: f32 },

    #[error("{axis:?} anchors are degenerate: min {min} > max {max}")]
    DegenerateAnchor { axis: Axis, min: f32, max: f32 },

    #[error("unknown layout node {0:?}")]
    UnknownNode(NodeId),

    #[error("the root node cannot be removed")]
    RootRemoval,
}

/// Anchor fractions tethering a node's edges inside its parent
///
/// Always valid: every component lies in [0, 1] and min <= max per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchors {
    min: Vec2,
    max: Vec2,
}

impl Anchors {
    /// Pinned to the parent's top-left corner; size comes from the explicit size
    pub const ZERO: Anchors = Anchors {
        min: Vec2::ZERO,
        max: Vec2::ZERO,
    };

    /// Stretch over the whole parent
    pub const FILL: Anchors = Anchors {
        min: Vec2::ZERO,
        max: Vec2::ONE,
    };

    /// Stretch horizontally, pinned to the top edge
    pub const FILL_WIDTH: Anchors = Anchors {
        min: Vec2::ZERO,
        max: Vec2::new(1.0, 0.0),
    };

    pub fn new(min: Vec2, max: Vec2) -> Result<Self, LayoutError> {
        for (axis, value) in [(Axis::X, min.x), (Axis::Y, min.y), (Axis::X, max.x), (Axis::Y, max.y)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(LayoutError::AnchorOutOfRange { axis, value });
            }
        }
        if min.x > max.x {
            return Err(LayoutError::DegenerateAnchor {
                axis: Axis::X,
                min: min.x,
                max: max.x,
            });
        }
        if min.y > max.y {
            return Err(LayoutError::DegenerateAnchor {
                axis: Axis::Y,
                min: min.y,
                max: max.y,
            });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> Vec2 {
        self.min
    }

    pub fn max(&self) -> Vec2 {
        self.max
    }
}

impl Default for Anchors {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Local offset in cells, added after anchoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Explicit size; a set axis overrides the anchored span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: Option<i32>,
    pub height: Option<i32>,
}

impl Size {
    pub fn height(height: i32) -> Self {
        Self {
            width: None,
            height: Some(height),
        }
    }
}

/// Position, size, anchors and draw priority of a node
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub offset: Offset,
    pub size: Size,
    pub anchors: Anchors,
    pub layer: i32,
}

impl Transform {
    pub fn anchored(anchors: Anchors) -> Self {
        Self {
            anchors,
            ..Default::default()
        }
    }

    pub fn with_offset(mut self, x: i32, y: i32) -> Self {
        self.offset = Offset::new(x, y);
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    /// Resolve this transform inside `parent`
    pub fn resolve(&self, parent: Rect) -> Rect {
        let (x, width) = resolve_axis(
            parent.x,
            parent.width,
            self.anchors.min.x,
            self.anchors.max.x,
            self.offset.x,
            self.size.width,
        );
        let (y, height) = resolve_axis(
            parent.y,
            parent.height,
            self.anchors.min.y,
            self.anchors.max.y,
            self.offset.y,
            self.size.height,
        );
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Width this transform takes inside a parent of `parent_width`
    fn width_in(&self, parent_width: i32) -> i32 {
        resolve_axis(
            0,
            parent_width,
            self.anchors.min.x,
            self.anchors.max.x,
            0,
            self.size.width,
        )
        .1
    }
}

fn resolve_axis(
    origin: i32,
    extent: i32,
    min: f32,
    max: f32,
    offset: i32,
    explicit: Option<i32>,
) -> (i32, i32) {
    let lead = (extent as f32 * min) as i32;
    let trail = (extent as f32 * max) as i32;
    let span = explicit.unwrap_or(trail - lead);
    (origin + lead + offset, span.max(0))
}

/// How a container arranges its children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerPolicy {
    /// Children resolve against the container's anchored rect
    Fixed,
    /// Children are stacked top to bottom in insertion order
    Stacked { expand_width: bool },
    /// Height hugs the extent of the children instead of the anchors
    Dynamic { allow_zero_size: bool },
}

/// Bordered frame with a centred title
#[derive(Debug, Clone, PartialEq)]
pub struct WindowNode {
    pub title: String,
    pub style: Style,
}

/// Attributed text wrapped to the node's width
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub text: String,
    pub points: StyleMap,
}

impl TextNode {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            points: uniform(style),
        }
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Single-line editable field with an optional prompt
#[derive(Debug, Clone)]
pub struct InputNode {
    pub prompt: String,
    pub prompt_style: Style,
    pub style: Style,
    pub buffer: InputBuffer,
    pub hide_cursor_when_empty: bool,
}

impl InputNode {
    pub fn new(style: Style) -> Self {
        Self {
            prompt: String::new(),
            prompt_style: style,
            style,
            buffer: InputBuffer::new(),
            hide_cursor_when_empty: false,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>, style: Style) -> Self {
        self.prompt = prompt.into();
        self.prompt_style = style;
        self
    }
}

/// What a node draws, or how it lays out its children
#[derive(Debug, Clone)]
pub enum NodeKind {
    Empty,
    Container(ContainerPolicy),
    Window(WindowNode),
    Text(TextNode),
    Input(InputNode),
}

/// Stable handle to a node in a [`LayoutTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Node {
    transform: Transform,
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    dirty: bool,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Rects for every node of a tree, resolved in one pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    rects: HashMap<NodeId, Rect>,
    order: Vec<NodeId>,
}

impl Layout {
    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.rects.get(&id).copied()
    }

    /// Nodes by ascending layer, ties kept in tree pre-order
    pub fn draw_order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Arena owning every layout node
#[derive(Debug)]
pub struct LayoutTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutTree {
    /// Create a tree with an empty root that fills the viewport
    pub fn new() -> Self {
        let root = NodeId {
            index: 0,
            generation: 0,
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node {
                    transform: Transform::anchored(Anchors::FILL),
                    kind: NodeKind::Empty,
                    parent: None,
                    children: Vec::new(),
                    dirty: true,
                }),
            }],
            free: Vec::new(),
            root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    fn node(&self, id: NodeId) -> Result<&Node, LayoutError> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(LayoutError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, LayoutError> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(LayoutError::UnknownNode(id))
    }

    /// Add a node as the last child of `parent`
    pub fn insert(
        &mut self,
        parent: NodeId,
        transform: Transform,
        kind: NodeKind,
    ) -> Result<NodeId, LayoutError> {
        self.node(parent)?;

        let node = Node {
            transform,
            kind,
            parent: Some(parent),
            children: Vec::new(),
            dirty: true,
        };

        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        };

        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Remove a node and its whole subtree
    pub fn remove(&mut self, id: NodeId) -> Result<(), LayoutError> {
        if id == self.root {
            return Err(LayoutError::RootRemoval);
        }
        if let Some(parent) = self.node(id)?.parent {
            self.node_mut(parent)?.children.retain(|child| *child != id);
        }
        self.release_subtree(id);
        Ok(())
    }

    /// Remove every child subtree of `id`, keeping `id` itself
    pub fn clear_children(&mut self, id: NodeId) -> Result<(), LayoutError> {
        let children = std::mem::take(&mut self.node_mut(id)?.children);
        for child in children {
            self.release_subtree(child);
        }
        self.node_mut(id)?.dirty = true;
        Ok(())
    }

    fn release_subtree(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let Some(slot) = self
                .slots
                .get_mut(current.index as usize)
                .filter(|slot| slot.generation == current.generation)
            else {
                continue;
            };
            if let Some(node) = slot.node.take() {
                pending.extend(node.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
            }
        }
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, LayoutError> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], LayoutError> {
        Ok(&self.node(id)?.children)
    }

    pub fn transform(&self, id: NodeId) -> Result<&Transform, LayoutError> {
        Ok(&self.node(id)?.transform)
    }

    pub fn kind(&self, id: NodeId) -> Result<&NodeKind, LayoutError> {
        Ok(&self.node(id)?.kind)
    }

    /// Mutable access to the node payload; marks the node dirty
    pub fn kind_mut(&mut self, id: NodeId) -> Result<&mut NodeKind, LayoutError> {
        let node = self.node_mut(id)?;
        node.dirty = true;
        Ok(&mut node.kind)
    }

    pub fn input(&self, id: NodeId) -> Option<&InputNode> {
        match self.kind(id) {
            Ok(NodeKind::Input(input)) => Some(input),
            _ => None,
        }
    }

    pub fn input_mut(&mut self, id: NodeId) -> Option<&mut InputNode> {
        match self.kind_mut(id) {
            Ok(NodeKind::Input(input)) => Some(input),
            _ => None,
        }
    }

    /// Replace anchors after validating them
    pub fn set_anchors(&mut self, id: NodeId, min: Vec2, max: Vec2) -> Result<(), LayoutError> {
        let anchors = Anchors::new(min, max)?;
        let node = self.node_mut(id)?;
        node.transform.anchors = anchors;
        node.dirty = true;
        Ok(())
    }

    pub fn set_offset(&mut self, id: NodeId, offset: Offset) -> Result<(), LayoutError> {
        let node = self.node_mut(id)?;
        node.transform.offset = offset;
        node.dirty = true;
        Ok(())
    }

    pub fn set_size(&mut self, id: NodeId, size: Size) -> Result<(), LayoutError> {
        let node = self.node_mut(id)?;
        node.transform.size = size;
        node.dirty = true;
        Ok(())
    }

    pub fn set_layer(&mut self, id: NodeId, layer: i32) -> Result<(), LayoutError> {
        let node = self.node_mut(id)?;
        node.transform.layer = layer;
        node.dirty = true;
        Ok(())
    }

    pub fn mark_dirty(&mut self, id: NodeId) -> Result<(), LayoutError> {
        self.node_mut(id)?.dirty = true;
        Ok(())
    }

    pub fn is_dirty(&self, id: NodeId) -> Result<bool, LayoutError> {
        Ok(self.node(id)?.dirty)
    }

    /// Read and clear the dirty flag
    pub fn take_dirty(&mut self, id: NodeId) -> Result<bool, LayoutError> {
        let node = self.node_mut(id)?;
        Ok(std::mem::replace(&mut node.dirty, false))
    }

    /// Height a node needs at `width`, or `None` when it simply fills
    /// whatever its anchors give it
    pub fn natural_height(&self, id: NodeId, width: i32) -> Result<Option<i32>, LayoutError> {
        let node = self.node(id)?;
        if let Some(height) = node.transform.size.height {
            return Ok(Some(height.max(0)));
        }

        Ok(match &node.kind {
            NodeKind::Text(text) => {
                Some(height_required(text.char_count(), width.max(0) as usize) as i32)
            }
            NodeKind::Input(_) => Some(1),
            NodeKind::Window(_) => {
                let (extent, all_natural) = self.children_extent(id, width - 2, false)?;
                all_natural.then_some(extent + 2)
            }
            NodeKind::Container(ContainerPolicy::Stacked { expand_width }) => {
                let mut total = 0;
                for child in &node.children {
                    let child_width = if *expand_width {
                        width
                    } else {
                        self.transform(*child)?.width_in(width)
                    };
                    total += self.natural_height(*child, child_width)?.unwrap_or(0);
                }
                Some(total)
            }
            NodeKind::Container(ContainerPolicy::Dynamic { allow_zero_size }) => {
                let (extent, _) = self.children_extent(id, width, false)?;
                Some(if *allow_zero_size { extent } else { extent.max(1) })
            }
            NodeKind::Container(ContainerPolicy::Fixed) | NodeKind::Empty => None,
        })
    }

    /// Lowest bottom edge of the children, relative to the parent's top
    fn children_extent(
        &self,
        id: NodeId,
        width: i32,
        expand_width: bool,
    ) -> Result<(i32, bool), LayoutError> {
        let mut extent = 0;
        let mut all_natural = true;
        for child in &self.node(id)?.children {
            let transform = self.transform(*child)?;
            let child_width = if expand_width {
                width
            } else {
                transform.width_in(width)
            };
            match self.natural_height(*child, child_width)? {
                Some(height) => extent = extent.max(transform.offset.y + height),
                None => all_natural = false,
            }
        }
        Ok((extent.max(0), all_natural))
    }

    fn is_dynamic(&self, id: NodeId) -> Result<bool, LayoutError> {
        let node = self.node(id)?;
        Ok(node.transform.size.height.is_none()
            && matches!(
                node.kind,
                NodeKind::Container(ContainerPolicy::Dynamic { .. })
            ))
    }

    /// Resolve a child inside a non-stacking parent
    fn place(&self, id: NodeId, parent: Rect) -> Result<Rect, LayoutError> {
        let mut rect = self.transform(id)?.resolve(parent);
        if self.is_dynamic(id)? {
            rect.height = self.natural_height(id, rect.width)?.unwrap_or(0);
        }
        Ok(rect)
    }

    /// Resolve the children of a stacked container inside `inner`
    fn stack(
        &self,
        id: NodeId,
        inner: Rect,
        expand_width: bool,
    ) -> Result<Vec<(NodeId, Rect)>, LayoutError> {
        let children = self.children(id)?;
        let mut bases = Vec::with_capacity(children.len());
        let mut naturals = Vec::with_capacity(children.len());
        let mut dynamic = Vec::with_capacity(children.len());
        for child in children {
            let mut base = self.transform(*child)?.resolve(inner);
            if expand_width {
                base.x = inner.x;
                base.width = inner.width;
            }
            naturals.push(self.natural_height(*child, base.width)?);
            dynamic.push(self.is_dynamic(*child)?);
            bases.push(base);
        }

        let mut heights = vec![0; children.len()];
        let mut remaining = inner.height.max(0);

        // Content-sized children first, then dynamic ones, then fillers
        for tier_dynamic in [false, true] {
            for (i, natural) in naturals.iter().enumerate() {
                let Some(natural) = natural else { continue };
                if dynamic[i] != tier_dynamic {
                    continue;
                }
                let height = (*natural).min(remaining);
                if height < *natural {
                    debug!(
                        node = ?children[i],
                        requested = natural,
                        available = remaining,
                        "stacked height clamped"
                    );
                }
                heights[i] = height;
                remaining -= height;
            }
        }

        let fillers: Vec<usize> = (0..children.len())
            .filter(|i| naturals[*i].is_none())
            .collect();
        if !fillers.is_empty() {
            let share = remaining / fillers.len() as i32;
            for i in fillers {
                heights[i] = share;
            }
        }

        let mut y = inner.y;
        let mut placed = Vec::with_capacity(children.len());
        for (i, child) in children.iter().enumerate() {
            let offset_y = self.transform(*child)?.offset.y;
            placed.push((
                *child,
                Rect::new(bases[i].x, y + offset_y, bases[i].width, heights[i]),
            ));
            y += heights[i];
        }
        Ok(placed)
    }

    /// Resolve every node against `viewport`
    pub fn layout(&self, viewport: Rect) -> Result<Layout, LayoutError> {
        let mut rects = HashMap::new();
        let mut visits = Vec::new();
        let root_rect = self.transform(self.root)?.resolve(viewport);
        self.layout_node(self.root, root_rect, &mut rects, &mut visits)?;

        // Stable sort keeps pre-order among equal layers
        visits.sort_by_key(|(layer, _)| *layer);
        Ok(Layout {
            rects,
            order: visits.into_iter().map(|(_, id)| id).collect(),
        })
    }

    fn layout_node(
        &self,
        id: NodeId,
        rect: Rect,
        rects: &mut HashMap<NodeId, Rect>,
        visits: &mut Vec<(i32, NodeId)>,
    ) -> Result<(), LayoutError> {
        let node = self.node(id)?;
        rects.insert(id, rect);
        visits.push((node.transform.layer, id));

        let inner = match node.kind {
            NodeKind::Window(_) => rect.shrink(1, 1, 1, 1),
            _ => rect,
        };

        match node.kind {
            NodeKind::Container(ContainerPolicy::Stacked { expand_width }) => {
                for (child, child_rect) in self.stack(id, inner, expand_width)? {
                    self.layout_node(child, child_rect, rects, visits)?;
                }
            }
            _ => {
                for child in &node.children {
                    let child_rect = self.place(*child, inner)?;
                    self.layout_node(*child, child_rect, rects, visits)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn anchors(min: (f32, f32), max: (f32, f32)) -> Anchors {
        Anchors::new(Vec2::new(min.0, min.1), Vec2::new(max.0, max.1)).unwrap()
    }

    #[test]
    fn test_rect_basic() {
        let r = Rect::new(10, 20, 100, 50);
        assert_eq!(r.right(), 110);
        assert_eq!(r.bottom(), 70);
        assert!(r.contains(10, 20));
        assert!(r.contains(109, 69));
        assert!(!r.contains(110, 70));
    }

    #[test]
    fn test_rect_shrink_larger_than_rect() {
        let r = Rect::new(0, 0, 10, 10);
        let shrunk = r.shrink(20, 20, 20, 20);
        assert_eq!(shrunk.width, 0);
        assert_eq!(shrunk.height, 0);
    }

    #[test]
    fn test_anchor_validation() {
        assert_eq!(
            Anchors::new(Vec2::new(0.6, 0.0), Vec2::new(0.4, 1.0)),
            Err(LayoutError::DegenerateAnchor {
                axis: Axis::X,
                min: 0.6,
                max: 0.4
            })
        );
        assert!(matches!(
            Anchors::new(Vec2::new(0.0, -0.1), Vec2::ONE),
            Err(LayoutError::AnchorOutOfRange { axis: Axis::Y, .. })
        ));
        assert!(matches!(
            Anchors::new(Vec2::ZERO, Vec2::new(f32::NAN, 1.0)),
            Err(LayoutError::AnchorOutOfRange { axis: Axis::X, .. })
        ));
        assert!(Anchors::new(Vec2::new(0.5, 0.5), Vec2::new(0.5, 0.5)).is_ok());
    }

    #[test]
    fn test_set_anchors_rejects_degenerate() {
        let mut tree = LayoutTree::new();
        let id = tree
            .insert(tree.root(), Transform::default(), NodeKind::Empty)
            .unwrap();
        let err = tree
            .set_anchors(id, Vec2::new(0.0, 0.9), Vec2::new(1.0, 0.1))
            .unwrap_err();
        assert!(matches!(err, LayoutError::DegenerateAnchor { axis: Axis::Y, .. }));
        // Previous anchors untouched
        assert_eq!(tree.transform(id).unwrap().anchors, Anchors::ZERO);
    }

    #[test]
    fn test_resolve_anchored_span() {
        let t = Transform::anchored(anchors((0.25, 0.5), (0.75, 1.0)));
        let rect = t.resolve(Rect::new(10, 10, 80, 20));
        assert_eq!(rect, Rect::new(30, 20, 40, 10));
    }

    #[test]
    fn test_resolve_offset_and_explicit_size() {
        let t = Transform::anchored(Anchors::FILL_WIDTH)
            .with_offset(2, 3)
            .with_size(Size::height(4));
        let rect = t.resolve(Rect::new(0, 0, 50, 20));
        assert_eq!(rect, Rect::new(2, 3, 50, 4));
    }

    #[test]
    fn test_bottom_row_anchor() {
        let t = Transform::anchored(anchors((0.0, 1.0), (1.0, 1.0)))
            .with_offset(0, -1)
            .with_size(Size::height(1));
        let rect = t.resolve(Rect::full(80, 24));
        assert_eq!(rect, Rect::new(0, 23, 80, 1));
    }

    proptest! {
        #[test]
        fn anchored_child_stays_inside_parent(
            x in -50i32..50, y in -50i32..50,
            w in 0i32..400, h in 0i32..200,
            ax in 0.0f32..=1.0, bx in 0.0f32..=1.0,
            ay in 0.0f32..=1.0, by in 0.0f32..=1.0,
        ) {
            let parent = Rect::new(x, y, w, h);
            let t = Transform::anchored(
                Anchors::new(Vec2::new(ax.min(bx), ay.min(by)), Vec2::new(ax.max(bx), ay.max(by))).unwrap(),
            );
            let child = t.resolve(parent);
            prop_assert!(parent.contains_rect(&child), "{child:?} escapes {parent:?}");
        }
    }

    #[test]
    fn test_insert_and_remove_subtree() {
        let mut tree = LayoutTree::new();
        let root = tree.root();
        let a = tree.insert(root, Transform::default(), NodeKind::Empty).unwrap();
        let b = tree.insert(a, Transform::default(), NodeKind::Empty).unwrap();
        let c = tree.insert(b, Transform::default(), NodeKind::Empty).unwrap();
        let d = tree.insert(root, Transform::default(), NodeKind::Empty).unwrap();
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.parent(c).unwrap(), Some(b));

        tree.remove(a).unwrap();

        assert_eq!(tree.len(), 2);
        assert!(!tree.contains(a));
        assert!(!tree.contains(b));
        assert!(!tree.contains(c));
        assert_eq!(tree.children(root).unwrap(), &[d]);
        assert_eq!(tree.kind(c).unwrap_err(), LayoutError::UnknownNode(c));
    }

    #[test]
    fn test_reused_slot_gets_fresh_handle() {
        let mut tree = LayoutTree::new();
        let a = tree
            .insert(tree.root(), Transform::default(), NodeKind::Empty)
            .unwrap();
        tree.remove(a).unwrap();
        let b = tree
            .insert(tree.root(), Transform::default(), NodeKind::Empty)
            .unwrap();
        assert_ne!(a, b);
        assert!(!tree.contains(a));
        assert!(tree.contains(b));
    }

    #[test]
    fn test_root_cannot_be_removed() {
        let mut tree = LayoutTree::new();
        assert_eq!(tree.remove(tree.root()), Err(LayoutError::RootRemoval));
    }

    #[test]
    fn test_dirty_flags() {
        let mut tree = LayoutTree::new();
        let id = tree
            .insert(tree.root(), Transform::default(), NodeKind::Empty)
            .unwrap();
        assert!(tree.take_dirty(id).unwrap());
        assert!(!tree.is_dirty(id).unwrap());

        tree.set_offset(id, Offset::new(1, 1)).unwrap();
        assert!(tree.take_dirty(id).unwrap());

        tree.mark_dirty(id).unwrap();
        assert!(tree.is_dirty(id).unwrap());
    }

    #[test]
    fn test_window_children_use_interior() {
        let mut tree = LayoutTree::new();
        let window = tree
            .insert(
                tree.root(),
                Transform::anchored(Anchors::FILL),
                NodeKind::Window(WindowNode {
                    title: "t".into(),
                    style: Style::new(),
                }),
            )
            .unwrap();
        let inner = tree
            .insert(window, Transform::anchored(Anchors::FILL), NodeKind::Empty)
            .unwrap();

        let layout = tree.layout(Rect::full(20, 10)).unwrap();
        assert_eq!(layout.rect(window), Some(Rect::new(0, 0, 20, 10)));
        assert_eq!(layout.rect(inner), Some(Rect::new(1, 1, 18, 8)));
    }

    #[test]
    fn test_stacked_children_accumulate_heights() {
        let mut tree = LayoutTree::new();
        let stack = tree
            .insert(
                tree.root(),
                Transform::anchored(Anchors::FILL),
                NodeKind::Container(ContainerPolicy::Stacked { expand_width: true }),
            )
            .unwrap();
        let text = tree
            .insert(
                stack,
                Transform::default(),
                NodeKind::Text(TextNode::new("x".repeat(25), Style::new())),
            )
            .unwrap();
        let input = tree
            .insert(stack, Transform::default(), NodeKind::Input(InputNode::new(Style::new())))
            .unwrap();
        let filler = tree
            .insert(stack, Transform::default(), NodeKind::Empty)
            .unwrap();

        let layout = tree.layout(Rect::full(10, 12)).unwrap();
        assert_eq!(layout.rect(text), Some(Rect::new(0, 0, 10, 3)));
        assert_eq!(layout.rect(input), Some(Rect::new(0, 3, 10, 1)));
        assert_eq!(layout.rect(filler), Some(Rect::new(0, 4, 10, 8)));
    }

    #[test]
    fn test_dynamic_container_hugs_content() {
        let mut tree = LayoutTree::new();
        let stack = tree
            .insert(
                tree.root(),
                Transform::anchored(Anchors::FILL),
                NodeKind::Container(ContainerPolicy::Stacked { expand_width: true }),
            )
            .unwrap();
        let list = tree
            .insert(
                stack,
                Transform::anchored(Anchors::FILL),
                NodeKind::Container(ContainerPolicy::Dynamic {
                    allow_zero_size: true,
                }),
            )
            .unwrap();
        let search = tree
            .insert(stack, Transform::default(), NodeKind::Input(InputNode::new(Style::new())))
            .unwrap();

        let layout = tree.layout(Rect::full(10, 12)).unwrap();
        assert_eq!(layout.rect(list).unwrap().height, 0);
        assert_eq!(layout.rect(search).unwrap().y, 0);

        for row in 0..2 {
            tree.insert(
                list,
                Transform::anchored(Anchors::FILL_WIDTH)
                    .with_offset(0, row)
                    .with_size(Size::height(1)),
                NodeKind::Text(TextNode::new("item", Style::new())),
            )
            .unwrap();
        }

        let layout = tree.layout(Rect::full(10, 12)).unwrap();
        assert_eq!(layout.rect(list).unwrap().height, 2);
        assert_eq!(layout.rect(search).unwrap().y, 2);
    }

    #[test]
    fn test_dynamic_without_zero_size_keeps_a_row() {
        let mut tree = LayoutTree::new();
        let hug = tree
            .insert(
                tree.root(),
                Transform::anchored(Anchors::FILL),
                NodeKind::Container(ContainerPolicy::Dynamic {
                    allow_zero_size: false,
                }),
            )
            .unwrap();
        assert_eq!(tree.natural_height(hug, 10).unwrap(), Some(1));
    }

    #[test]
    fn test_window_natural_height_wraps_text() {
        let mut tree = LayoutTree::new();
        let window = tree
            .insert(
                tree.root(),
                Transform::anchored(Anchors::FILL),
                NodeKind::Window(WindowNode {
                    title: String::new(),
                    style: Style::new(),
                }),
            )
            .unwrap();
        tree.insert(
            window,
            Transform::anchored(Anchors::FILL),
            NodeKind::Text(TextNode::new("x".repeat(17), Style::new())),
        )
        .unwrap();

        // interior width 8 → 3 rows + 2 border rows
        assert_eq!(tree.natural_height(window, 10).unwrap(), Some(5));
    }

    #[test]
    fn test_draw_order_by_layer_then_preorder() {
        let mut tree = LayoutTree::new();
        let root = tree.root();
        let high = tree
            .insert(root, Transform::default().with_layer(5), NodeKind::Empty)
            .unwrap();
        let low_a = tree
            .insert(root, Transform::default().with_layer(1), NodeKind::Empty)
            .unwrap();
        let low_b = tree
            .insert(high, Transform::default().with_layer(1), NodeKind::Empty)
            .unwrap();

        let layout = tree.layout(Rect::full(10, 10)).unwrap();
        assert_eq!(layout.draw_order(), &[root, low_b, low_a, high]);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let mut tree = LayoutTree::new();
        let stack = tree
            .insert(
                tree.root(),
                Transform::anchored(Anchors::FILL),
                NodeKind::Container(ContainerPolicy::Stacked { expand_width: false }),
            )
            .unwrap();
        tree.insert(
            stack,
            Transform::anchored(Anchors::FILL_WIDTH),
            NodeKind::Text(TextNode::new("hello world", Style::new())),
        )
        .unwrap();

        let a = tree.layout(Rect::full(7, 5)).unwrap();
        let b = tree.layout(Rect::full(7, 5)).unwrap();
        assert_eq!(a, b);
    }
}
