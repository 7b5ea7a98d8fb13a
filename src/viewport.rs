//! Viewport and layout queries.
//!
//! The core never measures anything itself. It asks a [`Layout`] for element
//! rectangles, the viewport height and the user's display preferences.
//! [`HeadlessViewport`] is an in-memory layout of stacked boxes, used by the
//! CLI and the tests to drive scrolling and resizing.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::lock;

/// Handle of an element in the static page markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub u32);

/// Vertical extent of an element relative to the top of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(top: f64, height: f64) -> Self {
        Self {
            top,
            bottom: top + height.max(0.0),
        }
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Whether any part of the element is on screen.
    pub fn overlaps_viewport(&self, viewport_height: f64) -> bool {
        self.top < viewport_height && self.bottom > 0.0
    }

    /// Fraction (0.0 to 1.0) of the element that is inside the viewport.
    pub fn intersection_ratio(&self, viewport_height: f64) -> f64 {
        let visible = (self.bottom.min(viewport_height) - self.top.max(0.0)).max(0.0);
        let height = self.height();
        if height <= 0.0 {
            return if self.overlaps_viewport(viewport_height) {
                1.0
            } else {
                0.0
            };
        }
        (visible / height).clamp(0.0, 1.0)
    }
}

/// Read-only access to layout and display preferences.
pub trait Layout {
    fn viewport_height(&self) -> f64;

    /// Current rectangle of `node`, or `None` if it is not laid out.
    fn rect(&self, node: NodeId) -> Option<Rect>;

    fn prefers_reduced_motion(&self) -> bool;

    /// Whether the collapsible-nav toggle is rendered at the current
    /// breakpoint.
    fn nav_toggle_visible(&self) -> bool;

    /// Intersection ratio of `node` with the viewport; 0.0 when not laid out.
    fn intersection_ratio(&self, node: NodeId) -> f64 {
        self.rect(node)
            .map(|rect| rect.intersection_ratio(self.viewport_height()))
            .unwrap_or(0.0)
    }
}

impl<T: Layout + ?Sized> Layout for Arc<T> {
    fn viewport_height(&self) -> f64 {
        (**self).viewport_height()
    }

    fn rect(&self, node: NodeId) -> Option<Rect> {
        (**self).rect(node)
    }

    fn prefers_reduced_motion(&self) -> bool {
        (**self).prefers_reduced_motion()
    }

    fn nav_toggle_visible(&self) -> bool {
        (**self).nav_toggle_visible()
    }
}

// ==================== Page Outline ====================

/// A top-level page section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionNode {
    pub node: NodeId,
    /// Element identifier; sections without one are never highlighted
    pub id: Option<String>,
}

/// Static structure of the page shell the observers work on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOutline {
    pub sections: Vec<SectionNode>,
    pub animatables: Vec<NodeId>,
    next: u32,
}

impl PageOutline {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> NodeId {
        let node = NodeId(self.next);
        self.next += 1;
        node
    }

    /// Add a section and return its node.
    pub fn add_section(&mut self, id: Option<&str>, animate: bool) -> NodeId {
        let node = self.allocate();
        self.sections.push(SectionNode {
            node,
            id: id.map(str::to_string),
        });
        if animate {
            self.animatables.push(node);
        }
        node
    }

    /// Add an animatable element that is not a section.
    pub fn add_animatable(&mut self) -> NodeId {
        let node = self.allocate();
        self.animatables.push(node);
        node
    }

    pub fn section(&self, id: &str) -> Option<NodeId> {
        self.sections
            .iter()
            .find(|section| section.id.as_deref() == Some(id))
            .map(|section| section.node)
    }

    /// Sections carrying an identifier, in document order.
    pub fn identified_sections(&self) -> impl Iterator<Item = (NodeId, &str)> {
        self.sections
            .iter()
            .filter_map(|section| section.id.as_deref().map(|id| (section.node, id)))
    }
}

// ==================== Headless Viewport ====================

#[derive(Debug, Clone)]
struct ViewportState {
    width: f64,
    height: f64,
    scroll_y: f64,
    nav_breakpoint: f64,
    reduced_motion: bool,
    /// Document-relative top and height per node
    boxes: HashMap<NodeId, (f64, f64)>,
}

/// In-memory layout of absolutely positioned boxes.
///
/// The nav toggle is visible while the viewport is narrower than the nav
/// breakpoint. Interior mutability lets a test scroll or resize while the
/// coordinator holds the viewport.
#[derive(Debug)]
pub struct HeadlessViewport {
    state: Mutex<ViewportState>,
}

impl HeadlessViewport {
    pub const DEFAULT_NAV_BREAKPOINT: f64 = 960.0;

    pub fn new(width: f64, height: f64) -> Self {
        Self {
            state: Mutex::new(ViewportState {
                width,
                height,
                scroll_y: 0.0,
                nav_breakpoint: Self::DEFAULT_NAV_BREAKPOINT,
                reduced_motion: false,
                boxes: HashMap::new(),
            }),
        }
    }

    /// Lay out every section of `outline` top to bottom, each
    /// `section_height` tall.
    pub fn stacked(width: f64, height: f64, outline: &PageOutline, section_height: f64) -> Self {
        let viewport = Self::new(width, height);
        for (index, section) in outline.sections.iter().enumerate() {
            viewport.place(section.node, index as f64 * section_height, section_height);
        }
        viewport
    }

    pub fn with_nav_breakpoint(self, breakpoint: f64) -> Self {
        lock(&self.state).nav_breakpoint = breakpoint;
        self
    }

    pub fn with_reduced_motion(self, reduced: bool) -> Self {
        lock(&self.state).reduced_motion = reduced;
        self
    }

    /// Position `node` at document offset `top`.
    pub fn place(&self, node: NodeId, top: f64, height: f64) {
        lock(&self.state).boxes.insert(node, (top, height));
    }

    pub fn scroll_to(&self, y: f64) {
        lock(&self.state).scroll_y = y.max(0.0);
    }

    pub fn resize(&self, width: f64, height: f64) {
        let mut state = lock(&self.state);
        state.width = width;
        state.height = height;
    }

    pub fn width(&self) -> f64 {
        lock(&self.state).width
    }

    pub fn scroll_y(&self) -> f64 {
        lock(&self.state).scroll_y
    }
}

impl Layout for HeadlessViewport {
    fn viewport_height(&self) -> f64 {
        lock(&self.state).height
    }

    fn rect(&self, node: NodeId) -> Option<Rect> {
        let state = lock(&self.state);
        state
            .boxes
            .get(&node)
            .map(|(top, height)| Rect::new(top - state.scroll_y, *height))
    }

    fn prefers_reduced_motion(&self) -> bool {
        lock(&self.state).reduced_motion
    }

    fn nav_toggle_visible(&self) -> bool {
        let state = lock(&self.state);
        state.width < state.nav_breakpoint
    }
}
