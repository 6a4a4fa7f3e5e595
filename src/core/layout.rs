//! Measurement provider.
//!
//! Geometry always comes from a [`Layout`] implementation, never from the
//! nodes themselves, so tests and the demo can measure a page without a
//! browser.  [`FlowLayout`] is a deliberately small block-flow model: it
//! stacks children vertically, lays generated catalog columns side by side,
//! honors `position: fixed` and `display: none`, resolves explicit
//! width/height overrides, and shifts measured rects by inline translate
//! transforms (the way `getBoundingClientRect` reports transformed boxes).

use std::collections::HashMap;

use crate::config::COLUMN_CLASS;
use crate::core::dom::{Document, NodeId};
use crate::core::geometry::{Rect, Viewport};
use crate::core::style::{Display, Position};

/// Fallback height for a text-bearing leaf (one line of copy).
const TEXT_LINE_PX: f64 = 24.0;

// ───────────────────────────────────────── trait ─────────────

/// Something that can measure nodes in document coordinates.
pub trait Layout {
    /// Document-coordinate rect of a node, `None` when the node is not
    /// attached under the root or takes no box (`display: none`).
    fn rect(&mut self, dom: &Document, viewport: &Viewport, id: NodeId) -> Option<Rect>;

    /// Drop cached measurements (the forced-reflow hook).
    fn reflow(&mut self);
}

/// Client-coordinate rect (viewport-relative), like `getBoundingClientRect`.
pub fn client_rect(
    layout: &mut dyn Layout,
    dom: &Document,
    viewport: &Viewport,
    id: NodeId,
) -> Option<Rect> {
    layout
        .rect(dom, viewport, id)
        .map(|r| r.offset_y(-viewport.scroll_y))
}

// ───────────────────────────────────────── flow layout ───────

/// Deterministic top-down block layout over the arena document.
#[derive(Debug, Default)]
pub struct FlowLayout {
    rects: HashMap<NodeId, Rect>,
    /// (document generation, viewport) the cache was computed for.
    valid_for: Option<(u64, Viewport)>,
    /// Number of forced reflows, observable in tests.
    pub flushes: u64,
    rem_px: f64,
}

impl FlowLayout {
    pub fn new() -> Self {
        Self {
            rects: HashMap::new(),
            valid_for: None,
            flushes: 0,
            rem_px: 16.0,
        }
    }

    fn ensure(&mut self, dom: &Document, viewport: &Viewport) {
        if self.valid_for == Some((dom.generation(), *viewport)) {
            return;
        }
        self.rects.clear();
        self.layout_node(dom, viewport, dom.root(), 0.0, 0.0, viewport.width, 0.0, 0.0);
        self.valid_for = Some((dom.generation(), *viewport));
    }

    /// Lay out `id` at flow position (`x`, `y`) with `avail` width, shifted
    /// by the accumulated ancestor translate (`shift_x`, `shift_y`).
    /// Returns the flow height the node consumes.
    #[allow(clippy::too_many_arguments)]
    fn layout_node(
        &mut self,
        dom: &Document,
        viewport: &Viewport,
        id: NodeId,
        x: f64,
        y: f64,
        avail: f64,
        shift_x: f64,
        shift_y: f64,
    ) -> f64 {
        let style = dom.style(id);
        if style.display == Some(Display::None) {
            return 0.0;
        }

        if style.position == Some(Position::Fixed) {
            // Pinned to the viewport: geometry comes from the inline
            // overrides, converted back into document coordinates.
            let width = style
                .width
                .map(|w| w.to_px(self.rem_px, avail))
                .unwrap_or(avail);
            let height = style
                .height
                .map(|h| h.to_px(self.rem_px, viewport.height))
                .unwrap_or_else(|| self.intrinsic_height(dom, id));
            let top = style.top.unwrap_or(0.0) + viewport.scroll_y;
            let left = style.left.unwrap_or(0.0);
            let rect = Rect::new(top, left, width, height);
            self.rects.insert(id, rect);
            let mut child_y = top;
            for &child in dom.children(id) {
                child_y +=
                    self.layout_node(dom, viewport, child, left, child_y, width, shift_x, shift_y);
            }
            // Out of the flow: consumes no space in the parent.
            return 0.0;
        }

        let width = style
            .width
            .map(|w| w.to_px(self.rem_px, avail))
            .unwrap_or(avail);

        let explicit_height = style
            .height
            .map(|h| h.to_px(self.rem_px, self.hinted_height(dom, id).unwrap_or(0.0)))
            .or_else(|| self.hinted_height(dom, id));

        // Own transform, applied to this node and inherited by children.
        let reference_h = explicit_height.unwrap_or(if dom.node(id).text.is_some() {
            TEXT_LINE_PX
        } else {
            0.0
        });
        let own_sx = style
            .translate_x
            .map(|t| t.to_px(self.rem_px, width))
            .unwrap_or(0.0);
        let own_sy = style
            .translate_y
            .map(|t| t.to_px(self.rem_px, reference_h))
            .unwrap_or(0.0);
        let (shift_x, shift_y) = (shift_x + own_sx, shift_y + own_sy);

        let children = dom.children(id).to_vec();
        let content_height = if !children.is_empty() && self.all_columns(dom, &children) {
            // Generated catalog columns sit side by side, equal widths.
            let col_width = width / children.len() as f64;
            let mut tallest: f64 = 0.0;
            for (i, &child) in children.iter().enumerate() {
                let h = self.layout_node(
                    dom,
                    viewport,
                    child,
                    x + col_width * i as f64,
                    y,
                    col_width,
                    shift_x,
                    shift_y,
                );
                tallest = tallest.max(h);
            }
            tallest
        } else {
            let mut child_y = y;
            for &child in &children {
                child_y +=
                    self.layout_node(dom, viewport, child, x, child_y, width, shift_x, shift_y);
            }
            child_y - y
        };

        let height = explicit_height.unwrap_or(if children.is_empty() {
            if dom.node(id).text.is_some() {
                TEXT_LINE_PX
            } else {
                0.0
            }
        } else {
            content_height
        });

        self.rects
            .insert(id, Rect::new(y + shift_y, x + shift_x, width, height));
        height
    }

    fn all_columns(&self, dom: &Document, children: &[NodeId]) -> bool {
        children.len() >= 2 && children.iter().all(|&c| dom.has_class(c, COLUMN_CLASS))
    }

    /// Height hint from the `data-h` attribute, if present.
    fn hinted_height(&self, dom: &Document, id: NodeId) -> Option<f64> {
        dom.attr(id, "data-h").and_then(|v| v.parse().ok())
    }

    fn intrinsic_height(&self, dom: &Document, id: NodeId) -> f64 {
        self.hinted_height(dom, id).unwrap_or(0.0)
    }
}

impl Layout for FlowLayout {
    fn rect(&mut self, dom: &Document, viewport: &Viewport, id: NodeId) -> Option<Rect> {
        if !dom.is_attached_under(dom.root(), id) {
            return None;
        }
        self.ensure(dom, viewport);
        self.rects.get(&id).copied()
    }

    fn reflow(&mut self) {
        self.rects.clear();
        self.valid_for = None;
        self.flushes += 1;
    }
}

// ───────────────────────────────────────── tests ─────────────
