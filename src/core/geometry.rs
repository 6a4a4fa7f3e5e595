//! Rectangles, the viewport, and the visibility heuristic used to gate the
//! shared-element animation.

// ───────────────────────────────────────── rect ──────────────

/// An axis-aligned box.  Layout produces rects in *document* coordinates
/// (y measured from the top of the page); subtracting the scroll position
/// turns them into *client* coordinates (y measured from the viewport top).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self { top, left, width, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Shift vertically (e.g. document → client conversion).
    pub fn offset_y(&self, dy: f64) -> Rect {
        Rect { top: self.top + dy, ..*self }
    }
}

// ───────────────────────────────────────── viewport ──────────

/// The window the page is laid out against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Vertical scroll position in pixels.
    pub scroll_y: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, scroll_y: 0.0 }
    }
}

/// Whether a client-coordinate rect counts as "in view" for the purpose of
/// choosing a morph over the slide-away fallback.  The thresholds are
/// deliberately generous: the top edge may sit anywhere in the upper 90%
/// of the window and the bottom edge anywhere in the lower 90%.
pub fn rect_in_viewport(rect: &Rect, viewport: &Viewport) -> bool {
    rect.top <= viewport.height * 0.9
        && rect.bottom() >= viewport.height * 0.1
        && rect.left <= viewport.width
        && rect.right() >= 0.0
}

// ───────────────────────────────────────── tests ─────────────
