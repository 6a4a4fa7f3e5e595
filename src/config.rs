//! Motion parameters, page markers, and style-variable reading.
//!
//! Timing comes from two style variables on the document root
//! (`--animation-duration-medium`, `--animation-timing-function`) with
//! hard-coded fallbacks, matching how the site's stylesheet drives the
//! animation layer.  Below the desktop breakpoint every duration collapses
//! to zero and easing to linear: animations become instant state changes.

use crate::core::dom::Document;
use crate::core::geometry::Viewport;
use crate::motion::tween::Ease;

// ───────────────────────────────────────── markers ───────────

/// Attribute opting an element into one of the animation kinds.
pub const ANIMATION_ATTR: &str = "data-animation";

pub const MARKER_FADE: &str = "fade";
pub const MARKER_FADE_DELAY: &str = "fade-delay";
pub const MARKER_FADE_TITLE: &str = "fade-title";
pub const MARKER_SLIDE: &str = "slide";
pub const MARKER_SPLIT: &str = "split";

/// Catalog grid container and the two generated columns.
pub const CONTAINER_CLASS: &str = "catalog__items";
pub const COLUMN_CLASS: &str = "catalog__column";
pub const COLUMN_ODD_CLASS: &str = "catalog__column--odd";
pub const COLUMN_EVEN_CLASS: &str = "catalog__column--even";

/// Catalog cards and their states.
pub const CARD_CLASS: &str = "catalog-card";
pub const CARD_ACTIVE_CLASS: &str = "catalog-card--active";
pub const CARD_HOVER_CLASS: &str = "card-hover";
pub const CARD_UNHOVER_CLASS: &str = "card-unhover";
/// Marks the card taking part in the current shared-element move.
pub const FLIP_SOURCE_CLASS: &str = "flip-source";

/// Shared visual element and its containers.
pub const VISUAL_CLASS: &str = "visual";
pub const VISUAL_WRAP_CLASS: &str = "visual-wrap";
pub const PRODUCT_IMG_WRAP_CLASS: &str = "product__img-wrap";

pub const ITEM_NAME_CLASS: &str = "item-name";
/// Pins the incoming container during a transition.
pub const FIXED_CLASS: &str = "fixed";

/// Split-reveal line wrappers.
pub const LINE_MASK_CLASS: &str = "line-mask";
pub const LINE_INNER_CLASS: &str = "line-inner";

/// Item counting: elements carrying `project` are counted, elements
/// carrying `projects-count` receive the `(N)` text.
pub const PROJECT_ATTR: &str = "project";
pub const PROJECTS_COUNT_ATTR: &str = "projects-count";

pub const DURATION_VAR: &str = "--animation-duration-medium";
pub const TIMING_VAR: &str = "--animation-timing-function";

// ───────────────────────────────────────── namespace ─────────

/// Logical page type, as announced by the host navigation mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Catalog,
    Product,
}

impl Namespace {
    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::Catalog => "catalog",
            Namespace::Product => "product",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "catalog" => Some(Namespace::Catalog),
            "product" => Some(Namespace::Product),
            _ => None,
        }
    }
}

// ───────────────────────────────────────── config ────────────

/// All tunable motion parameters.  Defaults are the site's shipped values.
#[derive(Debug, Clone)]
pub struct MotionConfig {
    /// Desktop/mobile split in CSS pixels.
    pub breakpoint_px: f64,
    /// Maximum scroll offset as a percentage of viewport height.
    pub max_offset_percent: f64,
    /// Column top threshold that triggers the fixed sub-state (14rem).
    pub fixed_top_px: f64,
    /// How long the offset stays frozen after fixation starts.
    pub fixed_hold_ms: f64,
    /// Blend window from the frozen offset back to the free target.
    pub fixed_restore_ms: f64,
    /// Velocity clamp in px/ms.
    pub max_velocity: f64,
    /// Exponential smoothing factor toward the target offset.
    pub smoothing: f64,
    /// Base settle decay factor per frame.
    pub settle_speed: f64,
    /// Below this magnitude the offset snaps to exactly zero.
    pub settle_snap_px: f64,
    /// Per-frame velocity decay while idle.
    pub velocity_decay: f64,
    /// Scroll is considered stopped after this much quiet time.
    pub scroll_idle_ms: f64,
    /// Debounce window for resize work.
    pub resize_debounce_ms: f64,
    /// Root font size used to resolve rem lengths.
    pub rem_px: f64,
    /// Duration fallback when the style variable is missing (seconds).
    pub fallback_duration_s: f64,
    /// How long a card's timed transition stays suppressed during a
    /// state change that must not animate.
    pub transition_restore_ms: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            breakpoint_px: 992.0,
            max_offset_percent: 40.0,
            fixed_top_px: 14.0 * 16.0,
            fixed_hold_ms: 300.0,
            fixed_restore_ms: 500.0,
            max_velocity: 2.0,
            smoothing: 0.1,
            settle_speed: 0.05,
            settle_snap_px: 0.1,
            velocity_decay: 0.95,
            scroll_idle_ms: 100.0,
            resize_debounce_ms: 250.0,
            rem_px: 16.0,
            fallback_duration_s: 0.6,
            transition_restore_ms: 10.0,
        }
    }
}

impl MotionConfig {
    pub fn is_desktop(&self, viewport: &Viewport) -> bool {
        viewport.width >= self.breakpoint_px
    }

    /// Maximum scroll offset in pixels for the current viewport.
    pub fn max_offset(&self, viewport: &Viewport) -> f64 {
        viewport.height * self.max_offset_percent / 100.0
    }

    /// Animation duration in seconds: the root style variable, the
    /// fallback, or zero below the breakpoint.
    pub fn duration_s(&self, dom: &Document, viewport: &Viewport) -> f64 {
        if !self.is_desktop(viewport) {
            return 0.0;
        }
        match dom.root_var(DURATION_VAR).map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_duration_s(raw),
            _ => self.fallback_duration_s,
        }
    }

    /// Easing for the current viewport: the mapped root style variable, a
    /// cubic ease-out fallback, or linear below the breakpoint.
    pub fn ease(&self, dom: &Document, viewport: &Viewport) -> Ease {
        if !self.is_desktop(viewport) {
            return Ease::Linear;
        }
        match dom.root_var(TIMING_VAR).map(str::trim) {
            Some(raw) if !raw.is_empty() => ease_from_keyword(raw),
            _ => Ease::CubicOut,
        }
    }
}

/// Parse a duration value: `600ms`, `0.6s`, or a bare number of seconds.
fn parse_duration_s(raw: &str) -> f64 {
    let number = leading_f64(raw);
    if raw.contains("ms") {
        number / 1000.0
    } else {
        number
    }
}

/// Map a CSS easing keyword onto the engine's named eases.  Unknown
/// keywords fall back to the default ease-out.
fn ease_from_keyword(keyword: &str) -> Ease {
    match keyword {
        "ease" => Ease::QuadInOut,
        "ease-in" => Ease::QuadIn,
        "ease-out" => Ease::QuadOut,
        "ease-in-out" => Ease::QuadInOut,
        "linear" => Ease::Linear,
        _ => Ease::CubicOut,
    }
}

/// Leading numeric prefix of a string (`"600ms"` → 600.0), zero if none.
fn leading_f64(raw: &str) -> f64 {
    let end = raw
        .char_indices()
        .take_while(|(i, c)| c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+')))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);
    raw[..end].parse().unwrap_or(0.0)
}

// ───────────────────────────────────────── tests ─────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn desktop() -> Viewport {
        Viewport::new(1280.0, 800.0)
    }

    #[test]
    fn duration_parses_all_notations() {
        let cfg = MotionConfig::default();
        let mut dom = Document::new();

        dom.set_root_var(DURATION_VAR, "600ms");
        assert!((cfg.duration_s(&dom, &desktop()) - 0.6).abs() < 1e-9);

        dom.set_root_var(DURATION_VAR, "0.45s");
        assert!((cfg.duration_s(&dom, &desktop()) - 0.45).abs() < 1e-9);

        dom.set_root_var(DURATION_VAR, "0.8");
        assert!((cfg.duration_s(&dom, &desktop()) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn duration_falls_back_and_collapses_on_mobile() {
        let cfg = MotionConfig::default();
        let dom = Document::new();
        assert!((cfg.duration_s(&dom, &desktop()) - 0.6).abs() < 1e-9);

        let mobile = Viewport::new(600.0, 800.0);
        assert_eq!(cfg.duration_s(&dom, &mobile), 0.0);
        assert_eq!(cfg.ease(&dom, &mobile), Ease::Linear);
    }

    #[test]
    fn easing_keywords_map() {
        let cfg = MotionConfig::default();
        let mut dom = Document::new();

        dom.set_root_var(TIMING_VAR, "ease-in-out");
        assert_eq!(cfg.ease(&dom, &desktop()), Ease::QuadInOut);

        dom.set_root_var(TIMING_VAR, "linear");
        assert_eq!(cfg.ease(&dom, &desktop()), Ease::Linear);

        dom.set_root_var(TIMING_VAR, "cubic-bezier(0.4, 0, 0.2, 1)");
        assert_eq!(cfg.ease(&dom, &desktop()), Ease::CubicOut);
    }

    #[test]
    fn max_offset_follows_viewport() {
        let cfg = MotionConfig::default();
        assert_eq!(cfg.max_offset(&desktop()), 320.0);
    }
}
