//! Scroll-driven offset controller for the secondary catalog column.
//!
//! Two macro-states — free and fixed — plus a continuous settle loop:
//!
//! * **free**: every scroll frame derives a velocity, scales it by how
//!   deep the container is through the viewport (peaking mid-container),
//!   and smooths the column's translate toward that target.
//! * **fixed**: once the column's top edge crosses the pin threshold the
//!   offset freezes where it is, holds for a beat, then blends linearly
//!   back toward the freely computed target.
//! * **settle**: when no scroll has arrived for a while the offset decays
//!   to zero — faster near the container's edges — and snaps to exactly
//!   zero below a small epsilon so the loop terminates.
//!
//! Scroll events only raise a flag; the actual computation happens at most
//! once per tick, mirroring a frame-throttled scroll handler.

use tracing::debug;

use crate::config::MotionConfig;
use crate::core::dom::{Document, NodeId};
use crate::core::geometry::Viewport;
use crate::core::layout::{client_rect, Layout};
use crate::core::style::Len;

// ───────────────────────────────────────── state ─────────────

/// Document-coordinate scroll window in which the container is on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollRange {
    pub start: f64,
    pub end: f64,
}

/// The fixed sub-state bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Fixation {
    pub active: bool,
    pub started_ms: f64,
    pub frozen_offset: f64,
}

/// Everything the controller mutates.  Owned exclusively by one
/// [`ScrollEffect`]; nothing outside the effect writes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollOffsetState {
    pub current_offset: f64,
    pub velocity: f64,
    pub last_scroll_y: f64,
    pub last_scroll_ms: f64,
    pub range: ScrollRange,
    pub fixation: Fixation,
}

// ───────────────────────────────────────── effect ────────────

/// Per-column controller instance.
#[derive(Debug)]
pub struct ScrollEffect {
    container: NodeId,
    column: NodeId,
    state: ScrollOffsetState,
    /// Frame-throttle flag: set by scroll events, consumed by `tick`.
    pending_scroll: bool,
    /// Scroll counts as active until this instant.
    scrolling_until_ms: f64,
}

impl ScrollEffect {
    pub fn new(
        dom: &Document,
        layout: &mut dyn Layout,
        viewport: &Viewport,
        container: NodeId,
        column: NodeId,
        now_ms: f64,
    ) -> Self {
        let mut effect = Self {
            container,
            column,
            state: ScrollOffsetState {
                last_scroll_y: viewport.scroll_y,
                last_scroll_ms: now_ms,
                ..ScrollOffsetState::default()
            },
            pending_scroll: false,
            scrolling_until_ms: 0.0,
        };
        effect.recompute_range(dom, layout, viewport);
        effect
    }

    pub fn column(&self) -> NodeId {
        self.column
    }

    pub fn state(&self) -> &ScrollOffsetState {
        &self.state
    }

    /// Note a scroll event.  Cheap and idempotent within a frame.
    pub fn on_scroll(&mut self) {
        self.pending_scroll = true;
    }

    /// Re-measure after a viewport change and clamp the offset into the
    /// new bound immediately.
    pub fn on_resize(
        &mut self,
        cfg: &MotionConfig,
        dom: &mut Document,
        layout: &mut dyn Layout,
        viewport: &Viewport,
    ) {
        self.recompute_range(dom, layout, viewport);
        let max = cfg.max_offset(viewport);
        if self.state.current_offset.abs() > max {
            self.state.current_offset = max.copysign(self.state.current_offset);
            self.write_offset(dom);
        }
    }

    /// One animation frame: the throttled scroll computation (if an event
    /// arrived) followed by the settle pass.
    pub fn tick(
        &mut self,
        now_ms: f64,
        cfg: &MotionConfig,
        dom: &mut Document,
        layout: &mut dyn Layout,
        viewport: &Viewport,
    ) {
        if self.pending_scroll {
            self.pending_scroll = false;
            self.handle_scroll(now_ms, cfg, dom, layout, viewport);
        }
        self.settle(now_ms, cfg, dom, viewport);
    }

    // ── internals ─────────────────────────────────────────────

    fn recompute_range(&mut self, dom: &Document, layout: &mut dyn Layout, viewport: &Viewport) {
        if let Some(rect) = layout.rect(dom, viewport, self.container) {
            self.state.range = ScrollRange {
                start: rect.top - viewport.height,
                end: rect.bottom(),
            };
        }
    }

    /// Scroll progress through the container, 0 at first visibility and
    /// 1 when it has fully scrolled past.
    fn progress(&self, viewport: &Viewport) -> f64 {
        let span = self.state.range.end - self.state.range.start;
        if span <= 0.0 {
            return 0.0;
        }
        ((viewport.scroll_y - self.state.range.start) / span).clamp(0.0, 1.0)
    }

    /// Peaks at 1 mid-container, falls to 0 at either edge.
    fn progress_factor(&self, viewport: &Viewport) -> f64 {
        1.0 - (self.progress(viewport) - 0.5).abs() * 2.0
    }

    /// The offset the free state is always steering toward.
    fn free_target(&self, cfg: &MotionConfig, viewport: &Viewport) -> f64 {
        self.state.velocity * (cfg.max_offset(viewport) / 10.0) * self.progress_factor(viewport)
    }

    fn handle_scroll(
        &mut self,
        now_ms: f64,
        cfg: &MotionConfig,
        dom: &mut Document,
        layout: &mut dyn Layout,
        viewport: &Viewport,
    ) {
        if !cfg.is_desktop(viewport) {
            dom.style_mut(self.column).translate_y = None;
            return;
        }

        let scroll_delta = viewport.scroll_y - self.state.last_scroll_y;
        let time_delta = now_ms - self.state.last_scroll_ms;
        self.scrolling_until_ms = now_ms + cfg.scroll_idle_ms;

        // The pin threshold is tested against the column's rendered edge,
        // current transform included.
        let should_fix = client_rect(layout, dom, viewport, self.column)
            .map(|r| r.top <= cfg.fixed_top_px)
            .unwrap_or(false);

        if should_fix && !self.state.fixation.active {
            self.state.fixation = Fixation {
                active: true,
                started_ms: now_ms,
                frozen_offset: self.state.current_offset,
            };
            debug!(offset = self.state.current_offset, "scroll offset fixed");
        } else if !should_fix && self.state.fixation.active {
            self.state.fixation = Fixation::default();
            debug!("scroll offset released");
        }

        if self.state.fixation.active {
            let elapsed = now_ms - self.state.fixation.started_ms;
            if elapsed < cfg.fixed_hold_ms {
                self.state.current_offset = self.state.fixation.frozen_offset;
            } else {
                let blend = ((elapsed - cfg.fixed_hold_ms) / cfg.fixed_restore_ms).min(1.0);
                let target = self.free_target(cfg, viewport);
                self.state.current_offset = self.state.fixation.frozen_offset
                    + (target - self.state.fixation.frozen_offset) * blend;
            }
        } else {
            self.state.velocity = if time_delta > 0.0 {
                scroll_delta / time_delta
            } else {
                0.0
            };
            self.state.velocity = self.state.velocity.clamp(-cfg.max_velocity, cfg.max_velocity);

            let target = self.free_target(cfg, viewport);
            self.state.current_offset += (target - self.state.current_offset) * cfg.smoothing;

            let max = cfg.max_offset(viewport);
            self.state.current_offset = self.state.current_offset.clamp(-max, max);
        }

        self.write_offset(dom);
        self.state.last_scroll_y = viewport.scroll_y;
        self.state.last_scroll_ms = now_ms;
    }

    fn settle(&mut self, now_ms: f64, cfg: &MotionConfig, dom: &mut Document, viewport: &Viewport) {
        if !cfg.is_desktop(viewport) {
            // Below the breakpoint the column carries no transform at all.
            if dom.style(self.column).translate_y.is_some() {
                dom.style_mut(self.column).translate_y = None;
            }
            return;
        }
        if now_ms < self.scrolling_until_ms || self.state.fixation.active {
            return;
        }

        // Decay toward zero, faster near the container's edges.
        let boost = 1.0 + (1.0 - (self.progress(viewport) - 0.5).abs() * 2.0);
        let speed = cfg.settle_speed * boost;
        self.state.current_offset += (0.0 - self.state.current_offset) * speed;

        if self.state.current_offset.abs() < cfg.settle_snap_px {
            self.state.current_offset = 0.0;
        }

        self.write_offset(dom);
        self.state.velocity *= cfg.velocity_decay;
    }

    fn write_offset(&self, dom: &mut Document) {
        dom.style_mut(self.column).translate_y = Some(Len::Px(self.state.current_offset));
    }
}

// ───────────────────────────────────────── registry ──────────

/// All live effects on the page.  Rebuilding the catalog must dispose the
/// previous generation first or stale controllers keep writing transforms
/// into detached columns.
#[derive(Debug, Default)]
pub struct ScrollEffects {
    effects: Vec<ScrollEffect>,
}

impl ScrollEffects {
    pub fn attach(&mut self, effect: ScrollEffect) {
        self.effects.push(effect);
    }

    /// Drop every effect (listener/loop teardown in the host analogy).
    pub fn dispose_all(&mut self) {
        if !self.effects.is_empty() {
            debug!(count = self.effects.len(), "scroll effects disposed");
            self.effects.clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Offset of the effect driving `column`, if one is attached.
    pub fn offset_for(&self, column: NodeId) -> Option<f64> {
        self.effects
            .iter()
            .find(|e| e.column == column)
            .map(|e| e.state.current_offset)
    }

    pub fn on_scroll(&mut self) {
        for effect in &mut self.effects {
            effect.on_scroll();
        }
    }

    pub fn on_resize(
        &mut self,
        cfg: &MotionConfig,
        dom: &mut Document,
        layout: &mut dyn Layout,
        viewport: &Viewport,
    ) {
        for effect in &mut self.effects {
            effect.on_resize(cfg, dom, layout, viewport);
        }
    }

    pub fn tick(
        &mut self,
        now_ms: f64,
        cfg: &MotionConfig,
        dom: &mut Document,
        layout: &mut dyn Layout,
        viewport: &Viewport,
    ) {
        for effect in &mut self.effects {
            effect.tick(now_ms, cfg, dom, layout, viewport);
        }
    }
}

// ───────────────────────────────────────── tests ─────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::FlowLayout;

    /// Page with a tall header, a catalog container, and one column.
    fn fixture() -> (Document, FlowLayout, NodeId, NodeId) {
        let mut dom = Document::new();
        let header = dom.create_element("div");
        dom.set_attr(header, "data-h", "2000");
        dom.append_child(dom.root(), header);

        let container = dom.create_element("div");
        dom.append_child(dom.root(), container);
        let column = dom.create_element("div");
        dom.set_attr(column, "data-h", "3000");
        dom.append_child(container, column);

        (dom, FlowLayout::new(), container, column)
    }

    fn viewport(scroll_y: f64) -> Viewport {
        Viewport {
            width: 1280.0,
            height: 800.0,
            scroll_y,
        }
    }

    #[test]
    fn offset_stays_clamped_for_any_delta_sequence() {
        let (mut dom, mut layout, container, column) = fixture();
        let cfg = MotionConfig::default();
        let vp0 = viewport(0.0);
        let mut effect = ScrollEffect::new(&dom, &mut layout, &vp0, container, column, 0.0);

        let max = cfg.max_offset(&vp0);
        let deltas = [900.0, -1500.0, 400.0, 4000.0, -4000.0, 120.0, 0.0, 2500.0];
        let mut scroll_y: f64 = 0.0;
        let mut now = 0.0;
        for (i, delta) in deltas.iter().cycle().take(64).enumerate() {
            scroll_y = (scroll_y + delta).max(0.0);
            now += if i % 3 == 0 { 1.0 } else { 16.0 };
            let vp = viewport(scroll_y);
            effect.on_scroll();
            effect.tick(now, &cfg, &mut dom, &mut layout, &vp);
            assert!(
                effect.state().current_offset.abs() <= max + 1e-9,
                "offset escaped the clamp"
            );
        }
    }

    #[test]
    fn fixation_freezes_then_blends_back() {
        let (mut dom, mut layout, container, column) = fixture();
        let cfg = MotionConfig::default();

        // Approach the pin threshold with steady scrolling to build an
        // offset worth freezing.
        let mut effect =
            ScrollEffect::new(&dom, &mut layout, &viewport(0.0), container, column, 0.0);
        let mut now = 0.0;
        let mut scroll_y = 0.0;
        for _ in 0..21 {
            now += 16.0;
            scroll_y += 80.0;
            let vp = viewport(scroll_y);
            effect.on_scroll();
            effect.tick(now, &cfg, &mut dom, &mut layout, &vp);
        }
        assert!(!effect.state().fixation.active);
        let rolling_offset = effect.state().current_offset;
        assert!(rolling_offset.abs() > 0.1);

        // Column doc top is 2000; cross the threshold (client top ≤ 224).
        scroll_y = 1900.0;
        now += 16.0;
        let vp = viewport(scroll_y);
        effect.on_scroll();
        effect.tick(now, &cfg, &mut dom, &mut layout, &vp);
        assert!(effect.state().fixation.active);
        let frozen = effect.state().fixation.frozen_offset;
        let fix_start = effect.state().fixation.started_ms;

        // Inside the hold window the offset does not move.
        for step in 1..=4 {
            let t = fix_start + step as f64 * 60.0;
            effect.on_scroll();
            effect.tick(t, &cfg, &mut dom, &mut layout, &vp);
            if t - fix_start < cfg.fixed_hold_ms {
                assert_eq!(effect.state().current_offset, frozen);
            }
        }

        // After the hold the deviation from the frozen value grows
        // monotonically through the restore window.
        let mut last_dev = 0.0;
        for step in 0..5 {
            let t = fix_start + cfg.fixed_hold_ms + 40.0 + step as f64 * 100.0;
            effect.on_scroll();
            effect.tick(t, &cfg, &mut dom, &mut layout, &vp);
            let dev = (effect.state().current_offset - frozen).abs();
            assert!(dev >= last_dev - 1e-9);
            last_dev = dev;
        }
    }

    #[test]
    fn leaving_the_pin_zone_returns_to_free_mode() {
        let (mut dom, mut layout, container, column) = fixture();
        let cfg = MotionConfig::default();
        let mut effect =
            ScrollEffect::new(&dom, &mut layout, &viewport(0.0), container, column, 0.0);

        let vp = viewport(1900.0);
        effect.on_scroll();
        effect.tick(16.0, &cfg, &mut dom, &mut layout, &vp);
        assert!(effect.state().fixation.active);

        let vp = viewport(100.0);
        effect.on_scroll();
        effect.tick(32.0, &cfg, &mut dom, &mut layout, &vp);
        assert!(!effect.state().fixation.active);
    }

    #[test]
    fn settle_snaps_to_exact_zero() {
        let (mut dom, mut layout, container, column) = fixture();
        let cfg = MotionConfig::default();
        let vp = viewport(1000.0);
        let mut effect = ScrollEffect::new(&dom, &mut layout, &vp, container, column, 0.0);

        // One hard scroll to build an offset.
        effect.on_scroll();
        effect.tick(16.0, &cfg, &mut dom, &mut layout, &viewport(1600.0));
        assert!(effect.state().current_offset.abs() > 0.0);

        // Then silence: run only the settle loop past the idle window.
        let vp = viewport(1600.0);
        let mut now = 16.0 + cfg.scroll_idle_ms;
        for _ in 0..400 {
            now += 16.0;
            effect.tick(now, &cfg, &mut dom, &mut layout, &vp);
        }
        assert_eq!(effect.state().current_offset, 0.0);
        assert_eq!(dom.style(column).translate_y, Some(Len::Px(0.0)));
        assert!(effect.state().velocity.abs() < 1e-3);
    }

    #[test]
    fn mobile_scroll_clears_the_transform() {
        let (mut dom, mut layout, container, column) = fixture();
        let cfg = MotionConfig::default();
        dom.style_mut(column).translate_y = Some(Len::Px(24.0));

        let vp = Viewport {
            width: 600.0,
            height: 800.0,
            scroll_y: 500.0,
        };
        let mut effect = ScrollEffect::new(&dom, &mut layout, &vp, container, column, 0.0);
        effect.on_scroll();
        effect.tick(16.0, &cfg, &mut dom, &mut layout, &vp);
        assert_eq!(dom.style(column).translate_y, None);
    }

    #[test]
    fn resize_clamps_an_out_of_range_offset() {
        let (mut dom, mut layout, container, column) = fixture();
        let cfg = MotionConfig::default();
        let vp = viewport(1000.0);
        let mut effect = ScrollEffect::new(&dom, &mut layout, &vp, container, column, 0.0);
        effect.state.current_offset = 300.0;

        let small = Viewport {
            width: 1280.0,
            height: 500.0,
            scroll_y: 1000.0,
        };
        effect.on_resize(&cfg, &mut dom, &mut layout, &small);
        assert_eq!(effect.state().current_offset, cfg.max_offset(&small));
        assert_eq!(
            dom.style(column).translate_y,
            Some(Len::Px(cfg.max_offset(&small)))
        );
    }

    #[test]
    fn registry_disposal_empties_the_set() {
        let (dom, mut layout, container, column) = fixture();
        let mut effects = ScrollEffects::default();
        effects.attach(ScrollEffect::new(
            &dom,
            &mut layout,
            &viewport(0.0),
            container,
            column,
            0.0,
        ));
        assert_eq!(effects.len(), 1);
        effects.dispose_all();
        assert!(effects.is_empty());
    }
}
