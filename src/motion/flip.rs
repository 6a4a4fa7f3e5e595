//! Shared-element (FLIP) transition orchestration.
//!
//! The visual element is moved — the same node, never a copy — from the
//! outgoing container into the incoming one.  Its on-screen geometry is
//! captured first as an immutable [`FlipCapture`]; after the re-parent the
//! element starts a reconciling tween from the captured box to whatever
//! the new layout gives it.  Ancestors that clip overflow are temporarily
//! opened so the element is never cropped mid-flight, and everything the
//! orchestration touched inline is stripped again when the tween ends.
//!
//! A missing visual on either side aborts the move with a logged error and
//! no further mutation; the surrounding transition carries on.

use thiserror::Error;
use tracing::debug;

use crate::app::log::{DebugLog, LogTag};
use crate::config::{MotionConfig, PRODUCT_IMG_WRAP_CLASS, VISUAL_CLASS};
use crate::core::dom::{Document, NodeId};
use crate::core::geometry::{rect_in_viewport, Rect, Viewport};
use crate::core::layout::{client_rect, Layout};
use crate::core::style::{Len, ObjectFit, Overflow, Position, Visibility};
use crate::motion::engine::{MotionEngine, TimelineId};
use crate::motion::tween::{Prop, Timeline, Track, Tween, Unit};

// ───────────────────────────────────────── capture ───────────

/// Immutable snapshot of the visual's geometry and paint state, valid
/// only between capture and reconciliation within one transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlipCapture {
    /// Client-coordinate box at capture time.
    pub rect: Rect,
    pub opacity: f64,
    pub visibility: Visibility,
}

/// Saved overflow values of one clipped ancestor.
type SavedOverflow = (NodeId, Option<Overflow>, Option<Overflow>, Option<Overflow>);

/// Why a morph was abandoned.  Never propagated to the host — the caller
/// logs it and the rest of the transition carries on.
#[derive(Debug, Error)]
pub enum FlipError {
    #[error("no visual element (outgoing present: {outgoing}, incoming present: {incoming})")]
    MissingVisual { outgoing: bool, incoming: bool },
    #[error("{0} visual is not measurable")]
    Unmeasurable(&'static str),
}

// ───────────────────────────────────────── gate ──────────────

/// Whether the product→catalog direction should morph at all.  When the
/// product image has been scrolled out of view there is nothing visually
/// continuous to preserve, so the caller falls back to a slide-away.
pub fn should_perform_flip(
    now_ms: f64,
    dom: &Document,
    layout: &mut dyn Layout,
    viewport: &Viewport,
    log: &mut DebugLog,
    product_img_wrap: Option<NodeId>,
    active_item: Option<NodeId>,
) -> bool {
    let (Some(wrap), Some(_item)) = (product_img_wrap, active_item) else {
        log.add(now_ms, LogTag::VisibilityCheck, "missing elements for flip check");
        return false;
    };

    let visible = client_rect(layout, dom, viewport, wrap)
        .map(|rect| rect_in_viewport(&rect, viewport))
        .unwrap_or(false);

    let verdict = if visible { "morph" } else { "slide-away" };
    log.add_with_element(
        now_ms,
        LogTag::VisibilityCheck,
        &format!("flip decision: {verdict}"),
        dom,
        wrap,
    );
    visible
}

// ───────────────────────────────────────── entry points ──────

/// Move the shared visual from `outgoing` into `incoming`.  Below the
/// desktop breakpoint this is a bare re-parent with no measurement or
/// animation; on desktop it runs the full capture/reconcile pass and
/// returns the reconciling timeline.
#[allow(clippy::too_many_arguments)]
pub fn perform_flip(
    now_ms: f64,
    cfg: &MotionConfig,
    dom: &mut Document,
    layout: &mut dyn Layout,
    viewport: &Viewport,
    engine: &mut MotionEngine,
    log: &mut DebugLog,
    outgoing: NodeId,
    incoming: NodeId,
) -> Option<TimelineId> {
    if !cfg.is_desktop(viewport) {
        let Some(visual) = dom.find_by_class(outgoing, VISUAL_CLASS) else {
            return None;
        };
        if let Some(existing) = dom.find_by_class(incoming, VISUAL_CLASS) {
            if existing != visual {
                dom.detach(existing);
            }
        }
        dom.append_child(incoming, visual);
        return None;
    }

    match flip(now_ms, cfg, dom, layout, viewport, engine, log, outgoing, incoming) {
        Ok(id) => Some(id),
        Err(err) => {
            log.add(
                now_ms,
                LogTag::Error,
                &format!("shared-element move aborted: {err}"),
            );
            None
        }
    }
}

/// The departure animation used instead of a morph when the product image
/// is off screen: slide down a couple of rem while fading out.  Shares
/// the entrance timing on purpose.
pub fn slide_away(
    now_ms: f64,
    cfg: &MotionConfig,
    dom: &mut Document,
    viewport: &Viewport,
    engine: &mut MotionEngine,
    element: NodeId,
) -> TimelineId {
    let duration = cfg.duration_s(dom, viewport);
    let ease = cfg.ease(dom, viewport);

    let mut timeline = Timeline::new();
    timeline.push(Tween::new(
        vec![element],
        vec![
            Track::new(Prop::TranslateY, None, 2.0, Unit::Rem),
            Track::new(Prop::Opacity, None, 0.0, Unit::Raw),
        ],
        duration,
        ease,
    ));
    engine.play(timeline, dom, now_ms)
}

// ───────────────────────────────────────── the morph ─────────

#[allow(clippy::too_many_arguments)]
fn flip(
    now_ms: f64,
    cfg: &MotionConfig,
    dom: &mut Document,
    layout: &mut dyn Layout,
    viewport: &Viewport,
    engine: &mut MotionEngine,
    log: &mut DebugLog,
    outgoing: NodeId,
    incoming: NodeId,
) -> Result<TimelineId, FlipError> {
    let outgoing_visual = resolve_visual(now_ms, dom, log, outgoing);
    let incoming_visual = resolve_visual(now_ms, dom, log, incoming);
    let (Some(visual), Some(_incoming_visual)) = (outgoing_visual, incoming_visual) else {
        return Err(FlipError::MissingVisual {
            outgoing: outgoing_visual.is_some(),
            incoming: incoming_visual.is_some(),
        });
    };

    log.add_with_element(now_ms, LogTag::Debug, "flip started", dom, visual);

    // Force both visuals to a known-visible baseline, dropping any inline
    // leftovers from earlier animations.
    for v in [outgoing_visual, incoming_visual].into_iter().flatten() {
        let style = dom.style_mut(v);
        style.clear_all();
        style.opacity = Some(1.0);
        style.visibility = Some(Visibility::Visible);
    }

    // Open every clipping ancestor on both sides for the flight.
    let mut clipped = clipped_ancestors(dom, visual);
    if let Some(iv) = incoming_visual {
        if iv != visual {
            clipped.extend(clipped_ancestors(dom, iv));
        }
    }
    for &(id, ..) in &clipped {
        let style = dom.style_mut(id);
        style.overflow = Some(Overflow::Visible);
        style.overflow_x = Some(Overflow::Visible);
        style.overflow_y = Some(Overflow::Visible);
    }

    let saved_positioning = dom.style(visual).positioning();

    let Some(before_rect) = client_rect(layout, dom, viewport, visual) else {
        restore_overflow(dom, &clipped);
        return Err(FlipError::Unmeasurable("outgoing"));
    };

    // Pin the visual to its current on-screen box so pulling it out of
    // the flow cannot cause a jump.
    {
        let style = dom.style_mut(visual);
        style.position = Some(Position::Fixed);
        style.top = Some(before_rect.top);
        style.left = Some(before_rect.left);
        style.width = Some(Len::Px(before_rect.width));
        style.height = Some(Len::Px(before_rect.height));
        style.margin = Some(0.0);
        style.z_index = Some(1000);
    }

    let capture = FlipCapture {
        rect: before_rect,
        opacity: dom.style(visual).opacity.unwrap_or(1.0),
        visibility: dom.style(visual).visibility.unwrap_or(Visibility::Visible),
    };

    // Make room in the destination, un-pin, and move the node itself.
    if let Some(existing) = dom.find_by_class(incoming, VISUAL_CLASS) {
        if existing != visual {
            dom.detach(existing);
        }
    }
    dom.style_mut(visual).restore_positioning(&saved_positioning);
    dom.append_child(incoming, visual);

    let Some(after_rect) = client_rect(layout, dom, viewport, visual) else {
        restore_overflow(dom, &clipped);
        return Err(FlipError::Unmeasurable("incoming"));
    };

    // Reconcile: start from the captured box (as transform + size
    // overrides) and tween to the natural layout.
    let dx = capture.rect.left - after_rect.left;
    let dy = capture.rect.top - after_rect.top;
    {
        let style = dom.style_mut(visual);
        style.opacity = Some(1.0);
        style.visibility = Some(Visibility::Visible);
    }

    let duration = cfg.duration_s(dom, viewport);
    let ease = cfg.ease(dom, viewport);
    let mut timeline = Timeline::new();
    timeline.push(
        Tween::new(
            vec![visual],
            vec![
                Track::new(Prop::TranslateX, Some(dx), 0.0, Unit::Px),
                Track::new(Prop::TranslateY, Some(dy), 0.0, Unit::Px),
                Track::new(Prop::Width, Some(capture.rect.width), after_rect.width, Unit::Px),
                Track::new(Prop::Height, Some(capture.rect.height), after_rect.height, Unit::Px),
            ],
            duration,
            ease,
        )
        .set_from(),
    );

    let id = engine.play(timeline, dom, now_ms);
    engine.on_complete(id, move |dom| {
        let style = dom.style_mut(visual);
        style.restore_positioning(&saved_positioning);
        style.clear_animation_props();
        restore_overflow(dom, &clipped);
        debug!(target: "catalog_motion", "flip completed");
    });
    Ok(id)
}

// ───────────────────────────────────────── helpers ───────────

/// The `.visual` inside a container.  A product image wrapper that lost
/// its visual (hard reload skips the normal render) gets one synthesized
/// from the first image found, so a capture target always exists there.
fn resolve_visual(
    now_ms: f64,
    dom: &mut Document,
    log: &mut DebugLog,
    container: NodeId,
) -> Option<NodeId> {
    let mut visual = dom.find_by_class(container, VISUAL_CLASS);
    let is_product = dom.has_class(container, PRODUCT_IMG_WRAP_CLASS);

    if is_product && visual.map_or(true, |v| dom.children(v).is_empty()) {
        if let Some(img) = dom.find_by_tag(container, "img") {
            log.add(now_ms, LogTag::Debug, "synthesizing product visual");
            let replacement = dom.create_element("div");
            dom.add_class(replacement, VISUAL_CLASS);
            dom.style_mut(replacement).position = Some(Position::Relative);

            let cloned = dom.clone_subtree(img);
            dom.style_mut(cloned).object_fit = Some(ObjectFit::Cover);
            dom.append_child(replacement, cloned);
            dom.append_child(container, replacement);
            visual = Some(replacement);
        }
    }
    visual
}

/// Ancestors (up to, not including, the root) whose overflow is clipped,
/// with their original values for later restoration.
fn clipped_ancestors(dom: &Document, id: NodeId) -> Vec<SavedOverflow> {
    let mut out = Vec::new();
    let mut current = dom.parent(id);
    while let Some(node) = current {
        if node == dom.root() {
            break;
        }
        let style = dom.style(node);
        if style.clips_overflow() {
            out.push((node, style.overflow, style.overflow_x, style.overflow_y));
        }
        current = dom.parent(node);
    }
    out
}

fn restore_overflow(dom: &mut Document, saved: &[SavedOverflow]) {
    for &(id, overflow, overflow_x, overflow_y) in saved {
        let style = dom.style_mut(id);
        style.overflow = overflow;
        style.overflow_x = overflow_x;
        style.overflow_y = overflow_y;
    }
}

// ───────────────────────────────────────── tests ─────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::FlowLayout;
    use crate::core::style::{InlineStyle, Len};

    struct Fixture {
        dom: Document,
        layout: FlowLayout,
        viewport: Viewport,
        engine: MotionEngine,
        log: DebugLog,
        cfg: MotionConfig,
        card_wrap: NodeId,
        visual: NodeId,
        product_wrap: NodeId,
    }

    /// Catalog card (with visual) above a product image wrapper.
    fn fixture() -> Fixture {
        let mut dom = Document::new();

        let card = dom.create_element("a");
        dom.add_class(card, crate::config::CARD_CLASS);
        dom.append_child(dom.root(), card);
        let card_wrap = dom.create_element("div");
        dom.add_class(card_wrap, crate::config::VISUAL_WRAP_CLASS);
        dom.set_attr(card_wrap, "data-h", "400");
        dom.style_mut(card_wrap).overflow = Some(Overflow::Hidden);
        dom.append_child(card, card_wrap);
        let visual = dom.create_element("div");
        dom.add_class(visual, VISUAL_CLASS);
        dom.set_attr(visual, "data-h", "400");
        dom.append_child(card_wrap, visual);

        let product_wrap = dom.create_element("div");
        dom.add_class(product_wrap, PRODUCT_IMG_WRAP_CLASS);
        dom.set_attr(product_wrap, "data-h", "600");
        dom.append_child(dom.root(), product_wrap);
        let product_visual = dom.create_element("div");
        dom.add_class(product_visual, VISUAL_CLASS);
        let img = dom.create_element("img");
        dom.set_attr(img, "data-h", "600");
        dom.append_child(product_visual, img);
        dom.append_child(product_wrap, product_visual);

        Fixture {
            dom,
            layout: FlowLayout::new(),
            viewport: Viewport::new(1280.0, 800.0),
            engine: MotionEngine::new(16.0),
            log: DebugLog::default(),
            cfg: MotionConfig::default(),
            card_wrap,
            visual,
            product_wrap,
        }
    }

    #[test]
    fn morph_reparents_and_strips_overrides() {
        let mut f = fixture();
        let id = perform_flip(
            0.0,
            &f.cfg,
            &mut f.dom,
            &mut f.layout,
            &f.viewport,
            &mut f.engine,
            &mut f.log,
            f.card_wrap,
            f.product_wrap,
        )
        .expect("desktop flip returns a timeline");

        // Mid-flight: the node already lives in the destination and the
        // clipping ancestor is held open.
        assert_eq!(f.dom.parent(f.visual), Some(f.product_wrap));
        assert_eq!(f.dom.style(f.card_wrap).overflow, Some(Overflow::Visible));
        assert!(f.engine.is_active(id));

        f.engine.tick(100.0, &mut f.dom);
        assert!(f.dom.style(f.visual).translate_y.is_some());

        f.engine.tick(600.0, &mut f.dom);
        assert!(!f.engine.is_active(id));
        assert_eq!(f.dom.parent(f.visual), Some(f.product_wrap));
        // No leftover inline overrides, and the clip is back.
        assert_eq!(*f.dom.style(f.visual), InlineStyle::default());
        assert_eq!(f.dom.style(f.card_wrap).overflow, Some(Overflow::Hidden));
    }

    #[test]
    fn destination_visual_is_replaced_not_duplicated() {
        let mut f = fixture();
        perform_flip(
            0.0,
            &f.cfg,
            &mut f.dom,
            &mut f.layout,
            &f.viewport,
            &mut f.engine,
            &mut f.log,
            f.card_wrap,
            f.product_wrap,
        );
        let visuals = f.dom.find_all_by_class(f.product_wrap, VISUAL_CLASS);
        assert_eq!(visuals, vec![f.visual]);
    }

    #[test]
    fn mobile_fallback_moves_without_animation() {
        let mut f = fixture();
        f.viewport = Viewport::new(600.0, 800.0);
        let id = perform_flip(
            0.0,
            &f.cfg,
            &mut f.dom,
            &mut f.layout,
            &f.viewport,
            &mut f.engine,
            &mut f.log,
            f.card_wrap,
            f.product_wrap,
        );
        assert!(id.is_none());
        assert_eq!(f.dom.parent(f.visual), Some(f.product_wrap));
        assert_eq!(f.engine.active_count(), 0);
    }

    #[test]
    fn bare_product_container_synthesizes_a_visual() {
        let mut f = fixture();
        // Strip the product visual, leaving only a bare image, the way a
        // hard reload leaves the page.
        let product_visual = f.dom.find_by_class(f.product_wrap, VISUAL_CLASS).unwrap();
        f.dom.detach(product_visual);
        let img = f.dom.create_element("img");
        f.dom.set_attr(img, "data-h", "600");
        f.dom.append_child(f.product_wrap, img);

        let resolved = resolve_visual(0.0, &mut f.dom, &mut f.log, f.product_wrap);
        let visual = resolved.expect("visual synthesized from the image");
        assert!(f.dom.has_class(visual, VISUAL_CLASS));
        assert_eq!(f.dom.parent(visual), Some(f.product_wrap));
        // The clone went inside; the original image is untouched.
        assert_eq!(f.dom.find_by_tag(visual, "img").is_some(), true);
        assert_eq!(f.dom.parent(img), Some(f.product_wrap));
    }

    #[test]
    fn missing_visual_aborts_without_mutation() {
        let mut f = fixture();
        // A card with no visual at all.
        let bare = f.dom.create_element("div");
        f.dom.append_child(f.dom.root(), bare);

        let before_children = f.dom.children(f.product_wrap).to_vec();
        let id = perform_flip(
            0.0,
            &f.cfg,
            &mut f.dom,
            &mut f.layout,
            &f.viewport,
            &mut f.engine,
            &mut f.log,
            bare,
            f.product_wrap,
        );
        assert!(id.is_none());
        assert_eq!(f.dom.children(f.product_wrap), before_children.as_slice());
        assert!(f
            .log
            .entries
            .iter()
            .any(|e| e.tag == LogTag::Error));
    }

    #[test]
    fn gate_passes_only_when_wrap_is_on_screen() {
        let mut f = fixture();
        // Product wrapper sits at doc top 400; visible at scroll 0.
        assert!(should_perform_flip(
            0.0,
            &f.dom,
            &mut f.layout,
            &f.viewport,
            &mut f.log,
            Some(f.product_wrap),
            Some(f.card_wrap),
        ));

        // Scrolled far past it → slide-away.
        f.viewport.scroll_y = 5000.0;
        assert!(!should_perform_flip(
            0.0,
            &f.dom,
            &mut f.layout,
            &f.viewport,
            &mut f.log,
            Some(f.product_wrap),
            Some(f.card_wrap),
        ));

        // Missing elements never morph.
        assert!(!should_perform_flip(
            0.0,
            &f.dom,
            &mut f.layout,
            &f.viewport,
            &mut f.log,
            None,
            Some(f.card_wrap),
        ));
    }

    #[test]
    fn slide_away_drives_offset_and_fade() {
        let mut f = fixture();
        let id = slide_away(
            0.0,
            &f.cfg,
            &mut f.dom,
            &f.viewport,
            &mut f.engine,
            f.product_wrap,
        );
        f.engine.tick(600.0, &mut f.dom);
        assert!(!f.engine.is_active(id));
        assert_eq!(f.dom.style(f.product_wrap).translate_y, Some(Len::Rem(2.0)));
        assert_eq!(f.dom.style(f.product_wrap).opacity, Some(0.0));
    }
}
