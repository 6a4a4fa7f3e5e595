//! Page-transition lifecycle orchestration.
//!
//! The host navigation mechanism drives these hooks in order:
//! `before → before_leave → leave → before_enter → enter → after_enter →
//! after`, handing over the outgoing and incoming page containers and
//! their namespaces.  `leave` and `enter` return the id of the combined
//! animation timeline (when one is playing) so the host can wait for it
//! via [`tick`]'s completion list before moving on.  Navigation is
//! serialized by the host; hooks never overlap.
//!
//! Nothing here panics or returns an error to the host: a missing element
//! downgrades the step to a logged no-op and the rest of the transition
//! continues.

use tracing::debug;

use crate::app::log::{LogTag, TransitionRecord};
use crate::app::reorganize::reorganize;
use crate::app::state::{PageState, PendingAction};
use crate::config::{
    ANIMATION_ATTR, FIXED_CLASS, FLIP_SOURCE_CLASS, MARKER_FADE, Namespace,
    PRODUCT_IMG_WRAP_CLASS, VISUAL_CLASS, VISUAL_WRAP_CLASS,
};
use crate::core::dom::NodeId;
use crate::core::style::{Display, Visibility, WillChange};
use crate::core::text::{find_active_card, resolve_product_name, update_projects_count};
use crate::motion::engine::TimelineId;
use crate::motion::flip::{perform_flip, should_perform_flip, slide_away};
use crate::motion::primitives::{
    animate_fade, animate_fade_delay, animate_fade_title, animate_slide, animate_split, Direction,
};
use crate::motion::tween::Timeline;

/// What the host hands every hook.
#[derive(Debug, Clone)]
pub struct TransitionData {
    /// Outgoing page container.
    pub current: NodeId,
    /// Incoming page container.
    pub next: NodeId,
    pub from: Namespace,
    pub to: Namespace,
    /// What initiated the navigation (for the record only).
    pub trigger: String,
}

// ───────────────────────────────────────── boot ──────────────

/// First-load initialization: mirror the item count and build the
/// columns.  The same work `after_enter` repeats on every swap.
pub fn init(state: &mut PageState, now_ms: f64) {
    update_projects_count(&mut state.dom);
    reorganize(state, now_ms);
}

// ───────────────────────────────────────── hooks ─────────────

/// Open the navigation's transition record.
pub fn before(state: &mut PageState, data: &TransitionData, now_ms: f64) {
    let id = state.next_record_id();
    state.current_record = Some(TransitionRecord::open(id, data.from, data.to, &data.trigger));
    state.log.add(
        now_ms,
        LogTag::Transition,
        &format!("transition started: {} → {}", data.from.as_str(), data.to.as_str()),
    );
}

/// Hint the outgoing container's fade to the compositor.
pub fn before_leave(state: &mut PageState, data: &TransitionData, _now_ms: f64) {
    if state.config.is_desktop(&state.viewport) {
        state.dom.style_mut(data.current).will_change = Some(WillChange::Opacity);
    }
}

/// Old-page departure: choreograph the active card's hover (catalog →
/// product only) and play every leave animation on the outgoing
/// container.  Returns the combined timeline, `None` when nothing
/// animates (the host proceeds immediately).
pub fn leave(state: &mut PageState, data: &TransitionData, now_ms: f64) -> Option<TimelineId> {
    let PageState {
        dom,
        layout,
        viewport,
        config,
        engine,
        hover,
        log,
        ..
    } = state;

    let mut exclude = Vec::new();
    if (data.from, data.to) == (Namespace::Catalog, Namespace::Product) {
        if let Some(active) =
            resolve_product_name(dom, data.next).and_then(|name| find_active_card(dom, &name))
        {
            log.add_with_element(
                now_ms,
                LogTag::Debug,
                "catalog → product: hovering active card",
                dom,
                active,
            );
            hover.set_hover(now_ms, dom, layout.as_mut(), log, active, true);
            // The card's visual must survive the fade for the morph.
            exclude.push(active);
        }
    }

    let mut timeline = Timeline::new();
    for part in [
        animate_fade(config, dom, viewport, data.current, Direction::Leave, &exclude),
        animate_split(config, dom, viewport, data.current, Direction::Leave),
        animate_slide(config, dom, viewport, data.current, Direction::Leave),
        animate_fade_delay(config, dom, viewport, data.current, Direction::Leave),
        animate_fade_title(config, dom, viewport, data.current, Direction::Leave),
    ]
    .into_iter()
    .flatten()
    {
        timeline.merge(part);
    }

    if timeline.is_empty() {
        None
    } else {
        Some(engine.play(timeline, dom, now_ms))
    }
}

/// Baseline the incoming page: visuals forced visible, containers layered
/// so the new page paints on top.
pub fn before_enter(state: &mut PageState, data: &TransitionData, _now_ms: f64) {
    let visuals = state.dom.find_all_by_class(data.next, VISUAL_CLASS);
    for visual in visuals {
        let style = state.dom.style_mut(visual);
        style.opacity = Some(1.0);
        style.visibility = Some(Visibility::Visible);
        style.display = Some(Display::Block);
    }
    if state.config.is_desktop(&state.viewport) {
        state.dom.style_mut(data.current).z_index = Some(1);
        state.dom.style_mut(data.next).z_index = Some(2);
    }
}

/// New-page arrival: the direction-specific shared-element work, then
/// every enter animation on the incoming container.
pub fn enter(state: &mut PageState, data: &TransitionData, now_ms: f64) -> Option<TimelineId> {
    match (data.from, data.to) {
        (Namespace::Catalog, Namespace::Product) => enter_product(state, data, now_ms),
        (Namespace::Product, Namespace::Catalog) => enter_catalog(state, data, now_ms),
        _ => {}
    }

    let PageState {
        dom,
        viewport,
        config,
        engine,
        ..
    } = state;

    let mut timeline = Timeline::new();
    for part in [
        animate_fade(config, dom, viewport, data.next, Direction::Enter, &[]),
        animate_split(config, dom, viewport, data.next, Direction::Enter),
        animate_slide(config, dom, viewport, data.next, Direction::Enter),
        animate_fade_delay(config, dom, viewport, data.next, Direction::Enter),
        animate_fade_title(config, dom, viewport, data.next, Direction::Enter),
    ]
    .into_iter()
    .flatten()
    {
        timeline.merge(part);
    }

    if timeline.is_empty() {
        None
    } else {
        Some(engine.play(timeline, dom, now_ms))
    }
}

/// Catalog → product: morph the active card's visual into the product
/// image wrapper.
fn enter_product(state: &mut PageState, data: &TransitionData, now_ms: f64) {
    let PageState {
        dom,
        layout,
        viewport,
        config,
        engine,
        hover,
        log,
        ..
    } = state;

    if config.is_desktop(viewport) {
        dom.add_class(data.next, FIXED_CLASS);
    }

    let active =
        resolve_product_name(dom, data.next).and_then(|name| find_active_card(dom, &name));
    if let Some(active) = active {
        dom.add_class(active, FLIP_SOURCE_CLASS);
        if let Some(img_wrap) = dom.find_by_class(data.next, PRODUCT_IMG_WRAP_CLASS) {
            hover.set_hover_for_transition(
                now_ms,
                config,
                dom,
                layout.as_mut(),
                engine,
                log,
                active,
                true,
            );
            perform_flip(
                now_ms,
                config,
                dom,
                layout.as_mut(),
                viewport,
                engine,
                log,
                active,
                img_wrap,
            );
        }
    }

    // The product visual is driven by the morph, never by the fade.
    if config.is_desktop(viewport) {
        if let Some(visual) = dom
            .find_by_class(data.next, PRODUCT_IMG_WRAP_CLASS)
            .and_then(|wrap| dom.find_by_class(wrap, VISUAL_CLASS))
        {
            if dom.attr(visual, ANIMATION_ATTR).is_some() {
                dom.remove_attr(visual, ANIMATION_ATTR);
            }
        }
    }
}

/// Product → catalog: morph back into the card when the product image is
/// still on screen, otherwise slide it away and settle the card at once.
fn enter_catalog(state: &mut PageState, data: &TransitionData, now_ms: f64) {
    let PageState {
        dom,
        layout,
        viewport,
        config,
        engine,
        hover,
        log,
        pending,
        ..
    } = state;

    if config.is_desktop(viewport) {
        dom.add_class(data.next, FIXED_CLASS);
    }

    let Some(active) =
        resolve_product_name(dom, data.current).and_then(|name| find_active_card(dom, &name))
    else {
        return;
    };
    dom.add_class(active, FLIP_SOURCE_CLASS);

    let img_wrap = dom.find_by_class(data.current, PRODUCT_IMG_WRAP_CLASS);
    let visual_wrap = dom.find_by_class(active, VISUAL_WRAP_CLASS).or_else(|| {
        dom.find_by_class(active, VISUAL_CLASS)
            .and_then(|v| dom.parent(v))
    });

    let (Some(img_wrap), Some(visual_wrap)) = (img_wrap, visual_wrap) else {
        // Nothing to morph; settle the card immediately.
        log.add(now_ms, LogTag::Debug, "product → catalog: no shared element");
        hover.set_hover(now_ms, dom, layout.as_mut(), log, active, false);
        return;
    };

    if should_perform_flip(
        now_ms,
        dom,
        layout.as_mut(),
        viewport,
        log,
        Some(img_wrap),
        Some(active),
    ) {
        hover.set_hover_for_transition(
            now_ms,
            config,
            dom,
            layout.as_mut(),
            engine,
            log,
            active,
            true,
        );
        perform_flip(
            now_ms,
            config,
            dom,
            layout.as_mut(),
            viewport,
            engine,
            log,
            img_wrap,
            visual_wrap,
        );

        // Hand the card back to unhover once the morph has had its time.
        let duration_ms = config.duration_s(dom, viewport) * 1000.0;
        pending.push(PendingAction::Unhover {
            card: active,
            due_ms: now_ms + duration_ms,
        });
        debug!(duration_ms, "unhover scheduled after morph");
    } else {
        hover.set_hover(now_ms, dom, layout.as_mut(), log, active, false);
        slide_away(now_ms, config, dom, viewport, engine, img_wrap);
    }
}

/// Re-run the per-page plumbing on the fresh DOM.
pub fn after_enter(state: &mut PageState, _data: &TransitionData, now_ms: f64) {
    update_projects_count(&mut state.dom);
    reorganize(state, now_ms);
}

/// Final cleanup: unpin the new container, restore fade markers, drop the
/// flip marks and hover states, rewind the scroll, close the record.
pub fn after(state: &mut PageState, data: &TransitionData, now_ms: f64) {
    if state.config.is_desktop(&state.viewport) {
        state.dom.remove_class(data.next, FIXED_CLASS);
    }

    // Every visual outside the product image wrapper re-joins the fade
    // set for the next navigation.
    let visuals = state.dom.find_all_by_class(state.dom.root(), VISUAL_CLASS);
    for visual in visuals {
        if state.dom.closest(visual, PRODUCT_IMG_WRAP_CLASS).is_none()
            && state.dom.attr(visual, ANIMATION_ATTR).is_none()
        {
            state.dom.set_attr(visual, ANIMATION_ATTR, MARKER_FADE);
        }
    }

    for marked in state.dom.find_all_by_class(state.dom.root(), FLIP_SOURCE_CLASS) {
        state.dom.remove_class(marked, FLIP_SOURCE_CLASS);
    }

    {
        let PageState {
            dom, layout, hover, log, ..
        } = state;
        hover.clear_all(now_ms, dom, layout.as_mut(), log);
    }

    state.viewport.scroll_y = 0.0;
    state.scroll_effects.on_scroll();

    if let Some(mut record) = state.current_record.take() {
        record.close();
        state.log.add(
            now_ms,
            LogTag::Transition,
            &format!(
                "transition completed in {} ms",
                record.duration_ms().unwrap_or(0)
            ),
        );
        state.records.push(record);
    }
}

// ───────────────────────────────────────── page events ───────

/// Host scroll event: update the scroll position and wake the effects.
pub fn on_scroll(state: &mut PageState, scroll_y: f64) {
    state.viewport.scroll_y = scroll_y;
    state.scroll_effects.on_scroll();
}

/// Host resize event: immediate re-range/clamp, debounced rebuild.
pub fn on_resize(state: &mut PageState, now_ms: f64, width: f64, height: f64) {
    state.viewport.width = width;
    state.viewport.height = height;

    let PageState {
        dom,
        layout,
        viewport,
        config,
        scroll_effects,
        ..
    } = state;
    scroll_effects.on_resize(config, dom, layout.as_mut(), viewport);

    state.resize_due_ms = Some(now_ms + state.config.resize_debounce_ms);
}

/// One animation frame: advance the engine, run the scroll controllers,
/// fire deferred hover work, and finish any debounced resize.  Returns
/// the timelines that completed this frame — the host waits on these for
/// the handles `leave`/`enter` returned.
pub fn tick(state: &mut PageState, now_ms: f64) -> Vec<TimelineId> {
    let completed = {
        let PageState {
            dom,
            layout,
            viewport,
            config,
            engine,
            scroll_effects,
            ..
        } = state;
        let completed = engine.tick(now_ms, dom);
        scroll_effects.tick(now_ms, config, dom, layout.as_mut(), viewport);
        completed
    };

    // Deferred unhovers.
    let due: Vec<NodeId> = state
        .pending
        .iter()
        .filter_map(|action| match action {
            PendingAction::Unhover { card, due_ms } if *due_ms <= now_ms => Some(*card),
            _ => None,
        })
        .collect();
    if !due.is_empty() {
        state.pending.retain(|action| match action {
            PendingAction::Unhover { due_ms, .. } => *due_ms > now_ms,
        });
        let PageState {
            dom, layout, hover, log, ..
        } = state;
        for card in due {
            log.add_with_element(now_ms, LogTag::Debug, "morph finished, releasing hover", dom, card);
            hover.set_hover(now_ms, dom, layout.as_mut(), log, card, false);
        }
    }

    // Debounced resize work.
    if state.resize_due_ms.is_some_and(|due| now_ms >= due) {
        state.resize_due_ms = None;
        finish_resize(state, now_ms);
    }

    completed
}

/// The debounced tail of a resize: below the breakpoint every marked
/// element snaps to its resting state and hover resets; in every case the
/// catalog is rebuilt for the new width.
fn finish_resize(state: &mut PageState, now_ms: f64) {
    if !state.config.is_desktop(&state.viewport) {
        let marked = state
            .dom
            .find_all_with_attr(state.dom.root(), ANIMATION_ATTR);
        for el in marked {
            let style = state.dom.style_mut(el);
            style.opacity = Some(1.0);
            style.translate_x = None;
            style.translate_y = None;
            style.rotate_z = None;
        }
        let PageState {
            dom, layout, hover, log, ..
        } = state;
        hover.clear_all(now_ms, dom, layout.as_mut(), log);
    }

    reorganize(state, now_ms);
}
