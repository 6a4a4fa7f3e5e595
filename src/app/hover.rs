//! Card hover state, modeled as an explicit machine.
//!
//! The DOM never holds the truth — a [`HoverState`] per card does, and a
//! separate render step maps it onto the two state classes.  Both classes
//! are always cleared (with a forced reflow in between) before the next
//! one is applied, so a card can never carry both and a re-applied class
//! restarts its CSS animation instead of silently continuing.

use std::collections::HashMap;

use crate::app::log::{DebugLog, LogTag};
use crate::config::{CARD_HOVER_CLASS, CARD_UNHOVER_CLASS, MotionConfig};
use crate::core::dom::{Document, NodeId};
use crate::core::layout::Layout;
use crate::core::style::TransitionOverride;
use crate::motion::engine::MotionEngine;

// ───────────────────────────────────────── machine ───────────

/// Exactly one of these holds per card at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoverState {
    #[default]
    Neutral,
    Hover,
    Unhover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverEvent {
    Hovered,
    Unhovered,
    Cleared,
}

/// Pure transition function: next state plus the class the renderer must
/// apply after clearing both (`None` = leave the card bare).
pub fn transition(_state: HoverState, event: HoverEvent) -> (HoverState, Option<&'static str>) {
    match event {
        HoverEvent::Hovered => (HoverState::Hover, Some(CARD_HOVER_CLASS)),
        HoverEvent::Unhovered => (HoverState::Unhover, Some(CARD_UNHOVER_CLASS)),
        HoverEvent::Cleared => (HoverState::Neutral, None),
    }
}

// ───────────────────────────────────────── manager ───────────

/// Tracked state for every card that ever changed, keyed by node.
#[derive(Debug, Default)]
pub struct HoverStates {
    states: HashMap<NodeId, HoverState>,
}

impl HoverStates {
    pub fn state(&self, card: NodeId) -> HoverState {
        self.states.get(&card).copied().unwrap_or_default()
    }

    /// Animated state change: clear both classes, flush layout so the CSS
    /// animation restarts from scratch, then apply the new class.
    pub fn set_hover(
        &mut self,
        now_ms: f64,
        dom: &mut Document,
        layout: &mut dyn Layout,
        log: &mut DebugLog,
        card: NodeId,
        hovered: bool,
    ) {
        let event = if hovered {
            HoverEvent::Hovered
        } else {
            HoverEvent::Unhovered
        };
        let (next, class) = transition(self.state(card), event);

        dom.remove_class(card, CARD_HOVER_CLASS);
        dom.remove_class(card, CARD_UNHOVER_CLASS);
        layout.reflow();
        if let Some(class) = class {
            dom.add_class(card, class);
        }
        self.states.insert(card, next);

        let tag = if hovered { LogTag::HoverAdd } else { LogTag::HoverRemove };
        log.add_with_element(now_ms, tag, "hover state changed", dom, card);
    }

    /// Instant variant used while a shared-element move is in flight: the
    /// card's timed transition is suppressed so the state classes cannot
    /// race the geometry animation, and restored shortly after.
    #[allow(clippy::too_many_arguments)]
    pub fn set_hover_for_transition(
        &mut self,
        now_ms: f64,
        cfg: &MotionConfig,
        dom: &mut Document,
        layout: &mut dyn Layout,
        engine: &mut MotionEngine,
        log: &mut DebugLog,
        card: NodeId,
        hovered: bool,
    ) {
        let saved = dom.style(card).transition;
        dom.style_mut(card).transition = Some(TransitionOverride::Disabled);

        let event = if hovered {
            HoverEvent::Hovered
        } else {
            HoverEvent::Unhovered
        };
        let (next, class) = transition(self.state(card), event);

        dom.remove_class(card, CARD_HOVER_CLASS);
        dom.remove_class(card, CARD_UNHOVER_CLASS);
        if let Some(class) = class {
            dom.add_class(card, class);
        }
        layout.reflow();
        self.states.insert(card, next);

        engine.schedule(now_ms + cfg.transition_restore_ms, move |dom| {
            dom.style_mut(card).transition = saved;
        });

        log.add_with_element(now_ms, LogTag::Debug, "instant hover state applied", dom, card);
    }

    /// Reset every card that still carries a state class, and forget all
    /// tracked states.
    pub fn clear_all(
        &mut self,
        now_ms: f64,
        dom: &mut Document,
        layout: &mut dyn Layout,
        log: &mut DebugLog,
    ) {
        let marked: Vec<NodeId> = dom
            .descendants(dom.root())
            .into_iter()
            .filter(|&id| {
                dom.has_class(id, CARD_HOVER_CLASS) || dom.has_class(id, CARD_UNHOVER_CLASS)
            })
            .collect();

        log.add(
            now_ms,
            LogTag::Debug,
            &format!("clearing hover state on {} cards", marked.len()),
        );
        for card in marked {
            layout.reflow();
            dom.remove_class(card, CARD_HOVER_CLASS);
            dom.remove_class(card, CARD_UNHOVER_CLASS);
        }
        self.states.clear();
    }
}

// ───────────────────────────────────────── tests ─────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::FlowLayout;

    fn fixture() -> (Document, FlowLayout, MotionEngine, DebugLog, NodeId) {
        let mut dom = Document::new();
        let card = dom.create_element("a");
        dom.append_child(dom.root(), card);
        (
            dom,
            FlowLayout::new(),
            MotionEngine::new(16.0),
            DebugLog::default(),
            card,
        )
    }

    fn class_count(dom: &Document, card: NodeId) -> usize {
        [CARD_HOVER_CLASS, CARD_UNHOVER_CLASS]
            .iter()
            .filter(|c| dom.has_class(card, c))
            .count()
    }

    #[test]
    fn exactly_one_class_per_state() {
        let (mut dom, mut layout, _, mut log, card) = fixture();
        let mut hover = HoverStates::default();

        hover.set_hover(0.0, &mut dom, &mut layout, &mut log, card, true);
        assert!(dom.has_class(card, CARD_HOVER_CLASS));
        assert_eq!(class_count(&dom, card), 1);
        assert_eq!(hover.state(card), HoverState::Hover);

        hover.set_hover(1.0, &mut dom, &mut layout, &mut log, card, false);
        assert!(dom.has_class(card, CARD_UNHOVER_CLASS));
        assert_eq!(class_count(&dom, card), 1);
        assert_eq!(hover.state(card), HoverState::Unhover);
    }

    #[test]
    fn state_change_flushes_layout_between_clear_and_apply() {
        let (mut dom, mut layout, _, mut log, card) = fixture();
        let mut hover = HoverStates::default();
        let flushes = layout.flushes;
        hover.set_hover(0.0, &mut dom, &mut layout, &mut log, card, true);
        assert!(layout.flushes > flushes);
    }

    #[test]
    fn transition_suppression_is_restored_after_the_window() {
        let (mut dom, mut layout, mut engine, mut log, card) = fixture();
        let cfg = MotionConfig::default();
        let mut hover = HoverStates::default();

        hover.set_hover_for_transition(
            100.0, &cfg, &mut dom, &mut layout, &mut engine, &mut log, card, true,
        );
        assert_eq!(dom.style(card).transition, Some(TransitionOverride::Disabled));
        assert!(dom.has_class(card, CARD_HOVER_CLASS));

        engine.tick(105.0, &mut dom);
        assert_eq!(dom.style(card).transition, Some(TransitionOverride::Disabled));

        engine.tick(110.0, &mut dom);
        assert_eq!(dom.style(card).transition, None);
    }

    #[test]
    fn clear_all_leaves_no_classes_and_no_states() {
        let (mut dom, mut layout, _, mut log, card) = fixture();
        let other = dom.create_element("a");
        dom.append_child(dom.root(), other);

        let mut hover = HoverStates::default();
        hover.set_hover(0.0, &mut dom, &mut layout, &mut log, card, true);
        hover.set_hover(0.0, &mut dom, &mut layout, &mut log, other, false);

        hover.clear_all(1.0, &mut dom, &mut layout, &mut log);
        for id in [card, other] {
            assert_eq!(class_count(&dom, id), 0);
            assert_eq!(hover.state(id), HoverState::Neutral);
        }
    }

    #[test]
    fn pure_transition_covers_all_events() {
        assert_eq!(
            transition(HoverState::Neutral, HoverEvent::Hovered),
            (HoverState::Hover, Some(CARD_HOVER_CLASS))
        );
        assert_eq!(
            transition(HoverState::Hover, HoverEvent::Unhovered),
            (HoverState::Unhover, Some(CARD_UNHOVER_CLASS))
        );
        assert_eq!(
            transition(HoverState::Unhover, HoverEvent::Cleared),
            (HoverState::Neutral, None)
        );
    }
}
