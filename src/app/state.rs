//! Central page state.
//!
//! One [`PageState`] owns everything mutable for a page's lifetime — the
//! document, the measurement provider, the motion engine, the hover map,
//! the scroll-effect registry, and the observability sink — so the rest of
//! the controller is functions over `&mut PageState`.  Constructed once
//! when the page boots, dropped wholesale on teardown; nothing lives in
//! globals.

use crate::app::hover::HoverStates;
use crate::app::log::{DebugLog, TransitionRecord};
use crate::config::MotionConfig;
use crate::core::dom::{Document, NodeId};
use crate::core::geometry::Viewport;
use crate::core::layout::{FlowLayout, Layout};
use crate::motion::engine::MotionEngine;
use crate::motion::scroll::ScrollEffects;

/// Work the orchestrator deferred to a later frame.
#[derive(Debug, Clone, Copy)]
pub enum PendingAction {
    /// Animate a card to its unhover state once the shared-element move
    /// has had its duration.
    Unhover { card: NodeId, due_ms: f64 },
}

/// Top-level state for one page lifetime.
pub struct PageState {
    /// The page's markup.
    pub dom: Document,
    /// Measurement provider (swappable for tests).
    pub layout: Box<dyn Layout>,
    pub viewport: Viewport,
    pub config: MotionConfig,
    /// Tick-driven animation engine.
    pub engine: MotionEngine,
    /// Per-card hover machine.
    pub hover: HoverStates,
    /// Live scroll-offset controllers, one per generated column.
    pub scroll_effects: ScrollEffects,
    /// Append-only observability sink.
    pub log: DebugLog,
    /// Closed transition records, oldest first.
    pub records: Vec<TransitionRecord>,
    /// The record of the navigation currently in flight.
    pub current_record: Option<TransitionRecord>,
    /// Deferred orchestrator work, checked every tick.
    pub pending: Vec<PendingAction>,
    /// Debounce deadline for resize work, if a resize is pending.
    pub resize_due_ms: Option<f64>,
    next_record_id: u64,
}

impl PageState {
    pub fn new(dom: Document, viewport: Viewport) -> Self {
        Self::with_layout(dom, viewport, MotionConfig::default(), Box::new(FlowLayout::new()))
    }

    pub fn with_layout(
        dom: Document,
        viewport: Viewport,
        config: MotionConfig,
        layout: Box<dyn Layout>,
    ) -> Self {
        let engine = MotionEngine::new(config.rem_px);
        Self {
            dom,
            layout,
            viewport,
            config,
            engine,
            hover: HoverStates::default(),
            scroll_effects: ScrollEffects::default(),
            log: DebugLog::default(),
            records: Vec::new(),
            current_record: None,
            pending: Vec::new(),
            resize_due_ms: None,
            next_record_id: 0,
        }
    }

    pub fn next_record_id(&mut self) -> u64 {
        self.next_record_id += 1;
        self.next_record_id
    }
}
