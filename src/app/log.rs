//! Debug/observability sink.
//!
//! An append-only log of tagged events with element snapshots, plus the
//! per-navigation transition records.  Strictly informational: nothing in
//! the controller reads it back.  Entries are mirrored to `tracing` so a
//! subscriber sees them live while the in-memory log stays inspectable
//! after the fact.

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use crate::config::{CARD_HOVER_CLASS, CARD_UNHOVER_CLASS, Namespace};
use crate::core::dom::{Document, NodeId};
use crate::core::style::Len;

// ───────────────────────────────────────── entries ───────────

/// Event category, used only for display/filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    HoverAdd,
    HoverRemove,
    Transition,
    VisibilityCheck,
    Error,
    Debug,
}

impl LogTag {
    pub fn as_str(self) -> &'static str {
        match self {
            LogTag::HoverAdd => "HOVER_ADD",
            LogTag::HoverRemove => "HOVER_REMOVE",
            LogTag::Transition => "TRANSITION",
            LogTag::VisibilityCheck => "VISIBILITY_CHECK",
            LogTag::Error => "ERROR",
            LogTag::Debug => "DEBUG",
        }
    }
}

/// What an element looked like when the entry was written.
#[derive(Debug, Clone)]
pub struct ElementSnapshot {
    pub tag: String,
    pub classes: Vec<String>,
    pub has_hover_class: bool,
    pub has_unhover_class: bool,
    pub opacity: Option<f64>,
    pub translate_y: Option<Len>,
    pub transition_suppressed: bool,
}

impl ElementSnapshot {
    pub fn capture(dom: &Document, id: NodeId) -> Self {
        let node = dom.node(id);
        Self {
            tag: node.tag.clone(),
            classes: node.classes.clone(),
            has_hover_class: dom.has_class(id, CARD_HOVER_CLASS),
            has_unhover_class: dom.has_class(id, CARD_UNHOVER_CLASS),
            opacity: node.style.opacity,
            translate_y: node.style.translate_y,
            transition_suppressed: node.style.transition.is_some(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub at_ms: f64,
    pub tag: LogTag,
    pub message: String,
    pub element: Option<ElementSnapshot>,
}

// ───────────────────────────────────────── sink ──────────────

#[derive(Debug, Default)]
pub struct DebugLog {
    pub entries: Vec<LogEntry>,
}

impl DebugLog {
    pub fn add(&mut self, at_ms: f64, tag: LogTag, message: &str) {
        self.push(at_ms, tag, message, None);
    }

    pub fn add_with_element(
        &mut self,
        at_ms: f64,
        tag: LogTag,
        message: &str,
        dom: &Document,
        id: NodeId,
    ) {
        self.push(at_ms, tag, message, Some(ElementSnapshot::capture(dom, id)));
    }

    fn push(&mut self, at_ms: f64, tag: LogTag, message: &str, element: Option<ElementSnapshot>) {
        match tag {
            LogTag::Error => error!(target: "catalog_motion", at_ms, "[{}] {message}", tag.as_str()),
            _ => debug!(target: "catalog_motion", at_ms, "[{}] {message}", tag.as_str()),
        }
        self.entries.push(LogEntry {
            at_ms,
            tag,
            message: message.to_string(),
            element,
        });
    }

    /// Most recent entries, newest last.
    pub fn tail(&self, n: usize) -> &[LogEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }
}

// ───────────────────────────────────────── records ───────────

/// One per navigation.  Append-only bookkeeping the host or a debugger
/// can dump; control flow never consults it.
#[derive(Debug, Clone)]
pub struct TransitionRecord {
    pub id: u64,
    pub from: Namespace,
    pub to: Namespace,
    /// What initiated the navigation (element tag, "popstate", …).
    pub trigger: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl TransitionRecord {
    pub fn open(id: u64, from: Namespace, to: Namespace, trigger: &str) -> Self {
        Self {
            id,
            from,
            to,
            trigger: trigger.to_string(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn close(&mut self) {
        self.ended_at = Some(Utc::now());
    }

    pub fn duration_ms(&self) -> Option<i64> {
        self.ended_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }
}

// ───────────────────────────────────────── tests ─────────────
