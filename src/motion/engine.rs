//! Tick-driven motion engine.
//!
//! Owns every running [`Timeline`] and every deferred style callback.
//! Time is a logical `now_ms` supplied by the caller — the engine never
//! reads a wall clock, so the demo can feed it frame timestamps and tests
//! can feed it whatever they like.  Completions are returned from
//! [`MotionEngine::tick`] so the orchestrator can sequence phases without
//! registering closures for control flow.

use tracing::trace;

use crate::core::dom::Document;
use crate::motion::tween::Timeline;

/// Handle for a playing timeline.
pub type TimelineId = u64;

type DomAction = Box<dyn FnOnce(&mut Document) + Send>;

struct ActiveTimeline {
    id: TimelineId,
    started_ms: f64,
    timeline: Timeline,
    /// Resolved start values: per tween, per target, per track.
    from: Vec<Vec<Vec<f64>>>,
    on_complete: Vec<DomAction>,
}

struct Scheduled {
    due_ms: f64,
    action: DomAction,
}

// ───────────────────────────────────────── engine ────────────

pub struct MotionEngine {
    next_id: TimelineId,
    active: Vec<ActiveTimeline>,
    scheduled: Vec<Scheduled>,
    rem_px: f64,
}

impl MotionEngine {
    pub fn new(rem_px: f64) -> Self {
        Self {
            next_id: 1,
            active: Vec::new(),
            scheduled: Vec::new(),
            rem_px,
        }
    }

    /// Start a timeline: resolve every track's start value against the
    /// current styles (tween-to semantics) and apply explicit starts
    /// immediately for `set_from` tweens (set-then-animate semantics).
    pub fn play(&mut self, timeline: Timeline, dom: &mut Document, now_ms: f64) -> TimelineId {
        let id = self.next_id;
        self.next_id += 1;

        let mut from = Vec::with_capacity(timeline.tweens.len());
        for tween in &timeline.tweens {
            let mut per_target = Vec::with_capacity(tween.targets.len());
            for &target in &tween.targets {
                let style = dom.style(target);
                let starts: Vec<f64> = tween
                    .tracks
                    .iter()
                    .map(|t| t.from.unwrap_or_else(|| t.sample_current(style, self.rem_px)))
                    .collect();
                per_target.push(starts);
            }
            if tween.set_from {
                for &target in &tween.targets {
                    let style = dom.style_mut(target);
                    for track in &tween.tracks {
                        if let Some(start) = track.from {
                            track.apply(style, start);
                        }
                    }
                }
            }
            from.push(per_target);
        }

        trace!(id, tweens = timeline.tweens.len(), "timeline started");
        self.active.push(ActiveTimeline {
            id,
            started_ms: now_ms,
            timeline,
            from,
            on_complete: Vec::new(),
        });
        id
    }

    /// Run `action` when the timeline finishes.  No-op for unknown or
    /// already-finished ids.
    pub fn on_complete(&mut self, id: TimelineId, action: impl FnOnce(&mut Document) + Send + 'static) {
        if let Some(active) = self.active.iter_mut().find(|a| a.id == id) {
            active.on_complete.push(Box::new(action));
        }
    }

    /// Run `action` once `now_ms` reaches `due_ms`.
    pub fn schedule(&mut self, due_ms: f64, action: impl FnOnce(&mut Document) + Send + 'static) {
        self.scheduled.push(Scheduled {
            due_ms,
            action: Box::new(action),
        });
    }

    pub fn is_active(&self, id: TimelineId) -> bool {
        self.active.iter().any(|a| a.id == id)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Advance to `now_ms`: run due callbacks, sample every active
    /// timeline into the document, and return the ids that completed on
    /// this tick (completion callbacks have already run).
    pub fn tick(&mut self, now_ms: f64, dom: &mut Document) -> Vec<TimelineId> {
        // Deferred callbacks first, in due order (stable for ties).
        let mut due: Vec<Scheduled> = Vec::new();
        let mut remaining = Vec::new();
        for s in self.scheduled.drain(..) {
            if s.due_ms <= now_ms {
                due.push(s);
            } else {
                remaining.push(s);
            }
        }
        self.scheduled = remaining;
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        for s in due {
            (s.action)(dom);
        }

        // Sample timelines.
        let mut completed = Vec::new();
        let mut still_active = Vec::new();
        for mut active in self.active.drain(..) {
            let elapsed_s = (now_ms - active.started_ms) / 1000.0;
            for (tween, from_targets) in active.timeline.tweens.iter().zip(&active.from) {
                for (i, (&target, starts)) in
                    tween.targets.iter().zip(from_targets).enumerate()
                {
                    let Some(progress) = tween.progress(i, elapsed_s) else {
                        continue;
                    };
                    let eased = tween.ease.apply(progress);
                    let style = dom.style_mut(target);
                    for (track, &start) in tween.tracks.iter().zip(starts) {
                        track.apply(style, start + (track.to - start) * eased);
                    }
                }
            }

            if elapsed_s >= active.timeline.duration_s() {
                trace!(id = active.id, "timeline completed");
                for action in active.on_complete.drain(..) {
                    action(dom);
                }
                completed.push(active.id);
            } else {
                still_active.push(active);
            }
        }
        self.active = still_active;
        completed
    }
}

// ───────────────────────────────────────── tests ─────────────
