//! Eased property tracks, staggered tweens, and parallel timelines.
//!
//! A [`Timeline`] is a passive value — building one performs no side
//! effects.  The [`engine`](super::engine) resolves start values, applies
//! initial states, and samples the tracks against the logical clock.

use crate::core::dom::NodeId;
use crate::core::style::{InlineStyle, Len};

// ───────────────────────────────────────── easing ────────────

/// Named easing curves.  The closed set covers everything the site's
/// style variables can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ease {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    /// Default entrance ease when no style variable is set.
    CubicOut,
}

impl Ease {
    /// Map linear progress `t ∈ [0, 1]` onto the curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::QuadIn => t * t,
            Ease::QuadOut => t * (2.0 - t),
            Ease::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Ease::CubicOut => {
                let u = 1.0 - t;
                1.0 - u * u * u
            }
        }
    }
}

// ───────────────────────────────────────── tracks ────────────

/// A property a track can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prop {
    Opacity,
    TranslateX,
    TranslateY,
    RotateZ,
    Top,
    Left,
    Width,
    Height,
}

/// Unit the track's numbers are expressed in.  `Raw` is unitless
/// (opacity, degrees).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Raw,
    Px,
    Rem,
    Percent,
}

/// One property's `from → to` range.  A `None` start means "sample the
/// element's current value when the timeline starts" — the moral
/// equivalent of tweening *to* a value from wherever the element is.
#[derive(Debug, Clone, Copy)]
pub struct Track {
    pub prop: Prop,
    pub from: Option<f64>,
    pub to: f64,
    pub unit: Unit,
}

impl Track {
    pub fn new(prop: Prop, from: Option<f64>, to: f64, unit: Unit) -> Self {
        Self { prop, from, to, unit }
    }

    /// Read the element's current value of this track's property, in the
    /// track's unit.  Unset properties report their rendered defaults
    /// (opacity 1, everything else 0).
    pub fn sample_current(&self, style: &InlineStyle, rem_px: f64) -> f64 {
        match self.prop {
            Prop::Opacity => style.opacity.unwrap_or(1.0),
            Prop::RotateZ => style.rotate_z.unwrap_or(0.0),
            Prop::Top => style.top.unwrap_or(0.0),
            Prop::Left => style.left.unwrap_or(0.0),
            Prop::TranslateX => self.len_value(style.translate_x, rem_px),
            Prop::TranslateY => self.len_value(style.translate_y, rem_px),
            Prop::Width => self.len_value(style.width, rem_px),
            Prop::Height => self.len_value(style.height, rem_px),
        }
    }

    fn len_value(&self, len: Option<Len>, rem_px: f64) -> f64 {
        let Some(len) = len else { return 0.0 };
        match (len, self.unit) {
            (Len::Px(v), Unit::Px) | (Len::Rem(v), Unit::Rem) | (Len::Percent(v), Unit::Percent) => v,
            (Len::Px(v), Unit::Rem) => v / rem_px,
            (Len::Rem(v), Unit::Px) => v * rem_px,
            // Mixed percent bases can't be converted without a reference;
            // treat the raw number as already being in the track's unit.
            (other, _) => other.value(),
        }
    }

    /// Write a sampled value back into the element's style.
    pub fn apply(&self, style: &mut InlineStyle, value: f64) {
        let len = match self.unit {
            Unit::Rem => Len::Rem(value),
            Unit::Percent => Len::Percent(value),
            _ => Len::Px(value),
        };
        match self.prop {
            Prop::Opacity => style.opacity = Some(value),
            Prop::RotateZ => style.rotate_z = Some(value),
            Prop::Top => style.top = Some(value),
            Prop::Left => style.left = Some(value),
            Prop::TranslateX => style.translate_x = Some(len),
            Prop::TranslateY => style.translate_y = Some(len),
            Prop::Width => style.width = Some(len),
            Prop::Height => style.height = Some(len),
        }
    }
}

// ───────────────────────────────────────── tween ─────────────

/// A set of tracks over a set of targets with shared timing.  Targets are
/// staggered: target `i` starts `i × stagger` after the tween's delay.
#[derive(Debug, Clone)]
pub struct Tween {
    pub targets: Vec<NodeId>,
    pub tracks: Vec<Track>,
    pub duration_s: f64,
    pub delay_s: f64,
    pub stagger_s: f64,
    pub ease: Ease,
    /// Apply every explicit `from` value the moment the timeline starts
    /// (the set-then-animate entrance pattern).
    pub set_from: bool,
}

impl Tween {
    pub fn new(targets: Vec<NodeId>, tracks: Vec<Track>, duration_s: f64, ease: Ease) -> Self {
        Self {
            targets,
            tracks,
            duration_s,
            delay_s: 0.0,
            stagger_s: 0.0,
            ease,
            set_from: false,
        }
    }

    pub fn delay(mut self, delay_s: f64) -> Self {
        self.delay_s = delay_s;
        self
    }

    pub fn stagger(mut self, stagger_s: f64) -> Self {
        self.stagger_s = stagger_s;
        self
    }

    pub fn set_from(mut self) -> Self {
        self.set_from = true;
        self
    }

    /// Time from timeline start until the last target finishes.
    pub fn end_s(&self) -> f64 {
        let staggered = self.stagger_s * self.targets.len().saturating_sub(1) as f64;
        self.delay_s + staggered + self.duration_s
    }

    /// Progress of target `i` at `elapsed` seconds, `None` before its
    /// window opens.  Zero-duration tweens jump straight to 1.
    pub fn progress(&self, index: usize, elapsed_s: f64) -> Option<f64> {
        let start = self.delay_s + self.stagger_s * index as f64;
        if elapsed_s < start {
            return None;
        }
        if self.duration_s <= 0.0 {
            return Some(1.0);
        }
        Some(((elapsed_s - start) / self.duration_s).clamp(0.0, 1.0))
    }
}

// ───────────────────────────────────────── timeline ──────────

/// A parallel group of tweens, all starting at the same instant —
/// the way the site stacks its per-kind animations at position zero.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    pub tweens: Vec<Tween>,
}

impl Timeline {
    pub fn new() -> Self {
        Self { tweens: Vec::new() }
    }

    pub fn push(&mut self, tween: Tween) {
        self.tweens.push(tween);
    }

    /// Fold another timeline's tweens in at position zero.
    pub fn merge(&mut self, other: Timeline) {
        self.tweens.extend(other.tweens);
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Total running time in seconds (longest member).
    pub fn duration_s(&self) -> f64 {
        self.tweens.iter().map(Tween::end_s).fold(0.0, f64::max)
    }
}

// ───────────────────────────────────────── tests ─────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eases_hit_endpoints() {
        for ease in [
            Ease::Linear,
            Ease::QuadIn,
            Ease::QuadOut,
            Ease::QuadInOut,
            Ease::CubicOut,
        ] {
            assert!(ease.apply(0.0).abs() < 1e-12);
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-12);
        }
        // Out-of-range input clamps.
        assert_eq!(Ease::Linear.apply(2.0), 1.0);
    }

    #[test]
    fn stagger_shifts_start_windows() {
        let tween = Tween::new(
            vec![1, 2, 3],
            vec![Track::new(Prop::Opacity, Some(0.0), 1.0, Unit::Raw)],
            0.6,
            Ease::Linear,
        )
        .delay(0.3)
        .stagger(0.1);

        assert_eq!(tween.progress(0, 0.2), None);
        assert_eq!(tween.progress(0, 0.3), Some(0.0));
        assert_eq!(tween.progress(1, 0.3), None);
        assert!((tween.progress(1, 0.7).unwrap() - 0.5).abs() < 1e-9);
        // end = 0.3 delay + 0.2 stagger + 0.6 duration
        assert!((tween.end_s() - 1.1).abs() < 1e-9);
    }

    #[test]
    fn zero_duration_is_instant() {
        let tween = Tween::new(
            vec![1],
            vec![Track::new(Prop::Opacity, None, 0.0, Unit::Raw)],
            0.0,
            Ease::Linear,
        );
        assert_eq!(tween.progress(0, 0.0), Some(1.0));
    }

    #[test]
    fn track_samples_and_applies_units() {
        let mut style = InlineStyle::default();
        let track = Track::new(Prop::TranslateY, None, 2.0, Unit::Rem);
        assert_eq!(track.sample_current(&style, 16.0), 0.0);

        style.translate_y = Some(Len::Px(32.0));
        assert_eq!(track.sample_current(&style, 16.0), 2.0);

        track.apply(&mut style, 1.5);
        assert_eq!(style.translate_y, Some(Len::Rem(1.5)));
    }

    #[test]
    fn timeline_duration_is_longest_member() {
        let mut tl = Timeline::new();
        tl.push(Tween::new(vec![1], vec![], 0.6, Ease::Linear));
        tl.push(Tween::new(vec![1, 2], vec![], 0.6, Ease::Linear).stagger(0.1).delay(0.3));
        assert!((tl.duration_s() - 1.0).abs() < 1e-9);
    }
}
