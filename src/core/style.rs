//! Typed inline-style values.
//!
//! The animation code never writes style strings — every property an
//! animation or the FLIP pin can touch is an explicit optional field here.
//! `None` means "not set inline", which is exactly the observable contract
//! for "no leftover inline overrides" after a transition finishes.

// ───────────────────────────────────────── value types ───────

/// A CSS-like length.  Interpolation only happens between values of the
/// same variant; conversion to pixels needs a rem size and (for percent)
/// a reference length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Len {
    Px(f64),
    Rem(f64),
    Percent(f64),
}

impl Len {
    /// Resolve to pixels.  `reference` is the length a percentage is
    /// relative to (the element's own box for transforms).
    pub fn to_px(self, rem_px: f64, reference: f64) -> f64 {
        match self {
            Len::Px(v) => v,
            Len::Rem(v) => v * rem_px,
            Len::Percent(v) => v / 100.0 * reference,
        }
    }

    /// The raw numeric part, whatever the unit.
    pub fn value(self) -> f64 {
        match self {
            Len::Px(v) | Len::Rem(v) | Len::Percent(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Static,
    Relative,
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    None,
}

/// Inline override of an element's timed CSS transition.  The only override
/// the hover manager ever needs is "no transition right now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOverride {
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WillChange {
    Opacity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectFit {
    Cover,
}

// ───────────────────────────────────────── inline style ──────

/// Inline style of one node.  All fields default to `None` (nothing set).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineStyle {
    pub position: Option<Position>,
    /// Viewport-relative when `position` is `Fixed`, in pixels.
    pub top: Option<f64>,
    pub left: Option<f64>,
    pub width: Option<Len>,
    pub height: Option<Len>,
    pub margin: Option<f64>,
    pub z_index: Option<i32>,
    pub opacity: Option<f64>,
    pub visibility: Option<Visibility>,
    pub display: Option<Display>,
    pub translate_x: Option<Len>,
    pub translate_y: Option<Len>,
    /// Rotation around z, in degrees.
    pub rotate_z: Option<f64>,
    pub overflow: Option<Overflow>,
    pub overflow_x: Option<Overflow>,
    pub overflow_y: Option<Overflow>,
    pub transition: Option<TransitionOverride>,
    pub will_change: Option<WillChange>,
    pub object_fit: Option<ObjectFit>,
}

/// The positioning fields the FLIP pin overwrites, saved for restoration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositioningSnapshot {
    pub position: Option<Position>,
    pub top: Option<f64>,
    pub left: Option<f64>,
    pub width: Option<Len>,
    pub height: Option<Len>,
    pub margin: Option<f64>,
}

impl InlineStyle {
    /// Snapshot the fields a fixed-position pin will overwrite.
    pub fn positioning(&self) -> PositioningSnapshot {
        PositioningSnapshot {
            position: self.position,
            top: self.top,
            left: self.left,
            width: self.width,
            height: self.height,
            margin: self.margin,
        }
    }

    /// Put previously saved positioning fields back.
    pub fn restore_positioning(&mut self, snap: &PositioningSnapshot) {
        self.position = snap.position;
        self.top = snap.top;
        self.left = snap.left;
        self.width = snap.width;
        self.height = snap.height;
        self.margin = snap.margin;
    }

    /// Clear transform/paint overrides left behind by a reconciling
    /// animation (transform, opacity, visibility, z-index).
    pub fn clear_animation_props(&mut self) {
        self.translate_x = None;
        self.translate_y = None;
        self.rotate_z = None;
        self.opacity = None;
        self.visibility = None;
        self.z_index = None;
    }

    /// Drop every inline property (the "clear everything" baseline reset).
    pub fn clear_all(&mut self) {
        *self = InlineStyle::default();
    }

    /// True when any overflow axis is clipped inline.
    pub fn clips_overflow(&self) -> bool {
        self.overflow == Some(Overflow::Hidden)
            || self.overflow_x == Some(Overflow::Hidden)
            || self.overflow_y == Some(Overflow::Hidden)
    }
}

// ───────────────────────────────────────── tests ─────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_resolves_units() {
        assert_eq!(Len::Px(12.0).to_px(16.0, 100.0), 12.0);
        assert_eq!(Len::Rem(2.0).to_px(16.0, 100.0), 32.0);
        assert_eq!(Len::Percent(-120.0).to_px(16.0, 50.0), -60.0);
    }

    #[test]
    fn positioning_round_trips() {
        let mut style = InlineStyle {
            position: Some(Position::Relative),
            top: Some(4.0),
            width: Some(Len::Percent(100.0)),
            ..InlineStyle::default()
        };
        let snap = style.positioning();

        style.position = Some(Position::Fixed);
        style.top = Some(120.0);
        style.left = Some(40.0);
        style.width = Some(Len::Px(640.0));
        style.height = Some(Len::Px(480.0));
        style.margin = Some(0.0);

        style.restore_positioning(&snap);
        assert_eq!(style.position, Some(Position::Relative));
        assert_eq!(style.top, Some(4.0));
        assert_eq!(style.left, None);
        assert_eq!(style.width, Some(Len::Percent(100.0)));
        assert_eq!(style.height, None);
        assert_eq!(style.margin, None);
    }

    #[test]
    fn clear_animation_props_leaves_layout_fields() {
        let mut style = InlineStyle {
            translate_y: Some(Len::Px(30.0)),
            rotate_z: Some(2.0),
            opacity: Some(0.5),
            z_index: Some(1000),
            overflow: Some(Overflow::Hidden),
            ..InlineStyle::default()
        };
        style.clear_animation_props();
        assert_eq!(style.translate_y, None);
        assert_eq!(style.opacity, None);
        assert_eq!(style.z_index, None);
        assert_eq!(style.overflow, Some(Overflow::Hidden));
    }
}
