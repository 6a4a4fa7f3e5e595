//! Marker-keyed enter/leave animations.
//!
//! Each kind targets the disjoint set of elements carrying its
//! `data-animation` value inside one container, so the five builders are
//! independent: a failure or empty set in one never affects another.
//! Builders return a passive [`Timeline`] (`None` when there is nothing to
//! animate); the caller merges and plays them.  Below the desktop
//! breakpoint every kind applies its final state directly and returns
//! `None` — no animation, same end state.

use crate::config::{
    ANIMATION_ATTR, CARD_CLASS, LINE_INNER_CLASS, LINE_MASK_CLASS, MARKER_FADE,
    MARKER_FADE_DELAY, MARKER_FADE_TITLE, MARKER_SLIDE, MARKER_SPLIT, MotionConfig, VISUAL_CLASS,
};
use crate::core::dom::{Document, NodeId};
use crate::core::geometry::Viewport;
use crate::core::style::{Len, WillChange};
use crate::motion::tween::{Prop, Timeline, Track, Tween, Unit};

/// Which way a page is going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Enter,
    Leave,
}

impl Direction {
    fn is_enter(self) -> bool {
        self == Direction::Enter
    }
}

/// Per-element start offset shared by the staggered kinds.
const STAGGER_S: f64 = 0.1;
/// Tighter cascade for line reveals.
const SPLIT_STAGGER_S: f64 = 0.05;

// ───────────────────────────────────────── fade ──────────────

/// Plain cross-fade.  During the catalog→product leave the active card's
/// visual is excluded so it survives for the shared-element move.
pub fn animate_fade(
    cfg: &MotionConfig,
    dom: &mut Document,
    viewport: &Viewport,
    container: NodeId,
    direction: Direction,
    exclude_flip_items: &[NodeId],
) -> Option<Timeline> {
    let targets: Vec<NodeId> = marked(dom, container, MARKER_FADE)
        .into_iter()
        .filter(|&el| !is_flip_visual(dom, el, exclude_flip_items))
        .collect();

    if !cfg.is_desktop(viewport) {
        apply_instant(dom, &targets, direction);
        return None;
    }
    if targets.is_empty() {
        return None;
    }

    let duration = cfg.duration_s(dom, viewport);
    let ease = cfg.ease(dom, viewport);
    for &el in &targets {
        dom.style_mut(el).will_change = Some(WillChange::Opacity);
    }

    let mut tween = Tween::new(
        targets,
        vec![opacity_track(direction)],
        duration,
        ease,
    );
    if direction.is_enter() {
        tween = tween.set_from();
    }
    Some(single(tween))
}

// ───────────────────────────────────────── fade-delay ────────

/// Staggered fade that waits half the base duration before revealing.
/// The reverse is deliberately plain: simultaneous, no delay, so a page
/// never lingers half-dissolved.
pub fn animate_fade_delay(
    cfg: &MotionConfig,
    dom: &mut Document,
    viewport: &Viewport,
    container: NodeId,
    direction: Direction,
) -> Option<Timeline> {
    let targets = marked(dom, container, MARKER_FADE_DELAY);
    if !cfg.is_desktop(viewport) {
        apply_instant(dom, &targets, direction);
        return None;
    }
    if targets.is_empty() {
        return None;
    }

    let duration = cfg.duration_s(dom, viewport);
    let ease = cfg.ease(dom, viewport);

    let mut tween = Tween::new(targets, vec![opacity_track(direction)], duration, ease);
    if direction.is_enter() {
        tween = tween.set_from().delay(duration / 2.0).stagger(STAGGER_S);
    }
    Some(single(tween))
}

// ───────────────────────────────────────── fade-title ────────

/// Title fade: entering waits out one full base duration (the rest of the
/// page settles first); leaving is immediate.
pub fn animate_fade_title(
    cfg: &MotionConfig,
    dom: &mut Document,
    viewport: &Viewport,
    container: NodeId,
    direction: Direction,
) -> Option<Timeline> {
    let targets = marked(dom, container, MARKER_FADE_TITLE);
    if !cfg.is_desktop(viewport) {
        apply_instant(dom, &targets, direction);
        return None;
    }
    if targets.is_empty() {
        return None;
    }

    let duration = cfg.duration_s(dom, viewport);
    let ease = cfg.ease(dom, viewport);
    for &el in &targets {
        dom.style_mut(el).will_change = Some(WillChange::Opacity);
    }

    let mut tween = Tween::new(targets, vec![opacity_track(direction)], duration, ease);
    if direction.is_enter() {
        tween = tween.set_from().delay(duration);
    }
    Some(single(tween))
}

// ───────────────────────────────────────── slide ─────────────

/// Rise-in: 2 rem vertical travel with a fade, cascading through the set
/// in both directions.
pub fn animate_slide(
    cfg: &MotionConfig,
    dom: &mut Document,
    viewport: &Viewport,
    container: NodeId,
    direction: Direction,
) -> Option<Timeline> {
    let targets = marked(dom, container, MARKER_SLIDE);
    if !cfg.is_desktop(viewport) {
        apply_instant(dom, &targets, direction);
        return None;
    }
    if targets.is_empty() {
        return None;
    }

    let duration = cfg.duration_s(dom, viewport);
    let ease = cfg.ease(dom, viewport);

    let tracks = if direction.is_enter() {
        vec![
            Track::new(Prop::TranslateY, Some(2.0), 0.0, Unit::Rem),
            Track::new(Prop::Opacity, Some(0.0), 1.0, Unit::Raw),
        ]
    } else {
        vec![
            Track::new(Prop::TranslateY, None, 2.0, Unit::Rem),
            Track::new(Prop::Opacity, None, 0.0, Unit::Raw),
        ]
    };

    let mut tween = Tween::new(targets, tracks, duration, ease).stagger(STAGGER_S);
    if direction.is_enter() {
        tween = tween.set_from();
    }
    Some(single(tween))
}

// ───────────────────────────────────────── split ─────────────

/// Per-line reveal: the element's text is decomposed into masked line
/// spans which slide in from above with a slight rotation.  Existing
/// spans are reused, so repeated invocations never re-split.
pub fn animate_split(
    cfg: &MotionConfig,
    dom: &mut Document,
    viewport: &Viewport,
    container: NodeId,
    direction: Direction,
) -> Option<Timeline> {
    let elements = marked(dom, container, MARKER_SPLIT);
    if !cfg.is_desktop(viewport) {
        apply_instant(dom, &elements, direction);
        return None;
    }
    if elements.is_empty() {
        return None;
    }

    let mut inners = Vec::new();
    for el in elements {
        let existing = dom.find_all_by_class(el, LINE_INNER_CLASS);
        if !existing.is_empty() {
            inners.extend(existing);
            continue;
        }
        inners.extend(split_into_lines(dom, el, direction));
    }
    if inners.is_empty() {
        return None;
    }

    let duration = cfg.duration_s(dom, viewport);
    let ease = cfg.ease(dom, viewport);

    let (from_y, to_y, from_rot, to_rot) = if direction.is_enter() {
        (Some(-120.0), 0.0, Some(2.0), 0.0)
    } else {
        (None, -120.0, None, -2.0)
    };

    let mut tween = Tween::new(
        inners,
        vec![
            Track::new(Prop::TranslateY, from_y, to_y, Unit::Percent),
            Track::new(Prop::RotateZ, from_rot, to_rot, Unit::Raw),
        ],
        duration,
        ease,
    )
    .stagger(SPLIT_STAGGER_S);
    if direction.is_enter() {
        tween = tween.set_from();
    }
    Some(single(tween))
}

/// Flatten an element's text into masked line spans and return the inner
/// spans.  Lines are the text's newline segments.
fn split_into_lines(dom: &mut Document, el: NodeId, direction: Direction) -> Vec<NodeId> {
    let text = dom.text_content(el);
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    let lines: Vec<String> = text.lines().map(str::to_string).collect();

    dom.clear_children(el);
    dom.set_text(el, "");

    let mut inners = Vec::with_capacity(lines.len());
    for line in lines {
        let mask = dom.create_element("span");
        dom.add_class(mask, LINE_MASK_CLASS);
        let inner = dom.create_element("span");
        dom.add_class(inner, LINE_INNER_CLASS);
        dom.set_text(inner, &line);
        {
            let style = dom.style_mut(inner);
            if direction.is_enter() {
                style.translate_y = Some(Len::Percent(-120.0));
                style.rotate_z = Some(2.0);
            } else {
                style.translate_y = Some(Len::Percent(0.0));
                style.rotate_z = Some(0.0);
            }
        }
        dom.append_child(mask, inner);
        dom.append_child(el, mask);
        inners.push(inner);
    }
    inners
}

// ───────────────────────────────────────── shared ────────────

/// Elements inside `container` opted into `kind`.
fn marked(dom: &Document, container: NodeId, kind: &str) -> Vec<NodeId> {
    dom.descendants(container)
        .into_iter()
        .filter(|&id| dom.attr(id, ANIMATION_ATTR) == Some(kind))
        .collect()
}

/// An element is spared from the fade when it is the visual of a card
/// currently doing the shared-element move.
fn is_flip_visual(dom: &Document, el: NodeId, flip_items: &[NodeId]) -> bool {
    flip_items
        .iter()
        .any(|&item| dom.closest(el, CARD_CLASS) == Some(item) && dom.has_class(el, VISUAL_CLASS))
}

fn opacity_track(direction: Direction) -> Track {
    if direction.is_enter() {
        Track::new(Prop::Opacity, Some(0.0), 1.0, Unit::Raw)
    } else {
        Track::new(Prop::Opacity, None, 0.0, Unit::Raw)
    }
}

/// Mobile path: jump straight to the final state.
fn apply_instant(dom: &mut Document, targets: &[NodeId], direction: Direction) {
    for &el in targets {
        let style = dom.style_mut(el);
        style.opacity = Some(if direction.is_enter() { 1.0 } else { 0.0 });
        style.translate_y = None;
        style.rotate_z = None;
    }
}

fn single(tween: Tween) -> Timeline {
    let mut timeline = Timeline::new();
    timeline.push(tween);
    timeline
}

// ───────────────────────────────────────── tests ─────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::style::Len;

    fn desktop() -> Viewport {
        Viewport::new(1280.0, 800.0)
    }

    fn mobile() -> Viewport {
        Viewport::new(600.0, 800.0)
    }

    fn page_with(kind: &str, count: usize) -> (Document, NodeId, Vec<NodeId>) {
        let mut dom = Document::new();
        let container = dom.create_element("div");
        dom.append_child(dom.root(), container);
        let mut els = Vec::new();
        for i in 0..count {
            let el = dom.create_element("div");
            dom.set_attr(el, ANIMATION_ATTR, kind);
            dom.set_text(el, &format!("element {i}"));
            dom.append_child(container, el);
            els.push(el);
        }
        (dom, container, els)
    }

    #[test]
    fn fade_enter_sets_start_and_returns_timeline() {
        let (mut dom, container, els) = page_with(MARKER_FADE, 2);
        let cfg = MotionConfig::default();
        let tl = animate_fade(&cfg, &mut dom, &desktop(), container, Direction::Enter, &[])
            .expect("timeline");
        assert_eq!(tl.tweens.len(), 1);
        assert_eq!(tl.tweens[0].targets, els);
        assert!(tl.tweens[0].set_from);
        assert_eq!(tl.tweens[0].delay_s, 0.0);
        assert_eq!(dom.style(els[0]).will_change, Some(WillChange::Opacity));
    }

    #[test]
    fn fade_leave_excludes_the_active_flip_visual() {
        let mut dom = Document::new();
        let container = dom.create_element("div");
        dom.append_child(dom.root(), container);

        let card = dom.create_element("a");
        dom.add_class(card, CARD_CLASS);
        dom.append_child(container, card);
        let visual = dom.create_element("div");
        dom.add_class(visual, VISUAL_CLASS);
        dom.set_attr(visual, ANIMATION_ATTR, MARKER_FADE);
        dom.append_child(card, visual);

        let other = dom.create_element("div");
        dom.set_attr(other, ANIMATION_ATTR, MARKER_FADE);
        dom.append_child(container, other);

        let cfg = MotionConfig::default();
        let tl = animate_fade(
            &cfg,
            &mut dom,
            &desktop(),
            container,
            Direction::Leave,
            &[card],
        )
        .expect("timeline");
        assert_eq!(tl.tweens[0].targets, vec![other]);
    }

    #[test]
    fn fade_delay_staggers_only_on_enter() {
        let (mut dom, container, _) = page_with(MARKER_FADE_DELAY, 3);
        let cfg = MotionConfig::default();

        let enter =
            animate_fade_delay(&cfg, &mut dom, &desktop(), container, Direction::Enter).unwrap();
        assert!((enter.tweens[0].delay_s - 0.3).abs() < 1e-9);
        assert!((enter.tweens[0].stagger_s - 0.1).abs() < 1e-9);

        let leave =
            animate_fade_delay(&cfg, &mut dom, &desktop(), container, Direction::Leave).unwrap();
        assert_eq!(leave.tweens[0].delay_s, 0.0);
        assert_eq!(leave.tweens[0].stagger_s, 0.0);
    }

    #[test]
    fn fade_title_waits_a_full_duration_on_enter() {
        let (mut dom, container, _) = page_with(MARKER_FADE_TITLE, 1);
        let cfg = MotionConfig::default();

        let enter =
            animate_fade_title(&cfg, &mut dom, &desktop(), container, Direction::Enter).unwrap();
        assert!((enter.tweens[0].delay_s - 0.6).abs() < 1e-9);

        let leave =
            animate_fade_title(&cfg, &mut dom, &desktop(), container, Direction::Leave).unwrap();
        assert_eq!(leave.tweens[0].delay_s, 0.0);
    }

    #[test]
    fn slide_travels_two_rem_both_ways() {
        let (mut dom, container, _) = page_with(MARKER_SLIDE, 2);
        let cfg = MotionConfig::default();

        let enter = animate_slide(&cfg, &mut dom, &desktop(), container, Direction::Enter).unwrap();
        let y = &enter.tweens[0].tracks[0];
        assert_eq!(y.from, Some(2.0));
        assert_eq!(y.to, 0.0);
        assert_eq!(y.unit, Unit::Rem);
        assert!((enter.tweens[0].stagger_s - 0.1).abs() < 1e-9);

        let leave = animate_slide(&cfg, &mut dom, &desktop(), container, Direction::Leave).unwrap();
        let y = &leave.tweens[0].tracks[0];
        assert_eq!(y.from, None);
        assert_eq!(y.to, 2.0);
    }

    #[test]
    fn split_builds_line_spans_once() {
        let mut dom = Document::new();
        let container = dom.create_element("div");
        dom.append_child(dom.root(), container);
        let headline = dom.create_element("h1");
        dom.set_attr(headline, ANIMATION_ATTR, MARKER_SPLIT);
        dom.set_text(headline, "Crafted\nfurniture");
        dom.append_child(container, headline);

        let cfg = MotionConfig::default();
        let tl = animate_split(&cfg, &mut dom, &desktop(), container, Direction::Enter).unwrap();
        let inners = &tl.tweens[0].targets;
        assert_eq!(inners.len(), 2);
        assert!((tl.tweens[0].stagger_s - 0.05).abs() < 1e-9);
        assert_eq!(dom.style(inners[0]).translate_y, Some(Len::Percent(-120.0)));
        assert_eq!(dom.text_content(headline), "Craftedfurniture");
        assert_eq!(
            dom.find_all_by_class(headline, LINE_MASK_CLASS).len(),
            2
        );

        // Re-invoking reuses the spans instead of splitting again.
        let tl2 = animate_split(&cfg, &mut dom, &desktop(), container, Direction::Leave).unwrap();
        assert_eq!(tl2.tweens[0].targets, *inners);
        assert_eq!(dom.find_all_by_class(headline, LINE_MASK_CLASS).len(), 2);
        assert_eq!(tl2.tweens[0].tracks[0].to, -120.0);
        assert_eq!(tl2.tweens[0].tracks[1].to, -2.0);
    }

    #[test]
    fn mobile_applies_final_state_instantly() {
        let (mut dom, container, els) = page_with(MARKER_SLIDE, 2);
        dom.style_mut(els[0]).translate_y = Some(Len::Rem(2.0));
        let cfg = MotionConfig::default();

        let tl = animate_slide(&cfg, &mut dom, &mobile(), container, Direction::Enter);
        assert!(tl.is_none());
        assert_eq!(dom.style(els[0]).opacity, Some(1.0));
        assert_eq!(dom.style(els[0]).translate_y, None);

        let tl = animate_fade(&cfg, &mut dom, &mobile(), container, Direction::Leave, &[]);
        assert!(tl.is_none());
    }

    #[test]
    fn empty_marker_set_yields_nothing() {
        let (mut dom, container, _) = page_with(MARKER_FADE, 0);
        let cfg = MotionConfig::default();
        assert!(
            animate_fade(&cfg, &mut dom, &desktop(), container, Direction::Enter, &[]).is_none()
        );
        assert!(animate_split(&cfg, &mut dom, &desktop(), container, Direction::Enter).is_none());
    }
}
