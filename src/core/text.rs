//! Text normalization and card resolution.
//!
//! Navigation needs to pair a product page with its catalog card.  The
//! match runs on normalized visible text first and falls back to the
//! card's link path, so neither stray whitespace nor a renamed heading
//! breaks the pairing.  No match is not an error — downstream steps just
//! skip the shared-element work.

use crate::config::{
    CARD_CLASS, ITEM_NAME_CLASS, PROJECTS_COUNT_ATTR, PROJECT_ATTR,
};
use crate::core::dom::{Document, NodeId};

/// Collapse non-breaking spaces and whitespace runs, then trim.
pub fn normalize_text(text: &str) -> String {
    let replaced = text.replace('\u{00A0}', " ");
    let mut out = String::with_capacity(replaced.len());
    let mut last_was_space = false;
    for c in replaced.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out.trim().to_string()
}

/// Heading-ish elements used when a dedicated name element is missing:
/// `h1`–`h6` tags, or classes mentioning "title" or "name".
fn is_heading_like(dom: &Document, id: NodeId) -> bool {
    let node = dom.node(id);
    matches!(node.tag.as_str(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
        || node
            .classes
            .iter()
            .any(|c| c.contains("title") || c.contains("name"))
}

/// The card's display name: its `.item-name` text, else the first
/// non-empty heading-like descendant.
fn card_name(dom: &Document, card: NodeId) -> String {
    if let Some(label) = dom.find_by_class(card, ITEM_NAME_CLASS) {
        let name = normalize_text(&dom.text_content(label));
        if !name.is_empty() {
            return name;
        }
    }
    for id in dom.descendants(card) {
        if is_heading_like(dom, id) {
            let text = normalize_text(&dom.text_content(id));
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

/// Resolve the product's display name from a page container: the
/// `.item-name` element, else a list of heading fallbacks.
pub fn resolve_product_name(dom: &Document, container: NodeId) -> Option<String> {
    if let Some(label) = dom.find_by_class(container, ITEM_NAME_CLASS) {
        let name = normalize_text(&dom.text_content(label));
        if !name.is_empty() {
            return Some(name);
        }
    }
    for id in dom.descendants(container) {
        if is_heading_like(dom, id) {
            let text = normalize_text(&dom.text_content(id));
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Find the catalog card matching a product name: exact normalized-text
/// match first, then the card whose `href` path equals the current
/// location path.  Later matches win, like a last-write query scan.
pub fn find_active_card(dom: &Document, product_name: &str) -> Option<NodeId> {
    let wanted = normalize_text(product_name);
    let cards = dom.find_all_by_class(dom.root(), CARD_CLASS);

    let mut active = None;
    for &card in &cards {
        if !wanted.is_empty() && card_name(dom, card) == wanted {
            active = Some(card);
        }
    }
    if active.is_some() {
        return active;
    }

    let current_path = dom.path().split('?').next().unwrap_or("");
    for &card in &cards {
        if let Some(href) = dom.attr(card, "href") {
            if href.split('?').next().unwrap_or("") == current_path {
                active = Some(card);
            }
        }
    }
    active
}

/// Mirror the number of `project`-marked elements into every
/// `projects-count` element as `(N)`, written into its deepest child.
pub fn update_projects_count(dom: &mut Document) {
    let count = dom.find_all_with_attr(dom.root(), PROJECT_ATTR).len();
    let targets = dom.find_all_with_attr(dom.root(), PROJECTS_COUNT_ATTR);
    for target in targets {
        let mut deepest = target;
        while let Some(&last) = dom.children(deepest).last() {
            deepest = last;
        }
        dom.set_text(deepest, &format!("({count})"));
    }
}

// ───────────────────────────────────────── tests ─────────────
