//! Two-column catalog reorganization.
//!
//! The columns are rebuilt from scratch on every pass — flatten first,
//! then re-split — so the DOM and the scroll-range cache can never drift
//! apart.  Flattening interleaves the columns back (A0, B0, A1, B1, …),
//! restoring original document order and making the pass idempotent.
//! Items land in the columns as clones; the originals are discarded with
//! the old container contents.

use tracing::debug;

use crate::app::state::PageState;
use crate::config::{
    CARD_ACTIVE_CLASS, CARD_CLASS, COLUMN_CLASS, COLUMN_EVEN_CLASS, COLUMN_ODD_CLASS,
    CONTAINER_CLASS,
};
use crate::core::dom::{Document, NodeId};
use crate::motion::scroll::ScrollEffect;

/// Rebuild the catalog container for the current viewport: two interleaved
/// columns above the breakpoint (scroll effect on the second), a single
/// flat list below it.  Idempotent and re-entrant; a missing or empty
/// container is a no-op.
pub fn reorganize(state: &mut PageState, now_ms: f64) {
    // Stale controllers must go before the columns they drive do.
    state.scroll_effects.dispose_all();

    let Some(container) = state.dom.find_by_class(state.dom.root(), CONTAINER_CLASS) else {
        return;
    };

    flatten(&mut state.dom, container);

    if !state.config.is_desktop(&state.viewport) {
        return;
    }

    let items = state.dom.children(container).to_vec();
    if items.is_empty() {
        return;
    }

    let column_a = state.dom.create_element("div");
    state.dom.add_class(column_a, COLUMN_CLASS);
    state.dom.add_class(column_a, COLUMN_ODD_CLASS);
    let column_b = state.dom.create_element("div");
    state.dom.add_class(column_b, COLUMN_CLASS);
    state.dom.add_class(column_b, COLUMN_EVEN_CLASS);

    for (index, &item) in items.iter().enumerate() {
        let clone = state.dom.clone_subtree(item);
        mark_cards_active(&mut state.dom, clone);
        let column = if index % 2 == 0 { column_a } else { column_b };
        state.dom.append_child(column, clone);
    }

    state.dom.clear_children(container);
    state.dom.append_child(container, column_a);
    state.dom.append_child(container, column_b);

    debug!(items = items.len(), "catalog split into columns");

    let effect = ScrollEffect::new(
        &state.dom,
        state.layout.as_mut(),
        &state.viewport,
        container,
        column_b,
        now_ms,
    );
    state.scroll_effects.attach(effect);
}

/// Move any existing column contents back into the container, interleaved
/// by original parity so document order is restored.
fn flatten(dom: &mut Document, container: NodeId) {
    let columns: Vec<NodeId> = dom
        .children(container)
        .iter()
        .copied()
        .filter(|&c| dom.has_class(c, COLUMN_CLASS))
        .collect();
    if columns.is_empty() {
        return;
    }

    let lists: Vec<Vec<NodeId>> = columns.iter().map(|&c| dom.children(c).to_vec()).collect();
    let longest = lists.iter().map(Vec::len).max().unwrap_or(0);

    let mut flat = Vec::new();
    for i in 0..longest {
        for list in &lists {
            if let Some(&item) = list.get(i) {
                flat.push(item);
            }
        }
    }

    for column in columns {
        dom.detach(column);
    }
    for item in flat {
        dom.append_child(container, item);
    }
}

/// Tag the clone's card element(s) with the active marker: the clone
/// itself when it is a card, otherwise every card inside it.
fn mark_cards_active(dom: &mut Document, clone: NodeId) {
    if dom.has_class(clone, CARD_CLASS) {
        dom.add_class(clone, CARD_ACTIVE_CLASS);
    } else {
        for card in dom.find_all_by_class(clone, CARD_CLASS) {
            dom.add_class(card, CARD_ACTIVE_CLASS);
        }
    }
}

// ───────────────────────────────────────── tests ─────────────
