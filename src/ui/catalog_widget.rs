//! Terminal rendering of the simulated page.
//!
//! The page is drawn to scale: document pixels map linearly onto terminal
//! rows, so the parallax offset on the second column and the morphing
//! visual are visible as they animate.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use crate::app::state::PageState;
use crate::config::{
    CARD_CLASS, CARD_HOVER_CLASS, CARD_UNHOVER_CLASS, COLUMN_EVEN_CLASS, ITEM_NAME_CLASS,
    PRODUCT_IMG_WRAP_CLASS, VISUAL_CLASS,
};
use crate::core::text::normalize_text;
use crate::ui::theme::Theme;

/// One drawable box, already measured in client pixels.
pub struct BoxView {
    pub label: String,
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
    pub style: Style,
}

/// Measure every card (and the product image wrapper, when present) into
/// client-pixel boxes.
pub fn build_views(state: &mut PageState) -> Vec<BoxView> {
    let mut views = Vec::new();
    let viewport = state.viewport;

    let cards = state.dom.find_all_by_class(state.dom.root(), CARD_CLASS);
    for card in cards {
        let Some(rect) = state
            .layout
            .rect(&state.dom, &viewport, card)
            .map(|r| r.offset_y(-viewport.scroll_y))
        else {
            continue;
        };
        let label = state
            .dom
            .find_by_class(card, ITEM_NAME_CLASS)
            .map(|l| normalize_text(&state.dom.text_content(l)))
            .unwrap_or_default();

        let style = if state.dom.has_class(card, CARD_HOVER_CLASS) {
            Theme::card_hover_style()
        } else if state.dom.has_class(card, CARD_UNHOVER_CLASS) {
            Theme::card_unhover_style()
        } else if state
            .dom
            .closest(card, COLUMN_EVEN_CLASS)
            .is_some()
        {
            Theme::offset_column_style()
        } else {
            Theme::card_style()
        };

        views.push(BoxView {
            label,
            top: rect.top,
            left: rect.left,
            width: rect.width,
            height: rect.height,
            style,
        });
    }

    if let Some(wrap) = state
        .dom
        .find_by_class(state.dom.root(), PRODUCT_IMG_WRAP_CLASS)
    {
        if let Some(visual) = state.dom.find_by_class(wrap, VISUAL_CLASS) {
            if let Some(rect) = state
                .layout
                .rect(&state.dom, &viewport, visual)
                .map(|r| r.offset_y(-viewport.scroll_y))
            {
                views.push(BoxView {
                    label: "visual".to_string(),
                    top: rect.top,
                    left: rect.left,
                    width: rect.width,
                    height: rect.height,
                    style: Theme::title_style(),
                });
            }
        }
    }

    views
}

/// Draws the measured boxes into the terminal area.
pub struct PageWidget<'a> {
    pub views: &'a [BoxView],
    /// Client pixels per terminal row / column.
    pub px_per_row: f64,
    pub px_per_col: f64,
}

impl Widget for PageWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for view in self.views {
            let top = (view.top / self.px_per_row).round() as i32;
            let height = ((view.height / self.px_per_row).round() as i32).max(2);
            let left = (view.left / self.px_per_col).round() as i32;
            let width = ((view.width / self.px_per_col).round() as i32).max(4);

            // Clip to the drawable area.
            if top + height <= 0 || top >= area.height as i32 {
                continue;
            }
            let y = area.y as i32 + top.max(0);
            let h = (height + top.min(0)).min(area.height as i32 - top.max(0));
            if h <= 0 {
                continue;
            }
            let x = area.x as i32 + left.max(0);
            let w = width.min(area.width as i32 - left.max(0));
            if w <= 0 {
                continue;
            }

            let rect = Rect::new(x as u16, y as u16, w as u16, h as u16);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(view.style);
            block.render(rect, buf);

            if h >= 2 && rect.width >= 4 && !view.label.is_empty() {
                let line = Line::from(Span::styled(format!(" {} ", view.label), view.style));
                buf.set_line(rect.x + 1, rect.y + 1, &line, rect.width.saturating_sub(2));
            }
        }
    }
}
