//! Interactive simulation of the catalog site.
//!
//! Builds a synthetic catalog page (and product pages on demand) in the
//! arena document, runs the full transition controller against a real
//! frame clock, and draws the result to scale in the terminal.
//!
//! Keys: `j`/`k` or arrows / mouse wheel scroll, `Enter` opens the product
//! page for the card nearest the viewport top, `Esc` goes back, `m`
//! toggles the mobile viewport, `q` quits.

use std::io::{self, stderr};
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    widgets::{Block, Borders, Paragraph},
    Terminal,
};

use catalog_motion::app::state::PageState;
use catalog_motion::app::transition::{self, TransitionData};
use catalog_motion::config::{
    ANIMATION_ATTR, CARD_CLASS, CONTAINER_CLASS, COLUMN_EVEN_CLASS, DURATION_VAR, FIXED_CLASS,
    ITEM_NAME_CLASS, MARKER_FADE, MARKER_FADE_DELAY, MARKER_FADE_TITLE, MARKER_SLIDE,
    MARKER_SPLIT, Namespace, PRODUCT_IMG_WRAP_CLASS, PROJECTS_COUNT_ATTR, PROJECT_ATTR,
    TIMING_VAR, VISUAL_CLASS, VISUAL_WRAP_CLASS,
};
use catalog_motion::core::dom::{Document, NodeId};
use catalog_motion::core::geometry::Viewport;
use catalog_motion::core::style::Overflow;
use catalog_motion::motion::engine::TimelineId;
use catalog_motion::ui::catalog_widget::{build_views, PageWidget};
use catalog_motion::ui::theme::Theme;

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Catalog transition simulator")]
struct Cli {
    /// Number of catalog items.
    #[arg(long, default_value_t = 7)]
    items: usize,

    /// Simulated viewport width in CSS pixels.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Simulated viewport height in CSS pixels.
    #[arg(long, default_value_t = 800.0)]
    height: f64,
}

// ───────────────────────────────────────── page building ─────

fn item_name(index: usize) -> String {
    format!("Piece no. {:02}", index + 1)
}

fn item_path(index: usize) -> String {
    format!("/products/piece-{:02}", index + 1)
}

/// The catalog page: headline, counter, and the item grid.
fn build_catalog_container(dom: &mut Document, items: usize) -> NodeId {
    let page = dom.create_element("main");
    dom.append_child(dom.root(), page);

    let header = dom.create_element("header");
    dom.set_attr(header, "data-h", "320");
    dom.append_child(page, header);

    let headline = dom.create_element("h1");
    dom.set_attr(headline, ANIMATION_ATTR, MARKER_SPLIT);
    dom.set_text(headline, "Catalog of\nquiet objects");
    dom.append_child(header, headline);

    let counter = dom.create_element("div");
    dom.set_attr(counter, PROJECTS_COUNT_ATTR, "");
    dom.set_attr(counter, ANIMATION_ATTR, MARKER_FADE_TITLE);
    let counter_inner = dom.create_element("span");
    dom.append_child(counter, counter_inner);
    dom.append_child(header, counter);

    let container = dom.create_element("div");
    dom.add_class(container, CONTAINER_CLASS);
    dom.append_child(page, container);

    for i in 0..items {
        let item = dom.create_element("div");
        dom.set_attr(item, "data-h", "480");
        dom.append_child(container, item);

        let card = dom.create_element("a");
        dom.add_class(card, CARD_CLASS);
        dom.set_attr(card, "href", &item_path(i));
        dom.set_attr(card, PROJECT_ATTR, "");
        dom.append_child(item, card);

        let wrap = dom.create_element("div");
        dom.add_class(wrap, VISUAL_WRAP_CLASS);
        dom.set_attr(wrap, "data-h", "400");
        dom.style_mut(wrap).overflow = Some(Overflow::Hidden);
        dom.append_child(card, wrap);

        let visual = dom.create_element("div");
        dom.add_class(visual, VISUAL_CLASS);
        dom.set_attr(visual, ANIMATION_ATTR, MARKER_FADE);
        dom.set_attr(visual, "data-h", "400");
        dom.append_child(wrap, visual);

        let img = dom.create_element("img");
        dom.set_attr(img, "data-h", "400");
        dom.append_child(visual, img);

        let label = dom.create_element("div");
        dom.add_class(label, ITEM_NAME_CLASS);
        dom.set_attr(label, ANIMATION_ATTR, MARKER_SLIDE);
        dom.set_text(label, &item_name(i));
        dom.append_child(card, label);
    }

    page
}

/// A product page for one item.
fn build_product_container(dom: &mut Document, index: usize) -> NodeId {
    let page = dom.create_element("main");
    dom.append_child(dom.root(), page);

    let wrap = dom.create_element("div");
    dom.add_class(wrap, PRODUCT_IMG_WRAP_CLASS);
    dom.set_attr(wrap, "data-h", "600");
    dom.append_child(page, wrap);

    let visual = dom.create_element("div");
    dom.add_class(visual, VISUAL_CLASS);
    dom.set_attr(visual, "data-h", "600");
    dom.append_child(wrap, visual);
    let img = dom.create_element("img");
    dom.set_attr(img, "data-h", "600");
    dom.append_child(visual, img);

    let title = dom.create_element("h1");
    dom.add_class(title, ITEM_NAME_CLASS);
    dom.set_attr(title, ANIMATION_ATTR, MARKER_FADE_TITLE);
    dom.set_text(title, &item_name(index));
    dom.append_child(page, title);

    for copy in ["Solid oak, hand finished.", "Ships in four weeks."] {
        let line = dom.create_element("p");
        dom.set_attr(line, ANIMATION_ATTR, MARKER_FADE_DELAY);
        dom.set_text(line, copy);
        dom.append_child(page, line);
    }

    page
}

// ───────────────────────────────────────── navigation ────────

/// Where the serialized navigation currently is.
enum NavPhase {
    Idle,
    /// Waiting for the leave timeline before entering.
    Leaving {
        data: TransitionData,
        handle: TimelineId,
    },
    /// Waiting for the enter timeline before finishing.
    Entering {
        data: TransitionData,
        handle: TimelineId,
    },
}

struct Demo {
    state: PageState,
    items: usize,
    /// Container currently shown (or being left).
    current_container: NodeId,
    current_ns: Namespace,
    /// Product index the current/last product page shows.
    product_index: usize,
    phase: NavPhase,
}

impl Demo {
    fn start_navigation(&mut self, now_ms: f64, to: Namespace, product_index: usize) {
        if !matches!(self.phase, NavPhase::Idle) {
            return; // one transition at a time
        }
        let next = match to {
            Namespace::Product => {
                self.product_index = product_index;
                self.state.dom.set_path(&item_path(product_index));
                build_product_container(&mut self.state.dom, product_index)
            }
            Namespace::Catalog => {
                self.state.dom.set_path("/");
                build_catalog_container(&mut self.state.dom, self.items)
            }
        };
        let data = TransitionData {
            current: self.current_container,
            next,
            from: self.current_ns,
            to,
            trigger: "a".to_string(),
        };

        transition::before(&mut self.state, &data, now_ms);
        transition::before_leave(&mut self.state, &data, now_ms);
        match transition::leave(&mut self.state, &data, now_ms) {
            Some(handle) => self.phase = NavPhase::Leaving { data, handle },
            None => self.begin_enter(data, now_ms),
        }
    }

    fn begin_enter(&mut self, data: TransitionData, now_ms: f64) {
        transition::before_enter(&mut self.state, &data, now_ms);
        match transition::enter(&mut self.state, &data, now_ms) {
            Some(handle) => self.phase = NavPhase::Entering { data, handle },
            None => self.finish(data, now_ms),
        }
    }

    fn finish(&mut self, data: TransitionData, now_ms: f64) {
        transition::after_enter(&mut self.state, &data, now_ms);
        transition::after(&mut self.state, &data, now_ms);
        self.state.dom.detach(data.current);
        self.current_container = data.next;
        self.current_ns = data.to;
        self.phase = NavPhase::Idle;
    }

    /// Advance the frame and push the navigation on when its awaited
    /// timeline completes.
    fn tick(&mut self, now_ms: f64) {
        let completed = transition::tick(&mut self.state, now_ms);
        match std::mem::replace(&mut self.phase, NavPhase::Idle) {
            NavPhase::Idle => {}
            NavPhase::Leaving { data, handle } => {
                if completed.contains(&handle) {
                    self.begin_enter(data, now_ms);
                } else {
                    self.phase = NavPhase::Leaving { data, handle };
                }
            }
            NavPhase::Entering { data, handle } => {
                if completed.contains(&handle) {
                    self.finish(data, now_ms);
                } else {
                    self.phase = NavPhase::Entering { data, handle };
                }
            }
        }
    }

    /// Item index of the card whose top edge sits nearest the viewport
    /// top, recovered from the card's link path.
    fn focused_card(&mut self) -> usize {
        let viewport = self.state.viewport;
        let cards = self
            .state
            .dom
            .find_all_by_class(self.current_container, CARD_CLASS);
        let mut best = (f64::MAX, 0usize);
        for &card in &cards {
            let Some(rect) = self.state.layout.rect(&self.state.dom, &viewport, card) else {
                continue;
            };
            let index = self
                .state
                .dom
                .attr(card, "href")
                .and_then(|href| href.rsplit('-').next())
                .and_then(|n| n.parse::<usize>().ok())
                .map(|n| n.saturating_sub(1))
                .unwrap_or(0);
            let distance = (rect.top - viewport.scroll_y).abs();
            if distance < best.0 {
                best = (distance, index);
            }
        }
        best.1
    }

    fn scroll_by(&mut self, delta: f64) {
        let viewport = self.state.viewport;
        let doc_height = self
            .state
            .layout
            .rect(&self.state.dom, &viewport, self.state.dom.root())
            .map(|r| r.height)
            .unwrap_or(0.0);
        let max = (doc_height - viewport.height).max(0.0);
        let target = (viewport.scroll_y + delta).clamp(0.0, max);
        transition::on_scroll(&mut self.state, target);
    }
}

// ───────────────────────────────────────── events ────────────

#[derive(Debug)]
enum AppEvent {
    Key(crossterm::event::KeyEvent),
    Mouse(crossterm::event::MouseEvent),
    Tick,
}

/// Background task polling the terminal; sends a tick when idle so the
/// frame clock never stalls.
fn spawn_event_reader(tick_rate: Duration) -> tokio::sync::mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    tokio::spawn(async move {
        loop {
            let has_event = crossterm::event::poll(tick_rate).unwrap_or(false);
            if has_event {
                if let Ok(ev) = crossterm::event::read() {
                    let app_event = match ev {
                        crossterm::event::Event::Key(k) => AppEvent::Key(k),
                        crossterm::event::Event::Mouse(m) => AppEvent::Mouse(m),
                        _ => continue,
                    };
                    if tx.send(app_event).is_err() {
                        break;
                    }
                }
            } else if tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });
    rx
}

// ───────────────────────────────────────── main ──────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    // ── build the site ────────────────────────────────────────
    let mut dom = Document::new();
    dom.set_root_var(DURATION_VAR, "600ms");
    dom.set_root_var(TIMING_VAR, "ease-out");
    let catalog = build_catalog_container(&mut dom, cli.items);

    let viewport = Viewport::new(cli.width, cli.height);
    let mut demo = Demo {
        state: PageState::new(dom, viewport),
        items: cli.items,
        current_container: catalog,
        current_ns: Namespace::Catalog,
        product_index: 0,
        phase: NavPhase::Idle,
    };
    transition::init(&mut demo.state, 0.0);

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let started = Instant::now();
    let mut events = spawn_event_reader(Duration::from_millis(33));
    let desktop_viewport = viewport;
    let mobile_viewport = Viewport::new(600.0, cli.height);

    // ── event loop ────────────────────────────────────────────
    loop {
        let now_ms = started.elapsed().as_secs_f64() * 1000.0;
        demo.tick(now_ms);
        let views = build_views(&mut demo.state);
        let viewport = demo.state.viewport;

        let offset = demo
            .state
            .dom
            .find_by_class(demo.state.dom.root(), COLUMN_EVEN_CLASS)
            .and_then(|col| demo.state.scroll_effects.offset_for(col))
            .unwrap_or(0.0);
        let fixed = demo
            .state
            .dom
            .find_by_class(demo.state.dom.root(), FIXED_CLASS)
            .is_some();
        let status = format!(
            " {} | scroll {:>6.0} | column offset {:>7.2}px | {} | transitions {}{} ",
            demo.current_ns.as_str(),
            viewport.scroll_y,
            offset,
            if demo.state.config.is_desktop(&viewport) {
                "desktop"
            } else {
                "mobile"
            },
            demo.state.records.len(),
            if fixed { " | fixed" } else { "" },
        );
        let log_tail: Vec<String> = demo
            .state
            .log
            .tail(3)
            .iter()
            .map(|e| format!("[{}] {}", e.tag.as_str(), e.message))
            .collect();

        terminal.draw(|frame| {
            let area = frame.area();
            if area.height < 6 || area.width < 10 {
                return;
            }
            let body_h = area.height - 4;
            let page_area = ratatui::layout::Rect::new(area.x, area.y, area.width, body_h);
            let status_area = ratatui::layout::Rect::new(area.x, area.y + body_h, area.width, 1);
            let log_area =
                ratatui::layout::Rect::new(area.x, area.y + body_h + 1, area.width, 3);

            let block = Block::default()
                .title(" catalog-motion ")
                .title_style(Theme::title_style())
                .borders(Borders::ALL)
                .border_style(Theme::border_style());
            let inner = block.inner(page_area);
            frame.render_widget(block, page_area);

            frame.render_widget(
                PageWidget {
                    views: &views,
                    px_per_row: viewport.height / inner.height.max(1) as f64,
                    px_per_col: viewport.width / inner.width.max(1) as f64,
                },
                inner,
            );

            frame.render_widget(
                Paragraph::new(status.as_str()).style(Theme::status_bar_style()),
                status_area,
            );
            frame.render_widget(
                Paragraph::new(log_tail.join("\n")).style(Theme::log_style()),
                log_area,
            );
        })?;

        let Some(event) = events.recv().await else {
            break;
        };
        match event {
            AppEvent::Tick => {}
            AppEvent::Mouse(m) => match m.kind {
                crossterm::event::MouseEventKind::ScrollUp => demo.scroll_by(-120.0),
                crossterm::event::MouseEventKind::ScrollDown => demo.scroll_by(120.0),
                _ => {}
            },
            AppEvent::Key(key) => {
                use crossterm::event::{KeyCode, KeyModifiers};
                if key.kind != crossterm::event::KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Char('j') | KeyCode::Down => demo.scroll_by(120.0),
                    KeyCode::Char('k') | KeyCode::Up => demo.scroll_by(-120.0),
                    KeyCode::PageDown => demo.scroll_by(viewport.height),
                    KeyCode::PageUp => demo.scroll_by(-viewport.height),
                    KeyCode::Enter => {
                        if demo.current_ns == Namespace::Catalog {
                            let index = demo.focused_card();
                            demo.start_navigation(now_ms, Namespace::Product, index);
                        }
                    }
                    KeyCode::Esc | KeyCode::Backspace => {
                        if demo.current_ns == Namespace::Product {
                            let index = demo.product_index;
                            demo.start_navigation(now_ms, Namespace::Catalog, index);
                        }
                    }
                    KeyCode::Char('m') => {
                        let next = if demo.state.config.is_desktop(&viewport) {
                            mobile_viewport
                        } else {
                            desktop_viewport
                        };
                        transition::on_resize(&mut demo.state, now_ms, next.width, next.height);
                    }
                    _ => {}
                }
            }
        }
    }

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
