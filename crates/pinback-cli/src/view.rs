//! Drawing for the terminal gallery. Tiles are sized from the layout's
//! render boxes, so real-life mode keeps relative sizes visible.

use pinback_core::{Category, FilterState, Placed, RenderMode, RgbHex};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph};
use ratatui::Frame;

use crate::gallery::{Gallery, Mode};
use crate::theme::{rgb, GalleryTheme};

/// Pixels represented by one terminal column.
pub const PX_PER_COL: f64 = 10.0;
/// Pixels represented by one terminal row (cells are about twice as tall as wide).
pub const PX_PER_ROW: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub x: u16,
    pub y: u32,
    pub w: u16,
    pub h: u16,
}

/// Whole cells needed for `px`; never less than one.
pub fn cells(px: f64, px_per_cell: f64) -> u16 {
    (px / px_per_cell).ceil().clamp(1.0, u16::MAX as f64) as u16
}

/// Left-to-right placement, wrapping to a new shelf when a tile does not fit.
pub fn flow(sizes: &[(u16, u16)], width: u16) -> Vec<Tile> {
    let width = width.max(1);
    let (mut x, mut y, mut shelf) = (0u16, 0u32, 0u16);
    let mut out = Vec::with_capacity(sizes.len());
    for &(w, h) in sizes {
        let w = w.min(width);
        if x > 0 && x.saturating_add(w) > width {
            y += shelf as u32;
            x = 0;
            shelf = 0;
        }
        out.push(Tile { x, y, w, h });
        x += w;
        shelf = shelf.max(h);
    }
    out
}

/// The two summary lines of the filter panel.
pub fn filter_summary(f: &FilterState) -> [String; 2] {
    let on = |b: bool| if b { "on" } else { "off" };
    let (min, max) = f.year_range();
    let first = format!(
        "Dates {} {}-{}   {} {}   {} {}",
        on(f.date_filter_enabled()),
        min,
        max,
        Category::PoliticalCampaigns.label(),
        on(f.shows(Category::PoliticalCampaigns)),
        Category::Other.label(),
        on(f.shows(Category::Other)),
    );
    let color = f.color().unwrap_or(RgbHex::BLACK);
    let second = format!(
        "Color {} {} ±{}°   Mode {}   Grid {}px   Scale {}px/cm",
        on(f.color_filter_enabled()),
        color,
        f.hue_tolerance(),
        match f.render_mode() {
            RenderMode::Grid => "grid",
            RenderMode::RealLife => "real-life",
        },
        f.grid_size(),
        f.real_life_scale(),
    );
    [first, second]
}

pub fn draw(f: &mut Frame, g: &Gallery, theme: &GalleryTheme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // filters
            Constraint::Length(3), // keyword / color entry
            Constraint::Length(2), // request + count
            Constraint::Min(3),    // tiles
            Constraint::Length(1), // help
        ])
        .split(f.area());

    let border = Style::default().fg(theme.border_fg);
    let [a, b] = filter_summary(g.session.filters());
    let filters = Paragraph::new(vec![Line::from(a), Line::from(b)]).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Filters")
            .border_style(border),
    );
    f.render_widget(filters, chunks[0]);

    draw_input(f, chunks[1], g, theme);
    draw_status(f, chunks[2], g, theme);
    draw_tiles(f, chunks[3], g, theme);

    let help = match g.mode {
        Mode::Normal => "d dates  [ ] { } years  1 2 categories  c color  # hex  h H tolerance  / keyword  m mode  + - size  r reload  q quit",
        Mode::Keyword => "type to search  ↑↓ choose  Tab/Enter accept  Esc done",
        Mode::Color => "#rrggbb  Enter apply  Esc cancel",
    };
    f.render_widget(
        Paragraph::new(help).style(Style::default().fg(theme.help_fg)),
        chunks[4],
    );

    if g.mode == Mode::Keyword && !g.session.suggestions().is_empty() {
        draw_suggestions(f, chunks[1], g, theme);
    }
}

fn draw_input(f: &mut Frame, area: Rect, g: &Gallery, theme: &GalleryTheme) {
    let (title, text, active) = match g.mode {
        Mode::Color => ("Color (#rrggbb)", g.color_input.as_str(), true),
        Mode::Keyword => ("Keyword", g.keyword.as_str(), true),
        Mode::Normal => ("Keyword [/]", g.keyword.as_str(), false),
    };
    let mut spans = vec![Span::raw(text.to_string())];
    if active {
        spans.push(Span::styled("▏", Style::default().fg(theme.accent_fg)));
    }
    if let Some(n) = &g.notice {
        spans.push(Span::styled(format!("  {n}"), Style::default().fg(theme.error_fg)));
    }
    if g.mode == Mode::Keyword {
        if let Some(e) = g.session.suggestion_error() {
            spans.push(Span::styled(
                format!("  suggestions unavailable: {e}"),
                Style::default().fg(theme.error_fg),
            ));
        }
    }
    let border = if active { theme.accent_fg } else { theme.border_fg };
    let p = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(p, area);
}

fn draw_status(f: &mut Frame, area: Rect, g: &Gallery, theme: &GalleryTheme) {
    let s = &g.session;
    let query = Line::from(format!("API query: {}", s.request_description()))
        .style(Style::default().add_modifier(Modifier::DIM));
    let mut count = vec![Span::raw(format!("{} images found", s.records().len()))];
    if s.is_loading() {
        count.push(Span::raw("  loading…"));
    }
    if let Some(e) = s.last_error() {
        count.push(Span::styled(
            format!("  {e}"),
            Style::default().fg(theme.error_fg),
        ));
    }
    f.render_widget(Paragraph::new(vec![query, Line::from(count)]), area);
}

fn draw_tiles(f: &mut Frame, area: Rect, g: &Gallery, theme: &GalleryTheme) {
    if !g.session.loaded() {
        f.render_widget(Paragraph::new("Loading…"), area);
        return;
    }
    let layout = g.session.layout();
    if let Some(empty) = layout.empty() {
        f.render_widget(
            Paragraph::new(empty.message()).style(Style::default().fg(theme.help_fg)),
            area,
        );
        return;
    }
    let sizes: Vec<(u16, u16)> = layout
        .placed
        .iter()
        .map(|p| {
            (
                cells(p.render_box.width_px, PX_PER_COL),
                cells(p.render_box.height_px, PX_PER_ROW),
            )
        })
        .collect();
    let scroll = g.scroll as u32;
    for (tile, placed) in flow(&sizes, area.width).iter().zip(&layout.placed) {
        if tile.y < scroll {
            continue;
        }
        let top = tile.y - scroll;
        if top >= area.height as u32 {
            break;
        }
        let h = tile.h.min(area.height - top as u16);
        let rect = Rect::new(area.x + tile.x, area.y + top as u16, tile.w, h);
        draw_tile(f, rect, placed, theme);
    }
}

fn draw_tile(f: &mut Frame, rect: Rect, placed: &Placed<'_>, theme: &GalleryTheme) {
    let record = placed.record;
    let tint = record
        .color
        .as_deref()
        .and_then(|c| c.parse::<RgbHex>().ok())
        .map(rgb)
        .unwrap_or(theme.tile_fg);
    if rect.width < 3 || rect.height < 3 {
        f.render_widget(Paragraph::new("■").style(Style::default().fg(tint)), rect);
        return;
    }
    let mut lines = vec![Line::from(record.display_title())];
    if record.image_url.is_none() {
        lines.push(Line::from("image not found").style(Style::default().fg(theme.error_fg)));
    }
    lines.push(Line::from(record.caption()).style(Style::default().add_modifier(Modifier::DIM)));
    let p = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(tint)),
    );
    f.render_widget(p, rect);
}

fn draw_suggestions(f: &mut Frame, input: Rect, g: &Gallery, theme: &GalleryTheme) {
    let screen = f.area();
    let items = g.session.suggestions();
    let y = input.y + input.height;
    if y >= screen.height {
        return;
    }
    let h = (items.len() as u16 + 2).min(screen.height - y);
    let rect = Rect::new(input.x + 1, y, input.width.saturating_sub(2), h);
    let list: Vec<ListItem> = items
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let style = if i == g.selected_suggestion {
                Style::default().fg(theme.accent_fg).add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            ListItem::new(s.as_str()).style(style)
        })
        .collect();
    f.render_widget(Clear, rect);
    f.render_widget(
        List::new(list).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent_fg)),
        ),
        rect,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinback_core::{
        Catalog, FetchError, FilterAction, ImageRecord, MemCatalog, Query, Session, SessionConfig,
    };
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn cells_round_up_and_never_vanish() {
        assert_eq!(cells(100.0, PX_PER_COL), 10);
        assert_eq!(cells(101.0, PX_PER_COL), 11);
        assert_eq!(cells(1.0, PX_PER_ROW), 1);
        assert_eq!(cells(0.0, PX_PER_ROW), 1);
    }

    #[test]
    fn flow_wraps_onto_new_shelf() {
        let tiles = flow(&[(10, 5), (10, 3), (10, 4)], 25);
        assert_eq!(tiles[0], Tile { x: 0, y: 0, w: 10, h: 5 });
        assert_eq!(tiles[1], Tile { x: 10, y: 0, w: 10, h: 3 });
        assert_eq!(tiles[2], Tile { x: 0, y: 5, w: 10, h: 4 });
    }

    #[test]
    fn oversized_tile_is_clamped_to_width() {
        let tiles = flow(&[(40, 2), (5, 2)], 20);
        assert_eq!(tiles[0].w, 20);
        assert_eq!(tiles[1], Tile { x: 0, y: 2, w: 5, h: 2 });
    }

    #[test]
    fn summary_reflects_filters() {
        let f = FilterState::default().apply_all([
            FilterAction::SetDateFilter(false),
            FilterAction::SetColorFilter(true),
            FilterAction::SetColor(Some(RgbHex::new(255, 0, 0))),
        ]);
        let [a, b] = filter_summary(&f);
        assert!(a.starts_with("Dates off 1940-2000"));
        assert!(b.starts_with("Color on #ff0000 ±10°"));
    }

    fn screen_text(term: &Terminal<TestBackend>) -> String {
        term.backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn renders_count_and_empty_state() {
        let mut r = ImageRecord::new(1, "Fish-Fry");
        r.date = Some("1975".into());
        // wide enough tiles for the caption lines
        let filters = FilterState::default().apply(FilterAction::SetGridSize(300));
        let session = Session::new(
            Arc::new(MemCatalog::new(vec![r])),
            filters,
            SessionConfig::default(),
        )
        .unwrap();
        let mut g = Gallery::new(session);
        assert!(g.session.wait_idle(Duration::from_secs(5)));

        let mut term = Terminal::new(TestBackend::new(120, 30)).unwrap();
        term.draw(|f| draw(f, &g, &GalleryTheme::default())).unwrap();
        let text = screen_text(&term);
        assert!(text.contains("1 images found"));
        assert!(text.contains("Fish Fry"));
        assert!(text.contains("image not found"));

        g.session.apply(FilterAction::ToggleRenderMode);
        term.draw(|f| draw(f, &g, &GalleryTheme::default())).unwrap();
        let text = screen_text(&term);
        assert!(text.contains("None of these images has a recorded size"));
    }

    struct NoSuggestions(MemCatalog);

    impl Catalog for NoSuggestions {
        fn images(&self, query: &Query) -> Result<Vec<ImageRecord>, FetchError> {
            self.0.images(query)
        }

        fn suggestions(&self, _prefix: &str) -> Result<Vec<String>, FetchError> {
            Err(FetchError::Catalog("suggest index offline".into()))
        }

        fn describe(&self, query: &Query) -> String {
            self.0.describe(query)
        }
    }

    #[test]
    fn keyword_field_shows_suggestion_failure() {
        let session = Session::new(
            Arc::new(NoSuggestions(MemCatalog::default())),
            FilterState::default(),
            SessionConfig::default(),
        )
        .unwrap();
        let mut g = Gallery::new(session);
        g.mode = Mode::Keyword;
        g.keyword = "ike".into();
        g.session.input_keyword("ike");
        assert!(g.session.wait_idle(Duration::from_secs(5)));
        assert!(g.session.suggestion_error().is_some());

        let mut term = Terminal::new(TestBackend::new(120, 30)).unwrap();
        term.draw(|f| draw(f, &g, &GalleryTheme::default())).unwrap();
        assert!(screen_text(&term).contains("suggestions unavailable"));
    }
}
