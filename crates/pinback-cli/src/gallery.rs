use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use pinback_core::{Category, FilterAction, RgbHex, Session};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::time::{Duration, Instant};

use crate::theme::GalleryTheme;
use crate::view;

/// Which widget owns typed characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Keyword,
    Color,
}

/// Everything the view needs besides the session itself.
pub struct Gallery {
    pub session: Session,
    pub mode: Mode,
    /// Keyword field contents; mirrors the filter keyword.
    pub keyword: String,
    pub color_input: String,
    pub selected_suggestion: usize,
    /// First tile row shown.
    pub scroll: u16,
    /// One-line notice (bad color input and such).
    pub notice: Option<String>,
    quit: bool,
}

impl Gallery {
    pub fn new(session: Session) -> Self {
        let keyword = session.filters().keyword().to_string();
        Self {
            session,
            mode: Mode::Normal,
            keyword,
            color_input: String::new(),
            selected_suggestion: 0,
            scroll: 0,
            notice: None,
            quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            Mode::Normal => self.normal_key(key.code),
            Mode::Keyword => self.keyword_key(key.code),
            Mode::Color => self.color_key(key.code),
        }
    }

    fn normal_key(&mut self, code: KeyCode) {
        let f = self.session.filters().clone();
        let (min, max) = f.year_range();
        let action = match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.quit = true;
                return;
            }
            KeyCode::Char('d') => FilterAction::ToggleDateFilter,
            KeyCode::Char('[') => FilterAction::SetYearMin(min - 1),
            KeyCode::Char(']') => FilterAction::SetYearMin(min + 1),
            KeyCode::Char('{') => FilterAction::SetYearMax(max - 1),
            KeyCode::Char('}') => FilterAction::SetYearMax(max + 1),
            KeyCode::Char('1') => FilterAction::ToggleCategory(Category::PoliticalCampaigns),
            KeyCode::Char('2') => FilterAction::ToggleCategory(Category::Other),
            KeyCode::Char('c') => FilterAction::ToggleColorFilter,
            KeyCode::Char('h') => FilterAction::SetHueTolerance(f.hue_tolerance() as i32 - 1),
            KeyCode::Char('H') => FilterAction::SetHueTolerance(f.hue_tolerance() as i32 + 1),
            KeyCode::Char('m') => FilterAction::ToggleRenderMode,
            KeyCode::Char('+') | KeyCode::Char('=') => {
                FilterAction::SetGridSize(f.grid_size() as i64 + 10)
            }
            KeyCode::Char('-') => FilterAction::SetGridSize(f.grid_size() as i64 - 10),
            KeyCode::Char('#') => {
                self.color_input = f.color().map(|c| c.to_string()).unwrap_or_default();
                self.notice = None;
                self.mode = Mode::Color;
                return;
            }
            KeyCode::Char('/') => {
                self.mode = Mode::Keyword;
                self.session.focus_keyword();
                return;
            }
            KeyCode::Char('r') => {
                self.session.refresh();
                return;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = self.scroll.saturating_add(1);
                return;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
                return;
            }
            _ => return,
        };
        self.session.apply(action);
    }

    fn keyword_key(&mut self, code: KeyCode) {
        let n = self.session.suggestions().len();
        match code {
            KeyCode::Esc => self.leave_keyword(),
            KeyCode::Char(ch) => {
                self.keyword.push(ch);
                self.keyword_changed();
            }
            KeyCode::Backspace => {
                self.keyword.pop();
                self.keyword_changed();
            }
            KeyCode::Down if n > 0 => {
                self.selected_suggestion = (self.selected_suggestion + 1).min(n - 1);
            }
            KeyCode::Up => {
                self.selected_suggestion = self.selected_suggestion.saturating_sub(1);
            }
            KeyCode::Tab | KeyCode::Enter if n > 0 => {
                if let Some(choice) = self.session.accept_suggestion(self.selected_suggestion) {
                    self.keyword = choice;
                }
                self.selected_suggestion = 0;
            }
            KeyCode::Enter => self.leave_keyword(),
            _ => {}
        }
    }

    fn color_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.notice = None;
                self.mode = Mode::Normal;
            }
            KeyCode::Char(ch) if ch == '#' || ch.is_ascii_hexdigit() => {
                if self.color_input.len() < 7 {
                    self.color_input.push(ch);
                }
            }
            KeyCode::Backspace => {
                self.color_input.pop();
            }
            KeyCode::Enter => match self.color_input.parse::<RgbHex>() {
                Ok(c) => {
                    self.session.apply(FilterAction::SetColor(Some(c)));
                    self.session.apply(FilterAction::SetColorFilter(true));
                    self.notice = None;
                    self.mode = Mode::Normal;
                }
                Err(e) => self.notice = Some(e.to_string()),
            },
            _ => {}
        }
    }

    fn keyword_changed(&mut self) {
        self.selected_suggestion = 0;
        self.session.input_keyword(&self.keyword);
    }

    fn leave_keyword(&mut self) {
        self.session.blur_keyword();
        self.mode = Mode::Normal;
    }
}

pub trait EventSource {
    fn poll(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

pub struct RealEventSource;

impl EventSource for RealEventSource {
    fn poll(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if crossterm::event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }
}

/// Restores the terminal even when the loop bails out with an error.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = crossterm::execute!(io::stdout(), crossterm::terminal::LeaveAlternateScreen);
    }
}

pub fn run_gallery_default(
    session: Session,
    theme: GalleryTheme,
    poll_interval: Duration,
) -> Result<()> {
    let mut es = RealEventSource;
    run_gallery_with(session, &mut es, true, theme, poll_interval)?;
    Ok(())
}

/// Drive the gallery until the user quits. With `draw == false` nothing
/// touches the terminal, each key is handled against settled state, and the
/// loop ends when the event source runs dry.
pub fn run_gallery_with(
    session: Session,
    es: &mut dyn EventSource,
    draw: bool,
    theme: GalleryTheme,
    poll_interval: Duration,
) -> Result<Gallery> {
    const SETTLE: Duration = Duration::from_secs(5);
    let mut gallery = Gallery::new(session);

    let (mut terminal, _guard) = if draw {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
        let guard = TerminalGuard;
        let backend = CrosstermBackend::new(stdout);
        (Some(Terminal::new(backend)?), Some(guard))
    } else {
        (None, None)
    };

    let mut dirty = true;
    loop {
        if draw {
            dirty |= gallery.session.poll();
        } else {
            gallery.session.wait_idle(SETTLE);
            gallery.session.poll();
        }

        if let Some(term) = terminal.as_mut() {
            if dirty {
                term.draw(|f| view::draw(f, &gallery, &theme))?;
                dirty = false;
            }
        }

        let timeout = match gallery.session.next_deadline() {
            Some(at) => at
                .saturating_duration_since(Instant::now())
                .min(poll_interval),
            None => poll_interval,
        };
        match es.poll(timeout)? {
            Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                gallery.handle_key(key);
                dirty = true;
            }
            Some(Event::Resize(..)) => dirty = true,
            Some(_) => {}
            None if !draw => break,
            None => {}
        }
        if gallery.should_quit() {
            break;
        }
    }
    Ok(gallery)
}
