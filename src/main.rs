use std::{
    env, fs, io,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use tdoc::{markdown, parse};

use pure_flow::{
    FlowOptions, HyperlinkSegment, ParagraphSegment, SegmentId, TextFlow, Theme,
    flow_from_document, flow_from_text,
};

const STATUS_TIMEOUT: Duration = Duration::from_secs(4);
const MOUSE_SCROLL_LINES: u16 = 3;
/// Names the file debug logs are written to. Logging is off when unset.
const LOG_ENV: &str = "PURE_FLOW_LOG";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DocumentFormat {
    Ftml,
    Markdown,
    Text,
}

impl DocumentFormat {
    fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("md") | Some("markdown") | Some("mkd") | Some("mdown") | Some("mdtxt") => {
                DocumentFormat::Markdown
            }
            Some("ftml") | Some("html") | Some("htm") => DocumentFormat::Ftml,
            _ => DocumentFormat::Text,
        }
    }
}

fn main() -> Result<()> {
    run()
}

fn init_logging() -> Result<()> {
    let Ok(path) = env::var(LOG_ENV) else {
        return Ok(());
    };
    let file = fs::File::create(&path).with_context(|| format!("failed to create {path}"))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("failed to initialize logging")?;
    Ok(())
}

fn run() -> Result<()> {
    init_logging()?;

    let mut args = env::args().skip(1);
    let Some(path_arg) = args.next() else {
        eprintln!("Usage: flowview <file.ftml|file.md|file.txt>");
        return Ok(());
    };
    let path = PathBuf::from(path_arg);

    let (flow, initial_status) = load_flow(&path, Theme::default(), FlowOptions::default())?;
    let mut app = App::new(flow, path, initial_status);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("failed to initialize terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().ok();

    let res = run_app(&mut terminal, &mut app).context("application error");

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    res
}

fn load_flow(
    path: &Path,
    theme: Theme,
    options: FlowOptions,
) -> Result<(TextFlow, Option<String>)> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let parsed = match DocumentFormat::from_path(path) {
        DocumentFormat::Text => return Ok((flow_from_text(&content, theme, options), None)),
        DocumentFormat::Ftml => parse(io::Cursor::new(content.as_bytes()))
            .map_err(|err| -> Box<dyn std::error::Error + Send + Sync> { Box::new(err) }),
        DocumentFormat::Markdown => markdown::parse(io::Cursor::new(content.as_bytes())),
    };
    match parsed {
        Ok(document) => Ok((flow_from_document(&document, theme, options), None)),
        Err(err) => {
            log::warn!("falling back to plain text for {}: {err}", path.display());
            let message = format!("Parse error: {err}. Showing plain text.");
            Ok((flow_from_text(&content, theme, options), Some(message)))
        }
    }
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();
    let mut needs_redraw = true;

    while !app.should_quit() {
        if needs_redraw {
            terminal
                .draw(|frame| app.draw(frame))
                .context("failed to draw frame")?;
            needs_redraw = false;
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout).context("event poll failed")? {
            let evt = event::read().context("failed to read event")?;
            app.handle_event(evt);
            needs_redraw = true;
        }

        if last_tick.elapsed() >= tick_rate {
            let had_message_before = app.has_status_message();
            app.on_tick();
            last_tick = Instant::now();
            if had_message_before && !app.has_status_message() {
                needs_redraw = true;
            }
        }
    }

    Ok(())
}

fn describe_link(link: &HyperlinkSegment) -> String {
    match link.tooltip() {
        Some(tooltip) => format!("{tooltip} ({})", link.href()),
        None => link.href().to_string(),
    }
}

struct App {
    flow: TextFlow,
    file_path: PathBuf,
    scroll_top: u16,
    view: Rect,
    dragging: bool,
    should_quit: bool,
    status_message: Option<(String, Instant)>,
}

impl App {
    fn new(flow: TextFlow, file_path: PathBuf, initial_status: Option<String>) -> Self {
        Self {
            flow,
            file_path,
            scroll_top: 0,
            view: Rect::default(),
            dragging: false,
            should_quit: false,
            status_message: initial_status.map(|msg| (msg, Instant::now())),
        }
    }

    fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn has_status_message(&self) -> bool {
        self.status_message.is_some()
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area.height == 0 || area.width == 0 {
            return;
        }

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);
        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(vertical[0]);
        let text_area = horizontal[0];
        let scrollbar_area = horizontal[1];

        if self.flow.needs_layout(text_area.width) {
            self.flow.layout(text_area.width);
        }
        self.view = text_area;
        self.scroll_top = self.scroll_top.min(self.max_scroll());

        self.flow.paint(frame.buffer_mut(), text_area, self.scroll_top);

        let mut scrollbar_state = ScrollbarState::new(self.max_scroll() as usize)
            .position(self.scroll_top as usize);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
        frame.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);

        let status_text = self.status_line();
        let status_widget = Paragraph::new(Line::from(Span::raw(status_text)))
            .style(self.flow.theme().status_bar_style());
        frame.render_widget(status_widget, vertical[1]);
    }

    fn status_line(&mut self) -> String {
        self.prune_status_message();
        if let Some((message, _)) = &self.status_message {
            return message.clone();
        }
        let links: usize = self
            .flow
            .paragraphs()
            .iter()
            .map(|paragraph| paragraph.hyperlinks().count())
            .sum();
        format!(
            "{} | {} links | Tab next link | y show selection | q quit",
            self.file_path.display(),
            links
        )
    }

    fn prune_status_message(&mut self) {
        if let Some((_, instant)) = &self.status_message {
            if instant.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
            }
        }
    }

    fn on_tick(&mut self) {
        self.prune_status_message();
    }

    fn max_scroll(&self) -> u16 {
        self.flow
            .content_height()
            .saturating_sub(self.view.height)
    }

    fn scroll_by(&mut self, delta: i32) {
        let target = (self.scroll_top as i32 + delta).clamp(0, self.max_scroll() as i32);
        self.scroll_top = target as u16;
    }

    fn scroll_to_segment(&mut self, id: SegmentId) {
        let Some(rect) = self.flow.segment_bounds(id).first().copied() else {
            return;
        };
        let bottom = self.scroll_top.saturating_add(self.view.height);
        if rect.y < self.scroll_top {
            self.scroll_top = rect.y;
        } else if rect.bottom() > bottom {
            self.scroll_top = rect.bottom().saturating_sub(self.view.height);
        }
    }

    fn focus_link(&mut self, forward: bool) {
        let link = if forward {
            self.flow.focus_next_link()
        } else {
            self.flow.focus_previous_link()
        };
        let Some(link) = link else {
            self.set_status("No links");
            return;
        };
        let id = link.id();
        let message = describe_link(link);
        self.set_status(message);
        self.scroll_to_segment(id);
    }

    fn open_focused_link(&mut self) {
        if let Some(link) = self.flow.focused_link() {
            let message = format!("Open {}", describe_link(link));
            log::info!("{message}");
            self.set_status(message);
        }
    }

    fn show_selection(&mut self) {
        match self.flow.selected_text() {
            Some(text) => {
                let message = format!("Selection: {}", text.replace('\n', " / "));
                self.set_status(message);
            }
            None => self.set_status("Nothing selected"),
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) => self.handle_key(code, modifiers),
            Event::Mouse(mouse) => self.handle_mouse_event(mouse),
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let page = self.view.height.saturating_sub(1).max(1) as i32;
        match (code, modifiers) {
            (KeyCode::Char('q'), _) => self.should_quit = true,
            (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            (KeyCode::Esc, _) => {
                self.flow.clear_selection();
                self.flow.set_focused_link(None);
            }
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => self.scroll_by(1),
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => self.scroll_by(-1),
            (KeyCode::PageDown, _) | (KeyCode::Char(' '), _) => self.scroll_by(page),
            (KeyCode::PageUp, _) => self.scroll_by(-page),
            (KeyCode::Home, _) => self.scroll_top = 0,
            (KeyCode::End, _) => self.scroll_top = self.max_scroll(),
            (KeyCode::Tab, _) => self.focus_link(true),
            (KeyCode::BackTab, _) => self.focus_link(false),
            (KeyCode::Enter, _) => self.open_focused_link(),
            (KeyCode::Char('y'), _) => self.show_selection(),
            _ => {}
        }
    }

    fn handle_mouse_event(&mut self, event: MouseEvent) {
        match event.kind {
            MouseEventKind::ScrollUp => self.scroll_by(-(MOUSE_SCROLL_LINES as i32)),
            MouseEventKind::ScrollDown => self.scroll_by(MOUSE_SCROLL_LINES as i32),
            MouseEventKind::Down(MouseButton::Left) => self.handle_mouse_down(event),
            MouseEventKind::Drag(MouseButton::Left) => self.handle_mouse_drag(event),
            MouseEventKind::Up(MouseButton::Left) => self.handle_mouse_up(),
            _ => {}
        }
    }

    /// Map a screen position inside the text area to flow coordinates.
    fn flow_position(&self, column: u16, row: u16) -> Option<(u16, u16)> {
        self.view.contains(Position::new(column, row)).then(|| {
            (
                column - self.view.x,
                (row - self.view.y).saturating_add(self.scroll_top),
            )
        })
    }

    fn handle_mouse_down(&mut self, event: MouseEvent) {
        let Some((x, y)) = self.flow_position(event.column, event.row) else {
            return;
        };
        if let Some(link) = self.flow.find_hyperlink_at(x, y) {
            let id = link.id();
            let message = format!("Open {}", describe_link(link));
            self.flow.clear_selection();
            self.flow.set_focused_link(Some(id));
            self.set_status(message);
            return;
        }
        self.flow.set_focused_link(None);
        self.flow.start_selection(x, y);
        self.dragging = true;
    }

    fn handle_mouse_drag(&mut self, event: MouseEvent) {
        if !self.dragging {
            return;
        }
        if let Some((x, y)) = self.flow_position(event.column, event.row) {
            self.flow.extend_selection(x, y);
        }
    }

    fn handle_mouse_up(&mut self) {
        if !std::mem::take(&mut self.dragging) {
            return;
        }
        if let Some(text) = self.flow.selected_text() {
            let message = format!("Selected {} characters", text.chars().count());
            self.set_status(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_follow_file_extension() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("notes.MD")),
            DocumentFormat::Markdown
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("doc.ftml")),
            DocumentFormat::Ftml
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("README")),
            DocumentFormat::Text
        );
    }
}
