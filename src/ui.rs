//! Terminal UI for interactive summarization.
//!
//! The UI only reads controller state and renders; all request sequencing
//! lives in [`crate::controller`] and the typewriter pacing in
//! [`crate::reveal`].

use crate::client::{ApiClient, SummarizeApi};
use crate::config::Config;
use crate::controller::{RequestController, RequestState, Settlement};
use crate::reveal::RevealRenderer;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    DefaultTerminal, Frame,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{error::TryRecvError, UnboundedReceiver};

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const EVENT_POLL: Duration = Duration::from_millis(50);

const TITLE_STYLE: Style = Style::new()
    .fg(Color::LightBlue)
    .add_modifier(Modifier::BOLD);
const HELP_STYLE: Style = Style::new().fg(Color::DarkGray);

/// Which form field receives keystrokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Focus {
    #[default]
    Text,
    Url,
    MaxLength,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Text => Focus::Url,
            Focus::Url => Focus::MaxLength,
            Focus::MaxLength => Focus::Text,
        }
    }

    fn previous(self) -> Self {
        match self {
            Focus::Text => Focus::MaxLength,
            Focus::Url => Focus::Text,
            Focus::MaxLength => Focus::Url,
        }
    }
}

/// What the content area currently shows, derived from request state.
///
/// Never stored; recomputed from the controller on every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Form,
    Spinner,
    Summary,
    Error,
}

fn derive_view_mode(state: &RequestState) -> ViewMode {
    match state {
        RequestState::Idle => ViewMode::Form,
        RequestState::InFlight => ViewMode::Spinner,
        RequestState::Succeeded(_) => ViewMode::Summary,
        RequestState::Failed(_) => ViewMode::Error,
    }
}

/// Parse the max-length entry field, falling back when empty or non-numeric
fn parse_max_length(entry: &str, fallback: u32) -> u32 {
    entry.trim().parse().unwrap_or(fallback)
}

/// Interactive summarizer application state
pub struct App {
    controller: RequestController,
    renderer: RevealRenderer,
    frames: Option<UnboundedReceiver<String>>,
    displayed: String,
    max_length_entry: String,
    default_max_length: u32,
    focus: Focus,
    spinner_tick: usize,
    should_quit: bool,
}

impl App {
    pub fn new(client: Arc<dyn SummarizeApi>, config: &Config) -> Self {
        let mut controller = RequestController::new(client);
        controller.input.max_length = config.summarize.max_length;

        Self {
            controller,
            renderer: RevealRenderer::new(config.reveal_interval()),
            frames: None,
            displayed: String::new(),
            max_length_entry: config.summarize.max_length.to_string(),
            default_max_length: config.summarize.max_length,
            focus: Focus::default(),
            spinner_tick: 0,
            should_quit: false,
        }
    }

    fn view_mode(&self) -> ViewMode {
        derive_view_mode(self.controller.state())
    }

    async fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> anyhow::Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;
            self.tick().await?;
        }
        Ok(())
    }

    /// One pass of the event loop: apply a settlement if the request landed,
    /// drain reveal frames, then handle at most one input event.
    async fn tick(&mut self) -> anyhow::Result<()> {
        if let Some(settlement) = self.controller.poll().await {
            match settlement {
                Settlement::Succeeded(summary) => {
                    self.displayed.clear();
                    self.frames = Some(self.renderer.start(summary));
                }
                // The message is read back out of the controller state.
                Settlement::Failed(_) => {}
            }
        }

        if let Some(rx) = &mut self.frames {
            loop {
                match rx.try_recv() {
                    Ok(frame) => self.displayed = frame,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        self.frames = None;
                        break;
                    }
                }
            }
        }

        self.spinner_tick = self.spinner_tick.wrapping_add(1);

        if event::poll(EVENT_POLL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.view_mode() {
            ViewMode::Form => self.handle_form_key(key),
            // No cancellation of an in-flight request; wait it out.
            ViewMode::Spinner => {}
            ViewMode::Summary | ViewMode::Error => match key.code {
                KeyCode::Esc => self.back_to_form(),
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('s') {
                self.submit_text();
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Enter => match self.focus {
                Focus::Text => self.controller.input.text.push('\n'),
                Focus::Url => self.submit_url(),
                Focus::MaxLength => {}
            },
            KeyCode::Backspace => {
                match self.focus {
                    Focus::Text => self.controller.input.text.pop(),
                    Focus::Url => self.controller.input.url.pop(),
                    Focus::MaxLength => self.max_length_entry.pop(),
                };
            }
            KeyCode::Char(c) => match self.focus {
                Focus::Text => self.controller.input.text.push(c),
                Focus::Url => self.controller.input.url.push(c),
                Focus::MaxLength => {
                    if c.is_ascii_digit() && self.max_length_entry.len() < 5 {
                        self.max_length_entry.push(c);
                    }
                }
            },
            _ => {}
        }
    }

    fn submit_text(&mut self) {
        if self.controller.is_busy() {
            return;
        }
        self.controller.input.max_length =
            parse_max_length(&self.max_length_entry, self.default_max_length);
        self.controller.submit_text();
    }

    fn submit_url(&mut self) {
        if self.controller.is_busy() {
            return;
        }
        self.controller.submit_url();
    }

    /// Leave the summary or error view; inputs are retained
    fn back_to_form(&mut self) {
        self.renderer.cancel();
        self.frames = None;
        self.displayed.clear();
        self.controller.reset();
    }

    fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let title = Paragraph::new(Line::from(vec![
            Span::styled("✦ concise", TITLE_STYLE),
            Span::styled(" — AI-powered summarisation", HELP_STYLE),
        ]));
        frame.render_widget(title, chunks[0]);

        match self.view_mode() {
            ViewMode::Form => self.draw_form(frame, chunks[1]),
            ViewMode::Spinner => self.draw_spinner(frame, chunks[1]),
            ViewMode::Summary => self.draw_summary(frame, chunks[1]),
            ViewMode::Error => self.draw_error(frame, chunks[1]),
        }

        frame.render_widget(Paragraph::new(self.help_line()), chunks[2]);
    }

    fn help_line(&self) -> Line<'static> {
        let keys: &[(&str, &str)] = match self.view_mode() {
            ViewMode::Form => &[
                ("tab", "switch field"),
                ("ctrl+s", "summarize text"),
                ("enter", "summarize url"),
                ("esc", "quit"),
            ],
            ViewMode::Spinner => &[("ctrl+c", "quit")],
            ViewMode::Summary | ViewMode::Error => &[("esc", "back"), ("q", "quit")],
        };

        let mut spans = Vec::new();
        for (i, (key, action)) in keys.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" • ", Style::default().fg(Color::Blue)));
            }
            spans.push(Span::styled(
                (*key).to_string(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(format!(":{action}"), HELP_STYLE));
        }
        Line::from(spans)
    }

    fn field_block(&self, title: &'static str, focus: Focus) -> Block<'static> {
        Block::default()
            .title(Span::styled(title, TITLE_STYLE))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if self.focus == focus {
                Color::LightBlue
            } else {
                Color::Blue
            }))
    }

    fn field_value(&self, value: &str, focus: Focus) -> String {
        if self.focus == focus {
            format!("{value}▌")
        } else {
            value.to_string()
        }
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(3)])
            .split(area);

        let text = Paragraph::new(self.field_value(&self.controller.input.text, Focus::Text))
            .wrap(Wrap { trim: false })
            .block(self.field_block("Text to summarize", Focus::Text));
        frame.render_widget(text, rows[0]);

        let fields = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(14)])
            .split(rows[1]);

        let url = Paragraph::new(self.field_value(&self.controller.input.url, Focus::Url))
            .block(self.field_block("Article URL", Focus::Url));
        frame.render_widget(url, fields[0]);

        let max_length = Paragraph::new(self.field_value(&self.max_length_entry, Focus::MaxLength))
            .block(self.field_block("Max length", Focus::MaxLength));
        frame.render_widget(max_length, fields[1]);
    }

    fn draw_spinner(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(area);

        let spinner = SPINNER_FRAMES[self.spinner_tick % SPINNER_FRAMES.len()];
        let loading = Paragraph::new(vec![
            Line::from(Span::styled(
                spinner,
                Style::default().fg(Color::LightBlue),
            )),
            Line::from(Span::styled(
                "Your summary is being generated...",
                HELP_STYLE,
            )),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(loading, rows[1]);
    }

    fn draw_summary(&self, frame: &mut Frame, area: Rect) {
        let summary = Paragraph::new(self.displayed.as_str())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(Span::styled("✨ Here is your Summary", TITLE_STYLE))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Blue)),
            );
        frame.render_widget(summary, area);
    }

    fn draw_error(&self, frame: &mut Frame, area: Rect) {
        let message = match self.controller.state() {
            RequestState::Failed(message) => message.as_str(),
            _ => "",
        };

        let error = Paragraph::new(Span::styled(message, Style::default().fg(Color::Red)))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(Span::styled(
                        "Error",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red)),
            );
        frame.render_widget(error, area);
    }
}

/// Launch the interactive summarizer
pub async fn run(config: Config) -> anyhow::Result<()> {
    let client = ApiClient::new(&config.service.base_url, config.timeout())?;
    let mut app = App::new(Arc::new(client), &config);

    let mut terminal = ratatui::init();
    let result = app.run_loop(&mut terminal).await;
    ratatui::restore();
    result
}
