use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use tastetag_core::{FlowError, Session, SessionEvent, Stage};
use tastetag_service::BlockingHttpService;
use tracing::{info, warn};

use crate::components::recommendation_cards::RecommendationCards;

const MISSING_PREFERENCES: &str =
    "Please set preferences (like/dislike) for all recommendations before evaluating.";

/// What the app is currently doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// The view for the session's stage has the keyboard
    Normal,
    /// Blocking alert; any key dismisses it
    Alert { message: String },
}

pub struct App {
    service: BlockingHttpService,
    session: Session,
    mode: Mode,
    /// Text typed on the tag view, not yet committed to the session.
    tag_input: String,
    cards: RecommendationCards,
    /// Last list fetch failure. While set, no new fetch is issued.
    fetch_error: Option<String>,
    /// Submit was accepted and the rewrite call is pending.
    evaluating: bool,
    result_scroll: u16,
    status_message: Option<String>,
}

impl App {
    pub fn new(service: BlockingHttpService) -> Self {
        Self {
            service,
            session: Session::new(),
            mode: Mode::Normal,
            tag_input: String::new(),
            cards: RecommendationCards::default(),
            fetch_error: None,
            evaluating: false,
            result_scroll: 0,
            status_message: None,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn tag_input(&self) -> &str {
        &self.tag_input
    }

    pub fn selected(&self) -> Option<usize> {
        self.cards.selected()
    }

    pub fn fetch_error(&self) -> Option<&str> {
        self.fetch_error.as_deref()
    }

    pub fn is_evaluating(&self) -> bool {
        self.evaluating
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn is_input_mode(&self) -> bool {
        self.mode == Mode::Normal && self.session.stage() == Stage::TagEntry
    }

    /// Ctrl+C always quits. `q` quits unless the tag is being typed or an
    /// alert is up, where it is ordinary input.
    pub fn should_quit(&self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        key.code == KeyCode::Char('q') && self.mode == Mode::Normal && !self.is_input_mode()
    }

    /// Returns true if the event loop should call `tick` instead of blocking
    /// on the next key.
    pub fn needs_polling(&self) -> bool {
        self.evaluating || self.pending_fetch().is_some()
    }

    fn pending_fetch(&self) -> Option<&str> {
        if self.fetch_error.is_some() {
            return None;
        }
        self.session.listing_request()
    }

    /// Run the network call that is due, if any. Called by the event loop
    /// after a frame has been drawn, so "Loading" and "Evaluating" show
    /// before the call blocks.
    pub fn tick(&mut self) {
        if self.evaluating {
            self.run_evaluation();
        } else if let Some(tag) = self.pending_fetch().map(str::to_string) {
            self.run_fetch(&tag);
        }
    }

    fn run_fetch(&mut self, tag: &str) {
        match self.service.fetch_listing(tag) {
            Ok(listing) => {
                info!(tag, count = listing.len(), "recommendations loaded");
                let len = listing.len();
                match self.session.apply(SessionEvent::ListingLoaded(listing)) {
                    Ok(()) => {
                        self.cards = RecommendationCards::new(len);
                        if len == 0 {
                            self.status_message = Some(format!("No recommendations for @{tag}"));
                        }
                    }
                    Err(e) => warn!("dropping listing for {tag}: {e}"),
                }
            }
            Err(e) => {
                warn!(tag, "recommendation fetch failed: {e}");
                self.alert(format!("Error fetching recommendations: {e}"));
                self.fetch_error = Some(e.to_string());
            }
        }
    }

    fn run_evaluation(&mut self) {
        self.evaluating = false;
        let body = match self.session.submission() {
            Ok(listing) => listing.clone(),
            Err(e) => {
                self.alert_flow_error(e);
                return;
            }
        };
        match self.service.rewrite(&body) {
            Ok(revision) => {
                if let Err(e) = self.session.apply(SessionEvent::Evaluated(revision)) {
                    self.alert_flow_error(e);
                    return;
                }
                info!("prompt rewrite received");
                self.result_scroll = 0;
            }
            Err(e) => {
                warn!("error evaluating prompt: {e}");
                self.alert(format!("Error evaluating prompt: {e}"));
            }
        }
    }

    fn alert(&mut self, message: String) {
        self.mode = Mode::Alert { message };
    }

    fn alert_flow_error(&mut self, e: FlowError) {
        warn!("submit rejected: {e}");
        let message = match e {
            FlowError::Unrated { .. } => MISSING_PREFERENCES.to_string(),
            other => format!("Cannot evaluate: {other}"),
        };
        self.alert(message);
    }

    fn reset(&mut self) {
        // Reset is accepted from every stage.
        let _ = self.session.apply(SessionEvent::Reset);
        self.tag_input.clear();
        self.cards = RecommendationCards::default();
        self.fetch_error = None;
        self.evaluating = false;
        self.result_scroll = 0;
        self.status_message = Some("Reset".into());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.status_message = None;

        if let Mode::Alert { .. } = self.mode {
            self.mode = Mode::Normal;
            return;
        }

        match self.session.stage() {
            Stage::TagEntry => self.handle_tag_entry(key),
            Stage::Listing => self.handle_listing(key),
            Stage::Result => self.handle_result(key),
        }
    }

    fn handle_tag_entry(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let tag = self.tag_input.clone();
                match self.session.apply(SessionEvent::SubmitTag(tag)) {
                    Ok(()) => {
                        self.fetch_error = None;
                        self.cards = RecommendationCards::default();
                    }
                    Err(FlowError::EmptyTag) => {
                        self.status_message = Some("Enter an Instagram tag first".into());
                    }
                    Err(e) => warn!("tag not accepted: {e}"),
                }
            }
            KeyCode::Esc => self.tag_input.clear(),
            KeyCode::Backspace => {
                self.tag_input.pop();
            }
            KeyCode::Char(c) => self.tag_input.push(c),
            _ => {}
        }
    }

    fn handle_listing(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('R') => self.reset(),
            KeyCode::Char('r') => {
                if self.fetch_error.take().is_some() {
                    self.status_message = Some("Retrying...".into());
                }
            }
            KeyCode::Char('s') | KeyCode::Enter => self.submit(),
            _ => {
                let len = self.session.listing().map_or(0, |l| l.len());
                if let Some(rating) = self.cards.handle_key(key, len) {
                    let event = SessionEvent::SetPreference {
                        index: rating.index,
                        preference: rating.preference,
                    };
                    if let Err(e) = self.session.apply(event) {
                        warn!("rating ignored: {e}");
                    }
                }
            }
        }
    }

    /// Check the precondition and queue the rewrite for the next tick.
    /// Nothing goes over the network if the check fails.
    fn submit(&mut self) {
        if self.evaluating {
            return;
        }
        match self.session.submission() {
            Ok(_) => self.evaluating = true,
            Err(FlowError::NotLoaded) => {
                self.status_message = Some("Still loading recommendations".into());
            }
            Err(e) => self.alert_flow_error(e),
        }
    }

    fn handle_result(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('R') => self.reset(),
            KeyCode::Char('j') | KeyCode::Down => {
                self.result_scroll = self.result_scroll.saturating_add(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.result_scroll = self.result_scroll.saturating_sub(1);
            }
            KeyCode::Char('g') => self.result_scroll = 0,
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_title_bar(frame, layout[0]);
        match self.session.stage() {
            Stage::TagEntry => self.render_tag_entry(frame, layout[1]),
            Stage::Listing => self.render_listing(frame, layout[1]),
            Stage::Result => self.render_result(frame, layout[1]),
        }
        self.render_status_bar(frame, layout[2]);

        if let Mode::Alert { message } = &self.mode {
            self.render_alert(frame, message, area);
        }
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let stage = self.session.stage();
        let mut spans = vec![
            Span::styled(" tastetag ", Style::default().bold().fg(Color::Cyan)),
            Span::raw("| "),
            Span::styled(
                format!("{}/{} {}", stage.index() + 1, Stage::ALL.len(), stage),
                Style::default().fg(Color::Yellow),
            ),
        ];
        if let Some(tag) = self.session.tag() {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                format!("@{tag}"),
                Style::default().fg(Color::Magenta),
            ));
            if let Some(url) = self.session.profile_url() {
                spans.push(Span::styled(
                    format!(" ({url})"),
                    Style::default().fg(Color::DarkGray),
                ));
            }
        }
        frame.render_widget(Line::from(spans), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if let Some(ref msg) = self.status_message {
            let line = Line::from(Span::styled(
                format!(" {msg}"),
                Style::default().fg(Color::Green),
            ));
            frame.render_widget(line, area);
            return;
        }

        let hints = match (&self.mode, self.session.stage()) {
            (Mode::Alert { .. }, _) => vec![("any", "dismiss")],
            (Mode::Normal, Stage::TagEntry) => {
                vec![("Enter", "get recommendations"), ("Esc", "clear"), ("Ctrl+C", "quit")]
            }
            (Mode::Normal, Stage::Listing) if self.fetch_error.is_some() => {
                vec![("r", "retry"), ("R", "reset"), ("q", "quit")]
            }
            (Mode::Normal, Stage::Listing) => vec![
                ("j/k", "cards"),
                ("l/+", "like"),
                ("d/-", "dislike"),
                ("s", "evaluate"),
                ("R", "reset"),
                ("q", "quit"),
            ],
            (Mode::Normal, Stage::Result) => {
                vec![("j/k", "scroll"), ("R", "start over"), ("q", "quit")]
            }
        };

        let spans: Vec<Span> = hints
            .into_iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(
                        format!(" {key}"),
                        Style::default().fg(Color::Yellow).bold(),
                    ),
                    Span::raw(format!(" {desc} ")),
                ]
            })
            .collect();

        frame.render_widget(Line::from(spans), area);
    }

    fn render_tag_entry(&self, frame: &mut Frame, area: Rect) {
        let popup = centered_rect(60, 30, area);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(2), Constraint::Length(3)])
            .split(popup);

        let prompt = Paragraph::new(
            "Enter IG Tag to Get Personalized Recommendations for Restaurants\nPress Enter when ready",
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
        frame.render_widget(prompt, chunks[0]);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta))
            .title(" Instagram Tag ");
        frame.render_widget(Paragraph::new(self.tag_input.as_str()).block(block), chunks[1]);
    }

    fn render_listing(&self, frame: &mut Frame, area: Rect) {
        let listing = match self.session.listing() {
            Some(listing) => listing,
            None => {
                let mut lines = vec![Line::raw("Loading....")];
                if let Some(ref e) = self.fetch_error {
                    lines.push(Line::raw(""));
                    lines.push(Line::from(Span::styled(
                        format!("Fetch failed: {e}"),
                        Style::default().fg(Color::Red),
                    )));
                    lines.push(Line::raw("Press r to retry."));
                }
                let paragraph = Paragraph::new(lines)
                    .block(Block::default().borders(Borders::ALL))
                    .wrap(Wrap { trim: false });
                frame.render_widget(paragraph, area);
                return;
            }
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(area);

        self.cards.render(frame, chunks[0], &listing.recommendations);

        let (label, style) = if self.evaluating {
            ("Evaluating...", Style::default().fg(Color::DarkGray))
        } else if !listing.is_empty() && listing.all_rated() {
            ("Evaluate Prompt (s)", Style::default().fg(Color::Green).bold())
        } else {
            ("Rate every restaurant to evaluate", Style::default().fg(Color::DarkGray))
        };
        let button = Paragraph::new(Span::styled(label, style))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(button, chunks[1]);
    }

    fn render_result(&self, frame: &mut Frame, area: Rect) {
        let Some(revision) = self.session.result() else {
            return;
        };
        let text = Text::from(vec![
            Line::from(Span::styled("Current Prompt:", Style::default().fg(Color::DarkGray).bold())),
            Line::raw(revision.current_prompt.as_str()),
            Line::raw(""),
            Line::from(Span::styled("New Prompt:", Style::default().fg(Color::Cyan).bold())),
            Line::raw(revision.new_prompt.as_str()),
        ]);
        let paragraph = Paragraph::new(text)
            .block(
                Block::default()
                    .title(" Result ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: false })
            .scroll((self.result_scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn render_alert(&self, frame: &mut Frame, message: &str, area: Rect) {
        let popup = centered_rect(50, 25, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Alert ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));

        let text = format!("{message}\n\n(any key) OK");
        let paragraph = Paragraph::new(text)
            .block(block)
            .wrap(Wrap { trim: false })
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, popup);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
