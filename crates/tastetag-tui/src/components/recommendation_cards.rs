use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use tastetag_core::{Preference, Recommendation};

/// A rating made on a card, reported to the owner of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardRating {
    pub index: usize,
    pub preference: Preference,
}

/// Cursor over the recommendation cards.
///
/// Holds no copy of the recommendations; the caller passes the current
/// slice in, and ratings come back out as [`CardRating`]s.
#[derive(Debug, Default)]
pub struct RecommendationCards {
    list_state: ListState,
}

impl RecommendationCards {
    pub fn new(len: usize) -> Self {
        let mut list_state = ListState::default();
        if len > 0 {
            list_state.select(Some(0));
        }
        Self { list_state }
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    pub fn handle_key(&mut self, key: KeyEvent, len: usize) -> Option<CardRating> {
        if len == 0 {
            return None;
        }
        let current = self.list_state.selected().unwrap_or(0);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if current + 1 < len {
                    self.list_state.select(Some(current + 1));
                }
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if current > 0 {
                    self.list_state.select(Some(current - 1));
                }
                None
            }
            KeyCode::Char('g') => {
                self.list_state.select(Some(0));
                None
            }
            KeyCode::Char('G') => {
                self.list_state.select(Some(len - 1));
                None
            }
            KeyCode::Char('l') | KeyCode::Char('+') => Some(CardRating {
                index: current,
                preference: Preference::Like,
            }),
            KeyCode::Char('d') | KeyCode::Char('-') => Some(CardRating {
                index: current,
                preference: Preference::Dislike,
            }),
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, recommendations: &[Recommendation]) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(area);

        let rated = recommendations.iter().filter(|r| r.is_rated()).count();
        let block = Block::default()
            .title(format!(" Restaurants ({rated}/{}) ", recommendations.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let items: Vec<ListItem> = recommendations
            .iter()
            .map(|rec| {
                let marker = Span::styled(
                    format!("[{}] ", rec.preference.symbol()),
                    preference_color(rec.preference),
                );
                ListItem::new(Line::from(vec![marker, Span::raw(&rec.name)]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).bold())
            .highlight_symbol("> ");

        let mut state = self.list_state.clone();
        frame.render_stateful_widget(list, chunks[0], &mut state);

        let detail = self
            .selected()
            .and_then(|i| recommendations.get(i))
            .map(card_text)
            .unwrap_or_default();
        let paragraph = Paragraph::new(detail)
            .block(Block::default().title(" Card ").borders(Borders::ALL))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, chunks[1]);
    }
}

fn card_text(rec: &Recommendation) -> Text<'_> {
    Text::from(vec![
        Line::from(Span::styled(&rec.name, Style::default().bold())),
        Line::from(Span::styled(&rec.location, Style::default().fg(Color::DarkGray))),
        Line::raw(""),
        Line::raw(&rec.description),
        Line::raw(""),
        Line::from(Span::styled(
            rec.preference.display_name(),
            preference_color(rec.preference),
        )),
    ])
}

fn preference_color(preference: Preference) -> Style {
    match preference {
        Preference::Like => Style::default().fg(Color::Green).bold(),
        Preference::Dislike => Style::default().fg(Color::Red).bold(),
        Preference::Unset => Style::default().fg(Color::DarkGray),
    }
}
