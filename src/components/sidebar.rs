//! Conversation list with fuzzy filter.

use chrono::{DateTime, Local};
use crossterm::event::{Event, KeyCode, KeyEventKind};
use nucleo::pattern::{CaseMatching, Normalization, Pattern};
use nucleo::{Config, Matcher, Utf32String};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::cell::RefCell;
use std::collections::HashSet;

use crate::action::Action;
use crate::api::{ConversationId, ConversationSummary};
use crate::components::Component;
use crate::config::Theme;
use crate::session::UNTITLED_CONVERSATION;
use crate::util::truncate;

struct MatchResult {
    idx: usize,
    indices: Vec<u32>,
}

pub struct Sidebar {
    conversations: Vec<ConversationSummary>,
    active: Option<ConversationId>,
    query: String,
    /// Typing goes to the filter instead of the key bindings
    filtering: bool,
    matcher: Matcher,
    filtered: Vec<MatchResult>,
    /// `render` takes `&self` but ratatui wants `&mut ListState`
    list_state: RefCell<ListState>,
}

impl Sidebar {
    pub fn new() -> Self {
        Self {
            conversations: Vec::new(),
            active: None,
            query: String::new(),
            filtering: false,
            matcher: Matcher::new(Config::DEFAULT),
            filtered: Vec::new(),
            list_state: RefCell::new(ListState::default()),
        }
    }

    /// Replace the list, keeping the selection on the same conversation when
    /// it is still there.
    pub fn set_conversations(&mut self, conversations: &[ConversationSummary]) {
        let selected_id = self.selected_id().cloned();
        self.conversations = conversations.to_vec();
        self.update_filtered();

        if let Some(id) = selected_id {
            if let Some(pos) = self.position_of(&id) {
                self.list_state.get_mut().select(Some(pos));
            }
        }
    }

    pub fn set_active(&mut self, active: Option<&ConversationId>) {
        self.active = active.cloned();
        if let Some(pos) = self.active.clone().and_then(|id| self.position_of(&id)) {
            self.list_state.get_mut().select(Some(pos));
        }
    }

    #[allow(dead_code)]
    pub fn is_filtering(&self) -> bool {
        self.filtering
    }

    fn position_of(&self, id: &ConversationId) -> Option<usize> {
        self.filtered
            .iter()
            .position(|m| &self.conversations[m.idx].id == id)
    }

    pub fn selected_id(&self) -> Option<&ConversationId> {
        let selected = self.list_state.borrow().selected()?;
        let result = self.filtered.get(selected)?;
        self.conversations.get(result.idx).map(|c| &c.id)
    }

    fn update_filtered(&mut self) {
        self.filtered.clear();

        if self.query.is_empty() {
            self.filtered = (0..self.conversations.len())
                .map(|idx| MatchResult { idx, indices: Vec::new() })
                .collect();
        } else {
            let pattern = Pattern::parse(&self.query, CaseMatching::Smart, Normalization::Smart);
            let mut scored = Vec::new();
            for (idx, conversation) in self.conversations.iter().enumerate() {
                let title: Utf32String = display_title(conversation).into();
                let mut indices = Vec::new();
                if let Some(score) = pattern.indices(title.slice(..), &mut self.matcher, &mut indices) {
                    scored.push((score, MatchResult { idx, indices }));
                }
            }
            // Stable, so equal scores keep the service's order
            scored.sort_by(|a, b| b.0.cmp(&a.0));
            self.filtered = scored.into_iter().map(|(_, m)| m).collect();
        }

        let list_state = self.list_state.get_mut();
        if self.filtered.is_empty() {
            list_state.select(None);
        } else {
            let current = list_state.selected().unwrap_or(0);
            list_state.select(Some(current.min(self.filtered.len() - 1)));
        }
    }

    fn select_next(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        let list_state = self.list_state.get_mut();
        let current = list_state.selected().unwrap_or(0);
        list_state.select(Some((current + 1) % self.filtered.len()));
    }

    fn select_prev(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        let len = self.filtered.len();
        let list_state = self.list_state.get_mut();
        let current = list_state.selected().unwrap_or(0);
        list_state.select(Some(if current == 0 { len - 1 } else { current - 1 }));
    }

    fn clear_filter(&mut self) {
        self.filtering = false;
        self.query.clear();
        self.update_filtered();
    }

    fn render_item(&self, result: &MatchResult, width: usize, theme: &Theme) -> ListItem<'static> {
        let conversation = &self.conversations[result.idx];
        let is_active = self.active.as_ref() == Some(&conversation.id);

        let title_style = if is_active {
            Style::default()
                .fg(theme.colors.primary.to_color())
                .add_modifier(Modifier::BOLD)
        } else {
            theme.text_style()
        };
        let highlight = Style::default()
            .fg(theme.colors.accent.to_color())
            .add_modifier(Modifier::BOLD);

        let marker = if is_active { "● " } else { "  " };
        let title = truncate(display_title(conversation), width.saturating_sub(2));
        let matched: HashSet<u32> = result.indices.iter().copied().collect();

        let mut spans = vec![Span::styled(marker, title_style)];
        for (i, ch) in title.chars().enumerate() {
            let style = if matched.contains(&(i as u32)) { highlight } else { title_style };
            spans.push(Span::styled(ch.to_string(), style));
        }

        let mut lines = vec![Line::from(spans)];
        if let Some(created) = conversation.created_at.and_then(format_created) {
            lines.push(Line::from(Span::styled(format!("  {created}"), theme.muted_style())));
        }
        ListItem::new(lines)
    }
}

impl Default for Sidebar {
    fn default() -> Self {
        Self::new()
    }
}

fn display_title(conversation: &ConversationSummary) -> &str {
    let title = conversation.title.trim();
    if title.is_empty() {
        UNTITLED_CONVERSATION
    } else {
        title
    }
}

/// Local creation time for epoch seconds.
fn format_created(secs: f64) -> Option<String> {
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    let nanos = ((secs.fract()) * 1e9) as u32;
    let utc = DateTime::from_timestamp(secs.trunc() as i64, nanos)?;
    Some(utc.with_timezone(&Local).format("%d %b %H:%M").to_string())
}

impl Component for Sidebar {
    fn handle_event(&mut self, event: &Event) -> Option<Action> {
        let Event::Key(key) = event else {
            return None;
        };
        if key.kind != KeyEventKind::Press {
            return None;
        }

        if self.filtering {
            match key.code {
                KeyCode::Esc => self.clear_filter(),
                KeyCode::Enter => self.filtering = false,
                KeyCode::Backspace => {
                    self.query.pop();
                    self.update_filtered();
                }
                KeyCode::Up => self.select_prev(),
                KeyCode::Down => self.select_next(),
                KeyCode::Char(c) => {
                    self.query.push(c);
                    self.update_filtered();
                }
                _ => return None,
            }
            return Some(Action::None);
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Char('/') => self.filtering = true,
            KeyCode::Esc if !self.query.is_empty() => self.clear_filter(),
            KeyCode::Enter => {
                return self.selected_id().cloned().map(Action::ConversationSwitch);
            }
            KeyCode::Char('n') => return Some(Action::ConversationNew),
            KeyCode::Char('d') | KeyCode::Delete => {
                return self.selected_id().cloned().map(Action::ConversationDeleteRequest);
            }
            _ => return None,
        }
        Some(Action::None)
    }

    fn update(&mut self, _action: &Action) {}

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let block = Block::default()
            .title(" Conversations ")
            .title_style(theme.title_style(focused))
            .borders(Borders::ALL)
            .border_style(theme.border_style(focused));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let show_filter = self.filtering || !self.query.is_empty();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(if show_filter { 1 } else { 0 }),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(inner);

        if show_filter {
            let mut spans = vec![
                Span::styled("/ ", Style::default().fg(theme.colors.primary.to_color())),
                Span::styled(self.query.clone(), theme.text_style()),
            ];
            if self.filtering {
                spans.push(Span::styled("▎", Style::default().fg(theme.colors.primary.to_color())));
            }
            frame.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);
        }

        if self.conversations.is_empty() {
            frame.render_widget(
                Paragraph::new("No conversations yet.").style(theme.muted_style()),
                chunks[1],
            );
        } else if self.filtered.is_empty() {
            frame.render_widget(Paragraph::new("No matches.").style(theme.muted_style()), chunks[1]);
        } else {
            let width = chunks[1].width as usize;
            let items: Vec<ListItem> = self
                .filtered
                .iter()
                .map(|result| self.render_item(result, width, theme))
                .collect();
            let mut list = List::new(items);
            if focused {
                list = list.highlight_style(theme.selection_style());
            }
            frame.render_stateful_widget(list, chunks[1], &mut *self.list_state.borrow_mut());
        }

        let hint = if self.filtering {
            "Enter keep · Esc clear"
        } else {
            "n new · d delete · / filter"
        };
        frame.render_widget(Paragraph::new(hint).style(theme.muted_style()), chunks[2]);
    }
}
