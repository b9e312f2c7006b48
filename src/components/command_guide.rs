use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::action::Action;
use crate::config::{GuideEntry, Theme};
use crate::util::truncate;

/// Modal listing the commands the assistant understands.
pub struct CommandGuide {
    entries: Vec<GuideEntry>,
    visible: bool,
    list_state: ListState,
}

impl CommandGuide {
    pub fn new(entries: Vec<GuideEntry>) -> Self {
        Self {
            entries,
            visible: false,
            list_state: ListState::default(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
        if !self.entries.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    fn select_next(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some((current + 1) % self.entries.len()));
    }

    fn select_prev(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        let prev = if current == 0 { self.entries.len() - 1 } else { current - 1 };
        self.list_state.select(Some(prev));
    }

    fn selected_example(&self) -> Option<&str> {
        let idx = self.list_state.selected()?;
        self.entries.get(idx).map(|e| e.example.as_str())
    }

    pub fn handle_event(&mut self, event: &Event) -> Option<Action> {
        if !self.visible {
            return None;
        }
        let Event::Key(key) = event else {
            return None;
        };
        if key.kind != KeyEventKind::Press {
            return Some(Action::None);
        }

        match key.code {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') => Some(Action::GuideClose),
            KeyCode::Enter => Some(
                self.selected_example()
                    .map(|example| Action::GuideUseExample(example.to_string()))
                    .unwrap_or(Action::GuideClose),
            ),
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_prev();
                Some(Action::None)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next();
                Some(Action::None)
            }
            // Modal: swallow everything else
            _ => Some(Action::None),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if !self.visible {
            return;
        }

        let dialog_width = (area.width * 70 / 100).clamp(50, 100).min(area.width);
        let dialog_height = (area.height * 70 / 100).clamp(10, 40).min(area.height);
        let dialog_area = Rect::new(
            area.x + area.width.saturating_sub(dialog_width) / 2,
            area.y + area.height.saturating_sub(dialog_height) / 2,
            dialog_width,
            dialog_height,
        );
        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .title(" Command Guide ")
            .title_style(theme.title_style(true))
            .borders(Borders::ALL)
            .border_style(theme.border_style(true));
        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        let width = chunks[0].width.saturating_sub(2) as usize;
        let items: Vec<ListItem> = self
            .entries
            .iter()
            .map(|entry| {
                ListItem::new(vec![
                    Line::from(Span::styled(truncate(&entry.description, width), theme.text_style())),
                    Line::from(Span::styled(
                        truncate(&format!("  {}", entry.example), width),
                        Style::default()
                            .fg(theme.colors.secondary.to_color())
                            .add_modifier(Modifier::BOLD),
                    )),
                ])
            })
            .collect();

        let list = List::new(items)
            .highlight_style(theme.selection_style())
            .highlight_symbol("▶ ");
        let mut list_state = self.list_state.clone();
        frame.render_stateful_widget(list, chunks[0], &mut list_state);

        frame.render_widget(
            Paragraph::new("Enter use example · Esc close").style(theme.muted_style()),
            chunks[1],
        );
    }
}
