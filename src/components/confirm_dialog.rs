use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::action::Action;
use crate::config::Theme;

struct Prompt {
    title: String,
    message: String,
}

/// Yes/no prompt for destructive operations.
#[derive(Default)]
pub struct ConfirmDialog {
    prompt: Option<Prompt>,
}

impl ConfirmDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.prompt = Some(Prompt {
            title: title.into(),
            message: message.into(),
        });
    }

    pub fn dismiss(&mut self) {
        self.prompt = None;
    }

    pub fn is_visible(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn handle_event(&mut self, event: &Event) -> Option<Action> {
        if !self.is_visible() {
            return None;
        }

        if let Event::Key(key) = event {
            if key.kind != KeyEventKind::Press {
                return None;
            }
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    return Some(Action::ConfirmAccept);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    return Some(Action::ConfirmCancel);
                }
                _ => {}
            }
        }

        None
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(prompt) = &self.prompt else {
            return;
        };

        let dialog_width = (area.width * 50 / 100).clamp(36, 64).min(area.width);
        let dialog_height = 8.min(area.height);
        let dialog_x = area.x + area.width.saturating_sub(dialog_width) / 2;
        let dialog_y = area.y + area.height.saturating_sub(dialog_height) / 2;
        let dialog_area = Rect::new(dialog_x, dialog_y, dialog_width, dialog_height);

        frame.render_widget(Clear, dialog_area);

        let border_color = theme.colors.warning.to_color();
        let block = Block::default()
            .title(format!(" ⚠ {} ", prompt.title))
            .title_style(Style::default().fg(border_color).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color));
        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        frame.render_widget(
            Paragraph::new(prompt.message.as_str())
                .style(theme.text_style())
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            chunks[0],
        );

        let keys = Line::from(vec![
            Span::styled(
                "[Y]",
                Style::default()
                    .fg(theme.colors.error.to_color())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Delete   "),
            Span::styled(
                "[N/Esc]",
                Style::default()
                    .fg(theme.colors.muted.to_color())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Cancel"),
        ]);
        frame.render_widget(Paragraph::new(keys).alignment(Alignment::Center), chunks[1]);
    }
}
