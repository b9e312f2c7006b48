use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Position, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::action::Action;
use crate::components::Component;
use crate::config::Theme;
use crate::render::Tone;
use crate::util::display_width;

const PLACEHOLDER: &str = "Type a command, e.g. list containers (F1 for the guide)";
const BUSY_PLACEHOLDER: &str = "Waiting for the assistant...";
const MAX_HISTORY: usize = 100;

/// Single-line command input with history recall.
pub struct ChatInput {
    buffer: String,
    /// Cursor position in chars
    cursor: usize,
    history: Vec<String>,
    /// Index into `history` while browsing it
    history_pos: Option<usize>,
    /// Input typed before browsing started
    draft: String,
    /// Set while a command is in flight
    disabled: bool,
}

impl ChatInput {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            history: Vec::new(),
            history_pos: None,
            draft: String::new(),
            disabled: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.history_pos = None;
    }

    /// Replace the buffer, e.g. with an example from the command guide.
    pub fn set_text(&mut self, text: &str) {
        self.buffer = text.to_string();
        self.cursor = self.buffer.chars().count();
        self.history_pos = None;
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }


    /// Pasted newlines become spaces; commands are one line.
    pub fn paste_text(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '\r' => {}
                '\n' | '\t' => self.insert_char(' '),
                c if c.is_control() => {}
                c => self.insert_char(c),
            }
        }
    }

    fn byte_pos(&self, char_pos: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.buffer.len())
    }

    fn insert_char(&mut self, c: char) {
        let pos = self.byte_pos(self.cursor);
        self.buffer.insert(pos, c);
        self.cursor += 1;
    }

    fn delete_char_before(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let pos = self.byte_pos(self.cursor);
        self.buffer.remove(pos);
    }

    fn delete_char_at(&mut self) {
        if self.cursor < self.buffer.chars().count() {
            let pos = self.byte_pos(self.cursor);
            self.buffer.remove(pos);
        }
    }

    fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.buffer.chars().count());
    }

    fn move_to_start(&mut self) {
        self.cursor = 0;
    }

    fn move_to_end(&mut self) {
        self.cursor = self.buffer.chars().count();
    }

    fn delete_to_end(&mut self) {
        let pos = self.byte_pos(self.cursor);
        self.buffer.truncate(pos);
    }

    fn push_history(&mut self, command: &str) {
        if self.history.last().map(String::as_str) != Some(command) {
            self.history.push(command.to_string());
            if self.history.len() > MAX_HISTORY {
                self.history.remove(0);
            }
        }
    }

    fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let pos = match self.history_pos {
            None => {
                self.draft = self.buffer.clone();
                self.history.len() - 1
            }
            Some(pos) => pos.saturating_sub(1),
        };
        self.history_pos = Some(pos);
        self.buffer = self.history[pos].clone();
        self.move_to_end();
    }

    fn history_next(&mut self) {
        let Some(pos) = self.history_pos else {
            return;
        };
        if pos + 1 < self.history.len() {
            self.history_pos = Some(pos + 1);
            self.buffer = self.history[pos + 1].clone();
        } else {
            self.history_pos = None;
            self.buffer = std::mem::take(&mut self.draft);
        }
        self.move_to_end();
    }

    fn submit(&mut self) -> Action {
        let command = self.buffer.trim().to_string();
        if self.disabled || command.is_empty() {
            return Action::None;
        }
        self.push_history(&command);
        self.clear();
        self.draft.clear();
        Action::InputSubmit(command)
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match (key.modifiers, key.code) {
            (_, KeyCode::Enter) => Some(self.submit()),
            (_, KeyCode::Backspace) => {
                self.delete_char_before();
                Some(Action::None)
            }
            (_, KeyCode::Delete) => {
                self.delete_char_at();
                Some(Action::None)
            }
            (KeyModifiers::NONE, KeyCode::Left) => {
                self.move_left();
                Some(Action::None)
            }
            (KeyModifiers::NONE, KeyCode::Right) => {
                self.move_right();
                Some(Action::None)
            }
            (KeyModifiers::NONE, KeyCode::Up) => {
                self.history_prev();
                Some(Action::None)
            }
            (KeyModifiers::NONE, KeyCode::Down) => {
                self.history_next();
                Some(Action::None)
            }
            (KeyModifiers::NONE, KeyCode::Home) | (KeyModifiers::CONTROL, KeyCode::Char('a')) => {
                self.move_to_start();
                Some(Action::None)
            }
            (KeyModifiers::NONE, KeyCode::End) | (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
                self.move_to_end();
                Some(Action::None)
            }
            (KeyModifiers::CONTROL, KeyCode::Char('k')) => {
                self.delete_to_end();
                Some(Action::None)
            }
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
                self.clear();
                Some(Action::None)
            }
            (KeyModifiers::NONE, KeyCode::Char(c)) | (KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                self.insert_char(c);
                Some(Action::None)
            }
            _ => None,
        }
    }

    /// Chars hidden off the left edge so the cursor stays in view.
    fn scroll_start(&self, width: usize) -> usize {
        let mut start = 0;
        let prefix: Vec<char> = self.buffer.chars().take(self.cursor).collect();
        while start < prefix.len() {
            let visible: String = prefix[start..].iter().collect();
            if display_width(&visible) < width {
                break;
            }
            start += 1;
        }
        start
    }
}

impl Default for ChatInput {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ChatInput {
    fn handle_event(&mut self, event: &Event) -> Option<Action> {
        match event {
            Event::Key(key) => self.handle_key(*key),
            Event::Paste(text) => {
                self.paste_text(text);
                Some(Action::None)
            }
            _ => None,
        }
    }

    fn update(&mut self, action: &Action) {
        if let Action::GuideUseExample(example) = action {
            self.set_text(example);
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let block = Block::default()
            .title(" Command ")
            .title_style(theme.title_style(focused))
            .borders(Borders::ALL)
            .border_style(theme.border_style(focused));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let width = inner.width as usize;
        let line = if self.disabled {
            Line::from(Span::styled(
                BUSY_PLACEHOLDER,
                theme.muted_style().add_modifier(Modifier::ITALIC),
            ))
        } else if self.buffer.is_empty() {
            Line::from(vec![
                Span::styled("❯ ", theme.tone_style(Tone::Brand)),
                Span::styled(PLACEHOLDER, theme.muted_style()),
            ])
        } else {
            let start = self.scroll_start(width.saturating_sub(2));
            let visible: String = self.buffer.chars().skip(start).collect();
            Line::from(vec![
                Span::styled("❯ ", theme.tone_style(Tone::Brand)),
                Span::styled(visible, theme.text_style()),
            ])
        };
        frame.render_widget(Paragraph::new(line), inner);

        if focused && !self.disabled && inner.width > 2 && inner.height > 0 {
            let start = self.scroll_start(width.saturating_sub(2));
            let before: String = self.buffer.chars().skip(start).take(self.cursor - start).collect();
            let x = inner.x + 2 + display_width(&before) as u16;
            frame.set_cursor_position(Position::new(x.min(inner.right().saturating_sub(1)), inner.y));
        }
    }
}
