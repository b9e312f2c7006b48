use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::config::Theme;
use crate::session::{Notice, NoticeLevel};
use crate::util::truncate;

const MAX_VISIBLE_NOTIFICATIONS: usize = 4;
const NOTIFICATION_WIDTH: u16 = 44;
const NOTIFICATION_HEIGHT: u16 = 4;
const NOTIFICATION_MARGIN: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

impl NotificationLevel {
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "ℹ",
            NotificationLevel::Success => "✔",
            NotificationLevel::Error => "✖",
        }
    }
}

impl From<NoticeLevel> for NotificationLevel {
    fn from(level: NoticeLevel) -> Self {
        match level {
            NoticeLevel::Info => NotificationLevel::Info,
            NoticeLevel::Success => NotificationLevel::Success,
            NoticeLevel::Error => NotificationLevel::Error,
        }
    }
}

/// A toast. Toasts never go into the chat feed.
#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>, duration: Duration) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Instant::now(),
            duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }

    fn remaining_ratio(&self) -> f32 {
        let elapsed = self.created_at.elapsed().as_millis() as f32;
        let total = self.duration.as_millis().max(1) as f32;
        (1.0 - elapsed / total).max(0.0)
    }
}

pub struct NotificationManager {
    notifications: VecDeque<Notification>,
    duration: Duration,
}

impl NotificationManager {
    pub fn new(duration: Duration) -> Self {
        Self {
            notifications: VecDeque::new(),
            duration,
        }
    }

    pub fn push(&mut self, notification: Notification) {
        self.notifications.push_back(notification);

        while self.notifications.len() > MAX_VISIBLE_NOTIFICATIONS * 2 {
            self.notifications.pop_front();
        }
    }

    fn push_level(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.push(Notification::new(level, message, self.duration));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push_level(NotificationLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push_level(NotificationLevel::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push_level(NotificationLevel::Error, message);
    }

    pub fn notice(&mut self, notice: Notice) {
        self.push_level(notice.level.into(), notice.message);
    }

    /// Drop expired toasts. Returns whether any were removed.
    pub fn tick(&mut self) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| !n.is_expired());
        self.notifications.len() != before
    }

    pub fn dismiss_first(&mut self) {
        self.notifications.pop_front();
    }

    pub fn has_notifications(&self) -> bool {
        !self.notifications.is_empty()
    }

    pub fn count(&self) -> usize {
        self.notifications.len()
    }

    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter().take(MAX_VISIBLE_NOTIFICATIONS)
    }

    /// Stacked top-right.
    pub fn render(&self, frame: &mut Frame, screen: Rect, theme: &Theme) {
        if self.notifications.is_empty() {
            return;
        }

        let width = NOTIFICATION_WIDTH.min(screen.width.saturating_sub(2));
        let x = screen.x + screen.width.saturating_sub(width + 2);
        let mut shown = 0;

        for (idx, notification) in self.visible().enumerate() {
            let y = screen.y + 1 + (idx as u16) * (NOTIFICATION_HEIGHT + NOTIFICATION_MARGIN);
            if y + NOTIFICATION_HEIGHT > screen.y + screen.height {
                break;
            }
            self.render_notification(frame, Rect::new(x, y, width, NOTIFICATION_HEIGHT), notification, theme);
            shown += 1;
        }

        let hidden = self.notifications.len() - shown;
        if hidden > 0 {
            let y = screen.y + 1 + (shown as u16) * (NOTIFICATION_HEIGHT + NOTIFICATION_MARGIN);
            if y < screen.y + screen.height {
                frame.render_widget(
                    Paragraph::new(format!("... and {} more", hidden))
                        .style(theme.muted_style())
                        .alignment(Alignment::Right),
                    Rect::new(x, y, width, 1),
                );
            }
        }
    }

    fn render_notification(&self, frame: &mut Frame, area: Rect, notification: &Notification, theme: &Theme) {
        frame.render_widget(Clear, area);

        let styles = &theme.notifications;
        let (fg, bg) = match notification.level {
            NotificationLevel::Info => (styles.info_fg.to_color(), styles.info_bg.to_color()),
            NotificationLevel::Success => (styles.success_fg.to_color(), styles.success_bg.to_color()),
            NotificationLevel::Error => (styles.error_fg.to_color(), styles.error_bg.to_color()),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(fg).bg(bg))
            .style(Style::default().bg(bg));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let width = inner.width as usize;
        let text = format!("{} {}", notification.level.icon(), notification.message);
        let progress = "─".repeat((width as f32 * notification.remaining_ratio()) as usize);

        let lines = vec![
            Line::from(Span::styled(
                truncate(&text, width),
                Style::default().fg(fg).bg(bg).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                progress,
                Style::default().fg(fg).bg(bg).add_modifier(Modifier::DIM),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> NotificationManager {
        NotificationManager::new(Duration::from_millis(3000))
    }

    #[test]
    fn test_notice_levels_map() {
        let mut m = manager();
        m.notice(Notice {
            level: NoticeLevel::Error,
            message: "Could not delete conversation: Network error: refused.".to_string(),
        });
        let first = m.visible().next().unwrap();
        assert_eq!(first.level, NotificationLevel::Error);
        assert!(first.message.starts_with("Could not delete"));
    }

    #[test]
    fn test_expired_toasts_are_dropped() {
        let mut m = NotificationManager::new(Duration::ZERO);
        m.info("Running: docker ps");
        assert!(m.tick());
        assert!(!m.has_notifications());
    }

    #[test]
    fn test_live_toasts_survive_tick() {
        let mut m = manager();
        m.success("Conversation deleted.");
        assert!(!m.tick());
        assert_eq!(m.count(), 1);
    }

    #[test]
    fn test_queue_is_bounded() {
        let mut m = manager();
        for i in 0..20 {
            m.info(format!("toast {i}"));
        }
        assert_eq!(m.count(), MAX_VISIBLE_NOTIFICATIONS * 2);
        assert_eq!(m.visible().count(), MAX_VISIBLE_NOTIFICATIONS);
        assert_eq!(m.visible().next().unwrap().message, "toast 12");
    }

    #[test]
    fn test_dismiss_first() {
        let mut m = manager();
        m.info("a");
        m.info("b");
        m.dismiss_first();
        assert_eq!(m.visible().next().unwrap().message, "b");
    }
}
