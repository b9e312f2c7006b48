// Rendering - draw() method and UI layout helpers

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::App;
use crate::components::feed_view::FeedContext;
use crate::components::Component;
use crate::config::Theme;
use crate::error::{DockchatError, Result};
use crate::input::focus::FocusArea;
use crate::render::Tone;

/// Screen regions, computed once per frame.
struct ScreenLayout {
    sidebar: Rect,
    feed: Rect,
    input: Rect,
    status: Rect,
}

fn compute_layout(screen: Rect, sidebar_width: u16) -> ScreenLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(screen);

    // Narrow terminals give the feed the whole width
    let sidebar_width = if screen.width < sidebar_width.saturating_mul(2) { 0 } else { sidebar_width };
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(sidebar_width), Constraint::Min(0)])
        .split(rows[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(columns[1]);

    ScreenLayout {
        sidebar: columns[0],
        feed: right[0],
        input: right[1],
        status: rows[1],
    }
}

fn status_line(theme: &Theme, server: &str, conversations: usize, busy: bool) -> Line<'static> {
    let key = Style::default().fg(theme.colors.accent.to_color()).add_modifier(Modifier::BOLD);
    let sep = Span::styled(" · ", theme.muted_style());
    let mut spans = vec![
        Span::styled(" dockchat ", theme.tone_style(Tone::Brand).add_modifier(Modifier::BOLD)),
        Span::styled(server.to_string(), theme.muted_style()),
        sep.clone(),
        Span::styled(format!("{conversations} conversations"), theme.muted_style()),
    ];
    if busy {
        spans.push(sep.clone());
        spans.push(Span::styled("working", theme.tone_style(Tone::Warning)));
    }
    for (shortcut, label) in [("F1", "guide"), ("Tab", "focus"), ("^N", "new"), ("^Q", "quit")] {
        spans.push(sep.clone());
        spans.push(Span::styled(shortcut, key));
        spans.push(Span::styled(format!(" {label}"), theme.muted_style()));
    }
    Line::from(spans)
}

impl App {
    /// Main drawing method - renders entire UI
    pub(super) fn draw(&mut self) -> Result<()> {
        let focus_input = self.ui.focus.is_focused(FocusArea::Input);
        let focus_feed = self.ui.focus.is_focused(FocusArea::Feed);
        let focus_sidebar = self.ui.focus.is_focused(FocusArea::Sidebar);
        let busy = self.controller.is_loading() || self.controller.is_loading_history();

        let size = self.terminal.size().map_err(|e| DockchatError::Terminal(e.to_string()))?;
        let layout = compute_layout(Rect::new(0, 0, size.width, size.height), self.sidebar_width);
        self.ui.sidebar_area = layout.sidebar;
        self.ui.feed_area = layout.feed;
        self.ui.input_area = layout.input;

        let theme = &self.theme;
        let controller = &self.controller;
        let ui = &mut self.ui;
        let status = status_line(theme, &self.server_url, controller.store().len(), busy);

        self.terminal
            .draw(|frame| {
                if layout.sidebar.width > 0 {
                    ui.sidebar.render(frame, layout.sidebar, focus_sidebar, theme);
                }

                let ctx = FeedContext {
                    feed: controller.feed(),
                    title: controller.title(),
                    loading_history: controller.is_loading_history(),
                };
                ui.feed_view.render(frame, layout.feed, &ctx, focus_feed, theme);
                ui.chat_input.render(frame, layout.input, focus_input, theme);
                frame.render_widget(Paragraph::new(status), layout.status);

                let screen = frame.area();
                ui.command_guide.render(frame, screen, theme);
                ui.confirm_dialog.render(frame, screen, theme);
                ui.notifications.render(frame, screen, theme);
            })
            .map_err(|e| DockchatError::Terminal(e.to_string()))?;

        Ok(())
    }
}
