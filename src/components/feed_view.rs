//! Scrollable chat feed with keyboard-selectable row actions.

use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Margin, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

use crate::action::Action;
use crate::config::Theme;
use crate::render::RowAction;
use crate::session::Feed;

use super::feed_layout::{collect_actions, layout_feed};
use super::spinner::Spinner;

/// What the feed view needs from the session to draw.
pub struct FeedContext<'a> {
    pub feed: &'a Feed,
    pub title: &'a str,
    pub loading_history: bool,
}

pub struct FeedView {
    /// Lines scrolled up from the bottom; 0 follows new output
    scroll_from_bottom: usize,
    seen_revision: Option<u64>,
    seen_generation: u64,
    actions: Vec<RowAction>,
    /// Index of the first action in the newest table
    newest_table: usize,
    selected: Option<usize>,
    /// Scroll the selected action into view on the next draw
    reveal: bool,
    /// Viewport height from the last draw, used for paging
    page: usize,
    spinner: Spinner,
}

impl FeedView {
    pub fn new() -> Self {
        Self {
            scroll_from_bottom: 0,
            seen_revision: None,
            seen_generation: 0,
            actions: Vec::new(),
            newest_table: 0,
            selected: None,
            reveal: false,
            page: 10,
            spinner: Spinner::new(),
        }
    }

    /// Pick up feed changes. New content scrolls back to the bottom.
    pub fn sync(&mut self, feed: &Feed) {
        if self.seen_revision == Some(feed.revision()) {
            return;
        }
        self.seen_revision = Some(feed.revision());
        let previous = self.selected_action().cloned();
        self.actions = collect_actions(feed.fragments());
        let newest = feed
            .fragments()
            .iter()
            .rposition(|f| f.table_view().is_some_and(|v| v.rows().iter().any(|r| !r.actions.is_empty())));
        self.newest_table = newest
            .map(|idx| collect_actions(&feed.fragments()[..idx]).len())
            .unwrap_or(0);
        // A selection survives appends only; a cleared feed was replaced
        let replaced = self.seen_generation != feed.generation();
        self.seen_generation = feed.generation();
        if replaced || self.selected_action() != previous.as_ref() {
            self.selected = None;
        }
        self.scroll_from_bottom = 0;
    }

    /// Returns whether the typing animation advanced.
    pub fn tick(&mut self, feed: &Feed) -> bool {
        feed.has_typing() && self.spinner.tick()
    }

    pub fn selected_action(&self) -> Option<&RowAction> {
        self.actions.get(self.selected?)
    }

    fn select_next(&mut self) {
        if self.actions.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) if i + 1 < self.actions.len() => i + 1,
            Some(i) => i,
            None => self.newest_table,
        });
        self.reveal = true;
    }

    fn select_prev(&mut self) {
        if self.actions.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => i.saturating_sub(1),
            None => self.actions.len() - 1,
        });
        self.reveal = true;
    }

    pub fn handle_event(&mut self, event: &Event) -> Option<Action> {
        let Event::Key(key) = event else {
            return None;
        };
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Action::ScrollUp(1)),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::ScrollDown(1)),
            KeyCode::PageUp => Some(Action::ScrollPageUp),
            KeyCode::PageDown => Some(Action::ScrollPageDown),
            KeyCode::Home | KeyCode::Char('g') => Some(Action::ScrollToTop),
            KeyCode::End | KeyCode::Char('G') => Some(Action::ScrollToBottom),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(']') => Some(Action::RowActionNext),
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('[') => Some(Action::RowActionPrev),
            KeyCode::Enter => Some(
                self.selected_action()
                    .cloned()
                    .map(Action::RowActionActivate)
                    .unwrap_or(Action::None),
            ),
            KeyCode::Esc if self.selected.is_some() => {
                self.selected = None;
                Some(Action::None)
            }
            _ => None,
        }
    }

    pub fn update(&mut self, action: &Action) {
        match action {
            Action::ScrollUp(n) => self.scroll_from_bottom += *n as usize,
            Action::ScrollDown(n) => {
                self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(*n as usize);
            }
            Action::ScrollPageUp => self.scroll_from_bottom += self.page,
            Action::ScrollPageDown => {
                self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(self.page);
            }
            // Clamped to the content height on draw
            Action::ScrollToTop => self.scroll_from_bottom = usize::MAX / 2,
            Action::ScrollToBottom => self.scroll_from_bottom = 0,
            Action::RowActionNext => self.select_next(),
            Action::RowActionPrev => self.select_prev(),
            _ => {}
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &FeedContext, focused: bool, theme: &Theme) {
        let block = Block::default()
            .title(format!(" {} ", ctx.title))
            .title_style(theme.title_style(focused))
            .borders(Borders::ALL)
            .border_style(theme.border_style(focused));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.width < 4 || inner.height == 0 {
            return;
        }

        let content = inner.inner(Margin::new(1, 0));
        let selected = if focused { self.selected } else { None };
        let mut layout = layout_feed(
            ctx.feed.fragments(),
            content.width,
            theme,
            selected,
            self.spinner.current_frame(),
        );
        if ctx.loading_history {
            layout.lines.push(Line::default());
            layout.lines.push(Line::from(Span::styled(
                format!("{} Loading conversation...", self.spinner.current_frame()),
                theme.muted_style().add_modifier(Modifier::ITALIC),
            )));
        }

        let height = content.height as usize;
        self.page = height.saturating_sub(1).max(1);
        let total = layout.lines.len();
        let max_scroll = total.saturating_sub(height);
        self.scroll_from_bottom = self.scroll_from_bottom.min(max_scroll);

        let mut top = max_scroll - self.scroll_from_bottom;
        if self.reveal {
            if let Some(line) = self.selected.and_then(|i| layout.action_lines.get(i).copied()) {
                if line < top {
                    top = line;
                } else if line >= top + height {
                    top = line + 1 - height;
                }
                self.scroll_from_bottom = max_scroll - top.min(max_scroll);
            }
            self.reveal = false;
        }

        let visible: Vec<Line> = layout.lines.into_iter().skip(top).take(height).collect();
        frame.render_widget(Paragraph::new(visible), content);

        if total > height {
            let mut state = ScrollbarState::new(max_scroll).position(top);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                area.inner(Margin::new(0, 1)),
                &mut state,
            );
        }
    }
}

impl Default for FeedView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Cell, Fragment, Header, Icon, RowView, TableBody, TableView, TemplateKey};
    use crossterm::event::{KeyEvent, KeyModifiers};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn table_fragment(names: &[&str]) -> Fragment {
        Fragment::table(
            Icon::BOT,
            TableView {
                headers: vec![Header::new("Name"), Header::new("Actions")],
                body: TableBody::Rows(
                    names
                        .iter()
                        .map(|name| RowView {
                            template: TemplateKey::VolumeRow,
                            cells: vec![Cell::new(*name)],
                            actions: vec![RowAction::submit("Inspect", format!("inspect volume {name}"))],
                        })
                        .collect(),
                ),
            },
        )
    }

    fn press(view: &mut FeedView, code: KeyCode) -> Option<Action> {
        view.handle_event(&Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    #[test]
    fn test_new_content_scrolls_to_bottom() {
        let mut feed = Feed::new();
        feed.push(Fragment::user("list volumes"));
        let mut view = FeedView::new();
        view.sync(&feed);

        view.update(&Action::ScrollUp(5));
        assert_eq!(view.scroll_from_bottom, 5);

        feed.push(Fragment::system("hi"));
        view.sync(&feed);
        assert_eq!(view.scroll_from_bottom, 0);
    }

    #[test]
    fn test_sync_is_idempotent() {
        let mut feed = Feed::new();
        feed.push(table_fragment(&["data"]));
        let mut view = FeedView::new();
        view.sync(&feed);
        view.update(&Action::ScrollUp(2));
        view.sync(&feed);
        assert_eq!(view.scroll_from_bottom, 2);
    }

    #[test]
    fn test_action_selection_and_activation() {
        let mut feed = Feed::new();
        feed.push(table_fragment(&["data", "cache"]));
        let mut view = FeedView::new();
        view.sync(&feed);

        assert!(matches!(press(&mut view, KeyCode::Enter), Some(Action::None)));

        view.update(&Action::RowActionPrev);
        view.update(&Action::RowActionPrev);
        match press(&mut view, KeyCode::Enter) {
            Some(Action::RowActionActivate(action)) => {
                assert_eq!(action, RowAction::submit("Inspect", "inspect volume data"));
            }
            other => panic!("unexpected {:?}", other),
        }

        view.update(&Action::RowActionNext);
        view.update(&Action::RowActionNext);
        assert_eq!(
            view.selected_action(),
            Some(&RowAction::submit("Inspect", "inspect volume cache"))
        );
    }

    #[test]
    fn test_next_starts_at_newest_table() {
        let mut feed = Feed::new();
        feed.push(table_fragment(&["old"]));
        feed.push(table_fragment(&["new"]));
        let mut view = FeedView::new();
        view.sync(&feed);
        view.update(&Action::RowActionNext);
        assert_eq!(
            view.selected_action(),
            Some(&RowAction::submit("Inspect", "inspect volume new"))
        );
    }

    #[test]
    fn test_cleared_feed_drops_selection() {
        let mut feed = Feed::new();
        feed.push(table_fragment(&["data"]));
        let mut view = FeedView::new();
        view.sync(&feed);
        view.update(&Action::RowActionNext);
        assert!(view.selected_action().is_some());

        feed.clear();
        view.sync(&feed);
        assert!(view.selected_action().is_none());
    }

    #[rstest]
    #[case::other_conversation(&["other", "data"])]
    #[case::same_rows_replayed(&["data", "cache"])]
    fn test_replaced_feed_drops_selection(#[case] replay: &[&str]) {
        let mut feed = Feed::new();
        feed.push(table_fragment(&["data", "cache"]));
        let mut view = FeedView::new();
        view.sync(&feed);
        view.update(&Action::RowActionPrev);
        view.update(&Action::RowActionPrev);
        assert_eq!(
            view.selected_action(),
            Some(&RowAction::submit("Inspect", "inspect volume data"))
        );

        feed.clear();
        feed.push(Fragment::user("docker volume ls"));
        feed.push(table_fragment(replay));
        view.sync(&feed);
        assert_eq!(view.selected_action(), None);
        assert!(matches!(press(&mut view, KeyCode::Enter), Some(Action::None)));
    }

    #[test]
    fn test_appended_content_keeps_selection() {
        let mut feed = Feed::new();
        feed.push(table_fragment(&["data", "cache"]));
        let mut view = FeedView::new();
        view.sync(&feed);
        view.update(&Action::RowActionNext);
        let selected = view.selected_action().cloned();
        assert!(selected.is_some());

        feed.push(Fragment::user("docker ps"));
        feed.push(Fragment::typing());
        view.sync(&feed);
        feed.remove_typing();
        view.sync(&feed);
        assert_eq!(view.selected_action(), selected.as_ref());
    }

    #[test]
    fn test_scroll_keys_map_to_actions() {
        let mut view = FeedView::new();
        assert!(matches!(press(&mut view, KeyCode::Char('k')), Some(Action::ScrollUp(1))));
        assert!(matches!(press(&mut view, KeyCode::End), Some(Action::ScrollToBottom)));
        assert!(press(&mut view, KeyCode::Char('x')).is_none());
    }
}
