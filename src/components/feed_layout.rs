//! Lays fragments out as terminal lines.
//!
//! Pure: the same fragments, width and selection always give the same lines,
//! so the feed view can measure before it scrolls.

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::config::Theme;
use crate::render::markdown::Inline;
use crate::render::{
    Block, Body, Cell, ColumnHint, Fragment, Header, ReceiptView, Role, RowAction, SpanStyle, TableBody, TableView,
    Tone,
};
use crate::util::{display_width, pad_left, pad_right, truncate};

const INDENT: &str = "  ";
const COLUMN_GAP: usize = 2;
const MAX_COLUMN_WIDTH: usize = 40;
const MIN_COLUMN_WIDTH: usize = 4;

pub struct FeedLayout {
    pub lines: Vec<Line<'static>>,
    /// Line index of every row action, in feed order
    pub action_lines: Vec<usize>,
}

/// Every row action in the feed, in the order they are laid out.
pub fn collect_actions(fragments: &[Fragment]) -> Vec<RowAction> {
    fragments
        .iter()
        .filter_map(Fragment::table_view)
        .flat_map(|view| view.rows().iter().flat_map(|row| row.actions.iter().cloned()))
        .collect()
}

pub fn layout_feed(
    fragments: &[Fragment],
    width: u16,
    theme: &Theme,
    selected_action: Option<usize>,
    spinner_frame: &str,
) -> FeedLayout {
    let mut builder = Builder {
        lines: Vec::new(),
        action_lines: Vec::new(),
        width: width as usize,
        theme,
        selected_action,
    };

    for (i, fragment) in fragments.iter().enumerate() {
        if i > 0 {
            builder.lines.push(Line::default());
        }
        builder.fragment(fragment, spinner_frame);
    }

    FeedLayout {
        lines: builder.lines,
        action_lines: builder.action_lines,
    }
}

struct Builder<'a> {
    lines: Vec<Line<'static>>,
    action_lines: Vec<usize>,
    width: usize,
    theme: &'a Theme,
    selected_action: Option<usize>,
}

impl Builder<'_> {
    fn body_width(&self) -> usize {
        self.width.saturating_sub(INDENT.len()).max(1)
    }

    fn push(&mut self, spans: Vec<Span<'static>>) {
        let mut all = vec![Span::raw(INDENT)];
        all.extend(spans);
        self.lines.push(Line::from(all));
    }

    fn fragment(&mut self, fragment: &Fragment, spinner_frame: &str) {
        let label = match fragment.role {
            Role::User => "You",
            Role::Bot => "Assistant",
            Role::Error => "Error",
            Role::System => "System",
        };
        let icon_style = self.theme.tone_style(fragment.icon.tone).add_modifier(Modifier::BOLD);
        self.lines.push(Line::from(vec![
            Span::styled(format!("{} ", fragment.icon.glyph), icon_style),
            Span::styled(label, icon_style),
        ]));

        match &fragment.body {
            Body::Text(text) => {
                let style = match fragment.role {
                    Role::User => Style::default().fg(self.theme.feed.user_fg.to_color()),
                    Role::Error => self.theme.tone_style(Tone::Danger),
                    Role::System => self.theme.muted_style(),
                    Role::Bot => self.theme.text_style(),
                };
                self.wrapped(text, style);
            }
            Body::Preformatted { title, text } => self.preformatted(title.as_deref(), text),
            Body::Table(view) => self.table(view),
            Body::Receipt(view) => self.receipt(view),
            Body::Narrative(blocks) => self.narrative(blocks),
            Body::Typing => {
                let style = self.theme.muted_style().add_modifier(Modifier::ITALIC);
                self.push(vec![Span::styled(format!("{spinner_frame} typing..."), style)]);
            }
        }
    }

    fn wrapped(&mut self, text: &str, style: Style) {
        let width = self.body_width();
        for line in text.lines() {
            for chunk in wrap_words(line, width) {
                self.push(vec![Span::styled(chunk, style)]);
            }
        }
        if text.is_empty() {
            self.push(Vec::new());
        }
    }

    fn code_style(&self) -> Style {
        Style::default()
            .fg(self.theme.feed.code_fg.to_color())
            .bg(self.theme.feed.code_bg.to_color())
    }

    /// Monospace lines are hard-wrapped, never reflowed.
    fn code_lines(&mut self, text: &str) {
        let gutter = Span::styled("│ ", self.theme.muted_style());
        let width = self.body_width().saturating_sub(2).max(1);
        let style = self.code_style();
        for line in text.lines() {
            for chunk in wrap_hard(&line.replace('\t', "    "), width) {
                self.push(vec![gutter.clone(), Span::styled(chunk, style)]);
            }
        }
    }

    fn preformatted(&mut self, title: Option<&str>, text: &str) {
        if let Some(title) = title {
            let style = Style::default()
                .fg(self.theme.colors.accent.to_color())
                .add_modifier(Modifier::BOLD);
            self.push(vec![Span::styled(format!("Inspect: {title}"), style)]);
        }
        if text.is_empty() {
            self.push(vec![Span::styled("(no output)", self.theme.muted_style())]);
        } else {
            self.code_lines(text);
        }
    }

    fn receipt(&mut self, view: &ReceiptView) {
        let bar = Span::styled("┃ ", self.theme.tone_style(view.border));
        let strong = self.theme.text_style().add_modifier(Modifier::BOLD);
        let width = self.body_width().saturating_sub(2);

        let summary = [view.action.as_str(), view.resource_type.as_str(), view.resource_name.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        self.push(vec![bar.clone(), Span::styled(truncate(&summary, width), strong)]);
        self.push(vec![
            bar.clone(),
            Span::styled("Status: ", self.theme.muted_style()),
            Span::styled(
                truncate(&view.status, width.saturating_sub(8)),
                self.theme.tone_style(view.border),
            ),
        ]);
        for (key, value) in &view.details {
            let key = format!("{key}: ");
            let rest = width.saturating_sub(display_width(&key));
            self.push(vec![
                bar.clone(),
                Span::styled(key, self.theme.muted_style()),
                Span::styled(truncate(value, rest), self.theme.text_style()),
            ]);
        }
    }

    fn narrative(&mut self, blocks: &[Block]) {
        let text = self.theme.text_style();
        for block in blocks {
            match block {
                Block::Heading { level, spans } => {
                    let mut style = Style::default()
                        .fg(self.theme.colors.primary.to_color())
                        .add_modifier(Modifier::BOLD);
                    if *level <= 1 {
                        style = style.add_modifier(Modifier::UNDERLINED);
                    }
                    self.inline(spans, style, "", "");
                }
                Block::Paragraph(spans) => self.inline(spans, text, "", ""),
                Block::ListItem { depth, marker, spans } => {
                    let indent = "  ".repeat(*depth);
                    let first = format!("{indent}{marker} ");
                    let hanging = " ".repeat(display_width(&first));
                    self.inline(spans, text, &first, &hanging);
                }
                Block::CodeBlock(code) => self.code_lines(code),
                Block::Rule => {
                    let rule = "─".repeat(self.body_width());
                    self.push(vec![Span::styled(rule, self.theme.muted_style())]);
                }
            }
        }
    }

    fn span_style(&self, base: Style, style: SpanStyle) -> Style {
        let mut out = base;
        if style.strong {
            out = out.add_modifier(Modifier::BOLD);
        }
        if style.emphasis {
            out = out.add_modifier(Modifier::ITALIC);
        }
        if style.code {
            out = out.patch(self.code_style());
        }
        out
    }

    /// Word-wrap styled runs. `first` prefixes the first line, `hanging`
    /// the continuation lines.
    fn inline(&mut self, spans: &Inline, base: Style, first: &str, hanging: &str) {
        let width = self.body_width();
        let mut line: Vec<Span<'static>> = vec![Span::styled(first.to_string(), base)];
        let mut used = display_width(first);
        let mut fresh = true;

        let flush = |line: &mut Vec<Span<'static>>, used: &mut usize, this: &mut Self| {
            this.push(std::mem::take(line));
            line.push(Span::styled(hanging.to_string(), base));
            *used = display_width(hanging);
        };

        for run in spans {
            if run.text == "\n" {
                flush(&mut line, &mut used, self);
                fresh = true;
                continue;
            }
            let style = self.span_style(base, run.style);
            for (i, word) in run.text.split(' ').enumerate() {
                // Keep the space that separated this word from the last one
                let piece = if i == 0 || fresh { word.to_string() } else { format!(" {word}") };
                let piece_width = display_width(&piece);
                if used + piece_width > width && !fresh {
                    flush(&mut line, &mut used, self);
                    let trimmed = piece.trim_start().to_string();
                    used += display_width(&trimmed);
                    line.push(Span::styled(trimmed, style));
                } else {
                    used += piece_width;
                    line.push(Span::styled(piece, style));
                }
                fresh = false;
            }
        }
        self.push(line);
    }

    fn table(&mut self, view: &TableView) {
        let data_columns = view
            .rows()
            .iter()
            .map(|row| row.cells.len())
            .max()
            .unwrap_or(view.headers.len())
            .min(view.headers.len());
        let has_actions = view.rows().iter().any(|row| !row.actions.is_empty());
        let actions_width = view
            .rows()
            .iter()
            .map(|row| actions_text_width(&row.actions))
            .max()
            .unwrap_or(0);

        let mut widths: Vec<usize> = (0..data_columns)
            .map(|col| {
                let header = display_width(&view.headers[col].text);
                let cells = view
                    .rows()
                    .iter()
                    .filter_map(|row| row.cells.get(col))
                    .map(|cell| display_width(&cell.text))
                    .max()
                    .unwrap_or(0);
                header.max(cells).clamp(1, MAX_COLUMN_WIDTH)
            })
            .collect();

        let available = self.body_width();
        let shown = fit_columns(&view.headers[..data_columns], &mut widths, available, actions_width);

        let header_style = Style::default()
            .fg(self.theme.feed.header_fg.to_color())
            .add_modifier(Modifier::BOLD);
        let mut header = Vec::new();
        for &col in &shown {
            header.push(Span::styled(
                align(&view.headers[col], &view.headers[col].text, widths[col]),
                header_style,
            ));
            header.push(Span::raw(" ".repeat(COLUMN_GAP)));
        }
        if has_actions {
            let label = view.headers.get(data_columns).map(|h| h.text.as_str()).unwrap_or("Actions");
            header.push(Span::styled(label.to_string(), header_style));
        }
        self.push(header);

        let rule_width = shown.iter().map(|&c| widths[c] + COLUMN_GAP).sum::<usize>()
            + if has_actions { actions_width } else { 0 };
        self.push(vec![Span::styled(
            "─".repeat(rule_width.min(available)),
            self.theme.muted_style(),
        )]);

        match &view.body {
            TableBody::Empty(message) => {
                self.push(vec![Span::styled(
                    message.clone(),
                    self.theme.muted_style().add_modifier(Modifier::ITALIC),
                )]);
            }
            TableBody::Rows(rows) => {
                for row in rows {
                    let mut spans = Vec::new();
                    for &col in &shown {
                        let blank = Cell::new("");
                        let cell = row.cells.get(col).unwrap_or(&blank);
                        spans.push(Span::styled(
                            align(&view.headers[col], &cell.text, widths[col]),
                            self.theme.tone_style(cell.tone),
                        ));
                        spans.push(Span::raw(" ".repeat(COLUMN_GAP)));
                    }
                    for action in &row.actions {
                        let index = self.action_lines.len();
                        self.action_lines.push(self.lines.len());
                        spans.push(self.action_span(action, self.selected_action == Some(index)));
                        spans.push(Span::raw(" "));
                    }
                    self.push(spans);
                }
            }
        }
    }

    fn action_span(&self, action: &RowAction, selected: bool) -> Span<'static> {
        let text = format!("[{}]", action.label);
        let style = if selected {
            self.theme.selection_style().add_modifier(Modifier::BOLD)
        } else if action.enabled {
            Style::default().fg(self.theme.colors.accent.to_color())
        } else {
            Style::default().fg(self.theme.feed.disabled_fg.to_color())
        };
        Span::styled(text, style)
    }
}

fn actions_text_width(actions: &[RowAction]) -> usize {
    actions.iter().map(|a| display_width(a.label) + 3).sum()
}

fn align(header: &Header, text: &str, width: usize) -> String {
    if header.hint == ColumnHint::Right {
        pad_left(text, width)
    } else {
        pad_right(text, width)
    }
}

/// Pick the columns that fit in `available`, dropping tertiary then
/// secondary columns and then narrowing the widest ones. Returns the indices
/// of the columns to draw.
fn fit_columns(headers: &[Header], widths: &mut [usize], available: usize, reserved: usize) -> Vec<usize> {
    let mut shown: Vec<usize> = (0..headers.len()).collect();
    let total = |shown: &[usize], widths: &[usize]| -> usize {
        shown.iter().map(|&c| widths[c] + COLUMN_GAP).sum::<usize>() + reserved
    };

    for hint in [ColumnHint::Tertiary, ColumnHint::Secondary] {
        while total(&shown, widths) > available {
            match shown.iter().rposition(|&c| headers[c].hint == hint) {
                Some(pos) => {
                    shown.remove(pos);
                }
                None => break,
            }
        }
    }

    while total(&shown, widths) > available {
        let widest = shown
            .iter()
            .copied()
            .filter(|&c| widths[c] > MIN_COLUMN_WIDTH)
            .max_by_key(|&c| widths[c]);
        match widest {
            Some(c) => widths[c] -= 1,
            None => break,
        }
    }

    shown
}

/// Greedy word wrap; words longer than `width` are split.
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split(' ') {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if display_width(&candidate) <= width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if display_width(word) <= width {
            current = word.to_string();
        } else {
            let mut pieces = wrap_hard(word, width);
            current = pieces.pop().unwrap_or_default();
            lines.extend(pieces);
        }
    }
    lines.push(current);
    lines
}

/// Split every `width` columns regardless of word boundaries.
pub fn wrap_hard(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = display_width(ch.encode_utf8(&mut [0; 4]));
        if used + w > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push(ch);
        used += w;
    }
    lines.push(current);
    lines
}
