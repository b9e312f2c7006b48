//! Feed fragments: the detached view models the feed appends and draws.
//!
//! A fragment never carries terminal styling. Colours are expressed as a
//! [`Tone`] and resolved against the theme when the feed is drawn.

use super::markdown::Block;

/// Template a fragment (or one of its table rows) was instantiated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKey {
    BaseMessage,
    Table,
    ContainerRow,
    ImageRow,
    StatsRow,
    LogRow,
    VolumeRow,
    NetworkRow,
    GenericRow,
    ActionReceipt,
    Typing,
}

impl TemplateKey {
    pub fn id(&self) -> &'static str {
        match self {
            TemplateKey::BaseMessage => "base-message",
            TemplateKey::Table => "table",
            TemplateKey::ContainerRow => "container-table-row",
            TemplateKey::ImageRow => "image-table-row",
            TemplateKey::StatsRow => "stats-table-row",
            TemplateKey::LogRow => "log-table-row",
            TemplateKey::VolumeRow => "volume-table-row",
            TemplateKey::NetworkRow => "network-table-row",
            TemplateKey::GenericRow => "generic-table-row",
            TemplateKey::ActionReceipt => "action-receipt",
            TemplateKey::Typing => "typing-indicator",
        }
    }
}

/// Semantic colour slot, mapped onto the theme palette at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tone {
    #[default]
    Neutral,
    Brand,
    Success,
    Warning,
    Danger,
    Info,
    Notice,
    Muted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Icon {
    pub glyph: &'static str,
    pub tone: Tone,
}

impl Icon {
    pub const fn new(glyph: &'static str, tone: Tone) -> Self {
        Self { glyph, tone }
    }

    pub const USER: Icon = Icon::new("◉", Tone::Muted);
    pub const BOT: Icon = Icon::new("🐳", Tone::Brand);
    pub const ERROR: Icon = Icon::new("⚠", Tone::Danger);
    pub const SYSTEM: Icon = Icon::new("ℹ", Tone::Muted);
}

/// Who a bubble belongs to; decides alignment and body colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
    Error,
    System,
}

/// Column placement hint. Secondary and tertiary columns are the first to go
/// when the feed is narrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnHint {
    #[default]
    Primary,
    Secondary,
    Tertiary,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub text: String,
    pub hint: ColumnHint,
}

impl Header {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            hint: ColumnHint::Primary,
        }
    }

    pub fn with_hint(mut self, hint: ColumnHint) -> Self {
        self.hint = hint;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub tone: Tone,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Neutral,
        }
    }

    pub fn toned(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    /// Placeholder for blank values, shown as `-`.
    pub fn or_dash(text: &str) -> Self {
        if text.trim().is_empty() {
            Self::toned("-", Tone::Muted)
        } else {
            Self::new(text)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowActionKind {
    /// Submit a command as if the user had typed it
    Submit(String),
    /// Copy `text` to the clipboard; `label` names what was copied
    Copy { label: String, text: String },
}

/// Declarative button on a table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowAction {
    pub label: &'static str,
    pub enabled: bool,
    pub kind: RowActionKind,
}

impl RowAction {
    pub fn submit(label: &'static str, command: impl Into<String>) -> Self {
        Self {
            label,
            enabled: true,
            kind: RowActionKind::Submit(command.into()),
        }
    }

    pub fn copy(label: &'static str, what: &str, text: impl Into<String>) -> Self {
        Self {
            label,
            enabled: true,
            kind: RowActionKind::Copy {
                label: what.to_string(),
                text: text.into(),
            },
        }
    }

    pub fn enabled_if(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub template: TemplateKey,
    pub cells: Vec<Cell>,
    pub actions: Vec<RowAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody {
    /// Full-width message spanning every column
    Empty(String),
    Rows(Vec<RowView>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub headers: Vec<Header>,
    pub body: TableBody,
}

impl TableView {
    pub fn rows(&self) -> &[RowView] {
        match &self.body {
            TableBody::Rows(rows) => rows,
            TableBody::Empty(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptView {
    pub action: String,
    pub status: String,
    pub resource_type: String,
    pub resource_name: String,
    /// Empty means the details section is left out entirely
    pub details: Vec<(String, String)>,
    pub border: Tone,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Text(String),
    /// Monospace block; inspect dumps carry the inspected object's name
    Preformatted { title: Option<String>, text: String },
    Table(TableView),
    Receipt(ReceiptView),
    Narrative(Vec<Block>),
    Typing,
}

/// One bubble in the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub template: TemplateKey,
    pub role: Role,
    pub icon: Icon,
    pub body: Body,
}

impl Fragment {
    fn message(role: Role, icon: Icon, body: Body) -> Self {
        Self {
            template: TemplateKey::BaseMessage,
            role,
            icon,
            body,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::message(Role::User, Icon::USER, Body::Text(text.into()))
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::message(Role::System, Icon::SYSTEM, Body::Text(text.into()))
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::message(Role::Error, Icon::ERROR, Body::Text(text.into()))
    }

    pub fn output(text: impl Into<String>) -> Self {
        Self::message(
            Role::Bot,
            Icon::BOT,
            Body::Preformatted {
                title: None,
                text: text.into(),
            },
        )
    }

    pub fn inspect(object_name: impl Into<String>, payload: impl Into<String>) -> Self {
        let object_name = object_name.into();
        Self::message(
            Role::Bot,
            Icon::BOT,
            Body::Preformatted {
                title: (!object_name.is_empty()).then_some(object_name),
                text: payload.into(),
            },
        )
    }

    pub fn narrative(blocks: Vec<Block>) -> Self {
        Self::message(Role::Bot, Icon::BOT, Body::Narrative(blocks))
    }

    pub fn table(icon: Icon, view: TableView) -> Self {
        Self {
            template: TemplateKey::Table,
            role: Role::Bot,
            icon,
            body: Body::Table(view),
        }
    }

    pub fn receipt(icon: Icon, view: ReceiptView) -> Self {
        Self {
            template: TemplateKey::ActionReceipt,
            role: Role::Bot,
            icon,
            body: Body::Receipt(view),
        }
    }

    pub fn typing() -> Self {
        Self {
            template: TemplateKey::Typing,
            role: Role::Bot,
            icon: Icon::BOT,
            body: Body::Typing,
        }
    }

    pub fn is_typing(&self) -> bool {
        self.template == TemplateKey::Typing
    }

    #[allow(dead_code)]
    pub fn is_error(&self) -> bool {
        self.role == Role::Error
    }

    /// Plain text of a text-like bubble, for tests and clipboard use.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            Body::Text(text) | Body::Preformatted { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn table_view(&self) -> Option<&TableView> {
        match &self.body {
            Body::Table(view) => Some(view),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_ids_are_unique() {
        let keys = [
            TemplateKey::BaseMessage,
            TemplateKey::Table,
            TemplateKey::ContainerRow,
            TemplateKey::ImageRow,
            TemplateKey::StatsRow,
            TemplateKey::LogRow,
            TemplateKey::VolumeRow,
            TemplateKey::NetworkRow,
            TemplateKey::GenericRow,
            TemplateKey::ActionReceipt,
            TemplateKey::Typing,
        ];
        let ids: std::collections::HashSet<_> = keys.iter().map(|k| k.id()).collect();
        assert_eq!(ids.len(), keys.len());
    }

    #[test]
    fn test_inspect_without_name_has_no_title() {
        let fragment = Fragment::inspect("", "{}");
        assert_eq!(
            fragment.body,
            Body::Preformatted {
                title: None,
                text: "{}".to_string()
            }
        );
    }

    #[test]
    fn test_blank_cells_become_dash() {
        assert_eq!(Cell::or_dash("  ").text, "-");
        assert_eq!(Cell::or_dash("80/tcp").text, "80/tcp");
    }
}
