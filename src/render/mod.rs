//! Turning command responses into feed fragments.

mod dispatch;
pub mod fragment;
pub mod markdown;
mod receipt;
mod registry;

pub use dispatch::Dispatcher;
pub use fragment::{
    Body, Cell, ColumnHint, Fragment, Header, Icon, ReceiptView, Role, RowAction, RowActionKind,
    RowView, TableBody, TableView, TemplateKey, Tone,
};
pub use markdown::{Block, SpanStyle};
