//! Response dispatcher: one envelope in, exactly one fragment out.

use crate::api::{DecodedResponse, ResponseEnvelope, Row, RowKind, TablePayload};
use crate::util::strip_ansi;

use super::fragment::{Fragment, Icon};
use super::markdown::parse_narrative;
use super::receipt::receipt_fragment;
use super::registry::{generic_table, RendererRegistry};

pub struct Dispatcher {
    registry: RendererRegistry,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(RendererRegistry::with_builtins())
    }
}

impl Dispatcher {
    pub fn new(registry: RendererRegistry) -> Self {
        Self { registry }
    }

    pub fn dispatch(&self, envelope: &ResponseEnvelope) -> Fragment {
        match envelope.decode() {
            DecodedResponse::Error(message) => Fragment::error(strip_ansi(&message)),
            DecodedResponse::Table(TablePayload::Empty(kind)) => self.table(kind, &[]),
            DecodedResponse::Table(TablePayload::Rows(rows)) => self.table(rows.kind(), rows.rows()),
            DecodedResponse::Table(TablePayload::Unrecognized(reason)) => {
                tracing::warn!("Unrecognized table in response to {:?}: {}", envelope.received_command(), reason);
                Fragment::error(format!("Unrecognized table type: {reason}"))
            }
            DecodedResponse::ActionReceipt(receipt) => receipt_fragment(&receipt),
            DecodedResponse::Inspect { object_name, payload } => {
                Fragment::inspect(strip_ansi(&object_name), strip_ansi(&payload))
            }
            DecodedResponse::Text(text) => Fragment::output(strip_ansi(&text)),
            DecodedResponse::AssistantText(text) => Fragment::narrative(parse_narrative(&text)),
            DecodedResponse::AssistantTable(table) => {
                Fragment::table(Icon::BOT, generic_table(&table))
            }
            DecodedResponse::Malformed { output_type, reason } => {
                tracing::warn!("Malformed {} response: {}", output_type, reason);
                Fragment::error(format!("Malformed '{output_type}' response: {reason}"))
            }
            DecodedResponse::Unrecognized(tag) if tag.is_empty() => {
                Fragment::error("Unrecognized output type: response has no output_type")
            }
            DecodedResponse::Unrecognized(tag) => {
                Fragment::error(format!("Unrecognized output type: '{}'", strip_ansi(&tag)))
            }
        }
    }

    fn table(&self, kind: RowKind, rows: &[Row]) -> Fragment {
        match (self.registry.render(kind, rows), self.registry.get(kind)) {
            (Some(view), Some(descriptor)) => Fragment::table(descriptor.icon, view),
            _ => Fragment::error(format!("Unrecognized table type: {}", kind.name())),
        }
    }
}
