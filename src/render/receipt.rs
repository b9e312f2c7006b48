//! Action receipt styling.
//!
//! The icon follows the action and the border follows the status string; the
//! two lookups are independent, so an unknown action can still get a coloured
//! border and vice versa.

use crate::api::ActionReceipt;
use crate::util::strip_ansi;

use super::fragment::{Fragment, Icon, ReceiptView, Tone};

const ACTION_ICONS: &[(&str, Icon)] = &[
    ("Run", Icon::new("▶", Tone::Success)),
    ("Start", Icon::new("▶", Tone::Success)),
    ("Stop", Icon::new("■", Tone::Warning)),
    ("Remove", Icon::new("✖", Tone::Danger)),
    ("Pull", Icon::new("⇩", Tone::Info)),
    ("Prune", Icon::new("✂", Tone::Notice)),
    ("Create", Icon::new("✚", Tone::Brand)),
];

const DEFAULT_ACTION_ICON: Icon = Icon::new("✔", Tone::Muted);

/// Status strings exactly as the command service sends them.
const STATUS_BORDERS: &[(&str, Tone)] = &[
    ("Berhasil Dijalankan", Tone::Success),
    ("Berhasil Dihentikan", Tone::Warning),
    ("Berhasil Dihidupkan", Tone::Success),
    ("Berhasil Dihapus", Tone::Danger),
    ("Berhasil Ditarik", Tone::Info),
    ("Sistem Berhasil Dibersihkan", Tone::Notice),
];

const DEFAULT_STATUS_BORDER: Tone = Tone::Muted;

pub fn action_icon(action: &str) -> Icon {
    ACTION_ICONS
        .iter()
        .find(|(name, _)| *name == action)
        .map(|(_, icon)| *icon)
        .unwrap_or(DEFAULT_ACTION_ICON)
}

pub fn status_border(status: &str) -> Tone {
    STATUS_BORDERS
        .iter()
        .find(|(name, _)| *name == status)
        .map(|(_, tone)| *tone)
        .unwrap_or(DEFAULT_STATUS_BORDER)
}

pub fn receipt_fragment(receipt: &ActionReceipt) -> Fragment {
    let view = ReceiptView {
        action: strip_ansi(&receipt.action),
        status: strip_ansi(&receipt.status),
        resource_type: strip_ansi(&receipt.resource_type),
        resource_name: strip_ansi(&receipt.resource_name),
        details: receipt
            .details
            .iter()
            .map(|d| (strip_ansi(&d.key), strip_ansi(&d.value)))
            .collect(),
        border: status_border(&receipt.status),
    };
    Fragment::receipt(action_icon(&receipt.action), view)
}
