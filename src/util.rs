//! Text helpers shared by the renderers and the views

use ratatui::text::Span;
use regex::Regex;
use std::sync::LazyLock;

/// CSI, OSC, DCS/SOS/PM/APC and two-byte escapes, plus C0 controls other
/// than tab, newline and carriage return
static ANSI_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\x1b\[[0-9;?]*[A-Za-z]",
        r"|\x1b\][^\x07]*\x07",
        r"|\x1b\][^\x1b]*\x1b\\",
        r"|\x1b[PX^_][^\x1b]*\x1b\\",
        r"|\x1b.",
        r"|[\x00-\x08\x0b\x0c\x0e-\x1f]"
    ))
    .unwrap()
});

/// Strip ANSI escape sequences and control characters from text.
///
/// Server output (container logs above all) is drawn inside the TUI and must
/// not move the cursor or recolour the screen.
pub fn strip_ansi(text: &str) -> String {
    ANSI_REGEX.replace_all(text, "").into_owned()
}

/// Display width in terminal columns.
pub fn display_width(text: &str) -> usize {
    Span::raw(text).width()
}

/// Cut `text` to at most `max` columns, ending with an ellipsis when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if display_width(text) <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let w = display_width(ch.encode_utf8(&mut [0; 4]));
        if width + w + 1 > max {
            break;
        }
        out.push(ch);
        width += w;
    }
    out.push('…');
    out
}

/// Right-align `text` in a field of `width` columns, truncating if needed.
pub fn pad_left(text: &str, width: usize) -> String {
    let text = truncate(text, width);
    let pad = width.saturating_sub(display_width(&text));
    format!("{}{}", " ".repeat(pad), text)
}

/// Left-align `text` in a field of `width` columns, truncating if needed.
pub fn pad_right(text: &str, width: usize) -> String {
    let text = truncate(text, width);
    let pad = width.saturating_sub(display_width(&text));
    format!("{}{}", text, " ".repeat(pad))
}
