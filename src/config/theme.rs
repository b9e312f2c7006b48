use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

use crate::render::Tone;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
    pub focus: FocusStyle,
    pub feed: FeedStyle,
    pub notifications: NotificationStyle,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
            focus: FocusStyle::default(),
            feed: FeedStyle::default(),
            notifications: NotificationStyle::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeColors {
    pub background: HexColor,
    pub foreground: HexColor,
    pub primary: HexColor,
    pub secondary: HexColor,
    pub accent: HexColor,
    pub success: HexColor,
    pub warning: HexColor,
    pub error: HexColor,
    pub info: HexColor,
    pub notice: HexColor,
    pub muted: HexColor,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            background: HexColor::new("#1a1b26"),
            foreground: HexColor::new("#c0caf5"),
            primary: HexColor::new("#7aa2f7"),
            secondary: HexColor::new("#9ece6a"),
            accent: HexColor::new("#bb9af7"),
            success: HexColor::new("#9ece6a"),
            warning: HexColor::new("#e0af68"),
            error: HexColor::new("#f7768e"),
            info: HexColor::new("#7dcfff"),
            notice: HexColor::new("#ff9e64"),
            muted: HexColor::new("#565f89"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusStyle {
    pub focused_border: HexColor,
    pub unfocused_border: HexColor,
    pub focused_title: HexColor,
    pub unfocused_title: HexColor,
    pub use_bold_focused: bool,
}

impl Default for FocusStyle {
    fn default() -> Self {
        Self {
            focused_border: HexColor::new("#7aa2f7"),
            unfocused_border: HexColor::new("#3b4261"),
            focused_title: HexColor::new("#bb9af7"),
            unfocused_title: HexColor::new("#565f89"),
            use_bold_focused: true,
        }
    }
}

/// Colours of the chat feed itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedStyle {
    pub user_fg: HexColor,
    pub header_fg: HexColor,
    pub code_fg: HexColor,
    pub code_bg: HexColor,
    pub selected_bg: HexColor,
    pub selected_fg: HexColor,
    pub disabled_fg: HexColor,
}

impl Default for FeedStyle {
    fn default() -> Self {
        Self {
            user_fg: HexColor::new("#7dcfff"),
            header_fg: HexColor::new("#7aa2f7"),
            code_fg: HexColor::new("#a9b1d6"),
            code_bg: HexColor::new("#24283b"),
            selected_bg: HexColor::new("#364a82"),
            selected_fg: HexColor::new("#c0caf5"),
            disabled_fg: HexColor::new("#3b4261"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationStyle {
    pub info_fg: HexColor,
    pub info_bg: HexColor,
    pub success_fg: HexColor,
    pub success_bg: HexColor,
    pub error_fg: HexColor,
    pub error_bg: HexColor,
}

impl Default for NotificationStyle {
    fn default() -> Self {
        Self {
            info_fg: HexColor::new("#c0caf5"),
            info_bg: HexColor::new("#24283b"),
            success_fg: HexColor::new("#1a1b26"),
            success_bg: HexColor::new("#9ece6a"),
            error_fg: HexColor::new("#c0caf5"),
            error_bg: HexColor::new("#f7768e"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HexColor(String);

impl HexColor {
    pub fn new(hex: &str) -> Self {
        Self(hex.to_string())
    }

    pub fn to_color(&self) -> Color {
        self.parse_hex().unwrap_or(Color::Reset)
    }

    fn parse_hex(&self) -> Option<Color> {
        let hex = self.0.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Color::Rgb(r, g, b))
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self("#ffffff".to_string())
    }
}

impl Theme {
    pub fn border_style(&self, focused: bool) -> Style {
        let color = if focused {
            self.focus.focused_border.to_color()
        } else {
            self.focus.unfocused_border.to_color()
        };

        let mut style = Style::default().fg(color);
        if focused && self.focus.use_bold_focused {
            style = style.add_modifier(Modifier::BOLD);
        }
        style
    }

    pub fn title_style(&self, focused: bool) -> Style {
        let color = if focused {
            self.focus.focused_title.to_color()
        } else {
            self.focus.unfocused_title.to_color()
        };

        let mut style = Style::default().fg(color);
        if focused && self.focus.use_bold_focused {
            style = style.add_modifier(Modifier::BOLD);
        }
        style
    }

    pub fn selection_style(&self) -> Style {
        Style::default()
            .fg(self.feed.selected_fg.to_color())
            .bg(self.feed.selected_bg.to_color())
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.colors.foreground.to_color())
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.colors.muted.to_color())
    }

    pub fn tone_color(&self, tone: Tone) -> Color {
        let colors = &self.colors;
        match tone {
            Tone::Neutral => colors.foreground.to_color(),
            Tone::Brand => colors.primary.to_color(),
            Tone::Success => colors.success.to_color(),
            Tone::Warning => colors.warning.to_color(),
            Tone::Danger => colors.error.to_color(),
            Tone::Info => colors.info.to_color(),
            Tone::Notice => colors.notice.to_color(),
            Tone::Muted => colors.muted.to_color(),
        }
    }

    pub fn tone_style(&self, tone: Tone) -> Style {
        Style::default().fg(self.tone_color(tone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color_parsing() {
        assert_eq!(HexColor::new("#ff0000").to_color(), Color::Rgb(255, 0, 0));
        assert_eq!(HexColor::new("00ff00").to_color(), Color::Rgb(0, 255, 0));
        assert_eq!(HexColor::new("#fff").to_color(), Color::Reset);
        assert_eq!(HexColor::new("#zzzzzz").to_color(), Color::Reset);
    }

    #[test]
    fn test_tone_colors() {
        let theme = Theme::default();
        assert_eq!(theme.tone_color(Tone::Danger), theme.colors.error.to_color());
        assert_eq!(theme.tone_color(Tone::Muted), theme.colors.muted.to_color());
        assert_ne!(theme.tone_color(Tone::Success), theme.tone_color(Tone::Warning));
    }

    #[test]
    fn test_partial_theme_toml() {
        let theme: Theme = toml::from_str("[colors]\nerror = \"#ff0000\"").unwrap();
        assert_eq!(theme.colors.error.to_color(), Color::Rgb(255, 0, 0));
        assert_eq!(theme.colors.success.to_color(), Color::Rgb(0x9e, 0xce, 0x6a));
    }
}
