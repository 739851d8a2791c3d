use ratatui::style::{Color, Modifier, Style};

/// When hyperlinks are drawn underlined
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnderlineMode {
    Never,
    /// Only the active (focused or hovered) link
    Hover,
    #[default]
    Always,
}

/// Presentation policy for hyperlinks, shared by every link segment of a flow
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HyperlinkSettings {
    /// Foreground color for links
    pub foreground: Color,

    /// Foreground color for the active link
    pub active_foreground: Color,

    /// Background color for the active link
    pub active_background: Color,

    pub underline: UnderlineMode,
}

impl Default for HyperlinkSettings {
    fn default() -> Self {
        Self {
            foreground: Color::Blue,
            active_foreground: Color::White,
            active_background: Color::Blue,
            underline: UnderlineMode::default(),
        }
    }
}

impl HyperlinkSettings {
    /// Get the style for a link, given whether it is the active one
    pub fn link_style(&self, active: bool) -> Style {
        let style = if active {
            Style::default()
                .fg(self.active_foreground)
                .bg(self.active_background)
        } else {
            Style::default().fg(self.foreground)
        };
        let underline = match self.underline {
            UnderlineMode::Never => false,
            UnderlineMode::Hover => active,
            UnderlineMode::Always => true,
        };
        if underline {
            style.add_modifier(Modifier::UNDERLINED)
        } else {
            style
        }
    }
}

/// Theme configuration for a text flow
#[derive(Clone, Debug)]
pub struct Theme {
    /// Background color for the flow
    pub background: Color,

    /// Default text color
    pub foreground: Color,

    /// Foreground color for active selection
    pub selection_fg: Color,

    /// Background color for active selection
    pub selection_bg: Color,

    /// Color for links
    pub link_color: Color,

    /// Foreground color for the focused link
    pub active_link_fg: Color,

    /// Background color for the focused link
    pub active_link_bg: Color,

    pub link_underline: UnderlineMode,

    /// Foreground (text) color for the status bar
    pub status_bar_fg: Color,

    /// Background color for the status bar
    pub status_bar_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Reset,
            foreground: Color::Reset,
            selection_fg: Color::White,
            selection_bg: Color::LightBlue,
            link_color: Color::Blue,
            active_link_fg: Color::White,
            active_link_bg: Color::Blue,
            link_underline: UnderlineMode::Always,
            status_bar_fg: Color::White,
            status_bar_bg: Color::Blue,
        }
    }
}

impl Theme {
    /// Create a new theme with default colors
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the base style for text and the flow background
    pub fn base_style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    /// Get the style for selected text
    pub fn selection_style(&self) -> Style {
        Style::default().fg(self.selection_fg).bg(self.selection_bg)
    }

    /// Get the style for the status bar
    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .fg(self.status_bar_fg)
            .bg(self.status_bar_bg)
    }

    /// Derive the hyperlink settings from this theme
    pub fn hyperlink_settings(&self) -> HyperlinkSettings {
        HyperlinkSettings {
            foreground: self.link_color,
            active_foreground: self.active_link_fg,
            active_background: self.active_link_bg,
            underline: self.link_underline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_underline_only_applies_to_active_link() {
        let settings = HyperlinkSettings {
            underline: UnderlineMode::Hover,
            ..HyperlinkSettings::default()
        };
        assert!(!settings.link_style(false).add_modifier.contains(Modifier::UNDERLINED));
        assert!(settings.link_style(true).add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn theme_feeds_hyperlink_settings() {
        let theme = Theme {
            link_color: Color::Green,
            ..Theme::default()
        };
        let settings = theme.hyperlink_settings();
        assert_eq!(settings.foreground, Color::Green);
        assert_eq!(settings.link_style(false).fg, Some(Color::Green));
    }
}
