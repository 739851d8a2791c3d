use std::collections::HashMap;

use ratatui::style::{Color, Modifier, Style};
use unicode_width::UnicodeWidthChar;

pub const BOLD_FONT: &str = "bold";
pub const ITALIC_FONT: &str = "italic";
pub const BOLD_ITALIC_FONT: &str = "bold-italic";
pub const UNDERLINE_FONT: &str = "underline";
pub const STRIKE_FONT: &str = "strike";
pub const CODE_FONT: &str = "code";
pub const HEADER_FONT: &str = "header";
pub const HIGHLIGHT_COLOR: &str = "highlight";
pub const MUTED_COLOR: &str = "muted";

/// A realized terminal font: the cell style text is drawn with and the number
/// of rows a line of it occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Font {
    pub style: Style,
    pub line_height: u16,
}

impl Default for Font {
    fn default() -> Self {
        Self::new(Style::default())
    }
}

impl Font {
    pub fn new(style: Style) -> Self {
        Self {
            style,
            line_height: 1,
        }
    }

    pub fn with_line_height(mut self, line_height: u16) -> Self {
        self.line_height = line_height.max(1);
        self
    }

    /// Number of cells `text` occupies when drawn with this font.
    pub fn text_width(&self, text: &str) -> u16 {
        let width: usize = text.chars().map(char_width).sum();
        u16::try_from(width).unwrap_or(u16::MAX)
    }
}

pub(crate) fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

/// Host-owned mapping from symbolic font and color ids to terminal resources.
///
/// Segments only hold ids and look them up here on every pass. Unknown font
/// ids fall back to the default font, unknown color ids to no color.
#[derive(Clone, Debug)]
pub struct ResourceCache {
    default_font: Font,
    fonts: HashMap<String, Font>,
    colors: HashMap<String, Color>,
}

impl Default for ResourceCache {
    fn default() -> Self {
        let mut cache = Self::empty();
        let plain = Style::default();
        cache.insert_font(BOLD_FONT, Font::new(plain.add_modifier(Modifier::BOLD)));
        cache.insert_font(ITALIC_FONT, Font::new(plain.add_modifier(Modifier::ITALIC)));
        cache.insert_font(
            BOLD_ITALIC_FONT,
            Font::new(plain.add_modifier(Modifier::BOLD | Modifier::ITALIC)),
        );
        cache.insert_font(
            UNDERLINE_FONT,
            Font::new(plain.add_modifier(Modifier::UNDERLINED)),
        );
        cache.insert_font(
            STRIKE_FONT,
            Font::new(plain.add_modifier(Modifier::CROSSED_OUT)),
        );
        cache.insert_font(CODE_FONT, Font::new(plain.add_modifier(Modifier::DIM)));
        cache.insert_font(
            HEADER_FONT,
            Font::new(plain.add_modifier(Modifier::BOLD | Modifier::UNDERLINED)),
        );
        cache.insert_color(HIGHLIGHT_COLOR, Color::LightYellow);
        cache.insert_color(MUTED_COLOR, Color::DarkGray);
        cache
    }
}

impl ResourceCache {
    /// A cache holding only the default font.
    pub fn empty() -> Self {
        Self {
            default_font: Font::default(),
            fonts: HashMap::new(),
            colors: HashMap::new(),
        }
    }

    pub fn default_font(&self) -> Font {
        self.default_font
    }

    pub fn set_default_font(&mut self, font: Font) {
        self.default_font = font;
    }

    pub fn insert_font(&mut self, id: impl Into<String>, font: Font) -> Option<Font> {
        self.fonts.insert(id.into(), font)
    }

    pub fn insert_color(&mut self, id: impl Into<String>, color: Color) -> Option<Color> {
        self.colors.insert(id.into(), color)
    }

    pub fn font(&self, id: Option<&str>) -> Font {
        id.and_then(|id| self.fonts.get(id))
            .copied()
            .unwrap_or(self.default_font)
    }

    pub fn color(&self, id: Option<&str>) -> Option<Color> {
        id.and_then(|id| self.colors.get(id)).copied()
    }
}
