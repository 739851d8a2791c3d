use std::rc::Rc;

use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
};

use crate::locator::Locator;
use crate::paragraph::Paragraph;
use crate::resources::{Font, MUTED_COLOR, ResourceCache};
use crate::segment::{HyperlinkSegment, ParagraphSegment, Segment, SegmentId, put_char};
use crate::selection::SelectionData;
use crate::theme::{HyperlinkSettings, Theme};

/// Layout options for a [`TextFlow`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlowOptions {
    /// Empty columns left and right of the text.
    pub margin_width: u16,
    /// Empty rows above and below the text.
    pub margin_height: u16,
    /// Height of an empty paragraph.
    pub line_height: u16,
    /// Blank rows after a paragraph that asks for vertical space.
    pub paragraph_spacing: u16,
    /// Turn `http://` runs into links when adding text.
    pub expand_urls: bool,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            margin_width: 1,
            margin_height: 0,
            line_height: 1,
            paragraph_spacing: 1,
            expand_urls: true,
        }
    }
}

/// A vertical stack of paragraphs with shared resources, a selection and a
/// focused link.
///
/// Coordinates are flow coordinates: `(0, 0)` is the top left corner of the
/// laid out content, independent of where and how far scrolled it is painted.
#[derive(Debug)]
pub struct TextFlow {
    paragraphs: Vec<Paragraph>,
    tops: Vec<u16>,
    resources: ResourceCache,
    theme: Theme,
    link_settings: Rc<HyperlinkSettings>,
    options: FlowOptions,
    selection: Option<SelectionData>,
    focused_link: Option<SegmentId>,
    layout_width: Option<u16>,
    content_width: u16,
    content_height: u16,
}

impl Default for TextFlow {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl TextFlow {
    pub fn new(theme: Theme) -> Self {
        Self::with_options(theme, FlowOptions::default())
    }

    pub fn with_options(theme: Theme, options: FlowOptions) -> Self {
        Self {
            paragraphs: Vec::new(),
            tops: Vec::new(),
            resources: ResourceCache::default(),
            link_settings: Rc::new(theme.hyperlink_settings()),
            theme,
            options,
            selection: None,
            focused_link: None,
            layout_width: None,
            content_width: 0,
            content_height: 0,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn options(&self) -> &FlowOptions {
        &self.options
    }

    pub fn resources(&self) -> &ResourceCache {
        &self.resources
    }

    /// Link settings shared by every link created for this flow.
    pub fn link_settings(&self) -> &Rc<HyperlinkSettings> {
        &self.link_settings
    }

    /// Replace a font and drop every measurement made with it.
    pub fn set_font(&mut self, id: &str, font: Font) {
        self.resources.insert_font(id, font);
        self.clear_font_cache(Some(id));
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraphs_mut(&mut self) -> &mut [Paragraph] {
        self.layout_width = None;
        &mut self.paragraphs
    }

    pub fn push_paragraph(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
        self.layout_width = None;
    }

    /// Append a paragraph holding `text` in the default font.
    pub fn add_text(&mut self, text: &str, add_vertical_space: bool) {
        let mut paragraph = Paragraph::new(add_vertical_space);
        paragraph.ingest_text(text, self.options.expand_urls, &self.link_settings, None, None);
        self.push_paragraph(paragraph);
    }

    /// Plain text of the whole flow, one line per paragraph.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::extract_plain_text)
            .collect()
    }

    pub fn needs_layout(&self, width: u16) -> bool {
        self.layout_width != Some(width)
    }

    pub fn content_width(&self) -> u16 {
        self.content_width
    }

    pub fn content_height(&self) -> u16 {
        self.content_height
    }

    /// Lay out every paragraph for a view `width` cells wide and return the
    /// content height.
    pub fn layout(&mut self, width: u16) -> u16 {
        let FlowOptions {
            margin_width,
            margin_height,
            line_height,
            paragraph_spacing,
            ..
        } = self.options;
        let limit = width.saturating_sub(margin_width);
        let mut loc = Locator::new(margin_width, margin_height);
        let count = self.paragraphs.len();
        self.tops.clear();
        for (idx, paragraph) in self.paragraphs.iter_mut().enumerate() {
            loc.indent = paragraph.indent();
            loc.reset_caret();
            loc.row_height = 0;
            self.tops.push(loc.y);
            paragraph.layout(limit, &mut loc, line_height, &self.resources, self.focused_link);
            if paragraph.add_vertical_space() && idx + 1 < count {
                loc.y = loc.y.saturating_add(paragraph_spacing);
            }
        }
        self.content_width = loc.width.saturating_add(margin_width);
        self.content_height = loc.y.saturating_add(margin_height);
        self.layout_width = Some(width);
        log::debug!(
            "laid out {} paragraphs at width {}: {}x{}",
            count,
            width,
            self.content_width,
            self.content_height
        );
        self.refresh_selection();
        self.content_height
    }

    /// Paint the rows starting at `scroll` into `area` of `buf`.
    ///
    /// Everything is drawn into an off-screen buffer first and copied into
    /// `buf` in one go.
    pub fn paint(&self, buf: &mut Buffer, area: Rect, scroll: u16) {
        let view = Rect::new(0, scroll, area.width, area.height);
        let mut scratch = Buffer::empty(view);
        scratch.set_style(view, self.theme.base_style());
        let selection = self
            .selection
            .as_ref()
            .filter(|selection| selection.is_enclosed());
        for (paragraph, &top) in self.paragraphs.iter().zip(&self.tops) {
            let bottom = top.saturating_add(paragraph.height());
            if bottom <= view.top() || top >= view.bottom() {
                continue;
            }
            self.paint_bullet(&mut scratch, paragraph, top, view);
            paragraph.paint(&mut scratch, view, &self.resources, self.focused_link, selection);
        }
        blit(&scratch, buf, Position::new(area.x, area.y));
    }

    fn paint_bullet(&self, buf: &mut Buffer, paragraph: &Paragraph, top: u16, clip: Rect) {
        let Some(bullet) = paragraph.bullet() else {
            return;
        };
        let font = self.resources.default_font();
        let mut style = font.style;
        if let Some(color) = self.resources.color(Some(MUTED_COLOR)) {
            style = style.fg(color);
        }
        let end = self.options.margin_width.saturating_add(paragraph.indent());
        let mut x = end.saturating_sub(font.text_width(bullet).saturating_add(1));
        for ch in bullet.chars() {
            let cells = font.text_width(ch.encode_utf8(&mut [0; 4]));
            put_char(buf, x, top, ch, cells, style, Some(clip));
            x = x.saturating_add(cells);
        }
    }

    pub fn find_segment_at(&self, x: u16, y: u16) -> Option<&Segment> {
        self.paragraphs
            .iter()
            .find_map(|paragraph| paragraph.find_segment_at(x, y))
    }

    pub fn find_hyperlink_at(&self, x: u16, y: u16) -> Option<&HyperlinkSegment> {
        self.find_segment_at(x, y).and_then(Segment::as_hyperlink)
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.paragraphs
            .iter()
            .find_map(|paragraph| paragraph.segment(id))
    }

    pub fn segment_bounds(&self, id: SegmentId) -> Vec<Rect> {
        self.segment(id)
            .map(ParagraphSegment::bounds)
            .unwrap_or_default()
    }

    /// Begin a new, collapsed selection at a flow position.
    pub fn start_selection(&mut self, x: u16, y: u16) {
        self.selection = Some(SelectionData::new(
            Position::new(x, y),
            self.theme.selection_style(),
        ));
    }

    /// Move the focus end of the current selection.
    pub fn extend_selection(&mut self, x: u16, y: u16) {
        if let Some(selection) = self.selection.as_mut() {
            selection.update(Position::new(x, y));
        }
        self.refresh_selection();
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn selection(&self) -> Option<&SelectionData> {
        self.selection.as_ref()
    }

    pub fn selected_text(&self) -> Option<String> {
        self.selection
            .as_ref()
            .filter(|selection| selection.can_copy())
            .map(SelectionData::selection_text)
    }

    fn refresh_selection(&mut self) {
        let Some(selection) = self.selection.as_mut() else {
            return;
        };
        selection.reset();
        for (paragraph, &top) in self.paragraphs.iter().zip(&self.tops) {
            if paragraph.is_empty() {
                if selection.is_selected_row(top, paragraph.height()) {
                    selection.add_text(top, "");
                }
                continue;
            }
            paragraph.compute_selection(&self.resources, self.focused_link, selection);
        }
    }

    pub fn focused_link(&self) -> Option<&HyperlinkSegment> {
        self.segment(self.focused_link?)?.as_hyperlink()
    }

    pub fn set_focused_link(&mut self, id: Option<SegmentId>) {
        self.focused_link = id;
    }

    /// Focus the next link in reading order, wrapping around at the end.
    pub fn focus_next_link(&mut self) -> Option<&HyperlinkSegment> {
        self.move_link_focus(true)
    }

    /// Focus the previous link in reading order, wrapping around at the start.
    pub fn focus_previous_link(&mut self) -> Option<&HyperlinkSegment> {
        self.move_link_focus(false)
    }

    fn move_link_focus(&mut self, forward: bool) -> Option<&HyperlinkSegment> {
        let links: Vec<SegmentId> = self
            .paragraphs
            .iter()
            .flat_map(|paragraph| paragraph.hyperlinks().map(|link| link.id()))
            .collect();
        if links.is_empty() {
            self.focused_link = None;
            return None;
        }
        let current = self
            .focused_link
            .and_then(|id| links.iter().position(|link| *link == id));
        let next = match (current, forward) {
            (Some(idx), true) => (idx + 1) % links.len(),
            (Some(idx), false) => (idx + links.len() - 1) % links.len(),
            (None, true) => 0,
            (None, false) => links.len() - 1,
        };
        self.focused_link = Some(links[next]);
        self.focused_link()
    }

    /// Forget measurements made with `font_id` (all fonts for `None`); the
    /// next paint needs a fresh layout.
    pub fn clear_font_cache(&mut self, font_id: Option<&str>) {
        log::debug!("clearing font cache for {:?}", font_id);
        for paragraph in &mut self.paragraphs {
            paragraph.clear_cache(font_id);
        }
        self.layout_width = None;
    }
}

/// Copy every cell of `source` into `target`, with the source's top left
/// corner landing on `origin`.
fn blit(source: &Buffer, target: &mut Buffer, origin: Position) {
    let area = source.area;
    for dy in 0..area.height {
        for dx in 0..area.width {
            let Some(cell) = source.cell((area.x + dx, area.y + dy)) else {
                continue;
            };
            let destination = (origin.x.saturating_add(dx), origin.y.saturating_add(dy));
            if let Some(target_cell) = target.cell_mut(destination) {
                *target_cell = cell.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::TextSegment;

    fn flow_of(texts: &[(&str, bool)]) -> TextFlow {
        let mut flow = TextFlow::default();
        for (text, spacing) in texts {
            flow.add_text(text, *spacing);
        }
        flow
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (buf.area.x..buf.area.right())
            .map(|x| buf[(x, y)].symbol())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn paragraphs_stack_with_spacing() {
        let mut flow = flow_of(&[("first", true), ("second", false), ("third", true)]);
        assert!(flow.needs_layout(40));
        let height = flow.layout(40);
        assert_eq!(height, 4);
        assert!(!flow.needs_layout(40));
        assert_eq!(flow.tops, vec![0, 2, 3]);
        assert_eq!(
            flow.paragraphs()[0].segments()[0].bounds(),
            vec![Rect::new(2, 0, 5, 1)]
        );
        assert_eq!(flow.plain_text(), "first\nsecond\nthird\n");
    }

    #[test]
    fn paint_honors_scroll_offset_and_target_area() {
        let mut flow = flow_of(&[("first", true), ("second", false), ("third", true)]);
        flow.layout(20);
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 3));
        flow.paint(&mut buf, Rect::new(0, 1, 20, 2), 2);
        assert_eq!(row_text(&buf, 0), "");
        assert_eq!(row_text(&buf, 1), "  second");
        assert_eq!(row_text(&buf, 2), "  third");
    }

    #[test]
    fn finds_links_across_paragraphs() {
        let mut flow = flow_of(&[("intro", true), ("see http://x.org now", true)]);
        flow.layout(40);
        assert_eq!(flow.find_hyperlink_at(7, 2).map(HyperlinkSegment::href), Some("http://x.org"));
        assert!(flow.find_hyperlink_at(3, 2).is_none());
        assert!(flow.find_segment_at(3, 2).is_some());
        assert!(flow.find_segment_at(3, 1).is_none());
    }

    #[test]
    fn selection_covers_blank_paragraphs() {
        let mut flow = TextFlow::default();
        flow.add_text("alpha", false);
        flow.push_paragraph(Paragraph::new(false));
        flow.add_text("beta", false);
        flow.layout(40);

        flow.start_selection(0, 0);
        assert_eq!(flow.selected_text(), None);
        flow.extend_selection(4, 2);
        assert_eq!(flow.selected_text().as_deref(), Some("alpha\n\nbe"));

        flow.clear_selection();
        assert!(flow.selection().is_none());
    }

    #[test]
    fn selected_cells_use_selection_style() {
        let mut flow = flow_of(&[("hello world", false)]);
        flow.layout(40);
        flow.start_selection(2, 0);
        flow.extend_selection(4, 0);
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 1));
        flow.paint(&mut buf, Rect::new(0, 0, 20, 1), 0);
        let theme = Theme::default();
        assert_eq!(buf[(2, 0)].bg, theme.selection_bg);
        assert_eq!(buf[(3, 0)].bg, theme.selection_bg);
        assert_ne!(buf[(4, 0)].bg, theme.selection_bg);
    }

    #[test]
    fn link_focus_wraps_around() {
        let mut flow = flow_of(&[("a http://one b", true), ("http://two", true)]);
        assert_eq!(flow.focus_next_link().map(HyperlinkSegment::href), Some("http://one"));
        assert_eq!(flow.focus_next_link().map(HyperlinkSegment::href), Some("http://two"));
        assert_eq!(flow.focus_next_link().map(HyperlinkSegment::href), Some("http://one"));
        assert_eq!(flow.focus_previous_link().map(HyperlinkSegment::href), Some("http://two"));

        let mut empty = flow_of(&[("no links here", true)]);
        assert!(empty.focus_next_link().is_none());
        assert!(empty.focused_link().is_none());
    }

    #[test]
    fn bullets_paint_in_front_of_indented_text() {
        let mut flow = TextFlow::default();
        let mut item = Paragraph::new(false).with_bullet("•", 2);
        item.append_segment(TextSegment::new("item", None, None));
        flow.push_paragraph(item);
        flow.layout(20);

        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 1));
        flow.paint(&mut buf, Rect::new(0, 0, 20, 1), 0);
        assert_eq!(buf[(1, 0)].symbol(), "•");
        assert_eq!(row_text(&buf, 0), " •  item");
    }

    #[test]
    fn font_change_invalidates_layout() {
        let mut flow = flow_of(&[("plain", true)]);
        flow.layout(20);
        flow.set_font("bold", Font::default().with_line_height(2));
        assert!(flow.needs_layout(20));
        assert_eq!(**flow.link_settings(), Theme::default().hyperlink_settings());
    }
}
