use std::rc::Rc;

use ratatui::{buffer::Buffer, layout::Rect};

use crate::locator::Locator;
use crate::resources::ResourceCache;
use crate::segment::{
    BreakSegment, HyperlinkSegment, ParagraphSegment, Segment, SegmentId, TextSegment,
};
use crate::selection::SelectionData;
use crate::theme::HyperlinkSettings;

/// Marker that starts an auto-detected link.
pub const HTTP: &str = "http://";

/// An ordered run of segments laid out as one block of wrapped rows.
///
/// Segment order is reading order. Any change to the segments must be
/// followed by a fresh [`Paragraph::layout`] before painting.
#[derive(Debug, Default)]
pub struct Paragraph {
    segments: Vec<Segment>,
    add_vertical_space: bool,
    indent: u16,
    bullet: Option<String>,
    height: u16,
}

impl Paragraph {
    pub fn new(add_vertical_space: bool) -> Self {
        Self {
            add_vertical_space,
            ..Self::default()
        }
    }

    /// Indent every row by `indent` cells and draw `bullet` in front of the
    /// first row, right-aligned against the indent.
    pub fn with_bullet(mut self, bullet: impl Into<String>, indent: u16) -> Self {
        self.bullet = Some(bullet.into());
        self.indent = indent;
        self
    }

    pub fn with_indent(mut self, indent: u16) -> Self {
        self.indent = indent;
        self
    }

    /// Whether the host should leave a blank row after this paragraph.
    pub fn add_vertical_space(&self) -> bool {
        self.add_vertical_space
    }

    pub fn set_add_vertical_space(&mut self, add_vertical_space: bool) {
        self.add_vertical_space = add_vertical_space;
    }

    pub fn indent(&self) -> u16 {
        self.indent
    }

    pub fn bullet(&self) -> Option<&str> {
        self.bullet.as_deref()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Height computed by the last layout pass.
    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn append_segment(&mut self, segment: impl Into<Segment>) -> SegmentId {
        let segment = segment.into();
        let id = segment.id();
        self.segments.push(segment);
        id
    }

    pub fn append_break(&mut self) -> SegmentId {
        self.append_segment(BreakSegment::new())
    }

    /// Add `text` as segments, optionally turning every `http://` run into a link.
    ///
    /// A link extends from the marker up to the next Unicode space character
    /// (see [`is_space_char`]), or to the end of the text. Its target is the
    /// matched text itself. Empty text adds nothing, and no zero-length text
    /// segments are created between adjacent markers.
    pub fn ingest_text(
        &mut self,
        text: &str,
        expand_urls: bool,
        settings: &Rc<HyperlinkSettings>,
        font_id: Option<&str>,
        color_id: Option<&str>,
    ) {
        if text.is_empty() {
            return;
        }
        if !expand_urls {
            self.append_segment(TextSegment::new(text, font_id, color_id));
            return;
        }

        let before = self.segments.len();
        let mut cut = 0;
        while let Some(found) = text[cut..].find(HTTP) {
            let start = cut + found;
            self.append_text(&text[cut..start], font_id, color_id);
            match text[start..].find(is_space_char) {
                Some(offset) => {
                    let end = start + offset;
                    self.append_hyperlink(&text[start..end], settings, font_id);
                    cut = end;
                }
                None => {
                    self.append_hyperlink(&text[start..], settings, font_id);
                    cut = text.len();
                    break;
                }
            }
        }
        self.append_text(&text[cut..], font_id, color_id);
        log::debug!(
            "ingested {} bytes into {} segments",
            text.len(),
            self.segments.len() - before
        );
    }

    fn append_text(&mut self, text: &str, font_id: Option<&str>, color_id: Option<&str>) {
        if !text.is_empty() {
            self.append_segment(TextSegment::new(text, font_id, color_id));
        }
    }

    fn append_hyperlink(
        &mut self,
        text: &str,
        settings: &Rc<HyperlinkSettings>,
        font_id: Option<&str>,
    ) {
        self.append_segment(HyperlinkSegment::new(text, Rc::clone(settings), font_id));
    }

    /// Measure every segment on a child cursor and hand the per-row heights
    /// back to `loc`, rewound to the first row.
    pub fn compute_row_heights(
        &mut self,
        width: u16,
        loc: &mut Locator,
        resources: &ResourceCache,
    ) {
        let mut child = loc.create_child();
        for segment in &mut self.segments {
            segment.measure(width, &mut child, resources, true);
        }
        child.collect_heights();
        log::trace!("row heights at width {width}: {:?}", child.heights);
        loc.adopt_heights(child);
    }

    /// Lay the paragraph out at `width`, starting at the cursor position, and
    /// return its height. The cursor ends below the paragraph.
    pub fn layout(
        &mut self,
        width: u16,
        loc: &mut Locator,
        line_height: u16,
        resources: &ResourceCache,
        selected: Option<SegmentId>,
    ) -> u16 {
        let start_y = loc.y;
        if self.segments.is_empty() {
            loc.y = loc.y.saturating_add(line_height);
            self.height = line_height;
            return self.height;
        }

        if self.segments[0].is_wrappable_text() {
            loc.inset(1);
        }
        if !loc.has_heights() {
            self.compute_row_heights(width, loc, resources);
        }
        for segment in &mut self.segments {
            let is_selected = selected == Some(segment.id());
            segment.layout(width, loc, resources, is_selected);
        }
        loc.clear_heights();
        loc.y = loc.y.saturating_add(loc.row_height);
        self.height = loc.y.saturating_sub(start_y);
        self.height
    }

    /// Paint the segments that intersect `region`.
    pub fn paint(
        &self,
        buf: &mut Buffer,
        region: Rect,
        resources: &ResourceCache,
        selected: Option<SegmentId>,
        selection: Option<&SelectionData>,
    ) {
        for segment in &self.segments {
            if !segment.intersects(region) {
                continue;
            }
            let is_selected = selected == Some(segment.id());
            segment.paint(buf, resources, is_selected, selection, Some(region));
        }
    }

    /// Run the selection pass over every segment, visible or not.
    pub fn compute_selection(
        &self,
        resources: &ResourceCache,
        selected: Option<SegmentId>,
        selection: &mut SelectionData,
    ) {
        for segment in &self.segments {
            if selected == Some(segment.id()) {
                log::trace!("selection pass over selected segment {:?}", segment.id());
            }
            segment.compute_selection(resources, selection);
        }
    }

    /// The first segment, in insertion order, containing the point.
    pub fn find_segment_at(&self, x: u16, y: u16) -> Option<&Segment> {
        self.segments.iter().find(|segment| segment.contains(x, y))
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|segment| segment.id() == id)
    }

    pub fn hyperlinks(&self) -> impl Iterator<Item = &HyperlinkSegment> + '_ {
        self.segments.iter().filter_map(Segment::as_hyperlink)
    }

    /// Text of every text-capable segment followed by a line terminator.
    pub fn extract_plain_text(&self) -> String {
        let mut text: String = self.segments.iter().filter_map(Segment::text).collect();
        text.push('\n');
        text
    }

    pub fn clear_cache(&mut self, font_id: Option<&str>) {
        for segment in &mut self.segments {
            segment.clear_cache(font_id);
        }
    }
}

/// Unicode space separators plus the line and paragraph separators.
///
/// Control characters such as tab or newline are not spaces and do not end
/// a link.
pub fn is_space_char(ch: char) -> bool {
    match ch {
        '\u{2028}' | '\u{2029}' => true,
        '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r' | '\u{85}' => false,
        _ => ch.is_whitespace(),
    }
}

#[cfg(test)]
#[path = "paragraph_tests.rs"]
mod paragraph_tests;
