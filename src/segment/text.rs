use std::ops::Range;

use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::Style,
};

use super::{ParagraphSegment, SegmentId, append_char, put_char};
use crate::locator::Locator;
use crate::resources::{Font, ResourceCache, char_width};
use crate::selection::SelectionData;

/// One row's worth of a laid out text segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AreaRect {
    /// Cells covered on screen.
    pub rect: Rect,
    /// Byte range of the segment text drawn in `rect`.
    pub range: Range<usize>,
    /// Top of the row the area sits in; `rect.y` may be lower when centered.
    pub row_y: u16,
}

/// A word plus its trailing whitespace: the unit text wraps by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TextFragment {
    start: usize,
    end: usize,
    width: u16,
    /// Width without the trailing whitespace, used for the fit test.
    visible_width: u16,
}

/// A plain styled run of text.
#[derive(Debug)]
pub struct TextSegment {
    id: SegmentId,
    text: String,
    font_id: Option<String>,
    color_id: Option<String>,
    wrap_allowed: bool,
    fragments: Option<Vec<TextFragment>>,
    areas: Vec<AreaRect>,
}

impl TextSegment {
    pub fn new(text: impl Into<String>, font_id: Option<&str>, color_id: Option<&str>) -> Self {
        Self {
            id: SegmentId::next(),
            text: text.into(),
            font_id: font_id.map(str::to_string),
            color_id: color_id.map(str::to_string),
            wrap_allowed: true,
            fragments: None,
            areas: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font_id(&self) -> Option<&str> {
        self.font_id.as_deref()
    }

    pub fn color_id(&self) -> Option<&str> {
        self.color_id.as_deref()
    }

    pub fn wrap_allowed(&self) -> bool {
        self.wrap_allowed
    }

    pub fn set_wrap_allowed(&mut self, wrap_allowed: bool) {
        self.wrap_allowed = wrap_allowed;
    }

    pub fn areas(&self) -> &[AreaRect] {
        &self.areas
    }

    pub(crate) fn font(&self, resources: &ResourceCache) -> Font {
        resources.font(self.font_id.as_deref())
    }

    fn fragments(&mut self, font: &Font) -> &[TextFragment] {
        let text = &self.text;
        self.fragments
            .get_or_insert_with(|| split_fragments(text, font))
            .as_slice()
    }

    /// Shared walk of the measurement and layout passes. Areas are only
    /// recorded when `record` is set.
    fn advance(
        &mut self,
        width: u16,
        loc: &mut Locator,
        resources: &ResourceCache,
        dry_run: bool,
        record: bool,
    ) {
        let font = self.font(resources);
        let line_height = font.line_height;
        if record {
            self.areas.clear();
        }

        if !self.wrap_allowed {
            let extent = font.text_width(&self.text);
            if loc.x.saturating_add(extent) > width && !loc.at_row_start() {
                loc.break_row(dry_run);
            }
            if record {
                self.areas.push(AreaRect {
                    rect: Rect::new(loc.x, loc.middle(line_height), extent, line_height),
                    range: 0..self.text.len(),
                    row_y: loc.y,
                });
            }
            loc.advance(extent);
            loc.extend_row(line_height);
            return;
        }

        let fragments = self.fragments(&font).to_vec();
        let mut areas = Vec::new();
        let mut line_extent: u16 = 0;
        let mut run_start = 0;
        let mut placed = false;
        for fragment in &fragments {
            let fits = loc
                .x
                .saturating_add(line_extent)
                .saturating_add(fragment.visible_width)
                <= width;
            if !fits && (placed || !loc.at_row_start()) {
                if placed {
                    if record {
                        let top = loc.middle(line_height);
                        areas.push(AreaRect {
                            rect: Rect::new(loc.x, top, line_extent, line_height),
                            range: run_start..fragment.start,
                            row_y: loc.y,
                        });
                    }
                    loc.advance(line_extent);
                    loc.extend_row(line_height);
                }
                loc.break_row(dry_run);
                line_extent = 0;
                placed = false;
            }
            if !placed {
                run_start = fragment.start;
            }
            line_extent = line_extent.saturating_add(fragment.width);
            placed = true;
        }
        if placed {
            if record {
                areas.push(AreaRect {
                    rect: Rect::new(loc.x, loc.middle(line_height), line_extent, line_height),
                    range: run_start..self.text.len(),
                    row_y: loc.y,
                });
            }
            loc.advance(line_extent);
            loc.extend_row(line_height);
        }
        if record {
            self.areas = areas;
        }
    }

    /// Draw every laid out area with `style`, patching in the selection style
    /// for selected cells.
    pub(crate) fn paint_areas(
        &self,
        buf: &mut Buffer,
        style: Style,
        selection: Option<&SelectionData>,
        clip: Option<Rect>,
    ) {
        for area in &self.areas {
            if clip.is_some_and(|clip| !area.rect.intersects(clip)) {
                continue;
            }
            let highlight = selection.and_then(|selection| {
                selection
                    .selected_columns(area.rect)
                    .map(|columns| (columns, selection.style()))
            });
            let mut x = area.rect.x;
            let mut previous = None;
            for ch in self.text[area.range.clone()].chars() {
                let cells = u16::try_from(char_width(ch)).unwrap_or(0);
                if cells == 0 {
                    // Combining marks join the cell before them.
                    if let Some(previous) = previous {
                        append_char(buf, previous, area.rect.y, ch, clip);
                    }
                    continue;
                }
                let cell_style = match &highlight {
                    Some((columns, selected)) if columns.contains(&x) => style.patch(*selected),
                    _ => style,
                };
                put_char(buf, x, area.rect.y, ch, cells, cell_style, clip);
                previous = Some(x);
                x = x.saturating_add(cells);
            }
        }
    }
}

/// Split `text` into words, each carrying the whitespace that follows it.
/// Leading whitespace becomes a fragment of its own with no visible width.
fn split_fragments(text: &str, font: &Font) -> Vec<TextFragment> {
    let mut fragments = Vec::new();
    let mut start = 0;
    let mut in_trailing_space = false;
    let mut push = |start: usize, end: usize| {
        let slice = &text[start..end];
        fragments.push(TextFragment {
            start,
            end,
            width: font.text_width(slice),
            visible_width: font.text_width(slice.trim_end()),
        });
    };
    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            in_trailing_space = true;
        } else if in_trailing_space {
            push(start, idx);
            start = idx;
            in_trailing_space = false;
        }
    }
    if start < text.len() {
        push(start, text.len());
    }
    fragments
}

impl ParagraphSegment for TextSegment {
    fn id(&self) -> SegmentId {
        self.id
    }

    fn measure(&mut self, width: u16, loc: &mut Locator, resources: &ResourceCache, dry_run: bool) {
        self.advance(width, loc, resources, dry_run, false);
    }

    fn layout(
        &mut self,
        width: u16,
        loc: &mut Locator,
        resources: &ResourceCache,
        _selected: bool,
    ) {
        self.advance(width, loc, resources, false, true);
    }

    fn paint(
        &self,
        buf: &mut Buffer,
        resources: &ResourceCache,
        _selected: bool,
        selection: Option<&SelectionData>,
        clip: Option<Rect>,
    ) {
        if clip.is_some_and(|clip| !self.intersects(clip)) {
            return;
        }
        let mut style = self.font(resources).style;
        if let Some(color) = resources.color(self.color_id.as_deref()) {
            style = style.fg(color);
        }
        self.paint_areas(buf, style, selection, clip);
    }

    fn compute_selection(&self, _resources: &ResourceCache, selection: &mut SelectionData) {
        for area in &self.areas {
            let Some(columns) = selection.selected_columns(area.rect) else {
                continue;
            };
            let mut x = area.rect.x;
            let mut selected: Option<Range<usize>> = None;
            for (offset, ch) in self.text[area.range.clone()].char_indices() {
                let idx = area.range.start + offset;
                if columns.contains(&x) {
                    let end = idx + ch.len_utf8();
                    selected = Some(match selected {
                        Some(range) => range.start..end,
                        None => idx..end,
                    });
                }
                x = x.saturating_add(u16::try_from(char_width(ch)).unwrap_or(0));
            }
            if let Some(range) = selected {
                log::trace!("segment {:?} selected bytes {:?}", self.id, range);
                selection.add_text(area.row_y, &self.text[range]);
            }
        }
    }

    fn contains(&self, x: u16, y: u16) -> bool {
        let position = Position::new(x, y);
        self.areas.iter().any(|area| area.rect.contains(position))
    }

    fn intersects(&self, rect: Rect) -> bool {
        self.areas.iter().any(|area| area.rect.intersects(rect))
    }

    fn bounds(&self) -> Vec<Rect> {
        self.areas.iter().map(|area| area.rect).collect()
    }

    fn clear_cache(&mut self, font_id: Option<&str>) {
        let affected = match font_id {
            None => true,
            Some(id) => self.font_id.as_deref() == Some(id),
        };
        if affected {
            self.fragments = None;
            self.areas.clear();
        }
    }
}
