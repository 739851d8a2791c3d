use std::sync::atomic::{AtomicU64, Ordering};

use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::Style,
};

use crate::locator::Locator;
use crate::resources::ResourceCache;
use crate::selection::SelectionData;

mod hyperlink;
mod line_break;
mod text;

pub use hyperlink::HyperlinkSegment;
pub use line_break::BreakSegment;
pub use text::{AreaRect, TextSegment};

/// Identity handle of a segment.
///
/// Segments compare by identity, never by content: two segments holding the
/// same text are still independently selectable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(u64);

impl SegmentId {
    pub(crate) fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The capabilities every paragraph segment provides.
///
/// Layout is two-pass: `measure` runs over all segments of a paragraph on a
/// child cursor to find each row's height, then `layout` runs again on the
/// real cursor and assigns final rectangles. Both passes must make the same
/// row-break decisions.
pub trait ParagraphSegment {
    fn id(&self) -> SegmentId;

    /// Advance `loc` as if the segment were placed. A `dry_run` only collects
    /// row heights on the cursor.
    fn measure(&mut self, width: u16, loc: &mut Locator, resources: &ResourceCache, dry_run: bool);

    /// Assign final bounds using the row heights recorded on `loc`.
    fn layout(&mut self, width: u16, loc: &mut Locator, resources: &ResourceCache, selected: bool);

    /// Draw into `buf`, restricted to `clip` when given.
    fn paint(
        &self,
        buf: &mut Buffer,
        resources: &ResourceCache,
        selected: bool,
        selection: Option<&SelectionData>,
        clip: Option<Rect>,
    );

    /// Append whatever part of this segment lies inside the selection.
    fn compute_selection(&self, resources: &ResourceCache, selection: &mut SelectionData);

    fn contains(&self, x: u16, y: u16) -> bool;

    fn intersects(&self, rect: Rect) -> bool;

    /// Rectangles assigned by the last layout pass, one per occupied row.
    fn bounds(&self) -> Vec<Rect>;

    /// Forget cached measurements tied to `font_id`, or all of them for `None`.
    fn clear_cache(&mut self, font_id: Option<&str>);
}

/// A segment of a paragraph.
#[derive(Debug)]
pub enum Segment {
    Text(TextSegment),
    Hyperlink(HyperlinkSegment),
    Break(BreakSegment),
}

impl Segment {
    /// The text run of text-capable segments (hyperlinks included).
    pub fn text(&self) -> Option<&str> {
        self.as_text_segment().map(TextSegment::text)
    }

    pub fn as_text_segment(&self) -> Option<&TextSegment> {
        match self {
            Segment::Text(segment) => Some(segment),
            Segment::Hyperlink(link) => Some(link.text_segment()),
            Segment::Break(_) => None,
        }
    }

    pub fn as_hyperlink(&self) -> Option<&HyperlinkSegment> {
        match self {
            Segment::Hyperlink(link) => Some(link),
            _ => None,
        }
    }

    /// Whether this is a plain text run that may wrap between words.
    pub fn is_wrappable_text(&self) -> bool {
        matches!(self, Segment::Text(segment) if segment.wrap_allowed())
    }

    fn inner(&self) -> &dyn ParagraphSegment {
        match self {
            Segment::Text(segment) => segment,
            Segment::Hyperlink(segment) => segment,
            Segment::Break(segment) => segment,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ParagraphSegment {
        match self {
            Segment::Text(segment) => segment,
            Segment::Hyperlink(segment) => segment,
            Segment::Break(segment) => segment,
        }
    }
}

impl From<TextSegment> for Segment {
    fn from(segment: TextSegment) -> Self {
        Segment::Text(segment)
    }
}

impl From<HyperlinkSegment> for Segment {
    fn from(segment: HyperlinkSegment) -> Self {
        Segment::Hyperlink(segment)
    }
}

impl From<BreakSegment> for Segment {
    fn from(segment: BreakSegment) -> Self {
        Segment::Break(segment)
    }
}

impl ParagraphSegment for Segment {
    fn id(&self) -> SegmentId {
        self.inner().id()
    }

    fn measure(&mut self, width: u16, loc: &mut Locator, resources: &ResourceCache, dry_run: bool) {
        self.inner_mut().measure(width, loc, resources, dry_run);
    }

    fn layout(&mut self, width: u16, loc: &mut Locator, resources: &ResourceCache, selected: bool) {
        self.inner_mut().layout(width, loc, resources, selected);
    }

    fn paint(
        &self,
        buf: &mut Buffer,
        resources: &ResourceCache,
        selected: bool,
        selection: Option<&SelectionData>,
        clip: Option<Rect>,
    ) {
        self.inner().paint(buf, resources, selected, selection, clip);
    }

    fn compute_selection(&self, resources: &ResourceCache, selection: &mut SelectionData) {
        self.inner().compute_selection(resources, selection);
    }

    fn contains(&self, x: u16, y: u16) -> bool {
        self.inner().contains(x, y)
    }

    fn intersects(&self, rect: Rect) -> bool {
        self.inner().intersects(rect)
    }

    fn bounds(&self) -> Vec<Rect> {
        self.inner().bounds()
    }

    fn clear_cache(&mut self, font_id: Option<&str>) {
        self.inner_mut().clear_cache(font_id);
    }
}

/// Write one character cell, honoring the clip rectangle and the buffer area.
pub(crate) fn put_char(
    buf: &mut Buffer,
    x: u16,
    y: u16,
    ch: char,
    width: u16,
    style: Style,
    clip: Option<Rect>,
) {
    let position = Position::new(x, y);
    if clip.is_some_and(|clip| !clip.contains(position)) {
        return;
    }
    let Some(cell) = buf.cell_mut(position) else {
        return;
    };
    cell.set_char(ch).set_style(style);
    // The cells covered by a wide character must not keep stale content.
    for offset in 1..width {
        if let Some(cell) = buf.cell_mut((x.saturating_add(offset), y)) {
            cell.reset();
        }
    }
}

/// Extend the symbol of an already written cell with a zero-width character.
pub(crate) fn append_char(buf: &mut Buffer, x: u16, y: u16, ch: char, clip: Option<Rect>) {
    let position = Position::new(x, y);
    if clip.is_some_and(|clip| !clip.contains(position)) {
        return;
    }
    if let Some(cell) = buf.cell_mut(position) {
        let symbol = format!("{}{ch}", cell.symbol());
        cell.set_symbol(&symbol);
    }
}
