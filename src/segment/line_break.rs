use ratatui::{buffer::Buffer, layout::Rect};

use super::{ParagraphSegment, SegmentId};
use crate::locator::Locator;
use crate::resources::ResourceCache;
use crate::selection::SelectionData;

/// An explicit row break. An otherwise empty row still gets one line of the
/// default font.
#[derive(Debug)]
pub struct BreakSegment {
    id: SegmentId,
}

impl Default for BreakSegment {
    fn default() -> Self {
        Self::new()
    }
}

impl BreakSegment {
    pub fn new() -> Self {
        Self {
            id: SegmentId::next(),
        }
    }
}

impl ParagraphSegment for BreakSegment {
    fn id(&self) -> SegmentId {
        self.id
    }

    fn measure(
        &mut self,
        _width: u16,
        loc: &mut Locator,
        resources: &ResourceCache,
        dry_run: bool,
    ) {
        if loc.row_height == 0 {
            loc.extend_row(resources.default_font().line_height);
        }
        loc.break_row(dry_run);
    }

    fn layout(
        &mut self,
        width: u16,
        loc: &mut Locator,
        resources: &ResourceCache,
        _selected: bool,
    ) {
        self.measure(width, loc, resources, false);
    }

    fn paint(
        &self,
        _buf: &mut Buffer,
        _resources: &ResourceCache,
        _selected: bool,
        _selection: Option<&SelectionData>,
        _clip: Option<Rect>,
    ) {
    }

    fn compute_selection(&self, _resources: &ResourceCache, _selection: &mut SelectionData) {}

    fn contains(&self, _x: u16, _y: u16) -> bool {
        false
    }

    fn intersects(&self, _rect: Rect) -> bool {
        false
    }

    fn bounds(&self) -> Vec<Rect> {
        Vec::new()
    }

    fn clear_cache(&mut self, _font_id: Option<&str>) {}
}
