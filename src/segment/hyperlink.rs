use std::rc::Rc;

use ratatui::{buffer::Buffer, layout::Rect};

use super::{ParagraphSegment, SegmentId, TextSegment};
use crate::locator::Locator;
use crate::resources::ResourceCache;
use crate::selection::SelectionData;
use crate::theme::HyperlinkSettings;

/// A text run that points somewhere. Links are never broken across rows.
#[derive(Debug)]
pub struct HyperlinkSegment {
    text: TextSegment,
    href: String,
    tooltip: Option<String>,
    settings: Rc<HyperlinkSettings>,
}

impl HyperlinkSegment {
    /// Create a link whose target is its own text.
    pub fn new(
        text: impl Into<String>,
        settings: Rc<HyperlinkSettings>,
        font_id: Option<&str>,
    ) -> Self {
        let text = text.into();
        let href = text.clone();
        let mut segment = TextSegment::new(text, font_id, None);
        segment.set_wrap_allowed(false);
        Self {
            text: segment,
            href,
            tooltip: None,
            settings,
        }
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = href.into();
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    pub fn settings(&self) -> &HyperlinkSettings {
        &self.settings
    }

    pub fn text(&self) -> &str {
        self.text.text()
    }

    pub fn text_segment(&self) -> &TextSegment {
        &self.text
    }
}

impl ParagraphSegment for HyperlinkSegment {
    fn id(&self) -> SegmentId {
        self.text.id()
    }

    fn measure(&mut self, width: u16, loc: &mut Locator, resources: &ResourceCache, dry_run: bool) {
        self.text.measure(width, loc, resources, dry_run);
    }

    fn layout(&mut self, width: u16, loc: &mut Locator, resources: &ResourceCache, selected: bool) {
        self.text.layout(width, loc, resources, selected);
    }

    fn paint(
        &self,
        buf: &mut Buffer,
        resources: &ResourceCache,
        selected: bool,
        selection: Option<&SelectionData>,
        clip: Option<Rect>,
    ) {
        if clip.is_some_and(|clip| !self.intersects(clip)) {
            return;
        }
        let style = self
            .text
            .font(resources)
            .style
            .patch(self.settings.link_style(selected));
        self.text.paint_areas(buf, style, selection, clip);
    }

    fn compute_selection(&self, resources: &ResourceCache, selection: &mut SelectionData) {
        self.text.compute_selection(resources, selection);
    }

    fn contains(&self, x: u16, y: u16) -> bool {
        self.text.contains(x, y)
    }

    fn intersects(&self, rect: Rect) -> bool {
        self.text.intersects(rect)
    }

    fn bounds(&self) -> Vec<Rect> {
        self.text.bounds()
    }

    fn clear_cache(&mut self, font_id: Option<&str>) {
        self.text.clear_cache(font_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn link_targets_its_text_and_never_wraps() {
        let link = HyperlinkSegment::new("http://example.com", Rc::default(), None);
        assert_eq!(link.href(), "http://example.com");
        assert!(!link.text_segment().wrap_allowed());
    }

    #[test]
    fn stays_whole_when_narrower_than_itself() {
        let resources = ResourceCache::default();
        let mut link = HyperlinkSegment::new("http://example.com/long", Rc::default(), None);
        let mut loc = Locator::new(0, 0);
        loc.advance(3);
        loc.extend_row(1);
        link.layout(8, &mut loc, &resources, false);
        assert_eq!(link.bounds(), vec![Rect::new(0, 1, 23, 1)]);
    }

    #[test]
    fn paints_with_link_colors() {
        let resources = ResourceCache::default();
        let settings = Rc::new(HyperlinkSettings {
            foreground: Color::Green,
            ..HyperlinkSettings::default()
        });
        let mut link = HyperlinkSegment::new("http://x", settings, None).with_tooltip("Open x");
        let mut loc = Locator::new(0, 0);
        link.layout(80, &mut loc, &resources, false);

        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 1));
        link.paint(&mut buf, &resources, false, None, None);
        assert_eq!(buf[(0, 0)].symbol(), "h");
        assert_eq!(buf[(0, 0)].fg, Color::Green);
        assert_eq!(link.tooltip(), Some("Open x"));

        link.paint(&mut buf, &resources, true, None, None);
        assert_eq!(buf[(0, 0)].fg, HyperlinkSettings::default().active_foreground);
    }
}
