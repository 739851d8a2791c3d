//! Rich-text paragraph flow for terminal user interfaces.
//!
//! A [`Paragraph`] holds an ordered run of segments (plain text, hyperlinks
//! and explicit breaks) and lays them out into word-wrapped rows of terminal
//! cells. A [`TextFlow`] stacks paragraphs vertically and adds scrolling,
//! selection and link focus on top.

pub mod document;
pub mod flow;
pub mod locator;
pub mod paragraph;
pub mod resources;
pub mod segment;
pub mod selection;
pub mod theme;

pub use document::{flow_from_document, flow_from_text};
pub use flow::{FlowOptions, TextFlow};
pub use locator::Locator;
pub use paragraph::Paragraph;
pub use resources::{Font, ResourceCache};
pub use segment::{
    AreaRect, BreakSegment, HyperlinkSegment, ParagraphSegment, Segment, SegmentId, TextSegment,
};
pub use selection::SelectionData;
pub use theme::{HyperlinkSettings, Theme, UnderlineMode};
