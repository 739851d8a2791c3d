//! Building flows from plain text and tdoc documents.

use std::rc::Rc;

use tdoc::{ChecklistItem, Document, InlineStyle, Paragraph as DocParagraph, ParagraphType, Span};

use crate::flow::{FlowOptions, TextFlow};
use crate::paragraph::Paragraph;
use crate::resources::{
    BOLD_FONT, BOLD_ITALIC_FONT, CODE_FONT, HEADER_FONT, HIGHLIGHT_COLOR, ITALIC_FONT,
    STRIKE_FONT, UNDERLINE_FONT,
};
use crate::segment::{HyperlinkSegment, TextSegment};
use crate::theme::{HyperlinkSettings, Theme};

const QUOTE_MARKER: &str = "│";
const LIST_MARKER: &str = "•";
const BLOCK_INDENT: u16 = 2;

/// One paragraph per line of `text`. Blank lines become empty paragraphs.
pub fn flow_from_text(text: &str, theme: Theme, options: FlowOptions) -> TextFlow {
    let mut flow = TextFlow::with_options(theme, options);
    for line in text.lines() {
        flow.add_text(line, false);
    }
    flow
}

/// Convert a tdoc document into a flow.
///
/// Every top level block is followed by vertical space. Nested blocks are
/// indented, and list entries, checklist items and quoted blocks get a
/// bullet in front of their first row.
pub fn flow_from_document(document: &Document, theme: Theme, options: FlowOptions) -> TextFlow {
    let mut flow = TextFlow::with_options(theme, options);
    let mut importer = Importer {
        settings: Rc::clone(flow.link_settings()),
        expand_urls: options.expand_urls,
        paragraphs: Vec::new(),
    };
    for block in &document.paragraphs {
        importer.block(block, 0, None);
        if let Some(last) = importer.paragraphs.last_mut() {
            last.set_add_vertical_space(true);
        }
    }
    log::debug!(
        "imported {} blocks as {} paragraphs",
        document.paragraphs.len(),
        importer.paragraphs.len()
    );
    for paragraph in importer.paragraphs {
        flow.push_paragraph(paragraph);
    }
    flow
}

#[derive(Clone, Copy, Debug, Default)]
struct InlineState {
    bold: bool,
    italic: bool,
    underline: bool,
    strike: bool,
    code: bool,
    highlight: bool,
    header: bool,
}

impl InlineState {
    fn apply(mut self, style: InlineStyle) -> Self {
        match style {
            InlineStyle::None => {}
            InlineStyle::Bold => self.bold = true,
            InlineStyle::Italic => self.italic = true,
            InlineStyle::Highlight => self.highlight = true,
            InlineStyle::Underline => self.underline = true,
            InlineStyle::Strike => self.strike = true,
            InlineStyle::Link => {}
            InlineStyle::Code => self.code = true,
        }
        self
    }

    fn font_id(&self) -> Option<&'static str> {
        if self.code {
            Some(CODE_FONT)
        } else if self.header {
            Some(HEADER_FONT)
        } else if self.bold && self.italic {
            Some(BOLD_ITALIC_FONT)
        } else if self.bold {
            Some(BOLD_FONT)
        } else if self.italic {
            Some(ITALIC_FONT)
        } else if self.underline {
            Some(UNDERLINE_FONT)
        } else if self.strike {
            Some(STRIKE_FONT)
        } else {
            None
        }
    }

    fn color_id(&self) -> Option<&'static str> {
        self.highlight.then_some(HIGHLIGHT_COLOR)
    }
}

struct Importer {
    settings: Rc<HyperlinkSettings>,
    expand_urls: bool,
    paragraphs: Vec<Paragraph>,
}

impl Importer {
    fn block(&mut self, block: &DocParagraph, indent: u16, marker: Option<String>) {
        match block.paragraph_type() {
            ParagraphType::Header1 | ParagraphType::Header2 | ParagraphType::Header3 => {
                let state = InlineState {
                    header: true,
                    ..InlineState::default()
                };
                self.leaf(block.content(), indent, marker, state);
            }
            ParagraphType::CodeBlock => self.code_block(block, indent, marker),
            ParagraphType::Quote => {
                if !block.content().is_empty() {
                    self.leaf(block.content(), indent, marker, InlineState::default());
                }
                for child in block.children() {
                    self.block(
                        child,
                        indent + BLOCK_INDENT,
                        Some(QUOTE_MARKER.to_string()),
                    );
                }
            }
            ParagraphType::UnorderedList => {
                for entry in block.entries() {
                    self.list_entry(entry, indent, LIST_MARKER.to_string(), BLOCK_INDENT);
                }
            }
            ParagraphType::OrderedList => {
                let entries = block.entries();
                let label_width = format!("{}.", entries.len()).len() as u16;
                for (idx, entry) in entries.iter().enumerate() {
                    self.list_entry(entry, indent, format!("{}.", idx + 1), label_width + 1);
                }
            }
            ParagraphType::Checklist => {
                for item in block.checklist_items() {
                    self.checklist_item(item, indent);
                }
            }
            _ => {
                self.leaf(block.content(), indent, marker, InlineState::default());
                for child in block.children() {
                    self.block(child, indent, None);
                }
            }
        }
    }

    fn list_entry(&mut self, entry: &[DocParagraph], indent: u16, marker: String, step: u16) {
        let mut marker = Some(marker);
        for block in entry {
            self.block(block, indent + step, marker.take());
        }
    }

    fn checklist_item(&mut self, item: &ChecklistItem, indent: u16) {
        let marker = if item.checked { "[✓]" } else { "[ ]" };
        let indent = indent + marker.chars().count() as u16 + 1;
        self.leaf(&item.content, indent, Some(marker.to_string()), InlineState::default());
        for child in &item.children {
            self.checklist_item(child, indent);
        }
    }

    fn code_block(&mut self, block: &DocParagraph, indent: u16, marker: Option<String>) {
        let text: String = block.content().iter().map(flatten).collect();
        let mut marker = marker;
        for line in text.lines() {
            let mut paragraph = new_paragraph(indent + BLOCK_INDENT, marker.take());
            if !line.is_empty() {
                paragraph.append_segment(TextSegment::new(line, Some(CODE_FONT), None));
            }
            self.paragraphs.push(paragraph);
        }
    }

    fn leaf(&mut self, spans: &[Span], indent: u16, marker: Option<String>, state: InlineState) {
        let mut paragraph = new_paragraph(indent, marker);
        for span in spans {
            self.span(&mut paragraph, span, state);
        }
        self.paragraphs.push(paragraph);
    }

    fn span(&self, paragraph: &mut Paragraph, span: &Span, state: InlineState) {
        let state = state.apply(span.style);
        if let Some(target) = span.link_target.as_deref() {
            let text = flatten(span);
            if !text.is_empty() {
                let link = HyperlinkSegment::new(text, Rc::clone(&self.settings), state.font_id())
                    .with_href(target);
                paragraph.append_segment(link);
            }
            return;
        }
        self.text(paragraph, &span.text, state);
        for child in &span.children {
            self.span(paragraph, child, state);
        }
    }

    fn text(&self, paragraph: &mut Paragraph, text: &str, state: InlineState) {
        let expand_urls = self.expand_urls && !state.code;
        for (idx, line) in text.split('\n').enumerate() {
            if idx > 0 {
                paragraph.append_break();
            }
            paragraph.ingest_text(
                line,
                expand_urls,
                &self.settings,
                state.font_id(),
                state.color_id(),
            );
        }
    }
}

fn new_paragraph(indent: u16, marker: Option<String>) -> Paragraph {
    match marker {
        Some(marker) => Paragraph::new(false).with_bullet(marker, indent),
        None => Paragraph::new(false).with_indent(indent),
    }
}

fn flatten(span: &Span) -> String {
    let mut text = span.text.clone();
    for child in &span.children {
        text.push_str(&flatten(child));
    }
    text
}
