use std::ops::Range;

use ratatui::{
    layout::{Position, Rect},
    style::Style,
};

/// A text selection spanning segments, rows and paragraphs.
///
/// The selection runs from the anchor (`start`) to the focus (`stop`) in
/// reading order. It is "enclosed" once the two points differ; a collapsed
/// selection selects nothing. The selection pass appends the selected text of
/// every segment in order, and paint asks [`SelectionData::selected_columns`]
/// which cells of a row to highlight.
#[derive(Clone, Debug)]
pub struct SelectionData {
    start: Position,
    stop: Position,
    style: Style,
    fragments: Vec<String>,
    last_row: Option<u16>,
    new_line_needed: bool,
}

impl Default for SelectionData {
    fn default() -> Self {
        Self::new(Position::new(0, 0), Style::default())
    }
}

impl SelectionData {
    /// Start a collapsed selection at `anchor`.
    pub fn new(anchor: Position, style: Style) -> Self {
        Self {
            start: anchor,
            stop: anchor,
            style,
            fragments: Vec::new(),
            last_row: None,
            new_line_needed: false,
        }
    }

    /// Move the focus end of the selection.
    pub fn update(&mut self, focus: Position) {
        self.stop = focus;
    }

    /// Drop the collected text so the selection pass can run again.
    pub fn reset(&mut self) {
        self.fragments.clear();
        self.last_row = None;
        self.new_line_needed = false;
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn stop(&self) -> Position {
        self.stop
    }

    /// Style used to paint selected cells.
    pub fn style(&self) -> Style {
        self.style
    }

    pub fn is_enclosed(&self) -> bool {
        self.start != self.stop
    }

    fn ordered(&self) -> (Position, Position) {
        if (self.start.y, self.start.x) <= (self.stop.y, self.stop.x) {
            (self.start, self.stop)
        } else {
            (self.stop, self.start)
        }
    }

    /// Whether any part of the row `[y, y + height)` lies within the selection.
    pub fn is_selected_row(&self, y: u16, height: u16) -> bool {
        if !self.is_enclosed() {
            return false;
        }
        let (top, bottom) = self.ordered();
        y <= bottom.y && y.saturating_add(height.max(1)) > top.y
    }

    /// The selected column range inside `row`, or `None` if the row is not selected.
    ///
    /// The first selected row starts at the top point's column, the last one
    /// ends (exclusively) at the bottom point's column; rows in between are
    /// selected across their full width.
    pub fn selected_columns(&self, row: Rect) -> Option<Range<u16>> {
        if !self.is_selected_row(row.y, row.height) {
            return None;
        }
        let (top, bottom) = self.ordered();
        let row_bottom = row.y.saturating_add(row.height.max(1));
        let within = |point: Position| point.y >= row.y && point.y < row_bottom;
        let left = if within(top) { top.x } else { 0 };
        let right = if within(bottom) { bottom.x } else { u16::MAX };
        (left < right).then_some(left..right)
    }

    /// Request a line terminator before the next piece of selected text.
    pub fn mark_new_line(&mut self) {
        if !self.fragments.is_empty() {
            self.new_line_needed = true;
        }
    }

    /// Append selected text found on the row starting at `row_y`.
    pub fn add_text(&mut self, row_y: u16, text: &str) {
        if self.last_row.is_some_and(|last| last != row_y) {
            self.mark_new_line();
        }
        if self.new_line_needed {
            self.fragments.push("\n".to_string());
            self.new_line_needed = false;
        }
        self.fragments.push(text.to_string());
        self.last_row = Some(row_y);
    }

    pub fn can_copy(&self) -> bool {
        self.fragments.iter().any(|fragment| !fragment.is_empty())
    }

    /// All selected text collected by the last selection pass.
    pub fn selection_text(&self) -> String {
        self.fragments.concat()
    }
}
