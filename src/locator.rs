/// Layout cursor threaded through a measurement or layout pass.
///
/// All coordinates are terminal cells. During a measurement pass `heights` is
/// `Some` and receives one entry per finished row; the layout pass that follows
/// reads those heights back (indexed by `row_counter`) to vertically center
/// segments inside taller rows, and the paragraph clears them afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Locator {
    pub indent: u16,
    pub x: u16,
    pub y: u16,
    /// Widest x position reached so far.
    pub width: u16,
    pub margin_width: u16,
    pub margin_height: u16,
    pub row_height: u16,
    pub row_counter: usize,
    pub heights: Option<Vec<u16>>,
    row_start: u16,
}

impl Locator {
    pub fn new(margin_width: u16, margin_height: u16) -> Self {
        let mut locator = Self {
            margin_width,
            margin_height,
            y: margin_height,
            ..Self::default()
        };
        locator.reset_caret();
        locator
    }

    /// The x position at which every row starts.
    pub fn start_x(&self) -> u16 {
        self.margin_width.saturating_add(self.indent)
    }

    /// Move the caret back to the start of the row.
    pub fn reset_caret(&mut self) {
        self.x = self.start_x();
        self.row_start = self.x;
    }

    /// Shift the caret right and treat the new position as the row origin, so
    /// the first word placed there still counts as starting the row.
    pub fn inset(&mut self, amount: u16) {
        self.x = self.x.saturating_add(amount);
        self.row_start = self.x;
    }

    /// Whether nothing has been placed on the current row yet.
    pub fn at_row_start(&self) -> bool {
        self.x <= self.row_start
    }

    /// Advance the caret horizontally by `amount` cells.
    pub fn advance(&mut self, amount: u16) {
        self.x = self.x.saturating_add(amount);
        self.width = self.width.max(self.x);
    }

    /// Grow the current row so it can hold something `height` cells tall.
    pub fn extend_row(&mut self, height: u16) {
        self.row_height = self.row_height.max(height);
    }

    /// Finish the current row and move the caret to the start of the next one.
    ///
    /// A measuring pass (`dry_run`) records the finished row's height.
    pub fn break_row(&mut self, dry_run: bool) {
        if dry_run {
            self.collect_heights();
        } else {
            self.row_counter += 1;
        }
        self.y = self.y.saturating_add(self.row_height);
        self.row_height = 0;
        self.reset_caret();
    }

    /// Record the current row height and move on to the next row index.
    pub fn collect_heights(&mut self) {
        if let Some(heights) = self.heights.as_mut() {
            heights.push(self.row_height);
        }
        self.row_counter += 1;
    }

    /// Clone this cursor for an isolated measurement sub-pass.
    ///
    /// The child starts at the same position with an empty height list; the
    /// caller's cursor is not touched until [`Locator::adopt_heights`].
    pub fn create_child(&self) -> Self {
        let mut child = self.clone();
        child.heights = Some(Vec::new());
        child.row_counter = 0;
        child
    }

    /// Take over the row heights measured by `child` and rewind to the first row.
    /// Everything else the child computed is discarded.
    pub fn adopt_heights(&mut self, child: Self) {
        debug_assert!(child.heights.is_some(), "child cursor did not measure");
        self.heights = child.heights;
        self.row_counter = 0;
    }

    pub fn has_heights(&self) -> bool {
        self.heights.is_some()
    }

    pub fn clear_heights(&mut self) {
        self.heights = None;
    }

    /// Height of the current row as computed by the measurement pass.
    pub fn current_row_height(&self) -> Option<u16> {
        self.heights.as_ref()?.get(self.row_counter).copied()
    }

    /// Top y position for something `height` cells tall, centered in the current row.
    pub fn middle(&self, height: u16) -> u16 {
        let row_height = self.current_row_height().unwrap_or(height);
        self.y.saturating_add(row_height.saturating_sub(height) / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_locator_starts_inside_margins() {
        let mut loc = Locator::new(2, 1);
        loc.indent = 3;
        loc.reset_caret();
        assert_eq!(loc.x, 5);
        assert_eq!(loc.y, 1);
        assert!(loc.at_row_start());
    }

    #[test]
    fn break_row_collects_heights_only_when_measuring() {
        let mut loc = Locator::new(0, 0).create_child();
        loc.extend_row(2);
        loc.advance(4);
        loc.break_row(true);
        assert_eq!(loc.heights.as_deref(), Some(&[2][..]));
        assert_eq!(loc.row_counter, 1);
        assert_eq!(loc.y, 2);
        assert_eq!(loc.x, 0);

        let mut plain = Locator::new(0, 0);
        plain.extend_row(1);
        plain.break_row(false);
        assert_eq!(plain.heights, None);
        assert_eq!(plain.row_counter, 1);
        assert_eq!(plain.y, 1);
    }

    #[test]
    fn child_cursor_does_not_disturb_parent() {
        let mut parent = Locator::new(1, 0);
        parent.advance(3);
        let mut child = parent.create_child();
        child.extend_row(1);
        child.break_row(true);
        child.extend_row(3);
        child.collect_heights();

        assert_eq!(parent.x, 4);
        assert_eq!(parent.y, 0);
        assert!(!parent.has_heights());

        parent.adopt_heights(child);
        assert_eq!(parent.heights.as_deref(), Some(&[1, 3][..]));
        assert_eq!(parent.row_counter, 0);
        assert_eq!(parent.x, 4);
    }

    #[test]
    fn middle_centers_within_known_row_height() {
        let mut loc = Locator::new(0, 0);
        loc.y = 10;
        assert_eq!(loc.middle(1), 10);
        loc.heights = Some(vec![3, 1]);
        assert_eq!(loc.middle(1), 11);
        loc.row_counter = 1;
        assert_eq!(loc.middle(1), 10);
    }

    #[test]
    fn inset_moves_row_origin() {
        let mut loc = Locator::new(0, 0);
        loc.inset(1);
        assert_eq!(loc.x, 1);
        assert!(loc.at_row_start());
        loc.advance(2);
        assert!(!loc.at_row_start());
        loc.break_row(false);
        assert_eq!(loc.x, 0);
    }
}
