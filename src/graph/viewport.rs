use std::ops::Range;

/// A one-shot request for the renderer to smoothly scroll to `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub id: u64,
    pub row: usize,
    pub target: f32,
}

/// Scroll bookkeeping for the virtualized commit list.
///
/// Only rows in [`Viewport::visible_range`] need to be drawn; everything
/// here is plain arithmetic on the scroll offset, the viewport height and
/// the configured row height.
#[derive(Debug, Clone)]
pub struct Viewport {
    scroll_offset: f32,
    viewport_height: f32,
    row_height: f32,
    buffer_rows: usize,
    pending_scroll: Option<ScrollRequest>,
    next_request_id: u64,
}

impl Viewport {
    pub fn new(row_height: f32, buffer_rows: usize) -> Self {
        Self {
            scroll_offset: 0.0,
            viewport_height: 0.0,
            row_height,
            buffer_rows,
            pending_scroll: None,
            next_request_id: 0,
        }
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    pub fn row_height(&self) -> f32 {
        self.row_height
    }

    pub fn buffer_rows(&self) -> usize {
        self.buffer_rows
    }

    pub fn set_scroll_offset(&mut self, offset: f32) {
        self.scroll_offset = offset.max(0.0);
    }

    /// Rows to render, including `buffer_rows` of overscan on each side.
    pub fn visible_range(&self, total_rows: usize) -> Range<usize> {
        if total_rows == 0 || self.row_height <= 0.0 {
            return 0..0;
        }

        let first = (self.scroll_offset / self.row_height).floor() as usize;
        let last = ((self.scroll_offset + self.viewport_height) / self.row_height).ceil() as usize;

        let start = first.saturating_sub(self.buffer_rows).min(total_rows);
        let end = last.saturating_add(self.buffer_rows).min(total_rows);
        start..end.max(start)
    }

    /// Scroll offset that centers `row` in the viewport.
    pub fn scroll_target(&self, row: usize) -> f32 {
        let target =
            row as f32 * self.row_height - self.viewport_height / 2.0 + self.row_height / 2.0;
        target.max(0.0)
    }

    /// Ask the renderer to bring `row` to the middle of the viewport.
    ///
    /// Replaces any request the renderer has not picked up yet.
    pub fn scroll_to_commit(&mut self, row: usize) -> ScrollRequest {
        self.next_request_id += 1;
        let request = ScrollRequest {
            id: self.next_request_id,
            row,
            target: self.scroll_target(row),
        };
        self.pending_scroll = Some(request);
        request
    }

    /// Hand the latest request to the renderer. Each request is delivered once.
    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        self.pending_scroll.take()
    }

    /// The viewport was resized. Scroll position is left untouched.
    pub fn on_resize(&mut self, new_height: f32) {
        self.viewport_height = new_height.max(0.0);
    }

    /// Total scrollable height for `total_rows` rows.
    pub fn content_height(&self, total_rows: usize) -> f32 {
        total_rows as f32 * self.row_height
    }

    /// Row under a y coordinate measured from the top of the content.
    pub fn row_at(&self, y: f32, total_rows: usize) -> Option<usize> {
        if y < 0.0 || self.row_height <= 0.0 {
            return None;
        }
        let row = (y / self.row_height) as usize;
        (row < total_rows).then_some(row)
    }

    /// Top edge of `row` measured from the top of the content.
    pub fn row_top(&self, row: usize) -> f32 {
        row as f32 * self.row_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn viewport(offset: f32, height: f32) -> Viewport {
        let mut viewport = Viewport::new(26.0, 15);
        viewport.set_scroll_offset(offset);
        viewport.on_resize(height);
        viewport
    }

    #[test]
    fn test_visible_range_with_buffer() {
        let viewport = viewport(520.0, 400.0);
        assert_eq!(viewport.visible_range(1000), 5..51);
    }

    #[test_case(0.0, 400.0, 1000 => 0..31 ; "top of history")]
    #[test_case(520.0, 400.0, 40 => 5..40 ; "clamped to total rows")]
    #[test_case(520.0, 400.0, 0 => 0..0 ; "empty history")]
    #[test_case(26_000.0, 400.0, 100 => 100..100 ; "scrolled past the end")]
    fn test_visible_range_edges(offset: f32, height: f32, total: usize) -> Range<usize> {
        viewport(offset, height).visible_range(total)
    }

    #[test]
    fn test_scroll_to_commit_centers_row() {
        let mut viewport = viewport(0.0, 400.0);
        let request = viewport.scroll_to_commit(50);
        assert_eq!(request.target, 1113.0);
        assert_eq!(request.row, 50);
        assert_eq!(viewport.scroll_to_commit(0).target, 0.0);
    }

    #[test]
    fn test_later_scroll_request_supersedes_earlier() {
        let mut viewport = viewport(0.0, 400.0);
        let first = viewport.scroll_to_commit(10);
        let second = viewport.scroll_to_commit(90);
        assert_ne!(first.id, second.id);

        assert_eq!(viewport.take_scroll_request(), Some(second));
        assert_eq!(viewport.take_scroll_request(), None);
        // Scroll state is only changed by the renderer reporting back
        assert_eq!(viewport.scroll_offset(), 0.0);
    }

    #[test]
    fn test_resize_keeps_scroll_offset() {
        let mut viewport = viewport(520.0, 400.0);
        viewport.on_resize(800.0);
        assert_eq!(viewport.scroll_offset(), 520.0);
        assert_eq!(viewport.viewport_height(), 800.0);
        assert_eq!(viewport.visible_range(1000), 5..66);
    }

    #[test]
    fn test_row_at() {
        let viewport = viewport(0.0, 400.0);
        assert_eq!(viewport.row_at(0.0, 10), Some(0));
        assert_eq!(viewport.row_at(51.9, 10), Some(1));
        assert_eq!(viewport.row_at(52.0, 10), Some(2));
        assert_eq!(viewport.row_at(260.0, 10), None);
        assert_eq!(viewport.row_at(-1.0, 10), None);
        assert_eq!(viewport.content_height(10), 260.0);
    }
}
