// Follow-mode scrolling for the transcript pane
//
// The pane follows the newest content until the user scrolls away from the
// bottom; scrolling back to the bottom (or pressing End) resumes following.
// Totals and viewport size are measured in rendered lines and refreshed
// every frame by the renderer.

#[derive(Debug, Clone)]
pub struct ScrollState {
    /// Line index at the top of the viewport
    offset: usize,

    /// Total rendered lines
    total: usize,

    /// Lines visible in the viewport
    viewport: usize,

    /// Snap to the bottom on every update
    pub follow: bool,
}

impl ScrollState {
    /// New state, following the bottom
    pub fn new() -> Self {
        Self {
            offset: 0,
            total: 0,
            viewport: 0,
            follow: true,
        }
    }

    /// Refresh content and viewport sizes (call each render)
    pub fn update_dimensions(&mut self, total: usize, viewport: usize) {
        self.total = total;
        self.viewport = viewport;

        if self.follow {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.offset = self.offset.saturating_sub(lines);
        if self.offset < self.max_offset() {
            self.follow = false;
        }
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.offset = (self.offset + lines).min(self.max_offset());
        if self.offset >= self.max_offset() {
            self.follow = true;
        }
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.page());
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.page());
    }

    /// Jump to the newest content and resume following
    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
        self.follow = true;
    }

    /// Visible line range as (start, end)
    pub fn visible_range(&self) -> (usize, usize) {
        let end = (self.offset + self.viewport).min(self.total);
        (self.offset.min(end), end)
    }

    /// Lines below the viewport (shown as a "more below" hint)
    pub fn lines_below(&self) -> usize {
        self.total.saturating_sub(self.offset + self.viewport)
    }

    fn page(&self) -> usize {
        self.viewport.saturating_sub(1).max(1)
    }

    fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.viewport)
    }
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_on_new_content() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(10, 5);
        assert_eq!(scroll.visible_range().0, 5);

        scroll.update_dimensions(15, 5);
        assert_eq!(scroll.visible_range().0, 10);
    }

    #[test]
    fn test_scroll_up_stops_following() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(20, 5);

        scroll.scroll_up(1);
        assert!(!scroll.follow);
        assert_eq!(scroll.visible_range().0, 14);

        // New content no longer moves the view
        scroll.update_dimensions(30, 5);
        assert_eq!(scroll.visible_range().0, 14);
        assert_eq!(scroll.lines_below(), 11);
    }

    #[test]
    fn test_scroll_back_to_bottom_resumes_following() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(20, 5);
        scroll.page_up();
        assert!(!scroll.follow);

        scroll.page_down();
        assert!(scroll.follow);
        assert_eq!(scroll.visible_range().0, 15);

        scroll.scroll_up(3);
        scroll.scroll_to_bottom();
        assert!(scroll.follow);
    }

    #[test]
    fn test_content_shorter_than_viewport() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(3, 10);
        scroll.scroll_up(1);
        assert!(scroll.follow);
        assert_eq!(scroll.visible_range(), (0, 3));
    }

    #[test]
    fn test_visible_range() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(100, 10);
        assert_eq!(scroll.visible_range(), (90, 100));

        scroll.scroll_up(100);
        assert_eq!(scroll.visible_range(), (0, 10));
    }
}
