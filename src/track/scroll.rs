//! Vertical scrolling for tracks whose content exceeds their height.
//!
//! The scroll offset lives in pixels and translates content only along y,
//! so it never interacts with the horizontal translate/rebuild decision.

/// Scrollbar thumb geometry, in track pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollBar {
    pub thumb_y: f64,
    pub thumb_height: f64,
    pub hovered: bool,
}

/// Clamped vertical scroll state plus the derived scrollbar geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalScrollController {
    /// Visible track height in pixels.
    height: f64,
    /// Full content height in pixels.
    actual_height: f64,
    /// Content y offset; zero or negative (content moves up).
    y: f64,
    hovered: bool,
}

impl VerticalScrollController {
    pub fn new() -> Self {
        Self {
            height: 0.0,
            actual_height: 0.0,
            y: 0.0,
            hovered: false,
        }
    }

    /// Update the visible and content heights, re-clamping the offset.
    pub fn set_heights(&mut self, height: f64, actual_height: f64) {
        self.height = height;
        self.actual_height = actual_height;
        self.set_offset(self.y);
    }

    /// Content y offset to apply when compositing.
    pub fn offset(&self) -> f64 {
        self.y
    }

    pub fn is_scrollable(&self) -> bool {
        self.actual_height > self.height && self.height > 0.0
    }

    /// Scroll by `delta` pixels; positive scrolls the content down into
    /// view. Returns whether the offset changed.
    pub fn scroll_by(&mut self, delta: f64) -> bool {
        self.set_offset(self.y - delta)
    }

    fn set_offset(&mut self, y: f64) -> bool {
        let min = (self.height - self.actual_height).min(0.0);
        let clamped = y.clamp(min, 0.0);
        let changed = clamped != self.y;
        self.y = clamped;
        changed
    }

    /// Jump so the thumb's top lands at `position` track pixels.
    pub fn set_scroll_position(&mut self, position: f64) -> bool {
        if self.height <= 0.0 {
            return false;
        }
        self.set_offset(-position / self.height * self.actual_height)
    }

    /// Returns true when the hover state changed and only the scrollbar
    /// needs repainting.
    pub fn set_thumb_hovered(&mut self, hovered: bool) -> bool {
        let changed = self.hovered != hovered;
        self.hovered = hovered;
        changed
    }

    /// Scrollbar geometry; `None` when the content fits.
    pub fn scroll_bar(&self) -> Option<ScrollBar> {
        if !self.is_scrollable() {
            return None;
        }
        Some(ScrollBar {
            thumb_y: -self.y / self.actual_height * self.height,
            thumb_height: self.height * self.height / self.actual_height,
            hovered: self.hovered,
        })
    }
}

impl Default for VerticalScrollController {
    fn default() -> Self {
        Self::new()
    }
}
