pub mod controller;

pub use controller::{FeedPhase, FeedState, PageOutcome, PaginationController, Trigger};

use async_trait::async_trait;

use crate::common::{FeedPage, FetchError};

/// Anything that can produce numbered feed pages.
#[async_trait]
pub trait FeedSource: Send + Sync + 'static {
    async fn fetch_page(&self, page_number: u32, page_size: u32) -> Result<FeedPage, FetchError>;

    /// Called once a page has been merged into the feed and is no longer
    /// needed by the source.
    fn forget_page(&self, _page_number: u32, _page_size: u32) {}

    /// Called when the feed restarts from page 1.
    fn invalidate(&self) {}
}

/// Scroll metrics reported by the view hosting the feed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub offset: f32,
    pub visible_height: f32,
    pub content_height: f32,
}

impl Viewport {
    pub fn is_near_end(&self, threshold: f32) -> bool {
        self.visible_height + self.offset + threshold >= self.content_height
    }
}

/// Turns continuous scroll metrics into discrete "near the end" signals.
///
/// A signal fires when the viewport moves into the threshold zone, and again
/// whenever the content grows while the viewport is still inside it.
#[derive(Debug, Clone)]
pub struct ProximityTracker {
    threshold: f32,
    near: bool,
    content_height: f32,
}

impl ProximityTracker {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            near: false,
            content_height: 0.0,
        }
    }

    /// Returns `true` when the viewport just crossed into proximity.
    pub fn observe(&mut self, viewport: Viewport) -> bool {
        let grew = viewport.content_height > self.content_height;
        self.content_height = viewport.content_height;

        let near = viewport.is_near_end(self.threshold);
        let crossed = near && (!self.near || grew);
        self.near = near;
        crossed
    }

    pub fn reset(&mut self) {
        self.near = false;
        self.content_height = 0.0;
    }
}
