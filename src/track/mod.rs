//! Track composition.
//!
//! A [`Track`] owns one cache controller, one incremental renderer, one
//! vertical scroll controller, and a pluggable [`RenderStrategy`] that
//! knows the track's geometry. Behavior differences between track kinds
//! are expressed through [`TrackOptions`] capability flags and the
//! strategy, never by inspecting the track's kind at runtime.

pub mod cache;
pub mod gene;
pub mod render;
pub mod scroll;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::data::FeatureSource;
use crate::events::{EventBus, SelectionEvent, SubscriptionGuard};
use crate::scene::{Container, TooltipContent};
use crate::viewport::Viewport;

pub use cache::{CacheController, CacheSnapshot, FetchRange, TrackCache};
pub use gene::{GeneRenderStrategy, GeneTrackStyle};
pub use render::{DrawScope, IncrementalRenderer, RenderStrategy, SCALE_TOLERANCE, Transition};
pub use scroll::{ScrollBar, VerticalScrollController};

/// Capability flags and fixed geometry for one track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackOptions {
    pub name: String,
    /// Fetch per covered sub-range when the viewport collapses introns.
    pub supports_intron_shortening: bool,
    /// Content taller than the track can be scrolled vertically.
    pub scrollable: bool,
    /// Visible height in pixels.
    pub height: f64,
}

impl TrackOptions {
    pub fn new(name: impl Into<String>, height: f64) -> Self {
        Self {
            name: name.into(),
            supports_intron_shortening: false,
            scrollable: true,
            height,
        }
    }
}

type HoverCallback = Box<dyn FnMut(Option<&TooltipContent>) + Send>;

/// One displayed track: data cache, scene, scroll state, and strategy.
pub struct Track {
    options: TrackOptions,
    cache: CacheController,
    renderer: IncrementalRenderer,
    scroll: VerticalScrollController,
    strategy: Box<dyn RenderStrategy + Send>,
    force_redraw: bool,
    hover_callback: Option<HoverCallback>,
    /// Set from bus callbacks; folded into `force_redraw` on update.
    external_redraw: Arc<AtomicBool>,
    last_selection: Arc<Mutex<Option<SelectionEvent>>>,
    subscriptions: Vec<SubscriptionGuard<SelectionEvent>>,
}

impl Track {
    pub fn new(
        options: TrackOptions,
        source: Arc<dyn FeatureSource>,
        strategy: Box<dyn RenderStrategy + Send>,
    ) -> Self {
        let cache = CacheController::new(source, options.supports_intron_shortening);
        Self {
            options,
            cache,
            renderer: IncrementalRenderer::new(),
            scroll: VerticalScrollController::new(),
            strategy,
            force_redraw: false,
            hover_callback: None,
            external_redraw: Arc::new(AtomicBool::new(false)),
            last_selection: Arc::new(Mutex::new(None)),
            subscriptions: Vec::new(),
        }
    }

    pub fn options(&self) -> &TrackOptions {
        &self.options
    }

    /// Change the visible height, e.g. when a layout zone collapses.
    pub fn set_height(&mut self, height: f64) {
        if (height - self.options.height).abs() > f64::EPSILON {
            self.options.height = height;
            self.force_redraw = true;
        }
    }

    pub fn container(&self) -> &Container {
        self.renderer.container()
    }

    pub fn overlay(&self) -> &Container {
        self.renderer.overlay()
    }

    pub fn scroll_bar(&self) -> Option<ScrollBar> {
        if !self.options.scrollable {
            return None;
        }
        self.scroll.scroll_bar()
    }

    /// Vertical content offset to apply when compositing, in pixels.
    pub fn scroll_offset(&self) -> f64 {
        self.scroll.offset()
    }

    pub fn has_pending_fetch(&self) -> bool {
        self.cache.has_pending_fetch()
    }

    /// Selection most recently broadcast by another track, if any.
    pub fn highlighted_selection(&self) -> Option<SelectionEvent> {
        self.last_selection.lock().ok().and_then(|s| s.clone())
    }

    /// Drive one frame: refetch if the viewport moved, fold in completed
    /// fetches, then translate or rebuild the scene. Returns the
    /// transition taken.
    pub fn update(&mut self, viewport: &Viewport) -> Option<Transition> {
        self.cache.get_new_cache(viewport);
        self.cache.poll();
        if self.external_redraw.swap(false, Ordering::SeqCst) {
            self.force_redraw = true;
        }
        let force_redraw = self.force_redraw;
        self.force_redraw = false;
        let transition = self.renderer.render(
            viewport,
            self.cache.cache_mut(),
            self.strategy.as_mut(),
            force_redraw,
        );
        let actual_height = if self.options.scrollable {
            self.renderer.actual_height()
        } else {
            // non-scrollable tracks clip instead
            self.options.height
        };
        self.scroll.set_heights(self.options.height, actual_height);
        transition
    }

    /// Mark cached data stale and schedule a rebuild.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
        self.force_redraw = true;
    }

    /// Scroll the content by `delta` pixels, if this track scrolls.
    pub fn on_scroll(&mut self, delta: f64) -> bool {
        self.options.scrollable && self.scroll.scroll_by(delta)
    }

    /// Tooltip payload of the hit region under a screen position, if any.
    pub fn hit_test(&self, screen_x: f64, screen_y: f64) -> Option<&TooltipContent> {
        let container = self.renderer.container();
        let x = container.from_screen_x(screen_x);
        let y = screen_y - self.scroll.offset();
        container
            .hit_regions
            .iter()
            .find(|region| x >= region.x1 && x <= region.x2 && y >= region.y1 && y <= region.y2)
            .map(|region| &region.info)
    }

    /// Register the hover display callback.
    pub fn on_hover(&mut self, callback: impl FnMut(Option<&TooltipContent>) + Send + 'static) {
        self.hover_callback = Some(Box::new(callback));
    }

    /// Feed a pointer position; invokes the hover callback with the hit
    /// region under it, or `None` when hovering empty space.
    pub fn hover_at(&mut self, screen_x: f64, screen_y: f64) {
        let info = self
            .hit_test(screen_x, screen_y)
            .cloned();
        if let Some(callback) = &mut self.hover_callback {
            callback(info.as_ref());
        }
    }

    /// Follow selections broadcast by other tracks: remember the latest
    /// one and schedule a redraw. The subscription dies with the track.
    pub fn link_selection(&mut self, bus: &EventBus<SelectionEvent>) {
        let own_name = self.options.name.clone();
        let redraw = Arc::clone(&self.external_redraw);
        let last = Arc::clone(&self.last_selection);
        let guard = bus.subscribe(move |event: &SelectionEvent| {
            if event.source_track == own_name {
                return;
            }
            if let Ok(mut slot) = last.lock() {
                *slot = Some(event.clone());
            }
            redraw.store(true, Ordering::SeqCst);
        });
        self.subscriptions.push(guard);
    }
}
