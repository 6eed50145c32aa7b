//! Translate-versus-rebuild frame rendering.
//!
//! Most frames after a pan reuse the previously built scene: the whole
//! container is shifted and slightly stretched to match the new viewport,
//! which is a single transform update instead of a rebuild. A rebuild
//! happens only when the zoom moved past the tolerance, fresh data
//! arrived, or a redraw was forced.

use log::trace;

use crate::scene::{Container, Primitive};
use crate::track::cache::TrackCache;
use crate::viewport::Viewport;

/// Zoom drift tolerated before a translate frame gives way to a rebuild.
pub const SCALE_TOLERANCE: f64 = 0.1;

/// Transform parameters for a translate frame, derived from the live
/// viewport and the cache's snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawScope {
    /// Live factor over cached factor; 1.0 means the zoom is unchanged.
    pub scale_factor: f64,
    /// Horizontal shift in cached pixels between the two brushes.
    pub container_translate_factor: f64,
}

/// How the next frame will be produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    Translate(DrawScope),
    Rebuild,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderState {
    /// No scene has been built yet; translating is not possible.
    NotReady,
    Ready,
}

/// Builds track content into a container. Returns the content height in
/// pixels, which may exceed the track's visible height.
pub trait RenderStrategy {
    fn build(&mut self, viewport: &Viewport, cache: &TrackCache, container: &mut Container) -> f64;
}

/// Owns a track's scene graph and chooses translate or rebuild per frame.
pub struct IncrementalRenderer {
    state: RenderState,
    container: Container,
    /// Viewport-independent chrome redrawn every frame (center line).
    overlay: Container,
    actual_height: f64,
}

impl IncrementalRenderer {
    pub fn new() -> Self {
        Self {
            state: RenderState::NotReady,
            container: Container::new(),
            overlay: Container::new(),
            actual_height: 0.0,
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    pub fn overlay(&self) -> &Container {
        &self.overlay
    }

    /// Full pixel height of the built content.
    pub fn actual_height(&self) -> f64 {
        self.actual_height
    }

    pub fn is_ready(&self) -> bool {
        self.state == RenderState::Ready
    }

    /// Pick the frame transition, or `None` when nothing can be drawn yet
    /// (no fetched data, or a degenerate cached viewport).
    pub fn decide_transition(
        &self,
        viewport: &Viewport,
        cache: &TrackCache,
        force_redraw: bool,
    ) -> Option<Transition> {
        let snapshot = cache.viewport?;
        if snapshot.factor <= 0.0 {
            return None;
        }
        let scale_factor = viewport.factor / snapshot.factor;
        let can_translate = !force_redraw
            && self.state == RenderState::Ready
            && (scale_factor - 1.0).abs() < SCALE_TOLERANCE
            && !cache.is_new;
        if can_translate {
            Some(Transition::Translate(DrawScope {
                scale_factor,
                container_translate_factor: (snapshot.brush.start - viewport.brush.start)
                    * snapshot.factor,
            }))
        } else {
            Some(Transition::Rebuild)
        }
    }

    /// Produce the frame. Returns the transition taken, if any.
    pub fn render(
        &mut self,
        viewport: &Viewport,
        cache: &mut TrackCache,
        strategy: &mut dyn RenderStrategy,
        force_redraw: bool,
    ) -> Option<Transition> {
        let transition = self.decide_transition(viewport, cache, force_redraw)?;
        match transition {
            Transition::Translate(scope) => {
                trace!(
                    "translate frame: shift {:.2}px scale {:.4}",
                    scope.container_translate_factor, scope.scale_factor
                );
                self.container.x = scope.container_translate_factor * scope.scale_factor;
                self.container.scale_x = scope.scale_factor;
                rescale_labels(&mut self.container, scope.scale_factor);
            }
            Transition::Rebuild => {
                trace!("rebuild frame");
                self.container.reset_transform();
                self.container.clear();
                self.actual_height = strategy.build(viewport, cache, &mut self.container);
                self.state = RenderState::Ready;
                cache.is_new = false;
            }
        }
        self.draw_overlay(viewport);
        Some(transition)
    }

    /// Drop the built scene; the next frame must rebuild.
    pub fn reset(&mut self) {
        self.state = RenderState::NotReady;
        self.container.reset_transform();
        self.container.clear();
        self.actual_height = 0.0;
    }

    fn draw_overlay(&mut self, viewport: &Viewport) {
        self.overlay.clear();
        let center_x = viewport.project_brush_bp_to_pixel(viewport.brush.center());
        self.overlay.push(Primitive::Line {
            x1: center_x,
            y1: 0.0,
            x2: center_x,
            y2: self.actual_height.max(1.0),
            color: ratatui::style::Color::DarkGray,
        });
    }
}

impl Default for IncrementalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter-scale labels so text keeps its on-screen size and stays
/// centered on its anchor while the container stretches.
fn rescale_labels(container: &mut Container, scale_factor: f64) {
    if scale_factor == 0.0 {
        return;
    }
    for child in &mut container.children {
        if let Primitive::Label(label) = child {
            let center = label.anchor_x + label.width / 2.0;
            label.scale = 1.0 / scale_factor;
            label.x = center - label.width / (2.0 * scale_factor);
        }
    }
}
