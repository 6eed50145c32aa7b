//! Pure draw-command scene graph.
//!
//! Geometry code appends [`Primitive`]s to a [`Container`]; a compositor
//! (the terminal viewer, or a test harness) consumes them afterwards.
//! Keeping layout math free of rendering-backend side effects makes every
//! geometry decision testable with plain data in and out.

use ratatui::style::Color;

/// Plain key/value rows handed to the hover display callback.
pub type TooltipContent = Vec<(String, String)>;

/// A text label. Labels are re-projected specially: on a translate frame the
/// container stretches horizontally, so each label is inverse-scaled (text
/// must not stretch) and re-centered on its original anchor point.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    /// Container-space x recorded at build time; re-centering always starts
    /// from here so repeated translates do not drift.
    pub anchor_x: f64,
    pub x: f64,
    pub y: f64,
    /// Width of the rendered text in pixels at scale 1.
    pub width: f64,
    pub scale: f64,
    pub color: Color,
}

impl Label {
    pub fn new(text: impl Into<String>, x: f64, y: f64, width: f64, color: Color) -> Self {
        Self {
            text: text.into(),
            anchor_x: x,
            x,
            y,
            width,
            scale: 1.0,
            color,
        }
    }
}

/// A drawable primitive in container coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
    },
    Label(Label),
}

/// A rectangular hover target with its tooltip payload, in container
/// coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct HitRegion {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub info: TooltipContent,
}

/// A positioned, horizontally scalable group of primitives.
///
/// Mirrors the data container of a 2D scene graph: re-projection touches
/// only `x` and `scale_x`, never the children's geometry. That single affine
/// transform is what makes the translate render path cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub children: Vec<Primitive>,
    pub hit_regions: Vec<HitRegion>,
    /// Horizontal position of the container in screen space.
    pub x: f64,
    /// Horizontal scale applied to every child coordinate.
    pub scale_x: f64,
}

impl Container {
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            hit_regions: Vec::new(),
            x: 0.0,
            scale_x: 1.0,
        }
    }

    /// Remove all children and hit regions, keeping the transform.
    pub fn clear(&mut self) {
        self.children.clear();
        self.hit_regions.clear();
    }

    /// Reset the transform to identity.
    pub fn reset_transform(&mut self) {
        self.x = 0.0;
        self.scale_x = 1.0;
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.children.push(primitive);
    }

    pub fn add_hit_region(&mut self, region: HitRegion) {
        self.hit_regions.push(region);
    }

    /// Screen-space x of a container-space coordinate.
    pub fn to_screen_x(&self, x: f64) -> f64 {
        self.x + x * self.scale_x
    }

    /// Container-space x of a screen coordinate.
    pub fn from_screen_x(&self, x: f64) -> f64 {
        if self.scale_x == 0.0 {
            return x;
        }
        (x - self.x) / self.scale_x
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}
