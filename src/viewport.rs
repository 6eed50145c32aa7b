/// The currently visible genomic range in basepairs (inclusive bounds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub start: f64,
    pub end: f64,
}

impl Brush {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Width of the brush in basepairs.
    pub fn size(&self) -> f64 {
        self.end - self.start
    }

    /// Middle basepair of the brush.
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Intron-shortening display model: the genomic sub-ranges that stay visible
/// when intronic stretches are collapsed out of the viewport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShortenedIntronsModel {
    covered: Vec<Brush>,
}

impl ShortenedIntronsModel {
    pub fn new(covered: Vec<Brush>) -> Self {
        Self { covered }
    }

    /// Visible covered sub-ranges, in genomic order.
    pub fn covered_ranges(&self) -> &[Brush] {
        &self.covered
    }
}

/// Immutable per-frame description of what is on screen.
///
/// A viewport is replaced wholesale whenever the visible range or zoom
/// changes; render code never mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub brush: Brush,
    /// Pixels per basepair.
    pub factor: f64,
    /// Canvas width in pixels.
    pub canvas_size: f64,
    /// Total chromosome length in basepairs.
    pub chromosome_size: u64,
    /// Present when the viewport runs in intron-shortened display mode.
    pub shortened_introns: Option<ShortenedIntronsModel>,
}

impl Viewport {
    pub fn new(brush: Brush, canvas_size: f64, chromosome_size: u64) -> Self {
        let factor = if brush.size() > 0.0 {
            canvas_size / brush.size()
        } else {
            0.0
        };
        Self {
            brush,
            factor,
            canvas_size,
            chromosome_size,
            shortened_introns: None,
        }
    }

    /// Project a basepair coordinate to a pixel position relative to the
    /// brush origin.
    pub fn project_brush_bp_to_pixel(&self, bp: f64) -> f64 {
        (bp - self.brush.start) * self.factor
    }

    /// Convert a basepair length to a pixel length.
    pub fn convert_brush_bp_to_pixel(&self, length: f64) -> f64 {
        length * self.factor
    }

    pub fn is_shortened_introns_mode(&self) -> bool {
        self.shortened_introns.is_some()
    }

    /// New viewport panned by `delta_bp`, clamped to `[1, chromosome_size]`.
    pub fn panned(&self, delta_bp: f64) -> Self {
        let size = self.brush.size();
        let mut start = self.brush.start + delta_bp;
        start = start.max(1.0).min(self.chromosome_size as f64 - size);
        let mut panned = self.clone();
        panned.brush = Brush::new(start, start + size);
        panned
    }

    /// New viewport zoomed by `scale` around the brush center. Values above
    /// one zoom out (widen the brush).
    pub fn zoomed(&self, scale: f64) -> Self {
        if scale <= 0.0 {
            return self.clone();
        }
        let center = self.brush.center();
        let half = self.brush.size() * scale / 2.0;
        let max_half = (self.chromosome_size as f64 - 1.0) / 2.0;
        let half = half.clamp(1.0, max_half);
        let mut start = center - half;
        let mut end = center + half;
        if start < 1.0 {
            end += 1.0 - start;
            start = 1.0;
        }
        if end > self.chromosome_size as f64 {
            start -= end - self.chromosome_size as f64;
            end = self.chromosome_size as f64;
        }
        Viewport {
            brush: Brush::new(start.max(1.0), end),
            factor: self.canvas_size / (end - start.max(1.0)),
            ..self.clone()
        }
    }
}
