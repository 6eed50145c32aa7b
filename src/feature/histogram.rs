//! Aggregated density histograms drawn in place of discrete features at low
//! zoom levels.

use crate::feature::record::FeatureRecord;
use crate::viewport::Viewport;

/// One bucket of the density strip, tagged with the running total.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramPoint {
    pub start_index: u64,
    pub end_index: u64,
    pub value: f64,
    /// Monotone running total of `value` up to and including this point.
    pub total_value: f64,
}

/// Thresholds deciding when discrete feature drawing switches to the
/// aggregated histogram strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramThresholds {
    /// Minimum number of features intersecting the brush.
    pub genes: f64,
    /// Maximum average on-screen spacing per feature, in pixels.
    pub width: f64,
}

impl Default for HistogramThresholds {
    fn default() -> Self {
        Self {
            genes: 50.0,
            width: 20.0,
        }
    }
}

/// Full-chromosome histogram: a monotonically increasing running total of
/// `value` across all records, in record order.
pub fn full_histogram(records: &[FeatureRecord]) -> Vec<HistogramPoint> {
    let mut points = vec![HistogramPoint {
        start_index: 1,
        end_index: records.first().map_or(1, |r| r.start_index),
        value: 0.0,
        total_value: 0.0,
    }];
    let mut total = 0.0;
    for record in records {
        total += record.value;
        points.push(HistogramPoint {
            start_index: record.start_index,
            end_index: record.end_index,
            value: record.value,
            total_value: total,
        });
    }
    points
}

/// Viewport-restricted histogram slice with running min/max of the values
/// whose start positions fall inside the brush.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialHistogram {
    /// Index of the first intersecting record.
    pub start: usize,
    /// Index of the last intersecting record.
    pub end: usize,
    pub min: f64,
    pub max: f64,
}

pub fn partial_histogram(viewport: &Viewport, records: &[FeatureRecord]) -> PartialHistogram {
    let mut min = 0.0f64;
    let mut max = 0.0f64;
    let mut start = 0;
    let mut end = records.len().saturating_sub(1);
    let mut start_initialized = false;
    for (i, record) in records.iter().enumerate() {
        let position = record.start_index as f64;
        if position < viewport.brush.start || viewport.brush.end < position {
            continue;
        }
        if !start_initialized {
            start = i;
            start_initialized = true;
        }
        end = i;
        max = max.max(record.value);
        min = min.min(record.value);
    }
    PartialHistogram {
        start,
        end,
        min,
        max,
    }
}

/// Decide whether the viewport is dense enough that discrete feature drawing
/// should give way to the histogram strip: enough features intersect the
/// brush AND the average on-screen spacing per feature drops below the
/// configured pixel width.
pub fn is_histogram_mode(
    viewport: &Viewport,
    points: &[HistogramPoint],
    thresholds: &HistogramThresholds,
) -> bool {
    if points.is_empty() {
        return false;
    }
    let mut left = 0usize;
    let mut right = 0usize;
    while left < points.len() && (points[left].start_index as f64) < viewport.brush.end {
        if (points[right].start_index as f64) < viewport.brush.start {
            right += 1;
        }
        left += 1;
    }
    if left == points.len() {
        left -= 1;
    }
    let count = if right < points.len() && left < points.len() {
        if right < left {
            points[left].total_value - points[right].total_value
        } else {
            points[left].total_value
        }
    } else {
        0.0
    };
    let span = left.saturating_sub(right) as f64;
    // span of zero yields an infinite spacing, which never passes
    count > thresholds.genes && viewport.canvas_size / span <= thresholds.width
}
