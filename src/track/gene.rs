//! Gene track geometry.
//!
//! Builds exon/intron block drawings for every gene in the cache, stacking
//! overlapping genes into rows. Dense viewports collapse into an aggregated
//! density histogram instead of discrete features.

use ratatui::style::Color;

use crate::feature::{
    Gene, HistogramThresholds, StructureBlock, Transcript, full_histogram, is_histogram_mode,
    partial_histogram, transform,
};
use crate::scene::{Container, HitRegion, Label, Primitive};
use crate::track::cache::TrackCache;
use crate::track::render::RenderStrategy;
use crate::viewport::Viewport;

/// Pixel metrics and palette for the gene track.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneTrackStyle {
    /// Height of one exon bar.
    pub bar_height: f64,
    /// Height reserved for the gene name above its bars.
    pub label_height: f64,
    /// Vertical gap between stacked rows.
    pub row_margin: f64,
    /// Approximate label glyph width, used for row packing.
    pub char_width: f64,
    /// Height of the aggregated histogram strip.
    pub histogram_height: f64,
    pub exon_color: Color,
    pub cds_color: Color,
    pub intron_color: Color,
    pub label_color: Color,
    pub histogram_color: Color,
}

impl Default for GeneTrackStyle {
    fn default() -> Self {
        Self {
            bar_height: 10.0,
            label_height: 10.0,
            row_margin: 2.0,
            char_width: 6.0,
            histogram_height: 30.0,
            exon_color: Color::Blue,
            cds_color: Color::LightBlue,
            intron_color: Color::Gray,
            label_color: Color::White,
            histogram_color: Color::Blue,
        }
    }
}

/// Builds the gene track scene from cached records.
pub struct GeneRenderStrategy {
    pub style: GeneTrackStyle,
    pub thresholds: HistogramThresholds,
}

impl GeneRenderStrategy {
    pub fn new() -> Self {
        Self {
            style: GeneTrackStyle::default(),
            thresholds: HistogramThresholds::default(),
        }
    }

    fn gene_height(&self, gene: &Gene) -> f64 {
        let lanes = gene.transcripts.len().max(1) as f64;
        self.style.label_height + lanes * self.style.bar_height
    }

    /// Horizontal pixel extent a gene occupies, label included.
    fn gene_extent(&self, viewport: &Viewport, gene: &Gene) -> (f64, f64) {
        let x1 = viewport.project_brush_bp_to_pixel(gene.start_index as f64);
        let x2 = viewport.project_brush_bp_to_pixel(gene.end_index as f64);
        let label_width = gene
            .name
            .as_deref()
            .map_or(0.0, |name| name.len() as f64 * self.style.char_width);
        (x1, x2.max(x1 + label_width))
    }

    fn draw_histogram(&self, viewport: &Viewport, cache: &TrackCache, container: &mut Container) -> f64 {
        let partial = partial_histogram(viewport, &cache.data);
        let scale = if partial.max > 0.0 {
            self.style.histogram_height / partial.max
        } else {
            0.0
        };
        for record in &cache.data {
            let x1 = viewport.project_brush_bp_to_pixel(record.start_index as f64);
            let x2 = viewport.project_brush_bp_to_pixel(record.end_index as f64);
            let bar = (record.value * scale).min(self.style.histogram_height);
            if bar <= 0.0 {
                continue;
            }
            container.push(Primitive::Rect {
                x: x1,
                y: self.style.histogram_height - bar,
                width: (x2 - x1).max(1.0),
                height: bar,
                color: self.style.histogram_color,
            });
        }
        self.style.histogram_height
    }

    fn draw_gene(&self, viewport: &Viewport, gene: &Gene, y: f64, container: &mut Container) {
        let (x1, x2) = self.gene_extent(viewport, gene);
        if let Some(name) = &gene.name {
            let text = format!("{name} {}", gene.strand.symbol());
            let width = text.len() as f64 * self.style.char_width;
            container.push(Primitive::Label(Label::new(
                text,
                x1,
                y,
                width,
                self.style.label_color,
            )));
        }
        let mut lane_y = y + self.style.label_height;
        if gene.transcripts.is_empty() {
            let gx2 = viewport.project_brush_bp_to_pixel(gene.end_index as f64);
            container.push(Primitive::Rect {
                x: x1,
                y: lane_y,
                width: (gx2 - x1).max(1.0),
                height: self.style.bar_height,
                color: self.style.exon_color,
            });
        } else {
            for transcript in &gene.transcripts {
                self.draw_transcript(viewport, transcript, lane_y, container);
                lane_y += self.style.bar_height;
            }
        }

        let mut info = vec![("Type".to_string(), "gene".to_string())];
        if let Some(name) = &gene.name {
            info.push(("Name".to_string(), name.clone()));
        }
        info.push((
            "Range".to_string(),
            format!("{}-{}", gene.start_index, gene.end_index),
        ));
        info.push(("Strand".to_string(), gene.strand.symbol().to_string()));
        if !gene.transcripts.is_empty() {
            info.push(("Transcripts".to_string(), gene.transcripts.len().to_string()));
        }
        container.add_hit_region(HitRegion {
            x1,
            y1: y,
            x2,
            y2: y + self.gene_height(gene),
            info,
        });
    }

    fn draw_transcript(
        &self,
        viewport: &Viewport,
        transcript: &Transcript,
        y: f64,
        container: &mut Container,
    ) {
        for block in &transcript.structure {
            self.draw_block(viewport, block, y, container);
        }
    }

    fn draw_block(
        &self,
        viewport: &Viewport,
        block: &StructureBlock,
        y: f64,
        container: &mut Container,
    ) {
        let mid = y + self.style.bar_height / 2.0;
        if block.is_empty {
            let x1 = viewport.project_brush_bp_to_pixel(block.start_index as f64);
            let x2 = viewport.project_brush_bp_to_pixel(block.end_index as f64);
            if x2 > x1 {
                container.push(Primitive::Line {
                    x1,
                    y1: mid,
                    x2,
                    y2: mid,
                    color: self.style.intron_color,
                });
            }
            return;
        }
        for item in &block.items {
            let x1 = viewport.project_brush_bp_to_pixel(item.start_index as f64);
            let x2 = viewport.project_brush_bp_to_pixel(item.end_index as f64);
            let (item_y, item_height, color) = if item.is_coding() {
                (y, self.style.bar_height, self.style.cds_color)
            } else {
                // non-coding exon parts draw at half height, centered
                (
                    y + self.style.bar_height / 4.0,
                    self.style.bar_height / 2.0,
                    self.style.exon_color,
                )
            };
            container.push(Primitive::Rect {
                x: x1,
                y: item_y,
                width: (x2 - x1).max(1.0),
                height: item_height,
                color,
            });
            for codon in &item.codons {
                let cx1 = viewport.project_brush_bp_to_pixel(codon.start_index as f64);
                let cx2 = viewport.project_brush_bp_to_pixel(codon.end_index as f64 + 1.0);
                if let Some(symbol) = &codon.symbol
                    && cx2 - cx1 >= self.style.char_width
                {
                    container.push(Primitive::Label(Label::new(
                        symbol.clone(),
                        cx1,
                        y,
                        self.style.char_width,
                        self.style.label_color,
                    )));
                }
            }
        }
    }
}

impl Default for GeneRenderStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderStrategy for GeneRenderStrategy {
    fn build(&mut self, viewport: &Viewport, cache: &TrackCache, container: &mut Container) -> f64 {
        let points = full_histogram(&cache.data);
        if is_histogram_mode(viewport, &points, &self.thresholds) {
            return self.draw_histogram(viewport, cache, container);
        }

        let genes = transform(&cache.data);
        // greedy row packing: widest genes first, each dropped into the
        // first row with no horizontal overlap
        let mut rows: Vec<(Vec<(f64, f64)>, f64)> = Vec::new();
        let mut placements: Vec<(usize, usize)> = Vec::new();
        for (gene_index, gene) in genes.iter().enumerate() {
            let extent = self.gene_extent(viewport, gene);
            let height = self.gene_height(gene);
            let row_index = rows
                .iter()
                .position(|(intervals, _)| {
                    intervals
                        .iter()
                        .all(|&(x1, x2)| extent.1 < x1 || extent.0 > x2)
                })
                .unwrap_or_else(|| {
                    rows.push((Vec::new(), 0.0));
                    rows.len() - 1
                });
            rows[row_index].0.push(extent);
            rows[row_index].1 = rows[row_index].1.max(height);
            placements.push((gene_index, row_index));
        }

        let mut row_offsets = Vec::with_capacity(rows.len());
        let mut y = 0.0;
        for (_, row_height) in &rows {
            row_offsets.push(y);
            y += row_height + self.style.row_margin;
        }
        for (gene_index, row_index) in placements {
            self.draw_gene(viewport, &genes[gene_index], row_offsets[row_index], container);
        }
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FeatureRecord;
    use crate::viewport::Brush;

    fn gene_record(name: &str, start: u64, end: u64) -> FeatureRecord {
        let mut record = FeatureRecord {
            start_index: start,
            end_index: end,
            feature: Some("gene".into()),
            value: 1.0,
            ..Default::default()
        };
        record.attributes.insert("Name".into(), name.into());
        record
    }

    fn cache_with(records: Vec<FeatureRecord>) -> TrackCache {
        TrackCache {
            data: records,
            ..Default::default()
        }
    }

    fn viewport() -> Viewport {
        Viewport::new(Brush::new(1.0, 10_000.0), 1000.0, 100_000)
    }

    #[test]
    fn test_disjoint_genes_share_a_row() {
        let cache = cache_with(vec![
            gene_record("A", 100, 1000),
            gene_record("B", 5000, 6000),
        ]);
        let mut strategy = GeneRenderStrategy::new();
        let mut container = Container::new();
        let height = strategy.build(&viewport(), &cache, &mut container);
        // one row: label + one lane + margin
        assert_eq!(height, 10.0 + 10.0 + 2.0);
    }

    #[test]
    fn test_overlapping_genes_stack() {
        let cache = cache_with(vec![
            gene_record("A", 100, 5000),
            gene_record("B", 4000, 9000),
        ]);
        let mut strategy = GeneRenderStrategy::new();
        let mut container = Container::new();
        let height = strategy.build(&viewport(), &cache, &mut container);
        assert_eq!(height, 2.0 * (10.0 + 10.0 + 2.0));
    }

    #[test]
    fn test_gene_without_transcripts_draws_plain_bar() {
        let cache = cache_with(vec![gene_record("A", 100, 1000)]);
        let mut strategy = GeneRenderStrategy::new();
        let mut container = Container::new();
        strategy.build(&viewport(), &cache, &mut container);
        let rects = container
            .children
            .iter()
            .filter(|p| matches!(p, Primitive::Rect { .. }))
            .count();
        assert_eq!(rects, 1);
        let labels = container
            .children
            .iter()
            .filter(|p| matches!(p, Primitive::Label(_)))
            .count();
        assert_eq!(labels, 1);
    }

    #[test]
    fn test_transcript_draws_exons_and_introns() {
        let mut gene = gene_record("A", 100, 2000);
        gene.items.push(FeatureRecord {
            start_index: 100,
            end_index: 2000,
            feature: Some("mRNA".into()),
            items: vec![
                FeatureRecord {
                    start_index: 100,
                    end_index: 400,
                    feature: Some("exon".into()),
                    ..Default::default()
                },
                FeatureRecord {
                    start_index: 1500,
                    end_index: 2000,
                    feature: Some("exon".into()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        });
        let cache = cache_with(vec![gene]);
        let mut strategy = GeneRenderStrategy::new();
        let mut container = Container::new();
        strategy.build(&viewport(), &cache, &mut container);
        let rects = container
            .children
            .iter()
            .filter(|p| matches!(p, Primitive::Rect { .. }))
            .count();
        let lines = container
            .children
            .iter()
            .filter(|p| matches!(p, Primitive::Line { .. }))
            .count();
        assert_eq!(rects, 2);
        assert_eq!(lines, 1);
    }

    #[test]
    fn test_hit_region_covers_gene() {
        let cache = cache_with(vec![gene_record("BRCA1", 100, 1000)]);
        let mut strategy = GeneRenderStrategy::new();
        let mut container = Container::new();
        strategy.build(&viewport(), &cache, &mut container);
        assert_eq!(container.hit_regions.len(), 1);
        let region = &container.hit_regions[0];
        assert!(region.info.iter().any(|(k, v)| k == "Name" && v == "BRCA1"));
        assert!(region.info.iter().any(|(k, _)| k == "Range"));
    }

    #[test]
    fn test_dense_cache_switches_to_histogram() {
        let records: Vec<_> = (0..300)
            .map(|i| gene_record("g", i * 30 + 1, i * 30 + 20))
            .collect();
        let cache = cache_with(records);
        let mut strategy = GeneRenderStrategy::new();
        let mut container = Container::new();
        let vp = Viewport::new(Brush::new(1.0, 9000.0), 500.0, 100_000);
        let height = strategy.build(&vp, &cache, &mut container);
        assert_eq!(height, strategy.style.histogram_height);
        assert!(container.hit_regions.is_empty());
    }

    #[test]
    fn test_empty_cache_builds_nothing() {
        let cache = cache_with(vec![]);
        let mut strategy = GeneRenderStrategy::new();
        let mut container = Container::new();
        let height = strategy.build(&viewport(), &cache, &mut container);
        assert_eq!(height, 0.0);
        assert!(container.children.is_empty());
    }
}
