//! Transforms raw nested annotation records into exon/intron block
//! structures with optional codon overlays.

use crate::feature::record::{FeatureRecord, Strand, resolve_feature_name};

/// A codon-position entry attached to coding-sequence items.
#[derive(Debug, Clone, PartialEq)]
pub struct Codon {
    pub start_index: u64,
    pub end_index: u64,
    /// One-letter aminoacid symbol, when known.
    pub symbol: Option<String>,
}

/// One segment of a transcript partition, assigned to at most one child
/// record of the transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureItem {
    pub start_index: u64,
    pub end_index: u64,
    pub feature: Option<String>,
    /// Index of the transcript child this segment was taken from; `None`
    /// for intronic segments.
    pub source_child_index: Option<usize>,
    pub codons: Vec<Codon>,
}

impl StructureItem {
    pub fn is_empty(&self) -> bool {
        self.source_child_index.is_none()
    }

    pub fn is_coding(&self) -> bool {
        self.feature
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("cds"))
    }
}

/// A contiguous run of same-emptiness segments: either one intronic stretch
/// or a run of abutting exonic/coding items.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureBlock {
    pub start_index: u64,
    pub end_index: u64,
    pub is_empty: bool,
    pub items: Vec<StructureItem>,
}

/// An analyzed transcript with its exon/intron partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub name: Option<String>,
    pub start_index: u64,
    pub end_index: u64,
    pub strand: Strand,
    pub structure: Vec<StructureBlock>,
}

/// An analyzed gene with its transcripts.
#[derive(Debug, Clone, PartialEq)]
pub struct Gene {
    pub name: Option<String>,
    pub start_index: u64,
    pub end_index: u64,
    pub strand: Strand,
    pub transcripts: Vec<Transcript>,
}

impl Gene {
    pub fn len(&self) -> u64 {
        self.end_index.saturating_sub(self.start_index) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end_index < self.start_index
    }
}

/// Whether a tentative segment assignment should give way to `target`.
///
/// Source records may contain overlapping features. A segment already
/// assigned to a coding sequence is never overwritten; otherwise only exon
/// and CDS features claim segments away from an existing assignment.
fn should_replace_feature(current: Option<&str>, target: Option<&str>) -> bool {
    let Some(current) = current else {
        return true;
    };
    let Some(target) = target else {
        return false;
    };
    if current.eq_ignore_ascii_case("cds") {
        return false;
    }
    target.eq_ignore_ascii_case("exon") || target.eq_ignore_ascii_case("cds")
}

/// Partition a transcript's span into alternating intronic (empty) and
/// exonic/coding (non-empty) blocks.
///
/// Breakpoints are the transcript bounds plus every child's start and end.
/// Each breakpoint pair forms a tentative segment, defaulted to intronic and
/// claimed by the children that fully contain it. Adjacent segments claimed
/// by the same child are merged back; intronic blocks are trimmed by one
/// basepair on each side so they never overdraw neighboring exon edges.
pub fn exon_intron_structure(transcript: &FeatureRecord) -> Vec<StructureBlock> {
    let mut coordinates = vec![transcript.start_index, transcript.end_index];
    for item in &transcript.items {
        coordinates.push(item.start_index);
        coordinates.push(item.end_index);
    }
    coordinates.sort_unstable();
    coordinates.dedup();

    let mut segments: Vec<StructureItem> = Vec::new();
    for pair in coordinates.windows(2) {
        let mut segment = StructureItem {
            start_index: pair[0],
            end_index: pair[1],
            feature: None,
            source_child_index: None,
            codons: Vec::new(),
        };
        for (index, child) in transcript.items.iter().enumerate() {
            if !should_replace_feature(segment.feature.as_deref(), child.feature.as_deref()) {
                continue;
            }
            if segment.start_index >= child.start_index && segment.end_index <= child.end_index {
                segment.feature = child.feature.clone();
                segment.source_child_index = Some(index);
            }
        }
        segments.push(segment);
    }

    // splits of the same child are coalesced back into one segment
    let mut merged: Vec<StructureItem> = Vec::new();
    for segment in segments {
        match merged.last_mut() {
            Some(last) if last.source_child_index == segment.source_child_index => {
                last.end_index = segment.end_index;
            }
            _ => merged.push(segment),
        }
    }

    let mut blocks: Vec<StructureBlock> = Vec::new();
    for item in merged {
        let is_empty = item.is_empty();
        match blocks.last_mut() {
            Some(block) if block.is_empty == is_empty => {
                block.end_index = item.end_index;
                block.items.push(item);
            }
            _ => blocks.push(StructureBlock {
                start_index: item.start_index,
                end_index: item.end_index,
                is_empty,
                items: vec![item],
            }),
        }
    }

    for block in &mut blocks {
        if block.is_empty {
            block.start_index += 1;
            block.end_index = block.end_index.saturating_sub(1);
        }
    }

    blocks
}

/// Attach codon entries to the coding-sequence items that fully contain
/// them. Entries spanning more than three basepairs (or inverted) are
/// skipped.
pub fn attach_codons(blocks: &mut [StructureBlock], codons: &[Codon]) {
    for block in blocks.iter_mut().filter(|b| !b.is_empty) {
        for item in block.items.iter_mut().filter(|i| i.is_coding()) {
            for codon in codons {
                if codon.start_index > codon.end_index
                    || codon.end_index - codon.start_index > 2
                {
                    continue;
                }
                if item.start_index <= codon.start_index && item.end_index >= codon.end_index {
                    item.codons.push(codon.clone());
                }
            }
        }
    }
}

/// Analyze raw records into gene models, widest spans first so enclosing
/// genes are laid out before the features they contain.
pub fn transform(records: &[FeatureRecord]) -> Vec<Gene> {
    let mut genes: Vec<Gene> = records
        .iter()
        .filter(|record| record.is_feature("gene"))
        .map(analyze_gene)
        .collect();
    genes.sort_by(|a, b| b.len().cmp(&a.len()));
    genes
}

fn analyze_gene(record: &FeatureRecord) -> Gene {
    let transcripts = record
        .items
        .iter()
        .filter(|item| item.feature.is_some())
        .map(analyze_transcript)
        .collect();
    Gene {
        name: resolve_feature_name(record, &[]),
        start_index: record.start_index,
        end_index: record.end_index,
        strand: record.strand,
        transcripts,
    }
}

fn analyze_transcript(record: &FeatureRecord) -> Transcript {
    let name = record
        .attributes
        .get("transcript_name")
        .or_else(|| record.attributes.get("transcript_symbol"))
        .cloned()
        .or_else(|| resolve_feature_name(record, &[]));
    Transcript {
        name,
        start_index: record.start_index,
        end_index: record.end_index,
        strand: record.strand,
        structure: exon_intron_structure(record),
    }
}
