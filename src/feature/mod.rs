pub mod histogram;
pub mod record;
pub mod structure;

pub use histogram::{
    HistogramPoint, HistogramThresholds, PartialHistogram, full_histogram, is_histogram_mode,
    partial_histogram,
};
pub use record::{FeatureRecord, Strand, resolve_feature_name};
pub use structure::{
    Codon, Gene, StructureBlock, StructureItem, Transcript, attach_codons, exon_intron_structure,
    transform,
};
