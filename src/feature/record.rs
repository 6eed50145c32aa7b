use std::collections::HashMap;

/// Strand of a genomic feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strand {
    Forward,
    Reverse,
    #[default]
    Unspecified,
}

impl Strand {
    pub fn symbol(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
            Strand::Unspecified => '.',
        }
    }
}

/// A raw annotation record as delivered by a data source.
///
/// Records are nested: a `gene` record carries transcript records in
/// `items`, which in turn carry exon/CDS records. Each record lives for one
/// cache generation: fetched, consumed by the structure transformer, then
/// discarded on the next refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    /// 1-based start position on the chromosome (inclusive).
    pub start_index: u64,
    /// 1-based end position on the chromosome (inclusive).
    pub end_index: u64,
    /// Feature type tag (`gene`, `mRNA`, `exon`, `CDS`, ...).
    pub feature: Option<String>,
    pub attributes: HashMap<String, String>,
    /// Nested child records.
    pub items: Vec<FeatureRecord>,
    pub strand: Strand,
    /// Density weight used by histogram aggregation.
    pub value: f64,
}

impl FeatureRecord {
    /// Basepair length of the record (inclusive bounds).
    pub fn len(&self) -> u64 {
        self.end_index.saturating_sub(self.start_index) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end_index < self.start_index
    }

    /// Whether the record intersects `[start, end]`.
    pub fn overlaps(&self, start: u64, end: u64) -> bool {
        self.start_index <= end && self.end_index >= start
    }

    pub fn is_feature(&self, name: &str) -> bool {
        self.feature
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case(name))
    }
}

const NAME_KEYS: [&str; 6] = ["NAME", "Name", "ID", "Id", "ALIAS", "Alias"];
const PREFIXED_SUFFIXES: [&str; 3] = ["_NAME", "_ID", "_SYMBOL"];

/// Resolve a display name for a record from its attributes.
///
/// Tries the common name keys first (exact, then lower-cased), then
/// feature-type-prefixed variants such as `gene_NAME` / `gene_name` /
/// `GENE_SYMBOL`, then any caller-supplied fallback keys.
pub fn resolve_feature_name(record: &FeatureRecord, fallback_keys: &[&str]) -> Option<String> {
    for key in NAME_KEYS {
        if let Some(value) = record.attributes.get(key) {
            return Some(value.clone());
        }
        if let Some(value) = record.attributes.get(&key.to_lowercase()) {
            return Some(value.clone());
        }
    }
    if let Some(feature) = &record.feature {
        for suffix in PREFIXED_SUFFIXES {
            let exact = format!("{feature}{suffix}");
            let lower = exact.to_lowercase();
            let upper = exact.to_uppercase();
            for key in [&exact, &lower, &upper] {
                if let Some(value) = record.attributes.get(key) {
                    return Some(value.clone());
                }
            }
        }
    }
    for key in fallback_keys {
        if let Some(value) = record.attributes.get(*key) {
            return Some(value.clone());
        }
    }
    None
}
