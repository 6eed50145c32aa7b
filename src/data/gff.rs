//! GFF3-backed feature source.
//!
//! Loads an annotation file once and assembles its flat records into nested
//! gene → transcript → exon/CDS [`FeatureRecord`]s through their ID/Parent
//! attributes, so downstream code sees the same shape a remote annotation
//! service would deliver.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use noodles::gff;

use crate::data::{FeatureSource, FetchError};
use crate::feature::{FeatureRecord, Strand};

/// One GFF3 line lifted into engine terms, before hierarchy assembly.
#[derive(Debug, Clone)]
pub struct FlatRecord {
    pub id: Option<String>,
    pub parent: Option<String>,
    pub chrom: String,
    pub record: FeatureRecord,
}

/// Feature source over a single chromosome of a GFF3 file.
pub struct GffFeatureSource {
    records: Vec<FeatureRecord>,
}

impl GffFeatureSource {
    /// Read `path` and keep the records of `chromosome`.
    pub fn open(path: &Path, chromosome: &str) -> Result<Self> {
        let mut reader = File::open(path)
            .map(BufReader::new)
            .map(gff::io::Reader::new)
            .with_context(|| format!("failed to open GFF file: {}", path.display()))?;

        let mut flat = Vec::new();
        for result in reader.record_bufs() {
            let record = result.context("failed to read GFF record")?;
            let converted = convert_record(&record);
            if converted.chrom == chromosome {
                flat.push(converted);
            }
        }
        debug!(
            "loaded {} records for {chromosome} from {}",
            flat.len(),
            path.display()
        );
        Ok(Self {
            records: assemble_hierarchy(flat),
        })
    }

    /// Highest end coordinate among loaded records; a usable stand-in for
    /// the chromosome size when none is supplied.
    pub fn max_end(&self) -> u64 {
        self.records
            .iter()
            .map(|record| record.end_index)
            .max()
            .unwrap_or(0)
    }
}

impl FeatureSource for GffFeatureSource {
    fn fetch(
        &self,
        start_index: u64,
        end_index: u64,
        _scale_factor: f64,
    ) -> Result<Vec<FeatureRecord>, FetchError> {
        if end_index < start_index {
            return Err(FetchError::InvalidRange {
                start: start_index,
                end: end_index,
            });
        }
        Ok(self
            .records
            .iter()
            .filter(|record| record.overlaps(start_index, end_index))
            .cloned()
            .collect())
    }
}

fn convert_record(record: &gff::feature::RecordBuf) -> FlatRecord {
    use gff::feature::record::Strand as GffStrand;
    use gff::feature::record_buf::attributes::field::Value;

    let mut attributes = HashMap::new();
    for (key, value) in record.attributes().as_ref().iter() {
        let value = match value {
            Value::String(s) => s.to_string(),
            Value::Array(values) => values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(","),
        };
        attributes.insert(key.to_string(), value);
    }

    let strand = match record.strand() {
        GffStrand::Forward => Strand::Forward,
        GffStrand::Reverse => Strand::Reverse,
        _ => Strand::Unspecified,
    };

    FlatRecord {
        id: attributes.get("ID").cloned(),
        // multi-parent features keep their first parent
        parent: attributes
            .get("Parent")
            .and_then(|p| p.split(',').next().map(String::from)),
        chrom: record.reference_sequence_name().to_string(),
        record: FeatureRecord {
            start_index: record.start().get() as u64,
            end_index: record.end().get() as u64,
            feature: Some(record.ty().to_string()),
            attributes,
            items: Vec::new(),
            strand,
            value: record.score().map_or(1.0, f64::from),
        },
    }
}

/// Nest flat records through their ID/Parent links. Records whose parent is
/// absent from the file become roots.
pub fn assemble_hierarchy(flat: Vec<FlatRecord>) -> Vec<FeatureRecord> {
    let ids: HashSet<String> = flat.iter().filter_map(|f| f.id.clone()).collect();

    let mut children_of: HashMap<String, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();
    for (index, flat_record) in flat.iter().enumerate() {
        match &flat_record.parent {
            Some(parent) if ids.contains(parent) => {
                children_of.entry(parent.clone()).or_default().push(index);
            }
            _ => roots.push(index),
        }
    }

    let mut nodes: Vec<Option<FlatRecord>> = flat.into_iter().map(Some).collect();
    roots
        .iter()
        .filter_map(|&root| take_subtree(root, &mut nodes, &children_of))
        .collect()
}

fn take_subtree(
    index: usize,
    nodes: &mut [Option<FlatRecord>],
    children_of: &HashMap<String, Vec<usize>>,
) -> Option<FeatureRecord> {
    let flat_record = nodes[index].take()?;
    let mut record = flat_record.record;
    if let Some(id) = &flat_record.id
        && let Some(children) = children_of.get(id)
    {
        for &child in children {
            if let Some(child_record) = take_subtree(child, nodes, children_of) {
                record.items.push(child_record);
            }
        }
    }
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(
        id: Option<&str>,
        parent: Option<&str>,
        feature: &str,
        start: u64,
        end: u64,
    ) -> FlatRecord {
        FlatRecord {
            id: id.map(String::from),
            parent: parent.map(String::from),
            chrom: "chr1".into(),
            record: FeatureRecord {
                start_index: start,
                end_index: end,
                feature: Some(feature.into()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_assemble_two_level_hierarchy() {
        let records = assemble_hierarchy(vec![
            flat(Some("gene1"), None, "gene", 1, 1000),
            flat(Some("tx1"), Some("gene1"), "mRNA", 1, 1000),
            flat(None, Some("tx1"), "exon", 100, 300),
            flat(None, Some("tx1"), "CDS", 150, 250),
        ]);
        assert_eq!(records.len(), 1);
        let gene = &records[0];
        assert_eq!(gene.items.len(), 1);
        assert_eq!(gene.items[0].items.len(), 2);
    }

    #[test]
    fn test_assemble_orphan_becomes_root() {
        let records = assemble_hierarchy(vec![
            flat(Some("gene1"), None, "gene", 1, 1000),
            flat(None, Some("missing-parent"), "exon", 100, 300),
        ]);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_assemble_sibling_genes() {
        let records = assemble_hierarchy(vec![
            flat(Some("gene1"), None, "gene", 1, 1000),
            flat(Some("gene2"), None, "gene", 2000, 3000),
            flat(None, Some("gene2"), "mRNA", 2000, 3000),
        ]);
        assert_eq!(records.len(), 2);
        assert!(records[0].items.is_empty());
        assert_eq!(records[1].items.len(), 1);
    }

    #[test]
    fn test_assemble_empty_input() {
        assert!(assemble_hierarchy(Vec::new()).is_empty());
    }
}
