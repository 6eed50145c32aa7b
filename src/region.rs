use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::viewport::Brush;

#[derive(Error, Debug)]
pub enum RegionError {
    #[error("invalid region format: expected 'chr:start-end', got '{0}'")]
    InvalidFormat(String),
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] std::num::ParseIntError),
    #[error("start ({start}) must be less than end ({end})")]
    InvalidRange { start: u64, end: u64 },
}

/// A genomic region specified as chromosome:start-end (1-based, inclusive).
///
/// Regions come from the command line or a location box; the engine itself
/// works in [`Brush`] coordinates, which a region converts into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

impl Region {
    pub fn new(chrom: impl Into<String>, start: u64, end: u64) -> Result<Self, RegionError> {
        if start > end {
            return Err(RegionError::InvalidRange { start, end });
        }
        Ok(Self {
            chrom: chrom.into(),
            start,
            end,
        })
    }

    /// Length of the region in bases.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The region as a viewport brush.
    pub fn to_brush(&self) -> Brush {
        Brush::new(self.start as f64, self.end as f64)
    }

    /// Copy of the region clamped to `[1, chromosome_size]`.
    pub fn clamped(&self, chromosome_size: u64) -> Self {
        Self {
            chrom: self.chrom.clone(),
            start: self.start.max(1).min(chromosome_size),
            end: self.end.min(chromosome_size).max(1),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.end)
    }
}

impl FromStr for Region {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chrom, rest) = s
            .split_once(':')
            .ok_or_else(|| RegionError::InvalidFormat(s.to_string()))?;
        let (start_str, end_str) = rest
            .split_once('-')
            .ok_or_else(|| RegionError::InvalidFormat(s.to_string()))?;
        let start: u64 = start_str.parse()?;
        let end: u64 = end_str.parse()?;
        Region::new(chrom, start, end)
    }
}
