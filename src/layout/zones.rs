//! Nested, collapsible vertical layout for multi-row tracks.
//!
//! Zones form a tree configured once from a definition tree; the only
//! runtime mutation is toggling a zone's `expanded` flag through the
//! path-addressed API. Stored heights are cached eagerly at configuration
//! time; *effective* heights respect the expand/collapse state at query
//! time.

/// Definition of one vertical zone, as supplied by configuration.
#[derive(Debug, Clone, Default)]
pub struct ZoneDef {
    pub name: String,
    /// Defaults to expanded when absent.
    pub expanded: Option<bool>,
    pub zones: Vec<ZoneDef>,
    /// Explicit row height for arbitrary names; well-known names fall back
    /// to the configured defaults.
    pub height: Option<f64>,
    pub margin: Option<f64>,
}

impl ZoneDef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_zones(name: impl Into<String>, zones: Vec<ZoneDef>) -> Self {
        Self {
            name: name.into(),
            zones,
            ..Default::default()
        }
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }
}

/// Row-height defaults plus the fixed height used by any collapsed zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneLayoutConfig {
    pub aminoacid_height: f64,
    pub sequence_height: f64,
    pub strand_height: f64,
    pub default_height: f64,
    pub default_margin: f64,
    pub collapsed_height: f64,
}

impl Default for ZoneLayoutConfig {
    fn default() -> Self {
        Self {
            aminoacid_height: 20.0,
            sequence_height: 15.0,
            strand_height: 10.0,
            default_height: 10.0,
            default_margin: 2.0,
            collapsed_height: 10.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Zone {
    name: String,
    expanded: bool,
    zones: Vec<Zone>,
    /// Top margin.
    margin: f64,
    /// Cached at configuration time: explicit/default for leaves, sum of
    /// children's (margin + height) for parents.
    height: f64,
}

/// Collapsible vertical layout manager addressed by case-insensitive name
/// paths.
#[derive(Debug, Clone, Default)]
pub struct ZoneLayout {
    zones: Vec<Zone>,
    config: ZoneLayoutConfig,
}

impl ZoneLayout {
    pub fn new(config: ZoneLayoutConfig) -> Self {
        Self {
            zones: Vec::new(),
            config,
        }
    }

    /// Replace the zone tree from a definition tree.
    pub fn configure(&mut self, defs: &[ZoneDef]) {
        self.zones = defs.iter().map(|def| self.build_zone(def)).collect();
    }

    fn build_zone(&self, def: &ZoneDef) -> Zone {
        let zones: Vec<Zone> = def.zones.iter().map(|child| self.build_zone(child)).collect();
        let height = if zones.is_empty() {
            def.height.unwrap_or_else(|| self.default_height(&def.name))
        } else {
            zones.iter().map(|z| z.margin + z.height).sum()
        };
        Zone {
            name: def.name.clone(),
            expanded: def.expanded.unwrap_or(true),
            zones,
            margin: def.margin.unwrap_or(self.config.default_margin),
            height,
        }
    }

    fn default_height(&self, name: &str) -> f64 {
        if name.eq_ignore_ascii_case("aminoacid") {
            self.config.aminoacid_height
        } else if name.eq_ignore_ascii_case("sequence") {
            self.config.sequence_height
        } else if name.eq_ignore_ascii_case("strand") {
            self.config.strand_height
        } else {
            self.config.default_height
        }
    }

    /// Top y position of the zone at `path`, or `None` when any path segment
    /// is not configured.
    pub fn get_start_position(&self, path: &[&str]) -> Option<f64> {
        start_position(&self.zones, path, &self.config)
    }

    /// Bottom y position of the zone at `path` (start plus effective
    /// height).
    pub fn get_end_position(&self, path: &[&str]) -> Option<f64> {
        let start = self.get_start_position(path)?;
        Some(start + self.get_height(path)?)
    }

    /// Effective height of the zone at `path`: the fixed collapsed constant
    /// when collapsed, otherwise the live sum over expanded children.
    pub fn get_height(&self, path: &[&str]) -> Option<f64> {
        find(&self.zones, path).map(|zone| effective_height(zone, &self.config))
    }

    /// Summed effective height of all top-level zones.
    pub fn get_total_height(&self) -> f64 {
        self.zones
            .iter()
            .map(|zone| {
                let margin = if zone.expanded { zone.margin } else { 0.0 };
                margin + effective_height(zone, &self.config)
            })
            .sum()
    }

    /// Expand the zone at `path`. Returns false when the path is missing.
    pub fn expand(&mut self, path: &[&str]) -> bool {
        match find_mut(&mut self.zones, path) {
            Some(zone) => {
                zone.expanded = true;
                true
            }
            None => false,
        }
    }

    /// Collapse the zone at `path`. Returns false when the path is missing.
    pub fn collapse(&mut self, path: &[&str]) -> bool {
        match find_mut(&mut self.zones, path) {
            Some(zone) => {
                zone.expanded = false;
                true
            }
            None => false,
        }
    }

    pub fn is_expanded(&self, path: &[&str]) -> bool {
        find(&self.zones, path).is_some_and(|zone| zone.expanded)
    }
}

/// Walk siblings in order, accumulating each preceding sibling's effective
/// height plus its top margin (margin counted only while that sibling is
/// expanded), then recurse into the matched zone for the rest of the path.
fn start_position(zones: &[Zone], path: &[&str], config: &ZoneLayoutConfig) -> Option<f64> {
    let (head, rest) = path.split_first()?;
    let mut offset = 0.0;
    for zone in zones {
        if zone.name.eq_ignore_ascii_case(head) {
            return if rest.is_empty() {
                Some(offset)
            } else {
                start_position(&zone.zones, rest, config).map(|inner| offset + inner)
            };
        }
        if zone.expanded {
            offset += zone.margin;
        }
        offset += effective_height(zone, config);
    }
    None
}

fn effective_height(zone: &Zone, config: &ZoneLayoutConfig) -> f64 {
    if !zone.expanded {
        return config.collapsed_height;
    }
    if zone.zones.is_empty() {
        return zone.height;
    }
    zone.zones
        .iter()
        .map(|child| effective_height(child, config))
        .sum()
}

fn find<'a>(zones: &'a [Zone], path: &[&str]) -> Option<&'a Zone> {
    let (head, rest) = path.split_first()?;
    let zone = zones
        .iter()
        .find(|zone| zone.name.eq_ignore_ascii_case(head))?;
    if rest.is_empty() {
        Some(zone)
    } else {
        find(&zone.zones, rest)
    }
}

fn find_mut<'a>(zones: &'a mut [Zone], path: &[&str]) -> Option<&'a mut Zone> {
    let (head, rest) = path.split_first()?;
    let zone = zones
        .iter_mut()
        .find(|zone| zone.name.eq_ignore_ascii_case(head))?;
    if rest.is_empty() {
        Some(zone)
    } else {
        find_mut(&mut zone.zones, rest)
    }
}
