pub mod zones;

pub use zones::{ZoneDef, ZoneLayout, ZoneLayoutConfig};
