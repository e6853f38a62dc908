//! Constants shared by the generator, the aggregators and the views.

/// Edge length of a hotspot grid cell, in degrees.
pub const GRID_SIZE: f64 = 0.1;

/// A cell must hold strictly more accidents than this to count as a hotspot.
pub const HOTSPOT_MIN_COUNT: usize = 5;

/// Maximum number of hotspot cells reported.
pub const HOTSPOT_LIMIT: usize = 20;

// Risk tiers used when coloring hotspots
pub const HIGH_RISK_COUNT: usize = 15;
pub const MEDIUM_RISK_COUNT: usize = 10;

// Coordinates outside these bounds are treated as missing
pub const MAX_LATITUDE: f64 = 90.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// Number of records in a synthetic dataset unless overridden.
pub const DEFAULT_SAMPLE_SIZE: usize = 2000;

/// Seed used when none is given, so repeated runs agree.
pub const DEFAULT_SEED: u64 = 42;

// Synthetic records scatter around the geographic center of the contiguous US
pub const CENTER_LATITUDE: f64 = 39.8283;
pub const CENTER_LONGITUDE: f64 = -98.5795;
pub const LATITUDE_SPREAD: f64 = 2.0;
pub const LONGITUDE_SPREAD: f64 = 10.0;

pub const WEATHER_CONDITIONS: &[&str] = &["Clear", "Cloudy", "Rain", "Snow", "Fog", "Sleet"];
pub const CROSSING_TYPES: &[&str] = &["Public", "Private", "Pedestrian"];
pub const WARNING_TYPES: &[&str] = &[
    "Automatic Gates",
    "Flashing Lights",
    "Crossbucks Only",
    "Stop Signs",
];
