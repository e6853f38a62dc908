//! Grid-bucketed accident density.
//!
//! Coordinates are floored onto a 0.1 degree grid, so a cell's corner is
//! always its south-west edge, including west of the prime meridian.

use std::collections::HashMap;

use log::debug;

use crate::config::{
    GRID_SIZE, HIGH_RISK_COUNT, HOTSPOT_LIMIT, HOTSPOT_MIN_COUNT, MAX_LATITUDE, MAX_LONGITUDE,
    MEDIUM_RISK_COUNT,
};
use crate::models::{AccidentRecord, HotspotCell, RiskTier};

#[derive(Debug)]
struct Bucket {
    cell: (i64, i64),
    count: usize,
    fatalities: u64,
}

/// Only called with coordinates inside the globe's bounds, where the cast is
/// exact.
fn grid_index(coordinate: f64) -> i64 {
    (coordinate / GRID_SIZE).floor() as i64
}

pub fn risk_tier(count: usize) -> RiskTier {
    if count > HIGH_RISK_COUNT {
        RiskTier::High
    } else if count > MEDIUM_RISK_COUNT {
        RiskTier::Medium
    } else {
        RiskTier::Lower
    }
}

/// Densest grid cells, most accidents first.
///
/// Cells with `HOTSPOT_MIN_COUNT` or fewer accidents are dropped, ties keep
/// the order in which their first record appeared, and at most
/// `HOTSPOT_LIMIT` cells are returned. Records without a latitude within
/// ±90 and a longitude within ±180 are ignored.
pub fn hotspots(records: &[AccidentRecord]) -> Vec<HotspotCell> {
    let mut index: HashMap<(i64, i64), usize> = HashMap::new();
    let mut buckets: Vec<Bucket> = Vec::new();

    for record in records {
        let (Some(lat), Some(lng)) = (record.latitude, record.longitude) else {
            continue;
        };
        if !(lat.abs() <= MAX_LATITUDE && lng.abs() <= MAX_LONGITUDE) {
            continue;
        }

        let cell = (grid_index(lat), grid_index(lng));
        let position = *index.entry(cell).or_insert_with(|| {
            buckets.push(Bucket {
                cell,
                count: 0,
                fatalities: 0,
            });
            buckets.len() - 1
        });

        let bucket = &mut buckets[position];
        bucket.count += 1;
        bucket.fatalities += u64::from(record.fatalities);
    }

    debug!("{} grid cells from {} records", buckets.len(), records.len());

    let mut dense: Vec<Bucket> = buckets
        .into_iter()
        .filter(|bucket| bucket.count > HOTSPOT_MIN_COUNT)
        .collect();
    // sort_by is stable
    dense.sort_by(|a, b| b.count.cmp(&a.count));
    dense.truncate(HOTSPOT_LIMIT);

    dense
        .into_iter()
        .map(|bucket| HotspotCell {
            lat: bucket.cell.0 as f64 * GRID_SIZE,
            lng: bucket.cell.1 as f64 * GRID_SIZE,
            count: bucket.count,
            fatalities: bucket.fatalities,
            risk: risk_tier(bucket.count),
        })
        .collect()
}
