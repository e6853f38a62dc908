//! Synthetic grade-crossing accidents for demos and tests.

use log::debug;
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::config::{
    CENTER_LATITUDE, CENTER_LONGITUDE, CROSSING_TYPES, LATITUDE_SPREAD, LONGITUDE_SPREAD,
    WARNING_TYPES, WEATHER_CONDITIONS,
};
use crate::models::{AccidentRecord, MONTHS, WEEKDAYS};

/// Road surface implied by the weather at generation time.
pub fn road_condition_for(weather: &str) -> &'static str {
    match weather {
        "Rain" => "Wet",
        "Snow" => "Snow Covered",
        "Sleet" => "Icy",
        _ => "Dry",
    }
}

pub fn visibility_for(weather: &str) -> &'static str {
    match weather {
        "Fog" => "Poor",
        "Clear" => "Good",
        _ => "Fair",
    }
}

fn pick<'a>(rng: &mut Pcg32, values: &[&'a str]) -> &'a str {
    values[rng.random_range(0..values.len())]
}

/// `count` records with ids `0..count`. The same seed always yields the same
/// dataset.
pub fn sample(count: usize, seed: u64) -> Vec<AccidentRecord> {
    let mut rng = Pcg32::seed_from_u64(seed);
    debug!("Generating {count} synthetic accidents (seed {seed})");

    (0..count)
        .map(|id| {
            let hour = rng.random_range(0..24u8);
            let day_of_week = WEEKDAYS[rng.random_range(0..WEEKDAYS.len())];
            let month = MONTHS[rng.random_range(0..MONTHS.len())];
            let latitude = CENTER_LATITUDE + (rng.random::<f64>() - 0.5) * LATITUDE_SPREAD;
            let longitude = CENTER_LONGITUDE + (rng.random::<f64>() - 0.5) * LONGITUDE_SPREAD;
            let weather = pick(&mut rng, WEATHER_CONDITIONS);
            let crossing_type = pick(&mut rng, CROSSING_TYPES);
            let warning_type = pick(&mut rng, WARNING_TYPES);
            let fatalities = if rng.random_bool(0.15) {
                rng.random_range(1..=3)
            } else {
                0
            };
            let injuries = if rng.random_bool(0.3) {
                rng.random_range(1..=5)
            } else {
                0
            };

            AccidentRecord {
                id: id as u32,
                hour: Some(hour),
                day_of_week: Some(day_of_week),
                month: Some(month),
                latitude: Some(latitude),
                longitude: Some(longitude),
                weather: Some(weather.to_string()),
                road_condition: Some(road_condition_for(weather).to_string()),
                crossing_type: Some(crossing_type.to_string()),
                warning_type: Some(warning_type.to_string()),
                visibility: Some(visibility_for(weather).to_string()),
                fatalities,
                injuries,
                vehicle_speed: Some(rng.random_range(15..75)),
                train_speed: Some(rng.random_range(10..60)),
            }
        })
        .collect()
}
