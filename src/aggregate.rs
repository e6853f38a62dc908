use std::cmp::Ordering;
use std::collections::HashMap;

use log::debug;

use crate::models::{
    weekday_name, AccidentRecord, AggregateRow, KeyInsights, Overview, WEEKDAYS,
};

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    count: usize,
    fatalities: u64,
    injuries: u64,
}

impl Tally {
    fn add(&mut self, record: &AccidentRecord) {
        self.count += 1;
        self.fatalities += u64::from(record.fatalities);
        self.injuries += u64::from(record.injuries);
    }

    fn into_row(self, key: impl Into<String>) -> AggregateRow {
        AggregateRow {
            key: key.into(),
            accidents: self.count,
            fatalities: self.fatalities,
            injuries: self.injuries,
            fatality_rate: None,
            avg_per_month: None,
        }
    }

    fn fatality_rate(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            round_to(self.fatalities as f64 / self.count as f64 * 100.0, 1)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];

    /// Season of a zero-based month index. December opens winter.
    pub fn of_month(index: usize) -> Option<Season> {
        match index {
            11 | 0 | 1 => Some(Season::Winter),
            2..=4 => Some(Season::Spring),
            5..=7 => Some(Season::Summer),
            8..=10 => Some(Season::Fall),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Tallies a fixed domain of `len` slots. Records whose slot is `None` or out
/// of range are skipped.
fn tally_fixed(
    records: &[AccidentRecord],
    len: usize,
    slot: impl Fn(&AccidentRecord) -> Option<usize>,
) -> Vec<Tally> {
    let mut tallies = vec![Tally::default(); len];
    let mut skipped = 0usize;

    for record in records {
        match slot(record).and_then(|index| tallies.get_mut(index)) {
            Some(tally) => tally.add(record),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("{skipped} records lacked the grouped dimension");
    }
    tallies
}

/// Tallies an open domain, keeping categories in first-seen order.
fn tally_observed(
    records: &[AccidentRecord],
    key: impl Fn(&AccidentRecord) -> Option<&str>,
) -> Vec<(String, Tally)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Tally)> = Vec::new();

    for record in records {
        let Some(value) = key(record) else {
            continue;
        };
        let position = *index.entry(value).or_insert_with(|| {
            groups.push((value.to_string(), Tally::default()));
            groups.len() - 1
        });
        groups[position].1.add(record);
    }

    groups
}

fn rated_rows(groups: Vec<(String, Tally)>) -> Vec<AggregateRow> {
    groups
        .into_iter()
        .map(|(key, tally)| {
            let rate = tally.fatality_rate();
            AggregateRow {
                fatality_rate: Some(rate),
                ..tally.into_row(key)
            }
        })
        .collect()
}

/// Twenty-four rows keyed "00:00" through "23:00".
pub fn by_hour(records: &[AccidentRecord]) -> Vec<AggregateRow> {
    tally_fixed(records, 24, |record| record.hour.map(usize::from))
        .into_iter()
        .enumerate()
        .map(|(hour, tally)| tally.into_row(format!("{hour:02}:00")))
        .collect()
}

/// Seven rows, Sunday through Saturday.
pub fn by_day_of_week(records: &[AccidentRecord]) -> Vec<AggregateRow> {
    let tallies = tally_fixed(records, WEEKDAYS.len(), |record| {
        record
            .day_of_week
            .map(|day| day.num_days_from_sunday() as usize)
    });

    WEEKDAYS
        .iter()
        .zip(tallies)
        .map(|(day, tally)| tally.into_row(weekday_name(*day)))
        .collect()
}

/// Four rows, Winter through Fall, each with its monthly average.
pub fn by_season(records: &[AccidentRecord]) -> Vec<AggregateRow> {
    let tallies = tally_fixed(records, Season::ALL.len(), |record| {
        record
            .month_index()
            .and_then(Season::of_month)
            .map(Season::slot)
    });

    Season::ALL
        .iter()
        .zip(tallies)
        .map(|(season, tally)| AggregateRow {
            avg_per_month: Some(round_to(tally.count as f64 / 3.0, 1)),
            ..tally.into_row(season.name())
        })
        .collect()
}

pub fn by_weather(records: &[AccidentRecord]) -> Vec<AggregateRow> {
    rated_rows(tally_observed(records, |record| record.weather.as_deref()))
}

pub fn by_road_condition(records: &[AccidentRecord]) -> Vec<AggregateRow> {
    rated_rows(tally_observed(records, |record| record.road_condition.as_deref()))
}

pub fn by_warning_type(records: &[AccidentRecord]) -> Vec<AggregateRow> {
    rated_rows(tally_observed(records, |record| record.warning_type.as_deref()))
}

pub fn overview(records: &[AccidentRecord]) -> Overview {
    let mut total = Tally::default();
    for record in records {
        total.add(record);
    }

    let fatality_rate = if total.count == 0 {
        0.0
    } else {
        round_to(total.fatalities as f64 / total.count as f64 * 100.0, 2)
    };

    Overview {
        total_accidents: total.count,
        total_fatalities: total.fatalities,
        total_injuries: total.injuries,
        fatality_rate,
    }
}

/// First row for which `better` holds against every earlier pick.
fn pick(
    rows: Vec<AggregateRow>,
    better: impl Fn(&AggregateRow, &AggregateRow) -> bool,
) -> Option<AggregateRow> {
    rows.into_iter().fold(None, |best, row| match best {
        Some(current) if !better(&row, &current) => Some(current),
        _ => Some(row),
    })
}

fn rate_cmp(a: &AggregateRow, b: &AggregateRow) -> Ordering {
    a.fatality_rate
        .unwrap_or(0.0)
        .partial_cmp(&b.fatality_rate.unwrap_or(0.0))
        .unwrap_or(Ordering::Equal)
}

pub fn key_insights(records: &[AccidentRecord]) -> KeyInsights {
    let hours: Vec<AggregateRow> = by_hour(records)
        .into_iter()
        .filter(|row| row.accidents > 0)
        .collect();

    KeyInsights {
        peak_hour: pick(hours, |row, best| row.accidents > best.accidents),
        riskiest_weather: pick(by_weather(records), |row, best| {
            rate_cmp(row, best) == Ordering::Greater
        }),
        safest_warning_system: pick(by_warning_type(records), |row, best| {
            rate_cmp(row, best) == Ordering::Less
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Month, Weekday};
    use pretty_assertions::assert_eq;

    fn record(id: u32) -> AccidentRecord {
        AccidentRecord::new(id)
    }

    fn with_weather(id: u32, weather: &str, fatalities: u32) -> AccidentRecord {
        AccidentRecord {
            weather: Some(weather.to_string()),
            fatalities,
            ..record(id)
        }
    }

    fn at_hour(id: u32, hour: u8) -> AccidentRecord {
        AccidentRecord {
            hour: Some(hour),
            ..record(id)
        }
    }

    #[test]
    fn rain_example_yields_single_rated_row() {
        let records: Vec<AccidentRecord> = (0..10)
            .map(|id| with_weather(id, "Rain", u32::from(id < 2)))
            .collect();

        let rows = by_weather(&records);
        assert_eq!(
            rows,
            vec![AggregateRow {
                key: "Rain".to_string(),
                accidents: 10,
                fatalities: 2,
                injuries: 0,
                fatality_rate: Some(20.0),
                avg_per_month: None,
            }]
        );
    }

    #[test]
    fn open_domains_keep_first_seen_order() {
        let records = vec![
            with_weather(0, "Fog", 0),
            with_weather(1, "Clear", 1),
            with_weather(2, "Fog", 0),
            with_weather(3, "Hail", 0),
        ];

        let keys: Vec<String> = by_weather(&records).into_iter().map(|row| row.key).collect();
        assert_eq!(keys, vec!["Fog", "Clear", "Hail"]);
    }

    #[test]
    fn open_domains_are_empty_without_input() {
        assert!(by_weather(&[]).is_empty());
        assert!(by_road_condition(&[]).is_empty());
        assert!(by_warning_type(&[]).is_empty());
    }

    #[test]
    fn hourly_rows_cover_the_day_even_when_empty() {
        let rows = by_hour(&[]);
        assert_eq!(rows.len(), 24);
        assert_eq!(rows[0].key, "00:00");
        assert_eq!(rows[7].key, "07:00");
        assert_eq!(rows[23].key, "23:00");
        assert!(rows
            .iter()
            .all(|row| row.accidents == 0 && row.fatality_rate.is_none()));
    }

    #[test]
    fn hourly_counts_skip_missing_and_out_of_range_hours() {
        let records = vec![
            AccidentRecord {
                fatalities: 1,
                ..at_hour(0, 8)
            },
            AccidentRecord {
                injuries: 3,
                ..at_hour(1, 8)
            },
            at_hour(2, 24),
            record(3),
        ];

        let rows = by_hour(&records);
        assert_eq!(rows[8].accidents, 2);
        assert_eq!(rows[8].fatalities, 1);
        assert_eq!(rows[8].injuries, 3);
        assert_eq!(rows.iter().map(|row| row.accidents).sum::<usize>(), 2);
    }

    #[test]
    fn weekdays_run_sunday_to_saturday() {
        let records: Vec<AccidentRecord> = [Weekday::Sat, Weekday::Sun, Weekday::Sun]
            .into_iter()
            .zip(0..)
            .map(|(day, id)| AccidentRecord {
                day_of_week: Some(day),
                ..record(id)
            })
            .collect();

        let rows = by_day_of_week(&records);
        let keys: Vec<&str> = rows.iter().map(|row| row.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "Sunday",
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday"
            ]
        );
        assert_eq!(rows[0].accidents, 2);
        assert_eq!(rows[1].accidents, 0);
        assert_eq!(rows[6].accidents, 1);
    }

    #[test]
    fn seasons_wrap_december_into_winter() {
        let months = [
            Month::December,
            Month::January,
            Month::February,
            Month::March,
            Month::September,
        ];
        let records: Vec<AccidentRecord> = months
            .into_iter()
            .zip(0..)
            .map(|(month, id)| AccidentRecord {
                month: Some(month),
                ..record(id)
            })
            .collect();

        let rows = by_season(&records);
        let summary: Vec<(&str, usize, Option<f64>)> = rows
            .iter()
            .map(|row| (row.key.as_str(), row.accidents, row.avg_per_month))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Winter", 3, Some(1.0)),
                ("Spring", 1, Some(0.3)),
                ("Summer", 0, Some(0.0)),
                ("Fall", 1, Some(0.3)),
            ]
        );
    }

    #[test]
    fn zero_count_rate_is_zero() {
        assert_eq!(Tally::default().fatality_rate(), 0.0);
    }

    #[test]
    fn overview_rate_uses_two_decimals() {
        let records: Vec<AccidentRecord> = (0..3)
            .map(|id| AccidentRecord {
                fatalities: u32::from(id == 0),
                injuries: 2,
                ..record(id)
            })
            .collect();

        let summary = overview(&records);
        assert_eq!(summary.total_accidents, 3);
        assert_eq!(summary.total_fatalities, 1);
        assert_eq!(summary.total_injuries, 6);
        assert_eq!(summary.fatality_rate, 33.33);
        assert_eq!(overview(&[]).fatality_rate, 0.0);
    }

    #[test]
    fn huge_uploaded_counts_sum_without_overflow() {
        let text = "hour,weather,fatalities,injuries\n\
                    1,Rain,4294967295,4294967295\n\
                    1,Rain,4294967295,1\n";
        let records = crate::dataset::parse_records(text.as_bytes()).expect("parse");
        let expected = 2 * u64::from(u32::MAX);

        let weather = by_weather(&records);
        assert_eq!(weather[0].fatalities, expected);
        assert_eq!(weather[0].injuries, u64::from(u32::MAX) + 1);
        assert_eq!(by_hour(&records)[1].fatalities, expected);
        assert_eq!(overview(&records).total_fatalities, expected);
    }

    #[test]
    fn aggregators_are_idempotent() {
        let records = crate::generate::sample(300, 9);
        assert_eq!(by_hour(&records), by_hour(&records));
        assert_eq!(by_day_of_week(&records), by_day_of_week(&records));
        assert_eq!(by_season(&records), by_season(&records));
        assert_eq!(by_weather(&records), by_weather(&records));
        assert_eq!(by_road_condition(&records), by_road_condition(&records));
        assert_eq!(by_warning_type(&records), by_warning_type(&records));
        assert_eq!(overview(&records), overview(&records));
        assert_eq!(key_insights(&records), key_insights(&records));
    }

    #[test]
    fn fixed_domain_counts_add_up_to_input() {
        let records = crate::generate::sample(500, 3);
        let hourly: usize = by_hour(&records).iter().map(|row| row.accidents).sum();
        let daily: usize = by_day_of_week(&records).iter().map(|row| row.accidents).sum();
        let seasonal: usize = by_season(&records).iter().map(|row| row.accidents).sum();
        assert_eq!(hourly, 500);
        assert_eq!(daily, 500);
        assert_eq!(seasonal, 500);
    }

    #[test]
    fn insights_pick_extremes_with_first_seen_ties() {
        let records = vec![
            AccidentRecord {
                hour: Some(17),
                ..with_weather(0, "Clear", 0)
            },
            AccidentRecord {
                hour: Some(7),
                ..with_weather(1, "Fog", 1)
            },
            AccidentRecord {
                hour: Some(17),
                ..with_weather(2, "Snow", 1)
            },
            AccidentRecord {
                warning_type: Some("Crossbucks Only".to_string()),
                ..record(3)
            },
            AccidentRecord {
                warning_type: Some("Automatic Gates".to_string()),
                ..record(4)
            },
        ];

        let insights = key_insights(&records);
        assert_eq!(
            insights.peak_hour.map(|row| row.key),
            Some("17:00".to_string())
        );
        assert_eq!(
            insights.riskiest_weather.map(|row| row.key),
            Some("Fog".to_string())
        );
        assert_eq!(
            insights.safest_warning_system.map(|row| row.key),
            Some("Crossbucks Only".to_string())
        );
    }

    #[test]
    fn insights_are_empty_without_records() {
        let insights = key_insights(&[]);
        assert!(insights.peak_hour.is_none());
        assert!(insights.riskiest_weather.is_none());
        assert!(insights.safest_warning_system.is_none());
    }
}
