use chrono::{Month, Weekday};
use serde::Serialize;

/// Weekdays in display order, Sunday first.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Months indexed 0 (January) through 11 (December).
pub const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// One grade-crossing accident.
///
/// Synthetic records fill every field. Uploaded records may not, so each
/// grouping dimension is optional and a record missing one is left out of
/// that dimension's aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct AccidentRecord {
    pub id: u32,
    pub hour: Option<u8>,
    pub day_of_week: Option<Weekday>,
    pub month: Option<Month>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub weather: Option<String>,
    pub road_condition: Option<String>,
    pub crossing_type: Option<String>,
    pub warning_type: Option<String>,
    pub visibility: Option<String>,
    pub fatalities: u32,
    pub injuries: u32,
    pub vehicle_speed: Option<u32>,
    pub train_speed: Option<u32>,
}

impl AccidentRecord {
    /// A record carrying only its id.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            hour: None,
            day_of_week: None,
            month: None,
            latitude: None,
            longitude: None,
            weather: None,
            road_condition: None,
            crossing_type: None,
            warning_type: None,
            visibility: None,
            fatalities: 0,
            injuries: 0,
            vehicle_speed: None,
            train_speed: None,
        }
    }

    /// Zero-based month index, January = 0.
    pub fn month_index(&self) -> Option<usize> {
        self.month.map(|month| month.number_from_month() as usize - 1)
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

/// Three-letter month name, e.g. "Jan".
pub fn month_abbrev(month: Month) -> &'static str {
    &month.name()[..3]
}

/// Grouped statistics for one value of a dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRow {
    pub key: String,
    pub accidents: usize,
    pub fatalities: u64,
    pub injuries: u64,
    /// Fatalities per hundred accidents, one decimal place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatality_rate: Option<f64>,
    /// Season rows only: accidents spread over the season's three months.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_per_month: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskTier {
    High,
    Medium,
    Lower,
}

/// One cell of the hotspot grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotspotCell {
    pub lat: f64,
    pub lng: f64,
    pub count: usize,
    pub fatalities: u64,
    pub risk: RiskTier,
}

/// Dataset-wide totals shown above every view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_accidents: usize,
    pub total_fatalities: u64,
    pub total_injuries: u64,
    /// Percentage with two decimals.
    pub fatality_rate: f64,
}

/// Data-driven versions of the dashboard's standing insights.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInsights {
    pub peak_hour: Option<AggregateRow>,
    pub riskiest_weather: Option<AggregateRow>,
    pub safest_warning_system: Option<AggregateRow>,
}
