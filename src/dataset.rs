//! Reading and writing accident datasets as CSV.
//!
//! Uploaded files are matched by header name, so columns may appear in any
//! order and in camelCase, snake_case or spaced form. Cells that cannot be
//! coerced are left empty on the record instead of failing the import.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Month, Weekday};
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::{MAX_LATITUDE, MAX_LONGITUDE};
use crate::error::{IngestError, OutputError};
use crate::models::{month_abbrev, weekday_name, AccidentRecord, MONTHS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
    Id,
    Hour,
    DayOfWeek,
    Month,
    MonthNum,
    Latitude,
    Longitude,
    Weather,
    RoadCondition,
    CrossingType,
    WarningType,
    Visibility,
    Fatalities,
    Injuries,
    VehicleSpeed,
    TrainSpeed,
}

impl Field {
    fn from_header(header: &str) -> Option<Field> {
        let normalized: String = header
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        let field = match normalized.as_str() {
            "id" => Field::Id,
            "hour" => Field::Hour,
            "dayofweek" | "day" | "weekday" => Field::DayOfWeek,
            "month" => Field::Month,
            "monthnum" | "monthindex" => Field::MonthNum,
            "latitude" | "lat" => Field::Latitude,
            "longitude" | "lng" | "lon" => Field::Longitude,
            "weather" => Field::Weather,
            "roadcondition" => Field::RoadCondition,
            "crossingtype" => Field::CrossingType,
            "warningtype" => Field::WarningType,
            "visibility" => Field::Visibility,
            "fatalities" => Field::Fatalities,
            "injuries" => Field::Injuries,
            "vehiclespeed" => Field::VehicleSpeed,
            "trainspeed" => Field::TrainSpeed,
            _ => return None,
        };
        Some(field)
    }
}

/// Header position of every recognized column. The first occurrence wins.
struct ColumnMap(HashMap<Field, usize>);

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut columns = HashMap::new();
        for (position, header) in headers.iter().enumerate() {
            match Field::from_header(header) {
                Some(field) => {
                    columns.entry(field).or_insert(position);
                }
                None => debug!("Ignoring unrecognized column {header:?}"),
            }
        }
        Self(columns)
    }

    fn cell<'r>(&self, row: &'r csv::StringRecord, field: Field) -> Option<&'r str> {
        self.0
            .get(&field)
            .and_then(|position| row.get(*position))
            .filter(|value| !value.is_empty())
    }

    fn text(&self, row: &csv::StringRecord, field: Field) -> Option<String> {
        self.cell(row, field).map(str::to_string)
    }

    fn number<T: std::str::FromStr>(&self, row: &csv::StringRecord, field: Field) -> Option<T> {
        self.cell(row, field).and_then(|value| value.parse().ok())
    }

    /// `None` once the row needs a fresh id and none are left.
    fn to_record(
        &self,
        row: &csv::StringRecord,
        ids: &mut IdAllocator,
    ) -> Option<AccidentRecord> {
        let id = ids.claim(self.number(row, Field::Id))?;
        let month = self
            .number::<usize>(row, Field::MonthNum)
            .and_then(|index| MONTHS.get(index).copied())
            .or_else(|| self.cell(row, Field::Month).and_then(parse_month));

        Some(AccidentRecord {
            id,
            hour: self.cell(row, Field::Hour).and_then(parse_hour),
            day_of_week: self
                .cell(row, Field::DayOfWeek)
                .and_then(|value| value.parse::<Weekday>().ok()),
            month,
            latitude: self
                .number::<f64>(row, Field::Latitude)
                .filter(|lat| lat.abs() <= MAX_LATITUDE),
            longitude: self
                .number::<f64>(row, Field::Longitude)
                .filter(|lng| lng.abs() <= MAX_LONGITUDE),
            weather: self.text(row, Field::Weather),
            road_condition: self.text(row, Field::RoadCondition),
            crossing_type: self.text(row, Field::CrossingType),
            warning_type: self.text(row, Field::WarningType),
            visibility: self.text(row, Field::Visibility),
            fatalities: self.number(row, Field::Fatalities).unwrap_or(0),
            injuries: self.number(row, Field::Injuries).unwrap_or(0),
            vehicle_speed: self.number(row, Field::VehicleSpeed),
            train_speed: self.number(row, Field::TrainSpeed),
        })
    }
}

/// Accepts "7" as well as "07:00".
fn parse_hour(value: &str) -> Option<u8> {
    let hour = value.split(':').next()?.trim().parse::<u8>().ok()?;
    (hour < 24).then_some(hour)
}

fn parse_month(value: &str) -> Option<Month> {
    value.parse::<Month>().ok()
}

/// Hands out record ids that are unique within one import.
///
/// Fresh ids are always above every id seen so far; `next` is `None` once
/// `u32::MAX` has been used.
#[derive(Debug)]
struct IdAllocator {
    used: HashSet<u32>,
    next: Option<u32>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            used: HashSet::new(),
            next: Some(0),
        }
    }
}

impl IdAllocator {
    fn claim(&mut self, requested: Option<u32>) -> Option<u32> {
        if let Some(id) = requested {
            if self.used.insert(id) {
                if self.next.is_some_and(|next| id >= next) {
                    self.next = id.checked_add(1);
                }
                return Some(id);
            }
            debug!("Duplicate id {id}, assigning a fresh one");
        }

        let id = self.next?;
        self.used.insert(id);
        self.next = id.checked_add(1);
        Some(id)
    }
}

/// Parse accident rows from CSV text.
///
/// Rows with fewer than two non-empty cells are dropped. Rows the CSV reader
/// rejects, and rows that would need an id past `u32::MAX`, are skipped with
/// a warning.
pub fn parse_records<R: Read>(input: R) -> Result<Vec<AccidentRecord>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let columns = ColumnMap::from_headers(&headers);
    if columns.0.is_empty() {
        warn!("No recognized columns in header: {headers:?}");
    }

    let mut ids = IdAllocator::default();
    let mut records = Vec::new();

    for (line, result) in reader.records().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping data row {}: {e}", line + 1);
                continue;
            }
        };

        if row.iter().filter(|cell| !cell.is_empty()).count() < 2 {
            continue;
        }
        match columns.to_record(&row, &mut ids) {
            Some(record) => records.push(record),
            None => warn!("Skipping data row {}: no unused ids left", line + 1),
        }
    }

    Ok(records)
}

/// Load an uploaded `.csv` file.
pub fn load_csv(path: &Path) -> Result<Vec<AccidentRecord>, IngestError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(IngestError::NotCsv(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let records = parse_records(file)?;
    if records.is_empty() {
        return Err(IngestError::Empty(path.display().to_string()));
    }

    info!("Loaded {} accidents from {}", records.len(), path.display());
    Ok(records)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CsvRow<'a> {
    id: u32,
    hour: Option<u8>,
    day_of_week: Option<&'static str>,
    month: Option<&'static str>,
    month_num: Option<usize>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    weather: Option<&'a str>,
    road_condition: Option<&'a str>,
    crossing_type: Option<&'a str>,
    warning_type: Option<&'a str>,
    fatalities: u32,
    injuries: u32,
    vehicle_speed: Option<u32>,
    train_speed: Option<u32>,
    visibility: Option<&'a str>,
}

impl<'a> From<&'a AccidentRecord> for CsvRow<'a> {
    fn from(record: &'a AccidentRecord) -> Self {
        Self {
            id: record.id,
            hour: record.hour,
            day_of_week: record.day_of_week.map(weekday_name),
            month: record.month.map(month_abbrev),
            month_num: record.month_index(),
            latitude: record.latitude,
            longitude: record.longitude,
            weather: record.weather.as_deref(),
            road_condition: record.road_condition.as_deref(),
            crossing_type: record.crossing_type.as_deref(),
            warning_type: record.warning_type.as_deref(),
            fatalities: record.fatalities,
            injuries: record.injuries,
            vehicle_speed: record.vehicle_speed,
            train_speed: record.train_speed,
            visibility: record.visibility.as_deref(),
        }
    }
}

/// Write records with a camelCase header row that `load_csv` reads back.
pub fn write_csv(records: &[AccidentRecord], path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }
    writer.flush()?;

    info!("Wrote {} accidents to {}", records.len(), path.display());
    Ok(())
}
