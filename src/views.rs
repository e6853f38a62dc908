//! Chart-ready views over a record set.
//!
//! Each `Analysis` bundles the charts of one dashboard tab. Rows are plain
//! JSON objects keyed the way a charting library expects, so the same
//! dashboard can be printed as tables or written out as JSON.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::Path;

use clap::ValueEnum;
use log::{debug, info};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::aggregate;
use crate::error::OutputError;
use crate::hotspot;
use crate::models::{AccidentRecord, AggregateRow, HotspotCell, KeyInsights, Overview};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Analysis {
    Overview,
    Time,
    Weather,
    Hotspots,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Scatter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub key: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    pub title: &'static str,
    pub kind: ChartKind,
    pub x_key: &'static str,
    pub series: Vec<Series>,
    pub rows: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub analysis: Analysis,
    pub summary: Overview,
    pub charts: Vec<Chart>,
    pub insights: KeyInsights,
}

const ACCIDENTS: Series = Series {
    key: "accidents",
    label: "Accidents",
};
const FATALITIES: Series = Series {
    key: "fatalities",
    label: "Fatalities",
};
const INJURIES: Series = Series {
    key: "injuries",
    label: "Injuries",
};
const FATALITY_RATE: Series = Series {
    key: "fatalityRate",
    label: "Fatality Rate (%)",
};

/// Rename each row's group key to `dimension`.
fn keyed_rows(dimension: &str, rows: &[AggregateRow]) -> Vec<Value> {
    rows.iter()
        .map(|row| {
            let mut object = Map::new();
            object.insert(dimension.to_string(), json!(row.key));
            object.insert("accidents".to_string(), json!(row.accidents));
            object.insert("fatalities".to_string(), json!(row.fatalities));
            object.insert("injuries".to_string(), json!(row.injuries));
            if let Some(rate) = row.fatality_rate {
                object.insert("fatalityRate".to_string(), json!(rate));
            }
            if let Some(average) = row.avg_per_month {
                object.insert("avgPerMonth".to_string(), json!(average));
            }
            Value::Object(object)
        })
        .collect()
}

fn hotspot_rows(cells: &[HotspotCell]) -> Vec<Value> {
    cells
        .iter()
        .map(|cell| {
            json!({
                "lat": aggregate::round_to(cell.lat, 1),
                "lng": aggregate::round_to(cell.lng, 1),
                "count": cell.count,
                "fatalities": cell.fatalities,
                "risk": cell.risk,
            })
        })
        .collect()
}

fn chart(
    title: &'static str,
    kind: ChartKind,
    x_key: &'static str,
    series: &[Series],
    rows: Vec<Value>,
) -> Chart {
    Chart {
        title,
        kind,
        x_key,
        series: series.to_vec(),
        rows,
    }
}

fn charts_for(analysis: Analysis, records: &[AccidentRecord]) -> Vec<Chart> {
    match analysis {
        Analysis::Overview => vec![
            chart(
                "Accidents by Hour of Day",
                ChartKind::Bar,
                "hour",
                &[ACCIDENTS, FATALITIES],
                keyed_rows("hour", &aggregate::by_hour(records)),
            ),
            chart(
                "Accidents by Weather Condition",
                ChartKind::Pie,
                "weather",
                &[ACCIDENTS],
                keyed_rows("weather", &aggregate::by_weather(records)),
            ),
        ],
        Analysis::Time => vec![
            chart(
                "Hourly Distribution",
                ChartKind::Line,
                "hour",
                &[ACCIDENTS, FATALITIES],
                keyed_rows("hour", &aggregate::by_hour(records)),
            ),
            chart(
                "Day of Week Analysis",
                ChartKind::Bar,
                "day",
                &[ACCIDENTS, FATALITIES],
                keyed_rows("day", &aggregate::by_day_of_week(records)),
            ),
            chart(
                "Seasonal Analysis",
                ChartKind::Bar,
                "season",
                &[ACCIDENTS, FATALITIES, INJURIES],
                keyed_rows("season", &aggregate::by_season(records)),
            ),
        ],
        Analysis::Weather => vec![
            chart(
                "Weather Impact Analysis",
                ChartKind::Bar,
                "weather",
                &[ACCIDENTS, FATALITIES, FATALITY_RATE],
                keyed_rows("weather", &aggregate::by_weather(records)),
            ),
            chart(
                "Road Condition Impact",
                ChartKind::Bar,
                "condition",
                &[ACCIDENTS, FATALITIES, FATALITY_RATE],
                keyed_rows("condition", &aggregate::by_road_condition(records)),
            ),
        ],
        Analysis::Hotspots => vec![
            chart(
                "Accident Hotspots",
                ChartKind::Scatter,
                "lng",
                &[
                    Series {
                        key: "count",
                        label: "Accidents",
                    },
                    FATALITIES,
                ],
                hotspot_rows(&hotspot::hotspots(records)),
            ),
            chart(
                "Warning System Effectiveness",
                ChartKind::Bar,
                "warningType",
                &[ACCIDENTS, FATALITY_RATE],
                keyed_rows("warningType", &aggregate::by_warning_type(records)),
            ),
        ],
    }
}

/// Build the selected tab from scratch.
pub fn build(analysis: Analysis, records: &[AccidentRecord]) -> Dashboard {
    debug!("Building {analysis:?} view over {} records", records.len());
    Dashboard {
        analysis,
        summary: aggregate::overview(records),
        charts: charts_for(analysis, records),
        insights: aggregate::key_insights(records),
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => "-".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Plain-text tables, one per chart.
pub fn render_text(dashboard: &Dashboard) -> String {
    let mut output = String::new();
    let summary = &dashboard.summary;

    let _ = writeln!(
        output,
        "Accidents: {} | Fatalities: {} | Injuries: {} | Fatality rate: {:.2}%",
        summary.total_accidents,
        summary.total_fatalities,
        summary.total_injuries,
        summary.fatality_rate
    );

    for chart in &dashboard.charts {
        let mut columns = vec![chart.x_key];
        if chart.kind == ChartKind::Scatter {
            columns.push("lat");
        }
        columns.extend(chart.series.iter().map(|series| series.key));
        if chart.kind == ChartKind::Scatter {
            columns.push("risk");
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "{}", chart.title);
        let _ = writeln!(output, "{}", columns.join("\t"));

        if chart.rows.is_empty() {
            let _ = writeln!(output, "(no data)");
            continue;
        }
        for row in &chart.rows {
            let cells: Vec<String> = columns
                .iter()
                .map(|column| cell_text(row.get(*column)))
                .collect();
            let _ = writeln!(output, "{}", cells.join("\t"));
        }
    }

    output
}

/// Write a dashboard as pretty JSON, creating parent directories as needed.
pub fn write_json(dashboard: &Dashboard, path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("path is empty".to_string()));
    }
    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "path is a directory: {}",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, dashboard)?;
    writer.flush()?;

    info!("Wrote {:?} view to {}", dashboard.analysis, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate;

    #[test]
    fn each_view_has_its_charts() {
        let records = generate::sample(400, 2);
        let titles = |analysis| -> Vec<&'static str> {
            build(analysis, &records)
                .charts
                .iter()
                .map(|chart| chart.title)
                .collect()
        };

        assert_eq!(
            titles(Analysis::Overview),
            vec![
                "Accidents by Hour of Day",
                "Accidents by Weather Condition"
            ]
        );
        assert_eq!(titles(Analysis::Time).len(), 3);
        assert_eq!(titles(Analysis::Weather).len(), 2);
        assert_eq!(
            titles(Analysis::Hotspots),
            vec!["Accident Hotspots", "Warning System Effectiveness"]
        );
    }

    #[test]
    fn rows_use_dimension_key_names() {
        let records = generate::sample(100, 3);
        let dashboard = build(Analysis::Weather, &records);
        let road = &dashboard.charts[1];

        assert_eq!(road.x_key, "condition");
        let first = &road.rows[0];
        assert!(first.get("condition").is_some());
        assert!(first.get("fatalityRate").is_some());
        assert!(first.get("key").is_none());
    }

    #[test]
    fn season_rows_carry_monthly_average() {
        let dashboard = build(Analysis::Time, &[]);
        let seasons = &dashboard.charts[2].rows;
        assert_eq!(seasons.len(), 4);
        assert_eq!(seasons[0]["season"], json!("Winter"));
        assert_eq!(seasons[0]["avgPerMonth"], json!(0.0));
    }

    #[test]
    fn empty_dataset_renders_without_panicking() {
        let dashboard = build(Analysis::Hotspots, &[]);
        let text = render_text(&dashboard);
        assert!(text.contains("Accidents: 0"));
        assert!(text.contains("(no data)"));
    }

    #[test]
    fn text_tables_list_every_hour() {
        let records = generate::sample(50, 8);
        let text = render_text(&build(Analysis::Overview, &records));
        assert!(text.contains("hour\taccidents\tfatalities"));
        assert!(text.contains("\n00:00\t"));
        assert!(text.contains("\n23:00\t"));
    }

    #[test]
    fn json_output_round_trips_through_serde() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out").join("time.json");
        let dashboard = build(Analysis::Time, &generate::sample(60, 1));

        write_json(&dashboard, &path).expect("write");
        let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).expect("read"))
            .expect("json");

        assert_eq!(value["analysis"], json!("time"));
        assert_eq!(value["summary"]["totalAccidents"], json!(60));
        assert_eq!(value["charts"][0]["rows"].as_array().map(Vec::len), Some(24));
    }

    #[test]
    fn written_file_holds_the_whole_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("time.json");
        let dashboard = build(Analysis::Time, &generate::sample(3000, 21));
        let expected = serde_json::to_string_pretty(&dashboard).expect("serialize");

        write_json(&dashboard, &path).expect("write");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), expected);
    }

    #[test]
    fn refuses_to_overwrite_a_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dashboard = build(Analysis::Overview, &[]);
        assert!(matches!(
            write_json(&dashboard, dir.path()),
            Err(OutputError::InvalidPath(_))
        ));
    }
}
