use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::aggregate;
use crate::hotspot;
use crate::models::{AccidentRecord, AggregateRow, RiskTier};

fn write_rows(output: &mut String, rows: &[AggregateRow], empty: &str) {
    if rows.iter().all(|row| row.accidents == 0) {
        let _ = writeln!(output, "{empty}");
        return;
    }

    for row in rows {
        let _ = write!(
            output,
            "- {}: {} accidents, {} fatalities, {} injuries",
            row.key, row.accidents, row.fatalities, row.injuries
        );
        if let Some(rate) = row.fatality_rate {
            let _ = write!(output, " (fatality rate {rate:.1}%)");
        }
        if let Some(average) = row.avg_per_month {
            let _ = write!(output, " (avg {average:.1} per month)");
        }
        let _ = writeln!(output);
    }
}

fn risk_label(risk: RiskTier) -> &'static str {
    match risk {
        RiskTier::High => "high risk",
        RiskTier::Medium => "medium risk",
        RiskTier::Lower => "lower risk",
    }
}

pub fn build_report(
    source: &str,
    generated_at: DateTime<Utc>,
    records: &[AccidentRecord],
) -> String {
    let summary = aggregate::overview(records);
    let insights = aggregate::key_insights(records);

    let mut output = String::new();

    let _ = writeln!(output, "# Highway-Rail Grade Crossing Safety Report");
    let _ = writeln!(
        output,
        "Generated {} from {} ({} records)",
        generated_at.format("%Y-%m-%d %H:%M UTC"),
        source,
        records.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Total accidents: {}", summary.total_accidents);
    let _ = writeln!(output, "- Total fatalities: {}", summary.total_fatalities);
    let _ = writeln!(output, "- Total injuries: {}", summary.total_injuries);
    let _ = writeln!(output, "- Fatality rate: {:.2}%", summary.fatality_rate);

    let sections: [(&str, Vec<AggregateRow>); 6] = [
        ("Accidents by Hour of Day", aggregate::by_hour(records)),
        ("Day of Week", aggregate::by_day_of_week(records)),
        ("Seasons", aggregate::by_season(records)),
        ("Weather Conditions", aggregate::by_weather(records)),
        ("Road Conditions", aggregate::by_road_condition(records)),
        ("Warning Systems", aggregate::by_warning_type(records)),
    ];

    for (title, rows) in sections.iter() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {title}");
        write_rows(&mut output, rows, "No accidents recorded for this breakdown.");
    }

    let cells = hotspot::hotspots(records);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Hotspots");

    if cells.is_empty() {
        let _ = writeln!(output, "No grid cell has more than five accidents.");
    } else {
        for cell in cells.iter() {
            let _ = writeln!(
                output,
                "- ({:.1}, {:.1}): {} accidents, {} fatalities, {}",
                cell.lat,
                cell.lng,
                cell.count,
                cell.fatalities,
                risk_label(cell.risk)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Key Insights");

    match insights.peak_hour {
        Some(row) => {
            let _ = writeln!(
                output,
                "- Peak risk hour: {} with {} accidents",
                row.key, row.accidents
            );
        }
        None => {
            let _ = writeln!(output, "- Peak risk hour: no timed accidents");
        }
    }
    match insights.riskiest_weather {
        Some(row) => {
            let _ = writeln!(
                output,
                "- Weather impact: {} has the highest fatality rate ({:.1}%)",
                row.key,
                row.fatality_rate.unwrap_or(0.0)
            );
        }
        None => {
            let _ = writeln!(output, "- Weather impact: no weather recorded");
        }
    }
    match insights.safest_warning_system {
        Some(row) => {
            let _ = writeln!(
                output,
                "- Safety systems: {} has the lowest fatality rate ({:.1}%)",
                row.key,
                row.fatality_rate.unwrap_or(0.0)
            );
        }
        None => {
            let _ = writeln!(output, "- Safety systems: no warning systems recorded");
        }
    }

    output
}
