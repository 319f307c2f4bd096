//! Terminal rendering of a `DashboardReport`.
//!
//! Two record tables followed by per-state bar charts and per-incident-type
//! distributions, for the active and recently closed subsets. Chart rows
//! are sorted by count here; the aggregation itself stays insertion-ordered.

use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::analysis::groupings::GroupCounts;
use crate::model::DisasterDeclaration;
use crate::session::DashboardReport;
use crate::states;

const BAR_WIDTH: usize = 40;
const RULE: &str = "═══════════════════════════════════════════════════════════";

const TABLE_HEADERS: [&str; 7] = [
    "Disaster Name",
    "State",
    "State Name",
    "Declared",
    "Incident Begin",
    "Incident End",
    "Incident Type",
];

// ============================================================================
// Public rendering
// ============================================================================

/// Renders the whole dashboard as plain text.
pub fn render_text(report: &DashboardReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "FEMA Active and Recently Closed Disasters");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Source:     {}", report.source);
    let _ = writeln!(out, "As of:      {}", report.reference_instant.format("%Y-%m-%d %H:%M"));
    let _ = writeln!(
        out,
        "Records:    {} received, {} rejected",
        report.records_received, report.records_rejected
    );
    out.push('\n');

    section(&mut out, "Active Disasters");
    let _ = writeln!(out, "Number of Active Disasters: {}", report.active.len());
    out.push_str(&render_table(&report.active));
    out.push('\n');

    section(&mut out, &format!("Disasters Closed in the Last {} Days", report.window_days));
    let _ = writeln!(
        out,
        "Number of Recently Closed Disasters: {} (incidents begun on or after {})",
        report.recently_closed.len(),
        report.window_start.format("%Y-%m-%d")
    );
    out.push_str(&render_table(&report.recently_closed));
    out.push('\n');

    section(&mut out, "Active Disasters by State");
    out.push_str(&render_bar_chart(&report.active_summary.by_state, true));
    out.push('\n');

    section(&mut out, "Recently Closed Disasters by State");
    out.push_str(&render_bar_chart(&report.recently_closed_summary.by_state, true));
    out.push('\n');

    section(&mut out, "Active Disasters by Incident Type");
    out.push_str(&render_distribution(&report.active_summary.by_incident_type));
    out.push('\n');

    section(&mut out, "Recently Closed Disasters by Incident Type");
    out.push_str(&render_distribution(&report.recently_closed_summary.by_incident_type));

    out
}

/// Renders the report as pretty JSON.
pub fn render_json(report: &DashboardReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

// ============================================================================
// Building blocks
// ============================================================================

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "-".repeat(title.chars().count()));
}

fn format_date(value: Option<NaiveDateTime>) -> String {
    value
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn table_row(d: &DisasterDeclaration) -> [String; 7] {
    [
        d.disaster_name.clone(),
        d.state_code.clone(),
        d.state_name.clone(),
        format_date(d.declaration_date),
        format_date(Some(d.incident_begin_date)),
        format_date(d.incident_end_date),
        d.incident_type.clone(),
    ]
}

/// Fixed-width table of the seven display columns.
pub fn render_table(records: &[DisasterDeclaration]) -> String {
    if records.is_empty() {
        return "  (none)\n".to_string();
    }

    let rows: Vec<[String; 7]> = records.iter().map(table_row).collect();
    let mut widths: [usize; 7] = TABLE_HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = TABLE_HEADERS.iter().map(|h| h.to_string()).collect();
    push_row(&mut out, &header, &widths);
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &separator, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    let _ = writeln!(out, "  {}", line.join("  ").trim_end());
}

/// Horizontal bar chart, longest bar scaled to `BAR_WIDTH`.
pub fn render_bar_chart(counts: &GroupCounts, label_states: bool) -> String {
    if counts.is_empty() {
        return "  (no data)\n".to_string();
    }

    let rows = counts.sorted_by_count();
    let max = rows.first().map(|(_, count)| *count).unwrap_or(0).max(1);
    let labels: Vec<String> = rows
        .iter()
        .map(|(key, _)| if label_states { states::display_label(key) } else { key.to_string() })
        .collect();
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for ((_, count), label) in rows.iter().zip(&labels) {
        let bar_len = (count * BAR_WIDTH).div_ceil(max);
        let _ = writeln!(
            out,
            "  {:<width$}  {} {}",
            label,
            "█".repeat(bar_len),
            count,
            width = label_width
        );
    }
    out
}

/// Share of the subset held by each key, as counts and percentages.
pub fn render_distribution(counts: &GroupCounts) -> String {
    if counts.is_empty() {
        return "  (no data)\n".to_string();
    }

    let total = counts.total() as f64;
    let rows = counts.sorted_by_count();
    let label_width = rows.iter().map(|(key, _)| key.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for (key, count) in rows {
        let share = count as f64 / total * 100.0;
        let _ = writeln!(
            out,
            "  {:<width$}  {:>5} {:>6.1}%",
            key,
            count,
            share,
            width = label_width
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::build_report_from_raw;
    use chrono::NaiveDate;
    use serde_json::json;

    fn counts(keys: &[&str]) -> GroupCounts {
        let mut counts = GroupCounts::new();
        for key in keys {
            counts.increment(key);
        }
        counts
    }

    #[test]
    fn test_bar_chart_scales_longest_bar() {
        let chart = render_bar_chart(&counts(&["TX", "TX", "CA"]), false);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  TX"));
        assert_eq!(lines[0].matches('█').count(), BAR_WIDTH);
        assert_eq!(lines[1].matches('█').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn test_bar_chart_labels_states_with_names() {
        let chart = render_bar_chart(&counts(&["CA"]), true);
        assert!(chart.contains("CA (California)"));
    }

    #[test]
    fn test_distribution_shows_percentages() {
        let text = render_distribution(&counts(&["Flood", "Flood", "Fire", "Fire"]));
        assert!(text.contains("50.0%"));
    }

    #[test]
    fn test_empty_artifacts_render_placeholders() {
        assert_eq!(render_table(&[]), "  (none)\n");
        assert_eq!(render_bar_chart(&GroupCounts::new(), true), "  (no data)\n");
        assert_eq!(render_distribution(&GroupCounts::new()), "  (no data)\n");
    }

    #[test]
    fn test_full_report_renders_every_section() {
        let record = match json!({
            "disasterName": "SEVERE STORMS",
            "stateCode": "CA",
            "stateName": "California",
            "declarationDate": "2024-01-10T00:00:00.000Z",
            "incidentBeginDate": "2024-01-01T00:00:00.000Z",
            "incidentEndDate": null,
            "incidentType": "Flood",
        }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let now = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let report = build_report_from_raw(&[record], now, 90, "test");
        let text = render_text(&report);

        assert!(text.contains("Number of Active Disasters: 1"));
        assert!(text.contains("Number of Recently Closed Disasters: 0"));
        assert!(text.contains("Disasters Closed in the Last 90 Days"));
        assert!(text.contains("SEVERE STORMS"));
        assert!(text.contains("2024-01-10"));
    }

    #[test]
    fn test_json_output_uses_camel_case() {
        let now = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let report = build_report_from_raw(&[], now, 90, "test");
        let json = render_json(&report).unwrap();
        assert!(json.contains("\"recentlyClosedSummary\""));
        assert!(json.contains("\"byIncidentType\""));
    }
}
