//! Rendering for ad-hoc store queries

use certdb_core::StoredCertificate;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write;

const HEADERS: [&str; 3] = ["Domain", "Created", "Updated"];

fn timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "-".to_string())
}

/// Grid table of domain plus created/updated times
pub fn format_table(rows: &[StoredCertificate]) -> String {
    let cells: Vec<[String; 3]> = rows
        .iter()
        .map(|row| {
            [
                row.domain.clone(),
                timestamp(row.created_at),
                timestamp(row.updated_at),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = widths.iter().fold(String::from("+"), |mut line, width| {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
        line
    });

    let mut out = String::new();
    let push_row = |out: &mut String, cols: [&str; 3]| {
        out.push('|');
        for (col, width) in cols.iter().zip(widths) {
            let _ = write!(out, " {col:<width$} |");
        }
        out.push('\n');
    };

    out.push_str(&border);
    out.push('\n');
    push_row(&mut out, HEADERS);
    out.push_str(&border.replace('-', "="));
    out.push('\n');
    for row in &cells {
        push_row(&mut out, [&row[0], &row[1], &row[2]]);
        out.push_str(&border);
        out.push('\n');
    }
    out
}

/// Full record with its timestamps and pretty-printed payload
pub fn format_detail(entry: &StoredCertificate) -> String {
    let data = serde_json::to_string_pretty(&entry.record)
        .unwrap_or_else(|e| format!("<unprintable: {e}>"));
    format!(
        "Domain: {}\nCreated: {}\nUpdated: {}\nData: {}",
        entry.domain,
        timestamp(entry.created_at),
        timestamp(entry.updated_at),
        data
    )
}
