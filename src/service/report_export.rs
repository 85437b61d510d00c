use chrono::{Datelike, NaiveDate};

use super::report_service::{Report, ReportValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Text,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            "text" | "txt" => Some(ExportFormat::Text),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Text => "text/plain; charset=utf-8",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Text => "txt",
        }
    }
}

/// `{kind}-report-{date}.{ext}`
pub fn file_name(report: &Report, format: ExportFormat) -> String {
    format!(
        "{}-report-{}.{}",
        report.kind.as_str(),
        report.generated_at.format("%Y-%m-%d"),
        format.extension()
    )
}

fn csv_cell(value: &ReportValue) -> String {
    match value {
        ReportValue::Number(number) => number.to_string(),
        ReportValue::Text(text) => format!("\"{}\"", text.replace('"', "\"\"")),
    }
}

/// Header line then one line per row. Text cells are quoted, numbers are not.
pub fn to_csv(report: &Report) -> String {
    if report.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(report.rows.len() + 1);
    lines.push(report.columns.join(","));

    for row in &report.rows {
        lines.push(row.iter().map(csv_cell).collect::<Vec<_>>().join(","));
    }

    lines.join("\n")
}

/// Splits CSV text into records. Quoted fields may contain commas, doubled
/// quotes and newlines.
pub fn parse_csv(input: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    // Set once the current record has any content, so a lone `""` still counts.
    let mut started = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                started = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                started = true;
            }
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
                started = false;
            }
            _ => {
                field.push(c);
                started = true;
            }
        }
    }

    if started {
        record.push(field);
        records.push(record);
    }

    records
}

/// "March 7th, 2025"
fn long_date(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };

    format!("{} {}{}, {}", date.format("%B"), day, suffix, date.year())
}

/// Tab-separated listing under a title and generation date. Every line,
/// the last included, ends with a newline.
pub fn to_text(report: &Report, generated_on: NaiveDate) -> String {
    if report.is_empty() {
        return String::new();
    }

    let mut lines = vec![
        report.title.clone(),
        format!("Generated on: {}", long_date(generated_on)),
        String::new(),
        report.columns.join("\t"),
        vec!["---"; report.columns.len()].join("\t"),
    ];

    for row in &report.rows {
        lines.push(row.iter().map(|value| value.to_string()).collect::<Vec<_>>().join("\t"));
    }

    lines
        .into_iter()
        .map(|line| line + "\n")
        .collect()
}
