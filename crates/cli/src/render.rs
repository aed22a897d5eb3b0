use catalog_core::domain::record::Record;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const MAX_CELL_WIDTH: usize = 40;
const HEADERS: [&str; 7] = ["ID", "TITLE", "CATEGORY", "RATING", "TAGS", "CREATED", "LINK"];

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }
    result
}

fn pad_to_width(s: &str, width: usize) -> String {
    format!("{}{}", s, " ".repeat(width.saturating_sub(s.width())))
}

fn cells(record: &Record) -> [String; 7] {
    [
        record.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
        record.title.clone(),
        record.category.label().to_string(),
        record.rating.to_string(),
        record.tags.clone(),
        record.created_at.chars().take(19).collect(),
        record.file_link.clone().unwrap_or_default(),
    ]
}

/// Aligned table of records; widths account for wide (CJK) characters.
pub fn records_table(records: &[Record]) -> String {
    if records.is_empty() {
        return "No records".to_string();
    }

    let rows: Vec<[String; 7]> = records
        .iter()
        .map(|record| cells(record).map(|cell| truncate_to_width(&cell, MAX_CELL_WIDTH)))
        .collect();

    let mut widths = HEADERS.map(|header| header.width());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let line = |columns: Vec<&str>| {
        columns
            .iter()
            .zip(widths)
            .map(|(cell, width)| pad_to_width(cell, width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut output = vec![line(HEADERS.to_vec())];
    for row in &rows {
        output.push(line(row.iter().map(String::as_str).collect()));
    }
    output.push(format!("{} records", records.len()));
    output.join("\n")
}

/// Multi-line view of one record.
pub fn record_details(record: &Record) -> String {
    let mut lines: Vec<String> = HEADERS
        .iter()
        .zip(cells(record))
        .map(|(header, cell)| format!("{:<9} {}", header, cell))
        .collect();
    if !record.review.is_empty() {
        lines.push(format!("{:<9} {}", "REVIEW", record.review));
    }
    lines.join("\n")
}
