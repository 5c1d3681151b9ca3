use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};

use crate::models::{CellValue, EMPTY_CELL};

fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Local));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Local.from_local_datetime(&naive).single();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Local.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).single();
    }
    None
}

/// Format a print timestamp as zero-padded `DD.MM.YYYY` in the local
/// timezone. Absent or unparseable input yields an empty string, never an
/// error; callers pass timestamps already adjusted to the display timezone
/// or accept local-time formatting.
pub fn format_print_date(printed_at_iso: Option<&str>) -> String {
    let parsed = printed_at_iso
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(parse_timestamp);

    match parsed {
        Some(timestamp) => timestamp.format("%d.%m.%Y").to_string(),
        None => String::new(),
    }
}

/// Map a cell value to its display text. Null and empty strings become the
/// placeholder glyph; whitespace-only strings pass through verbatim; numbers
/// keep their canonical decimal representation with no separators or
/// currency symbols. Escaping is the document serializer's job, not ours.
pub fn format_cell_value(value: &CellValue) -> String {
    match value {
        CellValue::Null => EMPTY_CELL.to_string(),
        CellValue::Text(text) if text.is_empty() => EMPTY_CELL.to_string(),
        CellValue::Text(text) => text.clone(),
        CellValue::Number(number) => number.to_string(),
    }
}
