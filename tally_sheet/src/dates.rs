use chrono::{NaiveDate, NaiveDateTime};
use log::debug;

use crate::config::{Cell, DayKey};

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

const DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d.%m.%Y", "%d-%b-%Y", "%d %b %Y", "%b %d, %Y",
];

// Only usable with a year hint.
const YEARLESS_FORMATS: [&str; 3] = ["%d-%b", "%d %b", "%b %d"];

/// Attempts to read a header as a calendar date.
///
/// Returns None for anything that is not a date, this is not an error.
pub fn parse_date_header(header: &str, year_hint: Option<i32>) -> Option<NaiveDate> {
    let s = header.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    let year = year_hint?;
    for fmt in YEARLESS_FORMATS {
        let with_year = format!("{} {}", s, year);
        let fmt_with_year = format!("{} %Y", fmt);
        if let Ok(d) = NaiveDate::parse_from_str(&with_year, &fmt_with_year) {
            return Some(d);
        }
    }
    None
}

/// The normalized key of a day column header.
pub fn day_key(cell: &Cell, year_hint: Option<i32>) -> DayKey {
    match cell {
        Cell::Date(d) => DayKey::Date(*d),
        // Plain numbers are day numbers or labels, never serial dates.
        Cell::Number(_) => DayKey::Label(cell.to_text()),
        _ => {
            let text = cell.to_text();
            match parse_date_header(&text, year_hint) {
                Some(d) => DayKey::Date(d),
                None => {
                    debug!("day_key: header {:?} is not a date", text);
                    DayKey::Label(text)
                }
            }
        }
    }
}

/// Reads a four digits year from a sheet name such as `2025`.
pub fn year_from_sheet_name(sheet_name: &str) -> Option<i32> {
    let s = sheet_name.trim();
    if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
        s.parse::<i32>().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn datetime_header_is_labelled_by_day_and_month() {
        let k = day_key(&Cell::Text("2025-12-01 00:00:00".to_string()), None);
        assert_eq!(k, DayKey::Date(ymd(2025, 12, 1)));
        assert_eq!(k.label(), "1-Dec");
        assert_eq!(k.day_of_month(), Some(1));
    }

    #[test]
    fn date_cell_header() {
        let k = day_key(&Cell::Date(ymd(2024, 12, 25)), None);
        assert_eq!(k.label(), "25-Dec");
    }

    #[test]
    fn other_formats() {
        assert_eq!(parse_date_header("2025/12/03", None), Some(ymd(2025, 12, 3)));
        assert_eq!(parse_date_header("03/12/2025", None), Some(ymd(2025, 12, 3)));
        assert_eq!(parse_date_header("3-Dec-2025", None), Some(ymd(2025, 12, 3)));
        assert_eq!(parse_date_header(" 2025-12-03 ", None), Some(ymd(2025, 12, 3)));
    }

    #[test]
    fn yearless_headers_need_a_hint() {
        assert_eq!(parse_date_header("1-Dec", None), None);
        assert_eq!(parse_date_header("1-Dec", Some(2024)), Some(ymd(2024, 12, 1)));
        assert_eq!(parse_date_header("Dec 2", Some(2024)), Some(ymd(2024, 12, 2)));
        // Either way the label is the same.
        assert_eq!(day_key(&Cell::Text("1-Dec".to_string()), None).label(), "1-Dec");
    }

    #[test]
    fn non_date_header_is_kept_verbatim() {
        let k = day_key(&Cell::Text("Semana 1".to_string()), Some(2025));
        assert_eq!(k, DayKey::Label("Semana 1".to_string()));
        assert_eq!(k.label(), "Semana 1");
        assert_eq!(k.day_of_month(), None);
    }

    #[test]
    fn numeric_header_is_a_day_number() {
        let k = day_key(&Cell::Number(7.0), Some(2025));
        assert_eq!(k.label(), "7");
        assert_eq!(k.day_of_month(), Some(7));
    }

    #[test]
    fn sheet_year() {
        assert_eq!(year_from_sheet_name("2025"), Some(2025));
        assert_eq!(year_from_sheet_name(" 2024 "), Some(2024));
        assert_eq!(year_from_sheet_name("Hoja1"), None);
        assert_eq!(year_from_sheet_name("20245"), None);
    }
}
