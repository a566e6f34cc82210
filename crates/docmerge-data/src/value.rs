//! Cell values as seen through [`SheetAccess`](crate::SheetAccess).

use std::fmt;

use calamine::Data;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Format used for date-only values
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Format used for values carrying a time of day
pub const DATETIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// A stored cell value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// No value stored
    #[default]
    Empty,
    /// Text
    Text(String),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Calendar date
    Date(NaiveDate),
    /// Date and time of day
    DateTime(NaiveDateTime),
    /// Error value such as `#DIV/0!`
    Error(String),
}

impl CellValue {
    /// True when nothing is stored or the text is empty
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => {
                // Whole numbers print without a trailing ".0"
                if v.fract() == 0.0 && v.abs() < 1e15 {
                    write!(f, "{:.0}", v)
                } else {
                    write!(f, "{}", v)
                }
            }
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            CellValue::DateTime(dt) => {
                if dt.time() == NaiveTime::MIN {
                    write!(f, "{}", dt.format(DATE_FORMAT))
                } else {
                    write!(f, "{}", dt.format(DATETIME_FORMAT))
                }
            }
            CellValue::Error(e) => f.write_str(e),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Int(i) => CellValue::Int(*i),
            Data::Float(f) => CellValue::Float(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::Error(e) => CellValue::Error(e.to_string()),
            Data::DateTime(dt) => {
                // calamine applies the workbook's 1900 or 1904 date system
                match dt.as_datetime() {
                    Some(datetime) if !dt.is_duration() => CellValue::DateTime(datetime),
                    _ => CellValue::Float(dt.as_f64()),
                }
            }
            Data::DateTimeIso(s) => parse_iso(s).unwrap_or_else(|| CellValue::Text(s.clone())),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
        }
    }
}

fn parse_iso(s: &str) -> Option<CellValue> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(CellValue::DateTime(dt));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(CellValue::Date(d));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::from("hola").to_string(), "hola");
        assert_eq!(CellValue::Int(42).to_string(), "42");
        assert_eq!(CellValue::Float(3.5).to_string(), "3.5");
        assert_eq!(CellValue::Float(10.0).to_string(), "10");
        assert_eq!(CellValue::Bool(true).to_string(), "true");
        assert_eq!(CellValue::Error("#DIV/0!".into()).to_string(), "#DIV/0!");
    }

    #[test]
    fn test_display_dates() {
        assert_eq!(CellValue::Date(ymd(2024, 1, 5)).to_string(), "05/01/2024");

        let midnight = ymd(2024, 1, 5).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(CellValue::DateTime(midnight).to_string(), "05/01/2024");

        let afternoon = ymd(2024, 1, 5).and_hms_opt(14, 30, 5).unwrap();
        assert_eq!(CellValue::DateTime(afternoon).to_string(), "05/01/2024 14:30:05");
    }

    #[test]
    fn test_is_empty() {
        assert!(CellValue::Empty.is_empty());
        assert!(CellValue::from("").is_empty());
        assert!(!CellValue::from(" ").is_empty());
        assert!(!CellValue::Int(0).is_empty());
    }

    #[test]
    fn test_from_calamine_serial_dates() {
        let serial = |value: f64, is_1904: bool| {
            CellValue::from(&Data::DateTime(ExcelDateTime::new(
                value,
                ExcelDateTimeType::DateTime,
                is_1904,
            )))
        };

        // 45296 is 2024-01-05 in the 1900 system
        assert_eq!(serial(45296.0, false).to_string(), "05/01/2024");
        assert_eq!(serial(45296.5, false).to_string(), "05/01/2024 12:00:00");
        // The same day is serial 43834 in the 1904 system
        assert_eq!(serial(43834.0, true).to_string(), "05/01/2024");
    }

    #[test]
    fn test_durations_stay_numeric() {
        let duration = Data::DateTime(ExcelDateTime::new(1.5, ExcelDateTimeType::TimeDelta, false));
        assert_eq!(CellValue::from(&duration), CellValue::Float(1.5));
    }

    #[test]
    fn test_from_calamine_data() {
        assert_eq!(CellValue::from(&Data::Empty), CellValue::Empty);
        assert_eq!(CellValue::from(&Data::Float(2.0)), CellValue::Float(2.0));
        assert_eq!(
            CellValue::from(&Data::DateTimeIso("2024-01-05".into())),
            CellValue::Date(ymd(2024, 1, 5))
        );
        assert_eq!(
            CellValue::from(&Data::DateTimeIso("2024-01-05T08:15:00".into())),
            CellValue::DateTime(ymd(2024, 1, 5).and_hms_opt(8, 15, 0).unwrap())
        );
    }
}
