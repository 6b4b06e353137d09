//! CSV export of sample windows

use crate::model::Sample;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::fmt::Write as _;

/// Fixed header row
pub const CSV_HEADER: [&str; 4] = ["Timestamp", "Waktu", "Ketinggian (m)", "Laju Perubahan (m/s)"];

/// MIME type of the exported file
pub const CSV_CONTENT_TYPE: &str = "text/csv;charset=utf-8";

/// Serialize samples as comma-delimited rows under [`CSV_HEADER`]
///
/// Fields are numeric or formatted dates, so nothing is quoted or escaped.
/// Rows are separated by `\n` without a trailing newline.
pub fn to_csv(samples: &[Sample], offset: FixedOffset) -> String {
    let mut out = CSV_HEADER.join(",");
    for sample in samples {
        let waktu = DateTime::from_timestamp_millis(sample.timestamp)
            .map(|dt| {
                dt.with_timezone(&offset)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_default();
        let _ = write!(
            out,
            "\n{},{},{},{}",
            sample.timestamp, waktu, sample.height, sample.rate
        );
    }
    out
}

/// `water-level-data-<YYYY-MM-DD>.csv`
pub fn filename(date: NaiveDate) -> String {
    format!("water-level-data-{}.csv", date.format("%Y-%m-%d"))
}

/// Export filename for today's date in the dashboard's timezone
pub fn filename_today(offset: FixedOffset) -> String {
    filename(Utc::now().with_timezone(&offset).date_naive())
}

/// `water-level-recording-<ms>.csv`
pub fn recording_filename(started_at_ms: i64) -> String {
    format!("water-level-recording-{started_at_ms}.csv")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_header_only_for_empty_window() {
        assert_eq!(
            to_csv(&[], utc()),
            "Timestamp,Waktu,Ketinggian (m),Laju Perubahan (m/s)"
        );
    }

    #[test]
    fn test_rows() {
        let samples = vec![
            Sample::new(0, 1.5, 0.001),
            Sample::new(3_600_000, 2.0, -0.0005),
        ];
        let csv = to_csv(&samples, utc());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "0,1970-01-01 00:00:00,1.5,0.001");
        assert_eq!(lines[2], "3600000,1970-01-01 01:00:00,2,-0.0005");
    }

    #[test]
    fn test_local_time_column_uses_offset() {
        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        let csv = to_csv(&[Sample::new(0, 1.0, 0.0)], wib);
        assert!(csv.ends_with("0,1970-01-01 07:00:00,1,0"));
    }

    #[test]
    fn test_filenames() {
        let date = NaiveDate::from_ymd_opt(2024, 8, 5).unwrap();
        assert_eq!(filename(date), "water-level-data-2024-08-05.csv");
        assert_eq!(
            recording_filename(1_718_000_000_000),
            "water-level-recording-1718000000000.csv"
        );
    }
}
