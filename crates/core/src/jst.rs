//! Japan Standard Time helpers. Uploads and webhook log lines are stamped in UTC+9
//! regardless of the host time zone.

use chrono::{DateTime, FixedOffset, Offset, Utc};

const JST_OFFSET_SECS: i32 = 9 * 60 * 60;

pub fn jst_offset() -> FixedOffset {
    // 9 hours is always within the valid offset range.
    FixedOffset::east_opt(JST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

pub fn to_jst(timestamp: DateTime<Utc>) -> DateTime<FixedOffset> {
    timestamp.with_timezone(&jst_offset())
}

/// `YYYY-MM-DD HH:mm:ss` in JST, used in notification lines.
pub fn format_log_timestamp(timestamp: DateTime<Utc>) -> String {
    to_jst(timestamp).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// `YYYY-MM-DD-HH-mm-ss` in JST, used as the stem of uploaded file names.
pub fn format_file_stem(timestamp: DateTime<Utc>) -> String {
    to_jst(timestamp).format("%Y-%m-%d-%H-%M-%S").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{format_file_stem, format_log_timestamp};

    #[test]
    fn file_stem_is_shifted_to_jst() {
        let timestamp = Utc.with_ymd_and_hms(2024, 12, 31, 15, 4, 5).single().expect("valid");
        assert_eq!(format_file_stem(timestamp), "2025-01-01-00-04-05");
    }

    #[test]
    fn log_timestamp_is_shifted_to_jst() {
        let timestamp = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 9).single().expect("valid");
        assert_eq!(format_log_timestamp(timestamp), "2024-06-01 09:00:09");
    }
}
