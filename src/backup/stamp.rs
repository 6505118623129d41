use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime, Timelike};

use crate::error::BackupError;

const FORMAT: &str = "%Y%m%d%H%M";

/// The capture time of a backup, at minute resolution, as used in backup
/// file names (`202211190947`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BackupStamp(NaiveDateTime);

impl BackupStamp {
    /// The current local time, truncated to the minute.
    pub fn now() -> Self {
        Self::from_datetime(Local::now().naive_local())
    }

    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        let truncated = datetime
            .with_second(0)
            .and_then(|dt| dt.with_nanosecond(0))
            .unwrap_or(datetime);
        Self(truncated)
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }

    pub fn file_name(&self) -> String {
        format!("{self}.json")
    }
}

impl FromStr for BackupStamp {
    type Err = BackupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 12 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BackupError::InvalidStamp(s.to_string()));
        }
        NaiveDateTime::parse_from_str(s, FORMAT)
            .map(Self)
            .map_err(|_| BackupError::InvalidStamp(s.to_string()))
    }
}

impl fmt::Display for BackupStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn parses_and_formats() {
        let stamp: BackupStamp = "202211190947".parse().unwrap();

        assert_eq!(
            stamp.datetime(),
            NaiveDate::from_ymd_opt(2022, 11, 19)
                .unwrap()
                .and_hms_opt(9, 47, 0)
                .unwrap()
        );
        assert_eq!(stamp.to_string(), "202211190947");
        assert_eq!(stamp.file_name(), "202211190947.json");
    }

    #[test]
    fn truncates_to_the_minute() {
        let datetime = NaiveDate::from_ymd_opt(2023, 1, 2)
            .unwrap()
            .and_hms_milli_opt(3, 4, 59, 999)
            .unwrap();

        assert_eq!(BackupStamp::from_datetime(datetime).to_string(), "202301020304");
    }

    #[test]
    fn rejects_malformed_stamps() {
        for s in ["", "2022111909", "2022111909470", "2022-11-19T09", "202213190947", "20221119096x"] {
            assert!(s.parse::<BackupStamp>().is_err(), "'{s}' should not parse");
        }
    }
}
