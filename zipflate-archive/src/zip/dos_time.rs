//! MS-DOS date and time stamps.
//!
//! ```text
//! date: bits 15-9 year-1980 | bits 8-5 month | bits 4-0 day
//! time: bits 15-11 hour     | bits 10-5 minute | bits 4-0 second/2
//! ```

use std::time::{SystemTime, UNIX_EPOCH};
use zipflate_core::error::{Result, ZipflateError};

const SECONDS_PER_DAY: u64 = 86_400;

/// A packed MS-DOS timestamp with 2-second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DosDateTime {
    date: u16,
    time: u16,
}

impl DosDateTime {
    /// 1980-01-01 00:00:00, the earliest representable instant.
    pub const EPOCH: Self = Self::from_raw(1 << 5 | 1, 0);

    /// Wrap already packed date and time fields.
    pub const fn from_raw(date: u16, time: u16) -> Self {
        Self { date, time }
    }

    /// Pack a calendar date and wall-clock time. Odd seconds round down.
    pub fn from_civil(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Result<Self> {
        if !(1980..=2107).contains(&year) {
            return Err(ZipflateError::invalid_input(format!(
                "year {} outside the DOS range 1980-2107",
                year
            )));
        }
        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
            return Err(ZipflateError::invalid_input(format!(
                "invalid date {:04}-{:02}-{:02}",
                year, month, day
            )));
        }
        if hour > 23 || minute > 59 || second > 59 {
            return Err(ZipflateError::invalid_input(format!(
                "invalid time {:02}:{:02}:{:02}",
                hour, minute, second
            )));
        }

        let date = (year - 1980) << 9 | u16::from(month) << 5 | u16::from(day);
        let time = u16::from(hour) << 11 | u16::from(minute) << 5 | u16::from(second / 2);
        Ok(Self::from_raw(date, time))
    }

    /// Convert seconds since the Unix epoch (UTC).
    pub fn from_unix_seconds(secs: u64) -> Result<Self> {
        let (year, month, day) = civil_from_days(secs / SECONDS_PER_DAY);
        let rem = secs % SECONDS_PER_DAY;
        let year = u16::try_from(year)
            .map_err(|_| ZipflateError::invalid_input(format!("year {} outside the DOS range", year)))?;
        Self::from_civil(
            year,
            month,
            day,
            (rem / 3600) as u8,
            (rem / 60 % 60) as u8,
            (rem % 60) as u8,
        )
    }

    /// The current UTC time, clamped to [`DosDateTime::EPOCH`] when the
    /// system clock is outside the DOS range.
    pub fn now() -> Self {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .and_then(|elapsed| Self::from_unix_seconds(elapsed.as_secs()).ok())
            .unwrap_or(Self::EPOCH)
    }

    /// Packed date field.
    pub fn date(&self) -> u16 {
        self.date
    }

    /// Packed time field.
    pub fn time(&self) -> u16 {
        self.time
    }

    /// Calendar year.
    pub fn year(&self) -> u16 {
        (self.date >> 9) + 1980
    }

    /// Month, 1-12.
    pub fn month(&self) -> u8 {
        (self.date >> 5 & 0x0F) as u8
    }

    /// Day of month, 1-31.
    pub fn day(&self) -> u8 {
        (self.date & 0x1F) as u8
    }

    /// Hour, 0-23.
    pub fn hour(&self) -> u8 {
        (self.time >> 11) as u8
    }

    /// Minute, 0-59.
    pub fn minute(&self) -> u8 {
        (self.time >> 5 & 0x3F) as u8
    }

    /// Second, always even.
    pub fn second(&self) -> u8 {
        ((self.time & 0x1F) * 2) as u8
    }
}

impl Default for DosDateTime {
    fn default() -> Self {
        Self::EPOCH
    }
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Days since 1970-01-01 to a proleptic Gregorian (year, month, day).
fn civil_from_days(days: u64) -> (u64, u8, u8) {
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + u64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_fields() {
        let stamp = DosDateTime::from_civil(2024, 5, 17, 9, 30, 41).unwrap();
        assert_eq!(stamp.date(), 44 << 9 | 5 << 5 | 17);
        assert_eq!(stamp.time(), 9 << 11 | 30 << 5 | 20);
        assert_eq!((stamp.year(), stamp.month(), stamp.day()), (2024, 5, 17));
        assert_eq!((stamp.hour(), stamp.minute(), stamp.second()), (9, 30, 40));
    }

    #[test]
    fn test_epoch() {
        assert_eq!(DosDateTime::from_civil(1980, 1, 1, 0, 0, 0).unwrap(), DosDateTime::EPOCH);
        assert_eq!(DosDateTime::from_unix_seconds(315_532_800).unwrap(), DosDateTime::EPOCH);
    }

    #[test]
    fn test_from_unix_seconds() {
        // 2023-11-14 22:13:20 UTC
        let stamp = DosDateTime::from_unix_seconds(1_700_000_000).unwrap();
        assert_eq!(stamp.date(), 22382);
        assert_eq!(stamp.time(), 45482);

        // 2000-02-29 23:59:59 UTC
        let leap = DosDateTime::from_unix_seconds(951_868_799).unwrap();
        assert_eq!((leap.year(), leap.month(), leap.day()), (2000, 2, 29));
        assert_eq!((leap.hour(), leap.minute(), leap.second()), (23, 59, 58));
    }

    #[test]
    fn test_civil_from_days() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(59), (1970, 3, 1));
        assert_eq!(civil_from_days(10_957), (2000, 1, 1));
    }

    #[test]
    fn test_out_of_range() {
        assert!(DosDateTime::from_unix_seconds(0).is_err());
        assert!(DosDateTime::from_civil(2108, 1, 1, 0, 0, 0).is_err());
        assert!(DosDateTime::from_civil(2020, 13, 1, 0, 0, 0).is_err());
        assert!(DosDateTime::from_civil(2020, 1, 1, 24, 0, 0).is_err());
    }

    #[test]
    fn test_month_lengths() {
        assert!(DosDateTime::from_civil(2024, 2, 29, 0, 0, 0).is_ok());
        assert!(DosDateTime::from_civil(2000, 2, 29, 0, 0, 0).is_ok());
        assert!(DosDateTime::from_civil(2023, 2, 29, 0, 0, 0).is_err());
        assert!(DosDateTime::from_civil(2100, 2, 29, 0, 0, 0).is_err());
        assert!(DosDateTime::from_civil(2024, 2, 31, 0, 0, 0).is_err());
        assert!(DosDateTime::from_civil(2024, 4, 31, 0, 0, 0).is_err());
        assert!(DosDateTime::from_civil(2024, 4, 30, 0, 0, 0).is_ok());
        assert!(DosDateTime::from_civil(2024, 12, 31, 0, 0, 0).is_ok());
        assert!(DosDateTime::from_civil(2024, 1, 0, 0, 0, 0).is_err());
        assert_eq!(days_in_month(1980, 2), 29);
    }

    #[test]
    fn test_now_is_in_range() {
        let now = DosDateTime::now();
        assert!(now.year() >= 2020);
    }
}
