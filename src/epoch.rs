//! TLE epoch conversion: two-digit year + fractional day of year → calendar
//! date-time → Julian Day → TAI Modified Julian Date.
//!
//! TAI − UTC is the fixed [`TAI_UTC_OFFSET_S`]; no leap-second table is
//! consulted, so epochs before 2017 carry the wrong offset.
//!
//! The day fraction is broken into hour, minute and second by truncation at
//! every stage, so the reported second is whole and can sit up to one second
//! below the true epoch. The Julian Day is built from the truncated fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{MJD_OFFSET, SOLAR_DAY, TAI_UTC_OFFSET_S};
use crate::tle::{parse_epoch_fields, TleError};

/// Two-digit years below this pivot belong to the 2000s.
pub const YEAR_PIVOT: u16 = 57;

/// Days elapsed before the first of each month in a common year.
const DAYS_BEFORE_MONTH: [u16; 13] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334, 365];

#[derive(Error, Debug)]
pub enum EpochError {
    #[error("Two-digit epoch year must be 0..=99, got {0}")]
    YearOutOfRange(u16),

    #[error("Day of year {day} is outside [1, {limit}) for {year}")]
    DayOfYear { day: f64, year: i32, limit: u16 },

    #[error("Invalid calendar date {year}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u8, day: u8 },

    #[error("Invalid time of day {hour:02}:{minute:02}:{second:02}")]
    InvalidTime { hour: u8, minute: u8, second: u8 },

    #[error(transparent)]
    Tle(#[from] TleError),
}

/// Expand a two-digit TLE year: `yy < 57` → 20yy, otherwise 19yy.
pub fn full_year(yy: u16) -> u16 {
    if yy < YEAR_PIVOT { 2000 + yy } else { 1900 + yy }
}

/// Gregorian leap-year rule.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_year(year: i32) -> u16 {
    if is_leap_year(year) { 366 } else { 365 }
}

pub fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        1..=12 => {
            let m = month as usize;
            (DAYS_BEFORE_MONTH[m] - DAYS_BEFORE_MONTH[m - 1]) as u8
        }
        _ => 0,
    }
}

/// TAI Modified Julian Date (days).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct TaiMjd(pub f64);

impl TaiMjd {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for TaiMjd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.8} MJD (TAI)", self.0)
    }
}

/// UTC calendar date-time of a TLE epoch, to the whole second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EpochDateTime {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl EpochDateTime {
    /// Checked constructor.
    pub fn new(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, EpochError> {
        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
            return Err(EpochError::InvalidDate { year, month, day });
        }
        if hour > 23 || minute > 59 || second > 59 {
            return Err(EpochError::InvalidTime { hour, minute, second });
        }
        Ok(Self { year, month, day, hour, minute, second })
    }

    /// Convert TLE epoch fields (two-digit year, fractional day of year).
    pub fn from_tle_epoch(year_2d: u16, day_of_year: f64) -> Result<Self, EpochError> {
        if year_2d > 99 {
            return Err(EpochError::YearOutOfRange(year_2d));
        }
        Self::from_year_and_day(full_year(year_2d) as i32, day_of_year)
    }

    /// Convert a full year and fractional day of year (1.0 = Jan 1 00:00).
    pub fn from_year_and_day(year: i32, day_of_year: f64) -> Result<Self, EpochError> {
        let limit = days_in_year(year) + 1;
        if !day_of_year.is_finite() || day_of_year < 1.0 || day_of_year >= limit as f64 {
            return Err(EpochError::DayOfYear { day: day_of_year, year, limit });
        }

        let ordinal = day_of_year.trunc() as u16;
        let (month, day) = month_and_day(year, ordinal);

        let hours = day_of_year.fract() * 24.0;
        let hour = hours.trunc();
        let minutes = (hours - hour) * 60.0;
        let minute = minutes.trunc();
        let second = ((minutes - minute) * 60.0).trunc();

        Self::new(year, month, day, hour as u8, minute as u8, second as u8)
    }

    /// Fliegel–Van Flandern Julian Day Number (the JD at noon of this date).
    pub fn julian_day_number(&self) -> i64 {
        let y = self.year as i64;
        let m = self.month as i64;
        let d = self.day as i64;
        let a = (m - 14) / 12;
        (1461 * (y + 4800 + a)) / 4 + (367 * (m - 2 - 12 * a)) / 12
            - (3 * ((y + 4900 + a) / 100)) / 4
            + d
            - 32075
    }

    /// Julian Date (UTC).
    pub fn julian_day(&self) -> f64 {
        self.julian_day_number() as f64
            + (self.hour as f64 - 12.0) / 24.0
            + self.minute as f64 / 1440.0
            + self.second as f64 / SOLAR_DAY
    }

    /// Modified Julian Date (UTC).
    pub fn utc_mjd(&self) -> f64 {
        self.julian_day() - MJD_OFFSET
    }

    /// Modified Julian Date on the TAI scale.
    pub fn tai_mjd(&self) -> TaiMjd {
        TaiMjd(self.utc_mjd() + TAI_UTC_OFFSET_S / SOLAR_DAY)
    }
}

impl std::fmt::Display for EpochDateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Epoch of a TLE line 1 as calendar date-time and TAI-MJD.
pub fn epoch_from_line1(line1: &str) -> Result<(EpochDateTime, TaiMjd), EpochError> {
    let (year_2d, day_of_year) = parse_epoch_fields(line1)?;
    let dt = EpochDateTime::from_tle_epoch(year_2d, day_of_year)?;
    Ok((dt, dt.tai_mjd()))
}

/// Month and day of month for a 1-based ordinal day. The caller guarantees the range.
fn month_and_day(year: i32, ordinal: u16) -> (u8, u8) {
    let leap = u16::from(is_leap_year(year));
    let mut month = 12;
    for m in 1..=12usize {
        let end = DAYS_BEFORE_MONTH[m] + if m >= 2 { leap } else { 0 };
        if ordinal <= end {
            month = m;
            break;
        }
    }
    let start = DAYS_BEFORE_MONTH[month - 1] + if month >= 3 { leap } else { 0 };
    (month as u8, (ordinal - start) as u8)
}
