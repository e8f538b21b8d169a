//! NORAD Two-Line Element parsing.
//!
//! Only the columns that feed the orbit and epoch computations are read:
//! the catalog number on both lines, the epoch on line 1 and the six
//! orbital elements on line 2. Both checksums are verified, and a blank
//! or malformed column is an error rather than a silent zero.
//!
//! ```
//! use iss_rendezvous::tle::Tle;
//!
//! let l1 = "1 25544U 98067A   24060.75000000  .00016717  00000-0  30270-3 0  9991";
//! let l2 = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.50225865441232";
//!
//! let tle = Tle::parse(l1, l2).unwrap();
//! assert_eq!(tle.norad_id, 25544);
//! assert_eq!(tle.inclination_deg, 51.6416);
//! ```

use std::ops::Range;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{R_EARTH, SOLAR_DAY, TAU};
use crate::elements::{sma_from_mean_motion, KeplerianElements};
use crate::epoch::full_year;

/// Length of an element line, checksum included.
pub const LINE_LEN: usize = 69;

const CHECKSUM_COL: usize = 68;

#[derive(Error, Debug)]
pub enum TleError {
    #[error("line {line} should begin with '{line}', found '{found}'")]
    WrongLineNumber { line: u8, found: char },

    #[error("line {line} has {len} characters, expected 69")]
    Truncated { line: u8, len: usize },

    #[error("line {0} is not plain ASCII")]
    NonAscii(u8),

    #[error("catalog number differs between lines ({line1} vs {line2})")]
    CatalogMismatch { line1: u32, line2: u32 },

    #[error("bad checksum on line {line}: stated {stated}, computed {computed}")]
    BadChecksum { line: u8, stated: u8, computed: u8 },

    #[error("checksum column of line {line} holds '{found}', not a digit")]
    ChecksumNotDigit { line: u8, found: char },

    #[error("column '{field}' is not a number: {source}")]
    Float {
        field: &'static str,
        source: std::num::ParseFloatError,
    },

    #[error("column '{field}' is not an integer: {source}")]
    Int {
        field: &'static str,
        source: std::num::ParseIntError,
    },

    #[error("eccentricity column '{0}' must be 7 digits")]
    Eccentricity(String),

    #[error("no line 1 / line 2 pair found")]
    MissingLines,
}

/// A fixed-width column on one element line (0-based, end exclusive).
struct Field {
    name: &'static str,
    cols: Range<usize>,
}

impl Field {
    const fn new(name: &'static str, cols: Range<usize>) -> Self {
        Field { name, cols }
    }

    fn text<'a>(&self, line: &'a str) -> &'a str {
        line[self.cols.clone()].trim()
    }

    fn float(&self, line: &str) -> Result<f64, TleError> {
        self.text(line)
            .parse()
            .map_err(|source| TleError::Float { field: self.name, source })
    }

    fn int<T>(&self, line: &str) -> Result<T, TleError>
    where
        T: std::str::FromStr<Err = std::num::ParseIntError>,
    {
        self.text(line)
            .parse()
            .map_err(|source| TleError::Int { field: self.name, source })
    }
}

const CATALOG: Field = Field::new("catalog number", 2..7);
const EPOCH_YEAR: Field = Field::new("epoch year", 18..20);
const EPOCH_DAY: Field = Field::new("epoch day", 20..32);

const INCLINATION: Field = Field::new("inclination", 8..16);
const RAAN: Field = Field::new("raan", 17..25);
const ECCENTRICITY: Field = Field::new("eccentricity", 26..33);
const ARG_PERIGEE: Field = Field::new("argument of perigee", 34..42);
const MEAN_ANOMALY: Field = Field::new("mean anomaly", 43..51);
const MEAN_MOTION: Field = Field::new("mean motion", 52..63);

/// The text of one TLE record: optional name line plus the two element lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTle {
    pub name: Option<String>,
    pub line1: String,
    pub line2: String,
}

impl RawTle {
    /// Pick the first element-line pair out of a text blob.
    ///
    /// A non-empty line directly before line 1 is taken as the name line.
    pub fn from_text(text: &str) -> Result<Self, TleError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .collect();

        let start = lines
            .windows(2)
            .position(|w| w[0].starts_with("1 ") && w[1].starts_with("2 "))
            .ok_or(TleError::MissingLines)?;

        let name = start
            .checked_sub(1)
            .map(|i| lines[i].trim().to_string())
            .filter(|n| !n.starts_with("2 "));

        Ok(RawTle {
            name,
            line1: lines[start].to_string(),
            line2: lines[start + 1].to_string(),
        })
    }
}

/// Orbit-relevant content of a TLE record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tle {
    pub name: Option<String>,
    pub norad_id: u32,
    /// Four-digit epoch year
    pub epoch_year: u16,
    /// Fractional day of year, 1.0 = Jan 1 00:00 UTC
    pub epoch_day: f64,
    pub inclination_deg: f64,
    pub raan_deg: f64,
    pub eccentricity: f64,
    pub arg_perigee_deg: f64,
    pub mean_anomaly_deg: f64,
    /// rev/day
    pub mean_motion_rev_day: f64,
}

impl Tle {
    pub fn parse(line1: &str, line2: &str) -> Result<Self, TleError> {
        Self::parse_named(None, line1, line2)
    }

    /// Parse with a name line; surrounding whitespace is dropped.
    pub fn parse_3line(name: &str, line1: &str, line2: &str) -> Result<Self, TleError> {
        Self::parse_named(Some(name.trim().to_string()), line1, line2)
    }

    pub fn from_raw(raw: &RawTle) -> Result<Self, TleError> {
        Self::parse_named(raw.name.clone(), &raw.line1, &raw.line2)
    }

    fn parse_named(name: Option<String>, line1: &str, line2: &str) -> Result<Self, TleError> {
        let l1 = verified_line(line1, 1)?;
        let l2 = verified_line(line2, 2)?;

        let id1: u32 = CATALOG.int(l1)?;
        let id2: u32 = CATALOG.int(l2)?;
        if id1 != id2 {
            return Err(TleError::CatalogMismatch { line1: id1, line2: id2 });
        }

        let (year_2d, epoch_day) = parse_epoch_fields(l1)?;

        let tle = Tle {
            name,
            norad_id: id1,
            epoch_year: full_year(year_2d),
            epoch_day,
            inclination_deg: INCLINATION.float(l2)?,
            raan_deg: RAAN.float(l2)?,
            eccentricity: eccentricity(l2)?,
            arg_perigee_deg: ARG_PERIGEE.float(l2)?,
            mean_anomaly_deg: MEAN_ANOMALY.float(l2)?,
            mean_motion_rev_day: MEAN_MOTION.float(l2)?,
        };
        debug!("{tle:?}");
        Ok(tle)
    }

    pub fn mean_motion_rad_s(&self) -> f64 {
        self.mean_motion_rev_day * TAU / SOLAR_DAY
    }

    /// Semi-major axis from Kepler's third law (km).
    pub fn semi_major_axis(&self) -> f64 {
        sma_from_mean_motion(self.mean_motion_rad_s())
    }

    /// Mean altitude above the equatorial radius (km).
    pub fn altitude(&self) -> f64 {
        self.semi_major_axis() - R_EARTH
    }

    /// Orbital period (s).
    pub fn period(&self) -> f64 {
        SOLAR_DAY / self.mean_motion_rev_day
    }

    pub fn to_keplerian(&self) -> KeplerianElements {
        KeplerianElements {
            semi_major_axis_km: self.semi_major_axis(),
            eccentricity: self.eccentricity,
            inclination_deg: self.inclination_deg,
            raan_deg: self.raan_deg,
            arg_perigee_deg: self.arg_perigee_deg,
            mean_anomaly_deg: self.mean_anomaly_deg,
            mean_motion_rad_s: self.mean_motion_rad_s(),
        }
    }
}

impl std::fmt::Display for Tle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} #{} epoch {}/{:.8}: i={}° e={} n={} rev/day",
            self.name.as_deref().unwrap_or("UNKNOWN"),
            self.norad_id,
            self.epoch_year,
            self.epoch_day,
            self.inclination_deg,
            self.eccentricity,
            self.mean_motion_rev_day,
        )
    }
}

/// Two-digit epoch year and fractional day of year from line 1.
///
/// Only the epoch columns are read, so the checksum is not required.
pub fn parse_epoch_fields(line1: &str) -> Result<(u16, f64), TleError> {
    let l1 = line1.trim_end();
    if !l1.is_ascii() {
        return Err(TleError::NonAscii(1));
    }
    if l1.len() < EPOCH_DAY.cols.end {
        return Err(TleError::Truncated { line: 1, len: l1.len() });
    }
    Ok((EPOCH_YEAR.int(l1)?, EPOCH_DAY.float(l1)?))
}

/// Line 2 stores eccentricity as seven digits after an implied "0.".
fn eccentricity(l2: &str) -> Result<f64, TleError> {
    let digits = ECCENTRICITY.text(l2);
    if digits.len() != 7 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TleError::Eccentricity(digits.to_string()));
    }
    let raw: u32 = ECCENTRICITY.int(l2)?;
    Ok(f64::from(raw) * 1e-7)
}

/// Check ASCII, length, leading line number and checksum.
fn verified_line(line: &str, number: u8) -> Result<&str, TleError> {
    let line = line.trim_end();
    if !line.is_ascii() {
        return Err(TleError::NonAscii(number));
    }
    if line.len() < LINE_LEN {
        return Err(TleError::Truncated { line: number, len: line.len() });
    }

    let bytes = line.as_bytes();
    if bytes[0] != b'0' + number {
        return Err(TleError::WrongLineNumber { line: number, found: bytes[0] as char });
    }

    let found = bytes[CHECKSUM_COL];
    if !found.is_ascii_digit() {
        return Err(TleError::ChecksumNotDigit { line: number, found: found as char });
    }
    let stated = found - b'0';
    let computed = checksum(&line[..CHECKSUM_COL]);
    if stated != computed {
        return Err(TleError::BadChecksum { line: number, stated, computed });
    }
    Ok(line)
}

/// Mod-10 sum of the digits, with each '-' counting as 1.
fn checksum(text: &str) -> u8 {
    let total = text.bytes().fold(0u32, |acc, b| match b {
        b'0'..=b'9' => acc + u32::from(b - b'0'),
        b'-' => acc + 1,
        _ => acc,
    });
    (total % 10) as u8
}
