//! Constants shared by the orbit, epoch and projection code.
//!
//! Orbital arithmetic is done in kilometres and seconds. State vectors leave
//! the solver in SI units, so the metre-based gravitational parameter is
//! derived here rather than written out a second time.

/// GM of the Earth, WGS84 (km³/s²)
pub const MU_EARTH: f64 = 398600.4418;

/// Earth gravitational parameter (m³/s²), derived from [`MU_EARTH`]
pub const MU_EARTH_SI: f64 = MU_EARTH * KM_TO_M * KM_TO_M * KM_TO_M;

/// WGS84 equatorial radius (km)
pub const R_EARTH: f64 = 6378.137;

/// Metres per kilometre
pub const KM_TO_M: f64 = 1000.0;

/// s/day
pub const SOLAR_DAY: f64 = 86400.0;

pub const TAU: f64 = std::f64::consts::TAU;

pub const DEG2RAD: f64 = std::f64::consts::PI / 180.0;

pub const RAD2DEG: f64 = 180.0 / std::f64::consts::PI;

/// TAI − UTC (s). Fixed at the value in force since 2017-01-01.
pub const TAI_UTC_OFFSET_S: f64 = 37.0;

/// JD − MJD offset (days)
pub const MJD_OFFSET: f64 = 2_400_000.5;

/// Lowest altitude accepted by the circular-orbit generator (km)
pub const MIN_ALTITUDE_KM: f64 = 100.0;

/// Altitude above which the circular-orbit generator warns (km)
pub const MAX_ALTITUDE_KM: f64 = 1000.0;
