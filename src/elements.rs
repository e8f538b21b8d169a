//! Classical Keplerian orbital elements.
//!
//! Angles are carried in degrees as they come out of a TLE; the solver
//! converts to radians at its boundary. Distances are kilometres.

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

/// Element validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElementsError {
    #[error("Eccentricity {0} is outside [0, 1); only bound orbits are supported")]
    Eccentricity(f64),

    #[error("Semi-major axis must be positive, got {0} km")]
    SemiMajorAxis(f64),

    #[error("Element '{0}' is not a finite number")]
    NotFinite(&'static str),

    #[error("Altitude {altitude_km} km is below the {min_km} km minimum")]
    AltitudeTooLow { altitude_km: f64, min_km: f64 },

    #[error("Inclination {0}° is outside [-90°, 90°]")]
    InclinationOutOfRange(f64),
}

/// Classical (osculating) Keplerian orbital elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeplerianElements {
    /// Semi-major axis (km)
    pub semi_major_axis_km: f64,
    /// Eccentricity (dimensionless)
    pub eccentricity: f64,
    /// Inclination (deg)
    pub inclination_deg: f64,
    /// Right ascension of ascending node (deg)
    pub raan_deg: f64,
    /// Argument of perigee (deg)
    pub arg_perigee_deg: f64,
    /// Mean anomaly (deg)
    pub mean_anomaly_deg: f64,
    /// Mean motion (rad/s)
    pub mean_motion_rad_s: f64,
}

impl KeplerianElements {
    /// Build elements from a semi-major axis; mean motion follows from Kepler's third law.
    pub fn new(
        semi_major_axis_km: f64,
        eccentricity: f64,
        inclination_deg: f64,
        raan_deg: f64,
        arg_perigee_deg: f64,
        mean_anomaly_deg: f64,
    ) -> Self {
        Self {
            semi_major_axis_km,
            eccentricity,
            inclination_deg,
            raan_deg,
            arg_perigee_deg,
            mean_anomaly_deg,
            mean_motion_rad_s: mean_motion_from_sma(semi_major_axis_km),
        }
    }

    /// Circular orbit at `altitude_km` above the equatorial radius.
    ///
    /// Rejects altitudes under [`MIN_ALTITUDE_KM`] and inclinations outside
    /// ±90°. Altitudes above [`MAX_ALTITUDE_KM`] are accepted with a warning.
    pub fn circular(
        altitude_km: f64,
        inclination_deg: f64,
        raan_deg: f64,
        mean_anomaly_deg: f64,
    ) -> Result<Self, ElementsError> {
        if !altitude_km.is_finite() {
            return Err(ElementsError::NotFinite("altitude"));
        }
        if !inclination_deg.is_finite() {
            return Err(ElementsError::NotFinite("inclination"));
        }
        if altitude_km < MIN_ALTITUDE_KM {
            return Err(ElementsError::AltitudeTooLow {
                altitude_km,
                min_km: MIN_ALTITUDE_KM,
            });
        }
        if altitude_km > MAX_ALTITUDE_KM {
            warn!(
                "altitude {:.1} km is above {:.0} km; generated orbit leaves low Earth orbit",
                altitude_km, MAX_ALTITUDE_KM
            );
        }
        if !(-90.0..=90.0).contains(&inclination_deg) {
            return Err(ElementsError::InclinationOutOfRange(inclination_deg));
        }

        Ok(Self::new(
            R_EARTH + altitude_km,
            0.0,
            inclination_deg,
            raan_deg,
            0.0,
            mean_anomaly_deg,
        ))
    }

    /// Check the bound-orbit invariants: `e ∈ [0, 1)`, `a > 0`, everything finite.
    pub fn validate(&self) -> Result<(), ElementsError> {
        let fields = [
            ("semi_major_axis", self.semi_major_axis_km),
            ("eccentricity", self.eccentricity),
            ("inclination", self.inclination_deg),
            ("raan", self.raan_deg),
            ("arg_perigee", self.arg_perigee_deg),
            ("mean_anomaly", self.mean_anomaly_deg),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(ElementsError::NotFinite(name));
            }
        }
        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(ElementsError::Eccentricity(self.eccentricity));
        }
        if self.semi_major_axis_km <= 0.0 {
            return Err(ElementsError::SemiMajorAxis(self.semi_major_axis_km));
        }
        Ok(())
    }

    /// Orbital period (seconds).
    pub fn period(&self) -> f64 {
        TAU / mean_motion_from_sma(self.semi_major_axis_km)
    }

    /// Perigee altitude above the equatorial radius (km).
    pub fn perigee_altitude(&self) -> f64 {
        self.semi_major_axis_km * (1.0 - self.eccentricity) - R_EARTH
    }

    /// Apogee altitude above the equatorial radius (km).
    pub fn apogee_altitude(&self) -> f64 {
        self.semi_major_axis_km * (1.0 + self.eccentricity) - R_EARTH
    }
}

/// Mean motion (rad/s) for a semi-major axis in km.
pub fn mean_motion_from_sma(a_km: f64) -> f64 {
    (MU_EARTH / a_km.powi(3)).sqrt()
}

/// Semi-major axis (km) for a mean motion in rad/s: a = (μ / n²)^(1/3).
pub fn sma_from_mean_motion(n_rad_s: f64) -> f64 {
    (MU_EARTH / n_rad_s.powi(2)).cbrt()
}

/// Normalize angle to [0, 2π).
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle % TAU;
    if a < 0.0 { a + TAU } else { a }
}
