//! Labeled results of one run, for the console or as JSON.

use serde::{Deserialize, Serialize};

use crate::elements::KeplerianElements;
use crate::epoch::{EpochDateTime, TaiMjd};
use crate::kepler::StateVector;
use crate::projection::Point2;
use crate::vector::Vector3;

/// A reference position and where it lands in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    /// Position (km)
    pub position: Vector3,
    /// Plane coordinates (km)
    pub plane: Point2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub name: Option<String>,
    pub norad_id: u32,
    pub elements: KeplerianElements,
    /// Orbital period (minutes)
    pub period_min: f64,
    pub state: StateVector,
    pub epoch: EpochDateTime,
    pub tai_mjd: TaiMjd,
    pub references: [ProjectedPoint; 2],
    /// Satellite position in the reference plane (km)
    pub satellite_in_plane: Point2,
    /// Satellite distance from the reference plane (km)
    pub satellite_plane_offset_km: f64,
}

impl Report {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let el = &self.elements;
        writeln!(
            f,
            "Satellite:            {} (NORAD {})",
            self.name.as_deref().unwrap_or("UNKNOWN"),
            self.norad_id
        )?;
        writeln!(f, "Semi-major axis:      {:.3} km", el.semi_major_axis_km)?;
        writeln!(f, "Eccentricity:         {:.7}", el.eccentricity)?;
        writeln!(f, "Inclination:          {:.4} deg", el.inclination_deg)?;
        writeln!(f, "RAAN:                 {:.4} deg", el.raan_deg)?;
        writeln!(f, "Arg. of perigee:      {:.4} deg", el.arg_perigee_deg)?;
        writeln!(f, "Mean anomaly:         {:.4} deg", el.mean_anomaly_deg)?;
        writeln!(f, "Mean motion:          {:.10} rad/s", el.mean_motion_rad_s)?;
        writeln!(f, "Period:               {:.3} min", self.period_min)?;
        writeln!(f, "Position:             {:.3} m", self.state.position)?;
        writeln!(f, "Velocity:             {:.3} m/s", self.state.velocity)?;
        writeln!(f, "Epoch:                {}", self.epoch)?;
        writeln!(f, "Epoch (TAI MJD):      {:.8}", self.tai_mjd.value())?;
        for (i, r) in self.references.iter().enumerate() {
            writeln!(
                f,
                "Reference {}:          {:.3} km -> {:.3} km",
                i + 1,
                r.position,
                r.plane
            )?;
        }
        write!(
            f,
            "Satellite in plane:   {:.3} km (offset {:.3} km)",
            self.satellite_in_plane, self.satellite_plane_offset_km
        )
    }
}
