//! Keplerian elements → Cartesian state vector.
//!
//! Solves Kepler's equation for the eccentric anomaly by Newton iteration,
//! builds position and velocity in the perifocal frame, and rotates them into
//! the inertial frame with the 3-1-3 (Ω, i, ω) sequence.
//!
//! Orbital arithmetic is in km and km/s with [`MU_EARTH`]; the resulting
//! [`StateVector`] is in metres and m/s.

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::elements::{normalize_angle, ElementsError, KeplerianElements};
use crate::vector::Vector3;

/// Default stop threshold on |ΔE| (rad).
pub const DEFAULT_TOLERANCE: f64 = 1e-12;

/// Default iteration cap for the Newton solver.
pub const DEFAULT_MAX_ITERATIONS: usize = 100_000;

/// Eccentricity at and above which the iteration starts from π instead of M.
const HIGH_ECCENTRICITY: f64 = 0.8;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KeplerError {
    #[error("Kepler's equation did not converge after {iterations} iterations (last |ΔE| = {residual:e})")]
    NotConverged { iterations: usize, residual: f64 },

    #[error("Invalid orbital elements: {0}")]
    InvalidElements(#[from] ElementsError),
}

/// Cartesian state vector in the inertial frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    /// Position (m)
    pub position: Vector3,
    /// Velocity (m/s)
    pub velocity: Vector3,
}

impl StateVector {
    /// Distance from Earth's centre (m).
    pub fn radius(&self) -> f64 {
        self.position.norm()
    }

    /// Speed (m/s).
    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Altitude above the equatorial radius (km).
    pub fn altitude_km(&self) -> f64 {
        self.radius() / KM_TO_M - R_EARTH
    }

    /// Specific orbital energy (J/kg).
    pub fn energy(&self) -> f64 {
        self.speed().powi(2) / 2.0 - MU_EARTH_SI / self.radius()
    }

    /// Semi-major axis from vis-viva (m).
    pub fn sma(&self) -> f64 {
        -MU_EARTH_SI / (2.0 * self.energy())
    }

    /// Specific angular momentum h = r × v (m²/s).
    pub fn angular_momentum(&self) -> Vector3 {
        self.position.cross(&self.velocity)
    }
}

/// Newton solver for Kepler's equation plus the element-to-state conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeplerSolver {
    /// Stop when successive iterates differ by less than this (rad).
    pub tolerance: f64,
    /// Give up after this many iterations.
    pub max_iterations: usize,
}

impl Default for KeplerSolver {
    fn default() -> Self {
        KeplerSolver {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl KeplerSolver {
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        KeplerSolver {
            tolerance,
            max_iterations,
        }
    }

    /// Solve M = E − e sin(E) for the eccentric anomaly (rad).
    ///
    /// `m` is reduced to [0, 2π) first; the result lies in the same range
    /// up to the last correction.
    pub fn solve_eccentric_anomaly(&self, m: f64, e: f64) -> Result<f64, KeplerError> {
        let m = normalize_angle(m);
        let mut ea = if e < HIGH_ECCENTRICITY { m } else { std::f64::consts::PI };
        let mut delta = f64::INFINITY;

        for iteration in 1..=self.max_iterations {
            let f = ea - e * ea.sin() - m;
            let fp = 1.0 - e * ea.cos();
            delta = f / fp;
            ea -= delta;
            if delta.abs() < self.tolerance {
                trace!("Kepler converged in {iteration} iterations: E={ea}");
                return Ok(ea);
            }
        }

        Err(KeplerError::NotConverged {
            iterations: self.max_iterations,
            residual: delta.abs(),
        })
    }

    /// Inertial state for a set of elements.
    pub fn state_from_elements(&self, elements: &KeplerianElements) -> Result<StateVector, KeplerError> {
        elements.validate()?;

        let a = elements.semi_major_axis_km;
        let e = elements.eccentricity;
        let i = elements.inclination_deg * DEG2RAD;
        let raan = elements.raan_deg * DEG2RAD;
        let aop = elements.arg_perigee_deg * DEG2RAD;
        let m = elements.mean_anomaly_deg * DEG2RAD;

        let ea = self.solve_eccentric_anomaly(m, e)?;
        let nu = true_anomaly(ea, e);
        let r = a * (1.0 - e * ea.cos());
        debug!("E={ea:.12} rad, ν={nu:.12} rad, r={r:.6} km");

        // Perifocal frame
        let r_pqw = [r * nu.cos(), r * nu.sin(), 0.0];
        let v_factor = (MU_EARTH * a).sqrt() / r;
        let v_pqw = [
            -v_factor * ea.sin(),
            v_factor * (1.0 - e.powi(2)).sqrt() * ea.cos(),
            0.0,
        ];

        let rot = perifocal_to_inertial(raan, i, aop);
        let mut pos = [0.0; 3];
        let mut vel = [0.0; 3];
        for j in 0..3 {
            for k in 0..3 {
                pos[j] += rot[j][k] * r_pqw[k];
                vel[j] += rot[j][k] * v_pqw[k];
            }
        }

        Ok(StateVector {
            position: Vector3::from(pos) * KM_TO_M,
            velocity: Vector3::from(vel) * KM_TO_M,
        })
    }

    /// Inertial state from `(a km, e, i°, Ω°, ω°, M°)`.
    pub fn state_from_degrees(
        &self,
        a_km: f64,
        e: f64,
        i_deg: f64,
        raan_deg: f64,
        aop_deg: f64,
        ma_deg: f64,
    ) -> Result<StateVector, KeplerError> {
        let elements = KeplerianElements::new(a_km, e, i_deg, raan_deg, aop_deg, ma_deg);
        self.state_from_elements(&elements)
    }
}

/// True anomaly from eccentric anomaly (rad).
pub fn true_anomaly(ea: f64, e: f64) -> f64 {
    2.0 * ((1.0 + e).sqrt() * (ea / 2.0).sin()).atan2((1.0 - e).sqrt() * (ea / 2.0).cos())
}

/// Rotation matrix PQW → inertial for R3(−Ω)·R1(−i)·R3(−ω).
fn perifocal_to_inertial(raan: f64, i: f64, aop: f64) -> [[f64; 3]; 3] {
    let (sin_raan, cos_raan) = raan.sin_cos();
    let (sin_aop, cos_aop) = aop.sin_cos();
    let (sin_i, cos_i) = i.sin_cos();

    [
        [
            cos_raan * cos_aop - sin_raan * sin_aop * cos_i,
            -cos_raan * sin_aop - sin_raan * cos_aop * cos_i,
            sin_raan * sin_i,
        ],
        [
            sin_raan * cos_aop + cos_raan * sin_aop * cos_i,
            -sin_raan * sin_aop + cos_raan * cos_aop * cos_i,
            -cos_raan * sin_i,
        ],
        [sin_aop * sin_i, cos_aop * sin_i, cos_i],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn iss_elements() -> KeplerianElements {
        KeplerianElements::new(
            6794.203053988712,
            0.0006703,
            51.6416,
            247.4627,
            130.5360,
            325.0288,
        )
    }

    #[test]
    fn test_converges_across_eccentricity_and_anomaly() {
        let solver = KeplerSolver::default();
        for ei in 0..=99 {
            let e = ei as f64 / 100.0;
            for md in (0..360).step_by(5) {
                let m = md as f64 * DEG2RAD;
                let ea = solver
                    .solve_eccentric_anomaly(m, e)
                    .unwrap_or_else(|err| panic!("e={e} M={md}°: {err}"));
                let residual = ea - e * ea.sin() - m;
                assert_abs_diff_eq!(residual, 0.0, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_circular_eccentric_equals_mean() {
        let solver = KeplerSolver::default();
        for md in 0..360 {
            let m = md as f64 * DEG2RAD;
            assert_eq!(solver.solve_eccentric_anomaly(m, 0.0).unwrap(), m);
        }
    }

    #[test]
    fn test_iteration_cap_reports_failure() {
        let solver = KeplerSolver::new(0.0, 3);
        let err = solver.solve_eccentric_anomaly(1.0, 0.9).unwrap_err();
        assert!(matches!(err, KeplerError::NotConverged { iterations: 3, .. }));
    }

    #[test]
    fn test_true_anomaly() {
        assert_relative_eq!(true_anomaly(0.5, 0.0), 0.5, epsilon = 1e-15);
        assert_relative_eq!(true_anomaly(std::f64::consts::PI, 0.3), std::f64::consts::PI, epsilon = 1e-12);
        // True anomaly leads eccentric anomaly on the outbound half
        assert!(true_anomaly(1.0, 0.5) > 1.0);
    }

    #[test]
    fn test_radius_matches_position_norm() {
        let solver = KeplerSolver::default();
        for &e in &[0.0, 0.1, 0.5, 0.9, 0.99] {
            for md in (0..360).step_by(30) {
                let elems = KeplerianElements::new(10_000.0, e, 30.0, 40.0, 50.0, md as f64);
                let sv = solver.state_from_elements(&elems).unwrap();
                let ea = solver.solve_eccentric_anomaly(md as f64 * DEG2RAD, e).unwrap();
                let r = 10_000.0 * (1.0 - e * ea.cos()) * KM_TO_M;
                assert_relative_eq!(sv.radius(), r, max_relative = 1e-12);
                assert!(sv.radius() >= 10_000.0 * (1.0 - e) * KM_TO_M * (1.0 - 1e-12));
                assert!(sv.radius() <= 10_000.0 * (1.0 + e) * KM_TO_M * (1.0 + 1e-12));
            }
        }
    }

    #[test]
    fn test_vis_viva_recovers_sma() {
        let solver = KeplerSolver::default();
        for &e in &[0.0, 0.0006703, 0.3, 0.75] {
            let elems = KeplerianElements::new(8000.0, e, 63.4, 10.0, 270.0, 123.0);
            let sv = solver.state_from_elements(&elems).unwrap();
            assert_relative_eq!(sv.sma(), 8000.0 * KM_TO_M, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_equatorial_circular_at_zero_anomaly() {
        let a = R_EARTH + 500.0;
        let sv = KeplerSolver::default()
            .state_from_degrees(a, 0.0, 0.0, 0.0, 0.0, 0.0)
            .unwrap();
        assert_relative_eq!(sv.position.x, a * KM_TO_M, epsilon = 1e-6);
        assert_abs_diff_eq!(sv.position.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(sv.position.z, 0.0, epsilon = 1e-6);

        let v_circ = (MU_EARTH_SI / (a * KM_TO_M)).sqrt();
        assert_abs_diff_eq!(sv.velocity.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(sv.velocity.y, v_circ, epsilon = 1e-6);
    }

    #[test]
    fn test_angular_momentum_matches_inclination_and_node() {
        let elems = iss_elements();
        let sv = KeplerSolver::default().state_from_elements(&elems).unwrap();
        let h = sv.angular_momentum().normalize().unwrap();

        assert_relative_eq!(h.z.acos() * RAD2DEG, elems.inclination_deg, epsilon = 1e-9);
        // Node vector k × h points at Ω
        let raan = normalize_angle(h.x.atan2(-h.y)) * RAD2DEG;
        assert_relative_eq!(raan, elems.raan_deg, epsilon = 1e-9);
    }

    #[test]
    fn test_iss_state_regression() {
        let sv = KeplerSolver::default().state_from_elements(&iss_elements()).unwrap();
        assert_relative_eq!(sv.position.x, 4_124_537.8615615056, max_relative = 1e-9);
        assert_relative_eq!(sv.position.y, -1_004_284.5687643753, max_relative = 1e-9);
        assert_relative_eq!(sv.position.z, 5_300_010.626094028, max_relative = 1e-9);
        assert_relative_eq!(sv.velocity.x, 2_499.356179586809, max_relative = 1e-9);
        assert_relative_eq!(sv.velocity.y, 7_221.391541055092, max_relative = 1e-9);
        assert_relative_eq!(sv.velocity.z, -580.4444009172198, max_relative = 1e-9);

        let alt = sv.altitude_km();
        assert!(alt > 400.0 && alt < 430.0, "altitude={alt} km");
    }

    #[test]
    fn test_rejects_unbound_orbit() {
        let err = KeplerSolver::default()
            .state_from_degrees(7000.0, 1.2, 0.0, 0.0, 0.0, 0.0)
            .unwrap_err();
        assert!(matches!(
            err,
            KeplerError::InvalidElements(ElementsError::Eccentricity(_))
        ));
    }
}
