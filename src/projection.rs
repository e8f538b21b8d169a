//! Projection of 3D positions onto the plane spanned by two reference positions.
//!
//! The plane passes through the origin and both reference points, so for two
//! positions on the same orbit it is the orbital plane. Points are expressed in
//! an orthonormal in-plane basis `(x_axis, y_axis)` with `normal` completing a
//! right-handed triad.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vector::Vector3;

/// |p1 × p2| below this fraction of |p1|·|p2| counts as collinear.
pub const COLLINEAR_TOLERANCE: f64 = 1e-12;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("Reference positions {0} and {1} are collinear; they do not define a plane")]
    DegeneratePlane(Vector3, Vector3),
}

/// 2D coordinates within a [`PlaneBasis`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(&self, other: &Point2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<Point2> for [f64; 2] {
    fn from(p: Point2) -> Self {
        [p.x, p.y]
    }
}

impl std::fmt::Display for Point2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(p) = f.precision() {
            write!(f, "({:.*}, {:.*})", p, self.x, p, self.y)
        } else {
            write!(f, "({}, {})", self.x, self.y)
        }
    }
}

/// Orthonormal basis of the plane through the origin and two positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneBasis {
    pub normal: Vector3,
    pub x_axis: Vector3,
    pub y_axis: Vector3,
}

impl PlaneBasis {
    /// Build the basis from two non-collinear positions.
    ///
    /// The in-plane x axis is `normal × (0,0,1)` when `|normal.z| < |normal.x|`,
    /// otherwise `normal × (1,0,0)`; that choice keeps the cross product at
    /// least √½ in length.
    pub fn from_positions(pos1: &Vector3, pos2: &Vector3) -> Result<Self, ProjectionError> {
        let degenerate = || ProjectionError::DegeneratePlane(*pos1, *pos2);

        let n = pos1.cross(pos2);
        let scale = pos1.norm() * pos2.norm();
        if !scale.is_finite() || scale <= 0.0 || n.norm() <= COLLINEAR_TOLERANCE * scale {
            return Err(degenerate());
        }
        let normal = n.normalize().ok_or_else(degenerate)?;

        let reference = if normal.z.abs() < normal.x.abs() {
            Vector3::UNIT_Z
        } else {
            Vector3::UNIT_X
        };

        let x_axis = normal.cross(&reference).normalize().ok_or_else(degenerate)?;
        let y_axis = normal.cross(&x_axis);

        Ok(PlaneBasis {
            normal,
            x_axis,
            y_axis,
        })
    }

    /// In-plane coordinates of `point` (its out-of-plane component is dropped).
    pub fn project(&self, point: &Vector3) -> Point2 {
        Point2 {
            x: point.dot(&self.x_axis),
            y: point.dot(&self.y_axis),
        }
    }

    /// Signed distance of `point` from the plane, along the normal.
    pub fn offset(&self, point: &Vector3) -> f64 {
        point.dot(&self.normal)
    }
}

/// One-shot form: build the basis from `pos1`/`pos2` and project `point`.
pub fn transform_to_2d(pos1: &Vector3, pos2: &Vector3, point: &Vector3) -> Result<Point2, ProjectionError> {
    Ok(PlaneBasis::from_positions(pos1, pos2)?.project(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn sample() -> (Vector3, Vector3) {
        (
            Vector3::new(1000.0, 2000.0, 500.0),
            Vector3::new(2000.0, 3000.0, 1000.0),
        )
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let (p1, p2) = sample();
        let b = PlaneBasis::from_positions(&p1, &p2).unwrap();
        for v in [b.normal, b.x_axis, b.y_axis] {
            assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(b.normal.dot(&b.x_axis), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b.normal.dot(&b.y_axis), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b.x_axis.dot(&b.y_axis), 0.0, epsilon = 1e-12);
        // right-handed: x × y = n
        let n = b.x_axis.cross(&b.y_axis);
        assert_abs_diff_eq!((n - b.normal).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reference_points_regression() {
        let (p1, p2) = sample();
        let b = PlaneBasis::from_positions(&p1, &p2).unwrap();

        assert_relative_eq!(b.normal.x, 0.447213595499958, epsilon = 1e-12);
        assert_abs_diff_eq!(b.normal.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(b.normal.z, -0.894427190999916, epsilon = 1e-12);

        let q1 = b.project(&p1);
        let q2 = b.project(&p2);
        assert_relative_eq!(q1.x, -2000.0, epsilon = 1e-9);
        assert_relative_eq!(q1.y, -1118.033988749895, epsilon = 1e-9);
        assert_relative_eq!(q2.x, -3000.0, epsilon = 1e-9);
        assert_relative_eq!(q2.y, -2236.06797749979, epsilon = 1e-9);
    }

    #[test]
    fn test_in_plane_points_keep_lengths_and_separation() {
        let (p1, p2) = sample();
        let b = PlaneBasis::from_positions(&p1, &p2).unwrap();
        let q1 = b.project(&p1);
        let q2 = b.project(&p2);

        assert_relative_eq!(q1.norm(), p1.norm(), max_relative = 1e-12);
        assert_relative_eq!(q2.norm(), p2.norm(), max_relative = 1e-12);
        assert_relative_eq!(q1.distance(&q2), (p2 - p1).norm(), max_relative = 1e-12);

        let cos_3d = p1.dot(&p2) / (p1.norm() * p2.norm());
        let cos_2d = (q1.x * q2.x + q1.y * q2.y) / (q1.norm() * q2.norm());
        assert_relative_eq!(cos_2d, cos_3d, epsilon = 1e-12);
    }

    #[test]
    fn test_out_of_plane_component_dropped() {
        let (p1, p2) = sample();
        let b = PlaneBasis::from_positions(&p1, &p2).unwrap();
        let lifted = p1 + b.normal * 250.0;
        let (a, c) = (b.project(&lifted), b.project(&p1));
        assert_relative_eq!(a.x, c.x, epsilon = 1e-9);
        assert_relative_eq!(a.y, c.y, epsilon = 1e-9);
        assert_relative_eq!(b.offset(&lifted), 250.0, epsilon = 1e-9);
    }

    #[test]
    fn test_equatorial_plane_uses_x_reference() {
        // normal = +z, so the x reference is used: x_axis = z × x = y
        let b = PlaneBasis::from_positions(&Vector3::UNIT_X, &Vector3::new(0.0, 1.0, 0.0)).unwrap();
        assert_eq!(b.normal, Vector3::UNIT_Z);
        assert_eq!(b.x_axis, Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(b.y_axis, Vector3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_polar_plane_uses_z_reference() {
        // normal = +x (|z| < |x|), so the z reference is used: x_axis = x × z = -y
        let b = PlaneBasis::from_positions(&Vector3::new(0.0, 1.0, 0.0), &Vector3::UNIT_Z).unwrap();
        assert_eq!(b.normal, Vector3::UNIT_X);
        assert_eq!(b.x_axis, Vector3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_identical_positions_are_degenerate() {
        let (p1, _) = sample();
        assert_eq!(
            PlaneBasis::from_positions(&p1, &p1),
            Err(ProjectionError::DegeneratePlane(p1, p1))
        );
    }

    #[test]
    fn test_opposite_positions_are_degenerate() {
        let (p1, _) = sample();
        let err = transform_to_2d(&p1, &-p1, &p1).unwrap_err();
        assert!(matches!(err, ProjectionError::DegeneratePlane(..)));
    }

    #[test]
    fn test_scaled_and_zero_positions_are_degenerate() {
        let (p1, _) = sample();
        assert!(PlaneBasis::from_positions(&p1, &(p1 * 3.5)).is_err());
        assert!(PlaneBasis::from_positions(&Vector3::ZERO, &p1).is_err());
    }
}
