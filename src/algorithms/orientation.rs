//! Body-frame to earth-frame rotation
//!
//! The earth frame follows the motion co-processor's "X true north, Z
//! vertical" reference. The matrix is applied as-is; checking that it is a
//! proper rotation is left to the caller (see `SampleValidator`).

use nalgebra::Matrix3;

use crate::core::units::Unit;
use crate::core::vector::Vector3;

/// Row-major 3×3 rotation from the body frame into the earth frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationMatrix(Matrix3<f64>);

impl RotationMatrix {
    pub fn identity() -> Self {
        RotationMatrix(Matrix3::identity())
    }

    pub fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        RotationMatrix(Matrix3::new(
            rows[0][0], rows[0][1], rows[0][2],
            rows[1][0], rows[1][1], rows[1][2],
            rows[2][0], rows[2][1], rows[2][2],
        ))
    }

    /// Rotation by `yaw` radians about the vertical axis
    pub fn about_vertical(yaw: f64) -> Self {
        let (s, c) = yaw.sin_cos();
        RotationMatrix(Matrix3::new(
            c, -s, 0.0,
            s, c, 0.0,
            0.0, 0.0, 1.0,
        ))
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.0
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// R·Rᵀ = I and det(R) = +1 within `tolerance`
    pub fn is_orthonormal(&self, tolerance: f64) -> bool {
        let gram = self.0 * self.0.transpose();
        let identity_error = (gram - Matrix3::identity()).amax();
        identity_error <= tolerance && (self.0.determinant() - 1.0).abs() <= tolerance
    }
}

impl From<[[f64; 3]; 3]> for RotationMatrix {
    fn from(rows: [[f64; 3]; 3]) -> Self {
        RotationMatrix::from_rows(rows)
    }
}

/// Rotate a body-frame vector into the earth frame, keeping its unit
pub fn to_earth_frame<U: Unit>(rotation: &RotationMatrix, body: &Vector3<U>) -> Vector3<U> {
    let earth = rotation.0 * body.to_nalgebra();
    Vector3::from_nalgebra(&earth, body.unit())
}
