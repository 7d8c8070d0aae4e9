//! Linear (affine/rigid) transform with a fixed center.

use crate::error::{AtlasError, Result};
use crate::frame::Frame;
use crate::spatial::{Direction, Point, Point3, Vector, Vector3};
use nalgebra::Matrix3;

/// Linear transform between two frames: `T(x) = A(x − c) + c + t`.
///
/// * `A` is a 3×3 matrix (rotation, scale, shear)
/// * `t` is the translation vector
/// * `c` is the fixed center of rotation
///
/// Always invertible; construction fails on a singular matrix. The input and
/// output frames are part of the transform's identity and are checked by the
/// stack at every boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearTransform {
    matrix: Matrix3<f64>,
    translation: Vector3,
    center: Point3,
    input_frame: Frame,
    output_frame: Frame,
}

impl LinearTransform {
    /// Create a linear transform.
    ///
    /// # Arguments
    /// * `matrix` - The 3×3 linear part; must be invertible
    /// * `translation` - Translation vector
    /// * `center` - Fixed center of rotation/scaling
    /// * `input_frame` - Frame points must be in before application
    /// * `output_frame` - Frame the transformed points are valid in
    pub fn new(
        matrix: Matrix3<f64>,
        translation: Vector3,
        center: Point3,
        input_frame: Frame,
        output_frame: Frame,
    ) -> Result<Self> {
        if matrix.try_inverse().is_none() {
            return Err(AtlasError::validation(
                "linear transform matrix is singular; linear stages must be invertible",
            ));
        }
        Ok(Self { matrix, translation, center, input_frame, output_frame })
    }

    /// Identity transform between two frames.
    pub fn identity(input_frame: Frame, output_frame: Frame) -> Self {
        Self {
            matrix: Matrix3::identity(),
            translation: Vector3::zeros(),
            center: Point3::origin(),
            input_frame,
            output_frame,
        }
    }

    /// Pure translation between two frames.
    pub fn translation(translation: Vector3, input_frame: Frame, output_frame: Frame) -> Self {
        Self {
            matrix: Matrix3::identity(),
            translation,
            center: Point3::origin(),
            input_frame,
            output_frame,
        }
    }

    /// Build a rigid transform from a versor (the vector part of a unit
    /// quaternion), translation, and fixed center.
    ///
    /// The scalar part is recovered as `w = sqrt(1 − |v|²)`; a versor with
    /// magnitude above 1 is rejected.
    pub fn from_versor(
        versor: [f64; 3],
        translation: Vector3,
        center: Point3,
        input_frame: Frame,
        output_frame: Frame,
    ) -> Result<Self> {
        let [x, y, z] = versor;
        let norm_sq = x * x + y * y + z * z;
        if norm_sq > 1.0 + 1e-9 {
            return Err(AtlasError::validation(format!(
                "versor magnitude {:.6} exceeds 1; not a unit quaternion",
                norm_sq.sqrt()
            )));
        }
        let w = (1.0 - norm_sq.min(1.0)).sqrt();

        let matrix = Matrix3::new(
            1.0 - 2.0 * (y * y + z * z),
            2.0 * (x * y - z * w),
            2.0 * (x * z + y * w),
            2.0 * (x * y + z * w),
            1.0 - 2.0 * (x * x + z * z),
            2.0 * (y * z - x * w),
            2.0 * (x * z - y * w),
            2.0 * (y * z + x * w),
            1.0 - 2.0 * (x * x + y * y),
        );
        Self::new(matrix, translation, center, input_frame, output_frame)
    }

    /// Apply the transform to a single point.
    pub fn apply(&self, point: &Point3) -> Point3 {
        let centered = point.0 - self.center.0;
        let rotated = self.matrix * centered;
        Point(nalgebra::Point3::from(
            rotated + self.center.0.coords + self.translation.0,
        ))
    }

    /// The inverse transform, with input and output frames swapped.
    ///
    /// With `T(x) = A(x − c) + c + t`, the inverse has matrix `A⁻¹`, the
    /// same center, and translation `−A⁻¹·t`.
    pub fn inverse(&self) -> Self {
        // Invertibility was checked at construction.
        let inv = self
            .matrix
            .try_inverse()
            .unwrap_or_else(Matrix3::identity);
        Self {
            matrix: inv,
            translation: Vector(-(inv * self.translation.0)),
            center: self.center,
            input_frame: self.output_frame.clone(),
            output_frame: self.input_frame.clone(),
        }
    }

    /// Whether the linear part is an orthonormal signed permutation.
    pub fn is_signed_permutation(&self) -> bool {
        Direction(self.matrix).is_signed_permutation()
    }

    /// The 3×3 linear part.
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// The translation vector.
    pub fn translation_vector(&self) -> &Vector3 {
        &self.translation
    }

    /// The fixed center.
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Frame points must be in before application.
    pub fn input_frame(&self) -> &Frame {
        &self.input_frame
    }

    /// Frame the transformed points are valid in.
    pub fn output_frame(&self) -> &Frame {
        &self.output_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames() -> (Frame, Frame) {
        (Frame::new("lightsheet"), Frame::new("affine-aligned"))
    }

    #[test]
    fn test_identity_leaves_points() {
        let (fin, fout) = frames();
        let t = LinearTransform::identity(fin, fout);
        let p = Point3::new([1.0, 2.0, 3.0]);
        assert_eq!(t.apply(&p), p);
    }

    #[test]
    fn test_translation_applies() {
        let (fin, fout) = frames();
        let t = LinearTransform::translation(Vector3::new([-12.3259, -2.6141, -8.1635]), fin, fout);
        let out = t.apply(&Point3::new([8.46357, 9.5616, 5.61258]));
        assert!((out[0] - -3.86233).abs() < 1e-3);
        assert!((out[1] - 6.9475).abs() < 1e-3);
        assert!((out[2] - -2.55092).abs() < 1e-3);
    }

    #[test]
    fn test_center_offsets_rotation() {
        let (fin, fout) = frames();
        // Scale by 2 about center (1, 1, 1).
        let t = LinearTransform::new(
            Matrix3::identity() * 2.0,
            Vector3::zeros(),
            Point3::new([1.0, 1.0, 1.0]),
            fin,
            fout,
        )
        .unwrap();
        let out = t.apply(&Point3::new([2.0, 1.0, 1.0]));
        assert_eq!(out, Point3::new([3.0, 1.0, 1.0]));
    }

    #[test]
    fn test_inverse_roundtrip() {
        let (fin, fout) = frames();
        let t = LinearTransform::from_versor(
            [0.1, -0.2, 0.05],
            Vector3::new([4.0, -7.0, 2.5]),
            Point3::new([1.0, 2.0, 3.0]),
            fin.clone(),
            fout.clone(),
        )
        .unwrap();
        let inv = t.inverse();
        assert_eq!(inv.input_frame(), &fout);
        assert_eq!(inv.output_frame(), &fin);
        let p = Point3::new([10.0, -4.0, 6.0]);
        let back = inv.apply(&t.apply(&p));
        for i in 0..3 {
            assert!((back[i] - p[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_versor_identity() {
        let (fin, fout) = frames();
        let t = LinearTransform::from_versor(
            [0.0, 0.0, 0.0],
            Vector3::zeros(),
            Point3::origin(),
            fin,
            fout,
        )
        .unwrap();
        assert_eq!(t.matrix(), &Matrix3::identity());
    }

    #[test]
    fn test_versor_magnitude_rejected() {
        let (fin, fout) = frames();
        let err = LinearTransform::from_versor(
            [0.8, 0.8, 0.8],
            Vector3::zeros(),
            Point3::origin(),
            fin,
            fout,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_singular_matrix_rejected() {
        let (fin, fout) = frames();
        let err = LinearTransform::new(
            Matrix3::zeros(),
            Vector3::zeros(),
            Point3::origin(),
            fin,
            fout,
        );
        assert!(err.is_err());
    }
}
