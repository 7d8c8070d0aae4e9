//! Direction type for image axis orientation.
//!
//! Direction matrices describe the orientation of image axes in physical
//! space. Column i is the physical direction of the i-th image axis.

use super::Vector;
use nalgebra::SMatrix;
use serde::{Deserialize, Serialize};

/// Direction matrix representing image axis orientation.
///
/// Thin wrapper around nalgebra's SMatrix. For geometry produced by
/// orientation reconciliation the matrix is always an orthonormal signed
/// permutation: exactly one ±1 entry per row and per column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Direction<const D: usize>(pub SMatrix<f64, D, D>);

impl<const D: usize> Direction<D> {
    /// Create an identity direction matrix (no rotation).
    pub fn identity() -> Self {
        Self(SMatrix::identity())
    }

    /// Create a zero matrix.
    pub fn zeros() -> Self {
        Self(SMatrix::zeros())
    }

    /// Build a direction matrix from column vectors.
    pub fn from_columns(columns: &[Vector<D>; D]) -> Self {
        let mut m = SMatrix::zeros();
        for (i, col) in columns.iter().enumerate() {
            for j in 0..D {
                m[(j, i)] = col[j];
            }
        }
        Self(m)
    }

    /// Check if the direction matrix is orthogonal.
    pub fn is_orthogonal(&self) -> bool {
        let product = self.0 * self.0.transpose();
        let identity = SMatrix::<f64, D, D>::identity();
        (0..D).all(|i| (0..D).all(|j| (product[(i, j)] - identity[(i, j)]).abs() < 1e-9))
    }

    /// Check if the matrix is a signed permutation: exactly one entry of
    /// magnitude 1 per row and per column, all other entries zero.
    pub fn is_signed_permutation(&self) -> bool {
        let tol = 1e-9;
        for i in 0..D {
            let mut row_hits = 0;
            let mut col_hits = 0;
            for j in 0..D {
                let r = self.0[(i, j)].abs();
                let c = self.0[(j, i)].abs();
                if (r - 1.0).abs() < tol {
                    row_hits += 1;
                } else if r > tol {
                    return false;
                }
                if (c - 1.0).abs() < tol {
                    col_hits += 1;
                } else if c > tol {
                    return false;
                }
            }
            if row_hits != 1 || col_hits != 1 {
                return false;
            }
        }
        true
    }

    /// Transpose of the direction matrix. For orthonormal directions this
    /// is also the inverse.
    pub fn transpose(&self) -> Self {
        Self(self.0.transpose())
    }

    /// Try to compute the inverse of the direction matrix.
    pub fn try_inverse(&self) -> Option<Self> {
        self.0.try_inverse().map(Self)
    }

    /// Direction of the i-th image axis in physical space (column i).
    pub fn column(&self, i: usize) -> Vector<D> {
        let mut v = Vector::zeros();
        for j in 0..D {
            v[j] = self.0[(j, i)];
        }
        v
    }

    /// Get the inner nalgebra matrix.
    pub fn inner(&self) -> &SMatrix<f64, D, D> {
        &self.0
    }
}

impl Direction<3> {
    /// Determinant; ±1 for signed permutations.
    pub fn determinant(&self) -> f64 {
        self.0.determinant()
    }
}

impl<const D: usize> std::ops::Index<(usize, usize)> for Direction<D> {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.0[index]
    }
}

impl<const D: usize> std::ops::IndexMut<(usize, usize)> for Direction<D> {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl<const D: usize> std::ops::Mul for Direction<D> {
    type Output = Self;

    fn mul(self, other: Self) -> Self::Output {
        Self(self.0 * other.0)
    }
}

impl<const D: usize> std::ops::Mul<Vector<D>> for Direction<D> {
    type Output = Vector<D>;

    fn mul(self, vector: Vector<D>) -> Self::Output {
        Vector(self.0 * vector.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Direction3 = Direction<3>;
    type Vector3 = Vector<3>;

    #[test]
    fn test_direction_identity() {
        let d = Direction3::identity();
        assert_eq!(d[(0, 0)], 1.0);
        assert_eq!(d[(1, 1)], 1.0);
        assert_eq!(d[(2, 2)], 1.0);
        assert!(d.is_orthogonal());
        assert!(d.is_signed_permutation());
    }

    #[test]
    fn test_signed_permutation_with_flip() {
        // Swap axes 0 and 1, flip axis 2.
        let d = Direction3::from_columns(&[
            Vector3::new([0.0, 1.0, 0.0]),
            Vector3::new([1.0, 0.0, 0.0]),
            Vector3::new([0.0, 0.0, -1.0]),
        ]);
        assert!(d.is_orthogonal());
        assert!(d.is_signed_permutation());
        assert!((d.determinant().abs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_is_not_signed_permutation() {
        let a = std::f64::consts::FRAC_PI_4;
        let d = Direction3::from_columns(&[
            Vector3::new([a.cos(), a.sin(), 0.0]),
            Vector3::new([-a.sin(), a.cos(), 0.0]),
            Vector3::new([0.0, 0.0, 1.0]),
        ]);
        assert!(d.is_orthogonal());
        assert!(!d.is_signed_permutation());
    }

    #[test]
    fn test_transpose_inverts_orthonormal() {
        let d = Direction3::from_columns(&[
            Vector3::new([0.0, 0.0, 1.0]),
            Vector3::new([-1.0, 0.0, 0.0]),
            Vector3::new([0.0, -1.0, 0.0]),
        ]);
        let product = d * d.transpose();
        assert_eq!(product, Direction3::identity());
    }

    #[test]
    fn test_column_access() {
        let d = Direction3::identity();
        assert_eq!(d.column(1), Vector3::new([0.0, 1.0, 0.0]));
    }
}
