//! Spacing type for physical distances between adjacent voxels.

use super::Vector;

/// Spacing between adjacent voxels along each axis.
///
/// Each component is the physical distance between adjacent voxels along
/// that axis. Scale lives here, never in the direction matrix.
/// Type alias to Vector for semantic clarity.
pub type Spacing<const D: usize> = Vector<D>;

impl<const D: usize> Spacing<D> {
    /// Create uniform spacing (same value for all dimensions).
    pub fn uniform(value: f64) -> Self {
        let mut spacing = Vector::zeros();
        for i in 0..D {
            spacing[i] = value;
        }
        spacing
    }

    /// Check that every component is strictly positive.
    pub fn is_positive(&self) -> bool {
        (0..D).all(|i| self[i] > 0.0)
    }

    /// Get the maximum spacing value.
    pub fn max_spacing(&self) -> f64 {
        (0..D).map(|i| self[i]).fold(f64::NEG_INFINITY, f64::max)
    }
}
