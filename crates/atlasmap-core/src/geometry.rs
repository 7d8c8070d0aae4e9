//! Index-to-physical geometry for one resolution level.

use crate::error::{AtlasError, Result};
use crate::spatial::{Direction3, Point3, Spacing3, Vector3};

/// Spacing, origin, and direction defining the index↔physical mapping for
/// one resolution level.
///
/// The direction matrix is validated at construction to be an orthonormal
/// signed permutation: no shear and no scale baked in — scale lives in the
/// spacing vector. Mappings:
///
/// `point = origin + direction · (index ∘ spacing)` and its inverse.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGeometry {
    origin: Point3,
    spacing: Spacing3,
    direction: Direction3,
}

impl ImageGeometry {
    /// Create a geometry, validating the direction matrix and spacing.
    ///
    /// # Arguments
    /// * `origin` - Physical coordinate of the voxel at index (0, 0, 0)
    /// * `spacing` - Physical distance between adjacent voxels per axis;
    ///   every component must be strictly positive
    /// * `direction` - Axis orientation; must be an orthonormal signed
    ///   permutation
    pub fn new(origin: Point3, spacing: Spacing3, direction: Direction3) -> Result<Self> {
        if !spacing.is_positive() {
            return Err(AtlasError::validation(format!(
                "spacing must be strictly positive, got {:?}",
                spacing.components()
            )));
        }
        if !direction.is_signed_permutation() {
            return Err(AtlasError::validation(
                "direction matrix must be an orthonormal signed permutation",
            ));
        }
        Ok(Self { origin, spacing, direction })
    }

    /// Identity geometry with the given spacing.
    pub fn with_spacing(spacing: Spacing3) -> Result<Self> {
        Self::new(Point3::origin(), spacing, Direction3::identity())
    }

    /// Get the origin.
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Get the spacing.
    pub fn spacing(&self) -> &Spacing3 {
        &self.spacing
    }

    /// Get the direction.
    pub fn direction(&self) -> &Direction3 {
        &self.direction
    }

    /// Convert a continuous index to a physical point.
    pub fn index_to_physical(&self, index: &Point3) -> Point3 {
        let mut scaled = Vector3::zeros();
        for i in 0..3 {
            scaled[i] = index[i] * self.spacing[i];
        }
        self.origin + self.direction * scaled
    }

    /// Convert a physical point to a continuous index.
    ///
    /// The direction is orthonormal by construction, so its transpose is
    /// its inverse.
    pub fn physical_to_index(&self, point: &Point3) -> Point3 {
        let rotated = self.direction.transpose() * (*point - self.origin);
        let mut index = Point3::origin();
        for i in 0..3 {
            index[i] = rotated[i] / self.spacing[i];
        }
        index
    }
}
