//! Dense volumetric data with physical geometry.

use crate::geometry::ImageGeometry;
use ndarray::Array3;

/// A dense 3D array paired with the geometry mapping its indices to
/// physical space.
///
/// Array axis i corresponds to geometry axis i; voxel (0, 0, 0) sits at the
/// geometry origin.
#[derive(Debug, Clone)]
pub struct Volume {
    data: Array3<f32>,
    geometry: ImageGeometry,
}

impl Volume {
    /// Create a volume from data and its geometry.
    pub fn new(data: Array3<f32>, geometry: ImageGeometry) -> Self {
        Self { data, geometry }
    }

    /// The voxel data.
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    /// The index-to-physical geometry.
    pub fn geometry(&self) -> &ImageGeometry {
        &self.geometry
    }

    /// Array shape per axis.
    pub fn shape(&self) -> [usize; 3] {
        let s = self.data.shape();
        [s[0], s[1], s[2]]
    }
}
