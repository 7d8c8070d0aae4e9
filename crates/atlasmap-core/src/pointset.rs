//! Ordered, immutable collections of physical points sharing one frame.

use crate::error::{AtlasError, Result};
use crate::frame::{Frame, LengthUnit};
use crate::spatial::Point3;

/// An ordered, immutable collection of physical points valid in one
/// coordinate frame with one length unit.
///
/// Transform stages never mutate a point set in place; each stage produces a
/// new one tagged with the stage's output frame. Order is preserved through
/// every stage: output point i always corresponds to input point i.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    frame: Frame,
    unit: LengthUnit,
    points: Vec<Point3>,
}

impl PointSet {
    /// Create a point set from points already expressed in `frame`.
    pub fn new(frame: Frame, unit: LengthUnit, points: Vec<Point3>) -> Self {
        Self { frame, unit, points }
    }

    /// The frame these points are valid in.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// The length unit of the coordinates.
    pub fn unit(&self) -> LengthUnit {
        self.unit
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The points in order.
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Iterate over the points in order.
    pub fn iter(&self) -> impl Iterator<Item = &Point3> {
        self.points.iter()
    }

    /// Verify this set is valid in `expected`, for use at stage boundaries.
    pub fn check_frame(&self, expected: &Frame) -> Result<()> {
        if &self.frame != expected {
            return Err(AtlasError::frame_mismatch(expected.clone(), self.frame.clone()));
        }
        Ok(())
    }

    /// Produce a new point set by mapping every point into `frame`.
    ///
    /// Order is preserved; the unit is unchanged.
    pub fn map_into(&self, frame: Frame, f: impl Fn(&Point3) -> Point3) -> Self {
        Self {
            frame,
            unit: self.unit,
            points: self.points.iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PointSet {
        PointSet::new(
            Frame::new("lightsheet"),
            LengthUnit::Micrometer,
            vec![Point3::new([1.0, 2.0, 3.0]), Point3::new([4.0, 5.0, 6.0])],
        )
    }

    #[test]
    fn test_point_set_basics() {
        let ps = sample();
        assert_eq!(ps.len(), 2);
        assert!(!ps.is_empty());
        assert_eq!(ps.frame().name(), "lightsheet");
        assert_eq!(ps.unit(), LengthUnit::Micrometer);
    }

    #[test]
    fn test_check_frame() {
        let ps = sample();
        assert!(ps.check_frame(&Frame::new("lightsheet")).is_ok());
        let err = ps.check_frame(&Frame::new("atlas")).unwrap_err();
        assert!(matches!(err, AtlasError::FrameMismatch { .. }));
    }

    #[test]
    fn test_map_into_preserves_order() {
        let ps = sample();
        let shifted = ps.map_into(Frame::new("atlas"), |p| *p + crate::spatial::Vector3::new([1.0, 0.0, 0.0]));
        assert_eq!(shifted.len(), ps.len());
        assert_eq!(shifted.frame().name(), "atlas");
        assert_eq!(shifted.points()[0], Point3::new([2.0, 2.0, 3.0]));
        assert_eq!(shifted.points()[1], Point3::new([5.0, 5.0, 6.0]));
        // Original untouched.
        assert_eq!(ps.points()[0], Point3::new([1.0, 2.0, 3.0]));
    }
}
