pub mod error;
pub mod frame;
pub mod geometry;
pub mod orientation;
pub mod pointset;
pub mod spatial;
pub mod transform;
pub mod volume;

pub use error::{AtlasError, Result};
pub use frame::{Frame, LengthUnit};
pub use geometry::ImageGeometry;
pub use orientation::{AnatomicalOrientation, AxisDirection};
pub use pointset::PointSet;
pub use spatial::{Direction, Point, Spacing, Vector};
pub use transform::{LinearTransform, NonLinearStage, StageEvaluator, TransformStack};
pub use volume::Volume;
