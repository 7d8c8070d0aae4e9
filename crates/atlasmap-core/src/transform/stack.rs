//! Ordered composition of transform stages.

use crate::error::{AtlasError, Result};
use crate::frame::Frame;
use crate::geometry::ImageGeometry;
use crate::pointset::PointSet;
use crate::spatial::{Direction, Point3, Spacing3};
use crate::transform::{LinearTransform, NonLinearStage, StageEvaluator};
use crate::volume::Volume;
use ndarray::Axis;

/// An ordered composition of spatial transform stages: one linear stage
/// followed by zero or more non-linear stages.
///
/// The output frame of stage i must equal the input frame of stage i+1;
/// appending a stage that breaks the chain fails with a frame mismatch.
/// Stage order is fixed once appended — there is no API to reorder or
/// remove stages, and application is strictly sequential.
#[derive(Debug, Clone)]
pub struct TransformStack {
    linear: LinearTransform,
    stages: Vec<NonLinearStage>,
}

impl TransformStack {
    /// Create a stack from its linear stage (stage 0).
    pub fn new(linear: LinearTransform) -> Self {
        Self { linear, stages: Vec::new() }
    }

    /// Append a non-linear stage to the end of the stack.
    ///
    /// Fails if the stage's declared input frame does not match the stack's
    /// current output frame.
    pub fn append_stage(&mut self, stage: NonLinearStage) -> Result<()> {
        let expected = self.output_frame().clone();
        if stage.input_frame() != &expected {
            return Err(AtlasError::frame_mismatch(expected, stage.input_frame().clone()));
        }
        self.stages.push(stage);
        Ok(())
    }

    /// Frame points must be in before the stack is applied.
    pub fn input_frame(&self) -> &Frame {
        self.linear.input_frame()
    }

    /// Frame of the stack's final output.
    pub fn output_frame(&self) -> &Frame {
        self.stages
            .last()
            .map(|s| s.output_frame())
            .unwrap_or_else(|| self.linear.output_frame())
    }

    /// The linear stage (stage 0).
    pub fn linear(&self) -> &LinearTransform {
        &self.linear
    }

    /// The non-linear stages (stages 1..N), in application order.
    pub fn stages(&self) -> &[NonLinearStage] {
        &self.stages
    }

    /// Transform a point set through every stage, producing a new set in
    /// the terminal frame.
    ///
    /// Stage 0 is cheap and is evaluated directly via matrix arithmetic.
    /// Stages 1..N are delegated to `evaluator` in ONE batched call with the
    /// ordered parameter chain. The output preserves length and order; a
    /// point set produced here is valid only in the terminal frame and must
    /// not be fed back into an earlier stage.
    pub fn apply_to_points(
        &self,
        evaluator: &dyn StageEvaluator,
        points: &PointSet,
    ) -> Result<PointSet> {
        points.check_frame(self.input_frame())?;

        let aligned = points.map_into(self.linear.output_frame().clone(), |p| self.linear.apply(p));
        if self.stages.is_empty() {
            return Ok(aligned);
        }

        let out = evaluator.evaluate_chain(&aligned, &self.stages)?;
        if out.len() != points.len() {
            return Err(AtlasError::engine(format!(
                "evaluator returned {} points for {} inputs",
                out.len(),
                points.len()
            )));
        }
        out.check_frame(self.output_frame())?;
        Ok(out)
    }

    /// Reorient a volume through the linear stage, producing a new volume
    /// plus geometry in the output frame.
    ///
    /// Supported when the stack is purely linear and the linear part is a
    /// signed permutation (orientation reconciliation): voxel data is
    /// permuted and flipped, never interpolated. Resampling through
    /// non-linear stages is the external engine's job and is rejected here.
    pub fn apply_to_image(&self, volume: &Volume) -> Result<Volume> {
        if !self.stages.is_empty() {
            return Err(AtlasError::validation(
                "image application supports only the linear stage; non-linear image resampling is delegated to the engine",
            ));
        }
        let a = *self.linear.matrix();
        if !Direction(a).is_signed_permutation() {
            return Err(AtlasError::validation(
                "image reorientation requires the linear stage to be a signed permutation",
            ));
        }

        // Target axis r draws from source axis perm[r], reversed when the
        // permutation entry is negative.
        let mut perm = [0usize; 3];
        let mut flip = [false; 3];
        for r in 0..3 {
            for j in 0..3 {
                let v = a[(r, j)];
                if v.abs() > 0.5 {
                    perm[r] = j;
                    flip[r] = v < 0.0;
                }
            }
        }

        let mut view = volume.data().view().permuted_axes(perm);
        for r in 0..3 {
            if flip[r] {
                view.invert_axis(Axis(r));
            }
        }
        let data = view.to_owned();

        let source = volume.geometry();
        let mut spacing = Spacing3::zeros();
        for r in 0..3 {
            spacing[r] = source.spacing()[perm[r]];
        }

        // The source voxel that lands at the new (0, 0, 0) fixes the origin.
        let shape = volume.shape();
        let mut corner = Point3::origin();
        for r in 0..3 {
            corner[perm[r]] = if flip[r] { (shape[perm[r]] - 1) as f64 } else { 0.0 };
        }
        let origin = self.linear.apply(&source.index_to_physical(&corner));

        let geometry = ImageGeometry::new(origin, spacing, crate::spatial::Direction3::identity())?;
        Ok(Volume::new(data, geometry))
    }
}
