//! Evaluator seam for non-linear transform stages.

use crate::error::Result;
use crate::pointset::PointSet;
use crate::transform::NonLinearStage;

/// Evaluates a chain of non-linear stages over a batch of points.
///
/// Non-linear stages have opaque, high-dimensional parameterizations that
/// cannot be composed in closed form; only an external engine can evaluate
/// them. Implementations receive the ENTIRE point set and the ordered chain
/// in one call: engine startup dominates per-point cost, so per-point
/// invocation is forbidden by the cost model, not just discouraged.
pub trait StageEvaluator {
    /// Transform every point through the ordered stage chain.
    ///
    /// The returned set must have the same length and order as the input
    /// and be tagged with the final stage's output frame.
    fn evaluate_chain(&self, points: &PointSet, chain: &[NonLinearStage]) -> Result<PointSet>;
}
