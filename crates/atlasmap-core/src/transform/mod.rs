//! Spatial transforms and their strictly ordered composition.

pub mod linear;
pub mod nonlinear;
pub mod stack;
pub mod trait_;

pub use linear::LinearTransform;
pub use nonlinear::NonLinearStage;
pub use stack::TransformStack;
pub use trait_::StageEvaluator;
