//! Non-linear registration stages with opaque parameterizations.

use crate::frame::Frame;
use std::path::{Path, PathBuf};

/// One non-linear registration stage.
///
/// The parameterization is opaque to this crate: a deformation model fit by
/// an external optimizer and evaluated only by the external engine. Not
/// guaranteed invertible. The stage carries its parameter file and the
/// frames it maps between; nothing here reads the file's contents.
#[derive(Debug, Clone, PartialEq)]
pub struct NonLinearStage {
    parameter_file: PathBuf,
    input_frame: Frame,
    output_frame: Frame,
}

impl NonLinearStage {
    /// Create a stage from its parameter file and frame pair.
    pub fn new(parameter_file: impl Into<PathBuf>, input_frame: Frame, output_frame: Frame) -> Self {
        Self {
            parameter_file: parameter_file.into(),
            input_frame,
            output_frame,
        }
    }

    /// Path to the stage's parameter file.
    pub fn parameter_file(&self) -> &Path {
        &self.parameter_file
    }

    /// Frame points must be in before this stage.
    pub fn input_frame(&self) -> &Frame {
        &self.input_frame
    }

    /// Frame points are valid in after this stage.
    pub fn output_frame(&self) -> &Frame {
        &self.output_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_accessors() {
        let stage = NonLinearStage::new(
            "/params/stage0.txt",
            Frame::new("affine-aligned"),
            Frame::new("atlas"),
        );
        assert_eq!(stage.parameter_file(), Path::new("/params/stage0.txt"));
        assert_eq!(stage.input_frame().name(), "affine-aligned");
        assert_eq!(stage.output_frame().name(), "atlas");
    }
}
