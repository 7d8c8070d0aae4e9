//! Coordinate frame identity and physical units.
//!
//! Every point set is tagged with the frame it is valid in. Transform stages
//! declare their input and output frames, and the stack checks the tags at
//! every boundary instead of assuming callers kept the conventions straight.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named physical coordinate frame.
///
/// Frames compare by name. Two point sets in different frames must never be
/// combined without an explicit transform between them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame(String);

impl Frame {
    /// Create a frame with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the frame name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Physical length unit of point coordinates and voxel spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthUnit {
    Micrometer,
    Millimeter,
}

impl LengthUnit {
    /// Unit abbreviation as used in sidecar metadata.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Self::Micrometer => "um",
            Self::Millimeter => "mm",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}
