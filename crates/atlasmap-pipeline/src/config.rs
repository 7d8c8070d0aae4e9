//! Run configuration for the two pipeline entry points.
//!
//! Configuration problems are caught by `validate()` before any engine
//! process is spawned or any voxel data is fetched; a run that is going to
//! fail on a missing input should fail immediately.

use atlasmap_core::orientation::AnatomicalOrientation;
use atlasmap_core::{AtlasError, LengthUnit, Result};
use std::path::PathBuf;

fn check_frames(device_frame: &str, atlas_frame: &str) -> Result<()> {
    if device_frame.is_empty() || atlas_frame.is_empty() {
        return Err(AtlasError::configuration("frame names must not be empty"));
    }
    if device_frame == atlas_frame {
        return Err(AtlasError::configuration(format!(
            "device and atlas frames must differ, both are '{device_frame}'"
        )));
    }
    Ok(())
}

/// Configuration of a point mapping run.
#[derive(Debug, Clone)]
pub struct PointMappingConfig {
    /// Markup document holding the input points.
    pub markup_input: PathBuf,
    /// Linear (stage 0) transform file.
    pub linear_transform: PathBuf,
    /// Non-linear stage parameter files, in application order.
    pub stage_files: Vec<PathBuf>,
    /// External engine executable.
    pub engine_program: PathBuf,
    /// Reference volume handed to the engine, when it needs one.
    pub reference_volume: Option<PathBuf>,
    /// Directory for engine scratch files and run outputs.
    pub output_dir: PathBuf,
    /// Frame the input points are expressed in.
    pub device_frame: String,
    /// Frame of the final mapped points.
    pub atlas_frame: String,
    /// Length unit of the input coordinates.
    pub unit: LengthUnit,
}

impl PointMappingConfig {
    /// Check the configuration before any work starts.
    pub fn validate(&self) -> Result<()> {
        check_frames(&self.device_frame, &self.atlas_frame)?;
        if !self.markup_input.is_file() {
            return Err(AtlasError::configuration(format!(
                "markup input {} does not exist",
                self.markup_input.display()
            )));
        }
        if !self.linear_transform.is_file() {
            return Err(AtlasError::configuration(format!(
                "linear transform file {} does not exist",
                self.linear_transform.display()
            )));
        }
        for path in &self.stage_files {
            if !path.is_file() {
                return Err(AtlasError::configuration(format!(
                    "stage parameter file {} does not exist",
                    path.display()
                )));
            }
        }
        if let Some(reference) = &self.reference_volume {
            if !reference.is_file() {
                return Err(AtlasError::configuration(format!(
                    "reference volume {} does not exist",
                    reference.display()
                )));
            }
        }
        Ok(())
    }
}

/// Configuration of a volume reorientation export.
#[derive(Debug, Clone)]
pub struct VolumeExportConfig {
    /// Root directory of the multiscale store.
    pub pyramid_root: PathBuf,
    /// Resolution level to export; never inferred.
    pub pyramid_level: usize,
    /// Orientation code of the acquisition axes, e.g. "PIR".
    pub source_orientation: String,
    /// Orientation code of the atlas axes, e.g. "RAS".
    pub target_orientation: String,
    /// Destination file; a `.nii.gz` extension selects compression.
    pub output_path: PathBuf,
    /// Frame the volume's native axes are expressed in.
    pub device_frame: String,
    /// Frame of the reoriented volume.
    pub atlas_frame: String,
}

impl VolumeExportConfig {
    /// Check the configuration before any voxel data is fetched.
    pub fn validate(&self) -> Result<()> {
        check_frames(&self.device_frame, &self.atlas_frame)?;
        if !self.pyramid_root.is_dir() {
            return Err(AtlasError::configuration(format!(
                "pyramid root {} does not exist",
                self.pyramid_root.display()
            )));
        }
        AnatomicalOrientation::from_code(&self.source_orientation)?;
        AnatomicalOrientation::from_code(&self.target_orientation)?;
        Ok(())
    }
}
