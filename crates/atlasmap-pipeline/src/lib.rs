//! Pipeline orchestration: engine invocation, run configuration, and the
//! end-to-end point and volume mapping entry points.

pub mod config;
pub mod engine;
pub mod orchestrator;

pub use config::{PointMappingConfig, VolumeExportConfig};
pub use engine::CommandLineEngine;
pub use orchestrator::{
    run_point_mapping, run_point_mapping_with, run_volume_export, PointMappingOutputs,
    VolumeExportOutputs,
};
