//! End-to-end orchestration of point mapping and volume export runs.
//!
//! The orchestrator owns the sequencing only: loaders, the transform stack,
//! and the engine do the work. Every run is replayable from its
//! configuration plus the referenced files.

use crate::config::{PointMappingConfig, VolumeExportConfig};
use crate::engine::CommandLineEngine;
use anyhow::{Context, Result};
use atlasmap_core::orientation::{self, AnatomicalOrientation};
use atlasmap_core::spatial::{Point3, Vector3};
use atlasmap_core::{Frame, LinearTransform, PointSet, StageEvaluator, TransformStack, Volume};
use atlasmap_io::{
    load_stage_chain, read_linear_transform, read_markup, write_markup, write_point_table,
    write_volume, LocalStore, PyramidAccessor, RawLittleEndian,
};
use std::fs;
use std::path::PathBuf;

/// Artifacts of a completed point mapping run.
#[derive(Debug)]
pub struct PointMappingOutputs {
    /// The mapped points, in the atlas frame.
    pub points: PointSet,
    /// Plain-text table of the mapped points.
    pub table_path: PathBuf,
    /// Markup mirror of the mapped points for visualization.
    pub markup_path: PathBuf,
}

/// Artifacts of a completed volume export run.
#[derive(Debug)]
pub struct VolumeExportOutputs {
    /// The reoriented volume.
    pub volume: Volume,
    /// Path the volume was written to.
    pub path: PathBuf,
}

/// Run a point mapping end to end, invoking the external engine for the
/// non-linear stages.
pub fn run_point_mapping(config: &PointMappingConfig) -> Result<PointMappingOutputs> {
    let mut engine = CommandLineEngine::new(&config.engine_program, &config.output_dir);
    if let Some(reference) = &config.reference_volume {
        engine = engine.with_reference_volume(reference);
    }
    run_point_mapping_with(config, &engine)
}

/// Run a point mapping with an explicit stage evaluator.
///
/// Load input points, assemble the transform stack, push the whole batch
/// through it, and write the result table plus a markup mirror.
pub fn run_point_mapping_with(
    config: &PointMappingConfig,
    evaluator: &dyn StageEvaluator,
) -> Result<PointMappingOutputs> {
    config.validate()?;
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating output directory {}", config.output_dir.display()))?;

    let device = Frame::new(config.device_frame.clone());
    let atlas = Frame::new(config.atlas_frame.clone());
    // The linear stage lands in the atlas frame directly when there are no
    // non-linear stages to chain through.
    let aligned = if config.stage_files.is_empty() {
        atlas.clone()
    } else {
        Frame::new(format!("{}/affine", atlas.name()))
    };

    let points = read_markup(&config.markup_input, device.clone(), config.unit)
        .with_context(|| format!("reading markup {}", config.markup_input.display()))?;
    tracing::info!(
        "Loaded {} input points from {}",
        points.len(),
        config.markup_input.display()
    );

    let linear = read_linear_transform(&config.linear_transform, device, aligned.clone())
        .context("loading linear transform")?;
    let mut stack = TransformStack::new(linear);
    for stage in load_stage_chain(&config.stage_files, &aligned, &atlas)
        .context("loading non-linear stage chain")?
    {
        stack.append_stage(stage)?;
    }
    tracing::info!(
        "Transform stack assembled: linear + {} non-linear stages",
        stack.stages().len()
    );

    let mapped = stack
        .apply_to_points(evaluator, &points)
        .context("mapping points through the transform stack")?;

    let table_path = config.output_dir.join("mapped_points.txt");
    write_point_table(&mapped, &table_path)?;
    let markup_path = config.output_dir.join("mapped_points.mrk.json");
    write_markup(&mapped, &markup_path)?;
    tracing::info!("Wrote {} mapped points to {}", mapped.len(), table_path.display());

    Ok(PointMappingOutputs { points: mapped, table_path, markup_path })
}

/// Fetch one pyramid level and export it reoriented into the atlas axis
/// convention.
///
/// The reorientation is a pure permute-and-flip of voxel data; no
/// interpolation happens here.
pub fn run_volume_export(config: &VolumeExportConfig) -> Result<VolumeExportOutputs> {
    config.validate()?;
    let source = AnatomicalOrientation::from_code(&config.source_orientation)?;
    let target = AnatomicalOrientation::from_code(&config.target_orientation)?;

    let store = LocalStore::new(&config.pyramid_root);
    let mut accessor =
        PyramidAccessor::open(store, RawLittleEndian).context("opening multiscale store")?;
    let volume = accessor
        .get_level(config.pyramid_level)
        .with_context(|| format!("fetching pyramid level {}", config.pyramid_level))?
        .volume()
        .clone();
    tracing::info!(
        "Level {}: shape {:?}, spacing {:?}",
        config.pyramid_level,
        volume.shape(),
        volume.geometry().spacing().components()
    );

    let native_spacing = volume.geometry().spacing().components();
    let reconciled =
        orientation::resolve(&native_spacing, &source, &target, *volume.geometry().origin())?;

    let device = Frame::new(config.device_frame.clone());
    let atlas = Frame::new(config.atlas_frame.clone());
    let linear = LinearTransform::new(
        *reconciled.direction().inner(),
        Vector3::zeros(),
        Point3::origin(),
        device,
        atlas,
    )?;
    let stack = TransformStack::new(linear);
    let reoriented = stack.apply_to_image(&volume).context("reorienting volume")?;

    if let Some(parent) = config.output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    write_volume(&reoriented, &config.output_path)
        .with_context(|| format!("writing volume to {}", config.output_path.display()))?;
    tracing::info!("Wrote reoriented volume to {}", config.output_path.display());

    Ok(VolumeExportOutputs { volume: reoriented, path: config.output_path.clone() })
}
