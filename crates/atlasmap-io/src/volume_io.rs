//! Volume export in a standard neuroimaging container.

use anyhow::{bail, Context, Result};
use atlasmap_core::spatial::{Direction3, Point3, Spacing3, Vector3};
use atlasmap_core::{ImageGeometry, Volume};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use std::path::Path;

/// Write a volume to a NIfTI file, carrying its geometry in the header.
///
/// Spacing goes into `pixdim`; origin and direction go into the sform
/// rows, each row scaled by the corresponding axis spacing. A `.nii.gz`
/// extension selects compressed output.
pub fn write_volume(volume: &Volume, path: &Path) -> Result<()> {
    let geometry = volume.geometry();
    let spacing = geometry.spacing();
    let direction = geometry.direction();
    let origin = geometry.origin();

    // sform rows: [direction · diag(spacing) | origin].
    let mut srow = [[0.0f32; 4]; 3];
    for r in 0..3 {
        for c in 0..3 {
            srow[r][c] = (direction[(r, c)] * spacing[c]) as f32;
        }
        srow[r][3] = origin[r] as f32;
    }

    let mut pixdim = [1.0f32; 8];
    for i in 0..3 {
        pixdim[i + 1] = spacing[i] as f32;
    }

    let header = NiftiHeader {
        pixdim,
        srow_x: srow[0],
        srow_y: srow[1],
        srow_z: srow[2],
        sform_code: 1,
        ..NiftiHeader::default()
    };

    WriterOptions::new(path)
        .reference_header(&header)
        .write_nifti(volume.data())
        .with_context(|| format!("failed to write volume to {}", path.display()))?;
    Ok(())
}

/// Read a NIfTI volume written by [`write_volume`], recovering its
/// geometry from the sform rows.
///
/// Spacing is the column norm of each sform row block; the normalized
/// columns must form a signed permutation, which is all this pipeline
/// ever writes.
pub fn read_volume(path: &Path) -> Result<Volume> {
    let obj = ReaderOptions::new()
        .read_file(path)
        .with_context(|| format!("failed to read volume from {}", path.display()))?;
    let header = obj.header().clone();

    if header.sform_code == 0 {
        bail!("{}: volume carries no sform geometry", path.display());
    }
    let rows = [header.srow_x, header.srow_y, header.srow_z];
    let origin = Point3::new([rows[0][3] as f64, rows[1][3] as f64, rows[2][3] as f64]);

    let mut spacing = Spacing3::zeros();
    let mut direction = Direction3::zeros();
    for c in 0..3 {
        let col = Vector3::new([rows[0][c] as f64, rows[1][c] as f64, rows[2][c] as f64]);
        let norm = col.norm();
        if norm < 1e-9 {
            bail!("{}: degenerate sform column {c}", path.display());
        }
        spacing[c] = norm;
        // Direction cosines are exact signed units in this pipeline; snap
        // away f32 header noise instead of carrying normalized values.
        for r in 0..3 {
            direction[(r, c)] = (col[r] / norm).round();
        }
    }
    let geometry = ImageGeometry::new(origin, spacing, direction)
        .with_context(|| format!("{}: sform is not a signed permutation", path.display()))?;

    let data = obj
        .into_volume()
        .into_ndarray::<f32>()
        .context("failed to convert volume to ndarray")?;
    let shape = data.shape().to_vec();
    if shape.len() != 3 {
        bail!("expected a 3D volume, found {} dimensions", shape.len());
    }
    let data = data
        .into_dimensionality::<ndarray::Ix3>()
        .context("failed to reshape volume to 3D")?;
    Ok(Volume::new(data, geometry))
}
