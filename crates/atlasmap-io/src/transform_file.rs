//! Serialized transform files: the linear initialization and the ordered
//! non-linear stage chain.
//!
//! The linear stage arrives as an insight-transform-file text document with
//! `Parameters:` and `FixedParameters:` lines. Non-linear stages stay
//! opaque: each is a parameter-map text file consumed only by the external
//! engine; this module just validates their existence and fixes their order.

use atlasmap_core::spatial::{Point3, Vector3};
use atlasmap_core::{AtlasError, Frame, LinearTransform, NonLinearStage, Result};
use nalgebra::Matrix3;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a linear transform from an insight-transform-file text document.
///
/// Supported kinds:
/// * affine — 12 parameters (row-major 3×3 matrix, then translation),
///   fixed parameters carry the rotation center;
/// * versor rigid — 6 parameters (versor vector part, then translation),
///   fixed parameters carry the rotation center.
///
/// A missing file is a configuration error (caught before any engine work);
/// a present but malformed file is a parse error.
pub fn read_linear_transform(
    path: &Path,
    input_frame: Frame,
    output_frame: Frame,
) -> Result<LinearTransform> {
    if !path.is_file() {
        return Err(AtlasError::configuration(format!(
            "linear transform file {} does not exist",
            path.display()
        )));
    }
    let text = fs::read_to_string(path)?;

    let mut kind: Option<String> = None;
    let mut parameters: Option<Vec<f64>> = None;
    let mut fixed: Option<Vec<f64>> = None;
    for line in text.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("Transform:") {
            kind = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("Parameters:") {
            parameters = Some(parse_floats(value, path)?);
        } else if let Some(value) = line.strip_prefix("FixedParameters:") {
            fixed = Some(parse_floats(value, path)?);
        }
    }

    let kind = kind.ok_or_else(|| {
        AtlasError::parse(format!("{}: missing 'Transform:' line", path.display()))
    })?;
    let parameters = parameters.ok_or_else(|| {
        AtlasError::parse(format!("{}: missing 'Parameters:' line", path.display()))
    })?;
    let fixed = fixed.unwrap_or_else(|| vec![0.0, 0.0, 0.0]);
    if fixed.len() != 3 {
        return Err(AtlasError::parse(format!(
            "{}: expected 3 fixed parameters, got {}",
            path.display(),
            fixed.len()
        )));
    }
    let center = Point3::new([fixed[0], fixed[1], fixed[2]]);

    if kind.contains("AffineTransform") {
        if parameters.len() != 12 {
            return Err(AtlasError::parse(format!(
                "{}: affine transform expects 12 parameters, got {}",
                path.display(),
                parameters.len()
            )));
        }
        let matrix = Matrix3::from_row_slice(&parameters[..9]);
        let translation = Vector3::new([parameters[9], parameters[10], parameters[11]]);
        LinearTransform::new(matrix, translation, center, input_frame, output_frame)
    } else if kind.contains("VersorRigid3DTransform") {
        if parameters.len() != 6 {
            return Err(AtlasError::parse(format!(
                "{}: versor rigid transform expects 6 parameters, got {}",
                path.display(),
                parameters.len()
            )));
        }
        let versor = [parameters[0], parameters[1], parameters[2]];
        let translation = Vector3::new([parameters[3], parameters[4], parameters[5]]);
        LinearTransform::from_versor(versor, translation, center, input_frame, output_frame)
    } else {
        Err(AtlasError::parse(format!(
            "{}: unsupported transform kind '{kind}'",
            path.display()
        )))
    }
}

fn parse_floats(text: &str, path: &Path) -> Result<Vec<f64>> {
    text.split_whitespace()
        .map(|tok| {
            tok.parse::<f64>().map_err(|e| {
                AtlasError::parse(format!("{}: bad parameter '{tok}': {e}", path.display()))
            })
        })
        .collect()
}

/// Assemble the ordered non-linear stage chain from per-stage parameter
/// files.
///
/// File order is preserved exactly: chain\[i\] corresponds to `paths[i]`.
/// Every file must exist up front — a missing stage file is a configuration
/// error detected before the engine is ever invoked. Intermediate frames
/// are synthesized from the final frame name; the last stage lands in
/// `output_frame`.
pub fn load_stage_chain(
    paths: &[PathBuf],
    input_frame: &Frame,
    output_frame: &Frame,
) -> Result<Vec<NonLinearStage>> {
    for path in paths {
        if !path.is_file() {
            return Err(AtlasError::configuration(format!(
                "stage parameter file {} does not exist",
                path.display()
            )));
        }
    }

    let mut chain = Vec::with_capacity(paths.len());
    let mut current = input_frame.clone();
    for (i, path) in paths.iter().enumerate() {
        let next = if i + 1 == paths.len() {
            output_frame.clone()
        } else {
            Frame::new(format!("{}/stage{}", output_frame.name(), i))
        };
        chain.push(NonLinearStage::new(path.clone(), current, next.clone()));
        current = next;
    }
    Ok(chain)
}
