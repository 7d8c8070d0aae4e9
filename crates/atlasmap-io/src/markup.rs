//! Point annotation markup documents.
//!
//! Markup documents hold a list of markup groups, each with control points
//! carrying a three-float physical-space `position`. Reading flattens all
//! groups into one ordered point set; writing produces a single-group mirror
//! for downstream visualization.

use atlasmap_core::spatial::Point3;
use atlasmap_core::{AtlasError, Frame, LengthUnit, PointSet, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct MarkupDocument {
    markups: Vec<MarkupGroup>,
}

#[derive(Debug, Serialize, Deserialize)]
struct MarkupGroup {
    #[serde(rename = "type", default = "default_markup_type")]
    markup_type: String,
    #[serde(rename = "coordinateUnits", default = "default_units")]
    coordinate_units: String,
    #[serde(rename = "controlPoints", default)]
    control_points: Vec<ControlPoint>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ControlPoint {
    #[serde(default)]
    label: String,
    position: [f64; 3],
}

fn default_markup_type() -> String {
    "Fiducial".to_string()
}

fn default_units() -> String {
    "um".to_string()
}

/// Read a markup document into a point set tagged with `frame` and `unit`.
///
/// Control points are taken across all markup groups in document order.
/// A document that is not valid JSON or lacks the markup structure fails
/// with a validation error.
pub fn read_markup(path: &Path, frame: Frame, unit: LengthUnit) -> Result<PointSet> {
    let text = fs::read_to_string(path)?;
    let document: MarkupDocument = serde_json::from_str(&text).map_err(|e| {
        AtlasError::validation(format!("malformed markup document {}: {e}", path.display()))
    })?;

    let points = document
        .markups
        .iter()
        .flat_map(|group| group.control_points.iter())
        .map(|cp| Point3::new(cp.position))
        .collect();
    Ok(PointSet::new(frame, unit, points))
}

/// Write a point set as a single-group markup document.
///
/// Control points are labeled `P-1`, `P-2`, … in point order. The file is
/// written to a temporary sibling path and renamed into place so a crash
/// never leaves a partially written document.
pub fn write_markup(points: &PointSet, path: &Path) -> Result<()> {
    let document = MarkupDocument {
        markups: vec![MarkupGroup {
            markup_type: default_markup_type(),
            coordinate_units: points.unit().abbreviation().to_string(),
            control_points: points
                .iter()
                .enumerate()
                .map(|(i, p)| ControlPoint {
                    label: format!("P-{}", i + 1),
                    position: p.coords(),
                })
                .collect(),
        }],
    };
    let text = serde_json::to_string_pretty(&document)
        .map_err(|e| AtlasError::validation(format!("failed to encode markup document: {e}")))?;

    let tmp = crate::temp_sibling(path);
    fs::write(&tmp, text)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
