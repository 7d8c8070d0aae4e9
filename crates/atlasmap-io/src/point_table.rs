//! Plain-text point protocol spoken by the external resampling engine.
//!
//! Input side: a literal `point` header, a count line, then one `x y z` line
//! per point. Result side: one line per point containing labeled
//! bracket-delimited groups; coordinates are extracted by locating the
//! labels, never by character offset — the engine's line layout drifts
//! between versions and fixed-offset slicing breaks silently.

use atlasmap_core::spatial::Point3;
use atlasmap_core::{AtlasError, Frame, LengthUnit, PointSet, Result};
use std::fs;
use std::path::Path;

const HEADER: &str = "point";
const INPUT_LABEL: &str = "InputPoint";
const OUTPUT_LABEL: &str = "OutputPoint";

/// One parsed engine result line: the echoed input point and the
/// transformed output point.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub input: [f64; 3],
    pub output: [f64; 3],
}

/// Write a point set in the engine's input format.
///
/// The whole set is written in one file — the engine is invoked once per
/// batch, never per point. Writes to a temporary sibling path and renames
/// into place on success.
pub fn write_point_table(points: &PointSet, path: &Path) -> Result<()> {
    let mut text = String::new();
    text.push_str(HEADER);
    text.push('\n');
    text.push_str(&points.len().to_string());
    text.push('\n');
    for p in points.iter() {
        text.push_str(&format!("{} {} {}\n", p[0], p[1], p[2]));
    }

    let tmp = crate::temp_sibling(path);
    fs::write(&tmp, text)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Read a point table written by [`write_point_table`] back into a point
/// set tagged with `frame` and `unit`.
pub fn read_point_table(path: &Path, frame: Frame, unit: LengthUnit) -> Result<PointSet> {
    let text = fs::read_to_string(path)?;
    let mut lines = text.lines();

    match lines.next() {
        Some(h) if h.trim() == HEADER => {}
        other => {
            return Err(AtlasError::validation(format!(
                "point table {} missing '{HEADER}' header, got {:?}",
                path.display(),
                other
            )))
        }
    }
    let count: usize = lines
        .next()
        .ok_or_else(|| AtlasError::validation("point table missing count line"))?
        .trim()
        .parse()
        .map_err(|e| AtlasError::validation(format!("bad point count: {e}")))?;

    let mut points = Vec::with_capacity(count);
    for (i, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let coords: Vec<f64> = line
            .split_whitespace()
            .map(|tok| {
                tok.parse::<f64>().map_err(|e| {
                    AtlasError::validation(format!("bad coordinate '{tok}' on point line {i}: {e}"))
                })
            })
            .collect::<Result<_>>()?;
        if coords.len() != 3 {
            return Err(AtlasError::validation(format!(
                "point line {i} has {} coordinates, expected 3",
                coords.len()
            )));
        }
        points.push(Point3::new([coords[0], coords[1], coords[2]]));
    }
    if points.len() != count {
        return Err(AtlasError::validation(format!(
            "point table declares {count} points but contains {}",
            points.len()
        )));
    }
    Ok(PointSet::new(frame, unit, points))
}

/// Extract the coordinate triple of a labeled bracket group, e.g.
/// `InputPoint = [ 1.0 2.0 3.0 ]`, from anywhere in the line.
fn labeled_triple(line: &str, label: &str, line_no: usize) -> Result<[f64; 3]> {
    let start = line.find(label).ok_or_else(|| {
        AtlasError::parse(format!("result line {line_no} lacks '{label}' group"))
    })?;
    let rest = &line[start + label.len()..];
    let open = rest.find('[').ok_or_else(|| {
        AtlasError::parse(format!("result line {line_no}: '{label}' group has no '['"))
    })?;
    let rest = &rest[open + 1..];
    let close = rest.find(']').ok_or_else(|| {
        AtlasError::parse(format!("result line {line_no}: '{label}' group has no ']'"))
    })?;

    let coords: Vec<f64> = rest[..close]
        .split_whitespace()
        .map(|tok| {
            tok.parse::<f64>().map_err(|e| {
                AtlasError::parse(format!(
                    "result line {line_no}: bad value '{tok}' in '{label}' group: {e}"
                ))
            })
        })
        .collect::<Result<_>>()?;
    if coords.len() != 3 {
        return Err(AtlasError::parse(format!(
            "result line {line_no}: '{label}' group has {} values, expected 3",
            coords.len()
        )));
    }
    Ok([coords[0], coords[1], coords[2]])
}

/// Parse a single engine result line into its input/output point pair.
pub fn parse_result_line(line: &str, line_no: usize) -> Result<ResultRow> {
    Ok(ResultRow {
        input: labeled_triple(line, INPUT_LABEL, line_no)?,
        output: labeled_triple(line, OUTPUT_LABEL, line_no)?,
    })
}

/// Parse the engine's result table into the transformed point set.
///
/// Each non-empty line must carry labeled `InputPoint` and `OutputPoint`
/// groups; output points are collected in line order and tagged with
/// `frame` and `unit`.
pub fn parse_result_table(path: &Path, frame: Frame, unit: LengthUnit) -> Result<PointSet> {
    let text = fs::read_to_string(path)?;
    let mut points = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row = parse_result_line(line, i)?;
        points.push(Point3::new(row.output));
    }
    Ok(PointSet::new(frame, unit, points))
}
