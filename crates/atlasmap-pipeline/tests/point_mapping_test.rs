//! End-to-end point mapping runs against an in-process stage evaluator.

use atlasmap_core::spatial::{Point3, Vector3};
use atlasmap_core::transform::{NonLinearStage, StageEvaluator};
use atlasmap_core::{Frame, LengthUnit, PointSet, Result as AtlasResult};
use atlasmap_io::{read_markup, read_point_table};
use atlasmap_pipeline::{run_point_mapping_with, PointMappingConfig};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Stand-in for the external engine: shifts every point by a fixed offset
/// and tags the result with the last stage's output frame.
struct ShiftEvaluator {
    offset: Vector3,
}

impl StageEvaluator for ShiftEvaluator {
    fn evaluate_chain(&self, points: &PointSet, chain: &[NonLinearStage]) -> AtlasResult<PointSet> {
        let frame = chain.last().unwrap().output_frame().clone();
        Ok(points.map_into(frame, |p| *p + self.offset))
    }
}

/// Evaluator that must never be reached.
struct UnreachableEvaluator;

impl StageEvaluator for UnreachableEvaluator {
    fn evaluate_chain(&self, _: &PointSet, _: &[NonLinearStage]) -> AtlasResult<PointSet> {
        panic!("linear-only run must not invoke the evaluator");
    }
}

const MARKUP: &str = r#"{
    "markups": [
        {
            "type": "Fiducial",
            "coordinateUnits": "um",
            "controlPoints": [
                { "label": "injection", "position": [10.0, 20.0, 30.0] },
                { "label": "probe-tip", "position": [-1.0, -2.0, -3.0] }
            ]
        }
    ]
}"#;

fn write_fixtures(dir: &Path, stage_count: usize) -> PointMappingConfig {
    let markup_input = dir.join("points.mrk.json");
    fs::write(&markup_input, MARKUP).unwrap();

    let linear_transform = dir.join("init.txt");
    fs::write(
        &linear_transform,
        "#Insight Transform File V1.0\n\
         Transform: AffineTransform_double_3_3\n\
         Parameters: 1 0 0 0 1 0 0 0 1 5 0 0\n\
         FixedParameters: 0 0 0\n",
    )
    .unwrap();

    let stage_files = (0..stage_count)
        .map(|i| {
            let path = dir.join(format!("stage{i}.txt"));
            fs::write(&path, "(Transform \"BSplineTransform\")\n").unwrap();
            path
        })
        .collect();

    PointMappingConfig {
        markup_input,
        linear_transform,
        stage_files,
        engine_program: dir.join("unused-engine"),
        reference_volume: None,
        output_dir: dir.join("out"),
        device_frame: "lightsheet".into(),
        atlas_frame: "atlas".into(),
        unit: LengthUnit::Micrometer,
    }
}

#[test]
fn test_full_run_with_stages() {
    let dir = tempdir().unwrap();
    let config = write_fixtures(dir.path(), 2);
    let evaluator = ShiftEvaluator { offset: Vector3::new([0.0, 0.0, 1.5]) };

    let outputs = run_point_mapping_with(&config, &evaluator).unwrap();

    // Linear translation (+5 on x), then the evaluator shift (+1.5 on z).
    assert_eq!(outputs.points.len(), 2);
    assert_eq!(outputs.points.frame().name(), "atlas");
    assert_eq!(outputs.points.points()[0], Point3::new([15.0, 20.0, 31.5]));
    assert_eq!(outputs.points.points()[1], Point3::new([4.0, -2.0, -1.5]));

    // Result table round-trips through the text format.
    let table = read_point_table(&outputs.table_path, Frame::new("atlas"), LengthUnit::Micrometer)
        .unwrap();
    assert_eq!(table, outputs.points);

    // Markup mirror carries the same points for visualization.
    let mirror =
        read_markup(&outputs.markup_path, Frame::new("atlas"), LengthUnit::Micrometer).unwrap();
    assert_eq!(mirror, outputs.points);
}

#[test]
fn test_linear_only_run_skips_evaluator() {
    let dir = tempdir().unwrap();
    let config = write_fixtures(dir.path(), 0);

    let outputs = run_point_mapping_with(&config, &UnreachableEvaluator).unwrap();
    assert_eq!(outputs.points.frame().name(), "atlas");
    assert_eq!(outputs.points.points()[0], Point3::new([15.0, 20.0, 30.0]));
}

#[test]
fn test_missing_stage_file_fails_before_mapping() {
    let dir = tempdir().unwrap();
    let mut config = write_fixtures(dir.path(), 1);
    config.stage_files.push(dir.path().join("absent.txt"));

    let err = run_point_mapping_with(&config, &UnreachableEvaluator).unwrap_err();
    assert!(err.to_string().contains("absent.txt"));
}
