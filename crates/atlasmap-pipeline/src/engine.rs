//! External resampling engine invocation over the text point protocol.
//!
//! The engine is a separate executable that owns the non-linear deformation
//! models. One invocation covers the whole batch and the whole stage chain:
//! process startup dominates per-point cost.

use atlasmap_core::transform::{NonLinearStage, StageEvaluator};
use atlasmap_core::{AtlasError, PointSet, Result};
use atlasmap_io::{parse_result_table, write_point_table};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// File name the engine reads its input points from.
pub const INPUT_FILE: &str = "inputpoints.txt";
/// File name the engine writes its result table to.
pub const RESULT_FILE: &str = "outputpoints.txt";

/// Evaluates non-linear stage chains by running an external engine
/// executable.
///
/// The engine receives the input point file via `-def`, its scratch and
/// output directory via `-out`, an optional reference volume via `-ref`,
/// and one `-tp` argument per stage parameter file, in chain order.
#[derive(Debug)]
pub struct CommandLineEngine {
    program: PathBuf,
    working_dir: PathBuf,
    reference_volume: Option<PathBuf>,
}

impl CommandLineEngine {
    /// Create an engine wrapper around `program`, using `working_dir` for
    /// the point files the protocol exchanges.
    pub fn new(program: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_dir: working_dir.into(),
            reference_volume: None,
        }
    }

    /// Pass a reference volume to the engine for output-grid definition.
    pub fn with_reference_volume(mut self, path: impl Into<PathBuf>) -> Self {
        self.reference_volume = Some(path.into());
        self
    }

    /// The engine executable.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl StageEvaluator for CommandLineEngine {
    fn evaluate_chain(&self, points: &PointSet, chain: &[NonLinearStage]) -> Result<PointSet> {
        let last = chain
            .last()
            .ok_or_else(|| AtlasError::engine("cannot invoke the engine with an empty stage chain"))?;

        let input_path = self.working_dir.join(INPUT_FILE);
        write_point_table(points, &input_path)?;

        // A result table from an earlier run must never be mistaken for
        // this run's output.
        let result_path = self.working_dir.join(RESULT_FILE);
        if result_path.is_file() {
            fs::remove_file(&result_path)?;
        }

        let mut command = Command::new(&self.program);
        command.arg("-def").arg(&input_path);
        command.arg("-out").arg(&self.working_dir);
        if let Some(reference) = &self.reference_volume {
            command.arg("-ref").arg(reference);
        }
        for stage in chain {
            command.arg("-tp").arg(stage.parameter_file());
        }
        tracing::info!(
            "Invoking engine {} with {} points through {} stages",
            self.program.display(),
            points.len(),
            chain.len()
        );

        let output = command.output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AtlasError::engine(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        if !output.stdout.is_empty() {
            tracing::debug!("Engine output: {}", String::from_utf8_lossy(&output.stdout).trim());
        }

        if !result_path.is_file() {
            return Err(AtlasError::engine(format!(
                "engine exited successfully but wrote no {RESULT_FILE} in {}",
                self.working_dir.display()
            )));
        }
        parse_result_table(&result_path, last.output_frame().clone(), points.unit())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use atlasmap_core::spatial::Point3;
    use atlasmap_core::{Frame, LengthUnit};
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn write_script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-engine.sh");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn sample_chain(dir: &Path) -> Vec<NonLinearStage> {
        let param = dir.join("stage0.txt");
        fs::write(&param, "(Transform \"BSplineTransform\")\n").unwrap();
        vec![NonLinearStage::new(param, Frame::new("affine-aligned"), Frame::new("atlas"))]
    }

    fn sample_points() -> PointSet {
        PointSet::new(
            Frame::new("affine-aligned"),
            LengthUnit::Micrometer,
            vec![Point3::new([1.0, 2.0, 3.0])],
        )
    }

    #[test]
    fn test_engine_parses_result_table() {
        let dir = tempdir().unwrap();
        // $2 = input file, $4 = output directory.
        let script = write_script(
            dir.path(),
            "printf 'Point 0 ; InputPoint = [ 1 2 3 ] ; OutputPoint = [ 4 5 6 ]\\n' > \"$4\"/outputpoints.txt",
        );
        let engine = CommandLineEngine::new(&script, dir.path());

        let out = engine.evaluate_chain(&sample_points(), &sample_chain(dir.path())).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.frame().name(), "atlas");
        assert_eq!(out.points()[0], Point3::new([4.0, 5.0, 6.0]));
        // The input table was written before invocation.
        assert!(dir.path().join(INPUT_FILE).is_file());
    }

    #[test]
    fn test_engine_failure_carries_stderr() {
        let dir = tempdir().unwrap();
        let script = write_script(dir.path(), "echo 'parameter file rejected' >&2; exit 3");
        let engine = CommandLineEngine::new(&script, dir.path());

        let err = engine.evaluate_chain(&sample_points(), &sample_chain(dir.path())).unwrap_err();
        match err {
            AtlasError::Engine(msg) => assert!(msg.contains("parameter file rejected")),
            other => panic!("expected engine error, got {other:?}"),
        }
    }

    #[test]
    fn test_stale_result_table_is_not_reused() {
        let dir = tempdir().unwrap();
        // Leftover table from an earlier run.
        fs::write(
            dir.path().join(RESULT_FILE),
            "Point 0 ; InputPoint = [ 1 2 3 ] ; OutputPoint = [ 111 222 333 ]\n",
        )
        .unwrap();
        // The engine exits cleanly without writing a fresh table.
        let script = write_script(dir.path(), "exit 0");
        let engine = CommandLineEngine::new(&script, dir.path());

        let err = engine.evaluate_chain(&sample_points(), &sample_chain(dir.path())).unwrap_err();
        assert!(matches!(err, AtlasError::Engine(_)));
        assert!(!dir.path().join(RESULT_FILE).is_file());
    }

    #[test]
    fn test_engine_missing_result_file() {
        let dir = tempdir().unwrap();
        let script = write_script(dir.path(), "exit 0");
        let engine = CommandLineEngine::new(&script, dir.path());

        let err = engine.evaluate_chain(&sample_points(), &sample_chain(dir.path())).unwrap_err();
        assert!(matches!(err, AtlasError::Engine(_)));
    }
}
