//! Point Mapping Example
//!
//! Maps a markup file of acquisition-space points into the atlas frame
//! through a linear initialization plus a chain of non-linear stages
//! evaluated by an external engine.
//!
//! Usage:
//!   cargo run --example point_mapping -- <markup.mrk.json> <init.txt> <engine> <out_dir> [stage.txt ...]

use atlasmap_core::LengthUnit;
use atlasmap_pipeline::{run_point_mapping, PointMappingConfig};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 4 {
        anyhow::bail!(
            "usage: point_mapping <markup.mrk.json> <init.txt> <engine> <out_dir> [stage.txt ...]"
        );
    }

    let config = PointMappingConfig {
        markup_input: PathBuf::from(&args[0]),
        linear_transform: PathBuf::from(&args[1]),
        engine_program: PathBuf::from(&args[2]),
        output_dir: PathBuf::from(&args[3]),
        stage_files: args[4..].iter().map(PathBuf::from).collect(),
        reference_volume: None,
        device_frame: "lightsheet".into(),
        atlas_frame: "atlas".into(),
        unit: LengthUnit::Micrometer,
    };

    let outputs = run_point_mapping(&config)?;
    println!("Mapped {} points into '{}'", outputs.points.len(), outputs.points.frame());
    println!("  table:  {}", outputs.table_path.display());
    println!("  markup: {}", outputs.markup_path.display());
    Ok(())
}
