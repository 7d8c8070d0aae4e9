//! Volume Export Example
//!
//! Fetches one level of a local multiscale store and exports it reoriented
//! into the atlas axis convention.
//!
//! Usage:
//!   cargo run --example volume_export -- <pyramid_root> <level> <source_code> <out.nii.gz>

use atlasmap_pipeline::{run_volume_export, VolumeExportConfig};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() != 4 {
        anyhow::bail!("usage: volume_export <pyramid_root> <level> <source_code> <out.nii.gz>");
    }

    let config = VolumeExportConfig {
        pyramid_root: PathBuf::from(&args[0]),
        pyramid_level: args[1].parse()?,
        source_orientation: args[2].clone(),
        target_orientation: "RAS".into(),
        output_path: PathBuf::from(&args[3]),
        device_frame: "lightsheet".into(),
        atlas_frame: "atlas".into(),
    };

    let outputs = run_volume_export(&config)?;
    println!(
        "Exported level {} as {:?} voxels to {}",
        config.pyramid_level,
        outputs.volume.shape(),
        outputs.path.display()
    );
    Ok(())
}
