pub mod markup;
pub mod point_table;
pub mod pyramid;
pub mod transform_file;
pub mod volume_io;

pub use markup::{read_markup, write_markup};
pub use point_table::{parse_result_table, read_point_table, write_point_table};
pub use pyramid::{
    ChunkCodec, LocalStore, ObjectStore, PyramidAccessor, PyramidLevel, RawLittleEndian,
};
pub use transform_file::{load_stage_chain, read_linear_transform};
pub use volume_io::{read_volume, write_volume};

/// Temporary sibling path for atomic writes. Appends a suffix to the full
/// file name so outputs differing only in extension never share a temp
/// path.
pub(crate) fn temp_sibling(path: &std::path::Path) -> std::path::PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "output".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::temp_sibling;
    use std::path::Path;

    #[test]
    fn test_temp_sibling_keeps_extension() {
        assert_eq!(temp_sibling(Path::new("/run/out.txt")), Path::new("/run/out.txt.tmp"));
        assert_eq!(
            temp_sibling(Path::new("/run/out.mrk.json")),
            Path::new("/run/out.mrk.json.tmp")
        );
        // Siblings differing only in extension get distinct temp paths.
        assert_ne!(temp_sibling(Path::new("/run/out.txt")), temp_sibling(Path::new("/run/out.json")));
    }
}
