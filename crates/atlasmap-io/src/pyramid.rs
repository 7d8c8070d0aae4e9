//! Lazy access to one resolution level of a chunked multiscale store.
//!
//! The store is reached through [`ObjectStore`], a blocking fetch-by-key /
//! list-by-prefix seam; remote backends (and their retry policies) live
//! behind it. Chunk payload decoding sits behind [`ChunkCodec`] so
//! compression internals stay out of this crate. Only the requested level
//! is ever fetched — never the whole pyramid — and each fetched level is
//! cached for the accessor's lifetime. The cache is append-only and bounded
//! by the level count.

use atlasmap_core::spatial::Spacing3;
use atlasmap_core::{AtlasError, ImageGeometry, Result, Volume};
use ndarray::{s, Array3};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Blocking object storage: fetch-by-key and list-by-prefix.
///
/// Transient failures surface as I/O errors; by the time they reach this
/// crate any retries owned by the backend are exhausted and the failure is
/// terminal.
pub trait ObjectStore {
    /// Fetch the object at `key` in full.
    fn fetch(&self, key: &str) -> Result<Vec<u8>>;

    /// List all keys starting with `prefix`.
    fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Object store over a local directory tree; keys are `/`-separated
/// relative paths.
#[derive(Debug)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ObjectStore for LocalStore {
    fn fetch(&self, key: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.root.join(key))?)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        fn walk(dir: &Path, root: &Path, out: &mut Vec<String>) -> std::io::Result<()> {
            for entry in fs::read_dir(dir)? {
                let entry = entry?;
                let path = entry.path();
                if path.is_dir() {
                    walk(&path, root, out)?;
                } else if let Ok(rel) = path.strip_prefix(root) {
                    out.push(rel.to_string_lossy().replace('\\', "/"));
                }
            }
            Ok(())
        }
        let mut keys = Vec::new();
        walk(&self.root, &self.root, &mut keys)?;
        keys.retain(|k| k.starts_with(prefix));
        keys.sort();
        Ok(keys)
    }
}

/// Decodes one chunk payload into voxel values.
///
/// Implementations own any decompression; this crate never inspects the
/// payload bytes itself.
pub trait ChunkCodec {
    /// Decode `bytes` into exactly `expected` f32 values.
    fn decode(&self, bytes: &[u8], expected: usize) -> Result<Vec<f32>>;
}

/// Codec for uncompressed little-endian f32 chunks.
#[derive(Debug, Default)]
pub struct RawLittleEndian;

impl ChunkCodec for RawLittleEndian {
    fn decode(&self, bytes: &[u8], expected: usize) -> Result<Vec<f32>> {
        if bytes.len() != expected * 4 {
            return Err(AtlasError::validation(format!(
                "chunk payload is {} bytes, expected {} ({} f32 values)",
                bytes.len(),
                expected * 4,
                expected
            )));
        }
        Ok(bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }
}

/// Sidecar metadata describing every pyramid level.
#[derive(Debug, Clone, Deserialize)]
pub struct MultiscaleMetadata {
    pub datasets: Vec<LevelMetadata>,
}

/// One level's location, shape, and physical scale.
#[derive(Debug, Clone, Deserialize)]
pub struct LevelMetadata {
    /// Key prefix of the level's data within the store.
    pub path: String,
    /// Array shape per axis.
    pub shape: [usize; 3],
    /// Physical voxel size per axis.
    pub scale: [f64; 3],
    /// Chunk shape; absent when the level is stored as a single object.
    #[serde(default)]
    pub chunk_shape: Option<[usize; 3]>,
}

/// One materialized resolution level.
#[derive(Debug, Clone)]
pub struct PyramidLevel {
    index: usize,
    volume: Volume,
}

impl PyramidLevel {
    /// The level's index within the pyramid.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The level's voxel data and geometry.
    pub fn volume(&self) -> &Volume {
        &self.volume
    }
}

/// Lazy, caching accessor over one multiscale store.
#[derive(Debug)]
pub struct PyramidAccessor<S: ObjectStore, C: ChunkCodec> {
    store: S,
    codec: C,
    metadata: MultiscaleMetadata,
    cache: HashMap<usize, PyramidLevel>,
}

/// Store key of the multiscale sidecar document.
pub const METADATA_KEY: &str = "multiscales.json";

impl<S: ObjectStore, C: ChunkCodec> PyramidAccessor<S, C> {
    /// Open a pyramid, reading and validating only the sidecar metadata.
    ///
    /// Levels must be indexed coarsening outward: per-axis scale
    /// non-decreasing as the level index increases, all scales strictly
    /// positive. No voxel data is fetched here.
    pub fn open(store: S, codec: C) -> Result<Self> {
        let bytes = store.fetch(METADATA_KEY)?;
        let metadata: MultiscaleMetadata = serde_json::from_slice(&bytes)
            .map_err(|e| AtlasError::validation(format!("malformed multiscale metadata: {e}")))?;

        if metadata.datasets.is_empty() {
            return Err(AtlasError::validation("multiscale metadata lists no levels"));
        }
        for (i, level) in metadata.datasets.iter().enumerate() {
            if level.scale.iter().any(|&s| s <= 0.0) {
                return Err(AtlasError::validation(format!(
                    "level {i} has non-positive scale {:?}",
                    level.scale
                )));
            }
            if i > 0 {
                let prev = &metadata.datasets[i - 1].scale;
                if (0..3).any(|k| level.scale[k] < prev[k]) {
                    return Err(AtlasError::validation(format!(
                        "level {i} scale {:?} is finer than level {} scale {:?}; \
                         levels must coarsen as the index increases",
                        level.scale,
                        i - 1,
                        prev
                    )));
                }
            }
        }

        Ok(Self { store, codec, metadata, cache: HashMap::new() })
    }

    /// Number of available levels.
    pub fn num_levels(&self) -> usize {
        self.metadata.datasets.len()
    }

    /// Available level indices, finest first.
    pub fn list_levels(&self) -> Vec<usize> {
        (0..self.num_levels()).collect()
    }

    /// Metadata of level `index` without fetching its data.
    pub fn level_metadata(&self, index: usize) -> Result<&LevelMetadata> {
        self.metadata.datasets.get(index).ok_or_else(|| {
            AtlasError::validation(format!(
                "level {index} out of range [0, {})",
                self.num_levels()
            ))
        })
    }

    /// Indices currently held in the cache, ascending.
    pub fn cached_levels(&self) -> Vec<usize> {
        let mut keys: Vec<usize> = self.cache.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Fetch level `index`, reusing the cached copy when present.
    ///
    /// Only this level's objects are fetched. An out-of-range index fails
    /// before any fetch and leaves the cache untouched.
    pub fn get_level(&mut self, index: usize) -> Result<&PyramidLevel> {
        // Range check before any state changes.
        self.level_metadata(index)?;
        if !self.cache.contains_key(&index) {
            let level = self.load_level(index)?;
            self.cache.insert(index, level);
        }
        Ok(&self.cache[&index])
    }

    fn load_level(&self, index: usize) -> Result<PyramidLevel> {
        let meta = self.metadata.datasets[index].clone();
        let geometry = ImageGeometry::with_spacing(Spacing3::new(meta.scale))?;
        let data = match meta.chunk_shape {
            None => {
                let total = meta.shape.iter().product();
                let bytes = self.store.fetch(&meta.path)?;
                let values = self.codec.decode(&bytes, total)?;
                Array3::from_shape_vec(meta.shape, values).map_err(|e| {
                    AtlasError::validation(format!(
                        "level {index} payload does not match shape {:?}: {e}",
                        meta.shape
                    ))
                })?
            }
            Some(chunk_shape) => self.assemble_chunks(&meta, chunk_shape)?,
        };
        Ok(PyramidLevel { index, volume: Volume::new(data, geometry) })
    }

    /// Assemble a chunked level. Edge chunks are stored at full chunk
    /// shape with padding beyond the level extent; the padding is dropped
    /// during assembly.
    fn assemble_chunks(&self, meta: &LevelMetadata, chunk_shape: [usize; 3]) -> Result<Array3<f32>> {
        if chunk_shape.iter().any(|&c| c == 0) {
            return Err(AtlasError::validation(format!(
                "level '{}' has zero-sized chunk shape {:?}",
                meta.path, chunk_shape
            )));
        }
        let grid: Vec<usize> = (0..3)
            .map(|k| meta.shape[k].div_ceil(chunk_shape[k]))
            .collect();
        let chunk_len: usize = chunk_shape.iter().product();

        let mut data = Array3::<f32>::zeros(meta.shape);
        for c0 in 0..grid[0] {
            for c1 in 0..grid[1] {
                for c2 in 0..grid[2] {
                    let key = format!("{}/{}.{}.{}", meta.path, c0, c1, c2);
                    let bytes = self.store.fetch(&key)?;
                    let values = self.codec.decode(&bytes, chunk_len)?;
                    let chunk = Array3::from_shape_vec(chunk_shape, values).map_err(|e| {
                        AtlasError::validation(format!("chunk {key} has bad shape: {e}"))
                    })?;

                    let start = [c0 * chunk_shape[0], c1 * chunk_shape[1], c2 * chunk_shape[2]];
                    let valid = [
                        chunk_shape[0].min(meta.shape[0] - start[0]),
                        chunk_shape[1].min(meta.shape[1] - start[1]),
                        chunk_shape[2].min(meta.shape[2] - start[2]),
                    ];
                    data.slice_mut(s![
                        start[0]..start[0] + valid[0],
                        start[1]..start[1] + valid[1],
                        start[2]..start[2] + valid[2]
                    ])
                    .assign(&chunk.slice(s![..valid[0], ..valid[1], ..valid[2]]));
                }
            }
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory store for tests; counts fetches to verify laziness.
    #[derive(Debug)]
    struct MemoryStore {
        objects: HashMap<String, Vec<u8>>,
        fetches: std::cell::RefCell<Vec<String>>,
    }

    impl MemoryStore {
        fn new(objects: HashMap<String, Vec<u8>>) -> Self {
            Self { objects, fetches: std::cell::RefCell::new(Vec::new()) }
        }
    }

    impl ObjectStore for MemoryStore {
        fn fetch(&self, key: &str) -> Result<Vec<u8>> {
            self.fetches.borrow_mut().push(key.to_string());
            self.objects.get(key).cloned().ok_or_else(|| {
                AtlasError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no object '{key}'"),
                ))
            })
        }

        fn list(&self, prefix: &str) -> Result<Vec<String>> {
            let mut keys: Vec<String> = self
                .objects
                .keys()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect();
            keys.sort();
            Ok(keys)
        }
    }

    fn encode(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn two_level_store() -> MemoryStore {
        let metadata = r#"{
            "datasets": [
                { "path": "0", "shape": [2, 2, 2], "scale": [10.0, 10.0, 10.0] },
                { "path": "1", "shape": [1, 1, 1], "scale": [20.0, 20.0, 20.0] }
            ]
        }"#;
        let mut objects = HashMap::new();
        objects.insert(METADATA_KEY.to_string(), metadata.as_bytes().to_vec());
        objects.insert("0".to_string(), encode(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]));
        objects.insert("1".to_string(), encode(&[3.5]));
        MemoryStore::new(objects)
    }

    #[test]
    fn test_open_reads_only_metadata() {
        let accessor = PyramidAccessor::open(two_level_store(), RawLittleEndian).unwrap();
        assert_eq!(accessor.num_levels(), 2);
        assert_eq!(accessor.list_levels(), vec![0, 1]);
        assert_eq!(accessor.store.fetches.borrow().as_slice(), [METADATA_KEY]);
    }

    #[test]
    fn test_get_level_fetches_one_level() {
        let mut accessor = PyramidAccessor::open(two_level_store(), RawLittleEndian).unwrap();
        let level = accessor.get_level(1).unwrap();
        assert_eq!(level.index(), 1);
        assert_eq!(level.volume().shape(), [1, 1, 1]);
        assert_eq!(level.volume().data()[[0, 0, 0]], 3.5);
        // Only the metadata and level 1 were touched.
        let fetches = accessor.store.fetches.borrow().clone();
        assert_eq!(fetches, vec![METADATA_KEY.to_string(), "1".to_string()]);
    }

    #[test]
    fn test_get_level_caches() {
        let mut accessor = PyramidAccessor::open(two_level_store(), RawLittleEndian).unwrap();
        accessor.get_level(0).unwrap();
        accessor.get_level(0).unwrap();
        // Second call served from cache: still one data fetch.
        assert_eq!(accessor.store.fetches.borrow().len(), 2);
        assert_eq!(accessor.cached_levels(), vec![0]);
    }

    #[test]
    fn test_out_of_range_level_leaves_cache_unchanged() {
        let mut accessor = PyramidAccessor::open(two_level_store(), RawLittleEndian).unwrap();
        accessor.get_level(0).unwrap();
        let before = accessor.cached_levels();

        let err = accessor.get_level(7).unwrap_err();
        assert!(matches!(err, AtlasError::Validation(_)));
        assert_eq!(accessor.cached_levels(), before);
    }

    #[test]
    fn test_rejects_non_monotonic_scales() {
        let metadata = r#"{
            "datasets": [
                { "path": "0", "shape": [1, 1, 1], "scale": [20.0, 20.0, 20.0] },
                { "path": "1", "shape": [1, 1, 1], "scale": [10.0, 10.0, 10.0] }
            ]
        }"#;
        let mut objects = HashMap::new();
        objects.insert(METADATA_KEY.to_string(), metadata.as_bytes().to_vec());
        let err = PyramidAccessor::open(MemoryStore::new(objects), RawLittleEndian).unwrap_err();
        assert!(matches!(err, AtlasError::Validation(_)));
    }

    #[test]
    fn test_chunked_assembly_with_edge_padding() {
        // Shape 3 along axis 0 with chunk extent 2: the second chunk is
        // padded to full size and the padding must be dropped.
        let metadata = r#"{
            "datasets": [
                { "path": "lvl", "shape": [3, 2, 2], "scale": [1.0, 1.0, 1.0],
                  "chunk_shape": [2, 2, 2] }
            ]
        }"#;
        let mut objects = HashMap::new();
        objects.insert(METADATA_KEY.to_string(), metadata.as_bytes().to_vec());
        let chunk0: Vec<f32> = (0..8).map(|v| v as f32).collect();
        let mut chunk1 = vec![-1.0f32; 8];
        chunk1[0] = 100.0;
        chunk1[1] = 101.0;
        chunk1[2] = 102.0;
        chunk1[3] = 103.0;
        objects.insert("lvl/0.0.0".to_string(), encode(&chunk0));
        objects.insert("lvl/1.0.0".to_string(), encode(&chunk1));

        let mut accessor =
            PyramidAccessor::open(MemoryStore::new(objects), RawLittleEndian).unwrap();
        let level = accessor.get_level(0).unwrap();
        let data = level.volume().data();
        assert_eq!(data[[0, 0, 0]], 0.0);
        assert_eq!(data[[1, 1, 1]], 7.0);
        // Row 2 comes from the valid half of the padded edge chunk.
        assert_eq!(data[[2, 0, 0]], 100.0);
        assert_eq!(data[[2, 1, 1]], 103.0);
        // Padding values never leak into the array.
        assert!(data.iter().all(|&v| v != -1.0));
    }

    #[test]
    fn test_raw_codec_rejects_short_payload() {
        let err = RawLittleEndian.decode(&[0u8; 6], 2).unwrap_err();
        assert!(matches!(err, AtlasError::Validation(_)));
    }

    #[test]
    fn test_local_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("0")).unwrap();
        fs::write(dir.path().join("0/0.0.0"), [1, 2, 3, 4]).unwrap();
        let store = LocalStore::new(dir.path());
        assert_eq!(store.fetch("0/0.0.0").unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(store.list("0/").unwrap(), vec!["0/0.0.0".to_string()]);
    }
}
