use atlasmap_core::orientation::AnatomicalOrientation;
use atlasmap_core::spatial::{Point3, Spacing3};
use atlasmap_core::ImageGeometry;
use proptest::prelude::*;

fn orientation_strategy() -> impl Strategy<Value = AnatomicalOrientation> {
    let all = AnatomicalOrientation::all();
    (0..all.len()).prop_map(move |i| all[i])
}

proptest! {
    /// physical -> index -> physical recovers the point for any geometry
    /// built from a valid orientation pair.
    #[test]
    fn test_coordinate_roundtrip(
        source in orientation_strategy(),
        target in orientation_strategy(),
        ox in -100.0f64..100.0, oy in -100.0f64..100.0, oz in -100.0f64..100.0,
        sx in 0.1f64..5.0, sy in 0.1f64..5.0, sz in 0.1f64..5.0,
        px in -50.0f64..50.0, py in -50.0f64..50.0, pz in -50.0f64..50.0
    ) {
        let geometry = ImageGeometry::new(
            Point3::new([ox, oy, oz]),
            Spacing3::new([sx, sy, sz]),
            source.rotation_to(&target),
        ).unwrap();

        let point = Point3::new([px, py, pz]);
        let index = geometry.physical_to_index(&point);
        let recovered = geometry.index_to_physical(&index);

        prop_assert!((point[0] - recovered[0]).abs() < 1e-6, "X mismatch: {} vs {}", point[0], recovered[0]);
        prop_assert!((point[1] - recovered[1]).abs() < 1e-6, "Y mismatch: {} vs {}", point[1], recovered[1]);
        prop_assert!((point[2] - recovered[2]).abs() < 1e-6, "Z mismatch: {} vs {}", point[2], recovered[2]);
    }

    /// index -> physical -> index is likewise stable.
    #[test]
    fn test_index_roundtrip(
        source in orientation_strategy(),
        target in orientation_strategy(),
        sx in 0.1f64..5.0, sy in 0.1f64..5.0, sz in 0.1f64..5.0,
        ix in 0.0f64..512.0, iy in 0.0f64..512.0, iz in 0.0f64..512.0
    ) {
        let geometry = ImageGeometry::new(
            Point3::origin(),
            Spacing3::new([sx, sy, sz]),
            source.rotation_to(&target),
        ).unwrap();

        let index = Point3::new([ix, iy, iz]);
        let recovered = geometry.physical_to_index(&geometry.index_to_physical(&index));

        for axis in 0..3 {
            prop_assert!((index[axis] - recovered[axis]).abs() < 1e-6);
        }
    }
}
