//! Anatomical axis orientation codes and frame reconciliation.
//!
//! Acquisition rigs and atlases disagree about which array axis points which
//! way through the anatomy. An [`AnatomicalOrientation`] pins each array axis
//! to a signed anatomical direction; [`resolve`] builds the exact signed
//! permutation carrying one convention onto another. Direction cosines here
//! are always ±1 entries, never normalized from measured data: a single wrong
//! sign silently corrupts every downstream coordinate, so everything is
//! validated up front and built from a closed basis table.

use crate::error::{AtlasError, Result};
use crate::geometry::ImageGeometry;
use crate::spatial::{Direction3, Point3, Spacing3, Vector3};
use std::fmt;
use std::str::FromStr;

/// A signed anatomical direction an array axis can point along.
///
/// The canonical world basis is RAS: x toward Right, y toward Anterior,
/// z toward Superior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisDirection {
    Right,
    Left,
    Anterior,
    Posterior,
    Superior,
    Inferior,
}

impl AxisDirection {
    /// All six directions, in letter order R, L, A, P, S, I.
    pub const ALL: [Self; 6] = [
        Self::Right,
        Self::Left,
        Self::Anterior,
        Self::Posterior,
        Self::Superior,
        Self::Inferior,
    ];

    /// Parse a single orientation letter.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'R' => Some(Self::Right),
            'L' => Some(Self::Left),
            'A' => Some(Self::Anterior),
            'P' => Some(Self::Posterior),
            'S' => Some(Self::Superior),
            'I' => Some(Self::Inferior),
            _ => None,
        }
    }

    /// The orientation letter for this direction.
    pub fn letter(&self) -> char {
        match self {
            Self::Right => 'R',
            Self::Left => 'L',
            Self::Anterior => 'A',
            Self::Posterior => 'P',
            Self::Superior => 'S',
            Self::Inferior => 'I',
        }
    }

    /// The opposite direction along the same anatomical axis.
    pub fn flipped(&self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Left => Self::Right,
            Self::Anterior => Self::Posterior,
            Self::Posterior => Self::Anterior,
            Self::Superior => Self::Inferior,
            Self::Inferior => Self::Superior,
        }
    }

    /// Index of the canonical anatomical axis: 0 for R/L, 1 for A/P, 2 for S/I.
    pub fn canonical_axis(&self) -> usize {
        match self {
            Self::Right | Self::Left => 0,
            Self::Anterior | Self::Posterior => 1,
            Self::Superior | Self::Inferior => 2,
        }
    }

    /// Sign along the canonical axis: +1 for R, A, S and −1 for L, P, I.
    pub fn sign(&self) -> f64 {
        match self {
            Self::Right | Self::Anterior | Self::Superior => 1.0,
            _ => -1.0,
        }
    }

    /// Unit vector in the canonical RAS world basis.
    pub fn unit_vector(&self) -> Vector3 {
        let mut v = Vector3::zeros();
        v[self.canonical_axis()] = self.sign();
        v
    }
}

/// An anatomical orientation convention: one signed anatomical direction per
/// array axis.
///
/// Constructed only through validating constructors, so every value is a
/// member of the closed set of 48 codes in which no two array axes alias the
/// same anatomical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnatomicalOrientation {
    axes: [AxisDirection; 3],
}

impl AnatomicalOrientation {
    /// Right / Anterior / Superior — the canonical world convention.
    pub const RAS: Self = Self {
        axes: [AxisDirection::Right, AxisDirection::Anterior, AxisDirection::Superior],
    };

    /// Left / Posterior / Superior — the DICOM patient convention.
    pub const LPS: Self = Self {
        axes: [AxisDirection::Left, AxisDirection::Posterior, AxisDirection::Superior],
    };

    /// Posterior / Inferior / Right — common for serial-section atlases.
    pub const PIR: Self = Self {
        axes: [AxisDirection::Posterior, AxisDirection::Inferior, AxisDirection::Right],
    };

    /// Anterior / Superior / Right.
    pub const ASR: Self = Self {
        axes: [AxisDirection::Anterior, AxisDirection::Superior, AxisDirection::Right],
    };

    /// Create an orientation from per-axis directions.
    ///
    /// Fails with a configuration error if two array axes alias the same
    /// anatomical axis.
    pub fn new(axes: [AxisDirection; 3]) -> Result<Self> {
        let mut seen = [false; 3];
        for dir in &axes {
            let canonical = dir.canonical_axis();
            if seen[canonical] {
                return Err(AtlasError::configuration(format!(
                    "orientation {}{}{} aliases an anatomical axis",
                    axes[0].letter(),
                    axes[1].letter(),
                    axes[2].letter()
                )));
            }
            seen[canonical] = true;
        }
        Ok(Self { axes })
    }

    /// Parse a three-letter orientation code such as "RAS" or "PIR".
    pub fn from_code(code: &str) -> Result<Self> {
        let letters: Vec<char> = code.chars().collect();
        if letters.len() != 3 {
            return Err(AtlasError::configuration(format!(
                "orientation code '{code}' must have exactly 3 letters, got {}",
                letters.len()
            )));
        }
        let mut axes = [AxisDirection::Right; 3];
        for (i, letter) in letters.iter().enumerate() {
            axes[i] = AxisDirection::from_letter(*letter).ok_or_else(|| {
                AtlasError::configuration(format!(
                    "unrecognized orientation letter '{letter}' in code '{code}'"
                ))
            })?;
        }
        Self::new(axes)
    }

    /// The three-letter code for this orientation.
    pub fn code(&self) -> String {
        self.axes.iter().map(|a| a.letter()).collect()
    }

    /// Per-axis anatomical directions.
    pub fn axes(&self) -> &[AxisDirection; 3] {
        &self.axes
    }

    /// Basis matrix: column i is the canonical-world unit vector of array
    /// axis i. Always an orthonormal signed permutation.
    pub fn basis(&self) -> Direction3 {
        Direction3::from_columns(&[
            self.axes[0].unit_vector(),
            self.axes[1].unit_vector(),
            self.axes[2].unit_vector(),
        ])
    }

    /// The signed permutation carrying this orientation's axis basis onto
    /// `target`'s. Composing `a.rotation_to(b)` with `b.rotation_to(a)`
    /// yields the identity exactly.
    pub fn rotation_to(&self, target: &Self) -> Direction3 {
        target.basis().transpose() * self.basis()
    }

    /// For each target array axis, the source array axis covering the same
    /// anatomical axis and whether the direction is flipped.
    pub fn axis_mapping_to(&self, target: &Self) -> [(usize, bool); 3] {
        let mut mapping = [(0usize, false); 3];
        for (j, target_dir) in target.axes.iter().enumerate() {
            for (i, source_dir) in self.axes.iter().enumerate() {
                if source_dir.canonical_axis() == target_dir.canonical_axis() {
                    mapping[j] = (i, source_dir.sign() != target_dir.sign());
                }
            }
        }
        mapping
    }

    /// Enumerate the full closed set of 48 valid orientations.
    pub fn all() -> Vec<Self> {
        let mut out = Vec::with_capacity(48);
        for a in AxisDirection::ALL {
            for b in AxisDirection::ALL {
                for c in AxisDirection::ALL {
                    if let Ok(orientation) = Self::new([a, b, c]) {
                        out.push(orientation);
                    }
                }
            }
        }
        out
    }
}

impl FromStr for AnatomicalOrientation {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_code(s)
    }
}

impl fmt::Display for AnatomicalOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

/// Reconcile per-axis physical spacing with a pair of orientation
/// conventions, producing the index-to-physical geometry of the data as seen
/// from the target convention.
///
/// The direction matrix is the exact signed permutation rotating the source
/// axis basis onto the target basis; the spacing is the supplied per-axis
/// spacing re-expressed in target axis order. Both failure cases
/// (unrecognized code upstream, axis-count mismatch here) surface before any
/// expensive work.
///
/// # Arguments
/// * `spacing` - Physical spacing per source array axis; must have 3 entries
/// * `source` - Orientation convention of the source data
/// * `target` - Desired orientation convention
/// * `origin` - Physical coordinate of the first voxel in the target frame
pub fn resolve(
    spacing: &[f64],
    source: &AnatomicalOrientation,
    target: &AnatomicalOrientation,
    origin: Point3,
) -> Result<ImageGeometry> {
    if spacing.len() != 3 {
        return Err(AtlasError::configuration(format!(
            "expected 3 spacing entries, got {}",
            spacing.len()
        )));
    }
    let mapping = source.axis_mapping_to(target);
    let mut reordered = Spacing3::zeros();
    for (j, (i, _flip)) in mapping.iter().enumerate() {
        reordered[j] = spacing[*i];
    }
    ImageGeometry::new(origin, reordered, source.rotation_to(target))
}
