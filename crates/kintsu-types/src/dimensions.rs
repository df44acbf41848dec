//! Bounding dimensions of a scanned object.

use crate::TriangleMesh;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Unit label attached to every [`Dimensions`] value.
///
/// The pipeline does not infer real-world scale from a photogrammetry
/// export, so dimensions carry a fixed generic label.
pub const DIMENSION_UNITS: &str = "cm";

/// Derived bounding dimensions: extent per axis over all vertices.
///
/// Recomputed on demand from whichever mesh it describes; never cached
/// against a stale vertex buffer.
///
/// # Example
///
/// ```
/// use kintsu_types::{unit_cube, Dimensions};
///
/// let dims = Dimensions::of(&unit_cube());
/// assert!((dims.width - 1.0).abs() < 1e-12);
/// assert!((dims.height - 1.0).abs() < 1e-12);
/// assert!((dims.depth - 1.0).abs() < 1e-12);
/// assert_eq!(dims.units, "cm");
/// ```
// The fixed unit label rules out Deserialize; metadata responses only
// ever serialize this type outward.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Dimensions {
    /// Extent along the X axis (max - min).
    pub width: f64,
    /// Extent along the Y axis (max - min).
    pub height: f64,
    /// Extent along the Z axis (max - min).
    pub depth: f64,
    /// Fixed unit label; see [`DIMENSION_UNITS`].
    pub units: &'static str,
}

impl Dimensions {
    /// All-zero dimensions.
    ///
    /// The defined result for a mesh with no vertices. Not an error.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            depth: 0.0,
            units: DIMENSION_UNITS,
        }
    }

    /// Compute the dimensions of a mesh from its bounding box.
    ///
    /// An empty vertex sequence yields [`Dimensions::zero`] rather than
    /// failing. Purely functional and safe to call concurrently on
    /// read-only mesh data.
    #[must_use]
    pub fn of(mesh: &TriangleMesh) -> Self {
        let bounds = mesh.bounds();
        if bounds.is_empty() {
            return Self::zero();
        }

        let size = bounds.size();
        Self {
            width: size.x,
            height: size.y,
            depth: size.z,
            units: DIMENSION_UNITS,
        }
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.2} x {:.2} x {:.2} {}",
            self.width, self.height, self.depth, self.units
        )
    }
}
