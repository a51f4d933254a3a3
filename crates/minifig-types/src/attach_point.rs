//! Attach point type.

use std::fmt;

/// A local-space offset at which a child part's origin may sit.
///
/// Coordinates are in LDraw units, relative to the parent part's origin.
///
/// # Examples
///
/// ```
/// use minifig_types::AttachPoint;
///
/// let wrist = AttachPoint::new(-22.0, 16.1213, 20.8787);
/// assert_eq!(wrist.to_array(), [-22.0, 16.1213, 20.8787]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttachPoint {
    /// X offset.
    pub x: f64,
    /// Y offset (LDraw Y points down).
    pub y: f64,
    /// Z offset.
    pub z: f64,
}

impl AttachPoint {
    /// Creates an attach point from its three components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns the components as `[x, y, z]`.
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Returns this point with every component multiplied by `factor`.
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

impl From<[f64; 3]> for AttachPoint {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl fmt::Display for AttachPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}
