//! Transforms delegated to the PROJ library.

use proj::Proj;

use super::CoordinateTransform;
use crate::error::CrsError;

/// Transformer backed by `proj::Proj`.
///
/// Created with [`Proj::new_known_crs`], which normalises axis order so
/// coordinates are always (x, y) / (lon, lat).
pub struct ProjTransformer {
    proj: Proj,
    from: String,
    to: String,
}

impl ProjTransformer {
    /// # Errors
    ///
    /// Returns [`CrsError::Init`] if PROJ cannot build a transformation
    /// between the two systems.
    pub fn new(from: &str, to: &str) -> Result<Self, CrsError> {
        let proj = Proj::new_known_crs(from, to, None).map_err(|e| CrsError::Init {
            from: from.to_string(),
            to: to.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            proj,
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

impl CoordinateTransform for ProjTransformer {
    fn transform(&self, x: f64, y: f64) -> Result<(f64, f64), CrsError> {
        self.proj
            .convert((x, y))
            .map_err(|e| CrsError::Transform {
                x,
                y,
                message: e.to_string(),
            })
    }

    fn describe(&self) -> String {
        format!("{} -> {} (PROJ)", self.from, self.to)
    }
}
