//! Coordinate reference systems and coordinate transformers.
//!
//! The built-in backend covers the systems listed by [`supported_crs`].
//! With the `proj-transforms` feature, [`transformer_for`] delegates to
//! PROJ instead and accepts any CRS string PROJ understands.
//!
//! Coordinates are always handled in (x, y) order: easting/northing for
//! projected systems and longitude/latitude for geographic ones, whatever
//! the authority's axis order.
//!
//! # Examples
//!
//! ```
//! use geoprep_core::crs::{Crs, find_crs, supported_crs};
//!
//! assert_eq!(find_crs("EPSG:27700"), Some(Crs::BritishNationalGrid));
//! assert_eq!(find_crs("epsg:32630"), Some(Crs::Utm { zone: 30, north: true }));
//! assert!(find_crs("EPSG:2154").is_none());
//!
//! for definition in supported_crs() {
//!     println!("{}: {}", definition.code, definition.name);
//! }
//! ```

mod builtin;
#[cfg(feature = "proj-transforms")]
mod proj_backend;

use std::fmt;
use std::str::FromStr;

use log::info;

pub use builtin::BuiltinTransformer;
#[cfg(feature = "proj-transforms")]
pub use proj_backend::ProjTransformer;

use crate::error::{CrsError, Result};

/// A reference system the built-in backend can transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crs {
    /// EPSG:4326, WGS 84 longitude/latitude in degrees.
    Wgs84,
    /// EPSG:3857, WGS 84 / Pseudo-Mercator.
    WebMercator,
    /// EPSG:27700, OSGB36 / British National Grid.
    BritishNationalGrid,
    /// EPSG:326xx (north) and EPSG:327xx (south), WGS 84 / UTM.
    Utm {
        /// Zone number, 1 to 60
        zone: u8,
        /// Northern hemisphere
        north: bool,
    },
}

impl Crs {
    /// Look up a built-in system by EPSG code.
    #[must_use]
    pub fn from_epsg(code: u32) -> Option<Crs> {
        match code {
            4326 => Some(Crs::Wgs84),
            3857 => Some(Crs::WebMercator),
            27700 => Some(Crs::BritishNationalGrid),
            32601..=32660 => Some(Crs::Utm {
                zone: u8::try_from(code - 32600).ok()?,
                north: true,
            }),
            32701..=32760 => Some(Crs::Utm {
                zone: u8::try_from(code - 32700).ok()?,
                north: false,
            }),
            _ => None,
        }
    }

    #[must_use]
    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::WebMercator => 3857,
            Crs::BritishNationalGrid => 27700,
            Crs::Utm { zone, north: true } => 32600 + u32::from(*zone),
            Crs::Utm { zone, north: false } => 32700 + u32::from(*zone),
        }
    }

    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Crs::Wgs84 => "WGS 84".to_string(),
            Crs::WebMercator => "WGS 84 / Pseudo-Mercator".to_string(),
            Crs::BritishNationalGrid => "OSGB36 / British National Grid".to_string(),
            Crs::Utm { zone, north } => {
                format!("WGS 84 / UTM zone {zone}{}", if *north { 'N' } else { 'S' })
            },
        }
    }

}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

impl FromStr for Crs {
    type Err = CrsError;

    /// Parse `"EPSG:<code>"` (any case) or a bare code.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let code = match trimmed.split_once(':') {
            Some((authority, code)) if authority.eq_ignore_ascii_case("EPSG") => code,
            Some(_) => "",
            None => trimmed,
        };
        code.trim()
            .parse::<u32>()
            .ok()
            .and_then(Crs::from_epsg)
            .ok_or_else(|| CrsError::Unsupported { crs: s.to_string() })
    }
}

/// Registry entry describing a built-in reference system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrsDefinition {
    /// EPSG identifier or range (e.g., `"EPSG:27700"`).
    pub code: &'static str,
    /// Descriptive name.
    pub name: &'static str,
    /// Projection method.
    pub method: &'static str,
    /// Area of use.
    pub area: &'static str,
}

const REGISTRY: &[CrsDefinition] = &[
    CrsDefinition {
        code: "EPSG:4326",
        name: "WGS 84",
        method: "Geographic 2D",
        area: "World",
    },
    CrsDefinition {
        code: "EPSG:3857",
        name: "WGS 84 / Pseudo-Mercator",
        method: "Popular Visualisation Pseudo Mercator",
        area: "World between 85.06°S and 85.06°N",
    },
    CrsDefinition {
        code: "EPSG:27700",
        name: "OSGB36 / British National Grid",
        method: "Transverse Mercator + Helmert to WGS 84",
        area: "United Kingdom",
    },
    CrsDefinition {
        code: "EPSG:32601-32660",
        name: "WGS 84 / UTM zones 1N-60N",
        method: "Transverse Mercator",
        area: "Northern hemisphere",
    },
    CrsDefinition {
        code: "EPSG:32701-32760",
        name: "WGS 84 / UTM zones 1S-60S",
        method: "Transverse Mercator",
        area: "Southern hemisphere",
    },
];

/// All reference systems known to the built-in backend.
#[must_use]
pub fn supported_crs() -> &'static [CrsDefinition] {
    REGISTRY
}

/// Find a built-in reference system by identifier.
#[must_use]
pub fn find_crs(id: &str) -> Option<Crs> {
    id.parse().ok()
}

/// A forward coordinate transformation in (x, y) order.
pub trait CoordinateTransform {
    /// Transform one coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`CrsError::Transform`] if the coordinate has no valid image.
    fn transform(&self, x: f64, y: f64) -> std::result::Result<(f64, f64), CrsError>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Create the transformer used for `from` → `to`.
///
/// # Errors
///
/// Returns [`CrsError::Unsupported`] if the built-in backend does not know
/// either system, or [`CrsError::Init`] if PROJ rejects the pair.
pub fn transformer_for(from: &str, to: &str) -> Result<Box<dyn CoordinateTransform>> {
    #[cfg(feature = "proj-transforms")]
    {
        let transformer = ProjTransformer::new(from, to)?;
        info!("Using PROJ transformer {}", transformer.describe());
        Ok(Box::new(transformer))
    }

    #[cfg(not(feature = "proj-transforms"))]
    {
        let transformer = BuiltinTransformer::new(from.parse()?, to.parse()?);
        info!("Using transformer {}", transformer.describe());
        Ok(Box::new(transformer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identifiers() {
        assert_eq!("EPSG:4326".parse::<Crs>().unwrap(), Crs::Wgs84);
        assert_eq!("epsg:3857".parse::<Crs>().unwrap(), Crs::WebMercator);
        assert_eq!(" 27700 ".parse::<Crs>().unwrap(), Crs::BritishNationalGrid);
        assert_eq!(
            "EPSG: 32760".parse::<Crs>().unwrap(),
            Crs::Utm {
                zone: 60,
                north: false
            }
        );
    }

    #[test]
    fn test_reject_unknown_identifiers() {
        for id in ["EPSG:32661", "EPSG:32700", "ESRI:102100", "EPSG:", "wgs84", ""] {
            let err = id.parse::<Crs>().unwrap_err();
            assert!(
                matches!(err, CrsError::Unsupported { ref crs } if crs == id),
                "{id} was accepted"
            );
        }
    }

    #[test]
    fn test_display_round_trip() {
        for code in [4326, 3857, 27700, 32601, 32631, 32660, 32701, 32760] {
            let crs = Crs::from_epsg(code).unwrap();
            assert_eq!(crs.epsg(), code);
            assert_eq!(crs.to_string().parse::<Crs>().unwrap(), crs);
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(Crs::BritishNationalGrid.name(), "OSGB36 / British National Grid");
        assert_eq!(
            Crs::Utm {
                zone: 31,
                north: true
            }
            .name(),
            "WGS 84 / UTM zone 31N"
        );
    }

    #[test]
    fn test_registry_codes_parse() {
        for definition in supported_crs() {
            let first = definition.code.split('-').next().unwrap();
            assert!(find_crs(first).is_some(), "{} does not parse", definition.code);
        }
    }

    #[test]
    fn test_national_grid_to_wgs84() {
        let transformer = BuiltinTransformer::new(Crs::BritishNationalGrid, Crs::Wgs84);

        // Trafalgar Square
        let (lon, lat) = transformer.transform(530_050.137, 180_358.386).unwrap();
        assert!((lon + 0.1275).abs() < 1e-5, "lon {lon}");
        assert!((lat - 51.5072).abs() < 1e-5, "lat {lat}");

        let (lon, lat) = transformer.transform(532_383.0, 181_904.0).unwrap();
        assert!((lon + 0.093_33).abs() < 1e-4, "lon {lon}");
        assert!((lat - 51.520_55).abs() < 1e-4, "lat {lat}");
    }

    #[test]
    fn test_national_grid_round_trip() {
        let forward = BuiltinTransformer::new(Crs::BritishNationalGrid, Crs::Wgs84);
        let back = forward.inverse();
        for (x, y) in [(532_383.0, 181_904.0), (358_000.0, 172_000.0), (651_409.9, 313_177.3)] {
            let (lon, lat) = forward.transform(x, y).unwrap();
            let (rx, ry) = back.transform(lon, lat).unwrap();
            assert!((rx - x).abs() < 0.01, "x {x} -> {rx}");
            assert!((ry - y).abs() < 0.01, "y {y} -> {ry}");
        }
    }

    #[test]
    fn test_utm_via_national_grid() {
        let transformer = BuiltinTransformer::new(Crs::BritishNationalGrid, Crs::Utm {
            zone: 30,
            north: true,
        });
        let (x, y) = transformer.transform(358_000.0, 172_000.0).unwrap();
        let (rx, ry) = transformer.inverse().transform(x, y).unwrap();
        assert!((rx - 358_000.0).abs() < 0.01);
        assert!((ry - 172_000.0).abs() < 0.01);
    }

    #[test]
    #[cfg(not(feature = "proj-transforms"))]
    fn test_unsupported_pair() {
        let err = transformer_for("EPSG:27700", "EPSG:2154").err().unwrap();
        assert!(err.to_string().contains("EPSG:2154"));
    }
}
