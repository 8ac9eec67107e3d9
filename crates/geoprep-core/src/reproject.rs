//! Reprojection of GeoJSON geometries between reference systems.
//!
//! Each position goes through the same [`CoordinateTransform`], in (x, y)
//! order. Ordinates after the first two (such as Z) are carried over
//! untouched. Features are transformed independently and keep their order.

use std::path::Path;

use geojson::{Geometry, Position, Value};
use log::info;

use crate::crs::{CoordinateTransform, transformer_for};
use crate::document::{GeoDocument, OutputStyle, position_count, read_document, write_document};
use crate::error::{FormatError, Result, invalid_option};
use crate::types::ReprojectStats;

/// Source system assumed when none is given (British National Grid).
pub const DEFAULT_SOURCE_CRS: &str = "EPSG:27700";

/// Target system assumed when none is given (WGS 84).
pub const DEFAULT_TARGET_CRS: &str = "EPSG:4326";

/// Options controlling [`reproject_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReprojectOptions {
    /// Source CRS identifier, e.g. `"EPSG:27700"`.
    pub from: String,
    /// Target CRS identifier, e.g. `"EPSG:4326"`.
    pub to: String,
}

impl Default for ReprojectOptions {
    fn default() -> Self {
        Self {
            from: DEFAULT_SOURCE_CRS.to_string(),
            to: DEFAULT_TARGET_CRS.to_string(),
        }
    }
}

impl ReprojectOptions {
    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    #[must_use]
    pub fn with_to(mut self, to: impl Into<String>) -> Self {
        self.to = to.into();
        self
    }

    /// # Errors
    ///
    /// Returns a [`crate::error::ConfigError`] for an empty identifier.
    pub fn validate(&self) -> Result<()> {
        if self.from.trim().is_empty() {
            return Err(invalid_option("source CRS", "must not be empty").into());
        }
        if self.to.trim().is_empty() {
            return Err(invalid_option("target CRS", "must not be empty").into());
        }
        Ok(())
    }
}

/// Transform every position of `geometry`.
///
/// The geometry's `bbox` is dropped; its foreign members are kept.
///
/// # Errors
///
/// Returns [`FormatError::InvalidGeometry`] for a position with fewer than
/// two ordinates, or the first [`crate::error::CrsError`] raised by
/// `transformer`.
pub fn reproject_geometry(
    geometry: &Geometry,
    transformer: &dyn CoordinateTransform,
) -> Result<Geometry> {
    reproject_in_feature(geometry, None, transformer)
}

fn reproject_in_feature(
    geometry: &Geometry,
    feature: Option<usize>,
    transformer: &dyn CoordinateTransform,
) -> Result<Geometry> {
    let project = |position: &Position| reproject_position(position, feature, transformer);
    let project_all = |positions: &[Position]| -> Result<Vec<Position>> {
        positions.iter().map(project).collect()
    };
    let project_rings = |rings: &[Vec<Position>]| -> Result<Vec<Vec<Position>>> {
        rings.iter().map(|ring| project_all(ring)).collect()
    };

    let value = match &geometry.value {
        Value::Point(position) => Value::Point(project(position)?),
        Value::MultiPoint(positions) => Value::MultiPoint(project_all(positions)?),
        Value::LineString(positions) => Value::LineString(project_all(positions)?),
        Value::MultiLineString(lines) => Value::MultiLineString(project_rings(lines)?),
        Value::Polygon(rings) => Value::Polygon(project_rings(rings)?),
        Value::MultiPolygon(polygons) => Value::MultiPolygon(
            polygons
                .iter()
                .map(|rings| project_rings(rings))
                .collect::<Result<_>>()?,
        ),
        Value::GeometryCollection(geometries) => Value::GeometryCollection(
            geometries
                .iter()
                .map(|g| reproject_in_feature(g, feature, transformer))
                .collect::<Result<_>>()?,
        ),
    };

    Ok(Geometry {
        bbox: None,
        value,
        foreign_members: geometry.foreign_members.clone(),
    })
}

fn reproject_position(
    position: &[f64],
    feature: Option<usize>,
    transformer: &dyn CoordinateTransform,
) -> Result<Position> {
    let [x, y, rest @ ..] = position else {
        return Err(FormatError::InvalidGeometry {
            message: format!("position has {} ordinate(s), expected at least 2", position.len()),
            feature,
        }
        .into());
    };
    let (tx, ty) = transformer.transform(*x, *y)?;
    let mut projected = Vec::with_capacity(position.len());
    projected.extend([tx, ty]);
    projected.extend_from_slice(rest);
    Ok(projected)
}

/// Reproject every geometry of `document` in place.
///
/// A feature's `bbox` is removed because it would still describe the
/// source system. Features without geometry are left as they are.
///
/// # Errors
///
/// Returns an error if a position is malformed or cannot be transformed.
pub fn reproject_document(
    document: &mut GeoDocument,
    transformer: &dyn CoordinateTransform,
) -> Result<ReprojectStats> {
    let mut stats = ReprojectStats::default();

    match document {
        GeoDocument::FeatureCollection(collection) => {
            collection.bbox = None;
            for (index, feature) in collection.features.iter_mut().enumerate() {
                if let Some(geometry) = &feature.geometry {
                    feature.geometry =
                        Some(reproject_counted(geometry, Some(index), transformer, &mut stats)?);
                    feature.bbox = None;
                }
                stats.features += 1;
            }
        },
        GeoDocument::Feature(feature) => {
            if let Some(geometry) = &feature.geometry {
                feature.geometry = Some(reproject_counted(geometry, None, transformer, &mut stats)?);
                feature.bbox = None;
            }
            stats.features = 1;
        },
        GeoDocument::Geometry(geometry) => {
            *geometry = reproject_counted(geometry, None, transformer, &mut stats)?;
        },
    }

    Ok(stats)
}

fn reproject_counted(
    geometry: &Geometry,
    feature: Option<usize>,
    transformer: &dyn CoordinateTransform,
    stats: &mut ReprojectStats,
) -> Result<Geometry> {
    let reprojected = reproject_in_feature(geometry, feature, transformer)?;
    stats.geometries += 1;
    stats.coordinates += position_count(&geometry.value);
    Ok(reprojected)
}

/// Read `input`, reproject it and write compact JSON to `output`.
///
/// # Errors
///
/// Returns an error if the CRS pair is unsupported or reading, transforming
/// or writing fails. Nothing is written when an earlier step fails.
pub fn reproject_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &ReprojectOptions,
) -> Result<ReprojectStats> {
    let (input, output) = (input.as_ref(), output.as_ref());
    options.validate()?;
    let transformer = transformer_for(&options.from, &options.to)?;
    info!(
        "Reprojecting {} -> {} ({} -> {})",
        input.display(),
        output.display(),
        options.from,
        options.to
    );

    let mut document = read_document(input)?;
    let stats = reproject_document(&mut document, transformer.as_ref())?;
    write_document(output, &document, OutputStyle::Compact)?;

    info!(
        "Reprojected {} coordinates in {} features",
        stats.coordinates, stats.features
    );
    Ok(stats)
}
