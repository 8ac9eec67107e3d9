//! GeoJSON documents as read from and written to disk.
//!
//! A [`GeoDocument`] is resolved by which members the top-level object
//! carries rather than by its `type`: `features` means a collection,
//! otherwise `geometry` means a single feature, and anything else is read
//! as a bare geometry.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use log::debug;
use tempfile::NamedTempFile;

use crate::error::{FormatError, GeoPrepError, IoError, IoErrorExt, Result};

const FORMAT: &str = "GeoJSON";

/// A parsed GeoJSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoDocument {
    /// A top-level object with a `features` member.
    FeatureCollection(FeatureCollection),
    /// A top-level object with a `geometry` member but no `features`.
    Feature(Feature),
    /// Anything else, read as a geometry object.
    Geometry(Geometry),
}

/// Which variant a [`GeoDocument`] is, for logging and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    FeatureCollection,
    Feature,
    Geometry,
}

impl DocumentKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::FeatureCollection => "FeatureCollection",
            DocumentKind::Feature => "Feature",
            DocumentKind::Geometry => "Geometry",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON layout of a written document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    /// No insignificant whitespace.
    #[default]
    Compact,
    /// Two-space indentation.
    Pretty,
}

impl GeoDocument {
    /// Resolve a top-level JSON object into a document.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Parse`] when the object is not valid GeoJSON
    /// for the variant its members select.
    pub fn from_json_object(object: JsonObject) -> Result<Self> {
        let document = if object.contains_key("features") {
            FeatureCollection::try_from(object).map(GeoDocument::FeatureCollection)
        } else if object.contains_key("geometry") {
            Feature::try_from(object).map(GeoDocument::Feature)
        } else {
            Geometry::try_from(object).map(GeoDocument::Geometry)
        };
        document.map_err(|e| parse_error(&e))
    }

    /// Resolve an arbitrary JSON value, which must be an object.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Parse`] for non-object values.
    pub fn from_json_value(value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Object(object) => Self::from_json_object(object),
            other => Err(FormatError::Parse {
                message: format!("top-level value is {}, expected an object", describe(&other)),
            }
            .into()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> DocumentKind {
        match self {
            GeoDocument::FeatureCollection(_) => DocumentKind::FeatureCollection,
            GeoDocument::Feature(_) => DocumentKind::Feature,
            GeoDocument::Geometry(_) => DocumentKind::Geometry,
        }
    }

    /// Number of features; a single feature counts as one, a bare geometry as zero.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        match self {
            GeoDocument::FeatureCollection(collection) => collection.features.len(),
            GeoDocument::Feature(_) => 1,
            GeoDocument::Geometry(_) => 0,
        }
    }

    /// Serialize the document to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying writer fails.
    pub fn write_json<W: Write>(&self, writer: W, style: OutputStyle) -> serde_json::Result<()> {
        match (self, style) {
            (GeoDocument::FeatureCollection(c), OutputStyle::Compact) => {
                serde_json::to_writer(writer, c)
            },
            (GeoDocument::FeatureCollection(c), OutputStyle::Pretty) => {
                serde_json::to_writer_pretty(writer, c)
            },
            (GeoDocument::Feature(f), OutputStyle::Compact) => serde_json::to_writer(writer, f),
            (GeoDocument::Feature(f), OutputStyle::Pretty) => {
                serde_json::to_writer_pretty(writer, f)
            },
            (GeoDocument::Geometry(g), OutputStyle::Compact) => serde_json::to_writer(writer, g),
            (GeoDocument::Geometry(g), OutputStyle::Pretty) => {
                serde_json::to_writer_pretty(writer, g)
            },
        }
    }

    /// Serialize the document into a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_string(&self, style: OutputStyle) -> serde_json::Result<String> {
        let mut buffer = Vec::new();
        self.write_json(&mut buffer, style)?;
        // serde_json only emits UTF-8
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl FromStr for GeoDocument {
    type Err = GeoPrepError;

    fn from_str(s: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(s).map_err(|e| parse_error(&e))?;
        Self::from_json_value(value)
    }
}

/// Read and parse the document at `path`.
///
/// # Errors
///
/// Returns an [`IoError`] if the file cannot be read, or a
/// [`FormatError::Parse`] if it is not GeoJSON.
pub fn read_document(path: impl AsRef<Path>) -> Result<GeoDocument> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).with_read_context(FORMAT, path)?;
    let document = text.parse::<GeoDocument>()?;
    debug!(
        "Read {} with {} feature(s) from {}",
        document.kind(),
        document.feature_count(),
        path.display()
    );
    Ok(document)
}

/// Write `document` to `path`.
///
/// The JSON is written to a temporary file next to `path` and renamed into
/// place, so `path` is either fully written or left untouched.
///
/// # Errors
///
/// Returns an [`IoError`] if the destination directory is unusable or any
/// write fails.
pub fn write_document(
    path: impl AsRef<Path>,
    document: &GeoDocument,
    style: OutputStyle,
) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if path.file_name().is_none() {
        return Err(IoError::InvalidPath {
            path: path.to_path_buf(),
            reason: "output path has no file name".to_string(),
        }
        .into());
    }

    let mut file = NamedTempFile::new_in(dir).with_write_context(FORMAT, path)?;
    {
        let mut writer = std::io::BufWriter::new(file.as_file_mut());
        document
            .write_json(&mut writer, style)
            .map_err(std::io::Error::from)
            .with_write_context(FORMAT, path)?;
        writer.flush().with_write_context(FORMAT, path)?;
    }
    file.persist(path)
        .map_err(|e| e.error)
        .with_write_context(FORMAT, path)?;

    debug!("Wrote {} to {}", document.kind(), path.display());
    Ok(())
}

/// Convert a GeoJSON geometry into its `geo` form for processing.
///
/// # Errors
///
/// Returns [`FormatError::InvalidGeometry`] if the geometry cannot be represented.
pub fn to_planar(geometry: Geometry, feature: Option<usize>) -> Result<geo_types::Geometry<f64>> {
    geo_types::Geometry::<f64>::try_from(geometry).map_err(|e| {
        FormatError::InvalidGeometry {
            message: e.to_string(),
            feature,
        }
        .into()
    })
}

/// Convert a processed `geo` geometry back into GeoJSON.
#[must_use]
pub fn from_planar(geometry: &geo_types::Geometry<f64>) -> Geometry {
    Geometry::new(geojson::Value::from(geometry))
}

/// Number of positions in a geometry value, counting nested collections.
#[must_use]
pub fn position_count(value: &Value) -> usize {
    match value {
        Value::Point(_) => 1,
        Value::MultiPoint(positions) | Value::LineString(positions) => positions.len(),
        Value::MultiLineString(lines) | Value::Polygon(lines) => lines.iter().map(Vec::len).sum(),
        Value::MultiPolygon(polygons) => polygons.iter().flatten().map(Vec::len).sum(),
        Value::GeometryCollection(geometries) => {
            geometries.iter().map(|g| position_count(&g.value)).sum()
        },
    }
}

fn parse_error(err: &dyn std::error::Error) -> GeoPrepError {
    FormatError::Parse {
        message: err.to_string(),
    }
    .into()
}

fn describe(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a bool",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
