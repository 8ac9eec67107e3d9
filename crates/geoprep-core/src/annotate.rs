//! Feature annotation: sequential ids and a random display color.
//!
//! Every feature of a collection gets `id = start_id + index` (1-based by
//! default, in file order) and a color property picked uniformly, with
//! replacement, from a palette. Existing ids are overwritten, so annotating
//! an already annotated file yields the same ids again.
//!
//! # Examples
//!
//! ```
//! use geoprep_core::annotate::{AnnotateOptions, annotate_document};
//! use geoprep_core::document::GeoDocument;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut document: GeoDocument = r#"{"type":"FeatureCollection","features":[
//!     {"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{}}
//! ]}"#.parse()?;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let stats = annotate_document(&mut document, &AnnotateOptions::default(), &mut rng)?;
//! assert_eq!(stats.features, 1);
//! # Ok::<(), geoprep_core::error::GeoPrepError>(())
//! ```

use std::path::Path;

use geojson::feature::Id;
use geojson::{FeatureCollection, JsonObject, JsonValue};
use log::{debug, info};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::document::{GeoDocument, OutputStyle, read_document, write_document};
use crate::error::{FormatError, Result, invalid_option};
use crate::types::AnnotateStats;

/// Colors assigned to features unless another palette is configured.
pub const DEFAULT_PALETTE: [&str; 3] = ["#5D61B6", "#353EA4", "#202562"];

/// Property that receives the color.
pub const DEFAULT_COLOR_PROPERTY: &str = "susycolor";

/// Options controlling [`annotate_collection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotateOptions {
    /// Colors to sample from; must not be empty.
    pub palette: Vec<String>,
    /// Name of the property that receives the color.
    pub color_property: String,
    /// Id of the first feature.
    pub start_id: u64,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.iter().map(ToString::to_string).collect(),
            color_property: DEFAULT_COLOR_PROPERTY.to_string(),
            start_id: 1,
        }
    }
}

impl AnnotateOptions {
    #[must_use]
    pub fn with_palette<I, S>(mut self, palette: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.palette = palette.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_color_property(mut self, name: impl Into<String>) -> Self {
        self.color_property = name.into();
        self
    }

    #[must_use]
    pub fn with_start_id(mut self, start_id: u64) -> Self {
        self.start_id = start_id;
        self
    }

    /// Check the options before any file is touched.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::ConfigError`] for an empty palette or an
    /// empty property name.
    pub fn validate(&self) -> Result<()> {
        if self.palette.is_empty() {
            return Err(invalid_option("palette", "at least one color is required").into());
        }
        if self.color_property.is_empty() {
            return Err(invalid_option("color property", "name must not be empty").into());
        }
        Ok(())
    }
}

/// Assign ids and colors to every feature of `collection`, in place.
///
/// # Errors
///
/// Returns an error if the options are invalid or the ids would overflow.
pub fn annotate_collection<R: Rng + ?Sized>(
    collection: &mut FeatureCollection,
    options: &AnnotateOptions,
    rng: &mut R,
) -> Result<AnnotateStats> {
    options.validate()?;

    let mut last_id = None;
    for (index, feature) in collection.features.iter_mut().enumerate() {
        let id = u64::try_from(index)
            .ok()
            .and_then(|i| options.start_id.checked_add(i))
            .ok_or_else(|| invalid_option("start id", "feature ids overflow u64"))?;

        let color = options
            .palette
            .choose(rng)
            .ok_or_else(|| invalid_option("palette", "at least one color is required"))?;

        feature.id = Some(Id::Number(id.into()));
        feature
            .properties
            .get_or_insert_with(JsonObject::new)
            .insert(options.color_property.clone(), JsonValue::String(color.clone()));
        last_id = Some(id);
    }

    debug!("Annotated {} feature(s)", collection.features.len());
    Ok(AnnotateStats {
        features: collection.features.len(),
        last_id,
    })
}

/// Annotate a document, which must be a feature collection.
///
/// # Errors
///
/// Returns [`FormatError::NotACollection`] for a single feature or a bare
/// geometry, or any error from [`annotate_collection`].
pub fn annotate_document<R: Rng + ?Sized>(
    document: &mut GeoDocument,
    options: &AnnotateOptions,
    rng: &mut R,
) -> Result<AnnotateStats> {
    match document {
        GeoDocument::FeatureCollection(collection) => annotate_collection(collection, options, rng),
        other => Err(FormatError::NotACollection {
            found: other.kind().to_string(),
        }
        .into()),
    }
}

/// Read `input`, annotate it and write the result to `output` with
/// two-space indentation.
///
/// # Errors
///
/// Returns an error if reading, annotating or writing fails. Nothing is
/// written when an earlier step fails.
pub fn annotate_file<R: Rng + ?Sized>(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &AnnotateOptions,
    rng: &mut R,
) -> Result<AnnotateStats> {
    let (input, output) = (input.as_ref(), output.as_ref());
    options.validate()?;
    info!("Annotating {} -> {}", input.display(), output.display());

    let mut document = read_document(input)?;
    let stats = annotate_document(&mut document, options, rng)?;
    write_document(output, &document, OutputStyle::Pretty)?;

    info!("Annotated {} feature(s)", stats.features);
    Ok(stats)
}
