//! Custom error types for `GeoPrep` operations.
//!
//! Errors are grouped by the layer that raises them: file I/O, GeoJSON
//! decoding, coordinate reference systems and option validation. The root
//! [`GeoPrepError`] delegates its display to the variant it wraps.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for `GeoPrep` operations.
#[derive(Debug, Error)]
pub enum GeoPrepError {
    /// I/O errors (file read/write, path issues, permissions)
    #[error(transparent)]
    Io(#[from] IoError),

    /// GeoJSON parsing and geometry conversion errors
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Coordinate reference system errors
    #[error(transparent)]
    Crs(#[from] CrsError),

    /// Option validation errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// I/O related errors.
///
/// These errors occur while reading the input document or persisting the
/// output document.
#[derive(Debug, Error)]
pub enum IoError {
    /// Failed to read from a file
    #[error("Failed to read {format} file '{path}': {source}")]
    Read {
        /// The format being read (e.g., "`GeoJSON`")
        format: String,
        /// The file path
        path: PathBuf,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to write to a file
    #[error("Failed to write {format} file '{path}': {source}")]
    Write {
        /// The format being written
        format: String,
        /// The file path
        path: PathBuf,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Path is invalid
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath {
        /// The invalid path
        path: PathBuf,
        /// Why the path is invalid
        reason: String,
    },

    /// File was not found
    #[error("File not found: '{path}'")]
    FileNotFound {
        /// The missing file path
        path: PathBuf,
    },

    /// Permission was denied
    #[error("Permission denied for '{path}'")]
    PermissionDenied {
        /// The path with permission issues
        path: PathBuf,
    },
}

/// GeoJSON parsing and geometry errors.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The document is not valid JSON or not valid GeoJSON
    #[error("Failed to parse GeoJSON: {message}")]
    Parse {
        /// Description of the parse error
        message: String,
    },

    /// A geometry could not be converted to or from its planar form
    #[error("Invalid geometry: {message}{}", feature.map(|i| format!(" (feature {i})")).unwrap_or_default())]
    InvalidGeometry {
        /// Description of the geometry problem
        message: String,
        /// Zero-based index of the offending feature, if any
        feature: Option<usize>,
    },

    /// The operation needs a `FeatureCollection`
    #[error("Expected a FeatureCollection, found a {found}")]
    NotACollection {
        /// The kind of document that was found instead
        found: String,
    },
}

/// Coordinate reference system errors.
#[derive(Debug, Error)]
pub enum CrsError {
    /// The CRS identifier is unknown to the active backend
    #[error("Unsupported coordinate reference system '{crs}'")]
    Unsupported {
        /// The requested identifier
        crs: String,
    },

    /// The transformer could not be created
    #[error("Failed to create transformer from {from} to {to}: {message}")]
    Init {
        /// Source CRS
        from: String,
        /// Target CRS
        to: String,
        /// Backend message
        message: String,
    },

    /// A coordinate could not be transformed
    #[error("Failed to transform coordinate ({x}, {y}): {message}")]
    Transform {
        /// Input x
        x: f64,
        /// Input y
        y: f64,
        /// Backend message
        message: String,
    },
}

/// Configuration errors.
///
/// These errors occur when options are invalid, before any file is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid option value
    #[error("Invalid {option} option: {message}")]
    InvalidOption {
        /// The option name
        option: String,
        /// Why it's invalid
        message: String,
    },
}

/// Type alias for Results using `GeoPrepError`.
pub type Result<T> = std::result::Result<T, GeoPrepError>;

impl GeoPrepError {
    /// Get a user-friendly error message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Io(e) => e.user_message(),
            Self::Format(e) => format!("GeoJSON error: {e}"),
            Self::Crs(e) => format!("Projection error: {e}"),
            Self::Config(e) => format!("Configuration error: {e}"),
        }
    }

    /// Get recovery suggestions if available.
    #[must_use]
    pub fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::Io(e) => e.recovery_suggestion(),
            Self::Format(e) => e.recovery_suggestion(),
            Self::Crs(CrsError::Unsupported { .. }) => {
                Some("Run 'geoprep crs' to see the built-in reference systems.".to_string())
            },
            _ => None,
        }
    }
}

impl IoError {
    fn user_message(&self) -> String {
        match self {
            Self::Read { format, path, .. } => {
                format!("Failed to read {} file: {}", format, path.display())
            },
            Self::Write { format, path, .. } => {
                format!("Failed to write {} file: {}", format, path.display())
            },
            Self::FileNotFound { path } => {
                format!("File not found: {}", path.display())
            },
            _ => self.to_string(),
        }
    }

    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::FileNotFound { .. } => {
                Some("Check that the file path is correct and the file exists.".to_string())
            },
            Self::PermissionDenied { .. } => {
                Some("Check file permissions and ensure you have access.".to_string())
            },
            Self::InvalidPath { .. } => {
                Some("Ensure the path is valid and properly formatted.".to_string())
            },
            _ => None,
        }
    }
}

impl FormatError {
    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::Parse { .. } => Some("Check that the file is valid GeoJSON.".to_string()),
            Self::InvalidGeometry { .. } => {
                Some("Validate geometries using a GIS tool before processing.".to_string())
            },
            Self::NotACollection { .. } => {
                Some("Wrap the input in a FeatureCollection.".to_string())
            },
        }
    }
}

/// Extension trait for adding I/O context to errors.
pub trait IoErrorExt<T> {
    /// Add read context to an error.
    ///
    /// # Errors
    ///
    /// Returns an [`IoError`] if the underlying operation fails.
    fn with_read_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T>;

    /// Add write context to an error.
    ///
    /// # Errors
    ///
    /// Returns an [`IoError`] if the underlying operation fails.
    fn with_write_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn with_read_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| {
            let path = path.into();
            GeoPrepError::Io(match e.kind() {
                std::io::ErrorKind::NotFound => IoError::FileNotFound { path },
                std::io::ErrorKind::PermissionDenied => IoError::PermissionDenied { path },
                _ => IoError::Read {
                    format: format.to_string(),
                    path,
                    source: Box::new(e),
                },
            })
        })
    }

    fn with_write_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| {
            let path = path.into();
            GeoPrepError::Io(match e.kind() {
                std::io::ErrorKind::PermissionDenied => IoError::PermissionDenied { path },
                _ => IoError::Write {
                    format: format.to_string(),
                    path,
                    source: Box::new(e),
                },
            })
        })
    }
}

/// Helper to create [`ConfigError::InvalidOption`].
#[must_use]
pub fn invalid_option(option: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidOption {
        option: option.to_string(),
        message: message.into(),
    }
}
