//! `geoprep-core` is the core library for the `GeoPrep` project, a small toolkit that prepares
//! GeoJSON files for web maps.
//!
//! This crate includes:
//! - **Documents**: Reading and atomically writing GeoJSON feature collections, features and geometries.
//! - **Annotation**: Sequential feature ids and a random colour property drawn from a palette.
//! - **Simplification**: Topology-preserving Douglas-Peucker simplification with progress reporting.
//! - **Reprojection**: Coordinate transforms between reference systems, with a built-in backend
//!   for British National Grid, WGS 84, Web Mercator and UTM, or PROJ behind the
//!   `proj-transforms` feature.
//!
//! Errors from every module use the [`error::GeoPrepError`] taxonomy.

pub mod annotate;
pub mod crs;
pub mod document;
pub mod error;
pub mod progress;
pub mod reproject;
pub mod simplify;
pub mod types;
