//! Topology-preserving geometry simplification.
//!
//! Lines and polygon rings are reduced with Ramer–Douglas–Peucker
//! ([`geo::Simplify`]) using a tolerance in the input's coordinate units.
//! A simplified part is discarded in favour of the original when it would
//! break the geometry: rings keep at least four coordinates, a part that was
//! simple before must still be simple afterwards, holes stay inside their
//! shell, and the polygons of a multipolygon stay apart.
//!
//! Geometries that simplification cannot change (points, multipoints, empty
//! geometries, or any geometry at zero tolerance) are passed through as
//! parsed, so extra ordinates such as Z survive.
//!
//! The `precision` option is carried for command-line compatibility only.
//! Coordinates are never rounded.

use std::path::Path;

use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{
    Contains, Coord, CoordsIter, Geometry, GeometryCollection, Intersects, LineString,
    MultiLineString, MultiPolygon, Point, Polygon, Simplify,
};
use log::{info, warn};

use crate::document::{
    GeoDocument, OutputStyle, from_planar, position_count, read_document, to_planar,
    write_document,
};
use crate::error::{Result, invalid_option};
use crate::progress::ProgressReporter;
use crate::types::SimplifyStats;

/// Precision assumed when none is given.
pub const DEFAULT_PRECISION: u32 = 6;

/// Options controlling [`simplify_document`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplifyOptions {
    /// Requested number of decimal places. Not applied to coordinates.
    pub precision: u32,
    /// Maximum distance a removed vertex may lie from the simplified line.
    pub tolerance: f64,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            tolerance: 0.0,
        }
    }
}

impl SimplifyOptions {
    #[must_use]
    pub fn new(precision: u32, tolerance: f64) -> Self {
        Self {
            precision,
            tolerance,
        }
    }

    #[must_use]
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// # Errors
    ///
    /// Returns a [`crate::error::ConfigError`] for a negative or non-finite tolerance.
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() {
            return Err(invalid_option("tolerance", "must be a finite number").into());
        }
        if self.tolerance < 0.0 {
            return Err(invalid_option("tolerance", "must not be negative").into());
        }
        Ok(())
    }
}

/// Simplify one geometry.
///
/// A tolerance of zero (or less) returns the geometry unchanged. Points and
/// multipoints are always returned unchanged.
#[must_use]
pub fn simplify_geometry(geometry: &Geometry<f64>, tolerance: f64) -> Geometry<f64> {
    if tolerance <= 0.0 {
        return geometry.clone();
    }
    match geometry {
        Geometry::LineString(ls) => Geometry::LineString(simplify_line(ls, tolerance)),
        Geometry::MultiLineString(mls) => Geometry::MultiLineString(MultiLineString::new(
            mls.iter().map(|ls| simplify_line(ls, tolerance)).collect(),
        )),
        Geometry::Polygon(p) => Geometry::Polygon(simplify_polygon(p, tolerance)),
        Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(simplify_multi_polygon(mp, tolerance)),
        Geometry::GeometryCollection(gc) => {
            Geometry::GeometryCollection(GeometryCollection::new_from(
                gc.iter().map(|g| simplify_geometry(g, tolerance)).collect(),
            ))
        },
        other => other.clone(),
    }
}

fn simplify_line(line: &LineString<f64>, tolerance: f64) -> LineString<f64> {
    let simplified = line.simplify(&tolerance);
    if self_intersects(&simplified) && !self_intersects(line) {
        line.clone()
    } else {
        simplified
    }
}

fn simplify_ring(ring: &LineString<f64>, tolerance: f64) -> LineString<f64> {
    let simplified = ring.simplify(&tolerance);
    if simplified.0.len() < 4 || (self_intersects(&simplified) && !self_intersects(ring)) {
        ring.clone()
    } else {
        simplified
    }
}

fn simplify_polygon(polygon: &Polygon<f64>, tolerance: f64) -> Polygon<f64> {
    // Ring 0 is the shell, the rest are holes.
    let original: Vec<&LineString<f64>> = std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .collect();
    let mut rings: Vec<LineString<f64>> =
        original.iter().map(|ring| simplify_ring(ring, tolerance)).collect();
    let mut reverted: Vec<bool> = rings
        .iter()
        .zip(&original)
        .map(|(ring, orig)| ring == *orig)
        .collect();

    loop {
        let mut conflicts = Vec::new();
        for i in 0..rings.len() {
            for j in (i + 1)..rings.len() {
                if (!reverted[i] || !reverted[j]) && rings_conflict(&rings[i], &rings[j], i == 0) {
                    conflicts.extend([i, j]);
                }
            }
        }
        if !revert(&mut rings, &mut reverted, &conflicts, |k| original[k].clone()) {
            break;
        }
    }

    let mut rings = rings.into_iter();
    let exterior = rings
        .next()
        .unwrap_or_else(|| polygon.exterior().clone());
    Polygon::new(exterior, rings.collect())
}

/// `true` if two rings of one polygon touch, or if one lies inside the other
/// when it should not. With `shell`, `a` is the exterior and `b` must be
/// inside it; otherwise both are holes and neither may contain the other.
fn rings_conflict(a: &LineString<f64>, b: &LineString<f64>, shell: bool) -> bool {
    if a.intersects(b) {
        return true;
    }
    let (Some(&a_start), Some(&b_start)) = (a.0.first(), b.0.first()) else {
        return false;
    };
    let inside = |ring: &LineString<f64>, coord: Coord<f64>| {
        Polygon::new(ring.clone(), vec![]).contains(&Point::from(coord))
    };
    if shell {
        !inside(a, b_start)
    } else {
        inside(a, b_start) || inside(b, a_start)
    }
}

fn simplify_multi_polygon(multi: &MultiPolygon<f64>, tolerance: f64) -> MultiPolygon<f64> {
    let original = &multi.0;
    let mut polygons: Vec<Polygon<f64>> = original
        .iter()
        .map(|p| simplify_polygon(p, tolerance))
        .collect();
    let mut reverted: Vec<bool> = polygons
        .iter()
        .zip(original)
        .map(|(polygon, orig)| polygon == orig)
        .collect();

    loop {
        let mut conflicts = Vec::new();
        for i in 0..polygons.len() {
            for j in (i + 1)..polygons.len() {
                if (!reverted[i] || !reverted[j]) && polygons_conflict(&polygons[i], &polygons[j]) {
                    conflicts.extend([i, j]);
                }
            }
        }
        if !revert(&mut polygons, &mut reverted, &conflicts, |k| original[k].clone()) {
            break;
        }
    }

    MultiPolygon::new(polygons)
}

/// `true` if two member polygons of a multipolygon touch or one holds the other.
fn polygons_conflict(a: &Polygon<f64>, b: &Polygon<f64>) -> bool {
    if a.exterior().intersects(b.exterior()) {
        return true;
    }
    let starts_inside = |outer: &Polygon<f64>, inner: &Polygon<f64>| {
        inner
            .exterior()
            .0
            .first()
            .is_some_and(|&c| outer.contains(&Point::from(c)))
    };
    starts_inside(a, b) || starts_inside(b, a)
}

/// Put the original part back at every conflicting index that is still
/// simplified. Returns `false` once nothing was left to revert.
fn revert<T>(
    parts: &mut [T],
    reverted: &mut [bool],
    conflicts: &[usize],
    original: impl Fn(usize) -> T,
) -> bool {
    let mut changed = false;
    for &k in conflicts {
        if !reverted[k] {
            parts[k] = original(k);
            reverted[k] = true;
            changed = true;
        }
    }
    changed
}

/// `true` if two segments of `line` touch anywhere other than their shared
/// vertex (or the closing vertex of a ring).
fn self_intersects(line: &LineString<f64>) -> bool {
    let segments: Vec<_> = line.lines().collect();
    let n = segments.len();
    let closed = line.is_closed() && n > 2;

    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (closed && i == 0 && j == n - 1);
            match line_intersection(segments[i], segments[j]) {
                None => {},
                Some(LineIntersection::Collinear { .. }) => return true,
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {},
                Some(LineIntersection::SinglePoint { .. }) => return true,
            }
        }
    }
    false
}

/// Simplify every geometry of `document` in place.
///
/// Collections report progress after each feature. A single feature or a
/// bare geometry is simplified without progress output.
///
/// # Errors
///
/// Returns an error if the options are invalid or a geometry cannot be
/// converted for processing.
pub fn simplify_document(
    document: &mut GeoDocument,
    options: &SimplifyOptions,
    progress: &mut dyn ProgressReporter,
) -> Result<SimplifyStats> {
    options.validate()?;
    let tolerance = options.tolerance;
    let mut stats = SimplifyStats::default();

    match document {
        GeoDocument::FeatureCollection(collection) => {
            let total = collection.features.len();
            for (index, feature) in collection.features.iter_mut().enumerate() {
                if let Some(geometry) = feature.geometry.take() {
                    let simplified = simplify_planar(geometry, Some(index), tolerance, &mut stats)?;
                    feature.geometry = Some(simplified);
                }
                stats.features += 1;
                progress.update(index + 1, total);
            }
            if total > 0 {
                progress.finish();
            }
        },
        GeoDocument::Feature(feature) => {
            if let Some(geometry) = feature.geometry.take() {
                feature.geometry = Some(simplify_planar(geometry, None, tolerance, &mut stats)?);
            }
            stats.features = 1;
        },
        GeoDocument::Geometry(geometry) => {
            *geometry = simplify_planar(geometry.clone(), None, tolerance, &mut stats)?;
        },
    }

    Ok(stats)
}

fn simplify_planar(
    geometry: geojson::Geometry,
    feature: Option<usize>,
    tolerance: f64,
    stats: &mut SimplifyStats,
) -> Result<geojson::Geometry> {
    let before = position_count(&geometry.value);
    stats.geometries += 1;
    stats.vertices_before += before;

    let unchanged = tolerance <= 0.0
        || before == 0
        || matches!(
            geometry.value,
            geojson::Value::Point(_) | geojson::Value::MultiPoint(_)
        );
    if unchanged {
        stats.vertices_after += before;
        return Ok(geometry);
    }

    let geojson::Geometry {
        bbox,
        value,
        foreign_members,
    } = geometry;
    let planar = to_planar(geojson::Geometry::new(value), feature)?;
    let simplified = simplify_geometry(&planar, tolerance);
    stats.vertices_after += simplified.coords_count();
    Ok(geojson::Geometry {
        bbox,
        value: from_planar(&simplified).value,
        foreign_members,
    })
}

/// Read `input`, simplify it and write compact JSON to `output`.
///
/// # Errors
///
/// Returns an error if the options are invalid or reading, simplifying or
/// writing fails. Nothing is written when an earlier step fails.
pub fn simplify_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &SimplifyOptions,
    progress: &mut dyn ProgressReporter,
) -> Result<SimplifyStats> {
    let (input, output) = (input.as_ref(), output.as_ref());
    options.validate()?;
    if options.precision != DEFAULT_PRECISION {
        warn!(
            "precision {} is accepted but not applied; coordinates are written unrounded",
            options.precision
        );
    }
    info!(
        "Simplifying {} -> {} (tolerance {})",
        input.display(),
        output.display(),
        options.tolerance
    );

    let mut document = read_document(input)?;
    let stats = simplify_document(&mut document, options, progress)?;
    write_document(output, &document, OutputStyle::Compact)?;

    info!("Simplified {stats}");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, GeoPrepError};
    use crate::progress::{ConsoleProgress, NoProgress};
    use geo::{line_string, polygon};
    use geojson::JsonValue;
    use tempfile::TempDir;

    fn wiggly_line() -> LineString<f64> {
        line_string![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.05),
            (x: 2.0, y: -0.05),
            (x: 3.0, y: 0.02),
            (x: 4.0, y: 0.0),
            (x: 5.0, y: 3.0),
        ]
    }

    fn square_with_noise() -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 5.0, y: 0.01),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 5.0, y: 10.02),
            (x: 0.0, y: 10.0),
            (x: 0.0, y: 0.0),
        ]
    }

    #[test]
    fn test_line_vertex_count_drops() {
        let line = Geometry::LineString(wiggly_line());
        let simplified = simplify_geometry(&line, 0.1);
        assert!(simplified.coords_count() < line.coords_count());
        let Geometry::LineString(ls) = simplified else {
            panic!("geometry type changed")
        };
        assert_eq!(ls.0.first(), wiggly_line().0.first());
        assert_eq!(ls.0.last(), wiggly_line().0.last());
    }

    #[test]
    fn test_zero_tolerance_is_identity() {
        let geometry = Geometry::Polygon(square_with_noise());
        assert_eq!(simplify_geometry(&geometry, 0.0), geometry);
    }

    #[test]
    fn test_polygon_noise_removed() {
        let geometry = Geometry::Polygon(square_with_noise());
        let Geometry::Polygon(simplified) = simplify_geometry(&geometry, 0.5) else {
            panic!("geometry type changed")
        };
        assert_eq!(simplified.exterior().0.len(), 5);
    }

    #[test]
    fn test_ring_never_collapses() {
        let triangle = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 0.5, y: 0.1),
            (x: 0.0, y: 0.0),
        ];
        let geometry = Geometry::Polygon(triangle.clone());
        let Geometry::Polygon(simplified) = simplify_geometry(&geometry, 100.0) else {
            panic!("geometry type changed")
        };
        assert_eq!(simplified, triangle);
    }

    #[test]
    fn test_holes_are_kept() {
        let polygon = polygon!(
            exterior: [
                (x: 0.0, y: 0.0),
                (x: 10.0, y: 0.0),
                (x: 10.0, y: 10.0),
                (x: 0.0, y: 10.0),
                (x: 0.0, y: 0.0),
            ],
            interiors: [[
                (x: 4.0, y: 4.0),
                (x: 6.0, y: 4.0),
                (x: 5.0, y: 4.1),
                (x: 4.0, y: 4.0),
            ]],
        );
        let Geometry::Polygon(simplified) = simplify_geometry(&Geometry::Polygon(polygon), 1.0)
        else {
            panic!("geometry type changed")
        };
        assert_eq!(simplified.interiors().len(), 1);
        assert_eq!(simplified.interiors()[0].0.len(), 4);
    }

    #[test]
    fn test_points_pass_through() {
        let point = Geometry::Point(geo::Point::new(1.0, 2.0));
        assert_eq!(simplify_geometry(&point, 10.0), point);
    }

    #[test]
    fn test_self_intersection_detection() {
        let bow_tie: LineString<f64> =
            line_string![(x: 0.0, y: 0.0), (x: 2.0, y: 2.0), (x: 2.0, y: 0.0), (x: 0.0, y: 2.0)];
        assert!(self_intersects(&bow_tie));
        assert!(!self_intersects(&wiggly_line()));
        assert!(!self_intersects(square_with_noise().exterior()));
    }

    #[test]
    fn test_simple_line_stays_simple() {
        // Runs right along the x axis, then back just above it.
        let line: LineString<f64> = line_string![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 1.0),
            (x: 5.0, y: 0.1),
            (x: 0.0, y: 1.0),
        ];
        assert!(!self_intersects(&line));
        for tolerance in [0.1, 0.5, 1.0, 5.0] {
            let simplified = simplify_line(&line, tolerance);
            assert!(!self_intersects(&simplified), "crossing at tolerance {tolerance}");
            assert!(simplified.0.len() <= line.0.len());
        }
    }

    fn bumped_shell() -> Vec<(f64, f64)> {
        vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (6.0, 10.0),
            (5.0, 10.8),
            (4.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ]
    }

    #[test]
    fn test_hole_near_shell_stays_inside() {
        let hole: LineString<f64> = vec![(4.8, 10.2), (5.2, 10.2), (5.0, 10.5), (4.8, 10.2)].into();
        let polygon = Polygon::new(bumped_shell().into(), vec![hole.clone()]);

        let Geometry::Polygon(simplified) =
            simplify_geometry(&Geometry::Polygon(polygon.clone()), 1.0)
        else {
            panic!("geometry type changed")
        };
        let shell = Polygon::new(simplified.exterior().clone(), vec![]);
        assert!(shell.contains(&simplified.interiors()[0]));
        assert_eq!(simplified, polygon);
    }

    #[test]
    fn test_hole_far_from_shell_allows_simplification() {
        let hole: LineString<f64> = vec![(4.0, 4.0), (6.0, 4.0), (5.0, 6.0), (4.0, 4.0)].into();
        let polygon = Polygon::new(bumped_shell().into(), vec![hole.clone()]);

        let Geometry::Polygon(simplified) = simplify_geometry(&Geometry::Polygon(polygon), 1.0)
        else {
            panic!("geometry type changed")
        };
        assert_eq!(simplified.exterior().0.len(), 5);
        assert_eq!(simplified.interiors(), &[hole]);
    }

    #[test]
    fn test_multipolygon_members_stay_apart() {
        let notched: LineString<f64> = vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (6.0, 10.0),
            (5.0, 9.2),
            (4.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ]
        .into();
        let island: LineString<f64> = vec![(4.9, 9.7), (5.1, 9.7), (5.0, 9.9), (4.9, 9.7)].into();
        let multi = MultiPolygon::new(vec![
            Polygon::new(notched, vec![]),
            Polygon::new(island, vec![]),
        ]);

        let Geometry::MultiPolygon(simplified) =
            simplify_geometry(&Geometry::MultiPolygon(multi.clone()), 1.0)
        else {
            panic!("geometry type changed")
        };
        assert!(!polygons_conflict(&simplified.0[0], &simplified.0[1]));
        assert_eq!(simplified, multi);
    }

    #[test]
    fn test_zero_tolerance_keeps_extra_ordinates() {
        let source = r#"{"type":"LineString","coordinates":[[0,0,5],[1,1,6]]}"#;
        let mut document: GeoDocument = source.parse().unwrap();
        let stats =
            simplify_document(&mut document, &SimplifyOptions::new(6, 0.0), &mut NoProgress)
                .unwrap();
        assert_eq!(document, source.parse::<GeoDocument>().unwrap());
        assert_eq!(stats.vertices_before, 2);
        assert_eq!(stats.vertices_after, 2);
    }

    #[test]
    fn test_points_keep_extra_ordinates() {
        let source = r#"{"type":"MultiPoint","coordinates":[[0,0,5],[0.1,0,6],[0.2,0,7]]}"#;
        let mut document: GeoDocument = source.parse().unwrap();
        simplify_document(&mut document, &SimplifyOptions::new(6, 10.0), &mut NoProgress)
            .unwrap();
        assert_eq!(document, source.parse::<GeoDocument>().unwrap());
    }

    #[test]
    fn test_empty_geometry_passes_through() {
        let source = r#"{"type":"Polygon","coordinates":[]}"#;
        let mut document: GeoDocument = source.parse().unwrap();
        simplify_document(&mut document, &SimplifyOptions::new(6, 1.0), &mut NoProgress)
            .unwrap();
        let json = document.to_json_string(OutputStyle::Compact).unwrap();
        assert!(json.contains(r#""coordinates":[]"#), "{json}");
    }

    #[test]
    fn test_geometry_members_survive_simplification() {
        let mut document: GeoDocument = r#"{"type":"LineString","bbox":[0,-0.05,5,3],
            "title":"river","coordinates":[[0,0],[1,0.05],[2,-0.05],[3,0.02],[4,0],[5,3]]}"#
            .parse()
            .unwrap();
        simplify_document(&mut document, &SimplifyOptions::new(6, 0.5), &mut NoProgress)
            .unwrap();
        let GeoDocument::Geometry(geometry) = &document else {
            panic!("document kind changed")
        };
        assert_eq!(geometry.bbox, Some(vec![0.0, -0.05, 5.0, 3.0]));
        let members = geometry.foreign_members.as_ref().unwrap();
        assert_eq!(members["title"], "river");
        assert!(position_count(&geometry.value) < 6);
    }

    fn collection() -> GeoDocument {
        r#"{
          "type": "FeatureCollection",
          "features": [
            {"type": "Feature", "properties": {"n": 1},
             "geometry": {"type": "LineString", "coordinates": [[0,0],[1,0.05],[2,-0.05],[3,0.02],[4,0],[5,3]]}},
            {"type": "Feature", "properties": {"n": 2},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[5,0.01],[10,0],[10,10],[5,10.02],[0,10],[0,0]]]}},
            {"type": "Feature", "properties": {"n": 3}, "geometry": null}
          ]
        }"#
        .parse()
        .unwrap()
    }

    #[test]
    fn test_document_preserves_feature_count_and_order() {
        let mut document = collection();
        let stats = simplify_document(
            &mut document,
            &SimplifyOptions::new(6, 0.5),
            &mut NoProgress,
        )
        .unwrap();

        assert_eq!(stats.features, 3);
        assert_eq!(stats.geometries, 2);
        assert!(stats.vertices_after < stats.vertices_before);

        let GeoDocument::FeatureCollection(fc) = &document else {
            panic!("document kind changed")
        };
        let order: Vec<_> = fc
            .features
            .iter()
            .map(|f| f.property("n").cloned().unwrap())
            .collect();
        assert_eq!(order, vec![JsonValue::from(1), JsonValue::from(2), JsonValue::from(3)]);
        assert!(fc.features[2].geometry.is_none());
    }

    #[test]
    fn test_precision_has_no_effect() {
        let mut a = collection();
        let mut b = collection();
        simplify_document(&mut a, &SimplifyOptions::new(0, 0.5), &mut NoProgress).unwrap();
        simplify_document(&mut b, &SimplifyOptions::new(12, 0.5), &mut NoProgress).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_collection_reports_progress() {
        let mut document = collection();
        let mut progress = ConsoleProgress::new(Vec::new());
        simplify_document(&mut document, &SimplifyOptions::new(6, 0.5), &mut progress).unwrap();
        let out = String::from_utf8(progress.into_inner()).unwrap();
        assert!(out.contains("\rProcessing features: 33.33% complete"));
        assert!(out.ends_with("\rProcessing features: 100.00% complete\n"));
    }

    #[test]
    fn test_bare_geometry_reports_no_progress() {
        let mut document: GeoDocument =
            r#"{"type":"LineString","coordinates":[[0,0],[1,0.05],[2,-0.05],[3,0.02],[4,0],[5,3]]}"#
                .parse()
                .unwrap();
        let mut progress = ConsoleProgress::new(Vec::new());
        let stats =
            simplify_document(&mut document, &SimplifyOptions::new(6, 0.5), &mut progress).unwrap();
        assert_eq!(stats.features, 0);
        assert_eq!(stats.geometries, 1);
        assert!(stats.vertices_after < stats.vertices_before);
        assert!(progress.into_inner().is_empty());
    }

    #[test]
    fn test_single_feature_is_simplified() {
        let mut document: GeoDocument = r#"{"type":"Feature","properties":{},
            "geometry":{"type":"LineString","coordinates":[[0,0],[1,0.05],[2,-0.05],[3,0.02],[4,0],[5,3]]}}"#
            .parse()
            .unwrap();
        let stats =
            simplify_document(&mut document, &SimplifyOptions::new(6, 0.5), &mut NoProgress)
                .unwrap();
        assert_eq!(stats.features, 1);
        assert!(stats.removed() > 0);
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let mut document = collection();
        let err = simplify_document(&mut document, &SimplifyOptions::new(6, -1.0), &mut NoProgress)
            .unwrap_err();
        assert!(matches!(
            err,
            GeoPrepError::Config(ConfigError::InvalidOption { .. })
        ));
        let err = SimplifyOptions::new(6, f64::NAN).validate().unwrap_err();
        assert!(err.to_string().contains("finite"));
    }

    #[test]
    fn test_simplify_file_writes_compact_json() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in.geojson");
        let output = temp_dir.path().join("out.geojson");
        std::fs::write(&input, collection().to_json_string(OutputStyle::Pretty).unwrap()).unwrap();

        simplify_file(&input, &output, &SimplifyOptions::new(5, 0.5), &mut NoProgress).unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        assert!(!text.contains('\n'));
        let reread = read_document(&output).unwrap();
        assert_eq!(reread.feature_count(), 3);
    }
}
