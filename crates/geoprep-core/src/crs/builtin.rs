//! Pure-Rust coordinate transforms for the built-in reference systems.
//!
//! Every transform goes through WGS 84 longitude/latitude:
//!
//! ```text
//! source (x, y) -> source datum lon/lat -> [Helmert] -> WGS 84 lon/lat
//!               -> [Helmert⁻¹] -> target datum lon/lat -> target (x, y)
//! ```
//!
//! Transverse Mercator uses Krüger's series in `n` to sixth order (Karney
//! 2011), which is accurate to a few nanometres within the zones used
//! here. The datum shift is the 7-parameter position-vector Helmert
//! transform applied to geocentric coordinates, so it carries the usual
//! few-metre error of OSGB36 ↔ WGS 84 Helmert shifts.

use std::f64::consts::FRAC_PI_4;

use super::{CoordinateTransform, Crs};
use crate::error::CrsError;

/// Reference ellipsoid defined by semi-major axis and flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Ellipsoid {
    a: f64,
    f: f64,
}

impl Ellipsoid {
    pub(crate) const WGS84: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257_223_563,
    };
    pub(crate) const AIRY_1830: Ellipsoid = Ellipsoid {
        a: 6_377_563.396,
        f: 1.0 / 299.324_964_6,
    };

    fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }
}

/// Position-vector Helmert parameters, to WGS 84.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Helmert {
    /// Translations in metres
    t: [f64; 3],
    /// Rotations in arc-seconds
    r: [f64; 3],
    /// Scale in parts per million
    s: f64,
}

const ARCSEC: f64 = std::f64::consts::PI / 648_000.0;

impl Helmert {
    /// OSGB36 to WGS 84, as published by Ordnance Survey.
    pub(crate) const OSGB36_TO_WGS84: Helmert = Helmert {
        t: [446.448, -125.157, 542.060],
        r: [0.1502, 0.2470, 0.8421],
        s: -20.4894,
    };

    fn matrix(&self) -> [[f64; 3]; 3] {
        let [rx, ry, rz] = self.r.map(|r| r * ARCSEC);
        let s = 1.0 + self.s * 1e-6;
        [[s, -rz, ry], [rz, s, -rx], [-ry, rx, s]]
    }

    fn apply(&self, p: [f64; 3]) -> [f64; 3] {
        let m = self.matrix();
        std::array::from_fn(|i| self.t[i] + m[i][0] * p[0] + m[i][1] * p[1] + m[i][2] * p[2])
    }

    /// Exact inverse of [`Helmert::apply`], solved with Cramer's rule.
    fn invert(&self, p: [f64; 3]) -> [f64; 3] {
        let m = self.matrix();
        let b: [f64; 3] = std::array::from_fn(|i| p[i] - self.t[i]);
        let d = det3(&m);
        std::array::from_fn(|col| {
            let mut mc = m;
            for (row, value) in b.iter().enumerate() {
                mc[row][col] = *value;
            }
            det3(&mc) / d
        })
    }
}

fn det3(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Geodetic degrees (height zero) to geocentric metres.
fn to_geocentric(ellipsoid: Ellipsoid, lon: f64, lat: f64) -> [f64; 3] {
    let (phi, lambda) = (lat.to_radians(), lon.to_radians());
    let e2 = ellipsoid.e2();
    let nu = ellipsoid.a / (1.0 - e2 * phi.sin().powi(2)).sqrt();
    [
        nu * phi.cos() * lambda.cos(),
        nu * phi.cos() * lambda.sin(),
        nu * (1.0 - e2) * phi.sin(),
    ]
}

/// Geocentric metres to geodetic degrees; the ellipsoidal height is dropped.
fn from_geocentric(ellipsoid: Ellipsoid, [x, y, z]: [f64; 3]) -> (f64, f64) {
    let e2 = ellipsoid.e2();
    let p = x.hypot(y);
    let lambda = y.atan2(x);
    let mut phi = z.atan2(p * (1.0 - e2));
    for _ in 0..10 {
        let nu = ellipsoid.a / (1.0 - e2 * phi.sin().powi(2)).sqrt();
        let h = p / phi.cos() - nu;
        let next = z.atan2(p * (1.0 - e2 * nu / (nu + h)));
        let done = (next - phi).abs() < 1e-14;
        phi = next;
        if done {
            break;
        }
    }
    (lambda.to_degrees(), phi.to_degrees())
}

/// Transverse Mercator projection on an ellipsoid.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TransverseMercator {
    ellipsoid: Ellipsoid,
    lon0: f64,
    k0: f64,
    false_easting: f64,
    false_northing: f64,
    /// Rectifying radius
    a_hat: f64,
    alpha: [f64; 6],
    beta: [f64; 6],
    /// Rectifying latitude of the natural origin
    xi0: f64,
}

impl TransverseMercator {
    pub(crate) fn new(
        ellipsoid: Ellipsoid,
        lat0: f64,
        lon0: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let n = ellipsoid.f / (2.0 - ellipsoid.f);
        let [n2, n3, n4, n5, n6] = [n.powi(2), n.powi(3), n.powi(4), n.powi(5), n.powi(6)];
        let a_hat = ellipsoid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0 + n6 / 256.0);
        let alpha = [
            n / 2.0 - 2.0 / 3.0 * n2 + 5.0 / 16.0 * n3 + 41.0 / 180.0 * n4 - 127.0 / 288.0 * n5
                + 7891.0 / 37800.0 * n6,
            13.0 / 48.0 * n2 - 3.0 / 5.0 * n3 + 557.0 / 1440.0 * n4 + 281.0 / 630.0 * n5
                - 1_983_433.0 / 1_935_360.0 * n6,
            61.0 / 240.0 * n3 - 103.0 / 140.0 * n4 + 15061.0 / 26880.0 * n5
                + 167_603.0 / 181_440.0 * n6,
            49561.0 / 161_280.0 * n4 - 179.0 / 168.0 * n5 + 6_601_661.0 / 7_257_600.0 * n6,
            34729.0 / 80640.0 * n5 - 3_418_889.0 / 1_995_840.0 * n6,
            212_378_941.0 / 319_334_400.0 * n6,
        ];
        let beta = [
            n / 2.0 - 2.0 / 3.0 * n2 + 37.0 / 96.0 * n3 - 1.0 / 360.0 * n4 - 81.0 / 512.0 * n5
                + 96199.0 / 604_800.0 * n6,
            1.0 / 48.0 * n2 + 1.0 / 15.0 * n3 - 437.0 / 1440.0 * n4 + 46.0 / 105.0 * n5
                - 1_118_711.0 / 3_870_720.0 * n6,
            17.0 / 480.0 * n3 - 37.0 / 840.0 * n4 - 209.0 / 4480.0 * n5 + 5569.0 / 90720.0 * n6,
            4397.0 / 161_280.0 * n4 - 11.0 / 504.0 * n5 - 830_251.0 / 7_257_600.0 * n6,
            4583.0 / 161_280.0 * n5 - 108_847.0 / 3_991_680.0 * n6,
            20_648_693.0 / 638_668_800.0 * n6,
        ];

        let mut tm = Self {
            ellipsoid,
            lon0: lon0.to_radians(),
            k0,
            false_easting,
            false_northing,
            a_hat,
            alpha,
            beta,
            xi0: 0.0,
        };
        tm.xi0 = tm.xi_eta(lat0.to_radians(), 0.0).0;
        tm
    }

    /// UTM zone on WGS 84.
    pub(crate) fn utm(zone: u8, north: bool) -> Self {
        let lon0 = f64::from(zone) * 6.0 - 183.0;
        let false_northing = if north { 0.0 } else { 10_000_000.0 };
        Self::new(Ellipsoid::WGS84, 0.0, lon0, 0.9996, 500_000.0, false_northing)
    }

    /// OSGB36 / British National Grid.
    pub(crate) fn british_national_grid() -> Self {
        Self::new(
            Ellipsoid::AIRY_1830,
            49.0,
            -2.0,
            0.999_601_271_7,
            400_000.0,
            -100_000.0,
        )
    }

    fn e(&self) -> f64 {
        self.ellipsoid.e2().sqrt()
    }

    /// tan of the conformal latitude.
    fn conformal_tan(&self, phi: f64) -> f64 {
        let e = self.e();
        let tau = phi.tan();
        let sigma = (e * (e * tau / (1.0 + tau * tau).sqrt()).atanh()).sinh();
        tau * (1.0 + sigma * sigma).sqrt() - sigma * (1.0 + tau * tau).sqrt()
    }

    fn xi_eta(&self, phi: f64, lambda: f64) -> (f64, f64) {
        let tau_p = self.conformal_tan(phi);
        let xi_p = tau_p.atan2(lambda.cos());
        let eta_p = (lambda.sin() / (tau_p * tau_p + lambda.cos().powi(2)).sqrt()).asinh();

        let (mut xi, mut eta) = (xi_p, eta_p);
        for (j, alpha) in (1..=6).zip(self.alpha) {
            let k = 2.0 * f64::from(j);
            xi += alpha * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += alpha * (k * xi_p).cos() * (k * eta_p).sinh();
        }
        (xi, eta)
    }

    /// Geodetic degrees on this projection's ellipsoid to easting/northing.
    pub(crate) fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (xi, eta) = self.xi_eta(lat.to_radians(), lon.to_radians() - self.lon0);
        let scale = self.k0 * self.a_hat;
        (
            self.false_easting + scale * eta,
            self.false_northing + scale * (xi - self.xi0),
        )
    }

    /// Easting/northing to geodetic degrees on this projection's ellipsoid.
    pub(crate) fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let scale = self.k0 * self.a_hat;
        let xi = (y - self.false_northing) / scale + self.xi0;
        let eta = (x - self.false_easting) / scale;

        let (mut xi_p, mut eta_p) = (xi, eta);
        for (j, beta) in (1..=6).zip(self.beta) {
            let k = 2.0 * f64::from(j);
            xi_p -= beta * (k * xi).sin() * (k * eta).cosh();
            eta_p -= beta * (k * xi).cos() * (k * eta).sinh();
        }

        let tau_p = xi_p.sin() / (eta_p.sinh().powi(2) + xi_p.cos().powi(2)).sqrt();

        // Newton iteration for tan(phi) from tan of the conformal latitude.
        let (e, e2) = (self.e(), self.ellipsoid.e2());
        let mut tau = tau_p;
        for _ in 0..20 {
            let sigma = (e * (e * tau / (1.0 + tau * tau).sqrt()).atanh()).sinh();
            let tau_i = tau * (1.0 + sigma * sigma).sqrt() - sigma * (1.0 + tau * tau).sqrt();
            let delta = (tau_p - tau_i) / (1.0 + tau_i * tau_i).sqrt()
                * (1.0 + (1.0 - e2) * tau * tau)
                / ((1.0 - e2) * (1.0 + tau * tau).sqrt());
            tau += delta;
            if delta.abs() < 1e-14 {
                break;
            }
        }

        let lambda = eta_p.sinh().atan2(xi_p.cos()) + self.lon0;
        (lambda.to_degrees(), tau.atan().to_degrees())
    }
}

/// Spherical Web Mercator radius (the WGS 84 semi-major axis).
const WEB_MERCATOR_RADIUS: f64 = 6_378_137.0;

/// How one built-in CRS maps to and from WGS 84 longitude/latitude.
#[derive(Debug, Clone, PartialEq)]
enum Projection {
    Geographic,
    WebMercator,
    TransverseMercator {
        tm: TransverseMercator,
        to_wgs84: Option<Helmert>,
    },
}

impl Projection {
    fn for_crs(crs: Crs) -> Self {
        match crs {
            Crs::Wgs84 => Projection::Geographic,
            Crs::WebMercator => Projection::WebMercator,
            Crs::BritishNationalGrid => Projection::TransverseMercator {
                tm: TransverseMercator::british_national_grid(),
                to_wgs84: Some(Helmert::OSGB36_TO_WGS84),
            },
            Crs::Utm { zone, north } => Projection::TransverseMercator {
                tm: TransverseMercator::utm(zone, north),
                to_wgs84: None,
            },
        }
    }

    fn to_wgs84(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Projection::Geographic => (x, y),
            Projection::WebMercator => (
                (x / WEB_MERCATOR_RADIUS).to_degrees(),
                (2.0 * (y / WEB_MERCATOR_RADIUS).exp().atan() - 2.0 * FRAC_PI_4).to_degrees(),
            ),
            Projection::TransverseMercator { tm, to_wgs84 } => {
                let (lon, lat) = tm.inverse(x, y);
                match to_wgs84 {
                    Some(helmert) => from_geocentric(
                        Ellipsoid::WGS84,
                        helmert.apply(to_geocentric(tm.ellipsoid, lon, lat)),
                    ),
                    None => (lon, lat),
                }
            },
        }
    }

    fn from_wgs84(&self, lon: f64, lat: f64) -> (f64, f64) {
        match self {
            Projection::Geographic => (lon, lat),
            Projection::WebMercator if lat.abs() >= 90.0 => (f64::NAN, f64::NAN),
            Projection::WebMercator => (
                WEB_MERCATOR_RADIUS * lon.to_radians(),
                WEB_MERCATOR_RADIUS * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln(),
            ),
            Projection::TransverseMercator { tm, to_wgs84 } => {
                let (lon, lat) = match to_wgs84 {
                    Some(helmert) => from_geocentric(
                        tm.ellipsoid,
                        helmert.invert(to_geocentric(Ellipsoid::WGS84, lon, lat)),
                    ),
                    None => (lon, lat),
                };
                tm.forward(lon, lat)
            },
        }
    }
}

/// Transforms between two built-in reference systems without external libraries.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltinTransformer {
    from: Crs,
    to: Crs,
    source: Projection,
    target: Projection,
}

impl BuiltinTransformer {
    #[must_use]
    pub fn new(from: Crs, to: Crs) -> Self {
        Self {
            from,
            to,
            source: Projection::for_crs(from),
            target: Projection::for_crs(to),
        }
    }

    /// The transformer going the other way.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self::new(self.to, self.from)
    }

    #[must_use]
    pub fn source(&self) -> Crs {
        self.from
    }

    #[must_use]
    pub fn target(&self) -> Crs {
        self.to
    }
}

impl CoordinateTransform for BuiltinTransformer {
    fn transform(&self, x: f64, y: f64) -> Result<(f64, f64), CrsError> {
        if self.from == self.to {
            return Ok((x, y));
        }
        let (lon, lat) = self.source.to_wgs84(x, y);
        let (tx, ty) = self.target.from_wgs84(lon, lat);
        if tx.is_finite() && ty.is_finite() {
            Ok((tx, ty))
        } else {
            Err(CrsError::Transform {
                x,
                y,
                message: format!("no finite result in {}", self.to),
            })
        }
    }

    fn describe(&self) -> String {
        format!("{} -> {} (built-in)", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dms(degrees: f64, minutes: f64, seconds: f64) -> f64 {
        degrees + minutes / 60.0 + seconds / 3600.0
    }

    #[test]
    fn test_british_national_grid_worked_example() {
        // Ordnance Survey worked example, OSGB36 geodetic to grid.
        let tm = TransverseMercator::british_national_grid();
        let (e, n) = tm.forward(dms(1.0, 43.0, 4.5177), dms(52.0, 39.0, 27.2531));
        assert!((e - 651_409.903).abs() < 1e-3, "easting {e}");
        assert!((n - 313_177.270).abs() < 1e-3, "northing {n}");

        let (lon, lat) = tm.inverse(e, n);
        assert!((lon - dms(1.0, 43.0, 4.5177)).abs() < 1e-10);
        assert!((lat - dms(52.0, 39.0, 27.2531)).abs() < 1e-10);
    }

    #[test]
    fn test_utm_forward_inverse() {
        let tm = TransverseMercator::utm(31, true);
        let (e, n) = tm.forward(2.2945, 48.8584);
        assert!((e - 448_252.0).abs() < 0.5, "easting {e}");
        assert!((n - 5_411_954.9).abs() < 0.5, "northing {n}");

        let (lon, lat) = tm.inverse(e, n);
        assert!((lon - 2.2945).abs() < 1e-10);
        assert!((lat - 48.8584).abs() < 1e-10);
    }

    #[test]
    fn test_utm_south_false_northing() {
        let tm = TransverseMercator::utm(56, false);
        let (_, n) = tm.forward(151.2093, -33.8688);
        assert!(n > 6_000_000.0 && n < 7_000_000.0, "northing {n}");
    }

    #[test]
    fn test_helmert_inverse_is_exact() {
        let p = to_geocentric(Ellipsoid::AIRY_1830, -0.1275, 51.5072);
        let q = Helmert::OSGB36_TO_WGS84.invert(Helmert::OSGB36_TO_WGS84.apply(p));
        for i in 0..3 {
            assert!((p[i] - q[i]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_geocentric_round_trip() {
        let (lon, lat) =
            from_geocentric(Ellipsoid::WGS84, to_geocentric(Ellipsoid::WGS84, 12.5, -41.25));
        assert!((lon - 12.5).abs() < 1e-10);
        assert!((lat + 41.25).abs() < 1e-10);
    }

    #[test]
    fn test_web_mercator() {
        let t = BuiltinTransformer::new(Crs::Wgs84, Crs::WebMercator);
        let (x, y) = t.transform(-0.1275, 51.5072).unwrap();
        assert!((x + 14_193.235).abs() < 1e-3, "x {x}");
        assert!((y - 6_711_506.705).abs() < 1e-3, "y {y}");

        let (lon, lat) = t.inverse().transform(x, y).unwrap();
        assert!((lon + 0.1275).abs() < 1e-9);
        assert!((lat - 51.5072).abs() < 1e-9);
    }

    #[test]
    fn test_web_mercator_pole_is_an_error() {
        let t = BuiltinTransformer::new(Crs::Wgs84, Crs::WebMercator);
        assert!(matches!(
            t.transform(0.0, 90.0),
            Err(CrsError::Transform { .. })
        ));
    }

    #[test]
    fn test_identity() {
        let t = BuiltinTransformer::new(Crs::BritishNationalGrid, Crs::BritishNationalGrid);
        assert_eq!(t.transform(1.0, 2.0).unwrap(), (1.0, 2.0));
    }
}
