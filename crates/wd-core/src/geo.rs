//! Geographic coordinate type and geodesic utilities.
//!
//! `GeoPoint` uses `f64` latitude/longitude in degrees.  Agents advance by
//! ~1.5 m per tick, so single precision (~1 m at the equator) would swallow
//! whole steps.
//!
//! Distances and bearings are solved on the WGS-84 ellipsoid with Vincenty's
//! inverse and direct formulae.  Bearings are radians clockwise from true
//! north, in `(-π, π]`.

/// WGS-84 semi-major axis, metres.
const WGS84_A: f64 = 6_378_137.0;
/// WGS-84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS-84 semi-minor axis, metres.
const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);

/// Mean Earth radius used by the spherical approximations, metres.
const MEAN_RADIUS_M: f64 = 6_371_000.0;

const MAX_ITERATIONS: usize = 200;
const CONVERGENCE: f64 = 1e-12;

/// A WGS-84 geographic coordinate in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Ellipsoidal distance in metres and initial bearing in radians from
    /// `self` to `other`.
    ///
    /// Coincident points return `(0.0, 0.0)`; the bearing is meaningless
    /// there and callers must not steer by it.  Near-antipodal pairs where
    /// Vincenty fails to converge fall back to the haversine distance and
    /// the spherical initial bearing.
    pub fn distance_and_bearing(self, other: GeoPoint) -> (f64, f64) {
        if self == other {
            return (0.0, 0.0);
        }
        vincenty_inverse(self, other).unwrap_or_else(|| {
            (self.haversine_m(other), self.spherical_bearing(other))
        })
    }

    /// Distance in metres (see [`distance_and_bearing`](Self::distance_and_bearing)).
    #[inline]
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        self.distance_and_bearing(other).0
    }

    /// The point reached by travelling `distance_m` metres from `self` along
    /// the geodesic with initial bearing `bearing_rad`.
    ///
    /// A zero distance returns `self` unchanged without touching the bearing.
    pub fn project(self, distance_m: f64, bearing_rad: f64) -> GeoPoint {
        if distance_m == 0.0 {
            return self;
        }
        vincenty_direct(self, distance_m, bearing_rad)
    }

    /// Haversine great-circle distance in metres on a sphere of mean radius.
    pub fn haversine_m(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        MEAN_RADIUS_M * c
    }

    /// Equirectangular approximation in metres.  Cheap and monotone at city
    /// scale; error grows with latitude span.
    pub fn equirectangular_m(self, other: GeoPoint) -> f64 {
        let x = (other.lon - self.lon).to_radians() * self.lat.to_radians().cos();
        let y = (other.lat - self.lat).to_radians();
        MEAN_RADIUS_M * (x * x + y * y).sqrt()
    }

    /// Initial great-circle bearing on a sphere, radians from north.
    pub fn spherical_bearing(self, other: GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lon = (other.lon - self.lon).to_radians();
        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
        y.atan2(x)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.7}, {:.7})", self.lat, self.lon)
    }
}

// ── Vincenty ──────────────────────────────────────────────────────────────────

/// Returns `None` when the iteration does not converge (near-antipodal).
fn vincenty_inverse(p1: GeoPoint, p2: GeoPoint) -> Option<(f64, f64)> {
    let l = (p2.lon - p1.lon).to_radians();
    let u1 = ((1.0 - WGS84_F) * p1.lat.to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * p2.lat.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            // Same point after normalisation (e.g. lon 180 vs -180).
            return Some((0.0, 0.0));
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // Equatorial line: cos²α = 0.
        let cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };
        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));
        let lambda_prev = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m
                            + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        if (lambda - lambda_prev).abs() < CONVERGENCE {
            let u_sq = cos_sq_alpha * (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);
            let (a, b) = series_coefficients(u_sq);
            let delta_sigma = delta_sigma(b, sin_sigma, cos_sigma, cos_2sigma_m);
            let distance = WGS84_B * a * (sigma - delta_sigma);

            let (sin_lambda, cos_lambda) = lambda.sin_cos();
            let bearing = (cos_u2 * sin_lambda)
                .atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda);
            return Some((distance, bearing));
        }
    }
    None
}

fn vincenty_direct(origin: GeoPoint, distance_m: f64, bearing_rad: f64) -> GeoPoint {
    let (sin_alpha1, cos_alpha1) = bearing_rad.sin_cos();
    let tan_u1 = (1.0 - WGS84_F) * origin.lat.to_radians().tan();
    let cos_u1 = 1.0 / (1.0 + tan_u1 * tan_u1).sqrt();
    let sin_u1 = tan_u1 * cos_u1;

    let sigma1 = tan_u1.atan2(cos_alpha1);
    let sin_alpha = cos_u1 * sin_alpha1;
    let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
    let u_sq = cos_sq_alpha * (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);
    let (a, b) = series_coefficients(u_sq);

    let base = distance_m / (WGS84_B * a);
    let mut sigma = base;
    let mut cos_2sigma_m = (2.0 * sigma1 + sigma).cos();
    for _ in 0..MAX_ITERATIONS {
        cos_2sigma_m = (2.0 * sigma1 + sigma).cos();
        let (sin_sigma, cos_sigma) = sigma.sin_cos();
        let next = base + delta_sigma(b, sin_sigma, cos_sigma, cos_2sigma_m);
        let converged = (next - sigma).abs() < CONVERGENCE;
        sigma = next;
        if converged {
            break;
        }
    }

    let (sin_sigma, cos_sigma) = sigma.sin_cos();
    let tmp = sin_u1 * sin_sigma - cos_u1 * cos_sigma * cos_alpha1;
    let lat = (sin_u1 * cos_sigma + cos_u1 * sin_sigma * cos_alpha1)
        .atan2((1.0 - WGS84_F) * (sin_alpha * sin_alpha + tmp * tmp).sqrt());
    let lambda = (sin_sigma * sin_alpha1)
        .atan2(cos_u1 * cos_sigma - sin_u1 * sin_sigma * cos_alpha1);
    let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));
    let l = lambda
        - (1.0 - c)
            * WGS84_F
            * sin_alpha
            * (sigma
                + c * sin_sigma
                    * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

    GeoPoint::new(lat.to_degrees(), normalize_lon(origin.lon + l.to_degrees()))
}

/// Vincenty's `A` and `B` series coefficients for reduced `u²`.
#[inline]
fn series_coefficients(u_sq: f64) -> (f64, f64) {
    let a = 1.0 + u_sq / 16_384.0 * (4_096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let b = u_sq / 1_024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    (a, b)
}

#[inline]
fn delta_sigma(b: f64, sin_sigma: f64, cos_sigma: f64, cos_2sigma_m: f64) -> f64 {
    let c2 = cos_2sigma_m * cos_2sigma_m;
    b * sin_sigma
        * (cos_2sigma_m
            + b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * c2)
                    - b / 6.0 * cos_2sigma_m * (-3.0 + 4.0 * sin_sigma * sin_sigma) * (-3.0 + 4.0 * c2)))
}

/// Wrap a longitude into `[-180, 180)`.
#[inline]
fn normalize_lon(lon: f64) -> f64 {
    (lon + 540.0).rem_euclid(360.0) - 180.0
}
