//! Great-circle geometry over WGS84 latitude/longitude pairs.
//!
//! Distances use a spherical Earth of radius [`EARTH_RADIUS_METERS`]. They act
//! as a proxy for road distance throughout the engine and are deliberately not
//! road-aware.

use geo::Coord;
use thiserror::Error;

/// Mean Earth radius used by [`distance_meters`].
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Reasons a latitude/longitude pair is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    /// Latitude or longitude was absent.
    #[error("coordinates are missing")]
    Missing,
    /// A component was NaN or infinite.
    #[error("coordinates must be finite numbers")]
    NotFinite,
    /// Both components were exactly zero, the placeholder written by geocoders
    /// that failed to resolve an address.
    #[error("coordinates 0,0 are treated as an unresolved address")]
    NullIsland,
    /// Latitude outside `[-90, 90]`.
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    /// Longitude outside `[-180, 180]`.
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A validated geographic position.
///
/// The only way to obtain a `GeoPoint` is through [`GeoPoint::new`] or
/// [`GeoPoint::from_parts`], so every value satisfies the range checks.
///
/// # Examples
/// ```
/// use schoolbus_core::GeoPoint;
///
/// let athens = GeoPoint::new(37.98, 23.73)?;
/// assert_eq!(athens.lat(), 37.98);
/// assert!(GeoPoint::new(91.0, 23.73).is_err());
/// # Ok::<(), schoolbus_core::CoordinateError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    /// Validate and construct a position.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if lat == 0.0 && lon == 0.0 {
            return Err(CoordinateError::NullIsland);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Validate optional components as they arrive from callers.
    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Result<Self, CoordinateError> {
        match (lat, lon) {
            (Some(lat), Some(lon)) => Self::new(lat, lon),
            _ => Err(CoordinateError::Missing),
        }
    }

    /// Validate a `geo` coordinate (`x = longitude`, `y = latitude`).
    pub fn from_coord(coord: Coord<f64>) -> Result<Self, CoordinateError> {
        Self::new(coord.y, coord.x)
    }

    /// Latitude in degrees.
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub const fn lon(&self) -> f64 {
        self.lon
    }

    /// The position as a `geo` coordinate.
    pub const fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(point: GeoPoint) -> Self {
        point.coord()
    }
}

/// Whether optional components form a usable position.
///
/// # Examples
/// ```
/// use schoolbus_core::is_valid_point;
///
/// assert!(is_valid_point(Some(37.98), Some(23.73)));
/// assert!(!is_valid_point(Some(0.0), Some(0.0)));
/// assert!(!is_valid_point(None, Some(23.73)));
/// ```
pub fn is_valid_point(lat: Option<f64>, lon: Option<f64>) -> bool {
    GeoPoint::from_parts(lat, lon).is_ok()
}

/// Haversine distance between two coordinates in metres.
///
/// Accepts anything convertible into a `geo` coordinate so that validated
/// points and intermediate centroids share one implementation.
///
/// # Examples
/// ```
/// use schoolbus_core::{GeoPoint, distance_meters};
///
/// let a = GeoPoint::new(37.98, 23.73)?;
/// let b = GeoPoint::new(37.99, 23.73)?;
/// let d = distance_meters(a, b);
/// assert!((d - 1_111.95).abs() < 1.0);
/// assert!((d - distance_meters(b, a)).abs() < 1e-9);
/// # Ok::<(), schoolbus_core::CoordinateError>(())
/// ```
#[expect(clippy::float_arithmetic, reason = "haversine formula")]
pub fn distance_meters(a: impl Into<Coord<f64>>, b: impl Into<Coord<f64>>) -> f64 {
    let from = a.into();
    let to = b.into();
    let lat_a = from.y.to_radians();
    let lat_b = to.y.to_radians();
    let half_dlat = (lat_b - lat_a) / 2.0;
    let half_dlon = (to.x - from.x).to_radians() / 2.0;
    let h = half_dlat.sin().powi(2) + lat_a.cos() * lat_b.cos() * half_dlon.sin().powi(2);
    // Rounding can push `h` a hair past 1 for antipodal points.
    let central = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();
    EARTH_RADIUS_METERS * central
}

/// Angle of `point` around `center`, measured counter-clockwise from the
/// longitude axis and normalised to `[0, 360)`.
///
/// This is a planar angle on raw degrees, not a compass bearing; it only needs
/// to order points around the centre consistently.
///
/// # Examples
/// ```
/// use schoolbus_core::{GeoPoint, bearing_degrees};
///
/// let school = GeoPoint::new(10.0, 10.0)?;
/// let north = GeoPoint::new(11.0, 10.0)?;
/// let west = GeoPoint::new(10.0, 9.0)?;
/// assert!((bearing_degrees(school, north) - 90.0).abs() < 1e-9);
/// assert!((bearing_degrees(school, west) - 180.0).abs() < 1e-9);
/// # Ok::<(), schoolbus_core::CoordinateError>(())
/// ```
#[expect(clippy::float_arithmetic, reason = "angle from coordinate deltas")]
pub fn bearing_degrees(center: impl Into<Coord<f64>>, point: impl Into<Coord<f64>>) -> f64 {
    let origin = center.into();
    let target = point.into();
    let angle = (target.y - origin.y)
        .atan2(target.x - origin.x)
        .to_degrees()
        .rem_euclid(360.0);
    if angle >= 360.0 { 0.0 } else { angle }
}
