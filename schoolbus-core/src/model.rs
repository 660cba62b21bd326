//! Caller-supplied planning inputs: students, stops, buses and bare points.
//!
//! Coordinates are kept as optional raw numbers so that missing or malformed
//! geocodes survive deserialisation and can be reported back to the caller
//! instead of failing the whole request. Use [`Located::position`] to obtain a
//! validated [`GeoPoint`].

use crate::{CoordinateError, GeoPoint};

/// An entity with an identifier and a (possibly unusable) position.
pub trait Located {
    /// Stable identifier of the entity.
    fn id(&self) -> &str;

    /// Raw latitude, if supplied.
    fn lat(&self) -> Option<f64>;

    /// Raw longitude, if supplied.
    fn lon(&self) -> Option<f64>;

    /// Validated position of the entity.
    fn position(&self) -> Result<GeoPoint, CoordinateError> {
        GeoPoint::from_parts(self.lat(), self.lon())
    }
}

/// A bare geocoded point, used for the school anchor.
///
/// # Examples
/// ```
/// use schoolbus_core::{Located, Point};
///
/// let school = Point::new("school", 37.98, 23.73);
/// assert!(school.position().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// Identifier; may be empty for anonymous anchors.
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: String,
    /// Latitude in degrees.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lat: Option<f64>,
    /// Longitude in degrees.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lon: Option<f64>,
}

impl Point {
    /// Construct a point with both coordinates present.
    pub fn new(id: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            lat: Some(lat),
            lon: Some(lon),
        }
    }
}

impl Located for Point {
    fn id(&self) -> &str {
        &self.id
    }

    fn lat(&self) -> Option<f64> {
        self.lat
    }

    fn lon(&self) -> Option<f64> {
        self.lon
    }
}

/// A student to be picked up or dropped off.
///
/// # Examples
/// ```
/// use schoolbus_core::{Located, Student};
///
/// let student = Student::new("s1", 37.99, 23.74).with_name("Eleni");
/// assert_eq!(student.id(), "s1");
/// assert_eq!(student.name, "Eleni");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Student {
    /// Unique student identifier.
    pub id: String,
    /// Display name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// School grade, if known.
    #[cfg_attr(feature = "serde", serde(default))]
    pub grade: Option<String>,
    /// Postal address the coordinates were geocoded from.
    #[cfg_attr(feature = "serde", serde(default))]
    pub address: Option<String>,
    /// Latitude in degrees.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lat: Option<f64>,
    /// Longitude in degrees.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lon: Option<f64>,
}

impl Student {
    /// Construct a student at the given coordinates.
    pub fn new(id: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            lat: Some(lat),
            lon: Some(lon),
            ..Self::default()
        }
    }

    /// Construct a student whose address could not be geocoded.
    pub fn without_location(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the grade.
    #[must_use]
    pub fn with_grade(mut self, grade: impl Into<String>) -> Self {
        self.grade = Some(grade.into());
        self
    }

    /// Set the postal address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

impl Located for Student {
    fn id(&self) -> &str {
        &self.id
    }

    fn lat(&self) -> Option<f64> {
        self.lat
    }

    fn lon(&self) -> Option<f64> {
        self.lon
    }
}

/// An intermediate waypoint inserted into every cluster's path, such as a
/// meeting point.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stop {
    /// Unique stop identifier.
    pub id: String,
    /// Display name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// Latitude in degrees.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lat: Option<f64>,
    /// Longitude in degrees.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lon: Option<f64>,
    /// Explicit visiting order; lower values come first.
    #[cfg_attr(feature = "serde", serde(default))]
    pub order: Option<u32>,
}

impl Stop {
    /// Construct a stop at the given coordinates.
    pub fn new(id: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            lat: Some(lat),
            lon: Some(lon),
            ..Self::default()
        }
    }

    /// Set the explicit visiting order.
    #[must_use]
    pub const fn with_order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }
}

impl Located for Stop {
    fn id(&self) -> &str {
        &self.id
    }

    fn lat(&self) -> Option<f64> {
        self.lat
    }

    fn lon(&self) -> Option<f64> {
        self.lon
    }
}

/// A vehicle with a seat capacity.
///
/// Buses with zero capacity are accepted as input but treated as inactive by
/// the planner.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bus {
    /// Unique bus identifier.
    pub id: String,
    /// Display name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// Number of students the bus can carry.
    pub capacity: u32,
}

impl Bus {
    /// Construct a bus with the given capacity.
    pub fn new(id: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            capacity,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether the bus can carry anyone at all.
    pub const fn is_active(&self) -> bool {
        self.capacity > 0
    }

    /// Capacity as a collection length.
    pub fn seats(&self) -> usize {
        usize::try_from(self.capacity).unwrap_or(usize::MAX)
    }
}

/// Order stops by their explicit `order`, keeping input order for ties and
/// placing unordered stops last.
///
/// # Examples
/// ```
/// use schoolbus_core::{Stop, sort_stops};
///
/// let stops = vec![
///     Stop::new("late", 1.0, 1.0),
///     Stop::new("second", 1.0, 1.0).with_order(2),
///     Stop::new("first", 1.0, 1.0).with_order(1),
/// ];
/// let ids: Vec<_> = sort_stops(&stops).into_iter().map(|s| s.id.as_str()).collect();
/// assert_eq!(ids, ["first", "second", "late"]);
/// ```
pub fn sort_stops(stops: &[Stop]) -> Vec<&Stop> {
    let mut ordered: Vec<&Stop> = stops.iter().collect();
    ordered.sort_by_key(|stop| stop.order.map_or((1, 0), |order| (0, order)));
    ordered
}
