//! Ordered waypoint sequences submitted to the route optimizer.
//!
//! A [`WaypointPath`] is built once per cluster and carried alongside the
//! optimizer request, so reconstruction only needs to know which waypoints are
//! first, middle and last.

use std::fmt;
use std::str::FromStr;

use crate::{GeoPoint, Located, Stop, Student, distance_meters, sort_stops};

/// What a waypoint represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WaypointKind {
    /// A student's home.
    Student,
    /// An intermediate stop.
    Stop,
    /// The school anchor.
    School,
}

/// A single position in a route's coordinate sequence.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Waypoint {
    /// What the waypoint represents.
    pub kind: WaypointKind,
    /// Identifier of the student, stop or school.
    pub id: String,
    /// Validated position.
    pub position: GeoPoint,
}

impl Waypoint {
    /// Construct a waypoint.
    pub fn new(kind: WaypointKind, id: impl Into<String>, position: GeoPoint) -> Self {
        Self {
            kind,
            id: id.into(),
            position,
        }
    }
}

/// Direction policy for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RouteType {
    /// Collect students and finish at the school.
    #[default]
    Pickup,
    /// Leave the school and deliver students home.
    Dropoff,
    /// Start at the school with no fixed far anchor.
    Mixed,
}

impl RouteType {
    /// Canonical lowercase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pickup => "pickup",
            Self::Dropoff => "dropoff",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pickup" => Ok(Self::Pickup),
            "dropoff" => Ok(Self::Dropoff),
            "mixed" => Ok(Self::Mixed),
            _ => Err(format!("unknown route type '{s}'")),
        }
    }
}

/// Ordered waypoints for one cluster plus the bookkeeping needed to account
/// for everything that was left out.
///
/// # Examples
/// ```
/// use schoolbus_core::{GeoPoint, RouteType, Student, WaypointKind, WaypointPath};
///
/// let school = GeoPoint::new(37.98, 23.73)?;
/// let students = vec![
///     Student::new("near", 37.981, 23.731),
///     Student::new("far", 38.02, 23.77),
/// ];
/// let path = WaypointPath::build(school, &students, &[], RouteType::Pickup);
///
/// assert_eq!(path.anchor_student_id(), Some("far"));
/// assert_eq!(path.waypoints().first().map(|w| w.id.as_str()), Some("far"));
/// assert_eq!(path.waypoints().last().map(|w| w.kind), Some(WaypointKind::School));
/// # Ok::<(), schoolbus_core::CoordinateError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointPath {
    route_type: RouteType,
    waypoints: Vec<Waypoint>,
    anchor: Option<String>,
    skipped_students: Vec<String>,
    skipped_stops: Vec<String>,
}

/// Identifier used for the school waypoint.
pub const SCHOOL_WAYPOINT_ID: &str = "school";

impl WaypointPath {
    /// Build the waypoint sequence for a cluster.
    ///
    /// Students and stops with unusable coordinates are left out and listed
    /// in [`skipped_students`](Self::skipped_students) and
    /// [`skipped_stops`](Self::skipped_stops). With no valid students the
    /// path degenerates to the school plus any stops; callers decide whether
    /// that is worth optimising.
    pub fn build(
        school: GeoPoint,
        students: &[Student],
        stops: &[Stop],
        route_type: RouteType,
    ) -> Self {
        let mut skipped_students = Vec::new();
        let mut located = Vec::with_capacity(students.len());
        for student in students {
            match student.position() {
                Ok(position) => located.push(Waypoint::new(
                    WaypointKind::Student,
                    student.id.clone(),
                    position,
                )),
                Err(_) => skipped_students.push(student.id.clone()),
            }
        }

        let mut skipped_stops = Vec::new();
        let mut stop_waypoints = Vec::with_capacity(stops.len());
        for stop in sort_stops(stops) {
            match stop.position() {
                Ok(position) => {
                    stop_waypoints.push(Waypoint::new(
                        WaypointKind::Stop,
                        stop.id.clone(),
                        position,
                    ));
                }
                Err(_) => skipped_stops.push(stop.id.clone()),
            }
        }

        let school_waypoint = Waypoint::new(WaypointKind::School, SCHOOL_WAYPOINT_ID, school);
        let anchor_index = match route_type {
            RouteType::Pickup | RouteType::Dropoff => furthest_index(school, &located),
            RouteType::Mixed => None,
        };
        let anchor = anchor_index
            .and_then(|index| located.get(index))
            .map(|waypoint| waypoint.id.clone());
        let anchor_waypoint = anchor_index.map(|index| located.remove(index));

        let mut waypoints = Vec::with_capacity(located.len() + stop_waypoints.len() + 2);
        match route_type {
            RouteType::Pickup => {
                waypoints.extend(anchor_waypoint);
                waypoints.extend(located);
                waypoints.extend(stop_waypoints);
                waypoints.push(school_waypoint);
            }
            RouteType::Dropoff => {
                waypoints.push(school_waypoint);
                waypoints.extend(stop_waypoints);
                waypoints.extend(located);
                waypoints.extend(anchor_waypoint);
            }
            RouteType::Mixed => {
                waypoints.push(school_waypoint);
                waypoints.extend(stop_waypoints);
                waypoints.extend(located);
            }
        }

        Self {
            route_type,
            waypoints,
            anchor,
            skipped_students,
            skipped_stops,
        }
    }

    /// Direction policy the path was built for.
    pub const fn route_type(&self) -> RouteType {
        self.route_type
    }

    /// Every waypoint in submission order.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Number of waypoints.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Whether the path has no waypoints. Never true for built paths, which
    /// always contain the school.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Waypoints the optimizer may reorder: all but the first and last.
    pub fn middle(&self) -> &[Waypoint] {
        match self.waypoints.len() {
            0..=2 => &[],
            len => self.waypoints.get(1..len - 1).unwrap_or(&[]),
        }
    }

    /// The furthest-from-school student fixed at the far end, if any.
    pub fn anchor_student_id(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    /// Number of student waypoints.
    pub fn student_count(&self) -> usize {
        self.waypoints
            .iter()
            .filter(|waypoint| waypoint.kind == WaypointKind::Student)
            .count()
    }

    /// Students excluded for unusable coordinates.
    pub fn skipped_students(&self) -> &[String] {
        &self.skipped_students
    }

    /// Stops excluded for unusable coordinates.
    pub fn skipped_stops(&self) -> &[String] {
        &self.skipped_stops
    }

    /// Provider representation: `lat,lon` pairs joined by `:`.
    pub fn coord_string(&self) -> String {
        self.waypoints
            .iter()
            .map(|waypoint| format!("{},{}", waypoint.position.lat(), waypoint.position.lon()))
            .collect::<Vec<_>>()
            .join(":")
    }
}

/// Index of the waypoint furthest from `school`; the earliest wins ties.
fn furthest_index(school: GeoPoint, waypoints: &[Waypoint]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, waypoint) in waypoints.iter().enumerate() {
        let distance = distance_meters(school, waypoint.position);
        if best.is_none_or(|(_, best_distance)| distance > best_distance) {
            best = Some((index, distance));
        }
    }
    best.map(|(index, _)| index)
}
