//! Optimised bus routes.

use crate::{Waypoint, WaypointKind};

/// One leg between consecutive waypoints.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RouteSegment {
    /// Leg origin.
    pub from: Waypoint,
    /// Leg destination.
    pub to: Waypoint,
    /// Road distance reported by the provider.
    pub distance_meters: f64,
    /// Travel time reported by the provider.
    pub duration_seconds: f64,
}

/// The final, ordered route for one bus.
///
/// # Examples
/// ```
/// use schoolbus_core::{GeoPoint, Route, RouteSegment, Waypoint, WaypointKind};
///
/// let home = Waypoint::new(WaypointKind::Student, "s1", GeoPoint::new(38.0, 23.7)?);
/// let school = Waypoint::new(WaypointKind::School, "school", GeoPoint::new(37.98, 23.73)?);
/// let segment = RouteSegment {
///     from: home.clone(),
///     to: school.clone(),
///     distance_meters: 3_200.0,
///     duration_seconds: 420.0,
/// };
/// let route = Route::from_segments("b1", vec![home, school], vec![segment]);
///
/// assert_eq!(route.student_ids_ordered, ["s1"]);
/// assert_eq!(route.total_distance_meters, 3_200.0);
/// # Ok::<(), schoolbus_core::CoordinateError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Route {
    /// Bus serving the route.
    pub bus_id: String,
    /// Display name of that bus.
    pub bus_name: String,
    /// Students in visiting order.
    pub student_ids_ordered: Vec<String>,
    /// Intermediate stops in visiting order.
    pub stops_ordered: Vec<String>,
    /// Full visiting sequence including the school.
    pub waypoints: Vec<Waypoint>,
    /// Legs between consecutive waypoints.
    pub segments: Vec<RouteSegment>,
    /// Sum of leg distances.
    pub total_distance_meters: f64,
    /// Sum of leg durations.
    pub total_duration_seconds: f64,
}

impl Route {
    /// Derive the per-kind orderings and totals from a waypoint sequence and
    /// its legs.
    pub fn from_segments(
        bus_id: impl Into<String>,
        waypoints: Vec<Waypoint>,
        segments: Vec<RouteSegment>,
    ) -> Self {
        let ids_of = |kind: WaypointKind| -> Vec<String> {
            waypoints
                .iter()
                .filter(|waypoint| waypoint.kind == kind)
                .map(|waypoint| waypoint.id.clone())
                .collect()
        };
        let student_ids_ordered = ids_of(WaypointKind::Student);
        let stops_ordered = ids_of(WaypointKind::Stop);
        let total_distance_meters = segments.iter().map(|s| s.distance_meters).sum();
        let total_duration_seconds = segments.iter().map(|s| s.duration_seconds).sum();
        Self {
            bus_id: bus_id.into(),
            bus_name: String::new(),
            student_ids_ordered,
            stops_ordered,
            waypoints,
            segments,
            total_distance_meters,
            total_duration_seconds,
        }
    }

    /// Set the display name of the bus.
    #[must_use]
    pub fn with_bus_name(mut self, name: impl Into<String>) -> Self {
        self.bus_name = name.into();
        self
    }
}
