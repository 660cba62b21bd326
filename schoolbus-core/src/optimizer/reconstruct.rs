//! Rebuild a [`Route`] from a submitted path and the provider's answer.

use crate::{Bus, Route, RouteSegment, Waypoint, WaypointPath};

use super::error::OptimizeError;
use super::provider::{OptimizedPath, WaypointReorder};

/// Reconstruct the final route for `bus`.
///
/// The first and last waypoints of `path` stay where they are. The middle is
/// permuted according to `response.reordering`, whose indices are relative
/// to the middle; an empty reordering keeps the submitted order. One segment
/// is built per consecutive pair of final waypoints from the matching leg.
///
/// # Errors
///
/// Returns [`OptimizeError::EmptyInput`] for paths with fewer than two
/// waypoints, and [`OptimizeError::MalformedResponse`] when the reordering is
/// not a permutation of the middle or the leg count does not match.
///
/// # Examples
///
/// ```
/// use schoolbus_core::{
///     Bus, GeoPoint, LegSummary, OptimizedPath, RouteType, Student, WaypointPath,
///     WaypointReorder, reconstruct_route,
/// };
///
/// let school = GeoPoint::new(37.98, 23.73)?;
/// let students = vec![
///     Student::new("far", 38.05, 23.80),
///     Student::new("a", 37.99, 23.74),
///     Student::new("b", 38.00, 23.75),
/// ];
/// let path = WaypointPath::build(school, &students, &[], RouteType::Pickup);
/// let leg = LegSummary { distance_meters: 1_000.0, duration_seconds: 60.0 };
/// let response = OptimizedPath {
///     legs: vec![leg; 3],
///     reordering: vec![
///         WaypointReorder { original_index: 0, optimized_index: 1 },
///         WaypointReorder { original_index: 1, optimized_index: 0 },
///     ],
/// };
///
/// let route = reconstruct_route(&Bus::new("b1", 4), &path, &response)?;
/// assert_eq!(route.student_ids_ordered, ["far", "b", "a"]);
/// assert_eq!(route.total_distance_meters, 3_000.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn reconstruct_route(
    bus: &Bus,
    path: &WaypointPath,
    response: &OptimizedPath,
) -> Result<Route, OptimizeError> {
    let (first, rest) = path
        .waypoints()
        .split_first()
        .ok_or(OptimizeError::EmptyInput)?;
    let (last, middle) = rest.split_last().ok_or(OptimizeError::EmptyInput)?;

    let mut ordered = Vec::with_capacity(path.len());
    ordered.push(first.clone());
    ordered.extend(reorder_middle(middle, &response.reordering)?);
    ordered.push(last.clone());

    let expected_legs = ordered.len() - 1;
    if response.legs.len() != expected_legs {
        return Err(OptimizeError::MalformedResponse {
            message: format!(
                "expected {expected_legs} legs for {} waypoints, got {}",
                ordered.len(),
                response.legs.len()
            ),
        });
    }

    let segments = ordered
        .windows(2)
        .zip(&response.legs)
        .filter_map(|(pair, leg)| match pair {
            [from, to] => Some(RouteSegment {
                from: from.clone(),
                to: to.clone(),
                distance_meters: leg.distance_meters,
                duration_seconds: leg.duration_seconds,
            }),
            _ => None,
        })
        .collect();

    Ok(Route::from_segments(bus.id.clone(), ordered, segments).with_bus_name(bus.name.clone()))
}

/// Apply a middle-relative reordering, validating that it is a permutation.
fn reorder_middle(
    middle: &[Waypoint],
    reordering: &[WaypointReorder],
) -> Result<Vec<Waypoint>, OptimizeError> {
    if reordering.is_empty() {
        return Ok(middle.to_vec());
    }
    if reordering.len() != middle.len() {
        return Err(OptimizeError::MalformedResponse {
            message: format!(
                "reordering covers {} waypoints but {} are reorderable",
                reordering.len(),
                middle.len()
            ),
        });
    }

    let mut seen_original = vec![false; middle.len()];
    let mut seen_optimized = vec![false; middle.len()];
    for entry in reordering {
        let original = seen_original.get_mut(entry.original_index);
        let optimized = seen_optimized.get_mut(entry.optimized_index);
        match (original, optimized) {
            (Some(original), Some(optimized)) if !*original && !*optimized => {
                *original = true;
                *optimized = true;
            }
            _ => {
                return Err(OptimizeError::MalformedResponse {
                    message: format!(
                        "reordering entry {} -> {} is out of range or repeated",
                        entry.original_index, entry.optimized_index
                    ),
                });
            }
        }
    }

    let mut sorted: Vec<&WaypointReorder> = reordering.iter().collect();
    sorted.sort_by_key(|entry| entry.optimized_index);
    Ok(sorted
        .into_iter()
        .filter_map(|entry| middle.get(entry.original_index).cloned())
        .collect())
}
