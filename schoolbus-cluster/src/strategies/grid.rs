//! Bounding-box grid bucketing.

use geo::{BoundingRect, Coord, MultiPoint, Point, Rect};
use log::debug;
use schoolbus_core::{Bus, Clustering, ClusteringStrategy, GeoPoint, StrategyKind, Student};

use crate::arena::{Arena, count_f64, seats};

/// Split the students' bounding box into a `g × g` grid, with
/// `g = ceil(sqrt(bus count))`, and hand whole cells to buses.
///
/// Cells are dealt to buses most-populated first, cycling through the fleet.
/// A cell larger than its bus's remaining seats is truncated; the excess is
/// then offered to whichever bus with room sits closest on average to the
/// student, or nearest the school when the bus is still empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct GridStrategy;

/// Grid dimension for `bus_count` buses.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the dimension is a small positive integer computed via sqrt"
)]
fn grid_dimension(bus_count: usize) -> usize {
    (count_f64(bus_count).sqrt().ceil() as usize).max(1)
}

/// Column or row of `value` within `[min, min + span]` split into `cells`.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "bucketing maps a clamped fraction onto a small cell index"
)]
fn cell_of(value: f64, min: f64, span: f64, cells: usize) -> usize {
    if span <= 0.0 {
        return 0;
    }
    let fraction = ((value - min) / span).clamp(0.0, 1.0);
    ((fraction * count_f64(cells)).floor() as usize).min(cells.saturating_sub(1))
}

fn bounds(arena: &Arena<'_>) -> Option<Rect<f64>> {
    let points: MultiPoint<f64> = arena
        .positions()
        .map(|position| Point::from(position.coord()))
        .collect();
    points.bounding_rect()
}

/// Candidate indices per non-empty cell, most populated first. Equal
/// populations keep row-major cell order.
fn populated_cells(arena: &Arena<'_>, dimension: usize) -> Vec<Vec<usize>> {
    let Some(rect) = bounds(arena) else {
        return Vec::new();
    };
    let min: Coord<f64> = rect.min();
    let mut cells: Vec<Vec<usize>> = vec![Vec::new(); dimension.saturating_mul(dimension)];
    for (index, position) in arena.positions().enumerate() {
        let column = cell_of(position.lon(), min.x, rect.width(), dimension);
        let row = cell_of(position.lat(), min.y, rect.height(), dimension);
        if let Some(cell) = cells.get_mut(row.saturating_mul(dimension).saturating_add(column)) {
            cell.push(index);
        }
    }
    cells.retain(|cell| !cell.is_empty());
    cells.sort_by(|lhs, rhs| rhs.len().cmp(&lhs.len()));
    cells
}

#[expect(
    clippy::float_arithmetic,
    reason = "averages great-circle distances over current members"
)]
fn mean_distance(arena: &Arena<'_>, index: usize, members: &[usize], school: GeoPoint) -> f64 {
    let Some(position) = arena.position(index) else {
        return f64::INFINITY;
    };
    if members.is_empty() {
        return arena.distance_to(index, school);
    }
    let total: f64 = members
        .iter()
        .map(|&member| arena.distance_to(member, position))
        .sum();
    total / count_f64(members.len())
}

impl ClusteringStrategy for GridStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Grid
    }

    fn cluster(&self, school: GeoPoint, students: &[Student], buses: &[Bus]) -> Clustering {
        let arena = Arena::new(students);
        let capacities = seats(buses);
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); buses.len()];
        let dimension = grid_dimension(buses.len());
        let cells = populated_cells(&arena, dimension);
        let cell_count = cells.len();

        let mut leftovers = Vec::new();
        let mut dealt = 0;
        for (cell, bus) in cells.into_iter().zip((0..buses.len()).cycle()) {
            dealt += 1;
            let (Some(list), Some(&capacity)) = (members.get_mut(bus), capacities.get(bus)) else {
                leftovers.extend(cell);
                continue;
            };
            let room = capacity.saturating_sub(list.len());
            let mut pending = cell.into_iter();
            list.extend(pending.by_ref().take(room));
            leftovers.extend(pending);
        }

        for index in leftovers {
            let best = members
                .iter()
                .zip(&capacities)
                .enumerate()
                .filter(|(_, (list, capacity))| list.len() < **capacity)
                .map(|(bus, (list, _))| (bus, mean_distance(&arena, index, list, school)))
                .min_by(|lhs, rhs| lhs.1.total_cmp(&rhs.1).then(lhs.0.cmp(&rhs.0)));
            if let Some(list) = best.and_then(|(bus, _)| members.get_mut(bus)) {
                list.push(index);
            }
        }

        let clustering = arena.finish(buses, members);
        debug!(
            "grid {dimension}x{dimension}: {dealt}/{cell_count} cells, {} placed, {} unassigned",
            clustering.assigned_count(),
            clustering.unassigned.len()
        );
        clustering
    }
}
