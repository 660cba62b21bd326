//! Index-based working set shared by the strategies.
//!
//! Strategies assign candidate indices to per-bus member lists and only
//! materialise [`Cluster`] values at the end, so no student is cloned or
//! aliased while an algorithm is running.

use geo::{Centroid, Coord, MultiPoint, Point};
use log::warn;
use schoolbus_core::{Bus, Cluster, Clustering, GeoPoint, Located, Student, distance_meters};

/// A student with a validated position.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate<'a> {
    pub(crate) student: &'a Student,
    pub(crate) position: GeoPoint,
}

/// Validated students addressed by index.
#[derive(Debug)]
pub(crate) struct Arena<'a> {
    candidates: Vec<Candidate<'a>>,
    rejected: Vec<String>,
}

impl<'a> Arena<'a> {
    /// Validate `students`; unusable ones are set aside for the unassigned
    /// list.
    pub(crate) fn new(students: &'a [Student]) -> Self {
        let mut candidates = Vec::with_capacity(students.len());
        let mut rejected = Vec::new();
        for student in students {
            match student.position() {
                Ok(position) => candidates.push(Candidate { student, position }),
                Err(err) => {
                    warn!("student {} not clustered: {err}", student.id);
                    rejected.push(student.id.clone());
                }
            }
        }
        Self {
            candidates,
            rejected,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.candidates.len()
    }

    pub(crate) fn position(&self, index: usize) -> Option<GeoPoint> {
        self.candidates.get(index).map(|candidate| candidate.position)
    }

    pub(crate) fn positions(&self) -> impl Iterator<Item = GeoPoint> + '_ {
        self.candidates.iter().map(|candidate| candidate.position)
    }

    /// Candidate indices ordered nearest-to-`from` first; input order
    /// breaks ties.
    pub(crate) fn nearest_first(&self, from: impl Into<Coord<f64>>) -> Vec<usize> {
        let origin = from.into();
        let mut keyed: Vec<(f64, usize)> = self
            .candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| (distance_meters(origin, candidate.position), index))
            .collect();
        keyed.sort_by(|lhs, rhs| lhs.0.total_cmp(&rhs.0).then(lhs.1.cmp(&rhs.1)));
        keyed.into_iter().map(|(_, index)| index).collect()
    }

    /// Distance from candidate `index` to `target`; unknown indices are
    /// infinitely far.
    pub(crate) fn distance_to(&self, index: usize, target: impl Into<Coord<f64>>) -> f64 {
        self.position(index)
            .map_or(f64::INFINITY, |position| distance_meters(position, target))
    }

    /// Mean latitude/longitude of the given members.
    pub(crate) fn centroid(&self, members: &[usize]) -> Option<Coord<f64>> {
        let points: MultiPoint<f64> = members
            .iter()
            .filter_map(|&index| self.position(index))
            .map(|position| Point::from(position.coord()))
            .collect();
        points.centroid().map(|point| point.0)
    }

    /// Turn per-bus member lists into clusters.
    ///
    /// `members` is indexed like `buses`. Every candidate not listed in any
    /// member list is reported unassigned after the rejected students, in
    /// candidate order.
    pub(crate) fn finish(self, buses: &[Bus], members: Vec<Vec<usize>>) -> Clustering {
        let mut placed = vec![false; self.candidates.len()];
        let mut clusters: Vec<Cluster> = buses.iter().map(Cluster::for_bus).collect();
        for (cluster, indices) in clusters.iter_mut().zip(members) {
            for index in indices {
                let Some(candidate) = self.candidates.get(index) else {
                    continue;
                };
                if let Some(slot) = placed.get_mut(index).filter(|slot| !**slot) {
                    *slot = true;
                    cluster.students.push(candidate.student.clone());
                }
            }
        }
        let mut unassigned = self.rejected;
        unassigned.extend(
            self.candidates
                .iter()
                .zip(&placed)
                .filter(|(_, was_placed)| !**was_placed)
                .map(|(candidate, _)| candidate.student.id.clone()),
        );
        Clustering {
            clusters,
            unassigned,
        }
    }
}

/// Seats per bus as collection lengths.
pub(crate) fn seats(buses: &[Bus]) -> Vec<usize> {
    buses.iter().map(Bus::seats).collect()
}

/// Convert a count to `f64` without a lossy cast.
pub(crate) fn count_f64(count: usize) -> f64 {
    u32::try_from(count).map_or(f64::from(u32::MAX), f64::from)
}
