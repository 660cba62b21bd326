//! Input screening shared by every planning mode.

use std::collections::HashSet;

use log::warn;
use schoolbus_core::{Bus, Located, Stop, Student, UnassignedReason, UnassignedStudent};

/// Students split by coordinate validity, with duplicates removed.
#[derive(Debug, Default)]
pub(crate) struct Roster {
    /// Students with usable coordinates, in input order.
    pub(crate) valid: Vec<Student>,
    /// Ids of students with unusable coordinates, in input order.
    pub(crate) invalid: Vec<String>,
    /// Every distinct id, in input order.
    pub(crate) ids: Vec<String>,
}

impl Roster {
    /// Screen `students`, keeping the first occurrence of each id.
    pub(crate) fn screen<'a>(students: impl IntoIterator<Item = &'a Student>) -> Self {
        let mut seen = HashSet::new();
        let mut roster = Self::default();
        for student in students {
            if !seen.insert(student.id.as_str()) {
                warn!("dropping duplicate student id {}", student.id);
                continue;
            }
            roster.ids.push(student.id.clone());
            match student.position() {
                Ok(_) => roster.valid.push(student.clone()),
                Err(err) => {
                    warn!("excluding student {} from planning: {err}", student.id);
                    roster.invalid.push(student.id.clone());
                }
            }
        }
        roster
    }

    /// Unassigned entries for the students with unusable coordinates.
    pub(crate) fn invalid_entries(&self) -> Vec<UnassignedStudent> {
        self.invalid
            .iter()
            .map(|id| UnassignedStudent::new(id.clone(), UnassignedReason::InvalidCoordinates))
            .collect()
    }

    /// Unassigned entries for a refused request: invalid students keep
    /// their own reason, everyone else is marked as rejected.
    pub(crate) fn rejected_entries(&self) -> Vec<UnassignedStudent> {
        let invalid: HashSet<&str> = self.invalid.iter().map(String::as_str).collect();
        self.ids
            .iter()
            .map(|id| {
                let reason = if invalid.contains(id.as_str()) {
                    UnassignedReason::InvalidCoordinates
                } else {
                    UnassignedReason::PlanRejected
                };
                UnassignedStudent::new(id.clone(), reason)
            })
            .collect()
    }
}

/// Buses with a positive capacity, in input order.
pub(crate) fn active_buses(buses: &[Bus]) -> Vec<Bus> {
    buses
        .iter()
        .filter(|bus| {
            if !bus.is_active() {
                warn!("skipping bus {} with zero capacity", bus.id);
            }
            bus.is_active()
        })
        .cloned()
        .collect()
}

/// Warn once per stop that every path will leave out.
pub(crate) fn report_unusable_stops(stops: &[Stop]) {
    for stop in stops {
        if let Err(err) = stop.position() {
            warn!("skipping stop {}: {err}", stop.id);
        }
    }
}
