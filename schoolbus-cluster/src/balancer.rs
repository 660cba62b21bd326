//! Capacity repair passes over finished clusters.
//!
//! Both passes only ever move students out of clusters that exceed their
//! capacity and into clusters with a free seat, so each move strictly
//! reduces the total overflow and the loops terminate.

use geo::Coord;
use log::debug;
use schoolbus_core::{Cluster, Located, Student, distance_meters};

/// Move students between nearby clusters until neither side of a close
/// pair is over capacity while the other has room.
///
/// `centers` is indexed like `clusters`; pairs whose centres lie within
/// `radius_meters` of each other are considered, in index order. From an
/// overfull cluster the member closest to the neighbour's centre moves
/// first. Returns the number of students moved.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use schoolbus_cluster::balance_clusters;
/// use schoolbus_core::{Cluster, Student};
///
/// let mut clusters = vec![
///     Cluster {
///         bus_id: "b1".into(),
///         capacity: 1,
///         students: vec![Student::new("a", 37.980, 23.730), Student::new("b", 37.981, 23.734)],
///     },
///     Cluster { bus_id: "b2".into(), capacity: 2, students: Vec::new() },
/// ];
/// let centers = [Coord { x: 23.730, y: 37.980 }, Coord { x: 23.735, y: 37.981 }];
///
/// assert_eq!(balance_clusters(&mut clusters, &centers, 1_000.0), 1);
/// assert_eq!(clusters[1].students[0].id, "b");
/// ```
pub fn balance_clusters(
    clusters: &mut [Cluster],
    centers: &[Coord<f64>],
    radius_meters: f64,
) -> usize {
    let mut moved = 0;
    let count = clusters.len().min(centers.len());
    for first in 0..count {
        for second in (first + 1)..count {
            let (Some(&a), Some(&b)) = (centers.get(first), centers.get(second)) else {
                continue;
            };
            if distance_meters(a, b) > radius_meters {
                continue;
            }
            moved += drain_towards(clusters, first, second, b);
            moved += drain_towards(clusters, second, first, a);
        }
    }
    if moved > 0 {
        debug!("balancer moved {moved} students between neighbouring clusters");
    }
    moved
}

/// Move members of `from` closest to `target_center` into `to` while `from`
/// is over capacity and `to` has room.
fn drain_towards(
    clusters: &mut [Cluster],
    from: usize,
    to: usize,
    target_center: Coord<f64>,
) -> usize {
    let mut moved = 0;
    while needs_move(clusters, from, to) {
        let Some(source) = clusters.get_mut(from) else {
            break;
        };
        let Some(student) = take_closest(&mut source.students, target_center) else {
            break;
        };
        let Some(target) = clusters.get_mut(to) else {
            break;
        };
        target.students.push(student);
        moved += 1;
    }
    moved
}

fn needs_move(clusters: &[Cluster], from: usize, to: usize) -> bool {
    let over = clusters.get(from).is_some_and(Cluster::is_over_capacity);
    let room = clusters.get(to).is_some_and(|cluster| cluster.remaining() > 0);
    over && room
}

/// Remove and return the student nearest `target`; unlocated students sort
/// last and earlier members win ties.
fn take_closest(students: &mut Vec<Student>, target: Coord<f64>) -> Option<Student> {
    let distance = |student: &Student| {
        student
            .position()
            .map_or(f64::INFINITY, |position| distance_meters(position, target))
    };
    let index = students
        .iter()
        .enumerate()
        .min_by(|(lhs_index, lhs), (rhs_index, rhs)| {
            distance(lhs)
                .total_cmp(&distance(rhs))
                .then(lhs_index.cmp(rhs_index))
        })
        .map(|(index, _)| index)?;
    Some(students.remove(index))
}

/// Smooth overflow between consecutive clusters.
///
/// For each pair `(i, i + 1)`: while `i` is over capacity and `i + 1` has
/// room, the last student of `i` moves to the front of `i + 1`; then, while
/// `i + 1` is over capacity and `i` has room, the first student of `i + 1`
/// moves to the end of `i`. Returns the number of students moved.
///
/// # Examples
///
/// ```
/// use schoolbus_cluster::rebalance_adjacent;
/// use schoolbus_core::{Cluster, Student};
///
/// let student = |id: &str| Student::new(id, 37.99, 23.74);
/// let mut clusters = vec![
///     Cluster { bus_id: "b1".into(), capacity: 1, students: vec![student("a"), student("b")] },
///     Cluster { bus_id: "b2".into(), capacity: 2, students: vec![student("c")] },
/// ];
///
/// assert_eq!(rebalance_adjacent(&mut clusters), 1);
/// let ids: Vec<&str> = clusters[1].student_ids().collect();
/// assert_eq!(ids, ["b", "c"]);
/// ```
pub fn rebalance_adjacent(clusters: &mut [Cluster]) -> usize {
    let mut moved = 0;
    for left_index in 0..clusters.len().saturating_sub(1) {
        let Some((left, right)) = adjacent_pair(clusters, left_index) else {
            continue;
        };
        while left.is_over_capacity() && right.remaining() > 0 {
            let Some(student) = left.students.pop() else {
                break;
            };
            right.students.insert(0, student);
            moved += 1;
        }
        while right.is_over_capacity() && left.remaining() > 0 && !right.students.is_empty() {
            left.students.push(right.students.remove(0));
            moved += 1;
        }
    }
    moved
}

fn adjacent_pair(clusters: &mut [Cluster], index: usize) -> Option<(&mut Cluster, &mut Cluster)> {
    let (_, tail) = clusters.split_at_mut_checked(index)?;
    match tail {
        [left, right, ..] => Some((left, right)),
        _ => None,
    }
}
