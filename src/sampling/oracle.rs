//! Neighbor search and distance metrics for the dart-throwing conflict check.

use crate::common::points::dist;
use crate::config::DistanceNorm;
use crate::sampling::candidates::Candidate;
use crate::sampling::cell::CellCoord;
use crate::sampling::grid::SpatialHashGrid;
use crate::{Point3, Vector3};
use itertools::iproduct;

/// How many cells away from a candidate's own cell the conflict check looks. With a cell edge of
/// `min_radius / sqrt(3)`, two points closer than `min_radius` are never more than two cells
/// apart along any axis.
pub const SEARCH_RADIUS: i32 = 2;

/// Below this difference between the two normal projections the geodesic correction switches to
/// its limit form.
const FLAT_THRESHOLD: f64 = 1.0e-5;

/// The offsets of the cells at Chebyshev distance exactly `l` from a cell, i.e. the outer shell
/// of the `(2l + 1)^3` block around it.
pub fn shell_offsets(l: i32) -> impl Iterator<Item = (i32, i32, i32)> {
    iproduct!(-l..=l, -l..=l, -l..=l)
        .filter(move |&(x, y, z)| x.abs().max(y.abs()).max(z.abs()) == l)
}

/// Approximate distance along the surface between two points lying on faces with the given unit
/// normals. The straight-line distance is scaled by a finite-difference estimate of how much the
/// surface bends between them, which is never less than one.
///
/// # Arguments
///
/// * `a`, `na`: the first point and the normal of its face
/// * `b`, `nb`: the second point and the normal of its face
///
/// returns: f64
///
/// # Examples
///
/// ```
/// use meshpds::sampling::oracle::geodesic_distance;
/// use meshpds::{Point3, Vector3};
/// let n = Vector3::new(0.0, 0.0, 1.0);
/// let d = geodesic_distance(&Point3::origin(), &n, &Point3::new(3.0, 4.0, 0.0), &n);
/// assert!((d - 5.0).abs() < 1e-12);
/// ```
pub fn geodesic_distance(a: &Point3, na: &Vector3, b: &Point3, nb: &Vector3) -> f64 {
    let euclidean = dist(a, b);
    if euclidean == 0.0 {
        return 0.0;
    }

    let v = (b - a) / euclidean;
    let c1 = na.dot(&v).clamp(-1.0, 1.0);
    let c2 = nb.dot(&v).clamp(-1.0, 1.0);

    if (c1 - c2).abs() > FLAT_THRESHOLD {
        euclidean * (c1.asin() - c2.asin()) / (c1 - c2)
    } else {
        euclidean / (1.0 - c1 * c1).sqrt()
    }
}

/// The distance metric used by an oracle. The geodesic metric borrows the face normals of the
/// mesh the candidates were generated on.
#[derive(Debug, Clone, Copy)]
pub enum Metric<'a> {
    Euclidean,
    Geodesic { normals: &'a [Vector3] },
}

impl<'a> Metric<'a> {
    pub fn new(norm: DistanceNorm, normals: &'a [Vector3]) -> Self {
        match norm {
            DistanceNorm::Euclidean => Metric::Euclidean,
            DistanceNorm::Geodesic => Metric::Geodesic { normals },
        }
    }

    /// The distance between two candidates. Candidates on the same face, or without a face,
    /// are always compared with the Euclidean distance.
    pub fn distance(&self, a: &Candidate, b: &Candidate) -> f64 {
        match (self, a.face, b.face) {
            (Metric::Geodesic { normals }, Some(fa), Some(fb)) if fa != fb => geodesic_distance(
                &a.position,
                &normals[fa as usize],
                &b.position,
                &normals[fb as usize],
            ),
            _ => dist(&a.position, &b.position),
        }
    }
}

/// Answers whether a candidate is too close to any sample already accepted in the grid.
pub struct NeighborOracle<'a> {
    candidates: &'a [Candidate],
    min_radius: f64,
    metric: Metric<'a>,
    offsets: Vec<(i32, i32, i32)>,
}

impl<'a> NeighborOracle<'a> {
    /// # Arguments
    ///
    /// * `candidates`: the cell-sorted candidate array the grid was built from
    /// * `min_radius`: the minimum allowed distance between two samples
    /// * `metric`: the distance metric
    pub fn new(candidates: &'a [Candidate], min_radius: f64, metric: Metric<'a>) -> Self {
        // Own cell first, then outward shell by shell
        let offsets = std::iter::once((0, 0, 0))
            .chain((1..=SEARCH_RADIUS).flat_map(shell_offsets))
            .collect();

        Self {
            candidates,
            min_radius,
            metric,
            offsets,
        }
    }

    pub fn min_radius(&self) -> f64 {
        self.min_radius
    }

    /// The cell offsets visited by the conflict check, in visiting order.
    pub fn offsets(&self) -> &[(i32, i32, i32)] {
        &self.offsets
    }

    /// True if an accepted sample within the search radius lies closer than the minimum radius.
    pub fn conflicts(&self, candidate: &Candidate, grid: &SpatialHashGrid) -> bool {
        self.offsets
            .iter()
            .any(|&o| self.conflicts_in(candidate, &candidate.cell.offset(o), grid))
    }

    fn conflicts_in(&self, candidate: &Candidate, cell: &CellCoord, grid: &SpatialHashGrid) -> bool {
        grid.bucket_at(cell)
            .and_then(|b| b.accepted)
            .is_some_and(|i| self.metric.distance(candidate, &self.candidates[i]) < self.min_radius)
    }
}
