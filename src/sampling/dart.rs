//! The phase-colored, multi-trial acceptance loop.

use crate::sampling::candidates::Candidate;
use crate::sampling::cell::PHASE_COUNT;
use crate::sampling::grid::SpatialHashGrid;
use crate::sampling::oracle::NeighborOracle;
use rayon::prelude::*;
use tracing::trace;

/// Throw darts at the grid and return the indices of the accepted candidates, in acceptance order.
///
/// In trial `t` every bucket which is still empty tries its `t`-th candidate. Trials run one after
/// the other and within a trial the 27 phase groups run one after the other; only the buckets of
/// a single phase group are checked in parallel. Buckets of one phase group are at least three
/// cells apart, beyond the two-cell reach of the oracle, so none of them can see a sample accepted
/// by another during the same step. The accepted candidates of a step are committed to the grid
/// together once the parallel check has finished.
///
/// Buckets that are still empty after the last trial contribute no sample. Trials past the longest
/// run of candidates in any one bucket have nothing left to try and are skipped.
///
/// # Arguments
///
/// * `candidates`: the cell-sorted candidates the grid and oracle were built from
/// * `grid`: the grid, which receives the accepted candidates
/// * `oracle`: the conflict check
/// * `num_trials`: the maximum number of candidates tried per bucket
///
/// returns: Vec<usize>
pub fn throw_darts(
    candidates: &[Candidate],
    grid: &mut SpatialHashGrid,
    oracle: &NeighborOracle,
    num_trials: usize,
) -> Vec<usize> {
    let trials = num_trials.min(grid.max_run());
    let mut accepted = Vec::new();

    for trial in 0..trials {
        let before = accepted.len();
        for phase in 0..PHASE_COUNT {
            let picks = phase_picks(candidates, grid, oracle, trial, phase);
            for (bucket, index) in picks {
                if grid.accept(bucket, index) {
                    accepted.push(index);
                }
            }
        }
        trace!(trial, accepted = accepted.len() - before, "finished trial");
    }

    accepted
}

/// The (bucket, candidate) pairs of one phase group whose candidate for this trial is free of
/// conflicts.
fn phase_picks(
    candidates: &[Candidate],
    grid: &SpatialHashGrid,
    oracle: &NeighborOracle,
    trial: usize,
    phase: usize,
) -> Vec<(usize, usize)> {
    let buckets = grid.buckets();
    grid.phase_group(phase)
        .par_iter()
        .filter_map(|&b| {
            let bucket = &buckets[b];
            if bucket.accepted.is_some() {
                return None;
            }
            let index = bucket.trial_index(trial)?;
            (!oracle.conflicts(&candidates[index], grid)).then_some((b, index))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point3;
    use crate::common::points::dist;
    use crate::sampling::cell::CellQuantizer;
    use crate::sampling::oracle::Metric;
    use crate::sampling::sorter::{assign_cells, sort_by_cell};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn plane_candidates(n: usize, seed: u64, min_radius: f64) -> Vec<Candidate> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut candidates: Vec<Candidate> = (0..n)
            .map(|_| {
                let p = Point3::new(rng.random::<f64>(), rng.random::<f64>(), 0.0);
                Candidate::new(p, None)
            })
            .collect();
        let q = CellQuantizer::for_min_radius(Point3::origin(), min_radius);
        assign_cells(&mut candidates, &q).unwrap();
        sort_by_cell(&mut candidates);
        candidates
    }

    fn run(candidates: &[Candidate], min_radius: f64, trials: usize) -> (Vec<usize>, SpatialHashGrid) {
        let mut grid = SpatialHashGrid::build(candidates);
        let oracle = NeighborOracle::new(candidates, min_radius, Metric::Euclidean);
        let accepted = throw_darts(candidates, &mut grid, &oracle, trials);
        (accepted, grid)
    }

    #[test]
    fn accepted_samples_keep_their_distance() {
        let candidates = plane_candidates(3000, 7, 0.05);
        let (accepted, _) = run(&candidates, 0.05, 20);
        assert!(!accepted.is_empty());

        for (i, &a) in accepted.iter().enumerate() {
            for &b in &accepted[i + 1..] {
                let d = dist(&candidates[a].position, &candidates[b].position);
                assert!(d >= 0.05, "{} and {} are {} apart", a, b, d);
            }
        }
    }

    #[test]
    fn at_most_one_sample_per_cell() {
        let candidates = plane_candidates(3000, 8, 0.05);
        let (accepted, grid) = run(&candidates, 0.05, 20);

        let cells: HashSet<_> = accepted.iter().map(|&i| candidates[i].cell).collect();
        assert_eq!(cells.len(), accepted.len());
        assert_eq!(grid.accepted_count(), accepted.len());

        let unique: HashSet<_> = accepted.iter().collect();
        assert_eq!(unique.len(), accepted.len());
    }

    #[test]
    fn more_trials_never_remove_samples() {
        let candidates = plane_candidates(3000, 9, 0.05);
        let (one, _) = run(&candidates, 0.05, 1);
        let (many, _) = run(&candidates, 0.05, 30);
        assert!(many.len() >= one.len());

        // Trial 0 is identical in both runs
        let many: HashSet<_> = many.into_iter().collect();
        assert!(one.iter().all(|i| many.contains(i)));
    }

    #[test]
    fn trials_are_capped_by_the_longest_run() {
        let candidates = plane_candidates(500, 10, 0.2);
        let (a, _) = run(&candidates, 0.2, 1_000_000);
        let grid = SpatialHashGrid::build(&candidates);
        let (b, _) = run(&candidates, 0.2, grid.max_run());
        assert_eq!(a, b);
    }

    #[test]
    fn no_trials_no_samples() {
        let candidates = plane_candidates(100, 11, 0.1);
        let (accepted, grid) = run(&candidates, 0.1, 0);
        assert!(accepted.is_empty());
        assert_eq!(grid.accepted_count(), 0);
    }

    #[test]
    fn same_input_same_result() {
        let candidates = plane_candidates(4000, 12, 0.03);
        let (a, _) = run(&candidates, 0.03, 10);
        let (b, _) = run(&candidates, 0.03, 10);
        assert_eq!(a, b);
    }
}
