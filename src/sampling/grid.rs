//! The spatial hash grid: one bucket per occupied cell, recording where the cell's candidates
//! start in the sorted candidate array and which of them (if any) has been accepted.

use crate::sampling::candidates::Candidate;
use crate::sampling::cell::{CellBuildHasher, CellCoord, PHASE_COUNT};
use std::collections::HashMap;

/// The state of a single occupied grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub cell: CellCoord,

    /// Index of the cell's first candidate in the sorted candidate array.
    pub start: usize,

    /// Number of candidates in the cell's run.
    pub len: usize,

    /// The index of the accepted candidate. At most one sample is accepted per cell.
    pub accepted: Option<usize>,
}

impl Bucket {
    /// The candidate index tried in the given trial, if the cell's run is that long.
    pub fn trial_index(&self, trial: usize) -> Option<usize> {
        (trial < self.len).then_some(self.start + trial)
    }
}

#[derive(Debug, Clone)]
pub struct SpatialHashGrid {
    buckets: Vec<Bucket>,
    lookup: HashMap<CellCoord, usize, CellBuildHasher>,
    phases: Vec<Vec<usize>>,
    max_run: usize,
}

impl SpatialHashGrid {
    /// Build the grid from candidates which have already been sorted by cell. A new bucket is
    /// opened wherever a candidate's cell differs from the one before it.
    pub fn build(sorted: &[Candidate]) -> Self {
        let mut buckets: Vec<Bucket> = Vec::new();
        for (i, c) in sorted.iter().enumerate() {
            match buckets.last_mut() {
                Some(b) if b.cell == c.cell => b.len += 1,
                _ => buckets.push(Bucket {
                    cell: c.cell,
                    start: i,
                    len: 1,
                    accepted: None,
                }),
            }
        }

        let mut lookup = HashMap::with_capacity_and_hasher(2 * buckets.len(), Default::default());
        let mut phases = vec![Vec::new(); PHASE_COUNT];
        for (i, b) in buckets.iter().enumerate() {
            lookup.insert(b.cell, i);
            phases[b.cell.phase()].push(i);
        }

        let max_run = buckets.iter().map(|b| b.len).max().unwrap_or(0);

        Self {
            buckets,
            lookup,
            phases,
            max_run,
        }
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket_at(&self, cell: &CellCoord) -> Option<&Bucket> {
        self.lookup.get(cell).map(|&i| &self.buckets[i])
    }

    /// The indices of the buckets belonging to one of the 27 phase groups.
    pub fn phase_group(&self, phase: usize) -> &[usize] {
        &self.phases[phase]
    }

    /// The length of the longest run of candidates in any one cell. Trials beyond this can no
    /// longer find an untried candidate.
    pub fn max_run(&self) -> usize {
        self.max_run
    }

    /// Record `candidate` as the accepted sample of a bucket. Returns false, leaving the bucket
    /// unchanged, if it already holds a sample.
    pub fn accept(&mut self, bucket: usize, candidate: usize) -> bool {
        let b = &mut self.buckets[bucket];
        if b.accepted.is_some() {
            return false;
        }
        b.accepted = Some(candidate);
        true
    }

    pub fn accepted_count(&self) -> usize {
        self.buckets.iter().filter(|b| b.accepted.is_some()).count()
    }
}
