//! Assigns grid cells to candidates and orders them so that each cell's candidates form one
//! contiguous run.

use crate::errors::SamplingError;
use crate::sampling::candidates::Candidate;
use crate::sampling::cell::CellQuantizer;
use rayon::prelude::*;

/// Fill in the cell of every candidate. Fails if any candidate falls outside the range the
/// quantizer can represent.
pub fn assign_cells(
    candidates: &mut [Candidate],
    quantizer: &CellQuantizer,
) -> Result<(), SamplingError> {
    candidates.par_iter_mut().try_for_each(|c| {
        c.cell = quantizer.cell_of(&c.position)?;
        Ok(())
    })
}

/// Sort the candidates lexicographically by cell. The sort is stable, so sorting an already
/// sorted slice leaves it untouched.
pub fn sort_by_cell(candidates: &mut [Candidate]) {
    candidates.par_sort_by_key(|c| c.cell);
}

pub fn is_cell_sorted(candidates: &[Candidate]) -> bool {
    candidates.windows(2).all(|w| w[0].cell <= w[1].cell)
}
