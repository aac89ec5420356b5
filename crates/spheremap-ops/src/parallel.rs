//! Row-parallel execution helpers shared by the mapped kernels.
//!
//! Forward passes split the output into disjoint row slices so every worker
//! writes its own region. Backward passes scatter into overlapping targets,
//! so they accumulate into per-worker buffers that are reduced elementwise
//! at the end; sums may reassociate between runs but no write is ever lost.

use rayon::prelude::*;

/// Runs `f(row_index, row_slice)` over the rows of a contiguous buffer.
pub(crate) fn par_rows<F>(dst: &mut [f32], row_len: usize, f: F)
where
    F: Fn(usize, &mut [f32]) + Send + Sync,
{
    if row_len == 0 {
        return;
    }
    dst.par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(|(row, chunk)| f(row, chunk));
}

/// Runs `f(row_index, value_row, index_row)` over paired value/index rows.
pub(crate) fn par_rows_with_mask<F>(dst: &mut [f32], mask: &mut [i64], row_len: usize, f: F)
where
    F: Fn(usize, &mut [f32], &mut [i64]) + Send + Sync,
{
    if row_len == 0 {
        return;
    }
    dst.par_chunks_exact_mut(row_len)
        .zip(mask.par_chunks_exact_mut(row_len))
        .enumerate()
        .for_each(|(row, (chunk, mask_chunk))| f(row, chunk, mask_chunk));
}

/// Accumulates `rows` scatter tasks into a zeroed buffer of `out_len`.
///
/// Each worker folds its tasks into a private buffer; the buffers are then
/// added together, so concurrent tasks never write the same memory.
pub(crate) fn par_scatter_rows<F>(rows: usize, out_len: usize, f: F) -> Vec<f32>
where
    F: Fn(usize, &mut [f32]) + Send + Sync,
{
    (0..rows)
        .into_par_iter()
        .fold(
            || vec![0.0f32; out_len],
            |mut acc, row| {
                f(row, &mut acc);
                acc
            },
        )
        .reduce(
            || vec![0.0f32; out_len],
            |mut lhs, rhs| {
                lhs.iter_mut().zip(rhs.iter()).for_each(|(l, r)| *l += r);
                lhs
            },
        )
}
