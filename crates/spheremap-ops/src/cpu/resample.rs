use spheremap_grid::{Grid, GridAllocator, InterpWeights, SampleMap};

use crate::interpolation::{visit_slot, InterpolationMode};
use crate::parallel;

/// Gathers every output cell from its mapped source location.
///
/// Cells whose slot has no in-bounds taps are written as zero; `dst` is
/// fully overwritten.
pub(crate) fn resample_to_map<A: GridAllocator>(
    src: &Grid<f32, A>,
    map: &SampleMap<A>,
    weights: Option<&InterpWeights<A>>,
    dst: &mut Grid<f32, A>,
    interpolation: InterpolationMode,
) {
    let channels = dst.channels();
    let out_cols = dst.cols();
    let row_len = out_cols * channels;
    let src_cols = src.cols();
    let src_data = src.as_slice();

    parallel::par_rows(dst.as_mut_slice(), row_len, |oh, dst_row| {
        for ow in 0..out_cols {
            let cell = &mut dst_row[ow * channels..(ow + 1) * channels];
            cell.fill(0.0);
            visit_slot(map, weights, oh, ow, 0, interpolation, |row, col, w| {
                let base = (row * src_cols + col) * channels;
                for (ch, value) in cell.iter_mut().enumerate() {
                    *value += w * src_data[base + ch];
                }
            });
        }
    });
}

/// Scatters upstream gradients back through the map, the adjoint of
/// [`resample_to_map`].
///
/// `grad_input` is overwritten with the accumulated field; slots sharing a
/// source cell sum their contributions.
pub(crate) fn resample_from_map<A: GridAllocator>(
    grad_output: &Grid<f32, A>,
    map: &SampleMap<A>,
    weights: Option<&InterpWeights<A>>,
    grad_input: &mut Grid<f32, A>,
    interpolation: InterpolationMode,
) {
    let channels = grad_output.channels();
    let out_cols = grad_output.cols();
    let src_cols = grad_input.cols();
    let grad_data = grad_output.as_slice();

    let acc = parallel::par_scatter_rows(
        grad_output.rows(),
        grad_input.numel(),
        |oh, acc| {
            for ow in 0..out_cols {
                let base_out = (oh * out_cols + ow) * channels;
                visit_slot(map, weights, oh, ow, 0, interpolation, |row, col, w| {
                    let base = (row * src_cols + col) * channels;
                    for ch in 0..channels {
                        acc[base + ch] += w * grad_data[base_out + ch];
                    }
                });
            }
        },
    );
    grad_input.as_mut_slice().copy_from_slice(&acc);
}
