use spheremap_grid::{Grid, GridAllocator, IdxMask, InterpWeights, SampleMap};

use crate::interpolation::{visit_slot, InterpolationMode};
use crate::parallel;

/// Takes the per-channel maximum over the mapped candidate slots.
///
/// `dst` receives the winning values and `mask` the winning slot indices.
/// Slots without in-bounds taps never compete; cells where every slot is
/// out of bounds keep value zero and the sentinel index `kernel_size`.
/// The first slot reaching the maximum wins ties.
pub(crate) fn mapped_max_pool<A: GridAllocator>(
    src: &Grid<f32, A>,
    map: &SampleMap<A>,
    weights: Option<&InterpWeights<A>>,
    dst: &mut Grid<f32, A>,
    mask: &mut IdxMask<A>,
    interpolation: InterpolationMode,
) {
    let channels = dst.channels();
    let out_cols = dst.cols();
    let row_len = out_cols * channels;
    let src_cols = src.cols();
    let src_data = src.as_slice();
    let kernel_size = map.kernel_size();
    let sentinel = kernel_size as i64;

    let (dst_data, mask_data) = (dst.as_mut_slice(), mask.as_mut_slice());
    parallel::par_rows_with_mask(dst_data, mask_data, row_len, |oh, dst_row, mask_row| {
        // slot taps are channel independent, collect them once per slot
        let mut taps: Vec<(usize, usize, f32)> = Vec::new();
        for ow in 0..out_cols {
            let cell = &mut dst_row[ow * channels..(ow + 1) * channels];
            let mask_cell = &mut mask_row[ow * channels..(ow + 1) * channels];
            cell.fill(0.0);
            mask_cell.fill(sentinel);
            for k in 0..kernel_size {
                taps.clear();
                visit_slot(map, weights, oh, ow, k, interpolation, |row, col, w| {
                    taps.push((row, col, w));
                });
                if taps.is_empty() {
                    continue;
                }
                for ch in 0..channels {
                    let mut value = 0.0f32;
                    for &(row, col, w) in taps.iter() {
                        value += w * src_data[(row * src_cols + col) * channels + ch];
                    }
                    if mask_cell[ch] == sentinel || value > cell[ch] {
                        cell[ch] = value;
                        mask_cell[ch] = k as i64;
                    }
                }
            }
        }
    });
}

/// Routes upstream gradients through the recorded winning slots, the
/// adjoint of [`mapped_max_pool`] at the recorded argmax.
///
/// Sentinel entries route nothing. `grad_input` is overwritten with the
/// accumulated field.
pub(crate) fn mapped_max_pool_backward<A: GridAllocator>(
    grad_output: &Grid<f32, A>,
    mask: &IdxMask<A>,
    map: &SampleMap<A>,
    weights: Option<&InterpWeights<A>>,
    grad_input: &mut Grid<f32, A>,
    interpolation: InterpolationMode,
) {
    let channels = grad_output.channels();
    let out_cols = grad_output.cols();
    let src_cols = grad_input.cols();
    let grad_data = grad_output.as_slice();
    let mask_data = mask.as_slice();
    let sentinel = map.kernel_size() as i64;

    let acc = parallel::par_scatter_rows(
        grad_output.rows(),
        grad_input.numel(),
        |oh, acc| {
            for ow in 0..out_cols {
                let base_out = (oh * out_cols + ow) * channels;
                for ch in 0..channels {
                    let slot = mask_data[base_out + ch];
                    if slot == sentinel {
                        continue;
                    }
                    let upstream = grad_data[base_out + ch];
                    visit_slot(
                        map,
                        weights,
                        oh,
                        ow,
                        slot as usize,
                        interpolation,
                        |row, col, w| {
                            acc[(row * src_cols + col) * channels + ch] += w * upstream;
                        },
                    );
                }
            }
        },
    );
    grad_input.as_mut_slice().copy_from_slice(&acc);
}
