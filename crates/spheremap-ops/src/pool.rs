//! Mapped max pooling, forward and backward.

use spheremap_grid::{Grid, IdxMask, InterpWeights, SampleMap};

use crate::backend::ComputeBackend;
use crate::check;
use crate::error::OpsError;
use crate::interpolation::InterpolationMode;

/// Returns the mask value marking a cell where no slot produced an
/// in-bounds sample.
///
/// Valid slot indices are `0..kernel_size`, so the kernel size itself is
/// free to act as the sentinel.
#[inline]
pub fn idx_sentinel(kernel_size: usize) -> i64 {
    kernel_size as i64
}

/// Takes the per-channel maximum over each output cell's mapped neighbor
/// slots.
///
/// Every slot is sampled at its mapped coordinate with the requested
/// interpolation; `dst` receives the winning value and `mask` the winning
/// slot index, per channel. Slots whose coordinates fall outside the
/// source never compete; a cell where every slot is out of bounds gets
/// value zero and the sentinel index [`idx_sentinel`]. Ties go to the
/// lowest slot index. The map must hold one interpolation point per slot.
///
/// # Arguments
///
/// * `src` - The source grid with shape (H, W, C).
/// * `map` - The sample map with `kernel_size` slots per output cell.
/// * `dst` - The output grid with shape (OH, OW, C), fully overwritten.
/// * `mask` - The winning slot indices with shape (OH, OW, C), fully
///   overwritten.
/// * `interpolation` - The interpolation mode to use.
///
/// # Errors
///
/// Fails before any compute if an operand is not contiguous, the operands
/// are not colocated, the map holds more than one interpolation point per
/// slot, or the geometries disagree.
///
/// # Examples
///
/// ```
/// use spheremap_grid::{CpuAllocator, Grid, GridSize, IdxMask, SampleMap};
/// use spheremap_ops::{idx_sentinel, mapped_max_pool, InterpolationMode};
///
/// let src_size = GridSize {
///     width: 2,
///     height: 2,
/// };
/// let src = Grid::new(src_size, 1, vec![1.0f32, 2.0, 3.0, 4.0], CpuAllocator).unwrap();
///
/// let out_size = GridSize {
///     width: 1,
///     height: 1,
/// };
/// // one output cell pooling over all four source cells
/// let map = SampleMap::from_fn(out_size, src_size, 4, 1, CpuAllocator, |_, _, k, _| {
///     ((k % 2) as f32, (k / 2) as f32)
/// })
/// .unwrap();
///
/// let mut dst = Grid::from_size_val(out_size, 1, 0.0f32, CpuAllocator).unwrap();
/// let mut mask = IdxMask::from_size_val(out_size, 1, idx_sentinel(4), CpuAllocator).unwrap();
/// mapped_max_pool(&src, &map, &mut dst, &mut mask, InterpolationMode::Nearest).unwrap();
///
/// assert_eq!(dst.as_slice(), &[4.0]);
/// assert_eq!(mask.as_slice(), &[3]);
/// ```
pub fn mapped_max_pool<A: ComputeBackend>(
    src: &Grid<f32, A>,
    map: &SampleMap<A>,
    dst: &mut Grid<f32, A>,
    mask: &mut IdxMask<A>,
    interpolation: InterpolationMode,
) -> Result<(), OpsError> {
    check::check_contiguous(src, "src")?;
    check::check_contiguous(dst, "dst")?;
    check::check_contiguous(mask, "mask")?;
    check::check_colocated(&[src.device(), dst.device(), mask.device(), map.device()])?;
    check::check_single_point(map)?;
    check::check_out_geometry(map, dst)?;
    check::check_out_geometry(map, mask)?;
    check::check_src_geometry(map, src)?;
    check::check_channels(src.channels(), dst.channels())?;
    check::check_channels(dst.channels(), mask.channels())?;

    let backend = dst.alloc().clone();
    backend.mapped_max_pool(src, map, dst, mask, interpolation)
}

/// Routes an upstream gradient through the winning slots recorded by
/// [`mapped_max_pool`].
///
/// Each output cell's gradient flows only to the source cells its winning
/// slot sampled; sentinel entries route nothing. Source cells winning for
/// several output cells accumulate. `grad_input` is fully overwritten.
///
/// # Arguments
///
/// * `grad_output` - The upstream gradient with shape (OH, OW, C).
/// * `mask` - The winning slot indices recorded by the forward pass.
/// * `map` - The sample map used in the forward pass.
/// * `grad_input` - The output gradient with shape (H, W, C).
/// * `interpolation` - The interpolation mode used in the forward pass.
///
/// # Errors
///
/// Same preconditions as [`mapped_max_pool`]. Also fails with
/// [`OpsError::InvalidPoolIndex`] if the mask holds an entry outside
/// `0..=kernel_size`, before anything is written.
pub fn mapped_max_pool_backward<A: ComputeBackend>(
    grad_output: &Grid<f32, A>,
    mask: &IdxMask<A>,
    map: &SampleMap<A>,
    grad_input: &mut Grid<f32, A>,
    interpolation: InterpolationMode,
) -> Result<(), OpsError> {
    check::check_contiguous(grad_output, "grad_output")?;
    check::check_contiguous(mask, "mask")?;
    check::check_contiguous(grad_input, "grad_input")?;
    check::check_colocated(&[
        grad_output.device(),
        mask.device(),
        grad_input.device(),
        map.device(),
    ])?;
    check::check_single_point(map)?;
    check::check_out_geometry(map, grad_output)?;
    check::check_out_geometry(map, mask)?;
    check::check_src_geometry(map, grad_input)?;
    check::check_channels(grad_output.channels(), grad_input.channels())?;
    check::check_channels(grad_output.channels(), mask.channels())?;

    let backend = grad_input.alloc().clone();
    backend.mapped_max_pool_backward(grad_output, mask, map, grad_input, interpolation)
}

/// Takes the per-channel maximum over mapped slots whose samples combine
/// the map's interpolation points with table weights.
///
/// Bilinear mode scores each slot by its weighted point sum; nearest mode
/// scores it by the point with the highest table weight. Winning values
/// and slot indices land in `dst` and `mask` as in [`mapped_max_pool`].
///
/// # Errors
///
/// Same preconditions as [`mapped_max_pool`] plus the weight table
/// geometry check.
pub fn weighted_mapped_max_pool<A: ComputeBackend>(
    src: &Grid<f32, A>,
    map: &SampleMap<A>,
    weights: &InterpWeights<A>,
    dst: &mut Grid<f32, A>,
    mask: &mut IdxMask<A>,
    interpolation: InterpolationMode,
) -> Result<(), OpsError> {
    check::check_contiguous(src, "src")?;
    check::check_contiguous(dst, "dst")?;
    check::check_contiguous(mask, "mask")?;
    check::check_colocated(&[
        src.device(),
        dst.device(),
        mask.device(),
        map.device(),
        weights.device(),
    ])?;
    check::check_weights(map, weights)?;
    check::check_out_geometry(map, dst)?;
    check::check_out_geometry(map, mask)?;
    check::check_src_geometry(map, src)?;
    check::check_channels(src.channels(), dst.channels())?;
    check::check_channels(dst.channels(), mask.channels())?;

    let backend = dst.alloc().clone();
    backend.weighted_mapped_max_pool(src, map, weights, dst, mask, interpolation)
}

/// Routes an upstream gradient through the winning slots recorded by
/// [`weighted_mapped_max_pool`].
///
/// # Errors
///
/// Same preconditions as [`mapped_max_pool_backward`] plus the weight
/// table geometry check.
pub fn weighted_mapped_max_pool_backward<A: ComputeBackend>(
    grad_output: &Grid<f32, A>,
    mask: &IdxMask<A>,
    map: &SampleMap<A>,
    weights: &InterpWeights<A>,
    grad_input: &mut Grid<f32, A>,
    interpolation: InterpolationMode,
) -> Result<(), OpsError> {
    check::check_contiguous(grad_output, "grad_output")?;
    check::check_contiguous(mask, "mask")?;
    check::check_contiguous(grad_input, "grad_input")?;
    check::check_colocated(&[
        grad_output.device(),
        mask.device(),
        grad_input.device(),
        map.device(),
        weights.device(),
    ])?;
    check::check_weights(map, weights)?;
    check::check_out_geometry(map, grad_output)?;
    check::check_out_geometry(map, mask)?;
    check::check_src_geometry(map, grad_input)?;
    check::check_channels(grad_output.channels(), grad_input.channels())?;
    check::check_channels(grad_output.channels(), mask.channels())?;

    let backend = grad_input.alloc().clone();
    backend.weighted_mapped_max_pool_backward(
        grad_output,
        mask,
        map,
        weights,
        grad_input,
        interpolation,
    )
}
