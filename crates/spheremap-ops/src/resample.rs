//! Mapped resampling, forward and backward.

use spheremap_grid::{Grid, InterpWeights, SampleMap};

use crate::backend::ComputeBackend;
use crate::check;
use crate::error::OpsError;
use crate::interpolation::InterpolationMode;

/// Resamples a grid through a sample map.
///
/// Every output cell reads the source at its mapped coordinate with the
/// requested interpolation; coordinates outside the source read as zero.
/// The map must hold one slot with one point per cell.
///
/// # Arguments
///
/// * `src` - The source grid with shape (H, W, C).
/// * `map` - The sample map with output geometry matching `dst` and source
///   geometry matching `src`.
/// * `dst` - The output grid with shape (OH, OW, C), fully overwritten.
/// * `interpolation` - The interpolation mode to use.
///
/// # Errors
///
/// Fails before any compute if an operand is not contiguous, the operands
/// are not colocated, the map arity is not 1x1, or the geometries disagree.
///
/// # Examples
///
/// ```
/// use spheremap_grid::{CpuAllocator, Grid, GridSize, SampleMap};
/// use spheremap_ops::{resample_to_map, InterpolationMode};
///
/// let size = GridSize {
///     width: 3,
///     height: 2,
/// };
/// let src = Grid::from_size_fn(size, 1, CpuAllocator, |y, x, _| (y * 3 + x) as f32).unwrap();
/// let map = SampleMap::identity(size, CpuAllocator).unwrap();
/// let mut dst = Grid::from_size_val(size, 1, 0.0f32, CpuAllocator).unwrap();
///
/// resample_to_map(&src, &map, &mut dst, InterpolationMode::Nearest).unwrap();
///
/// assert_eq!(dst.as_slice(), src.as_slice());
/// ```
pub fn resample_to_map<A: ComputeBackend>(
    src: &Grid<f32, A>,
    map: &SampleMap<A>,
    dst: &mut Grid<f32, A>,
    interpolation: InterpolationMode,
) -> Result<(), OpsError> {
    check::check_contiguous(src, "src")?;
    check::check_contiguous(dst, "dst")?;
    check::check_colocated(&[src.device(), dst.device(), map.device()])?;
    check::check_single_slot(map)?;
    check::check_single_point(map)?;
    check::check_out_geometry(map, dst)?;
    check::check_src_geometry(map, src)?;
    check::check_channels(src.channels(), dst.channels())?;

    let backend = dst.alloc().clone();
    backend.resample_to_map(src, map, dst, interpolation)
}

/// Scatters an upstream gradient back through a sample map, the adjoint of
/// [`resample_to_map`].
///
/// Each output cell's gradient is routed to the source cells its forward
/// read touched, with the same interpolation weights; source cells read by
/// several output cells accumulate. `grad_input` is fully overwritten with
/// the freshly accumulated field.
///
/// # Arguments
///
/// * `grad_output` - The upstream gradient with shape (OH, OW, C).
/// * `map` - The sample map used in the forward pass.
/// * `grad_input` - The output gradient with shape (H, W, C).
/// * `interpolation` - The interpolation mode used in the forward pass.
///
/// # Errors
///
/// Same preconditions as [`resample_to_map`].
pub fn resample_from_map<A: ComputeBackend>(
    grad_output: &Grid<f32, A>,
    map: &SampleMap<A>,
    grad_input: &mut Grid<f32, A>,
    interpolation: InterpolationMode,
) -> Result<(), OpsError> {
    check::check_contiguous(grad_output, "grad_output")?;
    check::check_contiguous(grad_input, "grad_input")?;
    check::check_colocated(&[grad_output.device(), grad_input.device(), map.device()])?;
    check::check_single_slot(map)?;
    check::check_single_point(map)?;
    check::check_out_geometry(map, grad_output)?;
    check::check_src_geometry(map, grad_input)?;
    check::check_channels(grad_output.channels(), grad_input.channels())?;

    let backend = grad_input.alloc().clone();
    backend.resample_from_map(grad_output, map, grad_input, interpolation)
}

/// Resamples a grid through a sample map with explicit interpolation
/// weights.
///
/// Each output cell combines the map's interpolation points: bilinear mode
/// sums every point scaled by its table weight, nearest mode copies the
/// point with the highest table weight. The map must hold one slot per
/// cell; the weight table must share the map geometry.
///
/// # Errors
///
/// Same preconditions as [`resample_to_map`] plus the weight table
/// geometry check.
pub fn weighted_resample_to_map<A: ComputeBackend>(
    src: &Grid<f32, A>,
    map: &SampleMap<A>,
    weights: &InterpWeights<A>,
    dst: &mut Grid<f32, A>,
    interpolation: InterpolationMode,
) -> Result<(), OpsError> {
    check::check_contiguous(src, "src")?;
    check::check_contiguous(dst, "dst")?;
    check::check_colocated(&[
        src.device(),
        dst.device(),
        map.device(),
        weights.device(),
    ])?;
    check::check_single_slot(map)?;
    check::check_weights(map, weights)?;
    check::check_out_geometry(map, dst)?;
    check::check_src_geometry(map, src)?;
    check::check_channels(src.channels(), dst.channels())?;

    let backend = dst.alloc().clone();
    backend.weighted_resample_to_map(src, map, weights, dst, interpolation)
}

/// Scatters an upstream gradient back through a weighted map, the adjoint
/// of [`weighted_resample_to_map`].
///
/// # Errors
///
/// Same preconditions as [`weighted_resample_to_map`].
pub fn weighted_resample_from_map<A: ComputeBackend>(
    grad_output: &Grid<f32, A>,
    map: &SampleMap<A>,
    weights: &InterpWeights<A>,
    grad_input: &mut Grid<f32, A>,
    interpolation: InterpolationMode,
) -> Result<(), OpsError> {
    check::check_contiguous(grad_output, "grad_output")?;
    check::check_contiguous(grad_input, "grad_input")?;
    check::check_colocated(&[
        grad_output.device(),
        grad_input.device(),
        map.device(),
        weights.device(),
    ])?;
    check::check_single_slot(map)?;
    check::check_weights(map, weights)?;
    check::check_out_geometry(map, grad_output)?;
    check::check_src_geometry(map, grad_input)?;
    check::check_channels(grad_output.channels(), grad_input.channels())?;

    let backend = grad_input.alloc().clone();
    backend.weighted_resample_from_map(grad_output, map, weights, grad_input, interpolation)
}
