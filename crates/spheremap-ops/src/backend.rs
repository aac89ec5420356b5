//! Kernel routing for the mapped operations.
//!
//! The operation entry points validate metadata (shapes, arity, layout,
//! colocation) and then hand the work to the allocator through
//! [`ComputeBackend`]. The crate implements the trait for [`CpuAllocator`];
//! accelerator allocators implement it out of tree and get routed the same
//! way, statically, with no boxing.

use spheremap_grid::{CpuAllocator, Grid, GridAllocator, IdxMask, InterpWeights, SampleMap};

use crate::cpu;
use crate::error::OpsError;
use crate::interpolation::InterpolationMode;

/// Executes the mapped kernels for grids allocated through `Self`.
///
/// All operands arrive validated: contiguous, colocated and shape-checked
/// against the map geometry. Backends remain responsible for data-dependent
/// validation; in particular the pool backward methods must reject index
/// masks holding entries outside `[0, kernel_size]` with
/// [`OpsError::InvalidPoolIndex`] before writing any output.
pub trait ComputeBackend: GridAllocator {
    /// Resamples `src` into `dst` through a one-slot map.
    fn resample_to_map(
        &self,
        src: &Grid<f32, Self>,
        map: &SampleMap<Self>,
        dst: &mut Grid<f32, Self>,
        interpolation: InterpolationMode,
    ) -> Result<(), OpsError>;

    /// Scatters `grad_output` back through a one-slot map into `grad_input`.
    fn resample_from_map(
        &self,
        grad_output: &Grid<f32, Self>,
        map: &SampleMap<Self>,
        grad_input: &mut Grid<f32, Self>,
        interpolation: InterpolationMode,
    ) -> Result<(), OpsError>;

    /// Resamples `src` into `dst` combining map points with table weights.
    fn weighted_resample_to_map(
        &self,
        src: &Grid<f32, Self>,
        map: &SampleMap<Self>,
        weights: &InterpWeights<Self>,
        dst: &mut Grid<f32, Self>,
        interpolation: InterpolationMode,
    ) -> Result<(), OpsError>;

    /// Scatters `grad_output` back through a weighted map into `grad_input`.
    fn weighted_resample_from_map(
        &self,
        grad_output: &Grid<f32, Self>,
        map: &SampleMap<Self>,
        weights: &InterpWeights<Self>,
        grad_input: &mut Grid<f32, Self>,
        interpolation: InterpolationMode,
    ) -> Result<(), OpsError>;

    /// Max-pools `src` over the mapped candidate slots.
    fn mapped_max_pool(
        &self,
        src: &Grid<f32, Self>,
        map: &SampleMap<Self>,
        dst: &mut Grid<f32, Self>,
        mask: &mut IdxMask<Self>,
        interpolation: InterpolationMode,
    ) -> Result<(), OpsError>;

    /// Routes `grad_output` through the recorded winning slots.
    fn mapped_max_pool_backward(
        &self,
        grad_output: &Grid<f32, Self>,
        mask: &IdxMask<Self>,
        map: &SampleMap<Self>,
        grad_input: &mut Grid<f32, Self>,
        interpolation: InterpolationMode,
    ) -> Result<(), OpsError>;

    /// Max-pools `src` over weighted candidate slots.
    fn weighted_mapped_max_pool(
        &self,
        src: &Grid<f32, Self>,
        map: &SampleMap<Self>,
        weights: &InterpWeights<Self>,
        dst: &mut Grid<f32, Self>,
        mask: &mut IdxMask<Self>,
        interpolation: InterpolationMode,
    ) -> Result<(), OpsError>;

    /// Routes `grad_output` through the recorded weighted winning slots.
    fn weighted_mapped_max_pool_backward(
        &self,
        grad_output: &Grid<f32, Self>,
        mask: &IdxMask<Self>,
        map: &SampleMap<Self>,
        weights: &InterpWeights<Self>,
        grad_input: &mut Grid<f32, Self>,
        interpolation: InterpolationMode,
    ) -> Result<(), OpsError>;
}

fn check_mask_range(mask: &IdxMask<CpuAllocator>, kernel_size: usize) -> Result<(), OpsError> {
    let sentinel = kernel_size as i64;
    for &index in mask.as_slice() {
        if index < 0 || index > sentinel {
            return Err(OpsError::InvalidPoolIndex { index, kernel_size });
        }
    }
    Ok(())
}

impl ComputeBackend for CpuAllocator {
    fn resample_to_map(
        &self,
        src: &Grid<f32, Self>,
        map: &SampleMap<Self>,
        dst: &mut Grid<f32, Self>,
        interpolation: InterpolationMode,
    ) -> Result<(), OpsError> {
        cpu::resample::resample_to_map(src, map, None, dst, interpolation);
        Ok(())
    }

    fn resample_from_map(
        &self,
        grad_output: &Grid<f32, Self>,
        map: &SampleMap<Self>,
        grad_input: &mut Grid<f32, Self>,
        interpolation: InterpolationMode,
    ) -> Result<(), OpsError> {
        cpu::resample::resample_from_map(grad_output, map, None, grad_input, interpolation);
        Ok(())
    }

    fn weighted_resample_to_map(
        &self,
        src: &Grid<f32, Self>,
        map: &SampleMap<Self>,
        weights: &InterpWeights<Self>,
        dst: &mut Grid<f32, Self>,
        interpolation: InterpolationMode,
    ) -> Result<(), OpsError> {
        cpu::resample::resample_to_map(src, map, Some(weights), dst, interpolation);
        Ok(())
    }

    fn weighted_resample_from_map(
        &self,
        grad_output: &Grid<f32, Self>,
        map: &SampleMap<Self>,
        weights: &InterpWeights<Self>,
        grad_input: &mut Grid<f32, Self>,
        interpolation: InterpolationMode,
    ) -> Result<(), OpsError> {
        cpu::resample::resample_from_map(
            grad_output,
            map,
            Some(weights),
            grad_input,
            interpolation,
        );
        Ok(())
    }

    fn mapped_max_pool(
        &self,
        src: &Grid<f32, Self>,
        map: &SampleMap<Self>,
        dst: &mut Grid<f32, Self>,
        mask: &mut IdxMask<Self>,
        interpolation: InterpolationMode,
    ) -> Result<(), OpsError> {
        cpu::pool::mapped_max_pool(src, map, None, dst, mask, interpolation);
        Ok(())
    }

    fn mapped_max_pool_backward(
        &self,
        grad_output: &Grid<f32, Self>,
        mask: &IdxMask<Self>,
        map: &SampleMap<Self>,
        grad_input: &mut Grid<f32, Self>,
        interpolation: InterpolationMode,
    ) -> Result<(), OpsError> {
        check_mask_range(mask, map.kernel_size())?;
        cpu::pool::mapped_max_pool_backward(
            grad_output,
            mask,
            map,
            None,
            grad_input,
            interpolation,
        );
        Ok(())
    }

    fn weighted_mapped_max_pool(
        &self,
        src: &Grid<f32, Self>,
        map: &SampleMap<Self>,
        weights: &InterpWeights<Self>,
        dst: &mut Grid<f32, Self>,
        mask: &mut IdxMask<Self>,
        interpolation: InterpolationMode,
    ) -> Result<(), OpsError> {
        cpu::pool::mapped_max_pool(src, map, Some(weights), dst, mask, interpolation);
        Ok(())
    }

    fn weighted_mapped_max_pool_backward(
        &self,
        grad_output: &Grid<f32, Self>,
        mask: &IdxMask<Self>,
        map: &SampleMap<Self>,
        weights: &InterpWeights<Self>,
        grad_input: &mut Grid<f32, Self>,
        interpolation: InterpolationMode,
    ) -> Result<(), OpsError> {
        check_mask_range(mask, map.kernel_size())?;
        cpu::pool::mapped_max_pool_backward(
            grad_output,
            mask,
            map,
            Some(weights),
            grad_input,
            interpolation,
        );
        Ok(())
    }
}
