//! Metadata validation shared by the operation entry points.
//!
//! Every check runs before any kernel, so failed calls leave their output
//! buffers untouched.

use spheremap_grid::{Device, Grid, GridAllocator, InterpWeights, SampleMap};

use crate::error::OpsError;

pub(crate) fn check_contiguous<T, A: GridAllocator>(
    grid: &Grid<T, A>,
    name: &'static str,
) -> Result<(), OpsError> {
    if !grid.is_contiguous() {
        return Err(OpsError::NonContiguous(name));
    }
    Ok(())
}

pub(crate) fn check_colocated(devices: &[Device]) -> Result<(), OpsError> {
    let first = devices[0];
    for &device in &devices[1..] {
        if device != first {
            return Err(OpsError::DeviceMismatch(first, device));
        }
    }
    Ok(())
}

/// Resampling reads exactly one slot per output cell.
pub(crate) fn check_single_slot<A: GridAllocator>(map: &SampleMap<A>) -> Result<(), OpsError> {
    if map.kernel_size() != 1 {
        return Err(OpsError::MapArityMismatch {
            kernel_size: map.kernel_size(),
            interp_pts: map.interp_pts(),
        });
    }
    Ok(())
}

/// Unweighted operations read exactly one interpolation point per slot.
pub(crate) fn check_single_point<A: GridAllocator>(map: &SampleMap<A>) -> Result<(), OpsError> {
    if map.interp_pts() != 1 {
        return Err(OpsError::MapArityMismatch {
            kernel_size: map.kernel_size(),
            interp_pts: map.interp_pts(),
        });
    }
    Ok(())
}

pub(crate) fn check_weights<A: GridAllocator>(
    map: &SampleMap<A>,
    weights: &InterpWeights<A>,
) -> Result<(), OpsError> {
    if !weights.matches(map) {
        return Err(OpsError::WeightsMismatch);
    }
    Ok(())
}

/// The buffer sits on the output side of the map.
pub(crate) fn check_out_geometry<T, A: GridAllocator>(
    map: &SampleMap<A>,
    grid: &Grid<T, A>,
) -> Result<(), OpsError> {
    if map.out_size() != grid.size() {
        return Err(OpsError::OutputSizeMismatch {
            map: map.out_size(),
            buffer: grid.size(),
        });
    }
    Ok(())
}

/// The buffer sits on the source side of the map.
pub(crate) fn check_src_geometry<T, A: GridAllocator>(
    map: &SampleMap<A>,
    grid: &Grid<T, A>,
) -> Result<(), OpsError> {
    if map.src_size() != grid.size() {
        return Err(OpsError::SourceSizeMismatch {
            map: map.src_size(),
            buffer: grid.size(),
        });
    }
    Ok(())
}

pub(crate) fn check_channels(lhs: usize, rhs: usize) -> Result<(), OpsError> {
    if lhs != rhs {
        return Err(OpsError::ChannelMismatch(lhs, rhs));
    }
    Ok(())
}
