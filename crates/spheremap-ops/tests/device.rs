//! Device screening without hardware: a stub allocator reports an
//! accelerator device while holding plain host memory, which is enough to
//! drive every colocation path in the dispatch layer.

use std::alloc::{self, Layout};

use spheremap_grid::{
    Device, Grid, GridAllocator, GridAllocatorError, GridSize, IdxMask, InterpWeights, SampleMap,
};
use spheremap_ops::{
    mapped_max_pool, resample_to_map, weighted_resample_to_map, ComputeBackend, InterpolationMode,
    OpsError,
};

const SIZE: GridSize = GridSize {
    width: 4,
    height: 3,
};

/// Host memory masquerading as accelerator memory.
#[derive(Clone)]
struct StubAccel {
    device_id: usize,
}

impl GridAllocator for StubAccel {
    fn alloc(&self, layout: Layout) -> Result<*mut u8, GridAllocatorError> {
        let ptr = unsafe { alloc::alloc(layout) };
        if ptr.is_null() {
            Err(GridAllocatorError::NullPointer)?
        }
        Ok(ptr)
    }

    fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if !ptr.is_null() {
            unsafe { alloc::dealloc(ptr, layout) }
        }
    }

    fn device(&self) -> Device {
        Device::cuda(self.device_id)
    }
}

/// Dispatch must reject mixed devices before reaching any kernel, so none
/// of these bodies can ever run.
impl ComputeBackend for StubAccel {
    fn resample_to_map(
        &self,
        _src: &Grid<f32, Self>,
        _map: &SampleMap<Self>,
        _dst: &mut Grid<f32, Self>,
        _interpolation: InterpolationMode,
    ) -> Result<(), OpsError> {
        unreachable!("stub backend has no kernels")
    }

    fn resample_from_map(
        &self,
        _grad_output: &Grid<f32, Self>,
        _map: &SampleMap<Self>,
        _grad_input: &mut Grid<f32, Self>,
        _interpolation: InterpolationMode,
    ) -> Result<(), OpsError> {
        unreachable!("stub backend has no kernels")
    }

    fn weighted_resample_to_map(
        &self,
        _src: &Grid<f32, Self>,
        _map: &SampleMap<Self>,
        _weights: &InterpWeights<Self>,
        _dst: &mut Grid<f32, Self>,
        _interpolation: InterpolationMode,
    ) -> Result<(), OpsError> {
        unreachable!("stub backend has no kernels")
    }

    fn weighted_resample_from_map(
        &self,
        _grad_output: &Grid<f32, Self>,
        _map: &SampleMap<Self>,
        _weights: &InterpWeights<Self>,
        _grad_input: &mut Grid<f32, Self>,
        _interpolation: InterpolationMode,
    ) -> Result<(), OpsError> {
        unreachable!("stub backend has no kernels")
    }

    fn mapped_max_pool(
        &self,
        _src: &Grid<f32, Self>,
        _map: &SampleMap<Self>,
        _dst: &mut Grid<f32, Self>,
        _mask: &mut IdxMask<Self>,
        _interpolation: InterpolationMode,
    ) -> Result<(), OpsError> {
        unreachable!("stub backend has no kernels")
    }

    fn mapped_max_pool_backward(
        &self,
        _grad_output: &Grid<f32, Self>,
        _mask: &IdxMask<Self>,
        _map: &SampleMap<Self>,
        _grad_input: &mut Grid<f32, Self>,
        _interpolation: InterpolationMode,
    ) -> Result<(), OpsError> {
        unreachable!("stub backend has no kernels")
    }

    fn weighted_mapped_max_pool(
        &self,
        _src: &Grid<f32, Self>,
        _map: &SampleMap<Self>,
        _weights: &InterpWeights<Self>,
        _dst: &mut Grid<f32, Self>,
        _mask: &mut IdxMask<Self>,
        _interpolation: InterpolationMode,
    ) -> Result<(), OpsError> {
        unreachable!("stub backend has no kernels")
    }

    fn weighted_mapped_max_pool_backward(
        &self,
        _grad_output: &Grid<f32, Self>,
        _mask: &IdxMask<Self>,
        _map: &SampleMap<Self>,
        _weights: &InterpWeights<Self>,
        _grad_input: &mut Grid<f32, Self>,
        _interpolation: InterpolationMode,
    ) -> Result<(), OpsError> {
        unreachable!("stub backend has no kernels")
    }
}

fn stub(device_id: usize) -> StubAccel {
    StubAccel { device_id }
}

#[test]
fn stub_grid_reports_accelerator_device() -> Result<(), Box<dyn std::error::Error>> {
    let grid = Grid::from_size_val(SIZE, 1, 0.0f32, stub(1))?;
    assert_eq!(grid.device(), Device::cuda(1));
    assert!(grid.device().is_gpu());
    assert!(!grid.device().is_cpu());
    Ok(())
}

#[test]
fn rejects_map_on_another_device() -> Result<(), Box<dyn std::error::Error>> {
    let src = Grid::from_size_val(SIZE, 1, 0.0f32, stub(0))?;
    let mut dst = Grid::from_size_val(SIZE, 1, 0.0f32, stub(0))?;
    let map = SampleMap::from_fn(SIZE, SIZE, 1, 1, stub(1), |_, _, _, _| (0.0, 0.0))?;

    let result = resample_to_map(&src, &map, &mut dst, InterpolationMode::Nearest);
    assert!(matches!(
        result,
        Err(OpsError::DeviceMismatch(found, offender))
            if found == Device::cuda(0) && offender == Device::cuda(1)
    ));
    Ok(())
}

#[test]
fn rejects_weights_on_another_device() -> Result<(), Box<dyn std::error::Error>> {
    let src = Grid::from_size_val(SIZE, 1, 0.0f32, stub(0))?;
    let mut dst = Grid::from_size_val(SIZE, 1, 0.0f32, stub(0))?;
    let map = SampleMap::from_fn(SIZE, SIZE, 1, 2, stub(0), |_, _, _, _| (0.0, 0.0))?;
    let weights = InterpWeights::from_fn(SIZE, 1, 2, stub(1), |_, _, _, _| 1.0)?;

    let result =
        weighted_resample_to_map(&src, &map, &weights, &mut dst, InterpolationMode::Bilinear);
    assert!(matches!(result, Err(OpsError::DeviceMismatch(_, offender))
            if offender == Device::cuda(1)));
    Ok(())
}

#[test]
fn rejects_mask_on_another_device() -> Result<(), Box<dyn std::error::Error>> {
    let src = Grid::from_size_val(SIZE, 1, 0.0f32, stub(0))?;
    let mut dst = Grid::from_size_val(SIZE, 1, 0.0f32, stub(0))?;
    let mut mask = IdxMask::from_size_val(SIZE, 1, 0, stub(1))?;
    let map = SampleMap::from_fn(SIZE, SIZE, 2, 1, stub(0), |_, _, _, _| (0.0, 0.0))?;

    let result = mapped_max_pool(&src, &map, &mut dst, &mut mask, InterpolationMode::Nearest);
    assert!(matches!(result, Err(OpsError::DeviceMismatch(_, offender))
            if offender == Device::cuda(1)));
    Ok(())
}

#[test]
fn contiguity_screens_before_devices() -> Result<(), Box<dyn std::error::Error>> {
    let src = Grid::from_size_val(SIZE, 2, 0.0f32, stub(0))?.permuted([1, 0, 2]);
    let mut dst = Grid::from_size_val(SIZE, 2, 0.0f32, stub(0))?;
    let map = SampleMap::from_fn(SIZE, SIZE, 1, 1, stub(1), |_, _, _, _| (0.0, 0.0))?;

    // both screens would fire; the contiguity one comes first
    let result = resample_to_map(&src, &map, &mut dst, InterpolationMode::Nearest);
    assert!(matches!(result, Err(OpsError::NonContiguous("src"))));
    Ok(())
}

#[test]
#[should_panic(expected = "cannot view device storage as a host slice")]
fn device_storage_blocks_host_views() {
    let grid = Grid::from_size_val(SIZE, 1, 0.0f32, stub(0)).unwrap();
    let _ = grid.as_slice();
}
