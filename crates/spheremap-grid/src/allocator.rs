use std::alloc;
use std::alloc::Layout;

use thiserror::Error;

use crate::device::Device;

/// An error type for grid allocator operations.
#[derive(Debug, Error, PartialEq)]
pub enum GridAllocatorError {
    /// An error occurred while computing the memory layout.
    #[error("Invalid grid layout {0}")]
    LayoutError(core::alloc::LayoutError),

    /// The allocator returned a null pointer.
    #[error("Null pointer")]
    NullPointer,
}

/// A trait for allocating and deallocating grid memory on a device.
///
/// Allocator handles are cheap values carried by every grid; they must be
/// thread-safe because grids are shared across worker threads.
///
/// # Methods
///
/// * `alloc` - Allocates memory for a grid with the given layout.
/// * `dealloc` - Deallocates memory for a grid with the given layout.
/// * `device` - Reports where allocations from this handle live.
pub trait GridAllocator: Clone + Send + Sync + 'static {
    /// Allocates memory for a grid with the given layout.
    fn alloc(&self, layout: Layout) -> Result<*mut u8, GridAllocatorError>;

    /// Deallocates memory for a grid with the given layout.
    fn dealloc(&self, ptr: *mut u8, layout: Layout);

    /// Returns the device where this allocator places memory.
    fn device(&self) -> Device;
}

/// A grid allocator that uses the system allocator.
#[derive(Clone)]
pub struct CpuAllocator;

impl Default for CpuAllocator {
    fn default() -> Self {
        Self
    }
}

impl GridAllocator for CpuAllocator {
    /// Allocates memory for a grid with the given layout.
    ///
    /// # Arguments
    ///
    /// * `layout` - The layout of the grid buffer.
    ///
    /// # Returns
    ///
    /// A non-null pointer to the allocated memory if successful, otherwise an error.
    fn alloc(&self, layout: Layout) -> Result<*mut u8, GridAllocatorError> {
        let ptr = unsafe { alloc::alloc(layout) };
        if ptr.is_null() {
            Err(GridAllocatorError::NullPointer)?
        }
        Ok(ptr)
    }

    /// Deallocates memory for a grid with the given layout.
    ///
    /// # Arguments
    ///
    /// * `ptr` - A non-null pointer to the allocated memory.
    /// * `layout` - The layout used for the allocation.
    #[allow(clippy::not_unsafe_ptr_arg_deref)]
    fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if !ptr.is_null() {
            unsafe { alloc::dealloc(ptr, layout) }
        }
    }

    fn device(&self) -> Device {
        Device::Cpu
    }
}
