//! Owned, allocator-backed buffers for grid data.

use std::{alloc::Layout, ptr::NonNull};

use crate::allocator::{GridAllocator, GridAllocatorError};
use crate::device::Device;

/// Exclusively owned storage for grid elements.
///
/// Memory is obtained from the allocator at construction and returned to it
/// on drop. Zero-length storage holds a dangling pointer and never touches
/// the allocator.
///
/// # Thread Safety
///
/// `GridStorage` is `Send`/`Sync` when `T` is; mutation requires `&mut self`
/// so shared references never alias writes.
pub struct GridStorage<T, A: GridAllocator> {
    /// The pointer to the buffer, non-null and owned by this storage.
    ptr: NonNull<T>,
    /// Number of elements in the buffer.
    len: usize,
    /// The memory layout used for allocation.
    layout: Layout,
    /// The allocator that produced `ptr` and will reclaim it.
    alloc: A,
}

impl<T, A: GridAllocator> GridStorage<T, A> {
    fn alloc_buffer(len: usize, alloc: &A) -> Result<(NonNull<T>, Layout), GridAllocatorError> {
        let layout = Layout::array::<T>(len).map_err(GridAllocatorError::LayoutError)?;
        if layout.size() == 0 {
            return Ok((NonNull::dangling(), layout));
        }
        let ptr = alloc.alloc(layout)? as *mut T;
        let ptr = NonNull::new(ptr).ok_or(GridAllocatorError::NullPointer)?;
        Ok((ptr, layout))
    }

    /// Creates a new storage by copying the elements of a vector.
    ///
    /// The vector is consumed; its buffer is released after the copy so the
    /// returned storage is owned solely through the allocator.
    pub fn from_vec(value: Vec<T>, alloc: A) -> Result<Self, GridAllocatorError> {
        let (ptr, layout) = Self::alloc_buffer(value.len(), &alloc)?;
        // SAFETY: ptr was just allocated for value.len() elements and the
        // two regions cannot overlap.
        unsafe {
            std::ptr::copy_nonoverlapping(value.as_ptr(), ptr.as_ptr(), value.len());
        }
        Ok(Self {
            ptr,
            len: value.len(),
            layout,
            alloc,
        })
    }

    /// Creates a new storage of `len` copies of `value`.
    pub fn from_val(len: usize, value: T, alloc: A) -> Result<Self, GridAllocatorError>
    where
        T: Clone,
    {
        let (ptr, layout) = Self::alloc_buffer(len, &alloc)?;
        for i in 0..len {
            // SAFETY: i < len and ptr was allocated for len elements.
            unsafe { ptr.as_ptr().add(i).write(value.clone()) };
        }
        Ok(Self {
            ptr,
            len,
            layout,
            alloc,
        })
    }

    /// Returns the number of elements in the storage.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the storage holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the pointer to the buffer.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Returns a reference to the allocator.
    #[inline]
    pub fn alloc(&self) -> &A {
        &self.alloc
    }

    /// Returns the device where the buffer lives.
    #[inline]
    pub fn device(&self) -> Device {
        self.alloc.device()
    }

    /// Returns the storage data as a slice.
    ///
    /// # Panics
    ///
    /// Panics if the storage does not live in host-visible CPU memory.
    pub fn as_slice(&self) -> &[T] {
        assert!(
            self.device().is_cpu(),
            "cannot view device storage as a host slice"
        );
        // SAFETY: ptr is valid for len elements (dangling only when len == 0).
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Returns the storage data as a mutable slice.
    ///
    /// # Panics
    ///
    /// Panics if the storage does not live in host-visible CPU memory.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        assert!(
            self.device().is_cpu(),
            "cannot view device storage as a host slice"
        );
        // SAFETY: ptr is valid for len elements and we hold &mut self.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Clone, A: GridAllocator> Clone for GridStorage<T, A> {
    /// Deep-copies the buffer through the same allocator.
    ///
    /// Like `Vec`, an allocation failure during clone aborts via panic.
    fn clone(&self) -> Self {
        let (ptr, layout) = match Self::alloc_buffer(self.len, &self.alloc) {
            Ok(out) => out,
            Err(e) => panic!("grid storage clone failed: {e}"),
        };
        for i in 0..self.len {
            // SAFETY: both pointers are valid for len elements.
            unsafe { ptr.as_ptr().add(i).write((*self.ptr.as_ptr().add(i)).clone()) };
        }
        Self {
            ptr,
            len: self.len,
            layout,
            alloc: self.alloc.clone(),
        }
    }
}

impl<T, A: GridAllocator> Drop for GridStorage<T, A> {
    fn drop(&mut self) {
        if self.layout.size() != 0 {
            self.alloc.dealloc(self.ptr.as_ptr() as *mut u8, self.layout);
        }
    }
}

// SAFETY: the storage owns its buffer exclusively; sending it moves that
// ownership, and shared access only ever reads.
unsafe impl<T: Send, A: GridAllocator> Send for GridStorage<T, A> {}
unsafe impl<T: Sync, A: GridAllocator> Sync for GridStorage<T, A> {}

impl<T, A: GridAllocator> std::fmt::Debug for GridStorage<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridStorage")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("device", &self.device())
            .finish()
    }
}
