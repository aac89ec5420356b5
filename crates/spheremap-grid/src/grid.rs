use crate::allocator::{CpuAllocator, GridAllocator};
use crate::device::Device;
use crate::error::GridError;
use crate::storage::GridStorage;

/// Grid size in cells
///
/// A struct to represent the size of a grid in cells.
///
/// # Examples
///
/// ```
/// use spheremap_grid::GridSize;
///
/// let grid_size = GridSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(grid_size.width, 10);
/// assert_eq!(grid_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridSize {
    /// Width of the grid in cells
    pub width: usize,
    /// Height of the grid in cells
    pub height: usize,
}

impl std::fmt::Display for GridSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "GridSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for GridSize {
    fn from(size: [usize; 2]) -> Self {
        GridSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// Computes the row-major strides for a (H, W, C) shape.
pub(crate) fn get_strides_from_shape(shape: [usize; 3]) -> [usize; 3] {
    [shape[1] * shape[2], shape[2], 1]
}

/// A dense multi-channel 2D grid with shape (H, W, C).
///
/// The grid owns its buffer through a [`GridAllocator`] and therefore knows
/// the [`Device`] its data lives on. Data is row-major with the channel axis
/// innermost; `strides` are kept explicitly so permuted views can exist and
/// be detected by [`Grid::is_contiguous`].
#[derive(Debug, Clone)]
pub struct Grid<T, A: GridAllocator = CpuAllocator> {
    pub(crate) storage: GridStorage<T, A>,
    pub(crate) shape: [usize; 3],
    pub(crate) strides: [usize; 3],
}

/// A per-cell, per-channel slot index recording which pooling candidate won.
///
/// Entries lie in `[0, kernel_size)`; the value `kernel_size` is the
/// sentinel for cells where every candidate was out of bounds.
pub type IdxMask<A = CpuAllocator> = Grid<i64, A>;

impl<T, A: GridAllocator> Grid<T, A> {
    /// Create a new grid from cell data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the grid in cells.
    /// * `channels` - The number of values stored per cell.
    /// * `data` - The cell data in row-major (H, W, C) order.
    /// * `alloc` - The allocator that owns the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the data length does not match the shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use spheremap_grid::{CpuAllocator, Grid, GridSize};
    ///
    /// let grid = Grid::new(
    ///     GridSize {
    ///         width: 2,
    ///         height: 3,
    ///     },
    ///     1,
    ///     vec![0.0f32; 6],
    ///     CpuAllocator,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(grid.rows(), 3);
    /// assert_eq!(grid.cols(), 2);
    /// assert_eq!(grid.channels(), 1);
    /// ```
    pub fn new(size: GridSize, channels: usize, data: Vec<T>, alloc: A) -> Result<Self, GridError> {
        let shape = [size.height, size.width, channels];
        let expected = shape[0] * shape[1] * shape[2];
        if data.len() != expected {
            return Err(GridError::InvalidLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            storage: GridStorage::from_vec(data, alloc)?,
            shape,
            strides: get_strides_from_shape(shape),
        })
    }

    /// Create a new grid filled with a single value.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the grid in cells.
    /// * `channels` - The number of values stored per cell.
    /// * `val` - The value to fill every channel of every cell with.
    /// * `alloc` - The allocator that owns the buffer.
    pub fn from_size_val(size: GridSize, channels: usize, val: T, alloc: A) -> Result<Self, GridError>
    where
        T: Clone,
    {
        let shape = [size.height, size.width, channels];
        Ok(Self {
            storage: GridStorage::from_val(shape[0] * shape[1] * shape[2], val, alloc)?,
            shape,
            strides: get_strides_from_shape(shape),
        })
    }

    /// Create a new grid by evaluating a function at every (y, x, c) index.
    ///
    /// # Examples
    ///
    /// ```
    /// use spheremap_grid::{CpuAllocator, Grid, GridSize};
    ///
    /// let ramp = Grid::from_size_fn(
    ///     GridSize {
    ///         width: 4,
    ///         height: 2,
    ///     },
    ///     1,
    ///     CpuAllocator,
    ///     |y, x, _| (y * 4 + x) as f32,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(ramp.get(1, 3, 0), Some(&7.0));
    /// ```
    pub fn from_size_fn<F>(
        size: GridSize,
        channels: usize,
        alloc: A,
        mut f: F,
    ) -> Result<Self, GridError>
    where
        F: FnMut(usize, usize, usize) -> T,
    {
        let mut data = Vec::with_capacity(size.height * size.width * channels);
        for y in 0..size.height {
            for x in 0..size.width {
                for c in 0..channels {
                    data.push(f(y, x, c));
                }
            }
        }
        Self::new(size, channels, data, alloc)
    }

    /// Returns the size of the grid in cells.
    #[inline]
    pub fn size(&self) -> GridSize {
        GridSize {
            width: self.shape[1],
            height: self.shape[0],
        }
    }

    /// Returns the number of rows (height).
    #[inline]
    pub fn rows(&self) -> usize {
        self.shape[0]
    }

    /// Returns the number of columns (width).
    #[inline]
    pub fn cols(&self) -> usize {
        self.shape[1]
    }

    /// Returns the number of channels per cell.
    #[inline]
    pub fn channels(&self) -> usize {
        self.shape[2]
    }

    /// Returns the total number of elements.
    #[inline]
    pub fn numel(&self) -> usize {
        self.shape[0] * self.shape[1] * self.shape[2]
    }

    /// Returns the logical (H, W, C) shape.
    #[inline]
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Returns the element strides for each axis.
    #[inline]
    pub fn strides(&self) -> [usize; 3] {
        self.strides
    }

    /// Returns the device where the grid data lives.
    #[inline]
    pub fn device(&self) -> Device {
        self.storage.device()
    }

    /// Returns a reference to the allocator.
    #[inline]
    pub fn alloc(&self) -> &A {
        self.storage.alloc()
    }

    /// Returns the grid data as a flat slice in storage order.
    ///
    /// # Panics
    ///
    /// Panics if the grid does not live in host-visible CPU memory.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.storage.as_slice()
    }

    /// Returns the grid data as a mutable flat slice in storage order.
    ///
    /// # Panics
    ///
    /// Panics if the grid does not live in host-visible CPU memory.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.storage.as_mut_slice()
    }

    /// Returns the pointer to the grid buffer.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.storage.as_ptr()
    }

    /// Returns a reference to the element at (y, x, c), or `None` when the
    /// index is out of range.
    pub fn get(&self, y: usize, x: usize, c: usize) -> Option<&T> {
        if y >= self.shape[0] || x >= self.shape[1] || c >= self.shape[2] {
            return None;
        }
        let offset = y * self.strides[0] + x * self.strides[1] + c * self.strides[2];
        self.as_slice().get(offset)
    }

    /// Returns true if the strides describe a dense row-major layout.
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.strides == get_strides_from_shape(self.shape)
    }

    /// Reorders the grid axes without touching the data.
    ///
    /// The result generally fails [`Grid::is_contiguous`]; use
    /// [`Grid::as_contiguous`] to materialize the permuted layout.
    ///
    /// # Panics
    ///
    /// Panics if `axes` is not a permutation of `[0, 1, 2]`.
    pub fn permuted(mut self, axes: [usize; 3]) -> Self {
        let mut seen = [false; 3];
        for &axis in axes.iter() {
            assert!(axis < 3 && !seen[axis], "axes must be a permutation of 0..3");
            seen[axis] = true;
        }
        self.shape = [self.shape[axes[0]], self.shape[axes[1]], self.shape[axes[2]]];
        self.strides = [
            self.strides[axes[0]],
            self.strides[axes[1]],
            self.strides[axes[2]],
        ];
        self
    }

    /// Copies the grid into a dense row-major layout.
    pub fn as_contiguous(&self) -> Result<Self, GridError>
    where
        T: Clone,
    {
        let slice = self.as_slice();
        let mut data = Vec::with_capacity(self.numel());
        for y in 0..self.shape[0] {
            for x in 0..self.shape[1] {
                for c in 0..self.shape[2] {
                    let offset =
                        y * self.strides[0] + x * self.strides[1] + c * self.strides[2];
                    data.push(slice[offset].clone());
                }
            }
        }
        Grid::new(self.size(), self.shape[2], data, self.alloc().clone())
    }

    /// Cast the cell data of the grid to a different type.
    ///
    /// # Returns
    ///
    /// A new grid with the cell data cast to the given type.
    pub fn cast<U>(&self) -> Result<Grid<U, A>, GridError>
    where
        T: Copy + num_traits::NumCast,
        U: num_traits::NumCast,
    {
        let casted = self
            .as_slice()
            .iter()
            .map(|&x| U::from(x).ok_or(GridError::CastError))
            .collect::<Result<Vec<U>, _>>()?;
        let mut grid = Grid::new(self.size(), self.shape[2], casted, self.alloc().clone())?;
        grid.shape = self.shape;
        grid.strides = self.strides;
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::CpuAllocator;

    #[test]
    fn test_grid_new() -> Result<(), GridError> {
        let grid = Grid::new(
            GridSize {
                width: 4,
                height: 3,
            },
            2,
            (0..24).map(|v| v as f32).collect(),
            CpuAllocator,
        )?;
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 4);
        assert_eq!(grid.channels(), 2);
        assert_eq!(grid.numel(), 24);
        assert_eq!(grid.strides(), [8, 2, 1]);
        assert_eq!(grid.device(), Device::Cpu);
        assert!(grid.is_contiguous());
        Ok(())
    }

    #[test]
    fn test_grid_new_wrong_length() {
        let result = Grid::new(
            GridSize {
                width: 4,
                height: 3,
            },
            2,
            vec![0.0f32; 23],
            CpuAllocator,
        );
        assert!(matches!(
            result,
            Err(GridError::InvalidLength {
                expected: 24,
                actual: 23
            })
        ));
    }

    #[test]
    fn test_grid_get() -> Result<(), GridError> {
        let grid = Grid::from_size_fn(
            GridSize {
                width: 3,
                height: 2,
            },
            2,
            CpuAllocator,
            |y, x, c| (100 * y + 10 * x + c) as f32,
        )?;
        assert_eq!(grid.get(1, 2, 1), Some(&121.0));
        assert_eq!(grid.get(2, 0, 0), None);
        assert_eq!(grid.get(0, 3, 0), None);
        assert_eq!(grid.get(0, 0, 2), None);
        Ok(())
    }

    #[test]
    fn test_grid_permuted_not_contiguous() -> Result<(), GridError> {
        let grid = Grid::from_size_fn(
            GridSize {
                width: 3,
                height: 2,
            },
            2,
            CpuAllocator,
            |y, x, c| (100 * y + 10 * x + c) as f32,
        )?;
        let transposed = grid.permuted([1, 0, 2]);
        assert!(!transposed.is_contiguous());
        assert_eq!(transposed.shape(), [3, 2, 2]);
        // logical (x, y, c) now reads the original (y, x, c)
        assert_eq!(transposed.get(2, 1, 1), Some(&121.0));
        Ok(())
    }

    #[test]
    fn test_grid_as_contiguous() -> Result<(), GridError> {
        let grid = Grid::from_size_fn(
            GridSize {
                width: 2,
                height: 2,
            },
            1,
            CpuAllocator,
            |y, x, _| (10 * y + x) as f32,
        )?;
        let dense = grid.permuted([1, 0, 2]).as_contiguous()?;
        assert!(dense.is_contiguous());
        assert_eq!(dense.as_slice(), &[0.0, 10.0, 1.0, 11.0]);
        Ok(())
    }

    #[test]
    fn test_grid_cast() -> Result<(), GridError> {
        let grid = Grid::new(
            GridSize {
                width: 2,
                height: 1,
            },
            1,
            vec![1.0f32, 2.0],
            CpuAllocator,
        )?;
        let casted = grid.cast::<u8>()?;
        assert_eq!(casted.as_slice(), &[1u8, 2]);
        Ok(())
    }

    #[test]
    fn test_grid_zero_size() -> Result<(), GridError> {
        let grid = Grid::<f32>::new(
            GridSize {
                width: 0,
                height: 5,
            },
            3,
            vec![],
            CpuAllocator,
        )?;
        assert_eq!(grid.numel(), 0);
        assert!(grid.is_contiguous());
        Ok(())
    }

    #[test]
    #[should_panic]
    fn test_grid_permuted_invalid_axes() {
        let grid = Grid::<f32>::from_size_val(
            GridSize {
                width: 2,
                height: 2,
            },
            1,
            0.0,
            CpuAllocator,
        )
        .unwrap();
        let _ = grid.permuted([0, 0, 1]);
    }
}
