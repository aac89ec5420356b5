//! Sample maps and interpolation weight tables.
//!
//! A sample map tells an operation where in the source grid each output
//! cell reads from. Coordinates are free-form `f32` pairs in source cell
//! units, so a map can express any geometry: gnomonic patches on a sphere,
//! icosahedron unfoldings, plain crops. Out-of-range coordinates are valid
//! data and read as zero during sampling.

use crate::allocator::{CpuAllocator, GridAllocator};
use crate::device::Device;
use crate::error::GridError;
use crate::grid::GridSize;
use crate::storage::GridStorage;

/// Per-output-cell source coordinates for mapped operations.
///
/// Logical shape is `(out_height, out_width, kernel_size, interp_pts, 2)`
/// with the last axis holding `(x, y)`: `x` indexes columns and `y` rows of
/// the source grid. Resampling uses one slot per cell (`kernel_size == 1`);
/// pooling keeps one slot per neighbor. Unweighted operations require one
/// interpolation point per slot (`interp_pts == 1`).
#[derive(Debug, Clone)]
pub struct SampleMap<A: GridAllocator = CpuAllocator> {
    storage: GridStorage<f32, A>,
    out_size: GridSize,
    src_size: GridSize,
    kernel_size: usize,
    interp_pts: usize,
}

impl<A: GridAllocator> SampleMap<A> {
    /// Create a new sample map from coordinate data.
    ///
    /// # Arguments
    ///
    /// * `out_size` - The output geometry the map addresses.
    /// * `src_size` - The source geometry coordinates refer into.
    /// * `kernel_size` - Number of neighbor slots per output cell.
    /// * `interp_pts` - Number of interpolation points per slot.
    /// * `data` - Flattened `(OH, OW, K, P, 2)` coordinate data.
    /// * `alloc` - The allocator that owns the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if either arity is zero or the data length does not
    /// match the declared geometry.
    pub fn new(
        out_size: GridSize,
        src_size: GridSize,
        kernel_size: usize,
        interp_pts: usize,
        data: Vec<f32>,
        alloc: A,
    ) -> Result<Self, GridError> {
        if kernel_size == 0 || interp_pts == 0 {
            return Err(GridError::InvalidMapArity {
                kernel_size,
                interp_pts,
            });
        }
        let expected = out_size.height * out_size.width * kernel_size * interp_pts * 2;
        if data.len() != expected {
            return Err(GridError::InvalidLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            storage: GridStorage::from_vec(data, alloc)?,
            out_size,
            src_size,
            kernel_size,
            interp_pts,
        })
    }

    /// Create a plain resampling map (one slot, one point per cell).
    pub fn resample(
        out_size: GridSize,
        src_size: GridSize,
        data: Vec<f32>,
        alloc: A,
    ) -> Result<Self, GridError> {
        Self::new(out_size, src_size, 1, 1, data, alloc)
    }

    /// Create a new sample map by evaluating a coordinate function.
    ///
    /// The function receives `(oh, ow, k, p)` and returns the source
    /// `(x, y)` coordinate for that slot point.
    ///
    /// # Examples
    ///
    /// ```
    /// use spheremap_grid::{CpuAllocator, GridSize, SampleMap};
    ///
    /// let size = GridSize {
    ///     width: 4,
    ///     height: 4,
    /// };
    /// // shift every cell one column to the right
    /// let map = SampleMap::from_fn(size, size, 1, 1, CpuAllocator, |_, ow, _, _| {
    ///     (ow as f32 + 1.0, 0.0)
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(map.coord(0, 3, 0, 0), (4.0, 0.0));
    /// ```
    pub fn from_fn<F>(
        out_size: GridSize,
        src_size: GridSize,
        kernel_size: usize,
        interp_pts: usize,
        alloc: A,
        mut f: F,
    ) -> Result<Self, GridError>
    where
        F: FnMut(usize, usize, usize, usize) -> (f32, f32),
    {
        let mut data =
            Vec::with_capacity(out_size.height * out_size.width * kernel_size * interp_pts * 2);
        for oh in 0..out_size.height {
            for ow in 0..out_size.width {
                for k in 0..kernel_size {
                    for p in 0..interp_pts {
                        let (x, y) = f(oh, ow, k, p);
                        data.push(x);
                        data.push(y);
                    }
                }
            }
        }
        Self::new(out_size, src_size, kernel_size, interp_pts, data, alloc)
    }

    /// Create the identity resampling map for a geometry: every cell reads
    /// its own coordinate.
    pub fn identity(size: GridSize, alloc: A) -> Result<Self, GridError> {
        Self::from_fn(size, size, 1, 1, alloc, |oh, ow, _, _| {
            (ow as f32, oh as f32)
        })
    }

    /// Returns the `(x, y)` source coordinate of one slot point.
    ///
    /// Indices must lie inside the map geometry; the slice access panics
    /// otherwise.
    #[inline]
    pub fn coord(&self, oh: usize, ow: usize, k: usize, p: usize) -> (f32, f32) {
        let idx = (((oh * self.out_size.width + ow) * self.kernel_size + k) * self.interp_pts
            + p)
            * 2;
        let data = self.storage.as_slice();
        (data[idx], data[idx + 1])
    }

    /// Returns the output geometry the map addresses.
    #[inline]
    pub fn out_size(&self) -> GridSize {
        self.out_size
    }

    /// Returns the source geometry coordinates refer into.
    #[inline]
    pub fn src_size(&self) -> GridSize {
        self.src_size
    }

    /// Returns the number of neighbor slots per output cell.
    #[inline]
    pub fn kernel_size(&self) -> usize {
        self.kernel_size
    }

    /// Returns the number of interpolation points per slot.
    #[inline]
    pub fn interp_pts(&self) -> usize {
        self.interp_pts
    }

    /// Returns the device where the coordinate data lives.
    #[inline]
    pub fn device(&self) -> Device {
        self.storage.device()
    }

    /// Returns the flattened coordinate data.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        self.storage.as_slice()
    }
}

/// Interpolation weights paired with a [`SampleMap`].
///
/// Logical shape is `(out_height, out_width, kernel_size, interp_pts)`,
/// parallel to the map's coordinate slots. For bilinear sampling the
/// weights scale each point's contribution; for nearest sampling they are
/// selection scores and only the best point of a slot is read.
#[derive(Debug, Clone)]
pub struct InterpWeights<A: GridAllocator = CpuAllocator> {
    storage: GridStorage<f32, A>,
    out_size: GridSize,
    kernel_size: usize,
    interp_pts: usize,
}

impl<A: GridAllocator> InterpWeights<A> {
    /// Create a new weight table from flattened `(OH, OW, K, P)` data.
    ///
    /// # Errors
    ///
    /// Returns an error if either arity is zero or the data length does not
    /// match the declared geometry.
    pub fn new(
        out_size: GridSize,
        kernel_size: usize,
        interp_pts: usize,
        data: Vec<f32>,
        alloc: A,
    ) -> Result<Self, GridError> {
        if kernel_size == 0 || interp_pts == 0 {
            return Err(GridError::InvalidMapArity {
                kernel_size,
                interp_pts,
            });
        }
        let expected = out_size.height * out_size.width * kernel_size * interp_pts;
        if data.len() != expected {
            return Err(GridError::InvalidLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            storage: GridStorage::from_vec(data, alloc)?,
            out_size,
            kernel_size,
            interp_pts,
        })
    }

    /// Create a new weight table by evaluating a function per slot point.
    pub fn from_fn<F>(
        out_size: GridSize,
        kernel_size: usize,
        interp_pts: usize,
        alloc: A,
        mut f: F,
    ) -> Result<Self, GridError>
    where
        F: FnMut(usize, usize, usize, usize) -> f32,
    {
        let mut data =
            Vec::with_capacity(out_size.height * out_size.width * kernel_size * interp_pts);
        for oh in 0..out_size.height {
            for ow in 0..out_size.width {
                for k in 0..kernel_size {
                    for p in 0..interp_pts {
                        data.push(f(oh, ow, k, p));
                    }
                }
            }
        }
        Self::new(out_size, kernel_size, interp_pts, data, alloc)
    }

    /// Returns the weight of one slot point.
    ///
    /// Indices must lie inside the table geometry; the slice access panics
    /// otherwise.
    #[inline]
    pub fn weight(&self, oh: usize, ow: usize, k: usize, p: usize) -> f32 {
        let idx =
            ((oh * self.out_size.width + ow) * self.kernel_size + k) * self.interp_pts + p;
        self.storage.as_slice()[idx]
    }

    /// Returns true if the table geometry matches the map geometry.
    pub fn matches(&self, map: &SampleMap<A>) -> bool {
        self.out_size == map.out_size()
            && self.kernel_size == map.kernel_size()
            && self.interp_pts == map.interp_pts()
    }

    /// Returns the output geometry the table addresses.
    #[inline]
    pub fn out_size(&self) -> GridSize {
        self.out_size
    }

    /// Returns the number of neighbor slots per output cell.
    #[inline]
    pub fn kernel_size(&self) -> usize {
        self.kernel_size
    }

    /// Returns the number of interpolation points per slot.
    #[inline]
    pub fn interp_pts(&self) -> usize {
        self.interp_pts
    }

    /// Returns the device where the weight data lives.
    #[inline]
    pub fn device(&self) -> Device {
        self.storage.device()
    }

    /// Returns the flattened weight data.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        self.storage.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::CpuAllocator;

    const SIZE: GridSize = GridSize {
        width: 3,
        height: 2,
    };

    #[test]
    fn test_sample_map_new() -> Result<(), GridError> {
        let map = SampleMap::new(
            SIZE,
            SIZE,
            2,
            3,
            vec![0.0; 2 * 3 * 2 * 3 * 2],
            CpuAllocator,
        )?;
        assert_eq!(map.out_size(), SIZE);
        assert_eq!(map.src_size(), SIZE);
        assert_eq!(map.kernel_size(), 2);
        assert_eq!(map.interp_pts(), 3);
        Ok(())
    }

    #[test]
    fn test_sample_map_zero_arity() {
        let result = SampleMap::new(SIZE, SIZE, 0, 1, vec![], CpuAllocator);
        assert!(matches!(
            result,
            Err(GridError::InvalidMapArity {
                kernel_size: 0,
                interp_pts: 1
            })
        ));
    }

    #[test]
    fn test_sample_map_wrong_length() {
        let result = SampleMap::new(SIZE, SIZE, 1, 1, vec![0.0; 11], CpuAllocator);
        assert!(matches!(result, Err(GridError::InvalidLength { .. })));
    }

    #[test]
    fn test_sample_map_coord_layout() -> Result<(), GridError> {
        let map = SampleMap::from_fn(SIZE, SIZE, 2, 2, CpuAllocator, |oh, ow, k, p| {
            (1000.0 * oh as f32 + 100.0 * ow as f32 + 10.0 * k as f32 + p as f32, -1.0)
        })?;
        assert_eq!(map.coord(1, 2, 1, 0), (1210.0, -1.0));
        assert_eq!(map.coord(0, 0, 0, 1), (1.0, -1.0));
        Ok(())
    }

    #[test]
    fn test_sample_map_identity() -> Result<(), GridError> {
        let map = SampleMap::identity(SIZE, CpuAllocator)?;
        assert_eq!(map.kernel_size(), 1);
        assert_eq!(map.interp_pts(), 1);
        assert_eq!(map.coord(1, 2, 0, 0), (2.0, 1.0));
        Ok(())
    }

    #[test]
    fn test_interp_weights_matches() -> Result<(), GridError> {
        let map = SampleMap::new(
            SIZE,
            SIZE,
            2,
            3,
            vec![0.0; 2 * 3 * 2 * 3 * 2],
            CpuAllocator,
        )?;
        let weights = InterpWeights::from_fn(SIZE, 2, 3, CpuAllocator, |_, _, _, p| p as f32)?;
        assert!(weights.matches(&map));
        assert_eq!(weights.weight(1, 2, 1, 2), 2.0);

        let other = InterpWeights::new(SIZE, 2, 2, vec![0.0; 2 * 3 * 2 * 2], CpuAllocator)?;
        assert!(!other.matches(&map));
        Ok(())
    }
}
