#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! Re-exports the grid containers and the mapped operations under one
//! roof:
//!
//! ```
//! use spheremap::grid::{CpuAllocator, Grid, GridSize, SampleMap};
//! use spheremap::ops::{resample_to_map, InterpolationMode};
//!
//! let size = GridSize {
//!     width: 4,
//!     height: 4,
//! };
//! let src = Grid::from_size_fn(size, 1, CpuAllocator, |y, x, _| (y + x) as f32).unwrap();
//! let map = SampleMap::identity(size, CpuAllocator).unwrap();
//! let mut dst = Grid::from_size_val(size, 1, 0.0f32, CpuAllocator).unwrap();
//!
//! resample_to_map(&src, &map, &mut dst, InterpolationMode::Bilinear).unwrap();
//! assert_eq!(dst.as_slice(), src.as_slice());
//! ```

#[doc(inline)]
pub use spheremap_grid as grid;

#[doc(inline)]
pub use spheremap_ops as ops;
