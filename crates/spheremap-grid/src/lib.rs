#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `spheremap-grid` provides the containers shared by every mapped image
//! operation: dense multi-channel grids, the sample maps that tell an
//! operation where each output cell reads from, the interpolation weight
//! tables paired with those maps, and the allocator/device model that lets
//! external accelerator backends plug in.
//!
//! # Quick Start
//!
//! ```rust
//! use spheremap_grid::{CpuAllocator, Grid, GridSize, SampleMap};
//!
//! let size = GridSize {
//!     width: 8,
//!     height: 4,
//! };
//!
//! // a 3-channel grid and the map that reads it back unchanged
//! let grid = Grid::from_size_val(size, 3, 0.0f32, CpuAllocator).unwrap();
//! let map = SampleMap::identity(size, CpuAllocator).unwrap();
//!
//! assert_eq!(grid.device(), map.device());
//! assert_eq!(map.kernel_size(), 1);
//! ```

/// Allocator module containing memory management utilities.
///
/// This module provides the [`GridAllocator`] trait and the system-backed
/// [`CpuAllocator`].
pub mod allocator;

/// Device module containing the device classification.
pub mod device;

/// Error types for grid and map construction.
pub mod error;

/// Grid module containing the dense (H, W, C) container.
pub mod grid;

/// Sample map module containing coordinate maps and weight tables.
pub mod sample_map;

/// Serde module for serialization and deserialization of maps and grids.
///
/// Enabled with the `serde` feature.
#[cfg(feature = "serde")]
pub mod serde;

/// Storage module containing the allocator-backed buffer.
pub mod storage;

pub use crate::allocator::{CpuAllocator, GridAllocator, GridAllocatorError};
pub use crate::device::Device;
pub use crate::error::GridError;
pub use crate::grid::{Grid, GridSize, IdxMask};
pub use crate::sample_map::{InterpWeights, SampleMap};
