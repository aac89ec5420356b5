#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// compute backend dispatch for mapped operations.
pub mod backend;

/// Error types for the ops module.
pub mod error;

/// utilities for interpolation.
pub mod interpolation;

/// mapped max pooling module.
pub mod pool;

/// mapped resampling module.
pub mod resample;

pub(crate) mod check;
pub(crate) mod cpu;
pub(crate) mod parallel;

pub use crate::backend::ComputeBackend;
pub use crate::error::OpsError;
pub use crate::interpolation::InterpolationMode;
pub use crate::pool::{
    idx_sentinel, mapped_max_pool, mapped_max_pool_backward, weighted_mapped_max_pool,
    weighted_mapped_max_pool_backward,
};
pub use crate::resample::{
    resample_from_map, resample_to_map, weighted_resample_from_map, weighted_resample_to_map,
};
