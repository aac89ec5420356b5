//! CPU kernels for the mapped operations.
//!
//! Entry points validate shapes, contiguity and colocation before these
//! kernels run, so the kernels assume well-formed operands and never fail.

pub(crate) mod pool;
pub(crate) mod resample;
