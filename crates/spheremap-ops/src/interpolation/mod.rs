//! Interpolation primitives for mapped sampling.
//!
//! Every operation in this crate reads the source grid through the same
//! primitive: a map coordinate is expanded into a small set of in-bounds
//! taps, each a `(row, col, weight)` triple. Gathering multiplies source
//! values by the tap weights; scattering routes gradients through the
//! identical taps, so forward and backward stay exact adjoints.
//!
//! # Interpolation Modes
//!
//! - **Nearest**: one tap on the rounded coordinate, weight 1
//! - **Bilinear**: up to four corner taps with the usual fractional weights
//!
//! Coordinates outside the source geometry produce no taps and read as
//! zero; surviving bilinear weights near a border are not renormalized.

mod bilinear;
pub(crate) mod interpolate;
mod nearest;
mod slot;

pub use interpolate::InterpolationMode;

pub(crate) use slot::visit_slot;
