use spheremap_grid::{Device, GridError, GridSize};

/// An error type for the mapped operations.
#[derive(thiserror::Error, Debug)]
pub enum OpsError {
    /// Error when an operand is not laid out densely in row-major order.
    #[error("Operand '{0}' must be contiguous")]
    NonContiguous(&'static str),

    /// Error when operands live on different devices.
    #[error("Operands must be colocated on one device, found {0} and {1}")]
    DeviceMismatch(Device, Device),

    /// Error when an output-side buffer does not match the map geometry.
    #[error("Map output geometry {map} does not match buffer geometry {buffer}")]
    OutputSizeMismatch {
        /// The output geometry declared by the sample map.
        map: GridSize,
        /// The geometry of the offending buffer.
        buffer: GridSize,
    },

    /// Error when an input-side buffer does not match the map geometry.
    #[error("Map source geometry {map} does not match buffer geometry {buffer}")]
    SourceSizeMismatch {
        /// The source geometry declared by the sample map.
        map: GridSize,
        /// The geometry of the offending buffer.
        buffer: GridSize,
    },

    /// Error when operand channel counts differ.
    #[error("Channel counts differ ({0} vs {1})")]
    ChannelMismatch(usize, usize),

    /// Error when the map arity does not fit the operation.
    #[error("Operation does not accept kernel_size {kernel_size} with interp_pts {interp_pts}")]
    MapArityMismatch {
        /// Number of neighbor slots in the offending map.
        kernel_size: usize,
        /// Number of interpolation points in the offending map.
        interp_pts: usize,
    },

    /// Error when a weight table does not share the map geometry.
    #[error("Weight table geometry does not match the sample map")]
    WeightsMismatch,

    /// Error when an index mask holds a slot outside the valid range.
    #[error("Pool index {index} outside [0, {kernel_size}] found in mask")]
    InvalidPoolIndex {
        /// The offending mask entry.
        index: i64,
        /// The kernel size the mask was produced with.
        kernel_size: usize,
    },

    /// Error bubbled up from grid construction.
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),
}
