/// An error type for grid and sample map construction.
#[derive(thiserror::Error, Debug)]
pub enum GridError {
    /// Error when the data length does not match the declared shape.
    #[error("Data length ({actual}) does not match the grid shape ({expected} elements)")]
    InvalidLength {
        /// Number of elements the shape calls for.
        expected: usize,
        /// Number of elements actually provided.
        actual: usize,
    },

    /// Error when a sample map is declared with a degenerate arity.
    #[error("Sample map needs at least one slot and one point, got kernel_size {kernel_size} and interp_pts {interp_pts}")]
    InvalidMapArity {
        /// Declared number of neighbor slots per output cell.
        kernel_size: usize,
        /// Declared number of interpolation points per slot.
        interp_pts: usize,
    },

    /// Error when an element cannot be represented in the target type.
    #[error("Failed to cast grid element")]
    CastError,

    /// Error from the underlying storage allocator.
    #[error("Grid storage allocation failed")]
    Storage(#[from] crate::allocator::GridAllocatorError),
}
