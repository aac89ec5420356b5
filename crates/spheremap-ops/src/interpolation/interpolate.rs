use spheremap_grid::GridSize;

use super::bilinear::bilinear_taps;
use super::nearest::nearest_tap;

/// Interpolation mode for mapped sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    /// Bilinear interpolation
    Bilinear,
    /// Nearest neighbor interpolation
    Nearest,
}

/// A single in-bounds source read with its weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Tap {
    /// Source row.
    pub row: usize,
    /// Source column.
    pub col: usize,
    /// Contribution of the source value, always positive.
    pub weight: f32,
}

impl Default for Tap {
    fn default() -> Self {
        Tap {
            row: 0,
            col: 0,
            weight: 0.0,
        }
    }
}

/// The taps of one interpolation point, at most the four bilinear corners.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TapSet {
    taps: [Tap; 4],
    len: usize,
}

impl TapSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, tap: Tap) {
        debug_assert!(self.len < 4);
        self.taps[self.len] = tap;
        self.len += 1;
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, Tap> {
        self.taps[..self.len].iter()
    }
}

/// Expands a source coordinate into its in-bounds taps.
///
/// # Arguments
///
/// * `x` - The source column coordinate.
/// * `y` - The source row coordinate.
/// * `src_size` - The source geometry the taps must lie inside.
/// * `interpolation` - The interpolation mode to use.
///
/// # Returns
///
/// The in-bounds taps; empty when the coordinate reads nothing, including
/// non-finite coordinates.
pub(crate) fn point_taps(
    x: f32,
    y: f32,
    src_size: GridSize,
    interpolation: InterpolationMode,
) -> TapSet {
    match interpolation {
        InterpolationMode::Bilinear => bilinear_taps(x, y, src_size),
        InterpolationMode::Nearest => nearest_tap(x, y, src_size),
    }
}
