use spheremap_grid::GridSize;

use super::interpolate::{Tap, TapSet};

/// Tap for nearest neighbor sampling.
///
/// # Arguments
///
/// * `x` - The source column coordinate.
/// * `y` - The source row coordinate.
/// * `src_size` - The source geometry.
///
/// # Returns
///
/// One weight-1 tap on the rounded coordinate, or no taps when it falls
/// outside the source geometry.
pub(crate) fn nearest_tap(x: f32, y: f32, src_size: GridSize) -> TapSet {
    let mut taps = TapSet::new();
    if !x.is_finite() || !y.is_finite() {
        return taps;
    }

    let ix = x.round() as i64;
    let iy = y.round() as i64;

    if ix >= 0 && (ix as usize) < src_size.width && iy >= 0 && (iy as usize) < src_size.height {
        taps.push(Tap {
            row: iy as usize,
            col: ix as usize,
            weight: 1.0,
        });
    }
    taps
}
