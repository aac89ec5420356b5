use spheremap_grid::GridSize;

use super::interpolate::{Tap, TapSet};

/// Taps for bilinear sampling with zero padding.
///
/// # Arguments
///
/// * `x` - The source column coordinate.
/// * `y` - The source row coordinate.
/// * `src_size` - The source geometry.
///
/// # Returns
///
/// The in-bounds corner taps with strictly positive weights. Corners that
/// fall outside the source geometry are dropped and the remaining weights
/// are left as they are, so border reads fade toward zero instead of
/// clamping.
pub(crate) fn bilinear_taps(x: f32, y: f32, src_size: GridSize) -> TapSet {
    let mut taps = TapSet::new();
    if !x.is_finite() || !y.is_finite() {
        return taps;
    }
    // every corner of coordinates outside (-1, W) x (-1, H) is either out
    // of bounds or has zero weight; rejecting early keeps the casts in range
    if x <= -1.0 || y <= -1.0 || x >= src_size.width as f32 || y >= src_size.height as f32 {
        return taps;
    }

    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let ix = x0 as i64;
    let iy = y0 as i64;

    let corners = [
        (iy, ix, (1.0 - fx) * (1.0 - fy)),
        (iy, ix + 1, fx * (1.0 - fy)),
        (iy + 1, ix, (1.0 - fx) * fy),
        (iy + 1, ix + 1, fx * fy),
    ];

    for (row, col, weight) in corners {
        if weight <= 0.0 {
            continue;
        }
        if row >= 0
            && (row as usize) < src_size.height
            && col >= 0
            && (col as usize) < src_size.width
        {
            taps.push(Tap {
                row: row as usize,
                col: col as usize,
                weight,
            });
        }
    }
    taps
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: GridSize = GridSize {
        width: 4,
        height: 3,
    };

    fn weight_sum(x: f32, y: f32) -> f32 {
        bilinear_taps(x, y, SIZE).iter().map(|t| t.weight).sum()
    }

    #[test]
    fn interior_weights_sum_to_one() {
        for (x, y) in [(1.5, 1.5), (0.25, 0.75), (2.9, 0.1)] {
            assert!((weight_sum(x, y) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn exact_cell_is_a_single_tap() {
        let taps = bilinear_taps(2.0, 1.0, SIZE);
        let collected: Vec<_> = taps.iter().copied().collect();
        assert_eq!(
            collected,
            vec![Tap {
                row: 1,
                col: 2,
                weight: 1.0
            }]
        );
    }

    #[test]
    fn border_weights_are_not_renormalized() {
        // half a cell outside the left edge: only the x = 0 corners
        // survive, each scaled by 0.5
        let taps = bilinear_taps(-0.5, 1.0, SIZE);
        let collected: Vec<_> = taps.iter().copied().collect();
        assert_eq!(
            collected,
            vec![Tap {
                row: 1,
                col: 0,
                weight: 0.5
            }]
        );
        assert!((weight_sum(-0.5, 1.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn fully_outside_is_empty() {
        assert!(bilinear_taps(-1.0, 0.0, SIZE).is_empty());
        assert!(bilinear_taps(-1.5, 0.0, SIZE).is_empty());
        assert!(bilinear_taps(4.0, 0.0, SIZE).is_empty());
        assert!(bilinear_taps(0.0, 3.0, SIZE).is_empty());
        assert!(bilinear_taps(1e30, 1e30, SIZE).is_empty());
    }

    #[test]
    fn just_outside_corner_keeps_one_tap() {
        let taps = bilinear_taps(3.5, 2.5, SIZE);
        let collected: Vec<_> = taps.iter().copied().collect();
        assert_eq!(
            collected,
            vec![Tap {
                row: 2,
                col: 3,
                weight: 0.25
            }]
        );
    }
}
