use spheremap_grid::{GridAllocator, InterpWeights, SampleMap};

use super::interpolate::{point_taps, InterpolationMode};

/// Visits every effective source tap of one map slot.
///
/// The closure receives `(row, col, weight)` per tap. Forward kernels
/// gather with these taps, backward kernels scatter with them; sharing the
/// enumeration keeps the two passes exact adjoints of each other.
///
/// Without a weight table the slot must hold one interpolation point
/// (enforced by the operation entry points) and the taps are that point's
/// taps. With a weight table, bilinear mode sums every point scaled by its
/// table weight (zero-weight points are skipped), while nearest mode reads
/// only the point with the highest table weight, ties resolved to the
/// first, with weight 1. A slot yielding no taps is out of bounds: it
/// reads as zero and routes no gradient.
pub(crate) fn visit_slot<A, F>(
    map: &SampleMap<A>,
    weights: Option<&InterpWeights<A>>,
    oh: usize,
    ow: usize,
    k: usize,
    interpolation: InterpolationMode,
    mut f: F,
) where
    A: GridAllocator,
    F: FnMut(usize, usize, f32),
{
    let src_size = map.src_size();
    match weights {
        None => {
            let (x, y) = map.coord(oh, ow, k, 0);
            for tap in point_taps(x, y, src_size, interpolation).iter() {
                f(tap.row, tap.col, tap.weight);
            }
        }
        Some(table) => match interpolation {
            InterpolationMode::Bilinear => {
                for p in 0..map.interp_pts() {
                    let wp = table.weight(oh, ow, k, p);
                    if wp == 0.0 {
                        continue;
                    }
                    let (x, y) = map.coord(oh, ow, k, p);
                    for tap in point_taps(x, y, src_size, interpolation).iter() {
                        f(tap.row, tap.col, wp * tap.weight);
                    }
                }
            }
            InterpolationMode::Nearest => {
                let mut best_p = 0;
                let mut best_w = table.weight(oh, ow, k, 0);
                for p in 1..map.interp_pts() {
                    let wp = table.weight(oh, ow, k, p);
                    if wp > best_w {
                        best_w = wp;
                        best_p = p;
                    }
                }
                let (x, y) = map.coord(oh, ow, k, best_p);
                for tap in point_taps(x, y, src_size, interpolation).iter() {
                    f(tap.row, tap.col, tap.weight);
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spheremap_grid::{CpuAllocator, GridSize};

    const SIZE: GridSize = GridSize {
        width: 4,
        height: 4,
    };

    fn collect_taps(
        map: &SampleMap,
        weights: Option<&InterpWeights>,
        interpolation: InterpolationMode,
    ) -> Vec<(usize, usize, f32)> {
        let mut taps = Vec::new();
        visit_slot(map, weights, 0, 0, 0, interpolation, |r, c, w| {
            taps.push((r, c, w))
        });
        taps
    }

    #[test]
    fn unweighted_uses_the_single_point() -> Result<(), Box<dyn std::error::Error>> {
        let map = SampleMap::from_fn(SIZE, SIZE, 1, 1, CpuAllocator, |_, _, _, _| (2.0, 1.0))?;
        assert_eq!(
            collect_taps(&map, None, InterpolationMode::Nearest),
            vec![(1, 2, 1.0)]
        );
        Ok(())
    }

    #[test]
    fn weighted_bilinear_scales_and_skips_zeros() -> Result<(), Box<dyn std::error::Error>> {
        let map = SampleMap::from_fn(SIZE, SIZE, 1, 3, CpuAllocator, |_, _, _, p| {
            (p as f32, 0.0)
        })?;
        let weights =
            InterpWeights::new(SIZE, 1, 3, {
                let mut data = vec![0.0; SIZE.width * SIZE.height * 3];
                data[0] = 0.5;
                data[1] = 0.0;
                data[2] = 0.25;
                data
            }, CpuAllocator)?;

        // integer coordinates collapse to one tap per point; the zero
        // weight point must not appear at all
        assert_eq!(
            collect_taps(&map, Some(&weights), InterpolationMode::Bilinear),
            vec![(0, 0, 0.5), (0, 2, 0.25)]
        );
        Ok(())
    }

    #[test]
    fn weighted_nearest_takes_first_best_point() -> Result<(), Box<dyn std::error::Error>> {
        let map = SampleMap::from_fn(SIZE, SIZE, 1, 3, CpuAllocator, |_, _, _, p| {
            (p as f32, 0.0)
        })?;
        let weights =
            InterpWeights::new(SIZE, 1, 3, {
                let mut data = vec![0.0; SIZE.width * SIZE.height * 3];
                data[0] = 0.4;
                data[1] = 0.4;
                data[2] = 0.2;
                data
            }, CpuAllocator)?;

        // p = 0 and p = 1 tie on the table weight; the first wins and the
        // emitted weight is 1 regardless of the table value
        assert_eq!(
            collect_taps(&map, Some(&weights), InterpolationMode::Nearest),
            vec![(0, 0, 1.0)]
        );
        Ok(())
    }

    #[test]
    fn weighted_nearest_out_of_bounds_winner_is_empty(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let map = SampleMap::from_fn(SIZE, SIZE, 1, 2, CpuAllocator, |_, _, _, p| {
            if p == 0 {
                (-5.0, 0.0)
            } else {
                (1.0, 1.0)
            }
        })?;
        let weights = InterpWeights::from_fn(SIZE, 1, 2, CpuAllocator, |_, _, _, p| {
            if p == 0 {
                0.9
            } else {
                0.1
            }
        })?;

        // the winning point is out of bounds; the slot reads as zero even
        // though the runner-up would have been valid
        assert!(collect_taps(&map, Some(&weights), InterpolationMode::Nearest).is_empty());
        Ok(())
    }
}
