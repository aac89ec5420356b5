use argh::FromArgs;
use std::f32::consts::TAU;
use std::path::{Path, PathBuf};

use spheremap::grid::{CpuAllocator, Grid, GridSize, IdxMask, SampleMap};
use spheremap::ops::{idx_sentinel, mapped_max_pool, resample_to_map, InterpolationMode};

#[derive(FromArgs)]
/// Rotate a synthetic equirectangular panorama around the vertical axis
/// with a precomputed sample map, optionally max pooling the result.
struct Args {
    /// output path for the rotated panorama (png)
    #[argh(option, short = 'o')]
    output: PathBuf,

    /// optional output path for the max pooled panorama (png)
    #[argh(option)]
    pooled: Option<PathBuf>,

    /// panorama width in pixels, the height is half of it
    #[argh(option, default = "1024")]
    width: usize,

    /// yaw rotation in degrees
    #[argh(option, default = "90.0")]
    yaw: f32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let size = GridSize {
        width: args.width,
        height: args.width / 2,
    };
    log::info!("rendering a {} test panorama", size);

    // test pattern: longitude and latitude ramps plus a checkerboard
    let pano = Grid::from_size_fn(size, 3, CpuAllocator, |y, x, c| match c {
        0 => x as f32 / size.width as f32,
        1 => y as f32 / size.height as f32,
        _ => ((x / 32 + y / 32) % 2) as f32,
    })?;

    // yaw shifts longitude only, so every cell keeps its row; the wrapped
    // half cell at the seam blends into the zero padding
    let yaw = args.yaw.to_radians();
    let width = size.width as f32;
    let map = SampleMap::from_fn(size, size, 1, 1, CpuAllocator, move |oh, ow, _, _| {
        let lon = (ow as f32 + 0.5) / width * TAU + yaw;
        let x = lon.rem_euclid(TAU) / TAU * width - 0.5;
        (x, oh as f32)
    })?;

    let mut rotated = Grid::from_size_val(size, 3, 0.0f32, CpuAllocator)?;
    resample_to_map(&pano, &map, &mut rotated, InterpolationMode::Bilinear)?;
    log::info!("rotated by {:.1} degrees", args.yaw);

    save_rgb(&rotated, &args.output)?;
    log::info!("wrote {}", args.output.display());

    if let Some(pooled_path) = args.pooled {
        let out_size = GridSize {
            width: size.width / 2,
            height: size.height / 2,
        };
        // 3x3 neighborhoods at stride two
        let pool_map = SampleMap::from_fn(out_size, size, 9, 1, CpuAllocator, |oh, ow, k, _| {
            let dx = (k % 3) as f32 - 1.0;
            let dy = (k / 3) as f32 - 1.0;
            (ow as f32 * 2.0 + dx, oh as f32 * 2.0 + dy)
        })?;

        let mut pooled = Grid::from_size_val(out_size, 3, 0.0f32, CpuAllocator)?;
        let mut mask = IdxMask::from_size_val(out_size, 3, idx_sentinel(9), CpuAllocator)?;
        mapped_max_pool(
            &rotated,
            &pool_map,
            &mut pooled,
            &mut mask,
            InterpolationMode::Nearest,
        )?;

        let sentinels = mask
            .as_slice()
            .iter()
            .filter(|&&m| m == idx_sentinel(9))
            .count();
        log::info!("pooled to {}, {} cells had no candidate", out_size, sentinels);

        save_rgb(&pooled, &pooled_path)?;
        log::info!("wrote {}", pooled_path.display());
    }

    Ok(())
}

/// Clamp to [0, 1] and write an 8-bit rgb png.
fn save_rgb(grid: &Grid<f32>, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = grid
        .as_slice()
        .iter()
        .map(|&v| (v.clamp(0.0, 1.0) * 255.0) as u8)
        .collect::<Vec<_>>();
    let image = image::RgbImage::from_raw(grid.cols() as u32, grid.rows() as u32, bytes)
        .ok_or("pixel buffer does not match the panorama size")?;
    image.save(path)?;
    Ok(())
}
