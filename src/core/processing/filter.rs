use ndarray::{Array2, Array3, ArrayView2, Axis};
use rayon::prelude::*;
use tracing::debug;

use crate::core::exec::ExecutionContext;
use crate::types::RasterStack;

pub const KERNEL_SIZE: usize = 5;
const KERNEL_RADIUS: isize = KERNEL_SIZE as isize / 2;

/// 5x5 high-pass weight matrix (Gangkofner et al., 2007), scaled by 1/25:
/// 24 neighbor weights of -1/25 around a center of 24/25. The weights sum to
/// zero, so `pixel - convolved` reduces to the 5x5 neighborhood mean.
pub const HPF_KERNEL: [[f32; KERNEL_SIZE]; KERNEL_SIZE] = [
    [-1.0 / 25.0, -1.0 / 25.0, -1.0 / 25.0, -1.0 / 25.0, -1.0 / 25.0],
    [-1.0 / 25.0, -1.0 / 25.0, -1.0 / 25.0, -1.0 / 25.0, -1.0 / 25.0],
    [-1.0 / 25.0, -1.0 / 25.0, 24.0 / 25.0, -1.0 / 25.0, -1.0 / 25.0],
    [-1.0 / 25.0, -1.0 / 25.0, -1.0 / 25.0, -1.0 / 25.0, -1.0 / 25.0],
    [-1.0 / 25.0, -1.0 / 25.0, -1.0 / 25.0, -1.0 / 25.0, -1.0 / 25.0],
];

/// Convolve every band of `stack` with the fixed 5x5 high-pass kernel.
///
/// Cells whose neighborhood reaches past the raster edge read the missing
/// neighbors as NaN, which leaves a 2-pixel NaN border on every band.
/// Downstream fusion must tolerate that border. The kernel is not
/// data-dependent; it is applied to each band independently.
pub fn high_pass_filter(stack: &RasterStack, ctx: &ExecutionContext) -> RasterStack {
    debug!(
        bands = stack.band_count(),
        rows = stack.rows(),
        cols = stack.cols(),
        "high-pass filtering"
    );

    let mut filtered = Array3::<f32>::zeros(stack.bands.raw_dim());
    for (index, band) in stack.bands.axis_iter(Axis(0)).enumerate() {
        let convolved = convolve_band(band, ctx);
        filtered.index_axis_mut(Axis(0), index).assign(&convolved);
    }

    RasterStack {
        bands: filtered,
        projection: stack.projection.clone(),
        geotransform: stack.geotransform,
    }
}

fn convolve_band(band: ArrayView2<f32>, ctx: &ExecutionContext) -> Array2<f32> {
    let (rows, cols) = band.dim();
    let data: Vec<f32> = if ctx.is_parallel() {
        ctx.run(|| {
            (0..rows)
                .into_par_iter()
                .flat_map_iter(|row| convolve_row(band, row))
                .collect()
        })
    } else {
        (0..rows).flat_map(|row| convolve_row(band, row)).collect()
    };
    Array2::from_shape_vec((rows, cols), data).expect("row-major buffer matches band shape")
}

fn convolve_row(band: ArrayView2<f32>, row: usize) -> Vec<f32> {
    (0..band.ncols())
        .map(|col| window_sum(band, row, col))
        .collect()
}

/// Kernel-weighted sum of the 5x5 window centered at (row, col).
/// Out-of-bounds neighbors contribute NaN (constant-NaN border policy).
fn window_sum(band: ArrayView2<f32>, row: usize, col: usize) -> f32 {
    let (rows, cols) = band.dim();
    let mut acc = 0.0f32;
    for (kr, kernel_row) in HPF_KERNEL.iter().enumerate() {
        for (kc, &weight) in kernel_row.iter().enumerate() {
            let r = row as isize + kr as isize - KERNEL_RADIUS;
            let c = col as isize + kc as isize - KERNEL_RADIUS;
            let value = if r < 0 || c < 0 || r >= rows as isize || c >= cols as isize {
                f32::NAN
            } else {
                band[[r as usize, c as usize]]
            };
            acc += weight * value;
        }
    }
    acc
}
