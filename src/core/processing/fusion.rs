use ndarray::{Array2, Zip};
use tracing::{debug, info};

use crate::core::exec::ExecutionContext;
use crate::error::{Error, Result};
use crate::types::RasterStack;

/// Additive HPF fusion: for every MUL band,
/// `fused = mul + (pan - pan_highpass)`, evaluated per pixel against band 0
/// of both PAN stacks (pansharpening works from a single-band PAN).
///
/// NaN cells, whether carried in as source nodata or produced by the filter's
/// 2-pixel border, are replaced by `nodata` when a sentinel is supplied and
/// left as NaN otherwise. Bands are produced strictly in input order; the
/// output carries PAN's geotransform and projection.
pub fn fuse(
    mul: &RasterStack,
    pan: &RasterStack,
    pan_highpass: &RasterStack,
    nodata: Option<f64>,
    ctx: &ExecutionContext,
) -> Result<RasterStack> {
    check_shape(pan, mul.rows(), mul.cols())?;
    check_shape(pan_highpass, mul.rows(), mul.cols())?;

    let pan_band = pan.band(0);
    let pan_smooth = pan_highpass.band(0);
    let sentinel = nodata.map(|v| v as f32);

    info!(bands = mul.band_count(), "fusing MUL bands with PAN detail");

    let mut fused_bands: Vec<Array2<f32>> = Vec::with_capacity(mul.band_count());
    for index in 0..mul.band_count() {
        let band = mul.band(index);
        debug!(band = index + 1, rows = mul.rows(), cols = mul.cols(), "fusing band");
        let mut fused = if ctx.is_parallel() {
            ctx.run(|| {
                Zip::from(&band)
                    .and(&pan_band)
                    .and(&pan_smooth)
                    .par_map_collect(|&m, &p, &h| m + (p - h))
            })
        } else {
            Zip::from(&band)
                .and(&pan_band)
                .and(&pan_smooth)
                .map_collect(|&m, &p, &h| m + (p - h))
        };
        if let Some(fill) = sentinel {
            fused.mapv_inplace(|v| if v.is_nan() { fill } else { v });
        }
        fused_bands.push(fused);
    }

    RasterStack::from_bands(fused_bands, pan.projection.clone(), pan.geotransform)
        .map_err(|e| Error::Processing(format!("failed to stack fused bands: {e}")))
}

fn check_shape(stack: &RasterStack, rows: usize, cols: usize) -> Result<()> {
    if stack.rows() != rows || stack.cols() != cols {
        return Err(Error::ShapeMismatch {
            expected_rows: rows,
            expected_cols: cols,
            rows: stack.rows(),
            cols: stack.cols(),
        });
    }
    Ok(())
}
