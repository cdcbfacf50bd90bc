//! High-level, ergonomic entry points: bounding-box lookup, the in-memory
//! pansharpening pipeline, and file-to-file helpers that orchestrate
//! resampling, filtering, fusion and writing. Prefer these over the
//! low-level modules when integrating the crate.
use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::exec::ExecutionContext;
use crate::core::params::SharpenParams;
use crate::core::processing::filter::high_pass_filter;
use crate::core::processing::fusion::fuse;
use crate::error::Result;
use crate::io::gdal::GdalRasterReader;
use crate::io::warp::{self, DEFAULT_RESAMPLE_ALG, WarpParams};
use crate::io::writers::tiff::write_stack;
use crate::types::{BoundingBox, RasterStack};

/// Bounding box plus resolution of a raster on disk.
pub fn get_bbox(path: &Path) -> Result<BoundingBox> {
    let reader = GdalRasterReader::open(path)?;
    Ok(BoundingBox::from_geotransform(
        &reader.metadata.geotransform,
        reader.metadata.size_x,
        reader.metadata.size_y,
    ))
}

/// Pansharpen an already-resampled MUL raster against PAN, in memory.
///
/// Both rasters are read with the sentinel substituted to NaN, PAN spatial
/// detail is extracted with the fixed 5x5 high-pass kernel, and each MUL
/// band is fused as `mul + (pan - pan_highpass)`. The result carries PAN's
/// geotransform and projection.
pub fn pansharpen_to_stack(
    mul_resampled: &Path,
    pan: &Path,
    params: &SharpenParams,
) -> Result<RasterStack> {
    let ctx = ExecutionContext::new(params.execution)?;

    info!(pan = %pan.display(), "reading PAN raster");
    let pan_stack = GdalRasterReader::open(pan)?.read_stack(params.nodata)?;
    let pan_detail = high_pass_filter(&pan_stack, &ctx);

    info!(mul = %mul_resampled.display(), "reading resampled MUL raster");
    let mul_stack = GdalRasterReader::open(mul_resampled)?.read_stack(params.nodata)?;

    fuse(&mul_stack, &pan_stack, &pan_detail, params.nodata, &ctx)
}

/// Pansharpen to a Float32 DEFLATE-compressed GTiff at `output`.
pub fn pansharpen_to_path(
    mul_resampled: &Path,
    pan: &Path,
    output: &Path,
    params: &SharpenParams,
) -> Result<()> {
    let fused = pansharpen_to_stack(mul_resampled, pan, params)?;
    write_stack(output, &fused, params.nodata)?;
    Ok(())
}

/// Resample MUL onto PAN's grid (extent, resolution, SRS) via gdalwarp,
/// reusing a cached artifact when its recorded parameters match.
pub fn resample_to_pan_grid(
    mul: &Path,
    pan: &Path,
    resampled: &Path,
    params: &SharpenParams,
) -> Result<()> {
    let reader = GdalRasterReader::open(pan)?;
    let bbox = BoundingBox::from_geotransform(
        &reader.metadata.geotransform,
        reader.metadata.size_x,
        reader.metadata.size_y,
    );
    let target_srs = match &params.target_crs {
        Some(crs) => crs.clone(),
        None => reader
            .metadata
            .epsg
            .clone()
            .unwrap_or_else(|| reader.metadata.projection.clone()),
    };
    let warp_params = WarpParams {
        bbox,
        target_srs,
        resample_alg: params
            .resample_alg
            .clone()
            .unwrap_or_else(|| DEFAULT_RESAMPLE_ALG.to_string()),
    };
    warp::resample_if_needed(mul, resampled, &warp_params)?;
    Ok(())
}

/// Derived location of the resampled MUL artifact: `<stem>_resampled.tif`
/// next to the MUL input.
pub fn resampled_path(mul: &Path) -> PathBuf {
    let stem = mul
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    mul.with_file_name(format!("{stem}_resampled.tif"))
}

/// Full pipeline for a raw MUL/PAN pair: resample MUL onto PAN's grid
/// (cached), then pansharpen to `output`.
pub fn pansharpen_pair(
    mul: &Path,
    pan: &Path,
    output: &Path,
    params: &SharpenParams,
) -> Result<()> {
    let resampled = resampled_path(mul);
    resample_to_pan_grid(mul, pan, &resampled, params)?;
    pansharpen_to_path(&resampled, pan, output, params)
}
