use gdal::DriverManager;
use gdal::cpl::CslStringList;
use gdal::raster::Buffer;
use std::path::Path;
use tracing::{debug, info};

use crate::io::gdal::GdalError;
use crate::types::RasterStack;

/// GTiff creation options for the fused output: DEFLATE with the horizontal
/// differencing predictor for floating-point data.
const CREATION_OPTIONS: [&str; 2] = ["COMPRESS=DEFLATE", "PREDICTOR=3"];

/// Persist a stack as a Float32 GTiff.
///
/// Each band is tagged with the nodata value (the sentinel, or NaN when none
/// is supplied so nodata cells stay discoverable) before its pixels are
/// written. Georeferencing is attached after all bands, then buffers are
/// flushed to disk.
pub fn write_stack(
    output: &Path,
    stack: &RasterStack,
    nodata: Option<f64>,
) -> Result<(), GdalError> {
    let (rows, cols) = (stack.rows(), stack.cols());
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let mut options = CslStringList::new();
    for opt in CREATION_OPTIONS {
        options.add_string(opt)?;
    }
    let mut dataset = driver.create_with_band_type_with_options::<f32, _>(
        output,
        cols,
        rows,
        stack.band_count(),
        &options,
    )?;

    for index in 0..stack.band_count() {
        let mut band = dataset.rasterband(index + 1)?;
        // nodata tag must precede the pixel data
        band.set_no_data_value(Some(nodata.unwrap_or(f64::NAN)))?;
        let view = stack.band(index);
        let data = match view.as_slice() {
            Some(slice) => slice.to_vec(),
            None => view.iter().copied().collect(),
        };
        let mut buffer = Buffer::new((cols, rows), data);
        band.write((0, 0), (cols, rows), &mut buffer)?;
        debug!(band = index + 1, "wrote band");
    }

    dataset.set_geo_transform(&stack.geotransform)?;
    if !stack.projection.is_empty() {
        dataset.set_projection(&stack.projection)?;
    }
    dataset.flush_cache()?;
    info!(path = %output.display(), bands = stack.band_count(), "wrote raster");
    Ok(())
}
