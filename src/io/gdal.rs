use gdal::Dataset;
use gdal::errors::GdalError as GdalCrateError;
use ndarray::Array2;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::types::RasterStack;

/// Errors from the GDAL-backed reader and writer.
#[derive(Debug, Error)]
pub enum GdalError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] GdalCrateError),
    #[error("No raster bands found in dataset")]
    NoBands,
    #[error("Dataset has no geotransform")]
    MissingGeotransform,
    #[error("Band index {0} out of range (1..={1})")]
    BandIndex(usize, usize),
    #[error("Nodata sentinel must be finite, got {0}")]
    InvalidNodata(f64),
    #[error("Band shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Metadata extracted from a GDAL-supported dataset
#[derive(Debug, Clone)]
pub struct GdalMetadata {
    /// Width (pixels) of the raster
    pub size_x: usize,
    /// Height (lines) of the raster
    pub size_y: usize,
    /// Number of raster bands
    pub bands: usize,
    /// Affine geotransform coefficients ([origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height])
    pub geotransform: [f64; 6],
    /// Projection in WKT format
    pub projection: String,
    /// EPSG code parsed from the WKT authority tag, when present
    pub epsg: Option<String>,
}

/// Reader for generic geospatial formats via GDAL
pub struct GdalRasterReader {
    pub dataset: Dataset,
    pub metadata: GdalMetadata,
}

// Helper to extract EPSG code from WKT authority tag
fn parse_epsg(wkt: &str) -> Option<String> {
    const KEY: &str = "AUTHORITY[\"EPSG\",\"";
    if let Some(idx) = wkt.rfind(KEY) {
        let start = idx + KEY.len();
        if let Some(end) = wkt[start..].find('"') {
            let code = &wkt[start..start + end];
            return Some(format!("EPSG:{}", code));
        }
    }
    None
}

impl GdalRasterReader {
    /// Open a GDAL-supported raster (e.g., GeoTIFF, ENVI, NetCDF) read-only.
    ///
    /// A dataset with zero bands or without a geotransform is rejected here
    /// rather than at first use.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GdalError> {
        let dataset = Dataset::open(path.as_ref())?;
        let (size_x, size_y) = dataset.raster_size();
        let bands = dataset.raster_count() as usize;
        if bands == 0 {
            return Err(GdalError::NoBands);
        }
        let geotransform = dataset
            .geo_transform()
            .map_err(|_| GdalError::MissingGeotransform)?;
        let projection = dataset.projection();
        let epsg = parse_epsg(&projection);
        Ok(GdalRasterReader {
            dataset,
            metadata: GdalMetadata {
                size_x: size_x as usize,
                size_y: size_y as usize,
                bands,
                geotransform,
                projection,
                epsg,
            },
        })
    }

    /// Read a single band (1-based index) as an f32 ndarray of shape (rows, cols)
    pub fn read_band(&self, index: usize) -> Result<Array2<f32>, GdalError> {
        if index == 0 || index > self.metadata.bands {
            return Err(GdalError::BandIndex(index, self.metadata.bands));
        }
        let band = self.dataset.rasterband(index)?;
        // Full window based on metadata
        let window = (self.metadata.size_x, self.metadata.size_y);
        let buf = band.read_as::<f32>((0, 0), window, window, None)?;
        let data_vec = buf.data().to_vec();
        let array = Array2::from_shape_vec((self.metadata.size_y, self.metadata.size_x), data_vec)?;
        Ok(array)
    }

    /// Read every band in order into a `RasterStack`, replacing cells exactly
    /// equal to the sentinel with NaN. `None` disables substitution.
    pub fn read_stack(&self, nodata: Option<f64>) -> Result<RasterStack, GdalError> {
        if let Some(value) = nodata {
            if !value.is_finite() {
                return Err(GdalError::InvalidNodata(value));
            }
        }
        let sentinel = nodata.map(|v| v as f32);
        let mut bands = Vec::with_capacity(self.metadata.bands);
        for index in 1..=self.metadata.bands {
            let mut band = self.read_band(index)?;
            if let Some(fill) = sentinel {
                band.mapv_inplace(|v| if v == fill { f32::NAN } else { v });
            }
            bands.push(band);
        }
        debug!(
            bands = bands.len(),
            rows = self.metadata.size_y,
            cols = self.metadata.size_x,
            "read raster stack"
        );
        Ok(RasterStack::from_bands(
            bands,
            self.metadata.projection.clone(),
            self.metadata.geotransform,
        )?)
    }
}

/// Read a raster into memory in one call.
pub fn read_raster<P: AsRef<Path>>(path: P, nodata: Option<f64>) -> Result<RasterStack, GdalError> {
    GdalRasterReader::open(path)?.read_stack(nodata)
}
