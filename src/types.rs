//! Shared core types: the in-memory `RasterStack`, the derived `BoundingBox`,
//! and the `Execution` policy injected into the processing stages.
use ndarray::{Array2, Array3, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Execution policy for the spatial stages (filtering, fusion).
///
/// The pipeline runs sequentially end-to-end by default. Parallelism is opt-in
/// and scoped to a dedicated pool owned by the execution context; no global
/// state is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Execution {
    Sequential,
    /// Per-row data parallelism on a dedicated pool.
    /// `threads == 0` lets rayon pick the pool size.
    Parallel { threads: usize },
}

impl Default for Execution {
    fn default() -> Self {
        Execution::Sequential
    }
}

/// Spatial extent plus pixel resolution of a raster.
///
/// Derived on demand from a geotransform and pixel dimensions, never cached.
/// `res_y` keeps its sign: negative for north-up rasters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub res_x: f64,
    pub res_y: f64,
}

impl BoundingBox {
    /// Derive the extent from an affine geotransform and pixel dimensions.
    ///
    /// The upper-left corner is the transform origin; the lower-right corner
    /// is origin + dimension * pixel size per axis.
    pub fn from_geotransform(geotransform: &[f64; 6], cols: usize, rows: usize) -> Self {
        let res_x = geotransform[1];
        let res_y = geotransform[5];
        let ulx = geotransform[0];
        let uly = geotransform[3];
        let lrx = ulx + cols as f64 * res_x;
        let lry = uly + rows as f64 * res_y;
        BoundingBox {
            min_x: ulx,
            min_y: lry,
            max_x: lrx,
            max_y: uly,
            res_x,
            res_y,
        }
    }
}

/// An ordered stack of equally shaped raster bands with georeferencing.
///
/// Band data lives in a single `(band, row, column)` array; nodata cells are
/// `f32::NAN`. Stacks are never mutated in place: filtering and fusion produce
/// new stacks, and the writer consumes one.
#[derive(Debug, Clone)]
pub struct RasterStack {
    pub bands: Array3<f32>,
    /// Opaque spatial reference (WKT, PROJ or EPSG string).
    pub projection: String,
    /// Affine geotransform ([origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height]).
    pub geotransform: [f64; 6],
}

impl RasterStack {
    /// Stack individual band arrays into a `(band, row, column)` cube.
    pub fn from_bands(
        bands: Vec<Array2<f32>>,
        projection: String,
        geotransform: [f64; 6],
    ) -> Result<Self, ndarray::ShapeError> {
        let views: Vec<ArrayView2<f32>> = bands.iter().map(|b| b.view()).collect();
        let cube = ndarray::stack(Axis(0), &views)?;
        Ok(RasterStack {
            bands: cube,
            projection,
            geotransform,
        })
    }

    pub fn band_count(&self) -> usize {
        self.bands.len_of(Axis(0))
    }

    pub fn rows(&self) -> usize {
        self.bands.len_of(Axis(1))
    }

    pub fn cols(&self) -> usize {
        self.bands.len_of(Axis(2))
    }

    /// Zero-based view of one band.
    pub fn band(&self, index: usize) -> ArrayView2<f32> {
        self.bands.index_axis(Axis(0), index)
    }

    /// Extent and resolution derived from the geotransform.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::from_geotransform(&self.geotransform, self.cols(), self.rows())
    }
}
