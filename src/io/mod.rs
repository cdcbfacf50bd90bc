//! I/O layer: GDAL-backed raster reading, the external gdalwarp resampling
//! collaborator, and the GTiff writer.
pub mod gdal;
pub use gdal::{GdalError, GdalMetadata, GdalRasterReader, read_raster};

pub mod warp;
pub use warp::{WarpError, WarpParams};

pub mod writers;
