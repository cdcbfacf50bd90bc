#![doc = r#"
PANSHADE — a high-performance HPF pansharpening engine.

This crate fuses a high-resolution single-band panchromatic (PAN) raster with
a lower-resolution multi-band (MUL) raster into a pansharpened multi-band
GeoTIFF at PAN resolution, using the High-Pass-Filter fusion method
(Gangkofner et al., 2007). It reads any GDAL-supported raster, extracts PAN
spatial detail with a fixed 5x5 kernel, adds that detail to every MUL band,
and writes a Float32 DEFLATE-compressed GeoTIFF carrying PAN's
georeferencing.

Requirements
------------
- GDAL development headers and runtime available on your system.
- The `gdalwarp` binary on PATH when using the resampling helpers.
- Rust 2024 edition toolchain.

Quick start: pansharpen a pre-resampled pair
--------------------------------------------
The MUL raster must already sit on PAN's grid (extent, resolution, SRS);
use [`pansharpen_pair`] when it does not.

```rust,no_run
use std::path::Path;
use panshade::{SharpenParams, pansharpen_to_path};

fn main() -> panshade::Result<()> {
    let params = SharpenParams {
        nodata: Some(0.0),
        ..Default::default()
    };
    pansharpen_to_path(
        Path::new("/data/mul_resampled.tif"),
        Path::new("/data/pan.tif"),
        Path::new("/out/pansharpened.tif"),
        &params,
    )
}
```

Full pipeline including resampling
----------------------------------
[`pansharpen_pair`] shells out to `gdalwarp` to bring the MUL raster onto
PAN's grid first, caching the resampled artifact keyed by the warp
parameters (extent, resolution, SRS, algorithm):

```rust,no_run
use std::path::Path;
use panshade::{Execution, SharpenParams, pansharpen_pair};

fn main() -> panshade::Result<()> {
    let params = SharpenParams {
        nodata: Some(0.0),
        execution: Execution::Parallel { threads: 0 },
        target_crs: Some("EPSG:32642".to_string()),
        resample_alg: None,
    };
    pansharpen_pair(
        Path::new("/data/mul.tif"),
        Path::new("/data/pan.tif"),
        Path::new("/out/pansharpened.tif"),
        &params,
    )
}
```

In-memory processing
--------------------
```rust,no_run
use std::path::Path;
use panshade::{SharpenParams, pansharpen_to_stack};

fn main() -> panshade::Result<()> {
    let fused = pansharpen_to_stack(
        Path::new("/data/mul_resampled.tif"),
        Path::new("/data/pan.tif"),
        &SharpenParams::default(),
    )?;
    println!(
        "{} bands of {}x{}",
        fused.band_count(),
        fused.rows(),
        fused.cols()
    );
    Ok(())
}
```

Error handling
--------------
All public functions return [`Result`]; match on [`Error`] to handle specific
cases, e.g. GDAL reader errors or gdalwarp failures.

Useful modules
--------------
- [`api`] — high-level, ergonomic entry points.
- [`types`] — core types (`RasterStack`, `BoundingBox`, `Execution`).
- [`core`] — filtering, fusion, and the execution context.
- [`io`] — GDAL reader, gdalwarp collaborator, and GTiff writer.
- [`error`] — crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use core::params::SharpenParams;
pub use error::{Error, Result};
pub use types::{BoundingBox, Execution, RasterStack};

// Processing primitives
pub use core::exec::ExecutionContext;
pub use core::processing::filter::{HPF_KERNEL, high_pass_filter};
pub use core::processing::fusion::fuse;

// Readers and writers
pub use io::gdal::{GdalError, GdalMetadata, GdalRasterReader, read_raster};
pub use io::warp::{WarpError, WarpParams};
pub use io::writers::tiff::write_stack;

// High-level API re-exports
pub use api::{
    get_bbox, pansharpen_pair, pansharpen_to_path, pansharpen_to_stack, resample_to_pan_grid,
    resampled_path,
};
