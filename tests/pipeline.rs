//! End-to-end pipeline tests against real GeoTIFFs on disk.
use std::path::Path;

use approx::assert_abs_diff_eq;
use ndarray::Array2;
use tempfile::TempDir;

use panshade::{
    BoundingBox, Execution, ExecutionContext, GdalRasterReader, RasterStack, SharpenParams,
    get_bbox, high_pass_filter, pansharpen_to_path, pansharpen_to_stack, read_raster, write_stack,
};

const GT: [f64; 6] = [0.0, 1.0, 0.0, 10.0, 0.0, -1.0];
const SENTINEL: f64 = -9999.0;

fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn write_raster(path: &Path, bands: Vec<Array2<f32>>) {
    let stack = RasterStack::from_bands(bands, String::new(), GT).unwrap();
    write_stack(path, &stack, None).unwrap();
}

fn seq_ctx() -> ExecutionContext {
    ExecutionContext::new(Execution::Sequential).unwrap()
}

#[test]
fn end_to_end_fusion_matches_formula() {
    init_logs();
    let dir = TempDir::new().unwrap();
    let pan_path = dir.path().join("pan.tif");
    let mul_path = dir.path().join("mul_resampled.tif");
    let out_path = dir.path().join("fused.tif");

    let pan_band = Array2::from_shape_fn((10, 10), |(r, c)| (r * 10 + c) as f32);
    write_raster(&pan_path, vec![pan_band.clone()]);

    let mul_bands: Vec<Array2<f32>> = (0..3)
        .map(|k| Array2::from_shape_fn((10, 10), |(r, c)| (k * 100) as f32 + (r + c) as f32))
        .collect();
    write_raster(&mul_path, mul_bands.clone());

    let params = SharpenParams {
        nodata: Some(SENTINEL),
        ..Default::default()
    };
    pansharpen_to_path(&mul_path, &pan_path, &out_path, &params).unwrap();

    let fused = read_raster(&out_path, None).unwrap();
    assert_eq!(fused.band_count(), 3);
    assert_eq!((fused.rows(), fused.cols()), (10, 10));
    assert_eq!(fused.geotransform, GT);

    // Expected PAN detail from the library's own filter
    let pan_stack = RasterStack::from_bands(vec![pan_band.clone()], String::new(), GT).unwrap();
    let convolved = high_pass_filter(&pan_stack, &seq_ctx());

    for (k, mul_band) in mul_bands.iter().enumerate() {
        let band = fused.band(k);
        for r in 0..10 {
            for c in 0..10 {
                let interior = (2..8).contains(&r) && (2..8).contains(&c);
                if interior {
                    let expected =
                        mul_band[[r, c]] + (pan_band[[r, c]] - convolved.band(0)[[r, c]]);
                    assert_abs_diff_eq!(band[[r, c]], expected, epsilon = 1e-3);
                } else {
                    assert_eq!(
                        band[[r, c]],
                        SENTINEL as f32,
                        "border at ({r},{c}) band {k}"
                    );
                }
            }
        }
    }
}

#[test]
fn nodata_sentinel_roundtrips_through_the_pipeline() {
    init_logs();
    let dir = TempDir::new().unwrap();
    let pan_path = dir.path().join("pan.tif");
    let mul_path = dir.path().join("mul_resampled.tif");
    let out_path = dir.path().join("fused.tif");

    write_raster(&pan_path, vec![Array2::from_elem((10, 10), 100.0)]);

    let mut mul_band = Array2::from_shape_fn((10, 10), |(r, c)| (r + c) as f32);
    mul_band[[5, 5]] = SENTINEL as f32;
    write_raster(&mul_path, vec![mul_band.clone()]);

    let params = SharpenParams {
        nodata: Some(SENTINEL),
        ..Default::default()
    };
    pansharpen_to_path(&mul_path, &pan_path, &out_path, &params).unwrap();

    let fused = read_raster(&out_path, None).unwrap();
    // the masked MUL cell came back as the sentinel, not as data
    assert_eq!(fused.band(0)[[5, 5]], SENTINEL as f32);
    // a flat PAN adds its own value and no detail in the interior
    assert_abs_diff_eq!(fused.band(0)[[4, 4]], mul_band[[4, 4]] + 100.0, epsilon = 1e-3);

    // every band carries the sentinel tag
    let reader = GdalRasterReader::open(&out_path).unwrap();
    let tag = reader.dataset.rasterband(1).unwrap().no_data_value();
    assert_eq!(tag, Some(SENTINEL));
}

#[test]
fn without_sentinel_nan_cells_stay_nan_and_band_is_nan_tagged() {
    init_logs();
    let dir = TempDir::new().unwrap();
    let pan_path = dir.path().join("pan.tif");
    let mul_path = dir.path().join("mul_resampled.tif");
    let out_path = dir.path().join("fused.tif");

    write_raster(&pan_path, vec![Array2::from_elem((10, 10), 50.0)]);
    write_raster(&mul_path, vec![Array2::from_elem((10, 10), 5.0)]);

    pansharpen_to_path(&mul_path, &pan_path, &out_path, &SharpenParams::default()).unwrap();

    let fused = read_raster(&out_path, None).unwrap();
    // filter border, no sentinel to restore
    assert!(fused.band(0)[[0, 0]].is_nan());
    assert!(!fused.band(0)[[5, 5]].is_nan());

    let reader = GdalRasterReader::open(&out_path).unwrap();
    let tag = reader.dataset.rasterband(1).unwrap().no_data_value();
    assert!(tag.is_some_and(f64::is_nan));
}

#[test]
fn bbox_of_a_written_raster() {
    init_logs();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pan.tif");
    write_raster(&path, vec![Array2::from_elem((10, 10), 1.0)]);

    let bbox = get_bbox(&path).unwrap();
    assert_eq!(
        bbox,
        BoundingBox {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 10.0,
            max_y: 10.0,
            res_x: 1.0,
            res_y: -1.0,
        }
    );
}

#[test]
fn parallel_pipeline_matches_sequential() {
    init_logs();
    let dir = TempDir::new().unwrap();
    let pan_path = dir.path().join("pan.tif");
    let mul_path = dir.path().join("mul_resampled.tif");

    write_raster(
        &pan_path,
        vec![Array2::from_shape_fn((10, 10), |(r, c)| (r * c) as f32 * 0.5)],
    );
    write_raster(
        &mul_path,
        vec![
            Array2::from_shape_fn((10, 10), |(r, c)| (r + c) as f32),
            Array2::from_shape_fn((10, 10), |(r, c)| (r * 2 + c) as f32),
        ],
    );

    let seq = pansharpen_to_stack(&mul_path, &pan_path, &SharpenParams::default()).unwrap();
    let par = pansharpen_to_stack(
        &mul_path,
        &pan_path,
        &SharpenParams {
            execution: Execution::Parallel { threads: 2 },
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(seq.band_count(), par.band_count());
    for (a, b) in seq.bands.iter().zip(par.bands.iter()) {
        assert!((a.is_nan() && b.is_nan()) || a == b);
    }
}
