use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::types::BoundingBox;

/// Errors from the external gdalwarp collaborator.
#[derive(Debug, Error)]
pub enum WarpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("gdalwarp exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("Cache sidecar error: {0}")]
    Sidecar(#[from] serde_json::Error),
}

/// Default resampling algorithm for bringing MUL onto the PAN grid.
pub const DEFAULT_RESAMPLE_ALG: &str = "cubicspline";

/// Parameters of one resampling run. They key the cache: a resampled
/// artifact is reused only when the parameters recorded beside it match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarpParams {
    /// Target grid: the PAN raster's extent and resolution.
    pub bbox: BoundingBox,
    /// Target spatial reference passed to `-t_srs` (EPSG code or WKT).
    pub target_srs: String,
    /// gdalwarp `-r` algorithm.
    pub resample_alg: String,
}

/// Sidecar recorded next to the resampled artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct WarpSidecar {
    source: PathBuf,
    params: WarpParams,
    created: String,
}

fn sidecar_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".warp.json");
    output.with_file_name(name)
}

/// gdalwarp argv for resampling `input` onto the grid described by `params`.
pub fn build_warp_args(input: &Path, output: &Path, params: &WarpParams) -> Vec<String> {
    let b = &params.bbox;
    vec![
        "-of".to_string(),
        "GTiff".to_string(),
        "-ot".to_string(),
        "Float32".to_string(),
        "-r".to_string(),
        params.resample_alg.clone(),
        "-co".to_string(),
        "COMPRESS=DEFLATE".to_string(),
        "-co".to_string(),
        "PREDICTOR=3".to_string(),
        "-tr".to_string(),
        b.res_x.to_string(),
        b.res_y.to_string(),
        "-te".to_string(),
        b.min_x.to_string(),
        b.min_y.to_string(),
        b.max_x.to_string(),
        b.max_y.to_string(),
        "-t_srs".to_string(),
        params.target_srs.clone(),
        input.display().to_string(),
        output.display().to_string(),
        "-overwrite".to_string(),
    ]
}

/// Whether a cached artifact at `output` was produced from `source` with the
/// same parameters. A bare file with no (or stale) sidecar never matches.
pub fn cache_matches(source: &Path, output: &Path, params: &WarpParams) -> bool {
    if !output.exists() {
        return false;
    }
    let raw = match std::fs::read_to_string(sidecar_path(output)) {
        Ok(raw) => raw,
        Err(_) => return false,
    };
    match serde_json::from_str::<WarpSidecar>(&raw) {
        Ok(sidecar) => sidecar.source == source && sidecar.params == *params,
        Err(_) => false,
    }
}

/// Run gdalwarp, then record the sidecar that keys future cache hits.
pub fn warp_to_grid(input: &Path, output: &Path, params: &WarpParams) -> Result<(), WarpError> {
    let args = build_warp_args(input, output, params);
    debug!(?args, "invoking gdalwarp");
    let result = Command::new("gdalwarp").args(&args).output()?;
    if !result.status.success() {
        return Err(WarpError::Failed {
            status: result.status.to_string(),
            stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
        });
    }
    let sidecar = WarpSidecar {
        source: input.to_path_buf(),
        params: params.clone(),
        created: chrono::Utc::now().to_rfc3339(),
    };
    std::fs::write(sidecar_path(output), serde_json::to_string_pretty(&sidecar)?)?;
    info!(path = %output.display(), "resampled raster written");
    Ok(())
}

/// Resample unless a cached artifact produced with identical parameters
/// already exists at `output`.
pub fn resample_if_needed(input: &Path, output: &Path, params: &WarpParams) -> Result<(), WarpError> {
    if cache_matches(input, output, params) {
        info!(path = %output.display(), "reusing cached resampled raster");
        return Ok(());
    }
    warp_to_grid(input, output, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> WarpParams {
        WarpParams {
            bbox: BoundingBox {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 10.0,
                max_y: 10.0,
                res_x: 1.0,
                res_y: -1.0,
            },
            target_srs: "EPSG:32642".to_string(),
            resample_alg: DEFAULT_RESAMPLE_ALG.to_string(),
        }
    }

    #[test]
    fn warp_args_carry_grid_and_srs() {
        let args = build_warp_args(Path::new("in.tif"), Path::new("out.tif"), &params());
        let joined = args.join(" ");
        assert!(joined.contains("-of GTiff"));
        assert!(joined.contains("-ot Float32"));
        assert!(joined.contains("-r cubicspline"));
        assert!(joined.contains("-co COMPRESS=DEFLATE"));
        assert!(joined.contains("-co PREDICTOR=3"));
        assert!(joined.contains("-tr 1 -1"));
        assert!(joined.contains("-te 0 0 10 10"));
        assert!(joined.contains("-t_srs EPSG:32642"));
        assert_eq!(args.last().map(String::as_str), Some("-overwrite"));
    }

    #[test]
    fn sidecar_sits_next_to_the_artifact() {
        assert_eq!(
            sidecar_path(Path::new("/data/mul_resampled.tif")),
            Path::new("/data/mul_resampled.tif.warp.json")
        );
    }

    #[test]
    fn cache_misses_without_artifact_or_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.tif");
        assert!(!cache_matches(Path::new("in.tif"), &out, &params()));
        // artifact alone is not enough: existence is not the cache key
        std::fs::write(&out, b"tif").unwrap();
        assert!(!cache_matches(Path::new("in.tif"), &out, &params()));
    }

    #[test]
    fn cache_hit_requires_matching_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.tif");
        std::fs::write(&out, b"tif").unwrap();
        let sidecar = WarpSidecar {
            source: PathBuf::from("in.tif"),
            params: params(),
            created: "2024-01-01T00:00:00Z".to_string(),
        };
        std::fs::write(
            sidecar_path(&out),
            serde_json::to_string(&sidecar).unwrap(),
        )
        .unwrap();
        assert!(cache_matches(Path::new("in.tif"), &out, &params()));

        let mut changed = params();
        changed.resample_alg = "bilinear".to_string();
        assert!(!cache_matches(Path::new("in.tif"), &out, &changed));

        let mut moved = params();
        moved.bbox.max_x = 20.0;
        assert!(!cache_matches(Path::new("in.tif"), &out, &moved));

        assert!(!cache_matches(Path::new("other.tif"), &out, &params()));
    }
}
