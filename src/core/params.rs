use serde::{Deserialize, Serialize};

use crate::types::Execution;

/// Pipeline parameters suitable for config files and presets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharpenParams {
    /// Nodata sentinel threaded through reader, fusion and writer. Cells
    /// exactly equal to it are carried as NaN internally. None disables
    /// substitution; fused NaN cells then stay NaN in the output.
    pub nodata: Option<f64>,
    /// Execution policy for filtering and fusion.
    pub execution: Execution,
    /// Target SRS for the resampling step; None reuses the PAN raster's own.
    pub target_crs: Option<String>,
    /// gdalwarp resampling algorithm; None means cubicspline.
    pub resample_alg: Option<String>,
}

impl Default for SharpenParams {
    fn default() -> Self {
        Self {
            nodata: None,
            execution: Execution::Sequential,
            target_crs: None,
            resample_alg: None,
        }
    }
}
