//! Editor configuration.
//!
//! Every field has a default matching the shipped editor, so hosts only
//! need to pass the values they want to change:
//!
//! ```json
//! { "max_upload_bytes": 5242880, "revisit": "reload" }
//! ```

use serde::{Deserialize, Serialize};
use sp_core::{Error, Result};
use sp_render::{CaptureOptions, PageSize};
use std::time::Duration;

/// What happens to a page's overlays when it is visited again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisitPolicy {
    /// Reuse the cached page session; the background loads on first visit only.
    #[default]
    Preserve,
    /// Re-render the background on every visit, discarding overlays and history.
    Reload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Largest accepted upload. Default: **10 MiB**.
    pub max_upload_bytes: u64,

    /// Scale for page backgrounds and for unedited pages at export. Default: **1.5**.
    pub source_render_scale: f64,

    /// Raster quality for edited pages at export. Default: **1.0**.
    pub export_quality: f32,

    /// Resolution multiplier for edited pages at export. Default: **2.0**.
    pub export_multiplier: f64,

    /// Delay before capturing an edited page. Default: **100 ms**.
    pub settle_delay_ms: u64,

    /// Output page, filled edge to edge. Default: **A4 portrait**.
    pub output_page: PageSize,

    pub revisit: RevisitPolicy,

    /// Quick-whiteout width; height is half. Default: **50**.
    pub eraser_size: f64,

    /// Default: **1.0**.
    pub whiteout_opacity: f32,

    /// Inserted images wider than this are scaled down. Default: **300**.
    pub image_max_width: f64,

    /// Lifetime of a transient notice. Default: **3000 ms**.
    pub notice_duration_ms: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 10 * 1024 * 1024,
            source_render_scale: 1.5,
            export_quality: 1.0,
            export_multiplier: 2.0,
            settle_delay_ms: 100,
            output_page: PageSize::A4_PORTRAIT,
            revisit: RevisitPolicy::Preserve,
            eraser_size: 50.0,
            whiteout_opacity: 1.0,
            image_max_width: 300.0,
            notice_duration_ms: 3000,
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidInput(format!("config: {e}")))
    }

    pub fn capture_options(&self) -> CaptureOptions {
        CaptureOptions {
            quality: self.export_quality,
            multiplier: self.export_multiplier,
            settle: Duration::from_millis(self.settle_delay_ms),
        }
    }
}
