//! Raster images exchanged with the rendering collaborators.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A JPEG-encoded bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RasterImage {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }
}

/// Output page dimensions in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const A4_PORTRAIT: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4_PORTRAIT
    }
}

/// How an edited page is rasterized for export.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOptions {
    /// Encoder quality in `0.0..=1.0`.
    pub quality: f32,
    /// Resolution multiplier over the editing canvas size.
    pub multiplier: f64,
    /// Wait after the forced re-render before reading pixels back.
    pub settle: Duration,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            quality: 1.0,
            multiplier: 2.0,
            settle: Duration::from_millis(100),
        }
    }
}
