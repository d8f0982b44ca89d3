//! Contracts for the external collaborators.
//!
//! PDF decoding, page rasterization, and the drawing surface live outside
//! this workspace (pdf.js and a canvas library in the browser build, fakes
//! in tests). These traits are the narrow seams the editor drives them
//! through. Every `async fn` is a suspension point; implementations are
//! single-threaded and need not be `Send`.

use crate::raster::{CaptureOptions, RasterImage};
use serde::{Deserialize, Serialize};
use sp_core::{OverlayObject, Result, Rotation};

/// Decodes PDF bytes into a page source.
#[allow(async_fn_in_trait)]
pub trait PdfLoader {
    type Document: SourceDocument;

    /// Fails with `Error::DecodeFailure` on malformed input.
    async fn load(&self, bytes: &[u8]) -> Result<Self::Document>;
}

/// A loaded source document.
#[allow(async_fn_in_trait)]
pub trait SourceDocument {
    fn page_count(&self) -> u32;

    /// Rasterize 1-based `page`; deterministic for a fixed scale and rotation.
    /// Fails with `Error::RenderFailure`.
    async fn render_page(&self, page: u32, scale: f64, rotation: Rotation) -> Result<RasterImage>;
}

/// Opaque reference to a background image owned by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackgroundHandle(pub u64);

/// An installed page background. `width`/`height` are unrotated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub handle: BackgroundHandle,
    pub width: f64,
    pub height: f64,
}

/// Everything a surface needs to draw one page.
#[derive(Debug, Clone, Copy)]
pub struct SceneView<'a> {
    pub page: u32,
    pub background: Option<&'a Background>,
    pub rotation: Rotation,
    /// Back-to-front.
    pub objects: &'a [OverlayObject],
}

impl SceneView<'_> {
    /// Canvas size after rotation; `None` before the background is loaded.
    pub fn canvas_size(&self) -> Option<(f64, f64)> {
        self.background
            .map(|bg| self.rotation.apply_to_size(bg.width, bg.height))
    }
}

/// The interactive drawing surface.
#[allow(async_fn_in_trait)]
pub trait Surface {
    /// Take ownership of a rendered page image and show it rotated.
    fn install_background(
        &mut self,
        page: u32,
        image: RasterImage,
        rotation: Rotation,
    ) -> Result<Background>;

    /// Re-render an installed background at a new angle.
    fn rotate_background(&mut self, background: &Background, rotation: Rotation) -> Result<()>;

    /// Redraw background and overlays.
    fn present(&mut self, scene: &SceneView<'_>);

    /// Force a synchronous re-render of `scene`, wait `options.settle`,
    /// then rasterize at `options.multiplier`.
    async fn capture(
        &mut self,
        scene: &SceneView<'_>,
        options: &CaptureOptions,
    ) -> Result<RasterImage>;
}
