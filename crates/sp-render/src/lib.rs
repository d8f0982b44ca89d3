pub mod backend;
pub mod hit;
pub mod pdf;
pub mod raster;

pub use backend::{Background, BackgroundHandle, PdfLoader, SceneView, SourceDocument, Surface};
pub use pdf::{ExportArtifact, LopdfWriter, PdfWriter};
pub use raster::{CaptureOptions, PageSize, RasterImage};
