//! Export pipeline: flatten every page into one output document.
//!
//! Pages are processed strictly in order, one full render/capture cycle at
//! a time. Edited pages are captured from the surface with their overlays;
//! every other page is re-rendered from the source at its recorded
//! rotation. Each image fills the whole output page.
//!
//! A page that fails to render is logged and left blank so the output keeps
//! one page per source page. Any other failure (no pages, a non-render error
//! from a collaborator, the writer refusing a page or image) aborts the
//! export.

use crate::config::EditorConfig;
use crate::document::DocumentSession;
use sp_core::{Error, Result};
use sp_render::{ExportArtifact, PdfWriter, RasterImage, SourceDocument, Surface};

/// How one output page was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageExport {
    /// Captured from the editing surface with overlays.
    Edited,
    /// Rendered from the untouched source page.
    Original,
    /// Rendering failed; a blank page stands in.
    Substituted { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    pub page: u32,
    pub export: PageExport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub artifact: ExportArtifact,
    /// One entry per output page, in page order.
    pub pages: Vec<PageOutcome>,
}

impl ExportReport {
    pub fn failed_pages(&self) -> Vec<u32> {
        self.pages
            .iter()
            .filter(|p| matches!(p.export, PageExport::Substituted { .. }))
            .map(|p| p.page)
            .collect()
    }
}

pub struct ExportPipeline<'a> {
    config: &'a EditorConfig,
}

impl<'a> ExportPipeline<'a> {
    pub fn new(config: &'a EditorConfig) -> Self {
        Self { config }
    }

    pub async fn run<D, S, W>(
        &self,
        session: &DocumentSession,
        source: &D,
        surface: &mut S,
        mut writer: W,
    ) -> Result<ExportReport>
    where
        D: SourceDocument,
        S: Surface,
        W: PdfWriter,
    {
        let total = session.total_pages();
        if total == 0 || source.page_count() == 0 {
            return Err(Error::Export("document has no pages".into()));
        }
        if source.page_count() != total {
            log::warn!(
                "session has {total} page(s) but source reports {}",
                source.page_count()
            );
        }
        log::info!("exporting {} ({total} page(s))", session.file_name());

        let mut pages = Vec::with_capacity(total as usize);
        for page in 1..=total {
            writer
                .add_page()
                .map_err(|e| Error::Export(format!("page {page}: {e}")))?;

            let (edited, rendered) = self.render(session, source, surface, page).await;
            let export = match rendered {
                Ok(image) => {
                    self.place(&mut writer, &image)?;
                    if edited {
                        PageExport::Edited
                    } else {
                        PageExport::Original
                    }
                }
                Err(e) if e.is_page_scoped() => {
                    log::warn!("page {page} left blank: {e}");
                    PageExport::Substituted {
                        reason: e.to_string(),
                    }
                }
                Err(e) => return Err(Error::Export(format!("page {page}: {e}"))),
            };
            pages.push(PageOutcome { page, export });
        }

        let artifact = writer.finish(session.file_name())?;
        Ok(ExportReport { artifact, pages })
    }

    /// Rasterize one page. Returns whether it was taken from the surface.
    /// An empty raster counts as a render failure of that page.
    async fn render<D, S>(
        &self,
        session: &DocumentSession,
        source: &D,
        surface: &mut S,
        page: u32,
    ) -> (bool, Result<RasterImage>)
    where
        D: SourceDocument,
        S: Surface,
    {
        let (edited, image) = match session.page(page).filter(|p| p.has_edits()) {
            Some(edited) => {
                let options = self.config.capture_options();
                (true, surface.capture(&edited.scene(), &options).await)
            }
            None => {
                let rotation = session.recorded_rotation(page);
                let image = source
                    .render_page(page, self.config.source_render_scale, rotation)
                    .await;
                (false, image)
            }
        };
        let image = image.and_then(|image| {
            if image.is_empty() {
                Err(Error::RenderFailure {
                    page,
                    reason: "rendered an empty image".into(),
                })
            } else {
                Ok(image)
            }
        });
        (edited, image)
    }

    fn place<W: PdfWriter>(&self, writer: &mut W, image: &RasterImage) -> Result<()> {
        let size = writer.page_size();
        writer.add_image(image, 0.0, 0.0, size.width, size.height)
    }
}
