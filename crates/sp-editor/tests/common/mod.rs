//! In-memory stand-ins for the rendering collaborators.

#![allow(dead_code)]

use sp_core::{Error, OverlayObject, Result, Rotation};
use sp_render::{
    Background, BackgroundHandle, CaptureOptions, ExportArtifact, PageSize, PdfLoader, PdfWriter,
    RasterImage, SceneView, SourceDocument, Surface,
};
use std::cell::RefCell;

/// Letter-size page at scale 1.
const PAGE_W: f64 = 612.0;
const PAGE_H: f64 = 792.0;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// What an image was rendered from, encoded in its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Origin {
    Source { page: u32, rotation: i32 },
    Capture(CapturedScene),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedScene {
    pub page: u32,
    pub rotation: i32,
    pub objects: Vec<OverlayObject>,
}

fn encode(origin: &Origin) -> Vec<u8> {
    // JPEG SOI marker, then a debug payload the test writer decodes again.
    let mut data = vec![0xFF, 0xD8];
    data.extend(format!("{origin:?}").into_bytes());
    data
}

// ─── Source ──────────────────────────────────────────────────────────────

pub struct FakeSource {
    pages: u32,
    failing: Vec<u32>,
    unreadable: Vec<u32>,
    pub renders: RefCell<Vec<(u32, Rotation)>>,
}

impl FakeSource {
    pub fn new(pages: u32) -> Self {
        Self {
            pages,
            failing: Vec::new(),
            unreadable: Vec::new(),
            renders: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, page: u32) -> Self {
        self.failing.push(page);
        self
    }

    /// Fail `page` with a decode error rather than a render error.
    pub fn unreadable_on(mut self, page: u32) -> Self {
        self.unreadable.push(page);
        self
    }
}

impl SourceDocument for FakeSource {
    fn page_count(&self) -> u32 {
        self.pages
    }

    async fn render_page(&self, page: u32, scale: f64, rotation: Rotation) -> Result<RasterImage> {
        self.renders.borrow_mut().push((page, rotation));
        if self.failing.contains(&page) {
            return Err(Error::RenderFailure {
                page,
                reason: "corrupt content stream".into(),
            });
        }
        if self.unreadable.contains(&page) {
            return Err(Error::DecodeFailure("document handle was released".into()));
        }
        let (w, h) = rotation.apply_to_size(PAGE_W * scale, PAGE_H * scale);
        let origin = Origin::Source {
            page,
            rotation: rotation.degrees(),
        };
        Ok(RasterImage::new(w as u32, h as u32, encode(&origin)))
    }
}

/// Accepts anything starting with `%PDF-`; the page count is the next byte.
pub struct FakeLoader;

impl PdfLoader for FakeLoader {
    type Document = FakeSource;

    async fn load(&self, bytes: &[u8]) -> Result<FakeSource> {
        match bytes.strip_prefix(b"%PDF-") {
            Some([pages, ..]) => Ok(FakeSource::new(u32::from(*pages))),
            _ => Err(Error::DecodeFailure("missing %PDF- header".into())),
        }
    }
}

pub fn fake_pdf(pages: u8) -> Vec<u8> {
    let mut bytes = b"%PDF-".to_vec();
    bytes.push(pages);
    bytes
}

// ─── Surface ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeSurface {
    next_handle: u64,
    pub installed: Vec<(u32, Rotation)>,
    pub rotations: Vec<(BackgroundHandle, Rotation)>,
    pub presented: Vec<CapturedScene>,
    pub captures: Vec<CapturedScene>,
    pub fail_capture_on: Option<u32>,
    pub fail_rotate: bool,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `capture` fail for `page`.
    pub fn failing_capture_on(mut self, page: u32) -> Self {
        self.fail_capture_on = Some(page);
        self
    }

    /// Make every `rotate_background` call fail.
    pub fn failing_rotate(mut self) -> Self {
        self.fail_rotate = true;
        self
    }

    pub fn last_presented(&self) -> Option<&CapturedScene> {
        self.presented.last()
    }
}

fn snapshot(scene: &SceneView<'_>) -> CapturedScene {
    CapturedScene {
        page: scene.page,
        rotation: scene.rotation.degrees(),
        objects: scene.objects.to_vec(),
    }
}

impl Surface for FakeSurface {
    fn install_background(
        &mut self,
        page: u32,
        image: RasterImage,
        rotation: Rotation,
    ) -> Result<Background> {
        self.next_handle += 1;
        self.installed.push((page, rotation));
        // Stored unrotated.
        let (width, height) = rotation.apply_to_size(image.width as f64, image.height as f64);
        Ok(Background {
            handle: BackgroundHandle(self.next_handle),
            width,
            height,
        })
    }

    fn rotate_background(&mut self, background: &Background, rotation: Rotation) -> Result<()> {
        if self.fail_rotate {
            return Err(Error::RenderFailure {
                page: 0,
                reason: "background image detached".into(),
            });
        }
        self.rotations.push((background.handle, rotation));
        Ok(())
    }

    fn present(&mut self, scene: &SceneView<'_>) {
        self.presented.push(snapshot(scene));
    }

    async fn capture(
        &mut self,
        scene: &SceneView<'_>,
        options: &CaptureOptions,
    ) -> Result<RasterImage> {
        if self.fail_capture_on == Some(scene.page) {
            return Err(Error::RenderFailure {
                page: scene.page,
                reason: "context lost".into(),
            });
        }
        let captured = snapshot(scene);
        self.captures.push(captured.clone());
        let (w, h) = scene.canvas_size().unwrap_or((PAGE_W, PAGE_H));
        Ok(RasterImage::new(
            (w * options.multiplier) as u32,
            (h * options.multiplier) as u32,
            encode(&Origin::Capture(captured)),
        ))
    }
}

// ─── Writer ──────────────────────────────────────────────────────────────

/// Records what was placed on each page instead of building a PDF.
#[derive(Default)]
pub struct RecordingWriter {
    pub pages: Vec<Vec<(String, [f64; 4])>>,
    pub fail_finish: bool,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Pages of a finished `RecordingWriter`, one payload string per image.
pub fn decode_pages(artifact: &ExportArtifact) -> Vec<Vec<String>> {
    String::from_utf8_lossy(&artifact.bytes)
        .split('\u{1e}')
        .map(|page| {
            page.split('\u{1f}')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .collect()
}

impl PdfWriter for RecordingWriter {
    fn page_size(&self) -> PageSize {
        PageSize::A4_PORTRAIT
    }

    fn add_page(&mut self) -> Result<()> {
        self.pages.push(Vec::new());
        Ok(())
    }

    fn add_image(&mut self, image: &RasterImage, x: f64, y: f64, w: f64, h: f64) -> Result<()> {
        let payload = String::from_utf8_lossy(&image.data[2..]).into_owned();
        self.pages
            .last_mut()
            .ok_or_else(|| Error::Export("no page".into()))?
            .push((payload, [x, y, w, h]));
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn finish(self, file_name: &str) -> Result<ExportArtifact> {
        if self.fail_finish {
            return Err(Error::Export("disk full".into()));
        }
        for page in &self.pages {
            for (_, rect) in page {
                assert_eq!(*rect, [0.0, 0.0, 595.28, 841.89], "image must fill the page");
            }
        }
        let bytes = self
            .pages
            .iter()
            .map(|p| {
                p.iter()
                    .map(|(payload, _)| payload.as_str())
                    .collect::<Vec<_>>()
                    .join("\u{1f}")
            })
            .collect::<Vec<_>>()
            .join("\u{1e}");
        Ok(ExportArtifact {
            file_name: file_name.to_string(),
            bytes: bytes.into_bytes(),
        })
    }
}
