//! Output document assembly.
//!
//! `PdfWriter` is the narrow writer contract the export pipeline drives:
//! start a page, place a full-page image, finish. `LopdfWriter` implements
//! it on top of `lopdf`, embedding each JPEG as a `DCTDecode` image XObject.

use crate::raster::{PageSize, RasterImage};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use sp_core::{Error, Result};

/// A finished output document, named after the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub trait PdfWriter {
    fn page_size(&self) -> PageSize;

    /// Start a new, empty output page.
    fn add_page(&mut self) -> Result<()>;

    /// Place `image` on the current page at `(x, y)` (top-left origin) with
    /// size `w × h` in points.
    fn add_image(&mut self, image: &RasterImage, x: f64, y: f64, w: f64, h: f64) -> Result<()>;

    fn page_count(&self) -> usize;

    fn finish(self, file_name: &str) -> Result<ExportArtifact>;
}

struct PendingPage {
    images: Vec<(ObjectId, [f64; 4])>,
}

pub struct LopdfWriter {
    doc: Document,
    pages_id: ObjectId,
    size: PageSize,
    pages: Vec<PendingPage>,
}

fn pdf_err(e: lopdf::Error) -> Error {
    Error::Export(e.to_string())
}

impl LopdfWriter {
    pub fn new(size: PageSize) -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            size,
            pages: Vec::new(),
        }
    }

    fn page_content(&self, page: &PendingPage) -> Result<(Vec<u8>, Dictionary)> {
        let mut operations = Vec::new();
        let mut xobjects = Dictionary::new();
        for (i, (image_id, [x, y, w, h])) in page.images.iter().enumerate() {
            let name = format!("Im{i}");
            // PDF origin is bottom-left
            let pdf_y = self.size.height - y - h;
            operations.push(Operation::new("q", vec![]));
            operations.push(Operation::new(
                "cm",
                vec![
                    Object::Real(*w as f32),
                    0.into(),
                    0.into(),
                    Object::Real(*h as f32),
                    Object::Real(*x as f32),
                    Object::Real(pdf_y as f32),
                ],
            ));
            operations.push(Operation::new(
                "Do",
                vec![Object::Name(name.clone().into_bytes())],
            ));
            operations.push(Operation::new("Q", vec![]));
            xobjects.set(name, Object::Reference(*image_id));
        }
        let content = Content { operations }.encode().map_err(pdf_err)?;
        Ok((content, xobjects))
    }
}

impl PdfWriter for LopdfWriter {
    fn page_size(&self) -> PageSize {
        self.size
    }

    fn add_page(&mut self) -> Result<()> {
        self.pages.push(PendingPage { images: Vec::new() });
        Ok(())
    }

    fn add_image(&mut self, image: &RasterImage, x: f64, y: f64, w: f64, h: f64) -> Result<()> {
        if image.is_empty() {
            return Err(Error::Export("cannot embed an empty image".into()));
        }
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            image.data.clone(),
        );
        let image_id = self.doc.add_object(stream);
        let page = self
            .pages
            .last_mut()
            .ok_or_else(|| Error::Export("add_image called before add_page".into()))?;
        page.images.push((image_id, [x, y, w, h]));
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn finish(mut self, file_name: &str) -> Result<ExportArtifact> {
        if self.pages.is_empty() {
            return Err(Error::Export("document has no pages".into()));
        }
        let media_box = vec![
            0.into(),
            0.into(),
            Object::Real(self.size.width as f32),
            Object::Real(self.size.height as f32),
        ];

        let pending = std::mem::take(&mut self.pages);
        let mut kids = Vec::with_capacity(pending.len());
        for page in &pending {
            let (content, xobjects) = self.page_content(page)?;
            let content_id = self.doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(self.pages_id),
                "MediaBox" => media_box.clone(),
                "Contents" => Object::Reference(content_id),
                "Resources" => dictionary! {
                    "XObject" => xobjects,
                },
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(self.pages_id),
        });
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes).map_err(|e| Error::Export(e.to_string()))?;
        log::info!("assembled {count} page(s) into {file_name} ({} bytes)", bytes.len());

        Ok(ExportArtifact {
            file_name: file_name.to_string(),
            bytes,
        })
    }
}
