use thiserror::Error;

/// Failures surfaced by sessions, uploads, and export.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Non-PDF file, oversized file, malformed command input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not enough client-side storage for the upload.
    #[error("Not enough storage space: need {required} bytes, {available} available")]
    StorageExhausted { required: u64, available: u64 },

    /// The PDF bytes could not be decoded.
    #[error("Failed to decode PDF: {0}")]
    DecodeFailure(String),

    /// A specific page failed to rasterize.
    #[error("Failed to render page {page}: {reason}")]
    RenderFailure { page: u32, reason: String },

    /// An expected stored file or session is missing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Page number outside `[1, total]`.
    #[error("Page {page} is out of range (document has {total} pages)")]
    OutOfRange { page: u32, total: u32 },

    /// Undo requested with the history cursor at the first snapshot.
    #[error("Nothing to undo")]
    NoHistory,

    /// The export could not be prepared or finalized.
    #[error("Export failed: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Page-scoped failures that export tolerates.
    pub fn is_page_scoped(&self) -> bool {
        matches!(self, Error::RenderFailure { .. })
    }
}
