//! Upload staging and session opening.
//!
//! An upload is validated (PDF type, size limit, storage pre-flight) before
//! anything is written. Accepted files get a millisecond-timestamp id; the
//! bytes are stored under the id and the metadata as JSON under
//! `pdf_file_<id>`. The editor is then reached at `/editor/<id>`.

use crate::config::EditorConfig;
use crate::storage::{BlobStore, MetadataStore};
use serde::{Deserialize, Serialize};
use sp_core::{Error, Result};
use sp_render::PdfLoader;
use std::fmt;
use std::str::FromStr;

const META_PREFIX: &str = "pdf_file_";
const EDITOR_ROUTE_PREFIX: &str = "/editor/";

/// Session-generated identifier of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub u64);

impl FileId {
    pub fn from_millis(now_ms: u64) -> Self {
        FileId(now_ms)
    }

    pub fn meta_key(self) -> String {
        format!("{META_PREFIX}{self}")
    }

    pub fn blob_key(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<u64>()
            .map(FileId)
            .map_err(|_| Error::NotFound(format!("no file with id {s:?}")))
    }
}

/// Metadata kept alongside the stored bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub name: String,
    #[serde(rename = "type")]
    pub mime: String,
    pub last_modified: u64,
    pub size: u64,
}

/// A file picked on the upload screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub name: String,
    pub mime: String,
    pub last_modified: u64,
    pub bytes: Vec<u8>,
}

pub fn editor_route(id: FileId) -> String {
    format!("{EDITOR_ROUTE_PREFIX}{id}")
}

/// Extract the file id from an editor path such as `/editor/1718000000000`.
pub fn parse_editor_route(path: &str) -> Option<FileId> {
    let rest = path.strip_prefix(EDITOR_ROUTE_PREFIX)?;
    rest.trim_end_matches('/').parse().ok()
}

/// Validate `request` and persist it. Nothing is written on rejection.
pub async fn stage_upload<S>(
    store: &S,
    config: &EditorConfig,
    request: UploadRequest,
    now_ms: u64,
) -> Result<FileId>
where
    S: BlobStore + MetadataStore,
{
    if !request.mime.contains("pdf") {
        return Err(Error::InvalidInput(format!(
            "{} is not a PDF ({})",
            request.name, request.mime
        )));
    }
    let size = request.bytes.len() as u64;
    if size > config.max_upload_bytes {
        return Err(Error::InvalidInput(format!(
            "{} is {size} bytes; the limit is {} bytes",
            request.name, config.max_upload_bytes
        )));
    }
    // No estimate means the host can't tell; let the write decide.
    if let Some(estimate) = store.estimate().await
        && estimate.available() < size
    {
        return Err(Error::StorageExhausted {
            required: size,
            available: estimate.available(),
        });
    }

    let id = FileId::from_millis(now_ms);
    let meta = FileMeta {
        name: request.name,
        mime: request.mime,
        last_modified: request.last_modified,
        size,
    };
    let meta_json =
        serde_json::to_string(&meta).map_err(|e| Error::InvalidInput(format!("metadata: {e}")))?;

    store.put(&id.blob_key(), &request.bytes).await?;
    store.set_item(&id.meta_key(), &meta_json)?;
    log::info!("staged {} ({size} bytes) as {id}", meta.name);
    Ok(id)
}

/// A stored upload, decoded and ready for a `DocumentSession`.
pub struct OpenedFile<D> {
    pub id: FileId,
    pub meta: FileMeta,
    pub document: D,
}

/// Load metadata and bytes for `id` and decode them with `loader`.
pub async fn open_stored<S, L>(store: &S, loader: &L, id: FileId) -> Result<OpenedFile<L::Document>>
where
    S: BlobStore + MetadataStore,
    L: PdfLoader,
{
    let meta_json = store
        .get_item(&id.meta_key())
        .ok_or_else(|| Error::NotFound(format!("no metadata for file {id}")))?;
    let meta: FileMeta = serde_json::from_str(&meta_json)
        .map_err(|e| Error::NotFound(format!("unreadable metadata for file {id}: {e}")))?;
    let bytes = store
        .get(&id.blob_key())
        .await?
        .ok_or_else(|| Error::NotFound(format!("no stored bytes for file {id}")))?;

    let document = loader.load(&bytes).await?;
    log::info!("opened {} ({} bytes)", meta.name, bytes.len());
    Ok(OpenedFile { id, meta, document })
}
