//! Upload staging and reopening stored files.

mod common;

use common::{FakeLoader, FakeSurface, fake_pdf, init_logging};
use pretty_assertions::assert_eq;
use sp_core::Error;
use sp_editor::storage::{BlobStore, MemoryStore, MetadataStore};
use sp_editor::upload::{
    FileId, UploadRequest, editor_route, open_stored, parse_editor_route, stage_upload,
};
use sp_editor::{Editor, EditorConfig};
use sp_render::SourceDocument;

fn request(bytes: Vec<u8>) -> UploadRequest {
    UploadRequest {
        name: "deed.pdf".into(),
        mime: "application/pdf".into(),
        last_modified: 0,
        bytes,
    }
}

#[tokio::test]
async fn oversized_upload_is_rejected_before_any_write() {
    init_logging();
    let store = MemoryStore::new();
    let config = EditorConfig::default();
    let too_big = vec![0u8; 10 * 1024 * 1024 + 1];

    let err = stage_upload(&store, &config, request(too_big), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(store.writes(), 0);
    assert_eq!(store.get_item("pdf_file_1"), None);
}

#[tokio::test]
async fn exactly_at_limit_is_accepted() {
    let store = MemoryStore::new();
    let config = EditorConfig {
        max_upload_bytes: 8,
        ..EditorConfig::default()
    };
    let id = stage_upload(&store, &config, request(vec![1; 8]), 7).await.unwrap();
    assert_eq!(id, FileId(7));
}

#[tokio::test]
async fn staged_upload_opens_in_editor() {
    init_logging();
    let store = MemoryStore::new();
    let id = stage_upload(&store, &EditorConfig::default(), request(fake_pdf(3)), 1718000000000)
        .await
        .unwrap();

    let route = editor_route(id);
    let parsed = parse_editor_route(&route).unwrap();
    let opened = open_stored(&store, &FakeLoader, parsed).await.unwrap();
    assert_eq!(opened.meta.name, "deed.pdf");
    assert_eq!(opened.document.page_count(), 3);

    let editor = Editor::open(
        EditorConfig::default(),
        opened.meta.name,
        opened.document,
        FakeSurface::new(),
    )
    .await
    .unwrap();
    assert_eq!(editor.session().total_pages(), 3);
    assert_eq!(editor.session().file_name(), "deed.pdf");
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let store = MemoryStore::new();
    let err = open_stored(&store, &FakeLoader, FileId(99)).await.err().unwrap();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn missing_bytes_is_not_found() {
    let store = MemoryStore::new();
    store
        .set_item(
            "pdf_file_5",
            r#"{"name":"x.pdf","type":"application/pdf","lastModified":0,"size":3}"#,
        )
        .unwrap();
    let err = open_stored(&store, &FakeLoader, FileId(5)).await.err().unwrap();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn corrupt_bytes_fail_to_decode() {
    let store = MemoryStore::new();
    let id = stage_upload(
        &store,
        &EditorConfig::default(),
        request(b"not a pdf".to_vec()),
        3,
    )
    .await
    .unwrap();
    assert!(store.get(&id.blob_key()).await.unwrap().is_some());
    let err = open_stored(&store, &FakeLoader, id).await.err().unwrap();
    assert!(matches!(err, Error::DecodeFailure(_)));
}
