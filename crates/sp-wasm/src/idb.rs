//! Browser storage: PDF bytes in IndexedDB, metadata in sessionStorage.

use crate::host::js_message;
use js_sys::{Reflect, Uint8Array};
use sp_core::{Error, Result};
use sp_editor::storage::{BlobStore, MetadataStore, StorageEstimate};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{IdbDatabase, IdbOpenDbRequest, IdbRequest, IdbTransactionMode};

const DB_NAME: &str = "pdf-storage";
const DB_VERSION: u32 = 1;
const STORE_PDFS: &str = "pdfs";

fn storage_err(context: &str, e: JsValue) -> Error {
    Error::NotFound(format!("{context}: {}", js_message(&e)))
}

fn write_err(context: &str, e: JsValue) -> Error {
    Error::InvalidInput(format!("{context}: {}", js_message(&e)))
}

pub struct IdbStore {
    db: IdbDatabase,
    session: web_sys::Storage,
}

impl IdbStore {
    /// Open (and on first use create) the PDF database.
    pub async fn open() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| Error::NotFound("no window".into()))?;
        let idb = window
            .indexed_db()
            .map_err(|e| storage_err("indexedDB", e))?
            .ok_or_else(|| Error::NotFound("IndexedDB not available".into()))?;
        let session = window
            .session_storage()
            .map_err(|e| storage_err("sessionStorage", e))?
            .ok_or_else(|| Error::NotFound("sessionStorage not available".into()))?;

        let request = idb
            .open_with_u32(DB_NAME, DB_VERSION)
            .map_err(|e| storage_err("open database", e))?;
        let db = JsFuture::from(open_db_promise(&request))
            .await
            .map_err(|e| storage_err("open database", e))?;
        Ok(Self {
            db: db.unchecked_into(),
            session,
        })
    }
}

impl BlobStore for IdbStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let tx = self
            .db
            .transaction_with_str_and_mode(STORE_PDFS, IdbTransactionMode::Readwrite)
            .map_err(|e| write_err("write transaction", e))?;
        let store = tx
            .object_store(STORE_PDFS)
            .map_err(|e| storage_err("object store", e))?;
        let data = Uint8Array::from(bytes);
        let request = store
            .put_with_key(&data, &key.into())
            .map_err(|e| write_err("store PDF", e))?;
        JsFuture::from(request_to_promise(&request))
            .await
            .map_err(|e| write_err("store PDF", e))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let tx = self
            .db
            .transaction_with_str(STORE_PDFS)
            .map_err(|e| storage_err("read transaction", e))?;
        let store = tx
            .object_store(STORE_PDFS)
            .map_err(|e| storage_err("object store", e))?;
        let request = store
            .get(&key.into())
            .map_err(|e| storage_err("read PDF", e))?;
        let result = JsFuture::from(request_to_promise(&request))
            .await
            .map_err(|e| storage_err("read PDF", e))?;

        if result.is_undefined() || result.is_null() {
            return Ok(None);
        }
        Ok(result.dyn_into::<Uint8Array>().ok().map(|a| a.to_vec()))
    }

    async fn estimate(&self) -> Option<StorageEstimate> {
        let manager = web_sys::window()?.navigator().storage();
        let promise = manager.estimate().ok()?;
        let report = JsFuture::from(promise).await.ok()?;
        let quota = Reflect::get(&report, &"quota".into()).ok()?.as_f64()?;
        let usage = Reflect::get(&report, &"usage".into()).ok()?.as_f64()?;
        Some(StorageEstimate {
            quota: quota as u64,
            usage: usage as u64,
        })
    }
}

impl MetadataStore for IdbStore {
    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.session
            .set_item(key, value)
            .map_err(|e| write_err("save metadata", e))
    }

    fn get_item(&self, key: &str) -> Option<String> {
        self.session.get_item(key).ok().flatten()
    }
}

// ─── Request plumbing ────────────────────────────────────────────────────

fn open_db_promise(request: &IdbOpenDbRequest) -> js_sys::Promise {
    let request = request.clone();

    js_sys::Promise::new(&mut move |resolve, reject| {
        let request_for_upgrade = request.clone();
        let request_for_success = request.clone();

        let onupgradeneeded = Closure::once(Box::new(move |_event: web_sys::Event| {
            if let Ok(result) = request_for_upgrade.result() {
                let db: IdbDatabase = result.unchecked_into();
                let _ = db.create_object_store(STORE_PDFS);
            }
        }) as Box<dyn FnOnce(_)>);

        let onsuccess = Closure::once(Box::new(move |_event: web_sys::Event| {
            if let Ok(result) = request_for_success.result() {
                let _ = resolve.call1(&JsValue::NULL, &result);
            }
        }) as Box<dyn FnOnce(_)>);

        let onerror = Closure::once(Box::new(move |_event: web_sys::Event| {
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("Failed to open database"));
        }) as Box<dyn FnOnce(_)>);

        request.set_onupgradeneeded(Some(onupgradeneeded.as_ref().unchecked_ref()));
        request.set_onsuccess(Some(onsuccess.as_ref().unchecked_ref()));
        request.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        onupgradeneeded.forget();
        onsuccess.forget();
        onerror.forget();
    })
}

fn request_to_promise(request: &IdbRequest) -> js_sys::Promise {
    let request = request.clone();

    js_sys::Promise::new(&mut |resolve, reject| {
        let request_success = request.clone();

        let onsuccess = Closure::once(Box::new(move |_event: web_sys::Event| {
            let result = request_success.result().unwrap_or(JsValue::NULL);
            let _ = resolve.call1(&JsValue::NULL, &result);
        }) as Box<dyn FnOnce(_)>);

        let onerror = Closure::once(Box::new(move |_event: web_sys::Event| {
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("IndexedDB request failed"));
        }) as Box<dyn FnOnce(_)>);

        request.set_onsuccess(Some(onsuccess.as_ref().unchecked_ref()));
        request.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        onsuccess.forget();
        onerror.forget();
    })
}
