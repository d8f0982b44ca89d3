//! WASM bridge for SlayPDF: exposes the Rust editor to the browser page.
//!
//! Compiled via `wasm-pack build --target web`. The page supplies a host
//! object with the pdf.js and canvas primitives (see [`host`]); uploads and
//! edits flow through here and every call resolves a `Promise`.

mod host;
mod idb;

use host::{JsLoader, JsSource, JsSurface};
use idb::IdbStore;
use js_sys::{Array, Object, Promise, Reflect, Uint8Array};
use serde::de::DeserializeOwned;
use sp_core::factory::AVAILABLE_FONTS;
use sp_core::{Color, Error, OverlayObject, RotateDirection};
use sp_editor::input::{InputEvent, Modifiers};
use sp_editor::state::{EditorState, ShapeKind};
use sp_editor::tools::ToolKind;
use sp_editor::upload::{self, UploadRequest};
use sp_editor::{CommandOutcome, EditCommand, Editor, EditorConfig};
use sp_render::LopdfWriter;
use std::cell::{RefCell, RefMut};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

type PageEditor = Editor<JsSource, JsSurface>;

fn to_js(e: Error) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_config(json: Option<String>) -> Result<EditorConfig, JsValue> {
    match json {
        Some(json) => EditorConfig::from_json(&json).map_err(to_js),
        None => Ok(EditorConfig::default()),
    }
}

/// Parse a lowercase enum name such as `"pen"` or `"circle"`.
fn parse_name<T: DeserializeOwned>(what: &str, name: &str) -> Result<T, JsValue> {
    serde_json::from_value(serde_json::Value::String(name.to_string()))
        .map_err(|_| JsValue::from_str(&format!("unknown {what} {name:?}")))
}

fn parse_color(hex: &str) -> Result<Color, JsValue> {
    Color::from_hex(hex).ok_or_else(|| JsValue::from_str(&format!("invalid colour {hex:?}")))
}

fn changed(outcomes: &[CommandOutcome]) -> JsValue {
    JsValue::from_bool(outcomes.iter().any(|o| *o != CommandOutcome::Unchanged))
}

/// Validate and persist an uploaded file. Resolves to the editor route
/// (`/editor/<id>`) the page should navigate to.
#[wasm_bindgen]
pub async fn stage_upload(
    name: String,
    mime: String,
    last_modified: f64,
    bytes: Vec<u8>,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    console_error_panic_hook_setup();
    let config = parse_config(config_json)?;
    let store = IdbStore::open().await.map_err(to_js)?;
    let request = UploadRequest {
        name,
        mime,
        last_modified: last_modified as u64,
        bytes,
    };
    let id = upload::stage_upload(&store, &config, request, js_sys::Date::now() as u64)
        .await
        .map_err(to_js)?;
    Ok(upload::editor_route(id))
}

/// Font families offered by the text toolbar, as a JSON array.
#[wasm_bindgen]
pub fn available_fonts() -> String {
    serde_json::Value::from(AVAILABLE_FONTS.to_vec()).to_string()
}

/// The browser-facing editor controller.
///
/// Holds one editing session. Calls that suspend (page loads, export)
/// keep the session borrowed; a call made while another is still pending
/// is rejected with `"editor is busy"`.
#[wasm_bindgen]
pub struct SlayEditor {
    editor: Rc<RefCell<PageEditor>>,
}

#[wasm_bindgen]
impl SlayEditor {
    /// Open the stored upload named by an editor path and show page 1.
    pub async fn open(
        host: JsValue,
        path: String,
        config_json: Option<String>,
    ) -> Result<SlayEditor, JsValue> {
        console_error_panic_hook_setup();
        let config = parse_config(config_json)?;
        let id = upload::parse_editor_route(&path)
            .ok_or_else(|| to_js(Error::NotFound(format!("no file in route {path:?}"))))?;
        let store = IdbStore::open().await.map_err(to_js)?;
        let opened = upload::open_stored(&store, &JsLoader::new(host.clone()), id)
            .await
            .map_err(to_js)?;
        let editor = Editor::open(
            config,
            opened.meta.name,
            opened.document,
            JsSurface::new(host),
        )
        .await
        .map_err(to_js)?;
        Ok(SlayEditor {
            editor: Rc::new(RefCell::new(editor)),
        })
    }

    fn borrow(&self) -> Result<RefMut<'_, PageEditor>, JsValue> {
        self.editor
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("editor is busy"))
    }

    // ─── Session info ────────────────────────────────────────────────────

    pub fn file_name(&self) -> Result<String, JsValue> {
        Ok(self.borrow()?.session().file_name().to_string())
    }

    pub fn page_count(&self) -> Result<u32, JsValue> {
        Ok(self.borrow()?.session().total_pages())
    }

    pub fn active_page(&self) -> Result<u32, JsValue> {
        Ok(self.borrow()?.session().active_page_number())
    }

    /// Overlays on the active page as JSON, back to front.
    pub fn objects_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.borrow()?.objects())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Selected object ids as a JSON array.
    pub fn selection_json(&self) -> Result<String, JsValue> {
        let editor = self.borrow()?;
        let ids: Vec<&str> = editor
            .state()
            .selection()
            .iter()
            .map(|id| id.as_str())
            .collect();
        Ok(serde_json::Value::from(ids).to_string())
    }

    /// Pending notices as a JSON array; the queue is emptied.
    pub fn drain_notices(&self) -> Result<String, JsValue> {
        let notices = self.borrow()?.drain_notices();
        serde_json::to_string(&notices).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    // ─── Commands ────────────────────────────────────────────────────────

    /// Run one JSON-encoded edit command, e.g. `{"op":"rotate_page","delta":90}`.
    /// Resolves to whether anything changed.
    pub fn dispatch(&self, command_json: &str) -> Promise {
        match serde_json::from_str::<EditCommand>(command_json) {
            Ok(command) => self.command(command),
            Err(e) => Promise::reject(&JsValue::from_str(&format!("invalid command: {e}"))),
        }
    }

    pub fn undo(&self) -> Promise {
        self.command(EditCommand::Undo)
    }

    /// `direction` is `"left"` or `"right"`.
    pub fn rotate(&self, direction: &str) -> Promise {
        match parse_name::<RotateDirection>("direction", direction) {
            Ok(dir) => self.command(EditCommand::RotatePage { delta: dir.delta() }),
            Err(e) => Promise::reject(&e),
        }
    }

    pub fn go_to_page(&self, page: u32) -> Promise {
        self.command(EditCommand::GoToPage { page })
    }

    pub fn next_page(&self) -> Promise {
        self.page_step(1)
    }

    pub fn prev_page(&self) -> Promise {
        self.page_step(-1)
    }

    pub fn delete_selected(&self) -> Promise {
        let command = self.borrow().map(|mut e| e.state_mut().delete_selection());
        match command {
            Ok(Some(command)) => self.command(command),
            Ok(None) => Promise::resolve(&JsValue::FALSE),
            Err(e) => Promise::reject(&e),
        }
    }

    fn page_step(&self, step: i64) -> Promise {
        let target = self.borrow().map(|e| {
            let session = e.session();
            let current = session.active_page_number() as i64;
            let page = (current + step).clamp(1, session.total_pages() as i64);
            (page != current).then_some(page as u32)
        });
        match target {
            Ok(Some(page)) => self.command(EditCommand::GoToPage { page }),
            Ok(None) => Promise::resolve(&JsValue::FALSE),
            Err(e) => Promise::reject(&e),
        }
    }

    fn command(&self, command: EditCommand) -> Promise {
        let editor = Rc::clone(&self.editor);
        future_to_promise(async move {
            let mut editor = editor
                .try_borrow_mut()
                .map_err(|_| JsValue::from_str("editor is busy"))?;
            let outcome = editor.dispatch(command).await.map_err(to_js)?;
            Ok(changed(&[outcome]))
        })
    }

    // ─── Object creation ─────────────────────────────────────────────────

    pub fn add_text(&self) -> Promise {
        match self.borrow().map(|e| e.state().add_text()) {
            Ok(command) => self.command(command),
            Err(e) => Promise::reject(&e),
        }
    }

    /// Add a text box from the rich-text editor's HTML.
    pub fn add_rich_text(&self, markup: &str) -> Promise {
        match self.borrow().map(|e| e.state().add_rich_text(markup)) {
            Ok(Some(command)) => self.command(command),
            Ok(None) => Promise::resolve(&JsValue::FALSE),
            Err(e) => Promise::reject(&e),
        }
    }

    /// `shape` is `"rect"` or `"circle"`.
    pub fn add_shape(&self, shape: &str) -> Promise {
        let command = parse_name::<ShapeKind>("shape", shape)
            .and_then(|shape| self.borrow().map(|e| e.state().add_shape(shape)));
        match command {
            Ok(command) => self.command(command),
            Err(e) => Promise::reject(&e),
        }
    }

    /// Add an image from a data URL with its natural pixel size.
    pub fn add_image(&self, data_url: String, width: f64, height: f64) -> Promise {
        let command = self
            .borrow()
            .and_then(|e| e.state().add_image(data_url, width, height).map_err(to_js));
        match command {
            Ok(command) => self.command(command),
            Err(e) => Promise::reject(&e),
        }
    }

    // ─── Tools & formatting ──────────────────────────────────────────────

    /// `name` is one of `select`, `pen`, `text`, `eraser`, `image`, `line`.
    pub fn set_tool(&self, name: &str) -> Result<(), JsValue> {
        let tool = parse_name::<ToolKind>("tool", name)?;
        self.borrow()?.state_mut().set_tool(tool);
        Ok(())
    }

    pub fn set_eraser_size(&self, size: f64) -> Result<(), JsValue> {
        if !(size.is_finite() && size > 0.0) {
            return Err(to_js(Error::InvalidInput(format!(
                "eraser size must be positive, got {size}"
            ))));
        }
        self.borrow()?.state_mut().eraser_size = size;
        Ok(())
    }

    pub fn update_selected_text(&self, markup: String) -> Promise {
        self.selection_edit(move |state, objects| Ok(state.update_selected_text(&markup, objects)))
    }

    pub fn set_font_family(&self, family: String) -> Promise {
        self.selection_edit(move |state, objects| state.set_font_family(&family, objects))
    }

    pub fn set_font_size(&self, size: f32) -> Promise {
        self.selection_edit(move |state, objects| state.set_font_size(size, objects))
    }

    pub fn toggle_bold(&self) -> Promise {
        self.selection_edit(|state, objects| Ok(state.toggle_bold(objects)))
    }

    pub fn toggle_italic(&self) -> Promise {
        self.selection_edit(|state, objects| Ok(state.toggle_italic(objects)))
    }

    pub fn toggle_underline(&self) -> Promise {
        self.selection_edit(|state, objects| Ok(state.toggle_underline(objects)))
    }

    /// `hex` is `#rrggbb`.
    pub fn set_color(&self, hex: &str) -> Promise {
        match parse_color(hex) {
            Ok(color) => self.selection_edit(move |state, objects| Ok(state.set_color(color, objects))),
            Err(e) => Promise::reject(&e),
        }
    }

    /// An empty string clears the fill.
    pub fn set_fill(&self, hex: &str) -> Promise {
        if hex.is_empty() {
            return self.selection_edit(|state, objects| Ok(state.clear_fill(objects)));
        }
        match parse_color(hex) {
            Ok(color) => self.selection_edit(move |state, objects| Ok(state.set_fill(color, objects))),
            Err(e) => Promise::reject(&e),
        }
    }

    fn selection_edit<F>(&self, edit: F) -> Promise
    where
        F: FnOnce(&mut EditorState, &[OverlayObject]) -> sp_core::Result<Vec<EditCommand>> + 'static,
    {
        let editor = Rc::clone(&self.editor);
        future_to_promise(async move {
            let mut editor = editor
                .try_borrow_mut()
                .map_err(|_| JsValue::from_str("editor is busy"))?;
            let outcomes = editor.edit_selection(edit).await.map_err(to_js)?;
            Ok(changed(&outcomes))
        })
    }

    // ─── Input ───────────────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &self,
        x: f64,
        y: f64,
        pressure: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> Promise {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.input(InputEvent::PointerDown {
            x,
            y,
            pressure,
            modifiers,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_move(
        &self,
        x: f64,
        y: f64,
        pressure: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> Promise {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.input(InputEvent::PointerMove {
            x,
            y,
            pressure,
            modifiers,
        })
    }

    pub fn handle_pointer_up(
        &self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> Promise {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.input(InputEvent::PointerUp { x, y, modifiers })
    }

    /// `key` is the DOM `KeyboardEvent.key` value.
    pub fn handle_key(&self, key: String, shift: bool, ctrl: bool, alt: bool, meta: bool) -> Promise {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.input(InputEvent::Key { key, modifiers })
    }

    fn input(&self, event: InputEvent) -> Promise {
        let editor = Rc::clone(&self.editor);
        future_to_promise(async move {
            let mut editor = editor
                .try_borrow_mut()
                .map_err(|_| JsValue::from_str("editor is busy"))?;
            let outcomes = editor.handle_input(&event).await.map_err(to_js)?;
            Ok(changed(&outcomes))
        })
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Flatten every page into a PDF. Resolves to
    /// `{ fileName, bytes: Uint8Array, failedPages: number[] }`.
    pub fn export(&self) -> Promise {
        let editor = Rc::clone(&self.editor);
        future_to_promise(async move {
            let mut editor = editor
                .try_borrow_mut()
                .map_err(|_| JsValue::from_str("editor is busy"))?;
            let writer = LopdfWriter::new(editor.config().output_page);
            let report = editor.export(writer).await.map_err(to_js)?;

            let out = Object::new();
            Reflect::set(
                &out,
                &"fileName".into(),
                &JsValue::from_str(&report.artifact.file_name),
            )?;
            Reflect::set(
                &out,
                &"bytes".into(),
                &Uint8Array::from(report.artifact.bytes.as_slice()),
            )?;
            let failed: Array = report
                .failed_pages()
                .into_iter()
                .map(JsValue::from)
                .collect();
            Reflect::set(&out, &"failedPages".into(), &failed)?;
            Ok(out.into())
        })
    }
}

/// Set up better panic messages in the browser console.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("SlayPDF WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
