//! JavaScript host adapters.
//!
//! The page that embeds the editor passes a host object implementing the
//! PDF and canvas primitives (pdf.js and a canvas library in practice):
//!
//! ```text
//! loadDocument(bytes: Uint8Array) -> Promise<number>          // page count
//! renderPage(page, scale, degrees) -> Promise<{width, height, data}>
//! installBackground(page, width, height, data, degrees) -> number
//! rotateBackground(handle, degrees)
//! present(sceneJson: string)
//! capture(sceneJson, quality, multiplier, settleMs) -> Promise<{width, height, data}>
//! ```
//!
//! `data` is always a JPEG in a `Uint8Array`. These adapters turn that
//! object into the `PdfLoader`, `SourceDocument` and `Surface` the editor
//! drives.

use js_sys::{Array, Function, Promise, Reflect, Uint8Array};
use serde_json::{Value, json};
use sp_core::{Error, Result, Rotation};
use sp_render::{
    Background, BackgroundHandle, CaptureOptions, PdfLoader, RasterImage, SceneView,
    SourceDocument, Surface,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

/// Best-effort text for a thrown JS value.
pub(crate) fn js_message(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{value:?}")
}

/// Call `host[method](...args)`.
fn call(host: &JsValue, method: &str, args: &[JsValue]) -> std::result::Result<JsValue, JsValue> {
    let func = Reflect::get(host, &JsValue::from_str(method))?;
    let func = func
        .dyn_ref::<Function>()
        .ok_or_else(|| JsValue::from_str(&format!("host.{method} is not a function")))?;
    let args: Array = args.iter().collect();
    func.apply(host, &args)
}

/// Call `host[method]` and await its result if it returned a promise.
async fn call_async(
    host: &JsValue,
    method: &str,
    args: &[JsValue],
) -> std::result::Result<JsValue, JsValue> {
    let value = call(host, method, args)?;
    JsFuture::from(Promise::resolve(&value)).await
}

fn read_image(value: &JsValue) -> std::result::Result<RasterImage, JsValue> {
    let dimension = |key: &str| -> std::result::Result<u32, JsValue> {
        Reflect::get(value, &JsValue::from_str(key))?
            .as_f64()
            .map(|v| v as u32)
            .ok_or_else(|| JsValue::from_str(&format!("image.{key} is not a number")))
    };
    let data: Uint8Array = Reflect::get(value, &JsValue::from_str("data"))?
        .dyn_into()
        .map_err(|_| JsValue::from_str("image.data is not a Uint8Array"))?;
    Ok(RasterImage::new(
        dimension("width")?,
        dimension("height")?,
        data.to_vec(),
    ))
}

/// JSON handed to `present` and `capture`.
pub(crate) fn scene_json(scene: &SceneView<'_>) -> Value {
    let size = scene.canvas_size().map(|(w, h)| json!({ "width": w, "height": h }));
    json!({
        "page": scene.page,
        "rotation": scene.rotation,
        "background": scene.background,
        "size": size,
        "objects": scene.objects,
    })
}

// ─── Loader / source ─────────────────────────────────────────────────────

pub struct JsLoader {
    host: JsValue,
}

impl JsLoader {
    pub fn new(host: JsValue) -> Self {
        Self { host }
    }
}

impl PdfLoader for JsLoader {
    type Document = JsSource;

    async fn load(&self, bytes: &[u8]) -> Result<JsSource> {
        let data = Uint8Array::from(bytes);
        let pages = call_async(&self.host, "loadDocument", &[data.into()])
            .await
            .map_err(|e| Error::DecodeFailure(js_message(&e)))?
            .as_f64()
            .ok_or_else(|| Error::DecodeFailure("page count is not a number".into()))?;
        Ok(JsSource {
            host: self.host.clone(),
            pages: pages as u32,
        })
    }
}

pub struct JsSource {
    host: JsValue,
    pages: u32,
}

impl SourceDocument for JsSource {
    fn page_count(&self) -> u32 {
        self.pages
    }

    async fn render_page(&self, page: u32, scale: f64, rotation: Rotation) -> Result<RasterImage> {
        let fail = |e: JsValue| Error::RenderFailure {
            page,
            reason: js_message(&e),
        };
        let args = [
            JsValue::from(page),
            JsValue::from(scale),
            JsValue::from(rotation.degrees()),
        ];
        let value = call_async(&self.host, "renderPage", &args)
            .await
            .map_err(fail)?;
        read_image(&value).map_err(fail)
    }
}

// ─── Surface ─────────────────────────────────────────────────────────────

pub struct JsSurface {
    host: JsValue,
}

impl JsSurface {
    pub fn new(host: JsValue) -> Self {
        Self { host }
    }
}

impl Surface for JsSurface {
    fn install_background(
        &mut self,
        page: u32,
        image: RasterImage,
        rotation: Rotation,
    ) -> Result<Background> {
        let fail = |e: JsValue| Error::RenderFailure {
            page,
            reason: js_message(&e),
        };
        let data = Uint8Array::from(image.data.as_slice());
        let args = [
            JsValue::from(page),
            JsValue::from(image.width),
            JsValue::from(image.height),
            data.into(),
            JsValue::from(rotation.degrees()),
        ];
        let handle = call(&self.host, "installBackground", &args)
            .map_err(fail)?
            .as_f64()
            .ok_or_else(|| fail(JsValue::from_str("background handle is not a number")))?;
        Ok(Background {
            handle: BackgroundHandle(handle as u64),
            width: image.width as f64,
            height: image.height as f64,
        })
    }

    fn rotate_background(&mut self, background: &Background, rotation: Rotation) -> Result<()> {
        let args = [
            JsValue::from(background.handle.0 as f64),
            JsValue::from(rotation.degrees()),
        ];
        call(&self.host, "rotateBackground", &args)
            .map(|_| ())
            .map_err(|e| Error::RenderFailure {
                page: 0,
                reason: js_message(&e),
            })
    }

    fn present(&mut self, scene: &SceneView<'_>) {
        let json = scene_json(scene).to_string();
        if let Err(e) = call(&self.host, "present", &[JsValue::from_str(&json)]) {
            log::warn!("present failed on page {}: {}", scene.page, js_message(&e));
        }
    }

    async fn capture(
        &mut self,
        scene: &SceneView<'_>,
        options: &CaptureOptions,
    ) -> Result<RasterImage> {
        let page = scene.page;
        let fail = |e: JsValue| Error::RenderFailure {
            page,
            reason: js_message(&e),
        };
        let args = [
            JsValue::from_str(&scene_json(scene).to_string()),
            JsValue::from(options.quality),
            JsValue::from(options.multiplier),
            JsValue::from(options.settle.as_millis() as f64),
        ];
        let value = call_async(&self.host, "capture", &args)
            .await
            .map_err(fail)?;
        let image = read_image(&value).map_err(fail)?;
        if image.is_empty() {
            return Err(fail(JsValue::from_str("capture produced an empty image")));
        }
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sp_core::factory;

    #[test]
    fn scene_json_carries_rotated_size_and_objects() {
        let bg = Background {
            handle: BackgroundHandle(7),
            width: 918.0,
            height: 1188.0,
        };
        let objects = vec![factory::rect()];
        let scene = SceneView {
            page: 2,
            background: Some(&bg),
            rotation: Rotation::from_degrees(-90).unwrap(),
            objects: &objects,
        };
        let json = scene_json(&scene);
        assert_eq!(json["page"], 2);
        assert_eq!(json["rotation"], -90);
        assert_eq!(json["background"]["handle"], 7);
        assert_eq!(json["size"], json!({ "width": 1188.0, "height": 918.0 }));
        assert_eq!(json["objects"].as_array().map(|a| a.len()), Some(1));
    }

    #[test]
    fn scene_json_before_background() {
        let scene = SceneView {
            page: 1,
            background: None,
            rotation: Rotation::default(),
            objects: &[],
        };
        let json = scene_json(&scene);
        assert_eq!(json["size"], Value::Null);
        assert_eq!(json["background"], Value::Null);
    }
}
