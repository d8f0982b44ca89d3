//! Constructors for new overlays with the editor's default geometry and style.

use crate::id::ObjectId;
use crate::model::*;
use kurbo::{Point, Rect};

/// Font families offered in the text formatting menu.
pub const AVAILABLE_FONTS: [&str; 20] = [
    "Arial",
    "Verdana",
    "Helvetica",
    "Times New Roman",
    "Times",
    "Courier New",
    "Courier",
    "Georgia",
    "Palatino",
    "Garamond",
    "Bookman",
    "Comic Sans MS",
    "Trebuchet MS",
    "Impact",
    "Lucida Console",
    "Tahoma",
    "Century Gothic",
    "Calibri",
    "Cambria",
    "Consolas",
];

/// Where toolbar-inserted objects land.
pub const DEFAULT_ORIGIN: (f64, f64) = (100.0, 100.0);
pub const DEFAULT_TEXT: &str = "Edit this text";
pub const TEXTBOX_WIDTH: f64 = 300.0;
pub const LINE_STROKE_WIDTH: f32 = 2.0;

fn text_style(color: Color) -> Style {
    Style {
        fill: Some(color),
        stroke: None,
        stroke_width: 0.0,
        opacity: 1.0,
    }
}

fn outline_style(color: Color, width: f32) -> Style {
    Style {
        fill: None,
        stroke: Some(color),
        stroke_width: width,
        opacity: 1.0,
    }
}

/// Free-form text: Arial 20px, black.
pub fn text(content: impl Into<String>) -> OverlayObject {
    OverlayObject::new(
        ObjectId::with_prefix("text"),
        OverlayKind::Text(TextFormat {
            content: content.into(),
            ..TextFormat::default()
        }),
        DEFAULT_ORIGIN.0,
        DEFAULT_ORIGIN.1,
        text_style(Color::BLACK),
    )
}

/// Wrapping text box built from a format template (content is replaced).
pub fn textbox(content: impl Into<String>, template: &TextFormat, color: Color) -> OverlayObject {
    OverlayObject::new(
        ObjectId::with_prefix("textbox"),
        OverlayKind::Text(TextFormat {
            content: content.into(),
            width: Some(TEXTBOX_WIDTH),
            ..template.clone()
        }),
        DEFAULT_ORIGIN.0,
        DEFAULT_ORIGIN.1,
        text_style(color),
    )
}

/// 100×100 outlined rectangle with transparent fill.
pub fn rect() -> OverlayObject {
    OverlayObject::new(
        ObjectId::with_prefix("rect"),
        OverlayKind::Rect {
            width: 100.0,
            height: 100.0,
        },
        DEFAULT_ORIGIN.0,
        DEFAULT_ORIGIN.1,
        outline_style(Color::BLACK, 1.0),
    )
}

/// Radius-50 outlined circle with transparent fill.
pub fn circle() -> OverlayObject {
    OverlayObject::new(
        ObjectId::with_prefix("circle"),
        OverlayKind::Circle { radius: 50.0 },
        DEFAULT_ORIGIN.0,
        DEFAULT_ORIGIN.1,
        outline_style(Color::BLACK, 1.0),
    )
}

/// Straight line between two canvas points.
pub fn line(from: Point, to: Point, color: Color) -> OverlayObject {
    OverlayObject::new(
        ObjectId::with_prefix("line"),
        OverlayKind::Line {
            dx: to.x - from.x,
            dy: to.y - from.y,
        },
        from.x,
        from.y,
        outline_style(color, LINE_STROKE_WIDTH),
    )
}

/// Free-hand stroke through `points` (at least one).
pub fn freehand(points: &[Point], color: Color) -> Option<OverlayObject> {
    let origin = *points.first()?;
    let rel = points
        .iter()
        .map(|p| (p.x - origin.x, p.y - origin.y))
        .collect();
    Some(OverlayObject::new(
        ObjectId::with_prefix("freehand"),
        OverlayKind::Freehand { points: rel },
        origin.x,
        origin.y,
        outline_style(color, LINE_STROKE_WIDTH),
    ))
}

/// Opaque white patch covering `area`.
pub fn whiteout(area: Rect, opacity: f32) -> OverlayObject {
    let area = area.abs();
    OverlayObject::new(
        ObjectId::with_prefix("whiteout"),
        OverlayKind::Whiteout {
            width: area.width(),
            height: area.height(),
        },
        area.x0,
        area.y0,
        Style {
            fill: Some(Color::WHITE),
            stroke: None,
            stroke_width: 0.0,
            opacity: opacity.clamp(0.0, 1.0),
        },
    )
}

/// Preset 2:1 whiteout centred on a click point.
pub fn quick_whiteout(center: Point, eraser_size: f64, opacity: f32) -> OverlayObject {
    let (w, h) = (eraser_size, eraser_size / 2.0);
    whiteout(
        Rect::new(center.x - w / 2.0, center.y - h / 2.0, center.x + w / 2.0, center.y + h / 2.0),
        opacity,
    )
}

/// Inserted picture; scaled down to `max_width` keeping its aspect ratio.
pub fn image(source: impl Into<String>, natural_width: f64, natural_height: f64, max_width: f64) -> OverlayObject {
    let (mut width, mut height) = (natural_width, natural_height);
    if width > max_width {
        let aspect = width / height.max(1.0);
        log::trace!("scaling image {width}x{height} to width {max_width}");
        width = max_width;
        height = max_width / aspect;
    }
    OverlayObject::new(
        ObjectId::with_prefix("image"),
        OverlayKind::Image {
            source: source.into(),
            width,
            height,
        },
        DEFAULT_ORIGIN.0,
        DEFAULT_ORIGIN.1,
        Style {
            fill: None,
            stroke: None,
            stroke_width: 0.0,
            opacity: 1.0,
        },
    )
}
