//! Overlay data model.
//!
//! An overlay is one user-added annotation drawn above a page background:
//! text, shapes, images, lines, free-hand strokes, and whiteout patches.
//! Objects are plain data; z-order is their position in the page's list
//! (last = topmost). Positions are canvas coordinates of the page as it is
//! rendered for editing.

use crate::id::ObjectId;
use kurbo::{Point, Rect};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let pair = |i: usize| -> Option<f32> {
            Some((hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) as f32 / 255.0)
        };

        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::rgba(
                    (r * 17) as f32 / 255.0,
                    (g * 17) as f32 / 255.0,
                    (b * 17) as f32 / 255.0,
                    1.0,
                ))
            }
            6 => Some(Self::rgba(pair(0)?, pair(2)?, pair(4)?, 1.0)),
            8 => Some(Self::rgba(pair(0)?, pair(2)?, pair(4)?, pair(6)?)),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b, a) = (
            channel(self.r),
            channel(self.g),
            channel(self.b),
            channel(self.a),
        );
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("bad color `{s}`")))
    }
}

// ─── Styling ─────────────────────────────────────────────────────────────

/// Paint and opacity shared by every overlay kind.
/// `None` fill or stroke means transparent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f32,
    pub opacity: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: Some(Color::BLACK),
            stroke_width: 1.0,
            opacity: 1.0,
        }
    }
}

/// Text run attributes. `width` is set for wrapping text boxes and
/// absent for free-form text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFormat {
    pub content: String,
    pub font_family: String,
    pub font_size: f32,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

impl Default for TextFormat {
    fn default() -> Self {
        Self {
            content: String::new(),
            font_family: "Arial".into(),
            font_size: 20.0,
            bold: false,
            italic: false,
            underline: false,
            width: None,
        }
    }
}

/// Line height multiplier used when estimating text bounds.
const TEXT_LINE_HEIGHT: f64 = 1.16;
/// Average glyph advance as a fraction of the font size.
const TEXT_AVG_ADVANCE: f64 = 0.6;

impl TextFormat {
    /// Approximate box of the laid-out text, for hit testing and selection.
    pub fn estimated_size(&self) -> (f64, f64) {
        let size = self.font_size as f64;
        let lines: Vec<&str> = self.content.split('\n').collect();
        let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let width = self
            .width
            .unwrap_or(longest as f64 * size * TEXT_AVG_ADVANCE);
        let height = lines.len().max(1) as f64 * size * TEXT_LINE_HEIGHT;
        (width, height)
    }
}

// ─── Overlay objects ─────────────────────────────────────────────────────

/// Geometry and kind-specific data of an overlay.
///
/// Line ends and free-hand points are relative to the object's position so
/// that moving an object only touches `x`/`y`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OverlayKind {
    Text(TextFormat),
    Rect {
        width: f64,
        height: f64,
    },
    Circle {
        radius: f64,
    },
    Line {
        dx: f64,
        dy: f64,
    },
    Image {
        /// Host-side reference to the decoded image (e.g. a data URL).
        source: String,
        width: f64,
        height: f64,
    },
    Whiteout {
        width: f64,
        height: f64,
    },
    Freehand {
        points: Vec<(f64, f64)>,
    },
}

impl OverlayKind {
    pub fn name(&self) -> &'static str {
        match self {
            OverlayKind::Text(_) => "text",
            OverlayKind::Rect { .. } => "rect",
            OverlayKind::Circle { .. } => "circle",
            OverlayKind::Line { .. } => "line",
            OverlayKind::Image { .. } => "image",
            OverlayKind::Whiteout { .. } => "whiteout",
            OverlayKind::Freehand { .. } => "freehand",
        }
    }

    /// Whether the fill color is user-editable (original toolbar: rect & circle).
    pub fn accepts_fill(&self) -> bool {
        matches!(self, OverlayKind::Rect { .. } | OverlayKind::Circle { .. })
    }
}

/// A single annotation on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayObject {
    pub id: ObjectId,
    #[serde(flatten)]
    pub kind: OverlayKind,
    pub x: f64,
    pub y: f64,
    pub style: Style,
}

impl OverlayObject {
    pub fn new(id: ObjectId, kind: OverlayKind, x: f64, y: f64, style: Style) -> Self {
        Self {
            id,
            kind,
            x,
            y,
            style,
        }
    }

    pub fn text(&self) -> Option<&TextFormat> {
        match &self.kind {
            OverlayKind::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Axis-aligned bounds in canvas coordinates.
    pub fn bounds(&self) -> Rect {
        let (x, y) = (self.x, self.y);
        match &self.kind {
            OverlayKind::Text(t) => {
                let (w, h) = t.estimated_size();
                Rect::new(x, y, x + w, y + h)
            }
            OverlayKind::Rect { width, height }
            | OverlayKind::Image { width, height, .. }
            | OverlayKind::Whiteout { width, height } => Rect::new(x, y, x + width, y + height),
            OverlayKind::Circle { radius } => Rect::new(x, y, x + 2.0 * radius, y + 2.0 * radius),
            OverlayKind::Line { dx, dy } => Rect::new(x, y, x + dx, y + dy).abs(),
            OverlayKind::Freehand { points } => {
                let mut r = Rect::new(x, y, x, y);
                for (px, py) in points {
                    r = r.union_pt(Point::new(x + px, y + py));
                }
                r
            }
        }
    }
}

// ─── Partial updates ─────────────────────────────────────────────────────

/// A partial update applied by `mutateOverlay`. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<(f64, f64)>,
    /// New width/height; circles take the diameter from `width`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    /// Make the fill transparent. Wins over `fill`.
    pub clear_fill: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
}

impl OverlayPatch {
    pub fn is_empty(&self) -> bool {
        *self == OverlayPatch::default()
    }

    /// Apply to `obj`. Text fields are ignored on non-text objects.
    pub fn apply_to(&self, obj: &mut OverlayObject) {
        if let Some((x, y)) = self.position {
            obj.x = x;
            obj.y = y;
        }
        if let Some((w, h)) = self.size {
            match &mut obj.kind {
                OverlayKind::Rect { width, height }
                | OverlayKind::Image { width, height, .. }
                | OverlayKind::Whiteout { width, height } => {
                    *width = w;
                    *height = h;
                }
                OverlayKind::Circle { radius } => *radius = w / 2.0,
                OverlayKind::Line { dx, dy } => {
                    *dx = w;
                    *dy = h;
                }
                OverlayKind::Text(t) => t.width = Some(w),
                OverlayKind::Freehand { .. } => {}
            }
        }
        if self.clear_fill {
            obj.style.fill = None;
        } else if let Some(fill) = self.fill {
            obj.style.fill = Some(fill);
        }
        if let Some(stroke) = self.stroke {
            obj.style.stroke = Some(stroke);
        }
        if let Some(w) = self.stroke_width {
            obj.style.stroke_width = w;
        }
        if let Some(o) = self.opacity {
            obj.style.opacity = o.clamp(0.0, 1.0);
        }
        if let OverlayKind::Text(t) = &mut obj.kind {
            if let Some(text) = &self.text {
                t.content = text.clone();
            }
            if let Some(family) = &self.font_family {
                t.font_family = family.clone();
            }
            if let Some(size) = self.font_size {
                t.font_size = size;
            }
            if let Some(b) = self.bold {
                t.bold = b;
            }
            if let Some(i) = self.italic {
                t.italic = i;
            }
            if let Some(u) = self.underline {
                t.underline = u;
            }
        }
    }
}
