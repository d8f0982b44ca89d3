//! Tool system for canvas interactions.
//!
//! Each tool translates pointer events into `EditCommand`s. Commands are
//! only produced when a gesture completes, so one gesture is one history
//! step.
//!
//! ## Modifier behaviors
//!
//! | Modifier | Select Tool | Line Tool |
//! |----------|-------------|-----------|
//! | **Shift** | Toggle selection / axis-constrain drag | Snap to horizontal or vertical |

use crate::commands::EditCommand;
use crate::input::InputEvent;
use serde::{Deserialize, Serialize};
use sp_core::id::ObjectIds;
use sp_core::{Color, ObjectId, Point, Rect, factory};

/// Pointer travel below which a press-release counts as a click.
pub const CLICK_SLOP: f64 = 3.0;

/// The active tool determines how input events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    /// Free-hand drawing.
    Pen,
    /// Text is placed from the rich-text editor, not by pointer.
    Text,
    /// Whiteout patches.
    Eraser,
    /// Images come from a file picker, not by pointer.
    Image,
    Line,
}

/// Values from the editor state a tool needs when it creates objects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolSettings {
    pub color: Color,
    pub eraser_size: f64,
    pub whiteout_opacity: f32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            eraser_size: 50.0,
            whiteout_opacity: 1.0,
        }
    }
}

/// Trait for tools that handle input and produce commands.
pub trait Tool {
    /// Handle an input event, returning zero or more commands.
    /// `hit` is the topmost overlay under the pointer, if any.
    fn handle(
        &mut self,
        event: &InputEvent,
        hit: Option<ObjectId>,
        settings: &ToolSettings,
    ) -> Vec<EditCommand>;
}

fn normalize_rect(start: Point, end: Point) -> Rect {
    Rect::from_points(start, end)
}

// ─── Select Tool ─────────────────────────────────────────────────────────

pub struct SelectTool {
    /// Currently selected objects.
    pub selected: ObjectIds,
    /// Press position and accumulated offset of an in-progress drag.
    drag: Option<(Point, (f64, f64))>,
    /// Set when pointer-down hits empty space.
    pub marquee_start: Option<Point>,
    /// Current marquee rectangle. Updated during drag; the editor resolves
    /// it with `hit_test_rect` on pointer-up.
    pub marquee_rect: Option<Rect>,
}

impl Default for SelectTool {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectTool {
    pub fn new() -> Self {
        Self {
            selected: ObjectIds::new(),
            drag: None,
            marquee_start: None,
            marquee_rect: None,
        }
    }

    /// Offset of the drag in progress, for live preview.
    pub fn drag_offset(&self) -> Option<(f64, f64)> {
        self.drag.map(|(_, offset)| offset)
    }

    /// Take the finished marquee, if the last gesture drew one.
    pub fn take_marquee(&mut self) -> Option<Rect> {
        self.marquee_start = None;
        self.marquee_rect.take()
    }

    fn constrained(start: Point, x: f64, y: f64, shift: bool) -> (f64, f64) {
        let mut dx = x - start.x;
        let mut dy = y - start.y;
        // Shift: constrain to dominant axis
        if shift {
            if dx.abs() > dy.abs() {
                dy = 0.0;
            } else {
                dx = 0.0;
            }
        }
        (dx, dy)
    }
}

impl Tool for SelectTool {
    fn handle(
        &mut self,
        event: &InputEvent,
        hit: Option<ObjectId>,
        _settings: &ToolSettings,
    ) -> Vec<EditCommand> {
        match event {
            InputEvent::PointerDown { x, y, modifiers, .. } => {
                self.marquee_start = None;
                self.marquee_rect = None;
                let p = Point::new(*x, *y);

                if let Some(hit_id) = hit {
                    // Shift+click: toggle in/out of selection
                    if modifiers.shift {
                        if let Some(pos) = self.selected.iter().position(|id| *id == hit_id) {
                            self.selected.remove(pos);
                        } else {
                            self.selected.push(hit_id);
                        }
                    } else if !self.selected.contains(&hit_id) {
                        self.selected = ObjectIds::from_slice(&[hit_id]);
                    }
                    // Clicking an already-selected object keeps the selection for drag
                    self.drag = (!self.selected.is_empty()).then_some((p, (0.0, 0.0)));
                } else {
                    if !modifiers.shift {
                        self.selected.clear();
                    }
                    self.drag = None;
                    self.marquee_start = Some(p);
                    self.marquee_rect = Some(Rect::from_origin_size(p, (0.0, 0.0)));
                }
                vec![]
            }
            InputEvent::PointerMove { x, y, modifiers, .. } => {
                if let Some(start) = self.marquee_start {
                    self.marquee_rect = Some(normalize_rect(start, Point::new(*x, *y)));
                } else if let Some((start, offset)) = self.drag.as_mut() {
                    *offset = Self::constrained(*start, *x, *y, modifiers.shift);
                }
                vec![]
            }
            InputEvent::PointerUp { x, y, modifiers } => {
                if let Some(start) = self.marquee_start.take() {
                    self.marquee_rect = Some(normalize_rect(start, Point::new(*x, *y)));
                    return vec![];
                }
                let Some((start, _)) = self.drag.take() else {
                    return vec![];
                };
                let (dx, dy) = Self::constrained(start, *x, *y, modifiers.shift);
                if dx.hypot(dy) < CLICK_SLOP {
                    return vec![];
                }
                vec![EditCommand::TranslateOverlays {
                    ids: self.selected.to_vec(),
                    dx,
                    dy,
                }]
            }
            InputEvent::Key { .. } => vec![],
        }
    }
}

// ─── Pen Tool (freehand) ─────────────────────────────────────────────────

pub struct PenTool {
    points: Vec<Point>,
    drawing: bool,
}

impl Default for PenTool {
    fn default() -> Self {
        Self::new()
    }
}

impl PenTool {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            drawing: false,
        }
    }

    /// Points of the stroke in progress, for live preview.
    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

impl Tool for PenTool {
    fn handle(
        &mut self,
        event: &InputEvent,
        _hit: Option<ObjectId>,
        settings: &ToolSettings,
    ) -> Vec<EditCommand> {
        match event {
            InputEvent::PointerDown { x, y, .. } => {
                self.drawing = true;
                self.points.clear();
                self.points.push(Point::new(*x, *y));
                vec![]
            }
            InputEvent::PointerMove { x, y, .. } => {
                if self.drawing {
                    self.points.push(Point::new(*x, *y));
                }
                vec![]
            }
            InputEvent::PointerUp { x, y, .. } => {
                if !self.drawing {
                    return vec![];
                }
                self.drawing = false;
                self.points.push(Point::new(*x, *y));
                let points = std::mem::take(&mut self.points);
                factory::freehand(&points, settings.color)
                    .map(|object| vec![EditCommand::AddOverlay { object }])
                    .unwrap_or_default()
            }
            InputEvent::Key { .. } => vec![],
        }
    }
}

// ─── Eraser Tool (whiteout) ──────────────────────────────────────────────

/// A click drops an `eraser_size × eraser_size/2` patch centred on the
/// pointer; a drag covers the dragged rectangle.
#[derive(Default)]
pub struct EraserTool {
    start: Option<Point>,
}

impl EraserTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for EraserTool {
    fn handle(
        &mut self,
        event: &InputEvent,
        _hit: Option<ObjectId>,
        settings: &ToolSettings,
    ) -> Vec<EditCommand> {
        match event {
            InputEvent::PointerDown { x, y, .. } => {
                self.start = Some(Point::new(*x, *y));
                vec![]
            }
            InputEvent::PointerUp { x, y, .. } => {
                let Some(start) = self.start.take() else {
                    return vec![];
                };
                let end = Point::new(*x, *y);
                let object = if start.distance(end) < CLICK_SLOP {
                    factory::quick_whiteout(end, settings.eraser_size, settings.whiteout_opacity)
                } else {
                    factory::whiteout(normalize_rect(start, end), settings.whiteout_opacity)
                };
                vec![EditCommand::AddOverlay { object }]
            }
            _ => vec![],
        }
    }
}

// ─── Line Tool ───────────────────────────────────────────────────────────

#[derive(Default)]
pub struct LineTool {
    start: Option<Point>,
}

impl LineTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for LineTool {
    fn handle(
        &mut self,
        event: &InputEvent,
        _hit: Option<ObjectId>,
        settings: &ToolSettings,
    ) -> Vec<EditCommand> {
        match event {
            InputEvent::PointerDown { x, y, .. } => {
                self.start = Some(Point::new(*x, *y));
                vec![]
            }
            InputEvent::PointerUp { x, y, modifiers } => {
                let Some(start) = self.start.take() else {
                    return vec![];
                };
                let mut end = Point::new(*x, *y);
                if modifiers.shift {
                    if (end.x - start.x).abs() > (end.y - start.y).abs() {
                        end.y = start.y;
                    } else {
                        end.x = start.x;
                    }
                }
                if start.distance(end) < CLICK_SLOP {
                    return vec![];
                }
                vec![EditCommand::AddOverlay {
                    object: factory::line(start, end, settings.color),
                }]
            }
            _ => vec![],
        }
    }
}
