//! Editor UI state: active tool, selection, colours, and text formatting.
//!
//! Toolbar and canvas handlers share this struct by reference instead of
//! reading ambient globals. Formatting setters both update the state and
//! return the commands that restyle the current selection, mirroring a
//! toolbar that applies a change to whatever is selected.

use crate::commands::EditCommand;
use crate::config::EditorConfig;
use crate::input::{InputEvent, Modifiers};
use crate::shortcuts::ShortcutAction;
use crate::tools::{EraserTool, LineTool, PenTool, SelectTool, Tool, ToolKind, ToolSettings};
use serde::{Deserialize, Serialize};
use sp_core::factory::{self, AVAILABLE_FONTS};
use sp_core::id::ObjectIds;
use sp_core::{
    Color, Error, ObjectId, OverlayKind, OverlayObject, OverlayPatch, Result, TextFormat,
    strip_markup,
};
use sp_render::hit::{hit_test, hit_test_rect};

/// Shapes offered by the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rect,
    Circle,
}

pub struct EditorState {
    tool: ToolKind,
    select: SelectTool,
    pen: PenTool,
    eraser: EraserTool,
    line: LineTool,
    pub active_color: Color,
    /// Last fill picked for rectangles and circles; `None` is transparent.
    pub fill_color: Option<Color>,
    /// Template for new text boxes. `content` and `width` are unused.
    pub text_format: TextFormat,
    pub eraser_size: f64,
    pub whiteout_opacity: f32,
    image_max_width: f64,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl EditorState {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            tool: ToolKind::Select,
            select: SelectTool::new(),
            pen: PenTool::new(),
            eraser: EraserTool::new(),
            line: LineTool::new(),
            active_color: Color::BLACK,
            fill_color: None,
            text_format: TextFormat::default(),
            eraser_size: config.eraser_size,
            whiteout_opacity: config.whiteout_opacity,
            image_max_width: config.image_max_width,
        }
    }

    // ─── Tool & selection ────────────────────────────────────────────────

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        if tool != self.tool {
            log::debug!("tool {:?} -> {tool:?}", self.tool);
        }
        self.tool = tool;
    }

    pub fn selection(&self) -> &[ObjectId] {
        &self.select.selected
    }

    pub fn select(&mut self, ids: &[ObjectId], objects: &[OverlayObject]) {
        self.select.selected = ObjectIds::from_slice(ids);
        self.sync_from_selection(objects);
    }

    pub fn clear_selection(&mut self) {
        self.select.selected.clear();
    }

    /// Drop selected ids that are no longer on the page (after undo or
    /// page navigation).
    pub fn prune_selection(&mut self, objects: &[OverlayObject]) {
        self.select
            .selected
            .retain(|id| objects.iter().any(|o| o.id == *id));
    }

    /// Offset of an in-progress select drag, for live preview.
    pub fn drag_preview(&self) -> Option<(&[ObjectId], (f64, f64))> {
        self.select
            .drag_offset()
            .map(|offset| (self.selection(), offset))
    }

    pub fn settings(&self) -> ToolSettings {
        ToolSettings {
            color: self.active_color,
            eraser_size: self.eraser_size,
            whiteout_opacity: self.whiteout_opacity,
        }
    }

    /// Route a pointer event to the active tool. `objects` is the active
    /// page's overlay list, back to front.
    pub fn handle_pointer(&mut self, event: &InputEvent, objects: &[OverlayObject]) -> Vec<EditCommand> {
        let hit = event.position().and_then(|(x, y)| hit_test(objects, x, y));
        let settings = self.settings();
        let commands = match self.tool {
            ToolKind::Select => self.select.handle(event, hit, &settings),
            ToolKind::Pen => self.pen.handle(event, hit, &settings),
            ToolKind::Eraser => self.eraser.handle(event, hit, &settings),
            ToolKind::Line => self.line.handle(event, hit, &settings),
            ToolKind::Text | ToolKind::Image => Vec::new(),
        };

        if self.tool == ToolKind::Select {
            match event {
                InputEvent::PointerUp { modifiers, .. } => {
                    if let Some(marquee) = self.select.take_marquee() {
                        let hits = hit_test_rect(objects, marquee);
                        self.extend_selection(&hits, *modifiers);
                    }
                    self.sync_from_selection(objects);
                }
                InputEvent::PointerDown { .. } => self.sync_from_selection(objects),
                _ => {}
            }
        }
        commands
    }

    fn extend_selection(&mut self, hits: &[ObjectId], modifiers: Modifiers) {
        if !modifiers.shift {
            self.select.selected.clear();
        }
        for id in hits {
            if !self.select.selected.contains(id) {
                self.select.selected.push(*id);
            }
        }
    }

    /// Populate formatting controls from a single selected object.
    fn sync_from_selection(&mut self, objects: &[OverlayObject]) {
        let [id] = self.selection() else {
            return;
        };
        let Some(obj) = objects.iter().find(|o| o.id == *id) else {
            return;
        };
        match &obj.kind {
            OverlayKind::Text(t) => {
                self.text_format.font_family.clone_from(&t.font_family);
                self.text_format.font_size = t.font_size;
                self.text_format.bold = t.bold;
                self.text_format.italic = t.italic;
                self.text_format.underline = t.underline;
                if let Some(fill) = obj.style.fill {
                    self.active_color = fill;
                }
            }
            kind if kind.accepts_fill() => {
                self.fill_color = obj.style.fill;
                if let Some(stroke) = obj.style.stroke {
                    self.active_color = stroke;
                }
            }
            _ => {}
        }
    }

    // ─── Shortcuts ───────────────────────────────────────────────────────

    /// Turn a shortcut into a command. Tool switches and deselection are
    /// handled here and return `None`.
    pub fn apply_shortcut(&mut self, action: ShortcutAction, active_page: u32) -> Option<EditCommand> {
        match action {
            ShortcutAction::ToolSelect => self.set_tool(ToolKind::Select),
            ShortcutAction::ToolPen => self.set_tool(ToolKind::Pen),
            ShortcutAction::ToolText => self.set_tool(ToolKind::Text),
            ShortcutAction::ToolEraser => self.set_tool(ToolKind::Eraser),
            ShortcutAction::ToolLine => self.set_tool(ToolKind::Line),
            ShortcutAction::Deselect => self.clear_selection(),
            ShortcutAction::Undo => return Some(EditCommand::Undo),
            ShortcutAction::Delete => return self.delete_selection(),
            ShortcutAction::Rotate(dir) => {
                return Some(EditCommand::RotatePage { delta: dir.delta() });
            }
            ShortcutAction::NextPage => {
                return Some(EditCommand::GoToPage {
                    page: active_page.saturating_add(1),
                });
            }
            ShortcutAction::PrevPage => {
                return Some(EditCommand::GoToPage {
                    page: active_page.saturating_sub(1),
                });
            }
        }
        None
    }

    /// Remove the selection; `None` when nothing is selected.
    pub fn delete_selection(&mut self) -> Option<EditCommand> {
        if self.select.selected.is_empty() {
            return None;
        }
        let ids = self.select.selected.drain(..).collect();
        Some(EditCommand::RemoveOverlays { ids })
    }

    // ─── Object creation ─────────────────────────────────────────────────

    /// Default text at the standard origin.
    pub fn add_text(&self) -> EditCommand {
        EditCommand::AddOverlay {
            object: factory::text(factory::DEFAULT_TEXT),
        }
    }

    /// Text box from rich-text markup, using the current format and colour.
    /// `None` when the markup has no visible text.
    pub fn add_rich_text(&self, markup: &str) -> Option<EditCommand> {
        let content = strip_markup(markup);
        if content.trim().is_empty() {
            return None;
        }
        Some(EditCommand::AddOverlay {
            object: factory::textbox(content, &self.text_format, self.active_color),
        })
    }

    pub fn add_shape(&self, shape: ShapeKind) -> EditCommand {
        let mut object = match shape {
            ShapeKind::Rect => factory::rect(),
            ShapeKind::Circle => factory::circle(),
        };
        object.style.fill = self.fill_color;
        EditCommand::AddOverlay { object }
    }

    pub fn add_image(&self, source: impl Into<String>, width: f64, height: f64) -> Result<EditCommand> {
        if width <= 0.0 || height <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "image has no pixels ({width}x{height})"
            )));
        }
        Ok(EditCommand::AddOverlay {
            object: factory::image(source, width, height, self.image_max_width),
        })
    }

    // ─── Formatting the selection ────────────────────────────────────────

    /// Replace the content of the selected text object with stripped markup.
    pub fn update_selected_text(&self, markup: &str, objects: &[OverlayObject]) -> Vec<EditCommand> {
        let patch = OverlayPatch {
            text: Some(strip_markup(markup)),
            ..Default::default()
        };
        self.restyle(objects, patch, |k| matches!(k, OverlayKind::Text(_)))
    }

    pub fn set_font_family(&mut self, family: &str, objects: &[OverlayObject]) -> Result<Vec<EditCommand>> {
        if !AVAILABLE_FONTS.iter().any(|f| *f == family) {
            return Err(Error::InvalidInput(format!("unknown font family {family:?}")));
        }
        self.text_format.font_family = family.to_string();
        Ok(self.restyle_text(
            objects,
            OverlayPatch {
                font_family: Some(family.to_string()),
                ..Default::default()
            },
        ))
    }

    pub fn set_font_size(&mut self, size: f32, objects: &[OverlayObject]) -> Result<Vec<EditCommand>> {
        if !(size.is_finite() && size > 0.0) {
            return Err(Error::InvalidInput(format!("font size must be positive, got {size}")));
        }
        self.text_format.font_size = size;
        Ok(self.restyle_text(
            objects,
            OverlayPatch {
                font_size: Some(size),
                ..Default::default()
            },
        ))
    }

    pub fn toggle_bold(&mut self, objects: &[OverlayObject]) -> Vec<EditCommand> {
        self.text_format.bold = !self.text_format.bold;
        let patch = OverlayPatch {
            bold: Some(self.text_format.bold),
            ..Default::default()
        };
        self.restyle_text(objects, patch)
    }

    pub fn toggle_italic(&mut self, objects: &[OverlayObject]) -> Vec<EditCommand> {
        self.text_format.italic = !self.text_format.italic;
        let patch = OverlayPatch {
            italic: Some(self.text_format.italic),
            ..Default::default()
        };
        self.restyle_text(objects, patch)
    }

    pub fn toggle_underline(&mut self, objects: &[OverlayObject]) -> Vec<EditCommand> {
        self.text_format.underline = !self.text_format.underline;
        let patch = OverlayPatch {
            underline: Some(self.text_format.underline),
            ..Default::default()
        };
        self.restyle_text(objects, patch)
    }

    /// Text takes the colour as its fill; strokes (shapes, lines, drawings)
    /// take it as their stroke.
    pub fn set_color(&mut self, color: Color, objects: &[OverlayObject]) -> Vec<EditCommand> {
        self.active_color = color;
        let mut commands = self.restyle_text(
            objects,
            OverlayPatch {
                fill: Some(color),
                ..Default::default()
            },
        );
        commands.extend(self.restyle(
            objects,
            OverlayPatch {
                stroke: Some(color),
                ..Default::default()
            },
            |k| {
                matches!(
                    k,
                    OverlayKind::Rect { .. }
                        | OverlayKind::Circle { .. }
                        | OverlayKind::Line { .. }
                        | OverlayKind::Freehand { .. }
                )
            },
        ));
        commands
    }

    pub fn set_fill(&mut self, color: Color, objects: &[OverlayObject]) -> Vec<EditCommand> {
        self.fill_color = Some(color);
        let patch = OverlayPatch {
            fill: Some(color),
            ..Default::default()
        };
        self.restyle(objects, patch, OverlayKind::accepts_fill)
    }

    pub fn clear_fill(&mut self, objects: &[OverlayObject]) -> Vec<EditCommand> {
        self.fill_color = None;
        let patch = OverlayPatch {
            clear_fill: true,
            ..Default::default()
        };
        self.restyle(objects, patch, OverlayKind::accepts_fill)
    }

    fn restyle_text(&self, objects: &[OverlayObject], patch: OverlayPatch) -> Vec<EditCommand> {
        self.restyle(objects, patch, |k| matches!(k, OverlayKind::Text(_)))
    }

    /// One `MutateOverlay` per selected object whose kind passes `accepts`.
    fn restyle(
        &self,
        objects: &[OverlayObject],
        patch: OverlayPatch,
        accepts: impl Fn(&OverlayKind) -> bool,
    ) -> Vec<EditCommand> {
        objects
            .iter()
            .filter(|o| self.selection().contains(&o.id) && accepts(&o.kind))
            .map(|o| EditCommand::MutateOverlay {
                id: o.id,
                patch: patch.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sp_core::RotateDirection;

    fn page_objects() -> Vec<OverlayObject> {
        let mut text = factory::text("Hello");
        text.x = 0.0;
        text.y = 0.0;
        if let OverlayKind::Text(t) = &mut text.kind {
            t.font_family = "Georgia".into();
            t.font_size = 32.0;
            t.bold = true;
        }
        let mut rect = factory::rect();
        rect.x = 300.0;
        rect.y = 300.0;
        rect.style.fill = Some(Color::WHITE);
        vec![text, rect]
    }

    #[test]
    fn clicking_text_populates_format() {
        let objects = page_objects();
        let mut state = EditorState::default();
        state.handle_pointer(&InputEvent::pointer_down(5.0, 5.0, Modifiers::NONE), &objects);
        assert_eq!(state.selection(), &[objects[0].id]);
        assert_eq!(state.text_format.font_family, "Georgia");
        assert_eq!(state.text_format.font_size, 32.0);
        assert!(state.text_format.bold);
    }

    #[test]
    fn clicking_shape_populates_fill() {
        let objects = page_objects();
        let mut state = EditorState::default();
        state.handle_pointer(&InputEvent::pointer_down(350.0, 350.0, Modifiers::NONE), &objects);
        assert_eq!(state.fill_color, Some(Color::WHITE));
    }

    #[test]
    fn marquee_selects_intersecting() {
        let objects = page_objects();
        let mut state = EditorState::default();
        state.handle_pointer(&InputEvent::pointer_down(600.0, 600.0, Modifiers::NONE), &objects);
        state.handle_pointer(&InputEvent::pointer_move(250.0, 250.0, Modifiers::NONE), &objects);
        state.handle_pointer(&InputEvent::pointer_up(250.0, 250.0, Modifiers::NONE), &objects);
        assert_eq!(state.selection(), &[objects[1].id]);
    }

    #[test]
    fn rich_text_is_stripped() {
        let state = EditorState::default();
        let Some(EditCommand::AddOverlay { object }) =
            state.add_rich_text("<p>Hello <b>world</b></p>")
        else {
            panic!("expected AddOverlay");
        };
        assert_eq!(object.text().unwrap().content, "Hello world");
        assert_eq!(object.text().unwrap().width, Some(factory::TEXTBOX_WIDTH));
        assert_eq!(state.add_rich_text("<p><br></p>"), None);
    }

    #[test]
    fn formatting_targets_selected_text_only() {
        let objects = page_objects();
        let mut state = EditorState::default();
        state.select(&[objects[0].id, objects[1].id], &objects);

        let cmds = state.set_font_family("Courier New", &objects).unwrap();
        assert_eq!(cmds.len(), 1);
        assert!(matches!(&cmds[0], EditCommand::MutateOverlay { id, .. } if *id == objects[0].id));

        assert!(state.set_font_family("Comic Papyrus", &objects).is_err());
        assert!(state.set_font_size(0.0, &objects).is_err());
    }

    #[test]
    fn fill_targets_shapes_only() {
        let objects = page_objects();
        let mut state = EditorState::default();
        state.select(&[objects[0].id, objects[1].id], &objects);
        let cmds = state.clear_fill(&objects);
        assert_eq!(
            cmds,
            vec![EditCommand::MutateOverlay {
                id: objects[1].id,
                patch: OverlayPatch {
                    clear_fill: true,
                    ..Default::default()
                },
            }]
        );
        assert_eq!(state.fill_color, None);
    }

    #[test]
    fn shortcuts_map_to_commands() {
        let objects = page_objects();
        let mut state = EditorState::default();
        assert_eq!(state.apply_shortcut(ShortcutAction::ToolPen, 1), None);
        assert_eq!(state.tool(), ToolKind::Pen);
        assert_eq!(
            state.apply_shortcut(ShortcutAction::Rotate(RotateDirection::Left), 1),
            Some(EditCommand::RotatePage { delta: -90 })
        );
        assert_eq!(
            state.apply_shortcut(ShortcutAction::NextPage, 2),
            Some(EditCommand::GoToPage { page: 3 })
        );

        assert_eq!(state.apply_shortcut(ShortcutAction::Delete, 1), None);
        state.select(&[objects[1].id], &objects);
        assert_eq!(
            state.apply_shortcut(ShortcutAction::Delete, 1),
            Some(EditCommand::RemoveOverlays {
                ids: vec![objects[1].id]
            })
        );
        assert!(state.selection().is_empty());
    }

    #[test]
    fn image_needs_pixels() {
        let state = EditorState::default();
        assert!(state.add_image("data:,", 0.0, 10.0).is_err());
        let Ok(EditCommand::AddOverlay { object }) = state.add_image("data:,", 600.0, 400.0) else {
            panic!("expected AddOverlay");
        };
        assert_eq!(object.bounds().width(), 300.0);
    }
}
