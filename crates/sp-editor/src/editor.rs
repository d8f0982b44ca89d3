//! Editor controller.
//!
//! `Editor` ties a `DocumentSession` to its collaborators: the loaded source
//! document (page rendering), the drawing surface, and the UI state. It
//! turns commands and raw input into session edits plus the surface side
//! effects each one needs, and queues a notice for every user-visible
//! outcome.

use crate::commands::{CommandOutcome, EditCommand};
use crate::config::EditorConfig;
use crate::document::DocumentSession;
use crate::export::{ExportPipeline, ExportReport};
use crate::input::InputEvent;
use crate::notice::{Notice, NoticeLevel, Notices};
use crate::shortcuts::ShortcutMap;
use crate::state::EditorState;
use sp_core::{Error, OverlayObject, Result, Rotation};
use sp_render::{PdfWriter, SceneView, SourceDocument, Surface};

pub struct Editor<D, S> {
    config: EditorConfig,
    source: D,
    surface: S,
    session: DocumentSession,
    state: EditorState,
    notices: Notices,
}

impl<D: SourceDocument, S: Surface> Editor<D, S> {
    /// Start a session on `source` and show page 1.
    pub async fn open(
        config: EditorConfig,
        file_name: impl Into<String>,
        source: D,
        surface: S,
    ) -> Result<Self> {
        let session = DocumentSession::new(file_name, source.page_count(), config.revisit)?;
        log::info!(
            "opened {} with {} page(s)",
            session.file_name(),
            session.total_pages()
        );
        let mut editor = Self {
            state: EditorState::new(&config),
            notices: Notices::new(config.notice_duration_ms),
            config,
            source,
            surface,
            session,
        };
        editor.load_background(1).await?;
        Ok(editor)
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn session(&self) -> &DocumentSession {
        &self.session
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    /// Overlays on the active page, back to front.
    pub fn objects(&self) -> &[OverlayObject] {
        self.session.active_page().objects()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    // ─── Navigation ──────────────────────────────────────────────────────

    pub async fn go_to_page(&mut self, page: u32) -> Result<CommandOutcome> {
        self.dispatch(EditCommand::GoToPage { page }).await
    }

    /// Render `page` from the source and install it as the page background.
    async fn load_background(&mut self, page: u32) -> Result<()> {
        let rotation = self.session.recorded_rotation(page);
        let image = match self
            .source
            .render_page(page, self.config.source_render_scale, rotation)
            .await
        {
            Ok(image) => image,
            Err(e) => {
                log::error!("page {page} failed to load: {e}");
                self.notices.error(&e);
                return Err(e);
            }
        };
        let background = self.surface.install_background(page, image, rotation)?;
        self.session.install_background(page, background)?;
        self.present();
        self.notices.success(format!("Page {page} loaded"));
        Ok(())
    }

    // ─── Commands ────────────────────────────────────────────────────────

    /// Apply `command` to the session and update the surface. Failures are
    /// also queued as notices.
    pub async fn dispatch(&mut self, command: EditCommand) -> Result<CommandOutcome> {
        let added = match &command {
            EditCommand::AddOverlay { object } => Some((object.id, object.kind.name())),
            _ => None,
        };
        let label = command.label();
        let removed = match &command {
            EditCommand::RemoveOverlays { ids } => ids.len(),
            _ => 0,
        };

        let outcome = match self.session.apply(command) {
            Ok(outcome) => outcome,
            Err(Error::NoHistory) => {
                self.notices.info("Nothing to undo");
                return Err(Error::NoHistory);
            }
            Err(e) => {
                log::debug!("{label} rejected: {e}");
                self.notices.error(&e);
                return Err(e);
            }
        };

        match outcome {
            CommandOutcome::Changed => {
                if let Some((id, kind)) = added {
                    let objects = self.session.active_page().objects();
                    self.state.select(&[id], objects);
                    self.notices.success(format!("Added {kind}"));
                } else {
                    self.state.prune_selection(self.session.active_page().objects());
                    match label {
                        "remove" => self.notices.success(format!("Removed {removed} object(s)")),
                        "undo" => self.notices.info("Undone"),
                        _ => {}
                    }
                }
                self.present();
            }
            CommandOutcome::Unchanged => {}
            CommandOutcome::Rotated { page, rotation } => {
                // The rotation is committed either way; only the display lags.
                match self.rotate_background(page, rotation) {
                    Ok(()) => self.notices.info(format!("Page rotated to {rotation}")),
                    Err(e) => {
                        log::error!("page {page}: background not rotated to {rotation}: {e}");
                        self.notices.error(&e);
                    }
                }
                self.present();
            }
            CommandOutcome::Navigated {
                page,
                needs_background,
            } => {
                self.state.clear_selection();
                if needs_background {
                    self.load_background(page).await?;
                } else {
                    self.present();
                }
            }
        }
        Ok(outcome)
    }

    fn rotate_background(&mut self, page: u32, rotation: Rotation) -> Result<()> {
        let Some(background) = self.session.page(page).and_then(|p| p.background().copied()) else {
            return Ok(());
        };
        self.surface.rotate_background(&background, rotation)
    }

    /// Build commands from the UI state against the active page's overlays
    /// (toolbar formatting, text edits) and dispatch them in order.
    pub async fn edit_selection<F>(&mut self, edit: F) -> Result<Vec<CommandOutcome>>
    where
        F: FnOnce(&mut EditorState, &[OverlayObject]) -> Result<Vec<EditCommand>>,
    {
        let commands = edit(&mut self.state, self.session.active_page().objects())?;
        let mut outcomes = Vec::with_capacity(commands.len());
        for command in commands {
            outcomes.push(self.dispatch(command).await?);
        }
        Ok(outcomes)
    }

    /// Route raw input: keys through the shortcut map, pointer events
    /// through the active tool. Returns the outcomes of the commands run.
    pub async fn handle_input(&mut self, event: &InputEvent) -> Result<Vec<CommandOutcome>> {
        let commands = match event {
            InputEvent::Key { key, modifiers } => ShortcutMap::resolve(key, *modifiers)
                .and_then(|action| {
                    self.state
                        .apply_shortcut(action, self.session.active_page_number())
                })
                .into_iter()
                .collect(),
            _ => {
                let objects = self.session.active_page().objects();
                self.state.handle_pointer(event, objects)
            }
        };

        let mut outcomes = Vec::with_capacity(commands.len());
        for command in commands {
            outcomes.push(self.dispatch(command).await?);
        }
        if matches!(event, InputEvent::PointerMove { .. }) {
            self.present();
        }
        Ok(outcomes)
    }

    /// Redraw the active page, showing an in-progress drag if there is one.
    pub fn present(&mut self) {
        let page = self.session.active_page();
        match self.state.drag_preview() {
            Some((ids, (dx, dy))) if dx != 0.0 || dy != 0.0 => {
                let preview: Vec<OverlayObject> = page
                    .objects()
                    .iter()
                    .cloned()
                    .map(|mut o| {
                        if ids.contains(&o.id) {
                            o.x += dx;
                            o.y += dy;
                        }
                        o
                    })
                    .collect();
                let scene = SceneView {
                    objects: &preview,
                    ..page.scene()
                };
                self.surface.present(&scene);
            }
            _ => self.surface.present(&page.scene()),
        }
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Flatten every page through `writer`. Page-level failures are
    /// tolerated and reported; anything else aborts with `Error::Export`.
    pub async fn export<W: PdfWriter>(&mut self, writer: W) -> Result<ExportReport> {
        self.notices.info("Preparing PDF for download");
        let pipeline = ExportPipeline::new(&self.config);
        let result = pipeline
            .run(&self.session, &self.source, &mut self.surface, writer)
            .await;
        self.present();

        match result {
            Ok(report) => {
                let failed = report.failed_pages();
                if !failed.is_empty() {
                    self.notices.push(
                        NoticeLevel::Error,
                        format!("Pages {failed:?} could not be rendered and were left blank"),
                    );
                }
                self.notices.success("PDF downloaded");
                log::info!(
                    "exported {} ({} bytes)",
                    report.artifact.file_name,
                    report.artifact.bytes.len()
                );
                Ok(report)
            }
            Err(e) => {
                log::error!("export failed: {e}");
                let e = match e {
                    Error::Export(_) => e,
                    other => Error::Export(other.to_string()),
                };
                self.notices.error(&e);
                Err(e)
            }
        }
    }
}
