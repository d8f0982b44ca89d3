//! Edit commands dispatched against a `DocumentSession`.
//!
//! Tools, shortcuts, and the host UI never mutate sessions directly; they
//! produce `EditCommand`s that are applied synchronously here. Export is
//! asynchronous and lives on [`crate::Editor`] instead.

use crate::document::DocumentSession;
use serde::{Deserialize, Serialize};
use sp_core::{Error, ObjectId, OverlayObject, OverlayPatch, Result, Rotation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    AddOverlay {
        object: OverlayObject,
    },
    MutateOverlay {
        id: ObjectId,
        patch: OverlayPatch,
    },
    RemoveOverlays {
        ids: Vec<ObjectId>,
    },
    TranslateOverlays {
        ids: Vec<ObjectId>,
        dx: f64,
        dy: f64,
    },
    /// Rotate the active page by `delta` degrees (±90).
    RotatePage {
        delta: i32,
    },
    Undo,
    GoToPage {
        page: u32,
    },
}

impl EditCommand {
    /// Short label for logs and notices.
    pub fn label(&self) -> &'static str {
        match self {
            EditCommand::AddOverlay { .. } => "add",
            EditCommand::MutateOverlay { .. } => "modify",
            EditCommand::RemoveOverlays { .. } => "remove",
            EditCommand::TranslateOverlays { .. } => "move",
            EditCommand::RotatePage { .. } => "rotate",
            EditCommand::Undo => "undo",
            EditCommand::GoToPage { .. } => "navigate",
        }
    }
}

/// What a command did, so the host knows what to refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The active page's overlay set changed.
    Changed,
    /// Valid command with no effect (unknown id, empty removal).
    Unchanged,
    Rotated { page: u32, rotation: Rotation },
    Navigated { page: u32, needs_background: bool },
}

impl DocumentSession {
    pub fn apply(&mut self, command: EditCommand) -> Result<CommandOutcome> {
        log::trace!("apply {}", command.label());
        let changed = |did: bool| {
            if did {
                CommandOutcome::Changed
            } else {
                CommandOutcome::Unchanged
            }
        };
        let outcome = match command {
            EditCommand::AddOverlay { object } => {
                if let Some(owner) = self.pages().find(|p| p.object(object.id).is_some()) {
                    return Err(Error::InvalidInput(format!(
                        "object {} already exists on page {}",
                        object.id,
                        owner.number()
                    )));
                }
                self.active_page_mut().add_overlay(object);
                CommandOutcome::Changed
            }
            EditCommand::MutateOverlay { id, patch } => {
                changed(self.active_page_mut().mutate_overlay(id, &patch))
            }
            EditCommand::RemoveOverlays { ids } => {
                changed(self.active_page_mut().remove_overlays(&ids))
            }
            EditCommand::TranslateOverlays { ids, dx, dy } => {
                changed(self.active_page_mut().translate(&ids, dx, dy))
            }
            EditCommand::RotatePage { delta } => {
                let page = self.active_page_number();
                let rotation = self.active_page_mut().rotate(delta)?;
                self.record_rotation(page, rotation);
                CommandOutcome::Rotated { page, rotation }
            }
            EditCommand::Undo => {
                self.active_page_mut().undo()?;
                CommandOutcome::Changed
            }
            EditCommand::GoToPage { page } => {
                let nav = self.go_to_page(page)?;
                CommandOutcome::Navigated {
                    page: nav.page,
                    needs_background: nav.needs_background,
                }
            }
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RevisitPolicy;
    use pretty_assertions::assert_eq;
    use sp_core::factory;

    fn doc() -> DocumentSession {
        DocumentSession::new("a.pdf", 3, RevisitPolicy::Preserve).unwrap()
    }

    #[test]
    fn rotate_records_for_export() {
        let mut doc = doc();
        let outcome = doc.apply(EditCommand::RotatePage { delta: 90 }).unwrap();
        let r = Rotation::from_degrees(90).unwrap();
        assert_eq!(outcome, CommandOutcome::Rotated { page: 1, rotation: r });
        assert_eq!(doc.recorded_rotation(1), r);

        // Recorded rotation outlives navigation.
        doc.apply(EditCommand::GoToPage { page: 2 }).unwrap();
        assert_eq!(doc.recorded_rotation(1), r);
    }

    #[test]
    fn rotate_rejects_multi_turn_steps() {
        let mut doc = doc();
        let err = doc.apply(EditCommand::RotatePage { delta: 270 }).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(doc.active_page().rotation(), Rotation::NONE);
        assert_eq!(doc.recorded_rotation(1), Rotation::NONE);
    }

    #[test]
    fn duplicate_ids_are_rejected_across_pages() {
        let mut doc = doc();
        let rect = factory::rect();
        doc.apply(EditCommand::AddOverlay {
            object: rect.clone(),
        })
        .unwrap();

        let err = doc
            .apply(EditCommand::AddOverlay {
                object: rect.clone(),
            })
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(doc.page(1).unwrap().objects().len(), 1);
        assert_eq!(doc.page(1).unwrap().history().len(), 2);

        doc.apply(EditCommand::GoToPage { page: 2 }).unwrap();
        let err = doc
            .apply(EditCommand::AddOverlay { object: rect })
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(doc.page(2).unwrap().objects().is_empty());
        assert!(!doc.page(2).unwrap().has_edits());
    }

    #[test]
    fn edits_target_active_page_only() {
        let mut doc = doc();
        doc.apply(EditCommand::GoToPage { page: 3 }).unwrap();
        doc.apply(EditCommand::AddOverlay {
            object: factory::rect(),
        })
        .unwrap();
        assert_eq!(doc.page(3).unwrap().objects().len(), 1);
        assert!(doc.page(1).unwrap().objects().is_empty());
    }

    #[test]
    fn undo_without_history_is_error() {
        let mut doc = doc();
        assert_eq!(doc.apply(EditCommand::Undo).unwrap_err(), Error::NoHistory);
    }

    #[test]
    fn remove_unknown_is_unchanged() {
        let mut doc = doc();
        let outcome = doc
            .apply(EditCommand::RemoveOverlays {
                ids: vec![ObjectId::intern("nope")],
            })
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Unchanged);
    }

    #[test]
    fn commands_deserialize_from_json() {
        let cmd: EditCommand = serde_json::from_str(r#"{ "op": "rotate_page", "delta": -90 }"#).unwrap();
        assert_eq!(cmd, EditCommand::RotatePage { delta: -90 });
        let cmd: EditCommand = serde_json::from_str(r#"{ "op": "undo" }"#).unwrap();
        assert_eq!(cmd, EditCommand::Undo);
    }
}
