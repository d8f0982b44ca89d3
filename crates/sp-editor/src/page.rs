//! Editable state of a single page.
//!
//! A `PageSession` owns the page's overlay list and its `PageHistory`.
//! Every overlay edit goes through one of the methods below so the history
//! always mirrors the displayed overlay set. Rotation is page metadata and
//! never enters the history.

use crate::history::PageHistory;
use sp_core::{ObjectId, OverlayObject, OverlayPatch, Result, Rotation};
use sp_render::{Background, SceneView};

#[derive(Debug, Clone)]
pub struct PageSession {
    number: u32,
    background: Option<Background>,
    rotation: Rotation,
    objects: Vec<OverlayObject>,
    history: PageHistory,
}

impl PageSession {
    /// A page that has been visited but has no background yet.
    pub fn new(number: u32, rotation: Rotation) -> Self {
        Self {
            number,
            background: None,
            rotation,
            objects: Vec::new(),
            history: PageHistory::new(),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    /// 1-based page number in the source document.
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Back-to-front.
    pub fn objects(&self) -> &[OverlayObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&OverlayObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn history(&self) -> &PageHistory {
        &self.history
    }

    /// True once the page has at least one reachable overlay commit.
    pub fn has_edits(&self) -> bool {
        self.history.commit_count() > 0
    }

    /// Canvas size with rotation applied; `None` until a background is loaded.
    pub fn rendered_size(&self) -> Option<(f64, f64)> {
        self.scene().canvas_size()
    }

    pub fn scene(&self) -> SceneView<'_> {
        SceneView {
            page: self.number,
            background: self.background.as_ref(),
            rotation: self.rotation,
            objects: &self.objects,
        }
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Install a freshly rendered background. Discards all overlays and
    /// restarts the history from a single empty snapshot.
    pub fn load_background(&mut self, background: Background, rotation: Rotation) {
        if !self.objects.is_empty() {
            log::debug!(
                "page {}: background reload discards {} overlay(s)",
                self.number,
                self.objects.len()
            );
        }
        self.background = Some(background);
        self.rotation = rotation;
        self.objects.clear();
        self.history = PageHistory::new();
    }

    pub fn add_overlay(&mut self, object: OverlayObject) {
        log::debug!("page {}: add {} {}", self.number, object.kind.name(), object.id);
        self.objects.push(object);
        self.commit();
    }

    /// Apply `patch` to the object with `id`. Returns `false` (and commits
    /// nothing) when the id is not on this page.
    pub fn mutate_overlay(&mut self, id: ObjectId, patch: &OverlayPatch) -> bool {
        let Some(obj) = self.objects.iter_mut().find(|o| o.id == id) else {
            log::debug!("page {}: mutate ignored, no object {id}", self.number);
            return false;
        };
        patch.apply_to(obj);
        self.commit();
        true
    }

    /// Remove every object whose id is in `ids`. Commits only when at
    /// least one object was removed.
    pub fn remove_overlays(&mut self, ids: &[ObjectId]) -> bool {
        let before = self.objects.len();
        self.objects.retain(|o| !ids.contains(&o.id));
        let removed = before - self.objects.len();
        if removed == 0 {
            return false;
        }
        log::debug!("page {}: removed {removed} overlay(s)", self.number);
        self.commit();
        true
    }

    /// Move the listed objects by `(dx, dy)` as a single history step.
    pub fn translate(&mut self, ids: &[ObjectId], dx: f64, dy: f64) -> bool {
        let mut moved = false;
        for obj in self.objects.iter_mut().filter(|o| ids.contains(&o.id)) {
            obj.x += dx;
            obj.y += dy;
            moved = true;
        }
        if moved && (dx != 0.0 || dy != 0.0) {
            self.commit();
            return true;
        }
        false
    }

    /// Accumulate a quarter turn (`delta` of 90 or -90) into the page rotation.
    pub fn rotate(&mut self, delta: i32) -> Result<Rotation> {
        self.rotation = self.rotation.rotated(delta)?;
        log::debug!("page {}: rotation now {}", self.number, self.rotation);
        Ok(self.rotation)
    }

    /// Restore the previous snapshot. Fails with `Error::NoHistory` at the
    /// first snapshot, leaving the overlays untouched.
    pub fn undo(&mut self) -> Result<()> {
        let restored = self.history.undo()?;
        self.objects = restored.to_vec();
        Ok(())
    }

    fn commit(&mut self) {
        self.history.commit(self.objects.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sp_core::{Color, Error, factory};
    use sp_render::BackgroundHandle;

    fn loaded_page() -> PageSession {
        let mut page = PageSession::new(1, Rotation::NONE);
        page.load_background(
            Background {
                handle: BackgroundHandle(7),
                width: 600.0,
                height: 800.0,
            },
            Rotation::NONE,
        );
        page
    }

    #[test]
    fn add_commits_snapshot() {
        let mut page = loaded_page();
        assert!(!page.has_edits());
        page.add_overlay(factory::rect());
        assert!(page.has_edits());
        assert_eq!(page.history().cursor(), 1);
        assert_eq!(page.history().current(), page.objects());
    }

    #[test]
    fn mutate_unknown_id_is_noop() {
        let mut page = loaded_page();
        page.add_overlay(factory::rect());
        let patch = OverlayPatch {
            fill: Some(Color::WHITE),
            ..Default::default()
        };
        assert!(!page.mutate_overlay(ObjectId::intern("ghost"), &patch));
        assert_eq!(page.history().len(), 2);
    }

    #[test]
    fn mutate_applies_and_commits() {
        let mut page = loaded_page();
        let rect = factory::rect();
        let id = rect.id;
        page.add_overlay(rect);
        let patch = OverlayPatch {
            position: Some((10.0, 20.0)),
            ..Default::default()
        };
        assert!(page.mutate_overlay(id, &patch));
        let obj = page.object(id).unwrap();
        assert_eq!((obj.x, obj.y), (10.0, 20.0));
        assert_eq!(page.history().len(), 3);
    }

    #[test]
    fn remove_nothing_commits_nothing() {
        let mut page = loaded_page();
        page.add_overlay(factory::rect());
        assert!(!page.remove_overlays(&[]));
        assert!(!page.remove_overlays(&[ObjectId::intern("ghost")]));
        assert_eq!(page.history().len(), 2);
    }

    #[test]
    fn translate_is_one_step() {
        let mut page = loaded_page();
        let a = factory::rect();
        let b = factory::circle();
        let ids = [a.id, b.id];
        page.add_overlay(a);
        page.add_overlay(b);
        assert!(page.translate(&ids, 5.0, -5.0));
        assert_eq!(page.history().len(), 4);
        assert!(page.objects().iter().all(|o| o.x == 105.0 && o.y == 95.0));

        page.undo().unwrap();
        assert!(page.objects().iter().all(|o| o.x == 100.0 && o.y == 100.0));
    }

    #[test]
    fn rotation_does_not_touch_history() {
        let mut page = loaded_page();
        assert_eq!(page.rendered_size(), Some((600.0, 800.0)));
        page.rotate(90).unwrap();
        assert_eq!(page.rendered_size(), Some((800.0, 600.0)));
        assert_eq!(page.history().len(), 1);
        page.rotate(-90).unwrap();
        assert_eq!(page.rotation(), Rotation::NONE);
        assert!(!page.rotation().swaps_dimensions());
    }

    #[test]
    fn rotate_rejects_odd_angles() {
        let mut page = loaded_page();
        assert!(matches!(page.rotate(45), Err(Error::InvalidInput(_))));
        assert_eq!(page.rotation(), Rotation::NONE);
    }

    #[test]
    fn undo_on_fresh_page_reports_no_history() {
        let mut page = loaded_page();
        assert_eq!(page.undo().unwrap_err(), Error::NoHistory);
    }

    #[test]
    fn reload_discards_overlays() {
        let mut page = loaded_page();
        page.add_overlay(factory::rect());
        let bg = *page.background().unwrap();
        page.load_background(bg, Rotation::from_degrees(180).unwrap());
        assert!(page.objects().is_empty());
        assert!(!page.has_edits());
        assert_eq!(page.rotation().degrees(), 180);
    }
}
