//! Document-level editing state.
//!
//! `DocumentSession` maps page numbers to lazily created `PageSession`s and
//! tracks which page is active. Edits always target the active page.
//! Per-page rotations are recorded separately so export knows the final
//! angle of every page, visited or not.

use crate::config::RevisitPolicy;
use crate::page::PageSession;
use sp_core::{Error, Result, Rotation};
use sp_render::Background;
use std::collections::BTreeMap;

/// Result of a successful navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub page: u32,
    /// The host must render the source page and call
    /// [`DocumentSession::install_background`].
    pub needs_background: bool,
}

#[derive(Debug, Clone)]
pub struct DocumentSession {
    file_name: String,
    total_pages: u32,
    pages: BTreeMap<u32, PageSession>,
    rotations: BTreeMap<u32, Rotation>,
    active: u32,
    revisit: RevisitPolicy,
}

impl DocumentSession {
    /// Open a session on page 1. Fails when the source has no pages.
    pub fn new(file_name: impl Into<String>, total_pages: u32, revisit: RevisitPolicy) -> Result<Self> {
        if total_pages == 0 {
            return Err(Error::DecodeFailure("document has no pages".into()));
        }
        let mut pages = BTreeMap::new();
        pages.insert(1, PageSession::new(1, Rotation::NONE));
        Ok(Self {
            file_name: file_name.into(),
            total_pages,
            pages,
            rotations: BTreeMap::new(),
            active: 1,
            revisit,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn revisit(&self) -> RevisitPolicy {
        self.revisit
    }

    pub fn active_page_number(&self) -> u32 {
        self.active
    }

    pub fn active_page(&self) -> &PageSession {
        // The active page always has a session: `new` creates page 1 and
        // `go_to_page` creates the target before switching.
        &self.pages[&self.active]
    }

    pub fn active_page_mut(&mut self) -> &mut PageSession {
        self.pages
            .entry(self.active)
            .or_insert_with_key(|&n| PageSession::new(n, Rotation::NONE))
    }

    /// The session for `page`, if it has been visited.
    pub fn page(&self, page: u32) -> Option<&PageSession> {
        self.pages.get(&page)
    }

    /// Visited pages in ascending order.
    pub fn pages(&self) -> impl Iterator<Item = &PageSession> {
        self.pages.values()
    }

    // ─── Navigation ──────────────────────────────────────────────────────

    /// Make `page` active, creating its session on first visit. The active
    /// page is unchanged on `Error::OutOfRange`.
    pub fn go_to_page(&mut self, page: u32) -> Result<Navigation> {
        if page == 0 || page > self.total_pages {
            return Err(Error::OutOfRange {
                page,
                total: self.total_pages,
            });
        }
        let rotation = self.recorded_rotation(page);
        let session = self
            .pages
            .entry(page)
            .or_insert_with(|| PageSession::new(page, rotation));
        let needs_background = match self.revisit {
            RevisitPolicy::Preserve => session.background().is_none(),
            RevisitPolicy::Reload => true,
        };
        if self.active != page {
            log::debug!("active page {} -> {page}", self.active);
        }
        self.active = page;
        Ok(Navigation {
            page,
            needs_background,
        })
    }

    pub fn next_page(&mut self) -> Result<Navigation> {
        self.go_to_page(self.active.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> Result<Navigation> {
        self.go_to_page(self.active.saturating_sub(1))
    }

    /// Install a rendered background on `page` at its recorded rotation.
    /// This resets the page's overlays and history.
    pub fn install_background(&mut self, page: u32, background: Background) -> Result<()> {
        let rotation = self.recorded_rotation(page);
        let session = self.pages.get_mut(&page).ok_or_else(|| {
            Error::NotFound(format!("page {page} has not been visited"))
        })?;
        session.load_background(background, rotation);
        log::debug!("page {page}: background installed at {rotation}");
        Ok(())
    }

    // ─── Rotation bookkeeping ────────────────────────────────────────────

    pub fn record_rotation(&mut self, page: u32, rotation: Rotation) {
        self.rotations.insert(page, rotation);
    }

    /// Latest rotation for `page`; `Rotation::NONE` if never rotated.
    pub fn recorded_rotation(&self, page: u32) -> Rotation {
        self.rotations.get(&page).copied().unwrap_or_default()
    }
}
