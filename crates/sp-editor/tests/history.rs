//! Undo behaviour of page sessions across mixed edit sequences.

use pretty_assertions::assert_eq;
use sp_core::{Color, Error, OverlayObject, OverlayPatch, Rotation, factory};
use sp_editor::{DocumentSession, EditCommand, PageSession, RevisitPolicy};
use sp_render::{Background, BackgroundHandle};

fn loaded_page() -> PageSession {
    let mut page = PageSession::new(1, Rotation::NONE);
    page.load_background(
        Background {
            handle: BackgroundHandle(1),
            width: 918.0,
            height: 1188.0,
        },
        Rotation::NONE,
    );
    page
}

/// Apply a deterministic mix of add / mutate / translate / remove edits,
/// one commit per step. Returns the overlay state after each commit, with
/// index 0 being the starting state.
fn run_edits(page: &mut PageSession, steps: usize) -> Vec<Vec<OverlayObject>> {
    let mut states = vec![page.objects().to_vec()];
    let mut ids = Vec::new();
    for i in 0..steps {
        let committed = match i % 5 {
            0 => {
                let obj = factory::rect();
                ids.push(obj.id);
                page.add_overlay(obj);
                true
            }
            1 => {
                let obj = factory::text(format!("note {i}"));
                ids.push(obj.id);
                page.add_overlay(obj);
                true
            }
            2 => {
                let patch = OverlayPatch {
                    fill: Some(Color::rgba(0.0, 0.0, 1.0, 1.0)),
                    position: Some((i as f64, i as f64 * 2.0)),
                    ..Default::default()
                };
                page.mutate_overlay(ids[0], &patch)
            }
            3 => page.translate(&ids, 1.0, -1.0),
            _ => {
                let id = ids.remove(ids.len() - 1);
                page.remove_overlays(&[id])
            }
        };
        assert!(committed, "step {i} should commit");
        states.push(page.objects().to_vec());
    }
    states
}

#[test]
fn undo_k_times_restores_state_k_commits_ago() {
    for steps in [1, 3, 6, 10] {
        let mut probe = loaded_page();
        let states = run_edits(&mut probe, steps);
        let commits = states.len() - 1;
        assert_eq!(probe.history().commit_count(), commits);

        for k in 0..=commits {
            let mut page = loaded_page();
            let states = run_edits(&mut page, steps);
            for _ in 0..k {
                page.undo().unwrap();
            }
            assert_eq!(
                page.objects(),
                states[commits - k].as_slice(),
                "steps={steps} k={k}"
            );
        }
    }
}

#[test]
fn new_commit_after_undo_discards_redo_states() {
    let mut page = loaded_page();
    let a = factory::text("A");
    let b = factory::text("B");
    let c = factory::text("C");
    let d = factory::text("D");

    page.add_overlay(a.clone());
    page.add_overlay(b.clone());
    page.add_overlay(c.clone());
    page.undo().unwrap();
    page.undo().unwrap();
    assert_eq!(page.objects(), &[a.clone()]);

    page.add_overlay(d.clone());
    assert_eq!(page.history().len(), 3);
    assert_eq!(page.objects(), &[a.clone(), d]);

    page.undo().unwrap();
    assert_eq!(page.objects(), &[a]);
    page.undo().unwrap();
    assert!(page.objects().is_empty());
    assert_eq!(page.undo().unwrap_err(), Error::NoHistory);
    // B and C are gone for good.
    assert!(page.object(b.id).is_none() && page.object(c.id).is_none());
}

#[test]
fn rotate_there_and_back_is_identity() {
    let mut doc = DocumentSession::new("a.pdf", 1, RevisitPolicy::Preserve).unwrap();
    let before = doc.active_page().rotation();
    doc.apply(EditCommand::RotatePage { delta: 90 }).unwrap();
    assert!(doc.active_page().rotation().swaps_dimensions());
    doc.apply(EditCommand::RotatePage { delta: -90 }).unwrap();
    assert_eq!(doc.active_page().rotation(), before);
    assert!(!doc.active_page().rotation().swaps_dimensions());
    assert_eq!(doc.recorded_rotation(1), Rotation::NONE);
}
