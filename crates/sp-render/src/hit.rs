//! Hit testing: point → overlay lookup.
//!
//! Walks the overlay list back to front (last painted = topmost) to find
//! which object is at a given (x, y) canvas position.

use kurbo::{Point, Rect};
use sp_core::{ObjectId, OverlayObject};

/// Extra pick radius around thin objects (lines, strokes).
const PICK_SLOP: f64 = 4.0;

fn pick_bounds(obj: &OverlayObject) -> Rect {
    obj.bounds().inflate(PICK_SLOP, PICK_SLOP)
}

/// Find the topmost object at `(px, py)`.
/// Returns `None` if only the background is hit.
pub fn hit_test(objects: &[OverlayObject], px: f64, py: f64) -> Option<ObjectId> {
    let p = Point::new(px, py);
    objects
        .iter()
        .rev()
        .find(|obj| pick_bounds(obj).contains(p))
        .map(|obj| obj.id)
}

/// Find all objects whose bounds intersect the marquee rectangle, in
/// painting order.
pub fn hit_test_rect(objects: &[OverlayObject], marquee: Rect) -> Vec<ObjectId> {
    let marquee = marquee.abs();
    objects
        .iter()
        .filter(|obj| {
            let b = obj.bounds();
            b.x0 <= marquee.x1 && b.x1 >= marquee.x0 && b.y0 <= marquee.y1 && b.y1 >= marquee.y0
        })
        .map(|obj| obj.id)
        .collect()
}
