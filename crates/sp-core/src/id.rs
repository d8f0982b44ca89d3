use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner for overlay IDs (fast comparisons, low memory).
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A lightweight, interned identifier for overlay objects.
/// Internally a `Spur` index: 4 bytes, Copy, Eq, Hash in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(Spur);

/// Selection-sized list of IDs; most gestures touch one to four objects.
pub type ObjectIds = SmallVec<[ObjectId; 4]>;

impl ObjectId {
    /// Intern a string as an ObjectId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        ObjectId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a fresh ID with a kind prefix (e.g. `text_1`, `whiteout_2`).
    ///
    /// Names already interned (for instance ids that arrived in a command
    /// from the host) are skipped, so a generated id never aliases an
    /// existing object.
    pub fn with_prefix(prefix: &str) -> Self {
        loop {
            let n = NEXT_ID.fetch_add(1, Ordering::Relaxed);
            let name = format!("{prefix}_{n}");
            if INTERNER.get(name.as_str()).is_none() {
                return Self::intern(&name);
            }
        }
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ObjectId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = ObjectId::intern("signature_box");
        let b = ObjectId::intern("signature_box");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "signature_box");
    }

    #[test]
    fn prefixed_ids_are_unique() {
        let a = ObjectId::with_prefix("rect");
        let b = ObjectId::with_prefix("rect");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("rect_"));
    }

    #[test]
    fn generated_ids_skip_names_in_use() {
        let next = NEXT_ID.load(Ordering::Relaxed);
        let taken = ObjectId::intern(&format!("circle_{next}"));
        let fresh = ObjectId::with_prefix("circle");
        assert_ne!(fresh, taken);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ObjectId::intern("text_42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"text_42\"");
        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
