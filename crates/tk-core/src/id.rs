use lasso::{Spur, ThreadedRodeo};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Interner backing every `ElementId`.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Monotonic counter shared by every prefix, so an ID is never handed out twice.
static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Opaque identifier of a user element.
///
/// IDs are only minted by the scene store; they serialize as strings but
/// are never deserialized.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(Spur);

impl ElementId {
    /// Mint a fresh ID with a kind prefix (e.g. `rect_1`, `text_2`).
    pub(crate) fn fresh(prefix: &str) -> Self {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        ElementId(INTERNER.get_or_intern(format!("{prefix}_{n}")))
    }

    /// Find an ID that was previously minted. Never interns.
    pub fn lookup(s: &str) -> Option<Self> {
        INTERNER.get(s).map(ElementId)
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.as_str())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ElementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_unique() {
        let a = ElementId::fresh("rect");
        let b = ElementId::fresh("rect");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("rect_"));
    }

    #[test]
    fn lookup_finds_minted_ids_only() {
        let a = ElementId::fresh("text");
        assert_eq!(ElementId::lookup(a.as_str()), Some(a));
        assert_eq!(ElementId::lookup("never_minted_anywhere"), None);
    }
}
