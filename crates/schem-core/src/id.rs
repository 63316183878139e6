use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for component, port and wire ids.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// A lightweight, interned identifier for components, ports and wires.
/// Internally a `Spur` index, so copies and comparisons are O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(Spur);

impl Id {
    /// Intern a string as an Id, or return the existing one.
    pub fn intern(s: &str) -> Self {
        Id(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a fresh id with a prefix (e.g. `wire_0`, `wire_1`).
    ///
    /// Backed by a process-wide counter that only ever increases, so ids
    /// handed out here are never reused within a session.
    pub fn with_prefix(prefix: &str) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}_{n}"))
    }

    /// Qualify this id with a dotted prefix (`"cpu."` + `alu` → `cpu.alu`).
    /// An empty prefix returns the id unchanged.
    pub fn prefixed(self, prefix: &str) -> Self {
        if prefix.is_empty() {
            self
        } else {
            Self::intern(&format!("{prefix}{}", self.as_str()))
        }
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Id::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = Id::intern("alu");
        let b = Id::intern("alu");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "alu");
    }

    #[test]
    fn prefixed_ids_are_unique() {
        let a = Id::with_prefix("wire");
        let b = Id::with_prefix("wire");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("wire_"));
    }

    #[test]
    fn dotted_prefix() {
        let inner = Id::intern("reg0");
        assert_eq!(inner.prefixed("cpu."), Id::intern("cpu.reg0"));
        assert_eq!(inner.prefixed(""), inner);
    }
}
