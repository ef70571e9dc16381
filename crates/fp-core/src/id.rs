use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for table IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// A lightweight, interned identifier for tables.
///
/// Server-assigned identifiers are UUID strings; the renderer mints fresh
/// ones for drop-created tables. Internally a `Spur` index: 4 bytes, Copy,
/// Eq, Hash in O(1), which keeps occupied/selected set lookups cheap.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(Spur);

impl TableId {
    /// Intern a string as a TableId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        TableId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Mint a fresh, globally unique identifier (UUID v4).
    pub fn generate() -> Self {
        Self::intern(&uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Debug for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TableId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TableId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(TableId::intern(&s))
    }
}
