use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for tag names. Items share a handful of tags,
/// so membership checks compare 4-byte keys instead of strings.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// The selector string that matches every item. Never a valid tag name.
pub const WILDCARD: &str = "*";

/// An interned item tag (e.g. `"bubble"`, `"seaweed.move"`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(Spur);

impl Tag {
    /// Intern a tag name, or return the existing key.
    pub fn intern(s: &str) -> Self {
        Tag(INTERNER.get_or_intern(s))
    }

    /// Look up a tag without interning it. `None` means no item was ever
    /// tagged with this name.
    pub fn get(s: &str) -> Option<Self> {
        INTERNER.get(s).map(Tag)
    }

    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Tag::intern(&s))
    }
}

/// Stable identity of an item inside its scene.
///
/// Unlike the item's index (its paint-order position) the id never changes
/// when items are deleted or raised.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item_{}", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item_{}", self.0)
    }
}
