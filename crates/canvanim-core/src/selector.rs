//! Item selectors.
//!
//! A selector names a set of items: one item, every item carrying a tag,
//! every item (`"*"`), or any nesting of those. Resolution flattens,
//! de-duplicates and keeps first-seen order. A selector that matches
//! nothing resolves to an empty list.

use crate::id::{ItemId, Tag, WILDCARD};
use crate::item::Item;

#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Item(ItemId),
    All,
    Tag(String),
    Many(Vec<Selector>),
}

impl Selector {
    /// Resolve against the scene's items (given in paint order).
    pub fn resolve(&self, items: &[Item]) -> Vec<ItemId> {
        let mut out = Vec::new();
        self.collect(items, &mut out);
        out
    }

    fn collect(&self, items: &[Item], out: &mut Vec<ItemId>) {
        match self {
            Selector::Item(id) => {
                if items.iter().any(|item| item.id == *id) {
                    push_unique(out, *id);
                }
            }
            Selector::All => {
                for item in items {
                    push_unique(out, item.id);
                }
            }
            Selector::Tag(name) => {
                // A tag nobody ever used was never interned.
                let Some(tag) = Tag::get(name) else {
                    return;
                };
                for item in items.iter().filter(|item| item.has_tag(tag)) {
                    push_unique(out, item.id);
                }
            }
            Selector::Many(selectors) => {
                for selector in selectors {
                    selector.collect(items, out);
                }
            }
        }
    }
}

fn push_unique(out: &mut Vec<ItemId>, id: ItemId) {
    if !out.contains(&id) {
        out.push(id);
    }
}

impl From<ItemId> for Selector {
    fn from(id: ItemId) -> Self {
        Selector::Item(id)
    }
}

impl From<&ItemId> for Selector {
    fn from(id: &ItemId) -> Self {
        Selector::Item(*id)
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        if s == WILDCARD {
            Selector::All
        } else {
            Selector::Tag(s.to_string())
        }
    }
}

impl From<String> for Selector {
    fn from(s: String) -> Self {
        Selector::from(s.as_str())
    }
}

impl From<Tag> for Selector {
    fn from(tag: Tag) -> Self {
        Selector::Tag(tag.as_str().to_string())
    }
}

impl<T: Into<Selector>> From<Vec<T>> for Selector {
    fn from(v: Vec<T>) -> Self {
        Selector::Many(v.into_iter().map(Into::into).collect())
    }
}

impl From<&[ItemId]> for Selector {
    fn from(ids: &[ItemId]) -> Self {
        Selector::Many(ids.iter().copied().map(Selector::Item).collect())
    }
}

impl From<&Vec<ItemId>> for Selector {
    fn from(ids: &Vec<ItemId>) -> Self {
        Selector::from(ids.as_slice())
    }
}
