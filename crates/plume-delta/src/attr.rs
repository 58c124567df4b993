//! Inline and block formatting attributes.
//!
//! Attributes come from a small fixed vocabulary. Keys are unique and
//! insertion order is preserved so a deserialized document re-serializes
//! identically; equality ignores order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Names of the supported attributes.
///
/// `header`, `list`, `blockquote`, and `code-block` are block-level: they
/// apply to the newline run terminating a line. The rest are inline.
pub mod names {
    pub const BOLD: &str = "bold";
    pub const ITALIC: &str = "italic";
    pub const UNDERLINE: &str = "underline";
    pub const STRIKE: &str = "strike";
    pub const LINK: &str = "link";
    pub const HEADER: &str = "header";
    pub const LIST: &str = "list";
    pub const BLOCKQUOTE: &str = "blockquote";
    pub const CODE: &str = "code";
    pub const CODE_BLOCK: &str = "code-block";

    pub const BLOCK_LEVEL: [&str; 4] = [HEADER, LIST, BLOCKQUOTE, CODE_BLOCK];
}

/// A single attribute value.
///
/// Most attributes are boolean flags. `header` carries a level (1-3),
/// `list` carries `"bullet"` or `"ordered"`, `link` carries the target URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Level(u8),
    Str(SmolStr),
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<u8> for AttrValue {
    fn from(v: u8) -> Self {
        AttrValue::Level(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.into())
    }
}

/// An ordered set of formatting attributes with unique keys.
///
/// Backed by an insertion-ordered map: serialization emits keys in the
/// order they arrived, while `==` compares as an unordered set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet(IndexMap<SmolStr, AttrValue>);

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-attribute set, handy for building runs.
    pub fn of(name: impl Into<SmolStr>, value: impl Into<AttrValue>) -> Self {
        let mut set = Self::new();
        set.insert(name, value);
        set
    }

    /// Insert or overwrite an attribute, returning the previous value.
    pub fn insert(
        &mut self,
        name: impl Into<SmolStr>,
        value: impl Into<AttrValue>,
    ) -> Option<AttrValue> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &AttrValue)> {
        self.0.iter()
    }

    /// True if any block-level attribute is present.
    pub fn has_block_attr(&self) -> bool {
        names::BLOCK_LEVEL.iter().any(|name| self.contains(name))
    }
}

impl<K: Into<SmolStr>, V: Into<AttrValue>> FromIterator<(K, V)> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
