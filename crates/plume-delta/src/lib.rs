//! plume-delta: delta-style rich text document model and pure transforms.
//!
//! This crate provides:
//! - `Document`, `Op`, `Embed`, `AttributeSet` - the canonical
//!   operation-sequence representation of a rich text document
//! - Delta JSON (de)serialization with strict malformed-input reporting
//! - Pure transforms: image reference extraction and substitution,
//!   trailing-whitespace normalization
//! - `locate_empty_line` - empty-line classification for contextual UI

pub mod attr;
pub mod document;
pub mod error;
pub mod locate;
pub mod op;
pub mod transform;

pub use attr::{AttrValue, AttributeSet};
pub use document::{Document, Unit, Units};
pub use error::DocumentError;
pub use locate::{LineAnchor, locate_empty_line};
pub use op::{BlockImagePayload, Embed, Op, TweetPayload};
pub use smol_str::SmolStr;
pub use transform::{extract_image_references, normalize_trailing_whitespace, substitute_images};
