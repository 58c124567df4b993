//! Document operations: text runs and typed block embeds.
//!
//! The wire encoding is the delta record format: `{"insert": "text"}` for
//! runs, `{"insert": {"<kind>": payload}}` for embeds, each with an
//! optional `attributes` map.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::attr::AttributeSet;

/// Payload of a `block-image` embed.
///
/// Appears on the wire either as a bare src string (dimensions not yet
/// known, probed at resolution time) or as a full record with dimensions.
/// The input form is preserved so re-serialization round-trips.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockImagePayload {
    Src(SmolStr),
    Full {
        src: SmolStr,
        width: u32,
        height: u32,
        #[serde(
            rename = "spoilers",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        spoiler: Option<bool>,
    },
}

impl BlockImagePayload {
    pub fn src(&self) -> &str {
        match self {
            BlockImagePayload::Src(src) => src,
            BlockImagePayload::Full { src, .. } => src,
        }
    }

    /// Same payload with the src replaced, preserving the input form.
    pub fn with_src(&self, new_src: impl Into<SmolStr>) -> Self {
        match self {
            BlockImagePayload::Src(_) => BlockImagePayload::Src(new_src.into()),
            BlockImagePayload::Full {
                width,
                height,
                spoiler,
                ..
            } => BlockImagePayload::Full {
                src: new_src.into(),
                width: *width,
                height: *height,
                spoiler: *spoiler,
            },
        }
    }

    /// Dimensions are already known; no probe needed.
    pub fn has_dimensions(&self) -> bool {
        matches!(self, BlockImagePayload::Full { .. })
    }

    pub fn spoiler(&self) -> bool {
        match self {
            BlockImagePayload::Src(_) => false,
            BlockImagePayload::Full { spoiler, .. } => spoiler.unwrap_or(false),
        }
    }
}

/// Payload of a `tweet` embed: the tweet URL, either bare or wrapped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TweetPayload {
    Url(SmolStr),
    Card { url: SmolStr },
}

impl TweetPayload {
    pub fn url(&self) -> &str {
        match self {
            TweetPayload::Url(url) => url,
            TweetPayload::Card { url } => url,
        }
    }
}

/// A typed block embed, keyed on the wire by its format name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Embed {
    /// Legacy inline image: payload is the bare src string.
    #[serde(rename = "image")]
    Image(SmolStr),
    #[serde(rename = "block-image")]
    BlockImage(BlockImagePayload),
    #[serde(rename = "tweet")]
    Tweet(TweetPayload),
}

impl Embed {
    /// Wire format name of this embed kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Embed::Image(_) => "image",
            Embed::BlockImage(_) => "block-image",
            Embed::Tweet(_) => "tweet",
        }
    }

    /// Src of an image embed. `None` for tweets.
    pub fn image_src(&self) -> Option<&str> {
        match self {
            Embed::Image(src) => Some(src),
            Embed::BlockImage(payload) => Some(payload.src()),
            Embed::Tweet(_) => None,
        }
    }

    /// Same embed with the image src replaced; identity for tweets.
    pub fn with_image_src(&self, new_src: impl Into<SmolStr>) -> Self {
        match self {
            Embed::Image(_) => Embed::Image(new_src.into()),
            Embed::BlockImage(payload) => Embed::BlockImage(payload.with_src(new_src)),
            Embed::Tweet(payload) => Embed::Tweet(payload.clone()),
        }
    }
}

/// One operation in a document: a text run or a single embed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OpRecord", into = "OpRecord")]
pub enum Op {
    Text {
        text: SmolStr,
        attributes: Option<AttributeSet>,
    },
    Embed {
        embed: Embed,
        attributes: Option<AttributeSet>,
    },
}

impl Op {
    pub fn text(text: impl Into<SmolStr>) -> Self {
        Op::Text {
            text: text.into(),
            attributes: None,
        }
    }

    pub fn text_with(text: impl Into<SmolStr>, attributes: AttributeSet) -> Self {
        Op::Text {
            text: text.into(),
            attributes: Some(attributes),
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Op::Embed {
            embed,
            attributes: None,
        }
    }

    pub fn attributes(&self) -> Option<&AttributeSet> {
        match self {
            Op::Text { attributes, .. } | Op::Embed { attributes, .. } => attributes.as_ref(),
        }
    }

    /// Atomic units this op contributes: one per char, one per embed.
    pub fn unit_len(&self) -> usize {
        match self {
            Op::Text { text, .. } => text.chars().count(),
            Op::Embed { .. } => 1,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Op::Text { .. })
    }
}

/// Serde shape of an operation record.
#[derive(Serialize, Deserialize)]
struct OpRecord {
    insert: InsertValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attributes: Option<AttributeSet>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum InsertValue {
    Text(SmolStr),
    Embed(Embed),
}

impl From<Op> for OpRecord {
    fn from(op: Op) -> Self {
        match op {
            Op::Text { text, attributes } => OpRecord {
                insert: InsertValue::Text(text),
                attributes,
            },
            Op::Embed { embed, attributes } => OpRecord {
                insert: InsertValue::Embed(embed),
                attributes,
            },
        }
    }
}

impl From<OpRecord> for Op {
    fn from(record: OpRecord) -> Self {
        match record.insert {
            InsertValue::Text(text) => Op::Text {
                text,
                attributes: record.attributes,
            },
            InsertValue::Embed(embed) => Op::Embed {
                embed,
                attributes: record.attributes,
            },
        }
    }
}
