//! Metadata fetched for embeds that need asynchronous resolution.

use futures_util::future::LocalBoxFuture;
use plume_delta::Embed;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

/// Resolved metadata for one embed instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbedMetadata {
    /// The embed payload already carries everything needed to render it.
    Inline(Embed),
    /// Probed dimensions for a block image inserted before its upload
    /// finished.
    ImageDimensions { width: u32, height: u32 },
    /// Rendered card markup from an oEmbed lookup.
    OEmbed { html: String },
}

/// Error returned by a fetcher.
///
/// Recorded as `Failed(reason)` on the instance and surfaced to the UI as
/// a degraded embed; never propagated upward. Hosts imposing timeouts in
/// their fetcher report them through this same type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("metadata fetch failed: {reason}")]
pub struct FetchError {
    pub reason: SmolStr,
}

impl FetchError {
    pub fn new(reason: impl Into<SmolStr>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Host-supplied capability resolving an embed identifier (an image src
/// or tweet URL) to its metadata.
///
/// Network access lives behind this trait; the registry only sees the
/// eventual result. Futures are local: resolution rejoins the
/// single-threaded model through the completion channel, so nothing here
/// needs to be `Send`.
pub trait MetadataFetcher {
    fn fetch(&self, identifier: &str) -> LocalBoxFuture<'static, Result<EmbedMetadata, FetchError>>;
}
