//! plume-embed: embed instance lifecycle and asynchronous resolution.
//!
//! This crate provides:
//! - `EmbedRegistry` - per-document registry of live embed instances with
//!   a `Loading -> Loaded | Failed` state machine per instance
//! - `MetadataFetcher` - the host-supplied capability resolving an embed
//!   identifier to its metadata (image dimension probe, tweet card lookup)
//! - Generation-tagged completion messages making late or stale
//!   resolutions silent no-ops

pub mod metadata;
pub mod registry;

pub use metadata::{EmbedMetadata, FetchError, MetadataFetcher};
pub use registry::{
    EmbedId, EmbedRegistry, OnLoad, ResolutionState, ResolutionTask, resolution_identifier,
};
