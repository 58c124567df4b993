//! Embed instance lifecycle: creation, resolution, invalidation.
//!
//! Each live embed operation in a document gets one `EmbedId` here.
//! Resolution runs as a detached task that reports back through a
//! completion channel tagged with the instance generation; the
//! single-threaded side applies completions in `drain_completions`,
//! dropping anything stale. Invalidation bumps the generation, so a late
//! completion can never touch a replaced or removed instance.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use plume_delta::Embed;
use smol_str::SmolStr;
use tokio::sync::mpsc;

use crate::metadata::{EmbedMetadata, FetchError, MetadataFetcher};

/// Identity of one live embed instance within its registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmbedId(u64);

/// Resolution state of one embed instance.
///
/// `Loaded` and `Failed` are terminal for the generation that reached
/// them; a fresh attempt requires a structural replacement (new
/// generation).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolutionState {
    Loading,
    Loaded(EmbedMetadata),
    Failed(SmolStr),
}

impl ResolutionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ResolutionState::Loading)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ResolutionState::Loaded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ResolutionState::Failed(_))
    }
}

/// Callback fired when an instance reaches `Loaded` or `Failed`: exactly
/// once per terminal transition, never after removal.
pub type OnLoad = Box<dyn FnMut(&ResolutionState)>;

struct Instance {
    embed: Embed,
    generation: u64,
    state: ResolutionState,
    on_load: Option<OnLoad>,
}

/// Completion message sent from a resolution task back to the registry.
struct Completion {
    id: EmbedId,
    generation: u64,
    result: Result<EmbedMetadata, FetchError>,
}

/// A pending resolution for one (instance, generation).
///
/// The host drives it to completion (`spawn_local` or equivalent).
/// Dropping it unpolled just leaves the instance in `Loading` until it is
/// invalidated; completion after invalidation is a silent no-op.
pub struct ResolutionTask {
    fut: LocalBoxFuture<'static, ()>,
}

impl Future for ResolutionTask {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.get_mut().fut.poll_unpin(cx)
    }
}

/// The identifier a fetcher needs to resolve `embed`, or `None` when the
/// payload is already self-describing (legacy images, block images with
/// known dimensions).
pub fn resolution_identifier(embed: &Embed) -> Option<SmolStr> {
    match embed {
        Embed::Image(_) => None,
        Embed::BlockImage(payload) if payload.has_dimensions() => None,
        Embed::BlockImage(payload) => Some(SmolStr::new(payload.src())),
        Embed::Tweet(payload) => Some(SmolStr::new(payload.url())),
    }
}

/// Registry of live embed instances for one document.
///
/// Exclusively owned by the document's editing session, like the
/// document itself; all methods run on the single UI-event thread.
pub struct EmbedRegistry {
    instances: HashMap<EmbedId, Instance>,
    next_id: u64,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl EmbedRegistry {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            instances: HashMap::new(),
            next_id: 1,
            tx,
            rx,
        }
    }

    /// Register a new embed instance in `Loading` state, generation 1,
    /// and return the task resolving it.
    ///
    /// The task must be driven by the host. `on_load` callbacks never
    /// fire synchronously from here, even for embeds needing no remote
    /// metadata: those still round-trip through the completion channel,
    /// so a callback registered right after `create` cannot race.
    pub fn create(
        &mut self,
        embed: Embed,
        fetcher: &dyn MetadataFetcher,
    ) -> (EmbedId, ResolutionTask) {
        let id = EmbedId(self.next_id);
        self.next_id += 1;
        self.instances.insert(
            id,
            Instance {
                embed: embed.clone(),
                generation: 1,
                state: ResolutionState::Loading,
                on_load: None,
            },
        );
        tracing::debug!(id = id.0, kind = embed.kind(), "embed instance created");
        let task = self.resolution_task(id, 1, embed, fetcher);
        (id, task)
    }

    fn resolution_task(
        &self,
        id: EmbedId,
        generation: u64,
        embed: Embed,
        fetcher: &dyn MetadataFetcher,
    ) -> ResolutionTask {
        let tx = self.tx.clone();
        let fut = match resolution_identifier(&embed) {
            Some(identifier) => {
                let fetch = fetcher.fetch(&identifier);
                async move {
                    let result = fetch.await;
                    // The registry may be gone; a dead channel is not an error.
                    let _ = tx.send(Completion {
                        id,
                        generation,
                        result,
                    });
                }
                .boxed_local()
            }
            None => async move {
                let _ = tx.send(Completion {
                    id,
                    generation,
                    result: Ok(EmbedMetadata::Inline(embed)),
                });
            }
            .boxed_local(),
        };
        ResolutionTask { fut }
    }

    /// Attach (or replace) the on-load callback of an instance.
    pub fn set_on_load(&mut self, id: EmbedId, on_load: OnLoad) {
        if let Some(instance) = self.instances.get_mut(&id) {
            instance.on_load = Some(on_load);
        }
    }

    /// Invalidate an instance: its backing operation was replaced or
    /// removed. Bumps the generation so any in-flight completion is
    /// dropped on arrival.
    pub fn invalidate(&mut self, id: EmbedId) {
        if let Some(instance) = self.instances.get_mut(&id) {
            instance.generation += 1;
            instance.state = ResolutionState::Loading;
            tracing::debug!(id = id.0, generation = instance.generation, "embed invalidated");
        }
    }

    /// Structurally replace the backing embed: new generation, back to
    /// `Loading`, fresh fetch. This is also the retry path for a failed
    /// embed.
    pub fn replace(
        &mut self,
        id: EmbedId,
        embed: Embed,
        fetcher: &dyn MetadataFetcher,
    ) -> Option<ResolutionTask> {
        let generation = {
            let instance = self.instances.get_mut(&id)?;
            instance.generation += 1;
            instance.embed = embed.clone();
            instance.state = ResolutionState::Loading;
            instance.generation
        };
        Some(self.resolution_task(id, generation, embed, fetcher))
    }

    /// Remove an instance when its operation is deleted from the
    /// document. Any in-flight completion becomes a silent no-op and the
    /// on-load callback never fires again.
    pub fn remove(&mut self, id: EmbedId) {
        if self.instances.remove(&id).is_some() {
            tracing::debug!(id = id.0, "embed instance removed");
        }
    }

    pub fn state(&self, id: EmbedId) -> Option<&ResolutionState> {
        self.instances.get(&id).map(|instance| &instance.state)
    }

    pub fn generation(&self, id: EmbedId) -> Option<u64> {
        self.instances.get(&id).map(|instance| instance.generation)
    }

    pub fn embed(&self, id: EmbedId) -> Option<&Embed> {
        self.instances.get(&id).map(|instance| &instance.embed)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Apply queued resolution completions, in arrival order, returning
    /// the ids that reached a terminal state. Completions for a stale
    /// generation or a removed instance are dropped without effect.
    pub fn drain_completions(&mut self) -> Vec<EmbedId> {
        let mut resolved = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            let id = completion.id;
            if self.apply(completion) {
                resolved.push(id);
            }
        }
        resolved
    }

    fn apply(&mut self, completion: Completion) -> bool {
        let Completion {
            id,
            generation,
            result,
        } = completion;
        let Some(instance) = self.instances.get_mut(&id) else {
            tracing::trace!(id = id.0, "dropping completion for removed embed");
            return false;
        };
        if instance.generation != generation {
            tracing::trace!(
                id = id.0,
                generation,
                current = instance.generation,
                "dropping stale completion"
            );
            return false;
        }
        if instance.state.is_terminal() {
            // One fetch per generation; a duplicate here is a task bug.
            tracing::debug!(id = id.0, generation, "duplicate completion ignored");
            return false;
        }
        instance.state = match result {
            Ok(metadata) => ResolutionState::Loaded(metadata),
            Err(err) => ResolutionState::Failed(err.reason),
        };
        tracing::debug!(
            id = id.0,
            generation,
            loaded = instance.state.is_loaded(),
            "embed resolved"
        );
        let Instance { state, on_load, .. } = instance;
        if let Some(callback) = on_load.as_mut() {
            callback(state);
        }
        true
    }
}

impl Default for EmbedRegistry {
    fn default() -> Self {
        Self::new()
    }
}
