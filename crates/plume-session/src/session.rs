//! Editor session state: character accounting, emptiness hooks, and the
//! tooltip suppression token.

use std::cell::Cell;
use std::rc::Rc;

use plume_delta::{Document, Embed, LineAnchor, locate_empty_line};
use plume_embed::{EmbedId, EmbedRegistry, MetadataFetcher, OnLoad, ResolutionTask};

/// Hooks surfaced to UI collaborators.
///
/// `on_is_empty_change` fires only when the length crosses the empty
/// boundary (length 1), `on_characters_change` only when the count
/// actually changed; neither fires on every surface event.
#[derive(Default)]
pub struct SessionHooks {
    pub on_is_empty_change: Option<Box<dyn FnMut(bool)>>,
    pub on_characters_change: Option<Box<dyn FnMut(usize)>>,
}

/// Outcome of re-running the empty-line locator after a selection change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TooltipUpdate {
    /// The cursor moved onto an empty line: show the tooltip there.
    Show(LineAnchor),
    /// The cursor left the empty line: hide the tooltip.
    Hide,
    /// Same classification as last time; callers skip the UI update.
    Unchanged,
}

/// Per-editing-session state over one document.
///
/// Owns the one piece of state shared between the insertion path and the
/// change-notification path: the tooltip suppression flag, handed out as
/// an RAII guard.
pub struct EditorSession {
    characters: usize,
    tooltip_anchor: Option<LineAnchor>,
    suppress_tooltip: Rc<Cell<bool>>,
    hooks: SessionHooks,
}

impl EditorSession {
    /// Start a session over a surface currently `initial_len` units long.
    ///
    /// Both hooks fire once with the initial state so the UI starts out
    /// consistent without waiting for the first edit.
    pub fn new(initial_len: usize, mut hooks: SessionHooks) -> Self {
        if let Some(callback) = hooks.on_is_empty_change.as_mut() {
            callback(initial_len == 1);
        }
        if let Some(callback) = hooks.on_characters_change.as_mut() {
            callback(initial_len);
        }
        Self {
            characters: initial_len,
            tooltip_anchor: None,
            suppress_tooltip: Rc::new(Cell::new(false)),
            hooks,
        }
    }

    pub fn characters(&self) -> usize {
        self.characters
    }

    pub fn is_empty(&self) -> bool {
        self.characters == 1
    }

    pub fn tooltip_suppressed(&self) -> bool {
        self.suppress_tooltip.get()
    }

    /// Record a text change.
    ///
    /// Emptiness is reported only on boundary crossings: formatting-only
    /// changes retrigger the surface event without changing the count,
    /// and those must not re-fire the hooks.
    pub fn handle_text_change(&mut self, current_len: usize) {
        let previous = self.characters;
        self.characters = current_len;
        tracing::debug!(current_len, previous, "text changed");
        if let Some(callback) = self.hooks.on_is_empty_change.as_mut() {
            if previous == 1 && current_len > 1 {
                callback(false);
            } else if previous > 1 && current_len == 1 {
                callback(true);
            }
        }
        if let Some(callback) = self.hooks.on_characters_change.as_mut() {
            if previous != current_len {
                callback(current_len);
            }
        }
    }

    /// Re-run the empty-line locator after a selection change.
    ///
    /// Returns what the tooltip should do. While an embed insertion is in
    /// flight the classification is skipped entirely, so the transient
    /// empty line between batch-apply and resolution never flickers the
    /// tooltip in.
    pub fn handle_selection_change(&mut self, doc: &Document, cursor: usize) -> TooltipUpdate {
        if self.suppress_tooltip.get() {
            return TooltipUpdate::Unchanged;
        }
        let anchor = locate_empty_line(doc, cursor);
        if anchor == self.tooltip_anchor {
            return TooltipUpdate::Unchanged;
        }
        self.tooltip_anchor = anchor;
        match anchor {
            Some(anchor) => {
                tracing::debug!(offset = anchor.offset, line = anchor.line, "showing tooltip");
                TooltipUpdate::Show(anchor)
            }
            None => TooltipUpdate::Hide,
        }
    }

    /// Acquire the suppression token before applying an embed insertion
    /// batch.
    ///
    /// The returned guard clears the flag on drop, whichever exit path
    /// drops it. [`EditorSession::insert_embed`] moves it into the
    /// embed's on-load callback so resolution success, failure, and
    /// instance removal all release it.
    pub fn begin_embed_insertion(&mut self) -> SuppressionGuard {
        self.suppress_tooltip.set(true);
        SuppressionGuard {
            flag: Rc::clone(&self.suppress_tooltip),
        }
    }

    /// Insert an embed: acquires the suppression token, registers the
    /// instance, and wires the token release into the on-load path.
    ///
    /// The caller applies the corresponding operation batch to the
    /// surface and drives the returned task; `on_load` runs after the
    /// token is released, so it can re-run the locator directly.
    pub fn insert_embed(
        &mut self,
        registry: &mut EmbedRegistry,
        embed: Embed,
        fetcher: &dyn MetadataFetcher,
        mut on_load: Option<OnLoad>,
    ) -> (EmbedId, ResolutionTask) {
        let guard = self.begin_embed_insertion();
        let (id, task) = registry.create(embed, fetcher);
        let mut guard = Some(guard);
        registry.set_on_load(
            id,
            Box::new(move |state| {
                guard.take();
                if let Some(callback) = on_load.as_mut() {
                    callback(state);
                }
            }),
        );
        (id, task)
    }
}

/// RAII token for the shared tooltip-suppression flag.
pub struct SuppressionGuard {
    flag: Rc<Cell<bool>>,
}

impl Drop for SuppressionGuard {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}
