//! Editing-surface collaborator interface.
//!
//! The visual surface (keystrokes, selection, rendering, operation
//! batches) lives outside this workspace; sessions consume it through
//! this trait. Change notifications are delivered by the host calling
//! `EditorSession::handle_text_change` / `handle_selection_change` from
//! its event stream.

use plume_delta::Document;

pub trait EditingSurface {
    /// Document length in atomic units. The empty surface reports 1: the
    /// terminating newline is always there.
    fn get_length(&self) -> usize;

    /// Snapshot of the current contents.
    fn get_contents(&self) -> Document;

    /// Replace the contents wholesale.
    fn set_contents(&mut self, doc: Document);

    /// Current cursor position in units, if the surface has focus.
    fn get_selection(&self) -> Option<usize>;
}
