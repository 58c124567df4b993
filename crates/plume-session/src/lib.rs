//! plume-session: glue between the document model, the embed lifecycle,
//! and the host editing surface.
//!
//! This crate provides:
//! - `EditingSurface` - the consumed collaborator interface of the visual
//!   editing surface
//! - `EditorSession` - character accounting with boundary-crossing hooks,
//!   tooltip classification with de-duplication, and the RAII suppression
//!   token held across an embed insertion

mod session;
mod surface;

pub use session::{EditorSession, SessionHooks, SuppressionGuard, TooltipUpdate};
pub use surface::EditingSurface;
