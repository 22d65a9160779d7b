//! Modelos neutrales (Fingerprint, StageContext).

pub mod context;
pub mod fingerprint;

pub use context::{ContextError, StageContext};
pub use fingerprint::Fingerprint;
