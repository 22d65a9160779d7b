//! Eventos de progreso y el trait `ProgressReporter`.

mod reporter;
mod types;

pub use reporter::{FanoutReporter, NoopReporter, ProgressReporter, RecordingReporter, TracingReporter};
pub use types::{ProgressEvent, ProgressEventKind};
