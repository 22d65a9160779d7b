//! zkcdn-core: motor secuencial de etapas y fingerprint determinista.
//!
//! Este crate no hace IO de red. Define:
//! - `fingerprint`: función pura dirección de contenido -> `u32`.
//! - `StageExecutor` / `TypedStage`: unidades de trabajo asíncronas.
//! - `WorkflowDefinition`: secuencia ordenada e inmutable de etapas.
//! - `WorkflowEngine`: ejecuta un `WorkflowRun` etapa por etapa, con
//!   halt-on-first-failure y cancelación en los límites entre etapas.
//! - `ProgressReporter`: observador pasivo de las transiciones.
pub mod constants;
pub mod definition;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod model;
pub mod stage;

pub use definition::{build_definition_hash, DefinitionBuilder, WorkflowDefinition};
pub use engine::{LastError, RunHandle, RunStatus, WorkflowEngine, WorkflowRun};
pub use errors::EngineError;
pub use event::{FanoutReporter, NoopReporter, ProgressEvent, ProgressEventKind, ProgressReporter, RecordingReporter,
                TracingReporter};
pub use hashing::fingerprint;
pub use model::{ContextError, Fingerprint, StageContext};
pub use stage::{FailureKind, FnStage, Stage, StageExecutor, StageFailure, StageOutcome, TypedStage};
