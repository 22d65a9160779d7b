//! Definiciones relacionadas a etapas (stages).
//!
//! Una etapa realiza exactamente una interacción remota observable y devuelve
//! un `StageOutcome`. Este módulo define:
//! - `StageExecutor`: interfaz neutra usada por el engine.
//! - `TypedStage`: interfaz de alto nivel con salida fuertemente tipada.
//! - `Stage`: par (nombre, ejecutor) inmutable dentro de una definición.
//! - `StageOutcome`, `StageFailure` y la taxonomía `FailureKind`.

pub mod definition;
mod outcome;
pub mod typed;

pub use definition::{FnStage, Stage, StageExecutor};
pub use outcome::{FailureKind, StageFailure, StageOutcome};
pub use typed::TypedStage;
