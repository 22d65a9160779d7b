//! Errores específicos del engine (rechazos, no fallos de etapa).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum EngineError {
    #[error("engine already has a running run ({active})")] AlreadyRunning { active: Uuid },
    #[error("workflow definition has no stages")] EmptyDefinition,
    #[error("duplicate stage name: {0}")] DuplicateStageName(String),
    #[error("a stage of this run is already in flight")] StageInFlight,
    #[error("run {run} belongs to another engine")] ForeignRun { run: Uuid },
}
