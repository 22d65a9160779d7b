//! Tipos de evento de progreso y estructura `ProgressEvent`.
//!
//! Rol en el flujo:
//! - El `WorkflowEngine` notifica cada transición de un run a su
//!   `ProgressReporter`.
//! - La capa de presentación se suscribe a estos eventos; el engine no conoce
//!   nada de cómo se muestran.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::RunStatus;
use crate::stage::FailureKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProgressEventKind {
    /// Primer evento de un run: fija pipeline, hash de definición y cantidad
    /// de etapas.
    RunStarted {
        pipeline: String,
        definition_hash: String,
        stage_count: usize,
    },
    /// Una etapa comenzó. No implica éxito.
    StageStarted { stage_index: usize, stage: String },
    /// La etapa resolvió con `Success`; su salida ya está en el contexto.
    StageSucceeded { stage_index: usize, stage: String },
    /// La etapa resolvió con `Failure`. Ninguna etapa posterior se ejecuta.
    StageFailed {
        stage_index: usize,
        stage: String,
        kind: FailureKind,
        detail: String,
    },
    /// Todas las etapas terminaron con éxito.
    RunCompleted,
    /// El run se canceló en el límite previo a `at_index`.
    RunCancelled { at_index: usize },
}

impl ProgressEventKind {
    /// Variante compacta (útil en tests y logs).
    pub fn variant(&self) -> &'static str {
        match self {
            ProgressEventKind::RunStarted { .. } => "I",
            ProgressEventKind::StageStarted { .. } => "S",
            ProgressEventKind::StageSucceeded { .. } => "F",
            ProgressEventKind::StageFailed { .. } => "X",
            ProgressEventKind::RunCompleted => "C",
            ProgressEventKind::RunCancelled { .. } => "K",
        }
    }

    /// Estado terminal implicado por el evento, si lo hay.
    pub fn terminal_status(&self) -> Option<RunStatus> {
        match self {
            ProgressEventKind::StageFailed { .. } => Some(RunStatus::Failed),
            ProgressEventKind::RunCompleted => Some(RunStatus::Succeeded),
            ProgressEventKind::RunCancelled { .. } => Some(RunStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub seq: u64, // asignado por el reporter (orden de llegada por run)
    pub run_id: Uuid,
    pub kind: ProgressEventKind,
    pub ts: DateTime<Utc>,
}
