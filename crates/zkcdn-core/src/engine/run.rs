//! Estado mutable de un run y el handle con el que el llamador lo observa.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::definition::WorkflowDefinition;
use crate::model::StageContext;
use crate::stage::FailureKind;

/// Estado de un run.
///
/// Transiciones válidas:
/// - `Idle` -> `Running`
/// - `Running` -> `Succeeded` | `Failed` | `Cancelled`
///
/// Los tres últimos son terminales: un run terminado no se reutiliza.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Idle,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Succeeded | RunStatus::Failed | RunStatus::Cancelled)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Último fallo de un run: índice y nombre de la etapa, kind y detalle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastError {
    pub stage_index: usize,
    pub stage: String,
    pub kind: FailureKind,
    pub detail: String,
}

/// Registro de una ejecución de pipeline. Lo posee en exclusiva el engine
/// que lo ejecuta; el llamador sólo ve copias (`RunHandle::snapshot`).
#[derive(Debug, Clone)]
pub struct WorkflowRun {
    pub id: Uuid,
    pub definition: Arc<WorkflowDefinition>,
    /// Etapas completadas con éxito (0..=N).
    pub current_index: usize,
    pub status: RunStatus,
    pub context: StageContext,
    pub last_error: Option<LastError>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub(crate) cancel_requested: bool,
    pub(crate) in_flight: bool,
}

impl WorkflowRun {
    pub(crate) fn new(definition: Arc<WorkflowDefinition>, input: Value) -> Self {
        Self { id: Uuid::new_v4(),
               definition,
               current_index: 0,
               status: RunStatus::Idle,
               context: StageContext::new(input),
               last_error: None,
               started_at: Utc::now(),
               finished_at: None,
               cancel_requested: false,
               in_flight: false }
    }

    pub fn pipeline(&self) -> &str {
        &self.definition.name
    }

    pub fn stage_count(&self) -> usize {
        self.definition.len()
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested
    }
}

/// Handle de un run iniciado con `WorkflowEngine::start`.
///
/// El run avanza cuando el handle se entrega a `WorkflowEngine::drive`; un
/// run iniciado ocupa el engine hasta llegar a un estado terminal, así que el
/// llamador debe conducirlo o cancelarlo.
#[derive(Debug, Clone)]
pub struct RunHandle {
    pub(crate) id: Uuid,
    /// Engine que creó el run; sólo ese engine puede conducirlo.
    pub(crate) engine: Uuid,
    pub(crate) state: Arc<Mutex<WorkflowRun>>,
}

impl RunHandle {
    pub(crate) fn new(run: WorkflowRun, engine: Uuid) -> Self {
        Self { id: run.id,
               engine,
               state: Arc::new(Mutex::new(run)) }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn snapshot(&self) -> WorkflowRun {
        self.lock().clone()
    }

    pub fn status(&self) -> RunStatus {
        self.lock().status
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, WorkflowRun> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
