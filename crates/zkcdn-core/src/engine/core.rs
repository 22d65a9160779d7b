//! Core WorkflowEngine implementation

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use super::run::{LastError, RunHandle, RunStatus, WorkflowRun};
use crate::definition::WorkflowDefinition;
use crate::errors::EngineError;
use crate::event::{ProgressEventKind, ProgressReporter};
use crate::model::StageContext;
use crate::stage::{Stage, StageOutcome};

/// Motor de ejecución secuencial de pipelines.
///
/// Garantías:
/// - A lo sumo un run activo por engine (`start` rechaza con
///   `EngineError::AlreadyRunning` sin tocar el run en curso).
/// - La etapa `i+1` empieza sólo después de que la etapa `i` resolvió con
///   éxito; el primer `Failure` deja el run en `Failed` y detiene el avance.
/// - La cancelación se observa en los límites entre etapas. Una etapa en
///   vuelo no se interrumpe, pero su salida se descarta.
/// - El reporter se invoca fuera de los locks internos.
/// - Si el future de `drive` se descarta con una etapa en vuelo, el run queda
///   `Cancelled` y el engine se libera.
/// - Un `RunHandle` sólo se conduce o cancela en el engine que lo creó.
pub struct WorkflowEngine {
    id: Uuid,
    reporter: Arc<dyn ProgressReporter>,
    active: Mutex<Option<Uuid>>,
}

/// Lo que el loop de `drive` debe hacer después de inspeccionar el run.
enum Next {
    Execute { index: usize, stage: Stage, ctx: StageContext },
    Finished(Option<ProgressEventKind>),
}

impl WorkflowEngine {
    pub fn new(reporter: Arc<dyn ProgressReporter>) -> Self {
        Self { id: Uuid::new_v4(),
               reporter,
               active: Mutex::new(None) }
    }

    /// Id del run que ocupa el engine, si lo hay.
    pub fn active_run(&self) -> Option<Uuid> {
        *self.active_slot()
    }

    pub fn is_busy(&self) -> bool {
        self.active_run().is_some()
    }

    /// Crea un run en `Running` con `current_index = 0` y reclama el engine.
    ///
    /// No ejecuta ninguna etapa: el run avanza con `drive`.
    pub fn start(&self, definition: Arc<WorkflowDefinition>, input: Value) -> Result<RunHandle, EngineError> {
        if definition.is_empty() {
            return Err(EngineError::EmptyDefinition);
        }

        let handle = {
            let mut active = self.active_slot();
            if let Some(id) = *active {
                tracing::debug!(active = %id, pipeline = %definition.name, "engine busy, start rejected");
                return Err(EngineError::AlreadyRunning { active: id });
            }
            let mut run = WorkflowRun::new(definition.clone(), input);
            run.status = RunStatus::Running;
            *active = Some(run.id);
            RunHandle::new(run, self.id)
        };

        tracing::info!(run_id = %handle.id, pipeline = %definition.name, stages = definition.len(), "run started");
        self.reporter.notify(handle.id,
                             ProgressEventKind::RunStarted { pipeline: definition.name.clone(),
                                                             definition_hash: definition.definition_hash.clone(),
                                                             stage_count: definition.len() });
        Ok(handle)
    }

    /// Conduce el run hasta un estado terminal y devuelve una copia final.
    ///
    /// Sobre un run ya terminado devuelve su estado sin efectos. Falla con
    /// `EngineError::StageInFlight` si otro `drive` está ejecutando una etapa
    /// del mismo run, y con `EngineError::ForeignRun` si el handle es de otro
    /// engine.
    pub async fn drive(&self, handle: &RunHandle) -> Result<WorkflowRun, EngineError> {
        self.check_owner(handle)?;
        let span = tracing::info_span!("run", run_id = %handle.id);
        loop {
            match self.next_step(handle)? {
                Next::Finished(event) => {
                    if let Some(kind) = event {
                        self.reporter.notify(handle.id, kind);
                    }
                    return Ok(handle.snapshot());
                }
                Next::Execute { index, stage, ctx } => {
                    self.reporter.notify(handle.id,
                                         ProgressEventKind::StageStarted { stage_index: index,
                                                                           stage: stage.name.clone() });
                    let guard = InFlightGuard { engine: self,
                                                handle,
                                                armed: true };
                    let outcome = stage.executor
                                       .execute(&ctx)
                                       .instrument(tracing::debug_span!(parent: &span, "stage", index, name = %stage.name))
                                       .await;
                    guard.disarm();
                    if let Some(kind) = self.resolve_step(handle, index, &stage, outcome) {
                        self.reporter.notify(handle.id, kind);
                    }
                }
            }
        }
    }

    /// `start` + `drive`.
    pub async fn run(&self, definition: Arc<WorkflowDefinition>, input: Value) -> Result<WorkflowRun, EngineError> {
        let handle = self.start(definition, input)?;
        self.drive(&handle).await
    }

    /// Solicita la cancelación del run.
    ///
    /// Sin etapa en vuelo el run pasa a `Cancelled` de inmediato. Con una
    /// etapa en vuelo sólo se registra la solicitud: el estado sigue en
    /// `Running` hasta que la etapa resuelve, su salida se descarta y el run
    /// queda `Cancelled`. Devuelve `Ok(false)` si el run ya era terminal.
    pub fn cancel(&self, handle: &RunHandle) -> Result<bool, EngineError> {
        self.check_owner(handle)?;
        let event = {
            let mut run = handle.lock();
            if run.status != RunStatus::Running {
                return Ok(false);
            }
            run.cancel_requested = true;
            if run.in_flight {
                tracing::debug!(run_id = %run.id, stage_index = run.current_index, "cancel requested while stage in flight");
                None
            } else {
                Some(self.finish_cancelled(&mut run))
            }
        };
        if let Some(kind) = event {
            self.reporter.notify(handle.id, kind);
        }
        Ok(true)
    }

    pub fn status(&self, handle: &RunHandle) -> RunStatus {
        handle.status()
    }

    fn check_owner(&self, handle: &RunHandle) -> Result<(), EngineError> {
        if handle.engine != self.id {
            tracing::warn!(run_id = %handle.id, "handle from another engine rejected");
            return Err(EngineError::ForeignRun { run: handle.id });
        }
        Ok(())
    }

    fn next_step(&self, handle: &RunHandle) -> Result<Next, EngineError> {
        let mut run = handle.lock();
        if run.status.is_terminal() {
            return Ok(Next::Finished(None));
        }
        if run.in_flight {
            return Err(EngineError::StageInFlight);
        }
        if run.cancel_requested {
            return Ok(Next::Finished(Some(self.finish_cancelled(&mut run))));
        }

        let index = run.current_index;
        let Some(stage) = run.definition.stages.get(index).cloned() else {
            self.finish(&mut run, RunStatus::Succeeded);
            tracing::info!(run_id = %run.id, pipeline = %run.pipeline(), "run completed");
            return Ok(Next::Finished(Some(ProgressEventKind::RunCompleted)));
        };

        run.in_flight = true;
        tracing::debug!(run_id = %run.id, stage_index = index, stage = %stage.name, "stage started");
        Ok(Next::Execute { index,
                           stage,
                           ctx: run.context.clone() })
    }

    fn resolve_step(&self, handle: &RunHandle, index: usize, stage: &Stage, outcome: StageOutcome)
                    -> Option<ProgressEventKind> {
        let mut run = handle.lock();
        run.in_flight = false;

        if run.cancel_requested {
            tracing::debug!(run_id = %run.id, stage_index = index, "stage output discarded after cancel");
            return None;
        }

        match outcome {
            StageOutcome::Success(output) => {
                run.context.record(&stage.name, output);
                run.current_index = index + 1;
                tracing::debug!(run_id = %run.id, stage_index = index, stage = %stage.name, "stage succeeded");
                Some(ProgressEventKind::StageSucceeded { stage_index: index,
                                                         stage: stage.name.clone() })
            }
            StageOutcome::Failure(failure) => {
                tracing::warn!(run_id = %run.id, stage_index = index, stage = %stage.name, kind = %failure.kind,
                               detail = %failure.detail, "stage failed, run halted");
                run.last_error = Some(LastError { stage_index: index,
                                                  stage: stage.name.clone(),
                                                  kind: failure.kind,
                                                  detail: failure.detail.clone() });
                self.finish(&mut run, RunStatus::Failed);
                Some(ProgressEventKind::StageFailed { stage_index: index,
                                                      stage: stage.name.clone(),
                                                      kind: failure.kind,
                                                      detail: failure.detail })
            }
        }
    }

    fn finish_cancelled(&self, run: &mut WorkflowRun) -> ProgressEventKind {
        let at_index = run.current_index;
        self.finish(run, RunStatus::Cancelled);
        tracing::info!(run_id = %run.id, at_index, "run cancelled");
        ProgressEventKind::RunCancelled { at_index }
    }

    /// Marca el run como terminal y libera el engine.
    fn finish(&self, run: &mut WorkflowRun, status: RunStatus) {
        run.status = status;
        run.in_flight = false;
        run.finished_at = Some(Utc::now());
        let mut active = self.active_slot();
        if *active == Some(run.id) {
            *active = None;
        }
    }

    fn active_slot(&self) -> MutexGuard<'_, Option<Uuid>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Armado mientras una etapa está en vuelo. Si el future de `drive` se
/// descarta antes de que la etapa resuelva, cancela el run y libera el engine.
struct InFlightGuard<'a> {
    engine: &'a WorkflowEngine,
    handle: &'a RunHandle,
    armed: bool,
}

impl InFlightGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let event = {
            let mut run = self.handle.lock();
            run.in_flight = false;
            if run.status.is_terminal() {
                None
            } else {
                tracing::warn!(run_id = %run.id, stage_index = run.current_index, "drive dropped with stage in flight");
                run.cancel_requested = true;
                Some(self.engine.finish_cancelled(&mut run))
            }
        };
        if let Some(kind) = event {
            self.engine.reporter.notify(self.handle.id, kind);
        }
    }
}

impl std::fmt::Debug for WorkflowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowEngine").field("active", &self.active_run()).finish_non_exhaustive()
    }
}
