use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use uuid::Uuid;

use super::{ProgressEvent, ProgressEventKind};

/// Observador pasivo de las transiciones de un run.
///
/// Se invoca desde el engine fuera de cualquier lock interno, por lo que un
/// reporter puede consultar el estado del run sin bloquearse. No debe
/// bloquear ni fallar: la notificación no tiene valor de retorno.
pub trait ProgressReporter: Send + Sync {
    fn notify(&self, run_id: Uuid, kind: ProgressEventKind);
}

/// Ignora todos los eventos.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn notify(&self, _run_id: Uuid, _kind: ProgressEventKind) {}
}

/// Registro append-only en memoria, por run, con secuencia y timestamp.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    inner: Mutex<HashMap<Uuid, Vec<ProgressEvent>>>,
}

impl RecordingReporter {
    /// Eventos de un run (orden ascendente por seq).
    pub fn events(&self, run_id: Uuid) -> Vec<ProgressEvent> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.get(&run_id).cloned().unwrap_or_default()
    }

    pub fn kinds(&self, run_id: Uuid) -> Vec<ProgressEventKind> {
        self.events(run_id).into_iter().map(|e| e.kind).collect()
    }

    pub fn variants(&self, run_id: Uuid) -> Vec<&'static str> {
        self.events(run_id).iter().map(|e| e.kind.variant()).collect()
    }

    pub fn run_ids(&self) -> Vec<Uuid> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.keys().copied().collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn notify(&self, run_id: Uuid, kind: ProgressEventKind) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let events = inner.entry(run_id).or_default();
        let seq = events.len() as u64;
        events.push(ProgressEvent { seq,
                                    run_id,
                                    kind,
                                    ts: Utc::now() });
    }
}

/// Reenvía los eventos a `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn notify(&self, run_id: Uuid, kind: ProgressEventKind) {
        match kind {
            ProgressEventKind::RunStarted { pipeline,
                                            definition_hash,
                                            stage_count, } => {
                tracing::info!(%run_id, %pipeline, %definition_hash, stage_count, "run started")
            }
            ProgressEventKind::StageStarted { stage_index, stage } => {
                tracing::info!(%run_id, stage_index, %stage, "stage started")
            }
            ProgressEventKind::StageSucceeded { stage_index, stage } => {
                tracing::info!(%run_id, stage_index, %stage, "stage succeeded")
            }
            ProgressEventKind::StageFailed { stage_index,
                                             stage,
                                             kind,
                                             detail, } => {
                tracing::warn!(%run_id, stage_index, %stage, %kind, %detail, "stage failed")
            }
            ProgressEventKind::RunCompleted => tracing::info!(%run_id, "run completed"),
            ProgressEventKind::RunCancelled { at_index } => tracing::info!(%run_id, at_index, "run cancelled"),
        }
    }
}

/// Reenvía cada evento, en orden, a varios reporters.
#[derive(Default, Clone)]
pub struct FanoutReporter {
    targets: Vec<Arc<dyn ProgressReporter>>,
}

impl FanoutReporter {
    pub fn new(targets: Vec<Arc<dyn ProgressReporter>>) -> Self {
        Self { targets }
    }

    pub fn with(mut self, target: Arc<dyn ProgressReporter>) -> Self {
        self.targets.push(target);
        self
    }
}

impl ProgressReporter for FanoutReporter {
    fn notify(&self, run_id: Uuid, kind: ProgressEventKind) {
        for t in &self.targets {
            t.notify(run_id, kind.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_reporter_sequences_per_run() {
        let rec = RecordingReporter::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        rec.notify(a, ProgressEventKind::RunCompleted);
        rec.notify(b, ProgressEventKind::RunCancelled { at_index: 0 });
        rec.notify(a, ProgressEventKind::RunCancelled { at_index: 1 });

        let ev_a = rec.events(a);
        assert_eq!(ev_a.iter().map(|e| e.seq).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(rec.variants(a), vec!["C", "K"]);
        assert_eq!(rec.variants(b), vec!["K"]);
        assert!(rec.events(Uuid::new_v4()).is_empty());
        assert_eq!(rec.run_ids().len(), 2);
    }

    #[test]
    fn fanout_forwards_to_every_target() {
        let r1 = Arc::new(RecordingReporter::default());
        let r2 = Arc::new(RecordingReporter::default());
        let fan = FanoutReporter::new(vec![r1.clone() as Arc<dyn ProgressReporter>]).with(r2.clone());
        let id = Uuid::new_v4();
        fan.notify(id, ProgressEventKind::RunCompleted);
        assert_eq!(r1.variants(id), vec!["C"]);
        assert_eq!(r2.variants(id), vec!["C"]);
    }
}
