//! Reporter de consola: imprime "step N/M name" por cada etapa iniciada y
//! el resultado final del run.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use uuid::Uuid;
use zkcdn_core::{ProgressEventKind, ProgressReporter};

#[derive(Debug, Default)]
pub struct ConsoleReporter {
    stage_counts: Mutex<HashMap<Uuid, usize>>,
}

impl ConsoleReporter {
    /// Línea a mostrar para el evento, si corresponde.
    pub fn render(&self, run_id: Uuid, kind: &ProgressEventKind) -> Option<String> {
        let mut counts = self.stage_counts.lock().unwrap_or_else(PoisonError::into_inner);
        if kind.terminal_status().is_some() {
            counts.remove(&run_id);
        }
        match kind {
            ProgressEventKind::RunStarted { pipeline, stage_count, .. } => {
                counts.insert(run_id, *stage_count);
                Some(format!("{pipeline}: {stage_count} steps"))
            }
            ProgressEventKind::StageStarted { stage_index, stage } => {
                let total = counts.get(&run_id).copied().unwrap_or(0);
                Some(format!("step {}/{} {}", stage_index + 1, total, stage))
            }
            ProgressEventKind::StageSucceeded { .. } => None,
            ProgressEventKind::StageFailed { stage_index,
                                             stage,
                                             kind,
                                             detail, } => {
                Some(format!("failed at step {} ({}) because {}: {}", stage_index + 1, stage, kind, detail))
            }
            ProgressEventKind::RunCompleted => Some("done".to_string()),
            ProgressEventKind::RunCancelled { at_index } => Some(format!("cancelled before step {}", at_index + 1)),
        }
    }
}

impl ProgressReporter for ConsoleReporter {
    fn notify(&self, run_id: Uuid, kind: ProgressEventKind) {
        if let Some(line) = self.render(run_id, &kind) {
            eprintln!("{line}");
        }
    }
}
