//! Engine module: `WorkflowEngine` y el estado de cada `WorkflowRun`.
//!
//! Un engine ejecuta a lo sumo un run a la vez. Cada run avanza de forma
//! estrictamente secuencial: la etapa `i+1` nunca empieza antes de que la
//! etapa `i` haya resuelto, y el primer fallo detiene el run.

pub mod core;
pub mod run;

pub use core::WorkflowEngine;
pub use run::{LastError, RunHandle, RunStatus, WorkflowRun};
