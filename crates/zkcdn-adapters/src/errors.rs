//! Errores de los colaboradores y del ensamblado de pipelines.
//!
//! Las etapas nunca propagan estos errores tal cual: los traducen al
//! `FailureKind` correspondiente y el detalle viaja como texto.

use thiserror::Error;
use zkcdn_core::{ContextError, EngineError, FailureKind, Fingerprint, RunStatus};

/// Errores del content store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("content store {endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("malformed reply from {endpoint}: {reason}")]
    MalformedReply { endpoint: String, reason: String },
    #[error("content store rejected upload: {0}")]
    Rejected(String),
}

/// Errores del ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("no signer available: {0}")]
    SignerUnavailable(String),
    #[error("ledger rejected transaction: {0}")]
    Rejected(String),
    #[error("fingerprint {0} not found")]
    NotFound(Fingerprint),
    #[error("unknown transaction {0}")]
    UnknownTransaction(String),
    #[error("registry error: {0}")]
    Registry(String),
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Registry(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Registry(err.to_string())
    }
}

/// Errores del proving service.
#[derive(Debug, Error)]
pub enum ProverError {
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("proving service {endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// El servicio respondió 2xx con un campo `Errormessage`.
    #[error("proving service {endpoint} reported: {message}")]
    Service { endpoint: String, message: String },
    #[error("failed to decode reply from {endpoint}: {reason}")]
    Deserialization { endpoint: String, reason: String },
}

/// Resultado no exitoso de ejecutar un pipeline completo.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("failed at step {} ({stage}) because {kind}: {detail}", .stage_index + 1)]
    Failed {
        stage_index: usize,
        stage: String,
        kind: FailureKind,
        detail: String,
    },
    #[error("run cancelled before step {}", .at_index + 1)]
    Cancelled { at_index: usize },
    #[error("run has not finished (status {0})")]
    NotFinished(RunStatus),
    #[error("could not encode pipeline input: {0}")]
    Input(#[from] serde_json::Error),
    #[error("could not assemble record: {0}")]
    Record(#[from] ContextError),
}

impl PipelineError {
    /// Kind del fallo de etapa, si el pipeline terminó en `Failed`.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            PipelineError::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
