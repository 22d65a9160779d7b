use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::ContextError;

/// Taxonomía de fallos de etapa. La presentación sólo necesita el índice de
/// la etapa y este kind para explicar "falló en el paso N por K".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    StorageUnavailable,
    SignerUnavailable,
    LedgerRejected,
    ConfirmationTimeout,
    ProverUnavailable,
    ProofGenerationFailed,
    VerifierExportFailed,
    VerificationRejected,
    LedgerLookupFailed,
    /// La etapa no pudo decodificar el input del pipeline o una salida previa.
    InvalidContext,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::StorageUnavailable => "StorageUnavailable",
            FailureKind::SignerUnavailable => "SignerUnavailable",
            FailureKind::LedgerRejected => "LedgerRejected",
            FailureKind::ConfirmationTimeout => "ConfirmationTimeout",
            FailureKind::ProverUnavailable => "ProverUnavailable",
            FailureKind::ProofGenerationFailed => "ProofGenerationFailed",
            FailureKind::VerifierExportFailed => "VerifierExportFailed",
            FailureKind::VerificationRejected => "VerificationRejected",
            FailureKind::LedgerLookupFailed => "LedgerLookupFailed",
            FailureKind::InvalidContext => "InvalidContext",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fallo tipado de una etapa.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {detail}")]
pub struct StageFailure {
    pub kind: FailureKind,
    pub detail: String,
}

impl StageFailure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self { kind,
               detail: detail.into() }
    }
}

impl From<ContextError> for StageFailure {
    fn from(err: ContextError) -> Self {
        Self::new(FailureKind::InvalidContext, err.to_string())
    }
}

/// Resultado abstracto de ejecutar una etapa.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    Success(Value),
    Failure(StageFailure),
}

impl StageOutcome {
    pub fn failure(kind: FailureKind, detail: impl Into<String>) -> Self {
        StageOutcome::Failure(StageFailure::new(kind, detail))
    }
}

impl From<Result<Value, StageFailure>> for StageOutcome {
    fn from(res: Result<Value, StageFailure>) -> Self {
        match res {
            Ok(v) => StageOutcome::Success(v),
            Err(f) => StageOutcome::Failure(f),
        }
    }
}
