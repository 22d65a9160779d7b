use thiserror::Error;
use zkcdn_adapters::{LedgerError, PipelineError, ProverError, StoreError};
use zkcdn_core::EngineError;

use crate::config::ConfigError;

/// Error de la aplicación: une configuración, IO, engine, pipelines y
/// clientes.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de configuración: {0}")]
    Config(#[from] ConfigError),
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Entrada inválida: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("Error del ledger: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Error del proving service: {0}")]
    Prover(#[from] ProverError),
    #[error("Error del content store: {0}")]
    Store(#[from] StoreError),
    #[error("Error de serialización: {0}")]
    Json(#[from] serde_json::Error),
}
