//! Interfaces de los colaboradores externos y sus implementaciones.
//!
//! Los pipelines reciben estos clientes como capacidades de sólo lectura
//! (`Arc<dyn ...>`); cualquier estado mutable vive dentro del cliente.

mod ipfs_http;
mod local_ledger;
mod memory;
mod prover_http;

pub use ipfs_http::IpfsHttpStore;
pub use local_ledger::{LedgerOp, LocalLedger};
pub use memory::InMemoryContentStore;
pub use prover_http::HttpProvingService;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use zkcdn_core::Fingerprint;

use crate::errors::{LedgerError, ProverError, StoreError};

/// Almacenamiento direccionado por contenido.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Sube los bytes y devuelve la dirección de contenido asignada.
    async fn store(&self, content: Vec<u8>) -> Result<String, StoreError>;
}

/// Registro on-chain fingerprint → dirección de contenido.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Envía la transacción de mint y devuelve su hash.
    async fn mint(&self, owner: &str, storage_address: &str, fingerprint: Fingerprint) -> Result<String, LedgerError>;

    /// Espera la finalidad de la transacción; devuelve el hash confirmado.
    async fn await_confirmation(&self, tx_hash: &str) -> Result<String, LedgerError>;

    async fn resolve(&self, fingerprint: Fingerprint) -> Result<String, LedgerError>;

    async fn fingerprints_of(&self, owner: &str) -> Result<Vec<Fingerprint>, LedgerError>;
}

/// Respuesta exitosa del proving service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProverReply {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub output: Option<Value>,
}

/// Proving service externo. Las cuatro operaciones se consumen en orden
/// estricto por el pipeline de verificación.
#[async_trait]
pub trait ProvingService: Send + Sync {
    async fn generate_witness(&self, fingerprint: Fingerprint) -> Result<ProverReply, ProverError>;
    async fn generate_proof(&self) -> Result<ProverReply, ProverError>;
    async fn export_verifier(&self) -> Result<ProverReply, ProverError>;
    async fn verify_proof(&self) -> Result<ProverReply, ProverError>;
}
