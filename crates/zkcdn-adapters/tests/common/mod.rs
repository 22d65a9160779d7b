#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use zkcdn_adapters::{ContentStore, Ledger, LedgerError, ProverError, ProverReply, ProvingService, StoreError};
use zkcdn_core::Fingerprint;

pub const OWNER: &str = "0xA11CE";

/// Content store que siempre devuelve la misma dirección (o falla).
pub struct FixedStore {
    pub address: Option<String>,
    pub calls: AtomicUsize,
}

impl FixedStore {
    pub fn returning(address: &str) -> Self {
        Self { address: Some(address.to_string()),
               calls: AtomicUsize::new(0) }
    }

    pub fn failing() -> Self {
        Self { address: None,
               calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl ContentStore for FixedStore {
    async fn store(&self, _content: Vec<u8>) -> Result<String, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.address.clone().ok_or_else(|| StoreError::Rejected("gateway down".into()))
    }
}

/// Ledger con respuestas fijas que registra cada llamada.
#[derive(Default)]
pub struct ScriptedLedger {
    pub tx_hash: String,
    pub resolved: Option<String>,
    /// `await_confirmation` no resuelve nunca.
    pub stall_confirmation: bool,
    pub log: Mutex<Vec<String>>,
}

impl ScriptedLedger {
    pub fn new(tx_hash: &str, resolved: Option<&str>) -> Self {
        Self { tx_hash: tx_hash.to_string(),
               resolved: resolved.map(str::to_string),
               stall_confirmation: false,
               log: Mutex::new(Vec::new()) }
    }

    pub fn never_confirming(tx_hash: &str) -> Self {
        Self { stall_confirmation: true,
               ..Self::new(tx_hash, None) }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl Ledger for ScriptedLedger {
    async fn mint(&self, owner: &str, storage_address: &str, fingerprint: Fingerprint) -> Result<String, LedgerError> {
        self.log.lock().unwrap().push(format!("mint {owner} {storage_address} {fingerprint}"));
        Ok(self.tx_hash.clone())
    }

    async fn await_confirmation(&self, tx_hash: &str) -> Result<String, LedgerError> {
        self.log.lock().unwrap().push(format!("confirm {tx_hash}"));
        if self.stall_confirmation {
            std::future::pending::<()>().await;
        }
        Ok(tx_hash.to_string())
    }

    async fn resolve(&self, fingerprint: Fingerprint) -> Result<String, LedgerError> {
        self.log.lock().unwrap().push(format!("resolve {fingerprint}"));
        self.resolved.clone().ok_or(LedgerError::NotFound(fingerprint))
    }

    async fn fingerprints_of(&self, _owner: &str) -> Result<Vec<Fingerprint>, LedgerError> {
        Ok(Vec::new())
    }
}

/// Proving service guionado: cada operación responde con el mensaje dado o
/// falla si se marcó en `failing`. Con `verify_service_error`, `verify_proof`
/// responde como un 2xx con `Errormessage`.
pub struct ScriptedProver {
    pub verify_message: String,
    pub failing: Option<&'static str>,
    pub verify_service_error: Option<String>,
    pub log: Mutex<Vec<String>>,
}

impl ScriptedProver {
    pub fn verifying(message: &str) -> Self {
        Self { verify_message: message.to_string(),
               failing: None,
               verify_service_error: None,
               log: Mutex::new(Vec::new()) }
    }

    pub fn reporting_on_verify(error_message: &str) -> Self {
        Self { verify_service_error: Some(error_message.to_string()),
               ..Self::verifying("Proof is verified") }
    }

    pub fn failing_at(endpoint: &'static str) -> Self {
        Self { verify_message: "Proof is verified".into(),
               failing: Some(endpoint),
               verify_service_error: None,
               log: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn reply(&self, endpoint: &str, message: &str) -> Result<ProverReply, ProverError> {
        self.log.lock().unwrap().push(endpoint.to_string());
        if self.failing == Some(endpoint) {
            return Err(ProverError::Status { endpoint: endpoint.into(),
                                             status: 500,
                                             body: "internal error".into() });
        }
        Ok(ProverReply { message: message.to_string(),
                         output: None })
    }
}

#[async_trait]
impl ProvingService for ScriptedProver {
    async fn generate_witness(&self, _fingerprint: Fingerprint) -> Result<ProverReply, ProverError> {
        self.reply("generate_witness", "Witness generated successfully")
    }

    async fn generate_proof(&self) -> Result<ProverReply, ProverError> {
        self.reply("generate_proof", "Proof generated successfully")
    }

    async fn export_verifier(&self) -> Result<ProverReply, ProverError> {
        self.reply("export_verifier", "Verifier exported")
    }

    async fn verify_proof(&self) -> Result<ProverReply, ProverError> {
        if let Some(message) = &self.verify_service_error {
            self.log.lock().unwrap().push("verify_proof".to_string());
            return Err(ProverError::Service { endpoint: "verify_proof".into(),
                                              message: message.clone() });
        }
        let message = self.verify_message.clone();
        self.reply("verify_proof", &message)
    }
}
