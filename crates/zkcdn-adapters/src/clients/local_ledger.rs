//! Ledger local de desarrollo.
//!
//! Reproduce el contrato tal como lo consume el cliente: mint con
//! first-write-wins por fingerprint, `resolve` y `fingerprints_of`. El
//! registro vive en memoria y, si se abre con una ruta, se persiste como JSON
//! después de cada mint.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zkcdn_core::Fingerprint;

use super::Ledger;
use crate::errors::LedgerError;

/// Operaciones del ledger, para contar invocaciones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerOp {
    Mint,
    AwaitConfirmation,
    Resolve,
    FingerprintsOf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Entry {
    fingerprint: Fingerprint,
    owner: String,
    storage_address: String,
    tx_hash: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    fn find(&self, fingerprint: Fingerprint) -> Option<&Entry> {
        self.entries.iter().find(|e| e.fingerprint == fingerprint)
    }
}

#[derive(Debug)]
pub struct LocalLedger {
    signer: Option<String>,
    path: Option<PathBuf>,
    registry: Mutex<Registry>,
    calls: Mutex<HashMap<LedgerOp, usize>>,
}

impl LocalLedger {
    /// Ledger sólo en memoria. Sin signer, `mint` falla con
    /// `SignerUnavailable`.
    pub fn in_memory(signer: Option<String>) -> Self {
        Self { signer,
               path: None,
               registry: Mutex::new(Registry::default()),
               calls: Mutex::new(HashMap::new()) }
    }

    /// Abre (o crea al primer mint) el registro JSON en `path`.
    pub fn open(path: impl AsRef<Path>, signer: Option<String>) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        let registry = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            Registry::default()
        };
        tracing::debug!(path = %path.display(), "local ledger opened");
        Ok(Self { signer,
                  path: Some(path),
                  registry: Mutex::new(registry),
                  calls: Mutex::new(HashMap::new()) })
    }

    pub fn signer(&self) -> Option<&str> {
        self.signer.as_deref()
    }

    /// Veces que se invocó `op` sobre este ledger.
    pub fn calls(&self, op: LedgerOp) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).get(&op).copied().unwrap_or(0)
    }

    /// Hash determinista de la transacción de mint.
    pub fn tx_hash_for(owner: &str, storage_address: &str, fingerprint: Fingerprint) -> String {
        let mut hasher = Sha256::new();
        hasher.update(owner.as_bytes());
        hasher.update(b"|");
        hasher.update(storage_address.as_bytes());
        hasher.update(b"|");
        hasher.update(fingerprint.to_string().as_bytes());
        format!("0x{}", hex::encode(hasher.finalize()))
    }

    fn record_call(&self, op: LedgerOp) {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner).entry(op).or_insert(0) += 1;
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, registry: &Registry) -> Result<(), LedgerError> {
        if let Some(path) = &self.path {
            fs::write(path, serde_json::to_string_pretty(registry)?)?;
        }
        Ok(())
    }
}

#[async_trait]
impl Ledger for LocalLedger {
    async fn mint(&self, owner: &str, storage_address: &str, fingerprint: Fingerprint) -> Result<String, LedgerError> {
        self.record_call(LedgerOp::Mint);
        let signer = self.signer
                         .as_deref()
                         .ok_or_else(|| LedgerError::SignerUnavailable("no account configured".into()))?;
        if !signer.eq_ignore_ascii_case(owner) {
            return Err(LedgerError::Rejected(format!("signer {signer} cannot mint for {owner}")));
        }

        let mut registry = self.registry();
        if let Some(existing) = registry.find(fingerprint) {
            return Err(LedgerError::Rejected(format!("fingerprint {fingerprint} already registered to {}",
                                                     existing.storage_address)));
        }
        let tx_hash = Self::tx_hash_for(owner, storage_address, fingerprint);
        registry.entries.push(Entry { fingerprint,
                                      owner: owner.to_string(),
                                      storage_address: storage_address.to_string(),
                                      tx_hash: tx_hash.clone() });
        if let Err(err) = self.persist(&registry) {
            registry.entries.pop();
            return Err(err);
        }
        tracing::info!(%fingerprint, %tx_hash, "mint recorded");
        Ok(tx_hash)
    }

    async fn await_confirmation(&self, tx_hash: &str) -> Result<String, LedgerError> {
        self.record_call(LedgerOp::AwaitConfirmation);
        self.registry()
            .entries
            .iter()
            .find(|e| e.tx_hash == tx_hash)
            .map(|e| e.tx_hash.clone())
            .ok_or_else(|| LedgerError::UnknownTransaction(tx_hash.to_string()))
    }

    async fn resolve(&self, fingerprint: Fingerprint) -> Result<String, LedgerError> {
        self.record_call(LedgerOp::Resolve);
        self.registry()
            .find(fingerprint)
            .map(|e| e.storage_address.clone())
            .ok_or(LedgerError::NotFound(fingerprint))
    }

    async fn fingerprints_of(&self, owner: &str) -> Result<Vec<Fingerprint>, LedgerError> {
        self.record_call(LedgerOp::FingerprintsOf);
        Ok(self.registry()
               .entries
               .iter()
               .filter(|e| e.owner.eq_ignore_ascii_case(owner))
               .map(|e| e.fingerprint)
               .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: &str = "0xA11CE";

    #[tokio::test]
    async fn mint_then_resolve_and_list() {
        let ledger = LocalLedger::in_memory(Some(OWNER.into()));
        let fp = Fingerprint::of("QmA");

        let tx = ledger.mint(OWNER, "QmA", fp).await.unwrap();

        assert_eq!(tx, LocalLedger::tx_hash_for(OWNER, "QmA", fp));
        assert!(tx.starts_with("0x") && tx.len() == 66);
        assert_eq!(ledger.await_confirmation(&tx).await.unwrap(), tx);
        assert_eq!(ledger.resolve(fp).await.unwrap(), "QmA");
        assert_eq!(ledger.fingerprints_of(OWNER).await.unwrap(), vec![fp]);
        assert_eq!(ledger.calls(LedgerOp::Mint), 1);
    }

    #[tokio::test]
    async fn second_mint_of_same_fingerprint_is_rejected() {
        let ledger = LocalLedger::in_memory(Some(OWNER.into()));
        let fp = Fingerprint(7);
        ledger.mint(OWNER, "QmA", fp).await.unwrap();

        let err = ledger.mint(OWNER, "QmB", fp).await.unwrap_err();

        assert!(matches!(err, LedgerError::Rejected(_)));
        assert_eq!(ledger.resolve(fp).await.unwrap(), "QmA");
    }

    #[tokio::test]
    async fn mint_without_signer_fails() {
        let ledger = LocalLedger::in_memory(None);
        let err = ledger.mint(OWNER, "QmA", Fingerprint(1)).await.unwrap_err();
        assert!(matches!(err, LedgerError::SignerUnavailable(_)));
    }

    #[tokio::test]
    async fn unknown_fingerprint_and_transaction() {
        let ledger = LocalLedger::in_memory(Some(OWNER.into()));
        assert!(matches!(ledger.resolve(Fingerprint(9)).await, Err(LedgerError::NotFound(Fingerprint(9)))));
        assert!(matches!(ledger.await_confirmation("0xdead").await, Err(LedgerError::UnknownTransaction(_))));
        assert_eq!(ledger.calls(LedgerOp::Resolve), 1);
        assert_eq!(ledger.calls(LedgerOp::FingerprintsOf), 0);
    }
}
