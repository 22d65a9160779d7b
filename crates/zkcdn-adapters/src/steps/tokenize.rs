//! Etapas del pipeline de tokenización:
//! `storeContent` → `computeFingerprint` → `submitMint` → `confirmMint`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use zkcdn_core::{FailureKind, Fingerprint, StageContext, StageFailure, TypedStage};

use super::{within, COMPUTE_FINGERPRINT, CONFIRM_MINT, STORE_CONTENT, SUBMIT_MINT};
use crate::artifacts::{ComputedFingerprint, MintTransaction, StoredContent, TokenizationInput};
use crate::clients::{ContentStore, Ledger};
use crate::errors::LedgerError;

/// Sube el contenido del input al content store.
pub struct StoreContentStage {
    pub store: Arc<dyn ContentStore>,
    pub timeout: Duration,
}

#[async_trait]
impl TypedStage for StoreContentStage {
    type Output = StoredContent;

    fn name(&self) -> &'static str {
        STORE_CONTENT
    }

    async fn run_typed(&self, ctx: &StageContext) -> Result<StoredContent, StageFailure> {
        let input: TokenizationInput = ctx.input_as()?;
        let bytes = input.content_bytes()?;
        let uploaded = within(self.timeout, FailureKind::StorageUnavailable, "content upload", self.store.store(bytes)).await?;
        let storage_address = uploaded.map_err(|e| StageFailure::new(FailureKind::StorageUnavailable, e.to_string()))?;
        Ok(StoredContent { storage_address })
    }
}

/// Deriva el fingerprint de la dirección de contenido. Nunca falla salvo por
/// un contexto inválido.
pub struct ComputeFingerprintStage;

#[async_trait]
impl TypedStage for ComputeFingerprintStage {
    type Output = ComputedFingerprint;

    fn name(&self) -> &'static str {
        COMPUTE_FINGERPRINT
    }

    async fn run_typed(&self, ctx: &StageContext) -> Result<ComputedFingerprint, StageFailure> {
        let stored: StoredContent = ctx.output_as(STORE_CONTENT)?;
        Ok(ComputedFingerprint { fingerprint: Fingerprint::of(&stored.storage_address) })
    }
}

pub struct SubmitMintStage {
    pub ledger: Arc<dyn Ledger>,
    pub timeout: Duration,
}

#[async_trait]
impl TypedStage for SubmitMintStage {
    type Output = MintTransaction;

    fn name(&self) -> &'static str {
        SUBMIT_MINT
    }

    async fn run_typed(&self, ctx: &StageContext) -> Result<MintTransaction, StageFailure> {
        let input: TokenizationInput = ctx.input_as()?;
        let stored: StoredContent = ctx.output_as(STORE_CONTENT)?;
        let computed: ComputedFingerprint = ctx.output_as(COMPUTE_FINGERPRINT)?;

        let tx_hash = within(self.timeout,
                             FailureKind::LedgerRejected,
                             "mint submission",
                             self.ledger.mint(&input.owner, &stored.storage_address, computed.fingerprint)).await?
                                                                                                           .map_err(mint_failure)?;
        Ok(MintTransaction { tx_hash })
    }
}

/// Espera la finalidad de la transacción de `submitMint`.
pub struct ConfirmMintStage {
    pub ledger: Arc<dyn Ledger>,
    pub timeout: Duration,
}

#[async_trait]
impl TypedStage for ConfirmMintStage {
    type Output = MintTransaction;

    fn name(&self) -> &'static str {
        CONFIRM_MINT
    }

    async fn run_typed(&self, ctx: &StageContext) -> Result<MintTransaction, StageFailure> {
        let submitted: MintTransaction = ctx.output_as(SUBMIT_MINT)?;
        let confirmed = within(self.timeout,
                               FailureKind::ConfirmationTimeout,
                               "mint confirmation",
                               self.ledger.await_confirmation(&submitted.tx_hash)).await?;
        let tx_hash = confirmed.map_err(|e| StageFailure::new(FailureKind::ConfirmationTimeout, e.to_string()))?;
        Ok(MintTransaction { tx_hash })
    }
}

fn mint_failure(err: LedgerError) -> StageFailure {
    let kind = match err {
        LedgerError::SignerUnavailable(_) => FailureKind::SignerUnavailable,
        _ => FailureKind::LedgerRejected,
    };
    StageFailure::new(kind, err.to_string())
}
