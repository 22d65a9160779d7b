//! Artifacts tipados que las etapas escriben en el contexto del run.
//!
//! El engine sólo conoce `serde_json::Value`; estos tipos fijan la forma de
//! cada salida para que las etapas posteriores la decodifiquen con
//! `StageContext::output_as`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use zkcdn_core::{ContextError, Fingerprint};

/// Input del pipeline de tokenización. El contenido viaja en base64 dentro
/// del JSON del contexto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizationInput {
    pub owner: String,
    pub content: String,
}

impl TokenizationInput {
    pub fn new(owner: impl Into<String>, content: &[u8]) -> Self {
        Self { owner: owner.into(),
               content: STANDARD.encode(content) }
    }

    pub fn content_bytes(&self) -> Result<Vec<u8>, ContextError> {
        STANDARD.decode(&self.content)
                .map_err(|e| ContextError::Input(format!("content is not valid base64: {e}")))
    }
}

/// Input del pipeline de verificación.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationInput {
    pub fingerprint: Fingerprint,
}

// storeContent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredContent {
    pub storage_address: String,
}

// computeFingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedFingerprint {
    pub fingerprint: Fingerprint,
}

// submitMint / confirmMint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintTransaction {
    pub tx_hash: String,
}

/// Referencia a un resultado intermedio del proving service (witness, proof o
/// verifier). El servicio no devuelve identificadores: sólo el mensaje y la
/// salida de la herramienta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProverArtifact {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
}

// verifyProof
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofVerdict {
    pub verified: bool,
    pub message: String,
}

// resolveAddress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAddress {
    pub storage_address: String,
}
