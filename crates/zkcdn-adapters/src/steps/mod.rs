//! Etapas concretas de los pipelines.
//!
//! Cada etapa realiza exactamente una interacción externa, acota su propia
//! latencia con `tokio::time::timeout` y traduce los errores del colaborador
//! a un `FailureKind`.

pub mod tokenize;
pub mod verify;

use std::future::Future;
use std::time::Duration;

use zkcdn_core::{FailureKind, StageFailure};

pub use tokenize::{ComputeFingerprintStage, ConfirmMintStage, StoreContentStage, SubmitMintStage};
pub use verify::{ExportVerifierStage, GenerateProofStage, GenerateWitnessStage, ResolveAddressStage, VerifyProofStage};

pub const STORE_CONTENT: &str = "storeContent";
pub const COMPUTE_FINGERPRINT: &str = "computeFingerprint";
pub const SUBMIT_MINT: &str = "submitMint";
pub const CONFIRM_MINT: &str = "confirmMint";

pub const GENERATE_WITNESS: &str = "generateWitness";
pub const GENERATE_PROOF: &str = "generateProof";
pub const EXPORT_VERIFIER: &str = "exportVerifier";
pub const VERIFY_PROOF: &str = "verifyProof";
pub const RESOLVE_ADDRESS: &str = "resolveAddress";

/// Ejecuta `fut` con límite `limit`; al vencer devuelve un fallo de `kind`.
pub(crate) async fn within<F: Future>(limit: Duration, kind: FailureKind, what: &str, fut: F)
                                      -> Result<F::Output, StageFailure> {
    tokio::time::timeout(limit, fut).await
                                    .map_err(|_| StageFailure::new(kind, format!("{what} timed out after {limit:?}")))
}
