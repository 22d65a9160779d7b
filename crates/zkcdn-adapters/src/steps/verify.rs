//! Etapas del pipeline de verificación:
//! `generateWitness` → `generateProof` → `exportVerifier` → `verifyProof` →
//! `resolveAddress`.
//!
//! `resolveAddress` abre con la compuerta de verificación: si el mensaje de
//! `verifyProof` no es exactamente `PROOF_VERIFIED_SENTINEL`, la etapa falla
//! con `VerificationRejected` sin consultar el ledger.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use zkcdn_core::{FailureKind, StageContext, StageFailure, TypedStage};

use super::{within, EXPORT_VERIFIER, GENERATE_PROOF, GENERATE_WITNESS, RESOLVE_ADDRESS, VERIFY_PROOF};
use crate::artifacts::{ProofVerdict, ProverArtifact, ResolvedAddress, VerificationInput};
use crate::clients::{Ledger, ProverReply, ProvingService};
use crate::errors::ProverError;

/// Mensaje con el que el proving service anuncia una prueba válida.
pub const PROOF_VERIFIED_SENTINEL: &str = "Proof is verified";

fn artifact(reply: ProverReply) -> ProverArtifact {
    ProverArtifact { message: reply.message,
                     output: reply.output }
}

pub struct GenerateWitnessStage {
    pub prover: Arc<dyn ProvingService>,
    pub timeout: Duration,
}

#[async_trait]
impl TypedStage for GenerateWitnessStage {
    type Output = ProverArtifact;

    fn name(&self) -> &'static str {
        GENERATE_WITNESS
    }

    async fn run_typed(&self, ctx: &StageContext) -> Result<ProverArtifact, StageFailure> {
        let input: VerificationInput = ctx.input_as()?;
        let kind = FailureKind::ProverUnavailable;
        let reply = within(self.timeout, kind, "witness generation", self.prover.generate_witness(input.fingerprint)).await?
            .map_err(|e| StageFailure::new(kind, e.to_string()))?;
        Ok(artifact(reply))
    }
}

pub struct GenerateProofStage {
    pub prover: Arc<dyn ProvingService>,
    pub timeout: Duration,
}

#[async_trait]
impl TypedStage for GenerateProofStage {
    type Output = ProverArtifact;

    fn name(&self) -> &'static str {
        GENERATE_PROOF
    }

    async fn run_typed(&self, ctx: &StageContext) -> Result<ProverArtifact, StageFailure> {
        let _witness: ProverArtifact = ctx.output_as(GENERATE_WITNESS)?;
        let kind = FailureKind::ProofGenerationFailed;
        let reply = within(self.timeout, kind, "proof generation", self.prover.generate_proof()).await?
            .map_err(|e| StageFailure::new(kind, e.to_string()))?;
        Ok(artifact(reply))
    }
}

pub struct ExportVerifierStage {
    pub prover: Arc<dyn ProvingService>,
    pub timeout: Duration,
}

#[async_trait]
impl TypedStage for ExportVerifierStage {
    type Output = ProverArtifact;

    fn name(&self) -> &'static str {
        EXPORT_VERIFIER
    }

    async fn run_typed(&self, ctx: &StageContext) -> Result<ProverArtifact, StageFailure> {
        let _proof: ProverArtifact = ctx.output_as(GENERATE_PROOF)?;
        let kind = FailureKind::VerifierExportFailed;
        let reply = within(self.timeout, kind, "verifier export", self.prover.export_verifier()).await?
            .map_err(|e| StageFailure::new(kind, e.to_string()))?;
        Ok(artifact(reply))
    }
}

/// Consulta el veredicto. Un `Errormessage` del servicio no es un fallo de la
/// etapa: produce un veredicto negativo y la compuerta decide.
pub struct VerifyProofStage {
    pub prover: Arc<dyn ProvingService>,
    pub timeout: Duration,
}

#[async_trait]
impl TypedStage for VerifyProofStage {
    type Output = ProofVerdict;

    fn name(&self) -> &'static str {
        VERIFY_PROOF
    }

    async fn run_typed(&self, ctx: &StageContext) -> Result<ProofVerdict, StageFailure> {
        let _verifier: ProverArtifact = ctx.output_as(EXPORT_VERIFIER)?;
        let kind = FailureKind::ProverUnavailable;
        match within(self.timeout, kind, "proof verification", self.prover.verify_proof()).await? {
            Ok(reply) => Ok(ProofVerdict { verified: reply.message == PROOF_VERIFIED_SENTINEL,
                                           message: reply.message }),
            Err(ProverError::Service { message, .. }) => Ok(ProofVerdict { verified: false,
                                                                           message }),
            Err(e) => Err(StageFailure::new(kind, e.to_string())),
        }
    }
}

pub struct ResolveAddressStage {
    pub ledger: Arc<dyn Ledger>,
    pub timeout: Duration,
}

#[async_trait]
impl TypedStage for ResolveAddressStage {
    type Output = ResolvedAddress;

    fn name(&self) -> &'static str {
        RESOLVE_ADDRESS
    }

    async fn run_typed(&self, ctx: &StageContext) -> Result<ResolvedAddress, StageFailure> {
        let verdict: ProofVerdict = ctx.output_as(VERIFY_PROOF)?;
        if verdict.message != PROOF_VERIFIED_SENTINEL {
            return Err(StageFailure::new(FailureKind::VerificationRejected, verdict.message));
        }

        let input: VerificationInput = ctx.input_as()?;
        let kind = FailureKind::LedgerLookupFailed;
        let storage_address = within(self.timeout, kind, "address lookup", self.ledger.resolve(input.fingerprint)).await?
            .map_err(|e| StageFailure::new(kind, e.to_string()))?;
        Ok(ResolvedAddress { storage_address })
    }
}
