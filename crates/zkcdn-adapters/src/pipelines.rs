//! Pipelines concretos sobre `WorkflowEngine`.
//!
//! Cada pipeline construye su `WorkflowDefinition` una vez, con los clientes
//! inyectados en sus etapas, y puede ejecutarse cualquier número de veces:
//! cada ejecución es un `WorkflowRun` nuevo.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use zkcdn_core::{EngineError, Fingerprint, RunHandle, RunStatus, WorkflowDefinition, WorkflowEngine, WorkflowRun};

use crate::artifacts::{TokenizationInput, VerificationInput};
use crate::clients::{ContentStore, Ledger, ProvingService};
use crate::errors::PipelineError;
use crate::records::{ContentRecord, VerificationRecord};
use crate::steps::{ComputeFingerprintStage, ConfirmMintStage, ExportVerifierStage, GenerateProofStage,
                   GenerateWitnessStage, ResolveAddressStage, StoreContentStage, SubmitMintStage, VerifyProofStage};

pub use crate::steps::verify::PROOF_VERIFIED_SENTINEL;

/// Límites de latencia por tipo de interacción remota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimeouts {
    pub store: Duration,
    pub mint: Duration,
    pub confirm: Duration,
    pub prover: Duration,
    pub resolve: Duration,
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self { store: Duration::from_secs(60),
               mint: Duration::from_secs(60),
               confirm: Duration::from_secs(60),
               prover: Duration::from_secs(120),
               resolve: Duration::from_secs(30) }
    }
}

/// Traduce el estado final de un run a `Ok(())` o al `PipelineError`
/// correspondiente.
fn settle(run: &WorkflowRun) -> Result<(), PipelineError> {
    match run.status {
        RunStatus::Succeeded => Ok(()),
        RunStatus::Failed => {
            let err = run.last_error.clone().ok_or(PipelineError::NotFinished(run.status))?;
            Err(PipelineError::Failed { stage_index: err.stage_index,
                                        stage: err.stage,
                                        kind: err.kind,
                                        detail: err.detail })
        }
        RunStatus::Cancelled => Err(PipelineError::Cancelled { at_index: run.current_index }),
        RunStatus::Idle | RunStatus::Running => Err(PipelineError::NotFinished(run.status)),
    }
}

/// `storeContent` → `computeFingerprint` → `submitMint` → `confirmMint`.
#[derive(Debug, Clone)]
pub struct TokenizationPipeline {
    definition: Arc<WorkflowDefinition>,
}

impl TokenizationPipeline {
    pub const NAME: &'static str = "tokenization";

    pub fn new(store: Arc<dyn ContentStore>, ledger: Arc<dyn Ledger>, timeouts: StageTimeouts)
               -> Result<Self, EngineError> {
        let definition = WorkflowDefinition::builder(Self::NAME).then(StoreContentStage { store,
                                                                                          timeout: timeouts.store })
                                                                .then(ComputeFingerprintStage)
                                                                .then(SubmitMintStage { ledger: ledger.clone(),
                                                                                        timeout: timeouts.mint })
                                                                .then(ConfirmMintStage { ledger,
                                                                                         timeout: timeouts.confirm })
                                                                .build()?;
        Ok(Self { definition: Arc::new(definition) })
    }

    pub fn definition(&self) -> Arc<WorkflowDefinition> {
        self.definition.clone()
    }

    pub fn input(owner: &str, content: &[u8]) -> Result<Value, PipelineError> {
        Ok(serde_json::to_value(TokenizationInput::new(owner, content))?)
    }

    /// Inicia un run sin conducirlo; útil para poder cancelarlo.
    pub fn start(&self, engine: &WorkflowEngine, owner: &str, content: &[u8]) -> Result<RunHandle, PipelineError> {
        Ok(engine.start(self.definition(), Self::input(owner, content)?)?)
    }

    pub async fn run(&self, engine: &WorkflowEngine, owner: &str, content: &[u8])
                     -> Result<ContentRecord, PipelineError> {
        let handle = self.start(engine, owner, content)?;
        let run = engine.drive(&handle).await?;
        Self::record(&run)
    }

    pub fn record(run: &WorkflowRun) -> Result<ContentRecord, PipelineError> {
        settle(run)?;
        Ok(ContentRecord::from_run(run)?)
    }
}

/// `generateWitness` → `generateProof` → `exportVerifier` → `verifyProof` →
/// `resolveAddress`.
#[derive(Debug, Clone)]
pub struct VerificationPipeline {
    definition: Arc<WorkflowDefinition>,
}

impl VerificationPipeline {
    pub const NAME: &'static str = "verification";

    pub fn new(prover: Arc<dyn ProvingService>, ledger: Arc<dyn Ledger>, timeouts: StageTimeouts)
               -> Result<Self, EngineError> {
        let definition = WorkflowDefinition::builder(Self::NAME).then(GenerateWitnessStage { prover: prover.clone(),
                                                                                             timeout: timeouts.prover })
                                                                .then(GenerateProofStage { prover: prover.clone(),
                                                                                           timeout: timeouts.prover })
                                                                .then(ExportVerifierStage { prover: prover.clone(),
                                                                                            timeout: timeouts.prover })
                                                                .then(VerifyProofStage { prover,
                                                                                         timeout: timeouts.prover })
                                                                .then(ResolveAddressStage { ledger,
                                                                                            timeout: timeouts.resolve })
                                                                .build()?;
        Ok(Self { definition: Arc::new(definition) })
    }

    pub fn definition(&self) -> Arc<WorkflowDefinition> {
        self.definition.clone()
    }

    pub fn input(fingerprint: Fingerprint) -> Result<Value, PipelineError> {
        Ok(serde_json::to_value(VerificationInput { fingerprint })?)
    }

    pub fn start(&self, engine: &WorkflowEngine, fingerprint: Fingerprint) -> Result<RunHandle, PipelineError> {
        Ok(engine.start(self.definition(), Self::input(fingerprint)?)?)
    }

    pub async fn run(&self, engine: &WorkflowEngine, fingerprint: Fingerprint)
                     -> Result<VerificationRecord, PipelineError> {
        let handle = self.start(engine, fingerprint)?;
        let run = engine.drive(&handle).await?;
        Self::record(&run)
    }

    pub fn record(run: &WorkflowRun) -> Result<VerificationRecord, PipelineError> {
        settle(run)?;
        Ok(VerificationRecord::from_run(run)?)
    }
}
