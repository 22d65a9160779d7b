//! zkcdn-adapters: colaboradores externos y pipelines concretos.
//!
//! Este crate provee:
//! - Interfaces de colaboradores (`ContentStore`, `Ledger`, `ProvingService`)
//!   y sus clientes concretos (HTTP IPFS, HTTP prover, ledger local).
//! - Artifacts tipados que las etapas escriben en el contexto del run.
//! - Las etapas de Tokenization (`storeContent` → `confirmMint`) y de
//!   Verification (`generateWitness` → `resolveAddress`).
//! - `TokenizationPipeline` / `VerificationPipeline`, que construyen la
//!   definición, la ejecutan sobre un `WorkflowEngine` y ensamblan el record.
//!
//! Los clientes se inyectan como `Arc<dyn ...>` al construir cada pipeline;
//! ninguna etapa accede a estado global.

pub mod artifacts;
pub mod clients;
pub mod errors;
pub mod pipelines;
pub mod records;
pub mod steps;

pub use clients::{ContentStore, HttpProvingService, InMemoryContentStore, IpfsHttpStore, Ledger, LedgerOp, LocalLedger,
                  ProverReply, ProvingService};
pub use errors::{LedgerError, PipelineError, ProverError, StoreError};
pub use pipelines::{StageTimeouts, TokenizationPipeline, VerificationPipeline, PROOF_VERIFIED_SENTINEL};
pub use records::{ContentRecord, VerificationRecord};
