//! Records producidos por un run exitoso, ensamblados a partir de las
//! salidas de sus etapas.

use serde::{Deserialize, Serialize};
use zkcdn_core::{ContextError, Fingerprint, WorkflowRun};

use crate::artifacts::{ComputedFingerprint, MintTransaction, ProofVerdict, ResolvedAddress, StoredContent,
                       TokenizationInput, VerificationInput};
use crate::steps::{COMPUTE_FINGERPRINT, CONFIRM_MINT, RESOLVE_ADDRESS, STORE_CONTENT, VERIFY_PROOF};

fn join_url(prefix: &str, tail: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), tail)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub owner: String,
    pub fingerprint: Fingerprint,
    pub storage_address: String,
    pub tx_hash: String,
}

impl ContentRecord {
    pub fn from_run(run: &WorkflowRun) -> Result<Self, ContextError> {
        let input: TokenizationInput = run.context.input_as()?;
        let stored: StoredContent = run.context.output_as(STORE_CONTENT)?;
        let computed: ComputedFingerprint = run.context.output_as(COMPUTE_FINGERPRINT)?;
        let confirmed: MintTransaction = run.context.output_as(CONFIRM_MINT)?;
        Ok(Self { owner: input.owner,
                  fingerprint: computed.fingerprint,
                  storage_address: stored.storage_address,
                  tx_hash: confirmed.tx_hash })
    }

    /// Enlace al contenido en un gateway público.
    pub fn content_url(&self, gateway: &str) -> String {
        join_url(gateway, &self.storage_address)
    }

    /// Enlace a la transacción de mint en el explorador de bloques.
    pub fn tx_url(&self, explorer: &str) -> String {
        join_url(explorer, &self.tx_hash)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub fingerprint: Fingerprint,
    pub verified: bool,
    pub resolved_address: Option<String>,
}

impl VerificationRecord {
    pub fn from_run(run: &WorkflowRun) -> Result<Self, ContextError> {
        let input: VerificationInput = run.context.input_as()?;
        let verdict: ProofVerdict = run.context.output_as(VERIFY_PROOF)?;
        let resolved = match run.context.output(RESOLVE_ADDRESS) {
            Some(_) => Some(run.context.output_as::<ResolvedAddress>(RESOLVE_ADDRESS)?.storage_address),
            None => None,
        };
        Ok(Self { fingerprint: input.fingerprint,
                  verified: verdict.verified,
                  resolved_address: resolved })
    }

    pub fn content_url(&self, gateway: &str) -> Option<String> {
        self.resolved_address.as_deref().map(|addr| join_url(gateway, addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_join_prefix_and_identifier() {
        let record = ContentRecord { owner: "0xA11CE".into(),
                                     fingerprint: Fingerprint(1),
                                     storage_address: "QmA".into(),
                                     tx_hash: "0xabc".into() };
        assert_eq!(record.content_url("https://ipfs.io/ipfs/"), "https://ipfs.io/ipfs/QmA");
        assert_eq!(record.tx_url("https://cardona-zkevm.polygonscan.com/tx"),
                   "https://cardona-zkevm.polygonscan.com/tx/0xabc");
    }

    #[test]
    fn unresolved_verification_has_no_link() {
        let record = VerificationRecord { fingerprint: Fingerprint(1),
                                          verified: false,
                                          resolved_address: None };
        assert_eq!(record.content_url("https://ipfs.io/ipfs"), None);
    }
}
