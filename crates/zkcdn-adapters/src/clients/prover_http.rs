//! Cliente HTTP del proving service.
//!
//! | Method | Path | Operación |
//! |--------|------|-----------|
//! | POST   | `/compile` | compila el circuito y hace el setup |
//! | GET    | `/generate_witness?unique_ipfs_integer=N` | witness |
//! | GET    | `/generate_proof` | prueba |
//! | GET    | `/export_verifier` | verifier |
//! | GET    | `/verify_proof` | verificación; `message` lleva el resultado |
//!
//! El servicio informa sus fallos dentro de un cuerpo 2xx con el campo
//! `Errormessage`; el cliente lo trata como `ProverError::Service`.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use zkcdn_core::Fingerprint;

use super::{ProverReply, ProvingService};
use crate::errors::ProverError;

const ERROR_FIELD: &str = "Errormessage";

#[derive(Debug, Clone)]
pub struct HttpProvingService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpProvingService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProverError> {
        let http = reqwest::Client::builder().timeout(timeout)
                                             .build()
                                             .map_err(|e| ProverError::Http { endpoint: "client_init".into(),
                                                                              source: e })?;
        Ok(Self { http,
                  base_url: base_url.into().trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Compila el circuito y ejecuta el setup. No forma parte de ningún
    /// pipeline.
    pub async fn setup_circuit(&self) -> Result<ProverReply, ProverError> {
        let request = self.http.post(self.url("compile"));
        self.send("compile", request).await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn get(&self, endpoint: &str, query: &[(&str, String)]) -> Result<ProverReply, ProverError> {
        let request = self.http.get(self.url(endpoint)).query(query);
        self.send(endpoint, request).await
    }

    async fn send(&self, endpoint: &str, request: reqwest::RequestBuilder) -> Result<ProverReply, ProverError> {
        tracing::debug!(endpoint, "calling proving service");
        let response = request.send().await.map_err(|e| ProverError::Http { endpoint: endpoint.into(),
                                                                            source: e })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProverError::Status { endpoint: endpoint.into(),
                                             status: status.as_u16(),
                                             body });
        }
        let body: Value = response.json().await.map_err(|e| ProverError::Deserialization { endpoint: endpoint.into(),
                                                                                           reason: e.to_string() })?;
        parse_reply(endpoint, body)
    }
}

fn parse_reply(endpoint: &str, body: Value) -> Result<ProverReply, ProverError> {
    if let Some(err) = body.get(ERROR_FIELD) {
        let message = match err {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(ProverError::Service { endpoint: endpoint.into(),
                                          message });
    }
    serde_json::from_value(body).map_err(|e| ProverError::Deserialization { endpoint: endpoint.into(),
                                                                           reason: e.to_string() })
}

#[async_trait]
impl ProvingService for HttpProvingService {
    async fn generate_witness(&self, fingerprint: Fingerprint) -> Result<ProverReply, ProverError> {
        self.get("generate_witness", &[("unique_ipfs_integer", fingerprint.to_string())]).await
    }

    async fn generate_proof(&self) -> Result<ProverReply, ProverError> {
        self.get("generate_proof", &[]).await
    }

    async fn export_verifier(&self) -> Result<ProverReply, ProverError> {
        self.get("export_verifier", &[]).await
    }

    async fn verify_proof(&self) -> Result<ProverReply, ProverError> {
        self.get("verify_proof", &[]).await
    }
}
