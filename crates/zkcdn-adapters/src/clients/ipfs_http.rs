//! Cliente HTTP para la API `add` de un nodo IPFS (o un gateway de
//! escritura compatible, con basic auth opcional).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::ContentStore;
use crate::errors::StoreError;

#[derive(Debug, Deserialize)]
struct AddReply {
    #[serde(rename = "Hash")]
    hash: String,
}

#[derive(Debug, Clone)]
pub struct IpfsHttpStore {
    http: reqwest::Client,
    api_url: String,
    credentials: Option<(String, String)>,
}

impl IpfsHttpStore {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder().timeout(timeout)
                                             .build()
                                             .map_err(|e| StoreError::Http { endpoint: "client_init".into(),
                                                                             source: e })?;
        Ok(Self { http,
                  api_url: api_url.into().trim_end_matches('/').to_string(),
                  credentials: None })
    }

    pub fn with_credentials(mut self, project_id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.credentials = Some((project_id.into(), secret.into()));
        self
    }
}

#[async_trait]
impl ContentStore for IpfsHttpStore {
    async fn store(&self, content: Vec<u8>) -> Result<String, StoreError> {
        let endpoint = format!("{}/add", self.api_url);
        let size = content.len();
        let form = reqwest::multipart::Form::new().part("file", reqwest::multipart::Part::bytes(content).file_name("file"));
        let mut request = self.http.post(&endpoint).multipart(form);
        if let Some((id, secret)) = &self.credentials {
            request = request.basic_auth(id, Some(secret));
        }

        tracing::debug!(%endpoint, size, "uploading content");
        let response = request.send().await.map_err(|e| StoreError::Http { endpoint: endpoint.clone(),
                                                                           source: e })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { endpoint,
                                            status: status.as_u16(),
                                            body });
        }
        let reply: AddReply = response.json().await.map_err(|e| StoreError::MalformedReply { endpoint: endpoint.clone(),
                                                                                             reason: e.to_string() })?;
        if reply.hash.is_empty() {
            return Err(StoreError::MalformedReply { endpoint,
                                                    reason: "empty Hash".into() });
        }
        Ok(reply.hash)
    }
}
