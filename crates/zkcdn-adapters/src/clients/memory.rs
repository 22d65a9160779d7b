use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::ContentStore;
use crate::errors::StoreError;

/// Content store en memoria para uso offline y tests. La dirección es el
/// sha256 hex del contenido con prefijo `local-`, así que subir los mismos
/// bytes dos veces devuelve la misma dirección.
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address_of(content: &[u8]) -> String {
        format!("local-{}", hex::encode(Sha256::digest(content)))
    }

    pub fn get(&self, address: &str) -> Option<Vec<u8>> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner).get(address).cloned()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn store(&self, content: Vec<u8>) -> Result<String, StoreError> {
        let address = Self::address_of(&content);
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner).insert(address.clone(), content);
        Ok(address)
    }
}
