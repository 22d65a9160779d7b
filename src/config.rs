//! Configuración central de la aplicación.
//! Carga variables de entorno (.env una sola vez) y construye un `AppConfig`
//! inmutable que el binario usa para instanciar los colaboradores.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use dotenvy::dotenv;
use once_cell::sync::Lazy;
use thiserror::Error;
use zkcdn_adapters::StageTimeouts;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Forzar carga temprana de .env.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}={value:?} no es válido: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Parámetros del proving service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProverConfig {
    pub url: String,
    pub timeout: Duration,
}

/// Parámetros del content store (API IPFS).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpfsConfig {
    pub api_url: String,
    pub project_id: Option<String>,
    pub project_secret: Option<String>,
    pub gateway_url: String,
    pub timeout: Duration,
}

impl IpfsConfig {
    /// Credenciales de basic auth, sólo si ambas partes están definidas.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.project_id, &self.project_secret) {
            (Some(id), Some(secret)) => Some((id, secret)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub prover: ProverConfig,
    pub ipfs: IpfsConfig,
    pub explorer_tx_url: String,
    pub ledger_registry: PathBuf,
    pub confirm_timeout: Duration,
    /// Filtro de logs por defecto cuando `RUST_LOG` no está definido.
    pub log_filter: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        init_dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda de
    /// variables (tests inyectan un mapa).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
        where F: Fn(&str) -> Option<String>
    {
        let text = |key: &str, default: &str| lookup(key).filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string());
        let secs = |key: &'static str, default: u64| -> Result<Duration, ConfigError> {
            match lookup(key) {
                None => Ok(Duration::from_secs(default)),
                Some(raw) => raw.trim()
                                .parse::<u64>()
                                .map(Duration::from_secs)
                                .map_err(|e| ConfigError::Invalid { key,
                                                                    value: raw.clone(),
                                                                    reason: e.to_string() }),
            }
        };

        Ok(Self { prover: ProverConfig { url: text("ZKCDN_PROVER_URL", "http://localhost:8000"),
                                         timeout: secs("ZKCDN_PROVER_TIMEOUT_SECS", 120)? },
                  ipfs: IpfsConfig { api_url: text("ZKCDN_IPFS_API_URL", "https://ipfs.infura.io:5001/api/v0"),
                                     project_id: lookup("ZKCDN_IPFS_PROJECT_ID"),
                                     project_secret: lookup("ZKCDN_IPFS_PROJECT_SECRET"),
                                     gateway_url: text("ZKCDN_IPFS_GATEWAY_URL", "https://ipfs.io/ipfs"),
                                     timeout: secs("ZKCDN_STORE_TIMEOUT_SECS", 60)? },
                  explorer_tx_url: text("ZKCDN_EXPLORER_TX_URL", "https://cardona-zkevm.polygonscan.com/tx"),
                  ledger_registry: PathBuf::from(text("ZKCDN_LEDGER_REGISTRY", "zkcdn-ledger.json")),
                  confirm_timeout: secs("ZKCDN_CONFIRM_TIMEOUT_SECS", 60)?,
                  log_filter: text("ZKCDN_LOG", "info") })
    }

    /// Límites por etapa derivados de la configuración.
    pub fn stage_timeouts(&self) -> StageTimeouts {
        StageTimeouts { store: self.ipfs.timeout,
                        confirm: self.confirm_timeout,
                        prover: self.prover.timeout,
                        ..StageTimeouts::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.prover.url, "http://localhost:8000");
        assert_eq!(cfg.prover.timeout, Duration::from_secs(120));
        assert_eq!(cfg.ipfs.gateway_url, "https://ipfs.io/ipfs");
        assert_eq!(cfg.ledger_registry, PathBuf::from("zkcdn-ledger.json"));
        assert_eq!(cfg.log_filter, "info");
        assert_eq!(cfg.ipfs.credentials(), None);
    }

    #[test]
    fn overrides_are_read() {
        let cfg = AppConfig::from_lookup(lookup_from(&[("ZKCDN_PROVER_URL", "http://prover:9000"),
                                                       ("ZKCDN_CONFIRM_TIMEOUT_SECS", " 5 "),
                                                       ("ZKCDN_IPFS_PROJECT_ID", "id"),
                                                       ("ZKCDN_IPFS_PROJECT_SECRET", "secret")])).unwrap();
        assert_eq!(cfg.prover.url, "http://prover:9000");
        assert_eq!(cfg.stage_timeouts().confirm, Duration::from_secs(5));
        assert_eq!(cfg.ipfs.credentials(), Some(("id", "secret")));
    }

    #[test]
    fn invalid_number_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[("ZKCDN_PROVER_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "ZKCDN_PROVER_TIMEOUT_SECS", .. }));
    }
}
