//! Constantes del motor core.
//!
//! `FINGERPRINT_SEED` y `FINGERPRINT_MULTIPLIER` fijan el algoritmo del
//! fingerprint y no pueden cambiar sin invalidar las claves ya registradas en
//! el ledger.

/// Versión lógica del motor. Participa en el `definition_hash` para que un
/// cambio incompatible del engine produzca hashes de definición distintos.
pub const ENGINE_VERSION: &str = "Z1.0";

/// Valor inicial del fingerprint (djb2).
pub const FINGERPRINT_SEED: u32 = 5381;

/// Multiplicador aplicado por carácter (`hash * 33 + c`).
pub const FINGERPRINT_MULTIPLIER: u32 = 33;
