//! Módulo de hashing: fingerprint de direcciones de contenido y hash de
//! definiciones sobre JSON canónico.

pub mod canonical_json;
pub mod fingerprint;
pub mod hash;

pub use canonical_json::to_canonical_json;
pub use fingerprint::fingerprint;
pub use hash::{hash_str, hash_value};
