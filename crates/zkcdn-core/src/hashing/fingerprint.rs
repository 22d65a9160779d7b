//! Fingerprint determinista de una dirección de contenido (djb2 de 32 bits).
//!
//! `hash = 5381; por cada carácter c: hash = hash * 33 + c (mod 2^32)`.
//! El resultado es la clave con la que el ledger indexa el contenido, así que
//! el algoritmo es parte del contrato externo: cualquier reimplementación debe
//! producir exactamente los mismos bits.

use crate::constants::{FINGERPRINT_MULTIPLIER, FINGERPRINT_SEED};

/// Calcula el fingerprint de `s`. Pura, total, O(len).
pub fn fingerprint(s: &str) -> u32 {
    s.chars().fold(FINGERPRINT_SEED, |hash, c| {
                 hash.wrapping_mul(FINGERPRINT_MULTIPLIER).wrapping_add(u32::from(c))
             })
}
