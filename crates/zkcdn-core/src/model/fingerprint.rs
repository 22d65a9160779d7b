use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::hashing::fingerprint;

/// Clave numérica de 32 bits con la que el ledger indexa una dirección de
/// contenido. Dos direcciones distintas pueden colisionar; el core no lo
/// resuelve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(pub u32);

impl Fingerprint {
    /// Deriva el fingerprint de una dirección de contenido.
    pub fn of(storage_address: &str) -> Self {
        Self(fingerprint(storage_address))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for Fingerprint {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Forma decimal, que es como viaja al servicio de pruebas y al ledger.
impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(Self)
    }
}
