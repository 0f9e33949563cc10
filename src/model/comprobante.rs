use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Circuito;

/// Marker preceding the receipt code in the confirmation message.
const MARCADOR: &str = "Comprobante: ";

/// Proof-of-cast receipt code, e.g. `C001-00042`.
///
/// Derived from the casting circuit and that circuit's cast sequence, so it
/// is stable and re-derivable for audit, and by construction encodes
/// nothing about the ballot selection. Shown to the voter exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Comprobante {
    circuito: Circuito,
    secuencia: u32,
}

#[derive(Debug, Error)]
#[error("comprobante inválido: {0:?}")]
pub struct ParseComprobanteError(pub String);

impl Comprobante {
    pub fn nuevo(circuito: Circuito, secuencia: u32) -> Self {
        Self {
            circuito,
            secuencia,
        }
    }

    pub fn circuito(self) -> Circuito {
        self.circuito
    }

    pub fn secuencia(self) -> u32 {
        self.secuencia
    }

    /// The human confirmation message the cast endpoint returns. The booth
    /// must capture the code from here or it is lost.
    pub fn mensaje_confirmacion(self) -> String {
        format!("Voto registrado exitosamente. {MARCADOR}{self}")
    }

    /// Extract the receipt code back out of a confirmation message.
    pub fn desde_mensaje(mensaje: &str) -> Option<Self> {
        let inicio = mensaje.find(MARCADOR)? + MARCADOR.len();
        let codigo = mensaje[inicio..].split_whitespace().next()?;
        codigo.trim_end_matches(['.', ',']).parse().ok()
    }
}

impl Display for Comprobante {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:05}",
            self.circuito.prefijo_comprobante(),
            self.secuencia
        )
    }
}

impl FromStr for Comprobante {
    type Err = ParseComprobanteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ParseComprobanteError(s.to_string());
        let resto = s.strip_prefix('C').ok_or_else(error)?;
        let (prefijo, secuencia) = resto.split_once('-').ok_or_else(error)?;
        if prefijo.len() < 3 || secuencia.len() != 5 {
            return Err(error());
        }
        let circuito: Circuito = prefijo.parse().map_err(|_| error())?;
        if !secuencia.bytes().all(|b| b.is_ascii_digit()) {
            return Err(error());
        }
        let secuencia: u32 = secuencia.parse().map_err(|_| error())?;
        Ok(Self {
            circuito,
            secuencia,
        })
    }
}

impl TryFrom<String> for Comprobante {
    type Error = ParseComprobanteError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Comprobante> for String {
    fn from(comprobante: Comprobante) -> Self {
        comprobante.to_string()
    }
}
