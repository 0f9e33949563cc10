use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single ballot selection: a candidate, a blank vote, or an annulled vote.
///
/// Tagged on the wire so a malformed payload fails to parse instead of
/// smuggling a sentinel value through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum Seleccion {
    Candidato { id: u32 },
    Blanco,
    Anulado,
}

impl Seleccion {
    /// A cast carries exactly one selection, never zero, never several.
    pub fn exactamente_una(selecciones: &[Seleccion]) -> Result<Seleccion> {
        match selecciones {
            [unica] => Ok(*unica),
            [] => Err(Error::InvalidSelection(
                "no se indicó ninguna opción".to_string(),
            )),
            _ => Err(Error::InvalidSelection(format!(
                "se indicaron {} opciones; debe ser exactamente una",
                selecciones.len()
            ))),
        }
    }
}

impl Display for Seleccion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Seleccion::Candidato { id } => write!(f, "candidato {id}"),
            Seleccion::Blanco => f.write_str("en blanco"),
            Seleccion::Anulado => f.write_str("anulado"),
        }
    }
}
