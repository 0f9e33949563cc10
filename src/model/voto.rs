use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Circuito, Id, Seleccion};

/// Whether a vote counts towards official results.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Elegibilidad {
    /// Counts for the casting circuit.
    Computable,
    /// Observed vote awaiting the president's decision.
    PendienteValidacion,
    /// Rejected at adjudication; stored, never tallied.
    Excluido,
}

/// An immutable cast vote.
///
/// Deliberately carries no credential reference: nothing on this type can
/// link a ballot back to the identity that was authorized for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voto {
    pub id: Id,
    pub circuito: Circuito,
    pub seleccion: Seleccion,
    pub emitido_en: DateTime<Utc>,
    pub elegibilidad: Elegibilidad,
    /// Claimed home circuit, present only for observed votes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origen: Option<Circuito>,
}

impl Voto {
    /// A vote cast with a claimed origin starts pending adjudication;
    /// everything else is immediately computable.
    pub fn nuevo(circuito: Circuito, seleccion: Seleccion, origen: Option<Circuito>) -> Self {
        let elegibilidad = if origen.is_some() {
            Elegibilidad::PendienteValidacion
        } else {
            Elegibilidad::Computable
        };
        Self {
            id: Id::new(),
            circuito,
            seleccion,
            emitido_en: Utc::now(),
            elegibilidad,
            origen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sin_referencia_a_credencial() {
        let voto = Voto::nuevo(Circuito::from(1), Seleccion::Blanco, None);
        let json = serde_json::to_value(&voto).unwrap();
        let claves = json.as_object().unwrap();
        assert!(!claves.contains_key("credencial"));
        assert!(!claves.contains_key("cedula"));
    }

    #[test]
    fn elegibilidad_segun_origen() {
        let comun = Voto::nuevo(Circuito::from(1), Seleccion::Blanco, None);
        assert_eq!(comun.elegibilidad, Elegibilidad::Computable);

        let observado = Voto::nuevo(
            Circuito::from(2),
            Seleccion::Candidato { id: 42 },
            Some(Circuito::from(1)),
        );
        assert_eq!(observado.elegibilidad, Elegibilidad::PendienteValidacion);
    }
}
