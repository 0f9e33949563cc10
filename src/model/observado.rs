use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::{Circuito, Credencial, Id};

/// Lifecycle of an observed-vote request: pending until the mesa president
/// decides, terminal once decided.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstadoObservado {
    Pendiente,
    Validado,
    Rechazado,
}

/// The president's decision on an observed vote.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accion {
    Validar,
    Rechazar,
}

/// A vote cast outside the credential's home circuit, awaiting adjudication
/// at the casting circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotoObservado {
    pub id: Id,
    pub credencial: Credencial,
    /// Circuit where the vote was cast (and adjudicated).
    pub circuito: Circuito,
    /// Home circuit the voter claimed.
    pub origen: Circuito,
    pub emitido_en: DateTime<Utc>,
    pub estado: EstadoObservado,
    /// Link to the stored vote whose eligibility the decision flips.
    /// Internal only; the panel projection never exposes it.
    pub voto_id: Id,
}

impl VotoObservado {
    pub fn nuevo(
        voto_id: Id,
        credencial: Credencial,
        circuito: Circuito,
        origen: Circuito,
        emitido_en: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Id::new(),
            credencial,
            circuito,
            origen,
            emitido_en,
            estado: EstadoObservado::Pendiente,
            voto_id,
        }
    }

    /// One-way decision. A second call fails no matter the direction.
    pub fn decidir(&mut self, accion: Accion) -> Result<EstadoObservado> {
        match self.estado {
            EstadoObservado::Pendiente => {
                self.estado = match accion {
                    Accion::Validar => EstadoObservado::Validado,
                    Accion::Rechazar => EstadoObservado::Rechazado,
                };
                Ok(self.estado)
            }
            _ => Err(Error::AlreadyAdjudicated(self.id)),
        }
    }
}

/// What the adjudication panel sees: identity grounds only. The ballot
/// selection is never part of this projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservadoPendiente {
    pub id: Id,
    pub credencial: Credencial,
    pub circuito_origen: Circuito,
    pub fecha_hora: DateTime<Utc>,
}

impl From<&VotoObservado> for ObservadoPendiente {
    fn from(voto: &VotoObservado) -> Self {
        Self {
            id: voto.id,
            credencial: voto.credencial.clone(),
            circuito_origen: voto.origen,
            fecha_hora: voto.emitido_en,
        }
    }
}
