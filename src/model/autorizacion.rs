use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::{Circuito, Credencial};

/// Internal lifecycle of an authorization record.
///
/// `Anulada` never appears on the wire: it marks grants swept when their
/// mesa closed before the voter cast.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEstado {
    Autorizada,
    PendienteValidacion,
    Sufragada,
    Anulada,
}

/// Wire-visible status of a credential at a circuit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstadoVotante {
    Unauthorized,
    Authorized,
    PendingAdjudication,
    Consumed,
}

/// A single-use voting grant binding a credential to a casting circuit.
///
/// Created by the authorization terminal, consumed exactly once by the
/// booth. Every state change is a compare-and-set against the current
/// state; there is no blind overwrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistroAutorizacion {
    pub credencial: Credencial,
    pub circuito: Circuito,
    pub estado: AuthEstado,
    /// Home circuit the voter claims, for observed grants only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origen: Option<Circuito>,
    pub autorizada_en: DateTime<Utc>,
}

impl RegistroAutorizacion {
    /// An ordinary grant at the voter's own circuit.
    pub fn comun(credencial: Credencial, circuito: Circuito) -> Self {
        Self {
            credencial,
            circuito,
            estado: AuthEstado::Autorizada,
            origen: None,
            autorizada_en: Utc::now(),
        }
    }

    /// An observed grant: the voter may cast immediately, but the resulting
    /// vote only counts after the president validates it.
    pub fn observada(credencial: Credencial, circuito: Circuito, origen: Circuito) -> Self {
        Self {
            credencial,
            circuito,
            estado: AuthEstado::PendienteValidacion,
            origen: Some(origen),
            autorizada_en: Utc::now(),
        }
    }

    pub fn es_observada(&self) -> bool {
        self.origen.is_some()
    }

    /// Consume the grant at cast time. Only a live grant can be consumed.
    pub fn consumir(&mut self) -> Result<()> {
        match self.estado {
            AuthEstado::Autorizada | AuthEstado::PendienteValidacion => {
                self.estado = AuthEstado::Sufragada;
                Ok(())
            }
            AuthEstado::Sufragada => Err(Error::AlreadyVoted),
            AuthEstado::Anulada => Err(Error::NotAuthorized(
                "la habilitación quedó sin efecto al cerrarse la mesa".to_string(),
            )),
        }
    }

    /// Sweep at mesa closure. Consumed grants are untouched; returns whether
    /// this record changed.
    pub fn anular(&mut self) -> bool {
        match self.estado {
            AuthEstado::Autorizada | AuthEstado::PendienteValidacion => {
                self.estado = AuthEstado::Anulada;
                true
            }
            AuthEstado::Sufragada | AuthEstado::Anulada => false,
        }
    }

    pub fn estado_votante(&self) -> EstadoVotante {
        match self.estado {
            AuthEstado::Autorizada => EstadoVotante::Authorized,
            AuthEstado::PendienteValidacion => EstadoVotante::PendingAdjudication,
            AuthEstado::Sufragada => EstadoVotante::Consumed,
            AuthEstado::Anulada => EstadoVotante::Unauthorized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registro() -> RegistroAutorizacion {
        RegistroAutorizacion::comun("12345678".parse().unwrap(), Circuito::from(1))
    }

    #[test]
    fn consumir_es_unico() {
        let mut r = registro();
        r.consumir().unwrap();
        assert_eq!(r.estado, AuthEstado::Sufragada);
        assert!(matches!(r.consumir(), Err(Error::AlreadyVoted)));
    }

    #[test]
    fn anular_respeta_sufragios() {
        let mut r = registro();
        r.consumir().unwrap();
        assert!(!r.anular());
        assert_eq!(r.estado, AuthEstado::Sufragada);

        let mut pendiente = RegistroAutorizacion::observada(
            "87654321".parse().unwrap(),
            Circuito::from(2),
            Circuito::from(1),
        );
        assert!(pendiente.anular());
        assert!(matches!(pendiente.consumir(), Err(Error::NotAuthorized(_))));
    }

    #[test]
    fn proyeccion_de_estado() {
        let mut r = registro();
        assert_eq!(r.estado_votante(), EstadoVotante::Authorized);
        r.consumir().unwrap();
        assert_eq!(r.estado_votante(), EstadoVotante::Consumed);

        let mut a = registro();
        a.anular();
        assert_eq!(a.estado_votante(), EstadoVotante::Unauthorized);
    }
}
