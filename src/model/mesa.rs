use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::Circuito;

/// Operational status of a mesa. The transition `Abierta -> Cerrada` happens
/// at most once; no reverse transition exists.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MesaEstado {
    Abierta,
    Cerrada,
}

/// One polling station and its election day state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesa {
    pub circuito: Circuito,
    pub estado: MesaEstado,
    /// Credentials granted a voting opportunity at this mesa.
    pub habilitados: u32,
    /// Next receipt sequence number, starting at 1.
    proximo_comprobante: u32,
}

impl Mesa {
    pub fn nueva(circuito: Circuito) -> Self {
        Self {
            circuito,
            estado: MesaEstado::Abierta,
            habilitados: 0,
            proximo_comprobante: 1,
        }
    }

    /// Gate for every authorization and casting call.
    pub fn exigir_abierta(&self) -> Result<()> {
        match self.estado {
            MesaEstado::Abierta => Ok(()),
            MesaEstado::Cerrada => Err(Error::MesaClosed(self.circuito)),
        }
    }

    /// The one-way close. A second call is an error, not a crash.
    pub fn cerrar(&mut self) -> Result<()> {
        match self.estado {
            MesaEstado::Abierta => {
                self.estado = MesaEstado::Cerrada;
                Ok(())
            }
            MesaEstado::Cerrada => Err(Error::AlreadyClosed(self.circuito)),
        }
    }

    /// Hand out the next receipt sequence number.
    pub fn emitir_secuencia(&mut self) -> u32 {
        let secuencia = self.proximo_comprobante;
        self.proximo_comprobante += 1;
        secuencia
    }
}
