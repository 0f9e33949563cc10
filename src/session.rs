//! Terminal-side state machine for the voting booth.
//!
//! A booth walks one voter at a time through
//! `Identificacion -> Seleccion -> Confirmacion -> Finalizada` and resets
//! deterministically for the next voter. The session owns no shared state:
//! everything authoritative lives behind [`CabinaBackend`].

use thiserror::Error;

use crate::error::Error;
use crate::model::{Circuito, Comprobante, Credencial, EstadoVotante, Seleccion};
use crate::store::Store;

/// Outcome of a backend call made by a terminal.
#[derive(Debug, Error)]
pub enum FalloBackend {
    /// Definitive refusal from the mesa state machine. Retrying the same
    /// call can never succeed.
    #[error(transparent)]
    Rechazo(#[from] Error),
    /// The call may or may not have been applied. The only class eligible
    /// for operator-initiated retry, and only after re-querying state.
    #[error("fallo de transporte: {0}")]
    Transporte(String),
}

/// The two calls a booth makes against the shared mesa state.
#[rocket::async_trait]
pub trait CabinaBackend {
    async fn estado_votante(
        &self,
        circuito: Circuito,
        credencial: &Credencial,
    ) -> Result<EstadoVotante, FalloBackend>;

    /// Returns the confirmation message; the receipt code travels inside it.
    async fn emitir_voto(
        &self,
        circuito: Circuito,
        credencial: &Credencial,
        selecciones: &[Seleccion],
    ) -> Result<String, FalloBackend>;
}

/// In-process backend: the booth talking straight to the store.
#[rocket::async_trait]
impl CabinaBackend for &Store {
    async fn estado_votante(
        &self,
        circuito: Circuito,
        credencial: &Credencial,
    ) -> Result<EstadoVotante, FalloBackend> {
        Store::estado_votante(self, circuito, credencial)
            .await
            .map_err(FalloBackend::Rechazo)
    }

    async fn emitir_voto(
        &self,
        circuito: Circuito,
        credencial: &Credencial,
        selecciones: &[Seleccion],
    ) -> Result<String, FalloBackend> {
        Store::emitir_voto(self, circuito, credencial, selecciones)
            .await
            .map_err(FalloBackend::Rechazo)
    }
}

/// Where the booth session currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EstadoCabina {
    /// Waiting for the voter to key in their credential.
    Identificacion,
    /// Verified voter choosing among candidates, blank and annulled.
    Seleccion { credencial: Credencial },
    /// Selection made, awaiting the voter's confirmation.
    Confirmacion {
        credencial: Credencial,
        seleccion: Seleccion,
    },
    /// Vote cast. `comprobante` is `None` when the receipt could not be
    /// captured from the confirmation (it is then irrecoverable).
    Finalizada { comprobante: Option<Comprobante> },
}

/// One booth terminal's session at a fixed circuit.
///
/// Every backend call takes `&mut self`, so a second submission cannot race
/// ahead of one already in flight.
pub struct SesionCabina<B> {
    backend: B,
    circuito: Circuito,
    estado: EstadoCabina,
}

impl<B: CabinaBackend> SesionCabina<B> {
    pub fn nueva(backend: B, circuito: Circuito) -> Self {
        Self {
            backend,
            circuito,
            estado: EstadoCabina::Identificacion,
        }
    }

    pub fn estado(&self) -> &EstadoCabina {
        &self.estado
    }

    /// Verify the keyed-in credential against the mesa. Advances only when
    /// the voter holds a live grant; any other status leaves the session
    /// where it is and surfaces the refusal.
    pub async fn identificar(&mut self, ingresada: &str) -> Result<(), FalloBackend> {
        if self.estado != EstadoCabina::Identificacion {
            return Err(Error::BadRequest("ya hay un votante identificado".to_string()).into());
        }
        let credencial: Credencial = ingresada
            .parse()
            .map_err(|_| Error::BadRequest(format!("credencial ilegible: {ingresada:?}")))?;

        match self.backend.estado_votante(self.circuito, &credencial).await? {
            EstadoVotante::Authorized | EstadoVotante::PendingAdjudication => {
                self.estado = EstadoCabina::Seleccion { credencial };
                Ok(())
            }
            EstadoVotante::Consumed => Err(Error::AlreadyVoted.into()),
            EstadoVotante::Unauthorized => Err(Error::NotAuthorized(
                "debe ser habilitada por la mesa antes de votar".to_string(),
            )
            .into()),
        }
    }

    /// Record the voter's choice. Re-selecting from the confirmation screen
    /// is allowed; nothing reaches the backend yet.
    pub fn seleccionar(&mut self, seleccion: Seleccion) -> Result<(), Error> {
        match std::mem::replace(&mut self.estado, EstadoCabina::Identificacion) {
            EstadoCabina::Seleccion { credencial }
            | EstadoCabina::Confirmacion { credencial, .. } => {
                self.estado = EstadoCabina::Confirmacion {
                    credencial,
                    seleccion,
                };
                Ok(())
            }
            previo => {
                self.estado = previo;
                Err(Error::BadRequest(
                    "no hay un votante identificado".to_string(),
                ))
            }
        }
    }

    /// Submit the vote. On success the receipt is captured here, or lost.
    ///
    /// A definitive refusal resets the session (the conflict cannot be
    /// fixed from the booth); a transport failure keeps it in place so the
    /// operator can run [`Self::recuperar`].
    pub async fn confirmar(&mut self) -> Result<Option<Comprobante>, FalloBackend> {
        let (credencial, seleccion) = match &self.estado {
            EstadoCabina::Confirmacion {
                credencial,
                seleccion,
            } => (credencial.clone(), *seleccion),
            _ => {
                return Err(
                    Error::BadRequest("no hay una selección confirmada".to_string()).into(),
                )
            }
        };

        match self
            .backend
            .emitir_voto(self.circuito, &credencial, &[seleccion])
            .await
        {
            Ok(mensaje) => {
                let comprobante = Comprobante::desde_mensaje(&mensaje);
                if comprobante.is_none() {
                    warn!("confirmación sin comprobante legible: {mensaje:?}");
                }
                self.estado = EstadoCabina::Finalizada { comprobante };
                Ok(comprobante)
            }
            Err(FalloBackend::Rechazo(error)) => {
                self.estado = EstadoCabina::Identificacion;
                Err(FalloBackend::Rechazo(error))
            }
            Err(transporte) => Err(transporte),
        }
    }

    /// After a transport failure on [`Self::confirmar`]: re-query state
    /// before any retry, never assume the cast went through.
    ///
    /// If the vote did land, the session finishes without a receipt (it was
    /// only ever present in the lost response). If the grant is still live,
    /// the session stays in confirmation and a retry is safe.
    pub async fn recuperar(&mut self) -> Result<(), FalloBackend> {
        let credencial = match &self.estado {
            EstadoCabina::Confirmacion { credencial, .. } => credencial.clone(),
            _ => {
                return Err(
                    Error::BadRequest("no hay un sufragio pendiente de aclarar".to_string()).into(),
                )
            }
        };

        match self.backend.estado_votante(self.circuito, &credencial).await? {
            EstadoVotante::Consumed => {
                self.estado = EstadoCabina::Finalizada { comprobante: None };
                Ok(())
            }
            EstadoVotante::Authorized | EstadoVotante::PendingAdjudication => Ok(()),
            EstadoVotante::Unauthorized => {
                self.estado = EstadoCabina::Identificacion;
                Err(Error::NotAuthorized(
                    "la habilitación quedó sin efecto".to_string(),
                )
                .into())
            }
        }
    }

    /// Deterministic reset, from any state, with no backend effect.
    pub fn reiniciar(&mut self) {
        self.estado = EstadoCabina::Identificacion;
    }
}
