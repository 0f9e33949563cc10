use std::io::Cursor;

use rocket::{
    http::{ContentType, Status},
    response::{self, Responder, Response},
    Request,
};
use thiserror::Error;

use crate::model::{Circuito, Credencial, Id};

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the mesa state machine can produce.
///
/// All of these are definitive: the state conflict they report will not go
/// away on its own, so terminals must never retry them automatically.
/// Transport failures are a separate concern (see [`crate::session`]).
#[derive(Debug, Error)]
pub enum Error {
    #[error("la credencial {0} ya fue habilitada para esta elección")]
    AlreadyAuthorized(Credencial),
    #[error("la credencial ya emitió su voto")]
    AlreadyVoted,
    #[error("la mesa del circuito {0} ya estaba cerrada")]
    AlreadyClosed(Circuito),
    #[error("el voto observado {0} ya fue adjudicado")]
    AlreadyAdjudicated(Id),
    #[error("selección inválida: {0}")]
    InvalidSelection(String),
    #[error("no autorizado: {0}")]
    NotAuthorized(String),
    #[error("no encontrado: {0}")]
    NotFound(String),
    #[error("la mesa del circuito {0} está cerrada")]
    MesaClosed(Circuito),
    #[error("solicitud inválida: {0}")]
    BadRequest(String),
    #[error("error interno: {0}")]
    Internal(String),
}

impl Error {
    /// Stable machine-readable code. Terminals match on this rather than on
    /// the human message.
    pub fn codigo(&self) -> &'static str {
        match self {
            Self::AlreadyAuthorized(_) => "ALREADY_AUTHORIZED",
            Self::AlreadyVoted => "ALREADY_VOTED",
            Self::AlreadyClosed(_) => "ALREADY_CLOSED",
            Self::AlreadyAdjudicated(_) => "ALREADY_ADJUDICATED",
            Self::InvalidSelection(_) => "INVALID_SELECTION",
            Self::NotAuthorized(_) => "NOT_AUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::MesaClosed(_) => "MESA_CLOSED",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Self::AlreadyAuthorized(_)
            | Self::AlreadyVoted
            | Self::AlreadyClosed(_)
            | Self::AlreadyAdjudicated(_)
            | Self::MesaClosed(_) => Status::Conflict,
            Self::InvalidSelection(_) | Self::BadRequest(_) => Status::BadRequest,
            Self::NotAuthorized(_) => Status::Forbidden,
            Self::NotFound(_) => Status::NotFound,
            Self::Internal(_) => Status::InternalServerError,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'o> {
        warn!("{self}");
        // The terminals read `detail` from error bodies.
        let body = serde_json::json!({
            "codigo": self.codigo(),
            "detail": self.to_string(),
        })
        .to_string();
        Response::build()
            .status(self.status())
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}
