use rocket::{serde::json::Json, Route};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Accion, Circuito, EstadoObservado, Id, ObservadoPendiente};
use crate::store::Store;

use super::common::Mensaje;

pub fn routes() -> Vec<Route> {
    routes![pendientes, adjudicar]
}

/// Pending observed votes for the president's panel. The response exposes
/// identity grounds only; ballot content never leaves the store.
#[get("/observados/<circuito>")]
async fn pendientes(
    store: &Store,
    circuito: Circuito,
) -> Result<Json<Vec<ObservadoPendiente>>> {
    Ok(Json(store.observados_pendientes(circuito).await?))
}

/// The president's decision on one observed vote.
#[derive(Debug, Serialize, Deserialize)]
pub struct AdjudicacionRequest {
    pub voto_id: Id,
    pub accion: Accion,
}

#[post("/validar-observado", data = "<solicitud>", format = "json")]
async fn adjudicar(store: &Store, solicitud: Json<AdjudicacionRequest>) -> Result<Json<Mensaje>> {
    let solicitud = solicitud.into_inner();
    let decidido = store.adjudicar(solicitud.voto_id, solicitud.accion).await?;
    let mensaje = match decidido {
        EstadoObservado::Validado => {
            "El voto observado fue validado y se computará en el escrutinio".to_string()
        }
        EstadoObservado::Rechazado => {
            "El voto observado fue rechazado y queda excluido del escrutinio".to_string()
        }
        EstadoObservado::Pendiente => {
            return Err(Error::Internal("la decisión no quedó registrada".to_string()))
        }
    };
    Ok(Json(Mensaje::new(mensaje)))
}
