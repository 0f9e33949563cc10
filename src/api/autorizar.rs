use rocket::{serde::json::Json, Route};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Circuito, Credencial};
use crate::store::Store;

use super::common::Mensaje;

pub fn routes() -> Vec<Route> {
    routes![habilitar_voto]
}

/// What the authorization terminal submits to enable a credential.
#[derive(Debug, Serialize, Deserialize)]
pub struct HabilitacionRequest {
    pub credencial: Credencial,
    pub circuito: Circuito,
    /// Observed vote: voter outside their registered circuit.
    #[serde(default)]
    pub es_observado: bool,
    /// Home circuit the voter claims; required when `es_observado`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuito_origen: Option<Circuito>,
}

#[post("/vote/enable", data = "<solicitud>", format = "json")]
async fn habilitar_voto(
    store: &Store,
    solicitud: Json<HabilitacionRequest>,
) -> Result<Json<Mensaje>> {
    let solicitud = solicitud.into_inner();
    store
        .autorizar(
            &solicitud.credencial,
            solicitud.circuito,
            solicitud.es_observado,
            solicitud.circuito_origen,
        )
        .await?;

    let mensaje = match (solicitud.es_observado, solicitud.circuito_origen) {
        (true, Some(origen)) => format!(
            "Credencial {} habilitada para voto observado (origen declarado: circuito {origen})",
            solicitud.credencial
        ),
        _ => format!(
            "Credencial {} habilitada para votar en el circuito {}",
            solicitud.credencial, solicitud.circuito
        ),
    };
    Ok(Json(Mensaje::new(mensaje)))
}
