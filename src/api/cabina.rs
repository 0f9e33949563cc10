use rocket::{serde::json::Json, Route};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Circuito, Credencial, EstadoVotante, Partido, Seleccion};
use crate::store::Store;

use super::common::Mensaje;

pub fn routes() -> Vec<Route> {
    routes![candidatos, estado_votante, votar]
}

/// Candidate lists for the booth's ballot display.
#[get("/candidatos")]
async fn candidatos(store: &Store) -> Json<Vec<Partido>> {
    Json(store.partidos().await)
}

#[derive(Debug, Serialize, Deserialize)]
struct EstadoRespuesta {
    estado: EstadoVotante,
}

/// Booth eligibility check, phase one of the two-phase cast.
#[get("/vote/<circuito>/<credencial>")]
async fn estado_votante(
    store: &Store,
    circuito: Circuito,
    credencial: Credencial,
) -> Result<Json<EstadoRespuesta>> {
    let estado = store.estado_votante(circuito, &credencial).await?;
    Ok(Json(EstadoRespuesta { estado }))
}

/// What the booth submits when the voter confirms.
#[derive(Debug, Serialize, Deserialize)]
pub struct VotoRequest {
    pub credencial: Credencial,
    pub circuito: Circuito,
    /// Must hold exactly one selection.
    pub selecciones: Vec<Seleccion>,
}

#[post("/votar", data = "<voto>", format = "json")]
async fn votar(store: &Store, voto: Json<VotoRequest>) -> Result<Json<Mensaje>> {
    let voto = voto.into_inner();
    let mensaje = store
        .emitir_voto(voto.circuito, &voto.credencial, &voto.selecciones)
        .await?;
    Ok(Json(Mensaje::new(mensaje)))
}
