use rocket::{serde::json::Json, Route};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Circuito, MesaEstado};
use crate::store::Store;

pub fn routes() -> Vec<Route> {
    routes![cerrar, estado]
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CierreRequest {
    pub circuito: Circuito,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CierreRespuesta {
    pub mensaje: String,
    /// Final authorized count at closing time.
    pub habilitados: u32,
}

/// The irreversible end-of-day close.
#[post("/circuito/cerrar", data = "<solicitud>", format = "json")]
async fn cerrar(store: &Store, solicitud: Json<CierreRequest>) -> Result<Json<CierreRespuesta>> {
    let circuito = solicitud.circuito;
    let habilitados = store.cerrar_mesa(circuito).await?;
    Ok(Json(CierreRespuesta {
        mensaje: format!("Mesa del circuito {circuito} cerrada definitivamente"),
        habilitados,
    }))
}

/// One row of the precinct dashboard.
#[derive(Debug, Serialize, Deserialize)]
pub struct EstadoMesa {
    pub numero_circuito: Circuito,
    pub estado: MesaEstado,
    pub habilitados: u32,
}

#[get("/circuito/estado")]
async fn estado(store: &Store) -> Json<Vec<EstadoMesa>> {
    let mesas = store
        .mesas()
        .await
        .into_iter()
        .map(|mesa| EstadoMesa {
            numero_circuito: mesa.circuito,
            estado: mesa.estado,
            habilitados: mesa.habilitados,
        })
        .collect();
    Json(mesas)
}
