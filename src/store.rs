use std::collections::HashMap;

use rocket::{
    request::{self, FromRequest, Request},
    tokio::sync::Mutex,
    State,
};

use crate::error::{Error, Result};
use crate::model::{
    Accion, Circuito, Comprobante, Credencial, Elegibilidad, EstadoObservado, EstadoVotante, Id,
    Mesa, ObservadoPendiente, Padron, Partido, RegistroAutorizacion, Seleccion, Voto,
    VotoObservado,
};

/// The authoritative election day state shared by every terminal.
///
/// All operations run under a single lock, so every check-then-write on
/// `Mesa.estado` or a `RegistroAutorizacion` is one atomic transition:
/// of two racing conflicting calls, exactly one succeeds.
pub struct Store {
    inner: Mutex<StoreInner>,
}

struct StoreInner {
    mesas: HashMap<Circuito, Mesa>,
    /// Electoral roll: where each credential is registered to vote.
    roll: HashMap<Credencial, Circuito>,
    partidos: Vec<Partido>,
    /// One record per credential per election cycle.
    registros: HashMap<Credencial, RegistroAutorizacion>,
    votos: Vec<Voto>,
    /// Observed-vote requests in submission order.
    observados: Vec<VotoObservado>,
}

impl Store {
    pub fn from_padron(padron: Padron) -> Self {
        let mesas = padron
            .circuitos
            .iter()
            .map(|&circuito| (circuito, Mesa::nueva(circuito)))
            .collect();
        let roll = padron
            .habilitados
            .into_iter()
            .map(|i| (i.credencial, i.circuito))
            .collect();
        Self {
            inner: Mutex::new(StoreInner {
                mesas,
                roll,
                partidos: padron.partidos,
                registros: HashMap::new(),
                votos: Vec::new(),
                observados: Vec::new(),
            }),
        }
    }

    /// Candidate lists for the booth display.
    pub async fn partidos(&self) -> Vec<Partido> {
        self.inner.lock().await.partidos.clone()
    }

    /// Grant a credential its single voting opportunity at `circuito`.
    ///
    /// Ordinary grants require the credential on the circuit's own roll.
    /// Observed grants skip the roll check (identity is exactly what the
    /// president later judges) but must carry the claimed home circuit.
    /// A repeated request is never deduplicated: the grant is single-use,
    /// so the second call fails with `AlreadyAuthorized`.
    pub async fn autorizar(
        &self,
        credencial: &Credencial,
        circuito: Circuito,
        observado: bool,
        origen: Option<Circuito>,
    ) -> Result<()> {
        let inner = &mut *self.inner.lock().await;
        let mesa = inner
            .mesas
            .get_mut(&circuito)
            .ok_or_else(|| Error::NotFound(format!("el circuito {circuito} no existe")))?;
        mesa.exigir_abierta()?;

        if inner.registros.contains_key(credencial) {
            return Err(Error::AlreadyAuthorized(credencial.clone()));
        }

        let registro = if observado {
            let origen = origen.ok_or_else(|| {
                Error::BadRequest(
                    "un voto observado requiere el circuito de origen declarado".to_string(),
                )
            })?;
            RegistroAutorizacion::observada(credencial.clone(), circuito, origen)
        } else {
            match inner.roll.get(credencial) {
                Some(&inscrito) if inscrito == circuito => {
                    RegistroAutorizacion::comun(credencial.clone(), circuito)
                }
                _ => {
                    return Err(Error::NotFound(format!(
                        "la credencial {credencial} no figura en el padrón del circuito {circuito}"
                    )))
                }
            }
        };

        info!(
            "circuito {circuito}: credencial {credencial} habilitada{}",
            if observado { " (voto observado)" } else { "" }
        );
        inner.registros.insert(credencial.clone(), registro);
        mesa.habilitados += 1;
        Ok(())
    }

    /// Booth eligibility check. A closed mesa is a hard stop, never a status.
    pub async fn estado_votante(
        &self,
        circuito: Circuito,
        credencial: &Credencial,
    ) -> Result<EstadoVotante> {
        let inner = self.inner.lock().await;
        let mesa = inner
            .mesas
            .get(&circuito)
            .ok_or_else(|| Error::NotFound(format!("el circuito {circuito} no existe")))?;
        mesa.exigir_abierta()?;

        Ok(inner
            .registros
            .get(credencial)
            .filter(|registro| registro.circuito == circuito)
            .map(RegistroAutorizacion::estado_votante)
            .unwrap_or(EstadoVotante::Unauthorized))
    }

    /// Cast the vote: consume the grant, store the ballot with no identity
    /// reference, and return the confirmation message carrying the receipt.
    pub async fn emitir_voto(
        &self,
        circuito: Circuito,
        credencial: &Credencial,
        selecciones: &[Seleccion],
    ) -> Result<String> {
        let seleccion = Seleccion::exactamente_una(selecciones)?;

        let inner = &mut *self.inner.lock().await;
        let StoreInner {
            mesas,
            partidos,
            registros,
            votos,
            observados,
            ..
        } = inner;

        let mesa = mesas
            .get_mut(&circuito)
            .ok_or_else(|| Error::NotFound(format!("el circuito {circuito} no existe")))?;
        mesa.exigir_abierta()?;

        if let Seleccion::Candidato { id } = seleccion {
            if !partidos.iter().flat_map(|p| &p.candidatos).any(|c| c.id == id) {
                return Err(Error::NotFound(format!("el candidato {id} no existe")));
            }
        }

        let registro = registros
            .get_mut(credencial)
            .filter(|registro| registro.circuito == circuito)
            .ok_or_else(|| {
                Error::NotAuthorized(
                    "la credencial no fue habilitada por esta mesa".to_string(),
                )
            })?;
        let origen = registro.origen;
        registro.consumir()?;

        let voto = Voto::nuevo(circuito, seleccion, origen);
        if let Some(origen) = origen {
            observados.push(VotoObservado::nuevo(
                voto.id,
                credencial.clone(),
                circuito,
                origen,
                voto.emitido_en,
            ));
        }
        votos.push(voto);

        let comprobante = Comprobante::nuevo(circuito, mesa.emitir_secuencia());
        info!("circuito {circuito}: voto emitido, comprobante {comprobante}");
        Ok(comprobante.mensaje_confirmacion())
    }

    /// Pending observed votes for the president's panel, in submission
    /// order. Adjudication stays available after the mesa closes.
    pub async fn observados_pendientes(
        &self,
        circuito: Circuito,
    ) -> Result<Vec<ObservadoPendiente>> {
        let inner = self.inner.lock().await;
        if !inner.mesas.contains_key(&circuito) {
            return Err(Error::NotFound(format!("el circuito {circuito} no existe")));
        }
        Ok(inner
            .observados
            .iter()
            .filter(|v| v.circuito == circuito && v.estado == EstadoObservado::Pendiente)
            .map(ObservadoPendiente::from)
            .collect())
    }

    /// Decide an observed vote. Rejection excludes the stored vote from the
    /// tally but never releases the credential for a re-vote.
    pub async fn adjudicar(&self, id: Id, accion: Accion) -> Result<EstadoObservado> {
        let inner = &mut *self.inner.lock().await;
        let StoreInner {
            votos, observados, ..
        } = inner;

        let solicitud = observados
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| Error::NotFound(format!("el voto observado {id} no existe")))?;
        let decidido = solicitud.decidir(accion)?;
        let voto_id = solicitud.voto_id;

        let voto = votos
            .iter_mut()
            .find(|v| v.id == voto_id)
            .ok_or_else(|| Error::Internal(format!("no hay voto almacenado para {voto_id}")))?;
        voto.elegibilidad = match decidido {
            EstadoObservado::Validado => Elegibilidad::Computable,
            EstadoObservado::Rechazado => Elegibilidad::Excluido,
            EstadoObservado::Pendiente => {
                return Err(Error::Internal("decisión sin efecto".to_string()))
            }
        };

        info!("voto observado {id}: {decidido:?}");
        Ok(decidido)
    }

    /// The irreversible close. Sweeps every unconsumed grant of the circuit
    /// so it can never be consumed afterwards. Returns the final
    /// authorized count.
    pub async fn cerrar_mesa(&self, circuito: Circuito) -> Result<u32> {
        let inner = &mut *self.inner.lock().await;
        let mesa = inner
            .mesas
            .get_mut(&circuito)
            .ok_or_else(|| Error::NotFound(format!("el circuito {circuito} no existe")))?;
        mesa.cerrar()?;
        let habilitados = mesa.habilitados;

        let anuladas = inner
            .registros
            .values_mut()
            .filter(|r| r.circuito == circuito)
            .map(|r| r.anular())
            .filter(|anulada| *anulada)
            .count();
        if anuladas > 0 {
            warn!("circuito {circuito}: {anuladas} habilitaciones sin sufragar quedaron sin efecto");
        }
        info!("circuito {circuito}: mesa cerrada con {habilitados} habilitados");
        Ok(habilitados)
    }

    /// Snapshot of every mesa for the dashboard, ordered by circuit.
    pub async fn mesas(&self) -> Vec<Mesa> {
        let inner = self.inner.lock().await;
        let mut mesas: Vec<Mesa> = inner.mesas.values().cloned().collect();
        mesas.sort_by_key(|m| m.circuito);
        mesas
    }

    #[cfg(test)]
    async fn voto_por_id(&self, id: Id) -> Option<Voto> {
        self.inner
            .lock()
            .await
            .votos
            .iter()
            .find(|v| v.id == id)
            .cloned()
    }

    #[cfg(test)]
    async fn votos(&self) -> Vec<Voto> {
        self.inner.lock().await.votos.clone()
    }

    #[cfg(test)]
    async fn registro(&self, credencial: &Credencial) -> Option<RegistroAutorizacion> {
        self.inner.lock().await.registros.get(credencial).cloned()
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for &'r Store {
    type Error = ();

    /// Pull the store out of managed state, like a database handle.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        req.guard::<&State<Store>>().await.map(|state| state.inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AuthEstado, Candidato, Elegibilidad, InscripcionPadron};

    fn credencial(s: &str) -> Credencial {
        s.parse().unwrap()
    }

    fn padron() -> Padron {
        Padron {
            circuitos: vec![Circuito::from(1), Circuito::from(2)],
            habilitados: vec![
                InscripcionPadron {
                    credencial: credencial("ABC11111"),
                    circuito: Circuito::from(1),
                },
                InscripcionPadron {
                    credencial: credencial("ABC22222"),
                    circuito: Circuito::from(1),
                },
                InscripcionPadron {
                    credencial: credencial("XYZ33333"),
                    circuito: Circuito::from(2),
                },
            ],
            partidos: vec![Partido {
                partido: "Partido Celeste".to_string(),
                candidatos: vec![Candidato {
                    id: 42,
                    nombre: "A. Pérez".to_string(),
                }],
            }],
        }
    }

    fn store() -> Store {
        Store::from_padron(padron())
    }

    #[rocket::async_test]
    async fn escenario_habilitar_votar_consumir() {
        let store = store();
        let c1 = credencial("ABC11111");
        let p1 = Circuito::from(1);

        store.autorizar(&c1, p1, false, None).await.unwrap();
        assert_eq!(
            store.estado_votante(p1, &c1).await.unwrap(),
            EstadoVotante::Authorized
        );

        let mensaje = store
            .emitir_voto(p1, &c1, &[Seleccion::Blanco])
            .await
            .unwrap();
        assert!(mensaje.contains("Comprobante: C001-00001"), "{mensaje}");

        assert_eq!(
            store.estado_votante(p1, &c1).await.unwrap(),
            EstadoVotante::Consumed
        );
        assert!(matches!(
            store.emitir_voto(p1, &c1, &[Seleccion::Blanco]).await,
            Err(Error::AlreadyVoted)
        ));
    }

    #[rocket::async_test]
    async fn mesa_cerrada_bloquea_todo() {
        let store = store();
        let p1 = Circuito::from(1);

        assert_eq!(store.cerrar_mesa(p1).await.unwrap(), 0);
        assert!(matches!(
            store.autorizar(&credencial("ABC22222"), p1, false, None).await,
            Err(Error::MesaClosed(_))
        ));
        assert!(matches!(
            store
                .emitir_voto(p1, &credencial("ABC22222"), &[Seleccion::Blanco])
                .await,
            Err(Error::MesaClosed(_))
        ));
        assert!(matches!(
            store.estado_votante(p1, &credencial("ABC22222")).await,
            Err(Error::MesaClosed(_))
        ));
        assert!(matches!(
            store.cerrar_mesa(p1).await,
            Err(Error::AlreadyClosed(_))
        ));
    }

    #[rocket::async_test]
    async fn cierre_anula_habilitaciones_pendientes() {
        let store = store();
        let c = credencial("ABC11111");
        let p1 = Circuito::from(1);

        store.autorizar(&c, p1, false, None).await.unwrap();
        assert_eq!(store.cerrar_mesa(p1).await.unwrap(), 1);

        let registro = store.registro(&c).await.unwrap();
        assert_eq!(registro.estado, AuthEstado::Anulada);
        // The swept grant does not allow a fresh one either.
        assert!(matches!(
            store.autorizar(&c, Circuito::from(2), true, Some(p1)).await,
            Err(Error::AlreadyAuthorized(_))
        ));
    }

    #[rocket::async_test]
    async fn escenario_voto_observado_rechazado() {
        let store = store();
        let c3 = credencial("ABC11111");
        let p1 = Circuito::from(1);
        let p2 = Circuito::from(2);

        store.autorizar(&c3, p2, true, Some(p1)).await.unwrap();
        assert_eq!(
            store.estado_votante(p2, &c3).await.unwrap(),
            EstadoVotante::PendingAdjudication
        );

        let mensaje = store
            .emitir_voto(p2, &c3, &[Seleccion::Candidato { id: 42 }])
            .await
            .unwrap();
        assert!(mensaje.contains("Comprobante: C002-00001"), "{mensaje}");

        let pendientes = store.observados_pendientes(p2).await.unwrap();
        assert_eq!(pendientes.len(), 1);
        assert_eq!(pendientes[0].circuito_origen, p1);
        assert!(store.observados_pendientes(p1).await.unwrap().is_empty());

        store
            .adjudicar(pendientes[0].id, Accion::Rechazar)
            .await
            .unwrap();

        // The vote stays stored, flagged out of the tally.
        let votos = store.votos().await;
        assert_eq!(votos.len(), 1);
        assert_eq!(votos[0].elegibilidad, Elegibilidad::Excluido);
        assert_eq!(store.registro(&c3).await.unwrap().estado, AuthEstado::Sufragada);

        // The panel no longer lists it, and the decision is final.
        assert!(store.observados_pendientes(p2).await.unwrap().is_empty());
        assert!(matches!(
            store.adjudicar(pendientes[0].id, Accion::Validar).await,
            Err(Error::AlreadyAdjudicated(_))
        ));
    }

    #[rocket::async_test]
    async fn validacion_computa_el_voto() {
        let store = store();
        let c = credencial("XYZ33333");
        let p1 = Circuito::from(1);

        store.autorizar(&c, p1, true, Some(Circuito::from(2))).await.unwrap();
        store
            .emitir_voto(p1, &c, &[Seleccion::Anulado])
            .await
            .unwrap();
        let pendientes = store.observados_pendientes(p1).await.unwrap();
        store
            .adjudicar(pendientes[0].id, Accion::Validar)
            .await
            .unwrap();
        assert_eq!(store.votos().await[0].elegibilidad, Elegibilidad::Computable);
    }

    #[rocket::async_test]
    async fn seleccion_invalida() {
        let store = store();
        let c = credencial("ABC11111");
        let p1 = Circuito::from(1);
        store.autorizar(&c, p1, false, None).await.unwrap();

        assert!(matches!(
            store.emitir_voto(p1, &c, &[]).await,
            Err(Error::InvalidSelection(_))
        ));
        assert!(matches!(
            store
                .emitir_voto(p1, &c, &[Seleccion::Blanco, Seleccion::Anulado])
                .await,
            Err(Error::InvalidSelection(_))
        ));
        assert!(matches!(
            store
                .emitir_voto(p1, &c, &[Seleccion::Candidato { id: 999 }])
                .await,
            Err(Error::NotFound(_))
        ));
        // The failed attempts did not consume the grant.
        assert_eq!(
            store.estado_votante(p1, &c).await.unwrap(),
            EstadoVotante::Authorized
        );
    }

    #[rocket::async_test]
    async fn doble_autorizacion_concurrente() {
        let store = store();
        let c = credencial("ABC11111");
        let p1 = Circuito::from(1);

        let (a, b) = rocket::tokio::join!(
            store.autorizar(&c, p1, false, None),
            store.autorizar(&c, p1, false, None),
        );
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        assert!(matches!(
            a.err().or(b.err()),
            Some(Error::AlreadyAuthorized(_))
        ));
    }

    #[rocket::async_test]
    async fn doble_sufragio_concurrente() {
        let store = store();
        let c = credencial("ABC11111");
        let p1 = Circuito::from(1);
        store.autorizar(&c, p1, false, None).await.unwrap();

        let (a, b) = rocket::tokio::join!(
            store.emitir_voto(p1, &c, &[Seleccion::Blanco]),
            store.emitir_voto(p1, &c, &[Seleccion::Blanco]),
        );
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        assert!(matches!(a.err().or(b.err()), Some(Error::AlreadyVoted)));
        assert_eq!(store.votos().await.len(), 1);
    }

    #[rocket::async_test]
    async fn padron_ajeno_y_circuito_inexistente() {
        let store = store();
        // Registered at circuit 2, ordinary grant attempted at 1.
        assert!(matches!(
            store
                .autorizar(&credencial("XYZ33333"), Circuito::from(1), false, None)
                .await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            store
                .autorizar(&credencial("ABC11111"), Circuito::from(9), false, None)
                .await,
            Err(Error::NotFound(_))
        ));
        // Observed grant without a claimed origin is malformed.
        assert!(matches!(
            store
                .autorizar(&credencial("ABC11111"), Circuito::from(1), true, None)
                .await,
            Err(Error::BadRequest(_))
        ));
    }

    #[rocket::async_test]
    async fn sufragio_sin_habilitacion() {
        let store = store();
        assert!(matches!(
            store
                .emitir_voto(Circuito::from(1), &credencial("ABC11111"), &[Seleccion::Blanco])
                .await,
            Err(Error::NotAuthorized(_))
        ));
    }

    #[rocket::async_test]
    async fn observados_en_orden_de_llegada() {
        let store = store();
        let p1 = Circuito::from(1);
        for (i, c) in ["AAA1", "BBB2", "CCC3"].iter().enumerate() {
            let c = credencial(c);
            store
                .autorizar(&c, p1, true, Some(Circuito::from(2)))
                .await
                .unwrap();
            store
                .emitir_voto(p1, &c, &[Seleccion::Blanco])
                .await
                .unwrap();
            assert_eq!(store.observados_pendientes(p1).await.unwrap().len(), i + 1);
        }
        let pendientes = store.observados_pendientes(p1).await.unwrap();
        let credenciales: Vec<String> = pendientes
            .iter()
            .map(|p| p.credencial.to_string())
            .collect();
        assert_eq!(credenciales, vec!["AAA1", "BBB2", "CCC3"]);
    }

    #[rocket::async_test]
    async fn votos_sin_vinculo_con_identidad() {
        let store = store();
        let c = credencial("ABC11111");
        let p1 = Circuito::from(1);
        store.autorizar(&c, p1, false, None).await.unwrap();
        store
            .emitir_voto(p1, &c, &[Seleccion::Blanco])
            .await
            .unwrap();

        let voto = store.votos().await.pop().unwrap();
        let json = serde_json::to_value(store.voto_por_id(voto.id).await.unwrap()).unwrap();
        let claves = json.as_object().unwrap();
        assert!(!claves.contains_key("credencial"));
        assert!(!json.to_string().contains(c.as_str()));
    }
}
