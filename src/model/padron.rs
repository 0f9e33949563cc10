use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Circuito, Credencial};

/// A presidential ticket on the ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidato {
    pub id: u32,
    pub nombre: String,
}

/// A party and its candidate list, as the booth displays them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partido {
    pub partido: String,
    pub candidatos: Vec<Candidato>,
}

/// One electoral roll entry: which circuit a credential votes at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InscripcionPadron {
    pub credencial: Credencial,
    pub circuito: Circuito,
}

/// Seed data loaded at launch: the circuits this server hosts, the
/// electoral roll, and the candidate lists. Bulk import tooling is out of
/// scope; this is the already-imported result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Padron {
    pub circuitos: Vec<Circuito>,
    pub habilitados: Vec<InscripcionPadron>,
    pub partidos: Vec<Partido>,
}

impl Padron {
    /// Consistency checks run once at launch, before the store is built.
    pub fn validar(&self) -> Result<(), String> {
        if self.circuitos.is_empty() {
            return Err("el padrón no define ningún circuito".to_string());
        }
        let circuitos: HashSet<Circuito> = self.circuitos.iter().copied().collect();
        if circuitos.len() != self.circuitos.len() {
            return Err("el padrón repite números de circuito".to_string());
        }
        for inscripcion in &self.habilitados {
            if !circuitos.contains(&inscripcion.circuito) {
                return Err(format!(
                    "la credencial {} está inscripta en el circuito {} que no existe",
                    inscripcion.credencial, inscripcion.circuito
                ));
            }
        }
        let mut candidatos = HashSet::new();
        for partido in &self.partidos {
            for candidato in &partido.candidatos {
                if !candidatos.insert(candidato.id) {
                    return Err(format!(
                        "el candidato {} aparece más de una vez",
                        candidato.id
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn candidato_existe(&self, id: u32) -> bool {
        self.partidos
            .iter()
            .flat_map(|p| &p.candidatos)
            .any(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padron() -> Padron {
        Padron {
            circuitos: vec![Circuito::from(1)],
            habilitados: vec![InscripcionPadron {
                credencial: "12345678".parse().unwrap(),
                circuito: Circuito::from(1),
            }],
            partidos: vec![Partido {
                partido: "Partido Celeste".to_string(),
                candidatos: vec![Candidato {
                    id: 42,
                    nombre: "A. Pérez".to_string(),
                }],
            }],
        }
    }

    #[test]
    fn padron_consistente() {
        assert!(padron().validar().is_ok());
        assert!(padron().candidato_existe(42));
        assert!(!padron().candidato_existe(7));
    }

    #[test]
    fn detecta_circuito_inexistente() {
        let mut p = padron();
        p.habilitados[0].circuito = Circuito::from(9);
        assert!(p.validar().is_err());
    }

    #[test]
    fn detecta_candidato_repetido() {
        let mut p = padron();
        p.partidos.push(p.partidos[0].clone());
        assert!(p.validar().is_err());
    }
}
